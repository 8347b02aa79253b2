pub mod namespaced_client;
pub mod resource_client;
pub mod watch_event;
