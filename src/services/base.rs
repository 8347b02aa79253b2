pub mod call_context;
pub mod identifier;
pub mod resource_kind;
pub mod status;
pub mod tenant;
pub mod transport;
