pub mod backends;
pub mod base;
pub mod clients;
pub mod registry;
pub mod resources;
