pub mod configuration;
pub mod services;
#[cfg(test)]
pub mod testing;
