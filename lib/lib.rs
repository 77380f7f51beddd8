pub mod config;
pub mod database;
pub mod timeutil;
pub mod types;
pub mod validation;

pub use config::{Config, ConfigLoader, DispatcherConfig};
