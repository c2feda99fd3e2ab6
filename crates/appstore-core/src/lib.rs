pub mod config;
pub mod types;

pub use config::{AppStoreConfig, ConfigError};
pub use types::*;
