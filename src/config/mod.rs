pub mod toml_config;

pub use toml_config::{
    AppConfig, LoggingConfig, ServerConfig, StoreBackend, StoreConfig, ValidationConfig,
};
