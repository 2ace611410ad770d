/// Database configuration and connection management
pub mod database;

/// Application configuration loading from config.toml
pub mod app;

/// Login credentials for the static credential verifier
pub mod credentials;

pub use app::{
    AppConfig, AuthConfig, ProductSeedConfig, StorageBackend, StorageConfig, VerifierKind,
    load_config, load_config_or_default,
};
pub use credentials::{CredentialConfig, default_credentials};
