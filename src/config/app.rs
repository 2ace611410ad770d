//! Application configuration loading from config.toml
//!
//! This module loads the store configuration from a TOML file: which storage
//! backend to use, the reserved admin account, the static credential list and the
//! products used to seed an empty inventory. Every section is optional; missing
//! values fall back to the defaults the store ships with.

use crate::config::credentials::{CredentialConfig, default_credentials};
use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::Path;
use tracing::{debug, info};

/// Default SQLite database for the embedded backend
pub const DEFAULT_DATABASE_URL: &str = "sqlite://data/qubic.sqlite?mode=rwc";
/// Default json-server base URL for the REST backend
pub const DEFAULT_REST_URL: &str = "http://localhost:3000";
/// Default reserved admin username
pub const DEFAULT_RESERVED_ADMIN: &str = "qubic";

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Storage backend selection
    pub storage: StorageConfig,
    /// Session gate settings
    pub auth: AuthConfig,
    /// Accounts accepted by the static credential verifier
    pub credentials: Vec<CredentialConfig>,
    /// Products to seed into an empty inventory
    pub products: Vec<ProductSeedConfig>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            storage: StorageConfig::default(),
            auth: AuthConfig::default(),
            credentials: default_credentials(),
            products: Vec::new(),
        }
    }
}

/// Which storage adapter backs the store
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// SQLite database file via SeaORM, no network
    #[default]
    Embedded,
    /// json-server reachable over HTTP
    Rest,
}

/// `[storage]` section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Selected backend
    pub backend: StorageBackend,
    /// Database URL for the embedded backend (`DATABASE_URL` overrides)
    pub database_url: String,
    /// Base URL for the REST backend (`QUBIC_REST_URL` overrides)
    pub rest_url: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::Embedded,
            database_url: DEFAULT_DATABASE_URL.to_string(),
            rest_url: DEFAULT_REST_URL.to_string(),
        }
    }
}

impl StorageConfig {
    /// REST base URL, honouring the `QUBIC_REST_URL` environment variable.
    #[must_use]
    pub fn resolved_rest_url(&self) -> String {
        std::env::var("QUBIC_REST_URL").unwrap_or_else(|_| self.rest_url.clone())
    }
}

/// How logins are verified
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerifierKind {
    /// Only the `[[credentials]]` list
    #[default]
    Static,
    /// Accounts stored in the users collection
    Store,
}

/// `[auth]` section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Username of the account that can never be deleted or renamed
    pub reserved_admin: String,
    /// Credential verifier used at login
    pub verifier: VerifierKind,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            reserved_admin: DEFAULT_RESERVED_ADMIN.to_string(),
            verifier: VerifierKind::Static,
        }
    }
}

/// A product listed under `[[products]]` for first-run seeding
#[derive(Debug, Clone, Deserialize)]
pub struct ProductSeedConfig {
    /// Product name
    pub name: String,
    /// Product category
    pub category: String,
    /// Optional barcode
    #[serde(default)]
    pub barcode: Option<String>,
    /// Initial stock
    pub stock: i64,
    /// Unit price
    pub price: f64,
    /// Unit cost
    pub cost: f64,
    /// Description
    #[serde(default)]
    pub description: String,
}

/// Loads the application configuration from a TOML file
///
/// # Errors
/// Returns an error if:
/// - The file cannot be read
/// - The TOML syntax is invalid
/// - A value has the wrong type (e.g. an unknown backend name)
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<AppConfig> {
    let path_ref = path.as_ref();
    debug!("Attempting to load configuration from: {:?}", path_ref);
    let contents = std::fs::read_to_string(path_ref).map_err(|e| Error::Config {
        message: format!("Failed to read config file {}: {e}", path_ref.display()),
    })?;

    toml::from_str(&contents).map_err(|e| Error::Config {
        message: format!("Failed to parse {}: {e}", path_ref.display()),
    })
}

/// Loads the configuration if the file exists, otherwise returns the defaults.
///
/// A file that exists but fails to parse is still an error.
pub fn load_config_or_default<P: AsRef<Path>>(path: P) -> Result<AppConfig> {
    let path_ref = path.as_ref();
    if path_ref.exists() {
        load_config(path_ref)
    } else {
        info!(
            "No configuration file at {}, using built-in defaults",
            path_ref.display()
        );
        Ok(AppConfig::default())
    }
}
