//! Unified error type for every layer of the point-of-sale system.
//!
//! Store backends, the stock ledger, the session gate and the admin panel all
//! report failures through [`Error`]. Nothing here is fatal to the process: the
//! caller abandons the operation and shows the message to the user.

use thiserror::Error;

/// All failures surfaced by `qubic-pos` operations.
#[derive(Debug, Error)]
pub enum Error {
    /// A record referenced by id does not exist
    #[error("{entity} {id} not found")]
    NotFound {
        /// Record kind (`"product"`, `"transaction"`, `"user"`)
        entity: &'static str,
        /// The id that failed to resolve
        id: i64,
    },

    /// A sale asked for more units than the product has
    #[error("Insufficient stock. Only {available} available, {requested} requested")]
    InsufficientStock {
        /// Units currently in stock
        available: i64,
        /// Units the sale asked for
        requested: i64,
    },

    /// Username/password pair did not match any known account
    #[error("Invalid username or password")]
    InvalidCredentials,

    /// Another account already uses this username
    #[error("Username already exists: {username}")]
    DuplicateUsername {
        /// The clashing username
        username: String,
    },

    /// Attempt to delete or rename the reserved admin account
    #[error("The account '{username}' is protected and cannot be deleted or renamed")]
    ProtectedRecord {
        /// Username of the protected account
        username: String,
    },

    /// The current session lacks the role required for an action
    #[error("Permission denied: {action} requires an admin session")]
    PermissionDenied {
        /// Short description of the attempted action
        action: String,
    },

    /// Form input failed local validation
    #[error("Validation failed: {message}")]
    Validation {
        /// Human-readable reason
        message: String,
    },

    /// Backup payload is not a valid export
    #[error("Invalid backup file format: {message}")]
    InvalidBackupFormat {
        /// What was wrong with the payload
        message: String,
    },

    /// Configuration could not be read or parsed
    #[error("Configuration error: {message}")]
    Config {
        /// Human-readable reason
        message: String,
    },

    /// The REST backend answered with a non-success status
    #[error("Storage request to {endpoint} failed with HTTP status {status}")]
    Storage {
        /// HTTP status code returned by the server
        status: u16,
        /// Path that was requested
        endpoint: String,
    },

    /// Embedded database failure
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// Transport-level failure talking to the REST backend
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Filesystem failure (config, backup files)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON encoding/decoding failure
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Shorthand for a [`Error::Validation`] with the given message.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Whether this error came from the storage layer rather than from a
    /// business rule.
    #[must_use]
    pub const fn is_storage_io(&self) -> bool {
        matches!(
            self,
            Self::Storage { .. } | Self::Database(_) | Self::Http(_) | Self::Io(_)
        )
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insufficient_stock_message_names_available_units() {
        let err = Error::InsufficientStock {
            available: 3,
            requested: 5,
        };
        assert_eq!(
            err.to_string(),
            "Insufficient stock. Only 3 available, 5 requested"
        );
    }

    #[test]
    fn test_storage_classification() {
        let storage = Error::Storage {
            status: 500,
            endpoint: "/products".to_string(),
        };
        assert!(storage.is_storage_io());
        assert!(!Error::InvalidCredentials.is_storage_io());
        assert!(!Error::validation("bad").is_storage_io());
    }
}
