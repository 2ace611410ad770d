//! Credential configuration for the static login verifier.
//!
//! The store ships with a fixed two-entry credential list (one admin, one
//! employee). A `[[credentials]]` table in config.toml replaces it entirely.

use crate::entities::Role;
use serde::Deserialize;

/// One accepted username/password pair and the identity it grants.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CredentialConfig {
    /// Login name
    pub username: String,
    /// Plaintext password, compared exactly
    pub password: String,
    /// Display name
    #[serde(default)]
    pub name: String,
    /// Role granted on login
    pub role: Role,
}

/// The built-in credential list used when config.toml names none.
#[must_use]
pub fn default_credentials() -> Vec<CredentialConfig> {
    vec![
        CredentialConfig {
            username: "qubic".to_string(),
            password: "##$@##".to_string(),
            name: "Administrator".to_string(),
            role: Role::Admin,
        },
        CredentialConfig {
            username: "emp".to_string(),
            password: "emp@@".to_string(),
            name: "Employee User".to_string(),
            role: Role::Employee,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_credentials_have_one_admin() {
        let creds = default_credentials();
        assert_eq!(creds.len(), 2);
        assert_eq!(
            creds.iter().filter(|c| c.role == Role::Admin).count(),
            1
        );
    }
}
