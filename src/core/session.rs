//! Session and role gate.
//!
//! A [`Session`] is created by [`authenticate`] and passed explicitly to every
//! operation that needs to know who is acting. How credentials are checked is
//! decided by the injected [`CredentialVerifier`].

use crate::{
    config::CredentialConfig,
    config::default_credentials,
    entities::Role,
    errors::{Error, Result},
    store::Store,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::{info, warn};

/// Who a verified login belongs to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    /// Login name
    pub username: String,
    /// Display name
    pub name: String,
    /// Access level
    pub role: Role,
}

/// Checks a username/password pair.
#[async_trait]
pub trait CredentialVerifier: Send + Sync {
    /// Returns the identity for an exact match, `None` otherwise.
    async fn verify(&self, username: &str, password: &str) -> Result<Option<Identity>>;
}

/// Verifies against a fixed credential list.
#[derive(Debug, Clone)]
pub struct StaticCredentials {
    credentials: Vec<CredentialConfig>,
}

impl StaticCredentials {
    /// Uses the given list.
    #[must_use]
    pub const fn new(credentials: Vec<CredentialConfig>) -> Self {
        Self { credentials }
    }
}

impl Default for StaticCredentials {
    fn default() -> Self {
        Self::new(default_credentials())
    }
}

#[async_trait]
impl CredentialVerifier for StaticCredentials {
    async fn verify(&self, username: &str, password: &str) -> Result<Option<Identity>> {
        Ok(self
            .credentials
            .iter()
            .find(|c| c.username == username && c.password == password)
            .map(|c| Identity {
                username: c.username.clone(),
                name: if c.name.is_empty() {
                    c.username.clone()
                } else {
                    c.name.clone()
                },
                role: c.role,
            }))
    }
}

/// Verifies against the users collection of a store, so accounts created in
/// the admin panel can log in.
pub struct StoreCredentials<'a> {
    store: &'a dyn Store,
}

impl<'a> StoreCredentials<'a> {
    /// Verifies against `store`.
    #[must_use]
    pub const fn new(store: &'a dyn Store) -> Self {
        Self { store }
    }
}

#[async_trait]
impl CredentialVerifier for StoreCredentials<'_> {
    async fn verify(&self, username: &str, password: &str) -> Result<Option<Identity>> {
        Ok(self
            .store
            .list_users()
            .await?
            .into_iter()
            .find(|u| u.username == username && u.password == password)
            .map(|u| Identity {
                username: u.username,
                name: u.name,
                role: u.role,
            }))
    }
}

/// An authenticated user and when they logged in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    identity: Identity,
    login_time: DateTime<Utc>,
    last_activity: DateTime<Utc>,
}

impl Session {
    /// Starts a session for `identity` now.
    #[must_use]
    pub fn new(identity: Identity) -> Self {
        let now = Utc::now();
        Self {
            identity,
            login_time: now,
            last_activity: now,
        }
    }

    /// Who is logged in
    #[must_use]
    pub const fn identity(&self) -> &Identity {
        &self.identity
    }

    /// Login name of the acting user
    #[must_use]
    pub fn username(&self) -> &str {
        &self.identity.username
    }

    /// Display name of the acting user
    #[must_use]
    pub fn name(&self) -> &str {
        &self.identity.name
    }

    /// Role of the acting user
    #[must_use]
    pub const fn role(&self) -> Role {
        self.identity.role
    }

    /// When the session started
    #[must_use]
    pub const fn login_time(&self) -> DateTime<Utc> {
        self.login_time
    }

    /// When the session was last used
    #[must_use]
    pub const fn last_activity(&self) -> DateTime<Utc> {
        self.last_activity
    }

    /// Records activity. Sessions never expire.
    pub fn touch(&mut self) {
        self.last_activity = Utc::now();
    }

    /// Whether the acting user is an admin
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.identity.role == Role::Admin
    }

    /// Fails with [`Error::PermissionDenied`] unless the acting user is an admin.
    pub fn require_admin(&self, action: &str) -> Result<()> {
        if self.is_admin() {
            Ok(())
        } else {
            warn!("{} attempted admin action: {}", self.username(), action);
            Err(Error::PermissionDenied {
                action: action.to_string(),
            })
        }
    }
}

/// Checks the credentials and opens a session.
///
/// The username is trimmed; the password is compared exactly.
///
/// # Errors
/// Returns an error if:
/// - Either field is empty
/// - No account matches ([`Error::InvalidCredentials`])
/// - The verifier cannot reach its backing store
pub async fn authenticate(
    verifier: &dyn CredentialVerifier,
    username: &str,
    password: &str,
) -> Result<Session> {
    let username = username.trim();
    if username.is_empty() || password.is_empty() {
        return Err(Error::validation("Please enter both username and password"));
    }

    let identity = verifier
        .verify(username, password)
        .await?
        .ok_or(Error::InvalidCredentials)?;
    info!("{} logged in as {}", identity.username, identity.role);
    Ok(Session::new(identity))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;

    #[tokio::test]
    async fn test_default_credentials_log_in() -> Result<()> {
        let verifier = StaticCredentials::default();

        let admin = authenticate(&verifier, "qubic", "##$@##").await?;
        assert!(admin.is_admin());
        assert_eq!(admin.name(), "Administrator");

        let employee = authenticate(&verifier, " emp ", "emp@@").await?;
        assert!(!employee.is_admin());
        assert_eq!(employee.role(), Role::Employee);
        Ok(())
    }

    #[tokio::test]
    async fn test_wrong_password_is_rejected() {
        let verifier = StaticCredentials::default();
        let result = authenticate(&verifier, "qubic", "wrong").await;
        assert!(matches!(result, Err(Error::InvalidCredentials)));

        let result = authenticate(&verifier, "nobody", "emp@@").await;
        assert!(matches!(result, Err(Error::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_empty_fields_fail_validation() {
        let verifier = StaticCredentials::default();
        assert!(matches!(
            authenticate(&verifier, "  ", "x").await,
            Err(Error::Validation { .. })
        ));
        assert!(matches!(
            authenticate(&verifier, "emp", "").await,
            Err(Error::Validation { .. })
        ));
    }

    #[tokio::test]
    async fn test_store_credentials_see_new_accounts() -> Result<()> {
        let store = setup_test_store().await?;
        create_test_user(&store, "alice", Role::Employee).await?;
        let verifier = StoreCredentials::new(&store);

        let session = authenticate(&verifier, "alice", TEST_PASSWORD).await?;
        assert_eq!(session.username(), "alice");
        assert!(matches!(
            authenticate(&verifier, "qubic", "##$@##").await,
            Err(Error::InvalidCredentials)
        ));
        Ok(())
    }

    #[test]
    fn test_require_admin() {
        assert!(admin_session().require_admin("delete transactions").is_ok());
        let result = employee_session().require_admin("delete transactions");
        assert!(matches!(result, Err(Error::PermissionDenied { .. })));
    }

    #[test]
    fn test_touch_moves_last_activity_only() {
        let mut session = employee_session();
        let login = session.login_time();
        session.touch();
        assert_eq!(session.login_time(), login);
        assert!(session.last_activity() >= login);
    }
}
