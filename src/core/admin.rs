//! Admin panel - employee accounts, store settings and backups.
//!
//! Every operation here requires an admin session. The reserved admin account
//! (configured under `[auth]`) never shows up in the employee list and can be
//! neither deleted nor renamed.

use crate::{
    core::{backup, session::Session},
    entities::{Role, SettingsModel, UserModel},
    errors::{Error, Result},
    store::{NewUser, SettingsPatch, Snapshot, Store, UserPatch},
};
use tracing::{info, instrument};

/// Employee fields as entered in the admin panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmployeeForm {
    /// Login name
    pub username: String,
    /// Display name
    pub name: String,
    /// Access level
    pub role: Role,
    /// Password; blank keeps the current one when editing
    pub password: String,
}

/// Settings fields as entered in the admin panel.
#[derive(Debug, Clone, PartialEq)]
pub struct SettingsForm {
    /// Low-stock threshold, at least 1
    pub low_stock_threshold: i64,
    /// Profit margin in percent, 0 to 100
    pub profit_margin: f64,
    /// Store display name
    pub store_name: String,
}

impl SettingsForm {
    /// Validates the form into a settings patch.
    ///
    /// # Errors
    /// Returns [`Error::Validation`] if the threshold is below 1, the margin is
    /// outside 0-100 or the store name is empty.
    pub fn validate(&self) -> Result<SettingsPatch> {
        if self.low_stock_threshold < 1 {
            return Err(Error::validation("Please enter a valid low stock threshold"));
        }
        if !(0.0..=100.0).contains(&self.profit_margin) {
            return Err(Error::validation(
                "Please enter a valid profit margin (0-100)",
            ));
        }
        let store_name = self.store_name.trim();
        if store_name.is_empty() {
            return Err(Error::validation("Please enter a store name"));
        }
        Ok(SettingsPatch {
            low_stock_threshold: Some(self.low_stock_threshold),
            profit_margin: Some(self.profit_margin),
            store_name: Some(store_name.to_string()),
            last_backup: None,
        })
    }
}

/// All accounts except the reserved admin.
pub async fn list_employees(
    store: &dyn Store,
    session: &Session,
    reserved_admin: &str,
) -> Result<Vec<UserModel>> {
    session.require_admin("viewing employees")?;
    Ok(store
        .list_users()
        .await?
        .into_iter()
        .filter(|u| u.username != reserved_admin)
        .collect())
}

/// Creates an employee (`employee_id` is `None`) or updates one.
///
/// # Errors
/// Returns an error if:
/// - The session is not an admin session
/// - The username or name is blank, or a new account has no password
/// - The username is taken by another account ([`Error::DuplicateUsername`])
/// - An edit would rename the reserved admin ([`Error::ProtectedRecord`])
/// - The employee to edit does not exist
#[instrument(skip(store, session, form), fields(user = %session.username(), username = %form.username))]
pub async fn save_employee(
    store: &dyn Store,
    session: &Session,
    reserved_admin: &str,
    employee_id: Option<i64>,
    form: &EmployeeForm,
) -> Result<UserModel> {
    session.require_admin("managing employees")?;

    let username = form.username.trim();
    let name = form.name.trim();
    if username.is_empty() || name.is_empty() {
        return Err(Error::validation("Please fill all required fields"));
    }

    let Some(id) = employee_id else {
        if form.password.is_empty() {
            return Err(Error::validation(
                "Password is required for new employees",
            ));
        }
        let user = store
            .insert_user(NewUser {
                username: username.to_string(),
                password: form.password.clone(),
                name: name.to_string(),
                role: form.role,
            })
            .await?;
        info!("Employee {} added", user.username);
        return Ok(user);
    };

    let existing = store
        .get_user(id)
        .await?
        .ok_or(Error::NotFound { entity: "user", id })?;
    if existing.username == reserved_admin && username != reserved_admin {
        return Err(Error::ProtectedRecord {
            username: existing.username,
        });
    }

    let patch = UserPatch {
        username: Some(username.to_string()),
        password: (!form.password.is_empty()).then(|| form.password.clone()),
        name: Some(name.to_string()),
        role: Some(form.role),
    };
    let user = store.update_user(id, patch).await?;
    info!("Employee {} updated", user.username);
    Ok(user)
}

/// Deletes an employee account.
///
/// # Errors
/// Returns [`Error::ProtectedRecord`] for the reserved admin and
/// [`Error::NotFound`] for an unknown id.
#[instrument(skip(store, session), fields(user = %session.username()))]
pub async fn delete_employee(
    store: &dyn Store,
    session: &Session,
    reserved_admin: &str,
    employee_id: i64,
) -> Result<()> {
    session.require_admin("deleting employees")?;

    let employee = store.get_user(employee_id).await?.ok_or(Error::NotFound {
        entity: "user",
        id: employee_id,
    })?;
    if employee.username == reserved_admin {
        return Err(Error::ProtectedRecord {
            username: employee.username,
        });
    }

    store.delete_user(employee_id).await?;
    info!("Employee {} deleted", employee.username);
    Ok(())
}

/// Current store settings.
pub async fn load_settings(store: &dyn Store, session: &Session) -> Result<SettingsModel> {
    session.require_admin("viewing settings")?;
    store.settings().await
}

/// Validates and saves the settings form. The last-backup time is kept.
#[instrument(skip(store, session, form), fields(user = %session.username()))]
pub async fn save_settings(
    store: &dyn Store,
    session: &Session,
    form: &SettingsForm,
) -> Result<SettingsModel> {
    session.require_admin("changing settings")?;
    let settings = store.update_settings(form.validate()?).await?;
    info!("Settings saved");
    Ok(settings)
}

/// Exports a backup. Nothing is written to the store; call
/// [`mark_backup_taken`] once the backup has been saved.
#[instrument(skip(store, session), fields(user = %session.username()))]
pub async fn create_backup(store: &dyn Store, session: &Session) -> Result<String> {
    session.require_admin("creating backups")?;
    backup::export_backup(store).await
}

/// Records the current time as the last backup.
#[instrument(skip(store, session), fields(user = %session.username()))]
pub async fn mark_backup_taken(store: &dyn Store, session: &Session) -> Result<SettingsModel> {
    session.require_admin("creating backups")?;
    store
        .update_settings(SettingsPatch {
            last_backup: Some(Some(chrono::Utc::now())),
            ..Default::default()
        })
        .await
}

/// Replaces all data with the contents of a backup.
#[instrument(skip_all, fields(user = %session.username()))]
pub async fn restore_backup(store: &dyn Store, session: &Session, json: &str) -> Result<Snapshot> {
    session.require_admin("restoring backups")?;
    let snapshot = backup::import_backup(store, json).await?;
    info!("Backup restored");
    Ok(snapshot)
}
