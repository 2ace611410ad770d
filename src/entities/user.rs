//! User entity - Represents store staff accounts.
//!
//! Each user has a unique username, a plaintext password, a display name and a
//! role. Exactly one account (the reserved admin, see `AuthConfig`) is protected
//! from deletion and renaming by the admin panel.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Access level of an account
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Full access, including the admin panel and transaction deletion
    #[sea_orm(string_value = "admin")]
    Admin,
    /// Inventory and sales access
    #[sea_orm(string_value = "employee")]
    Employee,
}

impl Role {
    /// Lowercase name as stored and serialized
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Employee => "employee",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = crate::errors::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "admin" => Ok(Self::Admin),
            "employee" => Ok(Self::Employee),
            other => Err(crate::errors::Error::validation(format!(
                "Unknown role '{other}', expected 'admin' or 'employee'"
            ))),
        }
    }
}

/// User database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    /// Unique identifier for the user
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Login name, unique across all accounts
    #[sea_orm(unique)]
    pub username: String,
    /// Plaintext password (the store has no hashing)
    pub password: String,
    /// Display name
    pub name: String,
    /// Access level
    pub role: Role,
    /// When the account was created
    pub created: DateTimeUtc,
}

/// `User` has no relationships with other entities; transactions keep the
/// username as a plain string.
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn test_role_parses_case_insensitively() {
        assert_eq!("Admin".parse::<Role>().unwrap(), Role::Admin);
        assert_eq!(" employee ".parse::<Role>().unwrap(), Role::Employee);
        assert!("manager".parse::<Role>().is_err());
    }

    #[test]
    fn test_user_serializes_camel_case_with_lowercase_role() {
        let user = Model {
            id: 2,
            username: "emp".to_string(),
            password: "emp@@".to_string(),
            name: "Employee User".to_string(),
            role: Role::Employee,
            created: chrono::Utc::now(),
        };
        let json = serde_json::to_value(&user).unwrap();
        assert_eq!(json["role"], "employee");
        assert_eq!(json["username"], "emp");
        assert!(json.get("created").is_some());
    }
}
