//! Write-side record shapes shared by both storage backends.
//!
//! `New*` types carry everything a caller supplies when creating a record; the
//! backend assigns the id and creation time. `*Patch` types describe a shallow
//! update: `None` fields are left alone, exactly like merging a partial JSON
//! object onto the stored one.

use crate::entities::{ProductModel, Role, SettingsModel, TransactionModel, UserModel};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A user account to create
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    /// Login name
    pub username: String,
    /// Plaintext password
    pub password: String,
    /// Display name
    pub name: String,
    /// Access level
    pub role: Role,
}

/// Fields to change on an existing user
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPatch {
    /// New login name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// New password
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    /// New display name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// New role
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
}

/// A product to create
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProduct {
    /// Product name
    pub name: String,
    /// Category
    pub category: String,
    /// Optional barcode
    pub barcode: Option<String>,
    /// Initial stock
    pub stock: i64,
    /// Unit price
    pub price: f64,
    /// Unit cost
    pub cost: f64,
    /// Description
    pub description: String,
}

/// Fields to change on an existing product
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductPatch {
    /// New name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// New category
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// New barcode; `Some(None)` clears it
    #[serde(skip_serializing_if = "Option::is_none")]
    pub barcode: Option<Option<String>>,
    /// New stock level
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stock: Option<i64>,
    /// New unit price
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    /// New unit cost
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cost: Option<f64>,
    /// New description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Fields to change on the settings singleton
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsPatch {
    /// New low-stock threshold
    #[serde(skip_serializing_if = "Option::is_none")]
    pub low_stock_threshold: Option<i64>,
    /// New profit margin
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profit_margin: Option<f64>,
    /// New store name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub store_name: Option<String>,
    /// New last-backup time
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_backup: Option<Option<DateTime<Utc>>>,
}

impl SettingsPatch {
    /// Applies the patch to an in-memory settings value.
    pub fn apply(&self, settings: &mut SettingsModel) {
        if let Some(threshold) = self.low_stock_threshold {
            settings.low_stock_threshold = threshold;
        }
        if let Some(margin) = self.profit_margin {
            settings.profit_margin = margin;
        }
        if let Some(name) = &self.store_name {
            settings.store_name.clone_from(name);
        }
        if let Some(last_backup) = self.last_backup {
            settings.last_backup = last_backup;
        }
    }
}

/// A sale the ledger has validated and wants persisted.
///
/// The backend resolves the product, captures its name and applies the stock
/// change; callers never write transactions directly.
#[derive(Debug, Clone, PartialEq)]
pub struct SaleRequest {
    /// Product being sold
    pub product_id: i64,
    /// Units sold, at least 1
    pub quantity: i64,
    /// Amount charged
    pub amount: f64,
    /// Username of the acting employee
    pub employee: String,
    /// Sale time
    pub date: DateTime<Utc>,
}

/// The full contents of a store: all four collections.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Every user account
    pub users: Vec<UserModel>,
    /// Every product
    pub products: Vec<ProductModel>,
    /// Every transaction
    pub transactions: Vec<TransactionModel>,
    /// The settings singleton
    pub settings: SettingsModel,
}
