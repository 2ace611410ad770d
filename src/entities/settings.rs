//! Settings entity - The store-wide configuration singleton.
//! Holds the low-stock threshold, the target profit margin, the store name and
//! the time of the last backup. Only the row with id [`SETTINGS_ID`] is used.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Primary key of the single settings row (also the REST path `/settings/1`)
pub const SETTINGS_ID: i32 = 1;

/// Default low-stock threshold
pub const DEFAULT_LOW_STOCK_THRESHOLD: i64 = 5;
/// Default profit margin, in percent
pub const DEFAULT_PROFIT_MARGIN: f64 = 25.0;
/// Default store name
pub const DEFAULT_STORE_NAME: &str = "QUBIC Store";

const fn settings_id() -> i32 {
    SETTINGS_ID
}

/// Settings database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "settings")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    /// Always [`SETTINGS_ID`]
    #[sea_orm(primary_key, auto_increment = false)]
    #[serde(default = "settings_id")]
    pub id: i32,
    /// Products with stock below this count as low stock
    pub low_stock_threshold: i64,
    /// Target profit margin in percent (0-100)
    pub profit_margin: f64,
    /// Display name of the store
    pub store_name: String,
    /// When the last backup was taken, if ever
    #[serde(default)]
    pub last_backup: Option<DateTimeUtc>,
}

impl Default for Model {
    fn default() -> Self {
        Self {
            id: SETTINGS_ID,
            low_stock_threshold: DEFAULT_LOW_STOCK_THRESHOLD,
            profit_margin: DEFAULT_PROFIT_MARGIN,
            store_name: DEFAULT_STORE_NAME.to_string(),
            last_backup: None,
        }
    }
}

/// `Settings` has no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
