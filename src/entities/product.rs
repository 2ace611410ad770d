//! Product entity - Represents an inventory item.
//!
//! Each product has a name, category, optional barcode, stock level, unit price,
//! unit cost and a free-text description. Stock is only ever changed through the
//! stock ledger once the product exists, and never drops below zero.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Product database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "products")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    /// Unique identifier for the product
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Name of the product (e.g., "iPhone 14 Pro")
    pub name: String,
    /// Category for grouping (e.g., "Phones", "Vouchers")
    pub category: String,
    /// Optional barcode; several products may share one
    #[serde(default)]
    pub barcode: Option<String>,
    /// Units on hand
    pub stock: i64,
    /// Selling price per unit
    pub price: f64,
    /// Purchase cost per unit
    pub cost: f64,
    /// Free-text description, possibly empty
    #[serde(default)]
    pub description: String,
    /// When the product was created
    pub created: DateTimeUtc,
}

/// `Product` keeps no foreign keys: sales reference it by id only so that a
/// product can be removed while its sales history stays.
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
