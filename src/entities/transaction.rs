//! Transaction entity - Represents a recorded sale.
//!
//! Each transaction has a `product_id`, a denormalized `product_name` captured at
//! sale time, the quantity sold, the charged amount, the sale date and the
//! username of the employee who recorded it.
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Transaction database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "transactions")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    /// Unique identifier for the transaction
    #[sea_orm(primary_key)]
    pub id: i64,
    /// ID of the product sold (may no longer resolve)
    pub product_id: i64,
    /// Product name at the time of sale
    pub product_name: String,
    /// Units sold
    pub quantity: i64,
    /// Amount charged for the whole sale
    pub amount: f64,
    /// When the sale was recorded
    pub date: DateTimeUtc,
    /// Username of the employee who recorded the sale
    pub employee: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
