//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the stored collections (users, products, transactions)
//! and the settings singleton. Each entity has a Model struct for data and an
//! Entity struct for operations. Models serialize with camelCase field names so the
//! same types travel over the REST backend and through backup files.

pub mod product;
pub mod settings;
pub mod transaction;
pub mod user;

// Re-export specific types to avoid conflicts
pub use product::{Column as ProductColumn, Entity as Product, Model as ProductModel};
pub use settings::{Column as SettingsColumn, Entity as Settings, Model as SettingsModel};
pub use transaction::{
    Column as TransactionColumn, Entity as Transaction, Model as TransactionModel,
};
pub use user::{Column as UserColumn, Entity as User, Model as UserModel, Role};
