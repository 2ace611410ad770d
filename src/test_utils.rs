//! Shared test utilities for `qubic-pos`.
//!
//! This module provides common helper functions for setting up test stores
//! and creating test entities with sensible defaults.

use crate::{
    core::session::{Identity, Session},
    entities::{ProductModel, Role, TransactionModel, UserModel},
    errors::Result,
    store::{EmbeddedStore, NewProduct, NewUser, SaleRequest, Store},
};
use chrono::{DateTime, Utc};

/// Password given to every account made by [`create_test_user`]
pub const TEST_PASSWORD: &str = "secret";

/// Creates an embedded store over an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all store-backed tests.
pub async fn setup_test_store() -> Result<EmbeddedStore> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(EmbeddedStore::new(db))
}

/// Creates a test product with sensible defaults.
///
/// # Defaults
/// * category: "Phones"
/// * barcode: None
/// * price: 999.99
/// * cost: 799.99
pub async fn create_test_product(
    store: &dyn Store,
    name: &str,
    stock: i64,
) -> Result<ProductModel> {
    store
        .insert_product(NewProduct {
            name: name.to_string(),
            category: "Phones".to_string(),
            barcode: None,
            stock,
            price: 999.99,
            cost: 799.99,
            description: String::new(),
        })
        .await
}

/// Creates a test account with password [`TEST_PASSWORD`] and the username as
/// display name.
pub async fn create_test_user(store: &dyn Store, username: &str, role: Role) -> Result<UserModel> {
    store
        .insert_user(NewUser {
            username: username.to_string(),
            password: TEST_PASSWORD.to_string(),
            name: username.to_string(),
            role,
        })
        .await
}

/// An in-memory product that was never stored, with the same defaults as
/// [`create_test_product`].
#[must_use]
pub fn test_product_model(id: i64, name: &str, stock: i64) -> ProductModel {
    ProductModel {
        id,
        name: name.to_string(),
        category: "Phones".to_string(),
        barcode: None,
        stock,
        price: 999.99,
        cost: 799.99,
        description: String::new(),
        created: Utc::now(),
    }
}

/// An in-memory transaction for product 1: one unit for 100.0.
#[must_use]
pub fn test_transaction_model(
    id: i64,
    product_name: &str,
    employee: &str,
    date: DateTime<Utc>,
) -> TransactionModel {
    TransactionModel {
        id,
        product_id: 1,
        product_name: product_name.to_string(),
        quantity: 1,
        amount: 100.0,
        date,
        employee: employee.to_string(),
    }
}

/// A sale by "emp" happening now.
#[must_use]
pub fn test_sale_request(product_id: i64, quantity: i64, amount: f64) -> SaleRequest {
    SaleRequest {
        product_id,
        quantity,
        amount,
        employee: "emp".to_string(),
        date: Utc::now(),
    }
}

/// A session for the default admin account "qubic".
#[must_use]
pub fn admin_session() -> Session {
    Session::new(Identity {
        username: "qubic".to_string(),
        name: "Administrator".to_string(),
        role: Role::Admin,
    })
}

/// A session for the default employee account "emp".
#[must_use]
pub fn employee_session() -> Session {
    Session::new(Identity {
        username: "emp".to_string(),
        name: "Employee User".to_string(),
        role: Role::Employee,
    })
}
