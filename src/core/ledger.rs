//! Stock ledger - the only path by which sales change stock.
//!
//! Recording a sale decrements the product's stock and stores a transaction;
//! reversing one deletes the transaction and gives the units back. The store
//! backends carry out the writes, this module owns validation and the stock
//! arithmetic both backends share.

use crate::{
    core::session::Session,
    entities::{ProductModel, TransactionModel},
    errors::{Error, Result},
    store::{SaleRequest, Store},
};
use tracing::instrument;

/// Stock left after selling `quantity` units of `product`.
///
/// # Errors
/// Returns [`Error::InsufficientStock`] if the product has fewer than `quantity` units.
pub fn remaining_stock(product: &ProductModel, quantity: i64) -> Result<i64> {
    if quantity > product.stock {
        return Err(Error::InsufficientStock {
            available: product.stock,
            requested: quantity,
        });
    }
    Ok(product.stock - quantity)
}

/// Stock after `quantity` units of a reversed sale come back.
#[must_use]
pub const fn restored_stock(product: &ProductModel, quantity: i64) -> i64 {
    product.stock + quantity
}

fn validate_sale(quantity: i64, amount: f64) -> Result<()> {
    if quantity < 1 {
        return Err(Error::validation(format!(
            "Quantity must be at least 1, got {quantity}"
        )));
    }
    if !amount.is_finite() || amount < 0.0 {
        return Err(Error::validation(format!(
            "Amount must be a non-negative number, got {amount}"
        )));
    }
    Ok(())
}

/// Records a sale of `quantity` units of a product by the session's user.
///
/// The transaction captures the product name as it is now, the acting username
/// and the current time.
///
/// # Errors
/// Returns an error if:
/// - `quantity` is below 1 or `amount` is negative or not finite
/// - The product does not exist
/// - The product has fewer than `quantity` units
/// - The store write fails
#[instrument(skip(store, session), fields(employee = %session.username()))]
pub async fn record_sale(
    store: &dyn Store,
    session: &Session,
    product_id: i64,
    quantity: i64,
    amount: f64,
) -> Result<TransactionModel> {
    validate_sale(quantity, amount)?;

    store
        .record_sale(SaleRequest {
            product_id,
            quantity,
            amount,
            employee: session.username().to_string(),
            date: chrono::Utc::now(),
        })
        .await
}

/// Reverses a sale: restocks the product if it still exists and deletes the
/// transaction.
///
/// # Errors
/// Returns an error if the transaction does not exist or the store write fails.
#[instrument(skip(store))]
pub async fn reverse_sale(store: &dyn Store, transaction_id: i64) -> Result<TransactionModel> {
    store.reverse_sale(transaction_id).await
}
