//! Transaction business logic - sales history, search and the sale entry points.
//!
//! Any user can record a sale; only admins can delete one, which reverses it
//! through the ledger so the product gets its stock back.

use crate::{
    core::{ledger, session::Session},
    entities::TransactionModel,
    errors::Result,
    store::Store,
};
use tracing::instrument;

/// All transactions, newest first.
pub async fn list_transactions(store: &dyn Store) -> Result<Vec<TransactionModel>> {
    let mut transactions = store.list_transactions().await?;
    transactions.sort_by(|a, b| b.date.cmp(&a.date).then(b.id.cmp(&a.id)));
    Ok(transactions)
}

/// Filters transactions by a search query.
///
/// Product name and employee match case-insensitively; the id matches as a
/// substring of its decimal form.
#[must_use]
pub fn search_transactions<'a>(
    transactions: &'a [TransactionModel],
    query: &str,
) -> Vec<&'a TransactionModel> {
    let needle = query.to_lowercase();
    transactions
        .iter()
        .filter(|t| {
            t.product_name.to_lowercase().contains(&needle)
                || t.employee.to_lowercase().contains(&needle)
                || t.id.to_string().contains(query)
        })
        .collect()
}

/// Records a sale by the session's user. See [`ledger::record_sale`].
pub async fn record_sale(
    store: &dyn Store,
    session: &Session,
    product_id: i64,
    quantity: i64,
    amount: f64,
) -> Result<TransactionModel> {
    ledger::record_sale(store, session, product_id, quantity, amount).await
}

/// Deletes a transaction and restores its stock. Admin only.
///
/// # Errors
/// Returns an error if:
/// - The session is not an admin session
/// - The transaction does not exist
/// - The store write fails
#[instrument(skip(store, session), fields(user = %session.username()))]
pub async fn delete_transaction(
    store: &dyn Store,
    session: &Session,
    transaction_id: i64,
) -> Result<TransactionModel> {
    session.require_admin("deleting transactions")?;
    ledger::reverse_sale(store, transaction_id).await
}
