//! Dashboard - headline counts and the most recent sales.

use crate::{
    core::{analytics, sales, session::Session},
    entities::{ProductModel, TransactionModel},
    errors::Result,
    store::Store,
};

/// Number of sales shown under "recent transactions"
pub const RECENT_TRANSACTIONS: usize = 5;

/// Headline numbers for the dashboard
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardStats {
    /// Store display name
    pub store_name: String,
    /// Number of products
    pub total_products: usize,
    /// Number of transactions
    pub total_transactions: usize,
    /// Products with stock strictly below the low-stock threshold
    pub low_stock_items: usize,
    /// Sum of all sale amounts
    pub total_revenue: f64,
}

/// Products whose stock is strictly below `threshold`.
#[must_use]
pub fn low_stock_count(products: &[ProductModel], threshold: i64) -> usize {
    products.iter().filter(|p| p.stock < threshold).count()
}

/// The `limit` most recent sales, newest first.
pub async fn recent_transactions(store: &dyn Store, limit: usize) -> Result<Vec<TransactionModel>> {
    let mut transactions = sales::list_transactions(store).await?;
    transactions.truncate(limit);
    Ok(transactions)
}

/// Loads the dashboard numbers.
pub async fn dashboard_stats(store: &dyn Store, session: &Session) -> Result<DashboardStats> {
    tracing::debug!("Loading dashboard for {}", session.username());
    let products = store.list_products().await?;
    let transactions = store.list_transactions().await?;
    let settings = store.settings().await?;

    Ok(DashboardStats {
        store_name: settings.store_name,
        total_products: products.len(),
        total_transactions: transactions.len(),
        low_stock_items: low_stock_count(&products, settings.low_stock_threshold),
        total_revenue: analytics::total_revenue(&transactions),
    })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::core::ledger;
    use crate::store::SettingsPatch;
    use crate::test_utils::*;

    #[test]
    fn test_low_stock_is_strictly_below_threshold() {
        let products = vec![
            test_product_model(1, "A", 0),
            test_product_model(2, "B", 4),
            test_product_model(3, "C", 5),
            test_product_model(4, "D", 6),
        ];
        assert_eq!(low_stock_count(&products, 5), 2);
    }

    #[tokio::test]
    async fn test_dashboard_stats() -> Result<()> {
        let store = setup_test_store().await?;
        let session = employee_session();
        let phone = create_test_product(&store, "iPhone 14 Pro", 15).await?;
        create_test_product(&store, "MacBook Pro", 3).await?;
        ledger::record_sale(&store, &session, phone.id, 1, 999.99).await?;

        let stats = dashboard_stats(&store, &session).await?;
        assert_eq!(stats.total_products, 2);
        assert_eq!(stats.total_transactions, 1);
        assert_eq!(stats.low_stock_items, 1);
        assert_eq!(stats.total_revenue, 999.99);

        store
            .update_settings(SettingsPatch {
                low_stock_threshold: Some(20),
                ..Default::default()
            })
            .await?;
        assert_eq!(dashboard_stats(&store, &session).await?.low_stock_items, 2);
        Ok(())
    }

    #[tokio::test]
    async fn test_recent_transactions_limit() -> Result<()> {
        let store = setup_test_store().await?;
        let session = employee_session();
        let card = create_test_product(&store, "Gift Card", 50).await?;
        for _ in 0..7 {
            ledger::record_sale(&store, &session, card.id, 1, 25.0).await?;
        }

        let recent = recent_transactions(&store, RECENT_TRANSACTIONS).await?;
        assert_eq!(recent.len(), 5);
        assert!(recent.windows(2).all(|w| w[0].date >= w[1].date));
        Ok(())
    }
}
