//! Sales analytics - aggregates over the transaction history.
//!
//! All functions here are pure projections over already-loaded collections;
//! [`load_analytics`] fetches the data once and computes the full summary.
//! Dates are bucketed in UTC.

use crate::{
    core::session::Session,
    entities::{ProductModel, TransactionModel},
    errors::Result,
    store::Store,
};
use chrono::{Datelike, NaiveDate};
use std::collections::HashMap;
use tracing::debug;

/// Default number of rows in the top products table
pub const DEFAULT_TOP_PRODUCTS: usize = 10;
/// Default number of days in the daily sales series
pub const DEFAULT_DAILY_SALES_DAYS: u32 = 7;

/// One row of the top products table
#[derive(Debug, Clone, PartialEq)]
pub struct ProductStats {
    /// Product id
    pub product_id: i64,
    /// Product name as captured by its first sale
    pub name: String,
    /// Current category of the product
    pub category: String,
    /// Units sold
    pub quantity: i64,
    /// Sum of sale amounts
    pub revenue: f64,
    /// Revenue minus current unit cost times units sold
    pub profit: f64,
}

/// Everything the analytics view shows
#[derive(Debug, Clone, PartialEq)]
pub struct AnalyticsSummary {
    /// Sum of all sale amounts
    pub total_revenue: f64,
    /// Number of transactions
    pub transaction_count: usize,
    /// Best seller by units, keyed by product name
    pub top_product: Option<(String, i64)>,
    /// Best category by revenue
    pub top_category: Option<(String, f64)>,
    /// Revenue per category, in first-sale order
    pub category_sales: Vec<(String, f64)>,
    /// Revenue per calendar month, January first
    pub monthly_revenue: [f64; 12],
    /// Products ranked by revenue
    pub top_products: Vec<ProductStats>,
}

/// Sums values per key while keeping the order keys were first seen in.
fn accumulate<K, V, I>(items: I) -> Vec<(K, V)>
where
    K: Eq + std::hash::Hash + Clone,
    V: Default + std::ops::AddAssign,
    I: IntoIterator<Item = (K, V)>,
{
    let mut index: HashMap<K, usize> = HashMap::new();
    let mut totals: Vec<(K, V)> = Vec::new();
    for (key, value) in items {
        if let Some(&i) = index.get(&key) {
            totals[i].1 += value;
        } else {
            index.insert(key.clone(), totals.len());
            totals.push((key, value));
        }
    }
    totals
}

/// First entry with the largest value; earlier entries win ties.
fn max_by_value<K: Clone, V: PartialOrd + Copy>(totals: &[(K, V)]) -> Option<(K, V)> {
    totals
        .iter()
        .fold(None::<&(K, V)>, |best, entry| match best {
            Some(b) if b.1 >= entry.1 => Some(b),
            _ => Some(entry),
        })
        .cloned()
}

/// Sum of all sale amounts.
#[must_use]
pub fn total_revenue(transactions: &[TransactionModel]) -> f64 {
    transactions.iter().map(|t| t.amount).sum()
}

/// Best-selling product by units, grouped by the product name captured at sale
/// time.
#[must_use]
pub fn top_product(transactions: &[TransactionModel]) -> Option<(String, i64)> {
    let units = accumulate(
        transactions
            .iter()
            .map(|t| (t.product_name.clone(), t.quantity)),
    );
    max_by_value(&units)
}

/// Revenue per category of the products that still exist.
#[must_use]
pub fn category_sales(
    transactions: &[TransactionModel],
    products: &[ProductModel],
) -> Vec<(String, f64)> {
    let by_id: HashMap<i64, &ProductModel> = products.iter().map(|p| (p.id, p)).collect();
    accumulate(transactions.iter().filter_map(|t| {
        by_id
            .get(&t.product_id)
            .map(|p| (p.category.clone(), t.amount))
    }))
}

/// Best category by revenue.
#[must_use]
pub fn top_category(
    transactions: &[TransactionModel],
    products: &[ProductModel],
) -> Option<(String, f64)> {
    max_by_value(&category_sales(transactions, products))
}

/// Revenue per calendar month of the sale date, January in slot 0.
#[must_use]
pub fn monthly_revenue(transactions: &[TransactionModel]) -> [f64; 12] {
    let mut months = [0.0; 12];
    for t in transactions {
        months[t.date.month0() as usize] += t.amount;
    }
    months
}

/// Products ranked by revenue, at most `limit` rows.
///
/// Only products that still exist are counted; profit uses the product's
/// current cost.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn top_products(
    transactions: &[TransactionModel],
    products: &[ProductModel],
    limit: usize,
) -> Vec<ProductStats> {
    let by_id: HashMap<i64, &ProductModel> = products.iter().map(|p| (p.id, p)).collect();
    let mut rows: Vec<ProductStats> = Vec::new();
    let mut index: HashMap<i64, usize> = HashMap::new();

    for t in transactions {
        let Some(product) = by_id.get(&t.product_id) else {
            continue;
        };
        let i = *index.entry(t.product_id).or_insert_with(|| {
            rows.push(ProductStats {
                product_id: t.product_id,
                name: t.product_name.clone(),
                category: product.category.clone(),
                quantity: 0,
                revenue: 0.0,
                profit: 0.0,
            });
            rows.len() - 1
        });
        let row = &mut rows[i];
        row.quantity += t.quantity;
        row.revenue += t.amount;
        row.profit += product.cost.mul_add(-(t.quantity as f64), t.amount);
    }

    rows.sort_by(|a, b| b.revenue.total_cmp(&a.revenue));
    rows.truncate(limit);
    rows
}

/// Revenue per day for the `days` days ending with `today`, oldest first.
#[must_use]
pub fn daily_sales(
    transactions: &[TransactionModel],
    today: NaiveDate,
    days: u32,
) -> Vec<(NaiveDate, f64)> {
    (0..days)
        .rev()
        .filter_map(|back| today.checked_sub_days(chrono::Days::new(u64::from(back))))
        .map(|day| {
            let revenue = transactions
                .iter()
                .filter(|t| t.date.date_naive() == day)
                .map(|t| t.amount)
                .sum();
            (day, revenue)
        })
        .collect()
}

/// Computes the full analytics summary from an already-loaded history.
#[must_use]
pub fn summarize(transactions: &[TransactionModel], products: &[ProductModel]) -> AnalyticsSummary {
    AnalyticsSummary {
        total_revenue: total_revenue(transactions),
        transaction_count: transactions.len(),
        top_product: top_product(transactions),
        top_category: top_category(transactions, products),
        category_sales: category_sales(transactions, products),
        monthly_revenue: monthly_revenue(transactions),
        top_products: top_products(transactions, products, DEFAULT_TOP_PRODUCTS),
    }
}

/// Loads transactions and products and computes the analytics summary.
pub async fn load_analytics(store: &dyn Store, session: &Session) -> Result<AnalyticsSummary> {
    debug!("Loading analytics for {}", session.username());
    let transactions = store.list_transactions().await?;
    let products = store.list_products().await?;
    Ok(summarize(&transactions, &products))
}
