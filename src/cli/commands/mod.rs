//! Command implementations organized by area.
//!
//! Handlers print plain text to the writer they are given; errors propagate to
//! the caller, which reports them and exits non-zero.

/// Admin panel commands
pub mod admin;

/// Dashboard and analytics commands
pub mod general;

/// Product management commands
pub mod product;

/// Sale commands
pub mod sale;

use crate::entities::{ProductModel, TransactionModel};

/// Formats an amount as dollars with two decimals.
#[must_use]
pub fn money(amount: f64) -> String {
    format!("${amount:.2}")
}

/// Writes one line per transaction.
pub(crate) fn write_transactions(
    out: &mut dyn std::io::Write,
    transactions: &[&TransactionModel],
) -> std::io::Result<()> {
    if transactions.is_empty() {
        return writeln!(out, "No transactions found");
    }
    for t in transactions {
        writeln!(
            out,
            "#{:<5} {:<28} x{:<4} {:>12}  {}  {}",
            t.id,
            t.product_name,
            t.quantity,
            money(t.amount),
            t.date.format("%Y-%m-%d %H:%M"),
            t.employee
        )?;
    }
    Ok(())
}

/// Writes one line per product with its stock status.
pub(crate) fn write_products(
    out: &mut dyn std::io::Write,
    products: &[&ProductModel],
    low_stock_threshold: i64,
) -> std::io::Result<()> {
    if products.is_empty() {
        return writeln!(out, "No products found");
    }
    for p in products {
        let status = crate::core::inventory::StockStatus::classify(p.stock, low_stock_threshold);
        writeln!(
            out,
            "#{:<5} {:<28} {:<14} {:>6} {:>12}  {:<13} {}",
            p.id,
            p.name,
            p.category,
            p.stock,
            money(p.price),
            status,
            p.barcode.as_deref().unwrap_or("-")
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_money() {
        assert_eq!(money(999.99), "$999.99");
        assert_eq!(money(25.0), "$25.00");
    }
}
