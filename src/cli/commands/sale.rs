//! Sale commands - `sale list`, `products`, `search`, `record`, `delete`.

use crate::{
    cli::{
        AppContext,
        commands::{money, write_products, write_transactions},
    },
    core::{inventory, sales},
    errors::Result,
};
use clap::Subcommand;
use std::io::Write;

/// Sale subcommands
#[derive(Debug, Subcommand)]
pub enum SaleCommand {
    /// List sales, newest first
    List {
        /// Show at most this many
        #[arg(long)]
        limit: Option<usize>,
    },
    /// List products that are in stock and can be sold
    Products,
    /// Search sales by product name, employee or id
    Search {
        /// Text to look for
        query: String,
    },
    /// Record a sale
    Record {
        /// Product id
        #[arg(long)]
        product: i64,
        /// Units sold
        #[arg(long, default_value_t = 1)]
        quantity: i64,
        /// Amount charged; defaults to price times quantity
        #[arg(long)]
        amount: Option<f64>,
    },
    /// Delete a sale and restore its stock (admin only)
    Delete {
        /// Transaction id
        id: i64,
    },
}

/// Runs a sale subcommand.
pub async fn handle(ctx: &AppContext, command: SaleCommand, out: &mut dyn Write) -> Result<()> {
    let store = ctx.store();
    match command {
        SaleCommand::List { limit } => {
            let mut transactions = sales::list_transactions(store).await?;
            if let Some(limit) = limit {
                transactions.truncate(limit);
            }
            write_transactions(out, &transactions.iter().collect::<Vec<_>>())?;
        }
        SaleCommand::Products => {
            let products = inventory::list_products(store).await?;
            let threshold = store.settings().await?.low_stock_threshold;
            write_products(out, &inventory::sellable_products(&products), threshold)?;
        }
        SaleCommand::Search { query } => {
            let transactions = sales::list_transactions(store).await?;
            let matches = sales::search_transactions(&transactions, &query);
            if matches.is_empty() {
                writeln!(out, "No transactions match your search")?;
            } else {
                write_transactions(out, &matches)?;
            }
        }
        SaleCommand::Record {
            product,
            quantity,
            amount,
        } => {
            let amount = match amount {
                Some(amount) => amount,
                None => {
                    let product = inventory::get_product(store, product).await?;
                    inventory::sale_total(product.price, quantity)
                }
            };
            let record = sales::record_sale(store, &ctx.session, product, quantity, amount).await?;
            writeln!(
                out,
                "✅ Sale #{} recorded: {} x{} for {}",
                record.id,
                record.product_name,
                record.quantity,
                money(record.amount)
            )?;
        }
        SaleCommand::Delete { id } => {
            let record = sales::delete_transaction(store, &ctx.session, id).await?;
            writeln!(
                out,
                "✅ Sale #{} deleted, {} unit(s) of {} restocked",
                record.id, record.quantity, record.product_name
            )?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::config::AppConfig;
    use crate::errors::Error;
    use crate::test_utils::*;

    #[tokio::test]
    async fn test_record_defaults_amount_to_price_times_quantity() -> Result<()> {
        let store = setup_test_store().await?;
        let product = create_test_product(&store, "iPhone 14 Pro", 15).await?;
        let ctx = AppContext::new(Box::new(store), AppConfig::default(), employee_session());

        let mut out = Vec::<u8>::new();
        handle(
            &ctx,
            SaleCommand::Record {
                product: product.id,
                quantity: 2,
                amount: None,
            },
            &mut out,
        )
        .await?;

        let transactions = ctx.store().list_transactions().await?;
        assert_eq!(transactions[0].amount, 1999.98);
        assert!(String::from_utf8(out).unwrap().contains("$1999.98"));
        Ok(())
    }

    #[tokio::test]
    async fn test_products_lists_only_items_in_stock() -> Result<()> {
        let store = setup_test_store().await?;
        create_test_product(&store, "iPhone 14 Pro", 15).await?;
        create_test_product(&store, "MacBook Pro", 0).await?;
        let ctx = AppContext::new(Box::new(store), AppConfig::default(), employee_session());

        let mut out = Vec::<u8>::new();
        handle(&ctx, SaleCommand::Products, &mut out).await?;
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("iPhone 14 Pro"));
        assert!(!text.contains("MacBook Pro"));
        Ok(())
    }

    #[tokio::test]
    async fn test_employee_delete_is_denied() -> Result<()> {
        let store = setup_test_store().await?;
        let ctx = AppContext::new(Box::new(store), AppConfig::default(), employee_session());
        let result = handle(&ctx, SaleCommand::Delete { id: 1 }, &mut Vec::<u8>::new()).await;
        assert!(matches!(result, Err(Error::PermissionDenied { .. })));
        Ok(())
    }
}
