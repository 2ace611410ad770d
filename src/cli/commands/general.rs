//! Dashboard and analytics commands - read-only overviews any user can see.

use crate::{
    cli::{
        AppContext,
        commands::{money, write_transactions},
    },
    core::{analytics, dashboard},
    errors::Result,
};
use std::io::Write;

const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Prints the dashboard: headline numbers and the most recent sales.
pub async fn dashboard(ctx: &AppContext, out: &mut dyn Write) -> Result<()> {
    let stats = dashboard::dashboard_stats(ctx.store(), &ctx.session).await?;
    let recent =
        dashboard::recent_transactions(ctx.store(), dashboard::RECENT_TRANSACTIONS).await?;

    writeln!(out, "{} - logged in as {}", stats.store_name, ctx.session.name())?;
    writeln!(out, "Total products:     {}", stats.total_products)?;
    writeln!(out, "Total transactions: {}", stats.total_transactions)?;
    writeln!(out, "Low stock items:    {}", stats.low_stock_items)?;
    writeln!(out, "Total revenue:      {}", money(stats.total_revenue))?;
    writeln!(out)?;
    writeln!(out, "Recent transactions")?;
    write_transactions(out, &recent.iter().collect::<Vec<_>>())?;
    Ok(())
}

/// Prints the analytics summary and the daily sales series.
pub async fn analytics(ctx: &AppContext, days: u32, out: &mut dyn Write) -> Result<()> {
    let summary = analytics::load_analytics(ctx.store(), &ctx.session).await?;
    let transactions = ctx.store().list_transactions().await?;
    let today = chrono::Utc::now().date_naive();

    writeln!(out, "Total revenue:      {}", money(summary.total_revenue))?;
    writeln!(out, "Total transactions: {}", summary.transaction_count)?;
    match &summary.top_product {
        Some((name, units)) => writeln!(out, "Top product:        {name} ({units} units sold)")?,
        None => writeln!(out, "Top product:        - (no sales data)")?,
    }
    match &summary.top_category {
        Some((name, revenue)) => writeln!(
            out,
            "Top category:       {name} ({} revenue)",
            money(*revenue)
        )?,
        None => writeln!(out, "Top category:       - (no category data)")?,
    }

    writeln!(out, "\nSales by category")?;
    for (category, revenue) in &summary.category_sales {
        writeln!(out, "  {category:<20} {:>12}", money(*revenue))?;
    }

    writeln!(out, "\nMonthly revenue")?;
    for (month, revenue) in MONTHS.iter().zip(summary.monthly_revenue) {
        writeln!(out, "  {month} {:>12}", money(revenue))?;
    }

    writeln!(out, "\nDaily sales (last {days} days)")?;
    for (day, revenue) in analytics::daily_sales(&transactions, today, days) {
        writeln!(out, "  {} {:>12}", day.format("%a %b %d"), money(revenue))?;
    }

    writeln!(out, "\nTop products")?;
    if summary.top_products.is_empty() {
        writeln!(out, "  No sales data available")?;
    }
    for row in &summary.top_products {
        writeln!(
            out,
            "  {:<28} {:<14} {:>6} {:>12} {:>12}",
            row.name,
            row.category,
            row.quantity,
            money(row.revenue),
            money(row.profit)
        )?;
    }
    Ok(())
}
