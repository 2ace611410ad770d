//! Product commands - `product list`, `search`, `show`, `barcode`, `add`, `update`, `delete`.

use crate::{
    cli::{
        AppContext,
        commands::{money, write_products},
    },
    core::inventory::{self, ProductForm, StockStatus},
    errors::Result,
};
use clap::{Args, Subcommand};
use std::io::Write;

/// Product subcommands
#[derive(Debug, Subcommand)]
pub enum ProductCommand {
    /// List all products with their stock status
    List,
    /// Search products by name, category or barcode
    Search {
        /// Text to look for
        query: String,
    },
    /// Show one product
    Show {
        /// Product id
        id: i64,
    },
    /// Look up a product by barcode
    Barcode {
        /// Exact barcode
        code: String,
    },
    /// Add a product
    Add(ProductFields),
    /// Update a product; omitted fields keep their current value
    Update {
        /// Product id
        id: i64,
        #[command(flatten)]
        fields: ProductUpdateFields,
    },
    /// Delete a product (its sales history is kept)
    Delete {
        /// Product id
        id: i64,
    },
}

/// Fields for a new product
#[derive(Debug, Args)]
pub struct ProductFields {
    /// Product name
    #[arg(long)]
    pub name: String,
    /// Category
    #[arg(long)]
    pub category: String,
    /// Barcode
    #[arg(long, default_value = "")]
    pub barcode: String,
    /// Units on hand
    #[arg(long)]
    pub stock: i64,
    /// Unit price
    #[arg(long)]
    pub price: f64,
    /// Unit cost
    #[arg(long)]
    pub cost: f64,
    /// Description
    #[arg(long, default_value = "")]
    pub description: String,
}

impl From<ProductFields> for ProductForm {
    fn from(fields: ProductFields) -> Self {
        Self {
            name: fields.name,
            category: fields.category,
            barcode: fields.barcode,
            stock: fields.stock,
            price: fields.price,
            cost: fields.cost,
            description: fields.description,
        }
    }
}

/// Fields to change on an existing product
#[derive(Debug, Args)]
pub struct ProductUpdateFields {
    /// Product name
    #[arg(long)]
    pub name: Option<String>,
    /// Category
    #[arg(long)]
    pub category: Option<String>,
    /// Barcode (empty string clears it)
    #[arg(long)]
    pub barcode: Option<String>,
    /// Units on hand
    #[arg(long)]
    pub stock: Option<i64>,
    /// Unit price
    #[arg(long)]
    pub price: Option<f64>,
    /// Unit cost
    #[arg(long)]
    pub cost: Option<f64>,
    /// Description
    #[arg(long)]
    pub description: Option<String>,
}

impl ProductUpdateFields {
    /// Fills the form from `current`, overridden by the fields given.
    fn into_form(self, current: &crate::entities::ProductModel) -> ProductForm {
        ProductForm {
            name: self.name.unwrap_or_else(|| current.name.clone()),
            category: self.category.unwrap_or_else(|| current.category.clone()),
            barcode: self
                .barcode
                .unwrap_or_else(|| current.barcode.clone().unwrap_or_default()),
            stock: self.stock.unwrap_or(current.stock),
            price: self.price.unwrap_or(current.price),
            cost: self.cost.unwrap_or(current.cost),
            description: self
                .description
                .unwrap_or_else(|| current.description.clone()),
        }
    }
}

/// Runs a product subcommand.
pub async fn handle(ctx: &AppContext, command: ProductCommand, out: &mut dyn Write) -> Result<()> {
    let store = ctx.store();
    match command {
        ProductCommand::List => {
            let threshold = store.settings().await?.low_stock_threshold;
            let products = inventory::list_products(store).await?;
            write_products(out, &products.iter().collect::<Vec<_>>(), threshold)?;
        }
        ProductCommand::Search { query } => {
            let threshold = store.settings().await?.low_stock_threshold;
            let products = inventory::list_products(store).await?;
            let matches = inventory::search_products(&products, &query);
            if matches.is_empty() {
                writeln!(out, "No products match your search")?;
            } else {
                write_products(out, &matches, threshold)?;
            }
        }
        ProductCommand::Show { id } => {
            let product = inventory::get_product(store, id).await?;
            let threshold = store.settings().await?.low_stock_threshold;
            write_details(out, &product, StockStatus::classify(product.stock, threshold))?;
        }
        ProductCommand::Barcode { code } => match inventory::find_by_barcode(store, &code).await? {
            Some(product) => {
                let threshold = store.settings().await?.low_stock_threshold;
                write_details(out, &product, StockStatus::classify(product.stock, threshold))?;
            }
            None => writeln!(out, "No product with barcode {code}")?,
        },
        ProductCommand::Add(fields) => {
            let product =
                inventory::create_product(store, &ctx.session, &ProductForm::from(fields)).await?;
            writeln!(out, "✅ Product added: #{} {}", product.id, product.name)?;
        }
        ProductCommand::Update { id, fields } => {
            let current = inventory::get_product(store, id).await?;
            let form = fields.into_form(&current);
            let product = inventory::update_product(store, &ctx.session, id, &form).await?;
            writeln!(out, "✅ Product updated: #{} {}", product.id, product.name)?;
        }
        ProductCommand::Delete { id } => {
            inventory::delete_product(store, &ctx.session, id).await?;
            writeln!(out, "✅ Product #{id} deleted")?;
        }
    }
    Ok(())
}

fn write_details(
    out: &mut dyn Write,
    product: &crate::entities::ProductModel,
    status: StockStatus,
) -> std::io::Result<()> {
    writeln!(out, "#{} {}", product.id, product.name)?;
    writeln!(out, "  Category:    {}", product.category)?;
    writeln!(
        out,
        "  Barcode:     {}",
        product.barcode.as_deref().unwrap_or("-")
    )?;
    writeln!(out, "  Stock:       {} ({status})", product.stock)?;
    writeln!(out, "  Price:       {}", money(product.price))?;
    writeln!(out, "  Cost:        {}", money(product.cost))?;
    if !product.description.is_empty() {
        writeln!(out, "  Description: {}", product.description)?;
    }
    Ok(())
}
