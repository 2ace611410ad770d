//! Inventory business logic - product form validation, CRUD and projections.
//!
//! Any logged-in user may manage products. Stock set here is the opening or
//! corrected level; day-to-day stock movement goes through [`crate::core::ledger`].

use crate::{
    core::session::Session,
    entities::ProductModel,
    errors::{Error, Result},
    store::{NewProduct, ProductPatch, Store},
};
use tracing::{info, instrument};

/// Product fields as entered by the user, before validation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductForm {
    /// Product name
    pub name: String,
    /// Category
    pub category: String,
    /// Barcode, empty for none
    pub barcode: String,
    /// Units on hand
    pub stock: i64,
    /// Unit price
    pub price: f64,
    /// Unit cost
    pub cost: f64,
    /// Description
    pub description: String,
}

impl ProductForm {
    /// Validates and normalizes the form.
    ///
    /// Text fields are trimmed and an empty barcode becomes `None`.
    ///
    /// # Errors
    /// Returns [`Error::Validation`] if:
    /// - The name or category is empty
    /// - The stock is negative
    /// - The price or cost is not a positive number
    pub fn validate(&self) -> Result<NewProduct> {
        let name = self.name.trim();
        let category = self.category.trim();
        if name.is_empty() || category.is_empty() {
            return Err(Error::validation("Please fill all required fields"));
        }
        if self.stock < 0 {
            return Err(Error::validation("Please enter a valid stock quantity"));
        }
        if !self.price.is_finite() || self.price <= 0.0 {
            return Err(Error::validation("Please enter a valid price"));
        }
        if !self.cost.is_finite() || self.cost <= 0.0 {
            return Err(Error::validation("Please enter a valid cost"));
        }

        let barcode = self.barcode.trim();
        Ok(NewProduct {
            name: name.to_string(),
            category: category.to_string(),
            barcode: (!barcode.is_empty()).then(|| barcode.to_string()),
            stock: self.stock,
            price: self.price,
            cost: self.cost,
            description: self.description.trim().to_string(),
        })
    }
}

impl From<NewProduct> for ProductPatch {
    fn from(product: NewProduct) -> Self {
        Self {
            name: Some(product.name),
            category: Some(product.category),
            barcode: Some(product.barcode),
            stock: Some(product.stock),
            price: Some(product.price),
            cost: Some(product.cost),
            description: Some(product.description),
        }
    }
}

/// Validates the form and creates a product.
#[instrument(skip(store, session, form), fields(user = %session.username()))]
pub async fn create_product(
    store: &dyn Store,
    session: &Session,
    form: &ProductForm,
) -> Result<ProductModel> {
    let product = store.insert_product(form.validate()?).await?;
    info!("Product {} ({}) added", product.id, product.name);
    Ok(product)
}

/// Validates the form and overwrites an existing product with it, keeping its
/// id and creation time.
#[instrument(skip(store, session, form), fields(user = %session.username()))]
pub async fn update_product(
    store: &dyn Store,
    session: &Session,
    product_id: i64,
    form: &ProductForm,
) -> Result<ProductModel> {
    let patch = ProductPatch::from(form.validate()?);
    let product = store.update_product(product_id, patch).await?;
    info!("Product {} updated", product.id);
    Ok(product)
}

/// Deletes a product. Its past transactions are kept.
#[instrument(skip(store, session), fields(user = %session.username()))]
pub async fn delete_product(store: &dyn Store, session: &Session, product_id: i64) -> Result<()> {
    store.delete_product(product_id).await?;
    info!("Product {} deleted", product_id);
    Ok(())
}

/// All products, ordered by id.
pub async fn list_products(store: &dyn Store) -> Result<Vec<ProductModel>> {
    let mut products = store.list_products().await?;
    products.sort_by_key(|p| p.id);
    Ok(products)
}

/// One product by id.
///
/// # Errors
/// Returns [`Error::NotFound`] if no product has this id.
pub async fn get_product(store: &dyn Store, product_id: i64) -> Result<ProductModel> {
    store
        .get_product(product_id)
        .await?
        .ok_or(Error::NotFound {
            entity: "product",
            id: product_id,
        })
}

/// The first product (by id) carrying exactly this barcode.
pub async fn find_by_barcode(store: &dyn Store, barcode: &str) -> Result<Option<ProductModel>> {
    let barcode = barcode.trim();
    Ok(list_products(store)
        .await?
        .into_iter()
        .find(|p| p.barcode.as_deref() == Some(barcode)))
}

/// Filters products by a search query.
///
/// Name and category match case-insensitively; the barcode matches as a plain
/// substring. An empty query matches everything.
#[must_use]
pub fn search_products<'a>(products: &'a [ProductModel], query: &str) -> Vec<&'a ProductModel> {
    let needle = query.to_lowercase();
    products
        .iter()
        .filter(|p| {
            p.name.to_lowercase().contains(&needle)
                || p.category.to_lowercase().contains(&needle)
                || p.barcode.as_deref().is_some_and(|b| b.contains(query))
        })
        .collect()
}

/// Stock level relative to the low-stock threshold
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StockStatus {
    /// More than the threshold
    InStock,
    /// At or below the threshold, but not zero
    LowStock,
    /// Nothing left
    OutOfStock,
}

impl StockStatus {
    /// Classifies a stock level.
    #[must_use]
    pub const fn classify(stock: i64, threshold: i64) -> Self {
        if stock <= 0 {
            Self::OutOfStock
        } else if stock <= threshold {
            Self::LowStock
        } else {
            Self::InStock
        }
    }

    /// Human-readable label
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::InStock => "In Stock",
            Self::LowStock => "Low Stock",
            Self::OutOfStock => "Out of Stock",
        }
    }
}

impl std::fmt::Display for StockStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Products that can be sold right now (stock above zero).
#[must_use]
pub fn sellable_products(products: &[ProductModel]) -> Vec<&ProductModel> {
    products.iter().filter(|p| p.stock > 0).collect()
}

/// Suggested amount for a sale, rounded to cents.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn sale_total(price: f64, quantity: i64) -> f64 {
    (price * quantity as f64 * 100.0).round() / 100.0
}
