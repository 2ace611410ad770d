//! First-run seeding of an empty store.
//!
//! Each collection is seeded only while it is empty, so running this on every
//! start is harmless.

use crate::{
    config::{AppConfig, ProductSeedConfig},
    core::inventory::ProductForm,
    errors::{Error, Result},
    store::{NewProduct, NewUser, SettingsPatch, Store},
};
use tracing::info;

/// What [`seed_store`] added
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedReport {
    /// Accounts created
    pub users: usize,
    /// Products created
    pub products: usize,
}

/// Runs a `[[products]]` entry through the same checks as the product form.
///
/// Every entry is checked before anything is written, so a bad entry seeds nothing.
fn validate_seed_product(index: usize, product: &ProductSeedConfig) -> Result<NewProduct> {
    let form = ProductForm {
        name: product.name.clone(),
        category: product.category.clone(),
        barcode: product.barcode.clone().unwrap_or_default(),
        stock: product.stock,
        price: product.price,
        cost: product.cost,
        description: product.description.clone(),
    };
    form.validate().map_err(|e| Error::Config {
        message: format!(
            "[[products]] entry {} ({:?}) is invalid: {e}",
            index + 1,
            product.name
        ),
    })
}

/// Seeds users from `[[credentials]]`, products from `[[products]]` and writes
/// the settings row if none exists yet.
pub async fn seed_store(store: &dyn Store, config: &AppConfig) -> Result<SeedReport> {
    let mut report = SeedReport::default();
    let products = config
        .products
        .iter()
        .enumerate()
        .map(|(index, product)| validate_seed_product(index, product))
        .collect::<Result<Vec<_>>>()?;

    if store.list_users().await?.is_empty() {
        for credential in &config.credentials {
            let name = if credential.name.is_empty() {
                credential.username.clone()
            } else {
                credential.name.clone()
            };
            store
                .insert_user(NewUser {
                    username: credential.username.clone(),
                    password: credential.password.clone(),
                    name,
                    role: credential.role,
                })
                .await?;
            report.users += 1;
        }
    }

    if store.list_products().await?.is_empty() {
        for product in products {
            store.insert_product(product).await?;
            report.products += 1;
        }
    }

    // An empty patch persists the defaults without touching stored values
    store.update_settings(SettingsPatch::default()).await?;

    if report != SeedReport::default() {
        info!(
            "Seeded {} users and {} products",
            report.users, report.products
        );
    }
    Ok(report)
}
