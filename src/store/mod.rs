//! Storage adapter - one async interface over two interchangeable backends.
//!
//! [`EmbeddedStore`] keeps everything in a local `SQLite` file through `SeaORM`;
//! [`RestStore`] talks to a json-server over HTTP. Business logic in
//! [`crate::core`] only ever sees `&dyn Store`, so both backends behave the same
//! from the caller's point of view apart from sale atomicity (see
//! [`Store::record_sale`]).

pub mod embedded;
pub mod records;
pub mod rest;

pub use embedded::EmbeddedStore;
pub use records::{
    NewProduct, NewUser, ProductPatch, SaleRequest, SettingsPatch, Snapshot, UserPatch,
};
pub use rest::RestStore;

use crate::config::{AppConfig, StorageBackend, database};
use crate::entities::{ProductModel, SettingsModel, TransactionModel, UserModel};
use crate::errors::Result;
use async_trait::async_trait;
use tracing::info;

/// Persistence operations shared by every backend.
///
/// Lookups return `Ok(None)` for a missing id; updates and deletes of a missing
/// id return [`crate::errors::Error::NotFound`]. Transactions have no raw write
/// methods: they are created and removed only through the two ledger
/// primitives so that stock always moves with them.
#[async_trait]
pub trait Store: Send + Sync {
    /// Short backend label for logs
    fn backend_name(&self) -> &'static str;

    /// All user accounts
    async fn list_users(&self) -> Result<Vec<UserModel>>;
    /// One user account by id
    async fn get_user(&self, id: i64) -> Result<Option<UserModel>>;
    /// Creates an account; fails with `DuplicateUsername` if the name is taken
    async fn insert_user(&self, user: NewUser) -> Result<UserModel>;
    /// Merges `patch` into an account; a new username must not be taken
    async fn update_user(&self, id: i64, patch: UserPatch) -> Result<UserModel>;
    /// Removes an account
    async fn delete_user(&self, id: i64) -> Result<()>;

    /// All products
    async fn list_products(&self) -> Result<Vec<ProductModel>>;
    /// One product by id
    async fn get_product(&self, id: i64) -> Result<Option<ProductModel>>;
    /// Creates a product
    async fn insert_product(&self, product: NewProduct) -> Result<ProductModel>;
    /// Merges `patch` into a product
    async fn update_product(&self, id: i64, patch: ProductPatch) -> Result<ProductModel>;
    /// Removes a product; its transactions are kept
    async fn delete_product(&self, id: i64) -> Result<()>;

    /// All transactions, in storage order
    async fn list_transactions(&self) -> Result<Vec<TransactionModel>>;
    /// One transaction by id
    async fn get_transaction(&self, id: i64) -> Result<Option<TransactionModel>>;

    /// The settings singleton, or the defaults if none is stored
    async fn settings(&self) -> Result<SettingsModel>;
    /// Merges `patch` into the settings singleton, creating it if needed
    async fn update_settings(&self, patch: SettingsPatch) -> Result<SettingsModel>;

    /// Decrements product stock and stores the matching transaction.
    ///
    /// The embedded backend does both in one database transaction; the REST
    /// backend writes the product first and the transaction second.
    async fn record_sale(&self, sale: SaleRequest) -> Result<TransactionModel>;
    /// Removes a transaction and gives its quantity back to the product, if the
    /// product still exists. Returns the removed transaction.
    async fn reverse_sale(&self, transaction_id: i64) -> Result<TransactionModel>;

    /// Replaces all four collections with the snapshot contents, ids included.
    async fn replace_all(&self, snapshot: &Snapshot) -> Result<()>;

    /// Reads all four collections.
    async fn snapshot(&self) -> Result<Snapshot> {
        Ok(Snapshot {
            users: self.list_users().await?,
            products: self.list_products().await?,
            transactions: self.list_transactions().await?,
            settings: self.settings().await?,
        })
    }
}

/// Opens the backend selected in `[storage]`.
///
/// The embedded backend connects to its database and makes sure all tables
/// exist before returning.
pub async fn open_store(config: &AppConfig) -> Result<Box<dyn Store>> {
    match config.storage.backend {
        StorageBackend::Embedded => {
            let url = database::get_database_url(&config.storage);
            let db = database::create_connection(&url).await?;
            database::create_tables(&db).await?;
            info!("Using embedded store");
            Ok(Box::new(EmbeddedStore::new(db)))
        }
        StorageBackend::Rest => {
            let url = config.storage.resolved_rest_url();
            let store = RestStore::new(&url)?;
            info!("Using REST store at {}", store.base_url());
            Ok(Box::new(store))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StorageConfig;

    #[tokio::test]
    async fn test_open_embedded_store_in_memory() -> Result<()> {
        let config = AppConfig {
            storage: StorageConfig {
                database_url: "sqlite::memory:".to_string(),
                ..StorageConfig::default()
            },
            ..AppConfig::default()
        };
        // DATABASE_URL would override the in-memory URL
        if std::env::var("DATABASE_URL").is_ok() {
            return Ok(());
        }

        let store = open_store(&config).await?;
        assert_eq!(store.backend_name(), "embedded");
        assert!(store.list_products().await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_open_rest_store_does_not_connect_eagerly() -> Result<()> {
        let config = AppConfig {
            storage: StorageConfig {
                backend: StorageBackend::Rest,
                rest_url: "http://127.0.0.1:9".to_string(),
                ..StorageConfig::default()
            },
            ..AppConfig::default()
        };
        let store = open_store(&config).await?;
        assert_eq!(store.backend_name(), "rest");
        Ok(())
    }
}
