//! REST backend - a json-server reachable over HTTP.
//!
//! Collections live at `/users`, `/products` and `/transactions`, single records
//! at `/{collection}/{id}` and the settings singleton at `/settings/1`. json-server
//! only replaces whole records, so every update is GET, merge, PUT. New records
//! get the next free numeric id from the client.
//!
//! Nothing here is atomic: a sale writes the product and then the transaction as
//! two separate requests, and a failure between them is surfaced as-is.

use crate::{
    core::ledger,
    entities::{ProductModel, SettingsModel, TransactionModel, UserModel, settings::SETTINGS_ID},
    errors::{Error, Result},
    store::{NewProduct, NewUser, ProductPatch, SaleRequest, SettingsPatch, Snapshot, Store, UserPatch},
};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Serialize, de::DeserializeOwned};
use tracing::{debug, info, instrument, warn};

const USERS: &str = "users";
const PRODUCTS: &str = "products";
const TRANSACTIONS: &str = "transactions";
const SETTINGS: &str = "settings";

/// Store backed by a json-server instance
#[derive(Debug, Clone)]
pub struct RestStore {
    client: Client,
    base_url: String,
}

impl RestStore {
    /// Builds a client for `base_url` with a 30 second request timeout.
    ///
    /// No request is made until the first operation.
    pub fn new(base_url: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Base URL without a trailing slash
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    async fn handle_response<T: DeserializeOwned>(
        response: reqwest::Response,
        path: &str,
    ) -> Result<T> {
        let status = response.status();
        if !status.is_success() {
            return Err(Error::Storage {
                status: status.as_u16(),
                endpoint: format!("/{path}"),
            });
        }
        Ok(response.json().await?)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        debug!("GET /{}", path);
        let response = self.client.get(self.url(path)).send().await?;
        Self::handle_response(response, path).await
    }

    async fn get_optional<T: DeserializeOwned>(&self, path: &str) -> Result<Option<T>> {
        debug!("GET /{}", path);
        let response = self.client.get(self.url(path)).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        Self::handle_response(response, path).await.map(Some)
    }

    async fn post_json<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        debug!("POST /{}", path);
        let response = self.client.post(self.url(path)).json(body).send().await?;
        Self::handle_response(response, path).await
    }

    async fn put_json<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        debug!("PUT /{}", path);
        let response = self.client.put(self.url(path)).json(body).send().await?;
        Self::handle_response(response, path).await
    }

    /// Deletes a record; `Ok(false)` if it did not exist.
    async fn delete_path(&self, path: &str) -> Result<bool> {
        debug!("DELETE /{}", path);
        let response = self.client.delete(self.url(path)).send().await?;
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(false);
        }
        if !status.is_success() {
            return Err(Error::Storage {
                status: status.as_u16(),
                endpoint: format!("/{path}"),
            });
        }
        Ok(true)
    }

    async fn next_id(&self, collection: &str) -> Result<i64> {
        let records: Vec<serde_json::Value> = self.get_json(collection).await?;
        Ok(next_id(records.iter().filter_map(|r| r["id"].as_i64())))
    }

    /// GET, merge `patch` onto the stored record, PUT the result.
    async fn merge_update<T: DeserializeOwned, P: Serialize + Sync>(
        &self,
        collection: &str,
        entity: &'static str,
        id: i64,
        patch: &P,
    ) -> Result<T> {
        let path = format!("{collection}/{id}");
        let current: serde_json::Value = self
            .get_optional(&path)
            .await?
            .ok_or(Error::NotFound { entity, id })?;
        let merged = merge_json(current, serde_json::to_value(patch)?);
        self.put_json(&path, &merged).await
    }

    async fn delete_record(&self, collection: &str, entity: &'static str, id: i64) -> Result<()> {
        if self.delete_path(&format!("{collection}/{id}")).await? {
            Ok(())
        } else {
            Err(Error::NotFound { entity, id })
        }
    }

    async fn ensure_username_free(&self, username: &str, except_id: Option<i64>) -> Result<()> {
        let taken = self
            .list_users()
            .await?
            .iter()
            .any(|u| u.username == username && Some(u.id) != except_id);
        if taken {
            return Err(Error::DuplicateUsername {
                username: username.to_string(),
            });
        }
        Ok(())
    }

    async fn clear_collection(&self, collection: &str) -> Result<()> {
        let records: Vec<serde_json::Value> = self.get_json(collection).await?;
        for id in records.iter().filter_map(|r| r["id"].as_i64()) {
            self.delete_path(&format!("{collection}/{id}")).await?;
        }
        Ok(())
    }

    async fn write_settings(&self, settings: &SettingsModel) -> Result<SettingsModel> {
        let path = format!("{SETTINGS}/{SETTINGS_ID}");
        match self.put_json(&path, settings).await {
            Err(Error::Storage { status: 404, .. }) => {
                debug!("No settings record yet, creating it");
                self.post_json(SETTINGS, settings).await
            }
            other => other,
        }
    }
}

/// One past the highest existing id, starting at 1.
fn next_id(ids: impl Iterator<Item = i64>) -> i64 {
    ids.max().unwrap_or(0) + 1
}

/// Shallow merge: top-level keys of `patch` overwrite those of `record`.
fn merge_json(mut record: serde_json::Value, patch: serde_json::Value) -> serde_json::Value {
    if let (Some(target), serde_json::Value::Object(fields)) = (record.as_object_mut(), patch) {
        target.extend(fields);
    }
    record
}

#[async_trait]
impl Store for RestStore {
    fn backend_name(&self) -> &'static str {
        "rest"
    }

    async fn list_users(&self) -> Result<Vec<UserModel>> {
        self.get_json(USERS).await
    }

    async fn get_user(&self, id: i64) -> Result<Option<UserModel>> {
        self.get_optional(&format!("{USERS}/{id}")).await
    }

    #[instrument(skip(self, new_user), fields(username = %new_user.username))]
    async fn insert_user(&self, new_user: NewUser) -> Result<UserModel> {
        self.ensure_username_free(&new_user.username, None).await?;
        let user = UserModel {
            id: self.next_id(USERS).await?,
            username: new_user.username,
            password: new_user.password,
            name: new_user.name,
            role: new_user.role,
            created: chrono::Utc::now(),
        };
        self.post_json(USERS, &user).await
    }

    #[instrument(skip(self, patch))]
    async fn update_user(&self, id: i64, patch: UserPatch) -> Result<UserModel> {
        if let Some(username) = &patch.username {
            self.ensure_username_free(username, Some(id)).await?;
        }
        self.merge_update(USERS, "user", id, &patch).await
    }

    #[instrument(skip(self))]
    async fn delete_user(&self, id: i64) -> Result<()> {
        self.delete_record(USERS, "user", id).await
    }

    async fn list_products(&self) -> Result<Vec<ProductModel>> {
        self.get_json(PRODUCTS).await
    }

    async fn get_product(&self, id: i64) -> Result<Option<ProductModel>> {
        self.get_optional(&format!("{PRODUCTS}/{id}")).await
    }

    #[instrument(skip(self, new_product), fields(name = %new_product.name))]
    async fn insert_product(&self, new_product: NewProduct) -> Result<ProductModel> {
        let product = ProductModel {
            id: self.next_id(PRODUCTS).await?,
            name: new_product.name,
            category: new_product.category,
            barcode: new_product.barcode,
            stock: new_product.stock,
            price: new_product.price,
            cost: new_product.cost,
            description: new_product.description,
            created: chrono::Utc::now(),
        };
        self.post_json(PRODUCTS, &product).await
    }

    #[instrument(skip(self, patch))]
    async fn update_product(&self, id: i64, patch: ProductPatch) -> Result<ProductModel> {
        self.merge_update(PRODUCTS, "product", id, &patch).await
    }

    #[instrument(skip(self))]
    async fn delete_product(&self, id: i64) -> Result<()> {
        self.delete_record(PRODUCTS, "product", id).await
    }

    async fn list_transactions(&self) -> Result<Vec<TransactionModel>> {
        self.get_json(TRANSACTIONS).await
    }

    async fn get_transaction(&self, id: i64) -> Result<Option<TransactionModel>> {
        self.get_optional(&format!("{TRANSACTIONS}/{id}")).await
    }

    async fn settings(&self) -> Result<SettingsModel> {
        match self
            .get_optional::<SettingsModel>(&format!("{SETTINGS}/{SETTINGS_ID}"))
            .await
        {
            Ok(Some(settings)) => Ok(settings),
            Ok(None) => Ok(SettingsModel::default()),
            Err(e) => {
                warn!("Falling back to default settings: {}", e);
                Ok(SettingsModel::default())
            }
        }
    }

    #[instrument(skip(self, patch))]
    async fn update_settings(&self, patch: SettingsPatch) -> Result<SettingsModel> {
        let mut settings = self.settings().await?;
        patch.apply(&mut settings);
        settings.id = SETTINGS_ID;
        self.write_settings(&settings).await
    }

    #[instrument(skip(self, sale), fields(product_id = sale.product_id, quantity = sale.quantity))]
    async fn record_sale(&self, sale: SaleRequest) -> Result<TransactionModel> {
        let product = self
            .get_product(sale.product_id)
            .await?
            .ok_or(Error::NotFound {
                entity: "product",
                id: sale.product_id,
            })?;
        let remaining = ledger::remaining_stock(&product, sale.quantity)?;

        let record = TransactionModel {
            id: self.next_id(TRANSACTIONS).await?,
            product_id: product.id,
            product_name: product.name.clone(),
            quantity: sale.quantity,
            amount: sale.amount,
            date: sale.date,
            employee: sale.employee,
        };

        let path = format!("{PRODUCTS}/{}", product.id);
        let _: ProductModel = self
            .put_json(
                &path,
                &ProductModel {
                    stock: remaining,
                    ..product
                },
            )
            .await?;
        let record: TransactionModel = self.post_json(TRANSACTIONS, &record).await?;
        info!("Recorded sale {}", record.id);
        Ok(record)
    }

    #[instrument(skip(self))]
    async fn reverse_sale(&self, transaction_id: i64) -> Result<TransactionModel> {
        let record = self
            .get_transaction(transaction_id)
            .await?
            .ok_or(Error::NotFound {
                entity: "transaction",
                id: transaction_id,
            })?;

        if let Some(product) = self.get_product(record.product_id).await? {
            let stock = ledger::restored_stock(&product, record.quantity);
            let path = format!("{PRODUCTS}/{}", product.id);
            let _: ProductModel = self
                .put_json(&path, &ProductModel { stock, ..product })
                .await?;
        } else {
            debug!(
                "Product {} no longer exists, transaction removed without restock",
                record.product_id
            );
        }

        self.delete_path(&format!("{TRANSACTIONS}/{}", record.id))
            .await?;
        info!("Reversed sale {}", record.id);
        Ok(record)
    }

    #[instrument(skip_all)]
    async fn replace_all(&self, snapshot: &Snapshot) -> Result<()> {
        self.clear_collection(TRANSACTIONS).await?;
        self.clear_collection(PRODUCTS).await?;
        self.clear_collection(USERS).await?;

        for user in &snapshot.users {
            let _: UserModel = self.post_json(USERS, user).await?;
        }
        for product in &snapshot.products {
            let _: ProductModel = self.post_json(PRODUCTS, product).await?;
        }
        for record in &snapshot.transactions {
            let _: TransactionModel = self.post_json(TRANSACTIONS, record).await?;
        }
        let settings = SettingsModel {
            id: SETTINGS_ID,
            ..snapshot.settings.clone()
        };
        self.write_settings(&settings).await?;

        info!(
            "Replaced store contents: {} users, {} products, {} transactions",
            snapshot.users.len(),
            snapshot.products.len(),
            snapshot.transactions.len()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_next_id() {
        assert_eq!(next_id(std::iter::empty()), 1);
        assert_eq!(next_id([3, 1, 7].into_iter()), 8);
    }

    #[test]
    fn test_merge_json_overwrites_top_level_keys() {
        let record = json!({"id": 1, "name": "iPhone 14 Pro", "stock": 15, "barcode": "123"});
        let patch = json!({"stock": 14, "barcode": null});
        let merged = merge_json(record, patch);
        assert_eq!(
            merged,
            json!({"id": 1, "name": "iPhone 14 Pro", "stock": 14, "barcode": null})
        );
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() -> Result<()> {
        let store = RestStore::new("http://localhost:3000/")?;
        assert_eq!(store.base_url(), "http://localhost:3000");
        assert_eq!(store.url("products/1"), "http://localhost:3000/products/1");
        Ok(())
    }
}
