//! Embedded backend - `SQLite` through `SeaORM`, no network.
//!
//! This is the backend with real transactional guarantees: a sale decrements
//! stock with a guarded `UPDATE ... WHERE stock >= quantity` and inserts its
//! transaction inside one database transaction, so stock can never go negative
//! even with several writers on the same file.

use crate::{
    core::ledger,
    entities::{
        Product, ProductColumn, ProductModel, Settings, SettingsModel, Transaction,
        TransactionColumn, TransactionModel, User, UserColumn, UserModel, product,
        settings::SETTINGS_ID, transaction, user,
    },
    errors::{Error, Result},
    store::{NewProduct, NewUser, ProductPatch, SaleRequest, SettingsPatch, Snapshot, Store, UserPatch},
};
use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, DatabaseConnection, IntoActiveModel, QueryOrder, Set, TransactionTrait,
    prelude::*, sea_query::Expr,
};
use tracing::{debug, info, instrument, warn};

/// Store backed by a `SeaORM` database connection
#[derive(Debug)]
pub struct EmbeddedStore {
    db: DatabaseConnection,
}

impl EmbeddedStore {
    /// Wraps an open connection whose tables already exist.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn ensure_username_free(&self, username: &str, except_id: Option<i64>) -> Result<()> {
        let mut query = User::find().filter(UserColumn::Username.eq(username));
        if let Some(id) = except_id {
            query = query.filter(UserColumn::Id.ne(id));
        }
        if query.one(&self.db).await?.is_some() {
            return Err(Error::DuplicateUsername {
                username: username.to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl Store for EmbeddedStore {
    fn backend_name(&self) -> &'static str {
        "embedded"
    }

    async fn list_users(&self) -> Result<Vec<UserModel>> {
        User::find()
            .order_by_asc(UserColumn::Id)
            .all(&self.db)
            .await
            .map_err(Into::into)
    }

    async fn get_user(&self, id: i64) -> Result<Option<UserModel>> {
        User::find_by_id(id).one(&self.db).await.map_err(Into::into)
    }

    #[instrument(skip(self, new_user), fields(username = %new_user.username))]
    async fn insert_user(&self, new_user: NewUser) -> Result<UserModel> {
        self.ensure_username_free(&new_user.username, None).await?;

        let user = user::ActiveModel {
            username: Set(new_user.username),
            password: Set(new_user.password),
            name: Set(new_user.name),
            role: Set(new_user.role),
            created: Set(chrono::Utc::now()),
            ..Default::default()
        };
        user.insert(&self.db).await.map_err(Into::into)
    }

    #[instrument(skip(self, patch))]
    async fn update_user(&self, id: i64, patch: UserPatch) -> Result<UserModel> {
        let existing = self
            .get_user(id)
            .await?
            .ok_or(Error::NotFound { entity: "user", id })?;

        if let Some(username) = &patch.username {
            if *username != existing.username {
                self.ensure_username_free(username, Some(id)).await?;
            }
        }

        let mut active = existing.clone().into_active_model();
        if let Some(username) = patch.username {
            active.username = Set(username);
        }
        if let Some(password) = patch.password {
            active.password = Set(password);
        }
        if let Some(name) = patch.name {
            active.name = Set(name);
        }
        if let Some(role) = patch.role {
            active.role = Set(role);
        }
        if !active.is_changed() {
            return Ok(existing);
        }
        active.update(&self.db).await.map_err(Into::into)
    }

    #[instrument(skip(self))]
    async fn delete_user(&self, id: i64) -> Result<()> {
        let result = User::delete_by_id(id).exec(&self.db).await?;
        if result.rows_affected == 0 {
            return Err(Error::NotFound { entity: "user", id });
        }
        Ok(())
    }

    async fn list_products(&self) -> Result<Vec<ProductModel>> {
        Product::find()
            .order_by_asc(ProductColumn::Id)
            .all(&self.db)
            .await
            .map_err(Into::into)
    }

    async fn get_product(&self, id: i64) -> Result<Option<ProductModel>> {
        Product::find_by_id(id).one(&self.db).await.map_err(Into::into)
    }

    #[instrument(skip(self, new_product), fields(name = %new_product.name))]
    async fn insert_product(&self, new_product: NewProduct) -> Result<ProductModel> {
        let product = product::ActiveModel {
            name: Set(new_product.name),
            category: Set(new_product.category),
            barcode: Set(new_product.barcode),
            stock: Set(new_product.stock),
            price: Set(new_product.price),
            cost: Set(new_product.cost),
            description: Set(new_product.description),
            created: Set(chrono::Utc::now()),
            ..Default::default()
        };
        product.insert(&self.db).await.map_err(Into::into)
    }

    #[instrument(skip(self, patch))]
    async fn update_product(&self, id: i64, patch: ProductPatch) -> Result<ProductModel> {
        let existing = self
            .get_product(id)
            .await?
            .ok_or(Error::NotFound {
                entity: "product",
                id,
            })?;

        let mut active = existing.clone().into_active_model();
        if let Some(name) = patch.name {
            active.name = Set(name);
        }
        if let Some(category) = patch.category {
            active.category = Set(category);
        }
        if let Some(barcode) = patch.barcode {
            active.barcode = Set(barcode);
        }
        if let Some(stock) = patch.stock {
            active.stock = Set(stock);
        }
        if let Some(price) = patch.price {
            active.price = Set(price);
        }
        if let Some(cost) = patch.cost {
            active.cost = Set(cost);
        }
        if let Some(description) = patch.description {
            active.description = Set(description);
        }
        if !active.is_changed() {
            return Ok(existing);
        }
        active.update(&self.db).await.map_err(Into::into)
    }

    #[instrument(skip(self))]
    async fn delete_product(&self, id: i64) -> Result<()> {
        let result = Product::delete_by_id(id).exec(&self.db).await?;
        if result.rows_affected == 0 {
            return Err(Error::NotFound {
                entity: "product",
                id,
            });
        }
        Ok(())
    }

    async fn list_transactions(&self) -> Result<Vec<TransactionModel>> {
        Transaction::find()
            .order_by_asc(TransactionColumn::Id)
            .all(&self.db)
            .await
            .map_err(Into::into)
    }

    async fn get_transaction(&self, id: i64) -> Result<Option<TransactionModel>> {
        Transaction::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(Into::into)
    }

    async fn settings(&self) -> Result<SettingsModel> {
        Ok(Settings::find_by_id(SETTINGS_ID)
            .one(&self.db)
            .await?
            .unwrap_or_default())
    }

    #[instrument(skip(self, patch))]
    async fn update_settings(&self, patch: SettingsPatch) -> Result<SettingsModel> {
        let stored = Settings::find_by_id(SETTINGS_ID).one(&self.db).await?;
        let exists = stored.is_some();
        let mut settings = stored.unwrap_or_default();
        patch.apply(&mut settings);

        let active = settings.into_active_model().reset_all();
        if exists {
            active.update(&self.db).await.map_err(Into::into)
        } else {
            debug!("Creating settings row");
            active.insert(&self.db).await.map_err(Into::into)
        }
    }

    #[instrument(skip(self, sale), fields(product_id = sale.product_id, quantity = sale.quantity))]
    async fn record_sale(&self, sale: SaleRequest) -> Result<TransactionModel> {
        let txn = self.db.begin().await?;

        let product = Product::find_by_id(sale.product_id)
            .one(&txn)
            .await?
            .ok_or(Error::NotFound {
                entity: "product",
                id: sale.product_id,
            })?;
        let remaining = ledger::remaining_stock(&product, sale.quantity)?;
        debug!("Product {} will have {} left", product.id, remaining);

        // Guarded decrement: a concurrent sale that got there first leaves no row to update
        let decremented = Product::update_many()
            .col_expr(
                ProductColumn::Stock,
                Expr::col(ProductColumn::Stock).sub(sale.quantity),
            )
            .filter(ProductColumn::Id.eq(product.id))
            .filter(ProductColumn::Stock.gte(sale.quantity))
            .exec(&txn)
            .await?;
        if decremented.rows_affected == 0 {
            warn!("Stock changed underneath sale of product {}", product.id);
            return Err(Error::InsufficientStock {
                available: product.stock,
                requested: sale.quantity,
            });
        }

        let record = transaction::ActiveModel {
            product_id: Set(product.id),
            product_name: Set(product.name),
            quantity: Set(sale.quantity),
            amount: Set(sale.amount),
            date: Set(sale.date),
            employee: Set(sale.employee),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        txn.commit().await?;
        info!("Recorded sale {}", record.id);
        Ok(record)
    }

    #[instrument(skip(self))]
    async fn reverse_sale(&self, transaction_id: i64) -> Result<TransactionModel> {
        let txn = self.db.begin().await?;

        let record = Transaction::find_by_id(transaction_id)
            .one(&txn)
            .await?
            .ok_or(Error::NotFound {
                entity: "transaction",
                id: transaction_id,
            })?;

        let restocked = Product::update_many()
            .col_expr(
                ProductColumn::Stock,
                Expr::col(ProductColumn::Stock).add(record.quantity),
            )
            .filter(ProductColumn::Id.eq(record.product_id))
            .exec(&txn)
            .await?;
        if restocked.rows_affected == 0 {
            debug!(
                "Product {} no longer exists, transaction removed without restock",
                record.product_id
            );
        }

        Transaction::delete_by_id(record.id).exec(&txn).await?;
        txn.commit().await?;
        info!("Reversed sale {}", record.id);
        Ok(record)
    }

    #[instrument(skip_all)]
    async fn replace_all(&self, snapshot: &Snapshot) -> Result<()> {
        let txn = self.db.begin().await?;

        Transaction::delete_many().exec(&txn).await?;
        Product::delete_many().exec(&txn).await?;
        User::delete_many().exec(&txn).await?;
        Settings::delete_many().exec(&txn).await?;

        if !snapshot.users.is_empty() {
            User::insert_many(
                snapshot
                    .users
                    .iter()
                    .cloned()
                    .map(|m| m.into_active_model().reset_all()),
            )
            .exec(&txn)
            .await?;
        }
        if !snapshot.products.is_empty() {
            Product::insert_many(
                snapshot
                    .products
                    .iter()
                    .cloned()
                    .map(|m| m.into_active_model().reset_all()),
            )
            .exec(&txn)
            .await?;
        }
        if !snapshot.transactions.is_empty() {
            Transaction::insert_many(
                snapshot
                    .transactions
                    .iter()
                    .cloned()
                    .map(|m| m.into_active_model().reset_all()),
            )
            .exec(&txn)
            .await?;
        }
        let settings = SettingsModel {
            id: SETTINGS_ID,
            ..snapshot.settings.clone()
        };
        settings.into_active_model().reset_all().insert(&txn).await?;

        txn.commit().await?;
        info!(
            "Replaced store contents: {} users, {} products, {} transactions",
            snapshot.users.len(),
            snapshot.products.len(),
            snapshot.transactions.len()
        );
        Ok(())
    }
}
