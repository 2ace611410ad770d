//! Database configuration module for the embedded storage backend.
//!
//! This module handles `SQLite` database connection and table creation using `SeaORM`.
//! It provides functions for establishing database connections and creating all necessary tables
//! based on the entity definitions. The module uses `SeaORM`'s `Schema::create_table_from_entity`
//! method to generate SQL statements from the entity models, so the database schema always
//! matches the Rust struct definitions without hand-written SQL.

use crate::config::StorageConfig;
use crate::entities::{Product, Settings, Transaction, User};
use crate::errors::Result;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, EntityTrait, Schema};
use tracing::{debug, info, instrument};

/// Gets the database URL from the `DATABASE_URL` environment variable, falling back
/// to the `[storage]` section of the configuration.
#[must_use]
pub fn get_database_url(storage: &StorageConfig) -> String {
    std::env::var("DATABASE_URL").unwrap_or_else(|_| storage.database_url.clone())
}

/// Establishes a connection to the `SQLite` database at `database_url`.
///
/// File-backed databases live under a directory that may not exist yet on first
/// run; it is created before connecting.
#[instrument]
pub async fn create_connection(database_url: &str) -> Result<DatabaseConnection> {
    if let Some(dir) = sqlite_parent_dir(database_url) {
        std::fs::create_dir_all(&dir)?;
    }
    debug!("Connecting to {}", database_url);
    Database::connect(database_url).await.map_err(Into::into)
}

/// Creates all necessary database tables using `SeaORM`'s schema generation from entity definitions.
///
/// Tables that already exist are left untouched, so this runs on every start.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    create_table(db, User).await?;
    create_table(db, Product).await?;
    create_table(db, Transaction).await?;
    create_table(db, Settings).await?;
    info!("Database tables ensured");
    Ok(())
}

async fn create_table<E: EntityTrait>(db: &DatabaseConnection, entity: E) -> Result<()> {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);
    let mut statement = schema.create_table_from_entity(entity);
    statement.if_not_exists();
    db.execute(builder.build(&statement)).await?;
    Ok(())
}

/// Directory holding a file-backed `SQLite` database, if the URL names one.
fn sqlite_parent_dir(database_url: &str) -> Option<std::path::PathBuf> {
    let path = database_url
        .strip_prefix("sqlite://")
        .or_else(|| database_url.strip_prefix("sqlite:"))?;
    let path = path.split('?').next().unwrap_or_default();
    if path.is_empty() || path.starts_with(":memory:") {
        return None;
    }
    std::path::Path::new(path)
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(std::path::Path::to_path_buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{
        product::Model as ProductModel, settings::Model as SettingsModel,
        transaction::Model as TransactionModel, user::Model as UserModel,
    };
    use sea_orm::QuerySelect;

    #[tokio::test]
    async fn test_create_tables() -> Result<()> {
        let db = Database::connect("sqlite::memory:").await?;
        create_tables(&db).await?;

        // Test that tables exist by querying them
        let _: Vec<UserModel> = User::find().limit(1).all(&db).await?;
        let _: Vec<ProductModel> = Product::find().limit(1).all(&db).await?;
        let _: Vec<TransactionModel> = Transaction::find().limit(1).all(&db).await?;
        let _: Vec<SettingsModel> = Settings::find().limit(1).all(&db).await?;

        Ok(())
    }

    #[tokio::test]
    async fn test_create_tables_is_idempotent() -> Result<()> {
        let db = Database::connect("sqlite::memory:").await?;
        create_tables(&db).await?;
        create_tables(&db).await?;
        Ok(())
    }

    #[tokio::test]
    async fn test_create_connection_makes_data_dir() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let db_path = dir.path().join("nested").join("qubic.sqlite");
        let url = format!("sqlite://{}?mode=rwc", db_path.display());

        let db = create_connection(&url).await?;
        create_tables(&db).await?;

        assert!(db_path.parent().is_some_and(std::path::Path::exists));
        Ok(())
    }

    #[test]
    fn test_sqlite_parent_dir() {
        assert_eq!(
            sqlite_parent_dir("sqlite://data/qubic.sqlite?mode=rwc"),
            Some(std::path::PathBuf::from("data"))
        );
        assert_eq!(sqlite_parent_dir("sqlite::memory:"), None);
        assert_eq!(sqlite_parent_dir("sqlite://qubic.sqlite"), None);
    }
}
