//! JSON backup and restore of the whole store.
//!
//! A backup is one pretty-printed JSON document holding all four collections
//! plus the export time and a format version. Restoring replaces every
//! collection wholesale, ids included.

use crate::{
    entities::{ProductModel, SettingsModel, TransactionModel, UserModel},
    errors::{Error, Result},
    store::{Snapshot, Store},
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

/// Format version written into every backup
pub const BACKUP_VERSION: &str = "1.0";

/// On-disk layout of a backup file
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupFile {
    /// Every user account
    pub users: Vec<UserModel>,
    /// Every product
    pub products: Vec<ProductModel>,
    /// Every transaction
    pub transactions: Vec<TransactionModel>,
    /// The settings singleton
    pub settings: SettingsModel,
    /// When the backup was taken
    pub backup_date: DateTime<Utc>,
    /// Format version
    pub version: String,
}

/// Lenient reading shape: collections are optional so a missing one can be
/// reported by name.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawBackup {
    users: Option<Vec<UserModel>>,
    products: Option<Vec<ProductModel>>,
    transactions: Option<Vec<TransactionModel>>,
    settings: Option<SettingsModel>,
}

impl BackupFile {
    /// Wraps a snapshot taken at `backup_date`.
    #[must_use]
    pub fn new(snapshot: Snapshot, backup_date: DateTime<Utc>) -> Self {
        Self {
            users: snapshot.users,
            products: snapshot.products,
            transactions: snapshot.transactions,
            settings: snapshot.settings,
            backup_date,
            version: BACKUP_VERSION.to_string(),
        }
    }

    /// Pretty-printed JSON
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(Into::into)
    }
}

/// Suggested file name for a backup taken on `date`.
#[must_use]
pub fn backup_file_name(date: NaiveDate) -> String {
    format!("qubic-store-backup-{}.json", date.format("%Y-%m-%d"))
}

/// Parses backup JSON into a snapshot.
///
/// # Errors
/// Returns [`Error::InvalidBackupFormat`] if the text is not JSON, a record is
/// malformed, or any of the four collections is missing.
pub fn parse_backup(json: &str) -> Result<Snapshot> {
    let raw: RawBackup = serde_json::from_str(json).map_err(|e| Error::InvalidBackupFormat {
        message: e.to_string(),
    })?;

    let missing = |name: &str| Error::InvalidBackupFormat {
        message: format!("missing '{name}'"),
    };
    Ok(Snapshot {
        users: raw.users.ok_or_else(|| missing("users"))?,
        products: raw.products.ok_or_else(|| missing("products"))?,
        transactions: raw.transactions.ok_or_else(|| missing("transactions"))?,
        settings: raw.settings.ok_or_else(|| missing("settings"))?,
    })
}

/// Exports the whole store as backup JSON.
#[instrument(skip(store))]
pub async fn export_backup(store: &dyn Store) -> Result<String> {
    let snapshot = store.snapshot().await?;
    info!(
        "Exporting {} users, {} products, {} transactions",
        snapshot.users.len(),
        snapshot.products.len(),
        snapshot.transactions.len()
    );
    BackupFile::new(snapshot, Utc::now()).to_json()
}

/// Replaces the whole store with the contents of backup JSON.
///
/// The payload is fully validated before anything is deleted.
#[instrument(skip_all)]
pub async fn import_backup(store: &dyn Store, json: &str) -> Result<Snapshot> {
    let snapshot = parse_backup(json)?;
    store.replace_all(&snapshot).await?;
    Ok(snapshot)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::core::ledger;
    use crate::entities::Role;
    use crate::test_utils::*;

    #[test]
    fn test_backup_file_name() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 7).unwrap();
        assert_eq!(backup_file_name(date), "qubic-store-backup-2024-03-07.json");
    }

    #[test]
    fn test_backup_json_layout() {
        let snapshot = Snapshot {
            users: vec![],
            products: vec![test_product_model(1, "iPhone 14 Pro", 15)],
            transactions: vec![],
            settings: SettingsModel::default(),
        };
        let json = BackupFile::new(snapshot, Utc::now()).to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["version"], "1.0");
        assert!(value["backupDate"].is_string());
        assert_eq!(value["settings"]["lowStockThreshold"], 5);
        assert_eq!(value["products"][0]["name"], "iPhone 14 Pro");
        assert!(json.contains('\n'));
    }

    #[test]
    fn test_parse_rejects_missing_collection() {
        let json = r#"{"users": [], "products": [], "settings": {
            "lowStockThreshold": 5, "profitMargin": 25, "storeName": "QUBIC Store"
        }}"#;
        let result = parse_backup(json);
        assert!(
            matches!(result, Err(Error::InvalidBackupFormat { ref message }) if message.contains("transactions"))
        );

        assert!(matches!(
            parse_backup("not json"),
            Err(Error::InvalidBackupFormat { .. })
        ));
    }

    #[tokio::test]
    async fn test_restore_of_backup_reproduces_store() -> Result<()> {
        let store = setup_test_store().await?;
        create_test_user(&store, "alice", Role::Employee).await?;
        let product = create_test_product(&store, "iPhone 14 Pro", 15).await?;
        ledger::record_sale(&store, &employee_session(), product.id, 1, 999.99).await?;
        let before = store.snapshot().await?;

        let json = export_backup(&store).await?;

        // Diverge, then restore
        store.delete_product(product.id).await?;
        create_test_product(&store, "Leftover", 1).await?;
        import_backup(&store, &json).await?;

        assert_eq!(store.snapshot().await?, before);
        Ok(())
    }

    #[tokio::test]
    async fn test_invalid_backup_leaves_store_untouched() -> Result<()> {
        let store = setup_test_store().await?;
        create_test_product(&store, "iPhone 14 Pro", 15).await?;

        let result = import_backup(&store, r#"{"users": []}"#).await;
        assert!(matches!(result, Err(Error::InvalidBackupFormat { .. })));
        assert_eq!(store.list_products().await?.len(), 1);
        Ok(())
    }
}
