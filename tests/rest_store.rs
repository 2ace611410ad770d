//! Drives `RestStore` against an in-process stand-in for json-server.

#![allow(clippy::unwrap_used)]
#![allow(clippy::float_cmp)]

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::get,
};
use qubic_pos::{
    core::{
        backup, ledger,
        session::{Identity, Session},
    },
    entities::Role,
    errors::{Error, Result},
    store::{NewProduct, NewUser, ProductPatch, RestStore, SettingsPatch, Store, UserPatch},
};
use serde_json::Value;
use std::{collections::HashMap, sync::Arc};
use tokio::sync::Mutex;

type Collections = Arc<Mutex<HashMap<String, Vec<Value>>>>;
type Reply<T> = std::result::Result<T, StatusCode>;

fn id_of(record: &Value) -> Option<i64> {
    record.get("id").and_then(Value::as_i64)
}

async fn list(
    State(db): State<Collections>,
    Path(collection): Path<String>,
) -> Reply<Json<Value>> {
    let db = db.lock().await;
    let records = db.get(&collection).ok_or(StatusCode::NOT_FOUND)?;
    Ok(Json(Value::Array(records.clone())))
}

async fn create(
    State(db): State<Collections>,
    Path(collection): Path<String>,
    Json(record): Json<Value>,
) -> Reply<(StatusCode, Json<Value>)> {
    let mut db = db.lock().await;
    let records = db.get_mut(&collection).ok_or(StatusCode::NOT_FOUND)?;
    records.push(record.clone());
    Ok((StatusCode::CREATED, Json(record)))
}

async fn show(
    State(db): State<Collections>,
    Path((collection, id)): Path<(String, i64)>,
) -> Reply<Json<Value>> {
    let db = db.lock().await;
    db.get(&collection)
        .and_then(|records| records.iter().find(|r| id_of(r) == Some(id)))
        .cloned()
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}

async fn replace(
    State(db): State<Collections>,
    Path((collection, id)): Path<(String, i64)>,
    Json(mut record): Json<Value>,
) -> Reply<Json<Value>> {
    let mut db = db.lock().await;
    let slot = db
        .get_mut(&collection)
        .and_then(|records| records.iter_mut().find(|r| id_of(r) == Some(id)))
        .ok_or(StatusCode::NOT_FOUND)?;
    record["id"] = Value::from(id);
    *slot = record.clone();
    Ok(Json(record))
}

async fn remove(
    State(db): State<Collections>,
    Path((collection, id)): Path<(String, i64)>,
) -> Reply<Json<Value>> {
    let mut db = db.lock().await;
    let records = db.get_mut(&collection).ok_or(StatusCode::NOT_FOUND)?;
    let before = records.len();
    records.retain(|r| id_of(r) != Some(id));
    if records.len() == before {
        return Err(StatusCode::NOT_FOUND);
    }
    Ok(Json(Value::Object(serde_json::Map::new())))
}

/// Starts a fake json-server with four empty collections and returns its base URL.
async fn spawn_server() -> String {
    let collections: Collections = Arc::new(Mutex::new(
        ["users", "products", "transactions", "settings"]
            .into_iter()
            .map(|name| (name.to_string(), Vec::new()))
            .collect(),
    ));
    let app = Router::new()
        .route("/{collection}", get(list).post(create))
        .route("/{collection}/{id}", get(show).put(replace).delete(remove))
        .with_state(collections);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}/")
}

async fn rest_store() -> RestStore {
    RestStore::new(&spawn_server().await).unwrap()
}

fn cashier() -> Session {
    Session::new(Identity {
        username: "emp".to_string(),
        name: "Employee User".to_string(),
        role: Role::Employee,
    })
}

fn phone(stock: i64) -> NewProduct {
    NewProduct {
        name: "iPhone 14 Pro".to_string(),
        category: "Phones".to_string(),
        barcode: Some("1234567890123".to_string()),
        stock,
        price: 999.99,
        cost: 799.99,
        description: "Latest iPhone model".to_string(),
    }
}

#[tokio::test]
async fn test_product_crud_over_http() -> Result<()> {
    let store = rest_store().await;
    assert!(!store.base_url().ends_with('/'));

    let first = store.insert_product(phone(15)).await?;
    let second = store.insert_product(phone(3)).await?;
    assert_eq!(first.id, 1);
    assert_eq!(second.id, 2);

    let updated = store
        .update_product(
            first.id,
            ProductPatch {
                price: Some(949.0),
                barcode: Some(None),
                ..ProductPatch::default()
            },
        )
        .await?;
    assert_eq!(updated.price, 949.0);
    assert_eq!(updated.barcode, None);
    assert_eq!(updated.name, "iPhone 14 Pro");
    assert_eq!(store.get_product(first.id).await?, Some(updated));

    store.delete_product(second.id).await?;
    assert_eq!(store.list_products().await?.len(), 1);
    assert!(store.get_product(second.id).await?.is_none());
    assert!(matches!(
        store.delete_product(second.id).await,
        Err(Error::NotFound { entity: "product", .. })
    ));
    assert!(matches!(
        store.update_product(99, ProductPatch::default()).await,
        Err(Error::NotFound { .. })
    ));
    Ok(())
}

#[tokio::test]
async fn test_usernames_stay_unique_over_http() -> Result<()> {
    let store = rest_store().await;
    let new_user = |username: &str| NewUser {
        username: username.to_string(),
        password: "secret".to_string(),
        name: username.to_string(),
        role: Role::Employee,
    };

    let alice = store.insert_user(new_user("alice")).await?;
    store.insert_user(new_user("bob")).await?;

    assert!(matches!(
        store.insert_user(new_user("alice")).await,
        Err(Error::DuplicateUsername { .. })
    ));
    assert!(matches!(
        store
            .update_user(
                alice.id,
                UserPatch {
                    username: Some("bob".to_string()),
                    ..UserPatch::default()
                }
            )
            .await,
        Err(Error::DuplicateUsername { .. })
    ));

    // keeping your own name is not a clash
    let renamed = store
        .update_user(
            alice.id,
            UserPatch {
                username: Some("alice".to_string()),
                name: Some("Alice Smith".to_string()),
                ..UserPatch::default()
            },
        )
        .await?;
    assert_eq!(renamed.name, "Alice Smith");
    assert_eq!(renamed.password, "secret");
    Ok(())
}

#[tokio::test]
async fn test_sale_moves_stock_over_http() -> Result<()> {
    let store = rest_store().await;
    let product = store.insert_product(phone(5)).await?;

    let sale = ledger::record_sale(&store, &cashier(), product.id, 2, 1999.98).await?;
    assert_eq!(sale.product_name, "iPhone 14 Pro");
    assert_eq!(sale.employee, "emp");
    assert_eq!(store.get_product(product.id).await?.unwrap().stock, 3);

    let refused = ledger::record_sale(&store, &cashier(), product.id, 4, 3999.96).await;
    assert!(matches!(
        refused,
        Err(Error::InsufficientStock {
            available: 3,
            requested: 4
        })
    ));
    assert_eq!(store.get_product(product.id).await?.unwrap().stock, 3);
    assert_eq!(store.list_transactions().await?.len(), 1);

    let reversed = ledger::reverse_sale(&store, sale.id).await?;
    assert_eq!(reversed.id, sale.id);
    assert_eq!(store.get_product(product.id).await?.unwrap().stock, 5);
    assert!(store.list_transactions().await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_reversing_sale_of_deleted_product_only_removes_transaction() -> Result<()> {
    let store = rest_store().await;
    let product = store.insert_product(phone(5)).await?;
    let sale = ledger::record_sale(&store, &cashier(), product.id, 1, 999.99).await?;
    store.delete_product(product.id).await?;

    ledger::reverse_sale(&store, sale.id).await?;
    assert!(store.list_transactions().await?.is_empty());
    assert!(store.list_products().await?.is_empty());
    assert!(matches!(
        ledger::reverse_sale(&store, sale.id).await,
        Err(Error::NotFound { .. })
    ));
    Ok(())
}

#[tokio::test]
async fn test_settings_default_then_upsert() -> Result<()> {
    let store = rest_store().await;
    let defaults = store.settings().await?;
    assert_eq!(defaults.store_name, "QUBIC Store");
    assert_eq!(defaults.low_stock_threshold, 5);

    // first write has nothing to PUT over and creates the record
    let created = store
        .update_settings(SettingsPatch {
            store_name: Some("Corner Shop".to_string()),
            ..SettingsPatch::default()
        })
        .await?;
    assert_eq!(created.id, 1);
    assert_eq!(created.store_name, "Corner Shop");

    let updated = store
        .update_settings(SettingsPatch {
            low_stock_threshold: Some(3),
            ..SettingsPatch::default()
        })
        .await?;
    assert_eq!(updated.store_name, "Corner Shop");
    assert_eq!(updated.low_stock_threshold, 3);
    assert_eq!(store.settings().await?, updated);
    Ok(())
}

#[tokio::test]
async fn test_unreachable_server_reports_storage_failure() -> Result<()> {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    drop(listener);

    let store = RestStore::new(&format!("http://{addr}"))?;
    let err = store.list_products().await.unwrap_err();
    assert!(err.is_storage_io());
    // settings reads never fail
    assert_eq!(store.settings().await?.store_name, "QUBIC Store");
    Ok(())
}

#[tokio::test]
async fn test_backup_restores_into_another_server() -> Result<()> {
    let source = rest_store().await;
    let product = source.insert_product(phone(10)).await?;
    source
        .insert_user(NewUser {
            username: "alice".to_string(),
            password: "secret".to_string(),
            name: "Alice".to_string(),
            role: Role::Admin,
        })
        .await?;
    ledger::record_sale(&source, &cashier(), product.id, 3, 2999.97).await?;
    source
        .update_settings(SettingsPatch {
            profit_margin: Some(35.0),
            ..SettingsPatch::default()
        })
        .await?;

    let json = backup::export_backup(&source).await?;

    let target = rest_store().await;
    target.insert_product(phone(1)).await?;
    backup::import_backup(&target, &json).await?;

    assert_eq!(target.snapshot().await?, source.snapshot().await?);
    assert_eq!(target.get_product(product.id).await?.unwrap().stock, 7);
    Ok(())
}
