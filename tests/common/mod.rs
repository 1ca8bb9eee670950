#![allow(dead_code)]

use chrono::Utc;
use ledgerline::{
    config::AppConfig,
    db::{self, DbPool},
    entities::{counterparty, product, wallet},
    logging,
};
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, Set};
use std::sync::Arc;
use uuid::Uuid;

/// Fresh in-memory SQLite database with the full schema applied.
///
/// Pool size is pinned to one connection so every query in a test sees the
/// same in-memory database.
pub async fn setup_db() -> Arc<DbPool> {
    let mut cfg = AppConfig::new("sqlite::memory:", "test");
    cfg.db_max_connections = 1;
    cfg.db_min_connections = 1;
    cfg.auto_migrate = true;
    logging::init_tracing(&cfg);

    let pool = db::establish_connection_from_app_config(&cfg)
        .await
        .expect("failed to create test database");
    Arc::new(pool)
}

pub async fn seed_counterparty(db: &DbPool, name: &str, roles: &str) -> counterparty::Model {
    counterparty::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(name.to_string()),
        email: Set(Some(format!("{}@example.com", name.to_lowercase()))),
        phone: Set(None),
        address: Set(None),
        roles: Set(roles.to_string()),
        created_at: Set(Utc::now()),
        updated_at: Set(None),
    }
    .insert(db)
    .await
    .expect("failed to seed counterparty")
}

pub async fn seed_product(db: &DbPool, sku: &str, stock: i32, unit_price: Decimal) -> product::Model {
    product::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(format!("Product {}", sku)),
        sku: Set(sku.to_string()),
        category: Set(None),
        stock_quantity: Set(stock),
        unit_price: Set(unit_price),
        image_url: Set(None),
        created_at: Set(Utc::now()),
        updated_at: Set(None),
    }
    .insert(db)
    .await
    .expect("failed to seed product")
}

pub async fn seed_wallet(db: &DbPool, name: &str, balance: Decimal) -> wallet::Model {
    wallet::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(name.to_string()),
        balance: Set(balance),
        created_at: Set(Utc::now()),
        updated_at: Set(None),
    }
    .insert(db)
    .await
    .expect("failed to seed wallet")
}
