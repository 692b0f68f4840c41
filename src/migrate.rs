//! Database schema migrations.
//!
//! Creates the `users`, `products`, `carts` and `line_items` tables. Running
//! the migrations twice is safe. With `reset`, existing tables are dropped
//! first so the store starts empty.
//!
//! Cart → user and line item → cart/product relations are not declared as
//! foreign keys: carts may reference users that were never ingested.

use anyhow::Result;
use sqlx::SqlitePool;

use crate::config::Config;
use crate::db;

const TABLES: [&str; 4] = ["line_items", "carts", "products", "users"];

pub async fn run_migrations(config: &Config, reset: bool) -> Result<()> {
    let pool = db::connect(&config.db).await?;
    migrate(&pool, reset).await?;
    pool.close().await;
    Ok(())
}

pub async fn migrate(pool: &SqlitePool, reset: bool) -> Result<()> {
    if reset {
        tracing::info!("dropping all existing tables");
        for table in TABLES {
            sqlx::query(&format!("DROP TABLE IF EXISTS {}", table))
                .execute(pool)
                .await?;
        }
    }

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER NOT NULL,
            first_name TEXT NOT NULL,
            last_name TEXT NOT NULL,
            email TEXT NOT NULL UNIQUE,
            age INTEGER NOT NULL,
            birth_date TEXT NOT NULL,
            street TEXT NOT NULL,
            city TEXT NOT NULL,
            country TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS products (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            product_id INTEGER NOT NULL UNIQUE,
            title TEXT NOT NULL,
            description TEXT NOT NULL,
            category TEXT NOT NULL,
            price REAL NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS carts (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            cart_id INTEGER NOT NULL UNIQUE,
            user_id INTEGER NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    // No uniqueness: cart-level dedup is the only guard for line items.
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS line_items (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            cart_id INTEGER NOT NULL,
            product_id INTEGER NOT NULL,
            quantity INTEGER NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_carts_user_id ON carts(user_id)")
        .execute(pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_line_items_cart_id ON line_items(cart_id)")
        .execute(pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_line_items_product_id ON line_items(product_id)")
        .execute(pool)
        .await?;

    Ok(())
}
