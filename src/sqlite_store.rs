//! SQLite-backed [`Repository`] implementation.
//!
//! Each method runs a single statement directly on the pool, so every
//! existence check and every insert is its own transaction. A failed run
//! leaves all previously committed records in place.

use anyhow::Result;
use async_trait::async_trait;
use sqlx::{Row, SqlitePool};

use shopsync_core::models::{Cart, CategoryTotal, DedupKey, LineItem, Product, User};
use shopsync_core::store::Repository;

/// SQLite implementation of the [`Repository`] trait.
pub struct SqliteRepository {
    pool: SqlitePool,
}

impl SqliteRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl Repository for SqliteRepository {
    async fn count_by_key(&self, key: &DedupKey) -> Result<u64> {
        let count: i64 = match key {
            DedupKey::UserEmail(email) => {
                sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE email = ?")
                    .bind(email)
                    .fetch_one(&self.pool)
                    .await?
            }
            DedupKey::ProductId(id) => {
                sqlx::query_scalar("SELECT COUNT(*) FROM products WHERE product_id = ?")
                    .bind(id)
                    .fetch_one(&self.pool)
                    .await?
            }
            DedupKey::CartId(id) => {
                sqlx::query_scalar("SELECT COUNT(*) FROM carts WHERE cart_id = ?")
                    .bind(id)
                    .fetch_one(&self.pool)
                    .await?
            }
        };
        Ok(count.max(0) as u64)
    }

    async fn insert_user(&self, user: &User) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO users (user_id, first_name, last_name, email, age,
                               birth_date, street, city, country)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(user.user_id)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.email)
        .bind(user.age)
        .bind(&user.birth_date)
        .bind(&user.street)
        .bind(&user.city)
        .bind(&user.country)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn insert_product(&self, product: &Product) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO products (product_id, title, description, category, price)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(product.product_id)
        .bind(&product.title)
        .bind(&product.description)
        .bind(&product.category)
        .bind(product.price)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn insert_cart(&self, cart: &Cart) -> Result<()> {
        sqlx::query("INSERT INTO carts (cart_id, user_id) VALUES (?, ?)")
            .bind(cart.cart_id)
            .bind(cart.user_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn insert_line_item(&self, item: &LineItem) -> Result<()> {
        sqlx::query("INSERT INTO line_items (cart_id, product_id, quantity) VALUES (?, ?, ?)")
            .bind(item.cart_id)
            .bind(item.product_id)
            .bind(item.quantity)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn list_users(&self) -> Result<Vec<User>> {
        let rows = sqlx::query(
            r#"
            SELECT user_id, first_name, last_name, email, age, birth_date,
                   street, city, country
            FROM users
            ORDER BY id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .iter()
            .map(|row| User {
                user_id: row.get("user_id"),
                first_name: row.get("first_name"),
                last_name: row.get("last_name"),
                email: row.get("email"),
                age: row.get("age"),
                birth_date: row.get("birth_date"),
                street: row.get("street"),
                city: row.get("city"),
                country: row.get("country"),
            })
            .collect())
    }

    async fn list_products(&self) -> Result<Vec<Product>> {
        let rows = sqlx::query(
            "SELECT product_id, title, description, category, price FROM products ORDER BY id ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .iter()
            .map(|row| Product {
                product_id: row.get("product_id"),
                title: row.get("title"),
                description: row.get("description"),
                category: row.get("category"),
                price: row.get("price"),
            })
            .collect())
    }

    async fn list_carts(&self) -> Result<Vec<Cart>> {
        let rows = sqlx::query("SELECT cart_id, user_id FROM carts ORDER BY id ASC")
            .fetch_all(&self.pool)
            .await?;

        Ok(rows
            .iter()
            .map(|row| Cart {
                cart_id: row.get("cart_id"),
                user_id: row.get("user_id"),
            })
            .collect())
    }

    async fn list_line_items(&self) -> Result<Vec<LineItem>> {
        let rows =
            sqlx::query("SELECT cart_id, product_id, quantity FROM line_items ORDER BY id ASC")
                .fetch_all(&self.pool)
                .await?;

        Ok(rows
            .iter()
            .map(|row| LineItem {
                cart_id: row.get("cart_id"),
                product_id: row.get("product_id"),
                quantity: row.get("quantity"),
            })
            .collect())
    }

    async fn category_totals(&self) -> Result<Vec<CategoryTotal>> {
        let rows = sqlx::query(
            r#"
            SELECT c.user_id AS user_id,
                   p.category AS category,
                   SUM(li.quantity) AS total_orders
            FROM carts c
            JOIN line_items li ON li.cart_id = c.cart_id
            JOIN products p ON p.product_id = li.product_id
            GROUP BY c.user_id, p.category
            ORDER BY c.user_id ASC, p.category ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .iter()
            .map(|row| CategoryTotal {
                user_id: row.get("user_id"),
                category: row.get("category"),
                quantity: row.get("total_orders"),
            })
            .collect())
    }
}
