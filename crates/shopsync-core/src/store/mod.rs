//! Storage abstraction for shopsync.
//!
//! The [`Repository`] trait covers every store operation used by the
//! ingestion pipelines, the aggregation engine, and the read-side queries.
//! Each call is one unit of work: implementations acquire a connection (or
//! lock) for that call only and release it before returning.
//!
//! # Operations
//!
//! | Method | Purpose |
//! |--------|---------|
//! | [`count_by_key`](Repository::count_by_key) | Existence check on a natural key |
//! | [`insert_user`](Repository::insert_user) | Persist a new user |
//! | [`insert_product`](Repository::insert_product) | Persist a new product |
//! | [`insert_cart`](Repository::insert_cart) | Persist a new cart |
//! | [`insert_line_item`](Repository::insert_line_item) | Persist a cart line item |
//! | [`list_users`](Repository::list_users) etc. | Full collections in insertion order |
//! | [`category_totals`](Repository::category_totals) | Quantity summed per `(user, category)` |

pub mod memory;

use anyhow::Result;
use async_trait::async_trait;

use crate::models::{Cart, CategoryTotal, DedupKey, LineItem, Product, User};

#[async_trait]
pub trait Repository: Send + Sync {
    /// Number of stored records matching `key`.
    async fn count_by_key(&self, key: &DedupKey) -> Result<u64>;

    async fn insert_user(&self, user: &User) -> Result<()>;
    async fn insert_product(&self, product: &Product) -> Result<()>;
    async fn insert_cart(&self, cart: &Cart) -> Result<()>;

    /// Inserted unconditionally; line items have no natural key.
    async fn insert_line_item(&self, item: &LineItem) -> Result<()>;

    async fn list_users(&self) -> Result<Vec<User>>;
    async fn list_products(&self) -> Result<Vec<Product>>;
    async fn list_carts(&self) -> Result<Vec<Cart>>;
    async fn list_line_items(&self) -> Result<Vec<LineItem>>;

    /// Join carts, line items and products, summing quantity per
    /// `(user_id, category)`. Ordered by user then category.
    ///
    /// Line items whose product is not stored do not contribute.
    async fn category_totals(&self) -> Result<Vec<CategoryTotal>>;
}
