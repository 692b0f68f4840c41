//! In-memory [`Repository`] implementation for testing.
//!
//! Uses `Vec`s behind `std::sync::RwLock`. Uniqueness of natural keys is
//! enforced on insert, mirroring the unique constraints of the SQLite schema.

use std::collections::{BTreeMap, HashMap};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use anyhow::{anyhow, bail, Result};
use async_trait::async_trait;

use crate::models::{Cart, CategoryTotal, DedupKey, LineItem, Product, User};

use super::Repository;

/// In-memory store.
#[derive(Default)]
pub struct InMemoryRepository {
    users: RwLock<Vec<User>>,
    products: RwLock<Vec<Product>>,
    carts: RwLock<Vec<Cart>>,
    line_items: RwLock<Vec<LineItem>>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

fn read<T>(lock: &RwLock<T>) -> Result<RwLockReadGuard<'_, T>> {
    lock.read().map_err(|_| anyhow!("store lock poisoned"))
}

fn write<T>(lock: &RwLock<T>) -> Result<RwLockWriteGuard<'_, T>> {
    lock.write().map_err(|_| anyhow!("store lock poisoned"))
}

#[async_trait]
impl Repository for InMemoryRepository {
    async fn count_by_key(&self, key: &DedupKey) -> Result<u64> {
        let count = match key {
            DedupKey::UserEmail(email) => {
                read(&self.users)?.iter().filter(|u| &u.email == email).count()
            }
            DedupKey::ProductId(id) => read(&self.products)?
                .iter()
                .filter(|p| p.product_id == *id)
                .count(),
            DedupKey::CartId(id) => read(&self.carts)?.iter().filter(|c| c.cart_id == *id).count(),
        };
        Ok(count as u64)
    }

    async fn insert_user(&self, user: &User) -> Result<()> {
        let mut users = write(&self.users)?;
        if users.iter().any(|u| u.email == user.email) {
            bail!("UNIQUE constraint failed: users.email ({})", user.email);
        }
        users.push(user.clone());
        Ok(())
    }

    async fn insert_product(&self, product: &Product) -> Result<()> {
        let mut products = write(&self.products)?;
        if products.iter().any(|p| p.product_id == product.product_id) {
            bail!(
                "UNIQUE constraint failed: products.product_id ({})",
                product.product_id
            );
        }
        products.push(product.clone());
        Ok(())
    }

    async fn insert_cart(&self, cart: &Cart) -> Result<()> {
        let mut carts = write(&self.carts)?;
        if carts.iter().any(|c| c.cart_id == cart.cart_id) {
            bail!("UNIQUE constraint failed: carts.cart_id ({})", cart.cart_id);
        }
        carts.push(cart.clone());
        Ok(())
    }

    async fn insert_line_item(&self, item: &LineItem) -> Result<()> {
        write(&self.line_items)?.push(item.clone());
        Ok(())
    }

    async fn list_users(&self) -> Result<Vec<User>> {
        Ok(read(&self.users)?.clone())
    }

    async fn list_products(&self) -> Result<Vec<Product>> {
        Ok(read(&self.products)?.clone())
    }

    async fn list_carts(&self) -> Result<Vec<Cart>> {
        Ok(read(&self.carts)?.clone())
    }

    async fn list_line_items(&self) -> Result<Vec<LineItem>> {
        Ok(read(&self.line_items)?.clone())
    }

    async fn category_totals(&self) -> Result<Vec<CategoryTotal>> {
        let carts = read(&self.carts)?;
        let products = read(&self.products)?;
        let items = read(&self.line_items)?;

        let owner: HashMap<i64, i64> = carts.iter().map(|c| (c.cart_id, c.user_id)).collect();
        let category: HashMap<i64, &str> = products
            .iter()
            .map(|p| (p.product_id, p.category.as_str()))
            .collect();

        let mut totals: BTreeMap<(i64, &str), i64> = BTreeMap::new();
        for item in items.iter() {
            let (Some(&user_id), Some(&cat)) =
                (owner.get(&item.cart_id), category.get(&item.product_id))
            else {
                continue;
            };
            *totals.entry((user_id, cat)).or_insert(0) += item.quantity;
        }

        Ok(totals
            .into_iter()
            .map(|((user_id, category), quantity)| CategoryTotal {
                user_id,
                category: category.to_string(),
                quantity,
            })
            .collect())
    }
}
