//! Canonical data models stored and served by shopsync.
//!
//! Upstream payloads ([`crate::payload`]) are converted into these types by
//! the ingestion pipeline. Each model's [`Display`](fmt::Display) output is
//! the line written to its audit log.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A user, unique by `email`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub user_id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub age: i64,
    pub birth_date: String,
    pub street: String,
    pub city: String,
    /// Derived from the address coordinates during ingestion.
    pub country: String,
}

/// A catalogue product, unique by `product_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub product_id: i64,
    pub title: String,
    pub description: String,
    pub category: String,
    pub price: f64,
}

/// A cart, unique by `cart_id`. `user_id` is a foreign reference only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    pub cart_id: i64,
    pub user_id: i64,
}

/// A product placed in a cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub cart_id: i64,
    pub product_id: i64,
    pub quantity: i64,
}

/// Summed ordered quantity for one `(user, category)` pair.
///
/// Produced by [`Repository::category_totals`](crate::store::Repository::category_totals).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryTotal {
    pub user_id: i64,
    pub category: String,
    pub quantity: i64,
}

/// One of possibly several categories tied for a user's highest total.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRanking {
    pub user_id: i64,
    pub category_name: String,
    pub total_orders: i64,
}

/// Natural key used to decide whether a record is already stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DedupKey {
    UserEmail(String),
    ProductId(i64),
    CartId(i64),
}

impl fmt::Display for DedupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DedupKey::UserEmail(email) => write!(f, "user email {}", email),
            DedupKey::ProductId(id) => write!(f, "product id {}", id),
            DedupKey::CartId(id) => write!(f, "cart id {}", id),
        }
    }
}

impl fmt::Display for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "User(user_id={}, first_name={:?}, last_name={:?}, email={:?}, age={}, \
             birth_date={:?}, street={:?}, city={:?}, country={:?})",
            self.user_id,
            self.first_name,
            self.last_name,
            self.email,
            self.age,
            self.birth_date,
            self.street,
            self.city,
            self.country
        )
    }
}

impl fmt::Display for Product {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Product(product_id={}, title={:?}, description={:?}, category={:?}, price={})",
            self.product_id, self.title, self.description, self.category, self.price
        )
    }
}

impl fmt::Display for Cart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Cart(cart_id={}, user_id={})", self.cart_id, self.user_id)
    }
}

impl fmt::Display for LineItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "LineItem(cart_id={}, product_id={}, quantity={})",
            self.cart_id, self.product_id, self.quantity
        )
    }
}

impl fmt::Display for CategoryRanking {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "CategoryRanking(user_id={}, category_name={:?}, total_orders={})",
            self.user_id, self.category_name, self.total_orders
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cart_audit_line() {
        let cart = Cart {
            cart_id: 1,
            user_id: 33,
        };
        assert_eq!(cart.to_string(), "Cart(cart_id=1, user_id=33)");
    }

    #[test]
    fn test_ranking_quotes_category() {
        let ranking = CategoryRanking {
            user_id: 5,
            category_name: "home-decoration".to_string(),
            total_orders: 7,
        };
        assert_eq!(
            ranking.to_string(),
            "CategoryRanking(user_id=5, category_name=\"home-decoration\", total_orders=7)"
        );
    }
}
