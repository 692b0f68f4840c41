//! Read-side query surface over a populated store.

use std::sync::Arc;

use anyhow::Result;

use crate::aggregate;
use crate::audit::AuditLog;
use crate::models::{Cart, CategoryRanking, LineItem, Product, User};
use crate::store::Repository;

/// Full-collection reads plus the category aggregation.
///
/// Cheap to clone; handlers share one instance.
#[derive(Clone)]
pub struct QueryService {
    repo: Arc<dyn Repository>,
    audit: Arc<dyn AuditLog>,
}

impl QueryService {
    pub fn new(repo: Arc<dyn Repository>, audit: Arc<dyn AuditLog>) -> Self {
        Self { repo, audit }
    }

    pub async fn list_users(&self) -> Result<Vec<User>> {
        tracing::info!("fetching all users");
        self.repo.list_users().await
    }

    pub async fn list_carts(&self) -> Result<Vec<Cart>> {
        tracing::info!("fetching all carts");
        self.repo.list_carts().await
    }

    pub async fn list_products(&self) -> Result<Vec<Product>> {
        tracing::info!("fetching all products");
        self.repo.list_products().await
    }

    pub async fn list_line_items(&self) -> Result<Vec<LineItem>> {
        tracing::info!("fetching all products from carts");
        self.repo.list_line_items().await
    }

    /// Recomputed on every call; each row is appended to the audit log.
    pub async fn list_most_ordered_categories(&self) -> Result<Vec<CategoryRanking>> {
        aggregate::most_ordered_categories(self.repo.as_ref(), self.audit.as_ref()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::{MemoryAuditLog, CATEGORIES_LOG};
    use crate::store::memory::InMemoryRepository;

    #[tokio::test]
    async fn test_lists_in_insertion_order() {
        let repo = Arc::new(InMemoryRepository::new());
        for cart_id in [3, 1, 2] {
            repo.insert_cart(&Cart {
                cart_id,
                user_id: 1,
            })
            .await
            .unwrap();
        }
        let audit = Arc::new(MemoryAuditLog::new());
        let queries = QueryService::new(repo, audit.clone());

        let ids: Vec<i64> = queries
            .list_carts()
            .await
            .unwrap()
            .iter()
            .map(|c| c.cart_id)
            .collect();
        assert_eq!(ids, vec![3, 1, 2]);
        assert!(queries.list_users().await.unwrap().is_empty());
        assert!(queries.list_products().await.unwrap().is_empty());
        assert!(queries.list_line_items().await.unwrap().is_empty());
        assert!(queries.list_most_ordered_categories().await.unwrap().is_empty());
        assert!(audit.lines(CATEGORIES_LOG).is_empty());
    }
}
