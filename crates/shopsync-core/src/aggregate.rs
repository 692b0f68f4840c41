//! Most-ordered category per user.
//!
//! # Algorithm
//!
//! 1. The store joins carts, line items and products and sums
//!    `quantity` per `(user_id, category)`
//!    ([`Repository::category_totals`]).
//! 2. Totals are grouped by user.
//! 3. For each user, every category whose total equals that user's maximum
//!    is emitted. Ties are all reported.
//!
//! Users without carts produce no rows. Output is ordered by `user_id`,
//! then category name. Every emitted row is appended to
//! `most_ordered_categories.txt`; the primary store is never written.

use std::collections::BTreeMap;

use anyhow::{Context, Result};

use crate::audit::{self, AuditLog};
use crate::models::{CategoryRanking, CategoryTotal};
use crate::store::Repository;

/// Compute rankings from the store, auditing each emitted row.
pub async fn most_ordered_categories(
    repo: &dyn Repository,
    audit_log: &dyn AuditLog,
) -> Result<Vec<CategoryRanking>> {
    let totals = repo
        .category_totals()
        .await
        .context("querying category totals")?;

    let rankings = rank_categories(totals);
    for ranking in &rankings {
        audit::record(audit_log, audit::CATEGORIES_LOG, ranking);
    }
    tracing::info!(rows = rankings.len(), "computed most ordered categories");
    Ok(rankings)
}

/// Keep, per user, every category tied for the highest total.
pub fn rank_categories(totals: Vec<CategoryTotal>) -> Vec<CategoryRanking> {
    let mut by_user: BTreeMap<i64, Vec<(String, i64)>> = BTreeMap::new();
    for total in totals {
        by_user
            .entry(total.user_id)
            .or_default()
            .push((total.category, total.quantity));
    }

    let mut rankings = Vec::new();
    for (user_id, mut categories) in by_user {
        let Some(max) = categories.iter().map(|(_, q)| *q).max() else {
            continue;
        };
        categories.sort_by(|a, b| a.0.cmp(&b.0));
        rankings.extend(
            categories
                .into_iter()
                .filter(|(_, q)| *q == max)
                .map(|(category_name, total_orders)| CategoryRanking {
                    user_id,
                    category_name,
                    total_orders,
                }),
        );
    }
    rankings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::{MemoryAuditLog, CATEGORIES_LOG};
    use crate::models::{Cart, LineItem, Product};
    use crate::store::memory::InMemoryRepository;

    fn total(user_id: i64, category: &str, quantity: i64) -> CategoryTotal {
        CategoryTotal {
            user_id,
            category: category.to_string(),
            quantity,
        }
    }

    fn pairs(rankings: &[CategoryRanking]) -> Vec<(i64, &str, i64)> {
        rankings
            .iter()
            .map(|r| (r.user_id, r.category_name.as_str(), r.total_orders))
            .collect()
    }

    #[test]
    fn test_ties_are_all_reported() {
        let rankings = rank_categories(vec![
            total(1, "C", 3),
            total(1, "B", 5),
            total(1, "A", 5),
        ]);
        assert_eq!(pairs(&rankings), vec![(1, "A", 5), (1, "B", 5)]);
    }

    #[test]
    fn test_single_maximum() {
        let rankings = rank_categories(vec![total(1, "A", 5), total(1, "B", 2)]);
        assert_eq!(pairs(&rankings), vec![(1, "A", 5)]);
    }

    #[test]
    fn test_users_are_independent_and_ordered() {
        let rankings = rank_categories(vec![
            total(9, "tops", 1),
            total(2, "beauty", 4),
            total(2, "laptops", 1),
            total(9, "shoes", 1),
        ]);
        assert_eq!(
            pairs(&rankings),
            vec![(2, "beauty", 4), (9, "shoes", 1), (9, "tops", 1)]
        );
    }

    #[test]
    fn test_no_totals_no_rows() {
        assert!(rank_categories(Vec::new()).is_empty());
    }

    #[tokio::test]
    async fn test_end_to_end_with_audit() {
        let repo = InMemoryRepository::new();
        for (product_id, category) in [(1, "A"), (2, "B"), (3, "C")] {
            repo.insert_product(&Product {
                product_id,
                title: String::new(),
                description: String::new(),
                category: category.to_string(),
                price: 0.0,
            })
            .await
            .unwrap();
        }
        repo.insert_cart(&Cart {
            cart_id: 1,
            user_id: 42,
        })
        .await
        .unwrap();
        repo.insert_cart(&Cart {
            cart_id: 2,
            user_id: 42,
        })
        .await
        .unwrap();
        for (cart_id, product_id, quantity) in [(1, 1, 2), (2, 1, 3), (1, 2, 5), (2, 3, 3)] {
            repo.insert_line_item(&LineItem {
                cart_id,
                product_id,
                quantity,
            })
            .await
            .unwrap();
        }

        let audit = MemoryAuditLog::new();
        let rankings = most_ordered_categories(&repo, &audit).await.unwrap();
        assert_eq!(pairs(&rankings), vec![(42, "A", 5), (42, "B", 5)]);

        let lines = audit.lines(CATEGORIES_LOG);
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("category_name=\"A\""));

        // Appends accumulate across computations.
        most_ordered_categories(&repo, &audit).await.unwrap();
        assert_eq!(audit.lines(CATEGORIES_LOG).len(), 4);
    }
}
