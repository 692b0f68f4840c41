//! `shopsync categories`: print each user's most-ordered categories.

use std::sync::Arc;

use anyhow::Result;

use shopsync_core::models::CategoryRanking;
use shopsync_core::query::QueryService;

use crate::audit_file::FileAuditLog;
use crate::config::Config;
use crate::db;
use crate::migrate;
use crate::sqlite_store::SqliteRepository;

pub async fn run_categories(config: &Config) -> Result<()> {
    let pool = db::connect(&config.db).await?;
    migrate::migrate(&pool, false).await?;
    let queries = QueryService::new(
        Arc::new(SqliteRepository::new(pool.clone())),
        Arc::new(FileAuditLog::new(&config.audit.dir)),
    );

    let rankings = queries.list_most_ordered_categories().await?;
    pool.close().await;

    if rankings.is_empty() {
        println!("No carts ingested.");
        return Ok(());
    }
    print!("{}", format_table(&rankings));
    Ok(())
}

/// Render rankings as an aligned `USER CATEGORY TOTAL` table.
pub fn format_table(rankings: &[CategoryRanking]) -> String {
    let width = rankings
        .iter()
        .map(|r| r.category_name.len())
        .max()
        .unwrap_or(0)
        .max("CATEGORY".len());

    let mut out = format!("{:<6}  {:<width$}  {:>5}\n", "USER", "CATEGORY", "TOTAL");
    for r in rankings {
        out.push_str(&format!(
            "{:<6}  {:<width$}  {:>5}\n",
            r.user_id, r.category_name, r.total_orders
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_alignment() {
        let rows = vec![
            CategoryRanking {
                user_id: 5,
                category_name: "home-decoration".into(),
                total_orders: 7,
            },
            CategoryRanking {
                user_id: 12,
                category_name: "beauty".into(),
                total_orders: 11,
            },
        ];

        let table = format_table(&rows);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines[0], "USER    CATEGORY         TOTAL");
        assert_eq!(lines[1], "5       home-decoration      7");
        assert_eq!(lines[2], "12      beauty              11");
    }
}
