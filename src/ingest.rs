//! Ingestion orchestration.
//!
//! Wires the HTTP page source, the SQLite repository, the flat-file audit
//! log and the GeoNames geocoder into an [`Ingestor`], then runs the
//! requested pipelines one after another: users → carts → products.
//! The first fatal error aborts the remaining pipelines.

use anyhow::{Context, Result};

use shopsync_core::geocode::GeoNamesGeocoder;
use shopsync_core::pipeline::{Collection, IngestStats, Ingestor};

use crate::audit_file::FileAuditLog;
use crate::config::Config;
use crate::connector_http::HttpPageSource;
use crate::db;
use crate::migrate;
use crate::sqlite_store::SqliteRepository;

/// Resolve an `ingest` target to the collections it covers, in wiring order.
pub fn parse_target(target: &str) -> Result<Vec<Collection>> {
    if target == "all" {
        return Ok(Collection::ALL.to_vec());
    }
    let collection: Collection = target
        .parse()
        .with_context(|| format!("invalid ingest target '{}' (or use 'all')", target))?;
    Ok(vec![collection])
}

/// Run the pipelines for `collections` and print a summary for each.
pub async fn run_ingest(
    config: &Config,
    collections: &[Collection],
) -> Result<Vec<(Collection, IngestStats)>> {
    let pool = db::connect(&config.db).await?;
    migrate::migrate(&pool, false).await?;

    let repo = SqliteRepository::new(pool);
    let source = HttpPageSource::new(&config.source)?;
    let audit = FileAuditLog::new(&config.audit.dir);
    let geocoder = GeoNamesGeocoder::new();

    let ingestor = Ingestor::new(&source, &repo, &audit).with_page_size(config.source.page_size);

    let mut results = Vec::with_capacity(collections.len());
    for &collection in collections {
        tracing::info!(%collection, "starting pipeline");
        let stats = match ingestor.run_collection(collection, &geocoder).await {
            Ok(stats) => stats,
            Err(e) => {
                tracing::error!(%collection, error = %format!("{:#}", e), "pipeline failed");
                repo.pool().close().await;
                return Err(e.context(format!("ingesting {}", collection)));
            }
        };
        print_stats(collection, &stats);
        results.push((collection, stats));
    }

    repo.pool().close().await;
    Ok(results)
}

fn print_stats(collection: Collection, stats: &IngestStats) {
    println!("ingest {}", collection);
    println!("  batches: {}", stats.batches);
    println!("  fetched: {}", stats.fetched);
    println!("  inserted: {}", stats.inserted);
    println!("  skipped (existing): {}", stats.skipped_existing);
    if stats.skipped_missing_key > 0 {
        println!("  skipped (missing key): {}", stats.skipped_missing_key);
    }
    if collection == Collection::Carts {
        println!("  line items: {}", stats.line_items);
    }
    println!("ok");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_target() {
        assert_eq!(parse_target("all").unwrap(), Collection::ALL.to_vec());
        assert_eq!(parse_target("carts").unwrap(), vec![Collection::Carts]);

        let err = parse_target("orders").unwrap_err();
        assert!(format!("{:#}", err).contains("Available: users, carts, products"));
    }
}
