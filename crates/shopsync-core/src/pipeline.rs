//! Ingestion pipeline: page → decode → dedup → build → persist → audit.
//!
//! One generic runner ([`Ingestor::run`]) drives every entity kind. An
//! [`EntityPipeline`] supplies the parts that differ per kind: collection
//! and log names, the dedup key, the transform, and the insert.
//!
//! | Pipeline | Collection | Dedup key | Audit log(s) |
//! |----------|------------|-----------|--------------|
//! | [`UserPipeline`] | `users` | `email` | `users.txt` |
//! | [`CartPipeline`] | `carts` | `id` | `carts.txt`, `products_from_carts.txt` |
//! | [`ProductPipeline`] | `products` | `id` | `products.txt` |
//!
//! # Per-record rules
//!
//! - A record without a dedup key is skipped as if it were already stored.
//!   The skip is logged and counted in [`IngestStats::skipped_missing_key`].
//! - A record whose key is already stored is skipped with no side effects.
//! - A new record is persisted, then appended to the audit log. For carts,
//!   one line item per nested product entry follows, inserted
//!   unconditionally.
//! - Malformed records, store failures and upstream failures abort the run.
//!   Audit failures are reported and ignored.

use std::fmt;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::de::DeserializeOwned;

use crate::audit::{self, AuditLog};
use crate::error::RecordError;
use crate::geocode::Geocoder;
use crate::models::{Cart, DedupKey, Product, User};
use crate::payload::{self, CartPayload, ProductPayload, UserPayload};
use crate::source::{PageSource, Pages, PAGE_SIZE};
use crate::store::Repository;

/// Counters for one pipeline run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestStats {
    /// Non-empty pages processed.
    pub batches: u64,
    /// Raw records seen across all batches.
    pub fetched: u64,
    /// Records newly persisted (and audited).
    pub inserted: u64,
    /// Records whose dedup key was already stored.
    pub skipped_existing: u64,
    /// Records without a dedup key, treated as already stored.
    pub skipped_missing_key: u64,
    /// Line items persisted alongside new carts.
    pub line_items: u64,
}

/// The per-kind parts of an ingestion pipeline.
#[async_trait]
pub trait EntityPipeline: Send + Sync {
    type Payload: DeserializeOwned + Send + Sync;
    type Record: fmt::Display + Send + Sync;

    /// Upstream collection name.
    fn collection(&self) -> &'static str;

    /// Audit log receiving each persisted record.
    fn audit_log(&self) -> &'static str;

    /// Every log truncated at the start of a run.
    fn logs(&self) -> Vec<&'static str> {
        vec![self.audit_log()]
    }

    fn dedup_key(&self, payload: &Self::Payload) -> Option<DedupKey>;

    fn build(&self, payload: &Self::Payload) -> Result<Self::Record, RecordError>;

    async fn persist(&self, repo: &dyn Repository, record: &Self::Record) -> Result<()>;

    /// Runs after a new record is persisted and audited. Returns the number
    /// of dependent rows written.
    async fn after_persist(
        &self,
        _repo: &dyn Repository,
        _audit: &dyn AuditLog,
        _payload: &Self::Payload,
        _record: &Self::Record,
    ) -> Result<u64> {
        Ok(0)
    }
}

/// Users: dedup on email, country resolved from address coordinates.
pub struct UserPipeline<'a> {
    geocoder: &'a dyn Geocoder,
}

impl<'a> UserPipeline<'a> {
    pub fn new(geocoder: &'a dyn Geocoder) -> Self {
        Self { geocoder }
    }
}

#[async_trait]
impl<'a> EntityPipeline for UserPipeline<'a> {
    type Payload = UserPayload;
    type Record = User;

    fn collection(&self) -> &'static str {
        payload::USERS
    }

    fn audit_log(&self) -> &'static str {
        audit::USERS_LOG
    }

    fn dedup_key(&self, payload: &UserPayload) -> Option<DedupKey> {
        payload.dedup_key()
    }

    fn build(&self, payload: &UserPayload) -> Result<User, RecordError> {
        let (lat, lng) = payload.coordinates()?;
        let country = self.geocoder.resolve_country(lat, lng);
        payload.to_user(country)
    }

    async fn persist(&self, repo: &dyn Repository, user: &User) -> Result<()> {
        repo.insert_user(user).await
    }
}

/// Products: dedup on upstream id.
pub struct ProductPipeline;

#[async_trait]
impl EntityPipeline for ProductPipeline {
    type Payload = ProductPayload;
    type Record = Product;

    fn collection(&self) -> &'static str {
        payload::PRODUCTS
    }

    fn audit_log(&self) -> &'static str {
        audit::PRODUCTS_LOG
    }

    fn dedup_key(&self, payload: &ProductPayload) -> Option<DedupKey> {
        payload.dedup_key()
    }

    fn build(&self, payload: &ProductPayload) -> Result<Product, RecordError> {
        payload.to_product()
    }

    async fn persist(&self, repo: &dyn Repository, product: &Product) -> Result<()> {
        repo.insert_product(product).await
    }
}

/// Carts: dedup on upstream id; new carts bring their line items along.
pub struct CartPipeline;

#[async_trait]
impl EntityPipeline for CartPipeline {
    type Payload = CartPayload;
    type Record = Cart;

    fn collection(&self) -> &'static str {
        payload::CARTS
    }

    fn audit_log(&self) -> &'static str {
        audit::CARTS_LOG
    }

    fn logs(&self) -> Vec<&'static str> {
        vec![audit::CARTS_LOG, audit::LINE_ITEMS_LOG]
    }

    fn dedup_key(&self, payload: &CartPayload) -> Option<DedupKey> {
        payload.dedup_key()
    }

    /// Line items are validated here so a bad entry rejects the cart
    /// before anything is persisted.
    fn build(&self, payload: &CartPayload) -> Result<Cart, RecordError> {
        let cart = payload.to_cart()?;
        payload.line_items(&cart)?;
        Ok(cart)
    }

    async fn persist(&self, repo: &dyn Repository, cart: &Cart) -> Result<()> {
        repo.insert_cart(cart).await
    }

    async fn after_persist(
        &self,
        repo: &dyn Repository,
        audit: &dyn AuditLog,
        payload: &CartPayload,
        cart: &Cart,
    ) -> Result<u64> {
        ingest_line_items(repo, audit, payload, cart).await
    }
}

/// Insert one line item per entry of the cart's nested product list.
///
/// No existence check: cart-level dedup is the only guard against
/// duplicate line items.
pub async fn ingest_line_items(
    repo: &dyn Repository,
    audit_log: &dyn AuditLog,
    payload: &CartPayload,
    cart: &Cart,
) -> Result<u64> {
    let items = payload.line_items(cart)?;
    if items.is_empty() {
        return Ok(0);
    }

    tracing::debug!(cart_id = cart.cart_id, count = items.len(), "processing cart products");
    for item in &items {
        repo.insert_line_item(item)
            .await
            .with_context(|| format!("inserting {}", item))?;
        audit::record(audit_log, audit::LINE_ITEMS_LOG, item);
    }
    Ok(items.len() as u64)
}

/// Upstream collections in wiring order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collection {
    Users,
    Carts,
    Products,
}

impl Collection {
    /// Users, then carts with line items, then products.
    pub const ALL: [Collection; 3] = [Collection::Users, Collection::Carts, Collection::Products];

    pub fn name(self) -> &'static str {
        match self {
            Collection::Users => payload::USERS,
            Collection::Carts => payload::CARTS,
            Collection::Products => payload::PRODUCTS,
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for Collection {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "users" => Ok(Collection::Users),
            "carts" => Ok(Collection::Carts),
            "products" => Ok(Collection::Products),
            other => anyhow::bail!(
                "Unknown collection: '{}'. Available: users, carts, products",
                other
            ),
        }
    }
}

/// Drives pipelines against one source, store and audit log.
pub struct Ingestor<'a> {
    source: &'a dyn PageSource,
    repo: &'a dyn Repository,
    audit: &'a dyn AuditLog,
    page_size: usize,
}

impl<'a> Ingestor<'a> {
    pub fn new(
        source: &'a dyn PageSource,
        repo: &'a dyn Repository,
        audit: &'a dyn AuditLog,
    ) -> Self {
        Self {
            source,
            repo,
            audit,
            page_size: PAGE_SIZE,
        }
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    /// Run the pipeline for one collection.
    pub async fn run_collection(
        &self,
        collection: Collection,
        geocoder: &dyn Geocoder,
    ) -> Result<IngestStats> {
        match collection {
            Collection::Users => self.run(&UserPipeline::new(geocoder)).await,
            Collection::Carts => self.run(&CartPipeline).await,
            Collection::Products => self.run(&ProductPipeline).await,
        }
    }

    /// Drain the pipeline's collection batch by batch.
    pub async fn run<P: EntityPipeline>(&self, pipeline: &P) -> Result<IngestStats> {
        for log in pipeline.logs() {
            audit::reset(self.audit, log);
        }

        let mut stats = IngestStats::default();
        let mut pages = Pages::with_page_size(self.source, pipeline.collection(), self.page_size);
        while let Some(batch) = pages.next_batch().await? {
            stats.batches += 1;
            for raw in batch {
                stats.fetched += 1;
                self.process_record(pipeline, raw, &mut stats).await?;
            }
        }

        tracing::info!(
            collection = pipeline.collection(),
            batches = stats.batches,
            inserted = stats.inserted,
            skipped = stats.skipped_existing + stats.skipped_missing_key,
            "pipeline finished"
        );
        Ok(stats)
    }

    async fn process_record<P: EntityPipeline>(
        &self,
        pipeline: &P,
        raw: serde_json::Value,
        stats: &mut IngestStats,
    ) -> Result<()> {
        let collection = pipeline.collection();
        let payload: P::Payload = payload::decode(collection, raw)?;

        let Some(key) = pipeline.dedup_key(&payload) else {
            tracing::warn!(collection, "record has no dedup key, skipping as already stored");
            stats.skipped_missing_key += 1;
            return Ok(());
        };

        let existing = self
            .repo
            .count_by_key(&key)
            .await
            .with_context(|| format!("checking existence of {}", key))?;
        if existing > 0 {
            tracing::info!(%key, "already exists in store, skipping");
            stats.skipped_existing += 1;
            return Ok(());
        }

        let record = pipeline.build(&payload)?;
        pipeline
            .persist(self.repo, &record)
            .await
            .with_context(|| format!("persisting {}", record))?;
        tracing::debug!(%record, "persisted");
        audit::record(self.audit, pipeline.audit_log(), &record);
        stats.inserted += 1;

        stats.line_items += pipeline
            .after_persist(self.repo, self.audit, &payload, &record)
            .await?;
        Ok(())
    }
}
