//! # shopsync core
//!
//! Runtime-agnostic logic for shopsync: data models, upstream payload
//! schemas, pagination, the repository and audit-log seams, the ingestion
//! pipelines, and the most-ordered-category aggregation.
//!
//! This crate contains no tokio, sqlx, HTTP client, or filesystem I/O.
//! Native implementations of [`store::Repository`], [`source::PageSource`]
//! and [`audit::AuditLog`] live in the `shopsync` package.

pub mod aggregate;
pub mod audit;
pub mod error;
pub mod geocode;
pub mod models;
pub mod payload;
pub mod pipeline;
pub mod query;
pub mod source;
pub mod store;
