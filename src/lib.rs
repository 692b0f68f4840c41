//! # shopsync
//!
//! Mirrors a paginated e-commerce REST API (users, products, carts) into a
//! local SQLite store, deduplicating on natural keys, and serves the mirrored
//! data plus a per-user "most ordered category" aggregation.
//!
//! The domain logic lives in `shopsync-core`; this crate is the native shell
//! around it.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐   ┌───────────────┐   ┌──────────┐
//! │  Upstream   │──▶│   Pipelines   │──▶│  SQLite  │
//! │  REST API   │   │ dedup+geocode │   │  store   │
//! └─────────────┘   └───────┬───────┘   └────┬─────┘
//!                           ▼                ▼
//!                   ┌───────────────┐   ┌──────────┐
//!                   │  audit/*.txt  │◀──│CLI / HTTP│
//!                   └───────────────┘   └──────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! shopsync init                 # create database
//! shopsync ingest all           # users, carts, products
//! shopsync categories           # most ordered category per user
//! shopsync serve                # ingest, then serve the JSON API
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`db`] | Database connection |
//! | [`migrate`] | Schema migrations |
//! | [`sqlite_store`] | SQLite repository |
//! | [`connector_http`] | Upstream page source |
//! | [`audit_file`] | Flat-file audit logs |
//! | [`ingest`] | Ingest orchestration |
//! | [`categories`] | Category rankings command |
//! | [`server`] | JSON HTTP server |
//! | [`logging`] | Tracing subscriber setup |

pub mod audit_file;
pub mod categories;
pub mod config;
pub mod connector_http;
pub mod db;
pub mod ingest;
pub mod logging;
pub mod migrate;
pub mod server;
pub mod sqlite_store;
