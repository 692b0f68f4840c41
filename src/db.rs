//! SQLite connection pool.
//!
//! Ingestion holds one connection at a time, for exactly one statement, so
//! every existence check and insert commits on its own. A couple of spare
//! connections let concurrent HTTP reads proceed while WAL keeps readers
//! off the writer's back.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use sqlx::sqlite::{
    SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions, SqliteSynchronous,
};

use crate::config::DbConfig;

/// One writer plus concurrent readers for the HTTP server.
const MAX_CONNECTIONS: u32 = 4;

/// How long a statement waits on a locked database before failing.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Open the pool for `[db].path`, creating the file and its directory.
pub async fn connect(db: &DbConfig) -> Result<SqlitePool> {
    let path: &Path = &db.path;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating database directory {}", parent.display()))?;
    }

    let options = SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .synchronous(SqliteSynchronous::Normal)
        .busy_timeout(BUSY_TIMEOUT);

    SqlitePoolOptions::new()
        .max_connections(MAX_CONNECTIONS)
        .connect_with(options)
        .await
        .with_context(|| format!("opening database {}", path.display()))
}
