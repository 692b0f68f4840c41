//! Append-only audit logs of persisted records.
//!
//! Audit writes are best effort: [`record`] and [`reset`] report failures
//! through `tracing` and never fail the caller.

use std::collections::HashMap;
use std::fmt;
use std::io;
use std::sync::RwLock;

pub const USERS_LOG: &str = "users.txt";
pub const PRODUCTS_LOG: &str = "products.txt";
pub const CARTS_LOG: &str = "carts.txt";
pub const LINE_ITEMS_LOG: &str = "products_from_carts.txt";
pub const CATEGORIES_LOG: &str = "most_ordered_categories.txt";

/// A set of named, append-only text logs.
pub trait AuditLog: Send + Sync {
    /// Empty the named log, creating it if needed.
    fn truncate(&self, log: &str) -> io::Result<()>;

    /// Append one line to the named log.
    fn append(&self, log: &str, line: &str) -> io::Result<()>;
}

/// Append `record`'s display form to `log`, reporting failures.
pub fn record(audit: &dyn AuditLog, log: &str, record: &dyn fmt::Display) {
    let line = record.to_string();
    if let Err(e) = audit.append(log, &line) {
        tracing::warn!(log, error = %e, "failed to append audit record");
    }
}

/// Truncate `log`, reporting failures.
pub fn reset(audit: &dyn AuditLog, log: &str) {
    if let Err(e) = audit.truncate(log) {
        tracing::warn!(log, error = %e, "failed to truncate audit log");
    }
}

/// In-memory audit log for tests and embedding.
#[derive(Default)]
pub struct MemoryAuditLog {
    logs: RwLock<HashMap<String, Vec<String>>>,
}

impl MemoryAuditLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lines currently held by `log`.
    pub fn lines(&self, log: &str) -> Vec<String> {
        self.logs
            .read()
            .map(|logs| logs.get(log).cloned().unwrap_or_default())
            .unwrap_or_default()
    }
}

fn poisoned() -> io::Error {
    io::Error::other("audit log lock poisoned")
}

impl AuditLog for MemoryAuditLog {
    fn truncate(&self, log: &str) -> io::Result<()> {
        let mut logs = self.logs.write().map_err(|_| poisoned())?;
        logs.insert(log.to_string(), Vec::new());
        Ok(())
    }

    fn append(&self, log: &str, line: &str) -> io::Result<()> {
        let mut logs = self.logs.write().map_err(|_| poisoned())?;
        logs.entry(log.to_string())
            .or_default()
            .push(line.to_string());
        Ok(())
    }
}
