//! Flat-file [`AuditLog`]: one text file per log name inside a directory.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::PathBuf;

use shopsync_core::audit::AuditLog;

pub struct FileAuditLog {
    dir: PathBuf,
}

impl FileAuditLog {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path(&self, log: &str) -> PathBuf {
        self.dir.join(log)
    }
}

impl AuditLog for FileAuditLog {
    fn truncate(&self, log: &str) -> io::Result<()> {
        fs::create_dir_all(&self.dir)?;
        fs::write(self.path(log), "")
    }

    fn append(&self, log: &str, line: &str) -> io::Result<()> {
        fs::create_dir_all(&self.dir)?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.path(log))?;
        writeln!(file, "{}", line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_append_then_truncate() {
        let tmp = TempDir::new().unwrap();
        let audit = FileAuditLog::new(tmp.path().join("audit"));

        audit.append("carts.txt", "Cart(cart_id=1, user_id=2)").unwrap();
        audit.append("carts.txt", "Cart(cart_id=2, user_id=2)").unwrap();
        let content = fs::read_to_string(audit.path("carts.txt")).unwrap();
        assert_eq!(
            content,
            "Cart(cart_id=1, user_id=2)\nCart(cart_id=2, user_id=2)\n"
        );

        audit.truncate("carts.txt").unwrap();
        assert_eq!(fs::read_to_string(audit.path("carts.txt")).unwrap(), "");
    }

    #[test]
    fn test_unwritable_directory_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let blocker = tmp.path().join("file");
        fs::write(&blocker, "x").unwrap();

        let audit = FileAuditLog::new(blocker.join("audit"));
        assert!(audit.append("users.txt", "line").is_err());
        assert!(audit.truncate("users.txt").is_err());
    }
}
