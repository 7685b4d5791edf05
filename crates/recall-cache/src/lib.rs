//! Durable response cache on SQLite.
//!
//! Every call opens its own connection and drops it before returning, so the
//! cache can be shared freely between threads and request handlers.

use rusqlite::{params, Connection, OptionalExtension};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

use recall_core::error::{Error, Result};
use recall_core::SummaryLength;

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS cache (query TEXT PRIMARY KEY, response TEXT NOT NULL)";
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Cache key for a summary of `text` at `length`: `"{label bytes}:{label}:{text}"`.
///
/// The byte count fixes where the label ends, so the key splits back into
/// exactly one (length, text) pair even when the label contains ':'.
pub fn summary_key(text: &str, length: &SummaryLength) -> String {
    let label = length.as_str();
    format!("{}:{}:{}", label.len(), label, text)
}

#[derive(Debug, Clone)]
pub struct ResponseCache {
    path: PathBuf,
}

impl ResponseCache {
    /// Create the database file (and its directory) and the table if needed.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let cache = Self { path };
        let conn = cache.connect().map_err(|e| Error::CacheWrite(e.to_string()))?;
        conn.execute_batch("PRAGMA journal_mode = WAL;")
            .map_err(|e| Error::CacheWrite(e.to_string()))?;
        conn.execute_batch(SCHEMA).map_err(|e| Error::CacheWrite(e.to_string()))?;
        debug!("Response cache ready at {}", cache.path.display());
        Ok(cache)
    }

    pub fn path(&self) -> &Path { &self.path }

    fn connect(&self) -> rusqlite::Result<Connection> {
        let conn = Connection::open(&self.path)?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        Ok(conn)
    }

    pub fn get(&self, key: &str) -> Result<Option<String>> {
        let conn = self.connect().map_err(|e| Error::Operation(format!("cache read: {e}")))?;
        conn.query_row("SELECT response FROM cache WHERE query = ?1", params![key], |row| row.get(0))
            .optional()
            .map_err(|e| Error::Operation(format!("cache read: {e}")))
    }

    /// Insert if absent. Returns `false` when the key already held a value,
    /// which is left untouched.
    pub fn put(&self, key: &str, value: &str) -> Result<bool> {
        let conn = self.connect().map_err(|e| Error::CacheWrite(e.to_string()))?;
        let written = conn
            .execute("INSERT OR IGNORE INTO cache (query, response) VALUES (?1, ?2)", params![key, value])
            .map_err(|e| Error::CacheWrite(e.to_string()))?;
        Ok(written > 0)
    }

    pub fn len(&self) -> Result<usize> {
        let conn = self.connect().map_err(|e| Error::Operation(format!("cache read: {e}")))?;
        let n: i64 = conn
            .query_row("SELECT COUNT(*) FROM cache", [], |row| row.get(0))
            .map_err(|e| Error::Operation(format!("cache read: {e}")))?;
        Ok(usize::try_from(n).unwrap_or(0))
    }

    pub fn is_empty(&self) -> Result<bool> { Ok(self.len()? == 0) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn key_is_length_prefixed() {
        assert_eq!(summary_key("hello", &SummaryLength::SHORT), "5:short:hello");
        assert_eq!(summary_key("a:b", &SummaryLength::LONG), "4:long:a:b");
    }

    #[test]
    fn keys_are_injective_over_text_and_length() {
        let texts = ["", ":", "short:x", "x", "medium:", "1:a:b"];
        let lengths = [
            SummaryLength::SHORT,
            SummaryLength::MEDIUM,
            SummaryLength::LONG,
            SummaryLength::new("a"),
            SummaryLength::new("a:b"),
            SummaryLength::new("1:a"),
        ];
        let mut seen = std::collections::HashSet::new();
        for t in texts {
            for l in &lengths {
                assert!(seen.insert(summary_key(t, l)), "collision for ({t:?}, {l})");
            }
        }
    }
}
