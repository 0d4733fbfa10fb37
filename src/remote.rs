//! Remote table client.
//!
//! The remote store is addressed by a base URL plus a named sub-table
//! (sheet). Reads fetch every record; writes replace the sub-table in
//! full (clear + write) — there is no partial update on the wire. The
//! `RemoteTable` trait is the seam: the CLI talks to `HttpRemote`, tests
//! and offline runs use `MemoryRemote`.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use crate::config::RemoteConfig;
use crate::error::{Error, Result};
use crate::record::RawRow;

/// A remote table holding named sub-tables of loose rows.
pub trait RemoteTable {
    /// Fetch all records of a sub-table. A missing sub-table is an empty
    /// table, not an error.
    fn fetch(&self, sheet: &str) -> Result<Vec<RawRow>>;

    /// Replace a sub-table wholesale with the given rows.
    fn replace(&self, sheet: &str, rows: &[RawRow]) -> Result<()>;
}

/// HTTP-backed remote table speaking JSON.
///
/// `GET {base}/tables/{sheet}` returns a JSON array of string-map records;
/// `PUT` on the same path replaces the sub-table with the request body.
pub struct HttpRemote {
    agent: ureq::Agent,
    base_url: String,
}

impl HttpRemote {
    pub fn new(config: &RemoteConfig) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build();
        Self {
            agent,
            base_url: config.url.trim_end_matches('/').to_string(),
        }
    }

    fn sheet_url(&self, sheet: &str) -> String {
        format!("{}/tables/{}", self.base_url, sheet)
    }
}

impl RemoteTable for HttpRemote {
    fn fetch(&self, sheet: &str) -> Result<Vec<RawRow>> {
        let url = self.sheet_url(sheet);
        match self.agent.get(&url).call() {
            Ok(response) => response
                .into_json::<Vec<RawRow>>()
                .map_err(|err| Error::Remote(format!("invalid response from {url}: {err}"))),
            Err(ureq::Error::Status(404, _)) => Ok(Vec::new()),
            Err(ureq::Error::Status(code, _)) => {
                Err(Error::Remote(format!("GET {url} returned HTTP {code}")))
            }
            Err(err) => Err(Error::Remote(format!("GET {url} failed: {err}"))),
        }
    }

    fn replace(&self, sheet: &str, rows: &[RawRow]) -> Result<()> {
        let url = self.sheet_url(sheet);
        match self.agent.put(&url).send_json(rows) {
            Ok(_) => Ok(()),
            Err(ureq::Error::Status(code, _)) => {
                Err(Error::Remote(format!("PUT {url} returned HTTP {code}")))
            }
            Err(err) => Err(Error::Remote(format!("PUT {url} failed: {err}"))),
        }
    }
}

/// In-memory remote table for tests and offline sessions.
#[derive(Default)]
pub struct MemoryRemote {
    sheets: Mutex<HashMap<String, Vec<RawRow>>>,
    fail: AtomicBool,
}

impl MemoryRemote {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a sub-table with rows.
    pub fn seed(&self, sheet: &str, rows: Vec<RawRow>) {
        self.sheets
            .lock()
            .expect("remote sheets lock")
            .insert(sheet.to_string(), rows);
    }

    /// Current rows of a sub-table (empty when absent).
    pub fn rows(&self, sheet: &str) -> Vec<RawRow> {
        self.sheets
            .lock()
            .expect("remote sheets lock")
            .get(sheet)
            .cloned()
            .unwrap_or_default()
    }

    /// Make every subsequent call fail with a remote error.
    pub fn set_failing(&self, failing: bool) {
        self.fail.store(failing, Ordering::SeqCst);
    }

    fn check_failing(&self) -> Result<()> {
        if self.fail.load(Ordering::SeqCst) {
            Err(Error::Remote("injected remote failure".to_string()))
        } else {
            Ok(())
        }
    }
}

impl RemoteTable for MemoryRemote {
    fn fetch(&self, sheet: &str) -> Result<Vec<RawRow>> {
        self.check_failing()?;
        Ok(self.rows(sheet))
    }

    fn replace(&self, sheet: &str, rows: &[RawRow]) -> Result<()> {
        self.check_failing()?;
        self.seed(sheet, rows.to_vec());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(id: &str) -> RawRow {
        let mut raw = RawRow::new();
        raw.insert("Id".to_string(), id.to_string());
        raw
    }

    #[test]
    fn memory_remote_missing_sheet_is_empty() {
        let remote = MemoryRemote::new();
        assert!(remote.fetch("tasks").expect("fetch").is_empty());
    }

    #[test]
    fn memory_remote_replace_overwrites() {
        let remote = MemoryRemote::new();
        remote.seed("tasks", vec![row("T-1"), row("T-2")]);

        remote.replace("tasks", &[row("T-3")]).expect("replace");
        let rows = remote.fetch("tasks").expect("fetch");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get("Id").map(String::as_str), Some("T-3"));
    }

    #[test]
    fn memory_remote_injected_failure() {
        let remote = MemoryRemote::new();
        remote.set_failing(true);
        assert!(matches!(remote.fetch("tasks"), Err(Error::Remote(_))));
        assert!(matches!(remote.replace("tasks", &[]), Err(Error::Remote(_))));
    }

    #[test]
    fn http_remote_builds_sheet_urls() {
        let config = RemoteConfig {
            url: "https://sheets.internal/api/".to_string(),
            ..RemoteConfig::default()
        };
        let remote = HttpRemote::new(&config);
        assert_eq!(
            remote.sheet_url("tasks"),
            "https://sheets.internal/api/tables/tasks"
        );
    }
}
