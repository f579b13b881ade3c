use std::fs::{self, OpenOptions, create_dir_all};
use std::io::{BufRead, BufReader, Write};
use std::path::PathBuf;

use anyhow::Result;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::api::FailureKind;

// ---------------------------------------------------------------------------
// Journal entry (JSONL)
// ---------------------------------------------------------------------------

/// How an action ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    /// Confirmed by the service and, for mirror writes, applied.
    Ok,
    /// Network, HTTP or logical failure.
    Failed,
    /// Confirmed by the service but discarded because a newer-issued call
    /// had already been applied, or the core was torn down.
    Stale,
}

/// A single line of `~/.chimera/sync-log.jsonl`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncLogEntry {
    pub timestamp: String,
    /// Action name, e.g. `"refresh"` or `"control:start"`.
    pub action: String,
    pub outcome: Outcome,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure: Option<FailureKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default)]
    pub latency_ms: u64,
}

impl SyncLogEntry {
    pub fn new(action: &str, outcome: Outcome, latency_ms: u64) -> Self {
        Self {
            timestamp: Utc::now().to_rfc3339(),
            action: action.to_string(),
            outcome,
            failure: None,
            message: None,
            latency_ms,
        }
    }

    pub fn with_failure(mut self, kind: FailureKind, message: &str) -> Self {
        self.failure = Some(kind);
        self.message = Some(message.to_string());
        self
    }
}

// ---------------------------------------------------------------------------
// Journal
// ---------------------------------------------------------------------------

/// Append-only action journal.
///
/// Recording is best-effort: I/O failures are swallowed so that logging can
/// never turn a successful action into a failed one.
#[derive(Debug, Clone, Default)]
pub struct Journal {
    path: Option<PathBuf>,
}

impl Journal {
    /// Journal at `~/.chimera/sync-log.jsonl`.
    pub fn default_location() -> Self {
        Self {
            path: journal_path(),
        }
    }

    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
        }
    }

    /// A journal that records nothing.
    pub fn disabled() -> Self {
        Self { path: None }
    }

    pub fn path(&self) -> Option<&PathBuf> {
        self.path.as_ref()
    }

    pub fn record(&self, entry: &SyncLogEntry) {
        let _ = self.append(entry);
    }

    fn append(&self, entry: &SyncLogEntry) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        if let Some(parent) = path.parent() {
            create_dir_all(parent)?;
        }

        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        let json = serde_json::to_string(entry)?;
        writeln!(file, "{json}")?;

        Ok(())
    }

    /// Read every entry, skipping malformed lines.
    pub fn read_all(&self) -> Vec<SyncLogEntry> {
        let Some(path) = &self.path else {
            return Vec::new();
        };

        let Ok(file) = fs::File::open(path) else {
            return Vec::new();
        };

        BufReader::new(file)
            .lines()
            .map_while(Result::ok)
            .filter_map(|line| serde_json::from_str::<SyncLogEntry>(&line).ok())
            .collect()
    }

    /// Entries from the last `days` days, or everything when `None`.
    pub fn read_since_days(&self, days: Option<u32>) -> Vec<SyncLogEntry> {
        let entries = self.read_all();

        let Some(days) = days else {
            return entries;
        };

        let cutoff = (Utc::now() - chrono::Duration::days(i64::from(days))).to_rfc3339();
        entries
            .into_iter()
            .filter(|e| e.timestamp >= cutoff)
            .collect()
    }
}

/// Return the path to the journal file.
pub fn journal_path() -> Option<PathBuf> {
    crate::config::data_dir().map(|dir| dir.join("sync-log.jsonl"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_journal(name: &str) -> Journal {
        let path = std::env::temp_dir()
            .join(format!("chimera-journal-{}-{name}", std::process::id()))
            .join("sync-log.jsonl");
        let _ = fs::remove_file(&path);
        Journal::at(path)
    }

    #[test]
    fn records_and_reads_back_entries() {
        let journal = scratch_journal("roundtrip");
        journal.record(&SyncLogEntry::new("refresh", Outcome::Ok, 12));
        journal.record(
            &SyncLogEntry::new("control:start", Outcome::Failed, 3)
                .with_failure(FailureKind::Http, "API request failed: 500 Internal Server Error"),
        );

        let entries = journal.read_all();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].action, "refresh");
        assert_eq!(entries[1].failure, Some(FailureKind::Http));
        assert!(entries[1].message.as_deref().unwrap().contains("500"));
    }

    #[test]
    fn malformed_lines_are_skipped() {
        let journal = scratch_journal("malformed");
        journal.record(&SyncLogEntry::new("refresh", Outcome::Ok, 1));
        let path = journal.path().unwrap().clone();
        let mut file = OpenOptions::new().append(true).open(&path).unwrap();
        writeln!(file, "not json").unwrap();
        journal.record(&SyncLogEntry::new("refresh", Outcome::Stale, 1));

        assert_eq!(journal.read_all().len(), 2);
    }

    #[test]
    fn disabled_journal_records_nothing() {
        let journal = Journal::disabled();
        journal.record(&SyncLogEntry::new("refresh", Outcome::Ok, 1));
        assert!(journal.read_all().is_empty());
    }

    #[test]
    fn day_filter_drops_old_entries() {
        let journal = scratch_journal("days");
        let mut old = SyncLogEntry::new("refresh", Outcome::Ok, 1);
        old.timestamp = (Utc::now() - chrono::Duration::days(10)).to_rfc3339();
        journal.record(&old);
        journal.record(&SyncLogEntry::new("refresh", Outcome::Ok, 1));

        assert_eq!(journal.read_since_days(Some(7)).len(), 1);
        assert_eq!(journal.read_since_days(None).len(), 2);
    }

    #[test]
    fn entry_serialization_omits_empty_failure() {
        let line = serde_json::to_string(&SyncLogEntry::new("refresh", Outcome::Ok, 5)).unwrap();
        assert!(!line.contains("failure"));
        assert!(line.contains(r#""outcome":"ok""#));
    }
}
