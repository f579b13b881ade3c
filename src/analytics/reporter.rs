//! Journal reporter: aggregates action outcomes for `chimera stats`.

use std::collections::HashMap;

use crate::analytics::logger::{Outcome, SyncLogEntry};
use crate::api::FailureKind;

// ---------------------------------------------------------------------------
// Aggregated stats
// ---------------------------------------------------------------------------

/// Summary over a set of journal entries.
#[derive(Debug, Default)]
pub struct Stats {
    pub total: usize,
    pub ok: usize,
    pub failed: usize,
    pub stale: usize,
    pub failures: FailureBreakdown,
    /// Per-action statistics, busiest first.
    pub actions: Vec<ActionStat>,
}

impl Stats {
    /// Share of entries that failed, as a percentage.
    pub fn failure_pct(&self) -> f64 {
        pct(self.failed, self.total)
    }
}

/// Failure counts by kind.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FailureBreakdown {
    pub network: usize,
    pub http: usize,
    pub logical: usize,
}

#[derive(Debug, Clone)]
pub struct ActionStat {
    pub action: String,
    pub count: usize,
    pub failed: usize,
    pub stale: usize,
    pub avg_latency_ms: f64,
    /// Message of the most recent failure, if any.
    pub last_error: Option<String>,
}

fn pct(part: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        (part as f64 / total as f64) * 100.0
    }
}

// ---------------------------------------------------------------------------
// Aggregation
// ---------------------------------------------------------------------------

/// Aggregate journal entries. Entries are expected in append order.
pub fn summarize(entries: &[SyncLogEntry]) -> Stats {
    let mut stats = Stats {
        total: entries.len(),
        ..Stats::default()
    };

    struct Acc {
        count: usize,
        failed: usize,
        stale: usize,
        latency_total: u64,
        last_error: Option<String>,
    }

    let mut by_action: HashMap<&str, Acc> = HashMap::new();

    for entry in entries {
        match entry.outcome {
            Outcome::Ok => stats.ok += 1,
            Outcome::Failed => stats.failed += 1,
            Outcome::Stale => stats.stale += 1,
        }
        match entry.failure {
            Some(FailureKind::Network) => stats.failures.network += 1,
            Some(FailureKind::Http) => stats.failures.http += 1,
            Some(FailureKind::Logical) => stats.failures.logical += 1,
            None => {}
        }

        let acc = by_action.entry(entry.action.as_str()).or_insert(Acc {
            count: 0,
            failed: 0,
            stale: 0,
            latency_total: 0,
            last_error: None,
        });
        acc.count += 1;
        acc.latency_total += entry.latency_ms;
        match entry.outcome {
            Outcome::Failed => {
                acc.failed += 1;
                acc.last_error = entry.message.clone();
            }
            Outcome::Stale => acc.stale += 1,
            Outcome::Ok => {}
        }
    }

    let mut actions: Vec<ActionStat> = by_action
        .into_iter()
        .map(|(action, acc)| ActionStat {
            action: action.to_string(),
            count: acc.count,
            failed: acc.failed,
            stale: acc.stale,
            avg_latency_ms: acc.latency_total as f64 / acc.count as f64,
            last_error: acc.last_error,
        })
        .collect();
    actions.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.action.cmp(&b.action)));
    stats.actions = actions;

    stats
}
