/// The local mirror of remote bot state.
///
/// Every call that may write the mirror takes a [`Ticket`] at issuance.
/// Each mirrored field remembers the ticket of the last write applied to
/// it and only accepts writes carrying a newer ticket, so the newest-issued
/// response wins regardless of completion order. Fields are gated
/// independently: a status refresh issued before an AI-settings write can
/// still update the run state without reverting the newer AI settings.
///
/// The AI settings live in exactly one place. The `ai_features` of the
/// status view and the standalone AI settings view are both derived from it.
use serde::Serialize;

use crate::api::{AiFeatures, BotState, BotStatus, MonitoringData};

/// Issuance order of an in-flight call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Ticket {
    seq: u64,
    tracks_loading: bool,
}

/// A value plus the ticket of the write that produced it.
#[derive(Debug, Clone, Default)]
struct Versioned<T> {
    value: T,
    applied: u64,
}

impl<T> Versioned<T> {
    /// Write `value` if `ticket` is newer than the last applied write.
    fn offer(&mut self, ticket: Ticket, value: T) -> bool {
        if ticket.seq <= self.applied {
            return false;
        }
        self.value = value;
        self.applied = ticket.seq;
        true
    }
}

#[derive(Debug, Clone, PartialEq)]
struct StatusHeader {
    status: BotState,
    last_updated: String,
}

/// Read-only copy of the mirror handed to presentation code.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MirrorSnapshot {
    pub status: Option<BotStatus>,
    pub ai_settings: Option<AiFeatures>,
    pub monitoring_data: Option<MonitoringData>,
    pub is_loading: bool,
    pub error: Option<String>,
}

#[derive(Debug)]
pub(crate) struct Mirror {
    header: Versioned<Option<StatusHeader>>,
    channels: Versioned<Vec<String>>,
    ai_features: Versioned<Option<AiFeatures>>,
    monitoring: Versioned<Option<MonitoringData>>,
    error: Versioned<Option<String>>,
    next_seq: u64,
    in_flight: usize,
    alive: bool,
}

impl Default for Mirror {
    fn default() -> Self {
        Self {
            header: Versioned::default(),
            channels: Versioned::default(),
            ai_features: Versioned::default(),
            monitoring: Versioned::default(),
            error: Versioned::default(),
            next_seq: 0,
            in_flight: 0,
            alive: true,
        }
    }
}

impl Mirror {
    // -- Issuance --

    /// Take a ticket for a call about to be issued. Loading-tracked calls
    /// keep `is_loading` true until [`finish`](Self::finish).
    pub fn issue(&mut self, tracks_loading: bool) -> Ticket {
        self.next_seq += 1;
        if tracks_loading {
            self.in_flight += 1;
        }
        Ticket {
            seq: self.next_seq,
            tracks_loading,
        }
    }

    /// Mark a call as completed, applied or not.
    pub fn finish(&mut self, ticket: Ticket) {
        if ticket.tracks_loading {
            self.in_flight = self.in_flight.saturating_sub(1);
        }
    }

    /// Tear down: no further writes are applied.
    pub fn close(&mut self) {
        self.alive = false;
    }

    pub fn is_alive(&self) -> bool {
        self.alive
    }

    // -- Reconciliation --

    /// Replace the whole status. Returns whether any field was written.
    pub fn apply_status(&mut self, ticket: Ticket, status: BotStatus) -> bool {
        if !self.alive {
            return false;
        }
        let header = StatusHeader {
            status: status.status,
            last_updated: status.last_updated,
        };
        let wrote_header = self.header.offer(ticket, Some(header));
        let wrote_channels = self.channels.offer(ticket, status.monitoring_channels);
        let wrote_ai = self.ai_features.offer(ticket, Some(status.ai_features));
        wrote_header || wrote_channels || wrote_ai
    }

    /// Merge only the channel list into the mirrored status. Nothing is
    /// written while no status has been mirrored yet.
    pub fn merge_channels(&mut self, ticket: Ticket, channels: Vec<String>) -> bool {
        if !self.alive || self.header.value.is_none() {
            return false;
        }
        self.channels.offer(ticket, channels)
    }

    /// Replace the single owned AI settings value.
    pub fn apply_ai_features(&mut self, ticket: Ticket, features: AiFeatures) -> bool {
        if !self.alive {
            return false;
        }
        self.ai_features.offer(ticket, Some(features))
    }

    /// Replace the monitoring snapshot wholesale.
    pub fn apply_monitoring(&mut self, ticket: Ticket, data: MonitoringData) -> bool {
        if !self.alive {
            return false;
        }
        self.monitoring.offer(ticket, Some(data))
    }

    /// Set (`Some`) or clear (`None`) the error message. A completion older
    /// than the last error write cannot override it.
    pub fn record_error(&mut self, ticket: Ticket, error: Option<String>) -> bool {
        if !self.alive {
            return false;
        }
        self.error.offer(ticket, error)
    }

    // -- Views --

    /// Status view, composed from the header, channel list and the owned
    /// AI settings.
    pub fn status(&self) -> Option<BotStatus> {
        let header = self.header.value.as_ref()?;
        Some(BotStatus {
            status: header.status,
            last_updated: header.last_updated.clone(),
            monitoring_channels: self.channels.value.clone(),
            ai_features: self.ai_features.value.clone().unwrap_or_default(),
        })
    }

    pub fn has_status(&self) -> bool {
        self.header.value.is_some()
    }

    pub fn ai_settings(&self) -> Option<AiFeatures> {
        self.ai_features.value.clone()
    }

    pub fn monitoring_data(&self) -> Option<&MonitoringData> {
        self.monitoring.value.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.value.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight > 0
    }

    pub fn snapshot(&self) -> MirrorSnapshot {
        MirrorSnapshot {
            status: self.status(),
            ai_settings: self.ai_settings(),
            monitoring_data: self.monitoring.value.clone(),
            is_loading: self.is_loading(),
            error: self.error().map(str::to_string),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
