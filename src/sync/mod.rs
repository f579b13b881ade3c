/// Synchronization core: the local mirror of remote bot state and the
/// actions that change it.
///
/// [`BotControl`] owns the mirror, an optional background [`poller`], and a
/// [`Journal`] that records the outcome of every remote call. Actions block
/// the calling thread for one remote round trip and always resolve to an
/// [`ActionResult`].
///
/// Reconciliation rules:
///
/// - `refresh` / `control_bot` replace the status wholesale on success and
///   clear the error; on failure they record the error and keep the last
///   known status.
/// - `update_monitoring_channels` merges only the channel list.
/// - `update_ai_settings` replaces the single AI settings value, which both
///   the status view and the AI settings view read from.
/// - Report, analysis, anomaly and health calls never touch the mirror.
///
/// Remote state transitions are requested, not enforced: after
/// `control_bot(Start)` the mirror shows whatever state the service
/// reported, not `online` by assumption.
pub mod action;
pub mod mirror;
mod poller;

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use serde_json::Value;

use crate::analytics::{Journal, Outcome, SyncLogEntry};
use crate::api::{
    AiFeatures, AiReport, ApiResult, BotAction, BotApi, BotStatus, ChimeraClient, Envelope,
    HealthReport, MonitoringData,
};
use crate::config::ChimeraConfig;

pub use action::ActionResult;
use action::{Failure, settle};
use mirror::Mirror;
pub use mirror::MirrorSnapshot;
use poller::Poller;

/// Default report timeframe.
pub const DEFAULT_TIMEFRAME: &str = "24h";

// ---------------------------------------------------------------------------
// Shared state
// ---------------------------------------------------------------------------

/// State shared between the [`BotControl`] handle and its polling thread.
pub(crate) struct Shared {
    api: Box<dyn BotApi>,
    mirror: Mutex<Mirror>,
    journal: Journal,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, Mirror> {
        self.mirror.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn is_alive(&self) -> bool {
        self.lock().is_alive()
    }

    fn log(&self, action: &str, outcome: Outcome, failure: Option<&Failure>, started: Instant) {
        let latency_ms = started.elapsed().as_millis() as u64;
        let mut entry = SyncLogEntry::new(action, outcome, latency_ms);
        if let Some(failure) = failure {
            entry = entry.with_failure(failure.kind, &failure.message);
        }
        self.journal.record(&entry);
    }

    /// Issue a status-replacing call and reconcile its outcome.
    fn reconcile_status(
        &self,
        action: &str,
        logical: &str,
        call: impl FnOnce(&dyn BotApi) -> ApiResult<Envelope<BotStatus>>,
    ) -> ActionResult<BotStatus> {
        let ticket = self.lock().issue(true);
        let started = Instant::now();
        let outcome = settle(call(self.api.as_ref()), logical);

        let mut mirror = self.lock();
        mirror.finish(ticket);
        match outcome {
            Ok((status, message)) => {
                let applied = mirror.apply_status(ticket, status.clone());
                mirror.record_error(ticket, None);
                drop(mirror);
                self.log(action, applied_outcome(applied), None, started);
                ActionResult::ok(status, message)
            }
            Err(failure) => {
                mirror.record_error(ticket, Some(failure.message.clone()));
                drop(mirror);
                self.log(action, Outcome::Failed, Some(&failure), started);
                ActionResult::failed(failure.message)
            }
        }
    }

    /// Run a call that never writes the mirror.
    fn pass_through<T>(
        &self,
        action: &str,
        logical: &str,
        call: impl FnOnce(&dyn BotApi) -> ApiResult<Envelope<T>>,
    ) -> ActionResult<T> {
        let started = Instant::now();
        match settle(call(self.api.as_ref()), logical) {
            Ok((data, message)) => {
                self.log(action, Outcome::Ok, None, started);
                ActionResult::ok(data, message)
            }
            Err(failure) => {
                self.log(action, Outcome::Failed, Some(&failure), started);
                ActionResult::failed(failure.message)
            }
        }
    }

    // -- Mirror-writing actions --

    pub(crate) fn refresh(&self) -> ActionResult<BotStatus> {
        self.reconcile_status("refresh", "Failed to fetch bot status", |api| {
            api.get_bot_status()
        })
    }

    fn control_bot(&self, action: BotAction) -> ActionResult<BotStatus> {
        self.reconcile_status(&format!("control:{action}"), "Failed to control bot", |api| {
            api.control_bot(action)
        })
    }

    fn update_monitoring_channels(&self, channels: &[String]) -> ActionResult<Vec<String>> {
        let ticket = self.lock().issue(false);
        let started = Instant::now();
        let outcome = settle(
            self.api.update_monitoring_channels(channels),
            "Failed to update monitoring channels",
        );

        let mut mirror = self.lock();
        mirror.finish(ticket);
        match outcome {
            Ok((channels, message)) => {
                let applied = mirror.merge_channels(ticket, channels.clone());
                let stale = !applied && (mirror.has_status() || !mirror.is_alive());
                drop(mirror);
                self.log("update_channels", applied_outcome(!stale), None, started);
                ActionResult::ok(channels, message)
            }
            Err(failure) => {
                drop(mirror);
                self.log("update_channels", Outcome::Failed, Some(&failure), started);
                ActionResult::failed(failure.message)
            }
        }
    }

    fn write_ai_settings(
        &self,
        action: &str,
        logical: &str,
        call: impl FnOnce(&dyn BotApi) -> ApiResult<Envelope<AiFeatures>>,
    ) -> ActionResult<AiFeatures> {
        let ticket = self.lock().issue(false);
        let started = Instant::now();
        let outcome = settle(call(self.api.as_ref()), logical);

        let mut mirror = self.lock();
        mirror.finish(ticket);
        match outcome {
            Ok((features, message)) => {
                let applied = mirror.apply_ai_features(ticket, features.clone());
                drop(mirror);
                self.log(action, applied_outcome(applied), None, started);
                ActionResult::ok(features, message)
            }
            Err(failure) => {
                drop(mirror);
                self.log(action, Outcome::Failed, Some(&failure), started);
                ActionResult::failed(failure.message)
            }
        }
    }

    fn update_ai_settings(&self, features: &AiFeatures) -> ActionResult<AiFeatures> {
        self.write_ai_settings("update_ai_settings", "Failed to update AI settings", |api| {
            api.update_ai_settings(features)
        })
    }

    pub(crate) fn refresh_ai_settings(&self) -> ActionResult<AiFeatures> {
        self.write_ai_settings("ai_settings", "Failed to fetch AI settings", |api| {
            api.get_ai_settings()
        })
    }

    pub(crate) fn refresh_monitoring_data(&self) -> ActionResult<MonitoringData> {
        let ticket = self.lock().issue(false);
        let started = Instant::now();
        let outcome = settle(
            self.api.get_monitoring_data(),
            "Failed to fetch monitoring data",
        );

        let mut mirror = self.lock();
        mirror.finish(ticket);
        match outcome {
            Ok((data, message)) => {
                let applied = mirror.apply_monitoring(ticket, data.clone());
                drop(mirror);
                self.log("monitoring_data", applied_outcome(applied), None, started);
                ActionResult::ok(data, message)
            }
            Err(failure) => {
                drop(mirror);
                self.log("monitoring_data", Outcome::Failed, Some(&failure), started);
                ActionResult::failed(failure.message)
            }
        }
    }

    // -- Pass-through actions --

    fn generate_ai_report(&self, timeframe: &str) -> ActionResult<AiReport> {
        let monitoring = self.lock().monitoring_data().cloned();
        self.pass_through("generate_ai_report", "Failed to generate AI report", |api| {
            api.generate_ai_report(monitoring.as_ref(), timeframe)
        })
    }

    fn check_health(&self) -> ActionResult<HealthReport> {
        let started = Instant::now();
        match self.api.check_health() {
            Ok(report) => {
                let outcome = if report.success {
                    Outcome::Ok
                } else {
                    Outcome::Failed
                };
                self.log("check_health", outcome, None, started);
                ActionResult {
                    success: report.success,
                    message: None,
                    data: Some(report),
                }
            }
            Err(err) => {
                let failure = Failure {
                    kind: err.kind(),
                    message: err.to_string(),
                };
                self.log("check_health", Outcome::Failed, Some(&failure), started);
                ActionResult::failed("Health check failed")
            }
        }
    }

    // -- Polling --

    /// Fetch-on-init: status, monitoring data and AI settings.
    pub(crate) fn initial_fetch(&self) {
        self.refresh();
        self.refresh_monitoring_data();
        self.refresh_ai_settings();
    }

    /// One polling cycle: status and monitoring data.
    pub(crate) fn poll_tick(&self) {
        self.refresh();
        self.refresh_monitoring_data();
    }
}

fn applied_outcome(applied: bool) -> Outcome {
    if applied { Outcome::Ok } else { Outcome::Stale }
}

// ---------------------------------------------------------------------------
// BotControl
// ---------------------------------------------------------------------------

/// Handle to the synchronization core.
///
/// Dropping the handle tears the core down: the poller is stopped and any
/// result still in flight is discarded instead of applied.
pub struct BotControl {
    shared: Arc<Shared>,
    poller: Option<Poller>,
}

impl BotControl {
    /// Core over any [`BotApi`], without a journal and without polling.
    pub fn new(api: impl BotApi + 'static) -> Self {
        Self::with_journal(api, Journal::disabled())
    }

    pub fn with_journal(api: impl BotApi + 'static, journal: Journal) -> Self {
        Self {
            shared: Arc::new(Shared {
                api: Box::new(api),
                mirror: Mutex::new(Mirror::default()),
                journal,
            }),
            poller: None,
        }
    }

    /// Core over the HTTP client described by `config`. Polling is not
    /// started; call [`start_polling`](Self::start_polling).
    pub fn from_config(config: &ChimeraConfig) -> Self {
        let journal = if config.logging.journal {
            Journal::default_location()
        } else {
            Journal::disabled()
        };
        Self::with_journal(ChimeraClient::from_config(&config.api), journal)
    }

    // -- Lifecycle --

    /// Start the background poller. It performs the initial fetch right
    /// away, then refreshes every `interval`. No-op if already polling or
    /// torn down. A zero interval is rejected.
    pub fn start_polling(&mut self, interval: Duration) -> std::io::Result<()> {
        if interval.is_zero() {
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "polling interval must be greater than zero",
            ));
        }
        if self.poller.is_some() || !self.shared.is_alive() {
            return Ok(());
        }
        self.poller = Some(Poller::spawn(Arc::clone(&self.shared), interval)?);
        Ok(())
    }

    pub fn is_polling(&self) -> bool {
        self.poller.is_some()
    }

    /// Fetch-on-init on the calling thread, for use without the poller.
    pub fn initialize(&self) {
        self.shared.initial_fetch();
    }

    /// Tear down: close the mirror, then stop and join the poller.
    /// Idempotent.
    pub fn shutdown(&mut self) {
        self.shared.lock().close();
        if let Some(poller) = self.poller.take() {
            poller.stop();
        }
    }

    pub fn is_alive(&self) -> bool {
        self.shared.is_alive()
    }

    /// Read-only copy of the mirror.
    pub fn snapshot(&self) -> MirrorSnapshot {
        self.shared.lock().snapshot()
    }

    pub fn journal(&self) -> &Journal {
        &self.shared.journal
    }

    // -- Actions --

    /// Re-fetch the bot status.
    pub fn refresh(&self) -> ActionResult<BotStatus> {
        self.shared.refresh()
    }

    /// Request a run-state transition and adopt the reported status.
    pub fn control_bot(&self, action: BotAction) -> ActionResult<BotStatus> {
        self.shared.control_bot(action)
    }

    pub fn update_monitoring_channels(&self, channels: &[String]) -> ActionResult<Vec<String>> {
        self.shared.update_monitoring_channels(channels)
    }

    pub fn update_ai_settings(&self, features: &AiFeatures) -> ActionResult<AiFeatures> {
        self.shared.update_ai_settings(features)
    }

    pub fn refresh_monitoring_data(&self) -> ActionResult<MonitoringData> {
        self.shared.refresh_monitoring_data()
    }

    pub fn refresh_ai_settings(&self) -> ActionResult<AiFeatures> {
        self.shared.refresh_ai_settings()
    }

    /// Ask the AI service for a report over the mirrored monitoring data
    /// (`{}` when none has been fetched).
    pub fn generate_ai_report(&self, timeframe: &str) -> ActionResult<AiReport> {
        self.shared.generate_ai_report(timeframe)
    }

    pub fn analyze_text(&self, text: &str) -> ActionResult<Value> {
        self.shared
            .pass_through("analyze_text", "Failed to analyze text", |api| {
                api.analyze_text(text)
            })
    }

    pub fn detect_anomalies(&self, metrics: &Value) -> ActionResult<Value> {
        self.shared
            .pass_through("detect_anomalies", "Failed to detect anomalies", |api| {
                api.detect_anomalies(metrics)
            })
    }

    pub fn generate_smart_alerts(&self, recent_activity: &[Value]) -> ActionResult<Value> {
        self.shared.pass_through(
            "generate_smart_alerts",
            "Failed to generate smart alerts",
            |api| api.generate_smart_alerts(recent_activity),
        )
    }

    /// Legacy `/bot/ai/analyze-sentiment`.
    pub fn analyze_sentiment(&self, text: &str) -> ActionResult<Value> {
        self.shared
            .pass_through("analyze_sentiment", "Failed to analyze sentiment", |api| {
                api.analyze_sentiment(text)
            })
    }

    /// Legacy `/bot/ai/generate-report`.
    pub fn generate_legacy_report(&self, timeframe: &str) -> ActionResult<Value> {
        self.shared
            .pass_through("generate_report", "Failed to generate report", |api| {
                api.generate_report(timeframe)
            })
    }

    /// Health check. `success` mirrors the report's own flag.
    pub fn check_health(&self) -> ActionResult<HealthReport> {
        self.shared.check_health()
    }
}

impl Drop for BotControl {
    fn drop(&mut self) {
        self.shutdown();
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
