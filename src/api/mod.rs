/// Remote client for the Chimera bot service.
///
/// The [`BotApi`] trait lists every remote operation the panel uses. The
/// real implementation is [`client::ChimeraClient`] (HTTP via `ureq`); the
/// sync core only depends on the trait, so tests can drive it with scripted
/// fakes.
pub mod client;
pub mod error;
pub mod types;

use serde_json::Value;

pub use client::ChimeraClient;
pub use error::{ApiResult, FailureKind, RequestError};
pub use types::{
    AiFeatures, AiReport, Alert, BotAction, BotState, BotStatus, Envelope, HealthReport,
    MonitoringData, Severity,
};

/// One method per remote endpoint.
///
/// Implementations must not interpret the envelope: a `success: false`
/// envelope is returned as `Ok`, only transport and HTTP failures are `Err`.
pub trait BotApi: Send + Sync {
    /// `GET /bot/status`
    fn get_bot_status(&self) -> ApiResult<Envelope<BotStatus>>;

    /// `POST /bot/control`
    fn control_bot(&self, action: BotAction) -> ApiResult<Envelope<BotStatus>>;

    /// `GET /bot/monitoring/channels`
    fn get_monitoring_channels(&self) -> ApiResult<Envelope<Vec<String>>>;

    /// `POST /bot/monitoring/channels`
    fn update_monitoring_channels(&self, channels: &[String]) -> ApiResult<Envelope<Vec<String>>>;

    /// `GET /bot/ai/settings`
    fn get_ai_settings(&self) -> ApiResult<Envelope<AiFeatures>>;

    /// `POST /bot/ai/settings`
    fn update_ai_settings(&self, features: &AiFeatures) -> ApiResult<Envelope<AiFeatures>>;

    /// `GET /bot/monitoring/data`
    fn get_monitoring_data(&self) -> ApiResult<Envelope<MonitoringData>>;

    /// `GET /bot/health` (not enveloped)
    fn check_health(&self) -> ApiResult<HealthReport>;

    /// `POST /ai/analyze-text`
    fn analyze_text(&self, text: &str) -> ApiResult<Envelope<Value>>;

    /// `POST /ai/anomaly-detection`
    fn detect_anomalies(&self, metrics: &Value) -> ApiResult<Envelope<Value>>;

    /// `POST /ai/generate-report`. `None` monitoring data is sent as `{}`.
    fn generate_ai_report(
        &self,
        monitoring_data: Option<&MonitoringData>,
        timeframe: &str,
    ) -> ApiResult<Envelope<AiReport>>;

    /// `POST /ai/smart-alerts`
    fn generate_smart_alerts(&self, recent_activity: &[Value]) -> ApiResult<Envelope<Value>>;

    /// `POST /bot/ai/analyze-sentiment` (legacy)
    fn analyze_sentiment(&self, text: &str) -> ApiResult<Envelope<Value>>;

    /// `POST /bot/ai/generate-report` (legacy)
    fn generate_report(&self, timeframe: &str) -> ApiResult<Envelope<Value>>;
}
