/// Wire types exchanged with the Chimera bot service.
///
/// Field names follow the service's snake_case JSON. Every endpoint except
/// the health check wraps its payload in an [`Envelope`].
use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

// ---------------------------------------------------------------------------
// Envelope
// ---------------------------------------------------------------------------

/// The `{ success, message?, data? }` wrapper every endpoint returns.
///
/// `success` is trusted as reported; the client does not cross-check it
/// against the presence of `data`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct Envelope<T> {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> Envelope<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            message: None,
            data: Some(data),
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
            data: None,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

// ---------------------------------------------------------------------------
// Bot status
// ---------------------------------------------------------------------------

/// Run state reported by the bot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BotState {
    #[default]
    Offline,
    Online,
    Paused,
}

impl fmt::Display for BotState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Offline => write!(f, "offline"),
            Self::Online => write!(f, "online"),
            Self::Paused => write!(f, "paused"),
        }
    }
}

/// Control action posted to `/bot/control`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BotAction {
    Start,
    Pause,
    Stop,
}

impl fmt::Display for BotAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Start => write!(f, "start"),
            Self::Pause => write!(f, "pause"),
            Self::Stop => write!(f, "stop"),
        }
    }
}

/// AI feature toggles.
///
/// The three well-known features are named fields; any other toggle the
/// service reports is kept in `extra` and sent back untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AiFeatures {
    #[serde(default)]
    pub sentiment_analysis: bool,
    #[serde(default)]
    pub anomaly_detection: bool,
    #[serde(default)]
    pub auto_reports: bool,
    #[serde(flatten)]
    pub extra: BTreeMap<String, bool>,
}

impl AiFeatures {
    /// Look up a toggle by its wire name.
    pub fn get(&self, name: &str) -> Option<bool> {
        match name {
            "sentiment_analysis" => Some(self.sentiment_analysis),
            "anomaly_detection" => Some(self.anomaly_detection),
            "auto_reports" => Some(self.auto_reports),
            other => self.extra.get(other).copied(),
        }
    }

    /// Set a toggle by its wire name, creating an extra entry for unknown names.
    pub fn set(&mut self, name: &str, enabled: bool) {
        match name {
            "sentiment_analysis" => self.sentiment_analysis = enabled,
            "anomaly_detection" => self.anomaly_detection = enabled,
            "auto_reports" => self.auto_reports = enabled,
            other => {
                self.extra.insert(other.to_string(), enabled);
            }
        }
    }

    /// All toggles as `(name, enabled)` pairs, well-known features first.
    pub fn entries(&self) -> Vec<(String, bool)> {
        let mut entries = vec![
            ("sentiment_analysis".to_string(), self.sentiment_analysis),
            ("anomaly_detection".to_string(), self.anomaly_detection),
            ("auto_reports".to_string(), self.auto_reports),
        ];
        entries.extend(self.extra.iter().map(|(k, v)| (k.clone(), *v)));
        entries
    }
}

/// Full bot status as returned by `/bot/status` and `/bot/control`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BotStatus {
    pub status: BotState,
    #[serde(default)]
    pub last_updated: String,
    #[serde(default)]
    pub monitoring_channels: Vec<String>,
    #[serde(default)]
    pub ai_features: AiFeatures,
}

impl BotStatus {
    /// Parse `last_updated`. Accepts RFC 3339 and naive ISO-8601 stamps; the
    /// latter are taken as UTC.
    pub fn last_updated_at(&self) -> Option<DateTime<Utc>> {
        parse_timestamp(&self.last_updated)
    }
}

/// Parse a service timestamp into UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

// ---------------------------------------------------------------------------
// Monitoring data
// ---------------------------------------------------------------------------

/// Snapshot of recent bot activity. Records are kept loosely typed; use the
/// typed accessors to decode them on demand.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MonitoringData {
    #[serde(default)]
    pub new_channels: Vec<Value>,
    #[serde(default)]
    pub messages: Vec<Value>,
    #[serde(default)]
    pub alerts: Vec<Value>,
    #[serde(default)]
    pub reports: Vec<Value>,
}

impl MonitoringData {
    /// Channel events that decode cleanly; malformed records are skipped.
    pub fn channel_events(&self) -> Vec<ChannelEvent> {
        decode_records(&self.new_channels)
    }

    pub fn message_events(&self) -> Vec<MessageEvent> {
        decode_records(&self.messages)
    }

    pub fn typed_alerts(&self) -> Vec<Alert> {
        decode_records(&self.alerts)
    }

    /// Unresolved alerts, most severe first.
    pub fn open_alerts(&self) -> Vec<Alert> {
        let mut open: Vec<Alert> = self
            .typed_alerts()
            .into_iter()
            .filter(|a| !a.resolved)
            .collect();
        open.sort_by(|a, b| b.severity.cmp(&a.severity));
        open
    }
}

fn decode_records<T: DeserializeOwned>(records: &[Value]) -> Vec<T> {
    records
        .iter()
        .filter_map(|r| serde_json::from_value(r.clone()).ok())
        .collect()
}

/// A channel creation/deletion observed by the bot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelEvent {
    pub id: i64,
    pub channel_id: String,
    pub channel_name: String,
    #[serde(default)]
    pub category: Option<String>,
    pub event_type: String,
    pub created_at: String,
    #[serde(default)]
    pub ai_analysis: Value,
}

/// A message observed in a monitored channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageEvent {
    pub id: i64,
    pub message_id: String,
    pub channel_id: String,
    pub channel_name: String,
    pub author: String,
    pub content: String,
    pub timestamp: String,
    #[serde(default)]
    pub ai_analysis: Value,
}

/// Alert severity, ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Low => write!(f, "low"),
            Self::Medium => write!(f, "medium"),
            Self::High => write!(f, "high"),
            Self::Critical => write!(f, "critical"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub id: i64,
    pub alert_type: String,
    pub severity: Severity,
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub source_type: Option<String>,
    #[serde(default)]
    pub source_id: Option<String>,
    pub created_at: String,
    #[serde(default)]
    pub resolved: bool,
    #[serde(default)]
    pub resolved_at: Option<String>,
}

// ---------------------------------------------------------------------------
// AI service payloads
// ---------------------------------------------------------------------------

/// Report produced by `/ai/generate-report`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AiReport {
    pub generated_at: String,
    pub timeframe: String,
    pub summary: String,
    #[serde(default)]
    pub statistics: Value,
    #[serde(default)]
    pub insights: Vec<String>,
    #[serde(default)]
    pub recommendations: Vec<String>,
    #[serde(default)]
    pub risk_level: String,
}

/// Response of `/bot/health`. Not enveloped: the fields sit at the top level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthReport {
    pub success: bool,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub timestamp: String,
    #[serde(default)]
    pub bot_status: String,
}
