/// Chimera bot service HTTP client.
///
/// Talks to the service at a configurable base URL (default
/// `http://localhost:5000/api`) using the synchronous `ureq` client. Every
/// call is a thin mapping from parameters to a JSON body over
/// [`ChimeraClient::get`] / [`ChimeraClient::post`]:
///
/// - a non-2xx response fails with [`RequestError::Http`] and the body is
///   not read;
/// - a transport failure (DNS, refused connection, timeout) fails with
///   [`RequestError::Network`];
/// - a 2xx body is decoded into the caller's envelope type without checking
///   the envelope's `success` flag.
///
/// Calls are single-shot unless `max_retries` is configured, in which case
/// GET requests that hit a transport failure are retried with exponential
/// backoff. POSTs and HTTP errors are never retried.
use std::time::Duration;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};

use super::BotApi;
use super::error::{ApiResult, RequestError};
use super::types::{
    AiFeatures, AiReport, BotAction, BotStatus, Envelope, HealthReport, MonitoringData,
};
use crate::config::schema::ApiConfig;

/// Default service endpoint.
pub const DEFAULT_BASE_URL: &str = "http://localhost:5000/api";

// ---------------------------------------------------------------------------
// Request bodies
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct ControlRequest {
    action: BotAction,
}

#[derive(Debug, Serialize)]
struct ChannelsRequest<'a> {
    channels: &'a [String],
}

#[derive(Debug, Serialize)]
struct AiSettingsRequest<'a> {
    ai_features: &'a AiFeatures,
}

#[derive(Debug, Serialize)]
struct TextRequest<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
struct MetricsRequest<'a> {
    metrics: &'a Value,
}

#[derive(Debug, Serialize)]
struct AiReportRequest<'a> {
    monitoring_data: Value,
    timeframe: &'a str,
}

#[derive(Debug, Serialize)]
struct SmartAlertsRequest<'a> {
    recent_activity: &'a [Value],
}

#[derive(Debug, Serialize)]
struct TimeframeRequest<'a> {
    timeframe: &'a str,
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Synchronous client for the bot service.
///
/// Cheap to share behind an `Arc`; the underlying `ureq::Agent` pools
/// connections internally.
#[derive(Debug, Clone)]
pub struct ChimeraClient {
    agent: ureq::Agent,
    base_url: String,
    timeout: Duration,
    headers: Vec<(String, String)>,
    max_retries: u32,
    retry_backoff: Duration,
}

impl ChimeraClient {
    /// Client with default timeout and no retries.
    pub fn new(base_url: &str) -> Self {
        Self::from_config(&ApiConfig {
            base_url: base_url.to_string(),
            ..ApiConfig::default()
        })
    }

    /// Build a client from the resolved `[api]` config section.
    pub fn from_config(config: &ApiConfig) -> Self {
        let timeout = Duration::from_millis(config.timeout_ms);
        let agent = ureq::AgentBuilder::new().timeout(timeout).build();

        let mut client = Self {
            agent,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            timeout,
            headers: vec![("Content-Type".to_string(), "application/json".to_string())],
            max_retries: config.max_retries,
            retry_backoff: Duration::from_millis(config.retry_backoff_ms),
        };
        for (name, value) in &config.headers {
            client.set_header(name, value);
        }
        client
    }

    /// Add a header, replacing any existing header of the same name
    /// (case-insensitive). This is how callers override the default
    /// `Content-Type`.
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.set_header(name, value);
        self
    }

    fn set_header(&mut self, name: &str, value: &str) {
        self.headers.retain(|(n, _)| !n.eq_ignore_ascii_case(name));
        self.headers.push((name.to_string(), value.to_string()));
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    // -- Transport --

    /// `GET {base_url}{endpoint}` and decode the body.
    pub fn get<T: DeserializeOwned>(&self, endpoint: &str) -> ApiResult<T> {
        self.send("GET", endpoint, None)
    }

    /// `POST {base_url}{endpoint}` with a JSON body and decode the response.
    pub fn post<B: Serialize, T: DeserializeOwned>(&self, endpoint: &str, body: &B) -> ApiResult<T> {
        let body = serde_json::to_string(body).map_err(|e| RequestError::Encode(e.to_string()))?;
        self.send("POST", endpoint, Some(body))
    }

    fn send<T: DeserializeOwned>(
        &self,
        method: &str,
        endpoint: &str,
        body: Option<String>,
    ) -> ApiResult<T> {
        let url = format!("{}{}", self.base_url, endpoint);

        // A POST may already have been applied when its response is lost.
        let max_retries = if method == "GET" { self.max_retries } else { 0 };

        let mut attempt = 0;
        let raw = loop {
            match self.attempt(method, &url, body.as_deref()) {
                Err(err) if err.is_transient() && attempt < max_retries => {
                    std::thread::sleep(backoff_delay(self.retry_backoff, attempt));
                    attempt += 1;
                }
                other => break other?,
            }
        };

        serde_json::from_str(&raw).map_err(|e| RequestError::Decode(e.to_string()))
    }

    fn attempt(&self, method: &str, url: &str, body: Option<&str>) -> ApiResult<String> {
        let mut request = self.agent.request(method, url);
        for (name, value) in &self.headers {
            request = request.set(name, value);
        }

        let result = match body {
            Some(body) => request.send_string(body),
            None => request.call(),
        };

        match result {
            Ok(response) => response
                .into_string()
                .map_err(|e| RequestError::Network(format!("failed to read response body: {e}"))),
            Err(ureq::Error::Status(status, response)) => Err(RequestError::Http {
                status,
                status_text: response.status_text().to_string(),
            }),
            Err(ureq::Error::Transport(transport)) => {
                Err(RequestError::Network(transport.to_string()))
            }
        }
    }
}

impl Default for ChimeraClient {
    fn default() -> Self {
        Self::from_config(&ApiConfig::default())
    }
}

/// Exponential backoff: `base * 2^attempt`, capped at 30 s.
fn backoff_delay(base: Duration, attempt: u32) -> Duration {
    let factor = 1u32.checked_shl(attempt).unwrap_or(u32::MAX);
    base.saturating_mul(factor).min(Duration::from_secs(30))
}

// ---------------------------------------------------------------------------
// Endpoints
// ---------------------------------------------------------------------------

impl BotApi for ChimeraClient {
    fn get_bot_status(&self) -> ApiResult<Envelope<BotStatus>> {
        self.get("/bot/status")
    }

    fn control_bot(&self, action: BotAction) -> ApiResult<Envelope<BotStatus>> {
        self.post("/bot/control", &ControlRequest { action })
    }

    fn get_monitoring_channels(&self) -> ApiResult<Envelope<Vec<String>>> {
        self.get("/bot/monitoring/channels")
    }

    fn update_monitoring_channels(&self, channels: &[String]) -> ApiResult<Envelope<Vec<String>>> {
        self.post("/bot/monitoring/channels", &ChannelsRequest { channels })
    }

    fn get_ai_settings(&self) -> ApiResult<Envelope<AiFeatures>> {
        self.get("/bot/ai/settings")
    }

    fn update_ai_settings(&self, features: &AiFeatures) -> ApiResult<Envelope<AiFeatures>> {
        self.post(
            "/bot/ai/settings",
            &AiSettingsRequest {
                ai_features: features,
            },
        )
    }

    fn get_monitoring_data(&self) -> ApiResult<Envelope<MonitoringData>> {
        self.get("/bot/monitoring/data")
    }

    fn check_health(&self) -> ApiResult<HealthReport> {
        self.get("/bot/health")
    }

    fn analyze_text(&self, text: &str) -> ApiResult<Envelope<Value>> {
        self.post("/ai/analyze-text", &TextRequest { text })
    }

    fn detect_anomalies(&self, metrics: &Value) -> ApiResult<Envelope<Value>> {
        self.post("/ai/anomaly-detection", &MetricsRequest { metrics })
    }

    fn generate_ai_report(
        &self,
        monitoring_data: Option<&MonitoringData>,
        timeframe: &str,
    ) -> ApiResult<Envelope<AiReport>> {
        let monitoring_data = match monitoring_data {
            Some(data) => {
                serde_json::to_value(data).map_err(|e| RequestError::Encode(e.to_string()))?
            }
            None => json!({}),
        };
        self.post(
            "/ai/generate-report",
            &AiReportRequest {
                monitoring_data,
                timeframe,
            },
        )
    }

    fn generate_smart_alerts(&self, recent_activity: &[Value]) -> ApiResult<Envelope<Value>> {
        self.post("/ai/smart-alerts", &SmartAlertsRequest { recent_activity })
    }

    fn analyze_sentiment(&self, text: &str) -> ApiResult<Envelope<Value>> {
        self.post("/bot/ai/analyze-sentiment", &TextRequest { text })
    }

    fn generate_report(&self, timeframe: &str) -> ApiResult<Envelope<Value>> {
        self.post("/bot/ai/generate-report", &TimeframeRequest { timeframe })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_from_default_config() {
        let client = ChimeraClient::default();
        assert_eq!(client.base_url(), DEFAULT_BASE_URL);
        assert_eq!(client.timeout(), Duration::from_millis(10_000));
        assert_eq!(client.max_retries, 0);
    }

    #[test]
    fn client_strips_trailing_slash() {
        let client = ChimeraClient::new("http://bot.local:5000/api/");
        assert_eq!(client.base_url(), "http://bot.local:5000/api");
    }

    #[test]
    fn default_content_type_is_json() {
        let client = ChimeraClient::new(DEFAULT_BASE_URL);
        assert_eq!(
            client.headers(),
            &[("Content-Type".to_string(), "application/json".to_string())]
        );
    }

    #[test]
    fn caller_header_overrides_default_case_insensitively() {
        let client = ChimeraClient::new(DEFAULT_BASE_URL)
            .with_header("content-type", "application/vnd.chimera+json")
            .with_header("Authorization", "Bearer abc");
        let headers = client.headers();
        assert_eq!(headers.len(), 2);
        assert!(headers.contains(&(
            "content-type".to_string(),
            "application/vnd.chimera+json".to_string()
        )));
        assert!(headers.contains(&("Authorization".to_string(), "Bearer abc".to_string())));
    }

    #[test]
    fn config_headers_are_applied() {
        let mut config = ApiConfig::default();
        config
            .headers
            .insert("X-Panel".to_string(), "cli".to_string());
        let client = ChimeraClient::from_config(&config);
        assert!(client.headers().contains(&("X-Panel".to_string(), "cli".to_string())));
    }

    #[test]
    fn backoff_doubles_and_caps() {
        let base = Duration::from_millis(250);
        assert_eq!(backoff_delay(base, 0), Duration::from_millis(250));
        assert_eq!(backoff_delay(base, 1), Duration::from_millis(500));
        assert_eq!(backoff_delay(base, 3), Duration::from_millis(2000));
        assert_eq!(backoff_delay(base, 40), Duration::from_secs(30));
    }
}
