use serde::Serialize;

use crate::api::{ApiResult, Envelope, FailureKind};

/// Uniform result of every core action. Actions never return `Err`:
/// network, HTTP and logical failures all arrive as `success: false` with a
/// human-readable `message`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActionResult<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ActionResult<T> {
    pub fn ok(data: T, message: Option<String>) -> Self {
        Self {
            success: true,
            message,
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

    /// Message for display, empty when none was given.
    pub fn message_or_empty(&self) -> &str {
        self.message.as_deref().unwrap_or("")
    }
}

/// A failed call, with its class kept for the journal.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Failure {
    pub kind: FailureKind,
    pub message: String,
}

/// Classify a remote outcome.
///
/// `logical` is the message used when the envelope reports failure or
/// arrives without data; the service's own message is appended when given.
pub(crate) fn settle<T>(
    outcome: ApiResult<Envelope<T>>,
    logical: &str,
) -> Result<(T, Option<String>), Failure> {
    match outcome {
        Ok(Envelope {
            success: true,
            data: Some(data),
            message,
        }) => Ok((data, message)),
        Ok(Envelope { message, .. }) => Err(Failure {
            kind: FailureKind::Logical,
            message: match message {
                Some(m) if !m.is_empty() => format!("{logical}: {m}"),
                _ => logical.to_string(),
            },
        }),
        Err(err) => Err(Failure {
            kind: err.kind(),
            message: err.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::RequestError;

    #[test]
    fn confirmed_envelope_settles_ok() {
        let settled = settle(Ok(Envelope::ok(7).with_message("done")), "Failed");
        assert_eq!(settled, Ok((7, Some("done".to_string()))));
    }

    #[test]
    fn unsuccessful_envelope_is_logical_failure() {
        let settled = settle::<i32>(Ok(Envelope::failed("bot is busy")), "Failed to control bot");
        let failure = settled.unwrap_err();
        assert_eq!(failure.kind, FailureKind::Logical);
        assert_eq!(failure.message, "Failed to control bot: bot is busy");
    }

    #[test]
    fn success_without_data_is_logical_failure() {
        let env: Envelope<i32> = Envelope {
            success: true,
            message: None,
            data: None,
        };
        let failure = settle(Ok(env), "Failed to fetch bot status").unwrap_err();
        assert_eq!(failure.kind, FailureKind::Logical);
        assert_eq!(failure.message, "Failed to fetch bot status");
    }

    #[test]
    fn transport_error_keeps_its_kind_and_text() {
        let failure = settle::<i32>(
            Err(RequestError::Http {
                status: 502,
                status_text: "Bad Gateway".to_string(),
            }),
            "Failed",
        )
        .unwrap_err();
        assert_eq!(failure.kind, FailureKind::Http);
        assert_eq!(failure.message, "API request failed: 502 Bad Gateway");
    }

    #[test]
    fn action_result_serializes_without_empty_fields() {
        let result: ActionResult<i32> = ActionResult::failed("nope");
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json, serde_json::json!({"success": false, "message": "nope"}));
    }
}
