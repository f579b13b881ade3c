/// End-to-end tests: the sync core driving the real HTTP client against a
/// local mock service.
mod common;

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use chimera::analytics::{Journal, Outcome};
use chimera::api::{BotAction, BotState, ChimeraClient, FailureKind};
use chimera::sync::{BotControl, DEFAULT_TIMEFRAME};
use common::{MockServer, ok, refused_base_url, status_json};
use serde_json::json;

fn scratch_journal(name: &str) -> Journal {
    let path = std::env::temp_dir()
        .join(format!("chimera-e2e-{}-{name}", std::process::id()))
        .join("sync-log.jsonl");
    let _ = std::fs::remove_file(&path);
    Journal::at(path)
}

fn wait_until(timeout: Duration, mut done: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if done() {
            return true;
        }
        thread::sleep(Duration::from_millis(10));
    }
    done()
}

#[test]
fn start_adopts_reported_status() {
    let server = MockServer::start(|req| match req.url.as_str() {
        "/api/bot/control" => {
            let mut reply = json!({"success": true, "message": "Bot started successfully"});
            reply["data"] = status_json("online");
            (200, reply.to_string())
        }
        _ => ok(status_json("offline")),
    });
    let core = BotControl::new(ChimeraClient::new(&server.base_url()));

    core.refresh();
    assert_eq!(core.snapshot().status.unwrap().status, BotState::Offline);

    let result = core.control_bot(BotAction::Start);
    assert!(result.success);
    assert_eq!(result.message.as_deref(), Some("Bot started successfully"));

    let snap = core.snapshot();
    assert_eq!(snap.status.unwrap().status, BotState::Online);
    assert!(snap.error.is_none());
    assert!(!snap.is_loading);

    let control = &server.requests()[1];
    assert_eq!(control.method, "POST");
    assert_eq!(control.json(), json!({"action": "start"}));
}

#[test]
fn refresh_against_closed_port_records_network_failure() {
    let journal = scratch_journal("refused");
    let core = BotControl::with_journal(ChimeraClient::new(&refused_base_url()), journal.clone());

    let result = core.refresh();

    assert!(!result.success);
    assert!(result.data.is_none());
    let message = result.message.unwrap();
    assert!(message.starts_with("network error:"), "got: {message}");

    let snap = core.snapshot();
    assert!(snap.status.is_none());
    assert_eq!(snap.error.as_deref(), Some(message.as_str()));
    assert!(!snap.is_loading);

    let entries = journal.read_all();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].action, "refresh");
    assert_eq!(entries[0].outcome, Outcome::Failed);
    assert_eq!(entries[0].failure, Some(FailureKind::Network));
}

#[test]
fn http_failure_keeps_last_good_status() {
    let calls = Arc::new(AtomicUsize::new(0));
    let server = {
        let calls = Arc::clone(&calls);
        MockServer::start(move |_| {
            if calls.fetch_add(1, Ordering::SeqCst) == 0 {
                ok(status_json("paused"))
            } else {
                (502, String::new())
            }
        })
    };
    let core = BotControl::new(ChimeraClient::new(&server.base_url()));

    assert!(core.refresh().success);
    let failed = core.refresh();

    assert_eq!(
        failed.message.as_deref(),
        Some("API request failed: 502 Bad Gateway")
    );
    let snap = core.snapshot();
    assert_eq!(snap.status.unwrap().status, BotState::Paused);
    assert_eq!(snap.error, failed.message);
}

#[test]
fn report_carries_mirrored_monitoring_data() {
    let server = MockServer::start(|req| match req.url.as_str() {
        "/api/bot/monitoring/data" => ok(json!({
            "new_channels": [],
            "messages": [],
            "alerts": [{"id": 7}],
            "reports": []
        })),
        "/api/ai/generate-report" => ok(json!({
            "generated_at": "2025-01-15T10:30:00Z",
            "timeframe": req.json()["timeframe"],
            "summary": "one alert"
        })),
        _ => (404, String::new()),
    });
    let core = BotControl::new(ChimeraClient::new(&server.base_url()));

    assert!(core.refresh_monitoring_data().success);
    let before = core.snapshot();
    let report = core.generate_ai_report(DEFAULT_TIMEFRAME);

    assert!(report.success);
    assert_eq!(report.data.unwrap().timeframe, "24h");
    assert_eq!(core.snapshot(), before);

    let body = server.requests()[1].json();
    assert_eq!(body["monitoring_data"]["alerts"], json!([{"id": 7}]));
}

#[test]
fn poller_fetches_on_start_and_stops_on_shutdown() {
    let server = MockServer::start(|req| match req.url.as_str() {
        "/api/bot/status" => ok(status_json("online")),
        "/api/bot/monitoring/data" => ok(json!({})),
        "/api/bot/ai/settings" => ok(json!({
            "sentiment_analysis": false,
            "anomaly_detection": true,
            "auto_reports": true
        })),
        _ => (404, String::new()),
    });
    let mut core = BotControl::new(ChimeraClient::new(&server.base_url()));

    core.start_polling(Duration::from_millis(50)).unwrap();
    let synced = wait_until(Duration::from_secs(5), || {
        let snap = core.snapshot();
        snap.status.is_some() && snap.monitoring_data.is_some() && snap.ai_settings.is_some()
    });
    assert!(synced);

    // At least one periodic tick after the init fetch.
    assert!(wait_until(Duration::from_secs(5), || server.request_count() >= 5));

    core.shutdown();
    let after_shutdown = server.request_count();
    thread::sleep(Duration::from_millis(200));
    assert_eq!(server.request_count(), after_shutdown);
    assert!(!core.is_alive());
}
