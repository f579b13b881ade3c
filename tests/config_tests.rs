/// Integration tests for configuration layering and environment overrides.
///
/// # Safety
///
/// These tests use `std::env::set_var` / `remove_var`, which are `unsafe` in
/// Rust 2024 edition. All env-dependent assertions live in a single test so
/// no other test in this binary reads the variables concurrently.
use chimera::config;
use chimera::sync::BotControl;

/// Helper: set an env var (wraps the `unsafe` call).
///
/// # Safety
/// Must only be called from single-threaded test contexts.
unsafe fn set_env(key: &str, val: &str) {
    unsafe { std::env::set_var(key, val) }
}

/// Helper: remove an env var (wraps the `unsafe` call).
///
/// # Safety
/// Must only be called from single-threaded test contexts.
unsafe fn remove_env(key: &str) {
    unsafe { std::env::remove_var(key) }
}

const VARS: [&str; 5] = [
    "CHIMERA_API_URL",
    "CHIMERA_TIMEOUT_MS",
    "CHIMERA_MAX_RETRIES",
    "CHIMERA_POLL_INTERVAL_SECS",
    "CHIMERA_JOURNAL",
];

#[test]
fn env_overrides_take_precedence() {
    unsafe {
        set_env("CHIMERA_API_URL", "http://bot.internal:8080/api");
        set_env("CHIMERA_TIMEOUT_MS", "2500");
        set_env("CHIMERA_MAX_RETRIES", "2");
        set_env("CHIMERA_POLL_INTERVAL_SECS", "3");
        set_env("CHIMERA_JOURNAL", "off");
    }

    let cfg = config::load();
    assert_eq!(cfg.api.base_url, "http://bot.internal:8080/api");
    assert_eq!(cfg.api.timeout_ms, 2500);
    assert_eq!(cfg.api.max_retries, 2);
    assert_eq!(cfg.polling.interval_secs, 3);
    assert!(!cfg.logging.journal);

    // A journal-less core built from this config records nothing.
    let core = BotControl::from_config(&cfg);
    assert!(core.journal().path().is_none());

    // Unparseable values fall back to the lower layers.
    unsafe {
        set_env("CHIMERA_TIMEOUT_MS", "soon");
        set_env("CHIMERA_POLL_INTERVAL_SECS", "0");
        set_env("CHIMERA_API_URL", "");
    }
    let cfg = config::load();
    assert_ne!(cfg.api.timeout_ms, 0);
    assert!(cfg.polling.interval_secs > 0);
    assert!(!cfg.api.base_url.is_empty());

    unsafe {
        for var in VARS {
            remove_env(var);
        }
    }
}
