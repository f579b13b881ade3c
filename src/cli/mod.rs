//! CLI command implementations for chimera.
//!
//! Provides subcommand handlers for:
//! - `chimera status|start|pause|stop`: bot run state
//! - `chimera channels|ai|monitoring|health`: mirrored bot state
//! - `chimera analyze|anomalies|report|alerts|sentiment`: AI service calls
//! - `chimera watch`: live view driven by the background poller
//! - `chimera settings ...` / `chimera config ...`: local preferences
//! - `chimera stats`: journal summary

use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use colored::Colorize;
use serde::Serialize;
use serde_json::Value;

use crate::analytics::Journal;
use crate::analytics::reporter::{self, Stats};
use crate::api::{AiFeatures, BotAction, BotState, BotStatus, MonitoringData, Severity};
use crate::config;
use crate::settings::{DashboardSettings, SettingsStore};
use crate::sync::{ActionResult, BotControl, MirrorSnapshot};

/// Output format for commands that print data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
    Csv,
}

impl OutputFormat {
    pub fn from_str_opt(s: Option<&str>) -> Self {
        match s {
            Some("json") => Self::Json,
            Some("csv") => Self::Csv,
            _ => Self::Table,
        }
    }
}

/// Core over the configured service, without polling.
fn connect() -> BotControl {
    BotControl::from_config(&config::load())
}

/// Print the result as JSON, or unwrap its data for table output.
///
/// A failed action becomes an error so the process exits non-zero.
fn settle<T: Serialize>(result: ActionResult<T>, format: OutputFormat) -> Result<Option<T>> {
    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        if !result.success {
            anyhow::bail!("{}", result.message_or_empty());
        }
        return Ok(None);
    }

    if !result.success {
        anyhow::bail!("{}", result.message_or_empty());
    }
    if let Some(message) = &result.message {
        println!("{} {}", "✓".green().bold(), message);
    }
    Ok(result.data)
}

// ---------------------------------------------------------------------------
// chimera status | start | pause | stop
// ---------------------------------------------------------------------------

/// Fetch and show the bot status.
pub fn run_status(format: OutputFormat) -> Result<()> {
    let core = connect();
    if let Some(status) = settle(core.refresh(), format)? {
        print_status(&status);
    }
    Ok(())
}

/// Request a run-state transition and show the state the service reports.
pub fn run_control(action: BotAction, format: OutputFormat) -> Result<()> {
    let core = connect();
    if let Some(status) = settle(core.control_bot(action), format)? {
        print_status(&status);
    }
    Ok(())
}

fn print_status(status: &BotStatus) {
    println!("{}", "Chimera Bot Status".bold().cyan());
    println!("{}", "=".repeat(40));
    println!("  {} {}", "State:       ".bold(), colorize_state(status.status));
    let updated = status
        .last_updated_at()
        .map(|t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| status.last_updated.clone());
    println!("  {} {}", "Last updated:".bold(), updated);
    println!(
        "  {} {}",
        "Channels:    ".bold(),
        if status.monitoring_channels.is_empty() {
            "none".dimmed().to_string()
        } else {
            status.monitoring_channels.join(", ")
        }
    );
    println!("{}", "AI Features".bold().cyan());
    print_features(&status.ai_features);
}

fn print_features(features: &AiFeatures) {
    for (name, enabled) in features.entries() {
        let mark = if enabled {
            "on".green().bold()
        } else {
            "off".dimmed()
        };
        println!("  {:<22} {}", name, mark);
    }
}

// ---------------------------------------------------------------------------
// chimera channels | ai
// ---------------------------------------------------------------------------

/// Show the monitored channels, or replace them with `set`.
pub fn run_channels(set: Option<Vec<String>>, format: OutputFormat) -> Result<()> {
    let core = connect();

    let channels = match set {
        Some(channels) => {
            let channels: Vec<String> = channels
                .into_iter()
                .map(|c| c.trim().to_string())
                .filter(|c| !c.is_empty())
                .collect();
            settle(core.update_monitoring_channels(&channels), format)?
        }
        None => settle(core.refresh(), format)?.map(|s| s.monitoring_channels),
    };

    if let Some(channels) = channels {
        println!("{}", "Monitored Channels".bold().cyan());
        if channels.is_empty() {
            println!("  {}", "none".dimmed());
        }
        for channel in channels {
            println!("  {} {}", "#".dimmed(), channel);
        }
    }
    Ok(())
}

/// Show the AI feature toggles, or apply `key=bool` assignments.
pub fn run_ai(assignments: &[String], format: OutputFormat) -> Result<()> {
    let core = connect();

    if assignments.is_empty() {
        if let Some(features) = settle(core.refresh_ai_settings(), format)? {
            println!("{}", "AI Features".bold().cyan());
            print_features(&features);
        }
        return Ok(());
    }

    let current = core.refresh_ai_settings();
    let mut features = current.data.with_context(|| {
        format!(
            "could not read current AI settings: {}",
            current.message.as_deref().unwrap_or("no data")
        )
    })?;
    for assignment in assignments {
        let (name, enabled) = parse_toggle(assignment)?;
        features.set(name, enabled);
    }

    if let Some(features) = settle(core.update_ai_settings(&features), format)? {
        println!("{}", "AI Features".bold().cyan());
        print_features(&features);
    }
    Ok(())
}

/// Parse `name=bool` into a toggle.
fn parse_toggle(assignment: &str) -> Result<(&str, bool)> {
    let (name, value) = assignment
        .split_once('=')
        .with_context(|| format!("expected name=on|off, got '{assignment}'"))?;
    let enabled = match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => true,
        "0" | "false" | "no" | "off" => false,
        other => anyhow::bail!("'{other}' is not a boolean for '{name}'"),
    };
    Ok((name.trim(), enabled))
}

// ---------------------------------------------------------------------------
// chimera monitoring | health
// ---------------------------------------------------------------------------

/// Show the latest monitoring snapshot.
pub fn run_monitoring(format: OutputFormat) -> Result<()> {
    let core = connect();
    if let Some(data) = settle(core.refresh_monitoring_data(), format)? {
        print_monitoring(&data);
    }
    Ok(())
}

fn print_monitoring(data: &MonitoringData) {
    println!("{}", "Monitoring".bold().cyan());
    println!("{}", "=".repeat(40));
    println!(
        "  {} {}   {} {}   {} {}   {} {}",
        "Channels:".bold(),
        data.new_channels.len(),
        "Messages:".bold(),
        data.messages.len(),
        "Alerts:".bold(),
        data.alerts.len(),
        "Reports:".bold(),
        data.reports.len(),
    );

    let channels = data.channel_events();
    if !channels.is_empty() {
        println!();
        println!("{}", "Channel Events".bold().cyan());
        for event in channels.iter().rev().take(5) {
            println!(
                "  {:<10} #{:<20} {}",
                event.event_type,
                truncate(&event.channel_name, 20),
                event.created_at.dimmed()
            );
        }
    }

    let open = data.open_alerts();
    if !open.is_empty() {
        println!();
        println!("{}", "Open Alerts".bold().cyan());
        for alert in open.iter().take(10) {
            println!(
                "  {} {}",
                colorize_severity(alert.severity),
                truncate(&alert.title, 70)
            );
        }
    }

    let messages = data.message_events();
    if !messages.is_empty() {
        println!();
        println!("{}", "Recent Messages".bold().cyan());
        for (i, msg) in messages.iter().rev().take(5).enumerate() {
            let line = format!(
                "  {:<16} #{:<14} {}",
                truncate(&msg.author, 16),
                truncate(&msg.channel_name, 14),
                truncate(&msg.content, 40)
            );
            if i % 2 == 0 {
                println!("{line}");
            } else {
                println!("{}", line.dimmed());
            }
        }
    }
}

/// Probe the service.
pub fn run_health(format: OutputFormat) -> Result<()> {
    let core = connect();
    let result = core.check_health();

    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    println!("{}", "Chimera Health Check".bold().cyan());
    println!("{}", "=".repeat(40));

    let cfg = config::load();
    print_health_item("Service", result.success, &cfg.api.base_url);
    match &result.data {
        Some(report) => {
            print_health_item("Status", result.success, &report.status);
            print_health_item("Bot", true, &report.bot_status);
            if !report.timestamp.is_empty() {
                print_health_item("Reported at", true, &report.timestamp);
            }
        }
        None => print_health_item("Status", false, result.message_or_empty()),
    }

    let global_exists = config::global_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);
    print_health_item(
        "Global config",
        global_exists,
        if global_exists {
            "~/.chimera/config.toml found"
        } else {
            "not found (run `chimera config init` to create)"
        },
    );

    let journal = core.journal();
    let entries = journal.read_all().len();
    print_health_item(
        "Journal",
        journal.path().is_some(),
        &match journal.path() {
            Some(_) => format!("{entries} entries"),
            None => "disabled".to_string(),
        },
    );

    Ok(())
}

fn print_health_item(name: &str, ok: bool, detail: &str) {
    let status = if ok {
        "✓".green().bold()
    } else {
        "✗".red().bold()
    };
    println!("  {} {:<16} {}", status, name, detail.dimmed());
}

// ---------------------------------------------------------------------------
// chimera analyze | anomalies | report | alerts | sentiment
// ---------------------------------------------------------------------------

/// Analyze a piece of text with the AI service.
pub fn run_analyze(text: &str, format: OutputFormat) -> Result<()> {
    let core = connect();
    if let Some(analysis) = settle(core.analyze_text(text), format)? {
        print_value("Text Analysis", &analysis)?;
    }
    Ok(())
}

/// Run anomaly detection over a JSON metrics object.
pub fn run_anomalies(metrics: &str, format: OutputFormat) -> Result<()> {
    let metrics: Value = serde_json::from_str(metrics).context("metrics must be valid JSON")?;
    let core = connect();
    if let Some(result) = settle(core.detect_anomalies(&metrics), format)? {
        print_value("Anomaly Detection", &result)?;
    }
    Ok(())
}

/// Generate a report over the current monitoring data.
pub fn run_report(timeframe: &str, legacy: bool, format: OutputFormat) -> Result<()> {
    let core = connect();

    if legacy {
        if let Some(report) = settle(core.generate_legacy_report(timeframe), format)? {
            print_value("Report", &report)?;
        }
        return Ok(());
    }

    // Best effort: without data the report is generated over `{}`.
    let _ = core.refresh_monitoring_data();
    let Some(report) = settle(core.generate_ai_report(timeframe), format)? else {
        return Ok(());
    };

    println!(
        "{}",
        format!("AI Report ({})", report.timeframe).bold().cyan()
    );
    println!("{}", "=".repeat(50));
    println!("  {} {}", "Generated:".bold(), report.generated_at);
    if !report.risk_level.is_empty() {
        println!("  {} {}", "Risk:     ".bold(), report.risk_level);
    }
    println!();
    println!("  {}", report.summary);
    if !report.insights.is_empty() {
        println!();
        println!("{}", "Insights".bold().cyan());
        for insight in &report.insights {
            println!("  · {insight}");
        }
    }
    if !report.recommendations.is_empty() {
        println!();
        println!("{}", "Recommendations".bold().cyan());
        for rec in &report.recommendations {
            println!("  · {rec}");
        }
    }
    Ok(())
}

/// Ask the AI service for alerts over a JSON array of recent activity.
pub fn run_alerts(activity: &str, format: OutputFormat) -> Result<()> {
    let activity: Vec<Value> =
        serde_json::from_str(activity).context("activity must be a JSON array")?;
    let core = connect();
    if let Some(alerts) = settle(core.generate_smart_alerts(&activity), format)? {
        print_value("Smart Alerts", &alerts)?;
    }
    Ok(())
}

/// Legacy sentiment endpoint.
pub fn run_sentiment(text: &str, format: OutputFormat) -> Result<()> {
    let core = connect();
    if let Some(sentiment) = settle(core.analyze_sentiment(text), format)? {
        print_value("Sentiment", &sentiment)?;
    }
    Ok(())
}

fn print_value(title: &str, value: &Value) -> Result<()> {
    println!("{}", title.bold().cyan());
    println!("{}", "=".repeat(40));
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

// ---------------------------------------------------------------------------
// chimera watch
// ---------------------------------------------------------------------------

/// Poll in the background and print the mirror each interval.
///
/// Runs until interrupted, or for `ticks` refreshes when given.
pub fn run_watch(interval_secs: Option<u64>, ticks: Option<u32>) -> Result<()> {
    let cfg = config::load();
    let interval = Duration::from_secs(interval_secs.unwrap_or(cfg.polling.interval_secs).max(1));

    let mut core = BotControl::from_config(&cfg);
    core.start_polling(interval)
        .context("failed to start the polling thread")?;

    let mut seen = 0u32;
    loop {
        // Give the first fetch a moment before the first frame.
        thread::sleep(if seen == 0 {
            Duration::from_millis(500)
        } else {
            interval
        });
        print_frame(&core.snapshot());
        seen += 1;
        if ticks.is_some_and(|limit| seen >= limit) {
            break;
        }
    }

    core.shutdown();
    Ok(())
}

fn print_frame(snapshot: &MirrorSnapshot) {
    let now = chrono::Local::now().format("%H:%M:%S");
    let state = match &snapshot.status {
        Some(status) => colorize_state(status.status).to_string(),
        None => "unknown".dimmed().to_string(),
    };
    let loading = if snapshot.is_loading {
        " (refreshing)".dimmed().to_string()
    } else {
        String::new()
    };
    let alerts = snapshot
        .monitoring_data
        .as_ref()
        .map(|d| d.open_alerts().len())
        .unwrap_or(0);

    println!(
        "[{}] {} {}{}  {} {}",
        now.to_string().dimmed(),
        "bot:".bold(),
        state,
        loading,
        "open alerts:".bold(),
        alerts,
    );
    if let Some(error) = &snapshot.error {
        println!("  {} {}", "✗".red().bold(), error.red());
    }
}

// ---------------------------------------------------------------------------
// chimera settings show | set | reset | add-dm-user | remove-dm-user | test-discord
// ---------------------------------------------------------------------------

/// Show the local dashboard settings.
pub fn run_settings_show(format: OutputFormat) -> Result<()> {
    let store = SettingsStore::default_location()?;
    let settings = store.load();

    if format == OutputFormat::Json {
        let mut masked = settings.clone();
        masked.discord_settings.bot_token = settings.discord_settings.masked_token();
        println!("{}", serde_json::to_string_pretty(&masked)?);
        return Ok(());
    }

    print_settings(&settings);
    println!();
    println!("  {} {}", "File:".dimmed(), store.path().display().to_string().dimmed());
    Ok(())
}

fn print_settings(settings: &DashboardSettings) {
    println!("{}", "Dashboard Settings".bold().cyan());
    println!("{}", "=".repeat(50));
    println!("  {:<22} {}", "theme", settings.theme);
    println!("  {:<22} {}", "notifications", settings.notifications);
    println!("  {:<22} {}", "auto_refresh", settings.auto_refresh);
    println!("  {:<22} {}ms", "refresh_interval", settings.refresh_interval);
    println!("  {:<22} {}", "sound_effects", settings.sound_effects);
    println!("  {:<22} {}", "high_contrast", settings.high_contrast);
    println!("  {:<22} {}", "language", settings.language);
    println!("  {:<22} {}", "timezone", settings.timezone);
    println!("  {:<22} {} days", "data_retention", settings.data_retention);
    println!("  {:<22} {}%", "alert_threshold", settings.alert_threshold);

    let discord = &settings.discord_settings;
    println!();
    println!("{}", "Discord".bold().cyan());
    println!("  {:<22} {}", "bot_token", discord.masked_token());
    println!("  {:<22} {}", "guild_id", or_unset(&discord.guild_id));
    println!("  {:<22} {}", "report_channel_id", or_unset(&discord.report_channel_id));
    println!("  {:<22} {}", "webhook_url", or_unset(&discord.webhook_url));
    println!(
        "  {:<22} {}",
        "dm_report_users",
        if discord.dm_report_users.is_empty() {
            "none".dimmed().to_string()
        } else {
            discord.dm_report_users.join(", ")
        }
    );
    println!("  {:<22} {}", "alert_keywords", discord.alert_keywords.join(", "));
    for (name, on) in [
        ("monitor_channel_creation", discord.monitor_channel_creation),
        ("monitor_channel_deletion", discord.monitor_channel_deletion),
        ("monitor_role_changes", discord.monitor_role_changes),
        ("monitor_member_join", discord.monitor_member_join),
        ("monitor_member_leave", discord.monitor_member_leave),
        ("monitor_message_deletes", discord.monitor_message_deletes),
    ] {
        println!("  {:<26} {}", name, on);
    }
}

fn or_unset(value: &str) -> String {
    if value.is_empty() {
        "(not set)".dimmed().to_string()
    } else {
        value.to_string()
    }
}

/// Set a single settings value by dotted key.
pub fn run_settings_set(key: &str, value: &str) -> Result<()> {
    let store = SettingsStore::default_location()?;
    store.set(key, value)?;
    let shown = if key.ends_with("bot_token") {
        "(hidden)"
    } else {
        value
    };
    println!("{} Set {} = {}", "✓".green().bold(), key.bold(), shown);
    Ok(())
}

/// Reset settings to defaults.
pub fn run_settings_reset() -> Result<()> {
    let store = SettingsStore::default_location()?;
    store.reset()?;
    println!(
        "{} Settings reset to defaults at {}",
        "✓".green().bold(),
        store.path().display()
    );
    Ok(())
}

pub fn run_settings_add_dm_user(user_id: &str) -> Result<()> {
    let store = SettingsStore::default_location()?;
    let mut added = false;
    store.update(|s| added = s.discord_settings.add_dm_user(user_id))?;
    if added {
        println!("{} Added DM report user {}", "✓".green().bold(), user_id.trim().bold());
    } else {
        println!(
            "{}",
            format!("'{}' is empty or already listed.", user_id.trim()).yellow()
        );
    }
    Ok(())
}

pub fn run_settings_remove_dm_user(user_id: &str) -> Result<()> {
    let store = SettingsStore::default_location()?;
    let mut removed = false;
    store.update(|s| removed = s.discord_settings.remove_dm_user(user_id))?;
    if removed {
        println!("{} Removed DM report user {}", "✓".green().bold(), user_id.trim().bold());
    } else {
        println!("{}", format!("'{}' was not listed.", user_id.trim()).yellow());
    }
    Ok(())
}

/// Check that the Discord connection settings are filled in.
pub fn run_settings_test_discord() -> Result<()> {
    let settings = SettingsStore::default_location()?.load();
    let discord = &settings.discord_settings;

    print_health_item("Bot token", !discord.bot_token.is_empty(), &discord.masked_token());
    print_health_item("Guild id", !discord.guild_id.is_empty(), &or_unset(&discord.guild_id));

    if settings.discord_connection_ready() {
        println!("{} Discord connection settings look complete.", "✓".green().bold());
        Ok(())
    } else {
        anyhow::bail!("Discord connection not configured: set discord_settings.bot_token and discord_settings.guild_id")
    }
}

// ---------------------------------------------------------------------------
// chimera config show | init | set | reset
// ---------------------------------------------------------------------------

/// Show the effective (merged) configuration as TOML.
pub fn run_config_show() -> Result<()> {
    let toml_str = config::show_effective_config()?;
    println!("{}", "Effective Chimera Configuration".bold().cyan());
    println!("{}", "=".repeat(50));
    println!();
    println!("{toml_str}");

    let global_exists = config::global_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);
    let project_exists = config::project_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);
    println!("{}", "Sources (highest priority last):".dimmed());
    println!("  {} built-in defaults", "·".dimmed());
    if global_exists {
        println!("  {} {}", "✓".green(), "~/.chimera/config.toml".dimmed());
    } else {
        println!(
            "  {} {}",
            "·".dimmed(),
            "~/.chimera/config.toml (not found)".dimmed()
        );
    }
    if project_exists {
        println!("  {} {}", "✓".green(), ".chimera.toml".dimmed());
    } else {
        println!("  {} {}", "·".dimmed(), ".chimera.toml (not found)".dimmed());
    }
    println!(
        "  {} {}",
        "·".dimmed(),
        "CHIMERA_* environment variables".dimmed()
    );

    Ok(())
}

/// Initialize a default config file at `~/.chimera/config.toml`.
pub fn run_config_init(force: bool) -> Result<()> {
    let path = config::init_config(force)?;
    println!(
        "{} Config written to {}",
        "✓".green().bold(),
        path.display()
    );
    Ok(())
}

pub fn run_config_set(key: &str, value: &str) -> Result<()> {
    config::set_config_value(key, value)?;
    println!("{} Set {} = {}", "✓".green().bold(), key.bold(), value);
    Ok(())
}

pub fn run_config_reset() -> Result<()> {
    let path = config::reset_config()?;
    println!(
        "{} Config reset to defaults at {}",
        "✓".green().bold(),
        path.display()
    );
    Ok(())
}

// ---------------------------------------------------------------------------
// chimera stats
// ---------------------------------------------------------------------------

/// Summarize the action journal.
pub fn run_stats(format: OutputFormat, days: Option<u32>) -> Result<()> {
    let entries = Journal::default_location().read_since_days(days);
    let stats = reporter::summarize(&entries);

    if stats.total == 0 {
        println!(
            "{}",
            "No data yet. Run some commands against the bot to see stats.".yellow()
        );
        return Ok(());
    }

    match format {
        OutputFormat::Json => print_stats_json(&stats)?,
        OutputFormat::Csv => print_stats_csv(&stats),
        OutputFormat::Table => print_stats_table(&stats),
    }
    Ok(())
}

fn print_stats_table(stats: &Stats) {
    println!("{}", "Chimera Sync Journal".bold().cyan());
    println!("{}", "=".repeat(60));
    println!();
    println!("  {} {}", "Total actions:".bold(), format_number(stats.total));
    println!(
        "  {} {} ok, {} failed ({:.1}%), {} stale",
        "Outcomes:     ".bold(),
        stats.ok,
        stats.failed,
        stats.failure_pct(),
        stats.stale,
    );
    let f = &stats.failures;
    println!(
        "  {} network {}  http {}  logical {}",
        "Failures:     ".bold(),
        f.network,
        f.http,
        f.logical,
    );
    println!();

    if stats.actions.is_empty() {
        return;
    }
    println!("{}", "Actions".bold().cyan());
    println!(
        "  {:<22} {:>6} {:>7} {:>6} {:>9}  Last error",
        "Action", "Count", "Failed", "Stale", "Avg ms"
    );
    println!("  {}", "-".repeat(70));
    for (i, action) in stats.actions.iter().take(15).enumerate() {
        let line = format!(
            "  {:<22} {:>6} {:>7} {:>6} {:>9.1}  {}",
            truncate(&action.action, 22),
            action.count,
            action.failed,
            action.stale,
            action.avg_latency_ms,
            truncate(action.last_error.as_deref().unwrap_or(""), 30),
        );
        if i % 2 == 0 {
            println!("{line}");
        } else {
            println!("{}", line.dimmed());
        }
    }
}

fn print_stats_json(stats: &Stats) -> Result<()> {
    let value = serde_json::json!({
        "total": stats.total,
        "ok": stats.ok,
        "failed": stats.failed,
        "stale": stats.stale,
        "failures": {
            "network": stats.failures.network,
            "http": stats.failures.http,
            "logical": stats.failures.logical,
        },
        "actions": stats.actions.iter().map(|a| serde_json::json!({
            "action": a.action,
            "count": a.count,
            "failed": a.failed,
            "stale": a.stale,
            "avg_latency_ms": a.avg_latency_ms,
            "last_error": a.last_error,
        })).collect::<Vec<_>>(),
    });
    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}

fn print_stats_csv(stats: &Stats) {
    println!("action,count,failed,stale,avg_latency_ms");
    for a in &stats.actions {
        println!(
            "{},{},{},{},{:.1}",
            a.action, a.count, a.failed, a.stale, a.avg_latency_ms,
        );
    }
}

// ---------------------------------------------------------------------------
// Formatting helpers
// ---------------------------------------------------------------------------

/// Format a number with comma separators for readability.
fn format_number(n: usize) -> String {
    let s = n.to_string();
    let mut result = String::new();
    for (i, ch) in s.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(ch);
    }
    result.chars().rev().collect()
}

/// Truncate a string to `max_len` characters, appending "…" if truncated.
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(1)).collect();
        format!("{kept}…")
    }
}

fn colorize_state(state: BotState) -> colored::ColoredString {
    let name = state.to_string();
    match state {
        BotState::Online => name.green().bold(),
        BotState::Paused => name.yellow().bold(),
        BotState::Offline => name.red().bold(),
    }
}

fn colorize_severity(severity: Severity) -> colored::ColoredString {
    let label = format!("[{severity}]");
    match severity {
        Severity::Critical => label.red().bold(),
        Severity::High => label.red(),
        Severity::Medium => label.yellow(),
        Severity::Low => label.normal(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
