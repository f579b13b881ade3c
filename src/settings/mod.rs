/// Local dashboard preferences, persisted to `~/.chimera/settings.json`.
///
/// These never leave the machine; nothing here is sent to the bot service.
/// Saved files are merged over defaults field by field, so a file written by
/// an older version (or edited by hand) only overrides what it contains.
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::{data_dir, is_truthy};

// ---------------------------------------------------------------------------
// Settings schema
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardSettings {
    /// UI theme name.
    pub theme: String,
    pub notifications: bool,
    pub auto_refresh: bool,
    /// Milliseconds between dashboard refreshes.
    pub refresh_interval: u64,
    pub sound_effects: bool,
    pub high_contrast: bool,
    pub language: String,
    pub timezone: String,
    /// Days of history to keep.
    pub data_retention: u32,
    /// Percentage above which an alert is raised.
    pub alert_threshold: u32,
    pub discord_settings: DiscordSettings,
}

impl Default for DashboardSettings {
    fn default() -> Self {
        Self {
            theme: "dark".to_string(),
            notifications: true,
            auto_refresh: true,
            refresh_interval: 1500,
            sound_effects: false,
            high_contrast: false,
            language: "en".to_string(),
            timezone: "UTC".to_string(),
            data_retention: 30,
            alert_threshold: 75,
            discord_settings: DiscordSettings::default(),
        }
    }
}

impl DashboardSettings {
    pub fn discord_connection_ready(&self) -> bool {
        self.discord_settings.connection_ready()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscordSettings {
    pub bot_token: String,
    pub guild_id: String,
    pub report_channel_id: String,
    /// User ids that receive alert DMs.
    pub dm_report_users: Vec<String>,
    pub monitor_channel_creation: bool,
    pub monitor_channel_deletion: bool,
    pub monitor_role_changes: bool,
    pub monitor_member_join: bool,
    pub monitor_member_leave: bool,
    pub monitor_message_deletes: bool,
    pub webhook_url: String,
    pub alert_keywords: Vec<String>,
}

impl Default for DiscordSettings {
    fn default() -> Self {
        Self {
            bot_token: String::new(),
            guild_id: String::new(),
            report_channel_id: String::new(),
            dm_report_users: Vec::new(),
            monitor_channel_creation: true,
            monitor_channel_deletion: true,
            monitor_role_changes: false,
            monitor_member_join: true,
            monitor_member_leave: true,
            monitor_message_deletes: false,
            webhook_url: String::new(),
            alert_keywords: ["spam", "raid", "hack", "attack"]
                .iter()
                .map(|k| k.to_string())
                .collect(),
        }
    }
}

impl DiscordSettings {
    /// Both the bot token and the guild id are configured.
    pub fn connection_ready(&self) -> bool {
        !self.bot_token.trim().is_empty() && !self.guild_id.trim().is_empty()
    }

    /// Token for display: first and last four characters only.
    pub fn masked_token(&self) -> String {
        mask_secret(&self.bot_token)
    }

    /// Add a DM report recipient. Returns `false` for empty or duplicate ids.
    pub fn add_dm_user(&mut self, user_id: &str) -> bool {
        let id = user_id.trim();
        if id.is_empty() || self.dm_report_users.iter().any(|u| u == id) {
            return false;
        }
        self.dm_report_users.push(id.to_string());
        true
    }

    /// Remove a DM report recipient. Returns whether it was present.
    pub fn remove_dm_user(&mut self, user_id: &str) -> bool {
        let before = self.dm_report_users.len();
        self.dm_report_users.retain(|u| u != user_id.trim());
        self.dm_report_users.len() != before
    }
}

fn mask_secret(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    match chars.len() {
        0 => "(not set)".to_string(),
        n if n <= 8 => "*".repeat(n),
        n => {
            let head: String = chars[..4].iter().collect();
            let tail: String = chars[n - 4..].iter().collect();
            format!("{head}{}{tail}", "*".repeat(n - 8))
        }
    }
}

// ---------------------------------------------------------------------------
// Store
// ---------------------------------------------------------------------------

/// File-backed settings store.
#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    /// Store at `~/.chimera/settings.json`.
    pub fn default_location() -> Result<Self> {
        let dir = data_dir().context("could not determine home directory")?;
        Ok(Self::at(dir.join("settings.json")))
    }

    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Saved settings merged over defaults. A missing or malformed file
    /// yields the defaults.
    pub fn load(&self) -> DashboardSettings {
        fs::read_to_string(&self.path)
            .ok()
            .and_then(|content| serde_json::from_str(&content).ok())
            .unwrap_or_default()
    }

    pub fn save(&self, settings: &DashboardSettings) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).context("failed to create settings directory")?;
        }
        let json = serde_json::to_string_pretty(settings).context("failed to serialize settings")?;
        fs::write(&self.path, json)
            .with_context(|| format!("failed to write {}", self.path.display()))?;
        Ok(())
    }

    /// Overwrite the file with defaults and return them.
    pub fn reset(&self) -> Result<DashboardSettings> {
        let defaults = DashboardSettings::default();
        self.save(&defaults)?;
        Ok(defaults)
    }

    /// Set a dotted key (e.g. `discord_settings.guild_id`) and save.
    pub fn set(&self, key: &str, raw_value: &str) -> Result<DashboardSettings> {
        let current = self.load();
        let mut root = serde_json::to_value(&current).context("failed to serialize settings")?;
        set_json_value(&mut root, key, raw_value)?;

        let updated: DashboardSettings = serde_json::from_value(root)
            .with_context(|| format!("'{raw_value}' is not a valid value for '{key}'"))?;
        self.save(&updated)?;
        Ok(updated)
    }

    /// Load, apply `edit`, and save.
    pub fn update(&self, edit: impl FnOnce(&mut DashboardSettings)) -> Result<DashboardSettings> {
        let mut settings = self.load();
        edit(&mut settings);
        self.save(&settings)?;
        Ok(settings)
    }
}

/// Set a value in a JSON tree by dotted key. Only existing keys can be set;
/// the existing value's type decides how `raw_value` is parsed. Lists take
/// comma-separated items.
fn set_json_value(root: &mut Value, key: &str, raw_value: &str) -> Result<()> {
    let parts: Vec<&str> = key.split('.').collect();
    if parts.iter().any(|p| p.is_empty()) {
        anyhow::bail!("invalid settings key: '{key}'");
    }

    let mut current = root;
    for &part in &parts {
        current = current
            .get_mut(part)
            .with_context(|| format!("unknown settings key: '{key}'"))?;
    }

    *current = match &*current {
        Value::Bool(_) => Value::Bool(is_truthy(raw_value)),
        Value::Number(_) => {
            let n: u64 = raw_value
                .parse()
                .with_context(|| format!("expected a number for '{key}', got '{raw_value}'"))?;
            Value::from(n)
        }
        Value::Array(_) => Value::Array(
            raw_value
                .split(',')
                .map(str::trim)
                .filter(|item| !item.is_empty())
                .map(|item| Value::String(item.to_string()))
                .collect(),
        ),
        Value::Object(_) => anyhow::bail!("'{key}' is a section; set one of its keys instead"),
        _ => Value::String(raw_value.to_string()),
    };
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
