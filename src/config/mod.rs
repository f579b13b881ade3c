/// Configuration system for chimera.
///
/// Layered hierarchy, later layers override earlier ones:
///
/// 1. **Built-in defaults**: [`schema::ChimeraConfig::default()`]
/// 2. **User global config**: `~/.chimera/config.toml`
/// 3. **Project local config**: `.chimera.toml` in the current directory
/// 4. **Environment variables**: `CHIMERA_*` overrides
///
/// Missing sections and keys in a file fall back to defaults.
pub mod schema;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

pub use schema::ChimeraConfig;
use schema::PollingConfig;

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Load the fully resolved configuration.
pub fn load() -> ChimeraConfig {
    let mut config = load_layers(&[global_config_path(), project_config_path()]);
    apply_env_overrides(&mut config);
    config
}

/// Merge config files over the defaults, in order. Each file only overrides
/// the keys it sets; keys it leaves out keep the value from earlier layers.
fn load_layers(paths: &[Option<PathBuf>]) -> ChimeraConfig {
    let mut merged = toml::Value::Table(toml::Table::new());
    for layer in paths.iter().filter_map(|p| load_toml_file(p.as_deref())) {
        merge_toml(&mut merged, layer);
    }

    let mut config: ChimeraConfig = merged.try_into().unwrap_or_default();
    if config.polling.interval_secs == 0 {
        config.polling.interval_secs = PollingConfig::default().interval_secs;
    }
    config
}

/// Read a TOML config file as a raw value tree. Missing files, malformed
/// files and files that do not fit the schema yield `None`; a bad config
/// file must never stop the panel from starting.
fn load_toml_file(path: Option<&Path>) -> Option<toml::Value> {
    let content = fs::read_to_string(path?).ok()?;
    let value: toml::Value = toml::from_str(&content).ok()?;
    value.clone().try_into::<ChimeraConfig>().ok()?;
    Some(value)
}

/// Deep-merge `overlay` into `base`: tables merge key by key, any other
/// value replaces what was there.
fn merge_toml(base: &mut toml::Value, overlay: toml::Value) {
    match (base, overlay) {
        (toml::Value::Table(base), toml::Value::Table(overlay)) => {
            for (key, value) in overlay {
                match base.get_mut(&key) {
                    Some(existing) => merge_toml(existing, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (base, overlay) => *base = overlay,
    }
}

// ---------------------------------------------------------------------------
// File paths
// ---------------------------------------------------------------------------

/// `~/.chimera`, where config, settings and the journal live.
pub fn data_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".chimera"))
}

fn global_config_path() -> Option<PathBuf> {
    data_dir().map(|dir| dir.join("config.toml"))
}

fn project_config_path() -> Option<PathBuf> {
    std::env::current_dir()
        .ok()
        .map(|cwd| cwd.join(".chimera.toml"))
}

/// Path to the global config file, for display.
pub fn global_config_file() -> Option<PathBuf> {
    global_config_path()
}

/// Path to the project config file, for display.
pub fn project_config_file() -> Option<PathBuf> {
    project_config_path()
}

// ---------------------------------------------------------------------------
// Environment variable overrides
// ---------------------------------------------------------------------------

/// Apply environment variable overrides (highest precedence layer).
///
/// - `CHIMERA_API_URL`: service base URL
/// - `CHIMERA_TIMEOUT_MS`: per-call timeout
/// - `CHIMERA_MAX_RETRIES`: retries on network failure
/// - `CHIMERA_POLL_INTERVAL_SECS`: background refresh cadence
/// - `CHIMERA_JOURNAL`: journal on/off (`1`/`true`/`yes`/`on`)
fn apply_env_overrides(config: &mut ChimeraConfig) {
    if let Ok(val) = std::env::var("CHIMERA_API_URL")
        && !val.is_empty()
    {
        config.api.base_url = val;
    }
    if let Ok(val) = std::env::var("CHIMERA_TIMEOUT_MS")
        && let Ok(ms) = val.parse::<u64>()
    {
        config.api.timeout_ms = ms;
    }
    if let Ok(val) = std::env::var("CHIMERA_MAX_RETRIES")
        && let Ok(n) = val.parse::<u32>()
    {
        config.api.max_retries = n;
    }
    if let Ok(val) = std::env::var("CHIMERA_POLL_INTERVAL_SECS")
        && let Ok(secs) = val.parse::<u64>()
        && secs > 0
    {
        config.polling.interval_secs = secs;
    }
    if let Ok(val) = std::env::var("CHIMERA_JOURNAL") {
        config.logging.journal = is_truthy(&val);
    }
}

/// Check if a string value represents a truthy boolean.
pub(crate) fn is_truthy(val: &str) -> bool {
    matches!(
        val.to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

// ---------------------------------------------------------------------------
// Config init / set / reset
// ---------------------------------------------------------------------------

/// Write the annotated default config to `~/.chimera/config.toml`.
///
/// Fails if the file exists unless `force` is set.
pub fn init_config(force: bool) -> Result<PathBuf> {
    let path = global_config_path().context("could not determine home directory")?;

    if path.exists() && !force {
        anyhow::bail!(
            "config file already exists at {}. Use --force to overwrite.",
            path.display()
        );
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("failed to create ~/.chimera/ directory")?;
    }

    fs::write(&path, ChimeraConfig::default_toml()).context("failed to write config file")?;

    Ok(path)
}

/// Set a dotted key (e.g. `api.timeout_ms`) in the global config file.
pub fn set_config_value(key: &str, value: &str) -> Result<()> {
    let path = global_config_path().context("could not determine home directory")?;
    set_config_value_at(&path, key, value)
}

fn set_config_value_at(path: &Path, key: &str, value: &str) -> Result<()> {
    // Start from the existing file, or from serialized defaults so that
    // every key exists and carries its type.
    let content = if path.exists() {
        fs::read_to_string(path).context("failed to read config file")?
    } else {
        toml::to_string_pretty(&ChimeraConfig::default())
            .context("failed to serialize default config")?
    };

    let mut root: toml::Value =
        toml::from_str(&content).context("failed to parse config as TOML value")?;
    set_toml_value(&mut root, key, value)?;

    // Reject edits that no longer deserialize into the schema.
    let rendered = toml::to_string_pretty(&root).context("failed to serialize config")?;
    toml::from_str::<ChimeraConfig>(&rendered)
        .with_context(|| format!("'{value}' is not a valid value for '{key}'"))?;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("failed to create config directory")?;
    }
    fs::write(path, rendered).context("failed to write config file")?;

    Ok(())
}

/// Set a value in a TOML value tree using a dotted key path. The existing
/// value's type decides how `raw_value` is parsed; missing leaves inside an
/// existing table (such as `api.headers.X-Token`) are stored as strings.
fn set_toml_value(root: &mut toml::Value, key: &str, raw_value: &str) -> Result<()> {
    let parts: Vec<&str> = key.split('.').collect();
    if parts.iter().any(|p| p.is_empty()) {
        anyhow::bail!("invalid config key: '{key}'");
    }

    let mut current = root;
    for &part in &parts[..parts.len() - 1] {
        current = current
            .get_mut(part)
            .with_context(|| format!("config key not found: section '{part}' in '{key}'"))?;
    }

    let leaf = parts[parts.len() - 1];
    let table = current
        .as_table_mut()
        .with_context(|| format!("expected table above '{leaf}' in '{key}'"))?;

    let new_value = match table.get(leaf) {
        Some(toml::Value::Boolean(_)) => toml::Value::Boolean(is_truthy(raw_value)),
        Some(toml::Value::Integer(_)) => {
            let n: i64 = raw_value
                .parse()
                .with_context(|| format!("expected integer for '{key}', got '{raw_value}'"))?;
            toml::Value::Integer(n)
        }
        Some(toml::Value::Table(_)) => {
            anyhow::bail!("'{key}' is a section; set one of its keys instead")
        }
        _ => toml::Value::String(raw_value.to_string()),
    };

    table.insert(leaf.to_string(), new_value);
    Ok(())
}

/// Overwrite the global config with defaults.
pub fn reset_config() -> Result<PathBuf> {
    init_config(true)
}

/// Render the effective (fully resolved) config as TOML.
pub fn show_effective_config() -> Result<String> {
    toml::to_string_pretty(&load()).context("failed to serialize effective config")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_file(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("chimera-config-{}-{name}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        dir.join("config.toml")
    }

    fn write_layer(name: &str, content: &str) -> Option<PathBuf> {
        let path = scratch_file(name);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, content).unwrap();
        Some(path)
    }

    #[test]
    fn project_layer_only_overrides_keys_it_sets() {
        let global = write_layer(
            "layer-global",
            "[api]\nbase_url = \"http://global:9/api\"\ntimeout_ms = 4000\n",
        );
        let project = write_layer(
            "layer-project",
            "[api]\ntimeout_ms = 1500\n\n[polling]\ninterval_secs = 30\n",
        );

        let config = load_layers(&[global, project]);
        assert_eq!(config.api.base_url, "http://global:9/api");
        assert_eq!(config.api.timeout_ms, 1500);
        assert_eq!(config.polling.interval_secs, 30);
        assert_eq!(config.api.max_retries, 0);
        assert!(config.logging.journal);
    }

    #[test]
    fn invalid_layer_is_skipped_without_losing_others() {
        let global = write_layer("skip-global", "[api]\nbase_url = \"http://global:9/api\"\n");
        let broken = write_layer("skip-project", "[polling]\ninterval_secs = \"often\"\n");

        let config = load_layers(&[global, broken, None]);
        assert_eq!(config.api.base_url, "http://global:9/api");
        assert_eq!(config.polling.interval_secs, 10);
    }

    #[test]
    fn zero_poll_interval_falls_back_to_default() {
        let layer = write_layer("zero-interval", "[polling]\ninterval_secs = 0\n");
        assert_eq!(load_layers(&[layer]).polling.interval_secs, 10);
    }

    #[test]
    fn is_truthy_accepts_variants() {
        assert!(is_truthy("1"));
        assert!(is_truthy("TRUE"));
        assert!(is_truthy("yes"));
        assert!(is_truthy("On"));
        assert!(!is_truthy("0"));
        assert!(!is_truthy("off"));
        assert!(!is_truthy(""));
    }

    #[test]
    fn set_toml_value_updates_integer() {
        let mut root: toml::Value = toml::from_str("[api]\ntimeout_ms = 100\n").unwrap();
        set_toml_value(&mut root, "api.timeout_ms", "2500").unwrap();
        assert_eq!(root["api"]["timeout_ms"].as_integer(), Some(2500));
    }

    #[test]
    fn set_toml_value_updates_bool() {
        let mut root: toml::Value = toml::from_str("[logging]\njournal = true\n").unwrap();
        set_toml_value(&mut root, "logging.journal", "off").unwrap();
        assert_eq!(root["logging"]["journal"].as_bool(), Some(false));
    }

    #[test]
    fn set_toml_value_adds_header() {
        let mut root: toml::Value = toml::from_str("[api.headers]\n").unwrap();
        set_toml_value(&mut root, "api.headers.Authorization", "Bearer x").unwrap();
        assert_eq!(root["api"]["headers"]["Authorization"].as_str(), Some("Bearer x"));
    }

    #[test]
    fn set_toml_value_rejects_bad_input() {
        let mut root: toml::Value = toml::from_str("[api]\ntimeout_ms = 100\n").unwrap();
        assert!(set_toml_value(&mut root, "api.timeout_ms", "soon").is_err());
        assert!(set_toml_value(&mut root, "nonexistent.key", "v").is_err());
        assert!(set_toml_value(&mut root, "api", "v").is_err());
        assert!(set_toml_value(&mut root, "api..x", "v").is_err());
    }

    #[test]
    fn set_config_value_creates_file_from_defaults() {
        let path = scratch_file("create");
        set_config_value_at(&path, "polling.interval_secs", "30").unwrap();

        let config: ChimeraConfig = toml::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(config.polling.interval_secs, 30);
        assert_eq!(config.api.base_url, "http://localhost:5000/api");

        let _ = fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn set_config_value_rejects_schema_violations() {
        let path = scratch_file("reject");
        let result = set_config_value_at(&path, "polling.interval_secs", "-5");
        assert!(result.is_err());
        assert!(!path.exists());
    }

    #[test]
    fn show_effective_config_round_trips() {
        let rendered = show_effective_config().unwrap();
        let _: ChimeraConfig = toml::from_str(&rendered).unwrap();
    }
}
