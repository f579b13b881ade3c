use anyhow::Result;
use clap::{Parser, Subcommand};

use chimera::api::BotAction;
use chimera::cli::{self, OutputFormat};
use chimera::sync::DEFAULT_TIMEFRAME;

#[derive(Debug, Parser)]
#[command(name = "chimera")]
#[command(about = "Control panel for the Chimera Discord bot")]
struct App {
    /// Print raw JSON results instead of tables
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Show the bot's run state, channels and AI features
    Status,
    /// Ask the bot to start
    Start,
    /// Ask the bot to pause
    Pause,
    /// Ask the bot to stop
    Stop,
    /// Show or replace the monitored channels
    Channels {
        /// Comma-separated channel ids to monitor
        #[arg(long, value_delimiter = ',')]
        set: Option<Vec<String>>,
    },
    /// Show or change AI feature toggles
    Ai {
        /// Toggle assignments such as auto_reports=on
        #[arg(long = "set", value_name = "NAME=BOOL")]
        set: Vec<String>,
    },
    /// Show recent monitoring data and open alerts
    Monitoring,
    /// Probe the service health endpoint
    Health,
    /// Analyze a piece of text
    Analyze {
        #[arg(trailing_var_arg = true, required = true)]
        text: Vec<String>,
    },
    /// Detect anomalies in a JSON metrics object
    Anomalies {
        /// Metrics as JSON, e.g. '{"cpu": 93}'
        metrics: String,
    },
    /// Generate an AI report over current monitoring data
    Report {
        /// Report timeframe (default: 24h)
        #[arg(long, default_value = DEFAULT_TIMEFRAME)]
        timeframe: String,
        /// Use the legacy bot report endpoint
        #[arg(long)]
        legacy: bool,
    },
    /// Generate smart alerts from a JSON array of recent activity
    Alerts {
        activity: String,
    },
    /// Legacy sentiment analysis
    Sentiment {
        #[arg(trailing_var_arg = true, required = true)]
        text: Vec<String>,
    },
    /// Poll the bot and print its state until interrupted
    Watch {
        /// Seconds between refreshes (default: from config)
        #[arg(long)]
        interval: Option<u64>,
        /// Stop after this many frames
        #[arg(long)]
        ticks: Option<u32>,
    },
    /// Manage local dashboard settings
    Settings {
        #[command(subcommand)]
        command: SettingsCommands,
    },
    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
    /// Summarize the action journal
    Stats {
        /// Output format: table (default), json, csv
        #[arg(long, default_value = "table")]
        format: String,
        /// Only include the last N days of data
        #[arg(long)]
        days: Option<u32>,
    },
}

#[derive(Debug, Subcommand)]
enum SettingsCommands {
    /// Show current settings
    Show,
    /// Set a value by dotted key, e.g. discord_settings.guild_id
    Set { key: String, value: String },
    /// Restore defaults
    Reset,
    /// Add a user to the DM report list
    AddDmUser { user_id: String },
    /// Remove a user from the DM report list
    RemoveDmUser { user_id: String },
    /// Check that Discord connection settings are complete
    TestDiscord,
}

#[derive(Debug, Subcommand)]
enum ConfigCommands {
    /// Show the effective configuration
    Show,
    /// Write the default config to ~/.chimera/config.toml
    Init {
        #[arg(long)]
        force: bool,
    },
    /// Set a value by dotted key, e.g. api.timeout_ms
    Set { key: String, value: String },
    /// Restore the default config file
    Reset,
}

fn main() -> Result<()> {
    let app = App::parse();
    let format = if app.json {
        OutputFormat::Json
    } else {
        OutputFormat::Table
    };

    match app.command {
        Commands::Status => cli::run_status(format),
        Commands::Start => cli::run_control(BotAction::Start, format),
        Commands::Pause => cli::run_control(BotAction::Pause, format),
        Commands::Stop => cli::run_control(BotAction::Stop, format),
        Commands::Channels { set } => cli::run_channels(set, format),
        Commands::Ai { set } => cli::run_ai(&set, format),
        Commands::Monitoring => cli::run_monitoring(format),
        Commands::Health => cli::run_health(format),
        Commands::Analyze { text } => cli::run_analyze(&text.join(" "), format),
        Commands::Anomalies { metrics } => cli::run_anomalies(&metrics, format),
        Commands::Report { timeframe, legacy } => cli::run_report(&timeframe, legacy, format),
        Commands::Alerts { activity } => cli::run_alerts(&activity, format),
        Commands::Sentiment { text } => cli::run_sentiment(&text.join(" "), format),
        Commands::Watch { interval, ticks } => cli::run_watch(interval, ticks),
        Commands::Settings { command } => match command {
            SettingsCommands::Show => cli::run_settings_show(format),
            SettingsCommands::Set { key, value } => cli::run_settings_set(&key, &value),
            SettingsCommands::Reset => cli::run_settings_reset(),
            SettingsCommands::AddDmUser { user_id } => cli::run_settings_add_dm_user(&user_id),
            SettingsCommands::RemoveDmUser { user_id } => {
                cli::run_settings_remove_dm_user(&user_id)
            }
            SettingsCommands::TestDiscord => cli::run_settings_test_discord(),
        },
        Commands::Config { command } => match command {
            ConfigCommands::Show => cli::run_config_show(),
            ConfigCommands::Init { force } => cli::run_config_init(force),
            ConfigCommands::Set { key, value } => cli::run_config_set(&key, &value),
            ConfigCommands::Reset => cli::run_config_reset(),
        },
        Commands::Stats { format, days } => {
            let fmt = OutputFormat::from_str_opt(Some(&format));
            cli::run_stats(fmt, days)
        }
    }
}
