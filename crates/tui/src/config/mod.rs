use clap::Parser;
use serde::Deserialize;

use crate::error::{AppError, Result};

const DEFAULT_CONFIG_PATH: &str = "config/tbcparcer.toml";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub base_url: String,
    /// Without it the client cannot load or create anything.
    pub telegram_id: Option<i64>,
    pub username: String,
    pub default_currency: String,
    pub timezone: String,
    pub state_path: String,
    /// Pixel width of one terminal cell, used to map layout widths to columns.
    pub cell_width_px: u16,
    pub log_level: String,
    pub log_file: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_string(),
            telegram_id: None,
            username: String::new(),
            default_currency: engine::DEFAULT_CURRENCY.to_string(),
            timezone: "Asia/Tashkent".to_string(),
            state_path: "config/tbcparcer_state.json".to_string(),
            cell_width_px: 8,
            log_level: "info".to_string(),
            log_file: "tbcparcer_tui.log".to_string(),
        }
    }
}

impl AppConfig {
    /// Key the table layout is stored under; `None` selects the shared key.
    pub fn user_key(&self) -> Option<String> {
        self.telegram_id.map(|id| id.to_string())
    }

    pub fn time_zone(&self) -> chrono_tz::Tz {
        self.timezone.parse().unwrap_or_else(|_| {
            tracing::warn!(timezone = %self.timezone, "unknown timezone, falling back to UTC");
            chrono_tz::UTC
        })
    }

    fn validate(&self) -> Result<()> {
        if self.cell_width_px == 0 {
            return Err(AppError::InvalidSetting {
                key: "cell_width_px",
                reason: "must be greater than zero".to_string(),
            });
        }
        Ok(())
    }
}

#[derive(Debug, Parser)]
#[command(name = "tbcparcer_tui", disable_version_flag = true)]
struct Args {
    /// Optional config file path (TOML).
    #[arg(long)]
    config: Option<String>,
    /// Override base URL (e.g. http://localhost:5000).
    #[arg(long)]
    base_url: Option<String>,
    /// Override the Telegram id the data belongs to.
    #[arg(long)]
    telegram_id: Option<i64>,
    /// Override username sent with parsed receipts.
    #[arg(long)]
    username: Option<String>,
    /// Override timezone (IANA name).
    #[arg(long)]
    timezone: Option<String>,
    /// Override the local state file.
    #[arg(long)]
    state_path: Option<String>,
    /// Override log level (e.g. debug).
    #[arg(long)]
    log_level: Option<String>,
}

pub fn load() -> Result<AppConfig> {
    let args = Args::parse();

    let config_path = args.config.as_deref().unwrap_or(DEFAULT_CONFIG_PATH);
    let mut builder = config::Config::builder();
    builder = builder.add_source(config::File::with_name(config_path).required(false));
    builder = builder.add_source(config::Environment::with_prefix("TBCPARCER").separator("__"));
    let mut settings: AppConfig = builder.build()?.try_deserialize()?;

    if let Some(base_url) = args.base_url {
        settings.base_url = base_url;
    }
    if let Some(telegram_id) = args.telegram_id {
        settings.telegram_id = Some(telegram_id);
    }
    if let Some(username) = args.username {
        settings.username = username;
    }
    if let Some(timezone) = args.timezone {
        settings.timezone = timezone;
    }
    if let Some(state_path) = args.state_path {
        settings.state_path = state_path;
    }
    if let Some(log_level) = args.log_level {
        settings.log_level = log_level;
    }

    settings.validate()?;
    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_local_backend() {
        let config = AppConfig::default();
        assert_eq!(config.base_url, "http://localhost:5000");
        assert_eq!(config.default_currency, "UZS");
        assert_eq!(config.user_key(), None);
        assert_eq!(config.time_zone(), chrono_tz::Asia::Tashkent);
    }

    #[test]
    fn unknown_timezone_falls_back_to_utc() {
        let config = AppConfig {
            timezone: "Mars/Olympus".to_string(),
            ..AppConfig::default()
        };
        assert_eq!(config.time_zone(), chrono_tz::UTC);
    }

    #[test]
    fn file_values_are_layered_over_defaults() {
        let settings: AppConfig = config::Config::builder()
            .add_source(config::File::from_str(
                "telegram_id = 777001\nbase_url = \"http://10.0.0.2:5000\"",
                config::FileFormat::Toml,
            ))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();
        assert_eq!(settings.telegram_id, Some(777001));
        assert_eq!(settings.base_url, "http://10.0.0.2:5000");
        assert_eq!(settings.state_path, "config/tbcparcer_state.json");
        assert_eq!(settings.user_key().as_deref(), Some("777001"));
    }
}
