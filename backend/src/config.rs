//! Runtime configuration, read once at startup from `STAFFDOCS_*` environment
//! variables. Every setting has a default so a bare `cargo run` works.

use std::env;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{key} must be a number, got {value:?}")]
    InvalidNumber { key: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// SQLite file backing the entity store.
    pub database_path: PathBuf,
    pub upload_dir: PathBuf,
    pub report_dir: PathBuf,
    /// Directory holding the TTF files used for PDF reports.
    pub font_dir: PathBuf,
    /// Optional image printed at the top of every report.
    pub report_logo: Option<PathBuf>,
    /// When set, API calls and private files require `Authorization: Bearer <token>`.
    pub api_token: Option<String>,
    /// Minimum time between two unforced document repair runs.
    pub repair_ttl: Duration,
    /// Documents expiring within this many days are flagged as expiring soon.
    pub expiry_warning_days: i64,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            host: "127.0.0.1".to_string(),
            port: 8080,
            database_path: PathBuf::from("staffdocs.sqlite"),
            upload_dir: PathBuf::from("./uploads"),
            report_dir: PathBuf::from("./reports"),
            font_dir: PathBuf::from("./fonts"),
            report_logo: None,
            api_token: None,
            repair_ttl: Duration::from_secs(3600),
            expiry_warning_days: 30,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup. Blank values count
    /// as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Config::default();

        Ok(Config {
            host: get("STAFFDOCS_HOST").unwrap_or(defaults.host),
            port: parse_number("STAFFDOCS_PORT", get("STAFFDOCS_PORT"))?.unwrap_or(defaults.port),
            database_path: get("STAFFDOCS_DB")
                .map(PathBuf::from)
                .unwrap_or(defaults.database_path),
            upload_dir: get("STAFFDOCS_UPLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.upload_dir),
            report_dir: get("STAFFDOCS_REPORT_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.report_dir),
            font_dir: get("STAFFDOCS_FONT_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.font_dir),
            report_logo: get("STAFFDOCS_REPORT_LOGO").map(PathBuf::from),
            api_token: get("STAFFDOCS_API_TOKEN"),
            repair_ttl: parse_number("STAFFDOCS_REPAIR_TTL_SECS", get("STAFFDOCS_REPAIR_TTL_SECS"))?
                .map(Duration::from_secs)
                .unwrap_or(defaults.repair_ttl),
            expiry_warning_days: parse_number(
                "STAFFDOCS_EXPIRY_WARNING_DAYS",
                get("STAFFDOCS_EXPIRY_WARNING_DAYS"),
            )?
            .unwrap_or(defaults.expiry_warning_days),
        })
    }
}

fn parse_number<T: std::str::FromStr>(
    key: &'static str,
    value: Option<String>,
) -> Result<Option<T>, ConfigError> {
    value
        .map(|raw| {
            raw.trim()
                .parse::<T>()
                .map_err(|_| ConfigError::InvalidNumber { key, value: raw })
        })
        .transpose()
}
