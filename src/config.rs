//! Runtime configuration, loaded from the environment.
//!
//! Follows the teacher repo's style of reading configuration directly with
//! `std::env` rather than a config-file framework (see the original
//! `account::db::Database::connect(database_url)` call site, which expects
//! its caller to have already pulled `DATABASE_URL` out of the environment).

use std::env;
use std::str::FromStr;
use std::time::Duration;

/// How the log file rolls over (`LOG_ROTATION`). Parsed once at startup so
/// `logging::init_logging` matches on a closed enum instead of re-parsing a
/// string on every call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogRotation {
    Never,
    Daily,
    Hourly,
}

impl FromStr for LogRotation {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "hourly" => Ok(LogRotation::Hourly),
            "daily" => Ok(LogRotation::Daily),
            "never" => Ok(LogRotation::Never),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub server_port: u16,
    pub log_level: String,
    pub log_dir: String,
    pub log_file: String,
    pub log_rotation: LogRotation,
    pub use_json_logs: bool,
    pub catalog_cache_ttl: Duration,
    pub balance_cache_ttl: Duration,
    /// Classifier item code for the holding section reservations move items into.
    pub reserved_section_code: String,
}

impl AppConfig {
    /// Load configuration from environment variables.
    ///
    /// `DATABASE_URL` is mandatory; everything else has a sane default, the
    /// same split the teacher applies between `database_url` (always passed
    /// in explicitly) and the log/TTL knobs (defaulted unless overridden).
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = env::var("DATABASE_URL")
            .map_err(|_| anyhow::anyhow!("DATABASE_URL must be set"))?;

        Ok(Self {
            database_url,
            server_port: env_parse("SERVER_PORT", 8080),
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            log_dir: env::var("LOG_DIR").unwrap_or_else(|_| "logs".to_string()),
            log_file: env::var("LOG_FILE").unwrap_or_else(|_| "inventory-ledger.log".to_string()),
            log_rotation: env_parse("LOG_ROTATION", LogRotation::Daily),
            use_json_logs: env_parse("LOG_JSON", false),
            catalog_cache_ttl: Duration::from_secs(env_parse("CATALOG_CACHE_TTL_SECS", 86_400)),
            balance_cache_ttl: Duration::from_secs(env_parse("BALANCE_CACHE_TTL_SECS", 3_600)),
            reserved_section_code: env::var("RESERVED_SECTION_CODE")
                .unwrap_or_else(|_| "reserved".to_string()),
        })
    }
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_parse_falls_back_to_default() {
        assert_eq!(env_parse::<u16>("INVENTORY_LEDGER_UNSET_VAR", 42), 42);
    }
}
