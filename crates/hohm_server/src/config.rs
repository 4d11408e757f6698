//! Environment-driven server configuration.

use std::env;
use std::path::PathBuf;

pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";
pub const DEFAULT_DB_PATH: &str = "hohm.sqlite3";
pub const DEFAULT_MAIL_FROM: &str = "Task Notifier <notifications@hohm.app>";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub bind_addr: String,
    pub db_path: PathBuf,
    pub log_level: String,
    pub log_dir: PathBuf,
    /// Resend API key; mail sends fail with `NotConfigured` when absent.
    pub resend_api_key: Option<String>,
    pub mail_from: String,
}

impl ServerConfig {
    /// Reads `HOHM_*` and `RESEND_API_KEY`, falling back to defaults.
    pub fn from_env() -> Self {
        Self {
            bind_addr: env_string("HOHM_BIND_ADDR", DEFAULT_BIND_ADDR),
            db_path: PathBuf::from(env_string("HOHM_DB_PATH", DEFAULT_DB_PATH)),
            log_level: env_string("HOHM_LOG_LEVEL", hohm_core::default_log_level()),
            log_dir: env_opt("HOHM_LOG_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(default_log_dir),
            resend_api_key: env_opt("RESEND_API_KEY"),
            mail_from: env_string("HOHM_MAIL_FROM", DEFAULT_MAIL_FROM),
        }
    }
}

fn env_opt(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn env_string(name: &str, default: &str) -> String {
    env_opt(name).unwrap_or_else(|| default.to_string())
}

fn default_log_dir() -> PathBuf {
    env::current_dir()
        .unwrap_or_else(|_| env::temp_dir())
        .join("logs")
}
