//! Environment-derived runtime configuration.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

use crate::llm::gemini::{DEFAULT_BASE_URL, DEFAULT_MODEL};

/// Application-level constants
pub const APP_NAME: &str = "triara";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8420";
const DEFAULT_LLM_TIMEOUT_SECS: u64 = 30;
const DEFAULT_HISTORY_CAP: usize = 500;

/// Filter applied when `RUST_LOG` is unset.
pub fn default_log_filter() -> String {
    format!("{APP_NAME}=info")
}

/// Get the application data directory, `<platform data dir>/triara/`.
///
/// Falls back to the current directory when the platform gives us nothing,
/// which only happens in stripped-down containers.
pub fn app_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
}

/// Default database path under the application data directory.
pub fn default_db_path() -> PathBuf {
    app_data_dir().join("triara.db")
}

/// Settings for the Gemini `generateContent` client.
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    /// Keys tried in rotation order. Empty means the LLM stays disabled.
    pub api_keys: Vec<String>,
    pub model: String,
    pub base_url: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub db_path: PathBuf,
    pub gemini: GeminiConfig,
    /// How many recent assessments the monitor keeps in memory.
    pub history_cap: usize,
}

impl AppConfig {
    /// Read configuration from `TRIARA_*` environment variables, with
    /// defaults suitable for local use. Unparseable values fall back to
    /// the default rather than aborting startup.
    pub fn from_env() -> Self {
        let bind_addr = env::var("TRIARA_BIND_ADDR")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or_else(|| {
                DEFAULT_BIND_ADDR
                    .parse()
                    .unwrap_or(SocketAddr::from(([127, 0, 0, 1], 8420)))
            });

        let db_path = env::var("TRIARA_DB_PATH")
            .ok()
            .map(PathBuf::from)
            .unwrap_or_else(default_db_path);

        let api_keys = env::var("TRIARA_GEMINI_API_KEYS")
            .map(|v| parse_key_list(&v))
            .unwrap_or_default();

        let model =
            env::var("TRIARA_GEMINI_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());

        let timeout_secs = env::var("TRIARA_GEMINI_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_LLM_TIMEOUT_SECS);

        let history_cap = env::var("TRIARA_HISTORY_CAP")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_HISTORY_CAP);

        Self {
            bind_addr,
            db_path,
            gemini: GeminiConfig {
                api_keys,
                model,
                base_url: DEFAULT_BASE_URL.to_string(),
                timeout_secs,
            },
            history_cap,
        }
    }

    pub fn llm_enabled(&self) -> bool {
        !self.gemini.api_keys.is_empty()
    }
}

fn parse_key_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(str::to_string)
        .collect()
}
