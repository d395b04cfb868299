use std::{fs, path::PathBuf, time::Duration};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::{cli::GlobalOpts, services::storage};

pub const POLL_RANGE_MS: std::ops::RangeInclusive<u64> = 100..=60_000;

/// Client configuration resolved from CLI, environment, file and defaults.
#[derive(Clone)]
pub struct Config {
    /// Backend base URL without a trailing slash.
    pub api_url: String,
    pub token: Option<String>,
    pub poll_interval: Duration,
    pub logging_enabled: bool,
    /// Where watermarks are kept.
    pub data_dir: PathBuf,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("api_url", &self.api_url)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("poll_interval", &self.poll_interval)
            .field("logging_enabled", &self.logging_enabled)
            .field("data_dir", &self.data_dir)
            .finish()
    }
}

#[derive(Deserialize, Default)]
struct FileConfig {
    #[serde(default)]
    api: FileApi,
    #[serde(default)]
    sync: FileSync,
    #[serde(default)]
    logging: FileLogging,
    #[serde(default)]
    storage: FileStorage,
}

#[derive(Deserialize, Default)]
struct FileApi {
    url: Option<String>,
    token: Option<String>,
}

#[derive(Deserialize)]
struct FileSync {
    #[serde(default = "default_poll_ms")]
    poll_interval_ms: u64,
}

#[derive(Deserialize)]
struct FileLogging {
    #[serde(default = "default_logging")]
    enabled: bool,
}

#[derive(Deserialize, Default)]
struct FileStorage {
    data_dir: Option<PathBuf>,
}

fn default_api_url() -> String {
    "http://127.0.0.1:8080/api".to_string()
}

fn default_poll_ms() -> u64 {
    2500
}

fn default_logging() -> bool {
    true
}

impl Default for FileSync {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_ms(),
        }
    }
}

impl Default for FileLogging {
    fn default() -> Self {
        Self {
            enabled: default_logging(),
        }
    }
}

fn env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

impl Config {
    pub fn load(cli: &GlobalOpts) -> Result<Self> {
        let mut api_url = default_api_url();
        let mut token = None;
        let mut poll_ms = default_poll_ms();
        let mut logging = default_logging();
        let mut data_dir = None;

        // config file path precedence: CLI -> ENV -> default
        let config_path = cli
            .config
            .clone()
            .or_else(|| env("NOTEBOOK_CONFIG").map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from("config/notebook.toml"));

        if let Ok(bytes) = fs::read(&config_path) {
            let contents = String::from_utf8_lossy(&bytes);
            let file_cfg: FileConfig = toml::from_str(&contents)
                .with_context(|| format!("invalid config file {}", config_path.display()))?;
            if let Some(url) = file_cfg.api.url {
                api_url = url;
            }
            token = file_cfg.api.token;
            poll_ms = file_cfg.sync.poll_interval_ms;
            logging = file_cfg.logging.enabled;
            data_dir = file_cfg.storage.data_dir;
        }

        // environment overrides
        if let Some(url) = env("NOTEBOOK_API_URL") {
            api_url = url;
        }
        if let Some(t) = env("NOTEBOOK_TOKEN") {
            token = Some(t);
        }
        if let Some(ms) = env("NOTEBOOK_POLL_MS") {
            poll_ms = ms
                .parse()
                .with_context(|| format!("NOTEBOOK_POLL_MS is not a number: {ms}"))?;
        }
        if let Some(l) = env("NOTEBOOK_LOGGING") {
            logging = l
                .parse()
                .with_context(|| format!("NOTEBOOK_LOGGING is not true/false: {l}"))?;
        }
        if let Some(dir) = env("NOTEBOOK_DATA_DIR") {
            data_dir = Some(PathBuf::from(dir));
        }

        // CLI overrides
        if let Some(url) = &cli.api_url {
            api_url = url.clone();
        }
        if let Some(t) = &cli.token {
            token = Some(t.clone());
        }
        if let Some(ms) = cli.poll_interval_ms {
            poll_ms = ms;
        }
        if let Some(l) = cli.logging {
            logging = l;
        }

        let api_url = api_url.trim().trim_end_matches('/').to_string();
        if !(api_url.starts_with("http://") || api_url.starts_with("https://")) {
            anyhow::bail!("invalid api url {api_url}: expected http(s)");
        }
        if !POLL_RANGE_MS.contains(&poll_ms) {
            anyhow::bail!(
                "poll interval {poll_ms}ms outside {}..={}",
                POLL_RANGE_MS.start(),
                POLL_RANGE_MS.end()
            );
        }
        let data_dir = match data_dir {
            Some(dir) => dir,
            None => storage::default_data_dir()?,
        };

        Ok(Self {
            api_url,
            token: token.filter(|t| !t.trim().is_empty()),
            poll_interval: Duration::from_millis(poll_ms),
            logging_enabled: logging,
            data_dir,
        })
    }
}
