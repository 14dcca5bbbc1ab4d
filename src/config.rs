use std::time::Duration;

use crate::error::ConfigError;

pub const DATA_FILE: &str = "/data/dane_sipsa_data.json";
pub const PAGES_BASE_PATH: &str = "/Colombia-Map---Precios-Mayoristas";

const DEFAULT_BASE_URL: &str = "http://localhost:5173";
const DEFAULT_CACHE_TTL_SECS: u64 = 15 * 60;
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;
const DEFAULT_MAX_RETRY_ATTEMPTS: u32 = 3;
const DEFAULT_RETRY_DELAY_MS: u64 = 1000;

/// Where the static data file is being served from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Deployment {
    Development,
    Production,
    /// Production hosted under a project subpath.
    Pages,
}

impl Deployment {
    pub fn base_path(&self) -> &'static str {
        match self {
            Deployment::Development | Deployment::Production => "",
            Deployment::Pages => PAGES_BASE_PATH,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub base_url: String,
    pub base_path: String,
    /// Path of the data file under the base path.
    pub data_file: String,
    pub deployment: Deployment,
    pub cache_ttl: Duration,
    pub request_timeout: Duration,
    pub max_retry_attempts: u32,
    pub retry_delay: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            base_path: String::new(),
            data_file: DATA_FILE.to_string(),
            deployment: Deployment::Development,
            cache_ttl: Duration::from_secs(DEFAULT_CACHE_TTL_SECS),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            max_retry_attempts: DEFAULT_MAX_RETRY_ATTEMPTS,
            retry_delay: Duration::from_millis(DEFAULT_RETRY_DELAY_MS),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build a config from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Config::default();

        if let Some(url) = lookup("SIPSA_BASE_URL") {
            config.base_url = url.trim_end_matches('/').to_string();
        }

        if let Some(value) = lookup("SIPSA_DEPLOYMENT") {
            config.deployment = match value.to_lowercase().as_str() {
                "development" | "dev" => Deployment::Development,
                "production" | "prod" => Deployment::Production,
                "pages" => Deployment::Pages,
                _ => {
                    return Err(ConfigError::Invalid {
                        name: "SIPSA_DEPLOYMENT",
                        value,
                        reason: "expected development, production or pages".to_string(),
                    })
                }
            };
        }
        config.base_path = match lookup("SIPSA_BASE_PATH") {
            Some(path) => path.trim_end_matches('/').to_string(),
            None => config.deployment.base_path().to_string(),
        };

        if let Some(secs) = parse_u64(&lookup, "SIPSA_CACHE_TTL_SECS")? {
            config.cache_ttl = Duration::from_secs(secs);
        }
        if let Some(secs) = parse_u64(&lookup, "SIPSA_REQUEST_TIMEOUT_SECS")? {
            config.request_timeout = Duration::from_secs(secs);
        }
        if let Some(attempts) = parse_u64(&lookup, "SIPSA_MAX_RETRY_ATTEMPTS")? {
            if attempts == 0 || attempts > u32::MAX as u64 {
                return Err(ConfigError::Invalid {
                    name: "SIPSA_MAX_RETRY_ATTEMPTS",
                    value: attempts.to_string(),
                    reason: "must be at least 1".to_string(),
                });
            }
            config.max_retry_attempts = attempts as u32;
        }
        if let Some(ms) = parse_u64(&lookup, "SIPSA_RETRY_DELAY_MS")? {
            config.retry_delay = Duration::from_millis(ms);
        }

        Ok(config)
    }

    pub fn data_url(&self) -> String {
        format!("{}{}{}", self.base_url, self.base_path, self.data_file)
    }
}

fn parse_u64<F>(lookup: &F, name: &'static str) -> Result<Option<u64>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse::<u64>()
            .map(Some)
            .map_err(|e| ConfigError::Invalid {
                name,
                value,
                reason: e.to_string(),
            }),
    }
}
