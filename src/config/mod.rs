//! Application configuration
//!
//! Configuration is layered: TOML file values (a default file is created on
//! first run), then the environment variables the exporter has always
//! honored (`MODEM_URL`, `MODEM_USER`, `MODEM_PASS`, `EXPORT_PORT`), then
//! CLI flags applied by `main`.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::info;

pub mod defaults;
pub mod duration_serde;

use defaults::*;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub modem: ModemConfig,
    #[serde(default)]
    pub web: WebConfig,
    #[serde(default)]
    pub scrape: ScrapeConfig,
}

/// Connection parameters for the modem's embedded web interface
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModemConfig {
    #[serde(default = "default_modem_url")]
    pub url: String,
    #[serde(default = "default_modem_username")]
    pub username: String,
    #[serde(default = "default_modem_password")]
    pub password: String,
    /// Connection timeout for requests against the modem
    #[serde(default = "default_connect_timeout", with = "duration_serde::duration")]
    pub connect_timeout: Duration,
    /// Total request timeout; bounds how long one poll cycle can hang
    #[serde(default = "default_request_timeout", with = "duration_serde::duration")]
    pub request_timeout: Duration,
}

/// Listen address for the metrics endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Poll loop behavior
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrapeConfig {
    /// Delay between status page scrapes
    #[serde(default = "default_scrape_interval", with = "duration_serde::duration")]
    pub interval: Duration,
    /// Login attempts per expired session before abandoning the cycle
    #[serde(default = "default_reauth_attempts")]
    pub reauth_attempts: u32,
}

fn default_modem_url() -> String {
    DEFAULT_MODEM_URL.to_string()
}

fn default_modem_username() -> String {
    DEFAULT_MODEM_USERNAME.to_string()
}

fn default_modem_password() -> String {
    DEFAULT_MODEM_PASSWORD.to_string()
}

fn default_host() -> String {
    DEFAULT_HOST.to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_scrape_interval() -> Duration {
    Duration::from_secs(DEFAULT_SCRAPE_INTERVAL_SECS)
}

fn default_reauth_attempts() -> u32 {
    DEFAULT_REAUTH_ATTEMPTS
}

fn default_connect_timeout() -> Duration {
    Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS)
}

fn default_request_timeout() -> Duration {
    Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS)
}

impl Default for ModemConfig {
    fn default() -> Self {
        Self {
            url: default_modem_url(),
            username: default_modem_username(),
            password: default_modem_password(),
            connect_timeout: default_connect_timeout(),
            request_timeout: default_request_timeout(),
        }
    }
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            interval: default_scrape_interval(),
            reauth_attempts: default_reauth_attempts(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            modem: ModemConfig::default(),
            web: WebConfig::default(),
            scrape: ScrapeConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file, creating a default file when
    /// none exists yet
    pub fn load_from_file(config_file: &str) -> Result<Self> {
        let mut config: Self = if std::path::Path::new(&config_file).exists() {
            let contents = std::fs::read_to_string(config_file)?;
            toml::from_str(&contents)?
        } else {
            let default_config = Self::default();
            let contents = toml::to_string_pretty(&default_config)?;
            std::fs::write(config_file, contents)?;
            info!("Created default config file: {}", config_file);
            default_config
        };
        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply the environment variable overrides the exporter has always used
    fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var("MODEM_URL") {
            self.modem.url = url;
        }
        if let Ok(user) = std::env::var("MODEM_USER") {
            self.modem.username = user;
        }
        if let Ok(pass) = std::env::var("MODEM_PASS") {
            self.modem.password = pass;
        }
        if let Ok(port) = std::env::var("EXPORT_PORT") {
            match port.parse() {
                Ok(port) => self.web.port = port,
                Err(_) => tracing::warn!("Ignoring non-numeric EXPORT_PORT value: {port}"),
            }
        }
    }
}
