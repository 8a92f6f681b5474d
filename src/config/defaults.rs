/// Configuration default values
///
/// This module contains all the default values for configuration options,
/// making them easily changeable in one central location.
// Modem defaults
pub const DEFAULT_MODEM_URL: &str = "http://192.168.100.1";
pub const DEFAULT_MODEM_USERNAME: &str = "admin";
pub const DEFAULT_MODEM_PASSWORD: &str = "password";

// Web server defaults
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 9527;

// Scrape defaults
pub const DEFAULT_SCRAPE_INTERVAL_SECS: u64 = 5;
pub const DEFAULT_REAUTH_ATTEMPTS: u32 = 3;

// HTTP client defaults
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
