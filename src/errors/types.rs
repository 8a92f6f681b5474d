//! Error type definitions for the DOCSIS exporter
//!
//! This module defines all error types used throughout the application,
//! providing a layered error system that makes debugging and error
//! handling more straightforward.

use thiserror::Error;

/// Top-level application error type
///
/// This enum represents all possible errors that can occur in the application.
/// It uses `thiserror` to provide automatic error trait implementations and
/// proper error chaining.
#[derive(Error, Debug)]
pub enum AppError {
    /// Authentication errors against the modem login flow
    #[error("Authentication error: {0}")]
    Auth(#[from] AuthError),

    /// Status page scrape errors
    #[error("Scrape error: {0}")]
    Scrape(#[from] ScrapeError),

    /// Metric registration errors
    #[error("Metrics error: {0}")]
    Metrics(#[from] prometheus::Error),

    /// Configuration errors
    #[error("Configuration error: {message}")]
    Configuration { message: String },
}

/// Errors from the modem login flow
#[derive(Error, Debug)]
pub enum AuthError {
    /// Transport-level failures during token fetch or form post
    #[error("Network failure during login: {0}")]
    Network(#[from] reqwest::Error),

    /// The modem accepted the request but the session is not authenticated
    ///
    /// The modem answers a rejected login with HTTP 200, so rejection is
    /// detected by the absence of the authenticated status-page marker in
    /// the first post-login fetch.
    #[error("Login rejected by modem: {reason}")]
    Rejected { reason: String },
}

/// Errors from a single status page scrape cycle
#[derive(Error, Debug)]
pub enum ScrapeError {
    /// Transport-level failures fetching the status page
    #[error("Network failure fetching status page: {0}")]
    Network(#[from] reqwest::Error),

    /// The response body is not a usable status document
    #[error("Status page parse failure: {message}")]
    Parse { message: String },

    /// The response no longer carries the authenticated marker
    ///
    /// The modem serves a login redirect page once the session cookie
    /// expires; the poller reacts by re-authenticating.
    #[error("Modem session expired")]
    SessionExpired,
}

/// Errors decoding a single channel table cell or row
#[derive(Error, Debug, PartialEq, Eq)]
pub enum DecodeError {
    /// The row has fewer cells than the table layout requires
    #[error("Missing column {column} in table row")]
    MissingColumn { column: usize },

    /// Cell content did not parse as a number after unit stripping
    #[error("Column {column} is not numeric: {value:?}")]
    NotNumeric { column: usize, value: String },

    /// Cell content is not in the configured lock-state vocabulary
    #[error("Unknown lock state: {value:?}")]
    UnknownLockState { value: String },
}

/// Convenience methods for creating common error types
impl AppError {
    /// Create a configuration error
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }
}

impl AuthError {
    /// Create a rejected-login error
    pub fn rejected<S: Into<String>>(reason: S) -> Self {
        Self::Rejected {
            reason: reason.into(),
        }
    }
}

impl ScrapeError {
    /// Create a parse failure error
    pub fn parse<S: Into<String>>(message: S) -> Self {
        Self::Parse {
            message: message.into(),
        }
    }
}
