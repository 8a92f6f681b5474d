//! Centralized error handling for the DOCSIS exporter
//!
//! This module provides the error types used across all application layers
//! and convenience aliases for the common Result shapes.
//!
//! # Error Categories
//!
//! - **Auth Errors**: login token fetch and form login against the modem
//! - **Scrape Errors**: status page retrieval and document parsing
//! - **Decode Errors**: per-cell failures while decoding channel table rows
//! - **Configuration Errors**: invalid startup configuration

pub mod types;

pub use types::*;

/// Convenience type alias for Results using AppError
pub type AppResult<T> = Result<T, AppError>;

/// Convenience type alias for decode Results
pub type DecodeResult<T> = Result<T, DecodeError>;
