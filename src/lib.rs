pub mod config;
pub mod decoder;
pub mod errors;
pub mod metrics;
pub mod models;
pub mod modem;
pub mod poller;
pub mod web;
