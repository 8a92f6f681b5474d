//! Scrape orchestration
//!
//! Owns the poll loop: authenticate once at startup, then on a fixed
//! interval fetch the status page, decode every channel table and publish
//! the records. A failed cycle is counted and skipped; the loop never
//! terminates on its own. An expired session drops the orchestrator back to
//! the unauthenticated state, where login is retried a bounded number of
//! times before the cycle is abandoned.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::{MissedTickBehavior, interval};
use tracing::{debug, error, info, warn};

use crate::config::ScrapeConfig;
use crate::decoder::{RowDecoder, StatusPage};
use crate::errors::{AuthError, ScrapeError};
use crate::metrics::ModemMetrics;
use crate::models::ChannelVariant;
use crate::modem::ModemClient;

/// Orchestrator states
///
/// `Unauthenticated -> Authenticated` happens once at startup (fatal on
/// failure) and again after session expiry (bounded retries, never fatal).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PollerState {
    Unauthenticated,
    Authenticated,
    Scraping,
}

/// The scrape poll loop
pub struct ScrapeOrchestrator {
    client: ModemClient,
    decoder: RowDecoder,
    metrics: Arc<ModemMetrics>,
    poll_interval: Duration,
    reauth_attempts: u32,
    state: PollerState,
}

impl ScrapeOrchestrator {
    pub fn new(
        client: ModemClient,
        decoder: RowDecoder,
        metrics: Arc<ModemMetrics>,
        config: &ScrapeConfig,
    ) -> Self {
        Self {
            client,
            decoder,
            metrics,
            poll_interval: config.interval,
            reauth_attempts: config.reauth_attempts,
            state: PollerState::Unauthenticated,
        }
    }

    /// Startup login; a failure here is fatal to process startup
    pub async fn authenticate(&mut self) -> Result<(), AuthError> {
        self.client.login().await?;
        self.state = PollerState::Authenticated;
        info!("Authenticated against modem");
        Ok(())
    }

    /// Run the poll loop forever
    ///
    /// Must be called after a successful [`authenticate`](Self::authenticate).
    pub async fn run(mut self) {
        let mut ticker = interval(self.poll_interval);
        // A slow modem must not cause a burst of catch-up scrapes.
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        self.state = PollerState::Scraping;
        info!(
            "Starting scrape loop with {} interval",
            humantime::format_duration(self.poll_interval)
        );

        loop {
            ticker.tick().await;

            // An expired session from a previous cycle is repaired before
            // scraping again; a cycle without a session is a failed cycle.
            if self.state != PollerState::Scraping && !self.reauthenticate().await {
                self.metrics.record_scrape_outcome(false);
                continue;
            }

            match self.run_cycle().await {
                Ok(published) => {
                    debug!("Scrape cycle published {published} channel records");
                    self.metrics.record_scrape_outcome(true);
                }
                Err(ScrapeError::SessionExpired) => {
                    warn!("Modem session expired, re-authenticating next cycle");
                    self.state = PollerState::Unauthenticated;
                    self.metrics.record_scrape_outcome(false);
                }
                Err(e) => {
                    error!("Scrape cycle failed: {e}");
                    self.metrics.record_scrape_outcome(false);
                }
            }
        }
    }

    /// One scrape cycle: fetch, decode, publish
    async fn run_cycle(&self) -> Result<usize, ScrapeError> {
        let page = self.client.fetch_status_page().await?;
        Ok(publish_status_page(&page, &self.decoder, &self.metrics))
    }

    /// Bounded login retry after session expiry
    ///
    /// Returns `true` once a login succeeds. Exhausting the attempts abandons
    /// this cycle only; the loop keeps polling and will land here again on
    /// the next expired response.
    pub async fn reauthenticate(&mut self) -> bool {
        for attempt in 1..=self.reauth_attempts {
            match self.client.login().await {
                Ok(()) => {
                    info!("Re-authenticated after session expiry (attempt {attempt})");
                    self.state = PollerState::Scraping;
                    return true;
                }
                Err(e) => {
                    warn!(
                        "Re-authentication attempt {attempt}/{} failed: {e}",
                        self.reauth_attempts
                    );
                }
            }
        }
        error!(
            "Re-authentication failed after {} attempts, will retry next cycle",
            self.reauth_attempts
        );
        false
    }
}

/// Decode every table of a status page and publish the good rows
///
/// A row that fails to decode is logged and skipped so that one bad channel
/// does not blank out the rest of its table. Returns the number of records
/// published.
pub fn publish_status_page(
    page: &StatusPage,
    decoder: &RowDecoder,
    metrics: &ModemMetrics,
) -> usize {
    let mut published = 0;

    for variant in ChannelVariant::ALL {
        for (index, row) in page.rows(variant).iter().enumerate() {
            match decoder.decode_row(row, variant) {
                Ok(record) => {
                    metrics.publish(&record);
                    published += 1;
                }
                Err(e) => {
                    warn!(
                        "Skipping row {index} of {} {} table: {e}",
                        variant.direction(),
                        variant.channel_type(),
                    );
                }
            }
        }
    }

    published
}
