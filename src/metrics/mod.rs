//! Prometheus metrics for the DOCSIS exporter
//!
//! All metrics live in an explicit [`prometheus::Registry`] owned by
//! [`ModemMetrics`], constructed once at startup and shared between the poll
//! loop (writes) and the `/metrics` handler (reads). Channel gauges follow
//! last-value-wins semantics: a channel that disappears from a later scrape
//! keeps reporting its last known value until overwritten.

use prometheus::{GaugeVec, IntCounter, Opts, Registry, TextEncoder};

use crate::models::ChannelRecord;

/// Label names shared by every channel gauge
const CHANNEL_LABELS: [&str; 3] = ["channel", "channel_type", "direction"];

/// Registry plus the exporter's counters and per-channel gauges
#[derive(Clone)]
pub struct ModemMetrics {
    registry: Registry,
    successful_scrapes: IntCounter,
    unsuccessful_scrapes: IntCounter,
    frequency: GaugeVec,
    power: GaugeVec,
    snr_mer: GaugeVec,
    unerrored_codewords: GaugeVec,
    correctable_codewords: GaugeVec,
    uncorrectable_codewords: GaugeVec,
    lock_status: GaugeVec,
}

impl ModemMetrics {
    /// Create the registry and register every metric family
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let successful_scrapes = IntCounter::new(
            "successful_modem_scrapes",
            "The total number of successful modem scrapes",
        )?;
        let unsuccessful_scrapes = IntCounter::new(
            "unsuccessful_modem_scrapes",
            "The total number of unsuccessful modem scrapes",
        )?;

        let channel_gauge = |name: &str, help: &str| -> Result<GaugeVec, prometheus::Error> {
            GaugeVec::new(Opts::new(name, help), &CHANNEL_LABELS)
        };

        let frequency = channel_gauge("channel_frequency_hz", "Channel frequency")?;
        let power = channel_gauge("channel_power_dbmv", "Channel power")?;
        let snr_mer = channel_gauge("channel_snr_mer", "Channel SNR/MER")?;
        let unerrored_codewords = channel_gauge(
            "channel_unerrored_codewords",
            "The number of unerrored codewords",
        )?;
        let correctable_codewords = channel_gauge(
            "channel_correctable_codewords",
            "The number of correctable codewords",
        )?;
        let uncorrectable_codewords = channel_gauge(
            "channel_uncorrectable_codewords",
            "The number of uncorrectable codewords",
        )?;
        let lock_status = channel_gauge("channel_lock_status", "The lock status of the channel")?;

        registry.register(Box::new(successful_scrapes.clone()))?;
        registry.register(Box::new(unsuccessful_scrapes.clone()))?;
        registry.register(Box::new(frequency.clone()))?;
        registry.register(Box::new(power.clone()))?;
        registry.register(Box::new(snr_mer.clone()))?;
        registry.register(Box::new(unerrored_codewords.clone()))?;
        registry.register(Box::new(correctable_codewords.clone()))?;
        registry.register(Box::new(uncorrectable_codewords.clone()))?;
        registry.register(Box::new(lock_status.clone()))?;

        Ok(Self {
            registry,
            successful_scrapes,
            unsuccessful_scrapes,
            frequency,
            power,
            snr_mer,
            unerrored_codewords,
            correctable_codewords,
            uncorrectable_codewords,
            lock_status,
        })
    }

    /// The underlying registry, for the exposition endpoint
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Publish one channel record, overwriting the gauges for its label set
    ///
    /// Idempotent: publishing the same record twice leaves the registry
    /// unchanged after the first call.
    pub fn publish(&self, record: &ChannelRecord) {
        let labels = [
            record.channel_id.as_str(),
            record.variant.channel_type(),
            record.variant.direction(),
        ];

        self.lock_status
            .with_label_values(&labels)
            .set(if record.locked { 1.0 } else { 0.0 });
        self.frequency
            .with_label_values(&labels)
            .set(record.frequency_hz);
        self.power.with_label_values(&labels).set(record.power_dbmv);

        if let Some(signal) = &record.signal {
            self.snr_mer
                .with_label_values(&labels)
                .set(signal.snr_mer_db);
            self.unerrored_codewords
                .with_label_values(&labels)
                .set(signal.unerrored_codewords as f64);
            self.correctable_codewords
                .with_label_values(&labels)
                .set(signal.correctable_codewords as f64);
            self.uncorrectable_codewords
                .with_label_values(&labels)
                .set(signal.uncorrectable_codewords as f64);
        }
    }

    /// Count the outcome of one scrape cycle
    pub fn record_scrape_outcome(&self, success: bool) {
        if success {
            self.successful_scrapes.inc();
        } else {
            self.unsuccessful_scrapes.inc();
        }
    }

    /// Encode the registry in the Prometheus text exposition format
    pub fn encode(&self) -> Result<String, prometheus::Error> {
        let encoder = TextEncoder::new();
        encoder.encode_to_string(&self.registry.gather())
    }

    #[cfg(test)]
    pub fn successful_scrape_count(&self) -> u64 {
        self.successful_scrapes.get()
    }

    #[cfg(test)]
    pub fn unsuccessful_scrape_count(&self) -> u64 {
        self.unsuccessful_scrapes.get()
    }
}

/// Assertion helpers for the crate's own tests, not part of the exporter API
#[doc(hidden)]
pub mod test_support {
    use super::ModemMetrics;

    /// Look up one gauge value by family name and label set
    pub fn gauge_value(
        metrics: &ModemMetrics,
        family: &str,
        channel: &str,
        channel_type: &str,
        direction: &str,
    ) -> Option<f64> {
        metrics
            .registry()
            .gather()
            .into_iter()
            .find(|f| f.get_name() == family)?
            .get_metric()
            .iter()
            .find(|m| {
                let labels = m.get_label();
                labels
                    .iter()
                    .any(|l| l.get_name() == "channel" && l.get_value() == channel)
                    && labels
                        .iter()
                        .any(|l| l.get_name() == "channel_type" && l.get_value() == channel_type)
                    && labels
                        .iter()
                        .any(|l| l.get_name() == "direction" && l.get_value() == direction)
            })
            .map(|m| m.get_gauge().get_value())
    }
}
