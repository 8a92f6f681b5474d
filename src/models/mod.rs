//! Core data models for the DOCSIS exporter
//!
//! These are the typed shapes produced by the status page decoder and
//! consumed by the metric publisher. Records are built fresh each scrape
//! cycle and carry no history.

use serde::{Deserialize, Serialize};

/// The four channel table variants reported by the modem
///
/// Each variant knows its metric label strings and the structural marker
/// (HTML table id) that locates its table on the status page.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ChannelVariant {
    DownstreamBonded,
    UpstreamBonded,
    DownstreamOfdm,
    UpstreamOfdma,
}

impl ChannelVariant {
    /// All variants, in status page order
    pub const ALL: [ChannelVariant; 4] = [
        ChannelVariant::DownstreamBonded,
        ChannelVariant::UpstreamBonded,
        ChannelVariant::DownstreamOfdm,
        ChannelVariant::UpstreamOfdma,
    ];

    /// Value of the `direction` metric label
    pub fn direction(&self) -> &'static str {
        match self {
            ChannelVariant::DownstreamBonded | ChannelVariant::DownstreamOfdm => "downstream",
            ChannelVariant::UpstreamBonded | ChannelVariant::UpstreamOfdma => "upstream",
        }
    }

    /// Value of the `channel_type` metric label
    pub fn channel_type(&self) -> &'static str {
        match self {
            ChannelVariant::DownstreamBonded | ChannelVariant::UpstreamBonded => "bonded",
            ChannelVariant::DownstreamOfdm => "ofdm",
            ChannelVariant::UpstreamOfdma => "ofdma",
        }
    }

    /// HTML table id of this variant's table on the status page
    pub fn table_id(&self) -> &'static str {
        match self {
            ChannelVariant::DownstreamBonded => "dsTable",
            ChannelVariant::UpstreamBonded => "usTable",
            ChannelVariant::DownstreamOfdm => "d31dsTable",
            ChannelVariant::UpstreamOfdma => "d31usTable",
        }
    }

    /// Whether this variant's table reports SNR/MER and codeword counters
    pub fn has_signal_quality(&self) -> bool {
        matches!(
            self,
            ChannelVariant::DownstreamBonded | ChannelVariant::DownstreamOfdm
        )
    }
}

/// One frequency channel's state at scrape time
///
/// Decoded from a single status page table row; immutable once built and
/// discarded after being folded into the metric registry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChannelRecord {
    pub variant: ChannelVariant,
    /// Modem-assigned channel identifier; not guaranteed numeric across
    /// firmware versions, so kept as a string label
    pub channel_id: String,
    pub locked: bool,
    /// Modulation for bonded channels, OFDM/OFDMA profile id otherwise
    pub modulation: String,
    pub frequency_hz: f64,
    pub power_dbmv: f64,
    /// Present for downstream bonded and OFDM channels only
    pub signal: Option<SignalQuality>,
}

/// Downstream signal quality measurements
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SignalQuality {
    pub snr_mer_db: f64,
    pub unerrored_codewords: u64,
    pub correctable_codewords: u64,
    pub uncorrectable_codewords: u64,
}

/// Anti-forgery token from the login page's hidden form field
///
/// Fetched immediately before each login attempt and consumed once. An empty
/// token is representable: the modem will simply reject the login, which is
/// surfaced by post-login verification rather than here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginToken(String);

impl LoginToken {
    pub fn new<S: Into<String>>(token: S) -> Self {
        Self(token.into())
    }

    /// Empty token for login pages without a `webToken` field
    pub fn empty() -> Self {
        Self(String::new())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variant_labels() {
        assert_eq!(ChannelVariant::DownstreamBonded.direction(), "downstream");
        assert_eq!(ChannelVariant::DownstreamBonded.channel_type(), "bonded");
        assert_eq!(ChannelVariant::UpstreamBonded.direction(), "upstream");
        assert_eq!(ChannelVariant::UpstreamBonded.channel_type(), "bonded");
        assert_eq!(ChannelVariant::DownstreamOfdm.channel_type(), "ofdm");
        assert_eq!(ChannelVariant::UpstreamOfdma.channel_type(), "ofdma");
    }

    #[test]
    fn test_variant_table_ids() {
        assert_eq!(ChannelVariant::DownstreamBonded.table_id(), "dsTable");
        assert_eq!(ChannelVariant::UpstreamBonded.table_id(), "usTable");
        assert_eq!(ChannelVariant::DownstreamOfdm.table_id(), "d31dsTable");
        assert_eq!(ChannelVariant::UpstreamOfdma.table_id(), "d31usTable");
    }

    #[test]
    fn test_signal_quality_presence() {
        assert!(ChannelVariant::DownstreamBonded.has_signal_quality());
        assert!(ChannelVariant::DownstreamOfdm.has_signal_quality());
        assert!(!ChannelVariant::UpstreamBonded.has_signal_quality());
        assert!(!ChannelVariant::UpstreamOfdma.has_signal_quality());
    }
}
