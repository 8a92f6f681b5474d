//! Channel table row decoder
//!
//! Pure cell-extraction and typed-value coercion over the rows of the four
//! status page tables. The modem embeds units in cell text ("615000000 Hz",
//! "5.1 dBmV") and different firmware revisions spell lock states
//! differently, so the primitives strip unit suffixes defensively and map
//! lock states through a configurable vocabulary instead of a hardcoded
//! check.
//!
//! Rows are decoded independently: the caller is expected to log and skip a
//! failed row rather than abandon the rest of the table.

use std::collections::HashMap;

use crate::errors::{DecodeError, DecodeResult};
use crate::models::{ChannelRecord, ChannelVariant, SignalQuality};

pub mod status_page;

pub use status_page::StatusPage;

/// Cell-text to lock-state mapping
///
/// Firmware revisions disagree on the unlocked spelling ("Unlocked" vs
/// "Not Locked"); new vocabularies can be registered without touching decode
/// logic. Any literal missing from the vocabulary is a hard decode failure,
/// never a silent `false`.
#[derive(Debug, Clone)]
pub struct LockVocabulary {
    entries: HashMap<String, bool>,
}

impl Default for LockVocabulary {
    fn default() -> Self {
        let mut entries = HashMap::new();
        entries.insert("Locked".to_string(), true);
        entries.insert("Unlocked".to_string(), false);
        entries.insert("Not Locked".to_string(), false);
        Self { entries }
    }
}

impl LockVocabulary {
    /// Register an additional spelling
    pub fn with_entry<S: Into<String>>(mut self, literal: S, locked: bool) -> Self {
        self.entries.insert(literal.into(), locked);
        self
    }

    /// Look up a cell text, `None` when the literal is unknown
    pub fn lookup(&self, literal: &str) -> Option<bool> {
        self.entries.get(literal).copied()
    }
}

/// Column indices for one table variant
///
/// Index 0 is the row-number column on every table and is never read.
#[derive(Debug, Clone, Copy)]
pub struct ColumnLayout {
    pub lock: usize,
    pub modulation: usize,
    pub channel_id: usize,
    pub frequency: usize,
    pub power: usize,
    /// SNR/MER and codeword columns, downstream tables only
    pub signal: Option<SignalColumns>,
}

/// Signal quality column indices
///
/// The OFDM table interposes an active-subcarrier-range column between
/// SNR/MER and the codeword counters, which shifts the codeword indices.
#[derive(Debug, Clone, Copy)]
pub struct SignalColumns {
    pub snr_mer: usize,
    pub unerrored: usize,
    pub correctable: usize,
    pub uncorrectable: usize,
}

impl ColumnLayout {
    /// Layout for a table variant, as served by current Netgear firmware
    pub fn for_variant(variant: ChannelVariant) -> Self {
        match variant {
            ChannelVariant::DownstreamBonded => Self {
                lock: 1,
                modulation: 2,
                channel_id: 3,
                frequency: 4,
                power: 5,
                signal: Some(SignalColumns {
                    snr_mer: 6,
                    unerrored: 7,
                    correctable: 8,
                    uncorrectable: 9,
                }),
            },
            ChannelVariant::UpstreamBonded => Self {
                lock: 1,
                modulation: 2,
                channel_id: 3,
                frequency: 4,
                power: 5,
                signal: None,
            },
            ChannelVariant::DownstreamOfdm => Self {
                lock: 1,
                modulation: 2,
                channel_id: 3,
                frequency: 4,
                power: 5,
                signal: Some(SignalColumns {
                    snr_mer: 6,
                    // column 7 is the active subcarrier range, not exported
                    unerrored: 8,
                    correctable: 9,
                    uncorrectable: 10,
                }),
            },
            ChannelVariant::UpstreamOfdma => Self {
                lock: 1,
                modulation: 2,
                channel_id: 3,
                frequency: 4,
                power: 5,
                signal: None,
            },
        }
    }
}

/// Decoder for channel table rows
///
/// Stateless apart from the lock vocabulary; safe to share across tables.
#[derive(Debug, Clone, Default)]
pub struct RowDecoder {
    vocabulary: LockVocabulary,
}

impl RowDecoder {
    pub fn new(vocabulary: LockVocabulary) -> Self {
        Self { vocabulary }
    }

    /// Trimmed text of one cell
    pub fn extract_text<'a>(&self, row: &'a [String], column: usize) -> DecodeResult<&'a str> {
        row.get(column)
            .map(|cell| cell.trim())
            .ok_or(DecodeError::MissingColumn { column })
    }

    /// Parse a cell as a non-negative integer
    pub fn extract_integer(&self, row: &[String], column: usize) -> DecodeResult<u64> {
        let text = self.extract_text(row, column)?;
        text.parse().map_err(|_| DecodeError::NotNumeric {
            column,
            value: text.to_string(),
        })
    }

    /// Parse a cell as a number after stripping a unit suffix
    ///
    /// Removes every occurrence of `unit` and all remaining whitespace, so
    /// "615000000 Hz", "615000000Hz" and "615 000 000 Hz" all decode to the
    /// same value.
    pub fn extract_measurement(
        &self,
        row: &[String],
        column: usize,
        unit: &str,
    ) -> DecodeResult<f64> {
        let text = self.extract_text(row, column)?;
        let stripped: String = text
            .replace(unit, "")
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect();
        stripped.parse().map_err(|_| DecodeError::NotNumeric {
            column,
            value: text.to_string(),
        })
    }

    /// Map a cell through the lock-state vocabulary
    pub fn extract_lock_state(&self, row: &[String], column: usize) -> DecodeResult<bool> {
        let text = self.extract_text(row, column)?;
        self.vocabulary
            .lookup(text)
            .ok_or_else(|| DecodeError::UnknownLockState {
                value: text.to_string(),
            })
    }

    /// Decode one data row into a channel record
    pub fn decode_row(&self, row: &[String], variant: ChannelVariant) -> DecodeResult<ChannelRecord> {
        let layout = ColumnLayout::for_variant(variant);

        let locked = self.extract_lock_state(row, layout.lock)?;
        let modulation = self.extract_text(row, layout.modulation)?.to_string();
        let channel_id = self.extract_text(row, layout.channel_id)?.to_string();
        let frequency_hz = self.extract_measurement(row, layout.frequency, "Hz")?;
        let power_dbmv = self.extract_measurement(row, layout.power, "dBmV")?;

        let signal = match layout.signal {
            Some(columns) => Some(SignalQuality {
                snr_mer_db: self.extract_measurement(row, columns.snr_mer, "dB")?,
                unerrored_codewords: self.extract_integer(row, columns.unerrored)?,
                correctable_codewords: self.extract_integer(row, columns.correctable)?,
                uncorrectable_codewords: self.extract_integer(row, columns.uncorrectable)?,
            }),
            None => None,
        };

        Ok(ChannelRecord {
            variant,
            channel_id,
            locked,
            modulation,
            frequency_hz,
            power_dbmv,
            signal,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|c| c.to_string()).collect()
    }

    #[rstest]
    #[case("615000000 Hz", "Hz", 615_000_000.0)]
    #[case("615000000Hz", "Hz", 615_000_000.0)]
    #[case("615 000 000 Hz", "Hz", 615_000_000.0)]
    #[case("5.1 dBmV", "dBmV", 5.1)]
    #[case("-3.4 dBmV", "dBmV", -3.4)]
    #[case("40.1 dB", "dB", 40.1)]
    #[case("40.1", "dB", 40.1)]
    fn test_extract_measurement(#[case] cell: &str, #[case] unit: &str, #[case] expected: f64) {
        let decoder = RowDecoder::default();
        let value = decoder.extract_measurement(&row(&[cell]), 0, unit).unwrap();
        assert_eq!(value, expected);
    }

    #[rstest]
    #[case("n/a", "Hz")]
    #[case("", "Hz")]
    #[case("----", "dBmV")]
    fn test_extract_measurement_rejects_non_numeric(#[case] cell: &str, #[case] unit: &str) {
        let decoder = RowDecoder::default();
        let err = decoder
            .extract_measurement(&row(&[cell]), 0, unit)
            .unwrap_err();
        assert!(matches!(err, DecodeError::NotNumeric { column: 0, .. }));
    }

    #[test]
    fn test_extract_integer() {
        let decoder = RowDecoder::default();
        let cells = row(&["1000", " 2 ", "x"]);
        assert_eq!(decoder.extract_integer(&cells, 0).unwrap(), 1000);
        assert_eq!(decoder.extract_integer(&cells, 1).unwrap(), 2);
        assert!(matches!(
            decoder.extract_integer(&cells, 2),
            Err(DecodeError::NotNumeric { column: 2, .. })
        ));
        assert!(matches!(
            decoder.extract_integer(&cells, 3),
            Err(DecodeError::MissingColumn { column: 3 })
        ));
    }

    #[rstest]
    #[case("Locked", true)]
    #[case("Unlocked", false)]
    #[case("Not Locked", false)]
    fn test_default_lock_vocabulary(#[case] cell: &str, #[case] expected: bool) {
        let decoder = RowDecoder::default();
        assert_eq!(
            decoder.extract_lock_state(&row(&[cell]), 0).unwrap(),
            expected
        );
    }

    #[test]
    fn test_unknown_lock_state_is_hard_failure() {
        let decoder = RowDecoder::default();
        let err = decoder
            .extract_lock_state(&row(&["Operational"]), 0)
            .unwrap_err();
        assert_eq!(
            err,
            DecodeError::UnknownLockState {
                value: "Operational".to_string()
            }
        );
    }

    #[test]
    fn test_extended_lock_vocabulary() {
        let vocabulary = LockVocabulary::default().with_entry("Operational", true);
        let decoder = RowDecoder::new(vocabulary);
        assert!(decoder.extract_lock_state(&row(&["Operational"]), 0).unwrap());
        // stock entries still apply
        assert!(!decoder.extract_lock_state(&row(&["Unlocked"]), 0).unwrap());
    }

    #[test]
    fn test_decode_downstream_bonded_row() {
        let decoder = RowDecoder::default();
        let cells = row(&[
            "1", "Locked", "QAM256", "5", "615000000 Hz", "5.1 dBmV", "40.1 dB", "1000", "2", "0",
        ]);
        let record = decoder
            .decode_row(&cells, ChannelVariant::DownstreamBonded)
            .unwrap();
        assert_eq!(record.channel_id, "5");
        assert!(record.locked);
        assert_eq!(record.modulation, "QAM256");
        assert_eq!(record.frequency_hz, 615_000_000.0);
        assert_eq!(record.power_dbmv, 5.1);
        let signal = record.signal.unwrap();
        assert_eq!(signal.snr_mer_db, 40.1);
        assert_eq!(signal.unerrored_codewords, 1000);
        assert_eq!(signal.correctable_codewords, 2);
        assert_eq!(signal.uncorrectable_codewords, 0);
    }

    #[test]
    fn test_decode_upstream_bonded_row() {
        let decoder = RowDecoder::default();
        let cells = row(&["1", "Locked", "ATDMA", "3", "30000000 Hz", "44.8 dBmV"]);
        let record = decoder
            .decode_row(&cells, ChannelVariant::UpstreamBonded)
            .unwrap();
        assert_eq!(record.channel_id, "3");
        assert_eq!(record.frequency_hz, 30_000_000.0);
        assert_eq!(record.power_dbmv, 44.8);
        assert!(record.signal.is_none());
    }

    #[test]
    fn test_decode_ofdm_row_skips_subcarrier_range() {
        let decoder = RowDecoder::default();
        // column 7 holds the active subcarrier range; it is not numeric and
        // must not be read as a codeword counter
        let cells = row(&[
            "1",
            "Locked",
            "2",
            "193",
            "722000000 Hz",
            "3.9 dBmV",
            "41.3 dB",
            "1108 ~ 2987",
            "33983",
            "0",
            "0",
        ]);
        let record = decoder
            .decode_row(&cells, ChannelVariant::DownstreamOfdm)
            .unwrap();
        assert_eq!(record.channel_id, "193");
        assert_eq!(record.modulation, "2");
        let signal = record.signal.unwrap();
        assert_eq!(signal.unerrored_codewords, 33983);
        assert_eq!(signal.correctable_codewords, 0);
    }

    #[test]
    fn test_decode_ofdma_row() {
        let decoder = RowDecoder::default();
        let cells = row(&["1", "Unlocked", "0", "0", "0 Hz", "0 dBmV"]);
        let record = decoder
            .decode_row(&cells, ChannelVariant::UpstreamOfdma)
            .unwrap();
        assert!(!record.locked);
        assert!(record.signal.is_none());
    }

    #[test]
    fn test_decode_row_propagates_cell_failure() {
        let decoder = RowDecoder::default();
        let cells = row(&[
            "1", "Locked", "QAM256", "5", "bogus", "5.1 dBmV", "40.1 dB", "1000", "2", "0",
        ]);
        let err = decoder
            .decode_row(&cells, ChannelVariant::DownstreamBonded)
            .unwrap_err();
        assert!(matches!(err, DecodeError::NotNumeric { column: 4, .. }));
    }

    #[test]
    fn test_decode_short_row() {
        let decoder = RowDecoder::default();
        let cells = row(&["1", "Locked", "QAM256"]);
        let err = decoder
            .decode_row(&cells, ChannelVariant::DownstreamBonded)
            .unwrap_err();
        assert_eq!(err, DecodeError::MissingColumn { column: 3 });
    }
}
