//! Status page document parsing
//!
//! Locates the four channel tables on `DocsisStatus.asp` by their id
//! markers, strips each table's header row and collects the remaining rows
//! as plain cell text for the row decoder. The document tree is dropped
//! before this module returns, so callers can hold a `StatusPage` across
//! await points.

use std::collections::HashMap;
use std::sync::LazyLock;

use scraper::{Html, Selector};

use crate::errors::ScrapeError;
use crate::models::ChannelVariant;

// Selectors are static and known-valid.
static TR_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("tr").expect("valid selector"));
static TD_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("td").expect("valid selector"));

/// Cell text of the four channel tables, header rows removed
///
/// A table missing from the document simply has no rows here; whether that
/// means an expired session is decided by [`StatusPage::is_authenticated`].
#[derive(Debug, Clone, Default)]
pub struct StatusPage {
    tables: HashMap<ChannelVariant, Vec<Vec<String>>>,
}

impl StatusPage {
    /// Parse a status page body
    ///
    /// Tolerates malformed markup (the HTML parser recovers); returns
    /// `ScrapeError::Parse` only when the body is empty, which no firmware
    /// revision produces for a live session.
    pub fn parse(body: &str) -> Result<Self, ScrapeError> {
        if body.trim().is_empty() {
            return Err(ScrapeError::parse("empty response body"));
        }

        let document = Html::parse_document(body);
        let mut tables = HashMap::new();

        for variant in ChannelVariant::ALL {
            let selector = table_selector(variant);
            let Some(table) = document.select(&selector).next() else {
                continue;
            };

            let rows: Vec<Vec<String>> = table
                .select(&TR_SELECTOR)
                .skip(1) // header row
                .map(|tr| {
                    tr.select(&TD_SELECTOR)
                        .map(|td| td.text().collect::<String>().trim().to_string())
                        .collect()
                })
                .filter(|cells: &Vec<String>| !cells.is_empty())
                .collect();

            tables.insert(variant, rows);
        }

        Ok(Self { tables })
    }

    /// Data rows for one table variant
    pub fn rows(&self, variant: ChannelVariant) -> &[Vec<String>] {
        self.tables.get(&variant).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Whether the document carries the authenticated status marker
    ///
    /// The downstream bonded table is present on every authenticated status
    /// page and absent from the login redirect the modem serves once the
    /// session cookie expires.
    pub fn is_authenticated(&self) -> bool {
        self.tables.contains_key(&ChannelVariant::DownstreamBonded)
    }

    /// Total number of data rows across all tables
    pub fn row_count(&self) -> usize {
        self.tables.values().map(Vec::len).sum()
    }
}

fn table_selector(variant: ChannelVariant) -> Selector {
    // table ids are fixed per firmware and contain no metacharacters
    Selector::parse(&format!("table#{}", variant.table_id())).expect("valid selector")
}
