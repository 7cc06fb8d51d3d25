use std::fmt;

use chrono::{DateTime, NaiveDate};
use serde::Serialize;

// ── Ticker ──────────────────────────────────────────────────────────

/// Underlying symbol for one run. Kept verbatim; the provider rejects bad ones.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticker(String);

impl Ticker {
    /// Trim surrounding whitespace. Returns `None` for an empty symbol.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Ticker(trimmed.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Case-sensitive prefix match against a contract symbol.
    pub fn owns_contract(&self, contract: &str) -> bool {
        contract.starts_with(&self.0)
    }
}

impl fmt::Display for Ticker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ── Dates ───────────────────────────────────────────────────────────

/// One expiration as listed by the discovery document.
///
/// `timestamp` is echoed back to the provider as the page selector; `date` is
/// what lands in the `expiration` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpirationDate {
    pub timestamp: i64,
    pub date: NaiveDate,
}

impl ExpirationDate {
    /// Convert a Unix timestamp (seconds, UTC). `None` if out of chrono's range.
    pub fn from_timestamp(timestamp: i64) -> Option<Self> {
        DateTime::from_timestamp(timestamp, 0).map(|dt| ExpirationDate {
            timestamp,
            date: dt.date_naive(),
        })
    }

    pub fn iso(&self) -> String {
        self.date.format("%Y-%m-%d").to_string()
    }
}

/// Calendar date the run executes on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PullDate(pub NaiveDate);

impl PullDate {
    pub fn today() -> Self {
        PullDate(chrono::Local::now().date_naive())
    }

    /// `YYYY-MM-DD`, used for the `quotedate` column and the file name.
    pub fn iso(&self) -> String {
        self.0.format("%Y-%m-%d").to_string()
    }

    /// `YYMMDD`, appended to contract symbols to build option ids.
    pub fn token(&self) -> String {
        self.0.format("%y%m%d").to_string()
    }
}

// ── Contracts ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionSide {
    Call,
    Put,
}

impl OptionSide {
    pub const ALL: [OptionSide; 2] = [OptionSide::Call, OptionSide::Put];

    /// Value of the `type` column.
    pub fn as_str(&self) -> &'static str {
        match self {
            OptionSide::Call => "call",
            OptionSide::Put => "put",
        }
    }

    /// Key of this side's record list inside a page document.
    pub fn list_key(&self) -> &'static str {
        match self {
            OptionSide::Call => "calls",
            OptionSide::Put => "puts",
        }
    }
}

impl fmt::Display for OptionSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A contract as the provider reports it. Every numeric field is optional.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ContractRecord {
    pub contract_symbol: String,
    pub strike: Option<f64>,
    pub last_price: Option<f64>,
    pub bid: Option<f64>,
    pub ask: Option<f64>,
    pub change: Option<f64>,
    pub percent_change: Option<f64>,
    pub volume: Option<u64>,
    pub open_interest: Option<u64>,
    pub implied_volatility: Option<f64>,
}

// ── Output ──────────────────────────────────────────────────────────

/// Column order of the output file.
pub const HEADER: [&str; 12] = [
    "option_id",
    "quotedate",
    "expiration",
    "strike",
    "contract",
    "type",
    "last_trade",
    "bid",
    "ask",
    "volume",
    "open_interest",
    "implied_vol",
];

/// One CSV line. Field order must match [`HEADER`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutputRow {
    pub option_id: String,
    pub quotedate: String,
    pub expiration: String,
    pub strike: Option<f64>,
    pub contract: String,
    #[serde(rename = "type")]
    pub option_type: &'static str,
    pub last_trade: Option<f64>,
    pub bid: Option<f64>,
    pub ask: Option<f64>,
    pub volume: Option<u64>,
    pub open_interest: Option<u64>,
    pub implied_vol: Option<f64>,
}

impl OutputRow {
    pub fn from_record(
        record: ContractRecord,
        side: OptionSide,
        pull: PullDate,
        expiration: &ExpirationDate,
    ) -> Self {
        OutputRow {
            option_id: format!("{}{}", record.contract_symbol, pull.token()),
            quotedate: pull.iso(),
            expiration: expiration.iso(),
            strike: record.strike,
            contract: record.contract_symbol,
            option_type: side.as_str(),
            last_trade: record.last_price,
            bid: record.bid,
            ask: record.ask,
            volume: record.volume,
            open_interest: record.open_interest,
            implied_vol: record.implied_volatility,
        }
    }
}

/// Rows accumulated over one run. Append-only.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct OutputTable {
    rows: Vec<OutputRow>,
}

impl OutputTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn extend(&mut self, rows: impl IntoIterator<Item = OutputRow>) {
        self.rows.extend(rows);
    }

    pub fn rows(&self) -> &[OutputRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
