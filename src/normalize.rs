//! Turn the call/put lists of one expiration page into output rows.
//!
//! Each record is decoded on its own: a bad record is reported and skipped,
//! and never keeps the remaining records (or the other side) from producing rows.

use serde_json::{Map, Value};
use thiserror::Error;

use crate::model::{ContractRecord, ExpirationDate, OptionSide, OutputRow, PullDate, Ticker};

#[derive(Debug, Error, PartialEq)]
pub enum NormalizeError {
    #[error("record #{index} is not a JSON object")]
    NotAnObject { index: usize },

    #[error("record #{index} has no string `contractSymbol`")]
    MissingSymbol { index: usize },

    #[error("{contract}: field `{field}` is not numeric")]
    BadField {
        contract: String,
        field: &'static str,
    },
}

/// Dates shared by every row produced from one page.
#[derive(Debug, Clone, Copy)]
pub struct PageContext {
    pub pull: PullDate,
    pub expiration: ExpirationDate,
}

#[derive(Debug)]
pub enum RecordOutcome {
    Row(OutputRow),
    Skipped { contract: String },
    Failed(NormalizeError),
}

/// Everything one side of a page produced.
#[derive(Debug)]
pub struct SideOutcome {
    pub side: OptionSide,
    pub rows: Vec<OutputRow>,
    pub skipped: usize,
    pub errors: Vec<NormalizeError>,
    /// The side's record list was absent or not an array.
    pub missing: bool,
}

impl SideOutcome {
    fn empty(side: OptionSide) -> Self {
        SideOutcome {
            side,
            rows: Vec::new(),
            skipped: 0,
            errors: Vec::new(),
            missing: false,
        }
    }

    pub fn matched(&self) -> bool {
        !self.rows.is_empty()
    }
}

/// Locate `optionChain.result[0].options[0].<calls|puts>`.
pub fn side_records(page: &Value, side: OptionSide) -> Option<&Vec<Value>> {
    page.pointer("/optionChain/result/0/options/0")?
        .get(side.list_key())?
        .as_array()
}

pub fn normalize_side(
    page: &Value,
    ticker: &Ticker,
    side: OptionSide,
    ctx: &PageContext,
) -> SideOutcome {
    let mut out = SideOutcome::empty(side);

    let Some(records) = side_records(page, side) else {
        tracing::debug!(%ticker, %side, expiration = %ctx.expiration.iso(), "no record list on page");
        out.missing = true;
        return out;
    };

    for (index, record) in records.iter().enumerate() {
        match normalize_record(index, record, ticker, side, ctx) {
            RecordOutcome::Row(row) => out.rows.push(row),
            RecordOutcome::Skipped { contract } => {
                tracing::trace!(%ticker, %side, contract = %contract, "contract belongs to another symbol");
                out.skipped += 1;
            }
            RecordOutcome::Failed(err) => {
                tracing::warn!(%ticker, %side, expiration = %ctx.expiration.iso(), error = %err, "discarding record");
                out.errors.push(err);
            }
        }
    }

    out
}

pub fn normalize_record(
    index: usize,
    record: &Value,
    ticker: &Ticker,
    side: OptionSide,
    ctx: &PageContext,
) -> RecordOutcome {
    let Some(fields) = record.as_object() else {
        return RecordOutcome::Failed(NormalizeError::NotAnObject { index });
    };
    let Some(contract) = fields.get("contractSymbol").and_then(Value::as_str) else {
        return RecordOutcome::Failed(NormalizeError::MissingSymbol { index });
    };
    if !ticker.owns_contract(contract) {
        return RecordOutcome::Skipped {
            contract: contract.to_string(),
        };
    }

    match read_record(contract, fields) {
        Ok(rec) => RecordOutcome::Row(OutputRow::from_record(rec, side, ctx.pull, &ctx.expiration)),
        Err(err) => RecordOutcome::Failed(err),
    }
}

fn read_record(contract: &str, fields: &Map<String, Value>) -> Result<ContractRecord, NormalizeError> {
    let float = |field| read_float(contract, fields, field);
    let count = |field| read_count(contract, fields, field);

    Ok(ContractRecord {
        contract_symbol: contract.to_string(),
        strike: float("strike")?,
        last_price: float("lastPrice")?,
        bid: float("bid")?,
        ask: float("ask")?,
        change: float("change")?,
        percent_change: float("percentChange")?,
        volume: count("volume")?,
        open_interest: count("openInterest")?,
        implied_volatility: float("impliedVolatility")?,
    })
}

/// The formatted endpoint wraps numbers as `{"raw": 1.0, "fmt": "1.00"}`;
/// the unformatted one sends them bare. An empty object or `null` means absent.
fn unwrap_raw(value: &Value) -> Option<&Value> {
    match value {
        Value::Null => None,
        Value::Object(obj) => obj.get("raw").filter(|v| !v.is_null()),
        other => Some(other),
    }
}

fn read_float(
    contract: &str,
    fields: &Map<String, Value>,
    field: &'static str,
) -> Result<Option<f64>, NormalizeError> {
    let Some(value) = fields.get(field).and_then(unwrap_raw) else {
        return Ok(None);
    };
    value.as_f64().map(Some).ok_or_else(|| NormalizeError::BadField {
        contract: contract.to_string(),
        field,
    })
}

fn read_count(
    contract: &str,
    fields: &Map<String, Value>,
    field: &'static str,
) -> Result<Option<u64>, NormalizeError> {
    let Some(value) = fields.get(field).and_then(unwrap_raw) else {
        return Ok(None);
    };
    let count = value.as_u64().or_else(|| {
        value
            .as_f64()
            .filter(|f| *f >= 0.0 && f.fract() == 0.0)
            .map(|f| f as u64)
    });
    count.map(Some).ok_or_else(|| NormalizeError::BadField {
        contract: contract.to_string(),
        field,
    })
}
