//! Discovery call, then one fetch + normalize pass per expiration page.

use serde_json::Value;
use thiserror::Error;

use crate::endpoint::Endpoint;
use crate::fetch::{FetchError, PageSource};
use crate::model::{ExpirationDate, OptionSide, OutputRow, OutputTable, PullDate, Ticker};
use crate::normalize::{self, PageContext, SideOutcome};

#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("could not load the expiration list for {ticker}")]
    DiscoveryFetch {
        ticker: String,
        #[source]
        source: FetchError,
    },

    #[error("discovery document for {ticker} has no `expirationDates` list")]
    NoExpirationList { ticker: String },

    #[error("discovery document for {ticker} lists an invalid expiration: {value}")]
    BadExpiration { ticker: String, value: String },
}

/// Per-page tallies of what the normalizer threw away.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PageStats {
    pub errors: usize,
    pub skipped: usize,
    pub missing_sides: usize,
}

/// What happened to one expiration page.
#[derive(Debug)]
pub enum PageOutcome {
    /// At least one call or put matched the ticker.
    Processed { rows: Vec<OutputRow>, stats: PageStats },
    /// Fetched fine, nothing matched. Any rows are still kept.
    NoMatches { rows: Vec<OutputRow>, stats: PageStats },
    Failed(FetchError),
}

impl PageOutcome {
    fn from_sides(sides: [SideOutcome; 2]) -> Self {
        let matched = sides.iter().any(SideOutcome::matched);
        let stats = PageStats {
            errors: sides.iter().map(|s| s.errors.len()).sum(),
            skipped: sides.iter().map(|s| s.skipped).sum(),
            missing_sides: sides.iter().filter(|s| s.missing).count(),
        };
        let rows: Vec<OutputRow> = sides.into_iter().flat_map(|s| s.rows).collect();
        if matched {
            PageOutcome::Processed { rows, stats }
        } else {
            PageOutcome::NoMatches { rows, stats }
        }
    }

    pub fn is_processed(&self) -> bool {
        matches!(self, PageOutcome::Processed { .. })
    }

    fn into_rows(self) -> Vec<OutputRow> {
        match self {
            PageOutcome::Processed { rows, .. } | PageOutcome::NoMatches { rows, .. } => rows,
            PageOutcome::Failed(_) => Vec::new(),
        }
    }
}

/// Result of a full run, before anything touches the disk.
#[derive(Debug, Default)]
pub struct ScrapeReport {
    pub table: OutputTable,
    pub expirations: Vec<ExpirationDate>,
    pub pages_processed: usize,
    pub pages_empty: usize,
    pub pages_failed: usize,
    pub record_errors: usize,
    pub contracts_skipped: usize,
    pub sides_missing: usize,
}

impl ScrapeReport {
    fn tally(&mut self, stats: &PageStats) {
        self.record_errors += stats.errors;
        self.contracts_skipped += stats.skipped;
        self.sides_missing += stats.missing_sides;
    }
}

/// Fetch the date-less document and read its expiration list, in provider order.
pub async fn discover_expirations(
    source: &dyn PageSource,
    endpoint: &Endpoint,
    ticker: &Ticker,
) -> Result<Vec<ExpirationDate>, ScrapeError> {
    let url = endpoint.generic_url(ticker);
    tracing::debug!(%ticker, url = %url, "discovering expirations");

    let doc = source
        .fetch(&url)
        .await
        .map_err(|source| ScrapeError::DiscoveryFetch {
            ticker: ticker.to_string(),
            source,
        })?;

    parse_expirations(&doc, ticker)
}

pub fn parse_expirations(doc: &Value, ticker: &Ticker) -> Result<Vec<ExpirationDate>, ScrapeError> {
    let list = doc
        .pointer("/optionChain/result/0/expirationDates")
        .and_then(Value::as_array)
        .ok_or_else(|| ScrapeError::NoExpirationList {
            ticker: ticker.to_string(),
        })?;

    list.iter()
        .map(|v| {
            expiration_seconds(v)
                .and_then(ExpirationDate::from_timestamp)
                .ok_or_else(|| ScrapeError::BadExpiration {
                    ticker: ticker.to_string(),
                    value: v.to_string(),
                })
        })
        .collect()
}

/// Unix seconds; whole-number floats such as `1700000000.0` are accepted too.
fn expiration_seconds(v: &Value) -> Option<i64> {
    v.as_i64().or_else(|| {
        v.as_f64()
            .filter(|f| f.fract() == 0.0 && *f >= i64::MIN as f64 && *f <= i64::MAX as f64)
            .map(|f| f as i64)
    })
}

/// Fetch one expiration page and normalize calls, then puts.
pub async fn process_page(
    source: &dyn PageSource,
    endpoint: &Endpoint,
    ticker: &Ticker,
    ctx: &PageContext,
) -> PageOutcome {
    let url = endpoint.page_url(ticker, &ctx.expiration);
    let doc = match source.fetch(&url).await {
        Ok(doc) => doc,
        Err(err) => return PageOutcome::Failed(err),
    };

    let sides = OptionSide::ALL.map(|side| normalize::normalize_side(&doc, ticker, side, ctx));
    PageOutcome::from_sides(sides)
}

/// Run the whole pipeline. Only a failed discovery call is an error; page
/// failures are counted and logged.
pub async fn scrape(
    source: &dyn PageSource,
    endpoint: &Endpoint,
    ticker: &Ticker,
    pull: PullDate,
) -> Result<ScrapeReport, ScrapeError> {
    let expirations = discover_expirations(source, endpoint, ticker).await?;
    tracing::info!(%ticker, count = expirations.len(), "expiration pages to fetch");

    let mut report = ScrapeReport {
        expirations: expirations.clone(),
        ..Default::default()
    };

    for expiration in expirations {
        let ctx = PageContext { pull, expiration };
        let outcome = process_page(source, endpoint, ticker, &ctx).await;
        let date = expiration.iso();

        match &outcome {
            PageOutcome::Processed { rows, stats } => {
                println!("Processed date page: {date}");
                tracing::debug!(%ticker, expiration = %date, rows = rows.len(), errors = stats.errors, skipped = stats.skipped, "page processed");
                report.pages_processed += 1;
                report.tally(stats);
            }
            PageOutcome::NoMatches { stats, .. } => {
                tracing::info!(%ticker, expiration = %date, errors = stats.errors, skipped = stats.skipped, missing_sides = stats.missing_sides, "page had no matching contracts");
                report.pages_empty += 1;
                report.tally(stats);
            }
            PageOutcome::Failed(err) => {
                tracing::warn!(%ticker, expiration = %date, error = %err, timeout = err.is_timeout(), "skipping page");
                report.pages_failed += 1;
            }
        }

        report.table.extend(outcome.into_rows());
    }

    Ok(report)
}
