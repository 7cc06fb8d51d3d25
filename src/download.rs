use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::config::ScrapeConfig;
use crate::fetch::{HttpPageSource, PageSource};
use crate::model::PullDate;
use crate::{output, pipeline};

/// What a finished run wrote.
#[derive(Debug)]
pub struct RunSummary {
    pub path: PathBuf,
    pub rows: usize,
    pub pages_processed: usize,
    pub pages_empty: usize,
    pub pages_failed: usize,
    pub record_errors: usize,
    pub contracts_skipped: usize,
}

/// Run the download command: discover expirations, fetch every page, write the CSV.
pub fn run(config: &ScrapeConfig) -> Result<RunSummary> {
    let rt = tokio::runtime::Runtime::new().context("creating async runtime")?;
    rt.block_on(async {
        let source = HttpPageSource::new(config.timeout).context("creating HTTP client")?;
        execute(&source, config, PullDate::today()).await
    })
}

/// Same as [`run`] against any page source and a fixed pull date.
pub async fn execute(
    source: &dyn PageSource,
    config: &ScrapeConfig,
    pull: PullDate,
) -> Result<RunSummary> {
    let ticker = &config.ticker;
    let report = pipeline::scrape(source, &config.endpoint, ticker, pull)
        .await
        .with_context(|| format!("fetching options chain for {ticker}"))?;

    let path = output::output_path(&config.output_dir, ticker, pull);
    output::write_csv(&path, &report.table)
        .with_context(|| format!("writing {}", path.display()))?;

    if report.pages_failed > 0 || report.record_errors > 0 {
        tracing::warn!(
            %ticker,
            failed_pages = report.pages_failed,
            empty_pages = report.pages_empty,
            record_errors = report.record_errors,
            missing_sides = report.sides_missing,
            "some data was skipped"
        );
    }
    tracing::debug!(
        %ticker,
        skipped_contracts = report.contracts_skipped,
        empty_pages = report.pages_empty,
        "contracts of other symbols filtered out"
    );

    println!(
        "Options data for {} dates successfully scraped!",
        report.pages_processed
    );
    println!("Wrote {} rows to {}", report.table.len(), path.display());

    Ok(RunSummary {
        path,
        rows: report.table.len(),
        pages_processed: report.pages_processed,
        pages_empty: report.pages_empty,
        pages_failed: report.pages_failed,
        record_errors: report.record_errors,
        contracts_skipped: report.contracts_skipped,
    })
}
