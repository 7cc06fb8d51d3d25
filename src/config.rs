use std::io::{BufRead, IsTerminal, Write};
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result, bail};

use crate::cli::Cli;
use crate::endpoint::Endpoint;
use crate::model::Ticker;

/// Everything a run needs, resolved from the command line.
#[derive(Debug, Clone)]
pub struct ScrapeConfig {
    pub ticker: Ticker,
    pub endpoint: Endpoint,
    pub timeout: Duration,
    pub output_dir: PathBuf,
}

impl ScrapeConfig {
    pub fn new(ticker: Ticker, output_dir: PathBuf) -> Self {
        ScrapeConfig {
            ticker,
            endpoint: Endpoint::default(),
            timeout: crate::fetch::DEFAULT_TIMEOUT,
            output_dir,
        }
    }

    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let raw = match &cli.ticker {
            Some(t) => t.clone(),
            None => prompt_ticker()?,
        };
        let Some(ticker) = Ticker::parse(&raw) else {
            bail!("Ticker must not be empty.");
        };

        if cli.timeout_secs == 0 {
            bail!("--timeout-secs must be at least 1.");
        }

        let mut endpoint = Endpoint::default();
        if let Some(url) = &cli.base_url {
            endpoint = endpoint.with_base_url(url.as_str());
        }
        if let Some(crumb) = &cli.crumb {
            endpoint = endpoint.with_crumb(crumb.as_str());
        }

        let output_dir = match &cli.output_dir {
            Some(dir) => dir.clone(),
            None => default_output_dir()?,
        };

        Ok(ScrapeConfig {
            ticker,
            endpoint,
            timeout: Duration::from_secs(cli.timeout_secs),
            output_dir,
        })
    }
}

/// `csv/` beside the running executable.
pub fn default_output_dir() -> Result<PathBuf> {
    let exe = std::env::current_exe().context("locating the running executable")?;
    let exe = exe.canonicalize().unwrap_or(exe);
    let dir = exe
        .parent()
        .context("executable path has no parent directory")?;
    Ok(dir.join("csv"))
}

fn prompt_ticker() -> Result<String> {
    let stdin = std::io::stdin();
    if !stdin.is_terminal() {
        bail!("No ticker given. Pass --ticker <SYMBOL>.");
    }

    print!("Enter the ticker: ");
    std::io::stdout().flush()?;
    let mut line = String::new();
    stdin
        .lock()
        .read_line(&mut line)
        .context("reading ticker from stdin")?;
    Ok(line)
}
