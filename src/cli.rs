use clap::Parser;
use std::path::PathBuf;

/// Download the full options chain for one ticker from Yahoo Finance into a CSV file.
#[derive(Parser, Debug)]
#[command(name = "yf-options", version, about)]
pub struct Cli {
    /// Underlying symbol, e.g. AAPL (prompted for when omitted)
    #[arg(long, short = 't')]
    pub ticker: Option<String>,

    /// Directory for the CSV file (default: `csv/` next to the executable)
    #[arg(long, short = 'o')]
    pub output_dir: Option<PathBuf>,

    /// Per-request timeout in seconds
    #[arg(long, default_value = "30")]
    pub timeout_secs: u64,

    /// Options endpoint; the ticker is appended to it
    #[arg(long)]
    pub base_url: Option<String>,

    /// Access token sent as the `crumb` query parameter
    #[arg(long)]
    pub crumb: Option<String>,

    /// Print debug diagnostics to stderr (RUST_LOG takes precedence)
    #[arg(long, short = 'v')]
    pub verbose: bool,
}
