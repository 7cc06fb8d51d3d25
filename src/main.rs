use clap::Parser;
use tracing_subscriber::EnvFilter;

use yf_options::{cli, config, download};

fn main() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();
    init_tracing(cli.verbose);

    let config = config::ScrapeConfig::from_cli(&cli)?;
    download::run(&config)?;
    Ok(())
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "yf_options=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
