use anyhow::Context as _;
use clap::Parser as _;

mod cli;
mod workflow;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("zep error: {error:#}");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();
    init_tracing(cli.quiet, cli.verbose)?;

    let config = zep_config::MigrationConfig::load(&cli.config)
        .with_context(|| format!("failed to load config from '{}'", cli.config.display()))?;

    workflow::migrate(&cli, &config).await
}

fn init_tracing(quiet: bool, verbose: bool) -> anyhow::Result<()> {
    let level = if quiet {
        "error"
    } else if verbose {
        "debug"
    } else {
        "info"
    };

    let filter = tracing_subscriber::EnvFilter::try_from_env("ZEP_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init()
        .map_err(|error| anyhow::anyhow!("failed to initialize tracing subscriber: {error}"))?;

    Ok(())
}
