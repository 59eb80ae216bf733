//! `ironwall` binary entry point

use clap::Parser;
use tracing_subscriber::EnvFilter;

use ironwall_cli::cli::{Cli, Commands};
use ironwall_cli::commands;
use ironwall_cli::error::CliError;
use ironwall_cli::output::OutputWriter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Logs go to stderr so that stdout stays clean for --output json.
    let level = cli.log_level.as_deref().unwrap_or("warn");
    let filter = EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    if let Err(err) = run(cli).await {
        eprintln!("error: {err}");
        std::process::exit(err.exit_code());
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let writer = OutputWriter::new(cli.output);

    match cli.command {
        Commands::Rules(args) => commands::rules::execute(args, &cli.config, &writer).await,
        Commands::Simulate(args) => commands::simulate::execute(args, &cli.config, &writer).await,
        Commands::Config(args) => commands::config::execute(args, &cli.config, &writer).await,
    }
}
