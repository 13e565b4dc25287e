#[path = "mailprobe-cli/args.rs"]
mod args;
#[path = "mailprobe-cli/output.rs"]
mod output;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::Level;

use args::Cli;
use output::ReportRow;

fn init_tracing(debug: bool) {
    let level = if debug { Level::DEBUG } else { Level::WARN };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.debug);

    let addresses = cli.addresses()?;
    let options = cli.options();
    if cli.format == "human" {
        println!(
            "Using port {} with a timeout of {} ms for checking emails: {}",
            options.port,
            options.timeout_ms,
            addresses.join(", ")
        );
    }

    let results = mailprobe::verify_all(&addresses, &options)
        .await
        .context("cannot start verification")?;
    let rows: Vec<ReportRow> = addresses
        .iter()
        .zip(results)
        .map(|(addr, outcome)| ReportRow::new(addr, outcome))
        .collect();

    output::write_reports(&rows, &cli.format)?;

    // exit codes: 0 all verified, 2 at least one address not verified, 1 fatal
    if rows.iter().any(|row| !row.is_success()) {
        std::process::exit(2);
    }
    Ok(())
}
