//! Entry point for the ticketing binary.
//!
//! Parses command-line arguments, sets up logging, and dispatches to
//! the command handlers. Errors are rendered through the output
//! formatter before the process exits non-zero.

use clap::Parser;
use std::process;
use ticketing::cli::{Cli, Commands, OutputFormatter, handlers};
use ticketing::error::TicketingError;

fn main() {
    let cli = Cli::parse();
    let formatter = OutputFormatter::new(cli.json, cli.no_color);
    init_tracing(cli.verbose);

    if let Err(error) = run(cli, &formatter) {
        report(&error, &formatter);
        process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "ticketing=debug,info"
    } else {
        "ticketing=info,warn"
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn run(cli: Cli, formatter: &OutputFormatter) -> anyhow::Result<()> {
    match cli.command {
        Commands::Init { force } => {
            handlers::handle_init(cli.config.as_deref(), force, formatter)?;
        },
        #[cfg(feature = "api")]
        Commands::Serve { host, port } => {
            use anyhow::Context as _;

            let config = ticketing::config::Config::load(cli.config.as_deref())
                .context("failed to load configuration")?;
            let runtime = tokio::runtime::Runtime::new()
                .context("failed to start the async runtime")?;
            runtime.block_on(handlers::handle_serve(config, host, port, formatter))?;
        },
    }
    Ok(())
}

/// Render an error for the operator. Ticketing errors get their short
/// user message; anything else shows the full context chain.
fn report(error: &anyhow::Error, formatter: &OutputFormatter) {
    match error.downcast_ref::<TicketingError>() {
        Some(err) => formatter.error(&err.user_message()),
        None => formatter.error(&format!("{error:#}")),
    }

    if formatter.is_json() {
        let _ = formatter.print_json(&serde_json::json!({
            "status": "error",
            "error": error.to_string(),
        }));
    }
}
