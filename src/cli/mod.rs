//! Command-line interface: argument definitions and handlers.

pub mod handlers;
pub mod output;

pub use output::OutputFormatter;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Contract-driven support ticketing service.
#[derive(Debug, Parser)]
#[command(name = "ticketing", version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to the configuration file
    #[arg(short, long, global = true, env = "TICKETING_CONFIG")]
    pub config: Option<PathBuf>,

    /// Emit results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Create the data directory and a configuration skeleton
    Init {
        /// Overwrite an existing configuration file
        #[arg(long)]
        force: bool,
    },

    /// Run the HTTP API server
    #[cfg(feature = "api")]
    Serve {
        /// Listen host, overriding the configuration
        #[arg(long)]
        host: Option<String>,

        /// Listen port, overriding the configuration
        #[arg(short, long)]
        port: Option<u16>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arguments_parse() {
        let cli = Cli::parse_from(["ticketing", "init", "--force"]);
        assert!(matches!(cli.command, Commands::Init { force: true }));

        let cli = Cli::parse_from(["ticketing", "--json", "init"]);
        assert!(cli.json);
        assert!(!cli.no_color);
    }

    #[cfg(feature = "api")]
    #[test]
    fn serve_accepts_overrides() {
        let cli = Cli::parse_from(["ticketing", "serve", "--port", "9999"]);
        match cli.command {
            Commands::Serve { host, port } => {
                assert_eq!(host, None);
                assert_eq!(port, Some(9999));
            }
            Commands::Init { .. } => panic!("Expected the serve command"),
        }
    }
}
