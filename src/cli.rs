use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Nearest-expiry option chain board — Call and Put mark prices side by side, strikes in
/// the middle.
#[derive(Parser)]
#[command(name = "chain-board", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Serve the chain as a web page (plus JSON endpoints)
    Serve {
        /// Interface to bind
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Port to bind
        #[arg(long, default_value = "8080")]
        port: u16,

        /// Underlying asset (default: CHAIN_UNDERLYING or BTC)
        #[arg(long)]
        underlying: Option<String>,

        /// Re-fetch in the background every N seconds (0 = only on demand)
        #[arg(long, default_value = "0")]
        refresh_secs: u64,
    },

    /// Fetch once and print the chain
    Show {
        /// Underlying asset (default: CHAIN_UNDERLYING or BTC)
        #[arg(long)]
        underlying: Option<String>,

        /// Output format: ascii (default) or json
        #[arg(long, default_value = "ascii")]
        format: String,

        /// Write to this file instead of stdout
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },

    /// Print best bid / ask and mark price for a single option symbol
    Quote {
        /// Exchange symbol, e.g. P-BTC-116400-160825
        symbol: String,
    },
}
