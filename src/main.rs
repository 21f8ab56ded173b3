use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use dotenv::dotenv;
use tracing_subscriber::EnvFilter;

use chain_board::api::{self, ServeConfig, state::AppState};
use chain_board::cli;
use chain_board::config::ExchangeConfig;
use chain_board::fetch::{ChainFetcher, DeltaExchange, normalize_underlying};
use chain_board::render::PageOptions;
use chain_board::{quote, show};

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("chain_board=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = cli::Cli::parse();
    let config = ExchangeConfig::from_env()?;

    match cli.command {
        cli::Command::Serve {
            host,
            port,
            underlying,
            refresh_secs,
        } => {
            let underlying = normalize_underlying(underlying.as_deref().unwrap_or(&config.underlying));
            let exchange = Arc::new(DeltaExchange::new(&config)?);
            let refresh_every = (refresh_secs > 0).then(|| Duration::from_secs(refresh_secs));
            let state = AppState::new(
                underlying,
                ChainFetcher::new(exchange.clone()),
                exchange,
                PageOptions {
                    auto_reload_secs: refresh_every.map(|d| d.as_secs()),
                },
            );
            api::serve(
                &ServeConfig {
                    host,
                    port,
                    refresh_every,
                },
                state,
            )
            .await
        }
        cli::Command::Show {
            underlying,
            format,
            output,
        } => {
            let underlying = normalize_underlying(underlying.as_deref().unwrap_or(&config.underlying));
            show::run(&config, &underlying, &format, output.as_deref())
                .await
                .map(|_| ())
        }
        cli::Command::Quote { symbol } => quote::run(&config, &symbol).await,
    }
}
