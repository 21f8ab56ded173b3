use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Utc;

use crate::config::ExchangeConfig;
use crate::fetch::{ChainFetcher, DeltaExchange};
use crate::model::ChainView;
use crate::present;
use crate::render::Format;

/// Entry point for the `show` command.
///
/// An unavailable exchange is still printed (as a message); it only becomes a non-zero
/// exit when the output itself cannot be written.
pub async fn run(
    config: &ExchangeConfig,
    underlying: &str,
    format: &str,
    output: Option<&Path>,
) -> Result<ChainView> {
    let format = Format::parse(format)?;
    let fetcher = ChainFetcher::new(Arc::new(DeltaExchange::new(config)?));

    let outcome = fetcher.fetch(underlying).await;
    let view = present::present_outcome(underlying, outcome, Utc::now());

    let rendered = format.render(&view)?;
    write_output(&rendered, output)?;
    Ok(view)
}

fn write_output(content: &str, output: Option<&Path>) -> Result<()> {
    if let Some(path) = output {
        std::fs::write(path, content)
            .with_context(|| format!("writing {}", path.display()))?;
        eprintln!("Written to {}", path.display());
    } else {
        print!("{content}");
    }
    Ok(())
}
