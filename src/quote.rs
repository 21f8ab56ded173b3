use anyhow::{Context, Result};
use rust_decimal::Decimal;

use crate::config::ExchangeConfig;
use crate::fetch::DeltaExchange;
use crate::model::TickerQuote;

/// Entry point for the `quote` command.
pub async fn run(config: &ExchangeConfig, symbol: &str) -> Result<()> {
    let exchange = DeltaExchange::new(config)?;
    let quote = exchange
        .ticker_quote(symbol)
        .await
        .with_context(|| format!("fetching ticker {}", symbol.trim()))?;
    print!("{}", format_quote(&quote));
    Ok(())
}

pub fn format_quote(quote: &TickerQuote) -> String {
    let show = |v: Option<Decimal>| v.map(|d| d.normalize().to_string()).unwrap_or_else(|| "-".into());
    format!(
        "{}\n  Best Bid:   {}\n  Best Ask:   {}\n  Mark Price: {}\n",
        quote.symbol,
        show(quote.best_bid),
        show(quote.best_ask),
        show(quote.mark_price)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn missing_values_print_as_dash() {
        let quote = TickerQuote {
            symbol: "P-BTC-116400-160825".into(),
            best_bid: Some(dec!(410.50)),
            best_ask: None,
            mark_price: Some(dec!(417.1)),
        };
        assert_eq!(
            format_quote(&quote),
            "P-BTC-116400-160825\n  Best Bid:   410.5\n  Best Ask:   -\n  Mark Price: 417.1\n"
        );
    }
}
