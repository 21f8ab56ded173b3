//! Delta Exchange public REST binding.
//!
//! All exchange field names live in this module. Tickers are read into a
//! loosely-typed `RawTicker` and coerced into `Contract`s here; anything the
//! rest of the crate sees has already been validated.

use std::str::FromStr;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use super::error::{FetchError, excerpt};
use super::{ChainSource, QuoteSource};
use crate::config::ExchangeConfig;
use crate::model::{Contract, OptionType, TickerQuote};

const TICKERS_PATH: &str = "/v2/tickers";
const OPTION_CONTRACT_TYPES: &str = "call_options,put_options";

// ── Delta API response types ────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(default)]
    success: Option<bool>,
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<Value>,
}

/// Every field optional and untyped: upstream schema drift must not fail the whole listing.
#[derive(Debug, Default, Deserialize)]
struct RawTicker {
    #[serde(default)]
    symbol: Option<Value>,
    #[serde(default)]
    contract_type: Option<Value>,
    #[serde(default)]
    strike_price: Option<Value>,
    #[serde(default)]
    mark_price: Option<Value>,
    #[serde(default)]
    settlement_time: Option<Value>,
    #[serde(default)]
    underlying_asset_symbol: Option<Value>,
    #[serde(default)]
    quotes: Option<Value>,
    #[serde(default)]
    best_bid_price: Option<Value>,
    #[serde(default)]
    best_ask_price: Option<Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SkipReason {
    NotAnObject,
    NoSymbol,
    OtherUnderlying,
    NoOptionType,
    NoStrike,
    NoExpiry,
}

// ── Client ──────────────────────────────────────────────────────────

pub struct DeltaExchange {
    client: reqwest::Client,
    api_url: String,
}

impl DeltaExchange {
    pub fn new(config: &ExchangeConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.as_str())
            .build()
            .context("creating Delta HTTP client")?;

        Ok(DeltaExchange {
            client,
            api_url: config.api_url.trim_end_matches('/').to_string(),
        })
    }

    /// Best bid / ask / mark for one option symbol.
    ///
    /// The symbol is normalized by [`option_symbol`] before it goes into the URL path.
    pub async fn ticker_quote(&self, symbol: &str) -> Result<TickerQuote, FetchError> {
        let symbol = option_symbol(symbol)?;
        let symbol = symbol.as_str();
        let url = format!("{}{}/{}", self.api_url, TICKERS_PATH, symbol);
        let result = self.get_result(&url, &[]).await?;
        if !result.is_object() {
            return Err(FetchError::Malformed(format!(
                "ticker result for {symbol} is not an object"
            )));
        }
        let raw: RawTicker = serde_json::from_value(result)
            .map_err(|e| FetchError::Malformed(format!("ticker {symbol}: {e}")))?;
        Ok(raw.into_quote(symbol))
    }

    async fn get_result(&self, url: &str, query: &[(&str, &str)]) -> Result<Value, FetchError> {
        debug!(url, "GET");
        let resp = self.client.get(url).query(query).send().await?;
        let status = resp.status();
        let body = resp.text().await?;

        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                body: excerpt(&body),
            });
        }

        parse_result(&body)
    }
}

#[async_trait]
impl ChainSource for DeltaExchange {
    fn name(&self) -> &str {
        "delta"
    }

    async fn listed_contracts(&self, underlying: &str) -> Result<Vec<Contract>, FetchError> {
        let url = format!("{}{}", self.api_url, TICKERS_PATH);
        let result = self
            .get_result(
                &url,
                &[
                    ("contract_types", OPTION_CONTRACT_TYPES),
                    ("underlying_asset_symbols", underlying),
                ],
            )
            .await?;
        coerce_tickers(result, underlying)
    }
}

#[async_trait]
impl QuoteSource for DeltaExchange {
    async fn quote(&self, symbol: &str) -> Result<TickerQuote, FetchError> {
        self.ticker_quote(symbol).await
    }
}

// ── Boundary coercion ───────────────────────────────────────────────

/// Trim and uppercase a ticker symbol. Only ASCII letters, digits and `-` are accepted.
pub fn option_symbol(raw: &str) -> Result<String, FetchError> {
    let symbol = raw.trim().to_ascii_uppercase();
    if symbol.is_empty() || !symbol.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
        return Err(FetchError::InvalidSymbol(raw.trim().to_string()));
    }
    Ok(symbol)
}

/// Unwrap the `{success, result}` envelope.
fn parse_result(body: &str) -> Result<Value, FetchError> {
    let envelope: Envelope = serde_json::from_str(body)
        .map_err(|e| FetchError::Malformed(format!("invalid JSON body: {e}")))?;

    if envelope.success == Some(false) {
        let code = envelope
            .error
            .as_ref()
            .and_then(|e| e.get("code").and_then(Value::as_str).map(str::to_string))
            .or_else(|| envelope.error.as_ref().map(Value::to_string))
            .unwrap_or_else(|| "unknown error".to_string());
        return Err(FetchError::Rejected(code));
    }

    envelope
        .result
        .ok_or_else(|| FetchError::Malformed("missing `result` field".to_string()))
}

/// Turn the `result` array into contracts for `underlying`, dropping unusable entries.
fn coerce_tickers(result: Value, underlying: &str) -> Result<Vec<Contract>, FetchError> {
    let Value::Array(items) = result else {
        return Err(FetchError::Malformed("`result` is not an array".to_string()));
    };

    let total = items.len();
    let mut contracts = Vec::with_capacity(total);
    let mut skipped = 0usize;

    for item in items {
        let coerced = if item.is_object() {
            serde_json::from_value::<RawTicker>(item)
                .map_err(|_| SkipReason::NotAnObject)
                .and_then(|raw| raw.into_contract(underlying))
        } else {
            Err(SkipReason::NotAnObject)
        };

        match coerced {
            Ok(contract) => contracts.push(contract),
            Err(SkipReason::OtherUnderlying) => {}
            Err(reason) => {
                debug!(?reason, "skipping ticker");
                skipped += 1;
            }
        }
    }

    if skipped > 0 {
        warn!(skipped, total, underlying, "dropped tickers that could not be coerced");
    }

    Ok(contracts)
}

impl RawTicker {
    fn into_contract(self, underlying: &str) -> Result<Contract, SkipReason> {
        let symbol = self
            .symbol
            .as_ref()
            .and_then(text)
            .ok_or(SkipReason::NoSymbol)?;

        let listed_underlying = self
            .underlying_asset_symbol
            .as_ref()
            .and_then(text)
            .or_else(|| symbol.split('-').nth(1).map(str::to_string));
        if let Some(u) = listed_underlying {
            if !u.eq_ignore_ascii_case(underlying) {
                return Err(SkipReason::OtherUnderlying);
            }
        }

        let option_type = self
            .contract_type
            .as_ref()
            .and_then(text)
            .and_then(|t| option_type_from_contract_type(&t))
            .or_else(|| option_type_from_symbol(&symbol))
            .ok_or(SkipReason::NoOptionType)?;

        let strike = self
            .strike_price
            .as_ref()
            .and_then(decimal)
            .ok_or(SkipReason::NoStrike)?;

        let settles_at = self
            .settlement_time
            .as_ref()
            .and_then(text)
            .and_then(|s| settlement_instant(&s));
        let expiry = settles_at
            .map(|at| at.date_naive())
            .or_else(|| expiry_from_symbol(&symbol))
            .ok_or(SkipReason::NoExpiry)?;

        let mark_price = self.mark_price.as_ref().and_then(decimal);

        Ok(Contract {
            symbol,
            option_type,
            strike,
            expiry,
            mark_price,
            settles_at,
        })
    }

    fn into_quote(self, symbol: &str) -> TickerQuote {
        let quoted = |key: &str| {
            self.quotes
                .as_ref()
                .and_then(|q| q.get(key))
                .and_then(decimal)
        };
        TickerQuote {
            symbol: self
                .symbol
                .as_ref()
                .and_then(text)
                .unwrap_or_else(|| symbol.to_string()),
            best_bid: quoted("best_bid").or_else(|| self.best_bid_price.as_ref().and_then(decimal)),
            best_ask: quoted("best_ask").or_else(|| self.best_ask_price.as_ref().and_then(decimal)),
            mark_price: self.mark_price.as_ref().and_then(decimal),
        }
    }
}

fn text(v: &Value) -> Option<String> {
    v.as_str()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Exchange numbers arrive as strings or JSON numbers.
fn decimal(v: &Value) -> Option<Decimal> {
    match v {
        Value::String(s) => {
            let s = s.trim();
            if s.is_empty() {
                return None;
            }
            Decimal::from_str(s)
                .or_else(|_| Decimal::from_scientific(s))
                .ok()
        }
        Value::Number(n) => n
            .as_i64()
            .map(Decimal::from)
            .or_else(|| n.as_f64().and_then(Decimal::from_f64)),
        _ => None,
    }
}

fn option_type_from_contract_type(contract_type: &str) -> Option<OptionType> {
    match contract_type.to_ascii_lowercase().as_str() {
        "call_options" | "call_option" | "call" => Some(OptionType::Call),
        "put_options" | "put_option" | "put" => Some(OptionType::Put),
        _ => None,
    }
}

fn option_type_from_symbol(symbol: &str) -> Option<OptionType> {
    match symbol.split('-').next()? {
        "C" => Some(OptionType::Call),
        "P" => Some(OptionType::Put),
        _ => None,
    }
}

fn settlement_instant(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// `C-BTC-90000-310125` → 2025-01-31 (trailing `DDMMYY`).
fn expiry_from_symbol(symbol: &str) -> Option<NaiveDate> {
    let suffix = symbol.rsplit('-').next()?;
    if suffix.len() != 6 || !suffix.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    NaiveDate::parse_from_str(suffix, "%d%m%y").ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn parses_symbol_expiry() {
        assert_eq!(expiry_from_symbol("C-BTC-90000-310125"), Some(date(2025, 1, 31)));
        assert_eq!(expiry_from_symbol("P-BTC-116400-160825"), Some(date(2025, 8, 16)));
        assert_eq!(expiry_from_symbol("BTCUSD"), None);
        assert_eq!(expiry_from_symbol("C-BTC-90000-320125"), None);
    }

    #[test]
    fn decimals_from_strings_and_numbers() {
        assert_eq!(decimal(&json!("1234.5")), Some(dec!(1234.5)));
        assert_eq!(decimal(&json!(" 0.05 ")), Some(dec!(0.05)));
        assert_eq!(decimal(&json!(30000)), Some(dec!(30000)));
        assert_eq!(decimal(&json!("1e2")), Some(dec!(100)));
        assert_eq!(decimal(&json!("")), None);
        assert_eq!(decimal(&json!("n/a")), None);
        assert_eq!(decimal(&Value::Null), None);
    }

    #[test]
    fn coerces_full_ticker() {
        let result = json!([{
            "symbol": "C-BTC-90000-310125",
            "contract_type": "call_options",
            "strike_price": "90000",
            "mark_price": "1520.25",
            "underlying_asset_symbol": "BTC"
        }]);
        let contracts = coerce_tickers(result, "BTC").unwrap();
        assert_eq!(
            contracts,
            vec![Contract::new(
                "C-BTC-90000-310125",
                OptionType::Call,
                dec!(90000),
                date(2025, 1, 31),
                Some(dec!(1520.25)),
            )]
        );
    }

    #[test]
    fn missing_mark_is_kept_as_none() {
        let result = json!([
            { "symbol": "P-BTC-80000-310125", "strike_price": "80000" },
            { "symbol": "P-BTC-81000-310125", "strike_price": "81000", "mark_price": null },
            { "symbol": "P-BTC-82000-310125", "strike_price": 82000, "mark_price": "garbage" },
        ]);
        let contracts = coerce_tickers(result, "BTC").unwrap();
        assert_eq!(contracts.len(), 3);
        assert!(contracts.iter().all(|c| c.mark_price.is_none()));
        assert!(contracts.iter().all(|c| c.option_type == OptionType::Put));
    }

    #[test]
    fn settlement_time_takes_precedence_over_symbol() {
        let result = json!([{
            "symbol": "C-BTC-90000-310125",
            "strike_price": "90000",
            "settlement_time": "2025-02-07T12:00:00Z"
        }]);
        let contracts = coerce_tickers(result, "BTC").unwrap();
        assert_eq!(contracts[0].expiry, date(2025, 2, 7));
        assert_eq!(
            contracts[0].settles_at.map(|t| t.to_rfc3339()),
            Some("2025-02-07T12:00:00+00:00".to_string())
        );
    }

    #[test]
    fn unusable_entries_are_dropped() {
        let result = json!([
            "not an object",
            { "strike_price": "1" },
            { "symbol": "X-BTC-1-310125", "strike_price": "1" },
            { "symbol": "C-BTC-1-310125" },
            { "symbol": "C-BTC-1-PERP", "strike_price": "1" },
            { "symbol": "C-ETH-3000-310125", "strike_price": "3000" },
            { "symbol": "C-BTC-95000-310125", "strike_price": "95000", "mark_price": "10" },
        ]);
        let contracts = coerce_tickers(result, "BTC").unwrap();
        assert_eq!(contracts.len(), 1);
        assert_eq!(contracts[0].strike, dec!(95000));
    }

    #[test]
    fn envelope_errors() {
        assert!(matches!(parse_result("<html>"), Err(FetchError::Malformed(_))));
        assert!(matches!(parse_result("{}"), Err(FetchError::Malformed(_))));
        match parse_result(r#"{"success":false,"error":{"code":"invalid_contract"}}"#) {
            Err(FetchError::Rejected(code)) => assert_eq!(code, "invalid_contract"),
            other => panic!("unexpected: {other:?}"),
        }
        assert!(matches!(
            coerce_tickers(json!({"symbol": "x"}), "BTC"),
            Err(FetchError::Malformed(_))
        ));
    }

    #[test]
    fn empty_result_is_not_an_error() {
        let result = parse_result(r#"{"success":true,"result":[]}"#).unwrap();
        assert!(coerce_tickers(result, "BTC").unwrap().is_empty());
    }

    #[test]
    fn option_symbol_normalizes_and_rejects_path_characters() {
        assert_eq!(option_symbol(" p-btc-116400-160825 ").unwrap(), "P-BTC-116400-160825");
        for bad in ["", "  ", "C-BTC/1", "C-BTC-1?x=1", "P-BTC_1", "C BTC", "../v2"] {
            assert!(
                matches!(option_symbol(bad), Err(FetchError::InvalidSymbol(_))),
                "{bad:?} should be refused"
            );
        }
    }

    #[test]
    fn quote_reads_nested_then_flat_fields() {
        let raw: RawTicker = serde_json::from_value(json!({
            "symbol": "P-BTC-116400-160825",
            "quotes": { "best_bid": "410.5", "best_ask": "425" },
            "mark_price": "417.1"
        }))
        .unwrap();
        let quote = raw.into_quote("P-BTC-116400-160825");
        assert_eq!(quote.best_bid, Some(dec!(410.5)));
        assert_eq!(quote.best_ask, Some(dec!(425)));
        assert_eq!(quote.mark_price, Some(dec!(417.1)));

        let raw: RawTicker = serde_json::from_value(json!({
            "best_bid_price": "1",
        }))
        .unwrap();
        let quote = raw.into_quote("P-BTC-116400-160825");
        assert_eq!(quote.symbol, "P-BTC-116400-160825");
        assert_eq!(quote.best_bid, Some(dec!(1)));
        assert_eq!(quote.best_ask, None);
    }
}
