use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Call or Put.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionType {
    Call,
    Put,
}

impl fmt::Display for OptionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionType::Call => write!(f, "call"),
            OptionType::Put => write!(f, "put"),
        }
    }
}

/// One exchange-listed option, already coerced out of the exchange's payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contract {
    /// Exchange symbol, e.g. `C-BTC-90000-310125`.
    pub symbol: String,
    pub option_type: OptionType,
    pub strike: Decimal,
    /// Settlement date (UTC).
    pub expiry: NaiveDate,
    /// Exchange reference price. `None` when the exchange omits it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mark_price: Option<Decimal>,
    /// Exact settlement instant, when the exchange reports one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settles_at: Option<DateTime<Utc>>,
}

impl Contract {
    pub fn new(
        symbol: impl Into<String>,
        option_type: OptionType,
        strike: Decimal,
        expiry: NaiveDate,
        mark_price: Option<Decimal>,
    ) -> Self {
        Contract {
            symbol: symbol.into(),
            option_type,
            strike,
            expiry,
            mark_price,
            settles_at: None,
        }
    }

    /// Still tradeable at `now`. Without an exact instant, the whole expiry day counts.
    pub fn is_live(&self, now: DateTime<Utc>) -> bool {
        match self.settles_at {
            Some(at) => at > now,
            None => self.expiry >= now.date_naive(),
        }
    }
}

/// Best bid / ask snapshot for a single option ticker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TickerQuote {
    pub symbol: String,
    pub best_bid: Option<Decimal>,
    pub best_ask: Option<Decimal>,
    pub mark_price: Option<Decimal>,
}
