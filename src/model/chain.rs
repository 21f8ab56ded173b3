use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use super::contract::Contract;

/// Contracts of a single (nearest) expiry, as handed from the fetcher to the presenter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NearestChain {
    pub underlying: String,
    /// `None` when the exchange lists nothing for the underlying.
    pub expiry: Option<NaiveDate>,
    /// In fetch order.
    pub contracts: Vec<Contract>,
}

impl NearestChain {
    pub fn empty(underlying: impl Into<String>) -> Self {
        NearestChain {
            underlying: underlying.into(),
            expiry: None,
            contracts: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.contracts.is_empty()
    }
}

/// One strike with the mark prices of its Call and Put.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChainRow {
    pub strike: Decimal,
    pub call_mark: Option<Decimal>,
    pub put_mark: Option<Decimal>,
}

/// Display-ready table: rows sorted strictly ascending by strike.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChainTable {
    pub underlying: String,
    pub expiry: Option<NaiveDate>,
    pub fetched_at: DateTime<Utc>,
    pub rows: Vec<ChainRow>,
}

/// What a rendering surface draws.
///
/// An empty chain is `Ready` with no rows; `Unavailable` means the fetch itself failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ChainView {
    Ready(ChainTable),
    Unavailable {
        underlying: String,
        reason: String,
        at: DateTime<Utc>,
    },
}

impl ChainView {
    pub fn underlying(&self) -> &str {
        match self {
            ChainView::Ready(table) => &table.underlying,
            ChainView::Unavailable { underlying, .. } => underlying,
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, ChainView::Ready(_))
    }
}
