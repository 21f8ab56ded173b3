pub mod delta;
pub mod error;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::model::{Contract, NearestChain, TickerQuote};

pub use delta::DeltaExchange;
pub use error::FetchError;

// ── Source trait ────────────────────────────────────────────────────

/// Where listed option contracts come from.
///
/// The exchange binding implements this; tests and alternative feeds can plug in their own.
#[async_trait]
pub trait ChainSource: Send + Sync {
    fn name(&self) -> &str;

    /// Every currently listed option contract for `underlying`, in exchange order.
    async fn listed_contracts(&self, underlying: &str) -> Result<Vec<Contract>, FetchError>;
}

/// Single-ticker lookup (best bid / ask).
#[async_trait]
pub trait QuoteSource: Send + Sync {
    async fn quote(&self, symbol: &str) -> Result<TickerQuote, FetchError>;
}

// ── Fetcher ─────────────────────────────────────────────────────────

/// Fetches the listing and narrows it to the nearest expiry.
#[derive(Clone)]
pub struct ChainFetcher {
    source: Arc<dyn ChainSource>,
}

impl ChainFetcher {
    pub fn new(source: Arc<dyn ChainSource>) -> Self {
        ChainFetcher { source }
    }

    pub async fn fetch(&self, underlying: &str) -> Result<NearestChain, FetchError> {
        self.fetch_as_of(underlying, Utc::now()).await
    }

    /// Same as [`fetch`](Self::fetch) with an explicit "now" for expiry filtering.
    pub async fn fetch_as_of(
        &self,
        underlying: &str,
        now: DateTime<Utc>,
    ) -> Result<NearestChain, FetchError> {
        let underlying = normalize_underlying(underlying);
        let contracts = match self.source.listed_contracts(&underlying).await {
            Ok(c) => c,
            Err(e) => {
                warn!(
                    source = self.source.name(),
                    underlying = %underlying,
                    kind = e.kind(),
                    "chain fetch failed: {e}"
                );
                return Err(e);
            }
        };

        let listed = contracts.len();
        let chain = select_nearest(&underlying, contracts, now);
        info!(
            source = self.source.name(),
            underlying = %underlying,
            listed,
            expiry = ?chain.expiry,
            kept = chain.contracts.len(),
            "fetched chain"
        );
        Ok(chain)
    }
}

pub fn normalize_underlying(underlying: &str) -> String {
    underlying.trim().to_uppercase()
}

/// Keep only the live contracts of the soonest expiry.
///
/// A contract settled before `now` is discarded (see [`Contract::is_live`]); fetch order is
/// preserved.
pub fn select_nearest(underlying: &str, contracts: Vec<Contract>, now: DateTime<Utc>) -> NearestChain {
    let nearest = contracts
        .iter()
        .filter(|c| c.is_live(now))
        .map(|c| c.expiry)
        .min();

    let Some(expiry) = nearest else {
        if !contracts.is_empty() {
            debug!(count = contracts.len(), "all listed contracts already expired");
        }
        return NearestChain::empty(underlying);
    };

    NearestChain {
        underlying: underlying.to_string(),
        expiry: Some(expiry),
        contracts: contracts
            .into_iter()
            .filter(|c| c.expiry == expiry && c.is_live(now))
            .collect(),
    }
}
