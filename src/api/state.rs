use std::sync::Arc;

use chrono::Utc;
use tokio::sync::RwLock;
use tracing::debug;

use crate::cache::ChainCache;
use crate::fetch::{ChainFetcher, QuoteSource};
use crate::model::ChainView;
use crate::present;
use crate::render::PageOptions;

#[derive(Clone)]
pub struct AppState {
    pub inner: Arc<RwLock<AppStateInner>>,
}

pub struct AppStateInner {
    pub underlying: String,
    pub fetcher: ChainFetcher,
    pub quotes: Arc<dyn QuoteSource>,
    /// Last fetched view, repainted on page loads until the next refresh.
    pub cache: ChainCache,
    pub page: PageOptions,
}

impl AppState {
    pub fn new(
        underlying: String,
        fetcher: ChainFetcher,
        quotes: Arc<dyn QuoteSource>,
        page: PageOptions,
    ) -> Self {
        Self {
            inner: Arc::new(RwLock::new(AppStateInner {
                underlying,
                fetcher,
                quotes,
                cache: ChainCache::new(),
                page,
            })),
        }
    }

    /// Fetch a fresh chain and store it, unless a newer refresh started meanwhile.
    ///
    /// The state lock is released for the duration of the network call.
    pub async fn refresh(&self) -> ChainView {
        let (ticket, fetcher, underlying) = {
            let mut inner = self.inner.write().await;
            let ticket = inner.cache.begin_fetch();
            (ticket, inner.fetcher.clone(), inner.underlying.clone())
        };

        let outcome = fetcher.fetch(&underlying).await;
        let view = present::present_outcome(&underlying, outcome, Utc::now());

        let mut inner = self.inner.write().await;
        if inner.cache.complete(ticket, view.clone()) {
            view
        } else {
            debug!(
                generation = ticket.generation(),
                "discarding result of superseded refresh"
            );
            inner.cache.current().cloned().unwrap_or(view)
        }
    }

    /// Cached view if there is one, otherwise fetch now.
    pub async fn current_or_refresh(&self) -> ChainView {
        if let Some(view) = self.inner.read().await.cache.current().cloned() {
            return view;
        }
        self.refresh().await
    }

    pub async fn page_options(&self) -> PageOptions {
        self.inner.read().await.page
    }

    pub async fn quote_source(&self) -> Arc<dyn QuoteSource> {
        self.inner.read().await.quotes.clone()
    }
}
