use crate::model::ChainView;

/// Handle for an in-flight fetch. Only the most recently issued ticket may complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket {
    generation: u64,
}

impl FetchTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// Last fetched chain view, kept so the page can be repainted without hitting the exchange.
///
/// Owned by whoever serves the view (see `api::state::AppState`). Overlapping fetches resolve
/// last-started-wins: starting a fetch supersedes every earlier ticket, and a superseded
/// ticket's result is dropped when it arrives.
#[derive(Debug, Default)]
pub struct ChainCache {
    issued: u64,
    current: Option<ChainView>,
}

impl ChainCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin_fetch(&mut self) -> FetchTicket {
        self.issued += 1;
        FetchTicket {
            generation: self.issued,
        }
    }

    fn is_current(&self, ticket: FetchTicket) -> bool {
        ticket.generation == self.issued
    }

    /// Store `view` if `ticket` is still the latest one. Returns whether it was stored.
    ///
    /// A stored view replaces the previous entry entirely, including a good chain being
    /// replaced by an unavailable one.
    pub fn complete(&mut self, ticket: FetchTicket, view: ChainView) -> bool {
        if !self.is_current(ticket) {
            return false;
        }
        self.current = Some(view);
        true
    }

    pub fn current(&self) -> Option<&ChainView> {
        self.current.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ChainTable;
    use chrono::Utc;

    fn ready(underlying: &str) -> ChainView {
        ChainView::Ready(ChainTable {
            underlying: underlying.into(),
            expiry: None,
            fetched_at: Utc::now(),
            rows: Vec::new(),
        })
    }

    fn unavailable() -> ChainView {
        ChainView::Unavailable {
            underlying: "BTC".into(),
            reason: "down".into(),
            at: Utc::now(),
        }
    }

    #[test]
    fn starts_empty() {
        let cache = ChainCache::new();
        assert!(cache.current().is_none());
    }

    #[test]
    fn latest_ticket_completes() {
        let mut cache = ChainCache::new();
        let t = cache.begin_fetch();
        assert!(cache.complete(t, ready("BTC")));
        assert_eq!(cache.current().map(|v| v.underlying()), Some("BTC"));
        assert_eq!(t.generation(), 1);
        assert_eq!(cache.begin_fetch().generation(), 2);
    }

    #[test]
    fn superseded_ticket_is_discarded() {
        let mut cache = ChainCache::new();
        let old = cache.begin_fetch();
        let new = cache.begin_fetch();
        assert!(!cache.is_current(old));

        assert!(cache.complete(new, ready("NEW")));
        assert!(!cache.complete(old, ready("OLD")));
        assert_eq!(cache.current().unwrap().underlying(), "NEW");
    }

    #[test]
    fn stale_result_arriving_first_is_also_dropped() {
        let mut cache = ChainCache::new();
        let old = cache.begin_fetch();
        let new = cache.begin_fetch();
        assert!(!cache.complete(old, ready("OLD")));
        assert!(cache.current().is_none());
        assert!(cache.complete(new, ready("NEW")));
    }

    #[test]
    fn each_accepted_fetch_replaces_previous_view() {
        let mut cache = ChainCache::new();
        let t = cache.begin_fetch();
        cache.complete(t, ready("BTC"));

        let t = cache.begin_fetch();
        // The previous view stays paintable while the new fetch is in flight.
        assert!(cache.current().unwrap().is_available());
        cache.complete(t, unavailable());
        assert!(!cache.current().unwrap().is_available());

        let t = cache.begin_fetch();
        cache.complete(t, ready("ETH"));
        assert_eq!(cache.current().unwrap().underlying(), "ETH");
    }
}
