//! Folding same-expiry contracts into strike rows.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tracing::warn;

use crate::fetch::FetchError;
use crate::model::{ChainRow, ChainTable, ChainView, Contract, NearestChain, OptionType};

#[derive(Default)]
struct StrikeSlot<'a> {
    call: Option<&'a Contract>,
    put: Option<&'a Contract>,
}

/// Pair Calls and Puts by strike, sorted ascending.
///
/// A strike appears once if at least one contract lists it. When the same strike and
/// type is listed twice, the later contract wins.
pub fn build_rows(contracts: &[Contract]) -> Vec<ChainRow> {
    let mut slots: BTreeMap<Decimal, StrikeSlot<'_>> = BTreeMap::new();

    for contract in contracts {
        let slot = slots.entry(contract.strike.normalize()).or_default();
        let side = match contract.option_type {
            OptionType::Call => &mut slot.call,
            OptionType::Put => &mut slot.put,
        };
        if let Some(previous) = side.replace(contract) {
            warn!(
                strike = %contract.strike,
                option_type = %contract.option_type,
                replaced = %previous.symbol,
                by = %contract.symbol,
                "duplicate listing, keeping the later one"
            );
        }
    }

    slots
        .into_iter()
        .map(|(strike, slot)| ChainRow {
            strike,
            call_mark: slot.call.and_then(|c| c.mark_price),
            put_mark: slot.put.and_then(|c| c.mark_price),
        })
        .collect()
}

pub fn present(chain: NearestChain, fetched_at: DateTime<Utc>) -> ChainTable {
    let rows = build_rows(&chain.contracts);
    ChainTable {
        underlying: chain.underlying,
        expiry: chain.expiry,
        fetched_at,
        rows,
    }
}

/// Turn a fetch outcome into something a surface can draw. Failures become `Unavailable`.
pub fn present_outcome(
    underlying: &str,
    outcome: Result<NearestChain, FetchError>,
    at: DateTime<Utc>,
) -> ChainView {
    match outcome {
        Ok(chain) => ChainView::Ready(present(chain, at)),
        Err(e) => ChainView::Unavailable {
            underlying: underlying.to_string(),
            reason: e.to_string(),
            at,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn expiry() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 31).unwrap()
    }

    fn call(strike: Decimal, mark: Option<Decimal>) -> Contract {
        Contract::new(format!("C-BTC-{strike}-310125"), OptionType::Call, strike, expiry(), mark)
    }

    fn put(strike: Decimal, mark: Option<Decimal>) -> Contract {
        Contract::new(format!("P-BTC-{strike}-310125"), OptionType::Put, strike, expiry(), mark)
    }

    fn row(strike: Decimal, call_mark: Option<Decimal>, put_mark: Option<Decimal>) -> ChainRow {
        ChainRow {
            strike,
            call_mark,
            put_mark,
        }
    }

    #[test]
    fn pairs_call_and_put_at_same_strike() {
        let rows = build_rows(&[
            call(dec!(30000), Some(dec!(0.05))),
            put(dec!(30000), Some(dec!(0.04))),
        ]);
        assert_eq!(rows, vec![row(dec!(30000), Some(dec!(0.05)), Some(dec!(0.04)))]);
    }

    #[test]
    fn lone_call_leaves_put_blank() {
        let rows = build_rows(&[call(dec!(32000), Some(dec!(0.02)))]);
        assert_eq!(rows, vec![row(dec!(32000), Some(dec!(0.02)), None)]);
    }

    #[test]
    fn empty_input_gives_no_rows() {
        assert!(build_rows(&[]).is_empty());
    }

    #[test]
    fn sorted_strictly_ascending_one_row_per_strike() {
        let contracts = vec![
            put(dec!(35000), Some(dec!(3))),
            call(dec!(28000), Some(dec!(1))),
            call(dec!(35000), None),
            put(dec!(28000), Some(dec!(2))),
            call(dec!(31000.5), Some(dec!(4))),
        ];
        let rows = build_rows(&contracts);
        let strikes: Vec<_> = rows.iter().map(|r| r.strike).collect();
        assert_eq!(strikes, vec![dec!(28000), dec!(31000.5), dec!(35000)]);
        assert!(rows.windows(2).all(|w| w[0].strike < w[1].strike));

        let mut reversed = contracts.clone();
        reversed.reverse();
        assert_eq!(build_rows(&reversed), rows);
    }

    #[test]
    fn equal_strikes_with_different_scale_share_a_row() {
        let rows = build_rows(&[
            call(dec!(30000), Some(dec!(1))),
            put(dec!(30000.00), Some(dec!(2))),
        ]);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].call_mark, Some(dec!(1)));
        assert_eq!(rows[0].put_mark, Some(dec!(2)));
    }

    #[test]
    fn duplicate_listing_last_write_wins() {
        let rows = build_rows(&[
            call(dec!(30000), Some(dec!(0.05))),
            call(dec!(30000), Some(dec!(0.07))),
        ]);
        assert_eq!(rows, vec![row(dec!(30000), Some(dec!(0.07)), None)]);

        // A later listing without a mark still replaces the earlier one.
        let rows = build_rows(&[
            put(dec!(30000), Some(dec!(0.05))),
            put(dec!(30000), None),
        ]);
        assert_eq!(rows, vec![row(dec!(30000), None, None)]);
    }

    #[test]
    fn strike_with_unpriced_contracts_still_gets_a_row() {
        let rows = build_rows(&[call(dec!(40000), None), put(dec!(40000), None)]);
        assert_eq!(rows, vec![row(dec!(40000), None, None)]);
    }

    #[test]
    fn outcome_maps_to_view() {
        let at = Utc::now();
        let ready = present_outcome("BTC", Ok(NearestChain::empty("BTC")), at);
        match &ready {
            ChainView::Ready(table) => assert!(table.rows.is_empty()),
            other => panic!("expected ready, got {other:?}"),
        }

        let down = present_outcome(
            "BTC",
            Err(FetchError::Rejected("rate_limited".into())),
            at,
        );
        assert_eq!(
            down,
            ChainView::Unavailable {
                underlying: "BTC".into(),
                reason: "exchange rejected request: rate_limited".into(),
                at,
            }
        );
    }
}
