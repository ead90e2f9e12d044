//! Checks over the `trades` table alone

use std::collections::BTreeMap;

use rust_decimal::Decimal;

use crate::models::Trade;
use crate::snapshot::Snapshot;

use super::{
    column_count_findings, display_opt, keys_without_single_value, CheckContext, Finding,
};

/// `trades` has exactly 11 columns
pub fn trades_column_count(snapshot: &Snapshot, _ctx: &CheckContext) -> Vec<Finding> {
    column_count_findings(
        snapshot.trades.name(),
        snapshot.trades.columns(),
        Trade::EXPECTED_COLUMN_COUNT,
    )
}

/// No two trades share a `ticket_hash`
///
/// NULL counts as one distinct value, so two NULL tickets are a duplicate.
pub fn ticket_hash_uniqueness(snapshot: &Snapshot, _ctx: &CheckContext) -> Vec<Finding> {
    let mut counts: BTreeMap<Option<&str>, usize> = BTreeMap::new();
    for trade in snapshot.trades.rows() {
        *counts.entry(trade.ticket_hash.as_deref()).or_insert(0) += 1;
    }

    counts
        .into_iter()
        .filter(|(_, count)| *count > 1)
        .map(|(ticket, count)| {
            Finding::new(
                format!("ticket_hash={}", display_opt(ticket)),
                format!("appears {} times", count),
            )
        })
        .collect()
}

/// No trade has `open_price < 0`
pub fn non_negative_open_price(snapshot: &Snapshot, _ctx: &CheckContext) -> Vec<Finding> {
    offending_trades(snapshot, |t| {
        t.open_price
            .filter(|p| *p < Decimal::ZERO)
            .map(|p| format!("open_price = {}", p))
    })
}

/// No trade has `open_time > close_time`; equal times pass
pub fn open_before_close(snapshot: &Snapshot, _ctx: &CheckContext) -> Vec<Finding> {
    offending_trades(snapshot, |t| {
        if t.opens_after_close() != Some(true) {
            return None;
        }
        Some(format!(
            "open_time {} is after close_time {}",
            display_opt(t.open_time.map(|o| o.to_rfc3339())),
            display_opt(t.close_time.map(|c| c.to_rfc3339()))
        ))
    })
}

/// True when `symbol` is non-empty and purely alphanumeric
pub fn is_alphanumeric_symbol(symbol: &str) -> bool {
    !symbol.is_empty() && symbol.chars().all(char::is_alphanumeric)
}

/// Every `symbol` is non-empty and alphanumeric
///
/// Findings are keyed by the offending symbol value.
pub fn symbol_alphanumeric(snapshot: &Snapshot, _ctx: &CheckContext) -> Vec<Finding> {
    snapshot
        .trades
        .rows()
        .iter()
        .filter(|t| !t.symbol.as_deref().is_some_and(is_alphanumeric_symbol))
        .map(|t| {
            let symbol = match t.symbol.as_deref() {
                Some(s) => format!("{:?}", s),
                None => "NULL".to_string(),
            };
            Finding::new(
                format!("symbol={}", symbol),
                format!("ticket_hash={}", t.ticket_label()),
            )
        })
        .collect()
}

/// No trade has `close_time >= now`
pub fn close_time_in_past(snapshot: &Snapshot, ctx: &CheckContext) -> Vec<Finding> {
    offending_trades(snapshot, |t| {
        t.close_time.filter(|close| *close >= ctx.now).map(|close| {
            format!(
                "close_time {} is not before {}",
                close.to_rfc3339(),
                ctx.now.to_rfc3339()
            )
        })
    })
}

/// No trade has `volume <= 0`
pub fn volume_positive(snapshot: &Snapshot, _ctx: &CheckContext) -> Vec<Finding> {
    offending_trades(snapshot, |t| {
        t.volume
            .filter(|v| *v <= Decimal::ZERO)
            .map(|v| format!("volume = {}", v))
    })
}

/// Every `login_hash` trades on exactly one `server_hash`
pub fn user_single_server(snapshot: &Snapshot, _ctx: &CheckContext) -> Vec<Finding> {
    keys_without_single_value(
        snapshot
            .trades
            .rows()
            .iter()
            .map(|t| (t.login_hash.as_deref(), t.server_hash.as_deref())),
        "login_hash",
        "server_hash",
    )
}

/// One finding per trade for which `describe` returns a detail
fn offending_trades<F>(snapshot: &Snapshot, describe: F) -> Vec<Finding>
where
    F: Fn(&Trade) -> Option<String>,
{
    snapshot
        .trades
        .rows()
        .iter()
        .filter_map(|t| {
            describe(t).map(|detail| Finding::new(format!("ticket_hash={}", t.ticket_label()), detail))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::User;
    use crate::testing::fixtures::{base_time, snapshot, TradeBuilder};
    use chrono::Duration;
    use quickcheck::{quickcheck, TestResult};
    use rust_decimal_macros::dec;

    fn ctx() -> CheckContext {
        CheckContext::at_current_time()
    }

    fn trades_snapshot(trades: Vec<Trade>) -> Snapshot {
        snapshot(vec![User::new("a", "USD", 1)], trades)
    }

    #[test]
    fn test_trades_column_count() {
        let s = trades_snapshot(vec![]);
        assert!(trades_column_count(&s, &ctx()).is_empty());
    }

    #[test]
    fn test_ticket_hash_uniqueness() {
        let unique = trades_snapshot(vec![
            TradeBuilder::new("t1", "a").build(),
            TradeBuilder::new("t2", "a").build(),
        ]);
        assert!(ticket_hash_uniqueness(&unique, &ctx()).is_empty());

        let duplicated = trades_snapshot(vec![
            TradeBuilder::new("t1", "a").build(),
            TradeBuilder::new("t2", "a").build(),
            TradeBuilder::new("t1", "a").build(),
        ]);
        let findings = ticket_hash_uniqueness(&duplicated, &ctx());
        assert_eq!(findings, vec![Finding::new("ticket_hash=t1", "appears 2 times")]);
    }

    #[test]
    fn test_null_tickets_count_once() {
        let s = trades_snapshot(vec![
            TradeBuilder::new("t1", "a").ticket_hash(None).build(),
            TradeBuilder::new("t2", "a").ticket_hash(None).build(),
        ]);
        let findings = ticket_hash_uniqueness(&s, &ctx());
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].subject, "ticket_hash=NULL");
    }

    #[test]
    fn test_non_negative_open_price() {
        let s = trades_snapshot(vec![
            TradeBuilder::new("t1", "a").open_price(Some(dec!(0))).build(),
            TradeBuilder::new("t2", "a").open_price(None).build(),
        ]);
        assert!(non_negative_open_price(&s, &ctx()).is_empty());

        let s = trades_snapshot(vec![TradeBuilder::new("t3", "a")
            .open_price(Some(dec!(-0.01)))
            .build()]);
        let findings = non_negative_open_price(&s, &ctx());
        assert_eq!(findings, vec![Finding::new("ticket_hash=t3", "open_price = -0.01")]);
    }

    quickcheck! {
        fn prop_negative_open_price_always_fails(mantissa: i64, scale: u8) -> TestResult {
            if mantissa == 0 || mantissa == i64::MIN {
                return TestResult::discard();
            }
            let price = Decimal::new(-mantissa.abs(), u32::from(scale % 10));
            let s = trades_snapshot(vec![
                TradeBuilder::new("ok", "a").build(),
                TradeBuilder::new("bad", "a").open_price(Some(price)).build(),
            ]);
            let findings = non_negative_open_price(&s, &ctx());
            TestResult::from_bool(findings.len() == 1 && findings[0].subject == "ticket_hash=bad")
        }
    }

    #[test]
    fn test_open_before_close() {
        let t0 = base_time();
        let equal = trades_snapshot(vec![TradeBuilder::new("t1", "a")
            .open_time(Some(t0))
            .close_time(Some(t0))
            .build()]);
        assert!(open_before_close(&equal, &ctx()).is_empty());

        let reversed = trades_snapshot(vec![TradeBuilder::new("t1", "a")
            .open_time(Some(t0 + Duration::seconds(1)))
            .close_time(Some(t0))
            .build()]);
        assert_eq!(open_before_close(&reversed, &ctx()).len(), 1);

        let missing = trades_snapshot(vec![TradeBuilder::new("t1", "a").close_time(None).build()]);
        assert!(open_before_close(&missing, &ctx()).is_empty());
    }

    #[test]
    fn test_alphanumeric_predicate() {
        assert!(is_alphanumeric_symbol("EURUSD"));
        assert!(is_alphanumeric_symbol("XAUUSD2"));
        assert!(!is_alphanumeric_symbol("EUR-USD"));
        assert!(!is_alphanumeric_symbol("EUR USD"));
        assert!(!is_alphanumeric_symbol(""));
    }

    #[test]
    fn test_symbol_alphanumeric_reports_symbols() {
        let s = trades_snapshot(vec![
            TradeBuilder::new("t1", "a").build(),
            TradeBuilder::new("t2", "a").symbol(Some("EUR-USD")).build(),
            TradeBuilder::new("t3", "a").symbol(Some("")).build(),
            TradeBuilder::new("t4", "a").symbol(None).build(),
        ]);
        let findings = symbol_alphanumeric(&s, &ctx());
        assert_eq!(
            findings,
            vec![
                Finding::new("symbol=\"EUR-USD\"", "ticket_hash=t2"),
                Finding::new("symbol=\"\"", "ticket_hash=t3"),
                Finding::new("symbol=NULL", "ticket_hash=t4"),
            ]
        );
    }

    #[test]
    fn test_close_time_in_past_uses_context_time() {
        let t0 = base_time();
        let s = trades_snapshot(vec![TradeBuilder::new("t1", "a")
            .close_time(Some(t0 + Duration::hours(1)))
            .build()]);

        let later = CheckContext::new(t0 + Duration::hours(2));
        assert!(close_time_in_past(&s, &later).is_empty());

        // Closing exactly at the reference time is not in the past
        let at_close = CheckContext::new(t0 + Duration::hours(1));
        assert_eq!(close_time_in_past(&s, &at_close).len(), 1);

        let earlier = CheckContext::new(t0);
        assert_eq!(close_time_in_past(&s, &earlier).len(), 1);
    }

    #[test]
    fn test_volume_positive() {
        let s = trades_snapshot(vec![
            TradeBuilder::new("t1", "a").build(),
            TradeBuilder::new("t2", "a").volume(Some(dec!(0))).build(),
            TradeBuilder::new("t3", "a").volume(Some(dec!(-1.0))).build(),
            TradeBuilder::new("t4", "a").volume(None).build(),
        ]);
        let findings = volume_positive(&s, &ctx());
        assert_eq!(
            findings,
            vec![
                Finding::new("ticket_hash=t2", "volume = 0"),
                Finding::new("ticket_hash=t3", "volume = -1.0"),
            ]
        );
    }

    #[test]
    fn test_user_single_server() {
        let s = trades_snapshot(vec![
            TradeBuilder::new("t1", "a").build(),
            TradeBuilder::new("t2", "a").build(),
            TradeBuilder::new("t3", "b").server_hash(Some("s2")).build(),
        ]);
        assert!(user_single_server(&s, &ctx()).is_empty());

        let s = trades_snapshot(vec![
            TradeBuilder::new("t1", "a").build(),
            TradeBuilder::new("t2", "a").server_hash(Some("s2")).build(),
        ]);
        let findings = user_single_server(&s, &ctx());
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].detail, "2 distinct server_hash values: s1, s2");
    }
}
