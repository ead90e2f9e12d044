//! Checks relating `trades` to `users` through `login_hash`

use std::collections::{BTreeMap, HashSet};

use crate::snapshot::Snapshot;

use super::{display_opt, CheckContext, Finding};

/// Number of trades per `login_hash`, NULL included
fn trades_per_login(snapshot: &Snapshot) -> BTreeMap<Option<&str>, usize> {
    let mut counts = BTreeMap::new();
    for trade in snapshot.trades.rows() {
        *counts.entry(trade.login_hash.as_deref()).or_insert(0) += 1;
    }
    counts
}

/// Every trade's `login_hash` belongs to a known user
///
/// A NULL `login_hash` never matches a user.
pub fn trades_reference_existing_user(snapshot: &Snapshot, _ctx: &CheckContext) -> Vec<Finding> {
    let known: HashSet<&str> = snapshot
        .users
        .rows()
        .iter()
        .filter_map(|u| u.login_hash.as_deref())
        .collect();

    trades_per_login(snapshot)
        .into_iter()
        .filter(|(login, _)| !login.is_some_and(|l| known.contains(l)))
        .map(|(login, count)| {
            Finding::new(
                format!("login_hash={}", display_opt(login)),
                format!("{} trade(s) reference an unknown user", count),
            )
        })
        .collect()
}

/// No disabled user (`enable == 0`) has any trade
///
/// A login hash counts as disabled if any of its user rows is disabled.
pub fn no_trades_for_disabled_user(snapshot: &Snapshot, _ctx: &CheckContext) -> Vec<Finding> {
    let disabled: HashSet<&str> = snapshot
        .users
        .rows()
        .iter()
        .filter(|u| u.is_disabled())
        .filter_map(|u| u.login_hash.as_deref())
        .collect();

    if disabled.is_empty() {
        return Vec::new();
    }

    trades_per_login(snapshot)
        .into_iter()
        .filter_map(|(login, count)| login.filter(|l| disabled.contains(l)).map(|l| (l, count)))
        .map(|(login, count)| {
            Finding::new(
                format!("login_hash={}", login),
                format!("disabled user has {} trade(s)", count),
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::User;
    use crate::testing::fixtures::{snapshot, TradeBuilder};

    fn ctx() -> CheckContext {
        CheckContext::at_current_time()
    }

    #[test]
    fn test_trades_reference_existing_user() {
        let s = snapshot(
            vec![User::new("a", "USD", 1), User::new("b", "USD", 1)],
            vec![TradeBuilder::new("t1", "a").build()],
        );
        assert!(trades_reference_existing_user(&s, &ctx()).is_empty());
    }

    #[test]
    fn test_orphan_trade_fails() {
        let s = snapshot(
            vec![User::new("a", "USD", 1)],
            vec![
                TradeBuilder::new("t1", "a").build(),
                TradeBuilder::new("t2", "ghost").build(),
                TradeBuilder::new("t3", "ghost").build(),
                TradeBuilder::new("t4", "a").login_hash(None).build(),
            ],
        );
        let findings = trades_reference_existing_user(&s, &ctx());
        assert_eq!(
            findings,
            vec![
                Finding::new("login_hash=NULL", "1 trade(s) reference an unknown user"),
                Finding::new("login_hash=ghost", "2 trade(s) reference an unknown user"),
            ]
        );
    }

    #[test]
    fn test_disabled_user_without_trades_passes() {
        let s = snapshot(
            vec![User::new("a", "USD", 1), User::new("b", "USD", 0)],
            vec![TradeBuilder::new("t1", "a").build()],
        );
        assert!(no_trades_for_disabled_user(&s, &ctx()).is_empty());
    }

    #[test]
    fn test_disabled_user_with_trades_fails() {
        let s = snapshot(
            vec![User::new("a", "USD", 1), User::new("b", "USD", 0)],
            vec![
                TradeBuilder::new("t1", "a").build(),
                TradeBuilder::new("t2", "b").build(),
            ],
        );
        let findings = no_trades_for_disabled_user(&s, &ctx());
        assert_eq!(
            findings,
            vec![Finding::new("login_hash=b", "disabled user has 1 trade(s)")]
        );
    }

    #[test]
    fn test_null_flag_is_not_disabled() {
        let unknown = User {
            enable: None,
            ..User::new("a", "USD", 1)
        };
        let s = snapshot(vec![unknown], vec![TradeBuilder::new("t1", "a").build()]);
        assert!(no_trades_for_disabled_user(&s, &ctx()).is_empty());
    }
}
