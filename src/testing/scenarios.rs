use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::User;
use crate::snapshot::Snapshot;

use super::fixtures::{base_time, snapshot, TradeBuilder};

/// Pre-defined data sets, each breaking (at most) one invariant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TestScenario {
    /// One enabled user with one closed trade
    AllValid,
    /// Same as `AllValid` with a volume of -1.0
    NegativeVolume,
    /// Two trades share a ticket hash
    DuplicateTicket,
    /// A user listed with two currencies
    MixedCurrency,
    /// A trade whose login hash has no user
    OrphanTrade,
    /// A disabled user still has a trade
    DisabledUserTrading,
    /// Symbols with punctuation and an empty symbol
    BadSymbols,
    /// A trade closing before it opens
    OpenAfterClose,
    /// A trade closing in the future
    FutureClose,
}

impl TestScenario {
    pub const ALL: [TestScenario; 9] = [
        TestScenario::AllValid,
        TestScenario::NegativeVolume,
        TestScenario::DuplicateTicket,
        TestScenario::MixedCurrency,
        TestScenario::OrphanTrade,
        TestScenario::DisabledUserTrading,
        TestScenario::BadSymbols,
        TestScenario::OpenAfterClose,
        TestScenario::FutureClose,
    ];

    /// Build the snapshot for this scenario
    pub fn snapshot(self) -> Snapshot {
        let user = User::new("a", "USD", 1);
        let trade = TradeBuilder::new("t1", "a");

        match self {
            TestScenario::AllValid => snapshot(vec![user], vec![trade.build()]),
            TestScenario::NegativeVolume => snapshot(
                vec![user],
                vec![trade.volume(Some(Decimal::new(-10, 1))).build()],
            ),
            TestScenario::DuplicateTicket => snapshot(
                vec![user],
                vec![trade.clone().build(), trade.build()],
            ),
            TestScenario::MixedCurrency => snapshot(
                vec![user, User::new("a", "EUR", 1)],
                vec![trade.build()],
            ),
            TestScenario::OrphanTrade => snapshot(
                vec![user],
                vec![
                    trade.build(),
                    TradeBuilder::new("t2", "ghost").build(),
                ],
            ),
            TestScenario::DisabledUserTrading => snapshot(
                vec![user, User::new("b", "USD", 0)],
                vec![trade.build(), TradeBuilder::new("t2", "b").build()],
            ),
            TestScenario::BadSymbols => snapshot(
                vec![user],
                vec![
                    trade.build(),
                    TradeBuilder::new("t2", "a").symbol(Some("EUR-USD")).build(),
                    TradeBuilder::new("t3", "a").symbol(Some("")).build(),
                ],
            ),
            TestScenario::OpenAfterClose => snapshot(
                vec![user],
                vec![trade
                    .close_time(Some(base_time() - Duration::minutes(5)))
                    .build()],
            ),
            TestScenario::FutureClose => snapshot(
                vec![user],
                vec![trade
                    .close_time(Some(Utc::now() + Duration::days(365)))
                    .build()],
            ),
        }
    }

    /// Names of the checks this scenario is expected to fail
    pub fn expected_failures(self) -> &'static [&'static str] {
        match self {
            TestScenario::AllValid => &[],
            TestScenario::NegativeVolume => &["volume_positive"],
            TestScenario::DuplicateTicket => &["ticket_hash_uniqueness"],
            TestScenario::MixedCurrency => &["user_single_currency"],
            TestScenario::OrphanTrade => &["trades_reference_existing_user"],
            TestScenario::DisabledUserTrading => &["no_trades_for_disabled_user"],
            TestScenario::BadSymbols => &["symbol_alphanumeric"],
            TestScenario::OpenAfterClose => &["open_before_close"],
            TestScenario::FutureClose => &["close_time_in_past"],
        }
    }
}
