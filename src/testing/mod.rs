//! Fixture builders for exercising checks without a database
//!
//! Used by the unit tests, the integration tests and anyone embedding the
//! checks in their own test suite.

pub mod fixtures;
pub mod scenarios;

pub use fixtures::{snapshot, trades_table, users_table, TradeBuilder};
pub use scenarios::TestScenario;
