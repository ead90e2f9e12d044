// Library Crate Root
//
// The binary in main.rs goes through this public API like any other user:
// load a snapshot, run the registry through a Reporter, render the report.
pub mod checks;
pub mod config;
pub mod database;
pub mod errors;
pub mod models;
pub mod report;
pub mod snapshot;
pub mod testing;

// pub use = re-export at crate root
pub use checks::{CheckContext, CheckRegistry, Finding};
pub use config::{ReportFormat, ValidatorConfig};
pub use database::load_snapshot;
pub use errors::{SchemaError, ValidatorError};
pub use models::{Trade, User};
pub use report::{CheckStatus, Report, Reporter, RunOutcome};
pub use snapshot::{Snapshot, Table};

/// Load both tables with `config` and run every standard check
pub fn validate(config: &ValidatorConfig) -> Result<Report, ValidatorError> {
    let snapshot = load_snapshot(config)?;
    let reporter = Reporter::new(CheckRegistry::standard(), config.sample_limit);
    Ok(reporter.run(&snapshot, &CheckContext::at_current_time()))
}
