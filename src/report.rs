//! Running the registry and reporting the outcome

use std::fmt::Write as _;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::checks::{CheckContext, CheckGroup, CheckRegistry, Finding};
use crate::config::ReportFormat;
use crate::snapshot::{Snapshot, Table};

/// Outcome of a single check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckStatus {
    Passed,
    /// The data violates the invariant
    Failed,
    /// The check could not run (e.g. a column it reads is missing)
    Error,
}

impl CheckStatus {
    pub fn label(&self) -> &'static str {
        match self {
            CheckStatus::Passed => "PASS",
            CheckStatus::Failed => "FAIL",
            CheckStatus::Error => "ERROR",
        }
    }
}

/// Result of one check
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckResult {
    pub name: String,
    pub group: CheckGroup,
    pub description: String,
    pub status: CheckStatus,
    /// Number of offending items, before sampling
    pub total_findings: usize,
    /// At most `sample_limit` findings
    pub findings: Vec<Finding>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Shape of a loaded table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSummary {
    pub name: String,
    pub columns: usize,
    pub rows: usize,
}

impl<R> From<&Table<R>> for TableSummary {
    fn from(table: &Table<R>) -> Self {
        Self {
            name: table.name().to_string(),
            columns: table.column_count(),
            rows: table.row_count(),
        }
    }
}

/// Overall result of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunOutcome {
    Passed,
    Failed,
}

impl RunOutcome {
    /// `0` when every check passed, `1` otherwise
    pub fn exit_code(&self) -> u8 {
        match self {
            RunOutcome::Passed => 0,
            RunOutcome::Failed => 1,
        }
    }
}

/// Final report of a validation run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    pub generated_at: DateTime<Utc>,
    /// When both tables were read from the database
    pub loaded_at: DateTime<Utc>,
    pub users: TableSummary,
    pub trades: TableSummary,
    pub passed: usize,
    pub failed: usize,
    pub errored: usize,
    pub outcome: RunOutcome,
    pub results: Vec<CheckResult>,
}

impl Report {
    pub fn outcome(&self) -> RunOutcome {
        self.outcome
    }

    pub fn result(&self, name: &str) -> Option<&CheckResult> {
        self.results.iter().find(|r| r.name == name)
    }

    /// Names of the checks that did not pass, in report order
    pub fn unsuccessful_checks(&self) -> Vec<&str> {
        self.results
            .iter()
            .filter(|r| r.status != CheckStatus::Passed)
            .map(|r| r.name.as_str())
            .collect()
    }

    pub fn render(&self, format: ReportFormat) -> Result<String, serde_json::Error> {
        match format {
            ReportFormat::Text => Ok(self.render_text()),
            ReportFormat::Json => self.render_json(),
        }
    }

    pub fn render_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Human-readable report, one line per check plus findings of failures
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        let width = self
            .results
            .iter()
            .map(|r| r.group.as_str().len() + 1 + r.name.len())
            .max()
            .unwrap_or(0);

        let _ = writeln!(
            out,
            "Data quality report ({})",
            self.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
        );
        let _ = writeln!(
            out,
            "  snapshot loaded at {}",
            self.loaded_at.format("%Y-%m-%d %H:%M:%S UTC")
        );
        for table in [&self.users, &self.trades] {
            let _ = writeln!(
                out,
                "  {}: {} rows, {} columns",
                table.name, table.rows, table.columns
            );
        }
        out.push('\n');

        for result in &self.results {
            let label = format!("{}.{}", result.group.as_str(), result.name);
            let _ = write!(out, "{:<width$}  {}", label, result.status.label(), width = width);
            match result.status {
                CheckStatus::Passed => {}
                CheckStatus::Failed => {
                    let _ = write!(out, "  ({} offending)", result.total_findings);
                }
                CheckStatus::Error => {
                    if let Some(error) = &result.error {
                        let _ = write!(out, "  {}", error);
                    }
                }
            }
            out.push('\n');

            for finding in &result.findings {
                let _ = writeln!(out, "    {}: {}", finding.subject, finding.detail);
            }
            let hidden = result.total_findings.saturating_sub(result.findings.len());
            if hidden > 0 {
                let _ = writeln!(out, "    ... and {} more", hidden);
            }
        }

        let _ = writeln!(
            out,
            "\n{} passed, {} failed, {} errored: {}",
            self.passed,
            self.failed,
            self.errored,
            match self.outcome {
                RunOutcome::Passed => "OK",
                RunOutcome::Failed => "FAILED",
            }
        );
        out
    }
}

/// Runs every registered check and collects the results
///
/// A failing or erroring check never prevents the others from running.
pub struct Reporter {
    registry: CheckRegistry,
    sample_limit: usize,
}

impl Reporter {
    pub fn new(registry: CheckRegistry, sample_limit: usize) -> Self {
        Self {
            registry,
            sample_limit,
        }
    }

    pub fn run(&self, snapshot: &Snapshot, ctx: &CheckContext) -> Report {
        let mut results = Vec::with_capacity(self.registry.len());

        for check in self.registry.iter() {
            let result = match check.evaluate(snapshot, ctx) {
                Ok(findings) if findings.is_empty() => {
                    tracing::debug!(check = check.name, "passed");
                    CheckResult {
                        name: check.name.to_string(),
                        group: check.group,
                        description: check.description.to_string(),
                        status: CheckStatus::Passed,
                        total_findings: 0,
                        findings: Vec::new(),
                        error: None,
                    }
                }
                Ok(mut findings) => {
                    tracing::warn!(
                        check = check.name,
                        offending = findings.len(),
                        "check failed"
                    );
                    let total_findings = findings.len();
                    findings.truncate(self.sample_limit);
                    CheckResult {
                        name: check.name.to_string(),
                        group: check.group,
                        description: check.description.to_string(),
                        status: CheckStatus::Failed,
                        total_findings,
                        findings,
                        error: None,
                    }
                }
                Err(err) => {
                    tracing::error!(check = check.name, "check could not run: {}", err);
                    CheckResult {
                        name: check.name.to_string(),
                        group: check.group,
                        description: check.description.to_string(),
                        status: CheckStatus::Error,
                        total_findings: 0,
                        findings: Vec::new(),
                        error: Some(err.to_string()),
                    }
                }
            };
            results.push(result);
        }

        let count = |status: CheckStatus| results.iter().filter(|r| r.status == status).count();
        let passed = count(CheckStatus::Passed);
        let failed = count(CheckStatus::Failed);
        let errored = count(CheckStatus::Error);
        let outcome = if failed + errored == 0 {
            RunOutcome::Passed
        } else {
            RunOutcome::Failed
        };

        tracing::info!(passed, failed, errored, "Validation finished");

        Report {
            generated_at: ctx.now,
            loaded_at: snapshot.loaded_at,
            users: TableSummary::from(&snapshot.users),
            trades: TableSummary::from(&snapshot.trades),
            passed,
            failed,
            errored,
            outcome,
            results,
        }
    }
}
