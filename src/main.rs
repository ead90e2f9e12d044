use std::process::ExitCode;

use trade_data_validator::{validate, ValidatorConfig, ValidatorError};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> ExitCode {
    // Load environment variables from .env file (if present)
    dotenvy::dotenv().ok();

    // Initialize tracing; stdout is reserved for the report
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "trade_data_validator=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match run() {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("❌ Validation aborted: {}", e);
            ExitCode::from(e.exit_code())
        }
    }
}

fn run() -> Result<u8, ValidatorError> {
    let config = ValidatorConfig::from_env()?;
    tracing::info!(
        "🗄️  Validating {} (report format: {:?})",
        config.database.display_target(),
        config.report_format
    );

    let report = validate(&config)?;

    match report.render(config.report_format) {
        Ok(rendered) => println!("{}", rendered),
        Err(e) => {
            // Fall back to text so the outcome is never lost
            tracing::warn!("Failed to render report as JSON: {}", e);
            println!("{}", report.render_text());
        }
    }

    Ok(report.outcome().exit_code())
}
