//! Huddle CLI binary.
//!
//! This binary provides command-line access to the recap pipeline:
//! - Run the full pipeline for a week
//! - Print the truth record for a week
//! - Re-audit a cached article offline

use clap::Parser;
use std::process::ExitCode;

mod cli;
mod logging;

/// Exit code for a recap kept with a failing audit.
const AUDIT_FAILED: u8 = 2;

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    use cli::{Cli, Commands, run_audit, run_recap, show_truth};

    // Load .env before reading any configuration
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    logging::init_logging(cli.verbose, cli.json_logs)?;

    let audit = match cli.command {
        Commands::Recap { week, force } => run_recap(&week, force).await?,
        Commands::Truth { week, force } => {
            show_truth(&week, force).await?;
            return Ok(ExitCode::SUCCESS);
        }
        Commands::Audit {
            week,
            season,
            output_dir,
        } => run_audit(week, season, output_dir)?,
    };

    if audit.is_pass() {
        Ok(ExitCode::SUCCESS)
    } else {
        tracing::warn!(issues = audit.issues.len(), "Audit failed; article kept for review");
        Ok(ExitCode::from(AUDIT_FAILED))
    }
}
