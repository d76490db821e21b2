//! CLI command definitions.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Huddle - fact-checked weekly fantasy football recaps
#[derive(Parser, Debug)]
#[command(name = "huddle")]
#[command(about = "Fact-checked weekly fantasy football recaps", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub json_logs: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the full pipeline and write the recap
    Recap {
        #[command(flatten)]
        week: WeekArgs,

        /// Recompute every stage, ignoring cached artifacts
        #[arg(long)]
        force: bool,
    },

    /// Build the truth record and print it as JSON
    Truth {
        #[command(flatten)]
        week: WeekArgs,

        /// Rebuild even if a cached record exists
        #[arg(long)]
        force: bool,
    },

    /// Re-audit the cached article without calling any provider
    Audit {
        /// Week to audit (1-18)
        #[arg(long)]
        week: u32,

        /// Season year; inferred from today's date when omitted
        #[arg(long)]
        season: Option<i32>,

        /// Root of the per-week cache directories
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },
}

/// Week selection and per-run overrides shared by the league commands.
#[derive(Args, Debug, Clone)]
pub struct WeekArgs {
    /// Week to process (1-18)
    #[arg(long)]
    pub week: u32,

    /// Season year; inferred from today's date when omitted
    #[arg(long)]
    pub season: Option<i32>,

    /// IANA timezone used to infer the season
    #[arg(long)]
    pub timezone: Option<String>,

    /// Sleeper league id, overriding the configured one
    #[arg(long)]
    pub league: Option<String>,

    /// Root of the per-week cache directories
    #[arg(long)]
    pub output_dir: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recap_flags_parse() {
        let cli = Cli::parse_from([
            "huddle", "recap", "--week", "5", "--season", "2024", "--league", "42", "--force",
        ]);
        match cli.command {
            Commands::Recap { week, force } => {
                assert_eq!(week.week, 5);
                assert_eq!(week.season, Some(2024));
                assert_eq!(week.league.as_deref(), Some("42"));
                assert!(force);
            }
            other => panic!("unexpected command {:?}", other),
        }
        assert!(!cli.verbose);
    }

    #[test]
    fn global_flags_follow_the_subcommand() {
        let cli = Cli::parse_from(["huddle", "audit", "--week", "3", "--verbose", "--json-logs"]);
        assert!(cli.verbose);
        assert!(cli.json_logs);
        assert!(matches!(cli.command, Commands::Audit { week: 3, season: None, .. }));
    }

    #[test]
    fn week_is_required() {
        assert!(Cli::try_parse_from(["huddle", "truth"]).is_err());
    }

    #[test]
    fn command_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
