//! Weekly fantasy recap pipeline.
//!
//! Five stages run strictly in order, each caching its artifact in the week
//! directory:
//!
//! 1. [`TruthBuilder`] derives rosters, results and records from the sports API.
//! 2. [`EvidenceGatherer`] researches storyline players, or synthesizes
//!    evidence from the truth record when research fails.
//! 3. [`ArticleWriter::plan`] outlines the recap.
//! 4. [`ArticleWriter::write`] writes it.
//! 5. [`RuleAuditor`] checks the prose and [`ArticlePatcher`] asks for minimal
//!    edits until it passes or attempts run out.
//!
//! [`PipelineOrchestrator`] sequences the stages.
//!
//! ```no_run
//! use huddle_cache::StepCache;
//! use huddle_interface::{ArticleAuditor, GenerationDriver, SportsDataSource};
//! use huddle_rate_limit::ModelConfig;
//! use huddle_recap::{PipelineOrchestrator, RuleAuditor};
//! use std::sync::Arc;
//!
//! # async fn run(
//! #     source: Arc<dyn SportsDataSource>,
//! #     research: Arc<dyn GenerationDriver>,
//! #     writer: Arc<dyn GenerationDriver>,
//! # ) -> Result<(), Box<dyn std::error::Error>> {
//! let auditor: Arc<dyn ArticleAuditor> = Arc::new(RuleAuditor::new()?);
//! let pipeline = PipelineOrchestrator::new(
//!     source,
//!     research,
//!     writer,
//!     auditor,
//!     &ModelConfig::default(),
//!     StepCache::new("out"),
//!     "America/New_York",
//! );
//! let outcome = pipeline.run(5, Some(2024), None, false).await?;
//! println!("{} ({})", outcome.article_path().display(), outcome.audit().status);
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod audit;
mod evidence;
mod extraction;
mod orchestrator;
pub mod prompts;
mod season;
mod selection;
mod truth;
mod writer;

pub use audit::{
    ArticlePatcher, DEFAULT_PATCH_ATTEMPTS, MAX_WORDS, MIN_WORDS, RuleAuditor, word_count,
};
pub use evidence::{
    EvidenceGatherer, RESEARCH_MAX_TOKENS, RESEARCH_TEMPERATURE, synthesize_evidence,
    validate_evidence,
};
pub use extraction::{extract_json, parse_json_response, repair_json};
pub use orchestrator::{PipelineOrchestrator, RecapOutcome, audit_week};
pub use season::{current_season, parse_timezone, season_for_date};
pub use selection::{
    HIGH_IMPACT_POINTS, KeyPlayer, MAX_PER_TEAM, SelectionReason, expected_points, select_all,
    select_key_players,
};
pub use truth::{
    NO_MATCHUP_DATA, NO_ROSTER_DATA, RECORD_COUNT_MISMATCH, RecordLedger, TruthBuilder,
    data_quality_issues, derive_matchups, resolve_team_names, team_name, team_snapshots,
};
pub use writer::{ArticleWriter, CONDENSED_PLAN_BUDGET, article_budget, plan_budget};
