//! Huddle - fact-checked weekly fantasy football recaps
//!
//! Huddle turns one week of a Sleeper league into a power-rankings recap.
//! Scores, records and rosters come from the league API and are treated as
//! ground truth; a research model gathers player context, a writing model
//! outlines and writes the article, and a rule-based auditor checks every
//! score, record, player and citation before the text is accepted.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use huddle::{
//!     CostLedger, HuddleConfig, PipelineOrchestrator, ResearchDriver, RuleAuditor,
//!     SleeperClient, StepCache, WriterDriver,
//! };
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = HuddleConfig::load()?;
//!     let ledger = Arc::new(CostLedger::new(config.pricing.clone()));
//!
//!     let pipeline = PipelineOrchestrator::new(
//!         Arc::new(SleeperClient::from_config(&config)?),
//!         Arc::new(ResearchDriver::from_config(&config, ledger.clone())?),
//!         Arc::new(WriterDriver::from_config(&config, ledger.clone())?),
//!         Arc::new(RuleAuditor::new()?),
//!         &config.models,
//!         StepCache::new(&config.output_dir),
//!         config.timezone.clone(),
//!     );
//!
//!     let outcome = pipeline.run(5, None, None, false).await?;
//!     println!("{} ({})", outcome.article_path().display(), outcome.audit().status);
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! - `huddle_error` - Error types
//! - `huddle_core` - Truth, evidence and audit data model
//! - `huddle_interface` - Driver, data source and auditor traits
//! - `huddle_rate_limit` - Configuration, request pacing and retry
//! - `huddle_models` - Research and writer provider drivers
//! - `huddle_sleeper` - Sleeper league client
//! - `huddle_cache` - Per-week artifact cache
//! - `huddle_recap` - The five-stage recap pipeline
//!
//! This crate (`huddle`) re-exports everything for convenience.

pub use huddle_core::*;
pub use huddle_error::*;
pub use huddle_interface::*;

pub use huddle_cache::{StepCache, WeekCache};
pub use huddle_models::{CostEntry, CostLedger, ResearchDriver, WriterDriver};
pub use huddle_rate_limit::{
    Credentials, EndpointConfig, HuddleConfig, ModelConfig, ModelPricing, RetryPolicy,
};
pub use huddle_recap::{
    ArticlePatcher, ArticleWriter, EvidenceGatherer, PipelineOrchestrator, RecapOutcome,
    RuleAuditor, TruthBuilder, audit_week, current_season,
};
pub use huddle_sleeper::SleeperClient;
