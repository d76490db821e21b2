//! Trait definitions for external collaborators.

use crate::{LeagueInfo, LeagueRoster, LeagueUser, MatchupEntry, PlayerDirectory, Transaction};
use async_trait::async_trait;
use huddle_core::{AuditResult, EvidenceSet, GenerateRequest, GenerateResponse, TruthRecord};
use huddle_error::HuddleResult;
use std::sync::Arc;

/// Core trait that every text generation backend implements.
#[async_trait]
pub trait GenerationDriver: Send + Sync {
    /// Generate model output for a request.
    ///
    /// `req.model`, when set, overrides [`model_name`](Self::model_name).
    async fn generate(&self, req: &GenerateRequest) -> HuddleResult<GenerateResponse>;

    /// Provider name (e.g., "perplexity", "openai").
    fn provider_name(&self) -> &'static str;

    /// Default model identifier.
    fn model_name(&self) -> &str;
}

/// Read access to one fantasy league.
///
/// Implementations report a missing resource with an error for which
/// [`HuddleError::is_not_found`](huddle_error::HuddleError::is_not_found)
/// is true, distinct from every other failure.
#[async_trait]
pub trait SportsDataSource: Send + Sync {
    /// League metadata.
    async fn league(&self) -> HuddleResult<LeagueInfo>;

    /// League members.
    async fn users(&self) -> HuddleResult<Vec<LeagueUser>>;

    /// Current rosters, used for owner lookup.
    async fn rosters(&self) -> HuddleResult<Vec<LeagueRoster>>;

    /// Per-roster scoring entries for a week.
    async fn matchups(&self, week: u32) -> HuddleResult<Vec<MatchupEntry>>;

    /// Completed transactions for a week.
    async fn transactions(&self, week: u32) -> HuddleResult<Vec<Transaction>>;

    /// Player database keyed by player id.
    async fn players(&self) -> HuddleResult<Arc<PlayerDirectory>>;
}

/// Rule-based fact checker for generated articles.
///
/// The matching strategy lives behind this trait so the pipeline does not
/// depend on how names, scores or citations are recognised.
pub trait ArticleAuditor: Send + Sync {
    /// Check `article` against the truth record and evidence set.
    fn audit(&self, article: &str, truth: &TruthRecord, evidence: &EvidenceSet) -> AuditResult;
}
