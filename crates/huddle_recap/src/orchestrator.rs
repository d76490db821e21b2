//! Sequential recap pipeline over the stage cache.

use crate::{
    ArticlePatcher, ArticleWriter, DEFAULT_PATCH_ATTEMPTS, EvidenceGatherer, TruthBuilder,
    current_season,
};
use derive_getters::Getters;
use huddle_cache::{StepCache, WeekCache};
use huddle_core::{AuditResult, EvidenceSet, RecapStage, TruthRecord};
use huddle_error::{HuddleError, HuddleErrorKind, HuddleResult, RecapError, RecapErrorKind};
use huddle_interface::{ArticleAuditor, GenerationDriver, SportsDataSource, validate_week};
use huddle_rate_limit::ModelConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Final article location and its audit verdict.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Getters)]
pub struct RecapOutcome {
    /// Path of the latest article text
    article_path: PathBuf,
    /// Audit of the text at `article_path`
    audit: AuditResult,
}

/// Attributes a failure to `stage`, leaving stage errors untouched.
fn at_stage(stage: RecapStage) -> impl Fn(HuddleError) -> HuddleError {
    move |e| {
        if matches!(e.kind(), HuddleErrorKind::Recap(_)) {
            e
        } else {
            RecapError::upstream(stage, e).into()
        }
    }
}

/// Runs truth, evidence, plan, article and audit in order.
///
/// Every stage writes its artifact to the week directory. Without `force`,
/// an artifact already on disk is loaded instead of recomputed.
pub struct PipelineOrchestrator {
    truth: TruthBuilder,
    evidence: EvidenceGatherer,
    writer: ArticleWriter,
    auditor: Arc<dyn ArticleAuditor>,
    patcher: ArticlePatcher,
    cache: StepCache,
    default_timezone: String,
    patch_attempts: usize,
}

impl PipelineOrchestrator {
    /// Wires the stages from their collaborators.
    pub fn new(
        source: Arc<dyn SportsDataSource>,
        research: Arc<dyn GenerationDriver>,
        writer: Arc<dyn GenerationDriver>,
        auditor: Arc<dyn ArticleAuditor>,
        models: &ModelConfig,
        cache: StepCache,
        default_timezone: impl Into<String>,
    ) -> Self {
        let default_timezone = default_timezone.into();
        Self {
            truth: TruthBuilder::new(source, default_timezone.clone()),
            evidence: EvidenceGatherer::new(
                research,
                models.research_primary.clone(),
                models.research_fallback.clone(),
            ),
            writer: ArticleWriter::new(writer.clone(), models.plan.clone(), models.write.clone()),
            patcher: ArticlePatcher::new(writer, models.patch.clone(), auditor.clone()),
            auditor,
            cache,
            default_timezone,
            patch_attempts: DEFAULT_PATCH_ATTEMPTS,
        }
    }

    /// Sets the patch attempt bound.
    pub fn with_patch_attempts(mut self, attempts: usize) -> Self {
        self.patch_attempts = attempts;
        self
    }

    /// Cache directory for a week, inferring the season when absent.
    ///
    /// # Errors
    ///
    /// Returns an error for an invalid week or unknown timezone.
    pub fn week_cache(
        &self,
        week: u32,
        season: Option<i32>,
        timezone: Option<&str>,
    ) -> HuddleResult<WeekCache> {
        validate_week(week)?;
        let season = match season {
            Some(season) => season,
            None => current_season(timezone.unwrap_or(&self.default_timezone))?,
        };
        Ok(self.cache.week(season, week))
    }

    /// Runs the whole pipeline for `week`.
    ///
    /// # Errors
    ///
    /// Returns an error naming the failed stage. An audit that still fails
    /// after patching is not an error: it is returned in the outcome.
    #[instrument(skip(self))]
    pub async fn run(
        &self,
        week: u32,
        season: Option<i32>,
        timezone: Option<&str>,
        force: bool,
    ) -> HuddleResult<RecapOutcome> {
        let cache = self.week_cache(week, season, timezone)?;
        info!(dir = %cache.dir().display(), force, "Starting recap");

        let truth = self.truth_stage(&cache, week, timezone, force).await?;
        if !truth.has_week_data() {
            return Err(RecapError::new(RecapStage::Truth, RecapErrorKind::NoWeekData(week)).into());
        }

        let evidence = self.evidence_stage(&cache, &truth, force).await?;
        let plan = self.plan_stage(&cache, &truth, &evidence, force).await?;
        let article = self.article_stage(&cache, &truth, &evidence, &plan, force).await?;
        let audit = self.audit_stage(&cache, &truth, &evidence, article, force).await?;

        let article_path = cache.path(RecapStage::Article);
        info!(
            path = %article_path.display(),
            status = %audit.status,
            "Recap complete"
        );
        Ok(RecapOutcome {
            article_path,
            audit,
        })
    }

    /// Builds (or loads) only the truth record.
    ///
    /// # Errors
    ///
    /// Returns an error for an invalid week, an unknown timezone, or an
    /// upstream failure.
    pub async fn truth(
        &self,
        week: u32,
        season: Option<i32>,
        timezone: Option<&str>,
        force: bool,
    ) -> HuddleResult<TruthRecord> {
        let cache = self.week_cache(week, season, timezone)?;
        self.truth_stage(&cache, week, timezone, force).await
    }

    /// Re-audits the cached article without any provider calls.
    ///
    /// # Errors
    ///
    /// Returns an error when the truth, evidence or article artifact is
    /// missing.
    pub fn audit_cached(&self, week: u32, season: Option<i32>) -> HuddleResult<AuditResult> {
        let cache = self.week_cache(week, season, None)?;
        audit_week(&cache, self.auditor.as_ref())
    }

    async fn truth_stage(
        &self,
        cache: &WeekCache,
        week: u32,
        timezone: Option<&str>,
        force: bool,
    ) -> HuddleResult<TruthRecord> {
        let stage = RecapStage::Truth;
        if !force
            && let Some(truth) = cache.load_json::<TruthRecord>(stage)
        {
            if truth.has_week_data() {
                info!(stage = %stage, "Using cached artifact");
                return Ok(truth);
            }
            warn!(stage = %stage, "Cached truth has no week data, rebuilding");
        }

        let truth = self
            .truth
            .build(week, Some(*cache.season()), timezone)
            .await
            .map_err(at_stage(stage))?;
        cache
            .store_json(stage, &truth)
            .map_err(|e| at_stage(stage)(e.into()))?;
        Ok(truth)
    }

    async fn evidence_stage(
        &self,
        cache: &WeekCache,
        truth: &TruthRecord,
        force: bool,
    ) -> HuddleResult<EvidenceSet> {
        let stage = RecapStage::Evidence;
        if !force
            && let Some(evidence) = cache.load_json::<EvidenceSet>(stage)
            && !evidence.is_empty()
        {
            info!(stage = %stage, "Using cached artifact");
            return Ok(evidence);
        }

        let evidence = self.evidence.gather(truth).await.map_err(at_stage(stage))?;
        cache
            .store_json(stage, &evidence)
            .map_err(|e| at_stage(stage)(e.into()))?;
        Ok(evidence)
    }

    async fn plan_stage(
        &self,
        cache: &WeekCache,
        truth: &TruthRecord,
        evidence: &EvidenceSet,
        force: bool,
    ) -> HuddleResult<String> {
        let stage = RecapStage::Plan;
        if !force && let Some(plan) = cache.load_text(stage) {
            info!(stage = %stage, "Using cached artifact");
            return Ok(plan);
        }

        let plan = self.writer.plan(truth, evidence).await.map_err(at_stage(stage))?;
        cache
            .store_text(stage, &plan)
            .map_err(|e| at_stage(stage)(e.into()))?;
        Ok(plan)
    }

    async fn article_stage(
        &self,
        cache: &WeekCache,
        truth: &TruthRecord,
        evidence: &EvidenceSet,
        plan: &str,
        force: bool,
    ) -> HuddleResult<String> {
        let stage = RecapStage::Article;
        if !force && let Some(article) = cache.load_text(stage) {
            info!(stage = %stage, "Using cached artifact");
            return Ok(article);
        }

        let article = self
            .writer
            .write(truth, evidence, plan)
            .await
            .map_err(at_stage(stage))?;
        cache
            .store_text(stage, &article)
            .map_err(|e| at_stage(stage)(e.into()))?;
        Ok(article)
    }

    async fn audit_stage(
        &self,
        cache: &WeekCache,
        truth: &TruthRecord,
        evidence: &EvidenceSet,
        article: String,
        force: bool,
    ) -> HuddleResult<AuditResult> {
        let stage = RecapStage::Audit;
        if !force
            && let Some(audit) = cache.load_json::<AuditResult>(stage)
            && audit.is_pass()
        {
            info!(stage = %stage, "Using cached PASS audit");
            return Ok(audit);
        }

        let first = self.auditor.audit(&article, truth, evidence);
        let audit = if first.is_pass() {
            first
        } else {
            let (patched, audit) = self
                .patcher
                .patch(&article, &first.issues, truth, evidence, self.patch_attempts)
                .await;
            if patched != article {
                cache
                    .store_text(RecapStage::Article, &patched)
                    .map_err(|e| at_stage(stage)(e.into()))?;
                info!("Article overwritten with patched text");
            }
            audit
        };

        cache
            .store_json(stage, &audit)
            .map_err(|e| at_stage(stage)(e.into()))?;
        if !audit.is_pass() {
            warn!(issues = audit.issues.len(), "Article kept with a FAIL audit");
        }
        Ok(audit)
    }
}

/// Audits the article cached in `cache` and stores the verdict beside it.
///
/// # Errors
///
/// Returns an error when the truth, evidence or article artifact is
/// missing or the verdict cannot be written.
pub fn audit_week(cache: &WeekCache, auditor: &dyn ArticleAuditor) -> HuddleResult<AuditResult> {
    let missing = |stage: RecapStage| {
        RecapError::upstream(
            RecapStage::Audit,
            format!("No usable cached {}", cache.path(stage).display()),
        )
    };
    let truth: TruthRecord = cache
        .load_json(RecapStage::Truth)
        .ok_or_else(|| missing(RecapStage::Truth))?;
    let evidence: EvidenceSet = cache
        .load_json(RecapStage::Evidence)
        .ok_or_else(|| missing(RecapStage::Evidence))?;
    let article = cache
        .load_text(RecapStage::Article)
        .ok_or_else(|| missing(RecapStage::Article))?;

    let audit = auditor.audit(&article, &truth, &evidence);
    cache
        .store_json(RecapStage::Audit, &audit)
        .map_err(|e| at_stage(RecapStage::Audit)(e.into()))?;
    Ok(audit)
}
