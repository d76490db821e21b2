//! End-to-end pipeline tests with mock providers and a temporary cache.

mod test_utils;

use huddle_cache::StepCache;
use huddle_core::{IssueKind, RecapStage};
use huddle_error::{HuddleErrorKind, ProviderKind, RecapErrorKind, SleeperErrorKind};
use huddle_rate_limit::ModelConfig;
use huddle_recap::{
    PipelineOrchestrator, RuleAuditor, TruthBuilder, select_all, synthesize_evidence,
};
use std::sync::Arc;
use tempfile::TempDir;
use test_utils::{FixtureSource, MockDriver, MockResponse, league, passing_article};

const PLAN: &str = "1. Alpha edges Beta\n2. Gamma rests on a bye";

struct Harness {
    source: Arc<FixtureSource>,
    research: Arc<MockDriver>,
    writer: Arc<MockDriver>,
    dir: TempDir,
}

impl Harness {
    fn new(writer: Vec<MockResponse>) -> anyhow::Result<Self> {
        Ok(Self {
            source: Arc::new(league()),
            research: Arc::new(MockDriver::failing(ProviderKind::Research)),
            writer: Arc::new(MockDriver::new(ProviderKind::Writer, writer)),
            dir: TempDir::new()?,
        })
    }

    fn pipeline(&self) -> anyhow::Result<PipelineOrchestrator> {
        Ok(PipelineOrchestrator::new(
            self.source.clone(),
            self.research.clone(),
            self.writer.clone(),
            Arc::new(RuleAuditor::new()?),
            &ModelConfig::default(),
            StepCache::new(self.dir.path()),
            "America/New_York",
        ))
    }

    fn artifact(&self, stage: RecapStage) -> std::path::PathBuf {
        StepCache::new(self.dir.path()).week(2024, 5).path(stage)
    }
}

/// The article the auditor accepts for week 5 with synthesized evidence.
async fn good_article() -> anyhow::Result<String> {
    let truth = TruthBuilder::new(Arc::new(league()), "America/New_York")
        .build(5, Some(2024), None)
        .await?;
    let evidence = synthesize_evidence(&select_all(&truth));
    Ok(passing_article(&truth, &evidence))
}

#[tokio::test]
async fn full_run_writes_every_artifact() -> anyhow::Result<()> {
    let article = good_article().await?;
    let harness = Harness::new(vec![
        MockResponse::Text(PLAN.into()),
        MockResponse::Text(article.clone()),
    ])?;

    let outcome = harness.pipeline()?.run(5, Some(2024), None, false).await?;

    assert!(outcome.audit().is_pass(), "{:?}", outcome.audit().issues);
    assert_eq!(outcome.article_path(), &harness.artifact(RecapStage::Article));
    for stage in [
        RecapStage::Truth,
        RecapStage::Evidence,
        RecapStage::Plan,
        RecapStage::Article,
        RecapStage::Audit,
    ] {
        assert!(harness.artifact(stage).is_file(), "{} artifact", stage);
    }
    assert_eq!(std::fs::read_to_string(harness.artifact(RecapStage::Plan))?, PLAN);
    assert_eq!(
        std::fs::read_to_string(harness.artifact(RecapStage::Article))?,
        article.trim()
    );
    assert_eq!(harness.research.call_count(), 2);
    assert_eq!(harness.writer.call_count(), 2);
    Ok(())
}

#[tokio::test]
async fn rerun_is_served_from_cache() -> anyhow::Result<()> {
    let harness = Harness::new(vec![
        MockResponse::Text(PLAN.into()),
        MockResponse::Text(good_article().await?),
    ])?;
    harness.pipeline()?.run(5, Some(2024), None, false).await?;
    let fetches = harness.source.matchup_calls();

    let outcome = harness.pipeline()?.run(5, Some(2024), None, false).await?;

    assert!(outcome.audit().is_pass());
    assert_eq!(harness.source.matchup_calls(), fetches);
    assert_eq!(harness.research.call_count(), 2);
    assert_eq!(harness.writer.call_count(), 2);
    Ok(())
}

#[tokio::test]
async fn force_recomputes_every_stage() -> anyhow::Result<()> {
    let harness = Harness::new(vec![
        MockResponse::Text(PLAN.into()),
        MockResponse::Text(good_article().await?),
    ])?;
    harness.pipeline()?.run(5, Some(2024), None, false).await?;
    let fetches = harness.source.matchup_calls();

    harness.pipeline()?.run(5, Some(2024), None, true).await?;

    assert!(harness.source.matchup_calls() > fetches);
    assert_eq!(harness.research.call_count(), 4);
    assert_eq!(harness.writer.call_count(), 4);
    Ok(())
}

#[tokio::test]
async fn corrupt_evidence_is_regenerated() -> anyhow::Result<()> {
    let harness = Harness::new(vec![
        MockResponse::Text(PLAN.into()),
        MockResponse::Text(good_article().await?),
    ])?;
    harness.pipeline()?.run(5, Some(2024), None, false).await?;
    std::fs::write(harness.artifact(RecapStage::Evidence), "{ not json")?;

    let outcome = harness.pipeline()?.run(5, Some(2024), None, false).await?;

    assert!(outcome.audit().is_pass());
    assert_eq!(harness.research.call_count(), 4);
    assert_eq!(harness.writer.call_count(), 2);
    let restored = std::fs::read_to_string(harness.artifact(RecapStage::Evidence))?;
    assert!(restored.contains("Josh Allen"));
    Ok(())
}

#[tokio::test]
async fn unplayed_week_is_fatal() -> anyhow::Result<()> {
    let harness = Harness::new(vec![MockResponse::Text(PLAN.into())])?;

    let err = harness
        .pipeline()?
        .run(9, Some(2024), None, false)
        .await
        .unwrap_err();

    assert!(matches!(
        err.kind(),
        HuddleErrorKind::Recap(e)
            if e.stage == RecapStage::Truth && e.kind == RecapErrorKind::NoWeekData(9)
    ));
    assert_eq!(harness.research.call_count(), 0);
    assert_eq!(harness.writer.call_count(), 0);
    Ok(())
}

#[tokio::test]
async fn short_article_is_patched_in_place() -> anyhow::Result<()> {
    let article = good_article().await?;
    let harness = Harness::new(vec![
        MockResponse::Text(PLAN.into()),
        MockResponse::Text("Alpha won. Beta lost.".into()),
        MockResponse::Text(article.clone()),
    ])?;

    let outcome = harness.pipeline()?.run(5, Some(2024), None, false).await?;

    assert!(outcome.audit().is_pass(), "{:?}", outcome.audit().issues);
    assert_eq!(harness.writer.call_count(), 3);
    assert_eq!(
        std::fs::read_to_string(harness.artifact(RecapStage::Article))?,
        article.trim()
    );
    let patch_prompt = &harness.writer.requests()[2].messages[1].content;
    assert!(patch_prompt.contains("Alpha won. Beta lost."));
    Ok(())
}

#[tokio::test]
async fn unfixable_article_is_kept_with_fail() -> anyhow::Result<()> {
    let harness = Harness::new(vec![MockResponse::Text("Alpha won. Beta lost.".into())])?;

    let outcome = harness.pipeline()?.run(5, Some(2024), None, false).await?;

    assert!(!outcome.audit().is_pass());
    assert!(outcome.audit().has_issue(IssueKind::WordCountLow));
    // Plan, article, then two patch attempts.
    assert_eq!(harness.writer.call_count(), 4);
    let stored = std::fs::read_to_string(harness.artifact(RecapStage::Audit))?;
    assert!(stored.contains("FAIL"));

    // A cached FAIL is audited and patched again.
    harness.pipeline()?.run(5, Some(2024), None, false).await?;
    assert_eq!(harness.writer.call_count(), 6);
    Ok(())
}

#[tokio::test]
async fn writer_outage_names_the_stage() -> anyhow::Result<()> {
    let harness = Harness {
        writer: Arc::new(MockDriver::failing(ProviderKind::Writer)),
        ..Harness::new(Vec::new())?
    };

    let err = harness
        .pipeline()?
        .run(5, Some(2024), None, false)
        .await
        .unwrap_err();

    let message = err.to_string();
    assert!(message.contains("plan"), "{}", message);
    assert!(message.contains("OpenAI"), "{}", message);
    // Full prompt, then the condensed retry.
    assert_eq!(harness.writer.call_count(), 2);
    assert!(harness.artifact(RecapStage::Evidence).is_file());
    assert!(!harness.artifact(RecapStage::Plan).exists());
    Ok(())
}

#[tokio::test]
async fn invalid_week_is_rejected_before_any_call() -> anyhow::Result<()> {
    let harness = Harness::new(Vec::new())?;

    let err = harness
        .pipeline()?
        .run(0, Some(2024), None, false)
        .await
        .unwrap_err();

    assert!(matches!(
        err.kind(),
        HuddleErrorKind::Sleeper(e) if e.kind == SleeperErrorKind::InvalidWeek(0)
    ));
    assert_eq!(harness.source.matchup_calls(), 0);
    Ok(())
}

#[tokio::test]
async fn cached_audit_rechecks_article_offline() -> anyhow::Result<()> {
    let harness = Harness::new(vec![
        MockResponse::Text(PLAN.into()),
        MockResponse::Text(good_article().await?),
    ])?;
    let pipeline = harness.pipeline()?;
    pipeline.run(5, Some(2024), None, false).await?;

    std::fs::write(harness.artifact(RecapStage::Article), "Alpha won—barely.")?;
    let audit = pipeline.audit_cached(5, Some(2024))?;

    assert!(audit.has_issue(IssueKind::EmDashes));
    assert!(audit.has_issue(IssueKind::WordCountLow));
    assert_eq!(harness.writer.call_count(), 2);
    let stored = std::fs::read_to_string(harness.artifact(RecapStage::Audit))?;
    assert!(stored.contains("FAIL"));
    Ok(())
}

#[tokio::test]
async fn truth_only_run_caches_the_record() -> anyhow::Result<()> {
    let harness = Harness::new(Vec::new())?;
    let pipeline = harness.pipeline()?;

    let first = pipeline.truth(5, Some(2024), None, false).await?;
    let fetches = harness.source.matchup_calls();
    let second = pipeline.truth(5, Some(2024), None, false).await?;

    assert_eq!(first, second);
    assert_eq!(harness.source.matchup_calls(), fetches);
    assert!(harness.artifact(RecapStage::Truth).is_file());
    assert!(!harness.artifact(RecapStage::Evidence).exists());
    Ok(())
}
