//! League command handlers.

use super::WeekArgs;
use huddle::{
    AuditResult, CostLedger, HuddleConfig, HuddleResult, JsonError, PipelineOrchestrator,
    RecapStage, ResearchDriver, RuleAuditor, SleeperClient, StepCache, TruthBuilder, WriterDriver,
    audit_week, current_season, validate_week,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, instrument};

/// Loads configuration and applies the per-run flags on top.
fn configure(args: &WeekArgs) -> HuddleResult<HuddleConfig> {
    let mut config = HuddleConfig::load()?;
    if let Some(league) = &args.league {
        config.league_id = Some(league.clone());
    }
    if let Some(tz) = &args.timezone {
        config.timezone = tz.clone();
    }
    if let Some(dir) = &args.output_dir {
        config.output_dir = dir.clone();
    }
    Ok(config)
}

/// Runs the full pipeline and prints where the article landed.
#[instrument(skip_all, fields(week = args.week, force = force))]
pub async fn run_recap(args: &WeekArgs, force: bool) -> HuddleResult<AuditResult> {
    let config = configure(args)?;
    let ledger = Arc::new(CostLedger::new(config.pricing.clone()));

    let pipeline = PipelineOrchestrator::new(
        Arc::new(SleeperClient::from_config(&config)?),
        Arc::new(ResearchDriver::from_config(&config, ledger.clone())?),
        Arc::new(WriterDriver::from_config(&config, ledger.clone())?),
        Arc::new(RuleAuditor::new()?),
        &config.models,
        StepCache::new(&config.output_dir),
        config.timezone.clone(),
    );

    let result = pipeline
        .run(args.week, args.season, args.timezone.as_deref(), force)
        .await;
    info!(
        calls = ledger.entries().len(),
        total_usd = format!("{:.4}", ledger.total_usd()),
        "Estimated provider cost"
    );
    let outcome = result?;

    println!("Article: {}", outcome.article_path().display());
    println!("Audit: {}", outcome.audit().status);
    print_issues(outcome.audit());
    Ok(outcome.audit().clone())
}

/// Builds the truth record and prints it as pretty JSON.
#[instrument(skip_all, fields(week = args.week))]
pub async fn show_truth(args: &WeekArgs, force: bool) -> HuddleResult<()> {
    let config = configure(args)?;
    validate_week(args.week)?;
    let season = match args.season {
        Some(season) => season,
        None => current_season(&config.timezone)?,
    };
    let cache = StepCache::new(&config.output_dir).week(season, args.week);

    let builder = TruthBuilder::new(
        Arc::new(SleeperClient::from_config(&config)?),
        config.timezone.clone(),
    );
    let truth = match cache.load_json(RecapStage::Truth) {
        Some(truth) if !force => truth,
        _ => {
            let truth = builder.build(args.week, Some(season), None).await?;
            cache.store_json(RecapStage::Truth, &truth)?;
            truth
        }
    };

    let json = serde_json::to_string_pretty(&truth)
        .map_err(|e| JsonError::new(format!("Failed to render truth record: {}", e)))?;
    println!("{}", json);
    Ok(())
}

/// Re-audits the cached article offline.
#[instrument(skip_all, fields(week = week))]
pub fn run_audit(
    week: u32,
    season: Option<i32>,
    output_dir: Option<PathBuf>,
) -> HuddleResult<AuditResult> {
    let config = HuddleConfig::load()?;
    validate_week(week)?;
    let season = match season {
        Some(season) => season,
        None => current_season(&config.timezone)?,
    };
    let root = output_dir.unwrap_or(config.output_dir);
    let cache = StepCache::new(root).week(season, week);

    let auditor = RuleAuditor::new()?;
    let audit = audit_week(&cache, &auditor)?;
    println!("Audit: {}", audit.status);
    print_issues(&audit);
    Ok(audit)
}

fn print_issues(audit: &AuditResult) {
    for issue in &audit.issues {
        println!("- [{}] {}", issue.kind, issue.fix_instruction);
        println!("    {}", issue.location_snippet);
    }
}
