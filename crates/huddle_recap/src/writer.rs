//! Plan and article generation with a two-tier prompt ladder.

use crate::prompts::{
    WRITER_SYSTEM, article_prompt, condensed_article_prompt, condensed_plan_prompt, plan_prompt,
};
use huddle_core::{EvidenceSet, GenerateRequest, Message, TruthRecord};
use huddle_error::{HuddleResult, ProviderError, ProviderErrorKind, ProviderKind};
use huddle_interface::GenerationDriver;
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Output budget for a condensed plan prompt.
pub const CONDENSED_PLAN_BUDGET: u32 = 6000;

/// Output budget for a plan.
///
/// ```
/// use huddle_recap::plan_budget;
///
/// assert_eq!(plan_budget("gpt-5-mini"), 8000);
/// assert_eq!(plan_budget("gpt-4o"), 6000);
/// ```
pub fn plan_budget(model: &str) -> u32 {
    if model.contains("gpt-5") { 8000 } else { 6000 }
}

/// Output budget for an article or a patch.
///
/// ```
/// use huddle_recap::article_budget;
///
/// assert_eq!(article_budget("gpt-4o"), 8000);
/// assert_eq!(article_budget("gpt-5"), 4000);
/// ```
pub fn article_budget(model: &str) -> u32 {
    if model.contains("gpt-4") { 8000 } else { 4000 }
}

/// Sends one writer-system prompt and returns the non-blank reply.
pub(crate) async fn complete(
    driver: &dyn GenerationDriver,
    model: &str,
    prompt: String,
    max_tokens: u32,
) -> HuddleResult<String> {
    let request = GenerateRequest::builder()
        .messages(vec![Message::system(WRITER_SYSTEM), Message::user(prompt)])
        .max_tokens(max_tokens)
        .model(model)
        .build()
        .map_err(|e| {
            ProviderError::new(ProviderKind::Writer, ProviderErrorKind::Parse(e.to_string()))
        })?;

    let text = driver.generate(&request).await?.text();
    if text.trim().is_empty() {
        return Err(
            ProviderError::new(ProviderKind::Writer, ProviderErrorKind::EmptyResponse).into(),
        );
    }
    Ok(text.trim().to_string())
}

/// Writes the outline and the article.
///
/// Each call tries the full prompt first. On any failure it retries once
/// with a condensed prompt; a second failure is returned to the caller.
pub struct ArticleWriter {
    driver: Arc<dyn GenerationDriver>,
    plan_model: String,
    write_model: String,
}

impl ArticleWriter {
    /// Creates a writer using `plan_model` for outlines and `write_model` for prose.
    pub fn new(
        driver: Arc<dyn GenerationDriver>,
        plan_model: impl Into<String>,
        write_model: impl Into<String>,
    ) -> Self {
        Self {
            driver,
            plan_model: plan_model.into(),
            write_model: write_model.into(),
        }
    }

    /// Outlines the recap.
    ///
    /// # Errors
    ///
    /// Returns the condensed attempt's error when both attempts fail.
    #[instrument(skip_all, fields(model = %self.plan_model))]
    pub async fn plan(&self, truth: &TruthRecord, evidence: &EvidenceSet) -> HuddleResult<String> {
        let full = match plan_prompt(truth, evidence) {
            Ok(prompt) => {
                let budget = plan_budget(&self.plan_model);
                complete(self.driver.as_ref(), &self.plan_model, prompt, budget).await
            }
            Err(e) => Err(e.into()),
        };
        match full {
            Ok(plan) => {
                info!(chars = plan.len(), "Plan written");
                Ok(plan)
            }
            Err(e) => {
                warn!(error = %e, "Full plan prompt failed, retrying condensed");
                let prompt = condensed_plan_prompt(truth, evidence)?;
                let plan =
                    complete(self.driver.as_ref(), &self.plan_model, prompt, CONDENSED_PLAN_BUDGET)
                        .await?;
                info!(chars = plan.len(), "Condensed plan written");
                Ok(plan)
            }
        }
    }

    /// Writes the article from an outline.
    ///
    /// # Errors
    ///
    /// Returns the condensed attempt's error when both attempts fail.
    #[instrument(skip_all, fields(model = %self.write_model))]
    pub async fn write(
        &self,
        truth: &TruthRecord,
        evidence: &EvidenceSet,
        plan: &str,
    ) -> HuddleResult<String> {
        let budget = article_budget(&self.write_model);
        let full = match article_prompt(truth, evidence, plan) {
            Ok(prompt) => complete(self.driver.as_ref(), &self.write_model, prompt, budget).await,
            Err(e) => Err(e.into()),
        };
        match full {
            Ok(article) => {
                info!(words = article.split_whitespace().count(), "Article written");
                Ok(article)
            }
            Err(e) => {
                warn!(error = %e, "Full article prompt failed, retrying condensed");
                let prompt = condensed_article_prompt(truth, evidence, plan)?;
                let article =
                    complete(self.driver.as_ref(), &self.write_model, prompt, budget).await?;
                info!(
                    words = article.split_whitespace().count(),
                    "Condensed article written"
                );
                Ok(article)
            }
        }
    }
}
