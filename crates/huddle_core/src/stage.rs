//! Pipeline stage identifiers.

use serde::{Deserialize, Serialize};

/// One stage of the weekly recap pipeline.
///
/// Stages run in declaration order. Each one owns a single cached artifact
/// in the week directory.
///
/// # Examples
///
/// ```
/// use huddle_core::RecapStage;
///
/// assert_eq!(RecapStage::Truth.to_string(), "truth");
/// assert_eq!(RecapStage::Article.artifact_name(), "step3_recap.md");
/// ```
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumIter,
    strum::IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum RecapStage {
    /// Ground truth from the sports API
    Truth,
    /// Key-player evidence
    Evidence,
    /// Article outline
    Plan,
    /// Article prose
    Article,
    /// Audit and patch loop
    Audit,
}

impl RecapStage {
    /// File name of the artifact this stage writes.
    pub fn artifact_name(&self) -> &'static str {
        match self {
            RecapStage::Truth => "step0_truth.json",
            RecapStage::Evidence => "step1_evidence.json",
            RecapStage::Plan => "step2_plan.txt",
            RecapStage::Article => "step3_recap.md",
            RecapStage::Audit => "step4_audit.json",
        }
    }

    /// Zero-based position in the pipeline.
    pub fn index(&self) -> usize {
        *self as usize
    }
}
