//! Audit results for generated articles.

use serde::{Deserialize, Serialize};

/// Overall audit verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display)]
pub enum AuditStatus {
    /// No issues found
    #[serde(rename = "PASS")]
    #[strum(serialize = "PASS")]
    Pass,
    /// At least one issue found
    #[serde(rename = "FAIL")]
    #[strum(serialize = "FAIL")]
    Fail,
}

/// Category of an audit finding.
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
)]
pub enum IssueKind {
    /// Named person absent from the evidence set
    #[serde(rename = "player_not_in_step0")]
    #[strum(serialize = "player_not_in_step0")]
    UnknownPlayer,
    /// Player mentioned without their fantasy team nearby
    #[serde(rename = "incorrect_team_attribution")]
    #[strum(serialize = "incorrect_team_attribution")]
    IncorrectTeamAttribution,
    /// Score disagrees with the matchup result
    #[serde(rename = "incorrect_score")]
    #[strum(serialize = "incorrect_score")]
    IncorrectScore,
    /// Record disagrees with the cumulative record
    #[serde(rename = "incorrect_record")]
    #[strum(serialize = "incorrect_record")]
    IncorrectRecord,
    /// Citation number with no matching reference
    #[serde(rename = "invalid_citation")]
    #[strum(serialize = "invalid_citation")]
    InvalidCitation,
    /// Sources section lacks a cited reference
    #[serde(rename = "missing_source_entry")]
    #[strum(serialize = "missing_source_entry")]
    MissingSourceEntry,
    /// Em or en dash outside a numeric range
    #[serde(rename = "em_dashes_found")]
    #[strum(serialize = "em_dashes_found")]
    EmDashes,
    /// Fewer than 900 words
    #[serde(rename = "word_count_low")]
    #[strum(serialize = "word_count_low")]
    WordCountLow,
    /// More than 1500 words
    #[serde(rename = "word_count_high")]
    #[strum(serialize = "word_count_high")]
    WordCountHigh,
    /// Repeated lists without a serial comma
    #[serde(rename = "oxford_comma_missing")]
    #[strum(serialize = "oxford_comma_missing")]
    OxfordCommaMissing,
}

/// One audit finding.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Issue {
    /// Finding category
    #[serde(rename = "type")]
    pub kind: IssueKind,
    /// Offending text
    pub location_snippet: String,
    /// Instruction for the patch step
    pub fix_instruction: String,
}

impl Issue {
    /// Creates an issue.
    pub fn new(
        kind: IssueKind,
        location_snippet: impl Into<String>,
        fix_instruction: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            location_snippet: location_snippet.into(),
            fix_instruction: fix_instruction.into(),
        }
    }
}

/// Verdict plus findings for one article.
///
/// # Examples
///
/// ```
/// use huddle_core::{AuditResult, AuditStatus, Issue, IssueKind};
///
/// assert_eq!(AuditResult::from_issues(vec![]).status, AuditStatus::Pass);
///
/// let failed = AuditResult::from_issues(vec![Issue::new(
///     IssueKind::InvalidCitation,
///     "[3]",
///     "Remove citation [3]",
/// )]);
/// assert!(!failed.is_pass());
/// assert!(failed.has_issue(IssueKind::InvalidCitation));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditResult {
    /// Overall verdict
    pub status: AuditStatus,
    /// Findings; empty on PASS
    #[serde(default)]
    pub issues: Vec<Issue>,
}

impl AuditResult {
    /// PASS when `issues` is empty, FAIL otherwise.
    pub fn from_issues(issues: Vec<Issue>) -> Self {
        let status = if issues.is_empty() {
            AuditStatus::Pass
        } else {
            AuditStatus::Fail
        };
        Self { status, issues }
    }

    /// True on PASS.
    pub fn is_pass(&self) -> bool {
        self.status == AuditStatus::Pass
    }

    /// True when any finding has the given kind.
    pub fn has_issue(&self, kind: IssueKind) -> bool {
        self.issues.iter().any(|i| i.kind == kind)
    }

    /// Findings of the given kind.
    pub fn issues_of(&self, kind: IssueKind) -> impl Iterator<Item = &Issue> {
        self.issues.iter().filter(move |i| i.kind == kind)
    }
}
