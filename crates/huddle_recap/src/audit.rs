//! Rule-based article audit and the bounded patch loop.

use crate::prompts::patch_prompt;
use crate::writer::{article_budget, complete};
use huddle_core::{AuditResult, EvidenceSet, Issue, IssueKind, TruthRecord};
use huddle_error::ConfigError;
use huddle_interface::{ArticleAuditor, GenerationDriver};
use regex::Regex;
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Fewest words an article may have.
pub const MIN_WORDS: usize = 900;
/// Most words an article may have.
pub const MAX_WORDS: usize = 1500;
/// Patch attempts made when none are configured.
pub const DEFAULT_PATCH_ATTEMPTS: usize = 2;

const NAME_WINDOW: usize = 100;
const RECORD_WINDOW: usize = 50;
const SCORE_TOLERANCE: f64 = 0.1;
const OXFORD_THRESHOLD: usize = 3;

/// Capitalised words that open or close headings rather than names.
const NON_NAME_WORDS: &[&str] = &[
    "Power", "Rankings", "Week", "Sources", "Sunday", "Monday", "Thursday", "Night", "Football",
    "Sun", "Early", "Late",
];

/// Regex auditor checking prose against the truth record and evidence.
///
/// Checks run independently and every finding lands in one issue list:
/// player-team binding, scores and records, citations, then style.
pub struct RuleAuditor {
    name: Regex,
    score: Regex,
    record: Regex,
    citation: Regex,
    sources: Regex,
    dash: Regex,
    oxford: Regex,
}

impl RuleAuditor {
    /// Compiles the audit patterns.
    ///
    /// # Errors
    ///
    /// Returns an error if a pattern fails to compile.
    pub fn new() -> Result<Self, ConfigError> {
        let compile = |pattern: &str| {
            Regex::new(pattern).map_err(|e| {
                ConfigError::new(format!("Invalid audit pattern '{}': {}", pattern, e))
            })
        };
        Ok(Self {
            name: compile(r"\b[A-Z][a-z]+\s+[A-Z][a-z]+\b")?,
            score: compile(r"([A-Za-z\s]+?)\s*(\d+\.?\d*)[-–—]([A-Za-z\s]+?)\s*(\d+\.?\d*)")?,
            record: compile(r"(\d{1,2}(?:\.5)?)[-–](\d{1,2}(?:\.5)?)")?,
            citation: compile(r"\[(\d+)\]")?,
            sources: compile(
                r"(?im)^[ \t]*(?:#+[ \t]*)?\*{0,2}Sources(?:\*{0,2}[ \t]*:\*{0,2}|\*{0,2}[ \t]*$)",
            )?,
            dash: compile(r"[^0-9\s]([—–])[^0-9\s]")?,
            oxford: compile(r"\w+,\s+\w+\s+and\s+\w+")?,
        })
    }

    /// Offset of the Sources heading and the entries beneath it, if any.
    ///
    /// The heading must open a line; entries run to the next blank line.
    fn sources_section<'a>(&self, article: &'a str) -> Option<(usize, &'a str)> {
        let heading = self.sources.find(article)?;
        let rest = article[heading.end()..].trim_start();
        let entries = rest.find("\n\n").map_or(rest, |end| &rest[..end]);
        Some((heading.start(), entries))
    }

    fn check_players(
        &self,
        article: &str,
        truth: &TruthRecord,
        evidence: &EvidenceSet,
    ) -> Vec<Issue> {
        let body_end = self
            .sources_section(article)
            .map_or(article.len(), |(start, _)| start);
        let body = &article[..body_end];
        let protected: Vec<String> = truth
            .teams
            .iter()
            .map(|t| t.team_name.to_lowercase())
            .chain(truth.league_name.iter().map(|n| n.to_lowercase()))
            .collect();

        let mut issues = Vec::new();
        let mut flagged: BTreeSet<String> = BTreeSet::new();
        for found in self.name.find_iter(body) {
            let candidate = found.as_str();
            let lowered = candidate.to_lowercase();
            if candidate.split_whitespace().any(|w| NON_NAME_WORDS.contains(&w))
                || protected.iter().any(|p| p.contains(&lowered))
                || flagged.contains(candidate)
            {
                continue;
            }

            let (_, context) = window(body, found.start(), found.end(), NAME_WINDOW);
            let owner = evidence
                .player_evidence
                .iter()
                .find(|e| names_match(candidate, &e.player))
                .map(|e| e.team_name.as_str());

            match owner {
                None => {
                    flagged.insert(candidate.to_string());
                    issues.push(Issue::new(
                        IssueKind::UnknownPlayer,
                        context,
                        format!(
                            "Remove or replace '{}' as they don't appear in the week's evidence",
                            candidate
                        ),
                    ));
                }
                Some(team) if !context.to_lowercase().contains(&team.to_lowercase()) => {
                    flagged.insert(candidate.to_string());
                    issues.push(Issue::new(
                        IssueKind::IncorrectTeamAttribution,
                        context,
                        format!(
                            "Ensure '{}' is attributed to '{}' not another team",
                            candidate, team
                        ),
                    ));
                }
                Some(_) => {}
            }
        }
        issues
    }

    fn check_scores(&self, article: &str, truth: &TruthRecord) -> Vec<Issue> {
        let mut issues = Vec::new();
        for caps in self.score.captures_iter(article) {
            let (Some(a_text), Some(a_score), Some(b_text), Some(b_score)) =
                (caps.get(1), caps.get(2), caps.get(3), caps.get(4))
            else {
                continue;
            };
            let (Ok(a_score), Ok(b_score)) =
                (a_score.as_str().parse::<f64>(), b_score.as_str().parse::<f64>())
            else {
                continue;
            };
            let (a_text, b_text) = (a_text.as_str().trim(), b_text.as_str().trim());

            let expected = truth.matchups.iter().find_map(|m| {
                if teams_match(a_text, &m.team_a) && teams_match(b_text, &m.team_b) {
                    Some((m.team_a_score, m.team_b_score))
                } else if teams_match(a_text, &m.team_b) && teams_match(b_text, &m.team_a) {
                    Some((m.team_b_score, m.team_a_score))
                } else {
                    None
                }
            });
            if let Some((want_a, want_b)) = expected
                && ((a_score - want_a).abs() > SCORE_TOLERANCE
                    || (b_score - want_b).abs() > SCORE_TOLERANCE)
            {
                issues.push(Issue::new(
                    IssueKind::IncorrectScore,
                    caps[0].trim(),
                    format!("Correct scores to {}–{}", points(want_a), points(want_b)),
                ));
            }
        }
        issues
    }

    fn check_records(&self, article: &str, truth: &TruthRecord) -> Vec<Issue> {
        let mut issues = Vec::new();
        for found in self.record.find_iter(article) {
            if embedded_in_number(article, found.start(), found.end()) {
                continue;
            }
            let written = found.as_str().replace('–', "-");
            let (lo, context) = window(article, found.start(), found.end(), RECORD_WINDOW);
            let lowered = context.to_lowercase();
            let at = found.start() - lo;

            // Teams named in the context, with their distance to the record.
            let named: Vec<(usize, &str, &str)> = truth
                .records_after_week
                .iter()
                .filter_map(|r| {
                    let needle = r.team_name.to_lowercase();
                    if needle.is_empty() {
                        return None;
                    }
                    lowered
                        .match_indices(&needle)
                        .map(|(pos, _)| pos.abs_diff(at))
                        .min()
                        .map(|distance| (distance, r.team_name.as_str(), r.record.as_str()))
                })
                .collect();

            if named.iter().any(|(_, _, record)| *record == written) {
                continue;
            }
            if let Some((_, team, record)) = named.iter().min_by_key(|(distance, _, _)| *distance) {
                issues.push(Issue::new(
                    IssueKind::IncorrectRecord,
                    context,
                    format!("Correct '{}' record to {}", team, record),
                ));
            }
        }
        issues
    }

    fn check_citations(&self, article: &str, evidence: &EvidenceSet) -> Vec<Issue> {
        let known = evidence.reference_ids();
        let cited: BTreeSet<u32> = self
            .citation
            .captures_iter(article)
            .filter_map(|caps| caps[1].parse().ok())
            .collect();

        let mut issues: Vec<Issue> = cited
            .iter()
            .filter(|id| !known.contains(*id))
            .map(|id| {
                Issue::new(
                    IssueKind::InvalidCitation,
                    format!("[{}]", id),
                    format!("Remove citation [{}] or map to valid reference", id),
                )
            })
            .collect();

        if let Some((_, section)) = self.sources_section(article) {
            for reference in &evidence.references {
                let used = reference.id.as_number().is_some_and(|id| cited.contains(&id));
                if used && !section.contains(&reference.source_line()) {
                    issues.push(Issue::new(
                        IssueKind::MissingSourceEntry,
                        "Sources section",
                        format!("Add or correct source entry: {}", reference.source_line()),
                    ));
                }
            }
        }
        issues
    }

    fn check_style(&self, article: &str) -> Vec<Issue> {
        let mut issues = Vec::new();

        if self.dash.is_match(article) {
            issues.push(Issue::new(
                IssueKind::EmDashes,
                "Multiple locations",
                "Replace em dashes with regular hyphens or rewrite sentences",
            ));
        }

        let words = word_count(article);
        if words < MIN_WORDS {
            issues.push(Issue::new(
                IssueKind::WordCountLow,
                "Overall article",
                format!("Expand article from {} to {}-{} words", words, MIN_WORDS, MAX_WORDS),
            ));
        } else if words > MAX_WORDS {
            issues.push(Issue::new(
                IssueKind::WordCountHigh,
                "Overall article",
                format!("Trim article from {} to {}-{} words", words, MIN_WORDS, MAX_WORDS),
            ));
        }

        let lists: Vec<&str> = self.oxford.find_iter(article).map(|m| m.as_str()).collect();
        if lists.len() > OXFORD_THRESHOLD {
            issues.push(Issue::new(
                IssueKind::OxfordCommaMissing,
                format!("Example: {}", lists[0]),
                "Add Oxford commas before 'and' in lists",
            ));
        }
        issues
    }
}

impl ArticleAuditor for RuleAuditor {
    #[instrument(skip_all, fields(chars = article.len()))]
    fn audit(&self, article: &str, truth: &TruthRecord, evidence: &EvidenceSet) -> AuditResult {
        let mut issues = self.check_players(article, truth, evidence);
        issues.extend(self.check_scores(article, truth));
        issues.extend(self.check_records(article, truth));
        issues.extend(self.check_citations(article, evidence));
        issues.extend(self.check_style(article));

        let result = AuditResult::from_issues(issues);
        info!(status = %result.status, issues = result.issues.len(), "Audit complete");
        result
    }
}

/// Whitespace-separated word count.
///
/// ```
/// use huddle_recap::word_count;
///
/// assert_eq!(word_count("Alpha beat  Beta\nagain"), 4);
/// ```
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Case-insensitive equality or containment either way.
fn names_match(a: &str, b: &str) -> bool {
    let (a, b) = (a.trim().to_lowercase(), b.trim().to_lowercase());
    a == b || a.contains(&b) || b.contains(&a)
}

/// Like [`names_match`], except that empty text never matches.
fn teams_match(text: &str, team: &str) -> bool {
    !text.trim().is_empty() && !team.trim().is_empty() && names_match(text, team)
}

/// `[start - radius, end + radius)` widened to char boundaries, with its offset.
fn window(text: &str, start: usize, end: usize, radius: usize) -> (usize, &str) {
    let mut lo = start.saturating_sub(radius);
    while !text.is_char_boundary(lo) {
        lo -= 1;
    }
    let mut hi = end.saturating_add(radius).min(text.len());
    while !text.is_char_boundary(hi) {
        hi += 1;
    }
    (lo, &text[lo..hi])
}

/// True when the span is part of a longer number such as `120.5-110.0`.
fn embedded_in_number(text: &str, start: usize, end: usize) -> bool {
    let digit = |c: Option<char>| c.is_some_and(|c| c.is_ascii_digit());
    let mut before = text[..start].chars().rev();
    let (prev, prev2) = (before.next(), before.next());
    let mut after = text[end..].chars();
    let (next, next2) = (after.next(), after.next());
    digit(prev)
        || (prev == Some('.') && digit(prev2))
        || digit(next)
        || (next == Some('.') && digit(next2))
}

fn points(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{:.1}", value)
    } else {
        value.to_string()
    }
}

/// Asks the writer model for minimal edits until the article passes.
///
/// Each attempt patches the latest text against the latest issues. A
/// provider failure ends the loop early. The returned result is always a
/// fresh audit of the returned text.
pub struct ArticlePatcher {
    driver: Arc<dyn GenerationDriver>,
    model: String,
    auditor: Arc<dyn ArticleAuditor>,
}

impl ArticlePatcher {
    /// Creates a patcher that edits with `model` and judges with `auditor`.
    pub fn new(
        driver: Arc<dyn GenerationDriver>,
        model: impl Into<String>,
        auditor: Arc<dyn ArticleAuditor>,
    ) -> Self {
        Self {
            driver,
            model: model.into(),
            auditor,
        }
    }

    /// Runs at most `max_attempts` patch calls.
    #[instrument(skip_all, fields(model = %self.model, max_attempts = max_attempts))]
    pub async fn patch(
        &self,
        article: &str,
        issues: &[Issue],
        truth: &TruthRecord,
        evidence: &EvidenceSet,
        max_attempts: usize,
    ) -> (String, AuditResult) {
        let mut current = article.to_string();
        let mut issues = issues.to_vec();

        for attempt in 1..=max_attempts {
            info!(attempt, issues = issues.len(), "Patch attempt");
            let prompt = match patch_prompt(&current, &issues, truth, evidence) {
                Ok(prompt) => prompt,
                Err(e) => {
                    warn!(error = %e, "Could not build patch prompt");
                    break;
                }
            };
            let patched = match complete(
                self.driver.as_ref(),
                &self.model,
                prompt,
                article_budget(&self.model),
            )
            .await
            {
                Ok(text) => text,
                Err(e) => {
                    warn!(attempt, error = %e, "Patch attempt failed");
                    break;
                }
            };

            let audit = self.auditor.audit(&patched, truth, evidence);
            current = patched;
            if audit.is_pass() {
                info!(attempt, "Patched article passes audit");
                return (current, audit);
            }
            debug!(attempt, remaining = audit.issues.len(), "Issues remain after patch");
            issues = audit.issues;
        }

        let audit = self.auditor.audit(&current, truth, evidence);
        if !audit.is_pass() {
            warn!(issues = audit.issues.len(), "Patching exhausted, keeping flagged article");
        }
        (current, audit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use huddle_core::{
        CumulativeRecord, MatchupResult, PlayerEvidence, Reference, ReferenceId, TeamSnapshot,
    };

    fn auditor() -> RuleAuditor {
        RuleAuditor::new().unwrap()
    }

    fn truth() -> TruthRecord {
        let team = |name: &str| TeamSnapshot {
            team_name: name.into(),
            players: Vec::new(),
        };
        TruthRecord {
            league_name: Some("Gridiron League".into()),
            season: 2024,
            week: 5,
            teams: vec![team("Alpha"), team("Beta")],
            matchups: vec![MatchupResult::head_to_head(5, "Alpha", 120.5, "Beta", 110.0)],
            records_after_week: vec![
                CumulativeRecord::from_tally("Alpha", 3, 1, 0, 480.0, 400.0),
                CumulativeRecord::from_tally("Beta", 2, 2, 0, 450.0, 430.0),
            ],
            issues: Vec::new(),
        }
    }

    fn evidence() -> EvidenceSet {
        EvidenceSet {
            player_evidence: vec![PlayerEvidence::new("Josh Allen", "Alpha")],
            references: vec![
                Reference {
                    id: ReferenceId::Number(1),
                    title: "Allen carves up defense".into(),
                    url: "https://espn.com/1".into(),
                    publisher: "ESPN".into(),
                    date: None,
                },
                Reference {
                    id: ReferenceId::Text("2".into()),
                    title: "Week 5 notes".into(),
                    url: "https://nfl.com/2".into(),
                    publisher: "NFL".into(),
                    date: None,
                },
            ],
        }
    }

    fn words(n: usize) -> String {
        vec!["word"; n].join(" ")
    }

    fn audit(article: &str) -> AuditResult {
        auditor().audit(article, &truth(), &evidence())
    }

    #[test]
    fn word_count_boundaries() {
        assert!(audit(&words(899)).has_issue(IssueKind::WordCountLow));
        for n in [900, 1500] {
            let result = audit(&words(n));
            assert!(!result.has_issue(IssueKind::WordCountLow), "{}", n);
            assert!(!result.has_issue(IssueKind::WordCountHigh), "{}", n);
        }
        let high = audit(&words(1501));
        assert!(high.has_issue(IssueKind::WordCountHigh));
        let issue = high.issues_of(IssueKind::WordCountHigh).next().unwrap();
        assert_eq!(issue.fix_instruction, "Trim article from 1501 to 900-1500 words");
    }

    #[test]
    fn unknown_citation_fails() {
        let result = audit(&format!("{} [3] {}", words(500), words(500)));
        assert!(!result.is_pass());
        let issue = result.issues_of(IssueKind::InvalidCitation).next().unwrap();
        assert_eq!(issue.location_snippet, "[3]");
    }

    #[test]
    fn known_citations_pass() {
        let result = audit(&format!("{} [1] and [2] {}", words(500), words(500)));
        assert!(!result.has_issue(IssueKind::InvalidCitation));
    }

    #[test]
    fn sources_section_must_list_cited_references() {
        let body = format!("{} [1] {}", words(500), words(500));
        let missing = audit(&format!(
            "{}\n\nSources:\n[2] NFL — Week 5 notes (https://nfl.com/2)",
            body
        ));
        assert!(missing.has_issue(IssueKind::MissingSourceEntry));

        let listed = audit(&format!(
            "{}\n\nSources:\n[1] ESPN — Allen carves up defense (https://espn.com/1)",
            body
        ));
        assert!(!listed.has_issue(IssueKind::MissingSourceEntry));
        assert!(!listed.has_issue(IssueKind::EmDashes));
    }

    #[test]
    fn scores_and_records_match_truth() {
        let result = audit("Alpha 120.5–Beta 110.0 (3-1 vs 2-2)");
        assert_eq!(result.issues_of(IssueKind::IncorrectScore).count(), 0);
        assert_eq!(result.issues_of(IssueKind::IncorrectRecord).count(), 0);
    }

    #[test]
    fn reversed_pairing_compares_swapped_scores() {
        let result = audit("Beta 110.0–Alpha 120.5");
        assert!(!result.has_issue(IssueKind::IncorrectScore));

        let wrong = audit("Beta 100.0–Alpha 120.5");
        let issue = wrong.issues_of(IssueKind::IncorrectScore).next().unwrap();
        assert_eq!(issue.fix_instruction, "Correct scores to 110.0–120.5");
    }

    #[test]
    fn wrong_record_names_the_closest_team() {
        let result = audit("Beta dropped to 1-3 this week.");
        let issue = result.issues_of(IssueKind::IncorrectRecord).next().unwrap();
        assert_eq!(issue.fix_instruction, "Correct 'Beta' record to 2-2");
    }

    #[test]
    fn records_without_a_team_are_ignored() {
        let result = audit("Someone went 1-3 this week.");
        assert!(!result.has_issue(IssueKind::IncorrectRecord));
    }

    #[test]
    fn player_binding() {
        let good = audit("Alpha rode Josh Allen to the win.");
        assert!(!good.has_issue(IssueKind::UnknownPlayer));
        assert!(!good.has_issue(IssueKind::IncorrectTeamAttribution));

        let stranger = audit("Alpha rode Patrick Mahomes to the win.");
        let issue = stranger.issues_of(IssueKind::UnknownPlayer).next().unwrap();
        assert!(issue.fix_instruction.contains("Patrick Mahomes"));

        let orphan = audit(&format!("Josh Allen was great. {}", words(60)));
        assert!(orphan.has_issue(IssueKind::IncorrectTeamAttribution));
    }

    #[test]
    fn sources_in_prose_does_not_end_the_body() {
        for article in [
            "Team sources say Alpha rode Patrick Mahomes to the win.",
            "Alpha used all its resources. Beta rode Patrick Mahomes to the loss.",
            "Sources close to Beta were stunned.\nAlpha rode Patrick Mahomes to the win.",
        ] {
            let result = audit(article);
            assert!(result.has_issue(IssueKind::UnknownPlayer), "{}", article);
            assert!(!result.has_issue(IssueKind::MissingSourceEntry), "{}", article);
        }
    }

    #[test]
    fn sources_heading_ends_the_body() {
        let body = "Alpha rode Josh Allen to the win [1].";
        for heading in ["Sources:", "## Sources", "**Sources:**"] {
            let article = format!(
                "{}\n\n{}\n[1] ESPN — Allen carves up defense (https://espn.com/1)",
                body, heading
            );
            let result = audit(&article);
            assert!(!result.has_issue(IssueKind::UnknownPlayer), "{}", heading);
            assert!(!result.has_issue(IssueKind::MissingSourceEntry), "{}", heading);
        }
    }

    #[test]
    fn league_name_and_headings_are_not_players() {
        let result = audit("Welcome to Gridiron League and the Power Rankings.");
        assert!(!result.has_issue(IssueKind::UnknownPlayer));
    }

    #[test]
    fn style_checks() {
        let dashes = audit("Alpha won—again.");
        assert!(dashes.has_issue(IssueKind::EmDashes));

        let list = "red, white and blue. ";
        assert!(!audit(&list.repeat(3)).has_issue(IssueKind::OxfordCommaMissing));
        let many = audit(&list.repeat(4));
        let issue = many.issues_of(IssueKind::OxfordCommaMissing).next().unwrap();
        assert_eq!(issue.location_snippet, "Example: red, white and blue");
    }

    #[test]
    fn decimal_scores_are_not_records() {
        let text = "Alpha 120.5-110.0 over Beta";
        assert!(!audit(text).has_issue(IssueKind::IncorrectRecord));
    }
}
