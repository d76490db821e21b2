//! Prompt templates for every generation stage.

use crate::KeyPlayer;
use huddle_core::{CumulativeRecord, EvidenceSet, Issue, MatchupResult, TruthRecord};
use huddle_error::JsonError;
use serde::Serialize;

/// Evidence entries kept in a condensed plan prompt.
pub const CONDENSED_PLAN_PLAYERS: usize = 20;
/// Evidence entries kept in a condensed article prompt.
pub const CONDENSED_ARTICLE_PLAYERS: usize = 15;
/// References kept in any condensed prompt.
pub const CONDENSED_REFERENCES: usize = 3;

/// System message for the research call.
pub const RESEARCH_SYSTEM: &str = "You are a fantasy football research analyst. \
Respond with a single valid JSON object and nothing else: no markdown, no commentary.";

/// System message for the plan, article and patch calls.
pub const WRITER_SYSTEM: &str = "You are an ESPN-style fantasy football columnist writing \
for a league group chat. You never invent players, scores, or records.";

fn pretty<T: Serialize + ?Sized>(value: &T) -> Result<String, JsonError> {
    serde_json::to_string_pretty(value)
        .map_err(|e| JsonError::new(format!("Failed to serialize prompt data: {}", e)))
}

/// Truth without rosters: league, season, week, matchups and records.
#[derive(Debug, Serialize)]
struct CondensedTruth<'a> {
    league_name: Option<&'a str>,
    season: i32,
    week: u32,
    matchups: &'a [MatchupResult],
    records_after_week: &'a [CumulativeRecord],
}

impl<'a> From<&'a TruthRecord> for CondensedTruth<'a> {
    fn from(truth: &'a TruthRecord) -> Self {
        Self {
            league_name: truth.league_name.as_deref(),
            season: truth.season,
            week: truth.week,
            matchups: &truth.matchups,
            records_after_week: &truth.records_after_week,
        }
    }
}

#[derive(Debug, Serialize)]
struct ResearchSubject<'a> {
    name: &'a str,
    team: &'a str,
    position: Option<&'a str>,
    fantasy_points: Option<f64>,
    is_starter: bool,
    storyline: String,
}

fn team_list(truth: &TruthRecord) -> String {
    truth
        .teams
        .iter()
        .map(|t| t.team_name.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Research request listing every selected player.
///
/// # Errors
///
/// Returns an error if the player list cannot be serialized.
pub fn research_prompt(
    truth: &TruthRecord,
    players: &[KeyPlayer<'_>],
) -> Result<String, JsonError> {
    let subjects: Vec<ResearchSubject<'_>> = players
        .iter()
        .map(|k| ResearchSubject {
            name: &k.player.player_name,
            team: k.team_name,
            position: k.player.position.as_deref(),
            fantasy_points: k.player.fantasy_points,
            is_starter: k.player.is_starter,
            storyline: k.reason.to_string(),
        })
        .collect();

    Ok(format!(
        r#"Research these fantasy football players for Week {week} of the {season} NFL season.
Focus on why each one beat or missed expectations: usage, role changes, injuries, game script.

KEY PLAYERS:
{players}

Return JSON with exactly this structure:
{{
  "player_evidence": [
    {{
      "player": "Player Name (exactly as listed above)",
      "team_name": "Fantasy team name (exactly as listed above)",
      "is_starter": true,
      "week_stats": {{"fantasy_points": 15.2, "rushing_yards": 80, "rushing_touchdowns": 1}},
      "projection_context": "How the performance compared to expectations",
      "season_outlook": {{"trajectory": "...", "role_security": "...", "ros_projection": "..."}},
      "injury": {{"status": "healthy"}},
      "opportunity_notes": "...",
      "expert_analysis": "...",
      "advanced_notes": "Why they over or under performed",
      "quotes": [{{"text": "...", "source": "..."}}],
      "kickoff_window": "Sun Early"
    }}
  ],
  "references": [
    {{"id": 1, "title": "Article title", "url": "https://...", "publisher": "ESPN", "date": "{season}-09-15"}}
  ]
}}

RULES:
- Every week_stats value is a number, never a string.
- kickoff_window is one of "TNF", "Sun Early", "Sun Late", "SNF", "MNF".
- team_name must be one of: {teams}.
- Only list references you actually used, with real URLs."#,
        week = truth.week,
        season = truth.season,
        players = pretty(&subjects)?,
        teams = team_list(truth),
    ))
}

/// Outline request over the full truth record and evidence.
///
/// # Errors
///
/// Returns an error if the inputs cannot be serialized.
pub fn plan_prompt(truth: &TruthRecord, evidence: &EvidenceSet) -> Result<String, JsonError> {
    Ok(format!(
        r#"Create a concise plan for a fantasy football recap of Week {week}, {season}.

LEAGUE DATA:
{truth}

PLAYER EVIDENCE:
{evidence}

OUTPUT: a brief numbered plan covering
1. LEDE: the top three storylines of the week
2. MATCHUPS: the key narrative for every matchup, none skipped
3. POWER RANKINGS: how records and points for/against order all {count} teams
4. LENGTH: the finished article runs 900-1500 words

Use only players from the evidence. Keep the plan short."#,
        week = truth.week,
        season = truth.season,
        truth = pretty(truth)?,
        evidence = pretty(evidence)?,
        count = truth.teams.len(),
    ))
}

/// Shortened outline request: rosters dropped, top evidence only.
///
/// # Errors
///
/// Returns an error if the inputs cannot be serialized.
pub fn condensed_plan_prompt(
    truth: &TruthRecord,
    evidence: &EvidenceSet,
) -> Result<String, JsonError> {
    let condensed = evidence.condensed(CONDENSED_PLAN_PLAYERS, CONDENSED_REFERENCES);
    Ok(format!(
        r#"Plan a fantasy football recap for Week {week}, {season} from this key data.

MATCHUPS AND RECORDS:
{truth}

KEY PLAYER EVIDENCE ({shown} of {total} players):
{evidence}

Plan a 900-1500 word recap that:
1. Leads with the biggest storylines in the evidence
2. Gives every matchup its own breakdown
3. Ranks every team in a closing Power Rankings section
4. Has no sources section"#,
        week = truth.week,
        season = truth.season,
        truth = pretty(&CondensedTruth::from(truth))?,
        shown = condensed.player_evidence.len(),
        total = evidence.player_evidence.len(),
        evidence = pretty(&condensed)?,
    ))
}

const ARTICLE_RULES: &str = r#"VOICE: ESPN columnist with group-chat energy, PG-13. Use Oxford commas. Never use em dashes.

PLAYER RULES:
- Mention only players listed in the evidence, with the exact team_name given there.
- Never guess a player's team and never invent stats. If unsure, leave the player out.

CONTENT RULES:
- 900-1500 words.
- Cover every matchup. Each matchup header gives the exact score and both records:
  Team A vs Team B: 120.5-110.0 (3-1 vs 2-2)
- Weave projections vs actual results, injuries, and kickoff timing into the story.
- Cite evidence with [n] only for reference ids that exist; if you cite, end with a
  "Sources:" list formatted as: [n] Publisher — Title (url)
- Close with a "**Power Rankings**" section ranking every team with 1-2 sentences each.
- Output only the article text, no tables."#;

/// Full article request.
///
/// # Errors
///
/// Returns an error if the inputs cannot be serialized.
pub fn article_prompt(
    truth: &TruthRecord,
    evidence: &EvidenceSet,
    plan: &str,
) -> Result<String, JsonError> {
    Ok(format!(
        "Write the Week {week}, {season} recap{league}.\n\n\
         LEAGUE DATA:\n{truth}\n\n\
         PLAYER EVIDENCE:\n{evidence}\n\n\
         PLAN:\n{plan}\n\n\
         TEAMS TO RANK ({count}): {teams}\n\n\
         {rules}",
        week = truth.week,
        season = truth.season,
        league = league_suffix(truth),
        truth = pretty(truth)?,
        evidence = pretty(evidence)?,
        plan = plan.trim(),
        count = truth.teams.len(),
        teams = team_list(truth),
        rules = ARTICLE_RULES,
    ))
}

/// Shortened article request: rosters dropped, top evidence only.
///
/// # Errors
///
/// Returns an error if the inputs cannot be serialized.
pub fn condensed_article_prompt(
    truth: &TruthRecord,
    evidence: &EvidenceSet,
    plan: &str,
) -> Result<String, JsonError> {
    let condensed = evidence.condensed(CONDENSED_ARTICLE_PLAYERS, CONDENSED_REFERENCES);
    Ok(format!(
        "Write the Week {week}, {season} recap{league}.\n\n\
         MATCHUPS AND RECORDS:\n{truth}\n\n\
         KEY PLAYER EVIDENCE:\n{evidence}\n\n\
         PLAN:\n{plan}\n\n\
         TEAMS TO RANK ({count}): {teams}\n\n\
         {rules}",
        week = truth.week,
        season = truth.season,
        league = league_suffix(truth),
        truth = pretty(&CondensedTruth::from(truth))?,
        evidence = pretty(&condensed)?,
        plan = plan.trim(),
        count = truth.teams.len(),
        teams = team_list(truth),
        rules = ARTICLE_RULES,
    ))
}

/// Minimal-edit request for an article that failed audit.
///
/// # Errors
///
/// Returns an error if the inputs cannot be serialized.
pub fn patch_prompt(
    article: &str,
    issues: &[Issue],
    truth: &TruthRecord,
    evidence: &EvidenceSet,
) -> Result<String, JsonError> {
    Ok(format!(
        r#"Patch this article with minimal edits.

ARTICLE TEXT:
{article}

ISSUES TO FIX (type, location_snippet, fix_instruction):
{issues}

LEAGUE DATA:
{truth}

PLAYER EVIDENCE:
{evidence}

TASK:
Make the smallest set of edits that satisfies every fix_instruction. Keep the tone,
length and structure. Add no players or claims beyond the evidence. Keep valid [n]
citations and the Sources list.

OUTPUT:
Only the patched article text."#,
        issues = pretty(issues)?,
        truth = pretty(truth)?,
        evidence = pretty(evidence)?,
    ))
}

fn league_suffix(truth: &TruthRecord) -> String {
    truth
        .league_name
        .as_deref()
        .map(|name| format!(" for {}", name))
        .unwrap_or_default()
}
