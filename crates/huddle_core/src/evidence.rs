//! Narrative evidence for key players.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Literal kickoff slot a player's game fell in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display)]
pub enum KickoffWindow {
    /// Thursday night
    #[serde(rename = "TNF")]
    #[strum(serialize = "TNF")]
    ThursdayNight,
    /// Sunday early afternoon
    #[serde(rename = "Sun Early")]
    #[strum(serialize = "Sun Early")]
    SundayEarly,
    /// Sunday late afternoon
    #[serde(rename = "Sun Late")]
    #[strum(serialize = "Sun Late")]
    SundayLate,
    /// Sunday night
    #[serde(rename = "SNF")]
    #[strum(serialize = "SNF")]
    SundayNight,
    /// Monday night
    #[serde(rename = "MNF")]
    #[strum(serialize = "MNF")]
    MondayNight,
}

/// Reference identifier; providers emit either numbers or numeric strings.
///
/// # Examples
///
/// ```
/// use huddle_core::ReferenceId;
///
/// let from_number: ReferenceId = serde_json::from_str("3").unwrap();
/// let from_text: ReferenceId = serde_json::from_str("\"3\"").unwrap();
/// assert_eq!(from_number.as_number(), Some(3));
/// assert_eq!(from_text.as_number(), Some(3));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display)]
#[serde(untagged)]
pub enum ReferenceId {
    /// Numeric id
    Number(u32),
    /// Text id
    Text(String),
}

impl ReferenceId {
    /// Numeric value, parsing text ids when possible.
    pub fn as_number(&self) -> Option<u32> {
        match self {
            ReferenceId::Number(n) => Some(*n),
            ReferenceId::Text(text) => text.trim().parse().ok(),
        }
    }
}

/// A citation source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reference {
    /// Citation number used as `[n]` in prose
    pub id: ReferenceId,
    /// Article title
    pub title: String,
    /// Source URL
    pub url: String,
    /// Publishing outlet
    #[serde(default)]
    pub publisher: String,
    /// Publication date
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
}

impl Reference {
    /// The line a Sources section must carry for this reference.
    pub fn source_line(&self) -> String {
        format!("[{}] {} — {} ({})", self.id, self.publisher, self.title, self.url)
    }
}

/// A quoted remark about a player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    /// Quoted text
    pub text: String,
    /// Who said it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

/// Longer-horizon notes on a player.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[allow(missing_docs)]
pub struct SeasonOutlook {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trajectory: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role_security: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub boom_bust_profile: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ros_projection: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub breakout_potential: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schedule_analysis: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub advanced_metrics: Option<String>,
}

/// Evidence about one player, bound to the fantasy team that rostered them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerEvidence {
    /// Player display name
    pub player: String,
    /// Fantasy team name from the truth record
    pub team_name: String,
    /// Starter flag for the week
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_starter: Option<bool>,
    /// Numeric box-score values keyed by stat name
    #[serde(default)]
    pub week_stats: BTreeMap<String, f64>,
    /// Projection versus actual narrative
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub projection_context: Option<String>,
    /// Season-long outlook
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub season_outlook: Option<SeasonOutlook>,
    /// Injury status fields
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub injury: Option<BTreeMap<String, String>>,
    /// Opportunity and role notes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opportunity_notes: Option<String>,
    /// Analyst consensus
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expert_analysis: Option<String>,
    /// Free-form notes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub advanced_notes: Option<String>,
    /// Attributed quotes
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub quotes: Vec<Quote>,
    /// Kickoff slot of the player's game
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kickoff_window: Option<KickoffWindow>,
}

impl PlayerEvidence {
    /// Creates evidence with only the identifying fields set.
    pub fn new(player: impl Into<String>, team_name: impl Into<String>) -> Self {
        Self {
            player: player.into(),
            team_name: team_name.into(),
            is_starter: None,
            week_stats: BTreeMap::new(),
            projection_context: None,
            season_outlook: None,
            injury: None,
            opportunity_notes: None,
            expert_analysis: None,
            advanced_notes: None,
            quotes: Vec::new(),
            kickoff_window: None,
        }
    }

    /// Fantasy points from the week stats, zero when absent.
    pub fn fantasy_points(&self) -> f64 {
        self.week_stats.get("fantasy_points").copied().unwrap_or(0.0)
    }
}

/// Evidence for every selected player plus citation sources.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EvidenceSet {
    /// Per-player evidence
    pub player_evidence: Vec<PlayerEvidence>,
    /// Citation sources
    #[serde(default)]
    pub references: Vec<Reference>,
}

impl EvidenceSet {
    /// True when no player evidence is present.
    pub fn is_empty(&self) -> bool {
        self.player_evidence.is_empty()
    }

    /// Numeric ids of every reference.
    pub fn reference_ids(&self) -> BTreeSet<u32> {
        self.references
            .iter()
            .filter_map(|r| r.id.as_number())
            .collect()
    }

    /// Evidence ordered by fantasy points, highest first.
    pub fn ranked(&self) -> Vec<&PlayerEvidence> {
        let mut ranked: Vec<&PlayerEvidence> = self.player_evidence.iter().collect();
        ranked.sort_by(|a, b| b.fantasy_points().total_cmp(&a.fantasy_points()));
        ranked
    }

    /// A copy keeping the `players` highest scorers and the first `references` sources.
    pub fn condensed(&self, players: usize, references: usize) -> Self {
        Self {
            player_evidence: self.ranked().into_iter().take(players).cloned().collect(),
            references: self.references.iter().take(references).cloned().collect(),
        }
    }
}
