//! Wire types returned by the sports data source.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};

/// League metadata.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LeagueInfo {
    /// League identifier
    pub league_id: String,
    /// League display name
    #[serde(default)]
    pub name: Option<String>,
    /// Season year as reported by the API
    #[serde(default)]
    pub season: Option<String>,
    /// League status (pre_draft, in_season, complete)
    #[serde(default)]
    pub status: Option<String>,
    /// Number of rosters
    #[serde(default)]
    pub total_rosters: Option<u32>,
}

/// Free-form user metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserMetadata {
    /// Custom fantasy team name
    #[serde(default)]
    pub team_name: Option<String>,
}

/// A league member.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeagueUser {
    /// User identifier
    pub user_id: String,
    /// Account name
    #[serde(default)]
    pub username: Option<String>,
    /// Display name
    #[serde(default)]
    pub display_name: Option<String>,
    /// Metadata; null for some accounts
    #[serde(default)]
    pub metadata: Option<UserMetadata>,
}

impl LeagueUser {
    /// First non-empty of team name, display name and username.
    ///
    /// # Examples
    ///
    /// ```
    /// use huddle_interface::{LeagueUser, UserMetadata};
    ///
    /// let user = LeagueUser {
    ///     user_id: "u1".into(),
    ///     username: Some("jdoe".into()),
    ///     display_name: Some("".into()),
    ///     metadata: Some(UserMetadata { team_name: None }),
    /// };
    /// assert_eq!(user.team_label(), Some("jdoe"));
    /// ```
    pub fn team_label(&self) -> Option<&str> {
        let team_name = self.metadata.as_ref().and_then(|m| m.team_name.as_deref());
        [team_name, self.display_name.as_deref(), self.username.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .find(|label| !label.is_empty())
    }
}

/// A roster slot owned by a league member.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeagueRoster {
    /// Roster identifier
    pub roster_id: u32,
    /// Owning user identifier
    #[serde(default)]
    pub owner_id: Option<String>,
    /// Present-day player ids
    #[serde(default)]
    pub players: Option<Vec<String>>,
    /// Present-day starter ids
    #[serde(default)]
    pub starters: Option<Vec<String>>,
}

/// One roster's scoring entry for a week.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MatchupEntry {
    /// Roster identifier
    pub roster_id: u32,
    /// Pairing identifier; null for a bye
    #[serde(default)]
    pub matchup_id: Option<u32>,
    /// Total points
    #[serde(default)]
    pub points: Option<f64>,
    /// Points keyed by player id
    #[serde(default)]
    pub players_points: Option<BTreeMap<String, f64>>,
    /// Starting lineup for the week
    #[serde(default)]
    pub starters: Option<Vec<String>>,
}

impl MatchupEntry {
    /// Starter ids, skipping empty and `"0"` placeholder slots.
    pub fn starter_ids(&self) -> HashSet<&str> {
        self.starters
            .iter()
            .flatten()
            .map(String::as_str)
            .filter(|id| !id.is_empty() && *id != "0")
            .collect()
    }
}

/// A completed add/drop transaction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// Transaction identifier
    #[serde(default)]
    pub transaction_id: String,
    /// Transaction type (waiver, free_agent, trade)
    #[serde(rename = "type", default)]
    pub kind: String,
    /// Transaction status
    #[serde(default)]
    pub status: String,
    /// Added players keyed by player id, valued by roster id
    #[serde(default)]
    pub adds: Option<BTreeMap<String, u32>>,
    /// Dropped players keyed by player id, valued by roster id
    #[serde(default)]
    pub drops: Option<BTreeMap<String, u32>>,
    /// Rosters involved
    #[serde(default)]
    pub roster_ids: Vec<u32>,
}

impl Transaction {
    /// True when the transaction went through.
    pub fn is_complete(&self) -> bool {
        self.status == "complete"
    }
}

/// Player database entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerRecord {
    /// First name
    #[serde(default)]
    pub first_name: Option<String>,
    /// Last name
    #[serde(default)]
    pub last_name: Option<String>,
    /// Position code
    #[serde(default)]
    pub position: Option<String>,
    /// Pro team code
    #[serde(default)]
    pub team: Option<String>,
}

impl PlayerRecord {
    /// `"first last"`, or `None` when both parts are blank.
    pub fn full_name(&self) -> Option<String> {
        let first = self.first_name.as_deref().unwrap_or("").trim();
        let last = self.last_name.as_deref().unwrap_or("").trim();
        let full = format!("{first} {last}").trim().to_string();
        (!full.is_empty()).then_some(full)
    }
}

/// Player database keyed by player id.
pub type PlayerDirectory = HashMap<String, PlayerRecord>;
