//! Ground-truth snapshot of one league week.
//!
//! Every type here is built deterministically from sports API responses and
//! is never touched by a generation provider. The audit stage checks
//! generated prose against these values.

use serde::{Deserialize, Serialize};

/// Opponent sentinel for a team without a matchup.
pub const BYE: &str = "BYE";

/// Winner and loser sentinel for a tied matchup.
pub const TIE: &str = "TIE";

/// Two scores closer than this are a tie.
pub const TIE_TOLERANCE: f64 = 1e-6;

/// A player as rostered by a fantasy team in one specific week.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerSnapshot {
    /// Stable sports API player identifier
    pub player_id: String,
    /// Display name
    pub player_name: String,
    /// Position code (QB, RB, WR, TE, K, DEF)
    #[serde(default)]
    pub position: Option<String>,
    /// Pro team code
    #[serde(default)]
    pub nfl_team: Option<String>,
    /// Fantasy points scored this week
    #[serde(default)]
    pub fantasy_points: Option<f64>,
    /// Whether the player was in the starting lineup this week
    #[serde(default)]
    pub is_starter: bool,
}

impl PlayerSnapshot {
    /// Points scored, with a missing value read as zero.
    pub fn points(&self) -> f64 {
        self.fantasy_points.unwrap_or(0.0)
    }
}

/// A fantasy team and the roster it fielded in the week.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamSnapshot {
    /// Team display name
    pub team_name: String,
    /// Players with recorded points that week
    pub players: Vec<PlayerSnapshot>,
}

impl TeamSnapshot {
    /// Players in the starting lineup.
    pub fn starters(&self) -> impl Iterator<Item = &PlayerSnapshot> {
        self.players.iter().filter(|p| p.is_starter)
    }

    /// Players left on the bench.
    pub fn bench(&self) -> impl Iterator<Item = &PlayerSnapshot> {
        self.players.iter().filter(|p| !p.is_starter)
    }
}

/// Result of one head-to-head pairing, or a bye.
///
/// # Examples
///
/// ```
/// use huddle_core::{MatchupResult, BYE};
///
/// let bye = MatchupResult::bye(5, "Gamma", 95.0);
/// assert_eq!(bye.team_b, BYE);
/// assert_eq!(bye.winner, "Gamma");
/// assert_eq!(bye.loser, BYE);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchupResult {
    /// Week number
    pub week: u32,
    /// First team (lower roster id)
    pub team_a: String,
    /// Second team, or [`BYE`]
    pub team_b: String,
    /// Points for `team_a`
    pub team_a_score: f64,
    /// Points for `team_b` (zero for a bye)
    pub team_b_score: f64,
    /// Winning team, or [`TIE`]
    pub winner: String,
    /// Losing team, [`BYE`], or [`TIE`]
    pub loser: String,
}

impl MatchupResult {
    /// Builds a decided or tied head-to-head result.
    pub fn head_to_head(
        week: u32,
        team_a: impl Into<String>,
        team_a_score: f64,
        team_b: impl Into<String>,
        team_b_score: f64,
    ) -> Self {
        let team_a = team_a.into();
        let team_b = team_b.into();
        let (winner, loser) = if (team_a_score - team_b_score).abs() < TIE_TOLERANCE {
            (TIE.to_string(), TIE.to_string())
        } else if team_a_score > team_b_score {
            (team_a.clone(), team_b.clone())
        } else {
            (team_b.clone(), team_a.clone())
        };
        Self {
            week,
            team_a,
            team_b,
            team_a_score,
            team_b_score,
            winner,
            loser,
        }
    }

    /// Builds a bye result: the lone team wins against [`BYE`].
    pub fn bye(week: u32, team: impl Into<String>, score: f64) -> Self {
        let team = team.into();
        Self {
            week,
            winner: team.clone(),
            team_a: team,
            team_b: BYE.to_string(),
            team_a_score: score,
            team_b_score: 0.0,
            loser: BYE.to_string(),
        }
    }

    /// True when `team_b` is the bye sentinel.
    pub fn is_bye(&self) -> bool {
        self.team_b == BYE
    }

    /// True when the scores tied.
    pub fn is_tie(&self) -> bool {
        self.winner == TIE
    }

    /// True when `team` played in this matchup.
    pub fn involves(&self, team: &str) -> bool {
        self.team_a == team || (!self.is_bye() && self.team_b == team)
    }
}

/// Season-to-date record for one team.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CumulativeRecord {
    /// Team display name
    pub team_name: String,
    /// Win-loss string, ties split half and half
    pub record: String,
    /// Outright wins, byes included
    #[serde(default)]
    pub wins: u32,
    /// Outright losses
    #[serde(default)]
    pub losses: u32,
    /// Tied matchups
    #[serde(default)]
    pub ties: u32,
    /// Points scored through the week
    pub points_for: f64,
    /// Points allowed through the week
    pub points_against: f64,
}

impl CumulativeRecord {
    /// Builds a record from tallies, rounding points to two decimals.
    pub fn from_tally(
        team_name: impl Into<String>,
        wins: u32,
        losses: u32,
        ties: u32,
        points_for: f64,
        points_against: f64,
    ) -> Self {
        Self {
            team_name: team_name.into(),
            record: format_record(wins, losses, ties),
            wins,
            losses,
            ties,
            points_for: round2(points_for),
            points_against: round2(points_against),
        }
    }

    /// Wins with ties counted as half a win.
    pub fn win_total(&self) -> f64 {
        f64::from(self.wins) + f64::from(self.ties) * 0.5
    }

    /// Losses with ties counted as half a loss.
    pub fn loss_total(&self) -> f64 {
        f64::from(self.losses) + f64::from(self.ties) * 0.5
    }

    /// Matchups played, byes included.
    pub fn games(&self) -> u32 {
        self.wins + self.losses + self.ties
    }
}

/// Renders a record string, splitting ties half and half.
///
/// # Examples
///
/// ```
/// use huddle_core::format_record;
///
/// assert_eq!(format_record(3, 1, 0), "3-1");
/// assert_eq!(format_record(2, 1, 1), "2.5-1.5");
/// assert_eq!(format_record(1, 1, 2), "2-2");
/// ```
pub fn format_record(wins: u32, losses: u32, ties: u32) -> String {
    // Work in half-games so whole numbers render without a decimal point.
    let halves_w = wins * 2 + ties;
    let halves_l = losses * 2 + ties;
    format!("{}-{}", render_halves(halves_w), render_halves(halves_l))
}

fn render_halves(halves: u32) -> String {
    if halves % 2 == 0 {
        (halves / 2).to_string()
    } else {
        format!("{}.5", halves / 2)
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Immutable fact record for one league week.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TruthRecord {
    /// League name; absent when the lookup failed
    #[serde(default)]
    pub league_name: Option<String>,
    /// Season year
    pub season: i32,
    /// Week number
    pub week: u32,
    /// Teams with their rosters for the week
    pub teams: Vec<TeamSnapshot>,
    /// Results for the week
    pub matchups: Vec<MatchupResult>,
    /// Records through the week
    pub records_after_week: Vec<CumulativeRecord>,
    /// Data-quality notes
    #[serde(default)]
    pub issues: Vec<String>,
}

impl TruthRecord {
    /// Looks up a team by exact name.
    pub fn team(&self, name: &str) -> Option<&TeamSnapshot> {
        self.teams.iter().find(|t| t.team_name == name)
    }

    /// Looks up a team's record by exact name.
    pub fn record_for(&self, name: &str) -> Option<&CumulativeRecord> {
        self.records_after_week.iter().find(|r| r.team_name == name)
    }

    /// Finds the matchup a team played this week.
    pub fn matchup_for(&self, name: &str) -> Option<&MatchupResult> {
        self.matchups.iter().find(|m| m.involves(name))
    }

    /// True when the week has both rosters and results.
    pub fn has_week_data(&self) -> bool {
        !self.teams.is_empty() && !self.matchups.is_empty()
    }

    /// Team names that matchups or records mention but `teams` lacks.
    pub fn dangling_team_names(&self) -> Vec<String> {
        let mut missing: Vec<String> = self
            .matchups
            .iter()
            .flat_map(|m| {
                let mut names = vec![m.team_a.as_str()];
                if !m.is_bye() {
                    names.push(m.team_b.as_str());
                }
                names
            })
            .chain(self.records_after_week.iter().map(|r| r.team_name.as_str()))
            .filter(|name| self.team(name).is_none())
            .map(str::to_string)
            .collect();
        missing.sort();
        missing.dedup();
        missing
    }
}
