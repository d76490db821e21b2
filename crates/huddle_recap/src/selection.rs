//! Storyline-worthy player selection.

use huddle_core::{PlayerSnapshot, TeamSnapshot, TruthRecord};
use serde::Serialize;

/// Most players selected per team.
pub const MAX_PER_TEAM: usize = 2;
/// Points that make a player high impact on their own.
pub const HIGH_IMPACT_POINTS: f64 = 15.0;

const OVERPERFORM_RATIO: f64 = 1.5;
const OVERPERFORM_MIN_POINTS: f64 = 8.0;
const UNDERPERFORM_RATIO: f64 = 0.5;
const UNDERPERFORM_MIN_EXPECTED: f64 = 10.0;

/// Typical weekly points for a position and lineup role.
///
/// ```
/// use huddle_recap::expected_points;
///
/// assert_eq!(expected_points(Some("QB"), true), 18.0);
/// assert_eq!(expected_points(Some("RB"), false), 6.0);
/// assert_eq!(expected_points(Some("DEF"), true), 8.0);
/// assert_eq!(expected_points(None, true), 8.0);
/// ```
pub fn expected_points(position: Option<&str>, is_starter: bool) -> f64 {
    match (position, is_starter) {
        (Some("QB"), true) => 18.0,
        (Some("QB"), false) => 12.0,
        (Some("RB"), true) => 12.0,
        (Some("RB"), false) => 6.0,
        (Some("WR"), true) => 10.0,
        (Some("WR"), false) => 5.0,
        (Some("TE"), true) => 8.0,
        (Some("TE"), false) => 4.0,
        _ => 8.0,
    }
}

/// Why a player was picked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SelectionReason {
    /// Top scorer at 15 points or more
    HighImpact,
    /// At least 1.5 times expectation
    Overperformer,
    /// Under half of expectation
    Underperformer,
    /// Nobody qualified; the team's top scorer
    TopScorer,
}

/// A selected player and the team they scored for.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeyPlayer<'a> {
    /// Fantasy team name
    pub team_name: &'a str,
    /// Player snapshot for the week
    pub player: &'a PlayerSnapshot,
    /// Selection rule that fired
    pub reason: SelectionReason,
}

fn ratio(player: &PlayerSnapshot) -> f64 {
    player.points() / expected_points(player.position.as_deref(), player.is_starter)
}

/// First player with the strictly greatest `key`.
fn first_max<'a>(
    players: impl Iterator<Item = &'a PlayerSnapshot>,
    key: impl Fn(&PlayerSnapshot) -> f64,
) -> Option<&'a PlayerSnapshot> {
    let mut best: Option<(&PlayerSnapshot, f64)> = None;
    for player in players {
        let value = key(player);
        if best.is_none_or(|(_, top)| value > top) {
            best = Some((player, value));
        }
    }
    best.map(|(player, _)| player)
}

/// Up to two storyline players for one team.
///
/// High-impact scorer first, then the biggest overperformer, then (if room
/// remains) the biggest underperformer among starters or players expected to
/// score 10 or more. With nobody qualifying, the top scorer is taken.
pub fn select_key_players(team: &TeamSnapshot) -> Vec<KeyPlayer<'_>> {
    let mut picked: Vec<KeyPlayer<'_>> = Vec::new();
    let key = |player, reason| KeyPlayer {
        team_name: team.team_name.as_str(),
        player,
        reason,
    };
    let already = |picked: &[KeyPlayer<'_>], p: &PlayerSnapshot| {
        picked.iter().any(|k| k.player.player_id == p.player_id)
    };

    if let Some(top) = first_max(team.players.iter(), PlayerSnapshot::points)
        && top.points() >= HIGH_IMPACT_POINTS
    {
        picked.push(key(top, SelectionReason::HighImpact));
    }

    let is_over = |p: &PlayerSnapshot| {
        ratio(p) >= OVERPERFORM_RATIO && p.points() >= OVERPERFORM_MIN_POINTS
    };
    if let Some(over) = first_max(team.players.iter().filter(|p| is_over(*p)), ratio)
        && !already(&picked, over)
    {
        picked.push(key(over, SelectionReason::Overperformer));
    }

    if picked.len() < MAX_PER_TEAM {
        let is_under = |p: &PlayerSnapshot| {
            !is_over(p)
                && ratio(p) < UNDERPERFORM_RATIO
                && (p.is_starter
                    || expected_points(p.position.as_deref(), p.is_starter)
                        >= UNDERPERFORM_MIN_EXPECTED)
        };
        if let Some(under) = first_max(team.players.iter().filter(|p| is_under(*p)), |p| -ratio(p))
            && !already(&picked, under)
        {
            picked.push(key(under, SelectionReason::Underperformer));
        }
    }

    if picked.is_empty()
        && let Some(top) = first_max(team.players.iter(), PlayerSnapshot::points)
    {
        picked.push(key(top, SelectionReason::TopScorer));
    }

    picked.truncate(MAX_PER_TEAM);
    picked
}

/// Key players across every team, in team order.
pub fn select_all(truth: &TruthRecord) -> Vec<KeyPlayer<'_>> {
    truth.teams.iter().flat_map(select_key_players).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player(id: &str, position: &str, points: f64, is_starter: bool) -> PlayerSnapshot {
        PlayerSnapshot {
            player_id: id.into(),
            player_name: format!("Player {}", id),
            position: Some(position.into()),
            nfl_team: None,
            fantasy_points: Some(points),
            is_starter,
        }
    }

    fn team(players: Vec<PlayerSnapshot>) -> TeamSnapshot {
        TeamSnapshot {
            team_name: "Alpha".into(),
            players,
        }
    }

    fn ids<'a>(picked: &[KeyPlayer<'a>]) -> Vec<(&'a str, SelectionReason)> {
        picked
            .iter()
            .map(|k| (k.player.player_id.as_str(), k.reason))
            .collect()
    }

    #[test]
    fn high_impact_then_overperformer() {
        let team = team(vec![
            player("qb", "QB", 24.0, true),
            player("te", "TE", 14.0, true),
            player("wr", "WR", 9.0, true),
        ]);
        let picked = select_key_players(&team);
        assert_eq!(
            ids(&picked),
            vec![
                ("qb", SelectionReason::HighImpact),
                ("te", SelectionReason::Overperformer)
            ]
        );
    }

    #[test]
    fn underperformer_fills_remaining_slot() {
        let team = team(vec![
            player("rb", "RB", 16.0, true),
            player("qb", "QB", 4.0, true),
            player("wr", "WR", 4.5, true),
        ]);
        let picked = select_key_players(&team);
        assert_eq!(
            ids(&picked),
            vec![
                ("rb", SelectionReason::HighImpact),
                ("qb", SelectionReason::Underperformer)
            ]
        );
    }

    #[test]
    fn bench_player_below_threshold_is_not_an_underperformer() {
        let team = team(vec![
            player("wr", "WR", 9.0, true),
            player("te", "TE", 1.0, false),
        ]);
        let picked = select_key_players(&team);
        assert_eq!(ids(&picked), vec![("wr", SelectionReason::TopScorer)]);
    }

    #[test]
    fn overperformer_already_picked_is_not_repeated() {
        let team = team(vec![player("te", "TE", 20.0, true)]);
        let picked = select_key_players(&team);
        assert_eq!(ids(&picked), vec![("te", SelectionReason::HighImpact)]);
    }

    #[test]
    fn empty_team_selects_nobody() {
        assert!(select_key_players(&team(Vec::new())).is_empty());
    }

    #[test]
    fn at_most_two_per_team() {
        let players = (0..10)
            .map(|i| player(&i.to_string(), "WR", f64::from(i) * 3.0, true))
            .collect();
        let team = team(players);
        let picked = select_key_players(&team);
        assert_eq!(picked.len(), MAX_PER_TEAM);
        assert_eq!(picked[0].reason, SelectionReason::HighImpact);
        assert_eq!(picked[0].player.player_id, "9");
    }
}
