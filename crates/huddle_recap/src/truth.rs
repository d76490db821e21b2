//! Deterministic fact record for one league week.

use crate::current_season;
use huddle_core::{CumulativeRecord, MatchupResult, PlayerSnapshot, TeamSnapshot, TruthRecord};
use huddle_error::HuddleResult;
use huddle_interface::{
    LeagueRoster, LeagueUser, MatchupEntry, PlayerDirectory, SportsDataSource, validate_week,
};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Issue recorded when the week has no scoring entries.
pub const NO_ROSTER_DATA: &str = "No team roster data found";
/// Issue recorded when no matchups could be derived.
pub const NO_MATCHUP_DATA: &str = "No matchup data found";
/// Issue recorded when records and teams disagree in number.
pub const RECORD_COUNT_MISMATCH: &str = "Record count mismatch with team count";

/// Builds a [`TruthRecord`] from a sports data source.
///
/// Given identical upstream responses the record is identical: rosters come
/// from the week's own scoring payload, never the present-day roster.
pub struct TruthBuilder {
    source: Arc<dyn SportsDataSource>,
    default_timezone: String,
}

impl TruthBuilder {
    /// Creates a builder over `source`, inferring seasons in `default_timezone`.
    pub fn new(source: Arc<dyn SportsDataSource>, default_timezone: impl Into<String>) -> Self {
        Self {
            source,
            default_timezone: default_timezone.into(),
        }
    }

    /// Builds the record for `week`.
    ///
    /// Missing week data is recorded in `issues` rather than raised.
    ///
    /// # Errors
    ///
    /// Returns an error for a week outside `1..=18`, an unknown timezone, or
    /// an upstream failure other than "not found".
    #[instrument(skip(self))]
    pub async fn build(
        &self,
        week: u32,
        season: Option<i32>,
        timezone: Option<&str>,
    ) -> HuddleResult<TruthRecord> {
        validate_week(week)?;
        let season = match season {
            Some(season) => season,
            None => current_season(timezone.unwrap_or(&self.default_timezone))?,
        };
        info!(season, week, "Building truth record");

        let league_name = self.league_name().await;
        let users = or_empty(self.source.users().await)?;
        let rosters = or_empty(self.source.rosters().await)?;
        let names = resolve_team_names(&users, &rosters);
        let directory = self.player_directory().await;

        let entries = self.week_entries(week).await?;
        let teams = team_snapshots(&entries, &names, &directory);
        let matchups = derive_matchups(week, &entries, &names);
        let records = self.replay_records(week, &teams, &matchups, &names).await?;
        let issues = data_quality_issues(&teams, &matchups, &records);
        for issue in &issues {
            warn!(issue = %issue, "Data quality issue");
        }

        info!(
            teams = teams.len(),
            matchups = matchups.len(),
            "Truth record built"
        );
        Ok(TruthRecord {
            league_name,
            season,
            week,
            teams,
            matchups,
            records_after_week: records,
            issues,
        })
    }

    async fn league_name(&self) -> Option<String> {
        match self.source.league().await {
            Ok(league) => league.name.filter(|n| !n.trim().is_empty()),
            Err(e) => {
                debug!(error = %e, "League lookup failed, continuing without a name");
                None
            }
        }
    }

    async fn player_directory(&self) -> Arc<PlayerDirectory> {
        match self.source.players().await {
            Ok(directory) => directory,
            Err(e) => {
                warn!(error = %e, "Player database unavailable, using placeholder names");
                Arc::new(PlayerDirectory::new())
            }
        }
    }

    async fn week_entries(&self, week: u32) -> HuddleResult<Vec<MatchupEntry>> {
        or_empty(self.source.matchups(week).await)
    }

    /// Replays weeks `1..=week`, reusing the derivation already made for `week`.
    async fn replay_records(
        &self,
        week: u32,
        teams: &[TeamSnapshot],
        current: &[MatchupResult],
        names: &HashMap<u32, String>,
    ) -> HuddleResult<Vec<CumulativeRecord>> {
        let mut ledger = RecordLedger::new(teams.iter().map(|t| t.team_name.as_str()));
        for prior in 1..week {
            let entries = self.week_entries(prior).await?;
            let matchups = derive_matchups(prior, &entries, names);
            debug!(week = prior, matchups = matchups.len(), "Replayed week");
            ledger.apply_all(&matchups);
        }
        ledger.apply_all(current);
        Ok(ledger.into_records())
    }
}

/// Treats a "not found" response as an empty list.
fn or_empty<T>(result: HuddleResult<Vec<T>>) -> HuddleResult<Vec<T>> {
    match result {
        Err(e) if e.is_not_found() => {
            debug!(error = %e, "Resource not found, treating as empty");
            Ok(Vec::new())
        }
        other => other,
    }
}

/// Display name per roster id.
///
/// Roster owner's team name, then display name, then username.
pub fn resolve_team_names(users: &[LeagueUser], rosters: &[LeagueRoster]) -> HashMap<u32, String> {
    let by_id: HashMap<&str, &LeagueUser> =
        users.iter().map(|u| (u.user_id.as_str(), u)).collect();
    rosters
        .iter()
        .filter_map(|roster| {
            let owner = roster.owner_id.as_deref()?;
            let label = by_id.get(owner)?.team_label()?;
            Some((roster.roster_id, label.to_string()))
        })
        .collect()
}

/// Name for `roster_id`, or `"Roster {id}"` when unresolved.
pub fn team_name(names: &HashMap<u32, String>, roster_id: u32) -> String {
    names
        .get(&roster_id)
        .cloned()
        .unwrap_or_else(|| format!("Roster {}", roster_id))
}

/// One snapshot per scoring entry, ordered by roster id.
///
/// The roster is every player with a recorded point value that week; the
/// starter flag comes from that week's lineup.
pub fn team_snapshots(
    entries: &[MatchupEntry],
    names: &HashMap<u32, String>,
    directory: &PlayerDirectory,
) -> Vec<TeamSnapshot> {
    let mut sorted: Vec<&MatchupEntry> = entries.iter().collect();
    sorted.sort_by_key(|e| e.roster_id);

    sorted
        .into_iter()
        .map(|entry| {
            let starters = entry.starter_ids();
            let mut players: Vec<PlayerSnapshot> = entry
                .players_points
                .iter()
                .flatten()
                .map(|(player_id, points)| {
                    let record = directory.get(player_id);
                    PlayerSnapshot {
                        player_id: player_id.clone(),
                        player_name: record
                            .and_then(|r| r.full_name())
                            .unwrap_or_else(|| format!("Player {}", player_id)),
                        position: record.and_then(|r| r.position.clone()),
                        nfl_team: record.and_then(|r| r.team.clone()),
                        fantasy_points: Some(*points),
                        is_starter: starters.contains(player_id.as_str()),
                    }
                })
                .collect();
            players.sort_by(|a, b| {
                b.is_starter
                    .cmp(&a.is_starter)
                    .then_with(|| b.points().total_cmp(&a.points()))
                    .then_with(|| a.player_id.cmp(&b.player_id))
            });
            TeamSnapshot {
                team_name: team_name(names, entry.roster_id),
                players,
            }
        })
        .collect()
}

/// Pairs scoring entries into results.
///
/// Entries sharing a matchup id form a head-to-head with the lower roster id
/// as side A. A lone entry, or one with no matchup id, is a bye. Results are
/// ordered by matchup id with byes last.
pub fn derive_matchups(
    week: u32,
    entries: &[MatchupEntry],
    names: &HashMap<u32, String>,
) -> Vec<MatchupResult> {
    let mut groups: BTreeMap<u32, Vec<&MatchupEntry>> = BTreeMap::new();
    let mut unpaired: Vec<&MatchupEntry> = Vec::new();
    for entry in entries {
        match entry.matchup_id {
            Some(id) => groups.entry(id).or_default().push(entry),
            None => unpaired.push(entry),
        }
    }

    let mut results = Vec::new();
    let mut byes = Vec::new();
    for (matchup_id, mut group) in groups {
        group.sort_by_key(|e| e.roster_id);
        match group.as_slice() {
            [lone] => byes.push(*lone),
            [a, b, rest @ ..] => {
                if !rest.is_empty() {
                    warn!(
                        week,
                        matchup_id,
                        entries = group.len(),
                        "Matchup has extra entries, pairing the first two"
                    );
                }
                results.push(MatchupResult::head_to_head(
                    week,
                    team_name(names, a.roster_id),
                    a.points.unwrap_or(0.0),
                    team_name(names, b.roster_id),
                    b.points.unwrap_or(0.0),
                ));
            }
            [] => {}
        }
    }

    byes.extend(unpaired);
    byes.sort_by_key(|e| e.roster_id);
    results.extend(byes.into_iter().map(|entry| {
        MatchupResult::bye(
            week,
            team_name(names, entry.roster_id),
            entry.points.unwrap_or(0.0),
        )
    }));
    results
}

#[derive(Debug, Default, Clone, Copy)]
struct Tally {
    wins: u32,
    losses: u32,
    ties: u32,
    points_for: f64,
    points_against: f64,
}

/// Season tallies for a fixed set of teams.
///
/// Teams outside the set, and the bye sentinel, accrue nothing.
#[derive(Debug)]
pub struct RecordLedger {
    order: Vec<String>,
    tallies: HashMap<String, Tally>,
}

impl RecordLedger {
    /// Starts every team at 0-0.
    pub fn new<'a>(teams: impl IntoIterator<Item = &'a str>) -> Self {
        let mut order = Vec::new();
        let mut tallies = HashMap::new();
        for team in teams {
            if tallies.insert(team.to_string(), Tally::default()).is_none() {
                order.push(team.to_string());
            }
        }
        Self { order, tallies }
    }

    /// Applies one result.
    pub fn apply(&mut self, matchup: &MatchupResult) {
        if matchup.is_bye() {
            if let Some(tally) = self.tallies.get_mut(&matchup.team_a) {
                tally.wins += 1;
                tally.points_for += matchup.team_a_score;
            }
            return;
        }

        let sides = [
            (&matchup.team_a, matchup.team_a_score, matchup.team_b_score),
            (&matchup.team_b, matchup.team_b_score, matchup.team_a_score),
        ];
        for (team, scored, allowed) in sides {
            let Some(tally) = self.tallies.get_mut(team) else {
                continue;
            };
            tally.points_for += scored;
            tally.points_against += allowed;
            if matchup.is_tie() {
                tally.ties += 1;
            } else if matchup.winner == *team {
                tally.wins += 1;
            } else {
                tally.losses += 1;
            }
        }
    }

    /// Applies every result in order.
    pub fn apply_all(&mut self, matchups: &[MatchupResult]) {
        for matchup in matchups {
            self.apply(matchup);
        }
    }

    /// Records in the order teams were registered.
    pub fn into_records(self) -> Vec<CumulativeRecord> {
        self.order
            .iter()
            .filter_map(|team| {
                let t = self.tallies.get(team)?;
                Some(CumulativeRecord::from_tally(
                    team.clone(),
                    t.wins,
                    t.losses,
                    t.ties,
                    t.points_for,
                    t.points_against,
                ))
            })
            .collect()
    }
}

/// Data-quality notes for a finished record.
pub fn data_quality_issues(
    teams: &[TeamSnapshot],
    matchups: &[MatchupResult],
    records: &[CumulativeRecord],
) -> Vec<String> {
    let mut issues = Vec::new();
    if teams.is_empty() {
        issues.push(NO_ROSTER_DATA.to_string());
    }
    if matchups.is_empty() {
        issues.push(NO_MATCHUP_DATA.to_string());
    }
    if records.len() != teams.len() {
        issues.push(RECORD_COUNT_MISMATCH.to_string());
    }
    issues
}
