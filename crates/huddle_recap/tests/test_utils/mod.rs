//! Test utilities for huddle_recap tests.
//!
//! Mock generation drivers, an in-memory league, and article builders.

#![allow(dead_code)]

use async_trait::async_trait;
use huddle_core::{
    AuditResult, EvidenceSet, GenerateRequest, GenerateResponse, Issue, IssueKind, TruthRecord,
};
use huddle_error::{
    HuddleResult, ProviderError, ProviderErrorKind, ProviderKind, SleeperError, SleeperErrorKind,
};
use huddle_interface::{
    ArticleAuditor, GenerationDriver, LeagueInfo, LeagueRoster, LeagueUser, MatchupEntry,
    PlayerDirectory, PlayerRecord, SportsDataSource, Transaction, UserMetadata,
};
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// One canned driver reply.
#[derive(Debug, Clone)]
pub enum MockResponse {
    /// Reply with text
    Text(String),
    /// Fail with a provider error
    Fail(ProviderErrorKind),
}

/// Generation driver that replays canned responses.
///
/// Responses are served in order; the last one repeats forever.
pub struct MockDriver {
    provider: ProviderKind,
    responses: Mutex<VecDeque<MockResponse>>,
    requests: Arc<Mutex<Vec<GenerateRequest>>>,
}

impl MockDriver {
    /// Driver replaying `responses` for `provider`.
    pub fn new(provider: ProviderKind, responses: Vec<MockResponse>) -> Self {
        Self {
            provider,
            responses: Mutex::new(responses.into()),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Writer driver that always answers `text`.
    pub fn always(provider: ProviderKind, text: impl Into<String>) -> Self {
        Self::new(provider, vec![MockResponse::Text(text.into())])
    }

    /// Driver whose every call fails with an HTTP 500.
    pub fn failing(provider: ProviderKind) -> Self {
        Self::new(
            provider,
            vec![MockResponse::Fail(ProviderErrorKind::Http {
                status_code: 500,
                message: "mock outage".into(),
            })],
        )
    }

    /// Number of calls received so far.
    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    /// Every request received, in order.
    pub fn requests(&self) -> Vec<GenerateRequest> {
        self.requests.lock().unwrap().clone()
    }

    fn next_response(&self) -> Option<MockResponse> {
        let mut responses = self.responses.lock().unwrap();
        if responses.len() > 1 {
            responses.pop_front()
        } else {
            responses.front().cloned()
        }
    }
}

#[async_trait]
impl GenerationDriver for MockDriver {
    async fn generate(&self, req: &GenerateRequest) -> HuddleResult<GenerateResponse> {
        self.requests.lock().unwrap().push(req.clone());
        match self.next_response() {
            Some(MockResponse::Text(text)) => Ok(GenerateResponse::from_text(text)),
            Some(MockResponse::Fail(kind)) => Err(ProviderError::new(self.provider, kind).into()),
            None => Err(ProviderError::new(self.provider, ProviderErrorKind::EmptyResponse).into()),
        }
    }

    fn provider_name(&self) -> &'static str {
        match self.provider {
            ProviderKind::Research => "perplexity",
            ProviderKind::Writer => "openai",
        }
    }

    fn model_name(&self) -> &str {
        "mock-model"
    }
}

/// Auditor that fails every article with one style issue.
#[derive(Default)]
pub struct StubAuditor {
    calls: AtomicUsize,
}

impl StubAuditor {
    /// Number of audits performed.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl ArticleAuditor for StubAuditor {
    fn audit(&self, _article: &str, _truth: &TruthRecord, _evidence: &EvidenceSet) -> AuditResult {
        self.calls.fetch_add(1, Ordering::SeqCst);
        AuditResult::from_issues(vec![Issue::new(
            IssueKind::EmDashes,
            "Multiple locations",
            "Replace em dashes with regular hyphens or rewrite sentences",
        )])
    }
}

/// In-memory league with per-week scoring entries.
///
/// Weeks without entries answer "not found", like the live API.
pub struct FixtureSource {
    league: LeagueInfo,
    users: Vec<LeagueUser>,
    rosters: Vec<LeagueRoster>,
    weeks: HashMap<u32, Vec<MatchupEntry>>,
    players: Arc<PlayerDirectory>,
    matchup_calls: AtomicUsize,
}

impl FixtureSource {
    /// Number of per-week matchup fetches.
    pub fn matchup_calls(&self) -> usize {
        self.matchup_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SportsDataSource for FixtureSource {
    async fn league(&self) -> HuddleResult<LeagueInfo> {
        Ok(self.league.clone())
    }

    async fn users(&self) -> HuddleResult<Vec<LeagueUser>> {
        Ok(self.users.clone())
    }

    async fn rosters(&self) -> HuddleResult<Vec<LeagueRoster>> {
        Ok(self.rosters.clone())
    }

    async fn matchups(&self, week: u32) -> HuddleResult<Vec<MatchupEntry>> {
        self.matchup_calls.fetch_add(1, Ordering::SeqCst);
        self.weeks.get(&week).cloned().ok_or_else(|| {
            SleeperError::new(SleeperErrorKind::NotFound(format!("matchups/{}", week))).into()
        })
    }

    async fn transactions(&self, _week: u32) -> HuddleResult<Vec<Transaction>> {
        Ok(Vec::new())
    }

    async fn players(&self) -> HuddleResult<Arc<PlayerDirectory>> {
        Ok(self.players.clone())
    }
}

fn user(id: &str, team_name: &str) -> LeagueUser {
    LeagueUser {
        user_id: id.into(),
        username: Some(format!("{}_login", id)),
        display_name: None,
        metadata: Some(UserMetadata {
            team_name: Some(team_name.into()),
        }),
    }
}

fn roster(roster_id: u32, owner: &str) -> LeagueRoster {
    LeagueRoster {
        roster_id,
        owner_id: Some(owner.into()),
        players: None,
        starters: None,
    }
}

fn player(first: &str, last: &str, position: &str, team: &str) -> PlayerRecord {
    PlayerRecord {
        first_name: Some(first.into()),
        last_name: Some(last.into()),
        position: Some(position.into()),
        team: Some(team.into()),
    }
}

/// Scoring entry; every listed player starts.
pub fn entry(
    roster_id: u32,
    matchup_id: Option<u32>,
    points: f64,
    players: &[(&str, f64)],
) -> MatchupEntry {
    MatchupEntry {
        roster_id,
        matchup_id,
        points: Some(points),
        players_points: Some(
            players
                .iter()
                .map(|(id, pts)| (id.to_string(), *pts))
                .collect::<BTreeMap<_, _>>(),
        ),
        starters: Some(players.iter().map(|(id, _)| id.to_string()).collect()),
    }
}

/// Three-team league: Alpha (roster 1), Beta (roster 2), Gamma (roster 3).
///
/// | week | result                         | bye          |
/// |------|--------------------------------|--------------|
/// | 1    | Alpha 100.0 over Beta 90.0     | Gamma 80.0   |
/// | 2    | Gamma 105.0 over Alpha 95.0    | Beta 70.0    |
/// | 3    | Beta 110.0 ties Gamma 110.0    | Alpha 88.0   |
/// | 4    | Alpha 101.0 over Beta 99.0     | Gamma 77.0   |
/// | 5    | Alpha 120.5 over Beta 110.0    | Gamma 95.0   |
///
/// After week 5: Alpha 4-1, Beta 1.5-3.5, Gamma 4.5-0.5.
pub fn league() -> FixtureSource {
    let players: PlayerDirectory = [
        ("4046", player("Josh", "Allen", "QB", "BUF")),
        ("6794", player("Justin", "Jefferson", "WR", "MIN")),
        ("4866", player("Saquon", "Barkley", "RB", "PHI")),
        ("1466", player("Travis", "Kelce", "TE", "KC")),
        ("3198", player("Derrick", "Henry", "RB", "BAL")),
    ]
    .into_iter()
    .map(|(id, record)| (id.to_string(), record))
    .collect();

    let alpha = |pts: f64| entry(1, Some(1), pts, &[("4046", 24.3), ("6794", 18.2)]);
    let mut weeks = HashMap::new();
    weeks.insert(
        1,
        vec![
            alpha(100.0),
            entry(2, Some(1), 90.0, &[("1466", 9.0)]),
            entry(3, None, 80.0, &[("3198", 11.0)]),
        ],
    );
    weeks.insert(
        2,
        vec![
            entry(1, Some(1), 95.0, &[("4046", 12.0)]),
            entry(3, Some(1), 105.0, &[("3198", 16.0)]),
            entry(2, Some(2), 70.0, &[("1466", 6.0)]),
        ],
    );
    weeks.insert(
        3,
        vec![
            entry(2, Some(1), 110.0, &[("1466", 14.0)]),
            entry(3, Some(1), 110.0, &[("3198", 13.0)]),
            entry(1, None, 88.0, &[("4046", 20.0)]),
        ],
    );
    weeks.insert(
        4,
        vec![
            alpha(101.0),
            entry(2, Some(1), 99.0, &[("1466", 10.0)]),
            entry(3, None, 77.0, &[("3198", 7.0)]),
        ],
    );
    weeks.insert(
        5,
        vec![
            alpha(120.5),
            entry(2, Some(1), 110.0, &[("4866", 4.0), ("1466", 12.0)]),
            entry(3, None, 95.0, &[("3198", 20.0)]),
        ],
    );

    FixtureSource {
        league: LeagueInfo {
            league_id: "1180000000000000000".into(),
            name: Some("Sunday Scaries".into()),
            season: Some("2024".into()),
            status: Some("in_season".into()),
            total_rosters: Some(3),
        },
        users: vec![user("u1", "Alpha"), user("u2", "Beta"), user("u3", "Gamma")],
        rosters: vec![roster(1, "u1"), roster(2, "u2"), roster(3, "u3")],
        weeks,
        players: Arc::new(players),
        matchup_calls: AtomicUsize::new(0),
    }
}

/// An article the rule auditor accepts for `truth` and `evidence`.
///
/// Every matchup gets a header with exact scores and records, every
/// evidence player is named next to their team, and filler brings the
/// length to roughly eleven hundred words.
pub fn passing_article(truth: &TruthRecord, evidence: &EvidenceSet) -> String {
    let record = |team: &str| {
        truth
            .record_for(team)
            .map(|r| r.record.clone())
            .unwrap_or_default()
    };
    let filler = "the league kept rolling along ".repeat(36);

    let mut sections = vec![format!("Week {} recap\n", truth.week)];
    for matchup in &truth.matchups {
        if matchup.is_bye() {
            sections.push(format!(
                "{} ({}) spent the week on a bye.\n\n{}",
                matchup.team_a,
                record(&matchup.team_a),
                filler
            ));
        } else {
            sections.push(format!(
                "{} vs {}: {}-{} ({} vs {})\n\n{}",
                matchup.team_a,
                matchup.team_b,
                matchup.team_a_score,
                matchup.team_b_score,
                record(&matchup.team_a),
                record(&matchup.team_b),
                filler
            ));
        }
    }
    for entry in &evidence.player_evidence {
        sections.push(format!("{} leaned on {} all afternoon.", entry.team_name, entry.player));
    }
    sections.push(filler.repeat(5));
    sections.join("\n\n")
}
