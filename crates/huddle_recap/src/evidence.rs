//! Key-player evidence: provider research with a deterministic fallback.

use crate::prompts::{RESEARCH_SYSTEM, research_prompt};
use crate::{KeyPlayer, parse_json_response, select_all};
use huddle_core::{EvidenceSet, GenerateRequest, Message, PlayerEvidence, RecapStage, TruthRecord};
use huddle_error::{
    HuddleResult, ProviderError, ProviderErrorKind, ProviderKind, RecapError, RecapErrorKind,
};
use huddle_interface::GenerationDriver;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Sampling temperature for research calls.
pub const RESEARCH_TEMPERATURE: f32 = 0.1;
/// Output budget for research calls.
pub const RESEARCH_MAX_TOKENS: u32 = 4000;

/// Gathers an [`EvidenceSet`] for the week's storyline players.
///
/// One consolidated research call is made with the primary model, then one
/// with the fallback model. When both fail the set is synthesized from the
/// truth record alone.
pub struct EvidenceGatherer {
    driver: Arc<dyn GenerationDriver>,
    primary_model: String,
    fallback_model: String,
}

impl EvidenceGatherer {
    /// Creates a gatherer over a research driver.
    pub fn new(
        driver: Arc<dyn GenerationDriver>,
        primary_model: impl Into<String>,
        fallback_model: impl Into<String>,
    ) -> Self {
        Self {
            driver,
            primary_model: primary_model.into(),
            fallback_model: fallback_model.into(),
        }
    }

    /// Gathers evidence for `truth`.
    ///
    /// # Errors
    ///
    /// Returns [`RecapErrorKind::EmptyEvidence`] when neither research nor
    /// synthesis yields a single entry, or an error if the prompt cannot be
    /// serialized.
    #[instrument(skip_all, fields(season = truth.season, week = truth.week))]
    pub async fn gather(&self, truth: &TruthRecord) -> HuddleResult<EvidenceSet> {
        let players = select_all(truth);
        info!(players = players.len(), "Selected key players");

        if !players.is_empty() {
            let prompt = research_prompt(truth, &players)?;
            for model in [&self.primary_model, &self.fallback_model] {
                match self.research(model, &prompt, truth).await {
                    Ok(evidence) => {
                        info!(
                            model = %model,
                            entries = evidence.player_evidence.len(),
                            references = evidence.references.len(),
                            "Research evidence accepted"
                        );
                        return Ok(evidence);
                    }
                    Err(e) => warn!(model = %model, error = %e, "Research attempt rejected"),
                }
            }
            warn!("Research failed, synthesizing evidence from the truth record");
        }

        let evidence = synthesize_evidence(&players);
        if evidence.is_empty() {
            return Err(RecapError::new(RecapStage::Evidence, RecapErrorKind::EmptyEvidence).into());
        }
        info!(entries = evidence.player_evidence.len(), "Synthesized evidence");
        Ok(evidence)
    }

    async fn research(
        &self,
        model: &str,
        prompt: &str,
        truth: &TruthRecord,
    ) -> HuddleResult<EvidenceSet> {
        let request = GenerateRequest::builder()
            .messages(vec![Message::system(RESEARCH_SYSTEM), Message::user(prompt)])
            .temperature(RESEARCH_TEMPERATURE)
            .max_tokens(RESEARCH_MAX_TOKENS)
            .model(model)
            .build()
            .map_err(|e| research_error(ProviderErrorKind::Schema(e.to_string())))?;

        let response = self.driver.generate(&request).await?;
        let text = response.text();
        debug!(chars = text.len(), "Research response received");

        let value =
            parse_json_response(&text).map_err(|e| research_error(ProviderErrorKind::Parse(e)))?;
        Ok(validate_evidence(value, truth)?)
    }
}

#[track_caller]
fn research_error(kind: ProviderErrorKind) -> ProviderError {
    ProviderError::new(ProviderKind::Research, kind)
}

/// Checks a parsed research payload against the expected shape.
///
/// Types are enforced by deserialization; then every entry must name a
/// player and a team from `truth`. A player found by exact name on a week
/// roster must be bound to that roster's team. Every reference must carry a
/// title and url.
///
/// # Errors
///
/// Returns a research [`ProviderErrorKind::Schema`] error on any violation.
pub fn validate_evidence(value: Value, truth: &TruthRecord) -> Result<EvidenceSet, ProviderError> {
    let schema = |message: String| research_error(ProviderErrorKind::Schema(message));

    if !value.is_object() {
        return Err(schema("response is not a JSON object".into()));
    }
    let evidence: EvidenceSet =
        serde_json::from_value(value).map_err(|e| schema(e.to_string()))?;

    if evidence.is_empty() {
        return Err(schema("player_evidence is empty".into()));
    }
    for (i, entry) in evidence.player_evidence.iter().enumerate() {
        if entry.player.trim().is_empty() {
            return Err(schema(format!("player_evidence[{}] has no player", i)));
        }
        if truth.team(&entry.team_name).is_none() {
            return Err(schema(format!(
                "player_evidence[{}] names unknown team '{}'",
                i, entry.team_name
            )));
        }
        if let Some(rostered) = roster_team(truth, &entry.player)
            && rostered != entry.team_name
        {
            return Err(schema(format!(
                "player_evidence[{}] binds '{}' to '{}' but the week roster has them on '{}'",
                i, entry.player, entry.team_name, rostered
            )));
        }
    }
    for reference in &evidence.references {
        if reference.title.trim().is_empty() || reference.url.trim().is_empty() {
            return Err(schema(format!("reference {} lacks a title or url", reference.id)));
        }
    }
    Ok(evidence)
}

/// Team whose week roster carries a player with exactly this name.
fn roster_team<'a>(truth: &'a TruthRecord, player: &str) -> Option<&'a str> {
    let player = player.trim();
    truth
        .teams
        .iter()
        .find(|t| {
            t.players
                .iter()
                .any(|p| p.player_name.eq_ignore_ascii_case(player))
        })
        .map(|t| t.team_name.as_str())
}

/// Builds evidence from truth-record data only.
///
/// Secondary stats are back-derived from fantasy points with fixed ratios per
/// position. No references are produced.
pub fn synthesize_evidence(players: &[KeyPlayer<'_>]) -> EvidenceSet {
    let player_evidence = players
        .iter()
        .map(|key| {
            let snapshot = key.player;
            let fp = snapshot.points();
            let mut entry = PlayerEvidence::new(&snapshot.player_name, key.team_name);
            entry.is_starter = Some(snapshot.is_starter);
            entry.week_stats.insert("fantasy_points".into(), fp);

            let stats: Vec<(&str, f64)> = match snapshot.position.as_deref() {
                Some("QB") if fp > 5.0 => vec![
                    ("passing_yards", (fp * 8.0).round()),
                    ("passing_touchdowns", (fp / 6.0).floor()),
                ],
                Some("RB") if fp > 3.0 => vec![
                    ("rushing_yards", (fp * 4.0).round()),
                    ("rushing_touchdowns", (fp / 8.0).floor()),
                ],
                Some("WR" | "TE") if fp > 3.0 => vec![
                    ("receiving_yards", (fp * 5.0).round()),
                    ("receptions", (fp / 2.0).floor().max(1.0)),
                ],
                _ => Vec::new(),
            };
            for (name, value) in stats {
                entry.week_stats.insert(name.to_string(), value);
            }

            entry.advanced_notes = Some(format!(
                "{} for {} - {} fantasy points",
                snapshot.position.as_deref().unwrap_or("Player"),
                key.team_name,
                fp
            ));
            entry
        })
        .collect();

    EvidenceSet {
        player_evidence,
        references: Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use huddle_core::{MatchupResult, PlayerSnapshot, TeamSnapshot};
    use serde_json::json;

    fn truth() -> TruthRecord {
        let qb = PlayerSnapshot {
            player_id: "4046".into(),
            player_name: "Josh Allen".into(),
            position: Some("QB".into()),
            nfl_team: Some("BUF".into()),
            fantasy_points: Some(24.3),
            is_starter: true,
        };
        TruthRecord {
            league_name: None,
            season: 2024,
            week: 5,
            teams: vec![
                TeamSnapshot {
                    team_name: "Alpha".into(),
                    players: vec![qb],
                },
                TeamSnapshot {
                    team_name: "Beta".into(),
                    players: Vec::new(),
                },
            ],
            matchups: vec![MatchupResult::bye(5, "Alpha", 24.3)],
            records_after_week: Vec::new(),
            issues: Vec::new(),
        }
    }

    #[test]
    fn valid_payload_is_accepted() {
        let value = json!({
            "player_evidence": [{
                "player": "Josh Allen",
                "team_name": "Alpha",
                "week_stats": {"fantasy_points": 24.3},
                "kickoff_window": "SNF"
            }],
            "references": [{"id": "1", "title": "Recap", "url": "https://espn.com/a"}]
        });
        let evidence = validate_evidence(value, &truth()).unwrap();
        assert_eq!(evidence.player_evidence.len(), 1);
        assert_eq!(evidence.reference_ids().into_iter().collect::<Vec<_>>(), vec![1]);
    }

    #[test]
    fn schema_violations_are_rejected() {
        let cases = [
            json!([]),
            json!({"player_evidence": []}),
            json!({"player_evidence": [{"player": "", "team_name": "Alpha"}]}),
            json!({"player_evidence": [{"player": "Josh Allen", "team_name": "Nobody"}]}),
            json!({"player_evidence": [{"player": "josh allen", "team_name": "Beta"}]}),
            json!({"player_evidence": [{"player": "Josh Allen", "team_name": "Alpha",
                "week_stats": {"fantasy_points": "lots"}}]}),
            json!({"player_evidence": [{"player": "Josh Allen", "team_name": "Alpha",
                "kickoff_window": "Saturday"}]}),
            json!({"player_evidence": [{"player": "Josh Allen", "team_name": "Alpha"}],
                "references": [{"id": 1, "title": "", "url": "https://x"}]}),
        ];
        for value in cases {
            let err = validate_evidence(value.clone(), &truth()).unwrap_err();
            assert_eq!(err.provider, ProviderKind::Research, "{}", value);
            assert!(matches!(err.kind, ProviderErrorKind::Schema(_)), "{}", value);
        }
    }

    #[test]
    fn unrostered_names_keep_the_provider_binding() {
        let value = json!({
            "player_evidence": [{"player": "Allen", "team_name": "Beta"}]
        });
        let evidence = validate_evidence(value, &truth()).unwrap();
        assert_eq!(evidence.player_evidence[0].team_name, "Beta");
    }

    #[test]
    fn roster_mismatch_names_the_rostered_team() {
        let value = json!({
            "player_evidence": [{"player": "Josh Allen", "team_name": "Beta"}]
        });
        let err = validate_evidence(value, &truth()).unwrap_err();
        assert!(err.to_string().contains("'Alpha'"), "{}", err);
    }

    #[test]
    fn synthesized_stats_follow_position_ratios() {
        let truth = truth();
        let players = select_all(&truth);
        let evidence = synthesize_evidence(&players);
        let entry = &evidence.player_evidence[0];
        assert_eq!(entry.week_stats["fantasy_points"], 24.3);
        assert_eq!(entry.week_stats["passing_yards"], 194.0);
        assert_eq!(entry.week_stats["passing_touchdowns"], 4.0);
        assert_eq!(
            entry.advanced_notes.as_deref(),
            Some("QB for Alpha - 24.3 fantasy points")
        );
        assert!(evidence.references.is_empty());
    }
}
