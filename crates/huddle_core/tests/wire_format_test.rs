//! Tests for the JSON shapes persisted in the week cache.

use huddle_core::{
    AuditResult, AuditStatus, EvidenceSet, Issue, IssueKind, KickoffWindow, MatchupResult,
    RecapStage,
};
use serde_json::json;
use strum::IntoEnumIterator;

#[test]
fn audit_uses_type_and_status_literals() {
    let audit = AuditResult::from_issues(vec![Issue::new(
        IssueKind::WordCountLow,
        "Overall article",
        "Expand article from 899 to 900-1500 words",
    )]);
    let value = serde_json::to_value(&audit).unwrap();
    assert_eq!(value["status"], "FAIL");
    assert_eq!(value["issues"][0]["type"], "word_count_low");

    let parsed: AuditResult = serde_json::from_value(json!({"status": "PASS"})).unwrap();
    assert_eq!(parsed.status, AuditStatus::Pass);
    assert!(parsed.issues.is_empty());
}

#[test]
fn unknown_player_keeps_legacy_tag() {
    assert_eq!(IssueKind::UnknownPlayer.to_string(), "player_not_in_step0");
}

#[test]
fn evidence_accepts_provider_shapes() {
    let payload = json!({
        "player_evidence": [{
            "player": "Josh Allen",
            "team_name": "Alpha",
            "is_starter": true,
            "week_stats": {"fantasy_points": 31.4, "passing_yards": 280},
            "kickoff_window": "Sun Late",
            "quotes": [{"text": "Unstoppable", "source": "ESPN"}]
        }],
        "references": [
            {"id": "1", "title": "Recap", "url": "https://espn.com/x", "publisher": "ESPN"},
            {"id": 2, "title": "Notes", "url": "https://nfl.com/y"}
        ]
    });
    let evidence: EvidenceSet = serde_json::from_value(payload).unwrap();
    assert_eq!(evidence.player_evidence[0].kickoff_window, Some(KickoffWindow::SundayLate));
    assert_eq!(evidence.player_evidence[0].fantasy_points(), 31.4);
    assert_eq!(evidence.reference_ids().into_iter().collect::<Vec<_>>(), vec![1, 2]);
}

#[test]
fn evidence_rejects_unknown_kickoff_window() {
    let payload = json!({
        "player_evidence": [{"player": "A B", "team_name": "Alpha", "kickoff_window": "Saturday"}],
        "references": []
    });
    assert!(serde_json::from_value::<EvidenceSet>(payload).is_err());
}

#[test]
fn bye_serializes_sentinels() {
    let value = serde_json::to_value(MatchupResult::bye(5, "Gamma", 95.0)).unwrap();
    assert_eq!(value["team_b"], "BYE");
    assert_eq!(value["winner"], "Gamma");
    assert_eq!(value["loser"], "BYE");
}

#[test]
fn stages_map_to_distinct_artifacts() {
    let names: Vec<&str> = RecapStage::iter().map(|s| s.artifact_name()).collect();
    assert_eq!(
        names,
        vec![
            "step0_truth.json",
            "step1_evidence.json",
            "step2_plan.txt",
            "step3_recap.md",
            "step4_audit.json"
        ]
    );
}
