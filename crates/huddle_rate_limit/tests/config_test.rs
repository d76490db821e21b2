//! Tests for the layered configuration loader.

use huddle_error::ProviderKind;
use huddle_rate_limit::HuddleConfig;
use std::collections::HashMap;
use std::io::Write;
use std::path::PathBuf;

#[test]
fn bundled_file_matches_defaults() {
    let bundled = HuddleConfig::bundled().unwrap();
    assert_eq!(bundled, HuddleConfig::default());
    assert_eq!(bundled.models.research_primary, "sonar");
    assert_eq!(bundled.research.min_interval_ms, 2000);
    assert_eq!(bundled.writer.min_interval_ms, 1500);
    assert_eq!(bundled.sleeper.retry.max_retries, 2);
}

#[test]
fn partial_file_keeps_defaults() {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    writeln!(
        file,
        r#"
league_id = "1180000000000000000"
timezone = "America/Chicago"

[models]
write = "gpt-4o"
"#
    )
    .unwrap();

    let config = HuddleConfig::from_file(file.path()).unwrap();
    assert_eq!(config.league_id.as_deref(), Some("1180000000000000000"));
    assert_eq!(config.timezone, "America/Chicago");
    assert_eq!(config.models.write, "gpt-4o");
    assert_eq!(config.models.plan, "gpt-5");
    assert_eq!(config.output_dir, PathBuf::from("out"));
}

#[test]
fn environment_overrides_models_and_credentials() {
    let env: HashMap<&str, &str> = [
        ("OPENAI_API_KEY", "sk-test"),
        ("PERPLEXITY_API_KEY", "  "),
        ("MODEL_STEP2", "gpt-4o-mini"),
        ("MODEL_STEP1_FALLBACK", "sonar-pro"),
        ("TIMEZONE", "America/Los_Angeles"),
    ]
    .into_iter()
    .collect();

    let config = HuddleConfig::default()
        .with_overrides(|key| env.get(key).map(|v| v.to_string()));

    assert_eq!(config.models.plan, "gpt-4o-mini");
    assert_eq!(config.models.research_fallback, "sonar-pro");
    assert_eq!(config.timezone, "America/Los_Angeles");
    assert_eq!(config.credentials.require(ProviderKind::Writer).unwrap(), "sk-test");

    let missing = config.credentials.require(ProviderKind::Research).unwrap_err();
    assert!(missing.to_string().contains("PERPLEXITY_API_KEY"));
}

#[test]
fn credentials_are_redacted_in_debug_output() {
    let config = HuddleConfig::default()
        .with_overrides(|key| (key == "OPENAI_API_KEY").then(|| "sk-secret".to_string()));
    let rendered = format!("{:?}", config);
    assert!(!rendered.contains("sk-secret"));
    assert!(rendered.contains("<set>"));
}

#[test]
fn unreadable_file_is_a_config_error() {
    let err = HuddleConfig::from_file("/definitely/not/here.toml").unwrap_err();
    assert!(err.to_string().contains("Configuration Error"));
}
