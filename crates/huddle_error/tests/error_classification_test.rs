//! Tests for retry classification and provider attribution.

use huddle_core::RecapStage;
use huddle_error::{
    HuddleError, ProviderError, ProviderErrorKind, ProviderKind, RecapError, RetryableError,
    SleeperError, SleeperErrorKind, is_transient_status,
};

#[test]
fn non_transient_client_errors_are_permanent() {
    for status in [400, 401, 403, 404, 408, 422] {
        let err = ProviderError::new(
            ProviderKind::Writer,
            ProviderErrorKind::Http {
                status_code: status,
                message: "nope".into(),
            },
        );
        assert!(!err.is_retryable(), "status {status} should not retry");
    }
}

#[test]
fn only_throttling_and_server_statuses_are_transient() {
    let transient: Vec<u16> = (400..600).filter(|s| is_transient_status(*s)).collect();
    assert_eq!(transient, vec![429, 500, 502, 503, 504]);
    assert!(!is_transient_status(408));
}

#[test]
fn throttling_and_gateway_errors_retry() {
    for status in [429, 500, 502, 503, 504] {
        let err = ProviderError::new(
            ProviderKind::Research,
            ProviderErrorKind::Http {
                status_code: status,
                message: "busy".into(),
            },
        );
        assert!(err.is_retryable(), "status {status} should retry");
    }
}

#[test]
fn connection_failures_retry_but_schema_failures_do_not() {
    let dropped = ProviderErrorKind::Request {
        message: "connection reset".into(),
        connection: true,
    };
    assert!(dropped.is_retryable());
    assert!(!ProviderErrorKind::Schema("player_evidence missing".into()).is_retryable());
}

#[test]
fn huddle_error_exposes_not_found_and_provider() {
    let missing: HuddleError =
        SleeperError::new(SleeperErrorKind::NotFound("/league/1/matchups/9".into())).into();
    assert!(missing.is_not_found());
    assert_eq!(missing.provider(), None);

    let writer: HuddleError =
        ProviderError::new(ProviderKind::Writer, ProviderErrorKind::EmptyResponse).into();
    assert!(!writer.is_not_found());
    assert_eq!(writer.provider(), Some(ProviderKind::Writer));
    assert!(writer.to_string().contains("OpenAI"));
}

#[test]
fn upstream_recap_error_keeps_cause_verbatim() {
    let cause = ProviderError::new(
        ProviderKind::Writer,
        ProviderErrorKind::MissingApiKey("OPENAI_API_KEY"),
    );
    let err = RecapError::upstream(RecapStage::Plan, &cause);
    let text = err.to_string();
    assert!(text.contains("stage 'plan'"));
    assert!(text.contains("OPENAI_API_KEY is not set"));
}
