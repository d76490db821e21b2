//! Shared client for OpenAI-compatible chat-completions endpoints.

use crate::{ChatCompletionRequest, ChatCompletionResponse};
use huddle_error::{ProviderError, ProviderErrorKind, ProviderKind};
use huddle_rate_limit::{EndpointConfig, MinIntervalLimiter, RetryPolicy};
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, error, instrument};

/// Longest slice of an error body kept in an error message.
const ERROR_BODY_LIMIT: usize = 500;

/// Chat-completions client with pacing and retry.
///
/// Each attempt waits for the limiter first, so retries are paced too.
#[derive(Debug, Clone)]
pub struct OpenAICompatibleClient {
    http: Client,
    endpoint: String,
    api_key: String,
    provider: ProviderKind,
    limiter: MinIntervalLimiter,
    retry: RetryPolicy,
}

impl OpenAICompatibleClient {
    /// Creates a client for `provider` from its endpoint settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    #[instrument(skip(api_key, endpoint), fields(provider = %provider, url = %endpoint.base_url))]
    pub fn new(
        provider: ProviderKind,
        api_key: impl Into<String>,
        endpoint: &EndpointConfig,
    ) -> Result<Self, ProviderError> {
        let http = Client::builder().gzip(true).build().map_err(|e| {
            ProviderError::new(
                provider,
                ProviderErrorKind::Request {
                    message: format!("Failed to build HTTP client: {}", e),
                    connection: false,
                },
            )
        })?;

        debug!(min_interval_ms = endpoint.min_interval_ms, "Created chat client");

        Ok(Self {
            http,
            endpoint: endpoint.base_url.clone(),
            api_key: api_key.into(),
            provider,
            limiter: MinIntervalLimiter::from_millis(endpoint.min_interval_ms),
            retry: endpoint.retry,
        })
    }

    /// Provider this client talks to.
    pub fn provider(&self) -> ProviderKind {
        self.provider
    }

    /// Endpoint URL.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Sends `request`, retrying transient failures per the endpoint policy.
    ///
    /// # Errors
    ///
    /// Returns the last error once retries are exhausted, or the first
    /// non-transient one.
    pub async fn chat(
        &self,
        request: &ChatCompletionRequest,
        timeout: Duration,
    ) -> Result<ChatCompletionResponse, ProviderError> {
        let label = format!("{} chat", self.provider);
        self.retry
            .run(&label, || self.send_once(request, timeout))
            .await
    }

    #[instrument(skip(self, request), fields(provider = %self.provider, model = %request.model()))]
    async fn send_once(
        &self,
        request: &ChatCompletionRequest,
        timeout: Duration,
    ) -> Result<ChatCompletionResponse, ProviderError> {
        self.limiter.acquire().await;

        debug!(
            prompt_chars = request.prompt_chars(),
            timeout_secs = timeout.as_secs(),
            "Sending chat completion"
        );

        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .timeout(timeout)
            .json(request)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(status = %status, "Chat completion rejected");
            return Err(ProviderError::new(
                self.provider,
                ProviderErrorKind::Http {
                    status_code: status.as_u16(),
                    message: truncate(&body, ERROR_BODY_LIMIT),
                },
            ));
        }

        let body = response.text().await.map_err(|e| self.transport_error(e))?;
        let parsed = parse_response(&body).map_err(|kind| ProviderError::new(self.provider, kind))?;

        debug!(response_chars = body.len(), "Received chat completion");
        Ok(parsed)
    }

    fn transport_error(&self, e: reqwest::Error) -> ProviderError {
        let connection = e.is_connect() || e.is_timeout() || e.is_request() || e.is_body();
        error!(error = %e, connection, "Chat request failed");
        ProviderError::new(
            self.provider,
            ProviderErrorKind::Request {
                message: e.to_string(),
                connection,
            },
        )
    }
}

/// Parses a chat-completions body, rejecting responses with no text.
pub(crate) fn parse_response(body: &str) -> Result<ChatCompletionResponse, ProviderErrorKind> {
    let parsed: ChatCompletionResponse = serde_json::from_str(body)
        .map_err(|e| ProviderErrorKind::Parse(format!("{}: {}", e, truncate(body, 200))))?;
    if parsed.first_text().is_none() {
        return Err(ProviderErrorKind::EmptyResponse);
    }
    Ok(parsed)
}

fn truncate(text: &str, limit: usize) -> String {
    match text.char_indices().nth(limit) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}
