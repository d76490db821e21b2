//! Research provider driver (Perplexity).

use crate::{ChatCompletionRequest, ChatMessage, CostLedger, OpenAICompatibleClient};
use async_trait::async_trait;
use huddle_core::{GenerateRequest, GenerateResponse};
use huddle_error::{HuddleResult, ProviderError, ProviderErrorKind, ProviderKind};
use huddle_interface::GenerationDriver;
use huddle_rate_limit::{EndpointConfig, HuddleConfig};
use std::sync::Arc;
use std::time::Duration;
use tracing::instrument;

/// Sites the research search step may cite.
pub const SEARCH_DOMAINS: [&str; 4] = ["espn.com", "nfl.com", "fantasypros.com", "thescore.com"];

/// Search recency window.
pub const SEARCH_RECENCY: &str = "week";

/// Perplexity chat driver restricted to recent fantasy coverage.
///
/// A request's `model` overrides the configured one, which is how the
/// fallback research model is reached.
#[derive(Debug, Clone)]
pub struct ResearchDriver {
    inner: OpenAICompatibleClient,
    model: String,
    timeout: Duration,
    ledger: Arc<CostLedger>,
}

impl ResearchDriver {
    /// Creates a driver from explicit parts.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(
        api_key: impl Into<String>,
        model: impl Into<String>,
        endpoint: &EndpointConfig,
        ledger: Arc<CostLedger>,
    ) -> Result<Self, ProviderError> {
        Ok(Self {
            inner: OpenAICompatibleClient::new(ProviderKind::Research, api_key, endpoint)?,
            model: model.into(),
            timeout: Duration::from_secs(endpoint.timeout_secs),
            ledger,
        })
    }

    /// Creates the primary research driver from configuration.
    ///
    /// # Errors
    ///
    /// Returns `MissingApiKey` when `PERPLEXITY_API_KEY` is not set.
    pub fn from_config(config: &HuddleConfig, ledger: Arc<CostLedger>) -> HuddleResult<Self> {
        let api_key = config.credentials.require(ProviderKind::Research)?;
        Ok(Self::new(
            api_key,
            config.models.research_primary.clone(),
            &config.research,
            ledger,
        )?)
    }

    /// Wire request for `req`, with the search filters attached.
    pub fn chat_request(
        &self,
        req: &GenerateRequest,
    ) -> Result<ChatCompletionRequest, ProviderError> {
        ChatCompletionRequest::builder()
            .model(req.model.clone().unwrap_or_else(|| self.model.clone()))
            .messages(req.messages.iter().map(ChatMessage::from).collect::<Vec<_>>())
            .max_tokens(req.max_tokens)
            .temperature(req.temperature)
            .search_domain_filter(Some(
                SEARCH_DOMAINS.iter().map(|d| d.to_string()).collect::<Vec<_>>(),
            ))
            .search_recency_filter(Some(SEARCH_RECENCY.to_string()))
            .build()
            .map_err(|e| {
                ProviderError::new(
                    ProviderKind::Research,
                    ProviderErrorKind::Request {
                        message: format!("Failed to build request: {}", e),
                        connection: false,
                    },
                )
            })
    }
}

#[async_trait]
impl GenerationDriver for ResearchDriver {
    #[instrument(
        skip(self, req),
        fields(provider = "perplexity", model = %req.model.as_deref().unwrap_or(&self.model))
    )]
    async fn generate(&self, req: &GenerateRequest) -> HuddleResult<GenerateResponse> {
        let request = self.chat_request(req)?;
        let response = self.inner.chat(&request, self.timeout).await?;
        let text = response.first_text().unwrap_or_default().to_string();
        self.ledger
            .record(request.model(), request.prompt_chars(), text.chars().count());
        Ok(GenerateResponse::from_text(text))
    }

    fn provider_name(&self) -> &'static str {
        "perplexity"
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
