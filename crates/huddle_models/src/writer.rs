//! Writer provider driver (OpenAI).

use crate::{ChatCompletionRequest, ChatMessage, CostLedger, OpenAICompatibleClient};
use async_trait::async_trait;
use huddle_core::{GenerateRequest, GenerateResponse};
use huddle_error::{HuddleResult, ProviderError, ProviderErrorKind, ProviderKind};
use huddle_interface::GenerationDriver;
use huddle_rate_limit::{EndpointConfig, HuddleConfig};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument};

/// Temperature sent to models that accept one and were given none.
pub const DEFAULT_TEMPERATURE: f32 = 0.7;

/// Timeout for reasoning models, which take much longer per call.
const REASONING_TIMEOUT: Duration = Duration::from_secs(300);

/// True unless `model` is in the gpt-5 family, which rejects custom
/// `max_tokens` and `temperature`.
///
/// ```
/// use huddle_models::accepts_sampling_params;
///
/// assert!(!accepts_sampling_params("gpt-5"));
/// assert!(!accepts_sampling_params("gpt-5-mini-2025-08-07"));
/// assert!(accepts_sampling_params("gpt-4o"));
/// ```
pub fn accepts_sampling_params(model: &str) -> bool {
    !model.starts_with("gpt-5")
}

/// Request timeout for `model`: 300s for the gpt-5 family, else `default`.
pub fn timeout_for_model(model: &str, default: Duration) -> Duration {
    if accepts_sampling_params(model) {
        default
    } else {
        REASONING_TIMEOUT
    }
}

/// OpenAI chat driver used for the plan, article and patch stages.
#[derive(Debug, Clone)]
pub struct WriterDriver {
    inner: OpenAICompatibleClient,
    model: String,
    timeout: Duration,
    ledger: Arc<CostLedger>,
}

impl WriterDriver {
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
            inner: OpenAICompatibleClient::new(ProviderKind::Writer, api_key, endpoint)?,
            model: model.into(),
            timeout: Duration::from_secs(endpoint.timeout_secs),
            ledger,
        })
    }

    /// Creates a writer from configuration with the article model as default.
    ///
    /// # Errors
    ///
    /// Returns `MissingApiKey` when `OPENAI_API_KEY` is not set.
    pub fn from_config(config: &HuddleConfig, ledger: Arc<CostLedger>) -> HuddleResult<Self> {
        let api_key = config.credentials.require(ProviderKind::Writer)?;
        Ok(Self::new(
            api_key,
            config.models.write.clone(),
            &config.writer,
            ledger,
        )?)
    }

    /// Wire request for `req` and the timeout to send it with.
    pub fn chat_request(
        &self,
        req: &GenerateRequest,
    ) -> Result<(ChatCompletionRequest, Duration), ProviderError> {
        let model = req.model.clone().unwrap_or_else(|| self.model.clone());
        let timeout = timeout_for_model(&model, self.timeout);
        let (max_tokens, temperature) = if accepts_sampling_params(&model) {
            (
                req.max_tokens,
                Some(req.temperature.unwrap_or(DEFAULT_TEMPERATURE)),
            )
        } else {
            debug!(model = %model, "Using provider defaults for sampling");
            (None, None)
        };

        let request = ChatCompletionRequest::builder()
            .model(model)
            .messages(req.messages.iter().map(ChatMessage::from).collect::<Vec<_>>())
            .max_tokens(max_tokens)
            .temperature(temperature)
            .build()
            .map_err(|e| {
                ProviderError::new(
                    ProviderKind::Writer,
                    ProviderErrorKind::Request {
                        message: format!("Failed to build request: {}", e),
                        connection: false,
                    },
                )
            })?;
        Ok((request, timeout))
    }
}

#[async_trait]
impl GenerationDriver for WriterDriver {
    #[instrument(
        skip(self, req),
        fields(provider = "openai", model = %req.model.as_deref().unwrap_or(&self.model))
    )]
    async fn generate(&self, req: &GenerateRequest) -> HuddleResult<GenerateResponse> {
        let (request, timeout) = self.chat_request(req)?;
        let response = self.inner.chat(&request, timeout).await?;
        let text = response.first_text().unwrap_or_default().to_string();
        self.ledger
            .record(request.model(), request.prompt_chars(), text.chars().count());
        Ok(GenerateResponse::from_text(text))
    }

    fn provider_name(&self) -> &'static str {
        "openai"
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use huddle_core::Message;

    fn driver(model: &str) -> WriterDriver {
        let config = HuddleConfig::default();
        WriterDriver::new("key", model, &config.writer, Arc::new(CostLedger::default())).unwrap()
    }

    fn request() -> GenerateRequest {
        GenerateRequest::builder()
            .messages(vec![Message::user("Write the recap")])
            .max_tokens(8000u32)
            .build()
            .unwrap()
    }

    #[test]
    fn gpt5_family_sends_provider_defaults_only() {
        let (request, timeout) = driver("gpt-5").chat_request(&request()).unwrap();
        assert_eq!(*request.max_tokens(), None);
        assert_eq!(*request.temperature(), None);
        assert_eq!(timeout, Duration::from_secs(300));
    }

    #[test]
    fn other_models_get_budget_and_default_temperature() {
        let (request, timeout) = driver("gpt-4o").chat_request(&request()).unwrap();
        assert_eq!(*request.max_tokens(), Some(8000));
        assert_eq!(*request.temperature(), Some(DEFAULT_TEMPERATURE));
        assert_eq!(timeout, Duration::from_secs(120));
    }

    #[test]
    fn request_model_selects_branch() {
        let req = GenerateRequest::builder()
            .messages(vec![Message::user("Patch")])
            .max_tokens(4000u32)
            .model("gpt-5-mini")
            .build()
            .unwrap();
        let (request, _) = driver("gpt-4o").chat_request(&req).unwrap();
        assert_eq!(request.model(), "gpt-5-mini");
        assert_eq!(*request.max_tokens(), None);
    }

    #[test]
    fn missing_key_names_openai() {
        let config = HuddleConfig::default();
        let err = WriterDriver::from_config(&config, Arc::new(CostLedger::default())).unwrap_err();
        assert_eq!(err.provider(), Some(ProviderKind::Writer));
        assert!(err.to_string().contains("OPENAI_API_KEY"));
    }
}
