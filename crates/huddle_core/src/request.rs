//! Request and response types for text generation.

use crate::Message;
use derive_builder::Builder;
use serde::{Deserialize, Serialize};

/// Provider-neutral generation request.
///
/// Optional parameters left as `None` are omitted from the wire request so
/// the provider applies its own defaults.
///
/// # Examples
///
/// ```
/// use huddle_core::{GenerateRequest, Message};
///
/// let request = GenerateRequest::builder()
///     .messages(vec![Message::user("Hello!")])
///     .max_tokens(100u32)
///     .model("gpt-4o")
///     .build()
///     .unwrap();
///
/// assert_eq!(request.messages.len(), 1);
/// assert_eq!(request.max_tokens, Some(100));
/// assert_eq!(request.temperature, None);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default, Builder)]
#[builder(setter(into, strip_option), default)]
pub struct GenerateRequest {
    /// The conversation messages to send
    pub messages: Vec<Message>,
    /// Maximum number of tokens to generate
    pub max_tokens: Option<u32>,
    /// Sampling temperature (0.0 to 2.0)
    pub temperature: Option<f32>,
    /// Model identifier to use instead of the driver default
    pub model: Option<String>,
}

impl GenerateRequest {
    /// Creates a new builder for `GenerateRequest`.
    pub fn builder() -> GenerateRequestBuilder {
        GenerateRequestBuilder::default()
    }

    /// Total characters across all message bodies.
    pub fn prompt_chars(&self) -> usize {
        self.messages.iter().map(|m| m.content.chars().count()).sum()
    }
}

/// Text produced by a generation provider.
///
/// # Examples
///
/// ```
/// use huddle_core::GenerateResponse;
///
/// let response = GenerateResponse::from_text("Week 5 was wild.");
/// assert_eq!(response.text(), "Week 5 was wild.");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerateResponse {
    /// Completion text, joined across choices
    pub content: String,
}

impl GenerateResponse {
    /// Creates a response holding the given completion text.
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            content: text.into(),
        }
    }

    /// Completion text.
    pub fn text(&self) -> String {
        self.content.clone()
    }
}
