//! Generation provider drivers for huddle.
//!
//! Both providers speak the OpenAI chat-completions wire format, so they share
//! [`OpenAICompatibleClient`] for pacing, retry and error mapping:
//!
//! - [`ResearchDriver`] talks to Perplexity with web-search filters.
//! - [`WriterDriver`] talks to OpenAI and decides per model which optional
//!   sampling parameters may be sent.
//!
//! Every call is priced into a shared [`CostLedger`].
//!
//! ```no_run
//! use huddle_core::{GenerateRequest, Message};
//! use huddle_interface::GenerationDriver;
//! use huddle_models::{CostLedger, WriterDriver};
//! use huddle_rate_limit::HuddleConfig;
//! use std::sync::Arc;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = HuddleConfig::load()?;
//! let ledger = Arc::new(CostLedger::new(config.pricing.clone()));
//! let writer = WriterDriver::from_config(&config, ledger)?;
//! let request = GenerateRequest::builder()
//!     .messages(vec![Message::user("Hello")])
//!     .build()?;
//! let response = writer.generate(&request).await?;
//! println!("{}", response.text());
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod cost;
mod dto;
mod openai_compat;
mod research;
mod writer;

pub use cost::{CostEntry, CostLedger, estimate_tokens};
pub use dto::{
    ChatChoice, ChatCompletionRequest, ChatCompletionRequestBuilder, ChatCompletionResponse,
    ChatMessage, ChatResponseMessage, ChatUsage,
};
pub use openai_compat::OpenAICompatibleClient;
pub use research::{ResearchDriver, SEARCH_DOMAINS, SEARCH_RECENCY};
pub use writer::{DEFAULT_TEMPERATURE, WriterDriver, accepts_sampling_params, timeout_for_model};
