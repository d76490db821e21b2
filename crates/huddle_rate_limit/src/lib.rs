//! Configuration, request pacing and retry policy for huddle.
//!
//! - [`HuddleConfig`] is the read-only capability object built once at
//!   startup from bundled defaults, user TOML files and the environment.
//! - [`MinIntervalLimiter`] enforces a minimum delay between requests to one
//!   provider.
//! - [`RetryPolicy`] retries transient failures with exponential backoff.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod limiter;
mod retry;

pub use config::{Credentials, EndpointConfig, HuddleConfig, ModelConfig, ModelPricing};
pub use limiter::MinIntervalLimiter;
pub use retry::RetryPolicy;
