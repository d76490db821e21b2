//! Error types for the huddle workspace.
//!
//! # Error Hierarchy
//!
//! All errors follow the `ErrorKind` + wrapper struct pattern:
//! - `*ErrorKind` enum defines specific error conditions
//! - `*Error` struct wraps the kind with source location tracking
//! - All errors use `#[track_caller]` for automatic location capture
//!
//! [`HuddleError`] gathers every domain error so `?` works across crates.
//!
//! # Examples
//!
//! ```
//! use huddle_error::{HuddleResult, SleeperError, SleeperErrorKind};
//!
//! fn fetch_league() -> HuddleResult<String> {
//!     Err(SleeperError::new(SleeperErrorKind::NotFound("league/42".into())))?
//! }
//!
//! assert!(fetch_league().unwrap_err().is_not_found());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod cache;
mod config;
mod error;
mod json;
mod provider;
mod recap;
mod retry;
mod sleeper;

pub use cache::{CacheError, CacheErrorKind};
pub use config::ConfigError;
pub use error::{HuddleError, HuddleErrorKind, HuddleResult};
pub use json::JsonError;
pub use provider::{ProviderError, ProviderErrorKind, ProviderKind};
pub use recap::{RecapError, RecapErrorKind};
pub use retry::{RetryableError, is_transient_status};
pub use sleeper::{SleeperError, SleeperErrorKind};
