//! Read-only client for the public Sleeper fantasy football API.
//!
//! [`SleeperClient`] implements [`huddle_interface::SportsDataSource`] for one
//! league. Requests are paced and retried per the `[sleeper]` configuration,
//! and the multi-megabyte player database is fetched at most once per client.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod client;

pub use client::SleeperClient;
