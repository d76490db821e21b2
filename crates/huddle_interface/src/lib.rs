//! Trait definitions for the huddle weekly recap pipeline.
//!
//! The pipeline talks to the outside world only through these traits: a
//! sports data source, a text generation driver, and an article auditor.
//! Concrete HTTP clients live in `huddle_sleeper` and `huddle_models`.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod traits;
mod types;
mod week;

pub use traits::{ArticleAuditor, GenerationDriver, SportsDataSource};
pub use types::{
    LeagueInfo, LeagueRoster, LeagueUser, MatchupEntry, PlayerDirectory, PlayerRecord,
    Transaction, UserMetadata,
};
pub use week::{FIRST_WEEK, LAST_WEEK, validate_week};
