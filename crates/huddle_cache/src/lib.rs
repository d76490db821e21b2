//! On-disk cache of pipeline stage artifacts.
//!
//! Each `(season, week)` owns one directory under the cache root holding one
//! file per stage. A present, readable artifact lets a rerun skip its stage.

#![warn(missing_docs)]

mod cache;

pub use cache::{StepCache, WeekCache};
