//! Weekly wellness scores computed from a user's sleep and health logs.
//!
//! - [`aggregator`]: fetches two weeks of records and builds the report
//! - [`scoring`]: per-night efficiency and the tiered weekly rules
//! - [`week`]: Sunday–Saturday week boundaries
//! - [`report`]: the six-metric report shape
//! - [`middleware`]: query logging and metrics around any store
//! - [`refresh`]: recompute when a new week starts

pub mod aggregator;
pub mod config;
pub mod error;
pub mod middleware;
pub mod refresh;
pub mod report;
pub mod scoring;
pub mod week;

#[cfg(test)]
mod test_utils;

pub use aggregator::{WeeklyScoreAggregator, score_week};
pub use error::{ScoreError, ScoreResult};
pub use report::{MetricLabel, ProgressItem, WeeklyScoreReport};
pub use week::WeekWindow;
