use std::time::Duration;

use chrono::NaiveDate;

use crate::error::ScoreError;
use crate::refresh::DEFAULT_REFRESH_PERIOD;

/// Settings for one invocation of the `weekly_scores` binary.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunConfig {
    /// Date whose week is scored; today when unset.
    pub reference_date: Option<NaiveDate>,
    /// Keep running and refresh when a new week starts.
    pub watch: bool,
    pub refresh_period: Duration,
}

impl RunConfig {
    pub fn from_env() -> Result<Self, ScoreError> {
        Self::from_env_with(|k| std::env::var(k).ok())
    }

    pub fn from_env_with<F>(mut get: F) -> Result<Self, ScoreError>
    where
        F: FnMut(&str) -> Option<String>,
    {
        let reference_date = get("WEEKLY_SCORES_REFERENCE_DATE")
            .filter(|s| !s.trim().is_empty())
            .map(|s| {
                NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").map_err(|e| {
                    ScoreError::Config(format!("WEEKLY_SCORES_REFERENCE_DATE '{s}': {e}"))
                })
            })
            .transpose()?;

        let watch = get("WEEKLY_SCORES_WATCH")
            .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        let refresh_period = match get("WEEKLY_SCORES_REFRESH_SECS") {
            Some(v) => {
                let secs = v.trim().parse::<u64>().map_err(|e| {
                    ScoreError::Config(format!("WEEKLY_SCORES_REFRESH_SECS '{v}': {e}"))
                })?;
                if secs == 0 {
                    return Err(ScoreError::Config(
                        "WEEKLY_SCORES_REFRESH_SECS must be positive".into(),
                    ));
                }
                Duration::from_secs(secs)
            }
            None => DEFAULT_REFRESH_PERIOD,
        };

        Ok(Self {
            reference_date,
            watch,
            refresh_period,
        })
    }
}
