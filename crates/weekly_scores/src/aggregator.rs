//! Weekly score aggregation.
//!
//! One run reads four record batches (sleep and health, for the current and
//! the previous Sunday–Saturday week) and reduces them into a
//! [`WeeklyScoreReport`]. Nothing is cached or written back; every run
//! fetches again.

use chrono::NaiveDate;
use tracing::{debug, info};
use wellness_store::{DailyHealthRecord, DailySleepRecord, DocumentStore, IdentityProvider};

use crate::error::ScoreResult;
use crate::report::{SleepEfficiency, TrackingCoverage, WeeklyScoreReport};
use crate::scoring::{
    HealthTally, SleepTally, coverage_percentage, days_tracked_percentage,
    physical_activity_percentage, sleep_efficiency_score,
};
use crate::week::WeekWindow;

pub const REPORTS_COMPUTED_TOTAL: &str = "weekly_reports_computed_total";

pub struct WeeklyScoreAggregator<S: DocumentStore> {
    store: S,
}

impl<S: DocumentStore> WeeklyScoreAggregator<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Score the week containing `reference_date` for `user_id`.
    ///
    /// With no user (or an empty id) the all-zero report is returned without
    /// touching the store. A failed query aborts the run with
    /// [`ScoreError::Fetch`](crate::error::ScoreError::Fetch).
    pub async fn compute_weekly_report(
        &self,
        user_id: Option<&str>,
        reference_date: NaiveDate,
    ) -> ScoreResult<WeeklyScoreReport> {
        let Some(user_id) = user_id.filter(|id| !id.is_empty()) else {
            info!("no signed-in user; skipping weekly report");
            return Ok(WeeklyScoreReport::default());
        };

        let window = WeekWindow::containing(reference_date);
        debug!(
            user_id,
            week_start = %window.current.start_key(),
            week_end = %window.current.end_key(),
            "computing weekly report"
        );

        let (sleep, previous_sleep, health, previous_health) = tokio::try_join!(
            self.store.query_sleep_records(user_id, &window.current),
            self.store.query_sleep_records(user_id, &window.previous),
            self.store.query_health_records(user_id, &window.current),
            self.store.query_health_records(user_id, &window.previous),
        )?;

        let report = score_week(
            &window,
            &sleep,
            &previous_sleep,
            &health,
            &previous_health,
        );
        metrics::counter!(REPORTS_COMPUTED_TOTAL).increment(1);
        Ok(report)
    }

    /// Same as [`compute_weekly_report`](Self::compute_weekly_report) for
    /// whoever `identity` says is signed in.
    pub async fn compute_for_current_user(
        &self,
        identity: &dyn IdentityProvider,
        reference_date: NaiveDate,
    ) -> ScoreResult<WeeklyScoreReport> {
        let user_id = identity.current_user_id();
        self.compute_weekly_report(user_id.as_deref(), reference_date)
            .await
    }
}

/// Reduce one week of records (plus the week before) into a report.
pub fn score_week(
    window: &WeekWindow,
    sleep: &[DailySleepRecord],
    previous_sleep: &[DailySleepRecord],
    health: &[DailyHealthRecord],
    previous_health: &[DailyHealthRecord],
) -> WeeklyScoreReport {
    let sleep_tally = SleepTally::from_records(sleep);
    let previous_sleep_tally = SleepTally::from_records(previous_sleep);
    let health_tally = HealthTally::from_records(health);
    let previous_health_tally = HealthTally::from_records(previous_health);

    let avg_efficiency = sleep_tally.average();
    let previous_avg_efficiency = previous_sleep_tally.average();
    debug!(previous_avg_efficiency, avg_efficiency, nights = sleep_tally.nights, "sleep efficiency");

    let score = sleep_efficiency_score(sleep_tally.nights, avg_efficiency, previous_avg_efficiency);
    debug!(
        total_minutes = health_tally.activity_minutes,
        previous_minutes = previous_health_tally.activity_minutes,
        diet_days = health_tally.diet_days,
        stress_days = health_tally.stress_days,
        "health tallies"
    );

    WeeklyScoreReport {
        week_start: Some(window.current.start_key()),
        week_end: Some(window.current.end_key()),
        sleep_efficiency: SleepEfficiency {
            score,
            avg_efficiency,
        },
        // not backed by any data source yet
        body_comp: 0,
        nutrition: days_tracked_percentage(health_tally.diet_days),
        physical_activity: physical_activity_percentage(
            health_tally.activity_minutes,
            previous_health_tally.activity_minutes,
        ),
        stress: days_tracked_percentage(health_tally.stress_days),
        weekly_lesson: 0,
        coverage: TrackingCoverage {
            food_tracking: coverage_percentage(health_tally.caffeine_days),
            sleep_tracking: coverage_percentage(sleep_tally.nights),
        },
    }
}
