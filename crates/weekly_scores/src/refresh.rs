//! Periodic recomputation of the weekly report.
//!
//! The report is computed once up front, then the loop wakes every `period`
//! and recomputes only when the day has rolled over to a Sunday, i.e. a new
//! week has started.

use std::time::Duration;

use chrono::{Datelike, NaiveDate, Weekday};
use tokio::sync::watch;
use tracing::{info, warn};
use wellness_store::{DocumentStore, IdentityProvider};

use crate::aggregator::WeeklyScoreAggregator;
use crate::report::WeeklyScoreReport;

pub const DEFAULT_REFRESH_PERIOD: Duration = Duration::from_secs(24 * 60 * 60);

pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
}

/// Calendar date in the local time zone.
pub struct LocalClock;

impl Clock for LocalClock {
    fn today(&self) -> NaiveDate {
        chrono::Local::now().date_naive()
    }
}

/// Always reports the same date.
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

pub fn is_new_week(date: NaiveDate) -> bool {
    date.weekday() == Weekday::Sun
}

/// Run until `cancel_rx` flips to `true` (or its sender is dropped),
/// publishing every successfully computed report on `report_tx`.
///
/// A failed run is logged and the previously published report stays in place.
pub async fn run_weekly_refresh<S: DocumentStore>(
    aggregator: &WeeklyScoreAggregator<S>,
    identity: &dyn IdentityProvider,
    clock: &dyn Clock,
    period: Duration,
    report_tx: &watch::Sender<WeeklyScoreReport>,
    mut cancel_rx: watch::Receiver<bool>,
) {
    refresh_once(aggregator, identity, clock, report_tx).await;

    let mut ticker = tokio::time::interval(period);
    // the first tick completes immediately
    ticker.tick().await;

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let today = clock.today();
                if is_new_week(today) {
                    info!(%today, "new week; refreshing weekly report");
                    refresh_once(aggregator, identity, clock, report_tx).await;
                }
            }
            changed = cancel_rx.changed() => {
                if changed.is_err() || *cancel_rx.borrow() {
                    info!("weekly refresh stopped");
                    break;
                }
            }
        }
    }
}

async fn refresh_once<S: DocumentStore>(
    aggregator: &WeeklyScoreAggregator<S>,
    identity: &dyn IdentityProvider,
    clock: &dyn Clock,
    report_tx: &watch::Sender<WeeklyScoreReport>,
) {
    match aggregator
        .compute_for_current_user(identity, clock.today())
        .await
    {
        Ok(report) => {
            report_tx.send_replace(report);
        }
        Err(e) => warn!(error = %e, "weekly report refresh failed"),
    }
}
