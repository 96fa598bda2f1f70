//! Shared test helpers: an in-memory `DocumentStore` and record builders.
#![cfg(test)]

use async_trait::async_trait;
use serde_json::json;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use wellness_store::{
    DailyHealthRecord, DailySleepRecord, DateRange, DocumentStore, StoreError,
};

/// In-memory store. Filters by the record's `date` key the way the remote
/// range query does and counts every query it answers.
#[derive(Clone, Default)]
pub struct MockStore {
    sleep: Vec<DailySleepRecord>,
    health: Vec<DailyHealthRecord>,
    fail: bool,
    calls: Arc<AtomicUsize>,
}

impl MockStore {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    pub fn with_sleep(mut self, records: Vec<DailySleepRecord>) -> Self {
        self.sleep = records;
        self
    }

    pub fn with_health(mut self, records: Vec<DailyHealthRecord>) -> Self {
        self.health = records;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn answer<T: Clone>(
        &self,
        records: &[T],
        range: &DateRange,
        date: impl Fn(&T) -> Option<&str>,
    ) -> Result<Vec<T>, StoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(StoreError::Status {
                status: 503,
                body: "unavailable".into(),
            });
        }
        Ok(records
            .iter()
            .filter(|r| date(r).is_some_and(|d| range.contains_key(d)))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl DocumentStore for MockStore {
    async fn query_sleep_records(
        &self,
        _user_id: &str,
        range: &DateRange,
    ) -> Result<Vec<DailySleepRecord>, StoreError> {
        self.answer(&self.sleep, range, |r| r.date.as_deref())
    }

    async fn query_health_records(
        &self,
        _user_id: &str,
        range: &DateRange,
    ) -> Result<Vec<DailyHealthRecord>, StoreError> {
        self.answer(&self.health, range, |r| r.date.as_deref())
    }
}

/// Sleep entry with every component stored as a string, like the app does.
pub fn sleep_record(
    date: &str,
    in_bed_hours: u32,
    in_bed_minutes: u32,
    asleep_hours: u32,
    asleep_minutes: u32,
    fall_asleep_minutes: u32,
    times_woke_up: u32,
) -> DailySleepRecord {
    serde_json::from_value(json!({
        "date": date,
        "inBedHours": in_bed_hours.to_string(),
        "inBedMinutes": in_bed_minutes.to_string(),
        "timeAsleepHours": asleep_hours.to_string(),
        "timeAsleepMinutes": asleep_minutes.to_string(),
        "fallAsleepHours": "0",
        "fallAsleepMinutes": fall_asleep_minutes.to_string(),
        "timesWokeUp": times_woke_up.to_string()
    }))
    .expect("sleep record")
}

pub fn health_record(date: &str, fields: serde_json::Value) -> DailyHealthRecord {
    let mut value = fields;
    value["date"] = json!(date);
    serde_json::from_value(value).expect("health record")
}
