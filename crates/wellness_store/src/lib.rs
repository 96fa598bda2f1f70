//! Per-user wellness record store: record types, the `DocumentStore` trait and
//! the Firestore/Firebase-backed implementations.

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

pub mod auth;
pub mod config;
pub mod fields;
pub mod firestore;

pub use fields::FieldValue;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("authentication failed: {0}")]
    Auth(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("unexpected status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("decode error: {0}")]
    Decode(String),
    #[error("configuration error: {0}")]
    Config(String),
}

/// Per-user collections the wellness app writes one document per day into.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Collection {
    Sleep,
    Health,
}

impl Collection {
    pub fn id(self) -> &'static str {
        match self {
            Collection::Sleep => "sleepData",
            Collection::Health => "healthData",
        }
    }
}

/// Inclusive calendar date range used as a `date` key filter.
///
/// Records are keyed by zero-padded `YYYY-MM-DD` strings, so a lexicographic
/// comparison on the keys is the same as comparing the dates.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    pub fn start_key(&self) -> String {
        date_key(self.start)
    }

    pub fn end_key(&self) -> String {
        date_key(self.end)
    }

    /// Whether a stored `date` key falls inside the range.
    pub fn contains_key(&self, key: &str) -> bool {
        key >= self.start_key().as_str() && key <= self.end_key().as_str()
    }
}

pub fn date_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// One day of sleep tracking. Every component is optional and may hold any
/// JSON type; see [`FieldValue`] for how values are read.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DailySleepRecord {
    #[serde(default, deserialize_with = "deserialize_opt_string")]
    pub date: Option<String>,
    #[serde(default)]
    pub fall_asleep_hours: Option<FieldValue>,
    #[serde(default)]
    pub fall_asleep_minutes: Option<FieldValue>,
    #[serde(default)]
    pub in_bed_hours: Option<FieldValue>,
    #[serde(default)]
    pub in_bed_minutes: Option<FieldValue>,
    #[serde(default)]
    pub time_asleep_hours: Option<FieldValue>,
    #[serde(default)]
    pub time_asleep_minutes: Option<FieldValue>,
    #[serde(default)]
    pub times_woke_up: Option<FieldValue>,
}

/// One day of health habit tracking.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DailyHealthRecord {
    #[serde(default, deserialize_with = "deserialize_opt_string")]
    pub date: Option<String>,
    #[serde(default)]
    pub caffeine: Option<FieldValue>,
    #[serde(default)]
    pub rate_diet: Option<FieldValue>,
    #[serde(default)]
    pub stress_level: Option<FieldValue>,
    #[serde(default, rename = "minPA")]
    pub min_pa: Option<FieldValue>,
}

// Unlike a strict field, a date of the wrong type is dropped rather than
// failing the whole record.
fn deserialize_opt_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<serde_json::Value> = Option::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

/// Read access to a user's date-partitioned wellness collections.
///
/// Results come back in no particular order.
#[async_trait]
pub trait DocumentStore: Send + Sync + 'static {
    async fn query_sleep_records(
        &self,
        user_id: &str,
        range: &DateRange,
    ) -> Result<Vec<DailySleepRecord>, StoreError>;

    async fn query_health_records(
        &self,
        user_id: &str,
        range: &DateRange,
    ) -> Result<Vec<DailyHealthRecord>, StoreError>;
}

#[async_trait]
impl<S: DocumentStore + ?Sized> DocumentStore for std::sync::Arc<S> {
    async fn query_sleep_records(
        &self,
        user_id: &str,
        range: &DateRange,
    ) -> Result<Vec<DailySleepRecord>, StoreError> {
        (**self).query_sleep_records(user_id, range).await
    }

    async fn query_health_records(
        &self,
        user_id: &str,
        range: &DateRange,
    ) -> Result<Vec<DailyHealthRecord>, StoreError> {
        (**self).query_health_records(user_id, range).await
    }
}

/// Supplies the id of the currently signed-in user, if any.
pub trait IdentityProvider: Send + Sync {
    fn current_user_id(&self) -> Option<String>;
}

/// Fixed identity, e.g. a user id taken from configuration.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StaticIdentity(pub Option<String>);

impl IdentityProvider for StaticIdentity {
    fn current_user_id(&self) -> Option<String> {
        self.0.clone().filter(|id| !id.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn date_range_keys_are_zero_padded() {
        let range = DateRange::new(
            NaiveDate::from_ymd_opt(2024, 3, 3).unwrap(),
            NaiveDate::from_ymd_opt(2024, 3, 9).unwrap(),
        );
        assert_eq!(range.start_key(), "2024-03-03");
        assert_eq!(range.end_key(), "2024-03-09");
        assert!(range.contains_key("2024-03-03"));
        assert!(range.contains_key("2024-03-09"));
        assert!(!range.contains_key("2024-03-10"));
        assert!(!range.contains_key("2024-03-02"));
    }

    #[test]
    fn sleep_record_accepts_mixed_field_types() {
        let payload = json!({
            "date": "2024-03-04",
            "fallAsleepHours": "0",
            "fallAsleepMinutes": 10,
            "inBedHours": {"nested": true},
            "timesWokeUp": null
        });
        let rec: DailySleepRecord = serde_json::from_value(payload).expect("lenient decode");
        assert_eq!(rec.date.as_deref(), Some("2024-03-04"));
        assert!(rec.fall_asleep_hours.is_some());
        assert!(rec.in_bed_hours.is_some());
        assert!(rec.times_woke_up.is_none());
        assert!(rec.time_asleep_hours.is_none());
    }

    #[test]
    fn health_record_reads_min_pa_and_bad_date() {
        let payload = json!({"date": ["2024"], "minPA": "45", "rateDiet": "Good"});
        let rec: DailyHealthRecord = serde_json::from_value(payload).expect("lenient decode");
        assert!(rec.date.is_none());
        assert_eq!(rec.min_pa.as_ref().map(FieldValue::decimal), Some(45.0));
        assert!(rec.rate_diet.is_some());
    }

    #[test]
    fn static_identity_treats_empty_as_absent() {
        assert_eq!(StaticIdentity(Some(String::new())).current_user_id(), None);
        assert_eq!(StaticIdentity(None).current_user_id(), None);
        assert_eq!(
            StaticIdentity(Some("uid-1".into())).current_user_id(),
            Some("uid-1".into())
        );
    }
}
