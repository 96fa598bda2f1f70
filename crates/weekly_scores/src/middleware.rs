//! Logging and metrics around store queries.
//!
//! [`LoggingStore`] wraps any [`DocumentStore`] so query timing, failures and
//! counts are recorded in one place instead of inside the aggregator.

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use tracing::debug;
use wellness_store::{
    Collection, DailyHealthRecord, DailySleepRecord, DateRange, DocumentStore, StoreError,
};

pub const QUERIES_TOTAL: &str = "wellness_store_queries_total";
pub const QUERY_FAILURES_TOTAL: &str = "wellness_store_query_failures_total";

#[derive(Clone)]
pub struct LoggingStore<S: DocumentStore> {
    inner: Arc<S>,
}

impl<S: DocumentStore> LoggingStore<S> {
    pub fn new(store: S) -> Self {
        Self {
            inner: Arc::new(store),
        }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    async fn with_logging<F, Fut, T>(
        &self,
        collection: Collection,
        range: &DateRange,
        operation: F,
    ) -> Result<Vec<T>, StoreError>
    where
        F: FnOnce(Arc<S>) -> Fut,
        Fut: std::future::Future<Output = Result<Vec<T>, StoreError>>,
    {
        let start = Instant::now();
        let name = collection.id();
        debug!(
            "Starting query: {} {}..={}",
            name,
            range.start_key(),
            range.end_key()
        );
        metrics::counter!(QUERIES_TOTAL, "collection" => name).increment(1);

        let result = operation(self.inner.clone()).await;

        let duration = start.elapsed();
        match &result {
            Ok(records) => {
                debug!(
                    "Query completed: {} returned {} records in {:?}",
                    name,
                    records.len(),
                    duration
                );
            }
            Err(e) => {
                metrics::counter!(QUERY_FAILURES_TOTAL, "collection" => name).increment(1);
                debug!("Query failed: {} in {:?} - error: {}", name, duration, e);
            }
        }
        result
    }
}

#[async_trait]
impl<S: DocumentStore> DocumentStore for LoggingStore<S> {
    async fn query_sleep_records(
        &self,
        user_id: &str,
        range: &DateRange,
    ) -> Result<Vec<DailySleepRecord>, StoreError> {
        self.with_logging(Collection::Sleep, range, |s| async move {
            s.query_sleep_records(user_id, range).await
        })
        .await
    }

    async fn query_health_records(
        &self,
        user_id: &str,
        range: &DateRange,
    ) -> Result<Vec<DailyHealthRecord>, StoreError> {
        self.with_logging(Collection::Health, range, |s| async move {
            s.query_health_records(user_id, range).await
        })
        .await
    }
}
