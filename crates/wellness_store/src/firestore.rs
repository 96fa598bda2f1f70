//! Firestore REST implementation of [`DocumentStore`](crate::DocumentStore).
//!
//! Records live under `users/{uid}/sleepData` and `users/{uid}/healthData`,
//! one document per day keyed by a `date` string field. Range reads go
//! through the `runQuery` endpoint with an inclusive `date` filter.

use crate::{
    Collection, DailyHealthRecord, DailySleepRecord, DateRange, DocumentStore, StoreError,
};
use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value, json};

/// Firestore client authenticated with a Firebase ID token.
#[derive(Clone, Debug)]
pub struct FirestoreStore {
    base_url: String,
    project_id: String,
    id_token: SecretString,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct RunQueryItem {
    document: Option<Document>,
}

#[derive(Debug, Deserialize)]
struct Document {
    #[serde(default)]
    name: String,
    #[serde(default)]
    fields: Map<String, Value>,
}

impl FirestoreStore {
    /// Create a new store client.
    ///
    /// # Arguments
    /// * `base_url` - Firestore API root (e.g., "https://firestore.googleapis.com")
    /// * `project_id` - Firebase project hosting the database
    /// * `id_token` - ID token of the signed-in user
    pub fn new(base_url: &str, project_id: impl Into<String>, id_token: SecretString) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            project_id: project_id.into(),
            id_token,
            client: reqwest::Client::new(),
        }
    }

    /// `runQuery` endpoint under the user's document. Path segments are
    /// percent-encoded, so a `/` or `?` in `user_id` stays inside the id.
    fn run_query_url(&self, user_id: &str) -> Result<reqwest::Url, StoreError> {
        let mut url = reqwest::Url::parse(&self.base_url)
            .map_err(|e| StoreError::Config(format!("invalid Firestore base URL: {e}")))?;
        url.path_segments_mut()
            .map_err(|_| {
                StoreError::Config(format!("Firestore base URL cannot be a base: {}", self.base_url))
            })?
            .pop_if_empty()
            .extend(["v1", "projects", self.project_id.as_str(), "databases", "(default)"])
            .extend(["documents", "users"])
            .push(&format!("{user_id}:runQuery"));
        Ok(url)
    }

    /// Fetch every document of `collection` whose `date` lies in `range`.
    async fn query_range<T: DeserializeOwned>(
        &self,
        user_id: &str,
        collection: Collection,
        range: &DateRange,
    ) -> Result<Vec<T>, StoreError> {
        let body = range_query(collection, range);
        let resp = self
            .client
            .post(self.run_query_url(user_id)?)
            .bearer_auth(self.id_token.expose_secret())
            .json(&body)
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(error_from_response(resp).await);
        }
        let items: Vec<RunQueryItem> = resp
            .json()
            .await
            .map_err(|e| StoreError::Decode(e.to_string()))?;

        let mut records = Vec::with_capacity(items.len());
        for doc in items.into_iter().filter_map(|item| item.document) {
            let plain = Value::Object(flatten_fields(doc.fields));
            let record = serde_json::from_value(plain)
                .map_err(|e| StoreError::Decode(format!("{}: {e}", doc.name)))?;
            records.push(record);
        }
        Ok(records)
    }
}

#[async_trait]
impl DocumentStore for FirestoreStore {
    async fn query_sleep_records(
        &self,
        user_id: &str,
        range: &DateRange,
    ) -> Result<Vec<DailySleepRecord>, StoreError> {
        self.query_range(user_id, Collection::Sleep, range).await
    }

    async fn query_health_records(
        &self,
        user_id: &str,
        range: &DateRange,
    ) -> Result<Vec<DailyHealthRecord>, StoreError> {
        self.query_range(user_id, Collection::Health, range).await
    }
}

/// Structured query selecting `collection` documents with
/// `start <= date <= end`.
pub fn range_query(collection: Collection, range: &DateRange) -> Value {
    let bound = |op: &str, key: String| {
        json!({
            "fieldFilter": {
                "field": { "fieldPath": "date" },
                "op": op,
                "value": { "stringValue": key }
            }
        })
    };
    json!({
        "structuredQuery": {
            "from": [{ "collectionId": collection.id() }],
            "where": {
                "compositeFilter": {
                    "op": "AND",
                    "filters": [
                        bound("GREATER_THAN_OR_EQUAL", range.start_key()),
                        bound("LESS_THAN_OR_EQUAL", range.end_key()),
                    ]
                }
            }
        }
    })
}

/// Turn Firestore typed values (`{"integerValue": "30"}`) into plain JSON.
/// Value kinds the records never use are dropped.
pub fn flatten_fields(fields: Map<String, Value>) -> Map<String, Value> {
    fields
        .into_iter()
        .filter_map(|(name, typed)| plain_value(&typed).map(|v| (name, v)))
        .collect()
}

fn plain_value(typed: &Value) -> Option<Value> {
    let obj = typed.as_object()?;
    if let Some(s) = obj.get("stringValue") {
        return Some(s.clone());
    }
    if let Some(i) = obj.get("integerValue") {
        // int64 values are sent as JSON strings
        return Some(match i.as_str().and_then(|s| s.parse::<i64>().ok()) {
            Some(n) => Value::from(n),
            None => i.clone(),
        });
    }
    if let Some(d) = obj.get("doubleValue") {
        return Some(d.clone());
    }
    if let Some(b) = obj.get("booleanValue") {
        return Some(b.clone());
    }
    if obj.contains_key("nullValue") {
        return Some(Value::Null);
    }
    None
}

/// Map a failed response to a [`StoreError`].
pub(crate) async fn error_from_response(resp: reqwest::Response) -> StoreError {
    let status = resp.status().as_u16();
    let body = resp.text().await.unwrap_or_default();
    let body_snippet: String = body.chars().take(256).collect();

    match status {
        404 => StoreError::NotFound(body_snippet),
        401 | 403 => StoreError::Auth(body_snippet),
        _ => StoreError::Status {
            status,
            body: body_snippet,
        },
    }
}
