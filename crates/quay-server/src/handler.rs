use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Path, State};
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderMap, HeaderName, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::json;

use quay_net::{ChainFetcher, NetworkEngine};
use quay_store::WeightedCache;
use quay_types::{Record, RecordId};

use crate::error::ApiError;

/// Shared request-handling state, injected into every handler.
pub struct AppState {
    pub cache: Arc<WeightedCache>,
    /// Present only in chain-capable deployments.
    pub fetcher: Option<ChainFetcher>,
    pub engine: Arc<dyn NetworkEngine>,
    pub list_limit: usize,
    pub submit_timeout: Duration,
}

pub type SharedState = Arc<AppState>;

const HEADER_SALT: HeaderName = HeaderName::from_static("salt");
const HEADER_TIME: HeaderName = HeaderName::from_static("time");
const HEADER_TAG: HeaderName = HeaderName::from_static("tag");

/// Wire form of a record: payload as text, salt and work hex-encoded,
/// time in unix milliseconds.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RecordJson {
    pub val: String,
    pub time: i64,
    pub salt: String,
    pub work: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
}

impl RecordJson {
    pub fn from_record(record: &Record) -> Self {
        Self {
            val: String::from_utf8_lossy(&record.value).into_owned(),
            time: record.timestamp,
            salt: hex::encode(&record.salt),
            work: record.work.to_hex(),
            tag: record.tag.clone(),
        }
    }

    pub fn into_record(self) -> Result<Record, ApiError> {
        let salt = hex::decode(&self.salt)
            .map_err(|e| ApiError::BadRequest(format!("err decoding salt: {e}")))?;
        let work = RecordId::from_hex(&self.work)
            .map_err(|e| ApiError::BadRequest(format!("err decoding work: {e}")))?;
        let mut record = Record::new(self.val.into_bytes(), salt, work, self.time);
        if let Some(tag) = self.tag {
            record = record.with_tag(tag);
        }
        Ok(record)
    }
}

/// `GET /{hex}` — cached record, or the chain-fetch result on a miss.
pub async fn get_record(
    State(state): State<SharedState>,
    Path(hex_id): Path<String>,
) -> Result<Response, ApiError> {
    let bytes = hex::decode(&hex_id)
        .map_err(|e| ApiError::BadRequest(format!("err decoding input: {e}")))?;
    if bytes.len() != 32 {
        return Err(ApiError::BadRequest(
            "input must be of length 32 bytes".into(),
        ));
    }
    let id = RecordId::from_slice(&bytes).map_err(|e| ApiError::Internal(e.to_string()))?;

    if let Some(record) = state.cache.get(&id) {
        let mut headers = HeaderMap::new();
        insert_header(&mut headers, HEADER_SALT, &hex::encode(&record.salt))?;
        insert_header(&mut headers, HEADER_TIME, &hex::encode(record.time_bytes()))?;
        if let Some(tag) = &record.tag {
            insert_header(&mut headers, HEADER_TAG, tag)?;
        }
        return Ok((headers, record.value.to_vec()).into_response());
    }

    match &state.fetcher {
        Some(fetcher) => {
            let object = fetcher.fetch(id).await?;
            let mut headers = HeaderMap::new();
            if let Some(tag) = &object.tag {
                insert_header(&mut headers, CONTENT_TYPE, tag)?;
            }
            Ok((headers, object.data).into_response())
        }
        None => Err(ApiError::NotFound),
    }
}

/// `GET /list/{prefix}` — records whose value starts with the prefix,
/// capped at the configured limit.
pub async fn list_records(
    State(state): State<SharedState>,
    Path(prefix): Path<String>,
) -> Json<Vec<RecordJson>> {
    let records = state.cache.list_by_prefix(prefix.as_bytes(), state.list_limit);
    Json(records.iter().map(RecordJson::from_record).collect())
}

/// `POST /` — verify, cache, and publish a new record.
///
/// The cache insert stands even when publishing fails or times out; the
/// engine error is surfaced as 502.
pub async fn submit_record(
    State(state): State<SharedState>,
    Json(body): Json<RecordJson>,
) -> Result<StatusCode, ApiError> {
    let record = body.into_record()?;
    state.cache.insert_verified(record.clone())?;
    tracing::debug!(id = %record.id(), "record admitted");

    match tokio::time::timeout(state.submit_timeout, state.engine.submit(record)).await {
        Ok(Ok(())) => Ok(StatusCode::OK),
        Ok(Err(err)) => Err(ApiError::BadGateway(err.to_string())),
        Err(_) => Err(ApiError::BadGateway("submit timed out".into())),
    }
}

/// `GET /health` — liveness plus cache occupancy.
pub async fn health(State(state): State<SharedState>) -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "records": state.cache.len(),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

fn insert_header(headers: &mut HeaderMap, name: HeaderName, value: &str) -> Result<(), ApiError> {
    let value = HeaderValue::from_str(value)
        .map_err(|e| ApiError::Internal(format!("unrepresentable header: {e}")))?;
    headers.insert(name, value);
    Ok(())
}
