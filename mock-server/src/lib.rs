use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use thiserror::Error;
use tokio::{net::TcpListener, sync::RwLock};
use tower_http::trace::TraceLayer;
use tracing::debug;
use uuid::Uuid;

/// In-memory database: collection name → record key → stored value.
#[derive(Debug, Default)]
pub struct Store {
    collections: HashMap<String, BTreeMap<String, Value>>,
    next_seq: u64,
}

impl Store {
    /// Build a store from a database export: a top-level object of
    /// collections, each an object of records. Returns `None` for any other
    /// shape.
    pub fn from_export(export: Value) -> Option<Self> {
        let Value::Object(collections) = export else {
            return None;
        };
        let mut store = Store::default();
        for (name, records) in collections {
            let Value::Object(records) = records else {
                return None;
            };
            store
                .collections
                .insert(name, records.into_iter().collect());
        }
        store.next_seq = store.collections.values().map(|r| r.len() as u64).sum();
        Some(store)
    }

    /// Keys sort in creation order, like the store's push ids.
    fn push_key(&mut self) -> String {
        let seq = self.next_seq;
        self.next_seq += 1;
        let suffix = Uuid::new_v4().simple().to_string();
        format!("-{seq:07}{}", &suffix[..12])
    }
}

pub type Db = Arc<RwLock<Store>>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Path must end in .json")]
    MissingSuffix,

    #[error("orderBy must be defined when other query parameters are defined")]
    OrderByRequired,

    #[error("orderBy must be a valid JSON encoded path")]
    InvalidOrderBy,

    #[error("Constraint index field must be a JSON primitive")]
    InvalidEqualTo,

    #[error("Invalid data; couldn't parse JSON object, array, or value.")]
    InvalidData,
}

impl IntoResponse for StoreError {
    fn into_response(self) -> Response {
        let status = match self {
            StoreError::MissingSuffix => StatusCode::NOT_FOUND,
            _ => StatusCode::BAD_REQUEST,
        };
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct QueryParams {
    #[serde(rename = "orderBy")]
    pub order_by: Option<String>,
    #[serde(rename = "equalTo")]
    pub equal_to: Option<String>,
}

/// An `orderBy` + `equalTo` pair, decoded from their JSON literals.
#[derive(Debug, PartialEq)]
pub struct Filter {
    pub field: String,
    pub expected: Value,
}

impl Filter {
    pub fn from_params(params: QueryParams) -> Result<Option<Self>, StoreError> {
        let field = params
            .order_by
            .map(|raw| serde_json::from_str::<String>(&raw).map_err(|_| StoreError::InvalidOrderBy))
            .transpose()?;
        let expected = params
            .equal_to
            .map(|raw| serde_json::from_str::<Value>(&raw).map_err(|_| StoreError::InvalidEqualTo))
            .transpose()?;

        match (field, expected) {
            (None, Some(_)) => Err(StoreError::OrderByRequired),
            (Some(field), Some(expected)) => Ok(Some(Filter { field, expected })),
            _ => Ok(None),
        }
    }

    pub fn matches(&self, key: &str, record: &Value) -> bool {
        if self.field == "$key" {
            return self.expected.as_str() == Some(key);
        }
        record.get(&self.field) == Some(&self.expected)
    }
}

pub fn app() -> Router {
    app_with(Store::default())
}

pub fn app_with(store: Store) -> Router {
    let db: Db = Arc::new(RwLock::new(store));
    Router::new()
        .route("/{file}", get(read_collection).post(push_record))
        .route(
            "/{collection}/{file}",
            get(read_record).put(set_record).delete(remove_record),
        )
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    serve(listener, Store::default()).await
}

pub async fn serve(listener: TcpListener, store: Store) -> Result<(), std::io::Error> {
    axum::serve(listener, app_with(store).layer(TraceLayer::new_for_http())).await
}

fn strip_json_suffix(file: &str) -> Result<&str, StoreError> {
    file.strip_suffix(".json")
        .filter(|name| !name.is_empty())
        .ok_or(StoreError::MissingSuffix)
}

fn parse_body(body: &str) -> Result<Value, StoreError> {
    serde_json::from_str(body).map_err(|_| StoreError::InvalidData)
}

/// `null` when the collection holds nothing, otherwise the (possibly empty)
/// object of matching records.
async fn read_collection(
    State(db): State<Db>,
    Path(file): Path<String>,
    Query(params): Query<QueryParams>,
) -> Result<Json<Value>, StoreError> {
    let name = strip_json_suffix(&file)?;
    let filter = Filter::from_params(params)?;

    let store = db.read().await;
    let Some(records) = store.collections.get(name).filter(|r| !r.is_empty()) else {
        return Ok(Json(Value::Null));
    };

    let matched: Map<String, Value> = records
        .iter()
        .filter(|(key, record)| filter.as_ref().map_or(true, |f| f.matches(key, record)))
        .map(|(key, record)| (key.clone(), record.clone()))
        .collect();
    debug!(collection = name, matched = matched.len(), "collection read");
    Ok(Json(Value::Object(matched)))
}

async fn push_record(
    State(db): State<Db>,
    Path(file): Path<String>,
    body: String,
) -> Result<Json<Value>, StoreError> {
    let name = strip_json_suffix(&file)?;
    let value = parse_body(&body)?;
    if value.is_null() {
        return Err(StoreError::InvalidData);
    }

    let mut store = db.write().await;
    let key = store.push_key();
    store
        .collections
        .entry(name.to_string())
        .or_default()
        .insert(key.clone(), value);
    debug!(collection = name, %key, "record pushed");
    Ok(Json(json!({ "name": key })))
}

async fn read_record(
    State(db): State<Db>,
    Path((collection, file)): Path<(String, String)>,
) -> Result<Json<Value>, StoreError> {
    let key = strip_json_suffix(&file)?;
    let store = db.read().await;
    let value = store
        .collections
        .get(&collection)
        .and_then(|records| records.get(key))
        .cloned()
        .unwrap_or(Value::Null);
    Ok(Json(value))
}

/// Replaces the record. Writing `null` removes it.
async fn set_record(
    State(db): State<Db>,
    Path((collection, file)): Path<(String, String)>,
    body: String,
) -> Result<Json<Value>, StoreError> {
    let key = strip_json_suffix(&file)?;
    let value = parse_body(&body)?;

    let mut store = db.write().await;
    if value.is_null() {
        if let Some(records) = store.collections.get_mut(&collection) {
            records.remove(key);
        }
    } else {
        store
            .collections
            .entry(collection.clone())
            .or_default()
            .insert(key.to_string(), value.clone());
    }
    debug!(%collection, key, "record set");
    Ok(Json(value))
}

/// Always succeeds, whether or not the record existed.
async fn remove_record(
    State(db): State<Db>,
    Path((collection, file)): Path<(String, String)>,
) -> Result<Json<Value>, StoreError> {
    let key = strip_json_suffix(&file)?;
    let mut store = db.write().await;
    let existed = store
        .collections
        .get_mut(&collection)
        .and_then(|records| records.remove(key))
        .is_some();
    debug!(%collection, key, existed, "record removed");
    Ok(Json(Value::Null))
}
