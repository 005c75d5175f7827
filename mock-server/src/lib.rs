use std::{
    sync::Arc,
    time::{SystemTime, UNIX_EPOCH},
};

use axum::{
    body::Bytes,
    extract::{Path, Query, RawQuery, State},
    http::{HeaderMap, Method, StatusCode},
    routing::{any, get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

/// Served by `/fixtures/corrupt`: truncated JSON.
pub const CORRUPT_JSON: &str = r#"{"id": "00000000-0000-0000-0000-000000000001", "description": "#;

/// Served by `/fixtures/mistype`: `updated` is a string instead of seconds.
pub const MISTYPED_JSON: &str =
    r#"{"id": "00000000-0000-0000-0000-000000000001", "description": "mistyped", "updated": "yesterday"}"#;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Gist {
    pub id: Uuid,
    pub description: String,
    pub updated: u64,
}

#[derive(Deserialize)]
pub struct CreateGist {
    pub description: String,
}

#[derive(Deserialize)]
pub struct Page {
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

/// What `/echo` saw of the request.
#[derive(Debug, Serialize, Deserialize)]
pub struct Echo {
    pub method: String,
    pub query: Option<String>,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

pub type Db = Arc<RwLock<Vec<Gist>>>;

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(Vec::new()));
    Router::new()
        .route("/gists", get(list_gists).post(create_gist))
        .route("/gists/{id}", get(get_gist).delete(delete_gist))
        .route("/fixtures/corrupt", get(|| async { CORRUPT_JSON }))
        .route("/fixtures/mistype", get(|| async { MISTYPED_JSON }))
        .route("/success", post(success))
        .route("/status/{code}", any(status))
        .route("/echo", any(echo))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

fn now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}

async fn list_gists(State(db): State<Db>, Query(page): Query<Page>) -> Json<Vec<Gist>> {
    let gists = db.read().await;
    let offset = page.offset.unwrap_or(0);
    let limit = page.limit.unwrap_or(usize::MAX);
    Json(gists.iter().skip(offset).take(limit).cloned().collect())
}

async fn create_gist(
    State(db): State<Db>,
    Json(input): Json<CreateGist>,
) -> (StatusCode, Json<Gist>) {
    let gist = Gist {
        id: Uuid::new_v4(),
        description: input.description,
        updated: now(),
    };
    db.write().await.push(gist.clone());
    (StatusCode::CREATED, Json(gist))
}

async fn get_gist(State(db): State<Db>, Path(id): Path<Uuid>) -> Result<Json<Gist>, StatusCode> {
    let gists = db.read().await;
    gists
        .iter()
        .find(|gist| gist.id == id)
        .cloned()
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}

async fn delete_gist(State(db): State<Db>, Path(id): Path<Uuid>) -> StatusCode {
    let mut gists = db.write().await;
    let before = gists.len();
    gists.retain(|gist| gist.id != id);
    if gists.len() < before {
        StatusCode::NO_CONTENT
    } else {
        StatusCode::NOT_FOUND
    }
}

async fn success(_body: Bytes) -> Json<serde_json::Value> {
    Json(serde_json::json!({ "success": true }))
}

async fn status(Path(code): Path<u16>) -> Result<(StatusCode, Json<serde_json::Value>), StatusCode> {
    let status = StatusCode::from_u16(code).map_err(|_| StatusCode::BAD_REQUEST)?;
    Ok((status, Json(serde_json::json!({ "status": code }))))
}

async fn echo(method: Method, headers: HeaderMap, RawQuery(query): RawQuery, body: Bytes) -> Json<Echo> {
    let headers = headers
        .iter()
        .map(|(name, value)| {
            (
                name.as_str().to_string(),
                value.to_str().unwrap_or_default().to_string(),
            )
        })
        .collect();
    Json(Echo {
        method: method.to_string(),
        query,
        headers,
        body: String::from_utf8_lossy(&body).into_owned(),
    })
}
