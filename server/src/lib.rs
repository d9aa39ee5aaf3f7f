use anyhow::Result;
use axum::{
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use gutensearch_core::catalog::load_catalog;
use gutensearch_core::query::{Query as IndexQuery, QueryOp};
use gutensearch_core::{BookMeta, DocId, IndexStore, SearchEngine, StoreKind, DEFAULT_LIMIT};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

#[derive(Deserialize)]
pub struct SearchParams {
    pub q: String,
    #[serde(default)]
    pub op: Option<String>,
    #[serde(default = "default_limit")]
    pub limit: usize,
}
fn default_limit() -> usize {
    DEFAULT_LIMIT
}

#[derive(Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub op: String,
    pub count: usize,
    pub took_s: f64,
    pub hits: Vec<HitPayload>,
}

#[derive(Serialize)]
pub struct HitPayload {
    pub doc_id: DocId,
    pub score: u64,
    pub title: Option<String>,
    pub author: Option<String>,
    pub language: Option<String>,
}

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<SearchEngine>,
    pub store: Arc<dyn IndexStore>,
    pub catalog: Arc<RwLock<BTreeMap<DocId, BookMeta>>>,
    pub datamarts: PathBuf,
    pub admin_token: Option<String>,
}

/// Open the chosen backend under `datamarts` and load the initial snapshot
/// and catalog. A missing or unreadable catalog degrades to hits without
/// metadata; the admin token comes from `ADMIN_TOKEN`.
pub fn app_state(datamarts: &Path, kind: StoreKind) -> Result<AppState> {
    let store: Arc<dyn IndexStore> = Arc::from(kind.open(datamarts)?);
    let engine = Arc::new(SearchEngine::open(store.as_ref()));
    let catalog = match load_catalog(datamarts) {
        Ok(entries) => entries,
        Err(err) => {
            tracing::warn!(error = %err, "catalog unavailable, serving hits without metadata");
            BTreeMap::new()
        }
    };
    let admin_token = std::env::var("ADMIN_TOKEN").ok();
    Ok(AppState {
        engine,
        store,
        catalog: Arc::new(RwLock::new(catalog)),
        datamarts: datamarts.to_path_buf(),
        admin_token,
    })
}

pub fn build_app(state: AppState) -> Router {
    // CORS: read CORS_ALLOW_ORIGIN (comma-separated) or allow Any by default
    let cors = match std::env::var("CORS_ALLOW_ORIGIN") {
        Ok(val) => {
            let origins: Vec<_> = val.split(',').filter_map(|s| s.trim().parse().ok()).collect();
            if origins.is_empty() {
                CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any)
            } else {
                CorsLayer::new()
                    .allow_origin(AllowOrigin::list(origins))
                    .allow_methods(Any)
                    .allow_headers(Any)
            }
        }
        Err(_) => CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any),
    };

    Router::new()
        .route("/health", get(health_handler))
        .route("/search", get(search_handler))
        .route("/reload", post(reload_handler))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

pub async fn health_handler(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "terms": state.engine.snapshot().term_count(),
    }))
}

pub async fn search_handler(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchResponse>, (StatusCode, String)> {
    let start = std::time::Instant::now();
    if params.q.trim().is_empty() {
        return Err((StatusCode::BAD_REQUEST, "query parameter q must not be blank".into()));
    }

    let terms: Vec<String> = params.q.split_whitespace().map(|s| s.to_string()).collect();
    let op = params.op.as_deref().map(QueryOp::parse).unwrap_or_default();
    let query = IndexQuery::new(terms, op).with_limit(params.limit);
    let hits = state.engine.search(&query);

    let catalog = state.catalog.read();
    let hits: Vec<HitPayload> = hits
        .iter()
        .map(|hit| {
            let meta = catalog.get(&hit.doc_id);
            HitPayload {
                doc_id: hit.doc_id,
                score: hit.score,
                title: meta.and_then(|m| m.title.clone()),
                author: meta.and_then(|m| m.author.clone()),
                language: meta.and_then(|m| m.language.clone()),
            }
        })
        .collect();

    let elapsed = start.elapsed();
    Ok(Json(SearchResponse {
        query: params.q,
        op: op.as_str().to_string(),
        count: hits.len(),
        took_s: elapsed.as_secs_f64(),
        hits,
    }))
}

pub async fn reload_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<serde_json::Value>, (StatusCode, String)> {
    authorize(&state, &headers)?;

    state.engine.reload(state.store.as_ref());
    match load_catalog(&state.datamarts) {
        Ok(entries) => *state.catalog.write() = entries,
        Err(err) => tracing::warn!(error = %err, "catalog reload failed, keeping previous"),
    }

    let terms = state.engine.snapshot().term_count();
    tracing::info!(terms, "index snapshot reloaded");
    Ok(Json(serde_json::json!({ "status": "reloaded", "terms": terms })))
}

fn authorize(state: &AppState, headers: &HeaderMap) -> Result<(), (StatusCode, String)> {
    let required = match &state.admin_token {
        Some(token) => token,
        None => return Err((StatusCode::UNAUTHORIZED, "ADMIN_TOKEN not set".into())),
    };
    let provided = headers
        .get("X-ADMIN-TOKEN")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");
    if provided == required {
        Ok(())
    } else {
        Err((StatusCode::UNAUTHORIZED, "invalid admin token".into()))
    }
}
