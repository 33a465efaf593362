use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use gamedex_core::{DocumentStore, Filters, Game, SearchEngine, SearchError, SearchHit, SledStore, SortMode};
use parking_lot::RwLock;
use serde::Deserialize;
use std::sync::Arc;
use time::format_description::FormatItem;
use time::macros::format_description;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

const DATE_FORMAT: &[FormatItem<'static>] = format_description!("[year]-[month]-[day]");

#[derive(Deserialize)]
pub struct SearchParams {
    pub q: String,
    pub platform: Option<String>,
    pub genre: Option<String>,
    pub min_rating: Option<f32>,
    #[serde(default = "default_sort")]
    pub sort_by: String,
}

fn default_sort() -> String {
    "relevance".to_string()
}

#[derive(Clone)]
pub struct AppState {
    /// Write lock serializes ingestion and finalize (the recompute barrier);
    /// searches take the read lock and run in parallel.
    pub engine: Arc<RwLock<SearchEngine<SledStore>>>,
    pub admin_token: Option<String>,
}

/// Open the index directory and build the router.
pub fn build_app(index_dir: &str) -> anyhow::Result<Router> {
    let store = SledStore::open(index_dir)?;
    let engine = SearchEngine::open(store)?;
    let admin_token = std::env::var("ADMIN_TOKEN").ok();
    Ok(app_with_engine(engine, admin_token))
}

pub fn app_with_engine(engine: SearchEngine<SledStore>, admin_token: Option<String>) -> Router {
    let state = AppState { engine: Arc::new(RwLock::new(engine)), admin_token };

    // CORS: CORS_ALLOW_ORIGIN (comma-separated) or permissive by default.
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
        .route("/health", get(|| async { "ok" }))
        .route("/search", get(search_handler))
        .route("/games/:id", get(game_handler))
        .route("/games", post(add_game))
        .route("/platforms", get(platforms_handler))
        .route("/genres", get(genres_handler))
        .with_state(state)
        .layer(cors)
}

fn error_response(err: SearchError) -> (StatusCode, String) {
    let status = if err.is_retryable() {
        StatusCode::SERVICE_UNAVAILABLE
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };
    tracing::error!(%err, "request failed");
    (status, err.to_string())
}

pub async fn search_handler(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<SearchHit>>, (StatusCode, String)> {
    let filters = Filters {
        platform: params.platform,
        genre: params.genre,
        min_rating: params.min_rating,
    };
    let sort = SortMode::parse(&params.sort_by);
    let hits = state
        .engine
        .read()
        .search(&params.q, &filters, sort)
        .map_err(error_response)?;
    Ok(Json(hits))
}

pub async fn game_handler(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<Game>, (StatusCode, String)> {
    let games = state.engine.read().store().find(&[id]).map_err(error_response)?;
    match games.into_iter().next() {
        Some(game) => Ok(Json(game)),
        None => Err((StatusCode::NOT_FOUND, format!("game {id} not found"))),
    }
}

pub async fn platforms_handler(
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, (StatusCode, String)> {
    let platforms = state.engine.read().platforms().map_err(error_response)?;
    Ok(Json(serde_json::json!({ "platforms": platforms })))
}

pub async fn genres_handler(
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, (StatusCode, String)> {
    let genres = state.engine.read().genres().map_err(error_response)?;
    Ok(Json(serde_json::json!({ "genres": genres })))
}

/// Admin ingestion of a single game: store, index, re-finalize. The whole
/// sequence runs under the write lock so no search observes provisional
/// weights.
pub async fn add_game(
    State(state): State<AppState>,
    headers: axum::http::HeaderMap,
    Json(mut game): Json<Game>,
) -> Result<(StatusCode, Json<serde_json::Value>), (StatusCode, String)> {
    authorize(&state, &headers)?;
    if let Err(err) = game.validate() {
        return Err((StatusCode::UNPROCESSABLE_ENTITY, err.to_string()));
    }
    // Unparseable dates degrade to absent rather than rejecting the game.
    if let Some(date) = game.released.take() {
        if time::Date::parse(&date, DATE_FORMAT).is_ok() {
            game.released = Some(date);
        } else {
            tracing::warn!(game_id = game.id, %date, "unparseable release date, dropped");
        }
    }

    let mut engine = state.engine.write();
    engine.index_game(&game).map_err(error_response)?;
    engine.finalize_and_persist().map_err(error_response)?;
    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({ "message": "game added", "id": game.id })),
    ))
}

fn authorize(state: &AppState, headers: &axum::http::HeaderMap) -> Result<(), (StatusCode, String)> {
    let required = match &state.admin_token {
        Some(t) => t,
        None => return Err((StatusCode::UNAUTHORIZED, "ADMIN_TOKEN not set".into())),
    };
    let provided = headers.get("X-ADMIN-TOKEN").and_then(|v| v.to_str().ok()).unwrap_or("");
    if provided == required {
        Ok(())
    } else {
        Err((StatusCode::UNAUTHORIZED, "invalid admin token".into()))
    }
}
