//! HTTP front end: a single `GET /search` route over the query engine.
//! Each request reloads the stoplist and index files, so concurrent
//! requests are independent and read-only.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use quarry_core::persist::IndexPaths;
use quarry_core::search;
use quarry_core::stoplist::Stoplist;
use serde::Deserialize;
use std::path::PathBuf;
use tower_http::trace::TraceLayer;

#[derive(Clone)]
pub struct AppState {
    pub index_dir: PathBuf,
    pub stoplist_path: PathBuf,
}

#[derive(Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
}

pub fn build_app(index_dir: PathBuf, stoplist_path: PathBuf) -> Router {
    let state = AppState {
        index_dir,
        stoplist_path,
    };
    Router::new()
        .route("/search", get(search_handler))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

pub async fn search_handler(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Response {
    let Some(query) = params.q.filter(|q| !q.is_empty()) else {
        let body = serde_json::json!({ "error": "missing 'q' parameter" });
        return (StatusCode::BAD_REQUEST, Json(body)).into_response();
    };

    // the whole query path is blocking file I/O
    let joined = tokio::task::spawn_blocking(move || {
        let stoplist = Stoplist::load(&state.stoplist_path)?;
        let paths = IndexPaths::new(&state.index_dir);
        search::search(&paths, &query, &stoplist)
    })
    .await;

    match joined {
        Ok(Ok(results)) => Json(results).into_response(),
        Ok(Err(err)) => {
            tracing::error!(error = %err, "query failed");
            (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()).into_response()
        }
        Err(err) => (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()).into_response(),
    }
}
