use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use quarry_core::document::{Corpus, Document, Paragraphs};
use quarry_core::persist::IndexPaths;
use quarry_core::pipeline::build_index;
use quarry_core::stoplist::Stoplist;
use serde_json::Value;
use std::io::Write;
use tempfile::TempDir;
use tower::ServiceExt;

fn doc(id: &str, body: &str) -> Document {
    Document {
        id: id.to_string(),
        text: Paragraphs {
            lines: vec![body.to_string()],
        },
        ..Document::default()
    }
}

async fn app_over_tiny_index() -> (TempDir, Router) {
    let dir = TempDir::new().unwrap();
    let index_dir = dir.path().join("index");
    let stoplist_path = dir.path().join("stoplist.txt");

    let mut stoplist_file = std::fs::File::create(&stoplist_path).unwrap();
    writeln!(stoplist_file, "the").unwrap();

    let corpus = Corpus {
        documents: vec![doc("A", "the cat sat"), doc("B", "the cat ran")],
    };
    build_index(
        corpus,
        Stoplist::load(&stoplist_path).unwrap(),
        &IndexPaths::new(&index_dir),
    )
    .await
    .unwrap();

    let app = quarry_server::build_app(index_dir, stoplist_path);
    (dir, app)
}

async fn call(app: Router, uri: &str) -> (StatusCode, Value) {
    let request = Request::get(uri).body(Body::empty()).unwrap();
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

#[tokio::test]
async fn search_returns_ranked_results() {
    let (_dir, app) = app_over_tiny_index().await;

    let (status, json) = call(app, "/search?q=cat").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["total_results"], 2);
    assert!(json["processing_time"].is_string());

    let documents = json["documents"].as_array().unwrap();
    assert_eq!(documents.len(), 2);
    for hit in documents {
        assert!(hit["id"].is_string());
        assert!(hit["relevance"].is_number());
    }
}

#[tokio::test]
async fn missing_query_parameter_is_a_bad_request() {
    let (_dir, app) = app_over_tiny_index().await;

    let (status, json) = call(app, "/search").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "missing 'q' parameter");
}

#[tokio::test]
async fn empty_query_parameter_is_a_bad_request() {
    let (_dir, app) = app_over_tiny_index().await;

    let (status, json) = call(app, "/search?q=").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "missing 'q' parameter");
}

#[tokio::test]
async fn unknown_term_returns_empty_result_set() {
    let (_dir, app) = app_over_tiny_index().await;

    let (status, json) = call(app, "/search?q=dog").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["total_results"], 0);
    assert!(json["documents"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn broken_index_is_an_internal_error() {
    let (dir, _unused) = app_over_tiny_index().await;
    let index_dir = dir.path().join("index");
    std::fs::write(index_dir.join("lexicon.json"), b"not json").unwrap();

    let app = quarry_server::build_app(index_dir, dir.path().join("stoplist.txt"));
    let request = Request::get("/search?q=cat").body(Body::empty()).unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}
