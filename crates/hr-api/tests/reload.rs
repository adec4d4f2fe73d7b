use std::io::Write;

use axum::{body::Body, http::Request, http::StatusCode};
use http_body_util::BodyExt;
use hr_api::{AppConfig, build_state, create_router, default_rate_limits};
use hr_common::RetrievalEngine;
use serde_json::Value;
use tempfile::NamedTempFile;
use tower::ServiceExt;

const TWO: &str = r#"[
    {"id": 1, "name": "Ada", "skills": ["Python"], "experience_years": 5, "availability": "available"},
    {"id": 2, "name": "Bob", "skills": ["Java"], "experience_years": 2, "availability": "busy"}
]"#;

const THREE_WITH_BAD: &str = r#"[
    {"id": 1, "name": "Ada", "skills": ["Python"], "experience_years": 5, "availability": "available"},
    {"id": 2, "name": "Bob", "skills": ["Java"], "experience_years": 2, "availability": "busy"},
    {"id": 3, "name": "Cleo", "skills": ["Go"], "experience_years": 4, "availability": "available"},
    {"id": 4, "name": "Ghost", "skills": [], "experience_years": -1, "availability": "available"}
]"#;

fn write_dataset(file: &mut NamedTempFile, json: &str) {
    let handle = file.as_file_mut();
    handle.set_len(0).unwrap();
    std::io::Seek::rewind(handle).unwrap();
    handle.write_all(json.as_bytes()).unwrap();
    handle.flush().unwrap();
}

async fn send(app: axum::Router, method: &str, uri: &str) -> (StatusCode, Value) {
    let response = app
        .oneshot(
            Request::builder()
                .method(method)
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn reload_swaps_in_the_new_dataset() {
    let mut file = NamedTempFile::new().unwrap();
    write_dataset(&mut file, TWO);

    let state = build_state(
        AppConfig::for_tests(file.path()),
        RetrievalEngine::default(),
        default_rate_limits(),
    )
    .unwrap();
    let app = create_router(state.clone());
    assert_eq!(state.index().len(), 2);

    write_dataset(&mut file, THREE_WITH_BAD);
    let (status, body) = send(app.clone(), "POST", "/api/corpus/reload").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["loaded"], 3);
    assert_eq!(body["skipped"], 1);
    assert_eq!(body["previous"], 2);

    let (status, body) = send(app, "GET", "/api/employees/3").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Cleo");
}

#[tokio::test]
async fn failed_reload_keeps_the_current_index() {
    let mut file = NamedTempFile::new().unwrap();
    write_dataset(&mut file, TWO);

    let state = build_state(
        AppConfig::for_tests(file.path()),
        RetrievalEngine::default(),
        default_rate_limits(),
    )
    .unwrap();
    let app = create_router(state.clone());

    write_dataset(&mut file, "{ not json");
    let (status, body) = send(app.clone(), "POST", "/api/corpus/reload").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["code"], "dataset_error");
    assert_eq!(state.index().len(), 2);

    let (status, _) = send(app, "GET", "/api/employees/1").await;
    assert_eq!(status, StatusCode::OK);
}

#[test]
fn startup_fails_on_missing_dataset() {
    let dir = tempfile::tempdir().unwrap();
    let result = build_state(
        AppConfig::for_tests(dir.path().join("absent.json")),
        RetrievalEngine::default(),
        default_rate_limits(),
    );

    assert!(result.is_err());
}

#[tokio::test]
async fn readyz_flips_when_shutting_down() {
    let state = hr_api::test_state(Vec::new());
    state
        .readiness
        .store(false, std::sync::atomic::Ordering::SeqCst);
    let app = create_router(state);

    let (status, body) = send(app, "GET", "/readyz").await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["code"], "service_unavailable");
}
