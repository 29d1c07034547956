mod common;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use common::{load_fixture_models, INTRUSION_FORM, NORMAL_FORM};
use intrusion_detector::web::{router, AppState};
use std::sync::Arc;
use tower::ServiceExt;

fn app() -> Router {
    let state = AppState::new(Arc::new(load_fixture_models())).unwrap();
    router(state)
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, String) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, String::from_utf8(bytes.to_vec()).unwrap())
}

async fn post_form(app: &Router, body: &str) -> (StatusCode, String) {
    let request = Request::builder()
        .method(Method::POST)
        .uri("/")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

fn without_field(form: &str, field: &str) -> String {
    form.split('&')
        .filter(|pair| !pair.starts_with(&format!("{field}=")))
        .collect::<Vec<_>>()
        .join("&")
}

#[tokio::test]
async fn get_renders_empty_form() {
    let app = app();
    let request = Request::builder().uri("/").body(Body::empty()).unwrap();
    let (status, body) = send(&app, request).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("name=\"dst_host_same_src_port_rate\""));
    assert!(!body.contains("id=\"result\""));
    assert!(!body.contains("Error: "));
}

#[tokio::test]
async fn normal_example_is_normal_traffic() {
    let (status, body) = post_form(&app(), NORMAL_FORM).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("✅ Normal Traffic"));
    assert!(!body.contains("Intrusion Detected"));
}

#[tokio::test]
async fn intrusion_example_is_flagged() {
    let (status, body) = post_form(&app(), INTRUSION_FORM).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("🚨 Intrusion Detected!"));
    assert!(!body.contains("Normal Traffic"));
}

#[tokio::test]
async fn missing_field_renders_error_with_200() {
    let form = without_field(NORMAL_FORM, "service");
    let (status, body) = post_form(&app(), &form).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Error: missing form field"));
    assert!(body.contains("service"));
}

#[tokio::test]
async fn non_numeric_field_renders_error_with_200() {
    let form = NORMAL_FORM.replace("count=5", "count=lots");
    let (status, body) = post_form(&app(), &form).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Error: could not convert string to float"));
}

#[tokio::test]
async fn non_finite_values_render_error() {
    let app = app();
    for value in ["nan", "inf", "-inf"] {
        let form = NORMAL_FORM.replace("count=5", &format!("count={value}"));
        let (status, body) = post_form(&app, &form).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("Error: classifier input contains NaN or infinity"), "count={value}");
        assert!(!body.contains("Normal Traffic"));
        assert!(!body.contains("Intrusion Detected"));
    }
}

#[tokio::test]
async fn first_occurrence_of_repeated_field_wins() {
    let form = format!("{INTRUSION_FORM}&{NORMAL_FORM}");
    let (status, body) = post_form(&app(), &form).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("🚨 Intrusion Detected!"));
}

#[tokio::test]
async fn wrong_content_type_still_answers_200() {
    let request = Request::builder()
        .method(Method::POST)
        .uri("/")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{}"))
        .unwrap();
    let (status, body) = send(&app(), request).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("id=\"result\""));
    assert!(body.contains("Error: "));
}

#[tokio::test]
async fn repeated_submissions_agree() {
    let app = app();
    let (_, first) = post_form(&app, INTRUSION_FORM).await;
    let (_, second) = post_form(&app, INTRUSION_FORM).await;
    assert_eq!(first, second);
}

#[tokio::test]
async fn other_routes_are_not_served() {
    let request = Request::builder().uri("/api/predict").body(Body::empty()).unwrap();
    let (status, _) = send(&app(), request).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
