//! Router-level tests driven through `tower::ServiceExt::oneshot`

mod common;

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;
use traffic_volume_predictor::web::{create_router, AppState};

fn app() -> (tempfile::TempDir, Router) {
    let dir = tempfile::tempdir().unwrap();
    let config = common::fixture_config(dir.path());
    let state = AppState::build(config).unwrap();
    (dir, create_router(Arc::new(state)))
}

async fn body_text(response: axum::response::Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    serde_json::from_str(&body_text(response).await).unwrap()
}

fn json_request(uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn api_row(weather: &str, hour: u32) -> Value {
    json!({
        "holiday": "None",
        "temp": 280.0,
        "rain_1h": 0.0,
        "snow_1h": 0.0,
        "clouds_all": 40,
        "weather_main": weather,
        "month": "January",
        "weekday": "Monday",
        "hour": hour,
    })
}

#[tokio::test]
async fn test_health() {
    let (_dir, app) = app();
    let response = app
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["encoded_features"], 18);
}

#[tokio::test]
async fn test_schema_endpoint() {
    let (_dir, app) = app();
    let response = app
        .oneshot(Request::get("/api/v1/schema").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["target"], "traffic_volume");
    let columns = body["columns"].as_array().unwrap();
    assert_eq!(columns.len(), 9);
    assert_eq!(columns[0]["name"], "holiday");
    assert_eq!(columns[0]["kind"], "categorical");
    assert_eq!(columns[8]["name"], "hour");
    assert_eq!(columns[8]["kind"], "numeric");
}

#[tokio::test]
async fn test_api_predict_batch() {
    let (_dir, app) = app();
    let request = json!({
        "alpha": 0.1,
        "rows": [api_row("Clear", 0), api_row("Rain", 8)],
    });
    let response = app
        .oneshot(json_request("/api/v1/predict", &request))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let rows = body["rows"].as_array().unwrap();
    assert_eq!(rows.len(), 2);

    assert_eq!(rows[0]["prediction"], -100.0);
    assert_eq!(rows[0]["lower"], 0.0);
    assert_eq!(rows[0]["upper"], -10.0);
    assert_eq!(rows[1]["prediction"], 700.0);
    assert_eq!(rows[1]["lower"], 610.0);
    assert_eq!(rows[1]["upper"], 790.0);
}

#[tokio::test]
async fn test_api_rejects_unknown_level() {
    let (_dir, app) = app();
    let request = json!({ "rows": [api_row("Hail", 8)] });
    let response = app
        .oneshot(json_request("/api/v1/predict", &request))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert!(body["error"].as_str().unwrap().contains("Hail"));
}

#[tokio::test]
async fn test_api_rejects_alpha_out_of_range() {
    let (_dir, app) = app();
    let request = json!({ "alpha": 0.9, "rows": [api_row("Clear", 8)] });
    let response = app
        .oneshot(json_request("/api/v1/predict", &request))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_index_renders_form() {
    let (_dir, app) = app();
    let response = app
        .oneshot(Request::get("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("Traffic Volume Predictor"));
    assert!(html.contains("Predicted Volume"));
    assert!(html.contains("Choose the current weather"));
}

#[tokio::test]
async fn test_form_prediction() {
    let (_dir, app) = app();
    let form = "holiday=None&temp=280&rain_1h=0&snow_1h=0&clouds_all=40\
                &weather_main=Clear&month=January&weekday=Monday&hour=8&alpha=0.1";
    let request = Request::builder()
        .method("POST")
        .uri("/predict")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(form))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("700.00"));
    assert!(html.contains("With a 90% confidence interval: [610.00, 790.00]"));
}

#[tokio::test]
async fn test_form_out_of_range_value() {
    let (_dir, app) = app();
    let form = "holiday=None&temp=400&rain_1h=0&snow_1h=0&clouds_all=40\
                &weather_main=Clear&month=January&weekday=Monday&hour=8&alpha=0.1";
    let request = Request::builder()
        .method("POST")
        .uri("/predict")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(form))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let html = body_text(response).await;
    assert!(html.contains("role=\"alert\""));
    assert!(html.contains("outside the reference range"));
}

#[tokio::test]
async fn test_csv_upload() {
    let (_dir, app) = app();
    let boundary = "XBOUNDARYX";
    let csv = "holiday,temp,rain_1h,snow_1h,clouds_all,weather_main,month,weekday,hour\n\
               None,272.0,0.0,0.0,80,Snow,January,Monday,0\n\
               Columbus Day,285.0,0.0,0.0,20,Clear,February,Saturday,8\n\
               None,279.5,0.2,0.0,60,Rain,March,Tuesday,17\n";
    let body = format!(
        "--{b}\r\nContent-Disposition: form-data; name=\"alpha\"\r\n\r\n0.05\r\n\
         --{b}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"upload.csv\"\r\n\
         Content-Type: text/csv\r\n\r\n{csv}\r\n--{b}--\r\n",
        b = boundary,
        csv = csv
    );
    let request = Request::builder()
        .method("POST")
        .uri("/upload")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", boundary),
        )
        .body(Body::from(body))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("Predicted Results with 95% Confidence Interval"));
    assert!(html.contains("<th>Traffic Volume Prediction</th>"));
    assert!(html.contains("<td>Columbus Day</td>"));
    assert_eq!(html.matches("<tr>").count(), 1 + 3);
}

#[tokio::test]
async fn test_index_uses_alpha_from_query() {
    let (_dir, app) = app();
    let response = app
        .oneshot(Request::get("/?alpha=0.05").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("With a 95% confidence interval"));
    assert!(!html.contains("With a 90% confidence interval"));
    assert!(html.contains("value=\"0.05\""));
}

#[tokio::test]
async fn test_index_query_overrides_form_defaults() {
    let (_dir, app) = app();
    let uri = "/?alpha=0.5&hour=8&weather_main=Rain";
    let response = app
        .oneshot(Request::get(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    // 100 * 8 - 100, half-width 50 at alpha = 0.5
    assert!(html.contains("700.00"));
    assert!(html.contains("With a 50% confidence interval: [650.00, 750.00]"));
    assert!(html.contains("<option value=\"Rain\" selected>Rain</option>"));
}

#[tokio::test]
async fn test_index_rejects_alpha_out_of_range() {
    let (_dir, app) = app();
    let response = app
        .oneshot(Request::get("/?alpha=0.9").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let html = body_text(response).await;
    assert!(html.contains("role=\"alert\""));
}

fn multipart_request(parts: &[(&str, Option<&str>, &str)]) -> Request<Body> {
    let boundary = "XBOUNDARYX";
    let mut body = String::new();
    for (name, filename, content) in parts {
        body.push_str(&format!("--{}\r\n", boundary));
        match filename {
            Some(file) => body.push_str(&format!(
                "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n\
                 Content-Type: text/csv\r\n\r\n",
                name, file
            )),
            None => body.push_str(&format!(
                "Content-Disposition: form-data; name=\"{}\"\r\n\r\n",
                name
            )),
        }
        body.push_str(content);
        body.push_str("\r\n");
    }
    body.push_str(&format!("--{}--\r\n", boundary));

    Request::builder()
        .method("POST")
        .uri("/upload")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", boundary),
        )
        .body(Body::from(body))
        .unwrap()
}

#[tokio::test]
async fn test_upload_without_file_uses_form_defaults() {
    let (_dir, app) = app();
    let response = app
        .oneshot(multipart_request(&[("alpha", None, "0.1")]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("Predicted Volume"));
    assert!(html.contains("With a 90% confidence interval"));
    assert!(!html.contains("Predicted Results with"));
}

#[tokio::test]
async fn test_upload_with_empty_file_uses_form_defaults() {
    let (_dir, app) = app();
    let response = app
        .oneshot(multipart_request(&[
            ("alpha", None, "0.05"),
            ("file", Some("empty.csv"), ""),
        ]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("Predicted Volume"));
    assert!(html.contains("With a 95% confidence interval"));
    assert!(!html.contains("Predicted Results with"));
}
