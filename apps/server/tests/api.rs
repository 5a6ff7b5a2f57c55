use axum::{
    body::{to_bytes, Body},
    http::{Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use std::io::{Cursor, Write};
use std::path::Path;
use std::time::Duration;
use stockview_server::{api::app_router, build_state, config::Config};
use tempfile::{tempdir, TempDir};
use tower::ServiceExt;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

const BHAVCOPY: &str = "SC_CODE,SC_NAME,SC_GROUP,SC_TYPE,OPEN,HIGH,LOW,CLOSE,LAST,PREVCLOSE,NO_TRADES,NO_OF_SHRS,NET_TURNOV,TDCLOINDI
500002,ABB LTD.,A ,Q,4300.00,4391.50,4285.05,4370.65,4370.65,4296.15,2846,14527,63201812.00,
500325,RELIANCE,A ,Q,2650.00,2710.00,2640.00,2700.00,2701.00,2655.00,90000,1500000,4050000000.00,
532540,TCS,A ,Q,abc,3900.00,3800.00,3850.00,3851.00,3820.00,40000,700000,2695000000.00,
";

fn write_feed(dir: &Path) -> String {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    writer
        .start_file("EQ250124.CSV", SimpleFileOptions::default())
        .unwrap();
    writer.write_all(BHAVCOPY.as_bytes()).unwrap();
    let bytes = writer.finish().unwrap().into_inner();
    let path = dir.join("EQ250124_CSV.ZIP");
    std::fs::write(&path, bytes).unwrap();
    path.to_string_lossy().to_string()
}

fn test_config(dir: &Path) -> Config {
    Config {
        listen_addr: "127.0.0.1:0".parse().unwrap(),
        db_path: dir.join("test.db").to_string_lossy().to_string(),
        cors_allow: vec!["*".to_string()],
        request_timeout: Duration::from_secs(30),
        db_connect_timeout: Duration::from_secs(10),
        bhavcopy_url: Some(write_feed(dir)),
        fetch_timeout: Duration::from_secs(5),
        fetch_user_agent: "test".to_string(),
        price_history_ttl: Duration::from_secs(300),
        ingest_on_startup: false,
        ingest_interval: None,
    }
}

async fn test_app() -> (Router, TempDir) {
    let tmp = tempdir().unwrap();
    let config = test_config(tmp.path());
    let state = build_state(&config).await.unwrap();
    (app_router(state, &config), tmp)
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            builder = builder.header("content-type", "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };
    let response = app
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

#[tokio::test]
async fn healthz_works() {
    let (app, _tmp) = test_app().await;
    let response = app
        .oneshot(Request::builder().uri("/api/v1/healthz").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
}

#[tokio::test]
async fn ingest_then_query_stocks() {
    let (app, _tmp) = test_app().await;

    let (status, report) = send(&app, Method::POST, "/api/v1/ingest", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["summary"]["inserted"], 3);
    assert_eq!(report["defaultedRows"], 1);
    assert_eq!(report["tradeDate"], "2024-01-25");

    let (status, top) = send(&app, Method::GET, "/api/v1/stocks/top?limit=2", None).await;
    assert_eq!(status, StatusCode::OK);
    let codes: Vec<&str> = top
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["code"].as_str().unwrap())
        .collect();
    assert_eq!(codes, vec!["500002", "532540"]);

    let (status, tcs) = send(&app, Method::GET, "/api/v1/stocks/by-name?name=TCS", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(tcs["open"], 0.0);
    assert_eq!(tcs["close"], 3850.0);

    let (status, history) = send(
        &app,
        Method::GET,
        "/api/v1/stocks/price-history?code=500325",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(history, json!([{ "date": "2024-01-25", "price": 2700.0 }]));
}

#[tokio::test]
async fn missing_parameters_are_bad_requests() {
    let (app, _tmp) = test_app().await;

    let (status, body) = send(&app, Method::GET, "/api/v1/stocks/by-code", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Stock code parameter is missing");

    let (status, _) = send(&app, Method::GET, "/api/v1/stocks/by-name?name=", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, Method::DELETE, "/api/v1/favorites", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unknown_code_is_not_found() {
    let (app, _tmp) = test_app().await;
    let (status, body) = send(&app, Method::GET, "/api/v1/stocks/by-code?code=Z", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], 404);
}

#[tokio::test]
async fn favorites_round_trip() {
    let (app, _tmp) = test_app().await;

    let payload = json!({
        "code": "XYZ123",
        "name": "XYZ LTD",
        "group": "B",
        "type": "Q",
        "close": 5.0,
        "isFavorite": true
    });
    let (status, _) = send(&app, Method::POST, "/api/v1/favorites", Some(payload)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, favorites) = send(&app, Method::GET, "/api/v1/favorites", None).await;
    assert_eq!(favorites.as_array().unwrap().len(), 1);
    assert_eq!(favorites[0]["code"], "XYZ123");

    let (status, _) = send(
        &app,
        Method::DELETE,
        "/api/v1/favorites?code=XYZ123",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    // Removing a favorite deletes the stock itself
    let (status, _) = send(&app, Method::GET, "/api/v1/stocks/by-code?code=XYZ123", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (_, favorites) = send(&app, Method::GET, "/api/v1/favorites", None).await;
    assert_eq!(favorites, json!([]));
}

#[tokio::test]
async fn ingest_failure_is_generic_500() {
    let tmp = tempdir().unwrap();
    let mut config = test_config(tmp.path());
    config.bhavcopy_url = Some(tmp.path().join("missing.zip").to_string_lossy().to_string());
    let state = build_state(&config).await.unwrap();
    let app = app_router(state, &config);

    let (status, body) = send(&app, Method::POST, "/api/v1/ingest", None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["message"], "Failed to ingest bhavcopy");
}

#[tokio::test]
async fn invalid_fetch_user_agent_fails_startup() {
    let tmp = tempdir().unwrap();
    let mut config = test_config(tmp.path());
    config.bhavcopy_url = None;
    config.fetch_user_agent = "bad\nagent".to_string();

    match build_state(&config).await {
        Ok(_) => panic!("build_state accepted an invalid user agent"),
        Err(err) => assert!(err.to_string().contains("HTTP client could not be built")),
    }
}
