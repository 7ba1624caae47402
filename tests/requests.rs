//! URL building, header merging and body encoding as seen by the server.

mod common;

use common::MockServerFixture;
use mockito::Matcher;
use serde::Deserialize;
use serde_json::json;
use trade_http::{Body, FormData, HttpClient, Payload, RequestOptions};

#[tokio::test]
async fn test_list_params_join_into_one_segment() {
    let mut fixture = MockServerFixture::new().await;
    let mock = fixture
        .server
        .mock("GET", "/assets")
        .match_query(Matcher::UrlEncoded("ids".into(), "a,b".into()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"[{"id":"a"},{"id":"b"}]"#)
        .create_async()
        .await;

    let resp = fixture
        .client()
        .get("/assets", RequestOptions::new().param("ids", vec!["a", "b"]))
        .await
        .unwrap();
    assert_eq!(resp.data.as_json().and_then(|v| v.as_array()).map(Vec::len), Some(2));

    mock.assert_async().await;
}

#[tokio::test]
async fn test_params_append_to_existing_query() {
    let mut fixture = MockServerFixture::new().await;
    let mock = fixture
        .server
        .mock("GET", "/candles")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("interval".into(), "1h".into()),
            Matcher::UrlEncoded("limit".into(), "50".into()),
            Matcher::UrlEncoded("symbol".into(), "BTC/USD".into()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body("[]")
        .create_async()
        .await;

    fixture
        .client()
        .get(
            "/candles?interval=1h",
            RequestOptions::new()
                .param("symbol", "BTC/USD")
                .param("limit", 50i64),
        )
        .await
        .unwrap();

    mock.assert_async().await;
}

#[tokio::test]
async fn test_absolute_url_ignores_base() {
    let mut fixture = MockServerFixture::new().await;
    let mock = fixture
        .server
        .mock("GET", "/abs")
        .with_status(200)
        .with_header("content-type", "text/plain")
        .with_body("direct")
        .create_async()
        .await;

    let client = HttpClient::builder()
        .base_url("http://127.0.0.1:9/api")
        .build()
        .unwrap();
    let resp = client
        .get(&format!("{}/abs", fixture.base_url), RequestOptions::new())
        .await
        .unwrap();
    assert_eq!(resp.data.as_text(), Some("direct"));

    mock.assert_async().await;
}

#[tokio::test]
async fn test_header_precedence() {
    let mut fixture = MockServerFixture::new().await;
    let mock = fixture
        .server
        .mock("POST", "/orders")
        .match_header("content-type", "application/vnd.trade+json")
        .match_header("x-app", "terminal")
        .match_header("x-client", "dashboard")
        .match_body(Matcher::Json(json!({"symbol": "BTC", "qty": 2})))
        .with_status(201)
        .with_header("content-type", "application/json")
        .with_body(r#"{"id":1}"#)
        .create_async()
        .await;

    let client = fixture
        .builder()
        .header("X-App", "dashboard")
        .header("x-client", "dashboard")
        .build()
        .unwrap();
    client
        .post(
            "/orders",
            Some(json!({"symbol": "BTC", "qty": 2}).into()),
            RequestOptions::new()
                .header("Content-Type", "application/vnd.trade+json")
                .header("x-app", "terminal"),
        )
        .await
        .unwrap();

    mock.assert_async().await;
}

#[tokio::test]
async fn test_json_content_type_by_default() {
    let mut fixture = MockServerFixture::new().await;
    let mock = fixture
        .server
        .mock("PUT", "/watchlist")
        .match_header("content-type", "application/json")
        .match_body(Matcher::Json(json!(["BTC", "ETH"])))
        .with_status(204)
        .create_async()
        .await;

    let body = Body::json(&vec!["BTC", "ETH"]).unwrap();
    fixture
        .client()
        .put("/watchlist", Some(body), RequestOptions::new())
        .await
        .unwrap();

    mock.assert_async().await;
}

#[tokio::test]
async fn test_form_body_keeps_multipart_content_type() {
    let mut fixture = MockServerFixture::new().await;
    let mock = fixture
        .server
        .mock("POST", "/uploads")
        .match_header("content-type", Matcher::Regex("^multipart/form-data; boundary=".into()))
        .match_body(Matcher::Regex("trades.csv".into()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"rows":2}"#)
        .create_async()
        .await;

    let form = FormData::new()
        .text("kind", "trades")
        .file("file", b"a,b\n1,2\n".to_vec(), "trades.csv", Some("text/csv"));
    let resp = fixture
        .client()
        .post("/uploads", Some(form.into()), RequestOptions::new())
        .await
        .unwrap();
    assert_eq!(resp.data, Payload::Json(json!({"rows": 2})));

    mock.assert_async().await;
}

#[tokio::test]
async fn test_patch_sends_method_and_body() {
    let mut fixture = MockServerFixture::new().await;
    let mock = fixture
        .server
        .mock("PATCH", "/alerts/3")
        .match_body(Matcher::Json(json!({"enabled": false})))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"id":3,"enabled":false}"#)
        .create_async()
        .await;

    fixture
        .client()
        .patch(
            "/alerts/3",
            Some(json!({"enabled": false}).into()),
            RequestOptions::new(),
        )
        .await
        .unwrap();

    mock.assert_async().await;
}

#[derive(Debug, Deserialize, PartialEq)]
struct Asset {
    id: String,
    price: f64,
}

#[tokio::test]
async fn test_get_json_typed() {
    let mut fixture = MockServerFixture::new().await;
    let _mock = fixture
        .server
        .mock("GET", "/assets/btc")
        .with_status(200)
        .with_header("content-type", "application/json; charset=utf-8")
        .with_body(r#"{"id":"btc","price":64000.5}"#)
        .create_async()
        .await;

    let resp = tokio_test::assert_ok!(
        fixture
            .client()
            .get_json::<Asset>("/assets/btc", RequestOptions::new())
            .await
    );
    assert_eq!(
        resp.data,
        Asset {
            id: "btc".into(),
            price: 64000.5
        }
    );
    assert!(!resp.from_cache);
}

#[tokio::test]
async fn test_binary_payload() {
    let mut fixture = MockServerFixture::new().await;
    let _mock = fixture
        .server
        .mock("GET", "/export")
        .with_status(200)
        .with_header("content-type", "application/octet-stream")
        .with_body(vec![0u8, 159, 146, 150])
        .create_async()
        .await;

    let resp = fixture
        .client()
        .get("/export", RequestOptions::new())
        .await
        .unwrap();
    assert_eq!(resp.data.as_bytes().map(|b| b.as_ref()), Some(&[0u8, 159, 146, 150][..]));
}

#[tokio::test]
async fn test_invalid_header_is_configuration_error() {
    let fixture = MockServerFixture::new().await;
    let err = tokio_test::assert_err!(
        fixture
            .client()
            .get("/x", RequestOptions::new().header("bad header", "v"))
            .await
    );
    assert!(matches!(err, trade_http::Error::Configuration { .. }));
}
