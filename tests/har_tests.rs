//! Tests for replaying HAR archives through the mock client.

use http::Method;
use mock_http_client::{HarReplay, HttpClient, MockHttpClient, RequestOptions};
use pretty_assertions::assert_eq;

const ARCHIVE: &str = r#"{
    "log": {
        "version": "1.2",
        "creator": {"name": "browser", "version": "1.0"},
        "entries": [
            {
                "request": {
                    "method": "GET",
                    "url": "https://api.example.com/users/1",
                    "headers": []
                },
                "response": {
                    "status": 200,
                    "statusText": "OK",
                    "httpVersion": "HTTP/1.1",
                    "headers": [{"name": "Content-Type", "value": "application/json"}],
                    "content": {"size": 26, "mimeType": "application/json", "text": "{\"id\":1,\"name\":\"Ada\"}"}
                }
            },
            {
                "request": {
                    "method": "POST",
                    "url": "https://api.example.com/users",
                    "postData": {"mimeType": "application/json", "text": "{\"name\":\"Grace\"}"}
                },
                "response": {
                    "status": 422,
                    "statusText": "Unprocessable Entity",
                    "httpVersion": "HTTP/1.1",
                    "headers": [],
                    "content": {"text": "invalid"}
                }
            }
        ]
    }
}"#;

fn client() -> MockHttpClient {
    let replay = HarReplay::from_json(ARCHIVE).unwrap();
    MockHttpClient::with_base_uri(replay.into_source(), "https://api.example.com/").unwrap()
}

#[tokio::test]
async fn test_replays_recorded_response() {
    let client = client();

    let response = client
        .request(Method::GET, "users/1", RequestOptions::new())
        .await
        .unwrap();

    let user: serde_json::Value = response.json().unwrap();
    assert_eq!(user["name"], "Ada");
    assert_eq!(
        response.headers(true).unwrap().first_value("content-type"),
        Some("application/json")
    );
}

#[tokio::test]
async fn test_replays_any_number_of_times() {
    let client = client();

    for _ in 0..3 {
        let response = client
            .request(Method::GET, "users/1", RequestOptions::new())
            .await
            .unwrap();
        assert_eq!(response.status_code().unwrap(), 200);
    }
}

#[tokio::test]
async fn test_matches_request_body() {
    let client = client();

    let response = client
        .request(
            Method::POST,
            "users",
            RequestOptions::new().json(serde_json::json!({"name": "Grace"})),
        )
        .await
        .unwrap();

    assert_eq!(response.status_code().unwrap(), 422);
    assert_eq!(response.text(false).unwrap(), "invalid");
    assert!(response.content(true).unwrap_err().is_client_error());
}

#[tokio::test]
async fn test_unmatched_request_fails() {
    let client = client();

    let error = client
        .request(Method::DELETE, "users/1", RequestOptions::new())
        .await
        .unwrap_err();

    assert_eq!(
        error.to_string(),
        "HAR archive does not contain a response for HTTP request \"DELETE\" \"https://api.example.com/users/1\"."
    );
}

#[tokio::test]
async fn test_from_file() {
    let path = std::env::temp_dir().join(format!("mock-http-client-{}.har", std::process::id()));
    std::fs::write(&path, ARCHIVE).unwrap();

    let replay = HarReplay::from_file(&path).unwrap();
    std::fs::remove_file(&path).unwrap();

    assert_eq!(replay.len(), 2);
}
