//! Integration tests for the transcript API client using wiremock.

use krypto_chat::Error;
use krypto_chat::api::{ApiClient, TranscriptService};
use krypto_chat::session::SessionToken;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn session() -> SessionToken {
    SessionToken::from_string("1700000000000")
}

#[tokio::test]
async fn generate_summary_posts_session_and_email() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/generate_summary"))
        .and(header("content-type", "application/json"))
        .and(body_json(serde_json::json!({
            "session_id": "1700000000000",
            "email": "me@example.com"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "ok": true })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = ApiClient::new(mock_server.uri()).unwrap();
    let result = client.generate_summary(&session(), "me@example.com").await;
    assert!(result.is_ok(), "expected Ok, got: {:?}", result.err());
}

#[tokio::test]
async fn generate_summary_accepts_empty_success_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/generate_summary"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = ApiClient::new(mock_server.uri()).unwrap();
    assert!(client.generate_summary(&session(), "me@example.com").await.is_ok());
}

#[tokio::test]
async fn generate_summary_maps_error_status() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/generate_summary"))
        .respond_with(ResponseTemplate::new(500).set_body_string("mail relay down"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = ApiClient::new(mock_server.uri()).unwrap();
    let err = client
        .generate_summary(&session(), "me@example.com")
        .await
        .unwrap_err();

    match err {
        Error::Api { status, message } => {
            assert_eq!(status, 500);
            assert_eq!(message, "mail relay down");
        }
        other => panic!("expected Api error, got: {other:?}"),
    }
}

#[tokio::test]
async fn download_chat_returns_binary_body() {
    let mock_server = MockServer::start().await;
    let pdf = b"%PDF-1.4\n%\xe2\xe3\xcf\xd3\n".to_vec();

    Mock::given(method("POST"))
        .and(path("/download_chat"))
        .and(body_json(serde_json::json!({ "session_id": "1700000000000" })))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "application/pdf")
                .set_body_bytes(pdf.clone()),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = ApiClient::new(mock_server.uri()).unwrap();
    let body = client.download_chat(&session()).await.unwrap();
    assert_eq!(body.as_ref(), pdf.as_slice());
}

#[tokio::test]
async fn download_chat_maps_not_found() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/download_chat"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let client = ApiClient::new(mock_server.uri()).unwrap();
    let err = client.download_chat(&session()).await.unwrap_err();
    assert!(matches!(err, Error::Api { status: 404, .. }));
}

#[tokio::test]
async fn unreachable_backend_is_http_error() {
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let client = ApiClient::new(format!("http://127.0.0.1:{port}")).unwrap();
    let err = client.download_chat(&session()).await.unwrap_err();
    assert!(matches!(err, Error::Http(_)));
}

#[test]
fn invalid_base_url_is_rejected() {
    assert!(matches!(
        ApiClient::new("not a url"),
        Err(Error::InvalidUrl(_))
    ));
}
