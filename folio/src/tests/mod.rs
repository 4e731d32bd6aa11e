use std::net::SocketAddr;

use axum::{
    body::Body,
    extract::ConnectInfo,
    http::{header, Request, StatusCode},
};
use folio_config::ResendConfig;
use folio_di::Provides;
use folio_testing::resend::{Outbox, ReceivedAttachment};
use pretty_assertions::assert_eq;
use serde_json::json;
use tower::ServiceExt;

use crate::{
    email,
    environment::{types::RestServer, ConfigProvider, Provider},
};

const API_KEY: &str = "test-api-key";
const ROUTE: &str = "/api/send-email";
const BOUNDARY: &str = "----folio-e2e-boundary";

#[tokio::test]
async fn short_message_is_rejected() {
    // Arrange
    let (server, outbox) = setup().await;
    let body = form("Hi there").into_request();

    // Act
    let (status, body) = send(server, body).await;

    // Assert
    assert_eq!(status, 400);
    assert_eq!(
        body,
        json!({
            "success": false,
            "message": "Validation failed",
            "errors": [{"path": "message", "message": "Message must be at least 10 characters"}],
        })
    );
    assert!(outbox.emails().is_empty());
}

#[tokio::test]
async fn unsupported_attachment_is_not_sent() {
    // Arrange
    let (server, outbox) = setup().await;
    let body = form("I would like to get in touch.")
        .file("notes.txt", "text/plain", b"some notes")
        .into_request();

    // Act
    let (status, body) = send(server, body).await;

    // Assert
    assert_eq!(status, 400);
    assert_eq!(
        body,
        json!({"success": false, "message": "File notes.txt has an unsupported format"})
    );
    assert!(outbox.emails().is_empty());
}

#[tokio::test]
async fn submission_is_delivered() {
    // Arrange
    let (server, outbox) = setup().await;
    let body = form("I would like to get in touch.\nBest regards")
        .file("resume.pdf", "application/pdf", b"%PDF-1.4")
        .into_request();

    // Act
    let (status, body) = send(server, body).await;

    // Assert
    assert_eq!(status, 200);
    assert_eq!(
        body,
        json!({"success": true, "message": "Message sent successfully!"})
    );

    let emails = outbox.emails();
    assert_eq!(emails.len(), 1);
    let email = &emails[0];
    assert_eq!(email.to.len(), 1);
    assert!(email.to[0].contains("owner@example.com"));
    assert_eq!(email.subject, "Portfolio Contact: Hello");
    assert_eq!(email.reply_to.as_deref(), Some("jo@example.com"));
    let html = email.html.as_deref().unwrap();
    assert!(html.contains("<strong>Name:</strong> Jo"));
    assert!(html.contains("I would like to get in touch.<br>Best regards"));
    assert_eq!(email.text, None);
    assert_eq!(
        email.attachments,
        [ReceivedAttachment {
            filename: "resume.pdf".into(),
            content_type: Some("application/pdf".into()),
            content: b"%PDF-1.4".to_vec(),
        }]
    );
}

async fn setup() -> (RestServer, Outbox) {
    let (addr, outbox) = folio_testing::resend::spawn(API_KEY).await.unwrap();

    let mut config = folio_config::load_dev_config().unwrap();
    config.email.resend = Some(ResendConfig {
        api_url: format!("http://{addr}/").parse().unwrap(),
        api_key: API_KEY.into(),
    });

    let email = email::connect(&config.email).unwrap();
    let mut provider = Provider::new(ConfigProvider::new(&config), email);

    (provider.provide(), outbox)
}

async fn send(server: RestServer, mut request: Request<Body>) -> (StatusCode, serde_json::Value) {
    request
        .extensions_mut()
        .insert(ConnectInfo(SocketAddr::from(([127, 0, 0, 1], 4711))));

    let response = server.router().oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();

    (status, serde_json::from_slice(&body).unwrap())
}

fn form(message: &str) -> MultipartBody {
    MultipartBody::default()
        .text("name", "Jo")
        .text("email", "jo@example.com")
        .text("subject", "Hello")
        .text("message", message)
}

#[derive(Default)]
struct MultipartBody(Vec<u8>);

impl MultipartBody {
    fn text(mut self, name: &str, value: &str) -> Self {
        self.0.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
        self
    }

    fn file(mut self, filename: &str, content_type: &str, content: &[u8]) -> Self {
        self.0.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"files\"; \
                 filename=\"{filename}\"\r\nContent-Type: {content_type}\r\n\r\n"
            )
            .as_bytes(),
        );
        self.0.extend_from_slice(content);
        self.0.extend_from_slice(b"\r\n");
        self
    }

    fn into_request(mut self) -> Request<Body> {
        self.0
            .extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        Request::post(ROUTE)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(self.0))
            .unwrap()
    }
}
