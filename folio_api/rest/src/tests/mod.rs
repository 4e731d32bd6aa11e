use std::net::SocketAddr;

use axum::{
    body::Body,
    extract::ConnectInfo,
    http::{header, HeaderMap, Request, StatusCode},
};
use folio_core_contact_contracts::ContactFeatureService;
use folio_core_health_contracts::HealthFeatureService;
use tower::ServiceExt;

use crate::{RestServer, RestServerConfig};


const BOUNDARY: &str = "----folio-test-boundary";

fn make_server<Health, Contact>(health: Health, contact: Contact) -> RestServer<Health, Contact> {
    RestServer {
        health,
        contact,
        config: RestServerConfig {
            host: [127, 0, 0, 1].into(),
            port: 8000,
            max_body_size: 32 * 1024 * 1024,
            real_ip_config: None,
        },
    }
}

async fn send<Health, Contact>(
    server: RestServer<Health, Contact>,
    mut request: Request<Body>,
) -> (StatusCode, HeaderMap, serde_json::Value)
where
    Health: HealthFeatureService,
    Contact: ContactFeatureService,
{
    request
        .extensions_mut()
        .insert(ConnectInfo(SocketAddr::from(([127, 0, 0, 1], 4711))));

    let response = server.router().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null);

    (status, headers, body)
}

/// Builder for `multipart/form-data` request bodies.
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

    fn file(mut self, name: &str, filename: &str, content_type: &str, content: &[u8]) -> Self {
        self.0.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"; \
                 filename=\"{filename}\"\r\nContent-Type: {content_type}\r\n\r\n"
            )
            .as_bytes(),
        );
        self.0.extend_from_slice(content);
        self.0.extend_from_slice(b"\r\n");
        self
    }

    fn into_request(mut self, uri: &str) -> Request<Body> {
        self.0
            .extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        Request::post(uri)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(self.0))
            .unwrap()
    }
}
