use std::{
    net::{IpAddr, SocketAddr},
    sync::{Arc, Mutex},
};

use anyhow::Context;
use axum::{
    extract::{rejection::JsonRejection, DefaultBodyLimit, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing, Json, Router,
};
use base64::{prelude::BASE64_STANDARD, Engine};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::net::TcpListener;
use tracing::info;
use uuid::Uuid;

const EMAILS_ROUTE: &str = "/emails";
/// Room for several base64 encoded attachments at the maximum size.
const MAX_REQUEST_SIZE: usize = 40 * 1024 * 1024;

/// Emails accepted by the testing server, in the order they were received.
#[derive(Debug, Clone, Default)]
pub struct Outbox(Arc<Mutex<Vec<ReceivedEmail>>>);

impl Outbox {
    pub fn emails(&self) -> Vec<ReceivedEmail> {
        self.0.lock().map(|x| x.clone()).unwrap_or_default()
    }

    fn push(&self, email: ReceivedEmail) {
        if let Ok(mut emails) = self.0.lock() {
            emails.push(email);
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceivedEmail {
    pub id: Uuid,
    pub from: String,
    pub to: Vec<String>,
    pub subject: String,
    pub html: Option<String>,
    pub text: Option<String>,
    pub reply_to: Option<String>,
    pub attachments: Vec<ReceivedAttachment>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceivedAttachment {
    pub filename: String,
    pub content_type: Option<String>,
    pub content: Vec<u8>,
}

pub async fn start_server(host: IpAddr, port: u16, api_key: String) -> anyhow::Result<()> {
    info!("Starting resend testing server on {host}:{port}");
    info!("Resend api url: http://{host}:{port}/");
    info!("API key: {api_key:?}");

    let outbox = Outbox::default();
    let listener = TcpListener::bind((host, port))
        .await
        .with_context(|| format!("Failed to bind to {host}:{port}"))?;
    axum::serve(listener, router(api_key, outbox))
        .await
        .context("Failed to start HTTP server")
}

/// Start the testing server on a random local port in the background.
pub async fn spawn(api_key: &str) -> anyhow::Result<(SocketAddr, Outbox)> {
    let outbox = Outbox::default();
    let listener = TcpListener::bind(("127.0.0.1", 0))
        .await
        .context("Failed to bind to a random port")?;
    let addr = listener.local_addr()?;

    let router = router(api_key.into(), outbox.clone());
    tokio::spawn(async move { axum::serve(listener, router).await });

    Ok((addr, outbox))
}

pub fn router(api_key: String, outbox: Outbox) -> Router {
    Router::new()
        .route("/", routing::get(index))
        .route(EMAILS_ROUTE, routing::post(send_email))
        .layer(DefaultBodyLimit::max(MAX_REQUEST_SIZE))
        .with_state(Arc::new(ServerState { api_key, outbox }))
}

struct ServerState {
    api_key: String,
    outbox: Outbox,
}

#[derive(Deserialize)]
struct SendEmailRequest {
    from: String,
    to: Vec<String>,
    subject: String,
    html: Option<String>,
    text: Option<String>,
    reply_to: Option<String>,
    #[serde(default)]
    attachments: Vec<SendEmailAttachment>,
}

#[derive(Deserialize)]
struct SendEmailAttachment {
    filename: String,
    content: String,
    content_type: Option<String>,
}

#[derive(Serialize)]
struct SendEmailResponse {
    id: Uuid,
}

async fn index() -> Json<serde_json::Value> {
    Json(json!({"name": "folio resend testing server"}))
}

async fn send_email(
    state: State<Arc<ServerState>>,
    headers: HeaderMap,
    request: Result<Json<SendEmailRequest>, JsonRejection>,
) -> Response {
    let expected = format!("Bearer {}", state.api_key);
    let authorized = headers
        .get(header::AUTHORIZATION)
        .and_then(|x| x.to_str().ok())
        .is_some_and(|x| x == expected);
    if !authorized {
        return error(StatusCode::UNAUTHORIZED, "validation_error", "API key is invalid");
    }

    let Json(request) = match request {
        Ok(request) => request,
        Err(err) => {
            return error(
                StatusCode::UNPROCESSABLE_ENTITY,
                "validation_error",
                &err.body_text(),
            )
        }
    };

    if request.to.is_empty() {
        return error(
            StatusCode::UNPROCESSABLE_ENTITY,
            "validation_error",
            "Missing `to` field",
        );
    }
    if request.html.is_none() && request.text.is_none() {
        return error(
            StatusCode::UNPROCESSABLE_ENTITY,
            "validation_error",
            "Missing `html` or `text` field",
        );
    }

    let mut attachments = Vec::with_capacity(request.attachments.len());
    for attachment in request.attachments {
        let Ok(content) = BASE64_STANDARD.decode(&attachment.content) else {
            return error(
                StatusCode::UNPROCESSABLE_ENTITY,
                "validation_error",
                "Attachment content must be base64 encoded",
            );
        };
        attachments.push(ReceivedAttachment {
            filename: attachment.filename,
            content_type: attachment.content_type,
            content,
        });
    }

    let id = Uuid::new_v4();
    state.outbox.push(ReceivedEmail {
        id,
        from: request.from,
        to: request.to,
        subject: request.subject,
        html: request.html,
        text: request.text,
        reply_to: request.reply_to,
        attachments,
    });

    Json(SendEmailResponse { id }).into_response()
}

fn error(status: StatusCode, name: &str, message: &str) -> Response {
    (
        status,
        Json(json!({
            "statusCode": status.as_u16(),
            "name": name,
            "message": message,
        })),
    )
        .into_response()
}
