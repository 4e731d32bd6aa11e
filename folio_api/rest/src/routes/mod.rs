use std::borrow::Cow;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::models::ApiSubmissionResponse;

pub mod contact;
pub mod health;

pub fn internal_server_error(err: impl Into<anyhow::Error>) -> Response {
    let err = err.into();
    tracing::error!("internal server error: {err:#}");
    failure(
        StatusCode::INTERNAL_SERVER_ERROR,
        "Failed to process your request. Please try again.",
    )
}

fn failure(code: StatusCode, message: impl Into<Cow<'static, str>>) -> Response {
    (code, Json(ApiSubmissionResponse::failure(message))).into_response()
}
