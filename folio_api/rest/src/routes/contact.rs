use std::sync::Arc;

use axum::{
    extract::{multipart::MultipartRejection, DefaultBodyLimit, Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing, Json, Router,
};
use folio_core_contact_contracts::{ContactFeatureService, ContactSubmitError};
use folio_models::contact::ContactValidationError;
use tracing::debug;

use super::{failure, internal_server_error};
use crate::models::{contact::read_contact_form, ApiSubmissionResponse};

const INVALID_FORM_DATA: &str = "Invalid form data";

pub fn router(service: Arc<impl ContactFeatureService>, max_body_size: usize) -> Router<()> {
    Router::new()
        .route("/api/send-email", routing::post(send_email))
        .layer(DefaultBodyLimit::max(max_body_size))
        .with_state(service)
}

async fn send_email(
    service: State<Arc<impl ContactFeatureService>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Response {
    let multipart = match multipart {
        Ok(multipart) => multipart,
        Err(err) => {
            debug!("rejected contact form request: {err}");
            return failure(StatusCode::BAD_REQUEST, INVALID_FORM_DATA);
        }
    };

    let form = match read_contact_form(multipart).await {
        Ok(form) => form,
        Err(err) if err.status() == StatusCode::PAYLOAD_TOO_LARGE => {
            debug!("contact form request too large: {err}");
            return failure(StatusCode::PAYLOAD_TOO_LARGE, "Request body too large");
        }
        Err(err) => {
            debug!("failed to read contact form: {err}");
            return failure(StatusCode::BAD_REQUEST, INVALID_FORM_DATA);
        }
    };

    match service.submit(form).await {
        Ok(()) => Json(ApiSubmissionResponse::success("Message sent successfully!")).into_response(),
        Err(ContactSubmitError::Validation(ContactValidationError::Fields(errors))) => (
            StatusCode::BAD_REQUEST,
            Json(ApiSubmissionResponse {
                errors: Some(errors.into_iter().map(Into::into).collect()),
                ..ApiSubmissionResponse::failure("Validation failed")
            }),
        )
            .into_response(),
        Err(ContactSubmitError::Validation(err)) => {
            failure(StatusCode::BAD_REQUEST, err.to_string())
        }
        Err(ContactSubmitError::Send) => failure(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Failed to send message. Please try again later.",
        ),
        Err(ContactSubmitError::Other(err)) => internal_server_error(err),
    }
}
