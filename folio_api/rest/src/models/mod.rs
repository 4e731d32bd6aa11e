use std::borrow::Cow;

use serde::Serialize;

use self::contact::ApiFieldError;

pub mod contact;

/// Body of every response of the contact endpoint.
#[derive(Debug, Serialize)]
pub struct ApiSubmissionResponse {
    pub success: bool,
    pub message: Cow<'static, str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<ApiFieldError>>,
}

impl ApiSubmissionResponse {
    pub fn success(message: &'static str) -> Self {
        Self {
            success: true,
            message: message.into(),
            errors: None,
        }
    }

    pub fn failure(message: impl Into<Cow<'static, str>>) -> Self {
        Self {
            success: false,
            message: message.into(),
            errors: None,
        }
    }
}
