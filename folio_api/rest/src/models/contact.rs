use axum::extract::{multipart::MultipartError, Multipart};
use folio_models::contact::{ContactFieldError, ContactForm, RawAttachment, MAX_ATTACHMENT_SIZE};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiFieldError {
    pub path: &'static str,
    pub message: &'static str,
}

impl From<ContactFieldError> for ApiFieldError {
    fn from(value: ContactFieldError) -> Self {
        Self {
            path: value.field.as_str(),
            message: value.message,
        }
    }
}

/// Reads the parts of a contact form.
///
/// Only the first [`MAX_ATTACHMENT_SIZE`] bytes of a file are kept, but
/// [`RawAttachment::size`] is always the number of bytes received.
pub async fn read_contact_form(mut multipart: Multipart) -> Result<ContactForm, MultipartError> {
    let mut form = ContactForm::default();

    while let Some(mut field) = multipart.next_field().await? {
        let Some(name) = field.name().map(ToOwned::to_owned) else {
            continue;
        };

        match name.as_str() {
            "name" => form.name = field.text().await?,
            "email" => form.email = field.text().await?,
            "subject" => form.subject = field.text().await?,
            "message" => form.message = field.text().await?,
            "files" => {
                let filename = field.file_name().unwrap_or_default().to_owned();
                let content_type = field.content_type().unwrap_or_default().to_owned();

                let mut size = 0;
                let mut content = Vec::new();
                while let Some(chunk) = field.chunk().await? {
                    size += chunk.len() as u64;
                    let remaining = MAX_ATTACHMENT_SIZE as usize - content.len();
                    content.extend_from_slice(&chunk[..chunk.len().min(remaining)]);
                }

                // empty file input
                if filename.is_empty() && size == 0 {
                    continue;
                }

                form.files.push(RawAttachment {
                    filename,
                    content_type,
                    size,
                    content,
                });
            }
            _ => {}
        }
    }

    Ok(form)
}
