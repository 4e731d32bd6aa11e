//! Contact form submissions and the rules they are validated against.
//!
//! [`ContactForm::validate`] is the only way to obtain a [`ContactSubmission`].
//! Every entry point (HTTP, CLI) feeds raw input through it.

use std::fmt;

use nutype::nutype;
use serde::Serialize;
use thiserror::Error;

use crate::email_address::EmailAddress;

/// Maximum size of a single attachment in bytes (5 MB).
pub const MAX_ATTACHMENT_SIZE: u64 = 5 * 1024 * 1024;

/// Content types accepted for attachments.
pub const ALLOWED_ATTACHMENT_TYPES: &[AttachmentContentType] = &[
    AttachmentContentType::Jpeg,
    AttachmentContentType::Png,
    AttachmentContentType::Gif,
    AttachmentContentType::Pdf,
    AttachmentContentType::Doc,
    AttachmentContentType::Docx,
];

/// Unvalidated contact form input.
///
/// Missing text fields are represented as empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactForm {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
    pub files: Vec<RawAttachment>,
}

/// A file as received from the client.
///
/// `size` is the number of bytes the client sent. It can exceed
/// `content.len()` if the reader stopped buffering an oversized file.
#[derive(Clone, PartialEq, Eq)]
pub struct RawAttachment {
    pub filename: String,
    pub content_type: String,
    pub size: u64,
    pub content: Vec<u8>,
}

impl RawAttachment {
    pub fn new(
        filename: impl Into<String>,
        content_type: impl Into<String>,
        content: Vec<u8>,
    ) -> Self {
        Self {
            filename: filename.into(),
            content_type: content_type.into(),
            size: content.len() as u64,
            content,
        }
    }
}

impl fmt::Debug for RawAttachment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RawAttachment")
            .field("filename", &self.filename)
            .field("content_type", &self.content_type)
            .field("size", &self.size)
            .finish_non_exhaustive()
    }
}

/// A fully validated contact form submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactSubmission {
    pub author: ContactAuthor,
    pub subject: ContactSubject,
    pub message: ContactMessageContent,
    pub attachments: Vec<ContactAttachment>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactAuthor {
    pub name: ContactAuthorName,
    pub email: EmailAddress,
}

#[nutype(
    validate(not_empty),
    derive(Debug, Clone, PartialEq, Eq, TryFrom, Deref, Display, Serialize)
)]
pub struct ContactAuthorName(String);

#[nutype(
    validate(not_empty),
    derive(Debug, Clone, PartialEq, Eq, TryFrom, Deref, Display, Serialize)
)]
pub struct ContactSubject(String);

/// The length is measured in UTF-16 code units, the way browsers count it.
#[nutype(
    validate(predicate = |s: &str| s.encode_utf16().count() >= 10),
    derive(Debug, Clone, PartialEq, Eq, TryFrom, Deref, Display, Serialize)
)]
pub struct ContactMessageContent(String);

#[derive(Clone, PartialEq, Eq)]
pub struct ContactAttachment {
    pub filename: String,
    pub content_type: AttachmentContentType,
    pub content: Vec<u8>,
}

impl fmt::Debug for ContactAttachment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContactAttachment")
            .field("filename", &self.filename)
            .field("content_type", &self.content_type)
            .field("size", &self.content.len())
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttachmentContentType {
    Jpeg,
    Png,
    Gif,
    Pdf,
    /// Legacy Word document
    Doc,
    /// Office Open XML Word document
    Docx,
}

impl AttachmentContentType {
    pub fn as_mime(self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
            Self::Gif => "image/gif",
            Self::Pdf => "application/pdf",
            Self::Doc => "application/msword",
            Self::Docx => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        }
    }

    /// Parses a declared content type. MIME parameters and letter case are
    /// ignored, so `"Image/PNG; name=x"` is accepted as [`Self::Png`].
    pub fn from_mime(content_type: &str) -> Option<Self> {
        let essence = content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim();

        ALLOWED_ATTACHMENT_TYPES
            .iter()
            .copied()
            .find(|ty| ty.as_mime().eq_ignore_ascii_case(essence))
    }
}

impl fmt::Display for AttachmentContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_mime())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContactValidationError {
    #[error("Validation failed")]
    Fields(Vec<ContactFieldError>),
    #[error("File {filename} exceeds the maximum size of 5MB")]
    AttachmentTooLarge { filename: String },
    #[error("File {filename} has an unsupported format")]
    UnsupportedAttachmentType { filename: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactFieldError {
    pub field: ContactField,
    pub message: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ContactField {
    Name,
    Email,
    Subject,
    Message,
}

impl ContactField {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Email => "email",
            Self::Subject => "subject",
            Self::Message => "message",
        }
    }
}

impl fmt::Display for ContactField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ContactForm {
    /// Validates the form.
    ///
    /// All text fields are checked and every offending field is reported, in
    /// form order. Attachments are only checked once the text fields are
    /// valid, and the first invalid attachment aborts validation.
    pub fn validate(self) -> Result<ContactSubmission, ContactValidationError> {
        let mut errors = Vec::new();

        let name = check(
            &mut errors,
            ContactAuthorName::try_new(self.name),
            ContactField::Name,
            "Name is required",
        );
        let email = check(
            &mut errors,
            self.email.parse::<EmailAddress>(),
            ContactField::Email,
            "Invalid email address",
        );
        let subject = check(
            &mut errors,
            ContactSubject::try_new(self.subject),
            ContactField::Subject,
            "Subject is required",
        );
        let message = check(
            &mut errors,
            ContactMessageContent::try_new(self.message),
            ContactField::Message,
            "Message must be at least 10 characters",
        );

        let (Some(name), Some(email), Some(subject), Some(message)) =
            (name, email, subject, message)
        else {
            return Err(ContactValidationError::Fields(errors));
        };

        let attachments = self
            .files
            .into_iter()
            .map(validate_attachment)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(ContactSubmission {
            author: ContactAuthor { name, email },
            subject,
            message,
            attachments,
        })
    }
}

fn check<T, E>(
    errors: &mut Vec<ContactFieldError>,
    result: Result<T, E>,
    field: ContactField,
    message: &'static str,
) -> Option<T> {
    result
        .map_err(|_| errors.push(ContactFieldError { field, message }))
        .ok()
}

fn validate_attachment(file: RawAttachment) -> Result<ContactAttachment, ContactValidationError> {
    if file.size > MAX_ATTACHMENT_SIZE {
        return Err(ContactValidationError::AttachmentTooLarge {
            filename: file.filename,
        });
    }

    let Some(content_type) = AttachmentContentType::from_mime(&file.content_type) else {
        return Err(ContactValidationError::UnsupportedAttachmentType {
            filename: file.filename,
        });
    };

    Ok(ContactAttachment {
        filename: file.filename,
        content_type,
        content: file.content,
    })
}
