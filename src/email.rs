//! Packaging of a rendered CV for an external mail relay. Sending the message is left to the relay,
//! this module only validates the recipient and builds the JSON payload it expects.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde::{Deserialize, Serialize};

use crate::error::{ContextError, ErrorKind};
use crate::export::Exporter;
use crate::options::RenderOptions;

pub const DEFAULT_SUBJECT: &str = "CV - Junior Donfack Assobjio";
pub const DEFAULT_MESSAGE: &str = "Please find attached my CV for your review.";
pub const PDF_CONTENT_TYPE: &str = "application/pdf";

/// A rendered document encoded in base64.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CvAttachment {
    pub filename: String,
    pub content_type: String,
    pub content_base64: String,
}

impl CvAttachment {
    pub fn from_pdf_bytes(filename: String, pdf_bytes: &[u8]) -> Self {
        CvAttachment {
            filename,
            content_type: PDF_CONTENT_TYPE.into(),
            content_base64: BASE64.encode(pdf_bytes),
        }
    }

    pub fn decode(&self) -> Result<Vec<u8>, ContextError> {
        BASE64.decode(&self.content_base64).map_err(|error| {
            ContextError::with_error(
                ErrorKind::Validation,
                format!("The attachment {:?} is not valid base64", self.filename),
                &error,
            )
        })
    }
}

/// What the caller asks for: only the recipient address is required.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailRequest {
    pub recipient_email: String,
    #[serde(default)]
    pub recipient_name: Option<String>,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// The payload handed to the mail relay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CvEmail {
    pub to_email: String,
    pub to_name: String,
    pub from_name: String,
    pub reply_to: String,
    pub subject: String,
    pub message: String,
    pub attachment: CvAttachment,
}

/// Accepts the addresses shaped as `local@domain.tld`, without whitespace and with a single `@`.
pub fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    // At least one character on both sides of a dot of the domain
    domain
        .char_indices()
        .any(|(index, character)| character == '.' && index > 0 && index + 1 < domain.len())
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

impl CvEmail {
    /// Validates the recipient, renders the document with the given options and builds the payload,
    /// filling in the default subject and message when they are missing.
    pub fn prepare(
        exporter: &Exporter<'_>,
        request: &EmailRequest,
        options: &RenderOptions,
    ) -> Result<CvEmail, ContextError> {
        let to_email = request.recipient_email.trim();
        if !is_valid_email(to_email) {
            return Err(ContextError::validation(format!(
                "Please provide a valid email address instead of {:?}",
                request.recipient_email
            )));
        }

        let attachment = exporter.email_attachment(options)?;
        let personal_info = &exporter
            .catalog()
            .data
            .content(options.language)?
            .personal_info;
        log::debug!(
            "Prepared the attachment {:?} for {}",
            attachment.filename,
            to_email
        );

        Ok(CvEmail {
            to_email: to_email.to_string(),
            to_name: non_blank(&request.recipient_name)
                .unwrap_or_default()
                .to_string(),
            from_name: personal_info.name.clone(),
            reply_to: personal_info.email.clone(),
            subject: non_blank(&request.subject)
                .unwrap_or(DEFAULT_SUBJECT)
                .to_string(),
            message: non_blank(&request.message)
                .unwrap_or(DEFAULT_MESSAGE)
                .to_string(),
            attachment,
        })
    }

    pub fn to_json(&self) -> Result<String, ContextError> {
        serde_json::to_string_pretty(self).map_err(|error| {
            ContextError::with_error(
                ErrorKind::Generation,
                "Failed to serialize the e-mail payload",
                &error,
            )
        })
    }
}
