use std::fmt;
use std::io;

use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::Error as JsonError;

use crate::sse::DecodeError;

#[derive(Debug)]
pub enum GeminiApiError {
    MissingApiKey,
    InvalidHeader(String),
    /// Connection, TLS or DNS failure; no HTTP status is available.
    Transport(reqwest::Error),
    /// Non-success HTTP status with the extracted error message.
    Status {
        status: StatusCode,
        message: String,
    },
    /// Buffer growth failed while decoding the response.
    Resource(String),
    /// Gzip compression of the request body failed.
    Encode(io::Error),
    Serde(JsonError),
    MalformedResponse(String),
}

impl GeminiApiError {
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }

    pub fn is_protocol(&self) -> bool {
        matches!(self, Self::Status { .. } | Self::MalformedResponse(_))
    }

    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Transport(error) => error.status(),
            _ => None,
        }
    }
}

impl fmt::Display for GeminiApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingApiKey => write!(f, "API key is required"),
            Self::InvalidHeader(message) => write!(f, "invalid header: {message}"),
            Self::Transport(error) => write!(f, "request failed: {error}"),
            Self::Status { status, message } => write!(f, "HTTP {} {message}", status.as_u16()),
            Self::Resource(message) => write!(f, "out of memory: {message}"),
            Self::Encode(error) => write!(f, "failed to compress request body: {error}"),
            Self::Serde(error) => write!(f, "serialization error: {error}"),
            Self::MalformedResponse(message) => write!(f, "malformed response: {message}"),
        }
    }
}

impl std::error::Error for GeminiApiError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Transport(error) => Some(error),
            Self::Encode(error) => Some(error),
            Self::Serde(error) => Some(error),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for GeminiApiError {
    fn from(error: reqwest::Error) -> Self {
        Self::Transport(error)
    }
}

impl From<JsonError> for GeminiApiError {
    fn from(error: JsonError) -> Self {
        Self::Serde(error)
    }
}

impl From<DecodeError> for GeminiApiError {
    fn from(error: DecodeError) -> Self {
        Self::Resource(error.to_string())
    }
}

#[derive(Debug, Deserialize)]
struct ErrorPayload {
    error: Option<ErrorPayloadFields>,
}

#[derive(Debug, Deserialize)]
struct ErrorPayloadFields {
    message: Option<String>,
}

/// Extract a human-readable message from an error response body.
///
/// Prefers `error.message` from the first JSON object in the body, then the raw
/// body, then the status reason phrase.
pub fn parse_error_message(status: StatusCode, body: &str) -> String {
    if let Some(message) = extract_error_message(body) {
        return message;
    }

    let trimmed = body.trim();
    if trimmed.is_empty() {
        status
            .canonical_reason()
            .unwrap_or("request failed")
            .to_string()
    } else {
        trimmed.to_string()
    }
}

fn extract_error_message(body: &str) -> Option<String> {
    let start = body.find('{')?;
    let payload = serde_json::Deserializer::from_str(&body[start..])
        .into_iter::<ErrorPayload>()
        .next()?
        .ok()?;
    payload
        .error?
        .message
        .filter(|message| !message.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_is_found_after_leading_noise() {
        let body = "junk before {\"error\":{\"code\":400,\"message\":\"bad key\"}}";
        assert_eq!(parse_error_message(StatusCode::BAD_REQUEST, body), "bad key");
    }

    #[test]
    fn classification_is_disjoint() {
        let status = GeminiApiError::Status {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: "boom".to_string(),
        };
        assert!(status.is_protocol());
        assert!(!status.is_transport());
        assert!(!GeminiApiError::MissingApiKey.is_protocol());
    }
}
