//! Failure taxonomy for calls to the item service.

use serde_json::Value;
use thiserror::Error;

pub const COMMUNICATION_ERROR_TEXT: &str = "Communication error with the API.";

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GatewayError {
    /// No response reached the client (connect failure, timeout, aborted body).
    #[error("transport failure: {0}")]
    Transport(String),
    /// Error response whose body carries a human-readable `message`.
    #[error("http {status}: {message}")]
    Api { status: u16, message: String },
    /// Error response with a body but no usable `message` field.
    #[error("http {status}: {body}")]
    Unstructured { status: u16, body: String },
    #[error("http {status} with empty body")]
    EmptyBody { status: u16 },
    /// Successful status whose body could not be decoded.
    #[error("failed to decode response: {0}")]
    Decode(String),
}

impl GatewayError {
    /// Classifies a non-success response from its status and raw body text.
    pub fn from_response_body(status: u16, body: &str) -> Self {
        let trimmed = body.trim();
        if trimmed.is_empty() {
            return Self::EmptyBody { status };
        }

        let Ok(value) = serde_json::from_str::<Value>(trimmed) else {
            return Self::Unstructured {
                status,
                body: trimmed.to_string(),
            };
        };

        match value
            .get("message")
            .and_then(Value::as_str)
            .filter(|message| !message.is_empty())
        {
            Some(message) => Self::Api {
                status,
                message: message.to_string(),
            },
            None => Self::Unstructured {
                status,
                body: value.to_string(),
            },
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. }
            | Self::Unstructured { status, .. }
            | Self::EmptyBody { status } => Some(*status),
            Self::Transport(_) | Self::Decode(_) => None,
        }
    }

    /// Text shown to the user for this failure.
    pub fn user_message(&self) -> String {
        match self {
            Self::Api { message, .. } => message.clone(),
            Self::Unstructured { body, .. } => body.clone(),
            Self::Transport(_) | Self::EmptyBody { .. } | Self::Decode(_) => {
                COMMUNICATION_ERROR_TEXT.to_string()
            }
        }
    }
}

impl From<reqwest::Error> for GatewayError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::Transport(err.to_string())
        }
    }
}
