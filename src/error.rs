//! Error handling and custom error types
//!
//! Provides unified error handling across the crate using thiserror. The
//! variants mirror how a failure should be treated by callers: configuration
//! and moderation failures are terminal, transport failures are split into
//! retryable and terminal, and cancellation is distinguishable from both.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Content rejected by moderation: {0}")]
    ContentRejected(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Transient provider error: {0}")]
    RetryableTransport(String),

    #[error("Provider rejected request: {0}")]
    TerminalTransport(String),

    #[error("Operation cancelled")]
    Cancelled,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Image processing error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Environment variable error: {0}")]
    EnvVar(#[from] dotenvy::Error),

    #[error("Generic error: {0}")]
    Generic(String),
}

impl Error {
    /// Whether the retry executor may attempt the failed call again.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::RetryableTransport(_))
    }

    /// Message suitable for showing to the end user (toast or inline).
    pub fn user_message(&self) -> String {
        match self {
            Error::Configuration(_) => {
                "Add your Groq API key in settings to use AI features.".to_string()
            }
            Error::ContentRejected(_) => {
                "This content can't be processed because it may be inappropriate.".to_string()
            }
            Error::Validation(_) => {
                "The AI returned an incomplete answer. Please try again.".to_string()
            }
            Error::RetryableTransport(_) => {
                "The AI service is busy or unreachable. Please try again in a moment.".to_string()
            }
            Error::TerminalTransport(_) => {
                "The AI service rejected the request. Check your API key.".to_string()
            }
            Error::Cancelled => "Request cancelled.".to_string(),
            _ => "Something went wrong. Please try again.".to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
