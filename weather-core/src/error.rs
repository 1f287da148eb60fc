//! Failure side of a weather fetch.

use thiserror::Error;

/// Message shown to the user for any failed fetch.
pub const GENERIC_FAILURE_MESSAGE: &str =
    "Unable to get weather data at the moment. Please try again later.";

/// Why a fetch produced no weather data.
///
/// Carries only what a caller needs to show a message; there is no retry
/// metadata because nothing retries.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// The provider answered with `{cod, message}`.
    #[error("Weather API failure {code}: {message}")]
    Api { code: String, message: String },

    /// Request parameters could not be turned into a URL; nothing was sent.
    #[error("Could not build request URL: {0}")]
    UrlEncoding(String),

    #[error("Transport error: {0}")]
    Transport(String),

    /// The body was not a JSON object.
    #[error("Invalid response from weather API: {0}")]
    InvalidResponse(String),
}

impl FetchError {
    pub fn api(code: impl Into<String>, message: impl Into<String>) -> Self {
        FetchError::Api {
            code: code.into(),
            message: message.into(),
        }
    }

    /// Classification tag of the failure.
    pub fn kind(&self) -> &'static str {
        match self {
            FetchError::Api { .. } => "APIFailure",
            FetchError::UrlEncoding(_) => "URLEncodingError",
            FetchError::Transport(_) => "TransportError",
            FetchError::InvalidResponse(_) => "InvalidResponse",
        }
    }

    /// Text for the end user. Identical for every kind.
    pub fn user_message(&self) -> &'static str {
        GENERIC_FAILURE_MESSAGE
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        // The URL carries the API key.
        let err = err.without_url();

        if err.is_builder() {
            FetchError::UrlEncoding(err.to_string())
        } else {
            FetchError::Transport(err.to_string())
        }
    }
}
