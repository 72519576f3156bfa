use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use llmapi::GeminiApiError;
use serde_json::json;

use crate::models::GenerationMode;

/// Everything the generate endpoint can answer with instead of a result.
///
/// Validation variants come first, in the order they are checked; the
/// provider variants are produced by [`classify_provider_failure`].
#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    #[error("Invalid request body: {0}")]
    InvalidBody(String),

    #[error("Unsupported mode '{0}'")]
    UnsupportedMode(String),

    #[error("Google AI API key not configured. Add an API key to your profile.")]
    MissingCredential,

    #[error("Prompt is required")]
    MissingPrompt,

    #[error("Name and post description are required for social media posts")]
    MissingFields,

    #[error("A logo image is required for social-media-post-with-logo")]
    MissingLogo,

    #[error("An input image is required for {0}")]
    MissingImage(GenerationMode),

    #[error("API quota exceeded. Please try again later.")]
    Throttled,

    #[error("Prompt violates safety guidelines. Please modify your prompt.")]
    ContentRejected,

    #[error("Invalid API key. Please check your Google AI API key.")]
    Unauthorized,

    #[error("API access denied. Please check your API key permissions.")]
    Forbidden,

    #[error("Image generation failed: {0}")]
    Failed(String),
}

pub type GenerateResult<T> = Result<T, GenerateError>;

impl GenerateError {
    pub fn status(&self) -> StatusCode {
        match self {
            GenerateError::InvalidBody(_)
            | GenerateError::UnsupportedMode(_)
            | GenerateError::MissingCredential
            | GenerateError::MissingPrompt
            | GenerateError::MissingFields
            | GenerateError::MissingLogo
            | GenerateError::MissingImage(_)
            | GenerateError::ContentRejected => StatusCode::BAD_REQUEST,
            GenerateError::Throttled => StatusCode::TOO_MANY_REQUESTS,
            GenerateError::Unauthorized => StatusCode::UNAUTHORIZED,
            GenerateError::Forbidden => StatusCode::FORBIDDEN,
            GenerateError::Failed(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Classifies a failed provider call. The HTTP status is taken from a
    /// [`GeminiApiError`] anywhere in the chain.
    pub fn from_provider(err: &anyhow::Error) -> Self {
        let code = err
            .chain()
            .find_map(|cause| cause.downcast_ref::<GeminiApiError>())
            .map(|api_error| api_error.status);
        classify_provider_failure(&format!("{err:#}"), code)
    }
}

/// Maps an opaque provider failure onto a caller-facing category.
///
/// Checks run in a fixed order and the first match wins, since one message
/// can mention several keywords. Matching is case-sensitive.
pub fn classify_provider_failure(message: &str, code: Option<u16>) -> GenerateError {
    if code == Some(429) || mentions(message, &["quota", "429"]) {
        GenerateError::Throttled
    } else if mentions(message, &["safety", "policy"]) {
        GenerateError::ContentRejected
    } else if code == Some(401) || mentions(message, &["401", "authentication"]) {
        GenerateError::Unauthorized
    } else if code == Some(403) || mentions(message, &["403", "permission"]) {
        GenerateError::Forbidden
    } else {
        GenerateError::Failed(message.to_string())
    }
}

fn mentions(message: &str, needles: &[&str]) -> bool {
    needles.iter().any(|needle| message.contains(needle))
}

impl IntoResponse for GenerateError {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self {
            GenerateError::Failed(message) => {
                tracing::error!(error = %message, "Image generation failed");
            }
            GenerateError::Throttled
            | GenerateError::ContentRejected
            | GenerateError::Unauthorized
            | GenerateError::Forbidden => {
                tracing::warn!(error = %self, status = status.as_u16(), "Provider rejected request");
            }
            _ => {
                tracing::debug!(error = %self, "Rejected invalid generate request");
            }
        }

        let body = json!({ "error": self.to_string() });
        (status, axum::Json(body)).into_response()
    }
}
