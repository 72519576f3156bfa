use std::fmt;

use anyhow::{Context, Result};
use reqwest::Client;
use serde_json::{Value, json};

use crate::types::{LLMClient, LLMMessage, LLMMessageType};

use super::models::{GeminiErrorEnvelope, GeminiResponse};

/// Non-success answer from the Gemini API.
///
/// The message keeps the HTTP status line and the provider's own error text
/// so callers can still match on either.
#[derive(Debug, Clone)]
pub struct GeminiApiError {
    pub status: u16,
    pub message: String,
}

impl GeminiApiError {
    pub fn from_body(status: u16, body: &str) -> Self {
        let message = serde_json::from_str::<GeminiErrorEnvelope>(body)
            .ok()
            .and_then(|envelope| {
                let error = envelope.error;
                match (error.status, error.message) {
                    (Some(status), Some(message)) => Some(format!("{status}: {message}")),
                    (None, Some(message)) => Some(message),
                    _ => None,
                }
            })
            .unwrap_or_else(|| body.trim().to_string());

        Self { status, message }
    }
}

impl fmt::Display for GeminiApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = reqwest::StatusCode::from_u16(self.status)
            .ok()
            .and_then(|status| status.canonical_reason())
            .unwrap_or("");
        write!(
            f,
            "[{} {}] {}",
            self.status, reason, self.message
        )
    }
}

impl std::error::Error for GeminiApiError {}

pub fn convert_body_parts_gemini(body_part: Vec<LLMMessageType>) -> Vec<Value> {
    body_part
        .into_iter()
        .map(|part| {
            let mime = part.resolved_mime_type();
            match part {
                LLMMessageType::TEXT(text) => json!({ "text": text }),
                LLMMessageType::IMAGE { data_b64, .. } => json!({
                    "inlineData": {
                        "mimeType": mime,
                        "data": data_b64
                    }
                }),
            }
        })
        .collect()
}
pub fn convert_messages_to_gemini_contents(messages: Vec<LLMMessage>) -> Vec<Value> {
    messages
        .into_iter()
        .map(|m| {
            let parts = convert_body_parts_gemini(m.content);
            json!({
                "role": "user",
                "parts": parts
            })
        })
        .collect()
}

pub fn build_generate_url(api_client: &LLMClient) -> String {
    let endpoint = api_client.endpoint().trim_end_matches('/');
    format!(
        "{}/{}:generateContent",
        endpoint,
        api_client.default_model()
    )
}

pub async fn send_generate_request(
    api_client: &LLMClient,
    body_part: Vec<LLMMessage>,
) -> Result<GeminiResponse> {
    let url = build_generate_url(api_client);

    let body = json!({
        "contents": convert_messages_to_gemini_contents(body_part)
    });

    let client = Client::new();
    let response = client
        .post(url)
        .header("x-goog-api-key", api_client.api_key())
        .header("Content-Type", "application/json")
        .json(&body)
        .send()
        .await
        .context("HTTP request failed")?;

    let status = response.status();
    let response_text = response
        .text()
        .await
        .context("Reading response body failed")?;

    if !status.is_success() {
        return Err(GeminiApiError::from_body(status.as_u16(), &response_text).into());
    }

    let response: GeminiResponse = serde_json::from_str(&response_text).with_context(|| {
        format!(
            "Failed to decode Gemini response JSON. Raw response: {}",
            response_text
        )
    })?;

    Ok(response)
}

/// Concatenated text of the first candidate.
pub fn response_to_text_data(response: &GeminiResponse) -> Result<String> {
    if let Some(candidate) = response.candidates.first() {
        let mut full_text = String::new();
        for part in &candidate.content.parts {
            if let Some(text) = &part.text {
                full_text.push_str(text);
            }
        }
        Ok(full_text)
    } else {
        Err(anyhow::anyhow!("No candidates found"))
    }
}
