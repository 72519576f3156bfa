use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use llmapi::providers::gemini::models::{GeminiResponse, Part};
use llmapi::providers::response_to_text_data;
use llmapi::utils::to_data_url;
use llmapi::{LLMClient, LLMMessage, LLMMessageType};

use crate::commands::prompts::{
    caption_prompt, fallback_post_copy, post_copy_from_text, validate_request, PostCopy,
};
use crate::constants::{DEFAULT_IMAGE_MIME, GENERATE_ROUTE, SERVICE_NAME};
use crate::error::{GenerateError, GenerateResult};
use crate::models::{
    CapabilitiesDocument, GenerateImageBody, GeneratedImage, GenerationMetadata, GenerationMode,
    GenerationResult, ModeDescription,
};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route(GENERATE_ROUTE, get(describe_api).post(generate_image))
}

pub async fn generate_image(
    State(state): State<AppState>,
    payload: Result<Json<GenerateImageBody>, JsonRejection>,
) -> GenerateResult<Json<GenerationResult>> {
    let Json(body) = payload.map_err(|rejection| GenerateError::InvalidBody(rejection.body_text()))?;
    run_generation(&state, body).await.map(Json)
}

/// Validates the body, calls the image model once, and for social posts asks
/// the text model for a caption.
pub async fn run_generation(
    state: &AppState,
    body: GenerateImageBody,
) -> GenerateResult<GenerationResult> {
    let request = validate_request(body, state.config.api_key.as_deref())?;
    let plan = &request.plan;
    let mode = plan.mode();

    let prompt = plan.prompt_text(&request.brand_colors);
    let content = plan.content(&prompt);

    let image_client = LLMClient::new(
        request.api_key.clone(),
        state.config.gemini_endpoint.clone(),
        state.config.image_model.clone(),
    );

    let message = LLMMessage::user(content);
    tracing::info!(
        %mode,
        model = image_client.default_model(),
        attached_images = message.image_count(),
        "Starting image generation"
    );

    let response = (state.generate)(image_client.clone(), vec![message])
        .await
        .map_err(|err| GenerateError::from_provider(&err))?;

    let normalized = normalize_response(&response)?;
    tracing::info!(
        %mode,
        images = normalized.images.len(),
        text_len = normalized.text_response.len(),
        "Image generation response received"
    );

    let post_copy = match plan.social_fields() {
        Some((user_name, post_description)) => {
            Some(generate_post_copy(state, &image_client, user_name, post_description).await)
        }
        None => None,
    };

    let (generated_caption, generated_description) = match post_copy {
        Some(PostCopy {
            caption,
            description,
        }) => (Some(caption), Some(description)),
        None => (None, None),
    };

    Ok(GenerationResult {
        success: true,
        prompt,
        text_response: normalized.text_response,
        user_name: plan.user_name().map(str::to_string),
        post_description: plan.post_description().map(str::to_string),
        has_logo: plan.has_logo(),
        generated_caption,
        generated_description,
        metadata: GenerationMetadata {
            model: image_client.default_model().to_string(),
            text_model: mode
                .is_social()
                .then(|| state.config.text_model.clone()),
            number_of_images: normalized.images.len(),
            mode,
            generated_at: chrono::Utc::now()
                .to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
        },
        images: normalized.images,
    })
}

/// Never fails: a broken text call or an unparseable answer yields the
/// templated copy.
async fn generate_post_copy(
    state: &AppState,
    image_client: &LLMClient,
    user_name: &str,
    post_description: &str,
) -> PostCopy {
    let text_client = image_client.with_model(state.config.text_model.clone());
    let message = LLMMessage::user(vec![LLMMessageType::text(caption_prompt(
        user_name,
        post_description,
    ))]);

    let answer = (state.generate)(text_client, vec![message])
        .await
        .and_then(|response| response_to_text_data(&response));

    match answer {
        Ok(text) => post_copy_from_text(&text, user_name, post_description),
        Err(err) => {
            tracing::warn!(error = %format!("{err:#}"), "Caption generation failed, using fallback copy");
            fallback_post_copy(user_name, post_description)
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedResponse {
    pub text_response: String,
    pub images: Vec<GeneratedImage>,
}

/// Normalizes the first candidate; a response without candidates is a
/// provider failure.
pub fn normalize_response(response: &GeminiResponse) -> GenerateResult<NormalizedResponse> {
    response
        .candidates
        .first()
        .map(|candidate| normalize_parts(&candidate.content.parts))
        .ok_or_else(|| GenerateError::Failed("Provider returned no candidates".into()))
}

/// Joins text parts in order and numbers inline images from 1. A part with
/// non-empty text counts as text; a part with neither is skipped.
pub fn normalize_parts(parts: &[Part]) -> NormalizedResponse {
    let mut text_response = String::new();
    let mut images = Vec::new();

    for part in parts {
        if let Some(text) = part.text.as_deref().filter(|text| !text.is_empty()) {
            text_response.push_str(text);
        } else if let Some(inline_data) = &part.inline_data {
            let mime_type = inline_data.mime_type.trim();
            let mime_type = if mime_type.is_empty() {
                DEFAULT_IMAGE_MIME
            } else {
                mime_type
            };

            images.push(GeneratedImage {
                id: images.len() as u32 + 1,
                image_url: to_data_url(mime_type, &inline_data.data),
                image_bytes: inline_data.data.clone(),
                mime_type: mime_type.to_string(),
            });
        }
    }

    NormalizedResponse {
        text_response,
        images,
    }
}

pub async fn describe_api(State(state): State<AppState>) -> Json<CapabilitiesDocument> {
    Json(capabilities(&state))
}

pub fn capabilities(state: &AppState) -> CapabilitiesDocument {
    let modes = GenerationMode::ALL
        .into_iter()
        .map(|mode| {
            let (required_fields, optional_fields) = match mode {
                GenerationMode::TextToImage => (vec!["prompt"], vec!["brandColors", "apiKey"]),
                GenerationMode::ImageEditing => (
                    vec!["prompt", "inputImage"],
                    vec!["brandColors", "apiKey"],
                ),
                GenerationMode::ReferenceGeneration => (
                    vec!["inputImage"],
                    vec!["prompt", "userName", "brandColors", "apiKey"],
                ),
                GenerationMode::SocialMediaPost => (
                    vec!["userName", "postDescription"],
                    vec!["brandColors", "apiKey"],
                ),
                GenerationMode::SocialMediaPostWithLogo => (
                    vec!["userName", "postDescription", "logoImage"],
                    vec!["brandColors", "apiKey"],
                ),
            };
            ModeDescription {
                mode,
                required_fields,
                optional_fields,
            }
        })
        .collect();

    CapabilitiesDocument {
        message: SERVICE_NAME,
        status: "active",
        version: env!("CARGO_PKG_VERSION"),
        model: state.config.image_model.clone(),
        text_model: state.config.text_model.clone(),
        endpoint: format!("POST {GENERATE_ROUTE}"),
        modes,
        capabilities: vec![
            "Text-to-Image generation",
            "Image editing with text prompts",
            "Reference-guided generation",
            "Social media posts with captions",
            "Logo placement on social media posts",
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_parts() -> Vec<Part> {
        vec![Part::text("A"), Part::inline("image/png", "X"), Part::text("B")]
    }

    #[test]
    fn joins_text_and_numbers_images() {
        let normalized = normalize_parts(&sample_parts());
        assert_eq!(normalized.text_response, "AB");
        assert_eq!(normalized.images.len(), 1);
        assert_eq!(normalized.images[0].id, 1);
        assert_eq!(normalized.images[0].image_url, "data:image/png;base64,X");
        assert_eq!(normalized.images[0].image_bytes, "X");
    }

    #[test]
    fn empty_text_does_not_hide_inline_image() {
        let part = Part {
            text: Some(String::new()),
            ..Part::inline("image/png", "X")
        };
        let normalized = normalize_parts(&[part]);
        assert_eq!(normalized.text_response, "");
        assert_eq!(normalized.images.len(), 1);
        assert_eq!(normalized.images[0].image_bytes, "X");
    }

    #[test]
    fn normalizing_twice_gives_the_same_output() {
        let parts = sample_parts();
        assert_eq!(normalize_parts(&parts), normalize_parts(&parts));
    }

    #[test]
    fn blank_mime_defaults_to_png_and_ids_follow_part_order() {
        let parts = vec![
            Part::inline("image/jpeg", "J"),
            Part::default(),
            Part::inline("", "P"),
        ];
        let normalized = normalize_parts(&parts);
        let ids: Vec<u32> = normalized.images.iter().map(|image| image.id).collect();
        assert_eq!(ids, vec![1, 2]);
        assert_eq!(normalized.images[0].mime_type, "image/jpeg");
        assert_eq!(normalized.images[1].image_url, "data:image/png;base64,P");
        assert!(normalized.text_response.is_empty());
    }

    #[test]
    fn part_with_text_and_image_counts_as_text() {
        let part = Part {
            text: Some("caption".into()),
            ..Part::inline("image/png", "X")
        };
        let normalized = normalize_parts(&[part]);
        assert_eq!(normalized.text_response, "caption");
        assert!(normalized.images.is_empty());
    }

    #[test]
    fn response_without_candidates_is_a_failure() {
        let err = normalize_response(&GeminiResponse::default()).unwrap_err();
        assert!(matches!(err, GenerateError::Failed(_)));
    }
}
