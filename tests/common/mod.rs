#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use llmapi::providers::gemini::models::{GeminiResponse, Part};
use llmapi::{GenerateFn, GenerateFuture, LLMClient, LLMMessage};
use tower::ServiceExt;

use post_factory_lib::{build_app_router, AppState, ServerConfig};

pub const TEXT_MODEL: &str = "gemini-2.5-flash";
pub const IMAGE_MODEL: &str = "gemini-2.5-flash-image-preview";

/// Config with no fallback key, so credentials must come from the body
/// unless a test sets one.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        api_key: None,
        image_model: IMAGE_MODEL.to_string(),
        text_model: TEXT_MODEL.to_string(),
        cors_origins: vec!["http://localhost:3000".to_string()],
        ..ServerConfig::default()
    }
}

/// One provider call as the stub saw it.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub api_key: String,
    pub model: String,
    pub image_count: usize,
}

#[derive(Debug, Clone, Default)]
pub struct CallLog {
    calls: Arc<Mutex<Vec<RecordedCall>>>,
}

impl CallLog {
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

/// Provider stub: records every call and answers with `respond`.
pub fn stub_generator<F>(respond: F) -> (GenerateFn, CallLog)
where
    F: Fn(&LLMClient) -> anyhow::Result<GeminiResponse> + Send + Sync + 'static,
{
    let log = CallLog::default();
    let recorder = log.clone();

    let generate: GenerateFn = Arc::new(
        move |client: LLMClient, messages: Vec<LLMMessage>| -> GenerateFuture {
            recorder.calls.lock().unwrap().push(RecordedCall {
                api_key: client.api_key().to_string(),
                model: client.default_model().to_string(),
                image_count: messages.iter().map(LLMMessage::image_count).sum(),
            });
            let result = respond(&client);
            Box::pin(async move { result })
        },
    );

    (generate, log)
}

/// Image model answers with one PNG; text model answers with `caption_text`.
pub fn image_and_caption(caption_text: &'static str) -> (GenerateFn, CallLog) {
    stub_generator(move |client| {
        if client.default_model() == TEXT_MODEL {
            Ok(GeminiResponse::from_parts(vec![Part::text(caption_text)]))
        } else {
            Ok(GeminiResponse::from_parts(vec![
                Part::text("Here is your image."),
                Part::inline("image/png", "iVBORw0KGgo="),
            ]))
        }
    })
}

pub fn build_test_app(config: ServerConfig, generate: GenerateFn) -> Router {
    build_app_router(AppState::with_generator(config, generate))
}

pub async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> (StatusCode, serde_json::Value) {
    post_raw(app, uri, body.to_string()).await
}

pub async fn post_raw(app: Router, uri: &str, body: String) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    (status, body_json(response).await)
}

pub async fn get(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    (status, body_json(response).await)
}
