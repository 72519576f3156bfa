mod api;
pub mod models;
pub use api::{
    GeminiApiError, build_generate_url, convert_body_parts_gemini,
    convert_messages_to_gemini_contents, response_to_text_data, send_generate_request,
};

use crate::types::{LLMClient, LLMMessage};
use models::GeminiResponse;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

pub type GenerateFuture = Pin<Box<dyn Future<Output = anyhow::Result<GeminiResponse>> + Send>>;

/// One `generateContent` round trip. Boxed so callers can swap in a stub.
pub type GenerateFn = Arc<dyn Fn(LLMClient, Vec<LLMMessage>) -> GenerateFuture + Send + Sync>;

pub fn generate_fn() -> GenerateFn {
    Arc::new(
        |client: LLMClient, messages: Vec<LLMMessage>| -> GenerateFuture {
            Box::pin(async move { send_generate_request(&client, messages).await })
        },
    )
}
