pub mod providers;
pub mod types;
pub mod utils;

pub use providers::gemini::{GeminiApiError, GenerateFn, GenerateFuture};
pub use types::{LLMClient, LLMMessage, LLMMessageType};
