#[derive(Clone, Debug, PartialEq)]
pub enum LLMMessageType {
    TEXT(String),
    IMAGE {
        data_b64: String,
        mime_type: Option<String>,
    },
}
impl LLMMessageType {
    pub fn text(text: impl Into<String>) -> Self {
        LLMMessageType::TEXT(text.into())
    }
    pub fn image_b64(data_b64: impl Into<String>, mime_type: impl Into<String>) -> Self {
        LLMMessageType::IMAGE {
            data_b64: data_b64.into(),
            mime_type: Some(mime_type.into()),
        }
    }

    /// Mime type sent for an inline image: the declared one, else jpeg.
    pub fn resolved_mime_type(&self) -> Option<String> {
        match self {
            LLMMessageType::TEXT(_) => None,
            LLMMessageType::IMAGE { mime_type, .. } => Some(
                mime_type
                    .as_deref()
                    .map(str::trim)
                    .filter(|value| !value.is_empty())
                    .unwrap_or("image/jpeg")
                    .to_string(),
            ),
        }
    }

    pub fn is_image(&self) -> bool {
        matches!(self, LLMMessageType::IMAGE { .. })
    }
}

/// One user turn. Every request here is a single-turn prompt, so there is
/// no role to carry.
#[derive(Clone, Debug)]
pub struct LLMMessage {
    pub content: Vec<LLMMessageType>,
}

impl LLMMessage {
    pub fn user(content: Vec<LLMMessageType>) -> Self {
        Self { content }
    }

    pub fn image_count(&self) -> usize {
        self.content.iter().filter(|part| part.is_image()).count()
    }
}

#[derive(Clone, Debug)]
pub struct LLMClient {
    pub(crate) api_key: String,
    pub(crate) endpoint: String,
    pub(crate) default_model: String,
}

impl LLMClient {
    pub fn new(
        api_key: impl Into<String>,
        endpoint: impl Into<String>,
        default_model: impl Into<String>,
    ) -> Self {
        let default_model = default_model.into();
        let default_model = default_model
            .strip_prefix("models/")
            .map(str::to_string)
            .unwrap_or(default_model);

        Self {
            api_key: api_key.into(),
            endpoint: endpoint.into(),
            default_model,
        }
    }

    /// Same credentials and endpoint, different model.
    pub fn with_model(&self, model: impl Into<String>) -> Self {
        Self::new(self.api_key.clone(), self.endpoint.clone(), model)
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn default_model(&self) -> &str {
        &self.default_model
    }
}
