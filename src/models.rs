use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GenerationMode {
    TextToImage,
    ImageEditing,
    ReferenceGeneration,
    SocialMediaPost,
    SocialMediaPostWithLogo,
}

impl GenerationMode {
    pub const ALL: [GenerationMode; 5] = [
        GenerationMode::TextToImage,
        GenerationMode::ImageEditing,
        GenerationMode::ReferenceGeneration,
        GenerationMode::SocialMediaPost,
        GenerationMode::SocialMediaPostWithLogo,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            GenerationMode::TextToImage => "text-to-image",
            GenerationMode::ImageEditing => "image-editing",
            GenerationMode::ReferenceGeneration => "reference-generation",
            GenerationMode::SocialMediaPost => "social-media-post",
            GenerationMode::SocialMediaPostWithLogo => "social-media-post-with-logo",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        Self::ALL.into_iter().find(|mode| mode.as_str() == value)
    }

    pub fn requires_prompt(self) -> bool {
        matches!(
            self,
            GenerationMode::TextToImage | GenerationMode::ImageEditing
        )
    }

    pub fn is_social(self) -> bool {
        matches!(
            self,
            GenerationMode::SocialMediaPost | GenerationMode::SocialMediaPostWithLogo
        )
    }
}

impl fmt::Display for GenerationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Base64 image sent inline with a request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineImagePayload {
    pub data: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
}

impl InlineImagePayload {
    pub fn new(data: impl Into<String>, mime_type: impl Into<String>) -> Self {
        Self {
            data: data.into(),
            mime_type: Some(mime_type.into()),
        }
    }
}

/// JSON body accepted by `POST /api/generate`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateImageBody {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_image: Option<InlineImagePayload>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo_image: Option<InlineImagePayload>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post_description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand_colors: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedImage {
    pub id: u32,
    pub image_url: String,
    pub image_bytes: String,
    pub mime_type: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationMetadata {
    pub model: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_model: Option<String>,
    pub number_of_images: usize,
    pub mode: GenerationMode,
    pub generated_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationResult {
    pub success: bool,
    pub prompt: String,
    pub text_response: String,
    pub images: Vec<GeneratedImage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post_description: Option<String>,
    pub has_logo: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generated_caption: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generated_description: Option<String>,
    pub metadata: GenerationMetadata,
}

/// A generated image kept in the local library, with the request context
/// copied alongside it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedImage {
    pub id: String,
    pub image_url: String,
    pub prompt: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post_description: Option<String>,
    #[serde(default)]
    pub has_logo: bool,
    pub created_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_prompt: Option<String>,
    #[serde(default)]
    pub is_edit: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generated_caption: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generated_description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserProfile {
    pub name: String,
    pub industry: String,
    pub goal: String,
    pub brand_personality: Vec<String>,
    pub visual_style: String,
    pub target_audience: Vec<String>,
    pub post_types: Vec<String>,
    pub business_description: String,
    pub brand_colors: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    pub completed_at: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModeDescription {
    pub mode: GenerationMode,
    pub required_fields: Vec<&'static str>,
    pub optional_fields: Vec<&'static str>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CapabilitiesDocument {
    pub message: &'static str,
    pub status: &'static str,
    pub version: &'static str,
    pub model: String,
    pub text_model: String,
    pub endpoint: String,
    pub modes: Vec<ModeDescription>,
    pub capabilities: Vec<&'static str>,
}
