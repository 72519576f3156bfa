use std::sync::LazyLock;

use llmapi::LLMMessageType;
use regex::Regex;

use crate::constants::DEFAULT_IMAGE_MIME;
use crate::error::{GenerateError, GenerateResult};
use crate::models::{GenerateImageBody, GenerationMode, InlineImagePayload};

static CAPTION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i:CAPTION):\s*(.*?)\s*(?:\n|DESCRIPTION:|$)").expect("valid regex")
});
static DESCRIPTION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)DESCRIPTION:\s*(.*)").expect("valid regex"));

const SOCIAL_POST_BODY: &str = "Design a visually appealing social media post with text overlay, modern typography, attractive colors, and engaging visual elements. Make it suitable for Instagram, LinkedIn, or Facebook posting. Include the brand/person name and relevant visual elements that match the post description.";
const LOGO_PLACEMENT: &str = "Place the provided logo image in the bottom right corner of the design, keeping its shape and colors intact.";

/// An image payload that passed validation: non-blank data, resolved mime.
#[derive(Debug, Clone, PartialEq)]
pub struct InlineImage {
    pub data: String,
    pub mime_type: String,
}

impl InlineImage {
    fn from_payload(payload: Option<InlineImagePayload>) -> Option<Self> {
        let payload = payload?;
        let data = payload.data.trim();
        if data.is_empty() {
            return None;
        }

        let mime_type = payload
            .mime_type
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .unwrap_or(DEFAULT_IMAGE_MIME);

        Some(Self {
            data: data.to_string(),
            mime_type: mime_type.to_string(),
        })
    }
}

/// A request reduced to exactly the inputs its mode needs.
#[derive(Debug, Clone, PartialEq)]
pub enum GenerationPlan {
    TextToImage {
        prompt: String,
    },
    ImageEditing {
        prompt: String,
        image: InlineImage,
    },
    ReferenceGeneration {
        prompt: Option<String>,
        user_name: Option<String>,
        reference: InlineImage,
    },
    SocialMediaPost {
        user_name: String,
        post_description: String,
    },
    SocialMediaPostWithLogo {
        user_name: String,
        post_description: String,
        logo: InlineImage,
    },
}

#[derive(Debug, Clone)]
pub struct ValidatedRequest {
    pub api_key: String,
    pub plan: GenerationPlan,
    pub brand_colors: Vec<String>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Explicit mode, else `image-editing` when an input image came along,
/// else `text-to-image`.
pub fn resolve_mode(body: &GenerateImageBody) -> GenerateResult<GenerationMode> {
    match body.mode.as_deref().map(str::trim).filter(|mode| !mode.is_empty()) {
        Some(mode) => GenerationMode::parse(mode)
            .ok_or_else(|| GenerateError::UnsupportedMode(mode.to_string())),
        None if body.input_image.is_some() => Ok(GenerationMode::ImageEditing),
        None => Ok(GenerationMode::TextToImage),
    }
}

/// Checks a raw body in a fixed order and returns the first failure:
/// credential, prompt, social fields, logo, input image.
pub fn validate_request(
    body: GenerateImageBody,
    fallback_api_key: Option<&str>,
) -> GenerateResult<ValidatedRequest> {
    let api_key = non_blank(body.api_key.clone())
        .or_else(|| non_blank(fallback_api_key.map(str::to_string)))
        .ok_or(GenerateError::MissingCredential)?;

    let mode = resolve_mode(&body)?;

    let GenerateImageBody {
        prompt,
        input_image,
        logo_image,
        user_name,
        post_description,
        brand_colors,
        ..
    } = body;

    let prompt = non_blank(prompt);
    if mode.requires_prompt() && prompt.is_none() {
        return Err(GenerateError::MissingPrompt);
    }

    let user_name = non_blank(user_name);
    let post_description = non_blank(post_description);
    let social_fields = if mode.is_social() {
        match (user_name.clone(), post_description) {
            (Some(name), Some(description)) => Some((name, description)),
            _ => return Err(GenerateError::MissingFields),
        }
    } else {
        None
    };

    let logo = InlineImage::from_payload(logo_image);
    let input_image = InlineImage::from_payload(input_image);

    let plan = match (mode, prompt, social_fields) {
        (GenerationMode::TextToImage, Some(prompt), _) => GenerationPlan::TextToImage { prompt },
        (GenerationMode::ImageEditing, Some(prompt), _) => GenerationPlan::ImageEditing {
            prompt,
            image: input_image.ok_or(GenerateError::MissingImage(mode))?,
        },
        (GenerationMode::ReferenceGeneration, prompt, _) => GenerationPlan::ReferenceGeneration {
            prompt,
            user_name,
            reference: input_image.ok_or(GenerateError::MissingImage(mode))?,
        },
        (GenerationMode::SocialMediaPost, _, Some((user_name, post_description))) => {
            GenerationPlan::SocialMediaPost {
                user_name,
                post_description,
            }
        }
        (GenerationMode::SocialMediaPostWithLogo, _, Some((user_name, post_description))) => {
            GenerationPlan::SocialMediaPostWithLogo {
                user_name,
                post_description,
                logo: logo.ok_or(GenerateError::MissingLogo)?,
            }
        }
        (GenerationMode::TextToImage | GenerationMode::ImageEditing, None, _) => {
            return Err(GenerateError::MissingPrompt);
        }
        (GenerationMode::SocialMediaPost | GenerationMode::SocialMediaPostWithLogo, _, None) => {
            return Err(GenerateError::MissingFields);
        }
    };

    let brand_colors = brand_colors
        .unwrap_or_default()
        .into_iter()
        .filter_map(|color| non_blank(Some(color)))
        .collect();

    Ok(ValidatedRequest {
        api_key,
        plan,
        brand_colors,
    })
}

impl GenerationPlan {
    pub fn mode(&self) -> GenerationMode {
        match self {
            GenerationPlan::TextToImage { .. } => GenerationMode::TextToImage,
            GenerationPlan::ImageEditing { .. } => GenerationMode::ImageEditing,
            GenerationPlan::ReferenceGeneration { .. } => GenerationMode::ReferenceGeneration,
            GenerationPlan::SocialMediaPost { .. } => GenerationMode::SocialMediaPost,
            GenerationPlan::SocialMediaPostWithLogo { .. } => {
                GenerationMode::SocialMediaPostWithLogo
            }
        }
    }

    /// The single image sent along with the prompt, if any.
    pub fn attachment(&self) -> Option<&InlineImage> {
        match self {
            GenerationPlan::ImageEditing { image, .. } => Some(image),
            GenerationPlan::ReferenceGeneration { reference, .. } => Some(reference),
            GenerationPlan::SocialMediaPostWithLogo { logo, .. } => Some(logo),
            GenerationPlan::TextToImage { .. } | GenerationPlan::SocialMediaPost { .. } => None,
        }
    }

    pub fn has_logo(&self) -> bool {
        matches!(self, GenerationPlan::SocialMediaPostWithLogo { .. })
    }

    pub fn user_name(&self) -> Option<&str> {
        match self {
            GenerationPlan::ReferenceGeneration { user_name, .. } => user_name.as_deref(),
            GenerationPlan::SocialMediaPost { user_name, .. }
            | GenerationPlan::SocialMediaPostWithLogo { user_name, .. } => Some(user_name),
            _ => None,
        }
    }

    pub fn post_description(&self) -> Option<&str> {
        match self {
            GenerationPlan::SocialMediaPost {
                post_description, ..
            }
            | GenerationPlan::SocialMediaPostWithLogo {
                post_description, ..
            } => Some(post_description),
            _ => None,
        }
    }

    /// Name and topic for the caption call; only social posts have both.
    pub fn social_fields(&self) -> Option<(&str, &str)> {
        self.user_name().zip(self.post_description())
    }

    pub fn prompt_text(&self, brand_colors: &[String]) -> String {
        let mut prompt = match self {
            GenerationPlan::TextToImage { prompt } | GenerationPlan::ImageEditing { prompt, .. } => {
                prompt.clone()
            }
            GenerationPlan::ReferenceGeneration {
                prompt: Some(prompt),
                ..
            } => prompt.clone(),
            GenerationPlan::ReferenceGeneration {
                prompt: None,
                user_name,
                ..
            } => {
                let name = user_name.as_deref().unwrap_or("this brand");
                format!(
                    "Create an image for {name}, use the provided reference image as a style and composition guide. Make it personalized for {name} while maintaining the aesthetic and visual elements of the reference image."
                )
            }
            GenerationPlan::SocialMediaPost {
                user_name,
                post_description,
            } => social_post_prompt(user_name, post_description),
            GenerationPlan::SocialMediaPostWithLogo {
                user_name,
                post_description,
                ..
            } => format!(
                "{} {LOGO_PLACEMENT}",
                social_post_prompt(user_name, post_description)
            ),
        };

        if !brand_colors.is_empty() {
            prompt.push_str(&format!(
                " Use the brand colors {} as the primary color palette.",
                brand_colors.join(", ")
            ));
        }

        prompt
    }

    /// Prompt text first, then at most one inline image.
    pub fn content(&self, prompt: &str) -> Vec<LLMMessageType> {
        let mut content = vec![LLMMessageType::text(prompt)];
        if let Some(image) = self.attachment() {
            content.push(LLMMessageType::image_b64(
                image.data.clone(),
                image.mime_type.clone(),
            ));
        }
        content
    }
}

fn social_post_prompt(user_name: &str, post_description: &str) -> String {
    format!(
        "Create a professional social media post image for \"{user_name}\". Topic: {post_description}. {SOCIAL_POST_BODY}"
    )
}

/// Caption and description shown next to a social post.
#[derive(Debug, Clone, PartialEq)]
pub struct PostCopy {
    pub caption: String,
    pub description: String,
}

pub fn caption_prompt(user_name: &str, post_description: &str) -> String {
    format!(
        "Write copy for a social media post by \"{user_name}\" about: {post_description}.\n\
         Reply in exactly this format and nothing else:\n\
         CAPTION: <one engaging caption with a few relevant hashtags>\n\
         DESCRIPTION: <two or three sentences describing the post>"
    )
}

fn clean_field(value: &str) -> Option<String> {
    let value = value.trim().trim_matches('*').trim();
    (!value.is_empty()).then(|| value.to_string())
}

/// Pulls the labelled fields out of a model answer. The caption ends at a
/// newline or the description label; the description runs to the end.
/// Only the caption label is case-insensitive, so a lowercase
/// "description:" inside the caption stays part of it.
pub fn parse_post_copy(text: &str) -> (Option<String>, Option<String>) {
    let caption = CAPTION_RE
        .captures(text)
        .and_then(|captures| captures.get(1))
        .and_then(|value| clean_field(value.as_str()));
    let description = DESCRIPTION_RE
        .captures(text)
        .and_then(|captures| captures.get(1))
        .and_then(|value| clean_field(value.as_str()));
    (caption, description)
}

pub fn fallback_post_copy(user_name: &str, post_description: &str) -> PostCopy {
    PostCopy {
        caption: format!("{post_description} | {user_name}"),
        description: format!("A social media post from {user_name} about {post_description}."),
    }
}

/// Parsed copy, with any missing field filled from the fallback.
pub fn post_copy_from_text(text: &str, user_name: &str, post_description: &str) -> PostCopy {
    let (caption, description) = parse_post_copy(text);
    let fallback = fallback_post_copy(user_name, post_description);
    PostCopy {
        caption: caption.unwrap_or(fallback.caption),
        description: description.unwrap_or(fallback.description),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body(mode: Option<&str>) -> GenerateImageBody {
        GenerateImageBody {
            mode: mode.map(str::to_string),
            api_key: Some("key".into()),
            ..GenerateImageBody::default()
        }
    }

    fn png(data: &str) -> Option<InlineImagePayload> {
        Some(InlineImagePayload::new(data, "image/png"))
    }

    #[test]
    fn parses_labelled_caption_and_description() {
        let (caption, description) = parse_post_copy("CAPTION: Hello\nDESCRIPTION: World");
        assert_eq!(caption.as_deref(), Some("Hello"));
        assert_eq!(description.as_deref(), Some("World"));
    }

    #[test]
    fn caption_stops_at_description_label_on_same_line() {
        let (caption, description) =
            parse_post_copy("caption: Fresh tiffins daily! DESCRIPTION: Lunch,\ndelivered hot.");
        assert_eq!(caption.as_deref(), Some("Fresh tiffins daily!"));
        assert_eq!(description.as_deref(), Some("Lunch,\ndelivered hot."));
    }

    #[test]
    fn lowercase_description_word_stays_in_caption() {
        let (caption, description) =
            parse_post_copy("CAPTION: Read the full description: below\nDESCRIPTION: World");
        assert_eq!(caption.as_deref(), Some("Read the full description: below"));
        assert_eq!(description.as_deref(), Some("World"));
    }

    #[test]
    fn tolerates_markdown_emphasis() {
        let (caption, description) =
            parse_post_copy("**CAPTION:** New year, new menu\n**DESCRIPTION:** Try it today");
        assert_eq!(caption.as_deref(), Some("New year, new menu"));
        assert_eq!(description.as_deref(), Some("Try it today"));
    }

    #[test]
    fn missing_fields_fall_back_to_templates() {
        let copy = post_copy_from_text("Sorry, I can't help with that.", "Cantiffin", "lunch deals");
        assert_eq!(copy, fallback_post_copy("Cantiffin", "lunch deals"));

        let partial = post_copy_from_text("CAPTION: Hungry?", "Cantiffin", "lunch deals");
        assert_eq!(partial.caption, "Hungry?");
        assert_eq!(
            partial.description,
            "A social media post from Cantiffin about lunch deals."
        );
    }

    #[test]
    fn credential_is_checked_first() {
        let request = GenerateImageBody {
            mode: Some("image-editing".into()),
            ..GenerateImageBody::default()
        };
        assert!(matches!(
            validate_request(request, None),
            Err(GenerateError::MissingCredential)
        ));
    }

    #[test]
    fn configured_key_is_used_when_caller_sends_none() {
        let request = GenerateImageBody {
            prompt: Some("a red cat".into()),
            api_key: Some("  ".into()),
            ..GenerateImageBody::default()
        };
        let validated = validate_request(request, Some("server-key")).unwrap();
        assert_eq!(validated.api_key, "server-key");
        assert_eq!(validated.plan.mode(), GenerationMode::TextToImage);
    }

    #[test]
    fn missing_prompt_precedes_missing_image() {
        assert!(matches!(
            validate_request(body(Some("image-editing")), None),
            Err(GenerateError::MissingPrompt)
        ));

        let mut request = body(Some("image-editing"));
        request.prompt = Some("make it blue".into());
        assert!(matches!(
            validate_request(request, None),
            Err(GenerateError::MissingImage(GenerationMode::ImageEditing))
        ));
    }

    #[test]
    fn social_fields_precede_logo() {
        let mut request = body(Some("social-media-post-with-logo"));
        request.user_name = Some("Cantiffin".into());
        assert!(matches!(
            validate_request(request.clone(), None),
            Err(GenerateError::MissingFields)
        ));

        request.post_description = Some("Lunch deals".into());
        assert!(matches!(
            validate_request(request, None),
            Err(GenerateError::MissingLogo)
        ));
    }

    #[test]
    fn unknown_mode_is_rejected() {
        assert!(matches!(
            validate_request(body(Some("poster")), None),
            Err(GenerateError::UnsupportedMode(mode)) if mode == "poster"
        ));
    }

    #[test]
    fn input_image_without_mode_means_editing() {
        let mut request = body(None);
        request.prompt = Some("make it blue".into());
        request.input_image = png("AAAA");
        let validated = validate_request(request, None).unwrap();
        assert_eq!(validated.plan.mode(), GenerationMode::ImageEditing);
    }

    #[test]
    fn blank_image_data_counts_as_missing() {
        let mut request = body(Some("reference-generation"));
        request.input_image = png("   ");
        assert!(matches!(
            validate_request(request, None),
            Err(GenerateError::MissingImage(GenerationMode::ReferenceGeneration))
        ));
    }

    #[test]
    fn logo_post_attaches_only_the_logo() {
        let mut request = body(Some("social-media-post-with-logo"));
        request.user_name = Some("Cantiffin".into());
        request.post_description = Some("Lunch deals".into());
        request.logo_image = png("LOGO");
        request.input_image = png("IGNORED");
        request.brand_colors = Some(vec!["#FF6B6B".into(), " ".into(), "#2C3E50".into()]);

        let validated = validate_request(request, None).unwrap();
        let prompt = validated.plan.prompt_text(&validated.brand_colors);
        assert!(prompt.starts_with("Create a professional social media post image for \"Cantiffin\". Topic: Lunch deals."));
        assert!(prompt.contains("bottom right corner"));
        assert!(prompt.ends_with("Use the brand colors #FF6B6B, #2C3E50 as the primary color palette."));

        let content = validated.plan.content(&prompt);
        assert_eq!(content.len(), 2);
        assert_eq!(content[1], LLMMessageType::image_b64("LOGO", "image/png"));
        assert!(validated.plan.has_logo());
    }

    #[test]
    fn plain_post_sends_text_only() {
        let mut request = body(Some("social-media-post"));
        request.user_name = Some("Cantiffin".into());
        request.post_description = Some("Lunch deals".into());
        let validated = validate_request(request, None).unwrap();
        let prompt = validated.plan.prompt_text(&[]);
        assert_eq!(validated.plan.content(&prompt), vec![LLMMessageType::text(prompt)]);
        assert_eq!(
            validated.plan.social_fields(),
            Some(("Cantiffin", "Lunch deals"))
        );
    }

    #[test]
    fn reference_prompt_is_personalised_when_absent() {
        let mut request = body(Some("reference-generation"));
        request.user_name = Some("Cantiffin".into());
        request.input_image = Some(InlineImagePayload {
            data: "REF".into(),
            mime_type: None,
        });
        let validated = validate_request(request, None).unwrap();
        let prompt = validated.plan.prompt_text(&[]);
        assert!(prompt.starts_with("Create an image for Cantiffin, use the provided reference image"));
        assert_eq!(
            validated.plan.attachment().map(|image| image.mime_type.as_str()),
            Some(DEFAULT_IMAGE_MIME)
        );
        assert!(validated.plan.social_fields().is_none());
    }
}
