pub const DEFAULT_IMAGE_MODEL: &str = "gemini-2.5-flash-image-preview";
pub const DEFAULT_TEXT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_GEMINI_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta/models";
pub const DEFAULT_IMAGE_MIME: &str = "image/png";
pub const DEFAULT_MAX_BODY_BYTES: usize = 25 * 1024 * 1024;
pub const GENERATE_ROUTE: &str = "/api/generate";
pub const SERVICE_NAME: &str = "Post Factory AI Image Generation API - Gemini Native";
pub const PROFILE_STORAGE_KEY: &str = "postMachineProfile";
pub const IMAGES_STORAGE_KEY: &str = "postMachineImages";
pub const API_KEY_ENV: &str = "GOOGLE_AI_API_KEY";
