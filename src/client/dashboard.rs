use std::path::{Path, PathBuf};

use llmapi::utils::{detect_mime_type, encode_byte_to_base64, split_data_url};

use crate::commands::library::{
    clear_saved_images, delete_saved_image, export_saved_image, list_saved_images,
    save_generation_result,
};
use crate::commands::profile::{load_profile, save_profile};
use crate::models::{
    GenerateImageBody, GeneratedImage, GenerationMode, GenerationResult, InlineImagePayload,
    SavedImage, UserProfile,
};
use crate::store::{LocalStore, StoreError, StoreResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Section {
    #[default]
    NewPost,
    Images,
    Library,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LibraryItem {
    pub id: &'static str,
    pub src: &'static str,
    pub name: &'static str,
    pub description: &'static str,
}

pub const CONTENT_LIBRARY: [LibraryItem; 3] = [
    LibraryItem {
        id: "cantiffin",
        src: "/content/cantiffin.png",
        name: "Cantiffin",
        description: "Food delivery service design",
    },
    LibraryItem {
        id: "mockup",
        src: "/content/mockup.png",
        name: "Mockup Design",
        description: "Product mockup template",
    },
    LibraryItem {
        id: "newyear",
        src: "/content/newyear.jpg",
        name: "New Year",
        description: "New Year celebration design",
    },
];

/// What the request that is currently in flight will do with its result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    Post,
    Edit,
    Remaster,
}

#[derive(Debug, thiserror::Error)]
pub enum DashboardError {
    #[error("Please complete your profile first")]
    NoProfile,

    #[error("Please enter a post description")]
    EmptyDescription,

    #[error("Please enter edit instructions")]
    EmptyEditPrompt,

    #[error("Please add your Google AI API key in your profile settings")]
    MissingApiKey,

    #[error("A request is already in progress")]
    Busy,

    #[error(transparent)]
    Store(#[from] StoreError),
}

pub type DashboardResult<T> = Result<T, DashboardError>;

/// Dashboard screen state over a local store.
#[derive(Debug)]
pub struct Dashboard<S: LocalStore> {
    store: S,
    section: Section,
    profile: Option<UserProfile>,
    draft: Option<UserProfile>,
    editing_profile: bool,
    saved_images: Vec<SavedImage>,
    last_result: Option<GenerationResult>,
    in_flight: Option<RequestKind>,
    error: Option<String>,
}

impl<S: LocalStore> Dashboard<S> {
    pub fn load(store: S) -> StoreResult<Self> {
        let profile = load_profile(&store)?;
        let saved_images = list_saved_images(&store)?;
        Ok(Self {
            store,
            section: Section::default(),
            draft: profile.clone(),
            profile,
            editing_profile: false,
            saved_images,
            last_result: None,
            in_flight: None,
            error: None,
        })
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn section(&self) -> Section {
        self.section
    }

    pub fn select(&mut self, section: Section) {
        self.section = section;
    }

    pub fn profile(&self) -> Option<&UserProfile> {
        self.profile.as_ref()
    }

    pub fn saved_images(&self) -> &[SavedImage] {
        &self.saved_images
    }

    pub fn last_result(&self) -> Option<&GenerationResult> {
        self.last_result.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn dismiss_error(&mut self) {
        self.error = None;
    }

    pub fn in_flight(&self) -> Option<RequestKind> {
        self.in_flight
    }

    // Profile editing

    pub fn is_editing_profile(&self) -> bool {
        self.editing_profile
    }

    /// Leaving edit mode this way throws the draft away.
    pub fn toggle_edit(&mut self) {
        if self.editing_profile {
            self.draft = self.profile.clone();
        }
        self.editing_profile = !self.editing_profile;
    }

    pub fn draft(&self) -> Option<&UserProfile> {
        self.draft.as_ref()
    }

    pub fn draft_mut(&mut self) -> Option<&mut UserProfile> {
        self.draft.as_mut()
    }

    pub fn save_profile(&mut self) -> StoreResult<()> {
        let Some(draft) = self.draft.clone() else {
            return Ok(());
        };
        save_profile(&mut self.store, &draft)?;
        self.profile = Some(draft);
        self.editing_profile = false;
        Ok(())
    }

    pub fn cancel(&mut self) {
        self.draft = self.profile.clone();
        self.editing_profile = false;
    }

    // Requests

    fn api_key(&self) -> DashboardResult<String> {
        self.profile
            .as_ref()
            .and_then(|profile| profile.api_key.clone())
            .filter(|key| !key.trim().is_empty())
            .ok_or(DashboardError::MissingApiKey)
    }

    /// Social post for the stored profile, with the logo attached when the
    /// profile has one.
    pub fn post_request(&self, description: &str) -> DashboardResult<GenerateImageBody> {
        let description = description.trim();
        let Some(profile) = self.profile.as_ref() else {
            return Err(DashboardError::EmptyDescription);
        };
        if description.is_empty() {
            return Err(DashboardError::EmptyDescription);
        }
        let api_key = self.api_key()?;

        let logo_image = profile
            .logo
            .as_deref()
            .and_then(split_data_url)
            .map(|(mime_type, data)| InlineImagePayload::new(data, mime_type));
        let mode = if logo_image.is_some() {
            GenerationMode::SocialMediaPostWithLogo
        } else {
            GenerationMode::SocialMediaPost
        };

        Ok(GenerateImageBody {
            mode: Some(mode.to_string()),
            user_name: Some(profile.name.clone()),
            post_description: Some(description.to_string()),
            brand_colors: Some(profile.brand_colors.clone()),
            logo_image,
            api_key: Some(api_key),
            ..GenerateImageBody::default()
        })
    }

    pub fn edit_request(
        &self,
        prompt: &str,
        image: &GeneratedImage,
    ) -> DashboardResult<GenerateImageBody> {
        let prompt = prompt.trim();
        if prompt.is_empty() {
            return Err(DashboardError::EmptyEditPrompt);
        }
        let api_key = self.api_key()?;

        Ok(GenerateImageBody {
            mode: Some(GenerationMode::ImageEditing.to_string()),
            prompt: Some(prompt.to_string()),
            input_image: Some(InlineImagePayload::new(
                image.image_bytes.clone(),
                image.mime_type.clone(),
            )),
            api_key: Some(api_key),
            ..GenerateImageBody::default()
        })
    }

    /// Image-editing request that restyles a content-library image for the
    /// stored profile. `data_b64` is the image at `src`.
    pub fn remaster_request(&self, src: &str, data_b64: &str) -> DashboardResult<GenerateImageBody> {
        let profile = self.profile.as_ref().ok_or(DashboardError::NoProfile)?;
        let api_key = self.api_key()?;

        Ok(GenerateImageBody {
            mode: Some(GenerationMode::ImageEditing.to_string()),
            prompt: Some(remaster_prompt(profile)),
            input_image: Some(InlineImagePayload::new(data_b64, detect_mime_type(src))),
            brand_colors: Some(profile.brand_colors.clone()),
            api_key: Some(api_key),
            ..GenerateImageBody::default()
        })
    }

    /// Reads a content-library image from `content_root` and builds its
    /// remaster request.
    pub fn remaster_library_item(
        &self,
        item: &LibraryItem,
        content_root: &Path,
    ) -> DashboardResult<GenerateImageBody> {
        let path = content_root.join(item.src.trim_start_matches('/'));
        let bytes = std::fs::read(&path).map_err(|source| StoreError::Io { path, source })?;
        self.remaster_request(item.src, &encode_byte_to_base64(&bytes))
    }

    /// Marks a request as started and clears the banner.
    pub fn begin_request(&mut self, kind: RequestKind) -> DashboardResult<()> {
        if self.in_flight.is_some() {
            return Err(DashboardError::Busy);
        }
        self.in_flight = Some(kind);
        self.error = None;
        if kind == RequestKind::Post {
            self.last_result = None;
        }
        Ok(())
    }

    /// Ends the in-flight request. A successful result is recorded; a
    /// failure becomes the banner text.
    pub fn finish_request(
        &mut self,
        outcome: Result<GenerationResult, String>,
    ) -> StoreResult<()> {
        let Some(kind) = self.in_flight.take() else {
            return Ok(());
        };

        match outcome {
            Ok(result) => self.record_result(kind, result),
            Err(message) => {
                self.error = Some(match kind {
                    RequestKind::Remaster => format!("Remaster failed: {message}"),
                    RequestKind::Post | RequestKind::Edit => message,
                });
                Ok(())
            }
        }
    }

    pub fn record_result(&mut self, kind: RequestKind, result: GenerationResult) -> StoreResult<()> {
        match kind {
            RequestKind::Post => {
                save_generation_result(&mut self.store, &result, false, None)?;
                self.last_result = Some(result);
            }
            RequestKind::Edit => {
                let original_prompt = self.last_result.as_ref().map(|last| last.prompt.clone());
                save_generation_result(&mut self.store, &result, true, original_prompt.as_deref())?;

                if let Some(last) = self.last_result.as_mut() {
                    let offset = last.images.len() as u32;
                    last.images
                        .extend(result.images.into_iter().enumerate().map(|(index, image)| {
                            GeneratedImage {
                                id: offset + index as u32 + 1,
                                ..image
                            }
                        }));
                }
            }
            RequestKind::Remaster => {
                save_generation_result(&mut self.store, &result, false, None)?;
                self.section = Section::Images;
            }
        }

        self.saved_images = list_saved_images(&self.store)?;
        Ok(())
    }

    pub fn delete_image(&mut self, id: &str) -> StoreResult<bool> {
        let removed = delete_saved_image(&mut self.store, id)?;
        if removed {
            self.saved_images.retain(|image| image.id != id);
        }
        Ok(removed)
    }

    pub fn clear_images(&mut self) -> StoreResult<()> {
        clear_saved_images(&mut self.store)?;
        self.saved_images.clear();
        Ok(())
    }

    pub fn export_image(&self, id: &str, dir: &Path) -> StoreResult<Option<PathBuf>> {
        self.saved_images
            .iter()
            .find(|image| image.id == id)
            .map(|image| export_saved_image(image, dir))
            .transpose()
    }
}

pub fn remaster_prompt(profile: &UserProfile) -> String {
    format!(
        "Remaster this image for {}, a {} business. Style: {}. Brand: {}. Target: {}. Make it professional and on-brand.",
        profile.name,
        profile.industry,
        profile.visual_style,
        profile.brand_personality.join(", "),
        profile.target_audience.join(", "),
    )
}
