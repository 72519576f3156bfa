use std::path::{Path, PathBuf};

use base64::engine::general_purpose::STANDARD as BASE64_ENGINE;
use base64::Engine;
use llmapi::utils::{current_timestamp_millis, split_data_url};

use crate::constants::IMAGES_STORAGE_KEY;
use crate::fs_utils::{default_extension_for_mime, ensure_dir, ensure_unique_file_name};
use crate::models::{GeneratedImage, GenerationResult, SavedImage};
use crate::store::{read_json, write_json, LocalStore, StoreError, StoreResult};

/// Saved images, newest first. A corrupt list reads as empty.
pub fn list_saved_images<S: LocalStore + ?Sized>(store: &S) -> StoreResult<Vec<SavedImage>> {
    match read_json(store, IMAGES_STORAGE_KEY) {
        Ok(images) => Ok(images.unwrap_or_default()),
        Err(StoreError::Parse { source, .. }) => {
            tracing::warn!(error = %source, "Saved image list is corrupt, starting empty");
            Ok(Vec::new())
        }
        Err(err) => Err(err),
    }
}

fn write_saved_images<S: LocalStore + ?Sized>(
    store: &mut S,
    images: &[SavedImage],
) -> StoreResult<()> {
    write_json(store, IMAGES_STORAGE_KEY, images)
}

/// `<millis>-<image id>`, bumping the millis until it is unused.
fn unique_saved_id(existing: &[SavedImage], now_millis: u64, image_id: u32) -> String {
    let mut millis = now_millis;
    loop {
        let candidate = format!("{millis}-{image_id}");
        if existing.iter().all(|saved| saved.id != candidate) {
            return candidate;
        }
        millis += 1;
    }
}

pub fn saved_image_from(
    id: String,
    image: &GeneratedImage,
    result: &GenerationResult,
    is_edit: bool,
    original_prompt: Option<&str>,
    created_at: String,
) -> SavedImage {
    SavedImage {
        id,
        image_url: image.image_url.clone(),
        prompt: result.prompt.clone(),
        user_name: result.user_name.clone(),
        post_description: result.post_description.clone(),
        has_logo: result.has_logo,
        created_at,
        original_prompt: original_prompt.map(str::to_string),
        is_edit,
        generated_caption: result.generated_caption.clone(),
        generated_description: result.generated_description.clone(),
    }
}

/// Prepends every image of `result` to the saved list, in result order, so
/// the last image ends up first.
pub fn save_generation_result<S: LocalStore + ?Sized>(
    store: &mut S,
    result: &GenerationResult,
    is_edit: bool,
    original_prompt: Option<&str>,
) -> StoreResult<Vec<SavedImage>> {
    let mut images = list_saved_images(store)?;
    let now = current_timestamp_millis();
    let created_at = chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true);

    let mut saved = Vec::with_capacity(result.images.len());
    for image in &result.images {
        let id = unique_saved_id(&images, now, image.id);
        let record = saved_image_from(
            id,
            image,
            result,
            is_edit,
            original_prompt,
            created_at.clone(),
        );
        images.insert(0, record.clone());
        saved.push(record);
    }

    write_saved_images(store, &images)?;
    Ok(saved)
}

/// Returns whether anything was removed.
pub fn delete_saved_image<S: LocalStore + ?Sized>(store: &mut S, id: &str) -> StoreResult<bool> {
    let mut images = list_saved_images(store)?;
    let original_len = images.len();
    images.retain(|image| image.id != id);

    if images.len() == original_len {
        return Ok(false);
    }

    write_saved_images(store, &images)?;
    Ok(true)
}

pub fn clear_saved_images<S: LocalStore + ?Sized>(store: &mut S) -> StoreResult<()> {
    store.remove(IMAGES_STORAGE_KEY)
}

/// Decodes a saved image and writes it under `dir` as
/// `post-<id>.<ext>`, never overwriting an existing file.
pub fn export_saved_image(image: &SavedImage, dir: &Path) -> StoreResult<PathBuf> {
    let (mime_type, payload) = split_data_url(&image.image_url)
        .ok_or_else(|| StoreError::InvalidImage(format!("'{}' is not a data URL", image.id)))?;

    let bytes = BASE64_ENGINE
        .decode(payload.trim())
        .map_err(|err| StoreError::InvalidImage(format!("'{}': {err}", image.id)))?;

    let dir = ensure_dir(dir).map_err(|source| StoreError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    let extension = default_extension_for_mime(mime_type).unwrap_or_else(|| "bin".to_string());
    let file_name = ensure_unique_file_name(&dir, &format!("post-{}.{extension}", image.id));
    let target_path = dir.join(file_name);

    std::fs::write(&target_path, &bytes).map_err(|source| StoreError::Io {
        path: target_path.clone(),
        source,
    })?;

    Ok(target_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{GenerationMetadata, GenerationMode};
    use crate::store::MemoryStore;

    fn result_with_images(count: u32) -> GenerationResult {
        let images = (1..=count)
            .map(|id| GeneratedImage {
                id,
                image_url: format!("data:image/png;base64,SU1H{id}"),
                image_bytes: format!("SU1H{id}"),
                mime_type: "image/png".into(),
            })
            .collect::<Vec<_>>();
        GenerationResult {
            success: true,
            prompt: "Create a professional social media post".into(),
            text_response: String::new(),
            user_name: Some("Cantiffin".into()),
            post_description: Some("Lunch deals".into()),
            has_logo: true,
            generated_caption: Some("Hungry?".into()),
            generated_description: Some("Lunch, delivered.".into()),
            metadata: GenerationMetadata {
                model: "gemini-2.5-flash-image-preview".into(),
                text_model: Some("gemini-2.5-flash".into()),
                number_of_images: images.len(),
                mode: GenerationMode::SocialMediaPostWithLogo,
                generated_at: "2026-10-18T00:00:00.000Z".into(),
            },
            images,
        }
    }

    #[test]
    fn saves_newest_first_with_copied_context() {
        let mut store = MemoryStore::new();
        save_generation_result(&mut store, &result_with_images(2), false, None).unwrap();

        let saved = list_saved_images(&store).unwrap();
        assert_eq!(saved.len(), 2);
        assert_eq!(saved[0].image_url, "data:image/png;base64,SU1H2");
        assert!(saved[0].id.ends_with("-2"));
        assert_eq!(saved[1].user_name.as_deref(), Some("Cantiffin"));
        assert_eq!(saved[1].generated_caption.as_deref(), Some("Hungry?"));
        assert!(saved[1].has_logo);
        assert!(!saved[1].is_edit);
    }

    #[test]
    fn ids_stay_unique_across_results() {
        let mut store = MemoryStore::new();
        let result = result_with_images(1);
        save_generation_result(&mut store, &result, false, None).unwrap();
        save_generation_result(&mut store, &result, true, Some("original")).unwrap();

        let saved = list_saved_images(&store).unwrap();
        assert_ne!(saved[0].id, saved[1].id);
        assert!(saved[0].is_edit);
        assert_eq!(saved[0].original_prompt.as_deref(), Some("original"));
    }

    #[test]
    fn bumps_colliding_timestamp() {
        let existing = vec![saved_image_from(
            "100-1".into(),
            &result_with_images(1).images[0],
            &result_with_images(1),
            false,
            None,
            String::new(),
        )];
        assert_eq!(unique_saved_id(&existing, 100, 1), "101-1");
        assert_eq!(unique_saved_id(&existing, 100, 2), "100-2");
    }

    #[test]
    fn deletes_and_clears() {
        let mut store = MemoryStore::new();
        let saved = save_generation_result(&mut store, &result_with_images(2), false, None).unwrap();

        assert!(delete_saved_image(&mut store, &saved[0].id).unwrap());
        assert!(!delete_saved_image(&mut store, "nope").unwrap());
        assert_eq!(list_saved_images(&store).unwrap().len(), 1);

        clear_saved_images(&mut store).unwrap();
        assert!(list_saved_images(&store).unwrap().is_empty());
    }

    #[test]
    fn corrupt_list_reads_as_empty() {
        let mut store = MemoryStore::new();
        store.set(IMAGES_STORAGE_KEY, "[{".into()).unwrap();
        assert!(list_saved_images(&store).unwrap().is_empty());
    }

    #[test]
    fn exports_decoded_bytes_without_overwriting() {
        let dir = tempfile::tempdir().unwrap();
        let mut image = saved_image_from(
            "42-1".into(),
            &result_with_images(1).images[0],
            &result_with_images(1),
            false,
            None,
            String::new(),
        );
        image.image_url = "data:image/jpeg;base64,aGVsbG8=".into();

        let first = export_saved_image(&image, dir.path()).unwrap();
        let second = export_saved_image(&image, dir.path()).unwrap();

        assert_eq!(first.file_name().unwrap(), "post-42-1.jpg");
        assert_eq!(second.file_name().unwrap(), "post-42-1-1.jpg");
        assert_eq!(std::fs::read(first).unwrap(), b"hello");
    }

    #[test]
    fn export_rejects_corrupt_payload() {
        let dir = tempfile::tempdir().unwrap();
        let mut image = saved_image_from(
            "7-1".into(),
            &result_with_images(1).images[0],
            &result_with_images(1),
            false,
            None,
            String::new(),
        );
        image.image_url = "data:image/png;base64,not base64!!".into();
        assert!(matches!(
            export_saved_image(&image, dir.path()),
            Err(StoreError::InvalidImage(_))
        ));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn export_rejects_non_data_urls() {
        let dir = tempfile::tempdir().unwrap();
        let mut image = saved_image_from(
            "1-1".into(),
            &result_with_images(1).images[0],
            &result_with_images(1),
            false,
            None,
            String::new(),
        );
        image.image_url = "/content/mockup.png".into();
        assert!(matches!(
            export_saved_image(&image, dir.path()),
            Err(StoreError::InvalidImage(_))
        ));
    }
}
