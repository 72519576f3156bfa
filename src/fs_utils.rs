use std::fs;
use std::io;
use std::path::{Path, PathBuf};

pub fn ensure_dir(path: &Path) -> io::Result<PathBuf> {
    if !path.exists() {
        fs::create_dir_all(path)?;
    }
    Ok(path.to_path_buf())
}

/// `original` if free, else `stem-1.ext`, `stem-2.ext`, ...
pub fn ensure_unique_file_name(dir: &Path, original: &str) -> String {
    if !dir.join(original).exists() {
        return original.to_string();
    }

    let original_path = Path::new(original);
    let stem = original_path
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or("image");
    let extension = original_path.extension().and_then(|ext| ext.to_str());

    let mut counter = 1;
    loop {
        let candidate = match extension {
            Some(ext) => format!("{stem}-{counter}.{ext}"),
            None => format!("{stem}-{counter}"),
        };

        if !dir.join(&candidate).exists() {
            return candidate;
        }

        counter += 1;
    }
}

pub fn sanitize_file_name(file_name: &str) -> Option<String> {
    let trimmed = file_name.trim();
    if trimmed.is_empty()
        || trimmed.contains(['/', '\\'])
        || trimmed.contains("..")
        || trimmed.contains('\0')
    {
        return None;
    }

    Some(trimmed.to_string())
}

pub fn default_extension_for_mime(mime_type: &str) -> Option<String> {
    let mime = mime_type.trim().to_lowercase();
    let ext = match mime.as_str() {
        "image/png" => Some("png"),
        "image/jpeg" | "image/jpg" => Some("jpg"),
        "image/webp" => Some("webp"),
        "image/gif" => Some("gif"),
        _ => None,
    };

    if let Some(value) = ext {
        return Some(value.to_string());
    }

    mime_guess::get_mime_extensions_str(&mime)
        .and_then(|extensions| extensions.first())
        .map(|value| value.to_string())
        .or_else(|| {
            mime.split('/')
                .nth(1)
                .filter(|value| !value.is_empty())
                .map(|value| value.to_string())
        })
}

/// Writes to a sibling temp file first so readers never see half a value.
pub fn write_atomic(path: &Path, contents: &[u8]) -> io::Result<()> {
    let tmp = path.with_extension("tmp");
    fs::write(&tmp, contents)?;
    fs::rename(&tmp, path)
}
