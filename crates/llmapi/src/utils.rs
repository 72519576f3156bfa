use base64::Engine as _;
use std::path::Path;

pub const DATA_URL_PREFIX: &str = "data:";
const BASE64_MARKER: &str = ";base64,";

pub fn detect_mime_type<P: AsRef<Path>>(path: P) -> String {
    mime_guess::from_path(path)
        .first_raw()
        .unwrap_or("image/jpeg")
        .to_string()
}

pub fn encode_byte_to_base64(bytes: &[u8]) -> String {
    base64::engine::general_purpose::STANDARD.encode(bytes)
}

/// `data:<mime>;base64,<payload>`. The payload is not validated.
pub fn to_data_url(mime_type: &str, data_b64: &str) -> String {
    format!("{DATA_URL_PREFIX}{mime_type}{BASE64_MARKER}{data_b64}")
}

/// Splits a base64 data URL into `(mime, payload)`.
pub fn split_data_url(url: &str) -> Option<(&str, &str)> {
    let rest = url.trim().strip_prefix(DATA_URL_PREFIX)?;
    let (mime, payload) = rest.split_once(BASE64_MARKER)?;
    Some((mime, payload))
}

pub fn current_timestamp_millis() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|duration| duration.as_millis() as u64)
        .unwrap_or_default()
}
