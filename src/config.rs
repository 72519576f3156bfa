use anyhow::{Context, Result};

use crate::constants::{
    API_KEY_ENV, DEFAULT_GEMINI_ENDPOINT, DEFAULT_IMAGE_MODEL,
    DEFAULT_MAX_BODY_BYTES, DEFAULT_TEXT_MODEL,
};

/// Server configuration loaded from environment variables.
///
/// | Env Var             | Default                          |
/// |---------------------|----------------------------------|
/// | `HOST`              | `0.0.0.0`                        |
/// | `PORT`              | `3000`                           |
/// | `GOOGLE_AI_API_KEY` | unset (callers may send `apiKey`) |
/// | `GEMINI_ENDPOINT`   | Gemini v1beta models endpoint    |
/// | `IMAGE_MODEL`       | `gemini-2.5-flash-image-preview` |
/// | `TEXT_MODEL`        | `gemini-2.5-flash`               |
/// | `CORS_ORIGINS`      | `http://localhost:3000`          |
/// | `MAX_BODY_BYTES`    | 25 MiB                           |
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Fallback credential when a request carries no `apiKey`.
    pub api_key: Option<String>,
    pub gemini_endpoint: String,
    pub image_model: String,
    pub text_model: String,
    pub cors_origins: Vec<String>,
    pub max_body_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 3000,
            api_key: None,
            gemini_endpoint: DEFAULT_GEMINI_ENDPOINT.into(),
            image_model: DEFAULT_IMAGE_MODEL.into(),
            text_model: DEFAULT_TEXT_MODEL.into(),
            cors_origins: vec!["http://localhost:3000".into()],
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup; blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();
        let get = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let port = match get("PORT") {
            Some(value) => value
                .parse()
                .with_context(|| format!("PORT must be a valid u16, got '{value}'"))?,
            None => defaults.port,
        };

        let max_body_bytes = match get("MAX_BODY_BYTES") {
            Some(value) => value
                .parse()
                .with_context(|| format!("MAX_BODY_BYTES must be a byte count, got '{value}'"))?,
            None => defaults.max_body_bytes,
        };

        let cors_origins = get("CORS_ORIGINS")
            .map(|value| {
                value
                    .split(',')
                    .map(|origin| origin.trim().to_string())
                    .filter(|origin| !origin.is_empty())
                    .collect()
            })
            .unwrap_or(defaults.cors_origins);

        Ok(Self {
            host: get("HOST").unwrap_or(defaults.host),
            port,
            api_key: get(API_KEY_ENV),
            gemini_endpoint: get("GEMINI_ENDPOINT").unwrap_or(defaults.gemini_endpoint),
            image_model: get("IMAGE_MODEL").unwrap_or(defaults.image_model),
            text_model: get("TEXT_MODEL").unwrap_or(defaults.text_model),
            cors_origins,
            max_body_bytes,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let config = ServerConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.port, 3000);
        assert_eq!(config.image_model, DEFAULT_IMAGE_MODEL);
        assert!(config.api_key.is_none());
    }

    #[test]
    fn reads_overrides_and_ignores_blank_key() {
        let config = ServerConfig::from_lookup(lookup(&[
            ("PORT", "8080"),
            ("GOOGLE_AI_API_KEY", "   "),
            ("CORS_ORIGINS", "http://a.test, ,http://b.test"),
            ("TEXT_MODEL", "gemini-2.0-flash"),
        ]))
        .unwrap();
        assert_eq!(config.port, 8080);
        assert!(config.api_key.is_none());
        assert_eq!(config.cors_origins, vec!["http://a.test", "http://b.test"]);
        assert_eq!(config.text_model, "gemini-2.0-flash");
    }

    #[test]
    fn default_config_matches_empty_environment() {
        let config = ServerConfig::from_lookup(lookup(&[("DATA_DIR", "/tmp/ignored")])).unwrap();
        let defaults = ServerConfig::default();
        assert_eq!(config.host, defaults.host);
        assert_eq!(config.cors_origins, defaults.cors_origins);
        assert_eq!(config.max_body_bytes, defaults.max_body_bytes);
    }

    #[test]
    fn rejects_bad_port() {
        let err = ServerConfig::from_lookup(lookup(&[("PORT", "eighty")])).unwrap_err();
        assert!(err.to_string().contains("PORT"));
    }
}
