//! Configuration model loaded from external sources.

use std::time::Duration;

use serde::Deserialize;

use crate::forms::image::{
    DEFAULT_ACCEPTED_EXTENSIONS, DEFAULT_ACCEPTED_TYPES, DEFAULT_MAX_IMAGE_BYTES, ImageLimits,
};
use crate::services::list::{DEFAULT_DEBOUNCE, DEFAULT_PAGE_SIZE, ListMode, ListSettings};

#[derive(Clone, Debug, Deserialize)]
/// Settings for the contacts client.
pub struct ClientConfig {
    #[serde(default = "default_api_url")]
    pub api_url: String,
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
    #[serde(default)]
    pub list_mode: ListMode,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_max_image_bytes")]
    pub max_image_bytes: u64,
    #[serde(default = "default_accepted_image_types")]
    pub accepted_image_types: Vec<String>,
    #[serde(default = "default_accepted_image_extensions")]
    pub accepted_image_extensions: Vec<String>,
}

fn default_api_url() -> String {
    "http://localhost:8080/api".to_string()
}

fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}

fn default_debounce_ms() -> u64 {
    DEFAULT_DEBOUNCE.as_millis() as u64
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_max_image_bytes() -> u64 {
    DEFAULT_MAX_IMAGE_BYTES
}

fn default_accepted_image_types() -> Vec<String> {
    DEFAULT_ACCEPTED_TYPES.iter().map(ToString::to_string).collect()
}

fn default_accepted_image_extensions() -> Vec<String> {
    DEFAULT_ACCEPTED_EXTENSIONS
        .iter()
        .map(ToString::to_string)
        .collect()
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            page_size: default_page_size(),
            debounce_ms: default_debounce_ms(),
            list_mode: ListMode::default(),
            request_timeout_secs: default_request_timeout_secs(),
            max_image_bytes: default_max_image_bytes(),
            accepted_image_types: default_accepted_image_types(),
            accepted_image_extensions: default_accepted_image_extensions(),
        }
    }
}

impl ClientConfig {
    /// A zero page size falls back to the default.
    pub fn list_settings(&self) -> ListSettings {
        ListSettings {
            mode: self.list_mode,
            page_size: if self.page_size == 0 {
                DEFAULT_PAGE_SIZE
            } else {
                self.page_size
            },
            debounce: Duration::from_millis(self.debounce_ms),
        }
    }

    /// Extensions are compared lowercase with a leading dot.
    pub fn image_limits(&self) -> ImageLimits {
        ImageLimits {
            accepted_types: self
                .accepted_image_types
                .iter()
                .map(|t| t.trim().to_lowercase())
                .collect(),
            accepted_extensions: self
                .accepted_image_extensions
                .iter()
                .map(|ext| {
                    let ext = ext.trim().to_lowercase();
                    if ext.starts_with('.') {
                        ext
                    } else {
                        format!(".{ext}")
                    }
                })
                .collect(),
            max_bytes: self.max_image_bytes,
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_source_uses_defaults() {
        let config: ClientConfig = serde_json::from_str("{}").expect("defaults apply");

        assert_eq!(config.api_url, "http://localhost:8080/api");
        assert_eq!(config.list_settings(), ListSettings::default());
        assert_eq!(config.image_limits(), ImageLimits::default());
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn overrides_are_normalized() {
        let config: ClientConfig = serde_json::from_str(
            r#"{"page_size": 0, "debounce_ms": 250, "list_mode": "client_filtered",
                "accepted_image_extensions": ["PNG", ".Jpg"]}"#,
        )
        .expect("valid config");

        let settings = config.list_settings();
        assert_eq!(settings.mode, ListMode::ClientFiltered);
        assert_eq!(settings.page_size, DEFAULT_PAGE_SIZE);
        assert_eq!(settings.debounce, Duration::from_millis(250));
        assert_eq!(
            config.image_limits().accepted_extensions,
            vec![".png".to_string(), ".jpg".to_string()]
        );
    }
}
