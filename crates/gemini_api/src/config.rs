use crate::url::DEFAULT_GEMINI_BASE_URL;

/// Origin value meaning "send no `origin` header".
pub const DEFAULT_ORIGIN: &str = "default";

/// Transport configuration for Gemini API requests.
#[derive(Debug, Clone)]
pub struct GeminiApiConfig {
    /// Key passed in `x-goog-api-key`.
    pub api_key: String,
    /// Base URL; model endpoints are appended to it.
    pub base_url: String,
    /// Optional `origin` header value.
    pub origin: Option<String>,
}

impl Default for GeminiApiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: DEFAULT_GEMINI_BASE_URL.to_string(),
            origin: None,
        }
    }
}

impl GeminiApiConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            ..Self::default()
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Blank values and `"default"` clear the origin.
    pub fn with_origin(mut self, origin: impl Into<String>) -> Self {
        let origin = origin.into();
        let trimmed = origin.trim();
        self.origin = if trimmed.is_empty() || trimmed == DEFAULT_ORIGIN {
            None
        } else {
            Some(trimmed.to_string())
        };
        self
    }
}
