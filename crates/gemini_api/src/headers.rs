use std::collections::BTreeMap;

use crate::config::GeminiApiConfig;
use crate::error::GeminiApiError;

pub const HEADER_CONTENT_TYPE: &str = "content-type";
pub const HEADER_CONTENT_ENCODING: &str = "content-encoding";
pub const HEADER_API_KEY: &str = "x-goog-api-key";
pub const HEADER_ORIGIN: &str = "origin";

/// Build a deterministic header map for Gemini requests.
pub fn build_headers(config: &GeminiApiConfig) -> Result<BTreeMap<String, String>, GeminiApiError> {
    let api_key = config.api_key.trim();
    if api_key.is_empty() {
        return Err(GeminiApiError::MissingApiKey);
    }

    let mut headers = BTreeMap::new();
    headers.insert(HEADER_CONTENT_TYPE.to_owned(), "application/json".to_owned());
    headers.insert(HEADER_CONTENT_ENCODING.to_owned(), "gzip".to_owned());
    headers.insert(HEADER_API_KEY.to_owned(), api_key.to_owned());

    if let Some(origin) = config.origin.as_deref().map(str::trim) {
        if !origin.is_empty() {
            headers.insert(HEADER_ORIGIN.to_owned(), origin.to_owned());
        }
    }

    Ok(headers)
}
