/// Default base URL for Gemini requests.
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Model methods this client calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiMethod {
    StreamGenerateContent,
    GenerateContent,
    CountTokens,
}

impl ApiMethod {
    /// Path suffix after `models/{model}:`, including any fixed query string.
    pub fn as_path(&self) -> &'static str {
        match self {
            Self::StreamGenerateContent => "streamGenerateContent?alt=sse",
            Self::GenerateContent => "generateContent",
            Self::CountTokens => "countTokens",
        }
    }
}

/// Build `{base}/models/{model}:{method}`.
///
/// An empty base falls back to [`DEFAULT_GEMINI_BASE_URL`]; trailing slashes are dropped.
pub fn endpoint_url(base_url: &str, model: &str, method: ApiMethod) -> String {
    let base = match base_url.trim() {
        "" => DEFAULT_GEMINI_BASE_URL,
        trimmed => trimmed,
    };
    let base = base.trim_end_matches('/');
    format!("{base}/models/{}:{}", model.trim(), method.as_path())
}
