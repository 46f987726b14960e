use gemini_api::{endpoint_url, ApiMethod, DEFAULT_GEMINI_BASE_URL};

#[test]
fn stream_endpoint_carries_sse_query() {
    assert_eq!(
        endpoint_url(DEFAULT_GEMINI_BASE_URL, "gemini-2.5-pro", ApiMethod::StreamGenerateContent),
        "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.5-pro:streamGenerateContent?alt=sse"
    );
}

#[test]
fn trailing_slash_is_trimmed() {
    assert_eq!(
        endpoint_url("http://127.0.0.1:9/v1beta/", "m", ApiMethod::CountTokens),
        "http://127.0.0.1:9/v1beta/models/m:countTokens"
    );
}

#[test]
fn blank_base_falls_back_to_default() {
    assert_eq!(
        endpoint_url("  ", "m", ApiMethod::GenerateContent),
        format!("{DEFAULT_GEMINI_BASE_URL}/models/m:generateContent")
    );
}
