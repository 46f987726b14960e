use reqwest::StatusCode;

use gemini_api::parse_error_message;

#[test]
fn parse_error_message_prefers_error_message_field() {
    let body = r#"{"error":{"code":400,"message":"API key not valid.","status":"INVALID_ARGUMENT"}}"#;
    assert_eq!(
        parse_error_message(StatusCode::BAD_REQUEST, body),
        "API key not valid."
    );
}

#[test]
fn parse_error_message_falls_back_to_raw_body() {
    let body = "upstream connect error";
    assert_eq!(parse_error_message(StatusCode::BAD_GATEWAY, body), body);
}

#[test]
fn parse_error_message_uses_raw_body_when_message_missing() {
    let body = r#"{"error":{"code":500}}"#;
    assert_eq!(parse_error_message(StatusCode::INTERNAL_SERVER_ERROR, body), body);
}

#[test]
fn parse_error_message_uses_reason_phrase_for_empty_body() {
    assert_eq!(
        parse_error_message(StatusCode::SERVICE_UNAVAILABLE, ""),
        "Service Unavailable"
    );
}

#[test]
fn parse_error_message_ignores_content_after_first_object() {
    let body = "[{\n  \"error\": {\"code\": 400, \"message\": \"API key not valid\", \"status\": \"INVALID_ARGUMENT\"}\n}\n]\n";
    assert_eq!(
        parse_error_message(StatusCode::BAD_REQUEST, body),
        "API key not valid"
    );
}
