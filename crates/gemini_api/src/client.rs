use futures_util::StreamExt;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Response};
use serde::Serialize;

use crate::compress::gzip_json;
use crate::config::GeminiApiConfig;
use crate::error::{parse_error_message, GeminiApiError};
use crate::headers::build_headers;
use crate::payload::{CountTokensRequest, CountTokensResponse, GenerateContentRequest, GenerateContentResponse};
use crate::sse::StreamDecoder;
use crate::url::{endpoint_url, ApiMethod};

#[derive(Debug)]
pub struct GeminiClient {
    http: Client,
    config: GeminiApiConfig,
}

impl GeminiClient {
    pub fn new(config: GeminiApiConfig) -> Result<Self, GeminiApiError> {
        let http = Client::builder().build().map_err(GeminiApiError::from)?;
        Ok(Self { http, config })
    }

    pub fn config(&self) -> &GeminiApiConfig {
        &self.config
    }

    pub fn endpoint(&self, model: &str, method: ApiMethod) -> String {
        endpoint_url(&self.config.base_url, model, method)
    }

    pub fn build_headers(&self) -> Result<HeaderMap, GeminiApiError> {
        let headers = build_headers(&self.config)?;
        let mut out = HeaderMap::new();
        for (key, value) in headers {
            out.insert(
                HeaderName::from_bytes(key.as_bytes())
                    .map_err(|_| GeminiApiError::InvalidHeader(format!("invalid header key: {key}")))?,
                HeaderValue::from_str(&value)
                    .map_err(|_| GeminiApiError::InvalidHeader(format!("invalid header value for {key}")))?,
            );
        }
        Ok(out)
    }

    /// Gzipped POST of `payload` to `model:method`.
    pub fn build_request<T: Serialize>(
        &self,
        model: &str,
        method: ApiMethod,
        payload: &T,
    ) -> Result<reqwest::RequestBuilder, GeminiApiError> {
        let headers = self.build_headers()?;
        let body = gzip_json(payload)?;
        Ok(self
            .http
            .post(self.endpoint(model, method))
            .headers(headers)
            .body(body))
    }

    async fn send<T: Serialize>(
        &self,
        model: &str,
        method: ApiMethod,
        payload: &T,
    ) -> Result<Response, GeminiApiError> {
        let response = self.build_request(model, method, payload)?.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = parse_error_message(status, &body);
        tracing::debug!(status = status.as_u16(), %message, "request rejected");
        Err(GeminiApiError::Status { status, message })
    }

    /// Stream a reply, calling `on_fragment` for each text fragment as it arrives.
    ///
    /// Returns the full reply text once the stream ends.
    pub async fn stream_generate<F>(
        &self,
        model: &str,
        request: &GenerateContentRequest,
        mut on_fragment: F,
    ) -> Result<String, GeminiApiError>
    where
        F: FnMut(&str),
    {
        let response = self
            .send(model, ApiMethod::StreamGenerateContent, request)
            .await?;
        let mut bytes = response.bytes_stream();
        let mut decoder = StreamDecoder::new();

        while let Some(chunk) = bytes.next().await {
            let chunk = chunk?;
            for fragment in decoder.feed(&chunk)? {
                on_fragment(&fragment);
            }
        }

        let text = decoder.finish();
        tracing::debug!(chars = text.len(), "stream finished");
        Ok(text)
    }

    /// Non-streaming variant; returns `candidates[0].content.parts[0].text`.
    pub async fn generate(
        &self,
        model: &str,
        request: &GenerateContentRequest,
    ) -> Result<String, GeminiApiError> {
        let body = self
            .send(model, ApiMethod::GenerateContent, request)
            .await?
            .bytes()
            .await?;
        parse_generate_response(&body)
    }

    pub async fn count_tokens(
        &self,
        model: &str,
        request: &CountTokensRequest,
    ) -> Result<u64, GeminiApiError> {
        let body = self
            .send(model, ApiMethod::CountTokens, request)
            .await?
            .bytes()
            .await?;
        let parsed = serde_json::from_slice::<CountTokensResponse>(&body).map_err(|error| {
            GeminiApiError::MalformedResponse(format!("countTokens response: {error}"))
        })?;
        Ok(parsed.total_tokens)
    }
}

/// Pull the reply text out of a complete `generateContent` body.
pub fn parse_generate_response(body: &[u8]) -> Result<String, GeminiApiError> {
    let parsed = serde_json::from_slice::<GenerateContentResponse>(body)
        .map_err(|error| GeminiApiError::MalformedResponse(format!("generateContent response: {error}")))?;
    parsed
        .first_text()
        .map(str::to_owned)
        .ok_or_else(|| GeminiApiError::MalformedResponse("response carried no text part".to_string()))
}
