//! Transport-only client for the Gemini `generateContent` API family.
//!
//! This crate turns conversation state into wire payloads, sends them gzip
//! compressed, and decodes the server-sent event stream back into text
//! fragments. It never mutates conversation state; settling an exchange is the
//! caller's job.

pub mod builder;
pub mod client;
pub mod compress;
pub mod config;
pub mod error;
pub mod headers;
pub mod payload;
pub mod sse;
pub mod url;

pub use builder::{build_count_tokens_request, build_generate_request};
pub use client::GeminiClient;
pub use config::GeminiApiConfig;
pub use error::{parse_error_message, GeminiApiError};
pub use payload::{CountTokensRequest, GenerateContentRequest};
pub use sse::{DecodeError, StreamDecoder};
pub use url::{endpoint_url, ApiMethod, DEFAULT_GEMINI_BASE_URL};

pub use reqwest::StatusCode;
