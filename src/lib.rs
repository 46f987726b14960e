//! Terminal chat client for the Gemini `generateContent` API.
//!
//! ## Credentials
//!
//! The API key comes from `GEMINI_API_KEY`, or from `api_key` in the config
//! file when the variable is unset. `GEMINI_API_KEY_ORIGIN` sets the `origin`
//! header; `"default"` sends none. Startup fails without a key.
//!
//! ## Config file
//!
//! `<config_dir>/gemini-cli/config.json`, e.g. `~/.config/gemini-cli/config.json`:
//!
//! ```json
//! {
//!   "model": "gemini-2.5-pro",
//!   "temperature": 0.75,
//!   "seed": 42,
//!   "system_prompt": "Answer briefly.",
//!   "max_output_tokens": 65536,
//!   "thinking_budget": -1,
//!   "google_grounding": true,
//!   "url_context": 1
//! }
//! ```
//!
//! Every key is optional. Booleans also accept 0/1. Command-line flags win
//! over the file.
//!
//! ## Sessions
//!
//! Named sessions live in `<config_dir>/gemini-cli/sessions/<name>.json` and use
//! the same JSON shape as a `countTokens` request body, so `/save` exports can be
//! sent to the API as-is.
//!
//! Set `GEMINI_CHAT_LOG` (an `EnvFilter` directive, default `warn`) for
//! diagnostic logs on stderr.

pub mod app;
pub mod cli;
pub mod commands;
pub mod config;
pub mod host;
pub mod logging;
pub mod mime;

pub use app::{App, ChatHost, TurnOutcome};
pub use cli::{classify_inputs, Cli, StartupInputs};
pub use config::{resolve, ChatConfig, EnvConfig, FileConfig, KeySource};
pub use host::GeminiHost;
