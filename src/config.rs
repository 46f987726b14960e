//! Startup configuration: config file, environment, then command-line flags.
//!
//! The file lives at `<config_dir>/gemini-cli/config.json`. Every key is
//! optional and unknown keys are ignored. A file that cannot be read or parsed
//! is reported and replaced by defaults.

use std::env;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use conversation::{SessionSettings, ThinkingBudget};
use serde::{Deserialize, Deserializer};

use crate::cli::Cli;

pub const CONFIG_DIR_NAME: &str = "gemini-cli";
pub const CONFIG_FILE_NAME: &str = "config.json";

pub const API_KEY_ENV: &str = "GEMINI_API_KEY";
pub const ORIGIN_ENV: &str = "GEMINI_API_KEY_ORIGIN";

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub model: Option<String>,
    pub temperature: Option<f32>,
    pub seed: Option<i32>,
    pub system_prompt: Option<String>,
    pub api_key: Option<String>,
    pub origin: Option<String>,
    pub max_output_tokens: Option<u32>,
    pub thinking_budget: Option<i64>,
    #[serde(deserialize_with = "flag")]
    pub google_grounding: Option<bool>,
    #[serde(deserialize_with = "flag")]
    pub url_context: Option<bool>,
}

#[must_use]
pub fn config_file_path(config_dir: &Path) -> PathBuf {
    config_dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME)
}

impl FileConfig {
    pub fn parse(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }

    /// Loads `path`; a missing file is silently empty, any other failure warns.
    #[must_use]
    pub fn load_or_default(path: &Path) -> Self {
        let bytes = match fs::read(path) {
            Ok(bytes) => bytes,
            Err(error) if error.kind() == ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no config file");
                return Self::default();
            }
            Err(error) => {
                tracing::warn!(path = %path.display(), %error, "could not read config file, using defaults");
                return Self::default();
            }
        };

        match Self::parse(&bytes) {
            Ok(config) => config,
            Err(error) => {
                tracing::warn!(
                    path = %path.display(),
                    %error,
                    "config file is not a valid JSON object, using defaults"
                );
                Self::default()
            }
        }
    }
}

/// Booleans in the config file may also be written as 0/1.
fn flag<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Number(i64),
    }

    Ok(Option::<Flag>::deserialize(deserializer)?.map(|flag| match flag {
        Flag::Bool(value) => value,
        Flag::Number(value) => value != 0,
    }))
}

/// Values taken from the process environment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvConfig {
    pub api_key: Option<String>,
    pub origin: Option<String>,
}

impl EnvConfig {
    pub fn from_env() -> Self {
        Self {
            api_key: env_string_opt(API_KEY_ENV),
            origin: env_string_opt(ORIGIN_ENV),
        }
    }
}

fn env_string_opt(key: &str) -> Option<String> {
    env::var(key).ok().and_then(|value| {
        if value.trim().is_empty() {
            None
        } else {
            Some(value)
        }
    })
}

/// Where the API key came from, for the startup banner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeySource {
    Environment,
    ConfigFile,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChatConfig {
    pub settings: SessionSettings,
    pub api_key: Option<String>,
    pub key_source: Option<KeySource>,
    pub origin: Option<String>,
    pub streaming: bool,
}

/// Layers defaults, the config file, the environment and flags, highest last.
#[must_use]
pub fn resolve(file: FileConfig, env: EnvConfig, cli: &Cli) -> ChatConfig {
    let mut settings = SessionSettings::default();

    if let Some(model) = file.model.filter(|model| !model.trim().is_empty()) {
        settings.model = model;
    }
    if let Some(temperature) = file.temperature {
        settings.temperature = temperature;
    }
    if let Some(seed) = file.seed {
        settings.seed = seed;
    }
    if let Some(max_output_tokens) = file.max_output_tokens {
        settings.max_output_tokens = max_output_tokens;
    }
    if let Some(budget) = file.thinking_budget {
        settings.set_thinking_budget(ThinkingBudget::from_literal(budget));
    }
    if let Some(google_grounding) = file.google_grounding {
        settings.google_grounding = google_grounding;
    }
    if let Some(url_context) = file.url_context {
        settings.url_context = url_context;
    }
    settings.system_instruction = file.system_prompt.filter(|prompt| !prompt.is_empty());

    if let Some(model) = &cli.model {
        settings.model = model.clone();
    }
    if let Some(temperature) = cli.temperature {
        settings.temperature = temperature;
    }
    if let Some(seed) = cli.seed {
        settings.seed = seed;
    }
    if let Some(max_tokens) = cli.max_tokens {
        settings.max_output_tokens = max_tokens;
    }
    if let Some(budget) = cli.budget {
        settings.set_thinking_budget(ThinkingBudget::from_literal(budget));
    }
    if cli.no_grounding {
        settings.google_grounding = false;
    }
    if cli.no_url_context {
        settings.url_context = false;
    }
    // Model may have changed after the budget was set.
    settings.apply_model_limits();

    let file_key = file.api_key.filter(|key| !key.trim().is_empty());
    let (api_key, key_source) = match (env.api_key, file_key) {
        (Some(key), _) => (Some(key), Some(KeySource::Environment)),
        (None, Some(key)) => (Some(key), Some(KeySource::ConfigFile)),
        (None, None) => (None, None),
    };

    ChatConfig {
        settings,
        api_key,
        key_source,
        origin: env.origin.or(file.origin),
        streaming: !cli.no_stream,
    }
}
