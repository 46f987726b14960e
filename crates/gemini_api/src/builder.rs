//! Pure translation from conversation state to request payloads.
//!
//! Nothing here clamps or validates settings; `SessionSettings` owns its limits.

use conversation::{History, SessionSettings, Turn};

use crate::payload::{
    CountTokensRequest, EmptyObject, GenerateContentRequest, GenerationConfig, SystemInstruction,
    ThinkingConfig, WireContent, WireTool,
};

pub fn build_generate_request(
    settings: &SessionSettings,
    history: &History,
    extra: Option<&Turn>,
) -> GenerateContentRequest {
    GenerateContentRequest {
        system_instruction: system_instruction(settings.system_instruction.as_deref()),
        contents: wire_contents(history, extra),
        tools: settings.tools_enabled().then(server_tools),
        generation_config: generation_config(settings),
    }
}

pub fn build_count_tokens_request(
    settings: &SessionSettings,
    history: &History,
    extra: Option<&Turn>,
) -> CountTokensRequest {
    CountTokensRequest {
        system_instruction: system_instruction(settings.system_instruction.as_deref()),
        contents: wire_contents(history, extra),
    }
}

/// History turns in order, followed by `extra` when given.
pub fn wire_contents(history: &History, extra: Option<&Turn>) -> Vec<WireContent> {
    history
        .turns()
        .iter()
        .chain(extra)
        .map(WireContent::from)
        .collect()
}

pub fn system_instruction(text: Option<&str>) -> Option<SystemInstruction> {
    text.map(SystemInstruction::from_text)
}

fn server_tools() -> Vec<WireTool> {
    vec![
        WireTool::UrlContext(EmptyObject {}),
        WireTool::GoogleSearch(EmptyObject {}),
    ]
}

fn generation_config(settings: &SessionSettings) -> GenerationConfig {
    GenerationConfig {
        temperature: settings.temperature,
        max_output_tokens: settings.max_output_tokens,
        seed: settings.seed,
        thinking_config: ThinkingConfig {
            thinking_budget: settings.thinking_budget().wire_value(),
        },
    }
}
