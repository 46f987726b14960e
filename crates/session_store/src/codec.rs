use std::fmt;

use conversation::{FileAttachment, History, Part, Role, Turn};
use gemini_api::builder::{system_instruction, wire_contents};
use gemini_api::payload::{CountTokensRequest, WirePart};
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::SessionStoreError;

/// Result of decoding a session document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadedSession {
    pub history: History,
    pub system_instruction: Option<String>,
    /// Turns dropped while loading, in document order.
    pub skipped: Vec<SkippedTurn>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedTurn {
    pub index: usize,
    pub reason: SkipReason,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    NotAnObject,
    UnknownRole(Option<String>),
    PartsNotArray,
    InvalidPart { part_index: usize },
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotAnObject => f.write_str("entry is not an object"),
            Self::UnknownRole(Some(role)) => write!(f, "unknown role '{role}'"),
            Self::UnknownRole(None) => f.write_str("missing role"),
            Self::PartsNotArray => f.write_str("'parts' is not an array"),
            Self::InvalidPart { part_index } => {
                write!(f, "part {part_index} is neither text nor inline data")
            }
        }
    }
}

/// Serialize history in the request wire shape, limited to
/// `systemInstruction` and `contents`.
pub fn encode_session(
    history: &History,
    system: Option<&str>,
) -> Result<Vec<u8>, SessionStoreError> {
    let document = CountTokensRequest {
        system_instruction: system_instruction(system),
        contents: wire_contents(history, None),
    };
    serde_json::to_vec_pretty(&document).map_err(SessionStoreError::JsonSerialize)
}

/// Parse a session document, skipping turns that do not fit the wire shape.
///
/// Attachments come back without a filename; the format never stores one.
pub fn decode_session(bytes: &[u8]) -> Result<LoadedSession, SessionStoreError> {
    let root = serde_json::from_slice::<Value>(bytes).map_err(SessionStoreError::JsonParse)?;
    let Value::Object(root) = root else {
        return Err(SessionStoreError::NotAnObject);
    };

    let mut loaded = LoadedSession {
        system_instruction: decode_system_instruction(&root),
        ..LoadedSession::default()
    };

    let Some(Value::Array(contents)) = root.get("contents") else {
        return Ok(loaded);
    };

    let mut turns = Vec::with_capacity(contents.len());
    for (index, entry) in contents.iter().enumerate() {
        match decode_turn(entry) {
            Ok(turn) => turns.push(turn),
            Err(reason) => {
                tracing::warn!(index, %reason, "skipping session turn");
                loaded.skipped.push(SkippedTurn { index, reason });
            }
        }
    }
    loaded.history = History::from(turns);

    Ok(loaded)
}

fn decode_system_instruction(root: &Map<String, Value>) -> Option<String> {
    root.get("systemInstruction")?
        .get("parts")?
        .get(0)?
        .get("text")?
        .as_str()
        .map(str::to_owned)
}

fn decode_turn(entry: &Value) -> Result<Turn, SkipReason> {
    let Value::Object(entry) = entry else {
        return Err(SkipReason::NotAnObject);
    };

    let role = match entry.get("role") {
        Some(Value::String(role)) => {
            Role::parse(role).ok_or_else(|| SkipReason::UnknownRole(Some(role.clone())))?
        }
        _ => return Err(SkipReason::UnknownRole(None)),
    };

    let Some(Value::Array(raw_parts)) = entry.get("parts") else {
        return Err(SkipReason::PartsNotArray);
    };

    let parts = raw_parts
        .iter()
        .enumerate()
        .map(|(part_index, raw)| {
            WirePart::deserialize(raw)
                .map(part_from_wire)
                .map_err(|_| SkipReason::InvalidPart { part_index })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Turn::new(role, parts))
}

fn part_from_wire(part: WirePart) -> Part {
    match part {
        WirePart::Text { text } => Part::Text { text },
        WirePart::InlineData { inline_data } => Part::File(FileAttachment::new(
            inline_data.mime_type,
            inline_data.data,
            None::<String>,
        )),
    }
}
