use std::fmt;

use crate::error::ConversationError;

/// Author of a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    User,
    Model,
}

impl Role {
    pub fn parse(value: &str) -> Option<Self> {
        Some(match value {
            "user" => Self::User,
            "model" => Self::Model,
            _ => return None,
        })
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Model => "model",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Base64-encoded file payload staged for, or stored in, a turn.
///
/// `filename` is local metadata only and never leaves the process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileAttachment {
    pub mime_type: String,
    pub data: String,
    pub filename: Option<String>,
}

impl FileAttachment {
    #[must_use]
    pub fn new(
        mime_type: impl Into<String>,
        data: impl Into<String>,
        filename: Option<impl Into<String>>,
    ) -> Self {
        Self {
            mime_type: mime_type.into(),
            data: data.into(),
            filename: filename.map(Into::into),
        }
    }

    /// Label used when listing attachments.
    pub fn display_name(&self) -> &str {
        self.filename.as_deref().unwrap_or("Pasted/Loaded Data")
    }

    /// Size of the decoded payload in bytes.
    pub fn byte_len(&self) -> usize {
        let padding = self.data.bytes().rev().take_while(|byte| *byte == b'=').count();
        (self.data.len() / 4 * 3).saturating_sub(padding)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Part {
    Text { text: String },
    File(FileAttachment),
}

impl Part {
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text { text } => Some(text),
            Self::File(_) => None,
        }
    }

    pub fn as_attachment(&self) -> Option<&FileAttachment> {
        match self {
            Self::Text { .. } => None,
            Self::File(attachment) => Some(attachment),
        }
    }
}

impl From<FileAttachment> for Part {
    fn from(attachment: FileAttachment) -> Self {
        Self::File(attachment)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Turn {
    pub role: Role,
    pub parts: Vec<Part>,
}

impl Turn {
    #[must_use]
    pub fn new(role: Role, parts: Vec<Part>) -> Self {
        Self { role, parts }
    }

    #[must_use]
    pub fn user_text(text: impl Into<String>) -> Self {
        Self::new(Role::User, vec![Part::text(text)])
    }

    #[must_use]
    pub fn model_text(text: impl Into<String>) -> Self {
        Self::new(Role::Model, vec![Part::text(text)])
    }

    /// Concatenation of all text parts.
    pub fn text(&self) -> String {
        self.parts.iter().filter_map(Part::as_text).collect()
    }
}

/// One attachment found while scanning history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoryAttachment<'a> {
    pub turn_index: usize,
    pub part_index: usize,
    pub role: Role,
    pub attachment: &'a FileAttachment,
}

/// Ordered conversation turns; insertion order is conversation order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct History {
    turns: Vec<Turn>,
}

impl History {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn last(&self) -> Option<&Turn> {
        self.turns.last()
    }

    /// Copies `parts` into a new turn at the end of the history.
    pub fn append_turn(&mut self, role: Role, parts: &[Part]) -> Result<(), ConversationError> {
        self.push_turn(Turn::new(role, parts.to_vec()))
    }

    /// Moves an already-built turn to the end of the history.
    pub fn push_turn(&mut self, turn: Turn) -> Result<(), ConversationError> {
        self.turns
            .try_reserve(1)
            .map_err(|_| ConversationError::allocation("appending a turn to history"))?;
        self.turns.push(turn);
        Ok(())
    }

    /// Removes and returns the most recently appended turn.
    pub fn rollback_last_turn(&mut self) -> Option<Turn> {
        let removed = self.turns.pop();
        if let Some(turn) = &removed {
            tracing::debug!(role = %turn.role, remaining = self.turns.len(), "rolled back last turn");
        }
        removed
    }

    pub fn clear(&mut self) {
        self.turns.clear();
    }

    pub fn attachments(&self) -> impl Iterator<Item = HistoryAttachment<'_>> {
        self.turns
            .iter()
            .enumerate()
            .flat_map(|(turn_index, turn)| {
                turn.parts
                    .iter()
                    .enumerate()
                    .filter_map(move |(part_index, part)| {
                        part.as_attachment().map(|attachment| HistoryAttachment {
                            turn_index,
                            part_index,
                            role: turn.role,
                            attachment,
                        })
                    })
            })
    }

    /// Removes the file part at `(turn_index, part_index)`, closing the gap.
    ///
    /// Text parts are rejected and nothing is mutated on any error.
    pub fn remove_attachment(
        &mut self,
        turn_index: usize,
        part_index: usize,
    ) -> Result<FileAttachment, ConversationError> {
        let len = self.turns.len();
        let turn = self
            .turns
            .get_mut(turn_index)
            .ok_or(ConversationError::InvalidTurnIndex {
                index: turn_index,
                len,
            })?;

        match turn.parts.get(part_index) {
            None => Err(ConversationError::InvalidPartIndex {
                turn_index,
                part_index,
            }),
            Some(Part::Text { .. }) => Err(ConversationError::NotAnAttachment {
                turn_index,
                part_index,
            }),
            Some(Part::File(attachment)) => {
                let attachment = attachment.clone();
                turn.parts.remove(part_index);
                Ok(attachment)
            }
        }
    }
}

impl From<Vec<Turn>> for History {
    fn from(turns: Vec<Turn>) -> Self {
        Self { turns }
    }
}
