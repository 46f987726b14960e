use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConversationError {
    #[error("out of memory while {operation}")]
    Allocation { operation: &'static str },

    #[error("attachment limit of {limit} reached")]
    CapacityReached { limit: usize },

    #[error("no data was read from attachment source '{source_name}'")]
    EmptySource { source_name: String },

    #[error("failed reading attachment source '{source_name}': {source}")]
    Read {
        source_name: String,
        #[source]
        source: std::io::Error,
    },

    #[error("buffer capacity overflow while reading attachment '{source_name}'")]
    BufferOverflow { source_name: String },

    #[error("invalid message index {index} (history has {len} messages)")]
    InvalidTurnIndex { index: usize, len: usize },

    #[error("invalid part index {part_index} for message {turn_index}")]
    InvalidPartIndex { turn_index: usize, part_index: usize },

    #[error("part [{turn_index}:{part_index}] is not a file attachment")]
    NotAnAttachment { turn_index: usize, part_index: usize },

    #[error("invalid attachment index {index} ({len} pending)")]
    InvalidAttachmentIndex { index: usize, len: usize },
}

impl ConversationError {
    #[must_use]
    pub fn allocation(operation: &'static str) -> Self {
        Self::Allocation { operation }
    }

    #[must_use]
    pub fn read(source_name: impl Into<String>, source: std::io::Error) -> Self {
        Self::Read {
            source_name: source_name.into(),
            source,
        }
    }
}
