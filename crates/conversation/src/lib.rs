//! Conversation state shared by the API client, the session store and the chat app.

mod attachment;
mod error;
mod exchange;
mod model;
mod pending;
mod settings;

pub use attachment::{read_attachment, read_to_end_geometric, INITIAL_READ_CAPACITY, READ_SLICE};
pub use error::ConversationError;
pub use exchange::{Conversation, Exchange, ExchangeOutcome};
pub use model::{FileAttachment, History, HistoryAttachment, Part, Role, Turn};
pub use pending::{PendingAttachments, ATTACHMENT_LIMIT};
pub use settings::{
    SessionSettings, ThinkingBudget, AUTOMATIC_THINKING_BUDGET, DEFAULT_MAX_OUTPUT_TOKENS,
    DEFAULT_MODEL_NAME, DEFAULT_SEED, DEFAULT_TEMPERATURE, LIGHTWEIGHT_THINKING_BUDGET_CAP,
};
