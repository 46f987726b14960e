mod codec;
mod error;
mod paths;
mod store;

pub use codec::{decode_session, encode_session, LoadedSession, SkipReason, SkippedTurn};
pub use error::SessionStoreError;
pub use paths::{
    session_file_name, session_root, validate_relative_path, validate_session_name, SESSION_DIR,
    SESSION_EXTENSION,
};
pub use store::{load_from_path, save_to_path, SessionStore, SessionSummary};
