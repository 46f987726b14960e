use std::io::Read;

use crate::attachment::read_attachment;
use crate::error::ConversationError;
use crate::model::{History, Part, Role, Turn};
use crate::pending::PendingAttachments;

/// Session conversation state: committed history plus the staged next turn.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Conversation {
    history: History,
    pending: PendingAttachments,
}

impl Conversation {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_history(history: History) -> Self {
        Self {
            history,
            pending: PendingAttachments::default(),
        }
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn history_mut(&mut self) -> &mut History {
        &mut self.history
    }

    pub fn pending(&self) -> &PendingAttachments {
        &self.pending
    }

    pub fn pending_mut(&mut self) -> &mut PendingAttachments {
        &mut self.pending
    }

    /// Replaces the history wholesale; pending attachments are kept.
    pub fn replace_history(&mut self, history: History) {
        self.history = history;
    }

    /// Drops history and every staged attachment.
    pub fn clear(&mut self) {
        self.history.clear();
        self.pending.clear();
    }

    /// Reads `source` into a new staged attachment.
    ///
    /// Capacity is checked before any byte is read.
    pub fn begin_pending_attachment<R: Read>(
        &mut self,
        source: R,
        source_name: &str,
        mime_type: &str,
    ) -> Result<(), ConversationError> {
        self.pending.ensure_room()?;
        let attachment = read_attachment(source, source_name, mime_type)?;
        self.pending.push(attachment)
    }

    /// The user turn `commit_turn(prompt)` would append, without touching any state.
    pub fn preview_turn(&self, prompt: &str) -> Option<Turn> {
        let parts = self.staged_parts(prompt);
        (!parts.is_empty()).then(|| Turn::new(Role::User, parts))
    }

    /// Folds staged attachments plus `prompt` into one user turn.
    ///
    /// Returns `Ok(None)` when there is nothing to send. Pending attachments are
    /// cleared only once the turn is in history.
    pub fn commit_turn(&mut self, prompt: &str) -> Result<Option<Exchange<'_>>, ConversationError> {
        let parts = self.staged_parts(prompt);
        if parts.is_empty() {
            return Ok(None);
        }

        let part_count = parts.len();
        self.history.append_turn(Role::User, &parts)?;
        self.pending.clear();

        let committed_len = self.history.len();
        tracing::debug!(parts = part_count, history_len = committed_len, "committed user turn");
        Ok(Some(Exchange {
            conversation: self,
            committed_len,
            settled: false,
        }))
    }

    fn staged_parts(&self, prompt: &str) -> Vec<Part> {
        let mut parts: Vec<Part> = self.pending.iter().cloned().map(Part::from).collect();
        if !prompt.is_empty() {
            parts.push(Part::text(prompt));
        }
        parts
    }
}

/// Outcome of a settled exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExchangeOutcome {
    Completed,
    RolledBack,
}

/// A committed user turn waiting for its model reply.
///
/// Exactly one of [`Exchange::complete`] or [`Exchange::roll_back`] settles it.
/// Dropping an unsettled exchange rolls the user turn back.
#[derive(Debug)]
pub struct Exchange<'a> {
    conversation: &'a mut Conversation,
    committed_len: usize,
    settled: bool,
}

impl Exchange<'_> {
    /// History including the committed user turn, for building the request.
    pub fn history(&self) -> &History {
        &self.conversation.history
    }

    /// Appends the model reply after the committed user turn.
    ///
    /// On allocation failure the user turn is rolled back before the error is returned.
    pub fn complete(mut self, model_text: impl Into<String>) -> Result<ExchangeOutcome, ConversationError> {
        match self
            .conversation
            .history
            .push_turn(Turn::model_text(model_text))
        {
            Ok(()) => {
                self.settled = true;
                Ok(ExchangeOutcome::Completed)
            }
            Err(error) => {
                self.undo();
                Err(error)
            }
        }
    }

    /// Removes the committed user turn, restoring the pre-commit history.
    pub fn roll_back(mut self) -> ExchangeOutcome {
        self.undo();
        ExchangeOutcome::RolledBack
    }

    fn undo(&mut self) {
        if self.settled {
            return;
        }
        self.settled = true;
        if self.conversation.history.len() == self.committed_len {
            self.conversation.history.rollback_last_turn();
        } else {
            tracing::warn!(
                expected = self.committed_len,
                actual = self.conversation.history.len(),
                "history changed during exchange; skipping rollback"
            );
        }
    }
}

impl Drop for Exchange<'_> {
    fn drop(&mut self) {
        self.undo();
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    #[test]
    fn empty_commit_is_nothing_to_send() {
        let mut conversation = Conversation::new();
        assert!(conversation.commit_turn("").expect("no allocation").is_none());
        assert!(conversation.history().is_empty());
    }

    #[test]
    fn attachments_precede_prompt_text() {
        let mut conversation = Conversation::new();
        conversation
            .begin_pending_attachment(Cursor::new(b"abc".to_vec()), "a.txt", "text/plain")
            .expect("attach");

        let exchange = conversation
            .commit_turn("explain")
            .expect("no allocation")
            .expect("something to send");
        let turn = exchange.history().last().expect("user turn").clone();
        exchange.complete("ok").expect("append");

        assert_eq!(turn.role, Role::User);
        assert!(turn.parts[0].as_attachment().is_some());
        assert_eq!(turn.parts[1].as_text(), Some("explain"));
        assert!(conversation.pending().is_empty());
    }

    #[test]
    fn preview_matches_commit_and_mutates_nothing() {
        let mut conversation = Conversation::new();
        conversation
            .begin_pending_attachment(Cursor::new(b"abc".to_vec()), "a.txt", "text/plain")
            .expect("attach");
        let before = conversation.clone();

        let preview = conversation.preview_turn("hi").expect("non-empty");
        assert_eq!(conversation, before);
        assert_eq!(preview.parts.len(), 2);
        assert!(conversation.preview_turn("").is_some());
        assert!(Conversation::new().preview_turn("").is_none());
    }
}
