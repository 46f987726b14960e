use crate::error::ConversationError;
use crate::model::FileAttachment;

/// Maximum number of attachments staged for one turn.
pub const ATTACHMENT_LIMIT: usize = 1024;

/// Attachments staged for the next user turn, not yet part of history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingAttachments {
    items: Vec<FileAttachment>,
    capacity: usize,
}

impl Default for PendingAttachments {
    fn default() -> Self {
        Self::with_capacity(ATTACHMENT_LIMIT)
    }
}

impl PendingAttachments {
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            items: Vec::new(),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.items.len() >= self.capacity
    }

    pub fn iter(&self) -> impl Iterator<Item = &FileAttachment> {
        self.items.iter()
    }

    pub fn as_slice(&self) -> &[FileAttachment] {
        &self.items
    }

    /// Fails with `CapacityReached` when full; the queue is untouched on error.
    pub fn ensure_room(&self) -> Result<(), ConversationError> {
        if self.is_full() {
            return Err(ConversationError::CapacityReached {
                limit: self.capacity,
            });
        }
        Ok(())
    }

    pub fn push(&mut self, attachment: FileAttachment) -> Result<(), ConversationError> {
        self.ensure_room()?;
        self.items
            .try_reserve(1)
            .map_err(|_| ConversationError::allocation("staging an attachment"))?;
        self.items.push(attachment);
        Ok(())
    }

    /// Removes the attachment at `index`, shifting later ones down.
    pub fn remove(&mut self, index: usize) -> Result<FileAttachment, ConversationError> {
        if index >= self.items.len() {
            return Err(ConversationError::InvalidAttachmentIndex {
                index,
                len: self.items.len(),
            });
        }
        Ok(self.items.remove(index))
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}
