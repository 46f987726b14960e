use std::io::{ErrorKind, Read};

use base64::{engine::general_purpose, Engine as _};

use crate::error::ConversationError;
use crate::model::FileAttachment;

/// Starting buffer size for attachment reads.
pub const INITIAL_READ_CAPACITY: usize = 32 * 1024;
/// Bytes requested from the source per read call; also the low-water mark that triggers growth.
pub const READ_SLICE: usize = 1024;

/// Reads `source` to completion and wraps the base64 payload as an attachment.
///
/// `source_name` becomes the local filename label.
pub fn read_attachment<R: Read>(
    source: R,
    source_name: &str,
    mime_type: &str,
) -> Result<FileAttachment, ConversationError> {
    let bytes = read_to_end_geometric(source, source_name, INITIAL_READ_CAPACITY)?;
    if bytes.is_empty() {
        return Err(ConversationError::EmptySource {
            source_name: source_name.to_string(),
        });
    }

    let data = general_purpose::STANDARD.encode(&bytes);
    tracing::debug!(
        source = source_name,
        mime_type,
        bytes = bytes.len(),
        "read attachment"
    );

    Ok(FileAttachment::new(mime_type, data, Some(source_name)))
}

/// Reads everything from `source`, doubling capacity whenever fewer than
/// [`READ_SLICE`] bytes of headroom remain.
pub fn read_to_end_geometric<R: Read>(
    mut source: R,
    source_name: &str,
    initial_capacity: usize,
) -> Result<Vec<u8>, ConversationError> {
    let mut buffer: Vec<u8> = Vec::new();
    buffer
        .try_reserve_exact(initial_capacity.max(READ_SLICE))
        .map_err(|_| ConversationError::allocation("allocating the attachment buffer"))?;

    let mut slice = [0u8; READ_SLICE];
    loop {
        let read = match source.read(&mut slice) {
            Ok(0) => break,
            Ok(read) => read,
            Err(error) if error.kind() == ErrorKind::Interrupted => continue,
            Err(error) => return Err(ConversationError::read(source_name, error)),
        };

        if buffer.capacity() - buffer.len() < read {
            grow(&mut buffer, source_name)?;
        }
        buffer.extend_from_slice(&slice[..read]);

        if buffer.capacity() - buffer.len() < READ_SLICE {
            grow(&mut buffer, source_name)?;
        }
    }

    Ok(buffer)
}

fn grow(buffer: &mut Vec<u8>, source_name: &str) -> Result<(), ConversationError> {
    let capacity = buffer.capacity();
    let next = capacity
        .checked_mul(2)
        .ok_or_else(|| ConversationError::BufferOverflow {
            source_name: source_name.to_string(),
        })?;
    buffer
        .try_reserve_exact(next - buffer.len())
        .map_err(|_| ConversationError::allocation("growing the attachment buffer"))
}
