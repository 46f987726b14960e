use std::fmt;

use crate::payload::GenerateContentResponse;

const DATA_PREFIX: &[u8] = b"data: ";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// The line buffer or text accumulator could not grow.
    Allocation { requested: usize },
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Allocation { requested } => {
                write!(f, "could not grow stream buffer by {requested} bytes")
            }
        }
    }
}

impl std::error::Error for DecodeError {}

/// Incremental decoder for `streamGenerateContent?alt=sse` bodies.
///
/// Bytes are buffered until a `\n` arrives, so chunk boundaries never affect
/// the emitted fragments. One decoder serves exactly one response.
#[derive(Debug, Default)]
pub struct StreamDecoder {
    buffer: Vec<u8>,
    full_text: String,
}

impl StreamDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one chunk and return the text fragments completed by it, in order.
    pub fn feed(&mut self, bytes: &[u8]) -> Result<Vec<String>, DecodeError> {
        self.buffer
            .try_reserve(bytes.len())
            .map_err(|_| DecodeError::Allocation {
                requested: bytes.len(),
            })?;
        self.buffer.extend_from_slice(bytes);

        let mut fragments = Vec::new();
        let mut consumed = 0;
        while let Some(offset) = self.buffer[consumed..].iter().position(|byte| *byte == b'\n') {
            let line = &self.buffer[consumed..consumed + offset];
            consumed += offset + 1;

            let Some(fragment) = decode_line(line) else {
                continue;
            };
            self.full_text
                .try_reserve(fragment.len())
                .map_err(|_| DecodeError::Allocation {
                    requested: fragment.len(),
                })?;
            self.full_text.push_str(&fragment);
            fragments.push(fragment);
        }

        self.buffer.drain(..consumed);
        Ok(fragments)
    }

    /// Concatenation of every fragment emitted so far.
    pub fn full_text(&self) -> &str {
        &self.full_text
    }

    /// Bytes received after the last newline.
    pub fn pending_bytes(&self) -> usize {
        self.buffer.len()
    }

    /// End the stream. An unterminated trailing line is dropped.
    pub fn finish(self) -> String {
        if !self.buffer.is_empty() {
            tracing::debug!(bytes = self.buffer.len(), "discarding unterminated stream line");
        }
        self.full_text
    }
}

fn decode_line(line: &[u8]) -> Option<String> {
    let line = line.strip_suffix(b"\r").unwrap_or(line);
    let Some(payload) = line.strip_prefix(DATA_PREFIX) else {
        if !line.is_empty() {
            tracing::trace!(len = line.len(), "skipping non-data stream line");
        }
        return None;
    };

    let event = match serde_json::from_slice::<GenerateContentResponse>(payload) {
        Ok(event) => event,
        Err(error) => {
            tracing::trace!(%error, "skipping malformed stream event");
            return None;
        }
    };

    event
        .first_text()
        .filter(|text| !text.is_empty())
        .map(str::to_owned)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crlf_terminated_lines_are_accepted() {
        let mut decoder = StreamDecoder::new();
        let fragments = decoder
            .feed(b"data: {\"candidates\":[{\"content\":{\"parts\":[{\"text\":\"hi\"}]}}]}\r\n\r\n")
            .expect("feed");
        assert_eq!(fragments, vec!["hi".to_string()]);
        assert_eq!(decoder.pending_bytes(), 0);
    }

    #[test]
    fn unterminated_tail_is_kept_until_finish() {
        let mut decoder = StreamDecoder::new();
        assert!(decoder.feed(b"data: {\"candidates\"").expect("feed").is_empty());
        assert_eq!(decoder.pending_bytes(), 19);
        assert_eq!(decoder.finish(), "");
    }
}
