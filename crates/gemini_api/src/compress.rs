use std::io::Write;

use flate2::write::GzEncoder;
use flate2::Compression;
use serde::Serialize;

use crate::error::GeminiApiError;

/// Serialize `payload` as JSON and gzip it at best compression.
pub fn gzip_json<T: Serialize>(payload: &T) -> Result<Vec<u8>, GeminiApiError> {
    let json = serde_json::to_vec(payload)?;
    gzip_bytes(&json)
}

pub fn gzip_bytes(bytes: &[u8]) -> Result<Vec<u8>, GeminiApiError> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::best());
    encoder.write_all(bytes).map_err(GeminiApiError::Encode)?;
    let compressed = encoder.finish().map_err(GeminiApiError::Encode)?;
    tracing::trace!(raw = bytes.len(), compressed = compressed.len(), "gzipped request body");
    Ok(compressed)
}

#[cfg(test)]
mod tests {
    use std::io::Read;

    use flate2::read::GzDecoder;

    use super::*;

    #[test]
    fn gzip_json_round_trips_through_decoder() {
        let body = gzip_json(&serde_json::json!({"contents": []})).expect("compress");
        let mut decoded = String::new();
        GzDecoder::new(body.as_slice())
            .read_to_string(&mut decoded)
            .expect("valid gzip");
        assert_eq!(decoded, r#"{"contents":[]}"#);
    }
}
