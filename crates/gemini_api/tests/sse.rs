use gemini_api::StreamDecoder;
use pretty_assertions::assert_eq;

fn event(text: &str) -> String {
    let body = serde_json::json!({
        "candidates": [{"content": {"role": "model", "parts": [{"text": text}]}}]
    });
    format!("data: {body}\n\n")
}

fn decode_in_chunks(bytes: &[u8], splits: &[usize]) -> (Vec<String>, String) {
    let mut decoder = StreamDecoder::new();
    let mut fragments = Vec::new();
    let mut start = 0;
    for &split in splits.iter().chain(std::iter::once(&bytes.len())) {
        fragments.extend(decoder.feed(&bytes[start..split]).expect("feed"));
        start = split;
    }
    let full = decoder.finish();
    (fragments, full)
}

#[test]
fn every_two_way_split_yields_identical_output() {
    let stream = format!("{}{}{}", event("Hel"), event("lo, wörld "), event("✓ done"));
    let bytes = stream.as_bytes();
    let (expected_fragments, expected_full) = decode_in_chunks(bytes, &[]);
    assert_eq!(expected_fragments, vec!["Hel", "lo, wörld ", "✓ done"]);
    assert_eq!(expected_full, "Hello, wörld ✓ done");

    for split in 0..=bytes.len() {
        let (fragments, full) = decode_in_chunks(bytes, &[split]);
        assert_eq!(fragments, expected_fragments, "split at {split}");
        assert_eq!(full, expected_full, "split at {split}");
    }
}

#[test]
fn byte_at_a_time_feeding_matches_single_chunk() {
    let stream = format!("{}{}", event("多字节"), event("text"));
    let bytes = stream.as_bytes();
    let splits: Vec<usize> = (1..bytes.len()).collect();

    let (fragments, full) = decode_in_chunks(bytes, &splits);
    assert_eq!(fragments, vec!["多字节", "text"]);
    assert_eq!(full, "多字节text");
}

#[test]
fn three_way_splits_around_prefix_and_body() {
    let stream = event("abc");
    let bytes = stream.as_bytes();
    let (expected, _) = decode_in_chunks(bytes, &[]);

    for first in 0..bytes.len() {
        for second in first..bytes.len() {
            let (fragments, _) = decode_in_chunks(bytes, &[first, second]);
            assert_eq!(fragments, expected, "splits at {first},{second}");
        }
    }
}

#[test]
fn keepalives_malformed_and_empty_events_are_skipped() {
    let stream = format!(
        ": keep-alive\n\nevent: ping\ndata: {{broken\n{}data: {{\"candidates\":[]}}\n{}",
        event(""),
        event("kept"),
    );
    let (fragments, full) = decode_in_chunks(stream.as_bytes(), &[]);
    assert_eq!(fragments, vec!["kept"]);
    assert_eq!(full, "kept");
}

#[test]
fn only_first_part_of_first_candidate_is_used() {
    let line = concat!(
        "data: {\"candidates\":[",
        "{\"content\":{\"parts\":[{\"text\":\"first\"},{\"text\":\"second\"}]}},",
        "{\"content\":{\"parts\":[{\"text\":\"other\"}]}}",
        "]}\n"
    );
    let (fragments, _) = decode_in_chunks(line.as_bytes(), &[]);
    assert_eq!(fragments, vec!["first"]);
}

#[test]
fn unterminated_final_line_is_discarded() {
    let stream = format!("{}data: {{\"candidates\":[{{\"content\":{{\"parts\":[{{\"text\":\"lost\"}}]}}}}]}}", event("kept"));
    let (fragments, full) = decode_in_chunks(stream.as_bytes(), &[]);
    assert_eq!(fragments, vec!["kept"]);
    assert_eq!(full, "kept");
}

#[test]
fn full_text_tracks_fragments_incrementally() {
    let mut decoder = StreamDecoder::new();
    decoder.feed(event("one ").as_bytes()).expect("feed");
    assert_eq!(decoder.full_text(), "one ");
    decoder.feed(event("two").as_bytes()).expect("feed");
    assert_eq!(decoder.full_text(), "one two");
}
