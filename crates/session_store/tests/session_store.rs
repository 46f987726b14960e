use std::fs;

use base64::{engine::general_purpose, Engine as _};
use conversation::{FileAttachment, History, Part, Role, Turn};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use session_store::{
    decode_session, encode_session, load_from_path, save_to_path, SessionStore, SessionStoreError,
    SkipReason,
};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

fn sample_history() -> History {
    History::from(vec![
        Turn::user_text("what is rust"),
        Turn::model_text("a language"),
        Turn::new(
            Role::User,
            vec![
                Part::from(FileAttachment::new(
                    "image/png",
                    general_purpose::STANDARD.encode([0x89, b'P', b'N', b'G', 0, 1, 2]),
                    Some("diagram.png"),
                )),
                Part::text("and this"),
            ],
        ),
    ])
}

#[test]
fn round_trip_preserves_roles_text_mime_and_bytes() {
    let temp = tempfile::tempdir().expect("tempdir should be created");
    let path = temp.path().join("chat.json");
    let history = sample_history();

    save_to_path(&path, &history, Some("be helpful")).expect("save should succeed");
    let loaded = load_from_path(&path).expect("load should succeed");

    assert!(loaded.skipped.is_empty());
    assert_eq!(loaded.system_instruction.as_deref(), Some("be helpful"));
    assert_eq!(loaded.history.len(), history.len());

    for (original, restored) in history.turns().iter().zip(loaded.history.turns()) {
        assert_eq!(original.role, restored.role);
        assert_eq!(original.text(), restored.text());
        assert_eq!(original.parts.len(), restored.parts.len());
    }

    let original = history.turns()[2].parts[0].as_attachment().expect("attachment");
    let restored = loaded.history.turns()[2].parts[0]
        .as_attachment()
        .expect("attachment survives");
    assert_eq!(original.mime_type, restored.mime_type);
    assert_eq!(
        general_purpose::STANDARD.decode(&original.data).expect("valid base64"),
        general_purpose::STANDARD.decode(&restored.data).expect("valid base64"),
    );
}

#[test]
fn encoded_document_has_only_wire_session_fields() {
    let bytes = encode_session(&sample_history(), None).expect("encode");
    let value: Value = serde_json::from_slice(&bytes).expect("valid JSON");

    let keys: Vec<_> = value.as_object().expect("object").keys().cloned().collect();
    assert_eq!(keys, vec!["contents".to_string()]);
    assert_eq!(
        value["contents"][2]["parts"][0],
        json!({"inlineData": {"mimeType": "image/png", "data": "iVBORwABAg=="}})
    );
    assert!(!String::from_utf8_lossy(&bytes).contains("diagram.png"));
}

#[test]
fn malformed_turns_are_skipped_and_the_rest_load() {
    let document = json!({
        "contents": [
            {"role": "user", "parts": [{"text": "kept 1"}]},
            {"role": "system", "parts": [{"text": "dropped"}]},
            {"role": "model", "parts": {"text": "dropped"}},
            {"role": "model", "parts": [{"text": "kept 2"}]},
            {"parts": [{"text": "no role"}]},
            {"role": "user", "parts": [{"inlineData": {"mimeType": "text/plain"}}]},
        ]
    });

    let loaded = decode_session(document.to_string().as_bytes()).expect("object root");

    let texts: Vec<_> = loaded.history.turns().iter().map(Turn::text).collect();
    assert_eq!(texts, vec!["kept 1".to_string(), "kept 2".to_string()]);
    let skipped: Vec<_> = loaded.skipped.iter().map(|skip| skip.index).collect();
    assert_eq!(skipped, vec![1, 2, 4, 5]);
    assert_eq!(loaded.skipped[3].reason, SkipReason::InvalidPart { part_index: 0 });
}

#[test]
fn invalid_json_and_non_object_roots_fail() {
    assert!(matches!(
        decode_session(b"{not json"),
        Err(SessionStoreError::JsonParse(_))
    ));
    assert!(matches!(
        decode_session(b"\"text\""),
        Err(SessionStoreError::NotAnObject)
    ));
}

#[test]
fn non_array_contents_loads_empty_history() {
    let loaded = decode_session(br#"{"contents": {"role": "user"}}"#).expect("object root");
    assert!(loaded.history.is_empty());
    assert!(loaded.skipped.is_empty());
}

#[test]
fn load_from_missing_path_reports_operation_and_path() {
    let temp = tempfile::tempdir().expect("tempdir should be created");
    let path = temp.path().join("missing.json");

    let error = load_from_path(&path).expect_err("missing file must fail");
    assert!(matches!(
        error,
        SessionStoreError::Io { operation: "reading session file", ref path, .. } if path.ends_with("missing.json")
    ));
}

#[test]
fn named_sessions_save_list_load_delete() {
    let temp = tempfile::tempdir().expect("tempdir should be created");
    let store = SessionStore::new(temp.path().join("sessions"));
    assert!(store.list().expect("missing root lists empty").is_empty());

    store
        .save("zeta", &sample_history(), None)
        .expect("save zeta");
    let alpha_path = store
        .save("alpha", &History::from(vec![Turn::user_text("x")]), Some("sys"))
        .expect("save alpha");
    assert!(alpha_path.ends_with("alpha.json"));
    fs::write(store.root().join("notes.txt"), "ignored").expect("write stray file");

    let listed = store.list().expect("list");
    let names: Vec<_> = listed.iter().map(|summary| summary.name.as_str()).collect();
    assert_eq!(names, vec!["alpha", "zeta"]);
    for summary in &listed {
        let modified = summary.modified.as_deref().expect("mtime available");
        OffsetDateTime::parse(modified, &Rfc3339).expect("RFC3339 timestamp");
    }

    let loaded = store.load("alpha").expect("load alpha");
    assert_eq!(loaded.system_instruction.as_deref(), Some("sys"));
    assert_eq!(loaded.history.len(), 1);

    store.delete("alpha").expect("delete alpha");
    assert!(matches!(
        store.load("alpha"),
        Err(SessionStoreError::SessionNotFound { .. })
    ));
    assert!(matches!(
        store.delete("alpha"),
        Err(SessionStoreError::SessionNotFound { .. })
    ));
}

#[test]
fn invalid_session_names_touch_nothing() {
    let temp = tempfile::tempdir().expect("tempdir should be created");
    let store = SessionStore::new(temp.path().join("sessions"));

    for name in ["../escape", "a.b", ""] {
        let error = store
            .save(name, &sample_history(), None)
            .expect_err("invalid name must fail");
        assert!(error.is_validation());
    }
    assert!(!store.root().exists());
}

#[test]
fn missing_config_dir_has_no_session_root() {
    assert!(matches!(
        SessionStore::under_config_dir(None),
        Err(SessionStoreError::NoSessionRoot)
    ));
}
