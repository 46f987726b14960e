use std::io::Cursor;

use conversation::{
    Conversation, ConversationError, ExchangeOutcome, FileAttachment, History, Part, PendingAttachments, Role,
    Turn,
};
use pretty_assertions::assert_eq;

fn seeded_history() -> History {
    History::from(vec![
        Turn::user_text("first question"),
        Turn::model_text("first answer"),
        Turn::new(
            Role::User,
            vec![
                Part::from(FileAttachment::new("image/png", "iVBORw0=", Some("shot.png"))),
                Part::text("what is this"),
            ],
        ),
        Turn::model_text("a screenshot"),
    ])
}

#[test]
fn rolled_back_exchange_restores_history_exactly() {
    let mut conversation = Conversation::with_history(seeded_history());
    let before = conversation.history().clone();

    let exchange = conversation
        .commit_turn("second question")
        .expect("commit")
        .expect("non-empty turn");
    assert_eq!(exchange.history().len(), before.len() + 1);
    assert_eq!(exchange.roll_back(), ExchangeOutcome::RolledBack);

    assert_eq!(conversation.history(), &before);
}

#[test]
fn dropped_exchange_rolls_back() {
    let mut conversation = Conversation::with_history(seeded_history());
    let before = conversation.history().clone();

    {
        let _exchange = conversation.commit_turn("abandoned").expect("commit");
    }

    assert_eq!(conversation.history(), &before);
}

#[test]
fn completed_exchange_appends_user_then_model() {
    let mut conversation = Conversation::with_history(seeded_history());
    let start = conversation.history().len();

    let exchange = conversation.commit_turn("next").expect("commit").expect("turn");
    assert_eq!(exchange.complete("reply").expect("append"), ExchangeOutcome::Completed);

    let turns = conversation.history().turns();
    assert_eq!(turns.len(), start + 2);
    assert_eq!(turns[start], Turn::user_text("next"));
    assert_eq!(turns[start + 1], Turn::model_text("reply"));
}

#[test]
fn sequential_exchanges_never_interleave() {
    let mut conversation = Conversation::new();
    for (prompt, reply) in [("one", "1"), ("two", "2"), ("three", "3")] {
        let exchange = conversation.commit_turn(prompt).expect("commit").expect("turn");
        exchange.complete(reply).expect("append");
    }

    let roles: Vec<_> = conversation.history().turns().iter().map(|turn| turn.role).collect();
    assert_eq!(
        roles,
        vec![Role::User, Role::Model, Role::User, Role::Model, Role::User, Role::Model]
    );
    assert_eq!(conversation.history().turns()[4].text(), "three");
}

#[test]
fn rollback_keeps_attachments_out_of_pending() {
    let mut conversation = Conversation::new();
    conversation
        .begin_pending_attachment(Cursor::new(b"data".to_vec()), "notes.md", "text/plain")
        .expect("attach");

    let exchange = conversation.commit_turn("").expect("commit").expect("attachment only");
    exchange.roll_back();

    assert!(conversation.history().is_empty());
    assert!(conversation.pending().is_empty());
}

#[test]
fn full_pending_queue_rejects_before_reading() {
    struct PanicsOnRead;
    impl std::io::Read for PanicsOnRead {
        fn read(&mut self, _buf: &mut [u8]) -> std::io::Result<usize> {
            panic!("source must not be read when the queue is full");
        }
    }

    let mut conversation = Conversation::new();
    let capacity = PendingAttachments::default().capacity();
    for index in 0..capacity {
        conversation
            .pending_mut()
            .push(FileAttachment::new("text/plain", "eA==", Some(format!("{index}.txt"))))
            .expect("below capacity");
    }
    let before = conversation.pending().clone();

    let error = conversation
        .begin_pending_attachment(PanicsOnRead, "overflow.txt", "text/plain")
        .expect_err("queue is full");
    assert!(matches!(error, ConversationError::CapacityReached { limit } if limit == capacity));
    assert_eq!(conversation.pending(), &before);
}

#[test]
fn empty_source_leaves_pending_unchanged() {
    let mut conversation = Conversation::new();
    let error = conversation
        .begin_pending_attachment(Cursor::new(Vec::new()), "empty.txt", "text/plain")
        .expect_err("empty source");
    assert!(matches!(error, ConversationError::EmptySource { .. }));
    assert!(conversation.pending().is_empty());
}

#[test]
fn clear_drops_history_and_pending() {
    let mut conversation = Conversation::with_history(seeded_history());
    conversation
        .begin_pending_attachment(Cursor::new(b"x".to_vec()), "x.txt", "text/plain")
        .expect("attach");

    conversation.clear();

    assert!(conversation.history().is_empty());
    assert!(conversation.pending().is_empty());
}
