//! End-to-end chat interactions through the update loop.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use ephemera::chat::{ChatMessage, MessageKind};
use ephemera::render::MessageBody;
use ephemera::tea::{update, Message};

use crate::fixtures::{ctrl, key, model, type_str};

#[test]
fn test_link_scenario() {
    let mut model = model();
    type_str(&mut model, "check this out https://example.com/x");
    update(&mut model, key(KeyCode::Enter));

    assert_eq!(model.store.len(), 1);
    assert_eq!(
        model.store.all()[0],
        ChatMessage::link("check this out https://example.com/x", "10:11:12")
    );
    assert!(model.draft.is_empty());
}

#[test]
fn test_text_scenario() {
    let mut model = model();
    type_str(&mut model, "hello world");
    update(&mut model, key(KeyCode::Enter));

    assert_eq!(
        model.store.all(),
        &[ChatMessage::text("hello world", "10:11:12")]
    );
}

#[test]
fn test_pasted_link_is_classified_as_link() {
    let mut model = model();
    update(&mut model, Message::Paste("https://docs.rs/ratatui".to_string()));
    update(&mut model, key(KeyCode::Enter));
    assert_eq!(model.store.all()[0].kind(), MessageKind::Link);
}

#[test]
fn test_multiline_draft_submits_as_one_message() {
    let mut model = model();
    type_str(&mut model, "first");
    update(
        &mut model,
        Message::Key(KeyEvent::new(KeyCode::Enter, KeyModifiers::SHIFT)),
    );
    type_str(&mut model, "second");
    assert!(model.store.is_empty());

    update(&mut model, key(KeyCode::Enter));
    assert_eq!(model.store.all()[0].content(), "first\nsecond");
}

#[test]
fn test_whitespace_submit_changes_nothing() {
    let mut model = model();
    type_str(&mut model, "hi");
    update(&mut model, key(KeyCode::Enter));

    type_str(&mut model, "   ");
    update(&mut model, key(KeyCode::Enter));

    assert_eq!(model.store.len(), 1);
    assert_eq!(model.draft, "   ");
}

#[test]
fn test_emoji_then_submit() {
    let mut model = model();
    type_str(&mut model, "party ");
    update(&mut model, ctrl('e'));
    update(&mut model, key(KeyCode::Char('6')));
    assert!(!model.emoji_picker_visible);

    update(&mut model, key(KeyCode::Enter));
    assert_eq!(model.store.all()[0].content(), "party 🎉");
}

#[test]
fn test_picking_emoji_always_closes_picker() {
    let mut model = model();
    for _ in 0..3 {
        update(&mut model, ctrl('e'));
        assert!(model.emoji_picker_visible);
        update(&mut model, key(KeyCode::Enter));
        assert!(!model.emoji_picker_visible);
    }
    assert_eq!(model.draft, "😀😀😀");
}

#[test]
fn test_clear_then_append() {
    let mut model = model();
    for text in ["a", "b https://b.example", "c"] {
        type_str(&mut model, text);
        update(&mut model, key(KeyCode::Enter));
    }
    assert_eq!(model.store.len(), 3);

    update(&mut model, ctrl('l'));
    assert!(model.store.all().is_empty());

    type_str(&mut model, "fresh");
    update(&mut model, key(KeyCode::Enter));
    assert_eq!(model.store.len(), 1);
}

#[test]
fn test_snapshot_reflects_store_in_order() {
    let mut model = model();
    for text in ["one", "two https://two.example"] {
        type_str(&mut model, text);
        update(&mut model, key(KeyCode::Enter));
    }

    let snapshot = model.snapshot();
    assert_eq!(
        snapshot.messages.iter().map(|m| m.body.clone()).collect::<Vec<_>>(),
        vec![
            MessageBody::Text("one".to_string()),
            MessageBody::Link("two https://two.example".to_string()),
        ]
    );
    assert!(snapshot.messages.iter().all(|m| m.timestamp == "10:11:12"));
}
