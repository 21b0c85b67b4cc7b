//! Concurrent image uploads land in completion order.

use std::time::Duration;

use crossterm::event::KeyCode;
use tokio::io::AsyncWriteExt;
use tokio::sync::mpsc;

use ephemera::app::{spawn_ingest, IngestContext};
use ephemera::chat::ingest::{encode_data_uri, ingest_reader, DataUri};
use ephemera::chat::MessageKind;
use ephemera::render::MessageBody;
use ephemera::tea::{update, Message};

use crate::fixtures::{clock, ctrl, filler, key, model, png, ImageDir, TIMESTAMP_FORMAT};

const RECV_TIMEOUT: Duration = Duration::from_secs(10);

async fn recv(rx: &mut mpsc::UnboundedReceiver<Message>) -> Message {
    tokio::time::timeout(RECV_TIMEOUT, rx.recv())
        .await
        .expect("Timed out waiting for upload completion")
        .expect("Channel closed")
}

/// Start an upload whose bytes are only available once the returned writer
/// is fed and dropped.
fn gated_upload(
    media_type: &'static str,
    tx: mpsc::UnboundedSender<Message>,
) -> tokio::io::DuplexStream {
    let (writer, reader) = tokio::io::duplex(1024);
    tokio::spawn(async move {
        let clock = clock();
        let msg = match ingest_reader(reader, Some(media_type), &clock, TIMESTAMP_FORMAT).await {
            Ok(message) => Message::ImageIngested {
                message,
                preview: None,
            },
            Err(e) => Message::ImageIngestFailed {
                path: media_type.into(),
                error: e.to_string(),
            },
        };
        let _ = tx.send(msg);
    });
    writer
}

#[tokio::test]
async fn test_ten_byte_upload_produces_one_image() {
    let dir = ImageDir::new();
    let bytes: Vec<u8> = (1..=10).collect();
    let path = dir.write("tiny.png", &bytes);

    let mut model = model();
    let (tx, mut rx) = mpsc::unbounded_channel();
    model.pending_uploads = 1;
    spawn_ingest(path, IngestContext::from_model(&model), tx);

    let msg = recv(&mut rx).await;
    assert!(matches!(msg, Message::ImageIngested { preview: None, .. }));
    update(&mut model, msg);

    assert_eq!(model.store.len(), 1);
    let message = &model.store.all()[0];
    assert_eq!(message.kind(), MessageKind::Image);
    assert_eq!(message.content(), encode_data_uri("image/png", &bytes));
    assert_eq!(message.timestamp(), "10:11:12");

    let uri = DataUri::parse(message.content()).unwrap();
    assert_eq!(uri.decode().unwrap(), bytes);
}

#[tokio::test]
async fn test_later_upload_finishing_first_is_appended_first() {
    let mut model = model();
    let (tx, mut rx) = mpsc::unbounded_channel();
    model.pending_uploads = 2;

    // A starts first but its bytes are held back.
    let mut a_writer = gated_upload("image/png", tx.clone());
    let a_bytes = filler(256 * 1024);

    // B is tiny and completes right away.
    let b_writer = gated_upload("image/gif", tx.clone());
    drop(b_writer);

    let first = recv(&mut rx).await;
    update(&mut model, first);
    assert_eq!(model.store.len(), 1);
    assert!(model.store.all()[0].content().starts_with("data:image/gif;base64,"));

    a_writer.write_all(&a_bytes).await.unwrap();
    drop(a_writer);

    let second = recv(&mut rx).await;
    update(&mut model, second);

    let kinds: Vec<_> = model
        .store
        .all()
        .iter()
        .map(|m| DataUri::parse(m.content()).unwrap().media_type.to_string())
        .collect();
    assert_eq!(kinds, vec!["image/gif", "image/png"]);
    assert_eq!(
        DataUri::parse(model.store.all()[1].content()).unwrap().decoded_len(),
        a_bytes.len()
    );
    assert_eq!(model.pending_uploads, 0);
}

#[tokio::test]
async fn test_concurrent_file_uploads_each_append_once() {
    let dir = ImageDir::new();
    let big = dir.write("big.png", &filler(2 * 1024 * 1024));
    let small = dir.write("small.gif", &filler(10));

    let mut model = model();
    let (tx, mut rx) = mpsc::unbounded_channel();
    model.pending_uploads = 2;

    spawn_ingest(big, IngestContext::from_model(&model), tx.clone());
    spawn_ingest(small, IngestContext::from_model(&model), tx.clone());

    let mut arrival = Vec::new();
    for _ in 0..2 {
        let msg = recv(&mut rx).await;
        if let Message::ImageIngested { ref message, .. } = msg {
            arrival.push(message.clone());
        }
        update(&mut model, msg);
    }

    // Either order is legal; the store must match arrival exactly.
    assert_eq!(arrival.len(), 2);
    assert_eq!(model.store.all(), arrival.as_slice());
    assert_eq!(model.pending_uploads, 0);
}

#[tokio::test]
async fn test_upload_in_flight_during_clear_still_lands() {
    let mut model = model();
    let (tx, mut rx) = mpsc::unbounded_channel();

    update(&mut model, Message::Paste("before clear".to_string()));
    update(&mut model, key(KeyCode::Enter));
    assert_eq!(model.store.len(), 1);

    model.pending_uploads = 1;
    let mut writer = gated_upload("image/webp", tx);

    update(&mut model, ctrl('l'));
    assert!(model.store.is_empty());

    writer.write_all(&filler(64)).await.unwrap();
    drop(writer);
    update(&mut model, recv(&mut rx).await);

    assert_eq!(model.store.len(), 1);
    assert_eq!(model.store.all()[0].kind(), MessageKind::Image);
}

#[tokio::test]
async fn test_missing_file_appends_nothing() {
    let dir = ImageDir::new();
    let mut model = model();
    let (tx, mut rx) = mpsc::unbounded_channel();
    model.pending_uploads = 1;

    spawn_ingest(
        dir.temp_dir.path().join("gone.png"),
        IngestContext::from_model(&model),
        tx,
    );
    let msg = recv(&mut rx).await;
    assert!(matches!(msg, Message::ImageIngestFailed { .. }));

    update(&mut model, msg);
    assert!(model.store.is_empty());
    assert_eq!(model.pending_uploads, 0);
}

#[tokio::test]
async fn test_real_image_arrives_with_a_preview() {
    let dir = ImageDir::new();
    let path = dir.write("photo.png", &png(300, 100));

    let mut model = model();
    model.config.image_tile_width = 30;
    let (tx, mut rx) = mpsc::unbounded_channel();
    model.pending_uploads = 1;
    spawn_ingest(path, IngestContext::from_model(&model), tx);

    update(&mut model, recv(&mut rx).await);
    assert_eq!(model.store.len(), 1);

    let snapshot = model.snapshot();
    let MessageBody::Image {
        media_type,
        preview: Some(preview),
        ..
    } = &snapshot.messages[0].body
    else {
        panic!("expected a decoded image, got {:?}", snapshot.messages[0].body);
    };
    assert_eq!(media_type, "image/png");
    assert_eq!(preview.cell_size(), (30, 5));

    // Later snapshots reuse the same decode.
    let again = model.snapshot();
    assert_eq!(again.messages[0].body, snapshot.messages[0].body);
}
