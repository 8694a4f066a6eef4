//! Incremental reply emission
//!
//! Turns one synthesized reply into an ordered frame stream: metadata
//! frame, content frames in generation order, stop frame. Emission runs
//! on a producer task behind a bounded channel, so each frame yield is a
//! suspension point. The persistence step runs only after the stop frame
//! was accepted by the consumer side - a client that disconnects
//! mid-stream leaves no partial turn behind.

use crate::api::{FrameBuilder, FrameMetadata, StreamFrame};
use futures_util::stream::{self, Stream};
use std::future::Future;
use tokio::sync::mpsc;
use tracing::debug;

/// Split reply text into content deltas of roughly `chunk_chars`
/// characters, never splitting inside a character.
pub fn chunk_text(text: &str, chunk_chars: usize) -> Vec<String> {
    let size = chunk_chars.max(1);
    let chars: Vec<char> = text.chars().collect();
    chars
        .chunks(size)
        .map(|group| group.iter().collect())
        .collect()
}

/// Emit one reply as an ordered frame stream.
///
/// Frame order is fixed: metadata, content deltas, stop. `persist` runs
/// exactly once, after the stop frame was handed off; if the consumer
/// goes away earlier, no frame is emitted past the disconnect and
/// `persist` never runs.
pub fn reply_stream<F>(
    builder: FrameBuilder,
    metadata: FrameMetadata,
    text: String,
    chunk_chars: usize,
    persist: F,
) -> impl Stream<Item = StreamFrame>
where
    F: Future<Output = ()> + Send + 'static,
{
    // Capacity 1 keeps the producer in lockstep with the consumer, so a
    // disconnect is observed on the very next send.
    let (tx, rx) = mpsc::channel::<StreamFrame>(1);

    tokio::spawn(async move {
        if tx.send(builder.metadata_frame(metadata)).await.is_err() {
            debug!("client disconnected before metadata frame");
            return;
        }

        for chunk in chunk_text(&text, chunk_chars) {
            if tx.send(builder.content_frame(chunk)).await.is_err() {
                debug!("client disconnected mid-stream, turn not persisted");
                return;
            }
        }

        if tx.send(builder.stop_frame()).await.is_err() {
            debug!("client disconnected before stop frame, turn not persisted");
            return;
        }

        persist.await;
    });

    stream::unfold(rx, |mut rx| async move {
        rx.recv().await.map(|frame| (frame, rx))
    })
}
