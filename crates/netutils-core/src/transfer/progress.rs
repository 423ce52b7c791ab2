//! Per-chunk progress observers.

use super::chunk::ChunkDescriptor;

/// Emitted once per acknowledged chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressEvent {
    /// `(range_end + 1) * 100 / total`, 0..=100.
    pub percent: u8,
    pub range_start: u64,
    pub range_end: u64,
    pub total: u64,
}

impl ProgressEvent {
    pub fn for_chunk(chunk: &ChunkDescriptor, total: u64) -> Self {
        Self {
            percent: chunk.percent_of(total),
            range_start: chunk.start,
            range_end: chunk.end_inclusive,
            total,
        }
    }
}

/// Receives progress from the transfer engine. Called on the transfer thread.
pub trait ProgressSink {
    fn chunk_done(&mut self, event: &ProgressEvent);
}

impl<F: FnMut(&ProgressEvent)> ProgressSink for F {
    fn chunk_done(&mut self, event: &ProgressEvent) {
        self(event)
    }
}

/// Discards progress.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn chunk_done(&mut self, _event: &ProgressEvent) {}
}

/// Forwards every event to an async consumer, waiting while the channel is
/// full. Must be used from a blocking thread (e.g. `spawn_blocking`), never
/// from inside an async task.
#[derive(Debug, Clone)]
pub struct ChannelProgress(pub tokio::sync::mpsc::Sender<ProgressEvent>);

impl ProgressSink for ChannelProgress {
    fn chunk_done(&mut self, event: &ProgressEvent) {
        if self.0.blocking_send(*event).is_err() {
            tracing::debug!(percent = event.percent, "progress receiver gone");
        }
    }
}
