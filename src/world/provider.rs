//! Snapshot providers
//!
//! The decision core only ever sees owned snapshots. Providers are the seam
//! between whatever decodes the game stream and the tick loop.

use std::collections::VecDeque;
use std::io::{self, BufRead};
use std::sync::Arc;
use std::thread;

use crossbeam_channel::{bounded, Receiver, TryRecvError};
use parking_lot::RwLock;
use tracing::{debug, info, warn};

use crate::world::snapshot::WorldSnapshot;

/// Source of world snapshots, polled once per tick
pub trait SnapshotProvider {
    /// Next snapshot to decide on, or `None` when nothing is available this tick
    fn next_snapshot(&mut self) -> Option<WorldSnapshot>;

    /// True once no further snapshots will ever arrive
    fn is_exhausted(&self) -> bool {
        false
    }
}

/// Shared world store written by an event-driven decoder
///
/// Writers replace the whole snapshot under the write lock; readers clone it
/// under the read lock, so a tick always works on a consistent copy.
#[derive(Clone, Default)]
pub struct SharedWorld {
    inner: Arc<RwLock<Option<WorldSnapshot>>>,
}

impl SharedWorld {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the current world state
    pub fn publish(&self, snapshot: WorldSnapshot) {
        *self.inner.write() = Some(snapshot);
    }

    /// Copy of the latest published world state
    pub fn read(&self) -> Option<WorldSnapshot> {
        self.inner.read().clone()
    }
}

impl SnapshotProvider for SharedWorld {
    fn next_snapshot(&mut self) -> Option<WorldSnapshot> {
        self.read()
    }
}

/// Plays back a fixed sequence of snapshots
#[derive(Debug, Default)]
pub struct ReplayProvider {
    frames: VecDeque<WorldSnapshot>,
}

impl ReplayProvider {
    pub fn new(frames: impl IntoIterator<Item = WorldSnapshot>) -> Self {
        Self {
            frames: frames.into_iter().collect(),
        }
    }

    pub fn remaining(&self) -> usize {
        self.frames.len()
    }
}

impl SnapshotProvider for ReplayProvider {
    fn next_snapshot(&mut self) -> Option<WorldSnapshot> {
        self.frames.pop_front()
    }

    fn is_exhausted(&self) -> bool {
        self.frames.is_empty()
    }
}

/// Reads one JSON snapshot per line
///
/// Malformed lines are rejected at the boundary and skipped.
pub struct JsonLinesProvider<R> {
    reader: R,
    line: String,
    line_number: usize,
    rejected: usize,
    finished: bool,
}

impl<R: BufRead> JsonLinesProvider<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            line: String::new(),
            line_number: 0,
            rejected: 0,
            finished: false,
        }
    }

    /// Number of lines rejected so far
    pub fn rejected(&self) -> usize {
        self.rejected
    }
}

impl<R: BufRead> SnapshotProvider for JsonLinesProvider<R> {
    fn next_snapshot(&mut self) -> Option<WorldSnapshot> {
        while !self.finished {
            self.line.clear();
            match self.reader.read_line(&mut self.line) {
                Ok(0) => {
                    self.finished = true;
                    break;
                }
                Ok(_) => {}
                Err(e) => {
                    warn!("Snapshot stream read error: {}", e);
                    self.finished = true;
                    break;
                }
            }
            self.line_number += 1;

            let text = self.line.trim();
            if text.is_empty() {
                continue;
            }

            match WorldSnapshot::from_json(text) {
                Ok(snapshot) => return Some(snapshot),
                Err(e) => {
                    self.rejected += 1;
                    warn!("Rejected snapshot on line {}: {}", self.line_number, e);
                }
            }
        }
        None
    }

    fn is_exhausted(&self) -> bool {
        self.finished
    }
}

impl<R> Drop for JsonLinesProvider<R> {
    fn drop(&mut self) {
        if self.rejected > 0 {
            debug!(
                "Snapshot stream closed after {} lines ({} rejected)",
                self.line_number, self.rejected
            );
        }
    }
}

/// JSON lines decoded on a background reader thread
///
/// Reads block on the reader thread only. Polling never waits, so the tick loop
/// keeps running (and can be cancelled) while the input is idle.
pub struct StreamProvider {
    receiver: Receiver<WorldSnapshot>,
    finished: bool,
}

impl StreamProvider {
    pub fn spawn<R>(reader: R) -> io::Result<Self>
    where
        R: BufRead + Send + 'static,
    {
        // One snapshot in flight keeps file playback at one line per tick
        let (sender, receiver) = bounded(1);
        thread::Builder::new()
            .name("snapshot-reader".into())
            .spawn(move || {
                let mut lines = JsonLinesProvider::new(reader);
                while let Some(snapshot) = lines.next_snapshot() {
                    if sender.send(snapshot).is_err() {
                        return;
                    }
                }
                info!("Snapshot input closed ({} rejected)", lines.rejected());
            })?;

        Ok(Self {
            receiver,
            finished: false,
        })
    }
}

impl SnapshotProvider for StreamProvider {
    fn next_snapshot(&mut self) -> Option<WorldSnapshot> {
        match self.receiver.try_recv() {
            Ok(snapshot) => Some(snapshot),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => {
                self.finished = true;
                None
            }
        }
    }

    fn is_exhausted(&self) -> bool {
        self.finished
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::snapshot::{Bounds, SelfState};
    use std::io::Cursor;

    fn frame(now_ms: u64) -> WorldSnapshot {
        WorldSnapshot::new(
            now_ms,
            Some(SelfState::new(100.0, 100.0, 50.0)),
            Bounds::default(),
        )
    }

    #[test]
    fn test_shared_world_empty_until_published() {
        let mut world = SharedWorld::new();
        assert!(world.next_snapshot().is_none());
        assert!(!world.is_exhausted());

        world.publish(frame(10));
        assert_eq!(world.next_snapshot().unwrap().now_ms, 10);
    }

    #[test]
    fn test_shared_world_read_is_a_copy() {
        let world = SharedWorld::new();
        world.publish(frame(1));

        let copy = world.read().unwrap();
        world.publish(frame(2));

        // The earlier copy is unaffected by later writes
        assert_eq!(copy.now_ms, 1);
        assert_eq!(world.read().unwrap().now_ms, 2);
    }

    #[test]
    fn test_shared_world_across_threads() {
        let world = SharedWorld::new();
        let writer = world.clone();

        let handle = std::thread::spawn(move || {
            for t in 0..100 {
                writer.publish(frame(t));
            }
        });
        handle.join().unwrap();

        assert_eq!(world.read().unwrap().now_ms, 99);
    }

    #[test]
    fn test_replay_provider_order() {
        let mut replay = ReplayProvider::new(vec![frame(1), frame(2)]);
        assert_eq!(replay.remaining(), 2);
        assert_eq!(replay.next_snapshot().unwrap().now_ms, 1);
        assert_eq!(replay.next_snapshot().unwrap().now_ms, 2);
        assert!(replay.is_exhausted());
        assert!(replay.next_snapshot().is_none());
    }

    #[test]
    fn test_json_lines_skips_malformed() {
        let input = [
            r#"{"now_ms": 1}"#,
            "",
            "not json",
            r#"{"now_ms": 2, "entities": [{"id": 1, "x": 0, "y": 0, "size": -4}]}"#,
            r#"{"now_ms": 3}"#,
        ]
        .join("\n");

        let mut provider = JsonLinesProvider::new(Cursor::new(input));
        assert_eq!(provider.next_snapshot().unwrap().now_ms, 1);
        assert_eq!(provider.next_snapshot().unwrap().now_ms, 3);
        assert!(!provider.is_exhausted());
        assert!(provider.next_snapshot().is_none());
        assert!(provider.is_exhausted());
        assert_eq!(provider.rejected(), 2);
    }

    #[test]
    fn test_stream_provider_drains_then_exhausts() {
        let lines = [r#"{"now_ms": 1}"#, "garbage", r#"{"now_ms": 2}"#];
        let input = lines.join("\n");
        let mut provider = StreamProvider::spawn(Cursor::new(input)).unwrap();

        let mut seen = Vec::new();
        for _ in 0..2_000 {
            if provider.is_exhausted() {
                break;
            }
            match provider.next_snapshot() {
                Some(snapshot) => seen.push(snapshot.now_ms),
                None => std::thread::sleep(std::time::Duration::from_millis(1)),
            }
        }

        assert!(provider.is_exhausted());
        assert_eq!(seen, vec![1, 2]);
    }
}
