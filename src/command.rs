//! Outgoing commands
//!
//! The pilot produces a [`Decision`]; a sink turns it into whatever the host
//! sends to the game server. `CommandQueue` hands commands from the tick loop
//! to a network task over a bounded crossbeam channel.

use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use serde::Serialize;

use crate::bot::pilot::{Decision, Signal};

/// One instruction for the movement collaborator
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum Command {
    MoveTo { x: f64, y: f64 },
    Split,
    NoSafeDirection,
}

/// Sink errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SinkError {
    /// Queue is full (backpressure)
    #[error("command queue is full")]
    Full,
    /// Receiver dropped (network task stopped)
    #[error("command receiver disconnected")]
    Disconnected,
}

/// Consumer of commands
pub trait CommandSink {
    fn send(&mut self, command: Command) -> Result<(), SinkError>;

    fn move_to(&mut self, x: f64, y: f64) -> Result<(), SinkError> {
        self.send(Command::MoveTo { x, y })
    }

    fn split(&mut self) -> Result<(), SinkError> {
        self.send(Command::Split)
    }

    fn no_safe_direction(&mut self) -> Result<(), SinkError> {
        self.send(Command::NoSafeDirection)
    }
}

impl CommandSink for Vec<Command> {
    fn send(&mut self, command: Command) -> Result<(), SinkError> {
        self.push(command);
        Ok(())
    }
}

impl Decision {
    /// Send splits first, then signals, then the move.
    /// Returns the number of commands sent.
    pub fn dispatch(&self, sink: &mut impl CommandSink) -> Result<usize, SinkError> {
        let mut sent = 0;

        for _ in 0..self.splits {
            sink.split()?;
            sent += 1;
        }
        for signal in &self.signals {
            match signal {
                Signal::NoSafeDirection => sink.no_safe_direction()?,
            }
            sent += 1;
        }
        if let Some(destination) = self.destination {
            sink.move_to(destination.x, destination.y)?;
            sent += 1;
        }

        Ok(sent)
    }
}

/// Bounded command queue between the tick loop and the network side
pub struct CommandQueue {
    sender: Sender<Command>,
    receiver: Receiver<Command>,
    capacity: usize,
}

impl CommandQueue {
    pub fn new(capacity: usize) -> Self {
        let (sender, receiver) = bounded(capacity);
        Self {
            sender,
            receiver,
            capacity,
        }
    }

    /// Sink handle for a tick loop
    pub fn sink(&self) -> ChannelSink {
        ChannelSink {
            sender: self.sender.clone(),
        }
    }

    /// Take every pending command
    pub fn drain(&self) -> Vec<Command> {
        self.receiver.try_iter().collect()
    }

    #[inline]
    pub fn pending_count(&self) -> usize {
        self.receiver.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.receiver.is_empty()
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for CommandQueue {
    fn default() -> Self {
        // A tick sends at most 10 splits, one signal and one move
        Self::new(256)
    }
}

/// Clonable sender half of a [`CommandQueue`]
#[derive(Clone)]
pub struct ChannelSink {
    sender: Sender<Command>,
}

impl ChannelSink {
    pub fn new(sender: Sender<Command>) -> Self {
        Self { sender }
    }
}

impl CommandSink for ChannelSink {
    #[inline]
    fn send(&mut self, command: Command) -> Result<(), SinkError> {
        self.sender.try_send(command).map_err(|e| match e {
            TrySendError::Full(_) => SinkError::Full,
            TrySendError::Disconnected(_) => SinkError::Disconnected,
        })
    }
}
