//! Ally feeding state machine
//!
//! The agent starts out seeking its ally. It gives up once the ally has not
//! been seen for a while and from then on plays on its own.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::bot::classify::{can_split, dwarfed_by};
use crate::bot::constants::{feeding, nav::INITIAL_TARGET, ratio};
use crate::util::vec2::Vec2;
use crate::world::snapshot::{Entity, SelfState};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedingMode {
    Autonomous,
    SeekingAlly,
}

/// Feeding state carried from one tick to the next
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedingState {
    pub mode: FeedingMode,
    pub last_ally_contact_ms: u64,
    /// Last place the ally was seen. Follows the agent's own destination once autonomous.
    pub ally_location: Vec2,
    /// Set by a burst, consumed by the next move onto the ally
    pub split_pending: bool,
    /// Set by the host while this agent is itself heading to one it feeds
    pub heading_to_subordinate: bool,
}

impl FeedingState {
    pub fn new(now_ms: u64) -> Self {
        Self {
            mode: FeedingMode::SeekingAlly,
            last_ally_contact_ms: now_ms,
            ally_location: Vec2::new(INITIAL_TARGET.0, INITIAL_TARGET.1),
            split_pending: false,
            heading_to_subordinate: false,
        }
    }

    #[inline]
    pub fn is_seeking(&self) -> bool {
        self.mode == FeedingMode::SeekingAlly
    }

    /// Give up on the ally after `timeout_ms` without contact.
    /// Returns true when the mode changed.
    pub fn expire(&mut self, now_ms: u64, timeout_ms: u64) -> bool {
        if self.is_seeking() && now_ms.saturating_sub(self.last_ally_contact_ms) > timeout_ms {
            self.mode = FeedingMode::Autonomous;
            info!(
                "No ally contact for {}ms, switching to autonomous",
                now_ms.saturating_sub(self.last_ally_contact_ms)
            );
            return true;
        }
        false
    }

    pub fn record_contact(&mut self, now_ms: u64, position: Vec2) {
        self.last_ally_contact_ms = now_ms;
        self.ally_location = position;
    }

    /// The agent outweighs the ally, touches it and is not busy elsewhere
    pub fn should_burst(&self, me: &SelfState, ally: &Entity) -> bool {
        if !self.is_seeking() || self.heading_to_subordinate {
            return false;
        }
        let distance = me.position().distance_to(ally.position());
        let edge = (distance - ally.size).abs();
        dwarfed_by(ally.size, me.size, ratio::THREAT) && edge <= feeding::CONTACT_DISTANCE
    }

    /// Fire a burst into the ally. Returns the number of splits.
    pub fn burst(&mut self, me_size: f64, ally_size: f64) -> u32 {
        let splits = burst_splits(me_size, ally_size);
        self.split_pending = true;
        info!(
            "Feeding burst: {} splits into ally of size {:.0}",
            splits, ally_size
        );
        splits
    }

    /// Once autonomous the remembered ally location tracks our own target
    pub fn track_destination(&mut self, destination: Vec2) {
        if !self.is_seeking() {
            self.ally_location = destination;
        }
    }
}

/// Number of halvings before the ally is no longer worth splitting on.
/// Always at least one, never more than the burst cap.
pub fn burst_splits(me_size: f64, ally_size: f64) -> u32 {
    let mut remaining = me_size;
    let mut splits = 0;

    while splits == 0 || can_split(ally_size, remaining) {
        remaining /= 2.0;
        splits += 1;
        if splits >= feeding::MAX_BURST_SPLITS {
            break;
        }
    }

    splits
}
