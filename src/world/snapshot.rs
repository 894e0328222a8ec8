//! World snapshot handed to the decision core each tick
//!
//! A snapshot is an owned value. Whatever decodes the server stream builds it
//! (or clones it out of a shared store) before the tick starts, so the pipeline
//! never observes a half-updated world.

use serde::{Deserialize, Serialize};

use crate::bot::constants::nav::MASS_DIVISOR;
use crate::util::vec2::Vec2;

/// Entity identifier assigned by the game server
pub type EntityId = u32;

/// A visible cell as decoded from the server
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Entity {
    pub id: EntityId,
    pub x: f64,
    pub y: f64,
    /// Radius in arena units
    pub size: f64,
    /// Virus-like hazard
    #[serde(default)]
    pub is_hazard: bool,
    /// Owned by this agent (one of its own body pieces)
    #[serde(default)]
    pub is_mine: bool,
    #[serde(default)]
    pub name: Option<String>,
}

impl Entity {
    pub fn new(id: EntityId, x: f64, y: f64, size: f64) -> Self {
        Self {
            id,
            x,
            y,
            size,
            is_hazard: false,
            is_mine: false,
            name: None,
        }
    }

    pub fn hazard(id: EntityId, x: f64, y: f64, size: f64) -> Self {
        Self {
            is_hazard: true,
            ..Self::new(id, x, y, size)
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[inline]
    pub fn position(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }
}

/// The agent's primary body piece
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct SelfState {
    pub x: f64,
    pub y: f64,
    pub size: f64,
}

impl SelfState {
    pub fn new(x: f64, y: f64, size: f64) -> Self {
        Self { x, y, size }
    }

    #[inline]
    pub fn position(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    /// Mass as the server reports it on the leaderboard
    #[inline]
    pub fn mass(&self) -> f64 {
        self.size * self.size / MASS_DIVISOR
    }
}

/// Arena bounds
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Bounds {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Bounds {
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }
}

impl Default for Bounds {
    fn default() -> Self {
        // Classic arena size
        Self::new(0.0, 0.0, 11_180.0, 11_180.0)
    }
}

/// Everything the core reads during one tick
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WorldSnapshot {
    /// Timestamp in milliseconds
    pub now_ms: u64,
    /// Primary body piece, absent while dead
    #[serde(default)]
    pub me: Option<SelfState>,
    /// Number of body pieces the agent owns
    #[serde(default)]
    pub owned_pieces: usize,
    #[serde(default)]
    pub entities: Vec<Entity>,
    #[serde(default)]
    pub bounds: Bounds,
}

impl WorldSnapshot {
    pub fn new(now_ms: u64, me: Option<SelfState>, bounds: Bounds) -> Self {
        Self {
            now_ms,
            me,
            owned_pieces: usize::from(me.is_some()),
            entities: Vec::new(),
            bounds,
        }
    }

    pub fn with_entities(mut self, entities: Vec<Entity>) -> Self {
        self.entities = entities;
        self
    }

    /// Parse and validate one snapshot from JSON
    pub fn from_json(text: &str) -> Result<Self, SnapshotError> {
        let snapshot: Self = serde_json::from_str(text)?;
        snapshot.validate()?;
        Ok(snapshot)
    }

    /// Reject snapshots the pipeline cannot reason about
    pub fn validate(&self) -> Result<(), SnapshotError> {
        let b = &self.bounds;
        let corners = [b.min_x, b.min_y, b.max_x, b.max_y];
        if !corners.iter().all(|v| v.is_finite()) {
            return Err(SnapshotError::NonFinite("bounds"));
        }
        if b.min_x > b.max_x || b.min_y > b.max_y {
            return Err(SnapshotError::InvertedBounds);
        }

        if let Some(me) = &self.me {
            if !me.position().is_finite() || !me.size.is_finite() {
                return Err(SnapshotError::NonFinite("me"));
            }
            if me.size <= 0.0 {
                return Err(SnapshotError::InvalidSelfSize(me.size));
            }
        }

        for entity in &self.entities {
            if !entity.position().is_finite() || !entity.size.is_finite() {
                return Err(SnapshotError::NonFiniteEntity(entity.id));
            }
            if entity.size < 0.0 {
                return Err(SnapshotError::NegativeSize(entity.id));
            }
        }

        Ok(())
    }
}

/// Errors raised when a snapshot is rejected at the boundary
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("Malformed snapshot: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Non-finite value in {0}")]
    NonFinite(&'static str),
    #[error("Non-finite position or size on entity {0}")]
    NonFiniteEntity(EntityId),
    #[error("Negative size on entity {0}")]
    NegativeSize(EntityId),
    #[error("Agent size must be positive, got {0}")]
    InvalidSelfSize(f64),
    #[error("Arena bounds are inverted")]
    InvertedBounds,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> WorldSnapshot {
        WorldSnapshot::new(
            1_000,
            Some(SelfState::new(500.0, 500.0, 60.0)),
            Bounds::new(0.0, 0.0, 6_000.0, 6_000.0),
        )
        .with_entities(vec![
            Entity::new(1, 700.0, 500.0, 120.0),
            Entity::hazard(2, 300.0, 300.0, 100.0),
        ])
    }

    #[test]
    fn test_valid_snapshot_passes() {
        assert!(sample().validate().is_ok());
    }

    #[test]
    fn test_json_defaults() {
        let text = r#"{"now_ms": 5, "entities": [{"id": 3, "x": 1.0, "y": 2.0, "size": 10.0}]}"#;
        let snapshot = WorldSnapshot::from_json(text).unwrap();
        assert!(snapshot.me.is_none());
        assert_eq!(snapshot.owned_pieces, 0);
        assert_eq!(snapshot.bounds, Bounds::default());
        assert!(!snapshot.entities[0].is_hazard);
        assert!(!snapshot.entities[0].is_mine);
    }

    #[test]
    fn test_json_missing_required_field() {
        // Entity without a size
        let text = r#"{"now_ms": 5, "entities": [{"id": 3, "x": 1.0, "y": 2.0}]}"#;
        let err = WorldSnapshot::from_json(text).unwrap_err();
        assert!(matches!(err, SnapshotError::Parse(_)));
    }

    #[test]
    fn test_rejects_negative_size() {
        let mut snapshot = sample();
        snapshot.entities[0].size = -1.0;
        assert!(matches!(
            snapshot.validate(),
            Err(SnapshotError::NegativeSize(1))
        ));
    }

    #[test]
    fn test_rejects_nan_position() {
        let mut snapshot = sample();
        snapshot.entities[1].x = f64::NAN;
        assert!(matches!(
            snapshot.validate(),
            Err(SnapshotError::NonFiniteEntity(2))
        ));
    }

    #[test]
    fn test_rejects_inverted_bounds() {
        let mut snapshot = sample();
        snapshot.bounds = Bounds::new(10.0, 0.0, 0.0, 10.0);
        assert!(matches!(
            snapshot.validate(),
            Err(SnapshotError::InvertedBounds)
        ));
    }

    #[test]
    fn test_rejects_zero_self_size() {
        let mut snapshot = sample();
        snapshot.me = Some(SelfState::new(0.0, 0.0, 0.0));
        assert!(matches!(
            snapshot.validate(),
            Err(SnapshotError::InvalidSelfSize(_))
        ));
    }

    #[test]
    fn test_mass() {
        let me = SelfState::new(0.0, 0.0, 100.0);
        assert_eq!(me.mass(), 100.0);
    }
}
