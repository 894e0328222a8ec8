//! Per-tick decision pipeline
//!
//! ```text
//! snapshot ─▶ classify ─▶ cluster food ─▶ obstacle sectors ─▶ merge ─▶ select
//!                 │                                                      ▲
//!                 └──────────────────── feeding ─────────────────────────┘
//! ```
//!
//! The pilot itself is stateless. Everything that survives a tick lives in
//! [`Memory`], which is passed in and handed back.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::bot::classify::{classify, AllyIdentity};
use crate::bot::constants::nav::INITIAL_TARGET;
use crate::bot::destination::{select, AllySighting, Destination, Route, Situation};
use crate::bot::feeding::FeedingState;
use crate::bot::food::{cluster_food, discard_near};
use crate::bot::obstacles::{ObstacleMap, WallRule};
use crate::config::BotConfig;
use crate::world::snapshot::WorldSnapshot;

/// State carried between ticks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Memory {
    pub feeding: FeedingState,
    pub previous_destination: Destination,
}

impl Memory {
    pub fn new(now_ms: u64) -> Self {
        Self {
            feeding: FeedingState::new(now_ms),
            previous_destination: Destination::new(INITIAL_TARGET.0, INITIAL_TARGET.1),
        }
    }
}

/// Out-of-band conditions the host may want to escalate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Signal {
    /// Must-avoid sectors would have covered every bearing
    NoSafeDirection,
}

/// Result of one tick
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Decision {
    /// `None` when the agent is dead and nothing was decided
    pub destination: Option<Destination>,
    pub route: Option<Route>,
    /// Split commands to send before moving
    pub splits: u32,
    pub signals: Vec<Signal>,
}

impl Decision {
    pub fn is_idle(&self) -> bool {
        self.destination.is_none()
    }
}

/// Decision core for one agent
#[derive(Debug, Clone)]
pub struct Pilot {
    config: BotConfig,
    ally: AllyIdentity,
}

impl Pilot {
    pub fn new(config: BotConfig) -> Self {
        let ally = config.ally();
        Self { config, ally }
    }

    pub fn config(&self) -> &BotConfig {
        &self.config
    }

    /// Run the whole pipeline on one snapshot
    pub fn tick(&self, memory: Memory, snapshot: &WorldSnapshot) -> (Memory, Decision) {
        let Some(me) = snapshot.me else {
            return (memory, Decision::default());
        };

        let mut memory = memory;
        let now = snapshot.now_ms;
        let origin = me.position();
        let mut decision = Decision::default();

        memory.feeding.expire(now, self.config.ally_timeout_ms);
        let seeking = memory.feeding.is_seeking();

        let cells = classify(&me, &snapshot.entities, &self.ally, seeking);

        let ally = cells.ally.map(|ally| {
            memory.feeding.record_contact(now, ally.position());
            if memory.feeding.should_burst(&me, ally) {
                decision.splits = memory.feeding.burst(me.size, ally.size);
            }
            let position = ally.position();
            AllySighting {
                position,
                edge_distance: (origin.distance_to(position) - ally.size).abs(),
            }
        });

        let mut clusters = cluster_food(
            cells.food().map(|e| (e.position(), e.size)),
            origin,
            me.size,
        );

        let obstacles = ObstacleMap::build(
            &me,
            &cells.threats,
            &cells.hazards,
            &snapshot.bounds,
            seeking,
            WallRule {
                margin: self.config.wall_margin,
                policy: self.config.wall_policy,
            },
        );
        discard_near(&mut clusters, &obstacles.dangers);

        let merged = obstacles.merge();
        if merged.must_avoid.is_enclosed() {
            warn!(
                "Mayday: {} of {} must-avoid sectors would close every direction",
                merged.must_avoid.enclosed, obstacles.must_avoid.len()
            );
            decision.signals.push(Signal::NoSafeDirection);
        }

        let (destination, route) = select(&Situation {
            origin,
            mass: me.mass(),
            owned_pieces: snapshot.owned_pieces,
            seeking_ally: seeking,
            split_pending: memory.feeding.split_pending,
            ally,
            ally_location: memory.feeding.ally_location,
            obstacles: &merged,
            must_avoid_requested: obstacles.has_must_avoid(),
            clusters: &clusters,
            previous: memory.previous_destination,
            lookahead: self.config.lookahead,
        });

        if route == Route::FeedAlly {
            memory.feeding.split_pending = false;
        }
        memory.feeding.track_destination(destination.position());
        memory.previous_destination = destination;

        debug!(
            "Tick {}: {:?} to ({:.0}, {:.0})",
            now, route, destination.x, destination.y
        );

        decision.destination = Some(destination);
        decision.route = Some(route);
        (memory, decision)
    }
}
