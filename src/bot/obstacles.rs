//! Obstacle sectors
//!
//! Every threat, hazard and nearby wall is turned into an arc of bearings,
//! seen from the agent, that the agent should not travel along.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::bot::classify::can_split;
use crate::bot::constants::reach;
use crate::bot::sectors::{
    merge_by_priority, AngleSector, Insertion, MergeOutcome, SectorSet, TaggedSector,
};
use crate::util::vec2::Vec2;
use crate::world::snapshot::{Bounds, Entity, SelfState};

/// Distances from the agent to one threat
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThreatDistance {
    /// Centre to centre
    pub absolute: f64,
    /// Agent centre to the threat's edge
    pub relative: f64,
    /// Reach of a split attack
    pub split: f64,
    /// Reach without splitting
    pub danger: f64,
    /// Width of the soft buffer beyond either reach
    pub shift: f64,
}

impl ThreatDistance {
    pub fn measure(me: &SelfState, threat: &Entity) -> Self {
        let absolute = me.position().distance_to(threat.position());
        Self {
            absolute,
            relative: (absolute - threat.size).abs(),
            split: threat.size + reach::SPLIT_DISTANCE + reach::SAFETY_PADDING,
            danger: threat.size + reach::SAFETY_PADDING,
            shift: me.size,
        }
    }
}

/// Arc between the two tangent lines from `from` to a circle of `radius` around `centre`
///
/// When `from` is inside the circle the radius is pulled to just under the
/// distance. If that leaves nothing (the two points coincide) every bearing is blocked.
pub fn tangent_sector(from: Vec2, centre: Vec2, radius: f64) -> AngleSector {
    let distance = from.distance_to(centre);
    let mut radius = radius;

    if distance <= radius {
        radius = distance - reach::TANGENT_CLAMP;
        if radius <= 0.0 {
            return AngleSector::full();
        }
    }

    let bearing = from.bearing_to(centre);
    if radius <= 0.0 {
        return AngleSector::new(bearing, 0.0);
    }

    let half = (radius / distance).min(1.0).asin().to_degrees();
    AngleSector::new(bearing - half, 2.0 * half)
}

/// When walls are added to the must-avoid queue
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WallPolicy {
    /// Whenever the agent is within the margin
    #[default]
    Always,
    /// Only when some threat already demands a must-avoid sector
    WithThreats,
}

#[derive(Debug, thiserror::Error)]
#[error("Unknown wall policy '{0}' (expected 'always' or 'with-threats')")]
pub struct UnknownWallPolicy(pub String);

impl FromStr for WallPolicy {
    type Err = UnknownWallPolicy;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "always" => Ok(Self::Always),
            "with-threats" | "with_threats" => Ok(Self::WithThreats),
            other => Err(UnknownWallPolicy(other.to_string())),
        }
    }
}

impl fmt::Display for WallPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Always => write!(f, "always"),
            Self::WithThreats => write!(f, "with-threats"),
        }
    }
}

/// Half-planes facing each wall closer than `margin`, tagged with the
/// perpendicular distance to that wall
pub fn wall_sectors(position: Vec2, bounds: &Bounds, margin: f64) -> Vec<TaggedSector> {
    let mut walls = Vec::with_capacity(4);
    let half_plane = |start: f64, end: f64, distance: f64| {
        TaggedSector::new(AngleSector::between(start, end), distance.abs())
    };

    let left = position.x - bounds.min_x;
    if left < margin {
        walls.push(half_plane(90.0, 270.0, left));
    }
    let top = position.y - bounds.min_y;
    if top < margin {
        walls.push(half_plane(180.0, 0.0, top));
    }
    let right = bounds.max_x - position.x;
    if right < margin {
        walls.push(half_plane(270.0, 90.0, right));
    }
    let bottom = bounds.max_y - position.y;
    if bottom < margin {
        walls.push(half_plane(0.0, 180.0, bottom));
    }

    walls
}

/// Wall settings for one build
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WallRule {
    pub margin: f64,
    pub policy: WallPolicy,
}

/// Obstacle arcs for one tick, before merging
#[derive(Debug, Clone, Default)]
pub struct ObstacleMap {
    /// Hard constraints, merged in ascending priority
    pub must_avoid: Vec<TaggedSector>,
    /// Soft buffers, merged in the order they were found
    pub prefer_avoid: Vec<AngleSector>,
    /// Threat centres and the radius food must keep from them
    pub dangers: Vec<(Vec2, f64)>,
    /// Must-avoid sectors contributed by threats
    pub threat_sectors: usize,
}

impl ObstacleMap {
    /// Build obstacle arcs around `me`.
    ///
    /// Threat split capability is ignored while `seeking_ally`.
    pub fn build(
        me: &SelfState,
        threats: &[&Entity],
        hazards: &[&Entity],
        bounds: &Bounds,
        seeking_ally: bool,
        walls: WallRule,
    ) -> Self {
        let origin = me.position();
        let mut map = Self::default();

        for threat in threats {
            let distance = ThreatDistance::measure(me, threat);
            let splits = !seeking_ally && can_split(me.size, threat.size);
            let centre = threat.position();
            let reach = if splits { distance.split } else { distance.danger };

            map.dangers.push((centre, reach));

            if distance.absolute < reach {
                map.must_avoid.push(TaggedSector::new(
                    tangent_sector(origin, centre, reach),
                    distance.relative,
                ));
                map.threat_sectors += 1;
            } else if distance.absolute < reach + distance.shift {
                let buffer = tangent_sector(origin, centre, reach + distance.shift);
                map.prefer_avoid.push(buffer);
            }
        }

        for hazard in hazards {
            let centre = hazard.position();
            let distance = origin.distance_to(centre);
            let edge = (distance - hazard.size).abs();

            let (trigger, radius) = if me.size < hazard.size {
                (hazard.size * 2.0, hazard.size + reach::HAZARD_PADDING)
            } else {
                (me.size * 2.0, me.size + reach::HAZARD_POP_PADDING)
            };

            if distance < trigger {
                let sector = tangent_sector(origin, centre, radius);
                map.must_avoid.push(TaggedSector::new(sector, edge));
            }
        }

        let add_walls = match walls.policy {
            WallPolicy::Always => true,
            WallPolicy::WithThreats => map.threat_sectors > 0,
        };
        if add_walls {
            map.must_avoid
                .extend(wall_sectors(origin, bounds, walls.margin));
        }

        map
    }

    pub fn has_must_avoid(&self) -> bool {
        !self.must_avoid.is_empty()
    }

    /// Merge both queues
    pub fn merge(&self) -> MergedObstacles {
        MergedObstacles {
            must_avoid: merge_by_priority(self.must_avoid.clone()),
            prefer_avoid: merge_soft(&self.prefer_avoid),
        }
    }
}

/// Merged obstacle sets for one tick
#[derive(Debug, Clone, Default)]
pub struct MergedObstacles {
    pub must_avoid: MergeOutcome,
    pub prefer_avoid: SectorSet,
}

/// Merge soft buffers in order. A buffer that would close the circle drops
/// every soft constraint for this tick.
pub fn merge_soft(sectors: &[AngleSector]) -> SectorSet {
    let mut set = SectorSet::new();
    for sector in sectors {
        if set.insert(*sector) == Insertion::Enclosed {
            debug!("Soft buffers enclose the agent, ignoring them");
            set.clear();
            break;
        }
    }
    set
}
