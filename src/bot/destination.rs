//! Destination selection
//!
//! Turns the merged obstacle sets, food clusters and ally state into one
//! point to move toward. Steps are tried in a fixed order and the first that
//! applies wins.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::bot::constants::{feeding::CONTACT_DISTANCE, nav::ALLY_FOLLOW_MIN_MASS};
use crate::bot::food::{best_cluster, FoodCluster};
use crate::bot::obstacles::MergedObstacles;
use crate::bot::sectors::{AngleSector, SectorSet};
use crate::util::angle::sweep;
use crate::util::vec2::Vec2;

/// Point the agent is told to move toward
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Destination {
    pub x: f64,
    pub y: f64,
}

impl Destination {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    #[inline]
    pub fn position(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }
}

impl From<Vec2> for Destination {
    fn from(v: Vec2) -> Self {
        Self::new(v.x, v.y)
    }
}

/// Which step produced the destination
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Route {
    /// Straight onto the ally, no avoidance
    FeedAlly,
    /// Boxed in while seeking: head for the last known ally location
    FollowAlly,
    /// Bisector of the widest free sector
    Escape,
    /// Encircled: keep the previous destination
    Hold,
    /// Best food cluster
    Forage,
    /// Nothing to do: keep the previous destination
    Drift,
}

/// Ally seen this tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AllySighting {
    pub position: Vec2,
    /// Distance from the agent's centre to the ally's edge
    pub edge_distance: f64,
}

/// Everything the selector looks at
#[derive(Debug, Clone, Copy)]
pub struct Situation<'a> {
    pub origin: Vec2,
    pub mass: f64,
    pub owned_pieces: usize,
    pub seeking_ally: bool,
    pub split_pending: bool,
    pub ally: Option<AllySighting>,
    pub ally_location: Vec2,
    pub obstacles: &'a MergedObstacles,
    /// Whether any must-avoid sector was queued, merged or not
    pub must_avoid_requested: bool,
    pub clusters: &'a [FoodCluster],
    pub previous: Destination,
    pub lookahead: f64,
}

/// Move `bearing` off the first soft arc containing it.
///
/// The nearer edge of the arc is used when it lies inside `allowed`,
/// otherwise the far edge.
pub fn shift_bearing(soft: &SectorSet, bearing: f64, allowed: AngleSector) -> f64 {
    for arc in soft.sectors() {
        if !arc.contains(bearing) {
            continue;
        }

        let start = arc.start;
        let end = arc.end();
        let to_start = sweep(start, bearing);
        let to_end = sweep(bearing, end);

        let (near, far) = if to_start < to_end { (start, end) } else { (end, start) };
        return if allowed.contains(near) { near } else { far };
    }
    bearing
}

/// Widest free sector; the first one wins ties
pub fn widest_gap(gaps: &[AngleSector]) -> Option<AngleSector> {
    let mut widest: Option<AngleSector> = None;
    for gap in gaps {
        if widest.map_or(true, |w| gap.span > w.span) {
            widest = Some(*gap);
        }
    }
    widest
}

/// Choose where to go this tick
pub fn select(s: &Situation<'_>) -> (Destination, Route) {
    let soft = &s.obstacles.prefer_avoid;

    if let Some(ally) = s.ally {
        if s.split_pending || s.owned_pieces > 1 || ally.edge_distance <= CONTACT_DISTANCE {
            return (ally.position.into(), Route::FeedAlly);
        }
    }

    let gaps = s.obstacles.must_avoid.set.gaps();

    if s.seeking_ally && gaps.is_empty() && s.mass > ALLY_FOLLOW_MIN_MASS {
        let target = s.ally_location;
        let bearing = shift_bearing(soft, s.origin.bearing_to(target), AngleSector::full());
        debug!("Heading for ally at ({:.0}, {:.0})", target.x, target.y);
        let distance = s.origin.distance_to(target);
        let destination = s.origin.follow_bearing(bearing, distance);
        return (destination.into(), Route::FollowAlly);
    }

    if let Some(gap) = widest_gap(&gaps) {
        let bearing = shift_bearing(soft, gap.bisector(), gap);
        let destination = s.origin.follow_bearing(bearing, s.lookahead);
        return (destination.into(), Route::Escape);
    }

    if s.must_avoid_requested {
        let held = s.previous;
        debug!("No free direction, holding ({:.0}, {:.0})", held.x, held.y);
        return (held, Route::Hold);
    }

    if let Some(cluster) = best_cluster(s.clusters, s.origin) {
        let bearing = shift_bearing(soft, cluster.bearing, AngleSector::full());
        let distance = s.origin.distance_to(cluster.position);
        let destination = s.origin.follow_bearing(bearing, distance);
        return (destination.into(), Route::Forage);
    }

    (s.previous, Route::Drift)
}
