//! Circular interval merging over bearings in [0, 360)
//!
//! A `SectorSet` is a sorted list of tagged boundaries. Read cyclically the
//! kinds alternate Opening, Closing, Opening, ... and every Opening/Closing
//! pair encloses one blocked arc. When an arc wraps through 0° the list starts
//! with that arc's Closing boundary.

use serde::Serialize;
use smallvec::SmallVec;

use crate::util::angle::{sweep, wrap_degrees, FULL_TURN};

/// Arc of bearings, counter-clockwise from `start` for `span` degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AngleSector {
    pub start: f64,
    pub span: f64,
}

impl AngleSector {
    pub fn new(start: f64, span: f64) -> Self {
        Self {
            start: wrap_degrees(start),
            span: span.clamp(0.0, FULL_TURN),
        }
    }

    /// Arc sweeping counter-clockwise from `start` to `end`
    pub fn between(start: f64, end: f64) -> Self {
        Self::new(start, sweep(start, end))
    }

    pub fn full() -> Self {
        Self {
            start: 0.0,
            span: FULL_TURN,
        }
    }

    #[inline]
    pub fn end(&self) -> f64 {
        wrap_degrees(self.start + self.span)
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.span >= FULL_TURN
    }

    /// Closed membership test (edges count as inside)
    pub fn contains(&self, bearing: f64) -> bool {
        self.is_full() || sweep(self.start, bearing) <= self.span
    }

    pub fn bisector(&self) -> f64 {
        wrap_degrees(self.start + self.span / 2.0)
    }
}

/// Sector queued for merging; lower priority merges first
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TaggedSector {
    pub sector: AngleSector,
    pub priority: f64,
}

impl TaggedSector {
    pub fn new(sector: AngleSector, priority: f64) -> Self {
        Self { sector, priority }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BoundaryKind {
    Opening,
    Closing,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Boundary {
    pub angle: f64,
    pub kind: BoundaryKind,
}

impl Boundary {
    fn opening(angle: f64) -> Self {
        Self {
            angle,
            kind: BoundaryKind::Opening,
        }
    }

    fn closing(angle: f64) -> Self {
        Self {
            angle,
            kind: BoundaryKind::Closing,
        }
    }
}

/// Result of inserting one sector
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Insertion {
    /// The set now holds the union
    Merged,
    /// Zero-width sector, nothing to do
    Ignored,
    /// The union would cover the whole circle. The set is left unchanged.
    Enclosed,
}

/// Union of disjoint blocked arcs
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SectorSet {
    boundaries: SmallVec<[Boundary; 16]>,
}

impl SectorSet {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.boundaries.is_empty()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.boundaries.len()
    }

    pub fn boundaries(&self) -> &[Boundary] {
        &self.boundaries
    }

    pub fn clear(&mut self) {
        self.boundaries.clear();
    }

    /// First boundary reached when walking counter-clockwise from `origin`,
    /// skipping boundaries closer than `offset`. Wraps past 360°.
    /// Returns the boundary and its sweep from `origin`.
    fn next_from(&self, origin: f64, offset: f64) -> Option<(Boundary, f64)> {
        let mut ahead: Option<(Boundary, f64)> = None;
        let mut nearest: Option<(Boundary, f64)> = None;

        for &boundary in &self.boundaries {
            let d = sweep(origin, boundary.angle);
            if nearest.map_or(true, |(_, n)| d < n) {
                nearest = Some((boundary, d));
            }
            if d >= offset && ahead.map_or(true, |(_, a)| d < a) {
                ahead = Some((boundary, d));
            }
        }

        ahead.or(nearest)
    }

    /// Whether the point `offset` degrees past `origin` lies in a blocked arc
    fn covers_at(&self, origin: f64, offset: f64) -> bool {
        match self.next_from(origin, offset) {
            None => false,
            Some((boundary, d)) => match boundary.kind {
                BoundaryKind::Closing => true,
                BoundaryKind::Opening => d == offset,
            },
        }
    }

    /// Closed membership test: arc edges count as blocked
    pub fn contains(&self, bearing: f64) -> bool {
        self.covers_at(wrap_degrees(bearing), 0.0)
    }

    /// Add a sector to the union
    pub fn insert(&mut self, sector: AngleSector) -> Insertion {
        if !(sector.span > 0.0) {
            return Insertion::Ignored;
        }
        if sector.is_full() {
            return Insertion::Enclosed;
        }

        let start = sector.start;
        let span = sector.span;
        let end = sector.end();

        // Edges already inside a blocked arc are subsumed
        let start_covered = self.covers_at(start, 0.0);
        let end_covered = self.covers_at(start, span);

        // Boundaries inside the new arc become internal. An Opening sitting on the
        // new start or a Closing sitting on the new end is the merged edge itself.
        let mut merged: SmallVec<[Boundary; 16]> = self
            .boundaries
            .iter()
            .copied()
            .filter(|b| {
                let d = sweep(start, b.angle);
                if d > span {
                    return true;
                }
                (d == 0.0 && b.kind == BoundaryKind::Opening)
                    || (d == span && b.kind == BoundaryKind::Closing)
            })
            .collect();

        if !start_covered {
            let at = merged.partition_point(|b| b.angle < start);
            merged.insert(at, Boundary::opening(start));
        }
        if !end_covered {
            let at = merged.partition_point(|b| b.angle < end);
            merged.insert(at, Boundary::closing(end));
        }

        // Both edges subsumed and nothing left open: the circle is closed
        if merged.is_empty() {
            return Insertion::Enclosed;
        }

        self.boundaries = merged;
        debug_assert!(self.is_well_formed(), "malformed sector set {:?}", self);
        Insertion::Merged
    }

    /// Blocked arcs
    pub fn sectors(&self) -> Vec<AngleSector> {
        self.pairs(BoundaryKind::Opening)
    }

    /// Free arcs between blocked ones. Empty when nothing is blocked.
    pub fn gaps(&self) -> Vec<AngleSector> {
        self.pairs(BoundaryKind::Closing)
    }

    fn pairs(&self, from: BoundaryKind) -> Vec<AngleSector> {
        let n = self.boundaries.len();
        self.boundaries
            .iter()
            .enumerate()
            .filter(|(_, b)| b.kind == from)
            .map(|(i, b)| {
                let next = self.boundaries[(i + 1) % n];
                AngleSector::between(b.angle, next.angle)
            })
            .collect()
    }

    /// Total blocked degrees
    pub fn coverage(&self) -> f64 {
        self.sectors().iter().map(|s| s.span).sum()
    }

    /// Sorted, even, and alternating when read cyclically
    pub fn is_well_formed(&self) -> bool {
        let n = self.boundaries.len();
        if n % 2 != 0 {
            return false;
        }
        let b = &self.boundaries;
        let sorted = b.windows(2).all(|w| w[0].angle <= w[1].angle);
        let kind = |i: usize| b[i % n].kind;
        let alternating = (0..n).all(|i| kind(i) != kind(i + 1));
        sorted && alternating
    }
}

/// Merged set plus how many sectors were refused for closing the circle
#[derive(Debug, Clone, Default)]
pub struct MergeOutcome {
    pub set: SectorSet,
    pub enclosed: usize,
}

impl MergeOutcome {
    #[inline]
    pub fn is_enclosed(&self) -> bool {
        self.enclosed > 0
    }
}

/// Merge sectors in ascending priority order.
///
/// A sector that would close the circle is refused and the next one is tried,
/// so the least urgent obstacles are the ones left out.
pub fn merge_by_priority(mut sectors: Vec<TaggedSector>) -> MergeOutcome {
    sectors.sort_by(|a, b| a.priority.total_cmp(&b.priority));

    let mut outcome = MergeOutcome::default();
    for tagged in sectors {
        if outcome.set.insert(tagged.sector) == Insertion::Enclosed {
            outcome.enclosed += 1;
        }
    }
    outcome
}
