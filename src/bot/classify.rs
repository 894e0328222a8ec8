//! Entity classification
//!
//! Splits the visible entities into the lists the rest of the pipeline works
//! on. Each entity lands in at most one list; categories claim entities in the
//! order ally, edible, threat, hazard, split target.

use tracing::debug;

use crate::bot::constants::ratio;
use crate::world::snapshot::{Entity, EntityId, SelfState};

/// True when a cell of size `a` is dwarfed by a cell of size `b`
#[inline]
pub fn dwarfed_by(a: f64, b: f64, ratio: f64) -> bool {
    a * a * ratio < b * b
}

/// Pieces split off a cell of size `b` could eat a cell of size `a`,
/// and `a` is not so small that splitting would be a waste.
#[inline]
pub fn can_split(a: f64, b: f64) -> bool {
    dwarfed_by(a, b, ratio::SPLIT_MIN) && !dwarfed_by(a, b, ratio::SPLIT_MAX)
}

#[inline]
pub fn is_threat(me: &SelfState, e: &Entity) -> bool {
    !e.is_hazard && dwarfed_by(me.size, e.size, ratio::THREAT)
}

#[inline]
pub fn is_edible(me: &SelfState, e: &Entity) -> bool {
    (!e.is_hazard && dwarfed_by(e.size, me.size, ratio::EDIBLE)) || e.size <= ratio::FREE_FOOD_SIZE
}

/// A hazard is only worth steering around once the agent is big enough to burst on it
#[inline]
pub fn is_hazardous(me: &SelfState, e: &Entity) -> bool {
    e.is_hazard && dwarfed_by(e.size, me.size, ratio::HAZARD)
}

#[inline]
pub fn is_split_target(me: &SelfState, e: &Entity) -> bool {
    can_split(e.size, me.size)
}

/// Configured identity of the cooperating ally
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AllyIdentity {
    pub id: Option<EntityId>,
    pub name: Option<String>,
}

impl AllyIdentity {
    pub fn new(id: Option<EntityId>, name: Option<String>) -> Self {
        Self { id, name }
    }

    /// Id must match. A configured name must match as well.
    pub fn matches(&self, e: &Entity) -> bool {
        if self.id != Some(e.id) {
            return false;
        }
        match (&self.name, &e.name) {
            (None, _) => true,
            (Some(expected), Some(seen)) if expected == seen => true,
            (Some(expected), seen) => {
                debug!(
                    "Entity {} has the ally id but name {:?} (expected {:?})",
                    e.id, seen, expected
                );
                false
            }
        }
    }
}

/// Disjoint views into one snapshot's entities
#[derive(Debug, Default)]
pub struct Classified<'a> {
    pub ally: Option<&'a Entity>,
    pub edible: Vec<&'a Entity>,
    pub threats: Vec<&'a Entity>,
    pub hazards: Vec<&'a Entity>,
    pub split_targets: Vec<&'a Entity>,
}

impl<'a> Classified<'a> {
    /// Everything worth eating: edible cells followed by split targets
    pub fn food(&self) -> impl Iterator<Item = &'a Entity> + '_ {
        self.edible.iter().chain(self.split_targets.iter()).copied()
    }
}

/// Classify entities as seen by `me`.
///
/// The ally is only claimed while `seeking_ally`; otherwise it is classified
/// like any other cell.
pub fn classify<'a>(
    me: &SelfState,
    entities: &'a [Entity],
    ally: &AllyIdentity,
    seeking_ally: bool,
) -> Classified<'a> {
    let mut out = Classified::default();

    for e in entities.iter().filter(|e| !e.is_mine) {
        if seeking_ally && out.ally.is_none() && ally.matches(e) {
            out.ally = Some(e);
        } else if is_edible(me, e) {
            out.edible.push(e);
        } else if is_threat(me, e) {
            out.threats.push(e);
        } else if is_hazardous(me, e) {
            out.hazards.push(e);
        } else if is_split_target(me, e) {
            out.split_targets.push(e);
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn me() -> SelfState {
        SelfState::new(0.0, 0.0, 100.0)
    }

    #[test]
    fn test_ratio_predicates() {
        let me = me();
        assert!(is_threat(&me, &Entity::new(1, 0.0, 0.0, 115.0)));
        assert!(!is_threat(&me, &Entity::new(1, 0.0, 0.0, 113.0)));
        assert!(!is_threat(&me, &Entity::hazard(1, 0.0, 0.0, 500.0)));

        assert!(is_edible(&me, &Entity::new(1, 0.0, 0.0, 86.0)));
        assert!(!is_edible(&me, &Entity::new(1, 0.0, 0.0, 87.0)));
        // Tiny cells are food even when flagged as hazards
        assert!(is_edible(&me, &Entity::hazard(1, 0.0, 0.0, 13.0)));

        assert!(is_hazardous(&me, &Entity::hazard(1, 0.0, 0.0, 90.0)));
        assert!(!is_hazardous(&me, &Entity::hazard(1, 0.0, 0.0, 95.0)));
    }

    #[test]
    fn test_can_split_window() {
        // 2.8 < (b/a)² <= 20
        assert!(can_split(10.0, 17.0));
        assert!(!can_split(10.0, 16.0));
        assert!(can_split(10.0, 44.0));
        assert!(!can_split(10.0, 45.0));
    }

    #[test]
    fn test_classification_is_disjoint() {
        let me = me();
        let entities = vec![
            Entity::new(1, 10.0, 0.0, 10.0),  // food
            Entity::new(2, 10.0, 0.0, 200.0), // threat
            Entity::hazard(3, 10.0, 0.0, 80.0),
            Entity::new(4, 10.0, 0.0, 50.0), // edible and split target, edible wins
            Entity::new(5, 10.0, 0.0, 100.0), // same size, ignored
        ];
        let c = classify(&me, &entities, &AllyIdentity::default(), true);

        let edible: Vec<_> = c.edible.iter().map(|e| e.id).collect();
        assert_eq!(edible, vec![1, 4]);
        assert_eq!(c.threats.len(), 1);
        assert_eq!(c.threats[0].id, 2);
        assert_eq!(c.hazards.len(), 1);
        assert!(c.split_targets.is_empty());
        assert!(c.ally.is_none());
    }

    #[test]
    fn test_split_window_claimed_earlier() {
        // The split window sits inside both the edible and the hazard ratios,
        // so those categories claim such cells first
        let me = me();
        let entities = vec![
            Entity::new(8, 0.0, 0.0, 40.0),
            Entity::hazard(9, 0.0, 0.0, 40.0),
        ];
        assert!(is_split_target(&me, &entities[0]));
        let c = classify(&me, &entities, &AllyIdentity::default(), false);
        assert_eq!(c.edible.len(), 1);
        assert_eq!(c.hazards.len(), 1);
        assert!(c.split_targets.is_empty());
        assert_eq!(c.food().count(), 1);
    }

    #[test]
    fn test_owned_pieces_excluded() {
        let me = me();
        let mut mine = Entity::new(1, 0.0, 0.0, 10.0);
        mine.is_mine = true;
        let entities = vec![mine];
        let c = classify(&me, &entities, &AllyIdentity::default(), true);
        assert_eq!(c.food().count(), 0);
    }

    #[test]
    fn test_ally_claimed_first_only_while_seeking() {
        let me = me();
        let entities = vec![Entity::new(7, 0.0, 0.0, 200.0).named("boss")];
        let ally = AllyIdentity::new(Some(7), Some("boss".into()));

        let c = classify(&me, &entities, &ally, true);
        assert_eq!(c.ally.map(|e| e.id), Some(7));
        assert!(c.threats.is_empty());

        let c = classify(&me, &entities, &ally, false);
        assert!(c.ally.is_none());
        assert_eq!(c.threats.len(), 1);
    }

    #[test]
    fn test_ally_name_mismatch() {
        let me = me();
        let entities = vec![Entity::new(7, 0.0, 0.0, 40.0).named("impostor")];
        let ally = AllyIdentity::new(Some(7), Some("boss".into()));

        let c = classify(&me, &entities, &ally, true);
        assert!(c.ally.is_none());
        assert_eq!(c.edible.len(), 1);

        // No configured name: the id alone is enough
        let ally = AllyIdentity::new(Some(7), None);
        assert!(ally.matches(&entities[0]));
    }
}
