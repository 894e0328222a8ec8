//! Several cooperating agents driven from one process
//!
//! Each agent keeps its own pilot and memory. A pool update computes every
//! agent's decision in parallel, then applies the new memories sequentially.

use hashbrown::HashMap;
use rayon::prelude::*;
use uuid::Uuid;

use crate::bot::pilot::{Decision, Memory, Pilot};
use crate::config::BotConfig;
use crate::world::snapshot::WorldSnapshot;

pub type AgentId = Uuid;

struct Agent {
    pilot: Pilot,
    memory: Option<Memory>,
    heading_to_subordinate: bool,
}

/// Pilots for all agents in this process
#[derive(Default)]
pub struct AgentPool {
    agents: HashMap<AgentId, Agent>,
}

impl AgentPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an agent and return its id
    pub fn register(&mut self, config: BotConfig) -> AgentId {
        let id = Uuid::new_v4();
        self.agents.insert(
            id,
            Agent {
                pilot: Pilot::new(config),
                memory: None,
                heading_to_subordinate: false,
            },
        );
        id
    }

    pub fn unregister(&mut self, id: AgentId) -> bool {
        self.agents.remove(&id).is_some()
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    pub fn memory(&self, id: AgentId) -> Option<&Memory> {
        self.agents.get(&id)?.memory.as_ref()
    }

    /// Mark an agent as travelling to one of the agents it feeds.
    /// It holds back feeding bursts into its own ally until cleared.
    pub fn set_heading_to_subordinate(&mut self, id: AgentId, heading: bool) -> bool {
        match self.agents.get_mut(&id) {
            Some(agent) => {
                agent.heading_to_subordinate = heading;
                true
            }
            None => false,
        }
    }

    /// Tick every agent that has a snapshot this period
    ///
    /// Uses rayon for parallel decision computation, then applies memories sequentially
    pub fn update(
        &mut self,
        snapshots: &HashMap<AgentId, WorldSnapshot>,
    ) -> Vec<(AgentId, Decision)> {
        let results: Vec<(AgentId, Memory, Decision)> = self
            .agents
            .par_iter()
            .filter_map(|(&id, agent)| {
                let snapshot = snapshots.get(&id)?;
                let mut memory = agent
                    .memory
                    .clone()
                    .unwrap_or_else(|| Memory::new(snapshot.now_ms));
                memory.feeding.heading_to_subordinate = agent.heading_to_subordinate;
                let (memory, decision) = agent.pilot.tick(memory, snapshot);
                Some((id, memory, decision))
            })
            .collect();

        let mut decisions = Vec::with_capacity(results.len());
        for (id, memory, decision) in results {
            if let Some(agent) = self.agents.get_mut(&id) {
                agent.memory = Some(memory);
            }
            decisions.push((id, decision));
        }
        decisions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bot::destination::Route;
    use crate::world::snapshot::{Bounds, Entity, SelfState};

    fn frame(me: SelfState, entities: Vec<Entity>) -> WorldSnapshot {
        let bounds = Bounds::new(-10_000.0, -10_000.0, 10_000.0, 10_000.0);
        WorldSnapshot::new(1_000, Some(me), bounds).with_entities(entities)
    }

    #[test]
    fn test_register_and_unregister() {
        let mut pool = AgentPool::new();
        let a = pool.register(BotConfig::default());
        let b = pool.register(BotConfig::default());
        assert_ne!(a, b);
        assert_eq!(pool.len(), 2);

        assert!(pool.unregister(a));
        assert!(!pool.unregister(a));
        assert_eq!(pool.len(), 1);
    }

    #[test]
    fn test_update_only_agents_with_snapshots() {
        let mut pool = AgentPool::new();
        let a = pool.register(BotConfig::default());
        let b = pool.register(BotConfig::default());

        let mut snapshots = HashMap::new();
        let me = SelfState::new(0.0, 0.0, 30.0);
        snapshots.insert(a, frame(me, vec![]));

        let decisions = pool.update(&snapshots);
        assert_eq!(decisions.len(), 1);
        assert_eq!(decisions[0].0, a);
        assert!(pool.memory(a).is_some());
        assert!(pool.memory(b).is_none());
    }

    #[test]
    fn test_agents_decide_independently() {
        let mut pool = AgentPool::new();
        let ids: Vec<AgentId> = (0..16)
            .map(|_| pool.register(BotConfig::default()))
            .collect();

        // Each agent sees one threat on its right
        let snapshots: HashMap<AgentId, WorldSnapshot> = ids
            .iter()
            .enumerate()
            .map(|(i, &id)| {
                let x = i as f64 * 100.0;
                let me = SelfState::new(x, 0.0, 50.0);
                (id, frame(me, vec![Entity::new(1, x + 100.0, 0.0, 200.0)]))
            })
            .collect();

        let decisions = pool.update(&snapshots);
        assert_eq!(decisions.len(), 16);
        for (id, decision) in &decisions {
            assert_eq!(decision.route, Some(Route::Escape));
            let me = snapshots[id].me.unwrap();
            assert!(decision.destination.unwrap().x < me.x);
            assert_eq!(
                pool.memory(*id).unwrap().previous_destination,
                decision.destination.unwrap()
            );
        }
    }

    #[test]
    fn test_heading_to_subordinate_holds_burst() {
        let config = BotConfig {
            ally_id: Some(7),
            ..Default::default()
        };
        let mut pool = AgentPool::new();
        let busy = pool.register(config.clone());
        let free = pool.register(config);
        assert!(pool.set_heading_to_subordinate(busy, true));
        assert!(!pool.set_heading_to_subordinate(Uuid::new_v4(), true));

        // Both agents touch an ally they outweigh
        let scene = frame(
            SelfState::new(420.0, 0.0, 50.0),
            vec![Entity::new(7, 500.0, 0.0, 40.0)],
        );
        let snapshots: HashMap<AgentId, WorldSnapshot> =
            [(busy, scene.clone()), (free, scene)].into_iter().collect();

        let decisions: HashMap<AgentId, Decision> = pool.update(&snapshots).into_iter().collect();
        assert_eq!(decisions[&busy].splits, 0);
        assert!(decisions[&free].splits >= 1);
        assert!(pool.memory(busy).unwrap().feeding.heading_to_subordinate);

        // Cleared on the next update
        pool.set_heading_to_subordinate(busy, false);
        let decisions: HashMap<AgentId, Decision> = pool.update(&snapshots).into_iter().collect();
        assert!(decisions[&busy].splits >= 1);
    }
}
