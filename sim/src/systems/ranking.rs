//! Health ranking - display priority lists per alignment.

use crate::components::*;
use crate::ranking::sort_by_health;
use bevy_ecs::prelude::*;

/// Active agent ids of each alignment, weakest first.
#[derive(Resource, Debug, Default, Clone)]
pub struct HealthRanking {
    pub blue: Vec<AgentId>,
    pub red: Vec<AgentId>,
}

impl HealthRanking {
    pub fn for_alignment(&self, alignment: Alignment) -> &[AgentId] {
        match alignment {
            Alignment::Blue => &self.blue,
            Alignment::Red => &self.red,
        }
    }

    /// One stable sort over the whole store, split per side. Splitting
    /// after the sort keeps store order among equal health on each side.
    fn rebuild(&mut self, store: &AgentStore) {
        self.blue.clear();
        self.red.clear();
        for id in sort_by_health(store.as_slice(), 0, store.len()) {
            let agent = &store[id];
            if !agent.active {
                continue;
            }
            match agent.alignment {
                Alignment::Blue => self.blue.push(id),
                Alignment::Red => self.red.push(id),
            }
        }
    }
}

/// System that re-ranks both sides by ascending health. Read-only on agents.
pub fn health_ranking_system(store: Res<AgentStore>, mut ranking: ResMut<HealthRanking>) {
    ranking.rebuild(&store);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ranking_per_side() {
        let mut world = World::new();
        let mut store = AgentStore::new();
        let roster = [
            (Alignment::Blue, 50),
            (Alignment::Red, 300),
            (Alignment::Blue, 10),
            (Alignment::Blue, 80),
            (Alignment::Red, 200),
            (Alignment::Blue, 10),
            (Alignment::Blue, 0),
        ];
        for &(alignment, health) in &roster {
            let id = store.push(Agent::new(Vec2::ZERO, alignment, 3.0, 1000, 1.0));
            store[id].health = health;
        }
        store[AgentId(6)].deactivate();
        world.insert_resource(store);
        world.insert_resource(HealthRanking::default());

        let mut schedule = Schedule::default();
        schedule.add_systems(health_ranking_system);
        schedule.run(&mut world);

        let ranking = world.resource::<HealthRanking>();
        assert_eq!(ranking.blue, vec![AgentId(2), AgentId(5), AgentId(0), AgentId(3)]);
        assert_eq!(ranking.for_alignment(Alignment::Red), &[AgentId(4), AgentId(1)]);
    }

    #[test]
    fn test_ranking_matches_sort_by_health_per_side() {
        let mut store = AgentStore::new();
        for i in 0..40u32 {
            let alignment = if i % 3 == 0 { Alignment::Red } else { Alignment::Blue };
            let id = store.push(Agent::new(Vec2::ZERO, alignment, 3.0, 1000, 1.0));
            store[id].health = ((i * 37) % 11) as i32 * 10;
        }

        let mut ranking = HealthRanking::default();
        ranking.rebuild(&store);

        for alignment in [Alignment::Blue, Alignment::Red] {
            let expected: Vec<AgentId> = sort_by_health(store.as_slice(), 0, store.len())
                .into_iter()
                .filter(|&id| store[id].alignment == alignment)
                .collect();
            assert_eq!(ranking.for_alignment(alignment), expected.as_slice());
        }
    }
}
