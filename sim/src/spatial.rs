//! Spatial partitioning for efficient neighbor queries.
//!
//! A bounded uniform grid over the map. Buckets hold `AgentId`s only and are
//! cleared and refilled from the `AgentStore` every tick; they are never
//! patched incrementally. Distances are always measured against the live
//! positions in the store.

use crate::components::{AgentId, AgentStore, AlignmentFilter, Vec2};
use bevy_ecs::prelude::*;

/// First radius tried by `nearest_opposing`.
pub const NEAREST_INITIAL_RADIUS: f32 = 50.0;
/// Largest radius tried by `nearest_opposing`.
pub const NEAREST_MAX_RADIUS: f32 = 1500.0;

/// Grid-based spatial partitioning structure.
#[derive(Resource, Debug)]
pub struct SpatialGrid {
    /// Cell size in world units.
    cell_size: f32,
    /// Number of cell columns.
    cols: usize,
    /// Number of cell rows.
    rows: usize,
    /// Row-major buckets.
    cells: Vec<Vec<AgentId>>,
    /// Agents inserted by the last rebuild.
    indexed: usize,
}

impl SpatialGrid {
    /// Create a grid covering `[0, width] x [0, height]`.
    pub fn new(width: f32, height: f32, cell_size: f32) -> Self {
        debug_assert!(cell_size > 0.0, "cell_size must be positive");
        let cols = (width / cell_size) as usize + 1;
        let rows = (height / cell_size) as usize + 1;
        Self {
            cell_size,
            cols,
            rows,
            cells: vec![Vec::new(); cols * rows],
            indexed: 0,
        }
    }

    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// Grid dimensions in cells (columns, rows).
    pub fn dimensions(&self) -> (usize, usize) {
        (self.cols, self.rows)
    }

    /// Convert world coordinates to (possibly out of range) cell coordinates.
    #[inline]
    pub fn world_to_cell(&self, position: Vec2) -> (i32, i32) {
        (
            (position.x / self.cell_size).floor() as i32,
            (position.y / self.cell_size).floor() as i32,
        )
    }

    #[inline]
    fn cell_index(&self, cell: (i32, i32)) -> Option<usize> {
        let (cx, cy) = cell;
        if cx < 0 || cy < 0 || cx as usize >= self.cols || cy as usize >= self.rows {
            None
        } else {
            Some(cy as usize * self.cols + cx as usize)
        }
    }

    /// Agents in a cell. Empty for out-of-range cells.
    pub fn bucket(&self, cell: (i32, i32)) -> &[AgentId] {
        match self.cell_index(cell) {
            Some(i) => &self.cells[i],
            None => &[],
        }
    }

    /// Clear all buckets (kept allocated).
    pub fn clear(&mut self) {
        for bucket in &mut self.cells {
            bucket.clear();
        }
        self.indexed = 0;
    }

    /// Clear, then insert every active agent into the bucket of its cell.
    /// Agents outside the grid are silently left out.
    pub fn rebuild(&mut self, store: &AgentStore) {
        self.clear();
        for (id, agent) in store.iter() {
            if !agent.active {
                continue;
            }
            let cell = self.world_to_cell(agent.position);
            if let Some(i) = self.cell_index(cell) {
                self.cells[i].push(id);
                self.indexed += 1;
            }
        }
    }

    /// Number of agents indexed by the last rebuild.
    pub fn total_count(&self) -> usize {
        self.indexed
    }

    /// All active agents matching `filter` with squared distance to `point`
    /// at most `radius²`.
    ///
    /// Scans the square window of cells around the point's cell; the exact
    /// distance test decides membership.
    pub fn query_radius(
        &self,
        store: &AgentStore,
        point: Vec2,
        radius: f32,
        filter: AlignmentFilter,
    ) -> Vec<AgentId> {
        let mut results = Vec::new();
        self.visit_radius(store, point, radius, filter, |id, _| results.push(id));
        results
    }

    /// Like `query_radius` but hands each hit and its squared distance to a
    /// visitor instead of allocating.
    pub fn visit_radius(
        &self,
        store: &AgentStore,
        point: Vec2,
        radius: f32,
        filter: AlignmentFilter,
        mut visitor: impl FnMut(AgentId, f32),
    ) {
        let radius_sq = radius * radius;
        let reach = (radius / self.cell_size).ceil() as i32;
        let (cx, cy) = self.world_to_cell(point);

        // Window clipped to the grid; off-grid cells hold nothing.
        let x_range = (cx - reach).max(0)..=(cx + reach).min(self.cols as i32 - 1);
        let y_range = (cy - reach).max(0)..=(cy + reach).min(self.rows as i32 - 1);

        for y in y_range {
            for x in x_range.clone() {
                for &id in self.bucket((x, y)) {
                    let agent = &store[id];
                    if !agent.active || !filter.matches(agent.alignment) {
                        continue;
                    }
                    let dist_sq = agent.position.sqr_distance(point);
                    if dist_sq <= radius_sq {
                        visitor(id, dist_sq);
                    }
                }
            }
        }
    }

    /// Nearest active agent of the opposing alignment.
    ///
    /// Expanding-ring search: radii double from `NEAREST_INITIAL_RADIUS` and
    /// the last ring is clamped to `NEAREST_MAX_RADIUS`. The first ring that
    /// yields any candidate holds the global nearest, since the previous
    /// empty ring proved nothing lies closer. Returns `None` when no opposing
    /// agent lies within the maximum radius.
    ///
    /// Exact only while buckets match positions; after agents move, an
    /// agent filed under its previous cell can be missed by a ring.
    pub fn nearest_opposing(&self, store: &AgentStore, id: AgentId) -> Option<AgentId> {
        let agent = store.get(id)?;
        let filter = AlignmentFilter::Only(agent.alignment.opposing());
        let origin = agent.position;

        let mut radius = NEAREST_INITIAL_RADIUS;
        loop {
            let mut best: Option<(AgentId, f32)> = None;
            self.visit_radius(store, origin, radius, filter, |candidate, dist_sq| {
                if best.map_or(true, |(_, d)| dist_sq < d) {
                    best = Some((candidate, dist_sq));
                }
            });
            if let Some((nearest, _)) = best {
                return Some(nearest);
            }
            if radius >= NEAREST_MAX_RADIUS {
                return None;
            }
            radius = (radius * 2.0).min(NEAREST_MAX_RADIUS);
        }
    }

    /// Agents in the fixed 3x3 block of cells centered on `position`'s cell.
    pub fn neighborhood(&self, position: Vec2) -> impl Iterator<Item = AgentId> + '_ {
        let (cx, cy) = self.world_to_cell(position);
        (-1..=1)
            .flat_map(move |dy| (-1..=1).map(move |dx| (cx + dx, cy + dy)))
            .flat_map(move |cell| self.bucket(cell).iter().copied())
    }
}

/// System that rebuilds the spatial grid each tick.
pub fn spatial_grid_update_system(mut grid: ResMut<SpatialGrid>, store: Res<AgentStore>) {
    grid.rebuild(&store);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{Agent, Alignment};
    use proptest::prelude::*;

    fn spawn(store: &mut AgentStore, x: f32, y: f32, alignment: Alignment) -> AgentId {
        store.push(Agent::new(Vec2::new(x, y), alignment, 3.0, 1000, 1.0))
    }

    #[test]
    fn test_query_radius_filters_alignment_and_bounds() {
        let mut store = AgentStore::new();
        let x = spawn(&mut store, 5.0, 5.0, Alignment::Blue);
        let _y = spawn(&mut store, 150.0, 150.0, Alignment::Red);

        let mut grid = SpatialGrid::new(100.0, 100.0, 20.0);
        grid.rebuild(&store);

        let found = grid.query_radius(&store, Vec2::new(5.0, 5.0), 10.0, AlignmentFilter::Only(Alignment::Blue));
        assert_eq!(found, vec![x]);
        // The out-of-bounds agent is not indexed at all.
        assert_eq!(grid.total_count(), 1);
    }

    #[test]
    fn test_dimensions_cover_far_edge() {
        assert_eq!(SpatialGrid::new(1280.0, 720.0, 20.0).dimensions(), (65, 37));
        assert_eq!(SpatialGrid::new(100.0, 90.0, 20.0).dimensions(), (6, 5));
    }

    #[test]
    fn test_query_radius_uses_exact_distance() {
        let mut store = AgentStore::new();
        // Same cell window, but outside the circle.
        let corner = spawn(&mut store, 19.0, 19.0, Alignment::Blue);
        let inside = spawn(&mut store, 10.0, 0.0, Alignment::Blue);

        let mut grid = SpatialGrid::new(200.0, 200.0, 20.0);
        grid.rebuild(&store);

        let found = grid.query_radius(&store, Vec2::new(0.0, 0.0), 20.0, AlignmentFilter::Any);
        assert!(found.contains(&inside));
        assert!(!found.contains(&corner));

        // Boundary is inclusive.
        let found = grid.query_radius(&store, Vec2::new(0.0, 0.0), 10.0, AlignmentFilter::Any);
        assert_eq!(found, vec![inside]);
    }

    #[test]
    fn test_rebuild_skips_inactive_and_clears() {
        let mut store = AgentStore::new();
        let a = spawn(&mut store, 10.0, 10.0, Alignment::Blue);
        let b = spawn(&mut store, 12.0, 10.0, Alignment::Blue);
        let mut grid = SpatialGrid::new(100.0, 100.0, 20.0);

        grid.rebuild(&store);
        assert_eq!(grid.total_count(), 2);

        store[a].deactivate();
        store[b].position = Vec2::new(90.0, 90.0);
        grid.rebuild(&store);
        assert_eq!(grid.total_count(), 1);
        assert!(grid.bucket((0, 0)).is_empty());
        assert_eq!(grid.bucket((4, 4)), &[b]);
    }

    #[test]
    fn test_query_skips_agents_deactivated_after_rebuild() {
        let mut store = AgentStore::new();
        let a = spawn(&mut store, 10.0, 10.0, Alignment::Red);
        let mut grid = SpatialGrid::new(100.0, 100.0, 20.0);
        grid.rebuild(&store);
        store[a].deactivate();
        assert!(grid.query_radius(&store, Vec2::new(10.0, 10.0), 5.0, AlignmentFilter::Any).is_empty());
    }

    #[test]
    fn test_nearest_opposing() {
        let mut store = AgentStore::new();
        let me = spawn(&mut store, 0.0, 0.0, Alignment::Blue);
        let _friend = spawn(&mut store, 5.0, 0.0, Alignment::Blue);
        let _far = spawn(&mut store, 30.0, 0.0, Alignment::Red);
        let near = spawn(&mut store, 20.0, 0.0, Alignment::Red);

        let mut grid = SpatialGrid::new(200.0, 200.0, 10.0);
        grid.rebuild(&store);

        assert_eq!(grid.nearest_opposing(&store, me), Some(near));
    }

    #[test]
    fn test_nearest_opposing_across_rings() {
        let mut store = AgentStore::new();
        let me = spawn(&mut store, 0.0, 0.0, Alignment::Red);
        let target = spawn(&mut store, 700.0, 300.0, Alignment::Blue);
        let _other = spawn(&mut store, 700.0, 700.0, Alignment::Blue);

        let mut grid = SpatialGrid::new(1280.0, 720.0, 20.0);
        grid.rebuild(&store);

        assert_eq!(grid.nearest_opposing(&store, me), Some(target));
    }

    #[test]
    fn test_nearest_opposing_reads_buckets_until_rebuild() {
        let mut store = AgentStore::new();
        let blue = spawn(&mut store, 0.0, 0.0, Alignment::Blue);
        let settled = spawn(&mut store, 45.0, 0.0, Alignment::Red);
        let mover = spawn(&mut store, 200.0, 0.0, Alignment::Red);

        let mut grid = SpatialGrid::new(400.0, 100.0, 20.0);
        grid.rebuild(&store);

        // Moved after the rebuild: still filed under its old cell.
        store[mover].position = Vec2::new(10.0, 0.0);
        assert_eq!(grid.nearest_opposing(&store, blue), Some(settled));

        grid.rebuild(&store);
        assert_eq!(grid.nearest_opposing(&store, blue), Some(mover));
    }

    #[test]
    fn test_nearest_opposing_not_found() {
        let mut store = AgentStore::new();
        let me = spawn(&mut store, 0.0, 0.0, Alignment::Blue);
        let _beyond = spawn(&mut store, 3000.0, 0.0, Alignment::Red);
        let dead = spawn(&mut store, 10.0, 0.0, Alignment::Red);
        store[dead].deactivate();

        let mut grid = SpatialGrid::new(4000.0, 100.0, 20.0);
        grid.rebuild(&store);

        assert_eq!(grid.nearest_opposing(&store, me), None);
    }

    #[test]
    fn test_neighborhood_is_three_by_three() {
        let mut store = AgentStore::new();
        let center = spawn(&mut store, 30.0, 30.0, Alignment::Blue);
        let diagonal = spawn(&mut store, 5.0, 5.0, Alignment::Red);
        let _two_away = spawn(&mut store, 70.0, 30.0, Alignment::Red);

        let mut grid = SpatialGrid::new(100.0, 100.0, 20.0);
        grid.rebuild(&store);

        let mut found: Vec<AgentId> = grid.neighborhood(Vec2::new(30.0, 30.0)).collect();
        found.sort();
        assert_eq!(found, vec![center, diagonal]);
    }

    #[test]
    fn test_spatial_grid_update_system() {
        let mut world = World::new();
        let mut store = AgentStore::new();
        spawn(&mut store, 10.0, 10.0, Alignment::Blue);
        spawn(&mut store, 50.0, 50.0, Alignment::Red);
        world.insert_resource(store);
        world.insert_resource(SpatialGrid::new(100.0, 100.0, 20.0));

        let mut schedule = Schedule::default();
        schedule.add_systems(spatial_grid_update_system);
        schedule.run(&mut world);

        assert_eq!(world.resource::<SpatialGrid>().total_count(), 2);
    }

    fn arb_agents() -> impl Strategy<Value = Vec<(f32, f32, bool, bool)>> {
        prop::collection::vec((0.0f32..1280.0, 0.0f32..720.0, any::<bool>(), prop::bool::weighted(0.9)), 1..80)
    }

    fn build(agents: &[(f32, f32, bool, bool)]) -> AgentStore {
        let mut store = AgentStore::new();
        for &(x, y, red, active) in agents {
            let alignment = if red { Alignment::Red } else { Alignment::Blue };
            let id = spawn(&mut store, x, y, alignment);
            if !active {
                store[id].deactivate();
            }
        }
        store
    }

    proptest! {
        #[test]
        fn prop_query_radius_matches_brute_force(
            agents in arb_agents(),
            px in 0.0f32..1280.0,
            py in 0.0f32..720.0,
            radius in 0.0f32..300.0,
            red in any::<bool>(),
        ) {
            let store = build(&agents);
            let mut grid = SpatialGrid::new(1280.0, 720.0, 20.0);
            grid.rebuild(&store);

            let alignment = if red { Alignment::Red } else { Alignment::Blue };
            let point = Vec2::new(px, py);
            let mut found = grid.query_radius(&store, point, radius, AlignmentFilter::Only(alignment));
            found.sort();

            let expected: Vec<AgentId> = store
                .iter()
                .filter(|(_, a)| a.active && a.alignment == alignment)
                .filter(|(_, a)| a.position.sqr_distance(point) <= radius * radius)
                .map(|(id, _)| id)
                .collect();
            prop_assert_eq!(found, expected);
        }

        #[test]
        fn prop_nearest_opposing_is_global_minimum(agents in arb_agents()) {
            let store = build(&agents);
            let mut grid = SpatialGrid::new(1280.0, 720.0, 20.0);
            grid.rebuild(&store);

            for (id, agent) in store.iter().filter(|(_, a)| a.active) {
                let brute = store
                    .iter()
                    .filter(|(_, o)| o.active && o.alignment != agent.alignment)
                    .map(|(_, o)| o.position.sqr_distance(agent.position))
                    .fold(None, |best: Option<f32>, d| Some(best.map_or(d, |b| b.min(d))));

                match (grid.nearest_opposing(&store, id), brute) {
                    (Some(found), Some(best)) => {
                        prop_assert_eq!(store[found].position.sqr_distance(agent.position), best);
                    }
                    (None, None) => {}
                    (got, want) => prop_assert!(false, "got {:?}, brute force {:?}", got, want),
                }
            }
        }
    }
}
