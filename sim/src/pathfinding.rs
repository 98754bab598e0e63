//! A* routing over the tile graph.
//!
//! Edges have uniform cost 1 and the heuristic is the Manhattan distance
//! between tile coordinates, which is admissible and consistent on a
//! 4-connected grid. A node is therefore final the first time it is popped.
//!
//! Search state lives in a node arena indexed by tile id and is invalidated
//! between searches by bumping a generation counter, so a search never has
//! to clean up after itself on any exit path.

use crate::components::Vec2;
use crate::terrain::{Tile, TileId, TileTerrain};
use std::cmp::Reverse;
use std::collections::BinaryHeap;
use tracing::trace;

/// Manhattan distance between two tiles.
#[inline]
pub fn heuristic(a: &Tile, b: &Tile) -> u32 {
    (a.x.abs_diff(b.x) + a.y.abs_diff(b.y)) as u32
}

#[derive(Debug, Clone, Copy, Default)]
struct SearchNode {
    /// Cost from the start tile.
    g: u32,
    parent: Option<TileId>,
    /// Search this node was last touched by; stale otherwise.
    generation: u32,
    closed: bool,
}

/// Frontier key. Ordered by `f`, then by `h` so ties favour nodes closer to
/// the goal, then by tile id for determinism.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct FrontierEntry {
    f: u32,
    h: u32,
    tile: TileId,
}

/// Reusable A* search context.
#[derive(Debug, Default)]
pub struct Pathfinder {
    nodes: Vec<SearchNode>,
    generation: u32,
    frontier: BinaryHeap<Reverse<FrontierEntry>>,
}

impl Pathfinder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Route between two pixel positions as a sequence of tile anchors,
    /// start tile first.
    ///
    /// Empty when both positions resolve to the same tile or when the goal is
    /// unreachable.
    pub fn get_route(&mut self, terrain: &TileTerrain, start: Vec2, target: Vec2) -> Vec<Vec2> {
        let start_tile = terrain.tile_id_at_position(start);
        let goal_tile = terrain.tile_id_at_position(target);

        if start_tile == goal_tile {
            return Vec::new();
        }

        match self.find_tile_path(terrain, start_tile, goal_tile) {
            Some(tiles) => tiles.into_iter().map(|t| terrain.tile_anchor(t)).collect(),
            None => {
                trace!(?start_tile, ?goal_tile, "No route between tiles");
                Vec::new()
            }
        }
    }

    /// Shortest tile path from `start` to `goal`, both inclusive.
    pub fn find_tile_path(&mut self, terrain: &TileTerrain, start: TileId, goal: TileId) -> Option<Vec<TileId>> {
        self.begin_search(terrain.tile_count());
        let generation = self.generation;
        let goal_ref = terrain.tile(goal);

        let start_h = heuristic(terrain.tile(start), goal_ref);
        self.nodes[start.index()] = SearchNode {
            g: 0,
            parent: None,
            generation,
            closed: false,
        };
        self.frontier.push(Reverse(FrontierEntry {
            f: start_h,
            h: start_h,
            tile: start,
        }));

        while let Some(Reverse(entry)) = self.frontier.pop() {
            let current = entry.tile;
            if self.nodes[current.index()].closed {
                // Superseded by a cheaper entry that was already expanded.
                continue;
            }
            self.nodes[current.index()].closed = true;

            if current == goal {
                return Some(self.reconstruct(goal));
            }

            let next_g = self.nodes[current.index()].g + 1;
            for &neighbor in terrain.exits(current) {
                let node = &mut self.nodes[neighbor.index()];
                let improves = if node.generation != generation {
                    true
                } else {
                    !node.closed && next_g < node.g
                };
                if !improves {
                    continue;
                }

                *node = SearchNode {
                    g: next_g,
                    parent: Some(current),
                    generation,
                    closed: false,
                };
                let h = heuristic(terrain.tile(neighbor), goal_ref);
                self.frontier.push(Reverse(FrontierEntry {
                    f: next_g + h,
                    h,
                    tile: neighbor,
                }));
            }
        }

        None
    }

    fn begin_search(&mut self, tile_count: usize) {
        if self.nodes.len() != tile_count {
            self.nodes = vec![SearchNode::default(); tile_count];
            self.generation = 0;
        }
        self.frontier.clear();

        self.generation = self.generation.wrapping_add(1);
        if self.generation == 0 {
            // Wrapped: wipe stamps so no node looks current.
            self.nodes.fill(SearchNode::default());
            self.generation = 1;
        }
    }

    fn reconstruct(&self, goal: TileId) -> Vec<TileId> {
        let mut path = vec![goal];
        let mut current = goal;
        while let Some(parent) = self.nodes[current.index()].parent {
            path.push(parent);
            current = parent;
        }
        path.reverse();
        path
    }
}
