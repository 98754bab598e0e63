//! Tile terrain - static tile graph used for routing.
//!
//! The terrain is loaded once from a layout file and never modified. Each tile
//! stores its precomputed cardinal exits so the pathfinder never has to
//! re-derive connectivity.

use crate::components::Vec2;
use crate::error::{TerrainError, TerrainResult};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{info, warn};

/// Terrain type of a tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[repr(u8)]
pub enum TerrainType {
    #[default]
    Grass = 0,
    Forest = 1,
    Rocks = 2,
    Mountains = 3,
    Water = 4,
}

/// Static properties of a terrain type.
#[derive(Debug, Clone, Copy)]
pub struct TerrainProps {
    /// Whether routing may enter tiles of this type.
    pub passable: bool,
    /// Movement speed multiplier. Not consumed by routing or movement yet.
    pub speed_modifier: f32,
}

/// Property table indexed by `TerrainType as usize`.
const TERRAIN_TABLE: [TerrainProps; 5] = [
    TerrainProps { passable: true, speed_modifier: 1.0 },   // Grass
    TerrainProps { passable: true, speed_modifier: 0.5 },   // Forest
    TerrainProps { passable: true, speed_modifier: 0.25 },  // Rocks
    TerrainProps { passable: false, speed_modifier: 0.1 },  // Mountains
    TerrainProps { passable: false, speed_modifier: 0.0 },  // Water
];

impl TerrainType {
    #[inline]
    pub fn props(self) -> &'static TerrainProps {
        &TERRAIN_TABLE[self as usize]
    }

    #[inline]
    pub fn is_passable(self) -> bool {
        self.props().passable
    }

    #[inline]
    pub fn speed_modifier(self) -> f32 {
        self.props().speed_modifier
    }

    /// Layout character to terrain type. Unknown characters are grass.
    pub fn from_layout_char(c: char) -> Self {
        match c.to_ascii_uppercase() {
            'G' => TerrainType::Grass,
            'F' => TerrainType::Forest,
            'R' => TerrainType::Rocks,
            'M' => TerrainType::Mountains,
            'W' => TerrainType::Water,
            _ => TerrainType::Grass,
        }
    }
}

/// Row-major tile index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TileId(pub u32);

impl TileId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// A single terrain tile.
#[derive(Debug, Clone)]
pub struct Tile {
    pub x: usize,
    pub y: usize,
    pub terrain: TerrainType,
    /// In-bounds, passable cardinal neighbours.
    pub exits: Vec<TileId>,
}

/// Immutable tile graph.
#[derive(Debug, Clone)]
pub struct TileTerrain {
    width: usize,
    height: usize,
    /// Edge length of a tile in pixels.
    tile_size: f32,
    tiles: Vec<Tile>,
}

impl TileTerrain {
    /// Build a terrain from row-major tile types. Missing entries are grass.
    pub fn from_types(width: usize, height: usize, tile_size: f32, mut types: Vec<TerrainType>) -> Self {
        types.resize(width * height, TerrainType::Grass);

        let mut tiles: Vec<Tile> = types
            .iter()
            .enumerate()
            .map(|(i, &terrain)| Tile {
                x: i % width.max(1),
                y: i / width.max(1),
                terrain,
                exits: Vec::new(),
            })
            .collect();

        // Edge iff the neighbour is in bounds and passable.
        for y in 0..height {
            for x in 0..width {
                let mut exits = Vec::with_capacity(4);
                let candidates = [
                    (x as i64 + 1, y as i64),
                    (x as i64 - 1, y as i64),
                    (x as i64, y as i64 + 1),
                    (x as i64, y as i64 - 1),
                ];
                for (nx, ny) in candidates {
                    if nx < 0 || ny < 0 || nx >= width as i64 || ny >= height as i64 {
                        continue;
                    }
                    let idx = ny as usize * width + nx as usize;
                    if types[idx].is_passable() {
                        exits.push(TileId(idx as u32));
                    }
                }
                tiles[y * width + x].exits = exits;
            }
        }

        Self {
            width,
            height,
            tile_size,
            tiles,
        }
    }

    pub fn all_grass(width: usize, height: usize, tile_size: f32) -> Self {
        Self::from_types(width, height, tile_size, Vec::new())
    }

    /// Parse a layout: a row count line followed by that many rows with one
    /// character per column.
    ///
    /// The map is as wide as its longest row; shorter rows are padded with
    /// grass.
    pub fn parse(text: &str, tile_size: f32) -> TerrainResult<Self> {
        let mut lines = text.lines();
        let header = lines.next().ok_or(TerrainError::MissingRowCount)?;
        let header = header.trim();
        if header.is_empty() {
            return Err(TerrainError::MissingRowCount);
        }
        let rows: usize = header
            .parse()
            .map_err(|_| TerrainError::InvalidRowCount(header.to_string()))?;

        let layout: Vec<Vec<TerrainType>> = lines
            .take(rows)
            .map(|line| {
                line.trim_end_matches('\r')
                    .chars()
                    .map(TerrainType::from_layout_char)
                    .collect()
            })
            .collect();

        if layout.len() < rows {
            return Err(TerrainError::TruncatedLayout {
                expected: rows,
                found: layout.len(),
            });
        }

        let width = layout.iter().map(Vec::len).max().unwrap_or(0);
        if rows == 0 || width == 0 {
            return Err(TerrainError::EmptyLayout);
        }

        let mut types = Vec::with_capacity(width * rows);
        for mut row in layout {
            row.resize(width, TerrainType::Grass);
            types.extend(row);
        }

        Ok(Self::from_types(width, rows, tile_size, types))
    }

    /// Read and parse a layout file.
    pub fn load(path: impl AsRef<Path>, tile_size: f32) -> TerrainResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| TerrainError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let terrain = Self::parse(&text, tile_size)?;
        info!(
            path = %path.display(),
            width = terrain.width,
            height = terrain.height,
            "Loaded terrain layout"
        );
        Ok(terrain)
    }

    /// Load a layout, falling back to an all-grass map of the given size.
    pub fn load_or_default(path: impl AsRef<Path>, width: usize, height: usize, tile_size: f32) -> Self {
        match Self::load(path, tile_size) {
            Ok(terrain) => terrain,
            Err(err) => {
                warn!(%err, width, height, "Terrain layout unavailable, defaulting to grass");
                Self::all_grass(width, height, tile_size)
            }
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn tile_size(&self) -> f32 {
        self.tile_size
    }

    pub fn tile_count(&self) -> usize {
        self.tiles.len()
    }

    /// Size of the map in pixels.
    pub fn pixel_extent(&self) -> (f32, f32) {
        (
            self.width as f32 * self.tile_size,
            self.height as f32 * self.tile_size,
        )
    }

    /// Bounds-checked tile id for grid coordinates.
    pub fn tile_id(&self, x: usize, y: usize) -> Option<TileId> {
        if x < self.width && y < self.height {
            Some(TileId((y * self.width + x) as u32))
        } else {
            None
        }
    }

    /// Tile by id. Ids only come from this terrain, so an out-of-range id is
    /// a programming error.
    #[inline]
    pub fn tile(&self, id: TileId) -> &Tile {
        &self.tiles[id.index()]
    }

    pub fn tile_at(&self, x: usize, y: usize) -> Option<&Tile> {
        self.tile_id(x, y).map(|id| self.tile(id))
    }

    #[inline]
    pub fn exits(&self, id: TileId) -> &[TileId] {
        &self.tile(id).exits
    }

    /// Tile containing a pixel position.
    ///
    /// Positions outside the map are clamped onto the nearest edge tile so
    /// that agents pushed off the map can still route back.
    pub fn tile_id_at_position(&self, position: Vec2) -> TileId {
        debug_assert!(!self.tiles.is_empty(), "terrain has no tiles");
        let max_x = self.width.saturating_sub(1) as i64;
        let max_y = self.height.saturating_sub(1) as i64;
        let x = ((position.x / self.tile_size).floor() as i64).clamp(0, max_x) as usize;
        let y = ((position.y / self.tile_size).floor() as i64).clamp(0, max_y) as usize;
        TileId((y * self.width + x) as u32)
    }

    /// Pixel anchor of a tile (its top-left corner).
    pub fn tile_anchor(&self, id: TileId) -> Vec2 {
        let tile = self.tile(id);
        Vec2::new(
            tile.x as f32 * self.tile_size,
            tile.y as f32 * self.tile_size,
        )
    }

    /// Terrain speed multiplier at a position.
    pub fn speed_modifier_at(&self, position: Vec2) -> f32 {
        self.tile(self.tile_id_at_position(position))
            .terrain
            .speed_modifier()
    }
}

/// Serializable view of the terrain for the renderer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TerrainSnapshot {
    pub width: usize,
    pub height: usize,
    pub tile_size: f32,
    /// Row-major terrain types (as u8).
    pub types: Vec<u8>,
}

impl TerrainSnapshot {
    pub fn from_terrain(terrain: &TileTerrain) -> Self {
        Self {
            width: terrain.width,
            height: terrain.height,
            tile_size: terrain.tile_size,
            types: terrain.tiles.iter().map(|t| t.terrain as u8).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_layout() {
        let terrain = TileTerrain::parse("2\nGFR\nmwx\n", 16.0).unwrap();
        assert_eq!(terrain.width(), 3);
        assert_eq!(terrain.height(), 2);
        assert_eq!(terrain.tile_at(0, 0).unwrap().terrain, TerrainType::Grass);
        assert_eq!(terrain.tile_at(1, 0).unwrap().terrain, TerrainType::Forest);
        assert_eq!(terrain.tile_at(2, 0).unwrap().terrain, TerrainType::Rocks);
        assert_eq!(terrain.tile_at(0, 1).unwrap().terrain, TerrainType::Mountains);
        assert_eq!(terrain.tile_at(1, 1).unwrap().terrain, TerrainType::Water);
        // Unknown characters are grass.
        assert_eq!(terrain.tile_at(2, 1).unwrap().terrain, TerrainType::Grass);
    }

    #[test]
    fn test_short_rows_padded_with_grass() {
        let terrain = TileTerrain::parse("2\nWWW\nW\n", 16.0).unwrap();
        assert_eq!(terrain.width(), 3);
        assert_eq!(terrain.tile_at(2, 1).unwrap().terrain, TerrainType::Grass);
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(TileTerrain::parse("", 16.0), Err(TerrainError::MissingRowCount)));
        assert!(matches!(
            TileTerrain::parse("abc\nGGG", 16.0),
            Err(TerrainError::InvalidRowCount(_))
        ));
        assert!(matches!(
            TileTerrain::parse("3\nGGG\nGGG", 16.0),
            Err(TerrainError::TruncatedLayout { expected: 3, found: 2 })
        ));
        assert!(matches!(TileTerrain::parse("0\n", 16.0), Err(TerrainError::EmptyLayout)));
    }

    #[test]
    fn test_missing_file_defaults_to_grass() {
        let terrain = TileTerrain::load_or_default("does/not/exist/terrain.txt", 80, 45, 16.0);
        assert_eq!(terrain.width(), 80);
        assert_eq!(terrain.height(), 45);
        assert!(terrain
            .tile_at(40, 20)
            .map(|t| t.terrain == TerrainType::Grass)
            .unwrap_or(false));
    }

    #[test]
    fn test_exits_skip_impassable_and_bounds() {
        // Center is water, right-middle is mountains.
        let terrain = TileTerrain::parse("3\nGGG\nGWM\nGGG\n", 16.0).unwrap();

        let corner = terrain.tile_id(0, 0).unwrap();
        assert_eq!(terrain.exits(corner).len(), 2);

        // (1,0) borders the water below it.
        let top_mid = terrain.tile_id(1, 0).unwrap();
        let exits = terrain.exits(top_mid);
        assert_eq!(exits.len(), 2);
        assert!(!exits.contains(&terrain.tile_id(1, 1).unwrap()));

        // (2,0) borders the mountains below it.
        let top_right = terrain.tile_id(2, 0).unwrap();
        assert_eq!(terrain.exits(top_right), &[terrain.tile_id(1, 0).unwrap()]);

        // The water tile itself can still be left.
        let center = terrain.tile_id(1, 1).unwrap();
        assert_eq!(terrain.exits(center).len(), 3);
    }

    #[test]
    fn test_position_to_tile_clamps() {
        let terrain = TileTerrain::all_grass(4, 4, 16.0);
        assert_eq!(terrain.tile_id_at_position(Vec2::new(17.0, 33.0)), terrain.tile_id(1, 2).unwrap());
        assert_eq!(terrain.tile_id_at_position(Vec2::new(-5.0, -5.0)), terrain.tile_id(0, 0).unwrap());
        assert_eq!(terrain.tile_id_at_position(Vec2::new(999.0, 999.0)), terrain.tile_id(3, 3).unwrap());
        assert!(terrain.tile_id(4, 0).is_none());
    }

    #[test]
    fn test_tile_anchor_round_trips() {
        let terrain = TileTerrain::all_grass(10, 10, 16.0);
        let id = terrain.tile_id(3, 7).unwrap();
        let anchor = terrain.tile_anchor(id);
        assert_eq!(anchor, Vec2::new(48.0, 112.0));
        assert_eq!(terrain.tile_id_at_position(anchor), id);
    }

    #[test]
    fn test_pixel_extent() {
        let terrain = TileTerrain::all_grass(80, 45, 16.0);
        assert_eq!(terrain.pixel_extent(), (1280.0, 720.0));
    }

    #[test]
    fn test_speed_modifiers() {
        assert_eq!(TerrainType::Grass.speed_modifier(), 1.0);
        assert_eq!(TerrainType::Forest.speed_modifier(), 0.5);
        assert_eq!(TerrainType::Water.speed_modifier(), 0.0);
        assert!(TerrainType::Mountains.speed_modifier() < TerrainType::Rocks.speed_modifier());
    }

    #[test]
    fn test_passability() {
        assert!(TerrainType::Grass.is_passable());
        assert!(TerrainType::Forest.is_passable());
        assert!(TerrainType::Rocks.is_passable());
        assert!(!TerrainType::Mountains.is_passable());
        assert!(!TerrainType::Water.is_passable());
    }

    #[test]
    fn test_terrain_snapshot() {
        let terrain = TileTerrain::parse("1\nGW\n", 16.0).unwrap();
        let snapshot = TerrainSnapshot::from_terrain(&terrain);
        assert_eq!(snapshot.types, vec![0, 4]);
    }
}
