//! # Dungeon Generation
//!
//! Tilemap generation for the dungeon crawler.
//!
//! Fire levels (1 and 2) are a walled arena lined with a ring of fire and
//! dotted with square wall clusters. The poison level (3) has no walls and is
//! instead broken up by ragged poison pools. Every cluster is tried on a copy
//! of the map and only kept if all floor tiles stay connected, so the player
//! can always reach every enemy.

use crate::{
    all_open_cells_reachable, config, ArcadeError, ArcadeResult, GenerationConfig, Generator,
    Position, Rect,
};
use log::debug;
use rand::{rngs::StdRng, Rng};
use serde::{Deserialize, Serialize};

/// Terrain of a single dungeon tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Terrain {
    Floor,
    Wall,
    Fire,
    Poison,
}

impl Terrain {
    /// Fire and poison kill on contact.
    pub fn is_hazard(self) -> bool {
        matches!(self, Terrain::Fire | Terrain::Poison)
    }
}

/// A terrain type paired with a purely visual variant index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    pub terrain: Terrain,
    pub variant: u8,
}

impl Tile {
    pub fn new(terrain: Terrain, variant: u8) -> Self {
        Self { terrain, variant }
    }
}

/// A generated dungeon level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DungeonMap {
    pub width: i32,
    pub height: i32,
    /// Level this map was generated for
    pub level: u32,
    /// Row-major tiles, indexed `tiles[y][x]`
    pub tiles: Vec<Vec<Tile>>,
}

impl DungeonMap {
    /// Creates a map filled with plain floor.
    pub fn filled(width: i32, height: i32, level: u32) -> Self {
        let row = vec![Tile::new(Terrain::Floor, 0); width.max(0) as usize];
        Self {
            width,
            height,
            level,
            tiles: vec![row; height.max(0) as usize],
        }
    }

    /// Level 3 swaps walls and fire for poison pools.
    pub fn is_poison_level(&self) -> bool {
        self.level >= config::CRAWLER_LEVELS
    }

    pub fn in_bounds(&self, pos: Position) -> bool {
        pos.x >= 0 && pos.y >= 0 && pos.x < self.width && pos.y < self.height
    }

    pub fn tile(&self, pos: Position) -> Option<&Tile> {
        if !self.in_bounds(pos) {
            return None;
        }
        self.tiles
            .get(pos.y as usize)
            .and_then(|row| row.get(pos.x as usize))
    }

    pub fn terrain_at(&self, pos: Position) -> Option<Terrain> {
        self.tile(pos).map(|tile| tile.terrain)
    }

    pub fn set_terrain(&mut self, pos: Position, terrain: Terrain) {
        if self.in_bounds(pos) {
            self.tiles[pos.y as usize][pos.x as usize].terrain = terrain;
        }
    }

    /// Walls and anything off the map block movement.
    pub fn is_blocking(&self, pos: Position) -> bool {
        !matches!(
            self.terrain_at(pos),
            Some(Terrain::Floor | Terrain::Fire | Terrain::Poison)
        )
    }

    /// Pixel rectangle covered by a tile.
    pub fn tile_rect(pos: Position) -> Rect {
        Rect::new(
            pos.x as f32 * config::TILE_SIZE,
            pos.y as f32 * config::TILE_SIZE,
            config::TILE_SIZE,
            config::TILE_SIZE,
        )
    }

    /// Tile containing a pixel coordinate.
    pub fn tile_at_pixel(x: f32, y: f32) -> Position {
        Position::new(
            (x / config::TILE_SIZE).floor() as i32,
            (y / config::TILE_SIZE).floor() as i32,
        )
    }

    fn cells_where(&self, pred: impl Fn(Terrain) -> bool) -> Vec<Position> {
        let mut cells = Vec::new();
        for y in 0..self.height {
            for x in 0..self.width {
                let pos = Position::new(x, y);
                if self.terrain_at(pos).is_some_and(&pred) {
                    cells.push(pos);
                }
            }
        }
        cells
    }

    pub fn floor_cells(&self) -> Vec<Position> {
        self.cells_where(|t| t == Terrain::Floor)
    }

    pub fn hazard_cells(&self) -> Vec<Position> {
        self.cells_where(Terrain::is_hazard)
    }

    /// Pixel rectangles of every wall tile.
    pub fn walls(&self) -> Vec<Rect> {
        self.cells_where(|t| t == Terrain::Wall)
            .into_iter()
            .map(Self::tile_rect)
            .collect()
    }

    /// Pixel rectangles of every fire or poison tile.
    pub fn hazards(&self) -> Vec<Rect> {
        self.hazard_cells().into_iter().map(Self::tile_rect).collect()
    }

    /// True if every floor tile can reach every other without crossing a
    /// wall or hazard.
    pub fn is_fully_connected(&self) -> bool {
        all_open_cells_reachable(self.width, self.height, |pos| {
            self.terrain_at(pos) == Some(Terrain::Floor)
        })
    }

    /// Pixel centre of the whole map.
    pub fn pixel_center(&self) -> crate::Vec2 {
        crate::Vec2::new(
            self.width as f32 * config::TILE_SIZE / 2.0,
            self.height as f32 * config::TILE_SIZE / 2.0,
        )
    }
}

/// Generates crawler tilemaps with flood-fill validated clusters.
#[derive(Debug, Clone)]
pub struct DungeonGenerator {
    /// Map width in tiles
    pub width: i32,
    /// Map height in tiles
    pub height: i32,
    /// Inclusive range of wall cluster attempts on fire levels
    pub obstacle_attempts: (u32, u32),
    /// Inclusive range of wall cluster edge lengths
    pub obstacle_size: (i32, i32),
    /// Inclusive range of poison pool attempts
    pub pool_attempts: (u32, u32),
    /// Inclusive range of poison pool edge lengths
    pub pool_size: (i32, i32),
    /// Chance that a cell inside a pool becomes poison
    pub pool_density: f64,
}

impl Default for DungeonGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl DungeonGenerator {
    /// Creates a generator sized to the crawler screen.
    ///
    /// # Examples
    ///
    /// ```
    /// use arcade_hub::{DungeonGenerator, GenerationConfig, Generator};
    /// use arcade_hub::generation::utils::create_rng;
    ///
    /// let config = GenerationConfig::for_testing(3);
    /// let generator = DungeonGenerator::new();
    /// let map = generator.generate(&config, &mut create_rng(&config)).unwrap();
    /// assert_eq!((map.width, map.height), (20, 15));
    /// assert!(map.is_fully_connected());
    /// ```
    pub fn new() -> Self {
        Self {
            width: (config::WINDOW_WIDTH / config::TILE_SIZE) as i32,
            height: (config::WINDOW_HEIGHT / config::TILE_SIZE) as i32,
            obstacle_attempts: (5, 8),
            obstacle_size: (2, 3),
            pool_attempts: (6, 8),
            pool_size: (3, 4),
            pool_density: 0.7,
        }
    }

    /// An empty arena of the right kind for the level: the walled fire ring,
    /// or open floor for the poison level.
    pub fn arena(&self, level: u32, rng: &mut StdRng) -> DungeonMap {
        let mut map = DungeonMap::filled(self.width, self.height, level);
        for row in map.tiles.iter_mut() {
            for tile in row.iter_mut() {
                tile.variant = rng.gen_range(0..=2);
            }
        }

        if map.is_poison_level() {
            return map;
        }

        let (w, h) = (self.width, self.height);
        for y in 0..h {
            for x in 0..w {
                let pos = Position::new(x, y);
                if x == 0 || y == 0 || x == w - 1 || y == h - 1 {
                    map.set_terrain(pos, Terrain::Wall);
                } else if x == 1 || y == 1 || x == w - 2 || y == h - 2 {
                    map.set_terrain(pos, Terrain::Fire);
                }
            }
        }
        map
    }

    fn place_wall_clusters(&self, map: &mut DungeonMap, rng: &mut StdRng) {
        let (w, h) = (self.width, self.height);
        let attempts = rng.gen_range(self.obstacle_attempts.0..=self.obstacle_attempts.1);
        let mut placed = 0;

        for _ in 0..attempts {
            let x = rng.gen_range(2..=w - 3);
            let y = rng.gen_range(2..=h - 3);
            let size = rng.gen_range(self.obstacle_size.0..=self.obstacle_size.1);

            let mut candidate = map.clone();
            for i in 0..size {
                for j in 0..size {
                    let pos = Position::new(x + j, y + i);
                    if candidate.terrain_at(pos) == Some(Terrain::Floor) {
                        candidate.set_terrain(pos, Terrain::Wall);
                    }
                }
            }

            if candidate.is_fully_connected() {
                *map = candidate;
                placed += 1;
            }
        }
        debug!("Placed {} of {} wall clusters", placed, attempts);
    }

    fn place_poison_pools(&self, map: &mut DungeonMap, rng: &mut StdRng) {
        let (w, h) = (self.width, self.height);
        let attempts = rng.gen_range(self.pool_attempts.0..=self.pool_attempts.1);
        let mut placed = 0;

        for _ in 0..attempts {
            let x = rng.gen_range(2..=w - 3);
            let y = rng.gen_range(2..=h - 3);
            let size = rng.gen_range(self.pool_size.0..=self.pool_size.1);

            let mut candidate = map.clone();
            for i in 0..size {
                for j in 0..size {
                    let (cx, cy) = (x + j, y + i);
                    if cx < w - 1 && cy < h - 1 && rng.gen_bool(self.pool_density) {
                        candidate.set_terrain(Position::new(cx, cy), Terrain::Poison);
                    }
                }
            }

            if candidate.is_fully_connected() {
                *map = candidate;
                placed += 1;
            }
        }
        debug!("Placed {} of {} poison pools", placed, attempts);
    }
}

impl Generator<DungeonMap> for DungeonGenerator {
    fn generate(&self, config: &GenerationConfig, rng: &mut StdRng) -> ArcadeResult<DungeonMap> {
        let mut map = self.arena(config.level, rng);
        if map.is_poison_level() {
            self.place_poison_pools(&mut map, rng);
        } else {
            self.place_wall_clusters(&mut map, rng);
        }

        if self.validate(&map, config).is_err() {
            debug!("Generated map failed validation, using open arena");
            return Ok(self.arena(config.level, rng));
        }
        Ok(map)
    }

    fn validate(&self, map: &DungeonMap, _config: &GenerationConfig) -> ArcadeResult<()> {
        if map.tiles.len() != map.height as usize
            || map.tiles.iter().any(|row| row.len() != map.width as usize)
        {
            return Err(ArcadeError::GenerationFailed(
                "Tile rows do not match map dimensions".to_string(),
            ));
        }

        if !map.is_fully_connected() {
            return Err(ArcadeError::GenerationFailed(
                "Floor tiles are not all connected".to_string(),
            ));
        }

        Ok(())
    }

    fn generator_type(&self) -> &'static str {
        "DungeonGenerator"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::utils::create_rng;

    fn generate(seed: u64, level: u32) -> DungeonMap {
        let config = GenerationConfig::for_testing(seed).for_level(level);
        let mut rng = create_rng(&config);
        DungeonGenerator::new().generate(&config, &mut rng).unwrap()
    }

    #[test]
    fn test_fire_level_has_border_and_ring() {
        let map = generate(1, 1);
        assert_eq!(map.terrain_at(Position::new(0, 0)), Some(Terrain::Wall));
        assert_eq!(map.terrain_at(Position::new(19, 14)), Some(Terrain::Wall));
        assert_eq!(map.terrain_at(Position::new(1, 7)), Some(Terrain::Fire));
        assert_eq!(map.terrain_at(Position::new(10, 13)), Some(Terrain::Fire));
    }

    #[test]
    fn test_generated_maps_stay_connected() {
        for seed in 0..20 {
            for level in 1..=3 {
                let map = generate(seed, level);
                assert!(map.is_fully_connected(), "seed {} level {}", seed, level);
                assert!(!map.floor_cells().is_empty());
            }
        }
    }

    #[test]
    fn test_poison_level_has_no_walls() {
        let map = generate(5, 3);
        assert!(map.walls().is_empty());
        assert!(map
            .hazard_cells()
            .iter()
            .all(|p| map.terrain_at(*p) == Some(Terrain::Poison)));
    }

    #[test]
    fn test_validate_rejects_sealed_room() {
        let generator = DungeonGenerator::new();
        let config = GenerationConfig::for_testing(1);
        let mut map = DungeonMap::filled(6, 6, 1);
        for y in 0..6 {
            map.set_terrain(Position::new(3, y), Terrain::Wall);
        }
        assert!(generator.validate(&map, &config).is_err());
    }

    #[test]
    fn test_pixel_tile_conversion() {
        let rect = DungeonMap::tile_rect(Position::new(2, 3));
        assert_eq!((rect.x, rect.y), (80.0, 120.0));
        assert_eq!(DungeonMap::tile_at_pixel(85.0, 159.0), Position::new(2, 3));
    }
}
