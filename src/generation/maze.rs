//! # Maze Generation
//!
//! Square mazes for the maze escape game.
//!
//! A maze is asked for from the content source as JSON, validated (bounds,
//! fixed corners, BFS path from start to exit) and retried a few times. When
//! no source is configured or nothing valid comes back, a local generator
//! carves a monotone right/up path first and only then scatters walls around
//! it, so its output is solvable by construction.

use crate::lldm::extract::extract_json_object;
use crate::{
    has_path, shortest_path, ArcadeError, ArcadeResult, GenerationConfig, Generator, LldmClient,
    Position,
};
use log::{debug, info};
use rand::seq::SliceRandom;
use rand::{rngs::StdRng, Rng};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Chance that a cell off the carved path becomes a wall.
const FALLBACK_WALL_CHANCE: f64 = 0.3;

/// Serializes positions as `[x, y]` pairs.
mod cell_serde {
    use crate::Position;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(pos: &Position, serializer: S) -> Result<S::Ok, S::Error> {
        [pos.x, pos.y].serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Position, D::Error> {
        let [x, y] = <[i32; 2]>::deserialize(deserializer)?;
        Ok(Position::new(x, y))
    }
}

mod cell_list_serde {
    use crate::Position;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(cells: &[Position], serializer: S) -> Result<S::Ok, S::Error> {
        cells
            .iter()
            .map(|pos| [pos.x, pos.y])
            .collect::<Vec<_>>()
            .serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Vec<Position>, D::Error> {
        let pairs = Vec::<[i32; 2]>::deserialize(deserializer)?;
        Ok(pairs.into_iter().map(|[x, y]| Position::new(x, y)).collect())
    }
}

/// A maze level: walls, coins and the fixed start and exit corners.
///
/// The JSON form uses `[x, y]` pairs:
///
/// ```
/// use arcade_hub::{MazeLayout, Position};
///
/// let json = r#"{"walls": [[1, 1]], "coins": [[2, 2]], "start": [0, 3], "exit": [3, 0], "size": 4}"#;
/// let layout: MazeLayout = serde_json::from_str(json).unwrap();
/// assert_eq!(layout.walls, vec![Position::new(1, 1)]);
/// assert!(layout.is_solvable());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MazeLayout {
    #[serde(with = "cell_list_serde")]
    pub walls: Vec<Position>,
    #[serde(with = "cell_list_serde")]
    pub coins: Vec<Position>,
    #[serde(with = "cell_serde")]
    pub start: Position,
    #[serde(with = "cell_serde")]
    pub exit: Position,
    pub size: usize,
}

impl MazeLayout {
    /// Start corner for a maze of the given size (bottom-left).
    pub fn start_for(size: usize) -> Position {
        Position::new(0, size as i32 - 1)
    }

    /// Exit corner for a maze of the given size (top-right).
    pub fn exit_for(size: usize) -> Position {
        Position::new(size as i32 - 1, 0)
    }

    /// An empty maze of the given size.
    pub fn open(size: usize) -> Self {
        Self {
            walls: Vec::new(),
            coins: Vec::new(),
            start: Self::start_for(size),
            exit: Self::exit_for(size),
            size,
        }
    }

    pub fn wall_set(&self) -> HashSet<Position> {
        self.walls.iter().copied().collect()
    }

    pub fn in_bounds(&self, pos: Position) -> bool {
        let size = self.size as i32;
        pos.x >= 0 && pos.y >= 0 && pos.x < size && pos.y < size
    }

    /// True if a 4-neighbour path leads from start to exit.
    pub fn is_solvable(&self) -> bool {
        has_path(self.size as i32, &self.wall_set(), self.start, self.exit)
    }

    /// A shortest walking path from start to exit, if one exists.
    pub fn solution_path(&self) -> Option<Vec<Position>> {
        shortest_path(self.size as i32, &self.wall_set(), self.start, self.exit)
    }

    /// Checks the layout against the requested size.
    pub fn check(&self, expected_size: usize) -> ArcadeResult<()> {
        if self.size != expected_size || self.size < 2 {
            return Err(invalid(format!(
                "size {} does not match requested {}",
                self.size, expected_size
            )));
        }

        let all_cells = self
            .walls
            .iter()
            .chain(self.coins.iter())
            .chain([&self.start, &self.exit]);
        if let Some(outside) = all_cells.into_iter().find(|pos| !self.in_bounds(**pos)) {
            return Err(invalid(format!("cell {:?} is out of bounds", outside)));
        }

        if self.start != Self::start_for(self.size) || self.exit != Self::exit_for(self.size) {
            return Err(invalid("start or exit is not at its fixed corner".to_string()));
        }

        let walls = self.wall_set();
        if walls.contains(&self.start) || walls.contains(&self.exit) {
            return Err(invalid("start or exit is walled in".to_string()));
        }

        if let Some(coin) = self.coins.iter().find(|coin| walls.contains(*coin)) {
            return Err(invalid(format!("coin {:?} sits on a wall", coin)));
        }

        if !self.is_solvable() {
            return Err(invalid("no path from start to exit".to_string()));
        }

        Ok(())
    }
}

fn invalid(reason: String) -> ArcadeError {
    ArcadeError::GenerationFailed(format!("Invalid maze: {}", reason))
}

/// Generates maze layouts, from a content source when possible.
#[derive(Debug, Clone, Default)]
pub struct MazeGenerator;

impl MazeGenerator {
    pub fn new() -> Self {
        Self
    }

    /// Builds the request sent to the content source.
    pub fn prompt(&self, level: u32, size: usize) -> String {
        let min_walls = size as u32 * 2 + level * 5;
        let coins = level + 3;
        let last = size.saturating_sub(1);
        format!(
            "Generate a {size}x{size} maze for level {level}. Return only a JSON object with this exact structure:\n\
             {{\"walls\": [[x, y], ...], \"coins\": [[x, y], ...], \"start\": [0, {last}], \"exit\": [{last}, 0], \"size\": {size}}}\n\
             Requirements:\n\
             - There MUST be a clear path from start [0, {last}] to exit [{last}, 0]\n\
             - Add {min_walls} wall blocks around the guaranteed path\n\
             - Place {coins} coins along or near the path\n\
             Unique seed: {seed}",
            seed = level * 1000 + size as u32,
        )
    }

    /// Extracts, parses and validates one content source response.
    pub fn parse_response(&self, text: &str, config: &GenerationConfig) -> ArcadeResult<MazeLayout> {
        let json = extract_json_object(text)
            .ok_or_else(|| ArcadeError::LldmError("No JSON object in response".to_string()))?;
        let layout: MazeLayout = serde_json::from_str(json)?;
        self.validate(&layout, config)?;
        Ok(layout)
    }

    /// Asks the content source for a maze, falling back to local generation.
    pub fn generate_with_source(
        &self,
        client: &mut LldmClient,
        config: &GenerationConfig,
        rng: &mut StdRng,
    ) -> ArcadeResult<MazeLayout> {
        if config.use_lldm {
            let prompt = self.prompt(config.level, config.maze_size);
            if let Some(layout) =
                client.request_validated(&prompt, |text| self.parse_response(text, config))
            {
                info!("Using generated maze for level {}", config.level);
                return Ok(layout);
            }
            info!("Falling back to local maze for level {}", config.level);
        }
        self.generate(config, rng)
    }

    /// Carves the guaranteed path from start to exit, in walking order.
    ///
    /// Level 1 always goes right first. Later levels pick right or up at
    /// random while both remain possible.
    pub fn carve_path(&self, level: u32, size: usize, rng: &mut StdRng) -> Vec<Position> {
        let exit = MazeLayout::exit_for(size);
        let mut current = MazeLayout::start_for(size);
        let mut path = vec![current];

        while current != exit {
            let can_right = current.x < exit.x;
            let can_up = current.y > exit.y;
            let go_right = can_right && (!can_up || level <= 1 || rng.gen_bool(0.5));
            current = if go_right {
                Position::new(current.x + 1, current.y)
            } else {
                Position::new(current.x, current.y - 1)
            };
            path.push(current);
        }
        path
    }
}

impl Generator<MazeLayout> for MazeGenerator {
    /// Local generation. Always solvable.
    fn generate(&self, config: &GenerationConfig, rng: &mut StdRng) -> ArcadeResult<MazeLayout> {
        let size = config.maze_size;
        if size < 2 {
            return Err(ArcadeError::GenerationFailed(format!(
                "Maze size {} is too small",
                size
            )));
        }

        let path = self.carve_path(config.level, size, rng);
        let on_path: HashSet<Position> = path.iter().copied().collect();
        let mut layout = MazeLayout::open(size);

        for x in 0..size as i32 {
            for y in 0..size as i32 {
                let pos = Position::new(x, y);
                if !on_path.contains(&pos) && rng.gen_bool(FALLBACK_WALL_CHANCE) {
                    layout.walls.push(pos);
                }
            }
        }

        let coin_spots: Vec<Position> = path
            .iter()
            .copied()
            .filter(|pos| *pos != layout.start)
            .collect();
        let coin_count = (config.level as usize + 3).min(coin_spots.len());
        layout.coins = coin_spots
            .choose_multiple(rng, coin_count)
            .copied()
            .collect();

        debug!(
            "Fallback maze level {}: {} walls, {} coins",
            config.level,
            layout.walls.len(),
            layout.coins.len()
        );
        Ok(layout)
    }

    fn validate(&self, layout: &MazeLayout, config: &GenerationConfig) -> ArcadeResult<()> {
        layout.check(config.maze_size)
    }

    fn generator_type(&self) -> &'static str {
        "MazeGenerator"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::utils::create_rng;

    fn config(level: u32) -> GenerationConfig {
        GenerationConfig::new(99).for_level(level)
    }

    fn valid_json() -> String {
        let mut layout = MazeLayout::open(10);
        layout.walls = vec![Position::new(5, 5), Position::new(3, 2)];
        layout.coins = vec![Position::new(4, 9)];
        serde_json::to_string(&layout).unwrap()
    }

    #[test]
    fn test_json_shape_uses_pairs() {
        let json = valid_json();
        assert!(json.contains("\"walls\":[[5,5],[3,2]]"));
        assert!(json.contains("\"start\":[0,9]"));
    }

    #[test]
    fn test_fallback_is_solvable_for_many_seeds() {
        let generator = MazeGenerator::new();
        for seed in 0..50 {
            for level in 1..=5 {
                let config = GenerationConfig::for_testing(seed).for_level(level);
                let layout = generator.generate(&config, &mut create_rng(&config)).unwrap();
                assert!(generator.validate(&layout, &config).is_ok());
                assert_eq!(layout.coins.len(), (level as usize + 3));
            }
        }
    }

    #[test]
    fn test_level_one_path_goes_right_first() {
        let generator = MazeGenerator::new();
        let config = config(1);
        let path = generator.carve_path(1, 10, &mut create_rng(&config));
        assert_eq!(path.len(), 19);
        assert_eq!(path[9], Position::new(9, 9));
        assert_eq!(path.last(), Some(&Position::new(9, 0)));
    }

    #[test]
    fn test_rejects_unsolvable_layout() {
        let mut layout = MazeLayout::open(10);
        layout.walls = vec![Position::new(8, 0), Position::new(9, 1)];
        let err = layout.check(10).unwrap_err();
        assert!(err.to_string().contains("no path"));
    }

    #[test]
    fn test_rejects_wrong_corners_and_bounds() {
        let mut layout = MazeLayout::open(10);
        layout.start = Position::new(0, 0);
        assert!(layout.check(10).is_err());

        let mut layout = MazeLayout::open(10);
        layout.coins = vec![Position::new(10, 3)];
        assert!(layout.check(10).is_err());

        assert!(MazeLayout::open(8).check(10).is_err());
    }

    #[test]
    fn test_source_response_is_used_when_valid() {
        let generator = MazeGenerator::new();
        let config = config(2);
        let response = format!("Here is your maze:\n```json\n{}\n```", valid_json());
        let mut client = LldmClient::scripted(["not json at all".to_string(), response]);
        let layout = generator
            .generate_with_source(&mut client, &config, &mut create_rng(&config))
            .unwrap();
        assert_eq!(layout.walls.len(), 2);
        assert_eq!(client.stats.attempts, 2);
    }

    #[test]
    fn test_falls_back_after_three_bad_responses() {
        let generator = MazeGenerator::new();
        let config = config(3);
        let sealed = r#"{"walls": [[8,0],[9,1]], "coins": [], "start": [0,9], "exit": [9,0], "size": 10}"#;
        let mut client = LldmClient::scripted([sealed, sealed, sealed, sealed]);
        let layout = generator
            .generate_with_source(&mut client, &config, &mut create_rng(&config))
            .unwrap();
        assert!(layout.is_solvable());
        assert_eq!(client.stats.attempts, 3);
        assert_eq!(client.stats.exhausted, 1);
    }

    #[test]
    fn test_prompt_mentions_requirements() {
        let prompt = MazeGenerator::new().prompt(2, 10);
        assert!(prompt.contains("30 wall blocks"));
        assert!(prompt.contains("5 coins"));
        assert!(prompt.contains("[0, 9]"));
    }
}
