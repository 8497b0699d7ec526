//! # Game Module
//!
//! The five arcade games, the hub that selects between them, and the session
//! state that outlives any single run.
//!
//! Every game is a plain struct advanced by [`Minigame::tick`], one frame at a
//! time, and steered by [`GameInput`] values. Nothing here touches a window or
//! a clock, so a whole run can be replayed from a seed and an input script.

pub mod autopilot;
pub mod crawler;
pub mod enemies;
pub mod hub;
pub mod maze_escape;
pub mod progression;
pub mod racing;
pub mod runner;
pub mod shooter;
pub mod state;

pub use autopilot::*;
pub use crawler::*;
pub use enemies::*;
pub use hub::*;
pub use maze_escape::*;
pub use progression::*;
pub use racing::*;
pub use runner::*;
pub use shooter::*;
pub use state::*;

use crate::input::GameInput;
use crate::{ArcadeError, ArcadeResult, GenerationConfig, LldmClient};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Represents a cell coordinate on a tile or maze grid.
///
/// # Examples
///
/// ```
/// use arcade_hub::Position;
///
/// let pos = Position::new(10, 5);
/// assert_eq!(pos.x, 10);
/// assert_eq!(pos.y, 5);
///
/// let adjacent = pos.adjacent_positions();
/// assert_eq!(adjacent.len(), 8); // All 8 surrounding positions
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    /// Creates a new position with the given coordinates.
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Calculates the Manhattan distance to another position.
    ///
    /// # Examples
    ///
    /// ```
    /// use arcade_hub::Position;
    ///
    /// let pos1 = Position::new(0, 0);
    /// let pos2 = Position::new(3, 4);
    /// assert_eq!(pos1.manhattan_distance(pos2), 7);
    /// ```
    pub fn manhattan_distance(self, other: Position) -> u32 {
        ((self.x - other.x).abs() + (self.y - other.y).abs()) as u32
    }

    /// Calculates the Euclidean distance to another position.
    pub fn euclidean_distance(self, other: Position) -> f64 {
        let dx = (self.x - other.x) as f64;
        let dy = (self.y - other.y) as f64;
        (dx * dx + dy * dy).sqrt()
    }

    /// Returns all 8 adjacent positions (including diagonals).
    pub fn adjacent_positions(self) -> Vec<Position> {
        let mut adjacent = Vec::with_capacity(8);
        for dy in -1..=1 {
            for dx in -1..=1 {
                if dx != 0 || dy != 0 {
                    adjacent.push(Position::new(self.x + dx, self.y + dy));
                }
            }
        }
        adjacent
    }

    /// Returns only the 4 cardinal adjacent positions (no diagonals).
    pub fn cardinal_adjacent_positions(self) -> Vec<Position> {
        Direction::all()
            .into_iter()
            .map(|direction| self + direction.to_delta())
            .collect()
    }

    /// Moves one step in the given direction.
    pub fn step(self, direction: Direction) -> Position {
        self + direction.to_delta()
    }
}

impl std::ops::Add for Position {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self::new(self.x + other.x, self.y + other.y)
    }
}

impl std::ops::Sub for Position {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Self::new(self.x - other.x, self.y - other.y)
    }
}

/// Screen-space directions. Up is towards row zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// Converts a direction to a grid delta.
    ///
    /// # Examples
    ///
    /// ```
    /// use arcade_hub::{Direction, Position};
    ///
    /// assert_eq!(Direction::Up.to_delta(), Position::new(0, -1));
    /// ```
    pub fn to_delta(self) -> Position {
        match self {
            Direction::Up => Position::new(0, -1),
            Direction::Down => Position::new(0, 1),
            Direction::Left => Position::new(-1, 0),
            Direction::Right => Position::new(1, 0),
        }
    }

    /// Converts a grid delta to a direction.
    ///
    /// Returns None if the delta is not a single cardinal step.
    pub fn from_delta(delta: Position) -> Option<Direction> {
        match (delta.x, delta.y) {
            (0, -1) => Some(Direction::Up),
            (0, 1) => Some(Direction::Down),
            (-1, 0) => Some(Direction::Left),
            (1, 0) => Some(Direction::Right),
            _ => None,
        }
    }

    /// Returns all 4 directions.
    pub fn all() -> [Direction; 4] {
        [
            Direction::Up,
            Direction::Down,
            Direction::Left,
            Direction::Right,
        ]
    }

    pub fn opposite(self) -> Direction {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }
}

/// Unique identifier for game entities.
pub type EntityId = Uuid;

/// Creates a new unique entity ID.
pub fn new_entity_id() -> EntityId {
    Uuid::new_v4()
}

/// The games available from the hub, in hub slot order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum GameKind {
    Crawler,
    Maze,
    Runner,
    Racing,
    Shooter,
}

impl GameKind {
    pub fn all() -> [GameKind; 5] {
        [
            GameKind::Crawler,
            GameKind::Maze,
            GameKind::Runner,
            GameKind::Racing,
            GameKind::Shooter,
        ]
    }

    /// Display title used by the hub and HUD.
    pub fn title(self) -> &'static str {
        match self {
            GameKind::Crawler => "Dungeon Crawler",
            GameKind::Maze => "Maze Escape",
            GameKind::Runner => "Monkey Run",
            GameKind::Racing => "Drag Racing",
            GameKind::Shooter => "Space Shooter",
        }
    }

    /// Maps a hub slot to its game. Slots past the last game are empty.
    pub fn from_slot(slot: usize) -> Option<GameKind> {
        GameKind::all().get(slot).copied()
    }

    /// Parses the short names accepted on the command line.
    pub fn from_name(name: &str) -> ArcadeResult<GameKind> {
        match name.to_lowercase().as_str() {
            "crawler" | "dungeon" => Ok(GameKind::Crawler),
            "maze" => Ok(GameKind::Maze),
            "runner" | "monkey" => Ok(GameKind::Runner),
            "racing" | "race" => Ok(GameKind::Racing),
            "shooter" | "space" => Ok(GameKind::Shooter),
            other => Err(ArcadeError::InvalidAction(format!(
                "Unknown game: {}",
                other
            ))),
        }
    }
}

/// Common surface of every game in the collection.
pub trait Minigame {
    /// Which game this is.
    fn kind(&self) -> GameKind;

    /// Applies one player input. Inputs meant for another game are rejected.
    fn apply_input(&mut self, input: &GameInput) -> ArcadeResult<()>;

    /// Advances the simulation by one frame.
    fn tick(&mut self) -> ArcadeResult<()>;

    /// Current score as shown on the HUD.
    fn score(&self) -> u64;

    /// True once the run has ended, in victory or defeat.
    fn is_over(&self) -> bool;

    /// Starts a fresh run with the same configuration.
    fn restart(&mut self) -> ArcadeResult<()>;

    /// One-line status summary.
    fn status_line(&self) -> String;
}

/// Builds the error returned when a game receives another game's input.
pub(crate) fn wrong_input(kind: GameKind, input: &GameInput) -> ArcadeError {
    ArcadeError::InvalidAction(format!("{} cannot handle {:?}", kind.title(), input))
}

/// One running game of any kind.
#[derive(Debug)]
pub enum ActiveGame {
    Crawler(Box<CrawlerGame>),
    Maze(Box<MazeGame>),
    Runner(RunnerGame),
    Racing(RacingGame),
    Shooter(ShooterGame),
}

impl ActiveGame {
    /// Starts a new game of the given kind.
    ///
    /// The maze asks the content source for levels, and so does the runner
    /// when `config.runner_patterns` is set. Other games ignore the client.
    pub fn start(kind: GameKind, config: &GenerationConfig, client: LldmClient) -> ArcadeResult<Self> {
        Ok(match kind {
            GameKind::Crawler => ActiveGame::Crawler(Box::new(CrawlerGame::new(config.seed)?)),
            GameKind::Maze => ActiveGame::Maze(Box::new(MazeGame::new(config.clone(), client)?)),
            GameKind::Runner if config.runner_patterns => {
                ActiveGame::Runner(RunnerGame::with_patterns(config.seed, client))
            }
            GameKind::Runner => ActiveGame::Runner(RunnerGame::new(config.seed)),
            GameKind::Racing => ActiveGame::Racing(RacingGame::new(config.seed)),
            GameKind::Shooter => ActiveGame::Shooter(ShooterGame::new(config.seed)),
        })
    }

    fn as_minigame(&self) -> &dyn Minigame {
        match self {
            ActiveGame::Crawler(game) => &**game,
            ActiveGame::Maze(game) => &**game,
            ActiveGame::Runner(game) => game,
            ActiveGame::Racing(game) => game,
            ActiveGame::Shooter(game) => game,
        }
    }

    fn as_minigame_mut(&mut self) -> &mut dyn Minigame {
        match self {
            ActiveGame::Crawler(game) => &mut **game,
            ActiveGame::Maze(game) => &mut **game,
            ActiveGame::Runner(game) => game,
            ActiveGame::Racing(game) => game,
            ActiveGame::Shooter(game) => game,
        }
    }
}

impl Minigame for ActiveGame {
    fn kind(&self) -> GameKind {
        self.as_minigame().kind()
    }

    fn apply_input(&mut self, input: &GameInput) -> ArcadeResult<()> {
        self.as_minigame_mut().apply_input(input)
    }

    fn tick(&mut self) -> ArcadeResult<()> {
        self.as_minigame_mut().tick()
    }

    fn score(&self) -> u64 {
        self.as_minigame().score()
    }

    fn is_over(&self) -> bool {
        self.as_minigame().is_over()
    }

    fn restart(&mut self) -> ArcadeResult<()> {
        self.as_minigame_mut().restart()
    }

    fn status_line(&self) -> String {
        self.as_minigame().status_line()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_manhattan_distance() {
        let pos1 = Position::new(0, 0);
        let pos2 = Position::new(3, 4);
        assert_eq!(pos1.manhattan_distance(pos2), 7);
        assert_eq!(pos1.euclidean_distance(pos2), 5.0);
    }

    #[test]
    fn test_position_adjacent() {
        let pos = Position::new(5, 5);
        let adjacent = pos.adjacent_positions();
        assert_eq!(adjacent.len(), 8);
        assert!(adjacent.contains(&Position::new(4, 4)));
        assert!(!adjacent.contains(&pos));
    }

    #[test]
    fn test_position_cardinal_adjacent() {
        let pos = Position::new(5, 5);
        let adjacent = pos.cardinal_adjacent_positions();
        assert_eq!(adjacent.len(), 4);
        assert!(adjacent.contains(&Position::new(5, 4)));
        assert!(!adjacent.contains(&Position::new(4, 4)));
    }

    #[test]
    fn test_direction_round_trip_delta() {
        for direction in Direction::all() {
            assert_eq!(Direction::from_delta(direction.to_delta()), Some(direction));
            assert_eq!(direction.opposite().opposite(), direction);
        }
        assert_eq!(Direction::from_delta(Position::new(1, 1)), None);
    }

    #[test]
    fn test_game_kind_slots() {
        assert_eq!(GameKind::from_slot(0), Some(GameKind::Crawler));
        assert_eq!(GameKind::from_slot(4), Some(GameKind::Shooter));
        assert_eq!(GameKind::from_slot(5), None);
        assert_eq!(GameKind::from_name("Maze").unwrap(), GameKind::Maze);
        assert!(GameKind::from_name("pinball").is_err());
    }

    #[test]
    fn test_entity_id_uniqueness() {
        assert_ne!(new_entity_id(), new_entity_id());
    }

    #[test]
    fn test_active_game_dispatch() {
        let config = GenerationConfig::for_testing(7);
        for kind in GameKind::all() {
            let mut game = ActiveGame::start(kind, &config, LldmClient::offline()).unwrap();
            assert_eq!(game.kind(), kind);
            assert!(!game.is_over());
            game.tick().unwrap();
            assert!(!game.status_line().is_empty());
        }
    }

    #[test]
    fn test_runner_mode_follows_config() {
        let mut config = GenerationConfig::for_testing(7);
        let game = ActiveGame::start(GameKind::Runner, &config, LldmClient::offline()).unwrap();
        let ActiveGame::Runner(runner) = &game else {
            panic!("expected a runner");
        };
        assert_eq!(runner.mode, SpawnMode::Timers);

        config.runner_patterns = true;
        let mut game = ActiveGame::start(GameKind::Runner, &config, LldmClient::offline()).unwrap();
        game.tick().unwrap();
        let ActiveGame::Runner(runner) = &game else {
            panic!("expected a runner");
        };
        assert_eq!(runner.mode, SpawnMode::Patterns);
        assert!(!runner.queue.is_empty());
    }
}
