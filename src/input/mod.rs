//! # Input Module
//!
//! Key events and their translation into per-game commands.
//!
//! There is no live keyboard polling: keys arrive as [`Key`] values from
//! whatever drives the game (a script, the CLI, a test) and the
//! [`InputHandler`] maps them to commands for the running game.

pub mod commands;

pub use commands::*;

use crate::game::{Direction, GameKind};
use crate::{ArcadeError, ArcadeResult};
use serde::{Deserialize, Serialize};

/// The keys the games react to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    Up,
    Down,
    Left,
    Right,
    W,
    A,
    S,
    D,
    Space,
    Enter,
    Escape,
    R,
    X,
    Num1,
    Num2,
}

impl Key {
    /// Parses a key name as written in input scripts.
    ///
    /// # Examples
    ///
    /// ```
    /// use arcade_hub::Key;
    ///
    /// assert_eq!(Key::parse("space").unwrap(), Key::Space);
    /// assert_eq!(Key::parse("UP").unwrap(), Key::Up);
    /// assert!(Key::parse("F13").is_err());
    /// ```
    pub fn parse(name: &str) -> ArcadeResult<Key> {
        let key = match name.trim().to_lowercase().as_str() {
            "up" => Key::Up,
            "down" => Key::Down,
            "left" => Key::Left,
            "right" => Key::Right,
            "w" => Key::W,
            "a" => Key::A,
            "s" => Key::S,
            "d" => Key::D,
            "space" => Key::Space,
            "enter" | "return" => Key::Enter,
            "escape" | "esc" => Key::Escape,
            "r" => Key::R,
            "x" => Key::X,
            "1" => Key::Num1,
            "2" => Key::Num2,
            other => {
                return Err(ArcadeError::InvalidAction(format!(
                    "Unknown key: {}",
                    other
                )))
            }
        };
        Ok(key)
    }

    /// Direction for the arrow keys.
    pub fn arrow_direction(self) -> Option<Direction> {
        match self {
            Key::Up => Some(Direction::Up),
            Key::Down => Some(Direction::Down),
            Key::Left => Some(Direction::Left),
            Key::Right => Some(Direction::Right),
            _ => None,
        }
    }

    /// Direction for the WASD keys.
    pub fn wasd_direction(self) -> Option<Direction> {
        match self {
            Key::W => Some(Direction::Up),
            Key::S => Some(Direction::Down),
            Key::A => Some(Direction::Left),
            Key::D => Some(Direction::Right),
            _ => None,
        }
    }
}

/// Input handler mapping keys to game and menu commands.
#[derive(Debug, Clone, Default)]
pub struct InputHandler {
    /// Let the crawler also move with the arrow keys
    pub arrows_move_crawler: bool,
}

impl InputHandler {
    /// Creates a new input handler.
    ///
    /// # Examples
    ///
    /// ```
    /// use arcade_hub::{CrawlerInput, Direction, GameInput, GameKind, InputHandler, Key};
    ///
    /// let handler = InputHandler::new();
    /// assert_eq!(
    ///     handler.translate(GameKind::Crawler, Key::W),
    ///     Some(GameInput::Crawler(CrawlerInput::Move(Direction::Up)))
    /// );
    /// ```
    pub fn new() -> Self {
        Self {
            arrows_move_crawler: false,
        }
    }

    /// Maps a key to a command for the given game.
    pub fn translate(&self, kind: GameKind, key: Key) -> Option<GameInput> {
        match kind {
            GameKind::Crawler => self.crawler_input(key).map(GameInput::Crawler),
            GameKind::Maze => Self::maze_input(key).map(GameInput::Maze),
            GameKind::Runner => Self::runner_input(key).map(GameInput::Runner),
            GameKind::Racing => Self::racing_input(key).map(GameInput::Racing),
            GameKind::Shooter => Self::shooter_input(key).map(GameInput::Shooter),
        }
    }

    fn crawler_input(&self, key: Key) -> Option<CrawlerInput> {
        if key == Key::Space {
            return Some(CrawlerInput::Shoot);
        }
        let direction = key.wasd_direction().or_else(|| {
            if self.arrows_move_crawler {
                key.arrow_direction()
            } else {
                None
            }
        })?;
        Some(CrawlerInput::Move(direction))
    }

    fn maze_input(key: Key) -> Option<MazeInput> {
        if let Some(direction) = key.arrow_direction() {
            return Some(MazeInput::Slide(direction));
        }
        if let Some(direction) = key.wasd_direction() {
            return Some(MazeInput::MoveCursor(direction));
        }
        match key {
            Key::Num1 => Some(MazeInput::PlaceBlock),
            Key::Num2 => Some(MazeInput::DestroyBlock),
            Key::X => Some(MazeInput::Blockcide),
            Key::Enter | Key::Space => Some(MazeInput::NextLevel),
            _ => None,
        }
    }

    fn runner_input(key: Key) -> Option<RunnerInput> {
        match key {
            Key::Left => Some(RunnerInput::LaneLeft),
            Key::Right => Some(RunnerInput::LaneRight),
            _ => None,
        }
    }

    fn racing_input(key: Key) -> Option<RacingInput> {
        match key {
            Key::Space => Some(RacingInput::Hit(Racer::One)),
            Key::W => Some(RacingInput::Hit(Racer::Two)),
            _ => None,
        }
    }

    fn shooter_input(key: Key) -> Option<ShooterInput> {
        if key == Key::Space {
            return Some(ShooterInput::Shoot);
        }
        key.arrow_direction().map(ShooterInput::Move)
    }

    /// Maps a key to a menu command.
    pub fn menu_input(&self, key: Key) -> Option<MenuInput> {
        if let Some(direction) = key.arrow_direction() {
            return Some(MenuInput::Navigate(direction));
        }
        match key {
            Key::Space | Key::Enter => Some(MenuInput::Select),
            Key::Escape => Some(MenuInput::Back),
            Key::R => Some(MenuInput::Restart),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_maze_bindings() {
        let handler = InputHandler::new();
        assert_eq!(
            handler.translate(GameKind::Maze, Key::Left),
            Some(GameInput::Maze(MazeInput::Slide(Direction::Left)))
        );
        assert_eq!(
            handler.translate(GameKind::Maze, Key::S),
            Some(GameInput::Maze(MazeInput::MoveCursor(Direction::Down)))
        );
        assert_eq!(
            handler.translate(GameKind::Maze, Key::Num2),
            Some(GameInput::Maze(MazeInput::DestroyBlock))
        );
    }

    #[test]
    fn test_racing_players_have_separate_keys() {
        let handler = InputHandler::new();
        assert_eq!(
            handler.translate(GameKind::Racing, Key::Space),
            Some(GameInput::Racing(RacingInput::Hit(Racer::One)))
        );
        assert_eq!(
            handler.translate(GameKind::Racing, Key::W),
            Some(GameInput::Racing(RacingInput::Hit(Racer::Two)))
        );
        assert_eq!(handler.translate(GameKind::Racing, Key::Up), None);
    }

    #[test]
    fn test_crawler_arrows_are_optional() {
        let mut handler = InputHandler::new();
        assert_eq!(handler.translate(GameKind::Crawler, Key::Up), None);
        handler.arrows_move_crawler = true;
        assert_eq!(
            handler.translate(GameKind::Crawler, Key::Up),
            Some(GameInput::Crawler(CrawlerInput::Move(Direction::Up)))
        );
    }

    #[test]
    fn test_menu_bindings() {
        let handler = InputHandler::new();
        assert_eq!(handler.menu_input(Key::Escape), Some(MenuInput::Back));
        assert_eq!(
            handler.menu_input(Key::Down),
            Some(MenuInput::Navigate(Direction::Down))
        );
        assert_eq!(handler.menu_input(Key::X), None);
    }

    #[test]
    fn test_input_target() {
        let input = GameInput::Runner(RunnerInput::LaneLeft);
        assert_eq!(input.target(), GameKind::Runner);
    }
}
