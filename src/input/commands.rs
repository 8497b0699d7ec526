//! # Command Definitions
//!
//! Per-game commands produced by the input handler or the autopilot.

use crate::game::{Direction, GameKind};
use serde::{Deserialize, Serialize};

/// Dungeon crawler commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CrawlerInput {
    /// Step one tile and face that way
    Move(Direction),
    /// Loose an arrow in the facing direction
    Shoot,
}

/// Maze escape commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MazeInput {
    /// Slide until something blocks the way
    Slide(Direction),
    /// Move the build cursor one cell
    MoveCursor(Direction),
    /// Buy a block at the cursor
    PlaceBlock,
    /// Pay to clear the wall or block at the cursor
    DestroyBlock,
    /// Give up on the run
    Blockcide,
    /// Continue after clearing a level
    NextLevel,
}

/// Lane runner commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunnerInput {
    LaneLeft,
    LaneRight,
}

/// Which racing car a command belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Racer {
    One,
    Two,
}

impl Racer {
    pub fn index(self) -> usize {
        match self {
            Racer::One => 0,
            Racer::Two => 1,
        }
    }

    pub fn other(self) -> Racer {
        match self {
            Racer::One => Racer::Two,
            Racer::Two => Racer::One,
        }
    }
}

/// Drag racing commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RacingInput {
    /// A racer hits their button, hoping the bar is in the zone
    Hit(Racer),
}

/// Space shooter commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShooterInput {
    Move(Direction),
    Shoot,
}

/// A command for whichever game is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameInput {
    Crawler(CrawlerInput),
    Maze(MazeInput),
    Runner(RunnerInput),
    Racing(RacingInput),
    Shooter(ShooterInput),
}

impl GameInput {
    /// The game this command is meant for.
    pub fn target(&self) -> GameKind {
        match self {
            GameInput::Crawler(_) => GameKind::Crawler,
            GameInput::Maze(_) => GameKind::Maze,
            GameInput::Runner(_) => GameKind::Runner,
            GameInput::Racing(_) => GameKind::Racing,
            GameInput::Shooter(_) => GameKind::Shooter,
        }
    }
}

/// Commands understood outside of gameplay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MenuInput {
    /// Move the hub selection
    Navigate(Direction),
    /// Start the selected game, or skip the title card
    Select,
    /// Leave the current game for the menu
    Back,
    /// Restart the current game
    Restart,
}
