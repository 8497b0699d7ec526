//! # Arcade Hub
//!
//! A collection of small 2D arcade prototypes sharing one headless game core.
//!
//! ## Architecture Overview
//!
//! Every game is a plain struct advanced one frame at a time, so the whole
//! collection can be driven from tests, the CLI, or an autopilot without a
//! window. The crate is organised around a few key concepts:
//!
//! - **Games**: the dungeon crawler, maze escape, lane runner, drag racing and
//!   space shooter, each behind the [`Minigame`] trait
//! - **Generation**: flood-fill validated tilemaps and BFS validated mazes,
//!   with deterministic fallbacks for everything a content source can supply
//! - **Content sources**: a pluggable text-completion seam with retrying JSON
//!   extraction (see [`lldm`])
//! - **Scenes**: title, menu, play and game-over flow driven by key events
//!
//! ## Determinism
//!
//! All randomness flows from seeded [`rand::rngs::StdRng`] instances, so the
//! same seed and the same inputs always replay the same game.

pub mod game;
pub mod generation;
pub mod input;
pub mod lldm;
pub mod rendering;
pub mod scenes;
pub mod utils;

// Core module re-exports
pub use game::*;
pub use generation::*;
pub use input::*;
pub use lldm::*;
pub use rendering::*;
pub use scenes::*;
pub use utils::*;

// Explicit re-exports for the types most callers reach for
pub use game::{
    ActiveGame, ArcadeHub, CrawlerGame, Direction, EntityId, GameKind, HighScoreTable,
    MazeGame, Minigame, Position, RacingGame, RunnerGame, Session, ShooterGame,
};

pub use generation::{
    DungeonGenerator, DungeonMap, GenerationConfig, Generator, MazeGenerator, MazeLayout,
};

/// Core error type for the arcade engine.
#[derive(thiserror::Error, Debug)]
pub enum ArcadeError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// Game state is invalid
    #[error("Invalid game state: {0}")]
    InvalidState(String),

    /// Action cannot be performed
    #[error("Invalid action: {0}")]
    InvalidAction(String),

    /// Generation failed
    #[error("Generation failed: {0}")]
    GenerationFailed(String),

    /// Content source (text generation) error
    #[error("LLDM error: {0}")]
    LldmError(String),
}

/// Result type used throughout the arcade codebase.
pub type ArcadeResult<T> = Result<T, ArcadeError>;

/// Version information for the crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Game configuration constants.
pub mod config {
    /// Logical screen width used by the tile games, in pixels
    pub const WINDOW_WIDTH: f32 = 800.0;

    /// Logical screen height used by the tile games, in pixels
    pub const WINDOW_HEIGHT: f32 = 600.0;

    /// Edge length of one dungeon tile, in pixels
    pub const TILE_SIZE: f32 = 40.0;

    /// Frames per second target for the game loop
    pub const TARGET_FPS: u64 = 60;

    /// Milliseconds simulated by one frame tick
    pub const FRAME_MS: u64 = 1000 / TARGET_FPS;

    /// Default maze edge length in cells
    pub const DEFAULT_MAZE_SIZE: usize = 10;

    /// Attempts made against a content source before falling back
    pub const MAX_CONTENT_ATTEMPTS: u32 = 3;

    /// How long the hub title card stays up
    pub const TITLE_DURATION_MS: u64 = 5000;

    /// Default player starting health in the dungeon crawler
    pub const DEFAULT_PLAYER_HEALTH: i32 = 100;

    /// Number of dungeon levels before the crawler is won
    pub const CRAWLER_LEVELS: u32 = 3;
}
