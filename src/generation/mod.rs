//! # Generation Module
//!
//! Procedural content generation for the tile and maze games.
//!
//! Every generator can produce its content locally from a seeded RNG. The
//! maze, puzzle and obstacle generators can additionally ask an
//! [`LldmClient`](crate::LldmClient) first and fall back to local generation
//! when the source fails or returns something that does not validate.

pub mod dungeon;
pub mod maze;
pub mod obstacles;
pub mod puzzles;

pub use dungeon::*;
pub use maze::*;
pub use obstacles::*;
pub use puzzles::*;

use crate::{config, ArcadeResult};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

/// Configuration for procedural generation.
///
/// Controls the seed, the level being generated and whether a content
/// source is consulted at all.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Random seed for reproducible generation
    pub seed: u64,
    /// Level number, starting at 1
    pub level: u32,
    /// Edge length of generated mazes
    pub maze_size: usize,
    /// Whether to ask the content source before generating locally
    pub use_lldm: bool,
    /// Feed the monkey runner from generated waves instead of spawn timers
    #[serde(default)]
    pub runner_patterns: bool,
}

impl GenerationConfig {
    /// Creates a configuration for level 1.
    ///
    /// # Examples
    ///
    /// ```
    /// use arcade_hub::GenerationConfig;
    ///
    /// let config = GenerationConfig::new(7);
    /// assert_eq!(config.level, 1);
    /// assert_eq!(config.maze_size, 10);
    /// ```
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            level: 1,
            maze_size: config::DEFAULT_MAZE_SIZE,
            use_lldm: true,
            runner_patterns: false,
        }
    }

    /// Creates a configuration that never consults a content source.
    pub fn for_testing(seed: u64) -> Self {
        Self {
            use_lldm: false,
            ..Self::new(seed)
        }
    }

    /// Returns a copy targeting another level.
    pub fn for_level(&self, level: u32) -> Self {
        Self {
            level: level.max(1),
            ..self.clone()
        }
    }

    /// Seed used for the RNG of the configured level.
    ///
    /// The base seed is mixed with the level so consecutive levels differ.
    pub fn level_seed(&self) -> u64 {
        self.seed
            .wrapping_mul(6364136223846793005)
            .wrapping_add(u64::from(self.level))
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self::new(42)
    }
}

/// Trait for procedural generators.
///
/// `generate` must always succeed in producing valid content from the RNG
/// alone; it is what every source-backed generator falls back to.
pub trait Generator<T> {
    /// Generates content using the provided configuration and random number generator.
    fn generate(&self, config: &GenerationConfig, rng: &mut StdRng) -> ArcadeResult<T>;

    /// Validates that the generated content meets requirements.
    fn validate(&self, content: &T, config: &GenerationConfig) -> ArcadeResult<()>;

    /// Gets the generator type name for logging and debugging.
    fn generator_type(&self) -> &'static str;
}

/// Utility functions for generation algorithms.
pub mod utils {
    use super::*;

    /// Creates a seeded random number generator from the config.
    pub fn create_rng(config: &GenerationConfig) -> StdRng {
        StdRng::seed_from_u64(config.level_seed())
    }
}
