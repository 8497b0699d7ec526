//! # Puzzle Dungeon Progression
//!
//! Level bookkeeping for the puzzle dungeon variant: each level opens with a
//! riddle, then a fight, and only moves on once both are done. Enemy stats
//! and the colour theme scale with the level number.

use crate::generation::utils::create_rng;
use crate::{ArcadeError, ArcadeResult, GenerationConfig, LldmClient, Puzzle, PuzzleGenerator};
use log::info;
use serde::{Deserialize, Serialize};

pub const MAX_LEVELS: u32 = 10;
/// Fixed enemy spawn points of the puzzle dungeon arena
pub const ENEMY_SPAWNS: [(i32, i32); 5] = [(40, 50), (180, 50), (40, 130), (180, 130), (110, 90)];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LevelPhase {
    Puzzle,
    Combat,
    Transition,
}

/// Colour scheme of a level, cycling every five levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Theme {
    DarkDungeon,
    ForestRuins,
    CrystalCaves,
    IceDungeon,
    LavaFortress,
}

impl Theme {
    pub fn for_level(level: u32) -> Self {
        match (level.max(1) - 1) % 5 {
            0 => Theme::DarkDungeon,
            1 => Theme::ForestRuins,
            2 => Theme::CrystalCaves,
            3 => Theme::IceDungeon,
            _ => Theme::LavaFortress,
        }
    }
}

/// Enemy stats for one spawn.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnemySpawn {
    pub x: i32,
    pub y: i32,
    pub health: u32,
    pub damage: u32,
    pub speed: f32,
}

/// Per-level tuning.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LevelProfile {
    pub number: u32,
    pub enemy_health: u32,
    pub enemy_damage: u32,
    pub enemy_speed: f32,
    pub theme: Theme,
}

impl LevelProfile {
    /// # Examples
    ///
    /// ```
    /// use arcade_hub::{LevelProfile, Theme};
    ///
    /// let profile = LevelProfile::new(3);
    /// assert_eq!(profile.enemy_health, 160);
    /// assert_eq!(profile.enemy_damage, 4);
    /// assert_eq!(profile.theme, Theme::CrystalCaves);
    /// ```
    pub fn new(number: u32) -> Self {
        Self {
            number,
            enemy_health: 100 + number * 20,
            enemy_damage: 1 + number,
            enemy_speed: 1.0 + number as f32 * 0.2,
            theme: Theme::for_level(number),
        }
    }

    /// Two enemies plus one per two levels, up to one per spawn point.
    pub fn enemy_spawns(&self) -> Vec<EnemySpawn> {
        let count = (2 + self.number as usize / 2).min(ENEMY_SPAWNS.len());
        ENEMY_SPAWNS[..count]
            .iter()
            .map(|&(x, y)| EnemySpawn {
                x,
                y,
                health: self.enemy_health,
                damage: self.enemy_damage,
                speed: self.enemy_speed,
            })
            .collect()
    }
}

/// Tracks the puzzle and combat gates of the current level.
#[derive(Debug)]
pub struct LevelManager {
    pub current_level: u32,
    pub phase: LevelPhase,
    pub profile: LevelProfile,
    pub puzzle: Option<Puzzle>,
    pub puzzle_solved: bool,
    pub enemies_defeated: bool,
    /// Hints revealed for the current puzzle
    pub hints_used: usize,
    config: GenerationConfig,
    generator: PuzzleGenerator,
    client: LldmClient,
}

impl LevelManager {
    pub fn new(config: GenerationConfig, client: LldmClient) -> Self {
        Self {
            current_level: 1,
            phase: LevelPhase::Puzzle,
            profile: LevelProfile::new(1),
            puzzle: None,
            puzzle_solved: false,
            enemies_defeated: false,
            hints_used: 0,
            config,
            generator: PuzzleGenerator::new(),
            client,
        }
    }

    /// A manager that opens on `level` instead of the first level.
    pub fn at_level(config: GenerationConfig, client: LldmClient, level: u32) -> Self {
        let level = level.max(1);
        Self {
            current_level: level,
            profile: LevelProfile::new(level),
            ..Self::new(config, client)
        }
    }

    /// Fetches the puzzle for the current level if there is none yet.
    pub fn current_puzzle(&mut self) -> ArcadeResult<&Puzzle> {
        if self.puzzle.is_none() {
            let config = self.config.for_level(self.current_level);
            let mut rng = create_rng(&config);
            let puzzle = self
                .generator
                .generate_with_source(&mut self.client, &config, &mut rng)?;
            self.puzzle = Some(puzzle);
        }
        self.puzzle
            .as_ref()
            .ok_or_else(|| ArcadeError::InvalidState("Puzzle missing".to_string()))
    }

    /// Checks an answer. A correct one opens the combat phase.
    pub fn submit_answer(&mut self, answer: &str) -> ArcadeResult<bool> {
        if self.phase != LevelPhase::Puzzle {
            return Err(ArcadeError::InvalidAction(
                "No puzzle to answer right now".to_string(),
            ));
        }
        let correct = self.current_puzzle()?.check_answer(answer);
        if correct {
            self.puzzle_solved = true;
            self.phase = LevelPhase::Combat;
            info!("Puzzle on level {} solved", self.current_level);
        }
        Ok(correct)
    }

    /// Reveals the next hint.
    pub fn next_hint(&mut self) -> ArcadeResult<Option<String>> {
        let index = self.hints_used;
        let hint = self.current_puzzle()?.hint(index).map(str::to_string);
        self.hints_used += 1;
        Ok(hint)
    }

    /// Marks the level's fight as won.
    pub fn defeat_enemies(&mut self) {
        if self.phase == LevelPhase::Combat {
            self.enemies_defeated = true;
            self.phase = LevelPhase::Transition;
        }
    }

    /// Moves on once both gates are open. Returns whether it did.
    pub fn next_level(&mut self) -> bool {
        if !(self.puzzle_solved && self.enemies_defeated) {
            return false;
        }
        self.current_level += 1;
        self.profile = LevelProfile::new(self.current_level);
        self.puzzle = None;
        self.puzzle_solved = false;
        self.enemies_defeated = false;
        self.hints_used = 0;
        self.phase = LevelPhase::Puzzle;
        info!("Entering level {}", self.current_level);
        true
    }

    pub fn is_game_complete(&self) -> bool {
        self.current_level > MAX_LEVELS
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manager() -> LevelManager {
        LevelManager::new(GenerationConfig::for_testing(2), LldmClient::offline())
    }

    #[test]
    fn test_profile_scaling() {
        let profile = LevelProfile::new(5);
        assert_eq!(profile.enemy_health, 200);
        assert_eq!(profile.enemy_damage, 6);
        assert!((profile.enemy_speed - 2.0).abs() < 1e-6);
        assert_eq!(profile.theme, Theme::LavaFortress);
        assert_eq!(Theme::for_level(6), Theme::DarkDungeon);
    }

    #[test]
    fn test_enemy_count_caps_at_spawn_points() {
        assert_eq!(LevelProfile::new(1).enemy_spawns().len(), 2);
        assert_eq!(LevelProfile::new(4).enemy_spawns().len(), 4);
        let spawns = LevelProfile::new(9).enemy_spawns();
        assert_eq!(spawns.len(), 5);
        assert_eq!((spawns[4].x, spawns[4].y), (110, 90));
    }

    #[test]
    fn test_level_needs_both_gates() {
        let mut levels = manager();
        assert!(!levels.next_level());
        assert!(!levels.submit_answer("wrong").unwrap());
        // Level 1 falls back to the unscramble puzzle
        assert!(levels.submit_answer("dungeon").unwrap());
        assert_eq!(levels.phase, LevelPhase::Combat);
        assert!(!levels.next_level());
        levels.defeat_enemies();
        assert!(levels.next_level());
        assert_eq!(levels.current_level, 2);
        assert_eq!(levels.phase, LevelPhase::Puzzle);
        assert!(levels.puzzle.is_none());
    }

    #[test]
    fn test_answer_outside_puzzle_phase() {
        let mut levels = manager();
        levels.phase = LevelPhase::Combat;
        assert!(levels.submit_answer("8").is_err());
    }

    #[test]
    fn test_hints_progress() {
        let mut levels = manager();
        assert_eq!(levels.next_hint().unwrap().as_deref(), Some("It's where you are"));
        assert_eq!(
            levels.next_hint().unwrap().as_deref(),
            Some("Think about the game setting")
        );
    }

    #[test]
    fn test_game_complete_after_ten() {
        let mut levels = manager();
        levels.current_level = MAX_LEVELS;
        assert!(!levels.is_game_complete());
        levels.current_level += 1;
        assert!(levels.is_game_complete());
    }

    #[test]
    fn test_start_on_later_level() {
        let mut levels =
            LevelManager::at_level(GenerationConfig::for_testing(2), LldmClient::offline(), 4);
        assert_eq!(levels.current_level, 4);
        assert_eq!(levels.profile, LevelProfile::new(4));
        assert_eq!(levels.phase, LevelPhase::Puzzle);
        let expected = {
            let config = GenerationConfig::for_testing(2).for_level(4);
            PuzzleGenerator::new()
                .generate_with_source(&mut LldmClient::offline(), &config, &mut create_rng(&config))
                .unwrap()
        };
        assert_eq!(levels.current_puzzle().unwrap(), &expected);

        let levels =
            LevelManager::at_level(GenerationConfig::for_testing(2), LldmClient::offline(), 0);
        assert_eq!(levels.current_level, 1);
    }
}
