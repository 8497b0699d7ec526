//! # Monkey Run
//!
//! A four-lane runner. Bananas, coconuts, peels and trees fall down the
//! lanes, faster and faster, and the monkey at the bottom swaps lanes to
//! catch the good ones and dodge the rest.
//!
//! Obstacles come either from independent per-kind spawn timers or from a
//! queue of generated waves.

use super::{wrong_input, GameKind, Minigame};
use crate::generation::utils::create_rng;
use crate::input::{GameInput, RunnerInput};
use crate::{
    ArcadeResult, GenerationConfig, LldmClient, ObstacleGenerator, ObstacleKind, ObstacleSpec,
    RUNNER_LANES,
};
use rand::rngs::StdRng;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Lane centres, in pixels.
pub const LANE_X: [f32; RUNNER_LANES] = [30.0, 60.0, 90.0, 120.0];
pub const PLAYER_Y: f32 = 100.0;
pub const START_LANE: usize = 1;
pub const START_SPEED: f32 = 2.0;
pub const MAX_SPEED: f32 = 5.0;
pub const SPEED_INCREMENT: f32 = 0.001;
/// Fraction of the remaining distance to its lane the player covers per frame
pub const LANE_EASING: f32 = 0.2;
/// Half-size of the collision box around the player
pub const HIT_RANGE: f32 = 8.0;
/// Obstacles below this line are gone
pub const DESPAWN_Y: f32 = 130.0;
pub const MAX_COCONUT_HITS: u32 = 3;
/// Live obstacle cap in pattern mode
pub const MAX_LIVE_OBSTACLES: usize = 10;
/// Pattern queue is refilled below this length
pub const QUEUE_REFILL_BELOW: usize = 5;

impl ObstacleKind {
    /// Spawn chance per frame and cooldown in frames, for timer mode.
    pub fn spawn_timing(self) -> (f64, u32) {
        match self {
            ObstacleKind::Banana => (0.03, 30),
            ObstacleKind::Coconut => (0.02, 45),
            ObstacleKind::Peel => (0.01, 60),
            ObstacleKind::Tree => (0.01, 90),
        }
    }

    /// Trees are taller and start further above the screen.
    pub fn spawn_y(self) -> f32 {
        match self {
            ObstacleKind::Tree => -20.0,
            _ => -10.0,
        }
    }

    fn index(self) -> usize {
        match self {
            ObstacleKind::Banana => 0,
            ObstacleKind::Coconut => 1,
            ObstacleKind::Peel => 2,
            ObstacleKind::Tree => 3,
        }
    }

    pub fn all() -> [ObstacleKind; 4] {
        [
            ObstacleKind::Banana,
            ObstacleKind::Coconut,
            ObstacleKind::Peel,
            ObstacleKind::Tree,
        ]
    }
}

/// Where new obstacles come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpawnMode {
    /// Each kind rolls its own chance once its cooldown has run out
    Timers,
    /// Obstacles are taken from generated waves, honouring their spacing
    Patterns,
}

/// An obstacle on screen.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FallingObstacle {
    pub kind: ObstacleKind,
    pub x: f32,
    pub y: f32,
}

/// State of one monkey run.
#[derive(Debug)]
pub struct RunnerGame {
    pub mode: SpawnMode,
    pub lane: usize,
    pub player_x: f32,
    pub speed: f32,
    pub score: u64,
    pub coconuts_hit: u32,
    pub game_over: bool,
    pub frame: u64,
    pub obstacles: Vec<FallingObstacle>,
    /// Upcoming obstacles in pattern mode
    pub queue: VecDeque<ObstacleSpec>,
    /// Frames until the next queued obstacle may spawn
    pub spawn_delay: u32,
    cooldowns: [u32; 4],
    seed: u64,
    rng: StdRng,
    config: GenerationConfig,
    generator: ObstacleGenerator,
    client: LldmClient,
}

impl RunnerGame {
    /// A timer-mode run.
    pub fn new(seed: u64) -> Self {
        Self::with_mode(seed, SpawnMode::Timers, LldmClient::offline())
    }

    /// A pattern-mode run fed by `client`.
    pub fn with_patterns(seed: u64, client: LldmClient) -> Self {
        Self::with_mode(seed, SpawnMode::Patterns, client)
    }

    fn with_mode(seed: u64, mode: SpawnMode, client: LldmClient) -> Self {
        let config = GenerationConfig::new(seed);
        Self {
            mode,
            lane: START_LANE,
            player_x: LANE_X[START_LANE],
            speed: START_SPEED,
            score: 0,
            coconuts_hit: 0,
            game_over: false,
            frame: 0,
            obstacles: Vec::new(),
            queue: VecDeque::new(),
            spawn_delay: 0,
            cooldowns: [0; 4],
            seed,
            rng: create_rng(&config),
            config,
            generator: ObstacleGenerator::new(),
            client,
        }
    }

    pub fn reset(&mut self) {
        let client = std::mem::take(&mut self.client);
        *self = Self::with_mode(self.seed, self.mode, client);
    }

    pub fn move_lane(&mut self, input: RunnerInput) {
        match input {
            RunnerInput::LaneLeft if self.lane > 0 => self.lane -= 1,
            RunnerInput::LaneRight if self.lane < RUNNER_LANES - 1 => self.lane += 1,
            _ => {}
        }
    }

    fn spawn(&mut self, kind: ObstacleKind, lane: usize) {
        self.obstacles.push(FallingObstacle {
            kind,
            x: LANE_X[lane.min(RUNNER_LANES - 1)],
            y: kind.spawn_y(),
        });
    }

    fn spawn_from_timers(&mut self) {
        for kind in ObstacleKind::all() {
            let (chance, cooldown) = kind.spawn_timing();
            let slot = kind.index();
            if self.cooldowns[slot] == 0 && self.rng.gen_bool(chance) {
                let lane = self.rng.gen_range(0..RUNNER_LANES);
                self.spawn(kind, lane);
                self.cooldowns[slot] = cooldown;
            }
            self.cooldowns[slot] = self.cooldowns[slot].saturating_sub(1);
        }
    }

    fn refill_queue(&mut self) -> ArcadeResult<()> {
        if self.queue.len() < QUEUE_REFILL_BELOW {
            let wave = self.generator.generate_with_source(
                &mut self.client,
                self.score,
                self.speed,
                &self.config,
                &mut self.rng,
            )?;
            self.queue.extend(wave);
        }
        Ok(())
    }

    fn spawn_from_queue(&mut self) {
        if self.spawn_delay > 0 {
            self.spawn_delay -= 1;
            return;
        }
        if self.obstacles.len() >= MAX_LIVE_OBSTACLES {
            return;
        }
        if let Some(next) = self.queue.pop_front() {
            self.spawn(next.kind, next.lane);
            self.spawn_delay = next.spacing;
        }
    }

    /// Moves obstacles down and resolves anything touching the player.
    fn update_obstacles(&mut self) {
        let speed = self.speed;
        let (px, py) = (self.player_x, PLAYER_Y);
        let mut remaining = Vec::with_capacity(self.obstacles.len());

        for mut obstacle in std::mem::take(&mut self.obstacles) {
            obstacle.y += speed;
            let touching = (obstacle.x - px).abs() < HIT_RANGE && (obstacle.y - py).abs() < HIT_RANGE;

            if touching {
                match obstacle.kind {
                    ObstacleKind::Banana => self.score += 10,
                    ObstacleKind::Coconut => {
                        self.coconuts_hit += 1;
                        self.score = self.score.saturating_sub(5);
                    }
                    ObstacleKind::Peel => self.score = self.score.saturating_sub(3),
                    ObstacleKind::Tree => {
                        self.game_over = true;
                        remaining.push(obstacle);
                    }
                }
            } else if obstacle.y <= DESPAWN_Y {
                remaining.push(obstacle);
            }
        }
        self.obstacles = remaining;
    }

    /// Advances one frame.
    pub fn step(&mut self) -> ArcadeResult<()> {
        if self.game_over {
            return Ok(());
        }
        self.frame += 1;

        self.player_x += (LANE_X[self.lane] - self.player_x) * LANE_EASING;
        self.speed = (self.speed + SPEED_INCREMENT).min(MAX_SPEED);

        match self.mode {
            SpawnMode::Timers => self.spawn_from_timers(),
            SpawnMode::Patterns => {
                self.refill_queue()?;
                self.spawn_from_queue();
            }
        }

        self.update_obstacles();

        if self.coconuts_hit >= MAX_COCONUT_HITS {
            self.game_over = true;
        }
        Ok(())
    }
}

impl Minigame for RunnerGame {
    fn kind(&self) -> GameKind {
        GameKind::Runner
    }

    fn apply_input(&mut self, input: &GameInput) -> ArcadeResult<()> {
        match input {
            GameInput::Runner(command) => {
                if !self.game_over {
                    self.move_lane(*command);
                }
                Ok(())
            }
            other => Err(wrong_input(self.kind(), other)),
        }
    }

    fn tick(&mut self) -> ArcadeResult<()> {
        self.step()
    }

    fn score(&self) -> u64 {
        self.score
    }

    fn is_over(&self) -> bool {
        self.game_over
    }

    fn restart(&mut self) -> ArcadeResult<()> {
        self.reset();
        Ok(())
    }

    fn status_line(&self) -> String {
        format!(
            "Score {} | Coconuts {}/{} | Speed {:.2}",
            self.score, self.coconuts_hit, MAX_COCONUT_HITS, self.speed
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drop_on_player(game: &mut RunnerGame, kind: ObstacleKind) {
        game.obstacles.push(FallingObstacle {
            kind,
            x: game.player_x,
            y: PLAYER_Y - 1.0,
        });
    }

    fn quiet_game() -> RunnerGame {
        // A huge spawn delay keeps pattern mode from dropping anything.
        let mut game = RunnerGame::with_patterns(1, LldmClient::offline());
        game.spawn_delay = u32::MAX;
        game
    }

    #[test]
    fn test_lane_changes_are_bounded() {
        let mut game = RunnerGame::new(1);
        game.move_lane(RunnerInput::LaneLeft);
        game.move_lane(RunnerInput::LaneLeft);
        assert_eq!(game.lane, 0);
        for _ in 0..5 {
            game.move_lane(RunnerInput::LaneRight);
        }
        assert_eq!(game.lane, 3);
    }

    #[test]
    fn test_player_eases_toward_lane() {
        let mut game = quiet_game();
        game.move_lane(RunnerInput::LaneRight);
        game.step().unwrap();
        assert!((game.player_x - 66.0).abs() < 1e-4);
    }

    #[test]
    fn test_speed_ramps_and_caps() {
        let mut game = quiet_game();
        game.step().unwrap();
        assert!((game.speed - 2.001).abs() < 1e-5);
        game.speed = MAX_SPEED;
        game.step().unwrap();
        assert_eq!(game.speed, MAX_SPEED);
    }

    #[test]
    fn test_banana_scores_and_coconuts_end_run() {
        let mut game = quiet_game();
        drop_on_player(&mut game, ObstacleKind::Banana);
        game.step().unwrap();
        assert_eq!(game.score, 10);
        assert!(game.obstacles.is_empty());

        for _ in 0..3 {
            drop_on_player(&mut game, ObstacleKind::Coconut);
            game.step().unwrap();
        }
        assert_eq!(game.coconuts_hit, 3);
        assert_eq!(game.score, 0);
        assert!(game.is_over());
    }

    #[test]
    fn test_peel_penalty_floors_at_zero() {
        let mut game = quiet_game();
        game.score = 2;
        drop_on_player(&mut game, ObstacleKind::Peel);
        game.step().unwrap();
        assert_eq!(game.score, 0);
    }

    #[test]
    fn test_tree_ends_run() {
        let mut game = quiet_game();
        drop_on_player(&mut game, ObstacleKind::Tree);
        game.step().unwrap();
        assert!(game.game_over);
    }

    #[test]
    fn test_obstacles_despawn_below_screen() {
        let mut game = quiet_game();
        game.obstacles.push(FallingObstacle {
            kind: ObstacleKind::Banana,
            x: LANE_X[3],
            y: DESPAWN_Y - 0.5,
        });
        game.step().unwrap();
        assert!(game.obstacles.is_empty());
    }

    #[test]
    fn test_pattern_mode_honours_spacing() {
        let mut game = RunnerGame::with_patterns(9, LldmClient::offline());
        game.step().unwrap();
        assert_eq!(game.obstacles.len(), 1);
        assert_eq!(game.obstacles[0].kind, ObstacleKind::Banana);
        assert_eq!(game.spawn_delay, 30);

        for _ in 0..30 {
            game.step().unwrap();
        }
        assert_eq!(game.obstacles.len(), 1);
        game.step().unwrap();
        assert_eq!(game.obstacles.len(), 2);
    }

    #[test]
    fn test_spawn_heights_by_kind() {
        let mut game = quiet_game();
        for kind in ObstacleKind::all() {
            game.spawn(kind, 2);
        }
        let heights: Vec<f32> = game.obstacles.iter().map(|o| o.y).collect();
        assert_eq!(heights, vec![-10.0, -10.0, -10.0, -20.0]);
        assert!(game.obstacles.iter().all(|o| o.x == LANE_X[2]));
    }

    #[test]
    fn test_timer_mode_respects_cooldowns() {
        let mut game = RunnerGame::new(5);
        let mut last_spawn: [Option<u64>; 4] = [None; 4];

        for _ in 0..3_000 {
            game.step().unwrap();
            assert!(!game.is_over());

            for kind in ObstacleKind::all() {
                // Anything that fell exactly one frame from its start height is new
                let fresh_y = kind.spawn_y() + game.speed;
                let fresh = game
                    .obstacles
                    .iter()
                    .filter(|o| o.kind == kind && (o.y - fresh_y).abs() < 1e-3)
                    .count();
                assert!(fresh <= 1, "{:?} spawned twice in one frame", kind);
                if fresh == 0 {
                    continue;
                }

                let (_, cooldown) = kind.spawn_timing();
                if let Some(previous) = last_spawn[kind.index()] {
                    assert!(
                        game.frame - previous >= cooldown as u64,
                        "{:?} respawned after {} frames",
                        kind,
                        game.frame - previous
                    );
                }
                assert_eq!(game.cooldowns[kind.index()], cooldown - 1);
                last_spawn[kind.index()] = Some(game.frame);
            }

            // Clear anything about to reach the monkey so the run never ends
            game.obstacles.retain(|o| o.y < PLAYER_Y - 2.0 * HIT_RANGE);
        }

        for kind in ObstacleKind::all() {
            assert!(last_spawn[kind.index()].is_some(), "{:?} never spawned", kind);
        }
    }

    #[test]
    fn test_reset_restores_start() {
        let mut game = quiet_game();
        game.score = 50;
        game.game_over = true;
        game.reset();
        assert_eq!(game.score, 0);
        assert!(!game.game_over);
        assert_eq!(game.lane, START_LANE);
        assert_eq!(game.mode, SpawnMode::Patterns);
    }
}
