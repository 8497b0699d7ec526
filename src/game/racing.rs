//! # Drag Racing
//!
//! Two players share one timing bar. Hitting your button while the bar is in
//! the green zone pushes your car forward; missing costs you a strike.

use super::{wrong_input, GameKind, Minigame};
use crate::input::{GameInput, Racer, RacingInput};
use crate::ArcadeResult;
use log::info;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

pub const START_X: f32 = 100.0;
pub const FINISH_LINE_X: f32 = 500.0;
pub const CAR_WIDTH: f32 = 30.0;
/// Distance a car jumps on a good hit
pub const MOVE_INCREMENT: f32 = 20.0;
pub const BAR_LENGTH: f32 = 200.0;
pub const BAR_SPEED: f32 = 3.0;
pub const BAR_SPEEDUP: f32 = 0.1;
pub const START_ZONE: (f32, f32) = (40.0, 160.0);
/// Good hits by either player that end a round
pub const HITS_PER_ROUND: u32 = 3;
pub const WRONG_HITS_LIMIT: u32 = 3;

/// Per-player race state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Car {
    pub x: f32,
    /// Good hits in the current round
    pub round_hits: u32,
    pub score: u64,
    pub wrong_hits: u32,
}

impl Car {
    fn new() -> Self {
        Self {
            x: START_X,
            round_hits: 0,
            score: 0,
            wrong_hits: 0,
        }
    }

    pub fn finished(&self) -> bool {
        self.x + CAR_WIDTH >= FINISH_LINE_X
    }
}

/// Why the race ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WinReason {
    CrossedFinish,
    OpponentStruckOut,
}

/// Result of a finished race.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RaceOutcome {
    pub winner: Racer,
    pub reason: WinReason,
}

/// State of one two-player race.
#[derive(Debug)]
pub struct RacingGame {
    pub cars: [Car; 2],
    pub bar_position: f32,
    /// +1 or -1
    pub bar_direction: f32,
    pub bar_speed: f32,
    /// Inclusive success zone on the bar
    pub zone: (f32, f32),
    pub outcome: Option<RaceOutcome>,
    seed: u64,
    rng: StdRng,
}

impl RacingGame {
    pub fn new(seed: u64) -> Self {
        Self {
            cars: [Car::new(), Car::new()],
            bar_position: 0.0,
            bar_direction: 1.0,
            bar_speed: BAR_SPEED,
            zone: START_ZONE,
            outcome: None,
            seed,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn car(&self, racer: Racer) -> &Car {
        &self.cars[racer.index()]
    }

    pub fn bar_in_zone(&self) -> bool {
        self.zone.0 <= self.bar_position && self.bar_position <= self.zone.1
    }

    /// Resolves one button press.
    pub fn hit(&mut self, racer: Racer) {
        if self.outcome.is_some() {
            return;
        }
        let in_zone = self.bar_in_zone();
        let car = &mut self.cars[racer.index()];
        if in_zone {
            car.x += MOVE_INCREMENT;
            car.round_hits += 1;
            car.score += 1;
        } else {
            car.wrong_hits += 1;
            if car.wrong_hits >= WRONG_HITS_LIMIT {
                info!("{:?} struck out", racer);
                self.outcome = Some(RaceOutcome {
                    winner: racer.other(),
                    reason: WinReason::OpponentStruckOut,
                });
            }
        }
    }

    fn start_new_round(&mut self) {
        for car in &mut self.cars {
            car.round_hits = 0;
        }
        self.bar_speed += BAR_SPEEDUP;
        self.zone = (
            self.rng.gen_range(10..=150) as f32,
            self.rng.gen_range(160..=200) as f32,
        );
        self.bar_position = self.rng.gen_range(0..=200) as f32;
    }

    /// Advances one frame.
    pub fn step(&mut self) {
        if self.outcome.is_some() {
            return;
        }
        self.bar_position += self.bar_speed * self.bar_direction;
        if self.bar_position > BAR_LENGTH || self.bar_position < 0.0 {
            self.bar_direction = -self.bar_direction;
        }

        if self.cars.iter().any(|car| car.round_hits >= HITS_PER_ROUND) {
            self.start_new_round();
        }

        for racer in [Racer::One, Racer::Two] {
            if self.car(racer).finished() {
                info!("{:?} crossed the finish line", racer);
                self.outcome = Some(RaceOutcome {
                    winner: racer,
                    reason: WinReason::CrossedFinish,
                });
                break;
            }
        }
    }
}

impl Minigame for RacingGame {
    fn kind(&self) -> GameKind {
        GameKind::Racing
    }

    fn apply_input(&mut self, input: &GameInput) -> ArcadeResult<()> {
        match input {
            GameInput::Racing(RacingInput::Hit(racer)) => {
                self.hit(*racer);
                Ok(())
            }
            other => Err(wrong_input(self.kind(), other)),
        }
    }

    fn tick(&mut self) -> ArcadeResult<()> {
        self.step();
        Ok(())
    }

    /// The better of the two scores.
    fn score(&self) -> u64 {
        self.cars[0].score.max(self.cars[1].score)
    }

    fn is_over(&self) -> bool {
        self.outcome.is_some()
    }

    fn restart(&mut self) -> ArcadeResult<()> {
        *self = Self::new(self.seed);
        Ok(())
    }

    fn status_line(&self) -> String {
        let [one, two] = &self.cars;
        let mut line = format!(
            "P1 {} ({} wrong) | P2 {} ({} wrong) | Zone {:.0}-{:.0}",
            one.score, one.wrong_hits, two.score, two.wrong_hits, self.zone.0, self.zone.1
        );
        if let Some(outcome) = self.outcome {
            line.push_str(&format!(" | {:?} wins", outcome.winner));
        }
        line
    }
}
