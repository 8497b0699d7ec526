//! # Space Shooter
//!
//! A side-scrolling shooter on a 600x600 field. Aliens fly in from the right
//! and cost a hit point if they get past; asteroids soak up ten beams; coins
//! blink in and out for bonus points.
//!
//! The ship moves on a 60 pixel grid and fires two beams at a time.

use super::{wrong_input, Direction, GameKind, Minigame};
use crate::input::{GameInput, ShooterInput};
use crate::{ArcadeResult, Rect};
use log::{debug, info};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

pub const FIELD_SIZE: f32 = 600.0;
/// Grid the ship, aliens and coins snap to
pub const GRID_STEP: f32 = 60.0;
pub const SHIP_SIZE: f32 = 60.0;
pub const SHIP_START: (f32, f32) = (60.0, 300.0);
pub const SHIP_HEALTH: u32 = 5;
pub const BEAM_WIDTH: f32 = 10.0;
pub const BEAM_HEIGHT: f32 = 5.0;
pub const BEAM_SPEED: f32 = 3.0;
/// Frames between volleys
pub const SHOOT_COOLDOWN: u32 = 15;
pub const ALIEN_SIZE: f32 = 70.0;
pub const ALIEN_SPAWN_RATE: u32 = 120;
pub const MIN_ALIEN_SPAWN_RATE: u32 = 30;
pub const ALIEN_SPEEDUP: f32 = 0.05;
/// No asteroids during the first six seconds
pub const ASTEROID_GRACE_FRAMES: u64 = 360;
pub const ASTEROID_SPAWN_RATE: u32 = 500;
pub const MAX_ASTEROID_SPAWN_RATE: u32 = 1000;
pub const ASTEROID_RATE_STEP: u32 = 50;
pub const ASTEROID_HITS: u32 = 10;
pub const COIN_SPAWN_RATE: u32 = 500;
pub const COIN_SIZE: f32 = 30.0;
pub const COIN_LIFETIME: u32 = 300;
pub const COIN_VALUE: u64 = 5;
/// Score interval between difficulty bumps
pub const DIFFICULTY_STEP: u64 = 20;

/// An enemy ship.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Alien {
    pub rect: Rect,
    pub speed: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Asteroid {
    pub rect: Rect,
    pub speed: f32,
    pub hits: u32,
}

/// A short-lived bonus pickup.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpaceCoin {
    pub rect: Rect,
    /// Frames left before it vanishes
    pub lifetime: u32,
}

/// State of one shooter run.
#[derive(Debug)]
pub struct ShooterGame {
    pub ship: Rect,
    pub health: u32,
    pub score: u64,
    pub frame: u64,
    pub shoot_cooldown: u32,
    pub beams: Vec<Rect>,
    pub aliens: Vec<Alien>,
    pub asteroids: Vec<Asteroid>,
    pub coins: Vec<SpaceCoin>,
    pub alien_spawn_rate: u32,
    pub asteroid_spawn_rate: u32,
    /// Extra speed given to newly spawned aliens
    pub alien_speed_bonus: f32,
    next_difficulty_score: u64,
    seed: u64,
    rng: StdRng,
}

/// Snaps a random offset in `low..=high` to the nearest grid line.
fn snapped(rng: &mut StdRng, low: f32, high: f32) -> f32 {
    let raw = rng.gen_range(low as i32..=high as i32) as f32;
    GRID_STEP * (raw / GRID_STEP).round()
}

impl ShooterGame {
    pub fn new(seed: u64) -> Self {
        Self {
            ship: Rect::new(SHIP_START.0, SHIP_START.1, SHIP_SIZE, SHIP_SIZE),
            health: SHIP_HEALTH,
            score: 0,
            frame: 0,
            shoot_cooldown: 0,
            beams: Vec::new(),
            aliens: Vec::new(),
            asteroids: Vec::new(),
            coins: Vec::new(),
            alien_spawn_rate: ALIEN_SPAWN_RATE,
            asteroid_spawn_rate: ASTEROID_SPAWN_RATE,
            alien_speed_bonus: 0.0,
            next_difficulty_score: DIFFICULTY_STEP,
            seed,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn is_game_over(&self) -> bool {
        self.health == 0
    }

    /// Moves the ship one grid step, staying on the field.
    pub fn move_ship(&mut self, direction: Direction) {
        let ship = &mut self.ship;
        match direction {
            Direction::Up if ship.y > 0.0 => ship.y -= GRID_STEP,
            Direction::Down if ship.y < FIELD_SIZE - SHIP_SIZE => ship.y += GRID_STEP,
            Direction::Left if ship.x > 0.0 => ship.x -= GRID_STEP,
            Direction::Right if ship.x < FIELD_SIZE - SHIP_SIZE => ship.x += GRID_STEP,
            _ => {}
        }
    }

    /// Fires a pair of beams if the cannon has cooled down.
    pub fn shoot(&mut self) -> bool {
        if self.shoot_cooldown > 0 {
            return false;
        }
        let x = self.ship.right();
        let mid = self.ship.y + SHIP_SIZE / 2.0;
        self.beams
            .push(Rect::new(x, mid - 10.0, BEAM_WIDTH, BEAM_HEIGHT));
        self.beams
            .push(Rect::new(x, mid + 10.0, BEAM_WIDTH, BEAM_HEIGHT));
        self.shoot_cooldown = SHOOT_COOLDOWN;
        true
    }

    fn roll(&mut self, rate: u32) -> bool {
        self.rng.gen_range(1..=rate.max(1)) == 1
    }

    fn spawn_alien(&mut self) {
        let y = snapped(&mut self.rng, 0.0, FIELD_SIZE - ALIEN_SIZE);
        let speed = self.rng.gen_range(2.0..4.0) + self.alien_speed_bonus;
        self.aliens.push(Alien {
            rect: Rect::new(FIELD_SIZE, y, ALIEN_SIZE, ALIEN_SIZE),
            speed,
        });
    }

    fn spawn_asteroid(&mut self) {
        let size = self.rng.gen_range(100..=200) as f32;
        let y = snapped(&mut self.rng, 0.0, FIELD_SIZE - size);
        let speed = self.rng.gen_range(0.5..2.0);
        debug!("Asteroid of size {} incoming", size);
        self.asteroids.push(Asteroid {
            rect: Rect::new(FIELD_SIZE, y, size, size),
            speed,
            hits: 0,
        });
    }

    fn spawn_coin(&mut self) {
        let x = snapped(&mut self.rng, FIELD_SIZE / 3.0, FIELD_SIZE - COIN_SIZE);
        let y = snapped(&mut self.rng, 0.0, FIELD_SIZE - COIN_SIZE);
        self.coins.push(SpaceCoin {
            rect: Rect::new(x, y, COIN_SIZE, COIN_SIZE),
            lifetime: COIN_LIFETIME,
        });
    }

    fn spawn(&mut self) {
        if self.roll(self.alien_spawn_rate) {
            self.spawn_alien();
        }
        if self.frame > ASTEROID_GRACE_FRAMES && self.roll(self.asteroid_spawn_rate) {
            self.spawn_asteroid();
        }
        if self.roll(COIN_SPAWN_RATE) {
            self.spawn_coin();
        }
    }

    /// Applies one difficulty bump per score threshold crossed.
    fn ramp_difficulty(&mut self) {
        while self.score >= self.next_difficulty_score {
            for alien in &mut self.aliens {
                alien.speed += ALIEN_SPEEDUP;
            }
            self.alien_speed_bonus += ALIEN_SPEEDUP;
            self.alien_spawn_rate = self
                .alien_spawn_rate
                .saturating_sub(1)
                .max(MIN_ALIEN_SPAWN_RATE);
            self.asteroid_spawn_rate =
                (self.asteroid_spawn_rate + ASTEROID_RATE_STEP).min(MAX_ASTEROID_SPAWN_RATE);
            self.next_difficulty_score += DIFFICULTY_STEP;
            info!(
                "Difficulty up: alien rate 1/{}, asteroid rate 1/{}",
                self.alien_spawn_rate, self.asteroid_spawn_rate
            );
        }
    }

    /// Removes the first beam overlapping `target`, returning whether one did.
    fn take_beam_hit(beams: &mut Vec<Rect>, target: &Rect) -> bool {
        match beams.iter().position(|beam| beam.intersects(target)) {
            Some(index) => {
                beams.remove(index);
                true
            }
            None => false,
        }
    }

    fn update_aliens(&mut self) {
        let mut remaining = Vec::with_capacity(self.aliens.len());
        for mut alien in std::mem::take(&mut self.aliens) {
            alien.rect.x -= alien.speed;
            if alien.rect.x < 0.0 {
                self.health = self.health.saturating_sub(1);
            } else if alien.rect.intersects(&self.ship) {
                // Ramming clears the alien without costing health
            } else if Self::take_beam_hit(&mut self.beams, &alien.rect) {
                self.score += 1;
            } else {
                remaining.push(alien);
            }
        }
        self.aliens = remaining;
    }

    fn update_asteroids(&mut self) {
        let mut remaining = Vec::with_capacity(self.asteroids.len());
        for mut asteroid in std::mem::take(&mut self.asteroids) {
            asteroid.rect.x -= asteroid.speed;
            if asteroid.rect.right() < 0.0 {
                continue;
            }
            while Self::take_beam_hit(&mut self.beams, &asteroid.rect) {
                asteroid.hits += 1;
                if asteroid.hits >= ASTEROID_HITS {
                    break;
                }
            }
            if asteroid.hits >= ASTEROID_HITS {
                continue;
            }
            if asteroid.rect.intersects(&self.ship) {
                self.health = self.health.saturating_sub(1);
                continue;
            }
            remaining.push(asteroid);
        }
        self.asteroids = remaining;
    }

    fn update_coins(&mut self) {
        let ship = self.ship;
        let mut collected = 0;
        self.coins.retain_mut(|coin| {
            coin.lifetime = coin.lifetime.saturating_sub(1);
            if coin.lifetime == 0 {
                return false;
            }
            if coin.rect.intersects(&ship) {
                collected += 1;
                return false;
            }
            true
        });
        self.score += collected * COIN_VALUE;
    }

    /// Advances one frame.
    pub fn step(&mut self) {
        if self.is_game_over() {
            return;
        }
        self.frame += 1;
        self.shoot_cooldown = self.shoot_cooldown.saturating_sub(1);

        for beam in &mut self.beams {
            beam.x += BEAM_SPEED;
        }
        self.beams.retain(|beam| beam.x <= FIELD_SIZE);

        self.spawn();
        self.ramp_difficulty();
        self.update_aliens();
        self.update_asteroids();
        self.update_coins();

        if self.is_game_over() {
            info!("Ship destroyed with score {}", self.score);
        }
    }
}

impl Minigame for ShooterGame {
    fn kind(&self) -> GameKind {
        GameKind::Shooter
    }

    fn apply_input(&mut self, input: &GameInput) -> ArcadeResult<()> {
        match input {
            GameInput::Shooter(command) => {
                if self.is_game_over() {
                    return Ok(());
                }
                match command {
                    ShooterInput::Move(direction) => self.move_ship(*direction),
                    ShooterInput::Shoot => {
                        self.shoot();
                    }
                }
                Ok(())
            }
            other => Err(wrong_input(self.kind(), other)),
        }
    }

    fn tick(&mut self) -> ArcadeResult<()> {
        self.step();
        Ok(())
    }

    fn score(&self) -> u64 {
        self.score
    }

    fn is_over(&self) -> bool {
        self.is_game_over()
    }

    fn restart(&mut self) -> ArcadeResult<()> {
        *self = Self::new(self.seed);
        Ok(())
    }

    fn status_line(&self) -> String {
        format!("Score {} | Health {}/{}", self.score, self.health, SHIP_HEALTH)
    }
}
