//! # Dungeon Crawler
//!
//! Three levels of arrow-shooting combat. The first two are walled arenas
//! ringed with fire; the third is an open cave broken up by poison pools and
//! guarded by a boss. Clearing every enemy on a level moves on to the next,
//! keeping the hero's health.
//!
//! Time is a millisecond game clock advanced by [`CrawlerGame::update`], so
//! cooldowns and power-up timers replay exactly for a given seed.

use super::{
    wrong_input, Direction, Enemy, EnemyKind, EntityId, GameKind, Minigame, Obstacles, Position,
};
use crate::config::{CRAWLER_LEVELS, DEFAULT_PLAYER_HEALTH, FRAME_MS, TILE_SIZE};
use crate::generation::utils::create_rng;
use crate::input::{CrawlerInput, GameInput};
use crate::{ArcadeResult, DungeonGenerator, DungeonMap, GenerationConfig, Generator, Rect, Terrain};
use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

pub const SHOOT_DELAY_MS: u64 = 500;
/// Grace period after taking contact damage
pub const INVULNERABLE_MS: u64 = 500;
pub const ARROW_SIZE: f32 = 8.0;
pub const ARROW_SPEED: f32 = 15.0;
pub const ARROW_DAMAGE: f32 = 20.0;
pub const POTION_HEAL: i32 = 15;
pub const POTION_INTERVAL_MS: u64 = 10_000;
pub const STAFF_INTERVAL_MS: u64 = 20_000;
/// Staff interval while the hero is below a fifth of their health
pub const LOW_HEALTH_STAFF_INTERVAL_MS: u64 = 10_000;
pub const STAFF_MULTIPLIER: f32 = 1.5;
pub const STAFF_DAMAGE: i32 = 20;
pub const LEVEL_BONUS: u64 = 100;
const SPAWN_ATTEMPTS: u32 = 100;

/// Where the crawler is in its level loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CrawlerPhase {
    Combat,
    /// A level was just cleared; the next update loads the next one
    Transition,
    GameOver,
    Victory,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PowerUpKind {
    Potion,
    Staff,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PowerUp {
    pub kind: PowerUpKind,
    pub rect: Rect,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Arrow {
    pub rect: Rect,
    pub direction: Direction,
}

/// The player character.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hero {
    pub rect: Rect,
    pub health: i32,
    pub max_health: i32,
    pub facing: Direction,
    pub last_shot_ms: Option<u64>,
    pub invulnerable_until_ms: u64,
    pub damage_multiplier: f32,
}

impl Hero {
    fn new(tile: Position, health: i32) -> Self {
        Self {
            rect: DungeonMap::tile_rect(tile),
            health,
            max_health: DEFAULT_PLAYER_HEALTH,
            facing: Direction::Right,
            last_shot_ms: None,
            invulnerable_until_ms: 0,
            damage_multiplier: 1.0,
        }
    }

    /// Tile the hero is standing on.
    pub fn tile(&self) -> Position {
        DungeonMap::tile_at_pixel(self.rect.x, self.rect.y)
    }
}

/// State of one dungeon run.
#[derive(Debug)]
pub struct CrawlerGame {
    pub level: u32,
    pub map: DungeonMap,
    pub phase: CrawlerPhase,
    pub hero: Hero,
    pub enemies: Vec<Enemy>,
    pub arrows: Vec<Arrow>,
    pub power_ups: Vec<PowerUp>,
    pub score: u64,
    /// Game clock in milliseconds
    pub clock_ms: u64,
    pub potion_interval_ms: u64,
    pub staff_interval_ms: u64,
    last_potion_ms: u64,
    last_staff_ms: u64,
    walls: Vec<Rect>,
    hazards: Vec<Rect>,
    seed: u64,
    rng: StdRng,
    generator: DungeonGenerator,
}

impl CrawlerGame {
    /// Starts a run on level one.
    pub fn new(seed: u64) -> ArcadeResult<Self> {
        Self::at_level(seed, 1)
    }

    /// Starts a run on the given level.
    pub fn at_level(seed: u64, level: u32) -> ArcadeResult<Self> {
        let generator = DungeonGenerator::new();
        let map = Self::generate_map(&generator, seed, level)?;
        let mut game = Self::empty(seed, map, generator);
        game.populate();
        Ok(game)
    }

    /// Starts a run on a prepared map with no enemies.
    ///
    /// Useful for replaying a saved layout or for setting up a scenario by hand.
    pub fn on_map(seed: u64, map: DungeonMap, hero_tile: Position) -> Self {
        let mut game = Self::empty(seed, map, DungeonGenerator::new());
        game.hero = Hero::new(hero_tile, DEFAULT_PLAYER_HEALTH);
        game
    }

    fn empty(seed: u64, map: DungeonMap, generator: DungeonGenerator) -> Self {
        let level = map.level.max(1);
        let center = DungeonMap::tile_at_pixel(map.pixel_center().x, map.pixel_center().y);
        let mut game = Self {
            level,
            walls: map.walls(),
            hazards: map.hazards(),
            map,
            phase: CrawlerPhase::Combat,
            hero: Hero::new(center, DEFAULT_PLAYER_HEALTH),
            enemies: Vec::new(),
            arrows: Vec::new(),
            power_ups: Vec::new(),
            score: 0,
            clock_ms: 0,
            potion_interval_ms: POTION_INTERVAL_MS,
            staff_interval_ms: STAFF_INTERVAL_MS,
            last_potion_ms: 0,
            last_staff_ms: 0,
            seed,
            rng: StdRng::seed_from_u64(seed),
            generator,
        };
        game.scale_intervals();
        game
    }

    fn generate_map(generator: &DungeonGenerator, seed: u64, level: u32) -> ArcadeResult<DungeonMap> {
        let config = GenerationConfig::for_testing(seed).for_level(level);
        let mut rng = create_rng(&config);
        generator.generate(&config, &mut rng)
    }

    /// Later levels hand out power-ups more often.
    fn scale_intervals(&mut self) {
        let factor = match self.level {
            1 => 1.0,
            2 => 0.8,
            _ => 0.6,
        };
        self.potion_interval_ms = (POTION_INTERVAL_MS as f64 * factor) as u64;
        self.staff_interval_ms = (STAFF_INTERVAL_MS as f64 * factor) as u64;
    }

    fn screen(&self) -> Rect {
        Rect::new(
            0.0,
            0.0,
            self.map.width as f32 * TILE_SIZE,
            self.map.height as f32 * TILE_SIZE,
        )
    }

    /// Places the hero and the level's enemies.
    fn populate(&mut self) {
        let hero_tile = self.find_hero_spawn();
        let health = self.hero.health;
        self.hero = Hero::new(hero_tile, health);
        self.enemies = self.spawn_enemies();
        info!(
            "Level {} begins with {} enemies",
            self.level,
            self.enemies.len()
        );
    }

    /// One of the three open tiles furthest from the middle of the screen.
    pub fn find_hero_spawn(&mut self) -> Position {
        let center = self.map.pixel_center();
        let mut candidates: Vec<Position> = self
            .map
            .floor_cells()
            .into_iter()
            .filter(|pos| self.away_from_edge(*pos))
            .filter(|pos| {
                let rect = DungeonMap::tile_rect(*pos);
                !self.walls.iter().any(|w| rect.intersects(w))
                    && !self.hazards.iter().any(|h| rect.intersects(h))
            })
            .collect();

        if candidates.is_empty() {
            warn!("No open spawn tiles, placing hero in the centre");
            return DungeonMap::tile_at_pixel(center.x, center.y);
        }

        candidates.sort_by(|a, b| {
            let da = DungeonMap::tile_rect(*a).center().distance(center);
            let db = DungeonMap::tile_rect(*b).center().distance(center);
            db.total_cmp(&da)
        });
        candidates.truncate(3);
        candidates
            .choose(&mut self.rng)
            .copied()
            .unwrap_or_else(|| DungeonMap::tile_at_pixel(center.x, center.y))
    }

    fn away_from_edge(&self, pos: Position) -> bool {
        pos.x >= 2 && pos.y >= 2 && pos.x <= self.map.width - 3 && pos.y <= self.map.height - 3
    }

    /// Checks the terrain around a tile an enemy wants to spawn on.
    pub fn is_valid_spawn_tile(&self, pos: Position) -> bool {
        if !self.away_from_edge(pos) || self.map.terrain_at(pos) != Some(Terrain::Floor) {
            return false;
        }
        if pos
            .adjacent_positions()
            .into_iter()
            .any(|n| self.map.terrain_at(n) == Some(Terrain::Wall))
        {
            return false;
        }
        if self.map.is_poison_level() {
            for dy in -2..=2 {
                for dx in -2..=2 {
                    let near = Position::new(pos.x + dx, pos.y + dy);
                    if self.map.terrain_at(near).is_some_and(Terrain::is_hazard) {
                        return false;
                    }
                }
            }
            true
        } else {
            let rect = DungeonMap::tile_rect(pos);
            !self.hazards.iter().any(|h| rect.intersects(h))
        }
    }

    /// Keeps new enemies away from the hero and from each other.
    fn spaced_out(&self, pos: Position, placed: &[Enemy]) -> bool {
        let center = DungeonMap::tile_rect(pos).center();
        if center.distance(self.hero.rect.center()) < TILE_SIZE * 6.0 {
            return false;
        }
        placed.iter().all(|enemy| {
            let min_tiles = match enemy.kind {
                EnemyKind::Grunt => 4.0,
                EnemyKind::Boss => 6.0,
            };
            center.distance(enemy.rect.center()) >= TILE_SIZE * min_tiles
        })
    }

    fn random_spawn_tile(&mut self, placed: &[Enemy]) -> Option<Position> {
        for _ in 0..SPAWN_ATTEMPTS {
            let pos = Position::new(
                self.rng.gen_range(3..=self.map.width - 3),
                self.rng.gen_range(3..=self.map.height - 3),
            );
            if self.is_valid_spawn_tile(pos) && self.spaced_out(pos, placed) {
                return Some(pos);
            }
        }
        None
    }

    fn spawn_enemies(&mut self) -> Vec<Enemy> {
        let mut enemies: Vec<Enemy> = Vec::new();
        let grunts = match self.level {
            1 => 3,
            _ => 6,
        };

        if self.level >= CRAWLER_LEVELS {
            let center = DungeonMap::tile_at_pixel(
                self.map.pixel_center().x,
                self.map.pixel_center().y,
            );
            let lair = if self.is_valid_spawn_tile(center) && self.spaced_out(center, &enemies) {
                Some(center)
            } else {
                self.random_spawn_tile(&enemies)
            };
            match lair {
                Some(pos) => {
                    let rect = DungeonMap::tile_rect(pos);
                    enemies.push(Enemy::boss(rect.x, rect.y));
                }
                None => warn!("Could not find a spot for the boss"),
            }
        }

        for _ in 0..grunts {
            match self.random_spawn_tile(&enemies) {
                Some(pos) => {
                    let rect = DungeonMap::tile_rect(pos);
                    enemies.push(Enemy::grunt(rect.x, rect.y, self.level));
                }
                None => debug!("Gave up placing a grunt after {} attempts", SPAWN_ATTEMPTS),
            }
        }
        enemies
    }

    /// Moves the hero one tile, turning to face that way even when blocked.
    pub fn move_hero(&mut self, direction: Direction) -> bool {
        self.hero.facing = direction;
        let target = self.hero.tile().step(direction);
        if self.map.is_blocking(target) {
            return false;
        }
        self.hero.rect = DungeonMap::tile_rect(target);
        true
    }

    /// Looses an arrow the way the hero is facing, if the bow is ready.
    pub fn shoot(&mut self) -> bool {
        let ready = self
            .hero
            .last_shot_ms
            .map_or(true, |last| self.clock_ms.saturating_sub(last) >= SHOOT_DELAY_MS);
        if !ready {
            return false;
        }
        self.arrows.push(Arrow {
            rect: Rect::from_center(self.hero.rect.center(), ARROW_SIZE, ARROW_SIZE),
            direction: self.hero.facing,
        });
        self.hero.last_shot_ms = Some(self.clock_ms);
        true
    }

    fn find_power_up_spot(&mut self) -> Option<Rect> {
        let hero = self.hero.rect.center();
        for _ in 0..SPAWN_ATTEMPTS {
            let pos = Position::new(
                self.rng.gen_range(1..self.map.width - 1),
                self.rng.gen_range(1..self.map.height - 1),
            );
            if self.map.terrain_at(pos) != Some(Terrain::Floor) {
                continue;
            }
            let rect = DungeonMap::tile_rect(pos);
            let blocked = self.walls.iter().any(|w| rect.intersects(w))
                || self.hazards.iter().any(|h| rect.intersects(h))
                || self.power_ups.iter().any(|p| rect.intersects(&p.rect));
            if !blocked && rect.center().distance(hero) >= TILE_SIZE * 3.0 {
                return Some(rect);
            }
        }
        None
    }

    fn spawn_power_ups(&mut self) {
        if self.clock_ms - self.last_potion_ms >= self.potion_interval_ms {
            if let Some(rect) = self.find_power_up_spot() {
                self.power_ups.push(PowerUp {
                    kind: PowerUpKind::Potion,
                    rect,
                });
            }
            self.last_potion_ms = self.clock_ms;
        }

        let staff_interval = if self.hero.health * 5 < self.hero.max_health {
            LOW_HEALTH_STAFF_INTERVAL_MS.min(self.staff_interval_ms)
        } else {
            self.staff_interval_ms
        };
        if self.clock_ms - self.last_staff_ms >= staff_interval {
            if let Some(rect) = self.find_power_up_spot() {
                self.power_ups.push(PowerUp {
                    kind: PowerUpKind::Staff,
                    rect,
                });
            }
            self.last_staff_ms = self.clock_ms;
        }
    }

    fn move_enemies(&mut self) {
        let target = self.hero.rect.center();
        let screen = self.screen();
        let poison_level = self.map.is_poison_level();
        let mut positions: Vec<(EntityId, Rect)> =
            self.enemies.iter().map(|e| (e.id, e.rect)).collect();

        for (index, enemy) in self.enemies.iter_mut().enumerate() {
            let obstacles = Obstacles {
                walls: &self.walls,
                hazards: &self.hazards,
                enemies: &positions,
                poison_level,
                screen,
            };
            enemy.move_towards(target, &obstacles, &mut self.rng);
            positions[index].1 = enemy.rect;
        }
    }

    /// Every enemy overlapping the hero hits at once, if the first of them
    /// is off cooldown and the hero is not still recovering.
    fn apply_contact_damage(&mut self) {
        let now = self.clock_ms;
        if now < self.hero.invulnerable_until_ms {
            return;
        }
        let hero = self.hero.rect;
        let touching: Vec<usize> = self
            .enemies
            .iter()
            .enumerate()
            .filter(|(_, e)| e.rect.intersects(&hero))
            .map(|(i, _)| i)
            .collect();
        let Some(&first) = touching.first() else {
            return;
        };
        if !self.enemies[first].can_hit(now) {
            return;
        }

        let damage: i32 = touching.iter().map(|&i| self.enemies[i].damage).sum();
        for &i in &touching {
            self.enemies[i].last_hit_ms = Some(now);
        }
        self.hero.health -= damage;
        self.hero.invulnerable_until_ms = now + INVULNERABLE_MS;
        debug!("Hero took {} damage from {} enemies", damage, touching.len());

        if self.hero.health <= 0 {
            self.hero.health = 0;
            self.phase = CrawlerPhase::GameOver;
            info!("Hero fell on level {}", self.level);
        }
    }

    fn collect_power_ups(&mut self) {
        let hero = self.hero.rect;
        let (taken, left): (Vec<PowerUp>, Vec<PowerUp>) = self
            .power_ups
            .drain(..)
            .partition(|p| p.rect.intersects(&hero));
        self.power_ups = left;

        for power_up in taken {
            match power_up.kind {
                PowerUpKind::Potion => {
                    self.hero.health = (self.hero.health + POTION_HEAL).min(self.hero.max_health);
                }
                PowerUpKind::Staff => {
                    self.hero.damage_multiplier = STAFF_MULTIPLIER;
                    for enemy in &mut self.enemies {
                        enemy.take_damage(STAFF_DAMAGE);
                    }
                    info!("Staff blast hits {} enemies", self.enemies.len());
                }
            }
        }
    }

    fn update_arrows(&mut self) {
        let damage = (ARROW_DAMAGE * self.hero.damage_multiplier).round() as i32;
        let screen = self.screen();
        let mut flying = Vec::with_capacity(self.arrows.len());

        for mut arrow in std::mem::take(&mut self.arrows) {
            let delta = arrow.direction.to_delta();
            let moved = arrow
                .rect
                .translate(delta.x as f32 * ARROW_SPEED, delta.y as f32 * ARROW_SPEED);
            if self.walls.iter().any(|w| moved.intersects(w)) || !moved.intersects(&screen) {
                continue;
            }
            arrow.rect = moved;
            match self.enemies.iter_mut().find(|e| e.rect.intersects(&moved)) {
                Some(enemy) => enemy.take_damage(damage),
                None => flying.push(arrow),
            }
        }
        self.arrows = flying;
    }

    /// Removes dead enemies and handles a cleared level.
    fn reap(&mut self) {
        let mut bounty = 0;
        self.enemies.retain(|enemy| {
            if enemy.is_alive() {
                true
            } else {
                bounty += enemy.bounty();
                false
            }
        });
        self.score += bounty;

        if self.enemies.is_empty() && self.phase == CrawlerPhase::Combat {
            self.score += LEVEL_BONUS;
            if self.level >= CRAWLER_LEVELS {
                info!("Dungeon cleared with score {}", self.score);
                self.phase = CrawlerPhase::Victory;
            } else {
                info!("Level {} cleared", self.level);
                self.phase = CrawlerPhase::Transition;
            }
        }
    }

    /// Loads the next level, keeping the hero's health.
    pub fn advance_level(&mut self) -> ArcadeResult<()> {
        self.level += 1;
        self.map = Self::generate_map(&self.generator, self.seed, self.level)?;
        self.walls = self.map.walls();
        self.hazards = self.map.hazards();
        self.arrows.clear();
        self.power_ups.clear();
        self.scale_intervals();
        self.last_potion_ms = self.clock_ms;
        self.last_staff_ms = self.clock_ms;
        self.populate();
        self.phase = CrawlerPhase::Combat;
        Ok(())
    }

    /// Advances the game clock by `dt_ms` and runs one frame.
    pub fn update(&mut self, dt_ms: u64) -> ArcadeResult<()> {
        match self.phase {
            CrawlerPhase::Transition => return self.advance_level(),
            CrawlerPhase::GameOver | CrawlerPhase::Victory => return Ok(()),
            CrawlerPhase::Combat => {}
        }
        self.clock_ms += dt_ms;

        self.spawn_power_ups();

        let hero = self.hero.rect;
        if self.hazards.iter().any(|h| h.intersects(&hero)) {
            info!("Hero stepped into a hazard");
            self.hero.health = 0;
            self.phase = CrawlerPhase::GameOver;
            return Ok(());
        }

        self.move_enemies();
        self.apply_contact_damage();
        if self.phase == CrawlerPhase::GameOver {
            return Ok(());
        }

        self.collect_power_ups();
        self.update_arrows();
        self.reap();
        Ok(())
    }
}

impl Minigame for CrawlerGame {
    fn kind(&self) -> GameKind {
        GameKind::Crawler
    }

    fn apply_input(&mut self, input: &GameInput) -> ArcadeResult<()> {
        match input {
            GameInput::Crawler(command) => {
                if self.phase == CrawlerPhase::Combat {
                    match command {
                        CrawlerInput::Move(direction) => {
                            self.move_hero(*direction);
                        }
                        CrawlerInput::Shoot => {
                            self.shoot();
                        }
                    }
                }
                Ok(())
            }
            other => Err(wrong_input(self.kind(), other)),
        }
    }

    fn tick(&mut self) -> ArcadeResult<()> {
        self.update(FRAME_MS)
    }

    fn score(&self) -> u64 {
        self.score
    }

    fn is_over(&self) -> bool {
        matches!(self.phase, CrawlerPhase::GameOver | CrawlerPhase::Victory)
    }

    fn restart(&mut self) -> ArcadeResult<()> {
        *self = Self::new(self.seed)?;
        Ok(())
    }

    fn status_line(&self) -> String {
        format!(
            "Level {}/{} | Health {}/{} | Enemies {} | Score {}",
            self.level,
            CRAWLER_LEVELS,
            self.hero.health,
            self.hero.max_health,
            self.enemies.len(),
            self.score
        )
    }
}
