//! # Dungeon Enemies
//!
//! Grunts and the level-three boss. Both chase the player; they differ in
//! stats and in how they get around obstacles.

use super::{new_entity_id, EntityId};
use crate::config::TILE_SIZE;
use crate::{Rect, Vec2};
use rand::rngs::StdRng;
use rand::Rng;
use serde::{Deserialize, Serialize};

pub const ENEMY_SIZE: f32 = 40.0;
pub const ENEMY_SPEED: f32 = 1.5;
pub const GRUNT_HEALTH: i32 = 60;
pub const GRUNT_DAMAGE: i32 = 15;
pub const BOSS_HEALTH: i32 = 120;
pub const BOSS_DAMAGE: i32 = 30;
/// Minimum time between two contact hits from the same enemy
pub const CONTACT_COOLDOWN_MS: u64 = 1000;
/// Grunts on the poison level keep this far from poison tile centres
pub const POISON_KEEP_AWAY: f32 = TILE_SIZE * 1.5;

const DIAGONAL: f32 = 0.707;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnemyKind {
    Grunt,
    Boss,
}

/// What an enemy has to steer around.
#[derive(Debug, Clone, Copy)]
pub struct Obstacles<'a> {
    pub walls: &'a [Rect],
    /// Fire and poison tiles
    pub hazards: &'a [Rect],
    /// Every enemy on the map, the mover included
    pub enemies: &'a [(EntityId, Rect)],
    pub poison_level: bool,
    pub screen: Rect,
}

impl Obstacles<'_> {
    fn touches_wall(&self, rect: &Rect) -> bool {
        self.walls.iter().any(|wall| rect.intersects(wall))
    }

    fn touches_hazard(&self, rect: &Rect) -> bool {
        self.hazards.iter().any(|hazard| rect.intersects(hazard))
    }

    fn touches_enemy(&self, rect: &Rect, me: EntityId) -> bool {
        self.enemies
            .iter()
            .any(|(id, other)| *id != me && rect.intersects(other))
    }

    fn near_poison(&self, point: Vec2) -> bool {
        self.hazards
            .iter()
            .any(|hazard| hazard.center().distance(point) < POISON_KEEP_AWAY)
    }
}

/// A dungeon monster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Enemy {
    pub id: EntityId,
    pub kind: EnemyKind,
    pub rect: Rect,
    pub health: i32,
    pub max_health: i32,
    pub damage: i32,
    pub speed: f32,
    /// Game clock time of the last contact hit
    pub last_hit_ms: Option<u64>,
}

impl Enemy {
    /// A grunt at the given top-left pixel. Level-two grunts are 20% tougher.
    pub fn grunt(x: f32, y: f32, level: u32) -> Self {
        let health = if level == 2 {
            GRUNT_HEALTH * 6 / 5
        } else {
            GRUNT_HEALTH
        };
        Self::with_stats(EnemyKind::Grunt, x, y, health, GRUNT_DAMAGE)
    }

    pub fn boss(x: f32, y: f32) -> Self {
        Self::with_stats(EnemyKind::Boss, x, y, BOSS_HEALTH, BOSS_DAMAGE)
    }

    fn with_stats(kind: EnemyKind, x: f32, y: f32, health: i32, damage: i32) -> Self {
        Self {
            id: new_entity_id(),
            kind,
            rect: Rect::new(x, y, ENEMY_SIZE, ENEMY_SIZE),
            health,
            max_health: health,
            damage,
            speed: ENEMY_SPEED,
            last_hit_ms: None,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.health > 0
    }

    /// Points awarded for the kill.
    pub fn bounty(&self) -> u64 {
        match self.kind {
            EnemyKind::Grunt => 10,
            EnemyKind::Boss => 50,
        }
    }

    pub fn take_damage(&mut self, amount: i32) {
        self.health -= amount;
    }

    /// True if this enemy may deal contact damage at `now_ms`.
    pub fn can_hit(&self, now_ms: u64) -> bool {
        self.last_hit_ms
            .map_or(true, |last| now_ms.saturating_sub(last) >= CONTACT_COOLDOWN_MS)
    }

    /// Takes one movement step toward `target`.
    pub fn move_towards(&mut self, target: Vec2, obstacles: &Obstacles, rng: &mut StdRng) {
        match self.kind {
            EnemyKind::Grunt => self.chase(target, obstacles),
            EnemyKind::Boss => {
                self.steer(target, obstacles, rng);
            }
        }
    }

    /// Straight-line chase that simply stops when the way is blocked.
    fn chase(&mut self, target: Vec2, obstacles: &Obstacles) {
        let Some(direction) = (target - self.rect.center()).normalized() else {
            return;
        };
        let step = direction.scale(self.speed);
        let moved = self.rect.translate(step.x, step.y);

        let blocked = if obstacles.poison_level {
            obstacles.near_poison(moved.center())
        } else {
            obstacles.touches_wall(&moved)
                || obstacles.touches_hazard(&moved)
                || obstacles.touches_enemy(&moved, self.id)
        };
        if !blocked {
            self.rect = moved;
        }
    }

    /// A wall within ten pixels of any side.
    fn near_wall(&self, obstacles: &Obstacles) -> bool {
        obstacles.touches_wall(&self.rect.inflate(20.0, 20.0))
    }

    /// Tries a fan of headings and step sizes, keeping the first clear one.
    ///
    /// Returns whether the boss moved.
    fn steer(&mut self, target: Vec2, obstacles: &Obstacles, rng: &mut StdRng) -> bool {
        let Some(d) = (target - self.rect.center()).normalized() else {
            return false;
        };
        let near_wall = self.near_wall(obstacles);
        let headings = boss_headings(d, near_wall);
        let steps = boss_steps(near_wall);
        let bounds = obstacles.screen.inflate(-TILE_SIZE, -TILE_SIZE);

        for (hx, hy) in headings {
            let speed = self.speed * rng.gen_range(0.8..1.0);
            for step in steps {
                let trial = self
                    .rect
                    .translate(hx * speed * step, hy * speed * step);
                if trial.x < bounds.x
                    || trial.right() > bounds.right()
                    || trial.y < bounds.y
                    || trial.bottom() > bounds.bottom()
                {
                    continue;
                }
                let buffered = trial.inflate(4.0, 4.0);
                if obstacles.touches_wall(&buffered) || obstacles.touches_hazard(&buffered) {
                    continue;
                }
                if obstacles.touches_enemy(&buffered.inflate(-2.0, -2.0), self.id) {
                    continue;
                }
                self.rect = trial;
                return true;
            }
        }
        false
    }
}

/// Headings the boss tries, best first. Next to a wall it may also back off
/// or slide sideways.
fn boss_headings(d: Vec2, near_wall: bool) -> Vec<(f32, f32)> {
    let mut headings = vec![
        (d.x, d.y),
        (d.x, d.y),
        (d.x * 0.866, d.y * 0.5),
        (d.x * 0.5, d.y * 0.866),
        (-d.x * 0.5, d.y * 0.866),
        (d.x * 0.866, -d.y * 0.5),
        (1.0, 0.0),
        (-1.0, 0.0),
        (0.0, 1.0),
        (0.0, -1.0),
        (DIAGONAL, DIAGONAL),
        (-DIAGONAL, DIAGONAL),
        (DIAGONAL, -DIAGONAL),
        (-DIAGONAL, -DIAGONAL),
    ];
    if near_wall {
        headings.extend([
            (-d.x, -d.y),
            (-d.x * 0.866, -d.y * 0.5),
            (-d.x * 0.5, -d.y * 0.866),
            (d.y, -d.x),
            (-d.y, d.x),
        ]);
    }
    headings
}

/// Fractions of a full stride, largest first.
fn boss_steps(near_wall: bool) -> &'static [f32] {
    if near_wall {
        &[0.5, 0.25, 0.125]
    } else {
        &[1.0, 0.75, 0.5, 0.25]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn screen() -> Rect {
        Rect::new(0.0, 0.0, 800.0, 600.0)
    }

    fn open_field<'a>(enemies: &'a [(EntityId, Rect)]) -> Obstacles<'a> {
        Obstacles {
            walls: &[],
            hazards: &[],
            enemies,
            poison_level: false,
            screen: screen(),
        }
    }

    #[test]
    fn test_grunt_stats_by_level() {
        assert_eq!(Enemy::grunt(0.0, 0.0, 1).health, 60);
        assert_eq!(Enemy::grunt(0.0, 0.0, 2).max_health, 72);
        let boss = Enemy::boss(0.0, 0.0);
        assert_eq!((boss.health, boss.damage), (120, 30));
        assert_eq!(boss.bounty(), 50);
    }

    #[test]
    fn test_grunt_chases() {
        let mut grunt = Enemy::grunt(100.0, 100.0, 1);
        let mut rng = StdRng::seed_from_u64(1);
        grunt.move_towards(Vec2::new(400.0, 120.0), &open_field(&[]), &mut rng);
        assert!((grunt.rect.x - (100.0 + ENEMY_SPEED)).abs() < 1e-4);
        assert_eq!(grunt.rect.y, 100.0);
    }

    #[test]
    fn test_grunt_blocked_by_wall() {
        let mut grunt = Enemy::grunt(100.0, 100.0, 1);
        let walls = [Rect::new(141.0, 100.0, 40.0, 40.0)];
        let obstacles = Obstacles {
            walls: &walls,
            ..open_field(&[])
        };
        let mut rng = StdRng::seed_from_u64(1);
        grunt.move_towards(Vec2::new(400.0, 120.0), &obstacles, &mut rng);
        assert_eq!(grunt.rect.x, 100.0);
    }

    #[test]
    fn test_grunt_ignores_itself() {
        let mut grunt = Enemy::grunt(100.0, 100.0, 1);
        let others = [(grunt.id, grunt.rect)];
        let mut rng = StdRng::seed_from_u64(1);
        grunt.move_towards(Vec2::new(400.0, 120.0), &open_field(&others), &mut rng);
        assert!(grunt.rect.x > 100.0);
    }

    #[test]
    fn test_poison_level_grunt_keeps_distance() {
        let mut grunt = Enemy::grunt(100.0, 100.0, 3);
        // Poison tile centred 50px to the right of the grunt's next position
        let hazards = [Rect::new(151.5, 100.0, 40.0, 40.0)];
        let obstacles = Obstacles {
            hazards: &hazards,
            poison_level: true,
            ..open_field(&[])
        };
        let mut rng = StdRng::seed_from_u64(1);
        grunt.move_towards(Vec2::new(400.0, 120.0), &obstacles, &mut rng);
        assert_eq!(grunt.rect.x, 100.0);
    }

    #[test]
    fn test_boss_goes_around_blocker() {
        let mut boss = Enemy::boss(200.0, 200.0);
        let walls = [Rect::new(245.0, 190.0, 40.0, 60.0)];
        let obstacles = Obstacles {
            walls: &walls,
            ..open_field(&[])
        };
        let mut rng = StdRng::seed_from_u64(4);
        let start = boss.rect;
        assert!(boss.steer(Vec2::new(600.0, 220.0), &obstacles, &mut rng));
        assert_ne!(boss.rect, start);
        assert!(!boss.rect.inflate(4.0, 4.0).intersects(&walls[0]));
    }

    #[test]
    fn test_boss_stays_inside_padding() {
        let mut boss = Enemy::boss(20.0, 20.0);
        let mut rng = StdRng::seed_from_u64(2);
        boss.move_towards(Vec2::new(0.0, 0.0), &open_field(&[]), &mut rng);
        assert!(boss.rect.x >= TILE_SIZE / 2.0);
        assert!(boss.rect.y >= TILE_SIZE / 2.0);
    }

    #[test]
    fn test_boss_near_wall_widens_headings() {
        // Wall five pixels above the boss
        let walls = [Rect::new(200.0, 150.0, 40.0, 45.0)];
        let obstacles = Obstacles {
            walls: &walls,
            ..open_field(&[])
        };
        let boss = Enemy::boss(200.0, 200.0);
        assert!(boss.near_wall(&obstacles));
        assert!(!boss.near_wall(&open_field(&[])));

        let d = Vec2::new(1.0, 0.0);
        assert_eq!(boss_headings(d, false).len(), 14);
        let wide = boss_headings(d, true);
        assert_eq!(wide.len(), 19);
        assert!(wide[14..].contains(&(-1.0, -0.0)));
        assert!(boss_steps(true).iter().all(|step| *step <= 0.5));
    }

    #[test]
    fn test_boss_takes_short_steps_near_wall() {
        let walls = [Rect::new(200.0, 150.0, 40.0, 45.0)];
        let obstacles = Obstacles {
            walls: &walls,
            ..open_field(&[])
        };
        let target = Vec2::new(600.0, 220.0);

        let mut cramped = Enemy::boss(200.0, 200.0);
        assert!(cramped.steer(target, &obstacles, &mut StdRng::seed_from_u64(3)));
        let cramped_step = cramped.rect.x - 200.0;
        assert_eq!(cramped.rect.y, 200.0);
        assert!(cramped_step > 0.0 && cramped_step <= ENEMY_SPEED * 0.5);

        let mut free = Enemy::boss(200.0, 200.0);
        assert!(free.steer(target, &open_field(&[]), &mut StdRng::seed_from_u64(3)));
        assert!(free.rect.x - 200.0 >= ENEMY_SPEED * 0.8 - 1e-4);
    }

    #[test]
    fn test_contact_cooldown() {
        let mut grunt = Enemy::grunt(0.0, 0.0, 1);
        assert!(grunt.can_hit(0));
        grunt.last_hit_ms = Some(500);
        assert!(!grunt.can_hit(1200));
        assert!(grunt.can_hit(1500));
    }
}
