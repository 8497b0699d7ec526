//! # Autopilot Module
//!
//! Simple computer players for every game, used for headless simulation and
//! for demoing a game from the menu.
//!
//! Each policy only looks at the public state of its game and answers with
//! the next command, if any.

use super::{
    ActiveGame, CrawlerGame, Direction, FallingObstacle, MazeGame, MazePhase, Minigame,
    Position, RacingGame, RunnerGame, ShooterGame,
};
use crate::input::{
    CrawlerInput, GameInput, MazeInput, Racer, RacingInput, RunnerInput, ShooterInput,
};
use crate::{DungeonMap, ObstacleKind, Terrain, LANE_X, PLAYER_Y, RUNNER_LANES};
use ::pathfinding::prelude::bfs;
use log::debug;

/// How far above the monkey the runner policy looks for trouble
const RUNNER_LOOKAHEAD: f32 = 60.0;

/// Autopilot state shared by all the per-game policies.
#[derive(Debug, Clone)]
pub struct Autopilot {
    /// Whether the autopilot is currently playing
    pub enabled: bool,
    /// Frames to wait between two commands
    pub action_delay_frames: u32,
    /// Frames left before the next command
    pub frames_until_action: u32,
}

impl Default for Autopilot {
    fn default() -> Self {
        Self::new()
    }
}

impl Autopilot {
    /// Creates an enabled autopilot acting every fourth frame.
    pub fn new() -> Self {
        Self {
            enabled: true,
            action_delay_frames: 4,
            frames_until_action: 0,
        }
    }

    /// Toggles the autopilot on/off.
    pub fn toggle(&mut self) -> bool {
        self.enabled = !self.enabled;
        self.frames_until_action = 0;
        self.enabled
    }

    /// Counts down one frame and reports whether a command may be issued.
    pub fn can_perform_action(&mut self) -> bool {
        if self.frames_until_action > 0 {
            self.frames_until_action -= 1;
            return false;
        }
        true
    }

    pub fn mark_action_performed(&mut self) {
        self.frames_until_action = self.action_delay_frames;
    }

    /// Call once per frame; returns the command to apply this frame.
    pub fn next_input(&mut self, game: &ActiveGame) -> Option<GameInput> {
        if !self.enabled || !self.can_perform_action() {
            return None;
        }
        let input = match game {
            ActiveGame::Crawler(crawler) => crawler_input(crawler).map(GameInput::Crawler),
            ActiveGame::Maze(maze) => maze_input(maze).map(GameInput::Maze),
            ActiveGame::Runner(runner) => runner_input(runner).map(GameInput::Runner),
            ActiveGame::Racing(race) => racing_input(race).map(GameInput::Racing),
            ActiveGame::Shooter(shooter) => shooter_input(shooter).map(GameInput::Shooter),
        };
        if input.is_some() {
            self.mark_action_performed();
        }
        input
    }
}

/// The single cardinal direction from one cell to another in line with it.
fn direction_towards(from: Position, to: Position) -> Option<Direction> {
    let delta = to - from;
    Direction::from_delta(Position::new(delta.x.signum(), delta.y.signum()))
}

/// Shortest sequence of slides from the player to the exit.
pub fn solve_maze(maze: &MazeGame) -> Option<Vec<Direction>> {
    let positions = bfs(
        &maze.player,
        |pos| {
            Direction::all()
                .into_iter()
                .filter_map(|direction| maze.slide_path(*pos, direction).last().copied())
                .collect::<Vec<_>>()
        },
        |pos| *pos == maze.exit,
    )?;
    positions
        .windows(2)
        .map(|pair| direction_towards(pair[0], pair[1]))
        .collect()
}

/// Slides along the solution, moves on after a win, and gives up on a dead
/// end.
pub fn maze_input(maze: &MazeGame) -> Option<MazeInput> {
    match maze.phase {
        MazePhase::LevelComplete => Some(MazeInput::NextLevel),
        MazePhase::Playing => match solve_maze(maze) {
            Some(plan) => plan.first().map(|direction| MazeInput::Slide(*direction)),
            None => {
                debug!("Maze level {} has no slide solution", maze.level);
                Some(MazeInput::Blockcide)
            }
        },
        MazePhase::GameOver | MazePhase::Blockcide => None,
    }
}

fn nearest_lane(x: f32) -> usize {
    (0..RUNNER_LANES)
        .min_by(|&a, &b| (LANE_X[a] - x).abs().total_cmp(&(LANE_X[b] - x).abs()))
        .unwrap_or(0)
}

fn approaching(obstacle: &FallingObstacle) -> bool {
    obstacle.y > PLAYER_Y - RUNNER_LOOKAHEAD && obstacle.y < PLAYER_Y + 8.0
}

/// Dodges anything harmful in the lanes ahead and drifts toward bananas.
pub fn runner_input(runner: &RunnerGame) -> Option<RunnerInput> {
    if runner.game_over {
        return None;
    }
    let mut danger = [false; RUNNER_LANES];
    let mut treats = [false; RUNNER_LANES];
    for obstacle in runner.obstacles.iter().filter(|o| approaching(o)) {
        let lane = nearest_lane(obstacle.x);
        match obstacle.kind {
            ObstacleKind::Banana => treats[lane] = true,
            _ => danger[lane] = true,
        }
    }

    let here = runner.lane;
    let score = |lane: usize| -> i32 {
        let mut value = 0;
        if danger[lane] {
            value -= 10;
        }
        if treats[lane] {
            value += 3;
        }
        value - (lane as i32 - here as i32).abs()
    };
    let target = (0..RUNNER_LANES).max_by_key(|&lane| (score(lane), -(lane as i32)))?;

    match target.cmp(&here) {
        std::cmp::Ordering::Less => Some(RunnerInput::LaneLeft),
        std::cmp::Ordering::Greater => Some(RunnerInput::LaneRight),
        std::cmp::Ordering::Equal => None,
    }
}

/// Player one hits whenever the bar is in the zone.
pub fn racing_input(race: &RacingGame) -> Option<RacingInput> {
    if race.outcome.is_none() && race.bar_in_zone() {
        Some(RacingInput::Hit(Racer::One))
    } else {
        None
    }
}

/// Lines up with the closest alien and fires.
pub fn shooter_input(shooter: &ShooterGame) -> Option<ShooterInput> {
    if shooter.is_game_over() {
        return None;
    }
    let ship = shooter.ship;
    let target = shooter
        .aliens
        .iter()
        .filter(|alien| alien.rect.x > ship.right())
        .min_by(|a, b| a.rect.x.total_cmp(&b.rect.x))?;

    let offset = target.rect.y - ship.y;
    if offset.abs() < 1.0 {
        (shooter.shoot_cooldown == 0).then_some(ShooterInput::Shoot)
    } else if offset > 0.0 {
        Some(ShooterInput::Move(Direction::Down))
    } else {
        Some(ShooterInput::Move(Direction::Up))
    }
}

/// True if an arrow from `from` would reach `to` without hitting a wall.
fn clear_shot(map: &DungeonMap, from: Position, to: Position) -> Option<Direction> {
    if from.x != to.x && from.y != to.y {
        return None;
    }
    let direction = direction_towards(from, to)?;
    let mut cell = from.step(direction);
    while cell != to {
        if map.terrain_at(cell) == Some(Terrain::Wall) {
            return None;
        }
        cell = cell.step(direction);
    }
    Some(direction)
}

fn safe_step(map: &DungeonMap, from: Position, direction: Direction) -> bool {
    map.terrain_at(from.step(direction)) == Some(Terrain::Floor)
}

/// Walks to a tile in line with the nearest enemy, then faces it and shoots.
pub fn crawler_input(crawler: &CrawlerGame) -> Option<CrawlerInput> {
    if crawler.is_over() {
        return None;
    }
    let hero = crawler.hero.tile();
    let hero_center = crawler.hero.rect.center();
    let enemy = crawler
        .enemies
        .iter()
        .min_by(|a, b| {
            a.rect
                .center()
                .distance(hero_center)
                .total_cmp(&b.rect.center().distance(hero_center))
        })?;
    let center = enemy.rect.center();
    let target = DungeonMap::tile_at_pixel(center.x, center.y);

    let map = &crawler.map;
    if let Some(direction) = clear_shot(map, hero, target) {
        if crawler.hero.facing == direction {
            return Some(CrawlerInput::Shoot);
        }
        // Turning is a step, and fire or poison ends the run
        if safe_step(map, hero, direction) {
            return Some(CrawlerInput::Move(direction));
        }
    }

    let path = bfs(
        &hero,
        |pos| {
            pos.cardinal_adjacent_positions()
                .into_iter()
                .filter(|n| map.terrain_at(*n) == Some(Terrain::Floor))
                .collect::<Vec<_>>()
        },
        |pos| clear_shot(map, *pos, target).is_some_and(|d| safe_step(map, *pos, d)),
    )?;
    path.get(1)
        .and_then(|next| direction_towards(hero, *next))
        .map(CrawlerInput::Move)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Alien, CrawlerPhase, Enemy, GenerationConfig, LldmClient, MazeLayout, Rect};

    fn open_maze(size: usize) -> MazeGame {
        MazeGame::from_layout(MazeLayout::open(size)).unwrap()
    }

    #[test]
    fn test_autopilot_delay() {
        let mut pilot = Autopilot::new();
        let race = ActiveGame::Racing({
            let mut race = RacingGame::new(1);
            race.bar_position = 100.0;
            race
        });
        assert!(pilot.next_input(&race).is_some());
        for _ in 0..pilot.action_delay_frames {
            assert!(pilot.next_input(&race).is_none());
        }
        assert!(pilot.next_input(&race).is_some());
    }

    #[test]
    fn test_toggle_disables() {
        let mut pilot = Autopilot::new();
        assert!(!pilot.toggle());
        let race = ActiveGame::Racing(RacingGame::new(1));
        assert!(pilot.next_input(&race).is_none());
    }

    #[test]
    fn test_open_maze_solves_in_two_slides() {
        let maze = open_maze(6);
        let plan = solve_maze(&maze).unwrap();
        assert_eq!(plan.len(), 2);
    }

    #[test]
    fn test_maze_solver_plays_to_completion() {
        let mut maze = open_maze(6);
        for _ in 0..10 {
            if let Some(input) = maze_input(&maze) {
                if input == MazeInput::NextLevel {
                    break;
                }
                maze.handle(input).unwrap();
            }
        }
        assert_eq!(maze.phase, MazePhase::LevelComplete);
        assert_eq!(maze.levels_beaten, 1);
    }

    #[test]
    fn test_sealed_maze_gives_up() {
        let mut layout = MazeLayout::open(4);
        layout.walls = vec![Position::new(1, 3), Position::new(0, 2)];
        let maze = MazeGame::from_layout(layout).unwrap();
        assert_eq!(maze_input(&maze), Some(MazeInput::Blockcide));
    }

    #[test]
    fn test_runner_dodges_coconut() {
        let mut runner = RunnerGame::with_patterns(1, LldmClient::offline());
        runner.obstacles.push(FallingObstacle {
            kind: ObstacleKind::Coconut,
            x: LANE_X[runner.lane],
            y: PLAYER_Y - 20.0,
        });
        assert!(runner_input(&runner).is_some());
    }

    #[test]
    fn test_runner_chases_banana() {
        let mut runner = RunnerGame::with_patterns(1, LldmClient::offline());
        let lane = runner.lane + 1;
        runner.obstacles.push(FallingObstacle {
            kind: ObstacleKind::Banana,
            x: LANE_X[lane],
            y: PLAYER_Y - 30.0,
        });
        assert_eq!(runner_input(&runner), Some(RunnerInput::LaneRight));
    }

    #[test]
    fn test_runner_stays_put_when_clear() {
        let runner = RunnerGame::with_patterns(1, LldmClient::offline());
        assert_eq!(runner_input(&runner), None);
    }

    #[test]
    fn test_racing_waits_for_zone() {
        let mut race = RacingGame::new(1);
        race.bar_position = 0.0;
        assert_eq!(racing_input(&race), None);
        race.bar_position = 50.0;
        assert_eq!(racing_input(&race), Some(RacingInput::Hit(Racer::One)));
    }

    #[test]
    fn test_shooter_lines_up_then_fires() {
        let mut shooter = ShooterGame::new(1);
        shooter.aliens.push(Alien {
            rect: Rect::new(500.0, 420.0, 70.0, 70.0),
            speed: 2.0,
        });
        assert_eq!(
            shooter_input(&shooter),
            Some(ShooterInput::Move(Direction::Down))
        );
        shooter.ship.y = 420.0;
        assert_eq!(shooter_input(&shooter), Some(ShooterInput::Shoot));
    }

    #[test]
    fn test_crawler_shoots_enemy_in_line() {
        let map = DungeonMap::filled(20, 15, 1);
        let mut crawler = CrawlerGame::on_map(1, map, Position::new(5, 5));
        let rect = DungeonMap::tile_rect(Position::new(10, 5));
        crawler.enemies.push(Enemy::grunt(rect.x, rect.y, 1));
        crawler.hero.facing = Direction::Right;
        assert_eq!(crawler_input(&crawler), Some(CrawlerInput::Shoot));
        crawler.hero.facing = Direction::Up;
        assert_eq!(
            crawler_input(&crawler),
            Some(CrawlerInput::Move(Direction::Right))
        );
    }

    #[test]
    fn test_crawler_walks_into_line() {
        let map = DungeonMap::filled(20, 15, 1);
        let mut crawler = CrawlerGame::on_map(1, map, Position::new(5, 5));
        let rect = DungeonMap::tile_rect(Position::new(10, 9));
        crawler.enemies.push(Enemy::grunt(rect.x, rect.y, 1));
        // Four steps down beat five to the right
        assert_eq!(
            crawler_input(&crawler),
            Some(CrawlerInput::Move(Direction::Down))
        );
    }

    #[test]
    fn test_crawler_never_turns_onto_poison() {
        let mut map = DungeonMap::filled(20, 15, 3);
        map.set_terrain(Position::new(6, 5), Terrain::Poison);
        let mut crawler = CrawlerGame::on_map(1, map, Position::new(5, 5));
        let rect = DungeonMap::tile_rect(Position::new(12, 5));
        crawler.enemies.push(Enemy::grunt(rect.x, rect.y, 3));
        crawler.hero.facing = Direction::Up;

        // Back off one tile so the turn towards the grunt lands on floor
        let input = crawler_input(&crawler);
        assert_eq!(input, Some(CrawlerInput::Move(Direction::Left)));
        crawler.move_hero(Direction::Left);
        crawler.update(16).unwrap();
        assert_ne!(crawler.phase, CrawlerPhase::GameOver);

        assert_eq!(
            crawler_input(&crawler),
            Some(CrawlerInput::Move(Direction::Right))
        );
        crawler.move_hero(Direction::Right);
        crawler.update(16).unwrap();
        assert_ne!(crawler.phase, CrawlerPhase::GameOver);
        assert_eq!(crawler.hero.tile(), Position::new(5, 5));
        assert_eq!(crawler_input(&crawler), Some(CrawlerInput::Shoot));
    }

    #[test]
    fn test_autopilot_finishes_a_race() {
        let config = GenerationConfig::for_testing(5);
        let mut game = ActiveGame::start(crate::GameKind::Racing, &config, LldmClient::offline())
            .unwrap();
        let mut pilot = Autopilot::new();
        for _ in 0..20_000 {
            if game.is_over() {
                break;
            }
            if let Some(input) = pilot.next_input(&game) {
                game.apply_input(&input).unwrap();
            }
            game.tick().unwrap();
        }
        assert!(game.is_over());
        if let ActiveGame::Racing(race) = &game {
            assert_eq!(race.outcome.map(|o| o.winner), Some(Racer::One));
        }
    }
}
