//! # Maze Escape
//!
//! Slide from the bottom-left corner to the top-right exit. Moves do not stop
//! until the next cell is a wall, a placed block or the edge of the grid, so
//! the player buys blocks with coins to create stopping points and pays to
//! knock walls down. Costs rise with every purchase and never reset between
//! levels.

use super::{wrong_input, GameKind, Minigame};
use crate::generation::utils::create_rng;
use crate::input::{GameInput, MazeInput};
use crate::{
    ArcadeError, ArcadeResult, Direction, GenerationConfig, LldmClient, MazeGenerator,
    MazeLayout, Position,
};
use log::info;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Coins held at the start of a run.
pub const STARTING_COINS: u32 = 1;

/// Phase of a maze run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MazePhase {
    Playing,
    LevelComplete,
    GameOver,
    /// The player gave up
    Blockcide,
}

/// State of one maze escape run.
#[derive(Debug)]
pub struct MazeGame {
    pub config: GenerationConfig,
    pub level: u32,
    pub levels_beaten: u32,
    pub phase: MazePhase,
    pub coins: u32,
    pub blocks_placed: u32,
    pub blocks_destroyed: u32,
    pub player: Position,
    pub cursor: Position,
    pub size: usize,
    pub exit: Position,
    pub walls: HashSet<Position>,
    pub coin_cells: HashSet<Position>,
    pub placed_blocks: HashSet<Position>,
    /// Cells the player has passed through this level
    pub visited: HashSet<Position>,
    generator: MazeGenerator,
    client: LldmClient,
}

impl MazeGame {
    /// Starts a run at level 1, asking `client` for each level's layout.
    pub fn new(config: GenerationConfig, client: LldmClient) -> ArcadeResult<Self> {
        let size = config.maze_size;
        let mut game = Self {
            config,
            level: 1,
            levels_beaten: 0,
            phase: MazePhase::Playing,
            coins: STARTING_COINS,
            blocks_placed: 0,
            blocks_destroyed: 0,
            player: MazeLayout::start_for(size),
            cursor: MazeLayout::start_for(size),
            size,
            exit: MazeLayout::exit_for(size),
            walls: HashSet::new(),
            coin_cells: HashSet::new(),
            placed_blocks: HashSet::new(),
            visited: HashSet::new(),
            generator: MazeGenerator::new(),
            client,
        };
        game.load_current_level()?;
        Ok(game)
    }

    /// Starts a run on a fixed layout, without any content source.
    pub fn from_layout(layout: MazeLayout) -> ArcadeResult<Self> {
        let mut config = GenerationConfig::for_testing(0);
        config.maze_size = layout.size;
        let mut game = Self::new(config, LldmClient::offline())?;
        game.load_layout(layout);
        Ok(game)
    }

    fn load_current_level(&mut self) -> ArcadeResult<()> {
        let level_config = self.config.for_level(self.level);
        let mut rng = create_rng(&level_config);
        let layout = self
            .generator
            .generate_with_source(&mut self.client, &level_config, &mut rng)?;
        self.load_layout(layout);
        Ok(())
    }

    /// Replaces the board with a layout. Coins and block counters carry over.
    pub fn load_layout(&mut self, layout: MazeLayout) {
        self.size = layout.size;
        self.walls = layout.walls.iter().copied().collect();
        self.coin_cells = layout.coins.iter().copied().collect();
        self.player = layout.start;
        self.cursor = layout.start;
        self.exit = layout.exit;
        self.placed_blocks.clear();
        self.visited.clear();
        self.visited.insert(layout.start);
        self.phase = MazePhase::Playing;
    }

    /// The board as a layout, including placed blocks as walls.
    pub fn current_layout(&self) -> MazeLayout {
        let mut walls: Vec<Position> = self
            .walls
            .iter()
            .chain(self.placed_blocks.iter())
            .copied()
            .collect();
        walls.sort();
        let mut coins: Vec<Position> = self.coin_cells.iter().copied().collect();
        coins.sort();
        MazeLayout {
            walls,
            coins,
            start: MazeLayout::start_for(self.size),
            exit: self.exit,
            size: self.size,
        }
    }

    pub fn in_bounds(&self, pos: Position) -> bool {
        let size = self.size as i32;
        pos.x >= 0 && pos.y >= 0 && pos.x < size && pos.y < size
    }

    /// True if the cell stops a slide.
    pub fn is_blocked(&self, pos: Position) -> bool {
        !self.in_bounds(pos) || self.walls.contains(&pos) || self.placed_blocks.contains(&pos)
    }

    pub fn next_block_cost(&self) -> u32 {
        self.blocks_placed + 1
    }

    pub fn next_destroy_cost(&self) -> u32 {
        self.blocks_destroyed + 1
    }

    /// Moves the cursor one cell, staying inside the grid.
    pub fn move_cursor(&mut self, direction: Direction) {
        let target = self.cursor.step(direction);
        if self.in_bounds(target) {
            self.cursor = target;
        }
    }

    /// Buys a block at the cursor. Returns false if the cell is taken or the
    /// player cannot afford it.
    pub fn try_place_block(&mut self) -> bool {
        let cost = self.next_block_cost();
        let pos = self.cursor;
        let free = !self.walls.contains(&pos)
            && !self.coin_cells.contains(&pos)
            && pos != self.player
            && !self.placed_blocks.contains(&pos);

        if free && self.coins >= cost {
            self.placed_blocks.insert(pos);
            self.coins -= cost;
            self.blocks_placed += 1;
            true
        } else {
            false
        }
    }

    /// Pays to clear the wall or placed block under the cursor.
    pub fn try_destroy_block(&mut self) -> bool {
        let cost = self.next_destroy_cost();
        let pos = self.cursor;
        let occupied = self.placed_blocks.contains(&pos) || self.walls.contains(&pos);

        if occupied && self.coins >= cost {
            self.placed_blocks.remove(&pos);
            self.walls.remove(&pos);
            self.coins -= cost;
            self.blocks_destroyed += 1;
            true
        } else {
            false
        }
    }

    /// Cells a slide in `direction` would pass through, in order.
    pub fn slide_path(&self, from: Position, direction: Direction) -> Vec<Position> {
        let mut path = Vec::new();
        let mut current = from;
        loop {
            let next = current.step(direction);
            if self.is_blocked(next) {
                break;
            }
            path.push(next);
            current = next;
        }
        path
    }

    /// Slides the player, collecting coins along the way.
    ///
    /// Returns the number of cells moved.
    pub fn slide(&mut self, direction: Direction) -> usize {
        let path = self.slide_path(self.player, direction);
        for cell in &path {
            self.visited.insert(*cell);
            if self.coin_cells.remove(cell) {
                self.coins += 1;
            }
        }

        if let Some(last) = path.last() {
            self.player = *last;
            if self.player == self.exit {
                self.levels_beaten += 1;
                self.phase = MazePhase::LevelComplete;
                info!("Maze level {} cleared", self.level);
            }
        }
        path.len()
    }

    pub fn commit_blockcide(&mut self) {
        self.phase = MazePhase::Blockcide;
    }

    /// Loads the next level after the exit has been reached.
    pub fn advance_level(&mut self) -> ArcadeResult<()> {
        if self.phase != MazePhase::LevelComplete {
            return Err(ArcadeError::InvalidState(
                "Level is not complete".to_string(),
            ));
        }
        self.level += 1;
        self.load_current_level()
    }

    /// Ends the run if the player somehow stands inside a wall or block.
    pub fn check_game_over(&mut self) {
        if self.walls.contains(&self.player) || self.placed_blocks.contains(&self.player) {
            self.phase = MazePhase::GameOver;
        }
    }

    /// Applies a maze command. Commands that make no sense in the current
    /// phase are ignored.
    pub fn handle(&mut self, input: MazeInput) -> ArcadeResult<()> {
        match (self.phase, input) {
            (MazePhase::Playing, MazeInput::Slide(direction)) => {
                self.slide(direction);
            }
            (MazePhase::Playing, MazeInput::MoveCursor(direction)) => self.move_cursor(direction),
            (MazePhase::Playing, MazeInput::PlaceBlock) => {
                self.try_place_block();
            }
            (MazePhase::Playing, MazeInput::DestroyBlock) => {
                self.try_destroy_block();
            }
            (MazePhase::Playing, MazeInput::Blockcide) => self.commit_blockcide(),
            (MazePhase::LevelComplete, MazeInput::NextLevel) => self.advance_level()?,
            _ => {}
        }
        Ok(())
    }
}

impl Minigame for MazeGame {
    fn kind(&self) -> GameKind {
        GameKind::Maze
    }

    fn apply_input(&mut self, input: &GameInput) -> ArcadeResult<()> {
        match input {
            GameInput::Maze(command) => self.handle(*command),
            other => Err(wrong_input(self.kind(), other)),
        }
    }

    fn tick(&mut self) -> ArcadeResult<()> {
        if self.phase == MazePhase::Playing {
            self.check_game_over();
        }
        Ok(())
    }

    fn score(&self) -> u64 {
        u64::from(self.levels_beaten)
    }

    fn is_over(&self) -> bool {
        matches!(self.phase, MazePhase::GameOver | MazePhase::Blockcide)
    }

    fn restart(&mut self) -> ArcadeResult<()> {
        self.level = 1;
        self.levels_beaten = 0;
        self.coins = STARTING_COINS;
        self.blocks_placed = 0;
        self.blocks_destroyed = 0;
        self.load_current_level()
    }

    fn status_line(&self) -> String {
        format!(
            "Level {} | Beaten {} | Coins {} | Block {} | Destroy {} | {:?}",
            self.level,
            self.levels_beaten,
            self.coins,
            self.next_block_cost(),
            self.next_destroy_cost(),
            self.phase
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout(walls: &[(i32, i32)], coins: &[(i32, i32)]) -> MazeLayout {
        let mut layout = MazeLayout::open(5);
        layout.walls = walls.iter().map(|&(x, y)| Position::new(x, y)).collect();
        layout.coins = coins.iter().map(|&(x, y)| Position::new(x, y)).collect();
        layout
    }

    #[test]
    fn test_new_game_starts_with_one_coin() {
        let game = MazeGame::new(GenerationConfig::for_testing(3), LldmClient::offline()).unwrap();
        assert_eq!(game.coins, 1);
        assert_eq!(game.level, 1);
        assert_eq!(game.player, Position::new(0, 9));
        assert_eq!(game.phase, MazePhase::Playing);
    }

    #[test]
    fn test_slide_stops_at_wall_and_collects_coins() {
        let mut game = MazeGame::from_layout(layout(&[(3, 4)], &[(1, 4), (2, 4)])).unwrap();
        let moved = game.slide(Direction::Right);
        assert_eq!(moved, 2);
        assert_eq!(game.player, Position::new(2, 4));
        assert_eq!(game.coins, 3);
        assert!(game.coin_cells.is_empty());
    }

    #[test]
    fn test_slide_to_exit_completes_level() {
        let mut game = MazeGame::from_layout(layout(&[], &[])).unwrap();
        game.slide(Direction::Right);
        assert_eq!(game.player, Position::new(4, 4));
        game.slide(Direction::Up);
        assert_eq!(game.phase, MazePhase::LevelComplete);
        assert_eq!(game.levels_beaten, 1);

        game.handle(MazeInput::NextLevel).unwrap();
        assert_eq!(game.level, 2);
        assert_eq!(game.phase, MazePhase::Playing);
        assert_eq!(game.player, Position::new(0, 4));
    }

    #[test]
    fn test_block_costs_rise_and_persist() {
        let mut game = MazeGame::from_layout(layout(&[], &[])).unwrap();
        game.coins = 10;
        game.move_cursor(Direction::Right);
        assert!(game.try_place_block());
        assert_eq!(game.coins, 9);
        assert_eq!(game.next_block_cost(), 2);

        game.move_cursor(Direction::Right);
        assert!(game.try_place_block());
        assert_eq!(game.coins, 7);

        game.load_layout(layout(&[], &[]));
        assert_eq!(game.next_block_cost(), 3);
        assert!(game.placed_blocks.is_empty());
    }

    #[test]
    fn test_cannot_place_on_player_coin_or_when_broke() {
        let mut game = MazeGame::from_layout(layout(&[], &[(1, 4)])).unwrap();
        assert!(!game.try_place_block(), "cursor starts on the player");

        game.move_cursor(Direction::Right);
        assert!(!game.try_place_block(), "coin under cursor");

        game.move_cursor(Direction::Up);
        game.coins = 0;
        assert!(!game.try_place_block());
    }

    #[test]
    fn test_destroy_wall_frees_cell() {
        let mut game = MazeGame::from_layout(layout(&[(1, 4)], &[])).unwrap();
        game.move_cursor(Direction::Right);
        assert!(game.try_destroy_block());
        assert_eq!(game.coins, 0);
        assert!(!game.walls.contains(&Position::new(1, 4)));
        assert_eq!(game.next_destroy_cost(), 2);

        assert!(!game.try_destroy_block(), "nothing left to destroy");
    }

    #[test]
    fn test_cursor_stays_in_bounds() {
        let mut game = MazeGame::from_layout(layout(&[], &[])).unwrap();
        game.move_cursor(Direction::Left);
        game.move_cursor(Direction::Down);
        assert_eq!(game.cursor, Position::new(0, 4));
    }

    #[test]
    fn test_blockcide_ends_run() {
        let mut game = MazeGame::from_layout(layout(&[], &[])).unwrap();
        game.apply_input(&GameInput::Maze(MazeInput::Blockcide)).unwrap();
        assert!(game.is_over());
        assert_eq!(game.phase, MazePhase::Blockcide);
    }

    #[test]
    fn test_rejects_other_games_input() {
        let mut game = MazeGame::from_layout(layout(&[], &[])).unwrap();
        let input = GameInput::Runner(crate::input::RunnerInput::LaneLeft);
        assert!(game.apply_input(&input).is_err());
    }
}
