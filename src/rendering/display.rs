//! # Display Management
//!
//! Text rendering of game boards and HUD lines for the command line.
//!
//! Every board is drawn one character per cell, row by row, with rows joined
//! by newlines. Nothing here prints; callers decide where the text goes.

use crate::game::{
    ActiveGame, CrawlerGame, EnemyKind, MazeGame, Minigame, Position,
};
use crate::generation::{DungeonMap, MazeLayout, Terrain};
use std::collections::HashSet;

/// Default number of messages kept in the log.
const DEFAULT_MAX_MESSAGES: usize = 100;

/// Character-grid renderer for mazes, dungeons and HUD lines.
#[derive(Debug, Clone)]
pub struct AsciiDisplay {
    /// Mark the solution path when rendering maze layouts
    pub show_path: bool,
    /// Message history
    pub messages: Vec<String>,
    /// Maximum number of messages to keep
    pub max_messages: usize,
}

impl Default for AsciiDisplay {
    fn default() -> Self {
        Self::new()
    }
}

impl AsciiDisplay {
    /// Creates a display that marks maze solutions.
    ///
    /// # Examples
    ///
    /// ```
    /// use arcade_hub::{AsciiDisplay, MazeLayout};
    ///
    /// let display = AsciiDisplay::new();
    /// let text = display.render_maze_layout(&MazeLayout::open(3), None);
    /// assert_eq!(text, "..E\n...\nS..");
    /// ```
    pub fn new() -> Self {
        Self {
            show_path: true,
            messages: Vec::new(),
            max_messages: DEFAULT_MAX_MESSAGES,
        }
    }

    /// Symbol for one dungeon terrain type.
    pub fn terrain_symbol(terrain: Terrain) -> char {
        match terrain {
            Terrain::Floor => '.',
            Terrain::Wall => '#',
            Terrain::Fire => '^',
            Terrain::Poison => '~',
        }
    }

    /// Renders a maze layout, optionally marking `path` with `*`.
    pub fn render_maze_layout(&self, layout: &MazeLayout, path: Option<&[Position]>) -> String {
        let walls = layout.wall_set();
        let coins: HashSet<Position> = layout.coins.iter().copied().collect();
        let path: HashSet<Position> = match path {
            Some(cells) if self.show_path => cells.iter().copied().collect(),
            _ => HashSet::new(),
        };

        grid(layout.size as i32, layout.size as i32, |pos| {
            if pos == layout.start {
                'S'
            } else if pos == layout.exit {
                'E'
            } else if walls.contains(&pos) {
                '#'
            } else if coins.contains(&pos) {
                'o'
            } else if path.contains(&pos) {
                '*'
            } else {
                '.'
            }
        })
    }

    /// Renders a maze in play: player, exit, placed blocks and the cursor.
    pub fn render_maze_game(&self, maze: &MazeGame) -> String {
        let size = maze.size as i32;
        grid(size, size, |pos| {
            if pos == maze.player {
                '@'
            } else if pos == maze.cursor {
                '+'
            } else if pos == maze.exit {
                'E'
            } else if maze.placed_blocks.contains(&pos) {
                'B'
            } else if maze.walls.contains(&pos) {
                '#'
            } else if maze.coin_cells.contains(&pos) {
                'o'
            } else {
                '.'
            }
        })
    }

    /// Renders the terrain of a dungeon map.
    pub fn render_dungeon(&self, map: &DungeonMap) -> String {
        grid(map.width, map.height, |pos| {
            map.terrain_at(pos).map_or(' ', Self::terrain_symbol)
        })
    }

    /// Renders a crawler level with the hero and enemies on top of the map.
    pub fn render_crawler(&self, crawler: &CrawlerGame) -> String {
        let hero = crawler.hero.tile();
        let enemies: Vec<(Position, EnemyKind)> = crawler
            .enemies
            .iter()
            .map(|enemy| {
                let center = enemy.rect.center();
                (DungeonMap::tile_at_pixel(center.x, center.y), enemy.kind)
            })
            .collect();
        let map = &crawler.map;

        grid(map.width, map.height, |pos| {
            if pos == hero {
                return '@';
            }
            match enemies.iter().find(|(tile, _)| *tile == pos) {
                Some((_, EnemyKind::Boss)) => 'B',
                Some((_, EnemyKind::Grunt)) => 'g',
                None => map.terrain_at(pos).map_or(' ', Self::terrain_symbol),
            }
        })
    }

    /// One-line HUD: title, score and the game's own status.
    pub fn hud(&self, game: &ActiveGame) -> String {
        format!(
            "{} | Score: {} | {}",
            game.kind().title(),
            game.score(),
            game.status_line()
        )
    }

    /// Renders the HUD, with the board underneath for the grid games.
    pub fn render_game(&self, game: &ActiveGame) -> String {
        let hud = self.hud(game);
        match game {
            ActiveGame::Maze(maze) => format!("{}\n{}", hud, self.render_maze_game(maze)),
            ActiveGame::Crawler(crawler) => format!("{}\n{}", hud, self.render_crawler(crawler)),
            _ => hud,
        }
    }

    /// Adds a message to the message history.
    pub fn add_message(&mut self, message: String) {
        self.messages.push(message);

        // Keep only the most recent messages
        if self.messages.len() > self.max_messages {
            self.messages.remove(0);
        }
    }

    /// The last `count` messages, oldest first.
    pub fn recent_messages(&self, count: usize) -> &[String] {
        let start = self.messages.len().saturating_sub(count);
        &self.messages[start..]
    }
}

fn grid(width: i32, height: i32, mut cell: impl FnMut(Position) -> char) -> String {
    (0..height)
        .map(|y| (0..width).map(|x| cell(Position::new(x, y))).collect::<String>())
        .collect::<Vec<_>>()
        .join("\n")
}
