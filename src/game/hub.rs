//! # Arcade Hub
//!
//! The cabinet front end: a title card, then a three-by-two grid of game
//! slots picked with the arrow keys.

use super::{Direction, GameKind};
use crate::config::TITLE_DURATION_MS;
use serde::{Deserialize, Serialize};

pub const HUB_COLUMNS: usize = 3;
pub const HUB_SLOTS: usize = 6;

/// Title card and game selection grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArcadeHub {
    /// Time spent on the title card so far
    pub title_elapsed_ms: u64,
    /// Highlighted slot, row-major
    pub selection: usize,
}

impl Default for ArcadeHub {
    fn default() -> Self {
        Self::new()
    }
}

impl ArcadeHub {
    /// # Examples
    ///
    /// ```
    /// use arcade_hub::{ArcadeHub, Direction, GameKind};
    ///
    /// let mut hub = ArcadeHub::new();
    /// hub.skip_title();
    /// hub.navigate(Direction::Down);
    /// assert_eq!(hub.select(), Some(GameKind::Racing));
    /// ```
    pub fn new() -> Self {
        Self {
            title_elapsed_ms: 0,
            selection: 0,
        }
    }

    pub fn showing_title(&self) -> bool {
        self.title_elapsed_ms < TITLE_DURATION_MS
    }

    /// Advances the title card timer.
    pub fn update(&mut self, dt_ms: u64) {
        self.title_elapsed_ms = self.title_elapsed_ms.saturating_add(dt_ms);
    }

    pub fn skip_title(&mut self) {
        self.title_elapsed_ms = TITLE_DURATION_MS;
    }

    /// Moves the highlight. Edges do not wrap.
    pub fn navigate(&mut self, direction: Direction) {
        if self.showing_title() {
            return;
        }
        let column = self.selection % HUB_COLUMNS;
        match direction {
            Direction::Left if column > 0 => self.selection -= 1,
            Direction::Right if column < HUB_COLUMNS - 1 => self.selection += 1,
            Direction::Up if self.selection >= HUB_COLUMNS => self.selection -= HUB_COLUMNS,
            Direction::Down if self.selection + HUB_COLUMNS < HUB_SLOTS => {
                self.selection += HUB_COLUMNS
            }
            _ => {}
        }
    }

    /// The game in the highlighted slot, if there is one.
    pub fn select(&self) -> Option<GameKind> {
        if self.showing_title() {
            return None;
        }
        GameKind::from_slot(self.selection)
    }

    /// Grid labels, one row per line, with the highlight in brackets.
    pub fn menu_lines(&self) -> Vec<String> {
        (0..HUB_SLOTS)
            .collect::<Vec<_>>()
            .chunks(HUB_COLUMNS)
            .map(|row| {
                row.iter()
                    .map(|&slot| {
                        let label = GameKind::from_slot(slot).map_or("Coming Soon", GameKind::title);
                        if slot == self.selection {
                            format!("[{}]", label)
                        } else {
                            format!(" {} ", label)
                        }
                    })
                    .collect::<Vec<_>>()
                    .join("  ")
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn menu() -> ArcadeHub {
        let mut hub = ArcadeHub::new();
        hub.skip_title();
        hub
    }

    #[test]
    fn test_title_lasts_five_seconds() {
        let mut hub = ArcadeHub::new();
        hub.update(4_999);
        assert!(hub.showing_title());
        assert_eq!(hub.select(), None);
        hub.update(1);
        assert!(!hub.showing_title());
        assert_eq!(hub.select(), Some(GameKind::Crawler));
    }

    #[test]
    fn test_navigation_does_not_wrap() {
        let mut hub = menu();
        hub.navigate(Direction::Left);
        hub.navigate(Direction::Up);
        assert_eq!(hub.selection, 0);
        hub.navigate(Direction::Right);
        hub.navigate(Direction::Right);
        hub.navigate(Direction::Right);
        assert_eq!(hub.selection, 2);
        hub.navigate(Direction::Down);
        assert_eq!(hub.selection, 5);
        hub.navigate(Direction::Down);
        assert_eq!(hub.selection, 5);
    }

    #[test]
    fn test_empty_slot_selects_nothing() {
        let mut hub = menu();
        hub.selection = 5;
        assert_eq!(hub.select(), None);
        hub.navigate(Direction::Left);
        assert_eq!(hub.select(), Some(GameKind::Shooter));
    }

    #[test]
    fn test_navigation_ignored_on_title() {
        let mut hub = ArcadeHub::new();
        hub.navigate(Direction::Right);
        assert_eq!(hub.selection, 0);
    }

    #[test]
    fn test_menu_lines_mark_selection() {
        let hub = menu();
        let lines = hub.menu_lines();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("[Dungeon Crawler]"));
        assert!(lines[1].contains("Coming Soon"));
    }
}
