//! # User Interface Screens
//!
//! Full-screen text for the title card, the hub menu and the ending screen.

use crate::game::{ArcadeHub, GameKind, HighScoreTable};

/// Text screens shown outside of gameplay.
#[derive(Debug, Clone, Default)]
pub struct UI;

impl UI {
    /// Creates a new UI instance.
    pub fn new() -> Self {
        Self
    }

    pub fn title_screen(&self) -> String {
        ["ARCADE HUB", "", "Press Space to continue"].join("\n")
    }

    /// The game grid followed by the best score of every game.
    pub fn menu_screen(&self, hub: &ArcadeHub, scores: &HighScoreTable) -> String {
        let mut lines = vec!["Select a game".to_string(), String::new()];
        lines.extend(hub.menu_lines());
        lines.push(String::new());
        for kind in GameKind::all() {
            let best = scores
                .best_score(kind)
                .map_or_else(|| "-".to_string(), |score| score.to_string());
            lines.push(format!("{:<16} {}", kind.title(), best));
        }
        lines.join("\n")
    }

    pub fn ending_screen(&self, kind: GameKind, score: u64, new_best: bool) -> String {
        let mut lines = vec![
            format!("{} - GAME OVER", kind.title()),
            format!("Score: {}", score),
        ];
        if new_best {
            lines.push("New high score!".to_string());
        }
        lines.push("R: play again  Esc: menu".to_string());
        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_menu_lists_best_scores() {
        let mut hub = ArcadeHub::new();
        hub.skip_title();
        let mut scores = HighScoreTable::new();
        scores.record(GameKind::Shooter, 12);
        let text = UI::new().menu_screen(&hub, &scores);
        assert!(text.contains("[Dungeon Crawler]"));
        assert!(text.lines().any(|line| line.starts_with("Space Shooter") && line.ends_with("12")));
        assert!(text.lines().any(|line| line.starts_with("Maze Escape") && line.ends_with('-')));
    }

    #[test]
    fn test_ending_screen_flags_new_best() {
        let ui = UI::new();
        assert!(ui.ending_screen(GameKind::Maze, 3, true).contains("New high score!"));
        assert!(!ui.ending_screen(GameKind::Maze, 3, false).contains("New high score!"));
    }
}
