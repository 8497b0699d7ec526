//! # Puzzle Generation
//!
//! Riddles that gate each level of the puzzle dungeon. Requests are themed by
//! difficulty and a puzzle type picked at random. Three built-in puzzles cover
//! the offline case.

use crate::lldm::extract::{extract_flat_json_object, strip_control_chars};
use crate::{ArcadeError, ArcadeResult, GenerationConfig, Generator, LldmClient};
use log::{info, warn};
use rand::seq::SliceRandom;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

/// Puzzle difficulty band, derived from the level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    /// Levels 1-2 are easy, 3-4 medium, anything later hard.
    pub fn for_level(level: u32) -> Self {
        match level {
            0..=2 => Difficulty::Easy,
            3..=4 => Difficulty::Medium,
            _ => Difficulty::Hard,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }

    /// Puzzle themes offered at this difficulty.
    pub fn puzzle_types(self) -> [&'static str; 5] {
        match self {
            Difficulty::Easy => [
                "Complete the number sequence",
                "Find the missing letter",
                "Simple math problem",
                "Pattern recognition",
                "Count the shapes",
            ],
            Difficulty::Medium => [
                "Word riddle",
                "Logic puzzle",
                "Mathematical pattern",
                "Symbol substitution",
                "Visual sequence",
            ],
            Difficulty::Hard => [
                "Multi-step riddle",
                "Complex pattern",
                "Code breaking",
                "Mathematical series",
                "Visual transformation",
            ],
        }
    }
}

/// A riddle with its answer and escalating hints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Puzzle {
    pub description: String,
    pub visualization: String,
    pub solution: String,
    pub hints: Vec<String>,
}

impl Puzzle {
    fn new(description: &str, visualization: &str, solution: &str, hints: [&str; 3]) -> Self {
        Self {
            description: description.to_string(),
            visualization: visualization.to_string(),
            solution: solution.to_string(),
            hints: hints.iter().map(|h| h.to_string()).collect(),
        }
    }

    /// Checks a player's answer against the solution.
    pub fn check_answer(&self, answer: &str) -> bool {
        verify_solution(&self.solution, answer)
    }

    /// Hint number `index`, clamped to the last hint.
    pub fn hint(&self, index: usize) -> Option<&str> {
        self.hints
            .get(index.min(self.hints.len().saturating_sub(1)))
            .map(String::as_str)
    }
}

/// Compares an answer to a solution, ignoring case and surrounding whitespace.
///
/// # Examples
///
/// ```
/// use arcade_hub::verify_solution;
///
/// assert!(verify_solution("DUNGEON", "  dungeon "));
/// assert!(!verify_solution("8", "eight"));
/// ```
pub fn verify_solution(solution: &str, answer: &str) -> bool {
    solution.trim().to_lowercase() == answer.trim().to_lowercase()
}

/// The offline puzzle set.
pub fn builtin_puzzles() -> [Puzzle; 3] {
    [
        Puzzle::new(
            "What number comes next? 2, 4, 6, __",
            "2 -> 4 -> 6 -> ??",
            "8",
            [
                "Look at the pattern",
                "Each number increases by 2",
                "Add 2 to 6",
            ],
        ),
        Puzzle::new(
            "Unscramble the word: NGUDENO",
            "D _ _ G _ _ _",
            "DUNGEON",
            [
                "It's where you are",
                "Think about the game setting",
                "DUNGEON scrambled",
            ],
        ),
        Puzzle::new(
            "Solve: If a sword is 5 and a bow is 3, what is a staff?",
            "SWORD = 5\nBOW = 3\nSTAFF = ?",
            "5",
            ["Count something", "Look at the letters", "Count consonants"],
        ),
    ]
}

/// Generates level puzzles, from a content source when possible.
#[derive(Debug, Clone, Default)]
pub struct PuzzleGenerator;

impl PuzzleGenerator {
    pub fn new() -> Self {
        Self
    }

    pub fn prompt(&self, difficulty: Difficulty, puzzle_type: &str) -> String {
        format!(
            "You are a puzzle generator for a dungeon escape game. Generate a {} {} puzzle.\n\
             Your entire response must be a single, valid JSON object with the keys \
             \"description\", \"visualization\" (basic ASCII only), \"solution\" (a single word \
             or number) and \"hints\" (an array of 3 strings, getting more helpful).\n\
             The puzzle must be solvable in 2-3 minutes and have an unambiguous solution.",
            difficulty.name(),
            puzzle_type.to_lowercase()
        )
    }

    /// Extracts, cleans, parses and validates one content source response.
    pub fn parse_response(&self, text: &str, config: &GenerationConfig) -> ArcadeResult<Puzzle> {
        let json = extract_flat_json_object(text)
            .ok_or_else(|| ArcadeError::LldmError("No JSON object in response".to_string()))?;
        let cleaned = strip_control_chars(json);
        let mut puzzle: Puzzle = serde_json::from_str(&cleaned)?;
        puzzle.solution = puzzle.solution.trim().to_string();
        self.validate(&puzzle, config)?;
        Ok(puzzle)
    }

    /// Asks the content source for a puzzle, falling back to the built-in set.
    pub fn generate_with_source(
        &self,
        client: &mut LldmClient,
        config: &GenerationConfig,
        rng: &mut StdRng,
    ) -> ArcadeResult<Puzzle> {
        if config.use_lldm {
            let difficulty = Difficulty::for_level(config.level);
            let puzzle_type = difficulty
                .puzzle_types()
                .choose(rng)
                .copied()
                .unwrap_or("Riddle");
            let prompt = self.prompt(difficulty, puzzle_type);
            if let Some(puzzle) =
                client.request_validated(&prompt, |text| self.parse_response(text, config))
            {
                info!("Using generated {} puzzle", difficulty.name());
                return Ok(puzzle);
            }
            warn!("Puzzle generation failed, using built-in puzzle");
        }
        self.generate(config, rng)
    }
}

impl Generator<Puzzle> for PuzzleGenerator {
    /// Picks a built-in puzzle by level.
    fn generate(&self, config: &GenerationConfig, _rng: &mut StdRng) -> ArcadeResult<Puzzle> {
        let puzzles = builtin_puzzles();
        let index = config.level as usize % puzzles.len();
        Ok(puzzles[index].clone())
    }

    fn validate(&self, puzzle: &Puzzle, _config: &GenerationConfig) -> ArcadeResult<()> {
        if puzzle.description.trim().is_empty() {
            return Err(ArcadeError::GenerationFailed(
                "Puzzle has no description".to_string(),
            ));
        }
        if puzzle.solution.is_empty() {
            return Err(ArcadeError::GenerationFailed(
                "Puzzle has no solution".to_string(),
            ));
        }
        Ok(())
    }

    fn generator_type(&self) -> &'static str {
        "PuzzleGenerator"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::utils::create_rng;

    #[test]
    fn test_difficulty_bands() {
        assert_eq!(Difficulty::for_level(1), Difficulty::Easy);
        assert_eq!(Difficulty::for_level(2), Difficulty::Easy);
        assert_eq!(Difficulty::for_level(4), Difficulty::Medium);
        assert_eq!(Difficulty::for_level(5), Difficulty::Hard);
    }

    #[test]
    fn test_builtin_puzzle_by_level() {
        let generator = PuzzleGenerator::new();
        for (level, solution) in [(1, "DUNGEON"), (2, "5"), (3, "8")] {
            let config = GenerationConfig::for_testing(1).for_level(level);
            let puzzle = generator.generate(&config, &mut create_rng(&config)).unwrap();
            assert_eq!(puzzle.solution, solution);
            assert_eq!(puzzle.hints.len(), 3);
        }
    }

    #[test]
    fn test_parse_response_trims_solution() {
        let generator = PuzzleGenerator::new();
        let config = GenerationConfig::new(1);
        let text = "Here:\n{\"description\": \"Count the legs\", \"visualization\": \"/\\\\\", \"solution\": \" 4 \", \"hints\": [\"a\", \"b\", \"c\"]}";
        let puzzle = generator.parse_response(text, &config).unwrap();
        assert_eq!(puzzle.solution, "4");
        assert!(puzzle.check_answer("4"));
    }

    #[test]
    fn test_parse_response_requires_hint_list() {
        let generator = PuzzleGenerator::new();
        let config = GenerationConfig::new(1);
        let text = r#"{"description": "d", "visualization": "v", "solution": "s", "hints": "none"}"#;
        assert!(generator.parse_response(text, &config).is_err());
    }

    #[test]
    fn test_source_failure_uses_builtin() {
        let generator = PuzzleGenerator::new();
        let config = GenerationConfig::new(8).for_level(4);
        let mut client = LldmClient::scripted(["nope", "still nope", "{}"]);
        let puzzle = generator
            .generate_with_source(&mut client, &config, &mut create_rng(&config))
            .unwrap();
        assert_eq!(puzzle.solution, "DUNGEON");
    }

    #[test]
    fn test_hint_clamps() {
        let puzzle = builtin_puzzles()[0].clone();
        assert_eq!(puzzle.hint(0), Some("Look at the pattern"));
        assert_eq!(puzzle.hint(10), Some("Add 2 to 6"));
    }
}
