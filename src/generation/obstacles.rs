//! # Obstacle Patterns
//!
//! Upcoming obstacle waves for the lane runner. A wave is a short list of
//! obstacles, each with the lane it drops into and how many frames to wait
//! before the one after it.

use crate::lldm::extract::extract_json_array;
use crate::{ArcadeError, ArcadeResult, GenerationConfig, Generator, LldmClient};
use log::debug;
use rand::{rngs::StdRng, Rng};
use serde::{Deserialize, Serialize};

/// Number of lanes in the runner.
pub const RUNNER_LANES: usize = 4;

/// Largest wave accepted from a content source.
pub const MAX_WAVE_LEN: usize = 10;

/// Things that fall down the runner's lanes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObstacleKind {
    Banana,
    Coconut,
    Peel,
    Tree,
}

/// One queued obstacle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObstacleSpec {
    #[serde(rename = "type")]
    pub kind: ObstacleKind,
    pub lane: usize,
    /// Frames to wait before the next obstacle spawns
    pub spacing: u32,
}

/// Produces obstacle waves, harder as the score and speed climb.
#[derive(Debug, Clone, Default)]
pub struct ObstacleGenerator;

impl ObstacleGenerator {
    pub fn new() -> Self {
        Self
    }

    pub fn prompt(&self, score: u64, speed: f32) -> String {
        format!(
            "Generate obstacles for a monkey runner game. Return only a JSON array of objects.\n\
             Current score: {score}\n\
             Current speed: {speed:.2}\n\
             Each object has \"type\" (one of banana, coconut, peel, tree), \
             \"lane\" (0-3) and \"spacing\" (frames before the next obstacle).\n\
             Make it harder as score and speed increase, include more bananas when the \
             score is low and return 5-10 obstacles.\n\
             Example: [{{\"type\": \"banana\", \"lane\": 2, \"spacing\": 30}}]"
        )
    }

    /// Extracts, parses and validates one content source response.
    pub fn parse_response(&self, text: &str, config: &GenerationConfig) -> ArcadeResult<Vec<ObstacleSpec>> {
        let json = extract_json_array(text)
            .ok_or_else(|| ArcadeError::LldmError("No JSON array in response".to_string()))?;
        let wave: Vec<ObstacleSpec> = serde_json::from_str(json)?;
        self.validate(&wave, config)?;
        Ok(wave)
    }

    /// Asks the content source for the next wave, falling back to the local one.
    pub fn generate_with_source(
        &self,
        client: &mut LldmClient,
        score: u64,
        speed: f32,
        config: &GenerationConfig,
        rng: &mut StdRng,
    ) -> ArcadeResult<Vec<ObstacleSpec>> {
        if config.use_lldm {
            let prompt = self.prompt(score, speed);
            if let Some(wave) =
                client.request_validated(&prompt, |text| self.parse_response(text, config))
            {
                debug!("Using generated wave of {} obstacles", wave.len());
                return Ok(wave);
            }
        }
        self.generate(config, rng)
    }
}

impl Generator<Vec<ObstacleSpec>> for ObstacleGenerator {
    /// A banana then a coconut in random lanes.
    fn generate(&self, _config: &GenerationConfig, rng: &mut StdRng) -> ArcadeResult<Vec<ObstacleSpec>> {
        Ok(vec![
            ObstacleSpec {
                kind: ObstacleKind::Banana,
                lane: rng.gen_range(0..RUNNER_LANES),
                spacing: 30,
            },
            ObstacleSpec {
                kind: ObstacleKind::Coconut,
                lane: rng.gen_range(0..RUNNER_LANES),
                spacing: 45,
            },
        ])
    }

    fn validate(&self, wave: &Vec<ObstacleSpec>, _config: &GenerationConfig) -> ArcadeResult<()> {
        if wave.is_empty() || wave.len() > MAX_WAVE_LEN {
            return Err(ArcadeError::GenerationFailed(format!(
                "Wave of {} obstacles is outside 1..={}",
                wave.len(),
                MAX_WAVE_LEN
            )));
        }
        if let Some(bad) = wave.iter().find(|spec| spec.lane >= RUNNER_LANES) {
            return Err(ArcadeError::GenerationFailed(format!(
                "Obstacle lane {} does not exist",
                bad.lane
            )));
        }
        Ok(())
    }

    fn generator_type(&self) -> &'static str {
        "ObstacleGenerator"
    }
}
