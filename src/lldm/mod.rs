//! # LLDM Module
//!
//! Integration with text-generation content sources for mazes, puzzles and
//! obstacle patterns.
//!
//! No hosted model is wired in. [`OfflineSource`] always fails, which sends
//! every generator down its deterministic fallback path, and
//! [`ScriptedSource`] replays canned responses for tests and demos. Anything
//! else can be plugged in by implementing [`ContentSource`].

pub mod extract;
pub mod traits;

pub use extract::*;
pub use traits::*;

use crate::{config, ArcadeError, ArcadeResult};
use log::{debug, info, warn};
use std::collections::VecDeque;

/// Content source used when no generator backend is configured.
#[derive(Debug, Clone, Default)]
pub struct OfflineSource;

impl ContentSource for OfflineSource {
    fn complete(&mut self, _prompt: &str) -> ArcadeResult<String> {
        Err(ArcadeError::LldmError(
            "no content source configured".to_string(),
        ))
    }

    fn name(&self) -> &str {
        "offline"
    }
}

/// Replays a fixed queue of responses, one per request.
///
/// Every prompt it receives is recorded so tests can inspect them.
#[derive(Debug, Clone, Default)]
pub struct ScriptedSource {
    responses: VecDeque<String>,
    /// Prompts received so far, oldest first
    pub prompts: Vec<String>,
}

impl ScriptedSource {
    /// Creates a source that answers with `responses` in order.
    pub fn new<I, S>(responses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            responses: responses.into_iter().map(Into::into).collect(),
            prompts: Vec::new(),
        }
    }

    /// Number of responses not yet consumed.
    pub fn remaining(&self) -> usize {
        self.responses.len()
    }
}

impl ContentSource for ScriptedSource {
    fn complete(&mut self, prompt: &str) -> ArcadeResult<String> {
        self.prompts.push(prompt.to_string());
        self.responses
            .pop_front()
            .ok_or_else(|| ArcadeError::LldmError("scripted source exhausted".to_string()))
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

/// Counters for requests made through an [`LldmClient`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LldmStats {
    /// Individual completion attempts
    pub attempts: u32,
    /// Attempts whose response was accepted
    pub accepted: u32,
    /// Requests that ran out of attempts
    pub exhausted: u32,
}

/// Retrying client over a [`ContentSource`].
pub struct LldmClient {
    source: Box<dyn ContentSource>,
    /// Attempts per request before giving up
    pub max_attempts: u32,
    /// Usage counters
    pub stats: LldmStats,
}

impl std::fmt::Debug for LldmClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LldmClient")
            .field("source", &self.source.name())
            .field("max_attempts", &self.max_attempts)
            .field("stats", &self.stats)
            .finish()
    }
}

impl Default for LldmClient {
    fn default() -> Self {
        Self::offline()
    }
}

impl LldmClient {
    /// Creates a client over the given source.
    pub fn new(source: Box<dyn ContentSource>) -> Self {
        Self {
            source,
            max_attempts: config::MAX_CONTENT_ATTEMPTS,
            stats: LldmStats::default(),
        }
    }

    /// Creates a client that never produces content.
    pub fn offline() -> Self {
        Self::new(Box::new(OfflineSource))
    }

    /// Creates a client that replays the given responses.
    pub fn scripted<I, S>(responses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(Box::new(ScriptedSource::new(responses)))
    }

    pub fn source_name(&self) -> &str {
        self.source.name()
    }

    /// Requests content until `accept` succeeds or the attempts run out.
    ///
    /// `accept` receives the raw response and is responsible for extracting,
    /// parsing and validating it. Returns `None` when every attempt failed.
    pub fn request_validated<T, F>(&mut self, prompt: &str, mut accept: F) -> Option<T>
    where
        F: FnMut(&str) -> ArcadeResult<T>,
    {
        for attempt in 1..=self.max_attempts {
            self.stats.attempts += 1;
            let outcome = self
                .source
                .complete(prompt)
                .and_then(|response| accept(&response));

            match outcome {
                Ok(value) => {
                    debug!(
                        "{} source accepted on attempt {}",
                        self.source.name(),
                        attempt
                    );
                    self.stats.accepted += 1;
                    return Some(value);
                }
                Err(e) => {
                    warn!("Attempt {} failed: {}", attempt, e);
                }
            }
        }

        info!(
            "{} source gave no usable content after {} attempts",
            self.source.name(),
            self.max_attempts
        );
        self.stats.exhausted += 1;
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offline_client_exhausts() {
        let mut client = LldmClient::offline();
        let result: Option<u32> = client.request_validated("anything", |_| Ok(1));
        assert!(result.is_none());
        assert_eq!(client.stats.attempts, 3);
        assert_eq!(client.stats.exhausted, 1);
    }

    #[test]
    fn test_scripted_client_retries_until_valid() {
        let mut client = LldmClient::scripted(["bad", "also bad", "42"]);
        let result = client.request_validated("number please", |text| {
            text.parse::<u32>()
                .map_err(|e| ArcadeError::GenerationFailed(e.to_string()))
        });
        assert_eq!(result, Some(42));
        assert_eq!(client.stats.attempts, 3);
        assert_eq!(client.stats.accepted, 1);
    }

    #[test]
    fn test_scripted_source_records_prompts() {
        let mut source = ScriptedSource::new(["one"]);
        assert_eq!(source.complete("first").unwrap(), "one");
        assert!(source.complete("second").is_err());
        assert_eq!(source.prompts, vec!["first", "second"]);
        assert_eq!(source.remaining(), 0);
    }
}
