//! # LLDM Traits
//!
//! The seam between the generators and whatever produces generated text.

use crate::ArcadeResult;

/// A source of free-form text completions.
///
/// Generators only ever see raw text from a source. Extracting, parsing and
/// validating the JSON inside it is their own job, and any failure here is
/// recoverable: callers retry and eventually fall back to local content.
pub trait ContentSource {
    /// Produces a completion for the prompt.
    fn complete(&mut self, prompt: &str) -> ArcadeResult<String>;

    /// Short name used in log output.
    fn name(&self) -> &str;
}
