use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::{deserialize_duration_from_ms, serialize_duration_to_ms};

/// --- Default values for page retry settings ---
fn default_max_attempts() -> u32 {
    3
}

fn default_backoff_step() -> Duration {
    Duration::from_millis(1000)
}

/// Retry policy applied to every page request of a paginated walk.
///
/// A failed attempt with zero-based index `i` is followed by a pause of
/// `backoff_step * (i + 1)`, so the default policy waits 1s and then 2s before
/// giving up on the third failure.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct FetchConfig {
    /// Total number of attempts per page, including the first one.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Linear backoff unit between attempts.
    #[serde(
        default = "default_backoff_step",
        deserialize_with = "deserialize_duration_from_ms",
        serialize_with = "serialize_duration_to_ms"
    )]
    pub backoff_step_ms: Duration,
}

impl FetchConfig {
    /// The pause taken after the attempt with the given zero-based index fails.
    pub fn backoff_after(&self, attempt_index: u32) -> Duration {
        self.backoff_step_ms * (attempt_index + 1)
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self { max_attempts: default_max_attempts(), backoff_step_ms: default_backoff_step() }
    }
}
