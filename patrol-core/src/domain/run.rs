//! Run identity and lifecycle states

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lowercase alphanumerics keep identities valid inside cluster object names and labels.
const IDENTITY_ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

/// Length of a generated run identity
pub const IDENTITY_LEN: usize = 8;

/// Short random token naming one run
///
/// Used as the job name suffix, as the `job-id` label on the job and its pods,
/// and as a correlation field in log lines.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunIdentity(String);

impl RunIdentity {
    /// Generates a fresh identity from the thread-local RNG
    pub fn generate() -> Self {
        let mut rng = rand::thread_rng();
        let token = (0..IDENTITY_LEN)
            .map(|_| IDENTITY_ALPHABET[rng.gen_range(0..IDENTITY_ALPHABET.len())] as char)
            .collect();
        Self(token)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RunIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Lifecycle state of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunState {
    Submitted,
    Polling,
    Succeeded,
    Failed,
    TimedOut,
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RunState::Submitted => "submitted",
            RunState::Polling => "polling",
            RunState::Succeeded => "succeeded",
            RunState::Failed => "failed",
            RunState::TimedOut => "timed_out",
        };
        f.write_str(name)
    }
}
