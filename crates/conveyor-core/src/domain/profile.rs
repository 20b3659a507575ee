//! Routing profile.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Named queue lane a task belongs to.
///
/// Chosen at creation, immutable thereafter. The queue backend uses it
/// to select a physical lane; execution logic never reads it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Profile(String);

impl Profile {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for Profile {
    /// The lane tasks land on when the producer does not pick one.
    fn default() -> Self {
        Self("default".to_string())
    }
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
