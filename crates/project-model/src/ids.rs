//! Identifiers for clips and animations.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Unique clip identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClipId(String);

/// Unique animation identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnimationId(String);

impl ClipId {
    /// Generate a fresh clip id.
    pub fn generate() -> Self {
        Self(format!("clip-{}", uuid::Uuid::new_v4().simple()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AnimationId {
    /// Generate an id from the current timestamp and a random suffix.
    ///
    /// Collision-resistant across rapid successive calls, not cryptographic.
    pub fn generate() -> Self {
        let millis = chrono::Utc::now().timestamp_millis();
        let suffix = uuid::Uuid::new_v4().simple().to_string();
        Self(format!("anim-{millis}-{}", &suffix[..9]))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ClipId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for ClipId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for AnimationId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for AnimationId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl fmt::Display for ClipId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for AnimationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
