//! Correlation token threading one media file through every pipeline stage.

use std::fmt::Display;
use uuid::Uuid;

/// Opaque identifier assigned once per unit of work (one discovered media file).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TrackingToken(String);

impl TrackingToken {
    /// Generates a fresh random token.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for TrackingToken {
    fn default() -> Self {
        Self::new()
    }
}

impl From<&str> for TrackingToken {
    fn from(token: &str) -> Self {
        Self(token.to_string())
    }
}

impl Display for TrackingToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_tokens_are_unique() {
        let a = TrackingToken::new();
        let b = TrackingToken::new();
        assert_ne!(a, b);
        assert!(!a.as_str().is_empty());
    }
}
