//! Shared diagnostic records.
//!
//! Engine warnings are normalized into [`Warning`] before they reach any
//! handler, so callers never depend on an engine's own diagnostic types.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// One diagnostic surfaced by the bundler engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Warning {
    /// Stable machine-readable code (e.g. `UNRESOLVED_IMPORT`), when one
    /// could be determined.
    pub code: Option<String>,
    pub message: String,
}

impl Warning {
    pub fn new(code: Option<impl Into<String>>, message: impl Into<String>) -> Self {
        Self {
            code: code.map(Into::into),
            message: message.into(),
        }
    }

    /// Warning with a known code.
    pub fn coded(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(Some(code), message)
    }

    pub fn has_code(&self, code: &str) -> bool {
        self.code.as_deref() == Some(code)
    }
}

impl std::fmt::Display for Warning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.code {
            Some(code) => write!(f, "{code}: {}", self.message),
            None => write!(f, "{}", self.message),
        }
    }
}

/// Caller-supplied warning callback, invoked once per engine warning.
pub type WarnHandler = Arc<dyn Fn(&Warning) + Send + Sync>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_code_when_present() {
        let warning = Warning::coded("UNRESOLVED_IMPORT", "cannot resolve './x'");
        assert_eq!(warning.to_string(), "UNRESOLVED_IMPORT: cannot resolve './x'");

        let bare = Warning::new(None::<&str>, "plain message");
        assert_eq!(bare.to_string(), "plain message");
    }

    #[test]
    fn has_code_matches_exact() {
        let warning = Warning::coded("CIRCULAR_DEPENDENCY", "a -> b -> a");
        assert!(warning.has_code("CIRCULAR_DEPENDENCY"));
        assert!(!warning.has_code("UNRESOLVED_IMPORT"));
    }
}
