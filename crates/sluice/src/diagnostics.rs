//! Diagnostic extraction from engine errors and warnings.
//!
//! The default engine reports diagnostics through types we do not want to
//! expose, so everything is funneled through `Debug` formatting and
//! classified into stable codes here. This insulates the adapter from
//! upstream Rolldown API changes.

use serde::{Deserialize, Serialize};

pub use sluice_config::{WarnHandler, Warning};

/// Warning code for imports the engine could not resolve. The config-module
/// loader suppresses these (a config file importing the engine's own
/// package is expected).
pub const UNRESOLVED_IMPORT: &str = "UNRESOLVED_IMPORT";

pub const UNRESOLVED_ENTRY: &str = "UNRESOLVED_ENTRY";
pub const CIRCULAR_DEPENDENCY: &str = "CIRCULAR_DEPENDENCY";
pub const PARSE_ERROR: &str = "PARSE_ERROR";
pub const MISSING_EXPORT: &str = "MISSING_EXPORT";
pub const PLUGIN_ERROR: &str = "PLUGIN_ERROR";

/// One structured diagnostic extracted from an engine failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineDiagnostic {
    pub code: Option<String>,
    pub message: String,
}

impl std::fmt::Display for EngineDiagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.code {
            Some(code) => write!(f, "{code}: {}", self.message),
            None => write!(f, "{}", self.message),
        }
    }
}

/// Classify a formatted diagnostic into a stable code by message shape.
pub fn classify(text: &str) -> Option<&'static str> {
    if text.contains("UnresolvedEntry") || text.contains("Cannot resolve entry") {
        Some(UNRESOLVED_ENTRY)
    } else if text.contains("UnresolvedImport") || text.contains("Cannot resolve") {
        Some(UNRESOLVED_IMPORT)
    } else if text.contains("Circular") || text.contains("cycle") {
        Some(CIRCULAR_DEPENDENCY)
    } else if text.contains("Parse") || text.contains("Syntax") || text.contains("Expected") {
        Some(PARSE_ERROR)
    } else if text.contains("MissingExport") {
        Some(MISSING_EXPORT)
    } else if text.contains("Plugin") {
        Some(PLUGIN_ERROR)
    } else {
        None
    }
}

/// Extract diagnostics from an engine error through its `Debug` output.
pub fn extract_from_debug(error: &dyn std::fmt::Debug) -> Vec<EngineDiagnostic> {
    let text = format!("{error:?}");
    vec![EngineDiagnostic {
        code: classify(&text).map(str::to_string),
        message: text,
    }]
}

/// Normalize one engine warning into the adapter's [`Warning`] record.
pub fn warning_from_debug(warning: &dyn std::fmt::Debug) -> Warning {
    let text = format!("{warning:?}");
    Warning::new(classify(&text), text)
}
