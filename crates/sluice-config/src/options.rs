//! Configuration data model.
//!
//! A [`BundleConfig`] has two logical sections: `input` describes how the
//! engine should construct its module graph, `output` describes how
//! artifacts are serialized. Keys we do not recognize are carried through
//! untouched in each section's `extra` map so a substitute engine can
//! consume them.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::diagnostics::WarnHandler;

/// Canonical key name for the source-map flag.
pub const SOURCEMAP_KEY: &str = "sourcemap";

/// Deprecated alias for [`SOURCEMAP_KEY`] (uppercase "M").
pub const SOURCEMAP_LEGACY_KEY: &str = "sourceMap";

/// Reserved key for naming a substitute bundler engine. Stripped from raw
/// records during normalization and never forwarded to the engine; the
/// engine itself is supplied through the stream builder.
pub const ENGINE_KEY: &str = "engine";

/// Entry point(s) for the module graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EntryPoints {
    Single(String),
    Multiple(Vec<String>),
}

impl EntryPoints {
    /// The first configured entry, used to derive output chunk paths.
    pub fn first(&self) -> Option<&str> {
        match self {
            EntryPoints::Single(entry) => (!entry.is_empty()).then_some(entry.as_str()),
            EntryPoints::Multiple(entries) => {
                entries.first().map(String::as_str).filter(|e| !e.is_empty())
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.first().is_none()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        match self {
            EntryPoints::Single(entry) => std::slice::from_ref(entry).iter(),
            EntryPoints::Multiple(entries) => entries.iter(),
        }
        .map(String::as_str)
    }
}

impl Default for EntryPoints {
    fn default() -> Self {
        EntryPoints::Single(String::new())
    }
}

impl From<&str> for EntryPoints {
    fn from(entry: &str) -> Self {
        EntryPoints::Single(entry.to_string())
    }
}

impl From<String> for EntryPoints {
    fn from(entry: String) -> Self {
        EntryPoints::Single(entry)
    }
}

/// How the engine should construct the module graph.
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct InputOptions {
    /// Entry point(s).
    #[serde(default)]
    pub input: EntryPoints,

    /// Import specifiers to leave unresolved (not bundled).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub external: Vec<String>,

    /// Warning callback. Not part of the serialized record; set it on an
    /// in-memory config. The orchestrator composes its own forwarding
    /// handler with this one so both fire.
    #[serde(skip)]
    pub on_warn: Option<WarnHandler>,

    /// Unrecognized input keys, forwarded to the engine verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl std::fmt::Debug for InputOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InputOptions")
            .field("input", &self.input)
            .field("external", &self.external)
            .field("on_warn", &self.on_warn.as_ref().map(|_| "<handler>"))
            .field("extra", &self.extra)
            .finish()
    }
}

/// Output module format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    #[serde(alias = "es", alias = "module")]
    Esm,
    #[serde(alias = "commonjs")]
    Cjs,
    Iife,
    Umd,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            OutputFormat::Esm => "esm",
            OutputFormat::Cjs => "cjs",
            OutputFormat::Iife => "iife",
            OutputFormat::Umd => "umd",
        };
        write!(f, "{name}")
    }
}

/// How generated artifacts are serialized.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputOptions {
    #[serde(default)]
    pub format: OutputFormat,

    /// Canonical source-map flag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sourcemap: Option<bool>,

    /// Deprecated alias for [`Self::sourcemap`]. Renamed during
    /// normalization unless a custom engine was supplied, in which case it
    /// is passed through untouched for compatibility.
    #[serde(
        rename = "sourceMap",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub sourcemap_legacy: Option<bool>,

    /// Output file name used for the emitted chunk path. When unset, the
    /// path is derived from the first entry point.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,

    /// Unrecognized output keys, forwarded to the engine verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl OutputOptions {
    /// Output options the config-module loader uses: a single CommonJS
    /// artifact, no source map.
    pub fn cjs() -> Self {
        Self {
            format: OutputFormat::Cjs,
            ..Self::default()
        }
    }

    /// Whether a source map was requested through either key name.
    pub fn wants_sourcemap(&self) -> bool {
        self.sourcemap.or(self.sourcemap_legacy).unwrap_or(false)
    }
}

/// Normalized configuration record.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BundleConfig {
    #[serde(default)]
    pub input: InputOptions,

    #[serde(default)]
    pub output: OutputOptions,

    /// Top-level keys we do not recognize, carried through verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl BundleConfig {
    /// Config with a single entry point and defaults everywhere else.
    pub fn with_entry(entry: impl Into<String>) -> Self {
        Self {
            input: InputOptions {
                input: EntryPoints::Single(entry.into()),
                ..InputOptions::default()
            },
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn entry_points_deserialize_untagged() {
        let single: EntryPoints = serde_json::from_value(json!("src/index.js")).unwrap();
        assert_eq!(single.first(), Some("src/index.js"));

        let multiple: EntryPoints =
            serde_json::from_value(json!(["a.js", "b.js"])).unwrap();
        assert_eq!(multiple.first(), Some("a.js"));
        assert_eq!(multiple.iter().count(), 2);
    }

    #[test]
    fn empty_entries_report_empty() {
        assert!(EntryPoints::default().is_empty());
        assert!(EntryPoints::Multiple(vec![]).is_empty());
        assert!(!EntryPoints::Single("x.js".into()).is_empty());
    }

    #[test]
    fn output_format_aliases() {
        let es: OutputFormat = serde_json::from_value(json!("es")).unwrap();
        assert_eq!(es, OutputFormat::Esm);
        let commonjs: OutputFormat = serde_json::from_value(json!("commonjs")).unwrap();
        assert_eq!(commonjs, OutputFormat::Cjs);
    }

    #[test]
    fn unknown_keys_flow_into_extra() {
        let config: BundleConfig = serde_json::from_value(json!({
            "input": { "input": "entry.js", "treeshake": false },
            "output": { "format": "cjs", "banner": "/* hi */" },
            "watch": true
        }))
        .unwrap();

        assert_eq!(config.input.extra["treeshake"], json!(false));
        assert_eq!(config.output.extra["banner"], json!("/* hi */"));
        assert_eq!(config.extra["watch"], json!(true));
    }

    #[test]
    fn wants_sourcemap_reads_both_keys() {
        let mut output = OutputOptions::default();
        assert!(!output.wants_sourcemap());
        output.sourcemap_legacy = Some(true);
        assert!(output.wants_sourcemap());
        output.sourcemap = Some(false);
        assert!(!output.wants_sourcemap());
    }
}
