//! Record normalization.
//!
//! Two steps: raw records are stripped of the reserved engine key and
//! deserialized; the typed config then has the deprecated source-map alias
//! rewritten to its canonical name. The rename only happens when no custom
//! engine was supplied - a substitute engine might still expect the legacy
//! key, so renaming is only safe against the bundled default engine.

use serde_json::{Map, Value};

use crate::error::{ConfigError, Result};
use crate::options::{BundleConfig, ENGINE_KEY, SOURCEMAP_KEY, SOURCEMAP_LEGACY_KEY};

/// Normalize a raw record into a validated [`BundleConfig`].
pub fn normalize_record(
    mut record: Map<String, Value>,
    has_custom_engine: bool,
) -> Result<BundleConfig> {
    if record.remove(ENGINE_KEY).is_some() {
        tracing::debug!(
            "reserved `{ENGINE_KEY}` key stripped from configuration record; \
             substitute engines are supplied through the stream builder"
        );
    }

    let mut config: BundleConfig = serde_json::from_value(Value::Object(record))
        .map_err(|e| ConfigError::InvalidValue(e.to_string()))?;

    normalize_config(&mut config, has_custom_engine);
    config.validate()?;
    Ok(config)
}

/// Typed-level normalization: the deprecated source-map rename.
///
/// Emits the deprecation warning at most once per call.
pub fn normalize_config(config: &mut BundleConfig, has_custom_engine: bool) {
    if config.output.sourcemap_legacy.is_none() || has_custom_engine {
        return;
    }

    tracing::warn!(
        "the `{SOURCEMAP_LEGACY_KEY}` option has been renamed to `{SOURCEMAP_KEY}` \
         (lowercase \"m\"); the old form is deprecated"
    );

    let legacy = config.output.sourcemap_legacy.take();
    if config.output.sourcemap.is_none() {
        config.output.sourcemap = legacy;
    }
}

impl BundleConfig {
    /// Reject configs no engine could act on.
    pub fn validate(&self) -> Result<()> {
        if self.input.input.is_empty() {
            return Err(ConfigError::NoEntries);
        }
        Ok(())
    }
}
