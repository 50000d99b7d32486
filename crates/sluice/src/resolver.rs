//! Option resolution.
//!
//! Turns whatever the caller handed the entry point into a normalized
//! configuration plus the engine that will run it. Failures here never
//! reach the caller as a panic or synchronous error; the stream adapter
//! converts them into a terminal `Error` event.

use std::sync::Arc;

use serde_json::Value;

use crate::engine::BundlerEngine;
use crate::engine::rolldown::RolldownEngine;
use crate::loader;
use crate::{Error, Result};
use sluice_config::{BundleConfig, ConfigError, ConfigInput, normalize_config, normalize_record};

/// Normalized configuration plus the chosen engine.
pub struct Resolved {
    pub config: BundleConfig,
    pub engine: Arc<dyn BundlerEngine>,
}

impl std::fmt::Debug for Resolved {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Resolved")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Resolve caller input into a runnable configuration.
///
/// `engine_override` is the reserved engine slot: when present, deprecated
/// key names are passed through untouched (the substitute engine may still
/// expect them) and the default engine is never constructed.
pub async fn resolve(
    input: ConfigInput,
    engine_override: Option<Arc<dyn BundlerEngine>>,
) -> Result<Resolved> {
    let has_custom_engine = engine_override.is_some();
    let engine: Arc<dyn BundlerEngine> =
        engine_override.unwrap_or_else(|| Arc::new(RolldownEngine::new()));

    let config = match input {
        ConfigInput::Path(path) => {
            let value = loader::load_config_from_path(&path, engine.as_ref()).await?;
            let Value::Object(record) = value else {
                return Err(Error::Resolution {
                    path,
                    message: "config module must export an object".to_string(),
                });
            };
            normalize_record(record, has_custom_engine)?
        }
        ConfigInput::Record(record) => normalize_record(record, has_custom_engine)?,
        ConfigInput::Typed(mut config) => {
            normalize_config(&mut config, has_custom_engine);
            config.validate()?;
            config
        }
        ConfigInput::Other(value) => {
            tracing::debug!(?value, "rejecting configuration input shape");
            return Err(ConfigError::InvalidShape.into());
        }
    };

    Ok(Resolved { config, engine })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use sluice_config::OutputFormat;

    fn record(value: Value) -> ConfigInput {
        ConfigInput::from(value)
    }

    #[tokio::test]
    async fn record_input_resolves_to_default_engine() {
        let resolved = resolve(
            record(json!({
                "input": { "input": "entry.js" },
                "output": { "format": "cjs" }
            })),
            None,
        )
        .await
        .unwrap();

        assert_eq!(resolved.config.input.input.first(), Some("entry.js"));
        assert_eq!(resolved.config.output.format, OutputFormat::Cjs);
    }

    #[tokio::test]
    async fn invalid_shape_is_a_usage_error() {
        let err = resolve(record(json!(42)), None).await.unwrap_err();
        assert!(matches!(err, Error::Config(ConfigError::InvalidShape)));
        assert_eq!(err.to_string(), "options must be an object or a string");
    }

    #[tokio::test]
    async fn typed_input_is_normalized_and_validated() {
        let mut config = BundleConfig::with_entry("entry.js");
        config.output.sourcemap_legacy = Some(true);

        let resolved = resolve(ConfigInput::from(config), None).await.unwrap();
        assert_eq!(resolved.config.output.sourcemap, Some(true));
        assert_eq!(resolved.config.output.sourcemap_legacy, None);
    }

    #[tokio::test]
    async fn typed_input_without_entry_fails_validation() {
        let err = resolve(ConfigInput::from(BundleConfig::default()), None)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Config(ConfigError::NoEntries)));
    }
}
