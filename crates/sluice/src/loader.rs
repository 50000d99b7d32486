//! Config-module loading.
//!
//! Configuration files are allowed to use the bundler's own module syntax,
//! so they cannot be read directly: the loader asks the engine to bundle
//! the config file itself into one CommonJS artifact, then evaluates that
//! artifact. The generated code is routed through a call-scoped
//! [`ModuleRegistry`] rather than any process-wide loader override, so
//! concurrent loads never observe each other and nothing needs restoring
//! on exit.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde_json::Value;

use crate::diagnostics::{self, Warning};
use crate::engine::BundlerEngine;
use crate::eval;
use crate::{Error, Result};
use sluice_config::{ConfigError, EntryPoints, InputOptions, OutputOptions};

/// Maps absolute paths to generated module code. Lookups for any other
/// path fall through to the filesystem.
#[derive(Debug, Default)]
pub(crate) struct ModuleRegistry {
    overrides: HashMap<PathBuf, String>,
}

impl ModuleRegistry {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn insert(&mut self, path: PathBuf, code: String) {
        self.overrides.insert(path, code);
    }

    /// Generated code for `path` when registered, the on-disk contents
    /// otherwise.
    pub(crate) fn resolve(&self, path: &Path) -> Result<String> {
        if let Some(code) = self.overrides.get(path) {
            return Ok(code.clone());
        }
        std::fs::read_to_string(path).map_err(|e| Error::Resolution {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }
}

/// Load the configuration record exported by the module at `path`.
pub async fn load_config_from_path(
    path: &Path,
    engine: &dyn BundlerEngine,
) -> Result<Value> {
    let absolute = absolutize(path)?;
    tracing::debug!(path = %absolute.display(), "bundling configuration module");

    let input = InputOptions {
        input: EntryPoints::Single(absolute.to_string_lossy().into_owned()),
        on_warn: Some(Arc::new(config_build_warning)),
        ..InputOptions::default()
    };

    let wrap = |message: String| Error::Resolution {
        path: absolute.clone(),
        message,
    };

    let handle = engine.build(&input).await.map_err(|e| wrap(e.to_string()))?;
    let artifacts = handle
        .generate(&OutputOptions::cjs())
        .await
        .map_err(|e| wrap(e.to_string()))?;

    let artifact = artifacts
        .into_iter()
        .next()
        .ok_or_else(|| wrap("bundling the config module produced no output".to_string()))?;

    let mut registry = ModuleRegistry::new();
    registry.insert(absolute.clone(), artifact.code);

    eval::evaluate_module(&registry, &absolute)
}

/// Unresolved imports are expected while bundling a config file (it may
/// import the engine's own package); everything else is surfaced.
fn config_build_warning(warning: &Warning) {
    if !warning.has_code(diagnostics::UNRESOLVED_IMPORT) {
        tracing::warn!(%warning, "warning while bundling config module");
    }
}

fn absolutize(path: &Path) -> Result<PathBuf> {
    std::fs::canonicalize(path).map_err(|_| ConfigError::NotFound(path.to_path_buf()).into())
}
