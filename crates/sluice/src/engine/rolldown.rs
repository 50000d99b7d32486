//! Default engine implementation over Rolldown.
//!
//! Rolldown exposes a one-shot API: graph construction and code generation
//! happen inside a single `generate()` call. The two-phase contract is kept
//! at the trait level by capturing the input section at build time and
//! constructing the bundler when the output section arrives.
//!
//! One consequence: every Rolldown failure is classified as a build error,
//! including failures raised by its `generate()` call, because that is
//! where the module graph is actually constructed (unresolved imports,
//! parse errors). `Error::Generate` is reserved for failures of the
//! adapter's own output serialization and for substitute engines with a
//! real generate phase.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use ::rolldown::{
    Bundler as RolldownBundler, BundlerBuilder, BundlerOptions, InputItem, IsExternal,
    OutputFormat as RolldownFormat, SourceMapType,
};
use async_trait::async_trait;
use path_clean::PathClean;
use rolldown_plugin::__inner::SharedPluginable;

use crate::diagnostics::{self, WarnHandler};
use crate::engine::{Artifact, BundleHandle, BundlerEngine};
use crate::{Error, Result};
use sluice_config::{InputOptions, OutputFormat, OutputOptions};

/// The bundled default engine.
#[derive(Default)]
pub struct RolldownEngine {
    plugins: Vec<SharedPluginable>,
    cwd: Option<PathBuf>,
}

impl RolldownEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rolldown plugins applied to every build this engine runs. This is
    /// the engine-level seam: plugin values are not representable in a
    /// configuration record, so they live on the engine handle instead.
    pub fn with_plugins(mut self, plugins: Vec<SharedPluginable>) -> Self {
        self.plugins = plugins;
        self
    }

    /// Working directory for module resolution.
    pub fn cwd(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.cwd = Some(cwd.into());
        self
    }
}

#[async_trait]
impl BundlerEngine for RolldownEngine {
    async fn build(&self, input: &InputOptions) -> Result<Arc<dyn BundleHandle>> {
        let entries: Vec<String> = input
            .input
            .iter()
            .map(normalize_entry_path)
            .collect();
        tracing::debug!(entries = entries.len(), "rolldown build phase");

        Ok(Arc::new(RolldownBundle {
            entries,
            external: input.external.clone(),
            cwd: self.cwd.clone(),
            plugins: self.plugins.clone(),
            on_warn: input.on_warn.clone(),
        }))
    }
}

/// Captured input section, realized as a Rolldown bundler at generate time.
struct RolldownBundle {
    entries: Vec<String>,
    external: Vec<String>,
    cwd: Option<PathBuf>,
    plugins: Vec<SharedPluginable>,
    on_warn: Option<WarnHandler>,
}

#[async_trait]
impl BundleHandle for RolldownBundle {
    async fn generate(&self, output: &OutputOptions) -> Result<Vec<Artifact>> {
        let mut bundler = self.configure(output)?;

        let result = bundler
            .generate()
            .await
            .map_err(|e| Error::Build(diagnostics::extract_from_debug(&e)))?;

        for warning in &result.warnings {
            let warning = diagnostics::warning_from_debug(warning);
            match &self.on_warn {
                Some(handler) => handler(&warning),
                None => tracing::warn!(%warning, "bundler warning"),
            }
        }

        let mut artifacts = Vec::with_capacity(result.assets.len());
        for asset in &result.assets {
            match asset {
                rolldown_common::Output::Chunk(chunk) => {
                    artifacts.push(Artifact {
                        filename: chunk.filename.to_string(),
                        code: chunk.code.clone(),
                        map: chunk.map.as_ref().map(|m| m.to_json_string()),
                    });
                }
                rolldown_common::Output::Asset(asset) => {
                    // Non-chunk assets (copied files etc.) have no place in
                    // the stream contract.
                    tracing::debug!(filename = %asset.filename, "skipping non-chunk asset");
                }
            }
        }

        Ok(artifacts)
    }
}

impl RolldownBundle {
    fn configure(&self, output: &OutputOptions) -> Result<RolldownBundler> {
        let options = BundlerOptions {
            input: Some(
                self.entries
                    .iter()
                    .map(|entry| InputItem {
                        name: None,
                        import: entry.clone(),
                    })
                    .collect(),
            ),
            cwd: self.cwd.clone(),
            external: (!self.external.is_empty())
                .then(|| IsExternal::from(self.external.clone())),
            format: Some(map_format(output.format)),
            sourcemap: output.wants_sourcemap().then_some(SourceMapType::File),
            ..Default::default()
        };

        BundlerBuilder::default()
            .with_options(options)
            .with_plugins(self.plugins.clone())
            .build()
            .map_err(|e| Error::Build(diagnostics::extract_from_debug(&e)))
    }
}

fn map_format(format: OutputFormat) -> RolldownFormat {
    match format {
        OutputFormat::Esm => RolldownFormat::Esm,
        OutputFormat::Cjs => RolldownFormat::Cjs,
        OutputFormat::Iife => RolldownFormat::Iife,
        OutputFormat::Umd => RolldownFormat::Umd,
    }
}

/// Normalize an entry path by cleaning redundant `.` / `..` segments.
fn normalize_entry_path(entry: impl AsRef<Path>) -> String {
    let cleaned: PathBuf = entry.as_ref().to_path_buf().clean();
    cleaned.to_string_lossy().into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entry_paths_are_cleaned() {
        assert_eq!(normalize_entry_path("./src/../src/index.js"), "src/index.js");
    }

    #[test]
    fn format_mapping_is_total() {
        assert!(matches!(map_format(OutputFormat::Esm), RolldownFormat::Esm));
        assert!(matches!(map_format(OutputFormat::Cjs), RolldownFormat::Cjs));
        assert!(matches!(map_format(OutputFormat::Iife), RolldownFormat::Iife));
        assert!(matches!(map_format(OutputFormat::Umd), RolldownFormat::Umd));
    }
}
