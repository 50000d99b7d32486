//! The bundler engine contract.
//!
//! The adapter drives any engine through two calls: build a module graph
//! from input options, then generate output artifacts from the resulting
//! handle. [`RolldownEngine`](rolldown::RolldownEngine) is the bundled
//! default; callers substitute their own implementation through
//! [`BundleStreamBuilder::engine`](crate::BundleStreamBuilder::engine).

pub mod rolldown;

use std::sync::Arc;

use async_trait::async_trait;

use crate::Result;
use sluice_config::{InputOptions, OutputOptions};

/// One generated output: code plus an optional source map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    /// File name the engine assigned to this output.
    pub filename: String,
    pub code: String,
    /// Source map as JSON text, when one was produced.
    pub map: Option<String>,
}

impl Artifact {
    pub fn new(filename: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            code: code.into(),
            map: None,
        }
    }

    pub fn with_map(mut self, map: impl Into<String>) -> Self {
        self.map = Some(map.into());
        self
    }
}

/// A module-graph builder and code generator, treated as opaque.
#[async_trait]
pub trait BundlerEngine: Send + Sync {
    /// Phase 1: construct a module graph from the input options.
    ///
    /// Warnings raised during the build are delivered through
    /// `input.on_warn`, one call per warning.
    async fn build(&self, input: &InputOptions) -> Result<Arc<dyn BundleHandle>>;
}

/// Opaque result of the build phase; input to the generate phase.
///
/// The orchestrator holds a handle only for the duration of one run: it is
/// shared once into the stream's `Bundle` event for engine-level
/// introspection, passed to [`generate`](Self::generate), then dropped.
#[async_trait]
pub trait BundleHandle: Send + Sync {
    /// Phase 2: serialize the graph into an ordered artifact sequence.
    async fn generate(&self, output: &OutputOptions) -> Result<Vec<Artifact>>;
}
