#![cfg_attr(docsrs, feature(doc_cfg))]

//! # sluice
//!
//! Streamed bundling on top of an embedded JS bundler engine.
//!
//! The entry point is [`bundle_stream`]: hand it a config (an inline record,
//! a typed [`BundleConfig`], or a path to a config module) and poll the
//! returned [`BundleStream`] for [`BundleEvent`]s as the bundle is produced.
//!
//! ## Quick Start
//!
//! ```no_run
//! use futures::StreamExt;
//! use sluice::{BundleEvent, bundle_stream};
//!
//! # #[tokio::main]
//! # async fn main() {
//! let mut stream = bundle_stream(serde_json::json!({
//!     "input": { "input": "./src/index.js" },
//!     "output": { "format": "esm", "sourcemap": true },
//! }));
//!
//! while let Some(event) = stream.next().await {
//!     match event {
//!         BundleEvent::Chunk(chunk) => {
//!             print!("{}", chunk.contents_str());
//!         }
//!         BundleEvent::Warn(warning) => eprintln!("warning: {warning}"),
//!         BundleEvent::Error(err) => eprintln!("error: {err}"),
//!         BundleEvent::Bundle(_) => {}
//!     }
//! }
//! # }
//! ```
//!
//! ### Loading a config module
//!
//! ```no_run
//! use sluice::bundle_stream;
//!
//! // The file is bundled by the engine itself, evaluated as CommonJS, and
//! // its exports become the config.
//! let stream = bundle_stream("./bundle.config.js");
//! ```
//!
//! ### Custom engine
//!
//! Any [`BundlerEngine`] implementation can stand in for the default
//! Rolldown-backed one:
//!
//! ```no_run
//! use std::sync::Arc;
//! use sluice::{BundleStreamBuilder, RolldownEngine};
//!
//! let stream = BundleStreamBuilder::new("./bundle.config.js")
//!     .engine(Arc::new(RolldownEngine::new()))
//!     .spawn();
//! ```

pub mod diagnostics;
pub mod emit;
pub mod engine;
pub mod loader;
pub mod resolver;
pub mod stream;

pub(crate) mod eval;
pub(crate) mod executor;

// Logging utilities (optional, enabled with "logging" feature)
#[cfg(feature = "logging")]
#[cfg_attr(docsrs, doc(cfg(feature = "logging")))]
pub mod logging;

#[cfg(feature = "logging")]
#[cfg_attr(docsrs, doc(cfg(feature = "logging")))]
pub use logging::{LogLevel, init_logging, init_logging_from_env};

pub use diagnostics::{EngineDiagnostic, Warning};
pub use emit::EmitMode;
pub use engine::{Artifact, BundleHandle, BundlerEngine, rolldown::RolldownEngine};
pub use loader::load_config_from_path;
pub use resolver::{Resolved, resolve};
pub use stream::{
    BundleEvent, BundleStream, BundleStreamBuilder, OutputChunk, bundle_stream,
};

// Re-export the config crate so users need only one dependency.
pub use sluice_config::{
    BundleConfig, ConfigError, ConfigInput, EntryPoints, InputOptions, OutputFormat,
    OutputOptions, WarnHandler,
};

// Re-export plugin types for users extending the default engine.
pub use rolldown_plugin::{Plugin, __inner::SharedPluginable};

/// Error types for sluice operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Configuration was rejected before the engine was involved.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A config module could not be loaded or evaluated.
    #[error("could not load config module {path}: {message}")]
    Resolution {
        path: std::path::PathBuf,
        message: String,
    },

    /// The engine failed while building the module graph.
    #[error("bundler error: {}", format_diagnostics(.0))]
    Build(Vec<EngineDiagnostic>),

    /// Output generation failed after a successful build.
    #[error("generate failed: {0}")]
    Generate(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for sluice operations.
pub type Result<T> = std::result::Result<T, Error>;

fn format_diagnostics(diagnostics: &[EngineDiagnostic]) -> String {
    match diagnostics {
        [] => "unknown engine error".to_string(),
        [single] => single.to_string(),
        many => format!(
            "{} errors: {}",
            many.len(),
            many.iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join("; ")
        ),
    }
}

impl miette::Diagnostic for Error {
    fn code(&self) -> Option<Box<dyn std::fmt::Display + '_>> {
        Some(Box::new(match self {
            Error::Config(_) => "INVALID_CONFIG",
            Error::Resolution { .. } => "CONFIG_LOAD_FAILED",
            Error::Build(_) => "BUNDLER_ERROR",
            Error::Generate(_) => "GENERATE_FAILED",
            Error::Io(_) => "IO_ERROR",
        }))
    }

    fn severity(&self) -> Option<miette::Severity> {
        Some(miette::Severity::Error)
    }

    fn help(&self) -> Option<Box<dyn std::fmt::Display + '_>> {
        match self {
            Error::Config(ConfigError::InvalidShape) => Some(Box::new(
                "Pass an options object, a typed config, or a path to a config module.",
            )),
            Error::Config(ConfigError::NoEntries) => Some(Box::new(
                "Set `input.input` to at least one entry point.",
            )),
            Error::Resolution { path, .. } => Some(Box::new(format!(
                "Check that '{}' exists and exports a config object.",
                path.display()
            ))),
            Error::Build(diagnostics) if diagnostics.len() > 1 => Some(Box::new(
                "Multiple bundler errors occurred. See details above.",
            )),
            _ => None,
        }
    }
}
