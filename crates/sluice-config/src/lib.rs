//! Configuration model for the sluice bundler adapter.
//!
//! This crate owns the configuration data types and the normalization rules
//! applied before a config reaches a bundler engine: stripping the reserved
//! engine key, renaming the deprecated `sourceMap` alias, and validating
//! that an entry point exists. It has no engine dependency; the `sluice`
//! crate wires these types to the default Rolldown engine.

pub mod diagnostics;
pub mod error;
pub mod input;
pub mod normalize;
pub mod options;

pub use diagnostics::{WarnHandler, Warning};
pub use error::{ConfigError, Result};
pub use input::ConfigInput;
pub use normalize::{normalize_config, normalize_record};
pub use options::{
    BundleConfig, ENGINE_KEY, EntryPoints, InputOptions, OutputFormat, OutputOptions,
    SOURCEMAP_KEY, SOURCEMAP_LEGACY_KEY,
};
