//! Caller-supplied configuration input shapes.

use std::path::{Path, PathBuf};

use serde_json::{Map, Value};

use crate::options::BundleConfig;

/// What the top-level entry point accepts: a path to a configuration
/// module, a raw record, an already-typed config, or anything else (which
/// resolution rejects with a usage error).
#[derive(Debug, Clone)]
pub enum ConfigInput {
    /// Path to a configuration module on disk.
    Path(PathBuf),
    /// Raw key/value record.
    Record(Map<String, Value>),
    /// Typed in-memory configuration.
    Typed(BundleConfig),
    /// Unsupported shape; resolution fails with a usage error.
    Other(Value),
}

impl From<&str> for ConfigInput {
    fn from(path: &str) -> Self {
        ConfigInput::Path(PathBuf::from(path))
    }
}

impl From<String> for ConfigInput {
    fn from(path: String) -> Self {
        ConfigInput::Path(PathBuf::from(path))
    }
}

impl From<&Path> for ConfigInput {
    fn from(path: &Path) -> Self {
        ConfigInput::Path(path.to_path_buf())
    }
}

impl From<PathBuf> for ConfigInput {
    fn from(path: PathBuf) -> Self {
        ConfigInput::Path(path)
    }
}

impl From<BundleConfig> for ConfigInput {
    fn from(config: BundleConfig) -> Self {
        ConfigInput::Typed(config)
    }
}

impl From<Map<String, Value>> for ConfigInput {
    fn from(record: Map<String, Value>) -> Self {
        ConfigInput::Record(record)
    }
}

impl From<Value> for ConfigInput {
    fn from(value: Value) -> Self {
        match value {
            Value::String(path) => ConfigInput::Path(PathBuf::from(path)),
            Value::Object(record) => ConfigInput::Record(record),
            other => ConfigInput::Other(other),
        }
    }
}
