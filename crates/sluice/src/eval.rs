//! CommonJS evaluation of generated config modules.
//!
//! The loader bundles a configuration file into one CommonJS artifact and
//! hands it here. The artifact runs in an embedded Boa interpreter with a
//! minimal CommonJS prelude; whatever lands on `module.exports` is
//! converted to JSON and becomes the configuration record.

use std::path::Path;

use boa_engine::{Context, Source};
use serde_json::Value;

use crate::loader::ModuleRegistry;
use crate::{Error, Result};

/// `module` / `exports` plus an inert `require`. The bundle step inlines
/// every resolvable import, so `require` only fires for externalized
/// specifiers (typically the engine's own package) and an empty object is
/// the compatible answer.
const CJS_PRELUDE: &str = "\
var module = { exports: {} };\n\
var exports = module.exports;\n\
function require(specifier) { return {}; }\n";

/// Evaluate the module at `path`, preferring the registry's generated code
/// over the file on disk.
pub(crate) fn evaluate_module(registry: &ModuleRegistry, path: &Path) -> Result<Value> {
    let code = registry.resolve(path)?;

    let mut context = Context::default();
    let fail = |message: String| Error::Resolution {
        path: path.to_path_buf(),
        message,
    };

    context
        .eval(Source::from_bytes(CJS_PRELUDE))
        .map_err(|e| fail(format!("prelude evaluation failed: {e}")))?;
    context
        .eval(Source::from_bytes(code.as_bytes()))
        .map_err(|e| fail(format!("config evaluation failed: {e}")))?;

    let exported = context
        .eval(Source::from_bytes("module.exports"))
        .map_err(|e| fail(format!("reading module.exports failed: {e}")))?;

    if exported.is_undefined() || exported.is_null() {
        return Err(fail("config module did not export a value".to_string()));
    }

    let value = exported
        .to_json(&mut context)
        .map_err(|e| fail(format!("config export is not JSON-representable: {e}")))?;

    Ok(unwrap_default_export(value))
}

/// CommonJS conversion of an ES module wraps the default export; unwrap it
/// so `export default {...}` configs behave like plain records.
///
/// Unwraps when the `__esModule` interop marker is set, or when `default`
/// is the sole key (some converters emit the wrapper without the marker).
/// The heuristic cost: a config deliberately exporting `{ default: ... }`
/// and nothing else is indistinguishable from a wrapped one and gets
/// unwrapped. A `default` key next to other keys is left alone.
fn unwrap_default_export(value: Value) -> Value {
    match value {
        Value::Object(mut map) if map.contains_key("default") => {
            let interop = map
                .get("__esModule")
                .map(|v| v == &Value::Bool(true))
                .unwrap_or(false);
            if interop || map.len() == 1 {
                map.remove("default").unwrap_or(Value::Null)
            } else {
                Value::Object(map)
            }
        }
        other => other,
    }
}
