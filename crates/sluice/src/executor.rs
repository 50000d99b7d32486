//! The build orchestrator.
//!
//! Drives the two-phase engine protocol and feeds the stream: decorate the
//! warning handler, build, publish the handle, generate, emit artifacts in
//! order, end the stream. Any failure aborts the remaining phases and is
//! reported by the caller as one terminal error event; chunks already
//! delivered are not retracted.

use std::path::PathBuf;
use std::sync::Arc;

use crate::diagnostics::Warning;
use crate::emit::{EmitContext, EmitMode};
use crate::resolver::Resolved;
use crate::stream::EventSink;
use crate::Result;

pub(crate) async fn run_pipeline(
    resolved: Resolved,
    mode: EmitMode,
    sink: &EventSink,
) -> Result<()> {
    let Resolved { mut config, engine } = resolved;

    // Compose the warning handler: the stream's `Warn` event and any
    // caller-supplied handler both fire, in that order.
    let caller_handler = config.input.on_warn.take();
    let warn_sink = sink.clone();
    config.input.on_warn = Some(Arc::new(move |warning: &Warning| {
        warn_sink.warn(warning.clone());
        if let Some(handler) = &caller_handler {
            handler(warning);
        }
    }));

    let entry = config.input.input.first().unwrap_or_default().to_string();
    tracing::debug!(%entry, "build phase");
    let handle = engine.build(&config.input).await?;
    sink.bundle(Arc::clone(&handle));

    tracing::debug!(format = %config.output.format, "generate phase");
    let artifacts = handle.generate(&config.output).await?;
    tracing::debug!(artifacts = artifacts.len(), "emitting artifacts");

    let ctx = EmitContext {
        path: config
            .output
            .file
            .clone()
            .unwrap_or_else(|| PathBuf::from(entry)),
        cwd: std::env::current_dir()?,
    };

    let mut emitter = mode.emitter();
    for artifact in artifacts {
        emitter.emit(artifact, &ctx, sink)?;
    }

    // Dropping the sink's sender clone ends the stream once the spawning
    // task finishes; nothing further to signal on success.
    Ok(())
}
