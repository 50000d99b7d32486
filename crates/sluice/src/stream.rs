//! The stream surface.
//!
//! [`bundle_stream`] returns synchronously; the resolver and orchestrator
//! run on a spawned task and feed the stream through a channel. Because
//! events are buffered in the channel, a consumer that polls late still
//! observes everything in order - including an error raised before its
//! first poll.

use std::path::PathBuf;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures::Stream;
use tokio::sync::mpsc;

use crate::diagnostics::Warning;
use crate::emit::EmitMode;
use crate::engine::{BundleHandle, BundlerEngine};
use crate::{Error, executor, resolver};
use sluice_config::ConfigInput;

/// One output chunk delivered on the stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputChunk {
    pub contents: Vec<u8>,
    /// Source map as JSON text, when the engine produced one.
    pub map: Option<String>,
    /// Virtual file path, derived from the configured entry point (or the
    /// configured output file name).
    pub path: PathBuf,
    pub cwd: PathBuf,
}

impl OutputChunk {
    /// Chunk contents as text, for consumers that know the payload is code.
    pub fn contents_str(&self) -> std::borrow::Cow<'_, str> {
        String::from_utf8_lossy(&self.contents)
    }
}

/// Events delivered by a [`BundleStream`].
pub enum BundleEvent {
    /// Opaque build-phase handle, for consumers needing engine-level
    /// introspection. Emitted once, before any chunk.
    Bundle(Arc<dyn BundleHandle>),
    /// One engine warning.
    Warn(Warning),
    /// One output chunk.
    Chunk(OutputChunk),
    /// Terminal failure. Nothing follows this event.
    Error(Error),
}

impl std::fmt::Debug for BundleEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BundleEvent::Bundle(_) => f.write_str("Bundle(<handle>)"),
            BundleEvent::Warn(warning) => f.debug_tuple("Warn").field(warning).finish(),
            BundleEvent::Chunk(chunk) => f.debug_tuple("Chunk").field(chunk).finish(),
            BundleEvent::Error(error) => f.debug_tuple("Error").field(error).finish(),
        }
    }
}

/// Producer side of the stream, handed to the orchestrator.
#[derive(Clone)]
pub(crate) struct EventSink {
    tx: mpsc::UnboundedSender<BundleEvent>,
}

impl EventSink {
    pub(crate) fn new(tx: mpsc::UnboundedSender<BundleEvent>) -> Self {
        Self { tx }
    }

    // Send failures mean the consumer dropped the stream; nothing useful
    // remains to be done with the event.

    pub(crate) fn bundle(&self, handle: Arc<dyn BundleHandle>) {
        let _ = self.tx.send(BundleEvent::Bundle(handle));
    }

    pub(crate) fn warn(&self, warning: Warning) {
        let _ = self.tx.send(BundleEvent::Warn(warning));
    }

    pub(crate) fn chunk(&self, chunk: OutputChunk) {
        let _ = self.tx.send(BundleEvent::Chunk(chunk));
    }

    pub(crate) fn error(&self, error: Error) {
        let _ = self.tx.send(BundleEvent::Error(error));
    }
}

/// Stream of [`BundleEvent`]s for one bundling run.
///
/// End-of-stream (`None`) without a preceding [`BundleEvent::Error`] is the
/// success signal. After an error event the stream is terminal: further
/// polls return `None` regardless of what a misbehaving producer sent.
pub struct BundleStream {
    rx: mpsc::UnboundedReceiver<BundleEvent>,
    terminated: bool,
}

impl Stream for BundleStream {
    type Item = BundleEvent;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        if this.terminated {
            return Poll::Ready(None);
        }
        match this.rx.poll_recv(cx) {
            Poll::Ready(Some(event)) => {
                if matches!(event, BundleEvent::Error(_)) {
                    this.terminated = true;
                    this.rx.close();
                }
                Poll::Ready(Some(event))
            }
            other => other,
        }
    }
}

/// Configures a bundling run before spawning it.
pub struct BundleStreamBuilder {
    input: ConfigInput,
    engine: Option<Arc<dyn BundlerEngine>>,
    mode: EmitMode,
}

impl BundleStreamBuilder {
    pub fn new(input: impl Into<ConfigInput>) -> Self {
        Self {
            input: input.into(),
            engine: None,
            mode: EmitMode::default(),
        }
    }

    /// Substitute bundler engine. When set, deprecated configuration keys
    /// pass through unrenamed for compatibility with the substitute.
    pub fn engine(mut self, engine: Arc<dyn BundlerEngine>) -> Self {
        self.engine = Some(engine);
        self
    }

    /// Output serialization strategy (default: one chunk per artifact).
    pub fn emit_mode(mut self, mode: EmitMode) -> Self {
        self.mode = mode;
        self
    }

    /// Spawn the pipeline and return its stream.
    ///
    /// Must be called within a Tokio runtime. The stream is returned
    /// immediately; all failures, including configuration failures, arrive
    /// as a terminal [`BundleEvent::Error`].
    pub fn spawn(self) -> BundleStream {
        let Self { input, engine, mode } = self;
        let (tx, rx) = mpsc::unbounded_channel();
        let sink = EventSink::new(tx);

        tokio::spawn(async move {
            let outcome = async {
                let resolved = resolver::resolve(input, engine).await?;
                executor::run_pipeline(resolved, mode, &sink).await
            }
            .await;

            if let Err(error) = outcome {
                tracing::debug!(%error, "bundling pipeline failed");
                sink.error(error);
            }
        });

        BundleStream {
            rx,
            terminated: false,
        }
    }
}

/// Bundle with the default engine and emit mode.
///
/// Accepts a path to a configuration module or an in-memory configuration
/// (typed, raw record, or `serde_json::Value`). The returned stream yields
/// a `Bundle` event, zero or more `Warn` and `Chunk` events in engine
/// order, then either ends (success) or yields one terminal `Error`.
///
/// Must be called within a Tokio runtime; outside one this panics rather
/// than returning a stream. Within a runtime, all failures arrive as the
/// terminal error event.
pub fn bundle_stream(input: impl Into<ConfigInput>) -> BundleStream {
    BundleStreamBuilder::new(input).spawn()
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;
    use sluice_config::ConfigError;

    fn raw_stream() -> (EventSink, BundleStream) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            EventSink::new(tx),
            BundleStream {
                rx,
                terminated: false,
            },
        )
    }

    #[tokio::test]
    async fn stream_is_terminal_after_error() {
        let (sink, mut stream) = raw_stream();

        sink.error(Error::Config(ConfigError::InvalidShape));
        // A misbehaving producer keeps writing after the error.
        sink.chunk(OutputChunk {
            contents: b"late".to_vec(),
            map: None,
            path: PathBuf::from("late.js"),
            cwd: PathBuf::new(),
        });
        drop(sink);

        assert!(matches!(stream.next().await, Some(BundleEvent::Error(_))));
        assert!(stream.next().await.is_none());
    }

    #[tokio::test]
    async fn events_buffer_until_polled() {
        let (sink, mut stream) = raw_stream();
        sink.warn(Warning::new(None::<&str>, "early"));
        drop(sink);

        // The warning was sent before the first poll and is still observed.
        assert!(matches!(stream.next().await, Some(BundleEvent::Warn(_))));
        assert!(stream.next().await.is_none());
    }
}
