//! Output serialization strategies.
//!
//! One orchestrator, three serializations: the canonical object stream
//! (one chunk per artifact), a single-artifact object stream, and a
//! raw-bytes rendition that folds the source map into a trailing comment.
//! Each is an [`ArtifactEmitter`] the orchestrator drives identically.

use std::path::PathBuf;

use crate::engine::Artifact;
use crate::stream::{EventSink, OutputChunk};
use crate::{Error, Result};

/// Output serialization strategy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EmitMode {
    /// One chunk event per artifact, in engine order. The canonical mode.
    #[default]
    Chunks,
    /// Exactly one chunk; a second artifact is a generate error. Chunks
    /// already delivered stand.
    SingleChunk,
    /// One chunk whose contents are the code followed by a base64
    /// source-map data URI comment when a map was produced. The map field
    /// itself is left empty.
    RawBytes,
}

impl EmitMode {
    pub(crate) fn emitter(self) -> Box<dyn ArtifactEmitter> {
        match self {
            EmitMode::Chunks => Box::new(ChunkObjects),
            EmitMode::SingleChunk => Box::new(SingleObject { emitted: false }),
            EmitMode::RawBytes => Box::new(RawBytes { emitted: false }),
        }
    }
}

/// Per-run context shared by every emitted chunk.
pub(crate) struct EmitContext {
    /// Virtual path assigned to emitted chunks.
    pub path: PathBuf,
    pub cwd: PathBuf,
}

pub(crate) trait ArtifactEmitter: Send {
    fn emit(&mut self, artifact: Artifact, ctx: &EmitContext, sink: &EventSink) -> Result<()>;
}

struct ChunkObjects;

impl ArtifactEmitter for ChunkObjects {
    fn emit(&mut self, artifact: Artifact, ctx: &EmitContext, sink: &EventSink) -> Result<()> {
        sink.chunk(OutputChunk {
            contents: artifact.code.into_bytes(),
            map: artifact.map,
            path: ctx.path.clone(),
            cwd: ctx.cwd.clone(),
        });
        Ok(())
    }
}

struct SingleObject {
    emitted: bool,
}

impl ArtifactEmitter for SingleObject {
    fn emit(&mut self, artifact: Artifact, ctx: &EmitContext, sink: &EventSink) -> Result<()> {
        if self.emitted {
            return Err(Error::Generate(
                "single-chunk emit mode received more than one artifact; \
                 use the chunk-stream mode for multi-output configurations"
                    .to_string(),
            ));
        }
        self.emitted = true;
        sink.chunk(OutputChunk {
            contents: artifact.code.into_bytes(),
            map: artifact.map,
            path: ctx.path.clone(),
            cwd: ctx.cwd.clone(),
        });
        Ok(())
    }
}

struct RawBytes {
    emitted: bool,
}

impl ArtifactEmitter for RawBytes {
    fn emit(&mut self, artifact: Artifact, ctx: &EmitContext, sink: &EventSink) -> Result<()> {
        if self.emitted {
            return Err(Error::Generate(
                "raw-bytes emit mode received more than one artifact".to_string(),
            ));
        }
        self.emitted = true;

        let mut contents = artifact.code.into_bytes();
        if let Some(map) = &artifact.map {
            contents.extend_from_slice(sourcemap_comment(map).as_bytes());
        }

        sink.chunk(OutputChunk {
            contents,
            map: None,
            path: ctx.path.clone(),
            cwd: ctx.cwd.clone(),
        });
        Ok(())
    }
}

fn sourcemap_comment(map: &str) -> String {
    let encoded = base64_simd::STANDARD.encode_to_string(map.as_bytes());
    format!("\n//# sourceMappingURL=data:application/json;charset=utf-8;base64,{encoded}\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stream::{BundleEvent, EventSink};
    use tokio::sync::mpsc;

    fn sink() -> (EventSink, mpsc::UnboundedReceiver<BundleEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (EventSink::new(tx), rx)
    }

    fn ctx() -> EmitContext {
        EmitContext {
            path: PathBuf::from("entry.js"),
            cwd: PathBuf::from("/work"),
        }
    }

    fn chunk(event: BundleEvent) -> OutputChunk {
        match event {
            BundleEvent::Chunk(chunk) => chunk,
            other => panic!("expected chunk, got {other:?}"),
        }
    }

    #[test]
    fn chunk_mode_emits_every_artifact() {
        let (sink, mut rx) = sink();
        let mut emitter = EmitMode::Chunks.emitter();

        emitter.emit(Artifact::new("a.js", "a"), &ctx(), &sink).unwrap();
        emitter.emit(Artifact::new("b.js", "b"), &ctx(), &sink).unwrap();

        assert_eq!(chunk(rx.try_recv().unwrap()).contents, b"a");
        assert_eq!(chunk(rx.try_recv().unwrap()).contents, b"b");
    }

    #[test]
    fn single_mode_rejects_second_artifact() {
        let (sink, mut rx) = sink();
        let mut emitter = EmitMode::SingleChunk.emitter();

        emitter.emit(Artifact::new("a.js", "a"), &ctx(), &sink).unwrap();
        let err = emitter
            .emit(Artifact::new("b.js", "b"), &ctx(), &sink)
            .unwrap_err();

        assert!(matches!(err, Error::Generate(_)));
        // The first chunk stands.
        assert_eq!(chunk(rx.try_recv().unwrap()).contents, b"a");
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn raw_mode_appends_sourcemap_comment() {
        let (sink, mut rx) = sink();
        let mut emitter = EmitMode::RawBytes.emitter();

        emitter
            .emit(
                Artifact::new("a.js", "x=1;").with_map(r#"{"version":3}"#),
                &ctx(),
                &sink,
            )
            .unwrap();

        let chunk = chunk(rx.try_recv().unwrap());
        let text = chunk.contents_str();
        assert!(text.starts_with("x=1;"));
        assert!(text.contains("//# sourceMappingURL=data:application/json;charset=utf-8;base64,"));
        assert!(chunk.map.is_none());
    }

    #[test]
    fn raw_mode_without_map_is_code_only() {
        let (sink, mut rx) = sink();
        let mut emitter = EmitMode::RawBytes.emitter();

        emitter.emit(Artifact::new("a.js", "x=1;"), &ctx(), &sink).unwrap();
        assert_eq!(chunk(rx.try_recv().unwrap()).contents, b"x=1;");
    }
}
