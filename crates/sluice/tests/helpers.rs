//! Shared test utilities for sluice integration tests.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use sluice::{
    Artifact, BundleEvent, BundleHandle, BundleStream, BundlerEngine, EngineDiagnostic,
    InputOptions, OutputOptions, Warning,
};

/// Scripted engine: returns canned artifacts and warnings, records every
/// input and output section it is handed.
#[derive(Default)]
pub struct StubEngine {
    artifacts: Vec<Artifact>,
    warnings: Vec<Warning>,
    fail_build: bool,
    fail_generate: bool,
    pub seen_inputs: Mutex<Vec<InputOptions>>,
    pub seen_outputs: Arc<Mutex<Vec<OutputOptions>>>,
}

impl StubEngine {
    pub fn with_artifacts(artifacts: Vec<Artifact>) -> Self {
        Self {
            artifacts,
            ..Self::default()
        }
    }

    pub fn warning(mut self, warning: Warning) -> Self {
        self.warnings.push(warning);
        self
    }

    pub fn failing_build() -> Self {
        Self {
            fail_build: true,
            ..Self::default()
        }
    }

    pub fn failing_generate() -> Self {
        Self {
            fail_generate: true,
            ..Self::default()
        }
    }

    /// Entry point string of the `n`th build call.
    pub fn entry_of_build(&self, n: usize) -> String {
        let inputs = self.seen_inputs.lock().expect("inputs lock");
        inputs[n].input.first().expect("entry recorded").to_string()
    }

    pub fn build_count(&self) -> usize {
        self.seen_inputs.lock().expect("inputs lock").len()
    }

    pub fn output_of_generate(&self, n: usize) -> OutputOptions {
        self.seen_outputs.lock().expect("outputs lock")[n].clone()
    }
}

#[async_trait]
impl BundlerEngine for StubEngine {
    async fn build(&self, input: &InputOptions) -> sluice::Result<Arc<dyn BundleHandle>> {
        self.seen_inputs
            .lock()
            .expect("inputs lock")
            .push(input.clone());

        if self.fail_build {
            return Err(sluice::Error::Build(vec![EngineDiagnostic {
                code: Some("UNRESOLVED_ENTRY".to_string()),
                message: "scripted build failure".to_string(),
            }]));
        }

        Ok(Arc::new(StubHandle {
            artifacts: self.artifacts.clone(),
            warnings: self.warnings.clone(),
            on_warn: input.on_warn.clone(),
            fail_generate: self.fail_generate,
            seen_outputs: Arc::clone(&self.seen_outputs),
        }))
    }
}

struct StubHandle {
    artifacts: Vec<Artifact>,
    warnings: Vec<Warning>,
    on_warn: Option<sluice::WarnHandler>,
    fail_generate: bool,
    seen_outputs: Arc<Mutex<Vec<OutputOptions>>>,
}

#[async_trait]
impl BundleHandle for StubHandle {
    async fn generate(&self, output: &OutputOptions) -> sluice::Result<Vec<Artifact>> {
        self.seen_outputs
            .lock()
            .expect("outputs lock")
            .push(output.clone());

        if self.fail_generate {
            return Err(sluice::Error::Generate(
                "scripted generate failure".to_string(),
            ));
        }

        if let Some(handler) = &self.on_warn {
            for warning in &self.warnings {
                handler(warning);
            }
        }

        Ok(self.artifacts.clone())
    }
}

/// Drain a stream to completion and return every event in order.
pub async fn collect_events(stream: BundleStream) -> Vec<BundleEvent> {
    use futures::StreamExt;
    stream.collect().await
}

pub fn chunk_texts(events: &[BundleEvent]) -> Vec<String> {
    events
        .iter()
        .filter_map(|event| match event {
            BundleEvent::Chunk(chunk) => Some(chunk.contents_str().into_owned()),
            _ => None,
        })
        .collect()
}

pub fn error_count(events: &[BundleEvent]) -> usize {
    events
        .iter()
        .filter(|e| matches!(e, BundleEvent::Error(_)))
        .count()
}

pub fn warn_messages(events: &[BundleEvent]) -> Vec<String> {
    events
        .iter()
        .filter_map(|event| match event {
            BundleEvent::Warn(warning) => Some(warning.message.clone()),
            _ => None,
        })
        .collect()
}
