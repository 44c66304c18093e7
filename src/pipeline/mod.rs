// src/pipeline/mod.rs

//! Ordered, fail-fast transform pipelines over in-memory buffers.
//!
//! A builder is expressed as a list of [`Transform`] steps: the output of
//! step N is the input of step N+1, and the first failing step aborts the
//! run. Writing the final buffer is done by [`write_artifact`], the sink.
//!
//! - [`external`] wraps a shell command as a transform (stdin -> stdout).

pub mod external;

use std::fmt;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

use crate::fs::FileSystem;

/// In-memory file travelling through a pipeline.
#[derive(Clone, PartialEq, Eq)]
pub struct Artifact {
    /// File name (or source path) the buffer is known by; used in diagnostics
    /// and by the sink as the output file name.
    pub name: String,
    pub contents: Vec<u8>,
}

impl Artifact {
    pub fn new(name: impl Into<String>, contents: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            contents: contents.into(),
        }
    }

    /// Load an artifact from disk, naming it after the file.
    pub fn read(fs: &dyn FileSystem, path: &Path) -> anyhow::Result<Self> {
        let contents = fs.read(path)?;
        Ok(Self::new(path.to_string_lossy().into_owned(), contents))
    }

    /// Contents as UTF-8 text.
    pub fn text(&self) -> Result<&str, TransformError> {
        std::str::from_utf8(&self.contents).map_err(|e| TransformError::Message {
            file: self.name.clone(),
            message: format!("not valid UTF-8: {e}"),
        })
    }

    /// Same name, new contents.
    pub fn with_contents(self, contents: impl Into<Vec<u8>>) -> Self {
        Self {
            name: self.name,
            contents: contents.into(),
        }
    }
}

impl fmt::Debug for Artifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Artifact")
            .field("name", &self.name)
            .field("len", &self.contents.len())
            .finish()
    }
}

/// Failure of a single transform step.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransformError {
    /// Tool diagnostic with a source location.
    #[error("{file}:{line}:{column}: {message}")]
    Located {
        file: String,
        line: u32,
        column: u32,
        message: String,
    },

    /// An `@import` (or similar) reference that could not be found.
    #[error("{file}:{line}: can't find '{reference}' to import")]
    UnresolvedImport {
        file: String,
        line: u32,
        reference: String,
    },

    /// Diagnostic without a location.
    #[error("{file}: {message}")]
    Message { file: String, message: String },
}

/// A step failed; names the step so logs say where the pipeline stopped.
#[derive(Debug, Error)]
#[error("step '{step}' failed")]
pub struct PipelineError {
    pub step: String,
    #[source]
    pub source: TransformError,
}

/// A pure step over an artifact buffer.
pub trait Transform: Send + Sync {
    /// Short step name used in logs and errors.
    fn name(&self) -> &str;

    fn apply(&self, input: Artifact) -> Result<Artifact, TransformError>;
}

/// Ordered list of transforms.
#[derive(Default)]
pub struct Pipeline {
    steps: Vec<Box<dyn Transform>>,
}

impl fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.steps.iter().map(|s| s.name()))
            .finish()
    }
}

impl Pipeline {
    pub fn new() -> Self {
        Self { steps: Vec::new() }
    }

    /// Append a step.
    pub fn then(mut self, step: impl Transform + 'static) -> Self {
        self.steps.push(Box::new(step));
        self
    }

    /// Step names, in order.
    pub fn step_names(&self) -> Vec<&str> {
        self.steps.iter().map(|s| s.name()).collect()
    }

    /// Run every step in order, stopping at the first failure.
    pub fn run(&self, input: Artifact) -> Result<Artifact, PipelineError> {
        let mut current = input;
        for step in &self.steps {
            let before = current.contents.len();
            current = step.apply(current).map_err(|source| PipelineError {
                step: step.name().to_string(),
                source,
            })?;
            debug!(
                step = step.name(),
                artifact = %current.name,
                bytes_in = before,
                bytes_out = current.contents.len(),
                "pipeline step finished"
            );
        }
        Ok(current)
    }
}

/// Give the artifact its final output file name.
#[derive(Debug, Clone)]
pub struct Rename {
    file_name: String,
}

impl Rename {
    pub fn new(file_name: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
        }
    }
}

impl Transform for Rename {
    fn name(&self) -> &str {
        "rename"
    }

    fn apply(&self, input: Artifact) -> Result<Artifact, TransformError> {
        Ok(Artifact {
            name: self.file_name.clone(),
            contents: input.contents,
        })
    }
}

/// Sink: write the artifact into `dest_dir` under its (file) name.
pub fn write_artifact(
    fs: &dyn FileSystem,
    dest_dir: &Path,
    artifact: &Artifact,
) -> anyhow::Result<PathBuf> {
    let file_name = Path::new(&artifact.name)
        .file_name()
        .map(|n| n.to_os_string())
        .ok_or_else(|| anyhow::anyhow!("artifact '{}' has no file name", artifact.name))?;
    let target = dest_dir.join(file_name);
    fs.write(&target, &artifact.contents)?;
    debug!(path = ?target, bytes = artifact.contents.len(), "artifact written");
    Ok(target)
}
