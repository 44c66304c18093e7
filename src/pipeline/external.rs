// src/pipeline/external.rs

//! Shell command used as a pipeline step.

use std::io::Write;
use std::process::{Command, Stdio};

use tracing::{debug, info};

use super::{Artifact, Transform, TransformError};

/// Pipes the artifact through `sh -c <cmd>` (or `cmd /C` on Windows).
///
/// The buffer is written to the child's stdin and its stdout becomes the new
/// contents. A non-zero exit fails the step with the child's stderr.
#[derive(Debug, Clone)]
pub struct ExternalFilter {
    step_name: String,
    cmd: String,
}

impl ExternalFilter {
    pub fn new(step_name: impl Into<String>, cmd: impl Into<String>) -> Self {
        Self {
            step_name: step_name.into(),
            cmd: cmd.into(),
        }
    }

    fn command(&self) -> Command {
        if cfg!(windows) {
            let mut c = Command::new("cmd");
            c.arg("/C").arg(&self.cmd);
            c
        } else {
            let mut c = Command::new("sh");
            c.arg("-c").arg(&self.cmd);
            c
        }
    }
}

impl Transform for ExternalFilter {
    fn name(&self) -> &str {
        &self.step_name
    }

    fn apply(&self, input: Artifact) -> Result<Artifact, TransformError> {
        info!(step = %self.step_name, cmd = %self.cmd, artifact = %input.name, "running external tool");

        let fail = |message: String| TransformError::Message {
            file: input.name.clone(),
            message,
        };

        let mut child = self
            .command()
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| fail(format!("spawning '{}': {e}", self.cmd)))?;

        // Feed stdin from another thread so a chatty child can't deadlock us
        // on a full stdout pipe.
        let writer = child.stdin.take().map(|mut stdin| {
            let data = input.contents.clone();
            std::thread::spawn(move || stdin.write_all(&data))
        });

        let output = child
            .wait_with_output()
            .map_err(|e| fail(format!("waiting for '{}': {e}", self.cmd)))?;

        if let Some(handle) = writer {
            match handle.join() {
                Ok(Ok(())) => {}
                Ok(Err(e)) => debug!(error = %e, "external tool closed stdin early"),
                Err(_) => return Err(fail("stdin writer thread panicked".to_string())),
            }
        }

        if !output.status.success() {
            let code = output.status.code().unwrap_or(-1);
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(fail(format!(
                "'{}' exited with code {code}: {}",
                self.cmd,
                stderr.trim()
            )));
        }

        Ok(input.with_contents(output.stdout))
    }
}
