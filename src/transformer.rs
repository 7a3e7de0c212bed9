//! External transformer processes.
//!
//! A transformer tag `foo` names an executable `vclint-transform-foo` on
//! PATH. The process receives one JSON envelope line on stdin followed by
//! the binary-encoded AST, and replies on stdout with a JSON document of
//! diagnostics.

use std::io::Write;
use std::path::Path;
use std::process::{Command, Stdio};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::ast::Program;
use crate::codec::{Codec, CodecError};
use crate::diag::Severity;

pub const COMMAND_PREFIX: &str = "vclint-transform-";

#[derive(Debug, Error)]
pub enum TransformError {
    #[error("failed to spawn transformer `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("transformer `{command}` exited with {status}")]
    Failed {
        command: String,
        status: std::process::ExitStatus,
    },

    #[error("invalid transformer reply: {0}")]
    Reply(#[from] serde_json::Error),

    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[derive(Serialize)]
struct Envelope<'a> {
    working_directory: &'a str,
    files: &'a [String],
}

#[derive(Debug, Deserialize)]
pub struct TransformerReply {
    #[serde(default)]
    pub diagnostics: Vec<TransformerDiagnostic>,
}

#[derive(Debug, Deserialize)]
pub struct TransformerDiagnostic {
    pub severity: Severity,
    pub message: String,
}

pub struct Transformer {
    tag: String,
}

impl Transformer {
    pub fn new(tag: &str) -> Self {
        Transformer {
            tag: tag.to_string(),
        }
    }

    pub fn command_name(&self) -> String {
        format!("{COMMAND_PREFIX}{}", self.tag)
    }

    /// Feeds the program through the transformer and collects its
    /// diagnostics. Callers treat a failure here as reportable, not fatal
    /// to linting.
    pub fn run(
        &self,
        program: &Program,
        working_directory: &Path,
        files: &[String],
    ) -> Result<TransformerReply, TransformError> {
        let command = self.command_name();
        debug!(command = %command, files = files.len(), "spawning transformer");

        let mut child = Command::new(&command)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .spawn()
            .map_err(|source| TransformError::Spawn {
                command: command.clone(),
                source,
            })?;

        {
            // Scope closes stdin so the transformer sees end of stream.
            let mut stdin = child.stdin.take().ok_or_else(|| {
                std::io::Error::new(std::io::ErrorKind::BrokenPipe, "no stdin handle")
            })?;
            let cwd = working_directory.display().to_string();
            let envelope = Envelope {
                working_directory: &cwd,
                files,
            };
            serde_json::to_writer(&mut stdin, &envelope)?;
            stdin.write_all(b"\n")?;
            Codec::new().encode_program(&mut stdin, program)?;
        }

        let output = child.wait_with_output()?;
        if !output.status.success() {
            return Err(TransformError::Failed {
                command,
                status: output.status,
            });
        }
        let reply: TransformerReply = serde_json::from_slice(&output.stdout)?;
        debug!(
            command = %command,
            diagnostics = reply.diagnostics.len(),
            "transformer finished"
        );
        Ok(reply)
    }
}
