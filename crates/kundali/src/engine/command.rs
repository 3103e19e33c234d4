//! Engine bridge over a child process speaking line-delimited JSON.
//!
//! Each `validate` and `generate` call spawns the configured program, writes
//! one JSON request to its stdin and reads one JSON document from its stdout:
//!
//! ```text
//! {"op":"validate","birthdata":{"name":"..","year":"1991",..}}
//!   -> {"status":"SUCCESS","valid":true,"birthdata":{..}}
//! {"op":"generate","birthdata":{..},"output":"dictionary"}
//!   -> {"D1":{..},"D9":{..}} | "INPUT_ERROR" | null
//! ```
//!
//! `reset` and `submit` never leave this process; the submitted record is
//! carried in the next `validate` request.

use super::{AstroEngine, EngineFields, EngineOutput, OutputMode};
use crate::error::EngineError;
use log::{debug, error};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::io::{ErrorKind, Write};
use std::path::PathBuf;
use std::process::{Command, Stdio};

#[derive(Debug, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
enum Request<'a> {
    Validate {
        birthdata: &'a EngineFields,
    },
    Generate {
        birthdata: &'a Value,
        output: OutputMode,
    },
}

#[derive(Debug, Clone, Deserialize)]
struct ValidateReply {
    status: String,
    #[serde(default)]
    valid: bool,
    #[serde(default)]
    birthdata: Option<Value>,
}

pub struct CommandEngine {
    program: String,
    args: Vec<String>,
    working_dir: Option<PathBuf>,
    pending: Option<EngineFields>,
    verdict: Option<ValidateReply>,
}

impl CommandEngine {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
            working_dir: None,
            pending: None,
            verdict: None,
        }
    }

    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    fn call(&self, request: &Request<'_>) -> Result<Value, EngineError> {
        let payload =
            serde_json::to_string(request).map_err(|e| EngineError::Protocol(e.to_string()))?;

        let mut command = Command::new(&self.program);
        command
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if let Some(dir) = &self.working_dir {
            command.current_dir(dir);
        }

        let mut child = command.spawn().map_err(|source| EngineError::Spawn {
            program: self.program.clone(),
            source,
        })?;

        // Dropping stdin closes the pipe so the child sees EOF. A child that
        // exits without reading is judged by its exit status below.
        if let Some(mut stdin) = child.stdin.take() {
            if let Err(e) = writeln!(stdin, "{payload}") {
                if e.kind() != ErrorKind::BrokenPipe {
                    return Err(e.into());
                }
            }
        }

        let output = child.wait_with_output()?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            error!("engine program {} failed: {}", self.program, stderr);
            return Err(EngineError::Exit {
                program: self.program.clone(),
                status: output.status.to_string(),
                stderr,
            });
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        serde_json::from_str(stdout.trim()).map_err(|e| {
            EngineError::Protocol(format!("{e} (reply was {:?})", truncate(stdout.trim(), 200)))
        })
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}

impl AstroEngine for CommandEngine {
    fn reset(&mut self) {
        self.pending = None;
        self.verdict = None;
    }

    fn submit(&mut self, fields: &EngineFields) -> Result<(), EngineError> {
        self.pending = Some(fields.clone());
        self.verdict = None;
        Ok(())
    }

    fn validate(&mut self) -> Result<String, EngineError> {
        let fields = self
            .pending
            .as_ref()
            .ok_or(EngineError::OutOfOrder("validate called before submit"))?;
        debug!("engine {}: validate {}", self.program, fields.name);

        let reply = self.call(&Request::Validate { birthdata: fields })?;
        let reply: ValidateReply = serde_json::from_value(reply)
            .map_err(|e| EngineError::Protocol(format!("validate reply: {e}")))?;
        let status = reply.status.clone();
        self.verdict = Some(reply);
        Ok(status)
    }

    fn is_valid(&self) -> bool {
        self.verdict.as_ref().is_some_and(|v| v.valid)
    }

    fn birth_data(&self) -> Option<Value> {
        let verdict = self.verdict.as_ref()?;
        verdict.birthdata.clone().or_else(|| {
            self.pending
                .as_ref()
                .and_then(|fields| serde_json::to_value(fields).ok())
        })
    }

    fn generate(
        &mut self,
        birth_data: &Value,
        mode: OutputMode,
    ) -> Result<EngineOutput, EngineError> {
        debug!("engine {}: generate ({:?})", self.program, mode);
        let reply = self.call(&Request::Generate {
            birthdata: birth_data,
            output: mode,
        })?;
        EngineOutput::from_json(reply)
    }
}
