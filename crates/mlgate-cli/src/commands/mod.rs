//! CLI command implementations

use std::io::Read;
use std::path::Path;
use std::process::ExitCode;

use anyhow::{Context, Result};
use serde_json::Value as JsonValue;

use mlgate_runtime::RuntimeError;

pub mod backends;
pub mod endpoint;
pub mod initialise;
pub mod notify;
pub mod validate;

/// Exit code for a model that did not clear its minimum.
pub const EXIT_NOT_VALIDATED: u8 = 2;

/// What a command produced.
#[derive(Debug)]
pub enum Outcome {
    /// Handler output to print as JSON
    Output(JsonValue),
    /// Handler failure, rendered as the workflow error object
    Failed(RuntimeError),
}

impl Outcome {
    pub fn from_result(result: Result<JsonValue, RuntimeError>) -> Self {
        match result {
            Ok(value) => Outcome::Output(value),
            Err(e) => Outcome::Failed(e),
        }
    }

    /// Exit code without printing anything.
    pub fn exit_code(&self) -> u8 {
        match self {
            Outcome::Output(_) => 0,
            Outcome::Failed(e) if e.error_type() == "ValidationFailedError" => EXIT_NOT_VALIDATED,
            Outcome::Failed(_) => 1,
        }
    }

    /// Print to stdout and return the process exit code.
    pub fn report(self) -> ExitCode {
        let code = self.exit_code();
        let value = match self {
            Outcome::Output(value) => value,
            Outcome::Failed(e) => e.to_error_payload(),
        };
        println!(
            "{}",
            serde_json::to_string_pretty(&value).unwrap_or_else(|_| value.to_string())
        );
        ExitCode::from(code)
    }
}

/// Read a JSON event from a file, or from stdin when the path is `-`.
pub fn read_event(path: &Path) -> Result<JsonValue> {
    let contents = if path == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("reading event from stdin")?;
        buf
    } else {
        std::fs::read_to_string(path)
            .with_context(|| format!("reading event {}", path.display()))?
    };

    serde_json::from_str(&contents).context("event is not valid JSON")
}
