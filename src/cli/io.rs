//! JSON output for the CLI
//!
//! One JSON object per line on stdout. Logs go to stderr, so stdout can be
//! piped straight into a JSON consumer.

use std::io::{self, Write};
use std::path::Path;

use serde::Serialize;
use serde_json::Value;

use super::errors::CliResult;

/// Write a success response to stdout
pub fn write_response(data: Value) -> CliResult<()> {
    let response = serde_json::json!({
        "status": "ok",
        "data": data
    });
    write_json(&response)
}

/// Write an error response to stdout
pub fn write_error(code: &str, message: &str, path: Option<&Path>) -> CliResult<()> {
    let mut response = serde_json::json!({
        "status": "error",
        "code": code,
        "message": message
    });
    if let Some(path) = path {
        response["path"] = Value::String(path.display().to_string());
    }
    write_json(&response)
}

/// Write any serializable value as a single line
pub fn write_json<T: Serialize>(value: &T) -> CliResult<()> {
    let mut stdout = io::stdout().lock();
    serde_json::to_writer(&mut stdout, value)?;
    writeln!(stdout)?;
    stdout.flush()?;
    Ok(())
}
