//! JSON I/O handling for CLI
//!
//! - Input: one JSON document from a file or stdin
//! - Output: one JSON object on stdout
//! - UTF-8 only

use std::fs;
use std::io::{self, Read, Write};
use std::path::Path;

use serde_json::{json, Value};

use super::errors::{CliError, CliResult};

/// Reads the document to validate.
pub fn read_input(path: Option<&Path>) -> CliResult<Value> {
    let content = match path {
        Some(path) => fs::read_to_string(path).map_err(|e| {
            CliError::io_error(format!("Failed to read {}: {}", path.display(), e))
        })?,
        None => {
            let mut buffer = String::new();
            io::stdin().lock().read_to_string(&mut buffer)?;
            buffer
        }
    };
    parse_input(&content)
}

fn parse_input(content: &str) -> CliResult<Value> {
    if content.trim().is_empty() {
        return Err(CliError::invalid_input("Empty input"));
    }
    serde_json::from_str(content).map_err(|e| CliError::invalid_input(format!("Invalid JSON: {}", e)))
}

fn ok_body(data: Value) -> Value {
    json!({
        "status": "ok",
        "data": data
    })
}

fn error_body(err: &CliError) -> Value {
    let mut body = json!({
        "status": "error",
        "code": err.code_str(),
        "message": err.message()
    });
    if !err.issues().is_empty() {
        body["issues"] = serde_json::to_value(err.issues()).unwrap_or(Value::Null);
    }
    body
}

fn write_line(body: &Value) -> CliResult<()> {
    let mut stdout = io::stdout();
    serde_json::to_writer(&mut stdout, body)?;
    writeln!(stdout)?;
    stdout.flush()?;
    Ok(())
}

/// Writes a success response to stdout
pub fn write_response(data: Value) -> CliResult<()> {
    write_line(&ok_body(data))
}

/// Writes an error response to stdout
pub fn write_error(err: &CliError) -> CliResult<()> {
    write_line(&error_body(err))
}
