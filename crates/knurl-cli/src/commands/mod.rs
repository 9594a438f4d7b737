//! CLI command implementations.
//!
//! Each submodule corresponds to a top-level CLI command. Request and
//! environment files may be YAML or JSON; both go through the
//! knurl-core schema parsers before use.

pub mod check;
pub mod resolve;
pub mod send;

use knurl_core::schema;
use knurl_core::{Environment, Request};

fn read_document(kind: &str, path: &str) -> Result<serde_json::Value, String> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("Failed to read {} file '{}': {}", kind, path, e))?;
    serde_yaml::from_str(&content)
        .map_err(|e| format!("Failed to parse {} file '{}': {}", kind, path, e))
}

pub fn load_request(path: &str) -> Result<Request, String> {
    schema::parse_request(read_document("request", path)?).map_err(|e| e.to_string())
}

/// Load an environment file, or an empty environment when none is given.
pub fn load_environment(path: Option<&str>) -> Result<Environment, String> {
    match path {
        Some(path) => {
            schema::parse_environment(read_document("environment", path)?).map_err(|e| e.to_string())
        }
        None => Ok(Environment::empty()),
    }
}

/// Pretty-print a serializable value to stdout.
pub fn print_json<T: serde::Serialize>(value: &T) -> Result<(), String> {
    let text = serde_json::to_string_pretty(value)
        .map_err(|e| format!("Failed to serialize output: {}", e))?;
    println!("{}", text);
    Ok(())
}
