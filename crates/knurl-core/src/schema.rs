//! Validating parsers for values crossing a trust boundary.
//!
//! Engine output and collaborator input arrive as loosely-typed JSON; each
//! parser here either yields a contract type that passed every check or a
//! `SchemaViolation`. There is no coercion and no recovery.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::SchemaViolation;
use crate::models::{Environment, Request, Response, Variable};

fn parse<T: DeserializeOwned>(entity: &'static str, candidate: Value) -> Result<T, SchemaViolation> {
    serde_json::from_value(candidate).map_err(|e| SchemaViolation::new(entity, e.to_string()))
}

pub fn parse_variable(candidate: Value) -> Result<Variable, SchemaViolation> {
    let variable: Variable = parse("variable", candidate)?;
    variable.validate()?;
    Ok(variable)
}

pub fn parse_environment(candidate: Value) -> Result<Environment, SchemaViolation> {
    let environment: Environment = parse("environment", candidate)?;
    environment.validate()?;
    Ok(environment)
}

pub fn parse_request(candidate: Value) -> Result<Request, SchemaViolation> {
    let request: Request = parse("request", candidate)?;
    request.validate()?;
    Ok(request)
}

/// Parse an engine's response. Rejects missing fields, wrong primitive
/// types, negative sizes or durations, unparseable timestamps, and a `data`
/// tag whose payload has another protocol's shape.
pub fn parse_response(candidate: Value) -> Result<Response, SchemaViolation> {
    let response: Response = parse("response", candidate)?;
    response.validate()?;
    Ok(response)
}
