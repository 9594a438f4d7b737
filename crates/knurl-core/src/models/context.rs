use serde::{Deserialize, Serialize};

use crate::models::environment::Environment;
use crate::models::request::Request;
use crate::models::response::Response;

/// Per-run bundle handed from phase to phase.
///
/// A context is built fresh for every run and owns its environment, so
/// later edits to the caller's environment never reach an in-flight run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Context {
    pub request: Request,
    pub environment: Environment,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<Response>,
}

impl Context {
    pub fn new(request: Request, environment: Environment) -> Self {
        Self {
            request,
            environment,
            response: None,
        }
    }

    pub fn request_id(&self) -> &str {
        &self.request.id
    }

    pub fn with_request(self, request: Request) -> Self {
        Self { request, ..self }
    }

    pub fn with_response(self, response: Response) -> Self {
        Self {
            response: Some(response),
            ..self
        }
    }
}
