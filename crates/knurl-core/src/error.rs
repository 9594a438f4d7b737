//! Error types for the Knurl request pipeline.
//!
//! Three layers, innermost first:
//!
//! - `SchemaViolation` — a value failed the contract layer (engine bug or
//!   malformed collaborator input).
//! - `EngineError` — an engine could not complete its protocol operation.
//! - `PipelineError` — what callers of `Pipeline::run` receive; always names
//!   the request and, for phase failures, the phase that failed.
//!
//! Missing or disabled variables are never errors.

use crate::engine::Protocol;

/// A value that does not conform to the request/response contract.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid {entity}: {reason}")]
pub struct SchemaViolation {
    /// Contract entity being validated ("response", "request", ...)
    pub entity: &'static str,
    pub reason: String,
}

impl SchemaViolation {
    pub fn new(entity: &'static str, reason: impl Into<String>) -> Self {
        Self {
            entity,
            reason: reason.into(),
        }
    }
}

/// Failure raised by an engine while executing a request.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("Request {request_id} timed out after {timeout_secs}s")]
    Timeout { request_id: String, timeout_secs: u64 },

    #[error("Connection refused for request {request_id}: {cause}")]
    ConnectionRefused { request_id: String, cause: String },

    #[error("Invalid target for request {request_id}: {cause}")]
    InvalidTarget { request_id: String, cause: String },

    #[error("HTTP error for request {request_id}: {cause}")]
    Http { request_id: String, cause: String },

    #[error("I/O error for request {request_id}: {cause}")]
    Io { request_id: String, cause: String },

    #[error("Request {request_id} was cancelled")]
    Cancelled { request_id: String },

    #[error("Unsupported request {request_id}: {cause}")]
    Unsupported { request_id: String, cause: String },
}

impl EngineError {
    pub fn request_id(&self) -> &str {
        match self {
            EngineError::Timeout { request_id, .. }
            | EngineError::ConnectionRefused { request_id, .. }
            | EngineError::InvalidTarget { request_id, .. }
            | EngineError::Http { request_id, .. }
            | EngineError::Io { request_id, .. }
            | EngineError::Cancelled { request_id }
            | EngineError::Unsupported { request_id, .. } => request_id,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, EngineError::Cancelled { .. })
    }
}

/// A request's auth settings could not be applied.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("{auth} credential placed in {placement} needs a name")]
    MissingName {
        auth: &'static str,
        placement: &'static str,
    },

    #[error("Cannot add a {auth} credential to a {body} body")]
    UnsupportedBody { auth: &'static str, body: &'static str },

    #[error("JSON body must be an object to carry a credential: {0}")]
    InvalidJsonBody(String),

    #[error("{0} auth is not supported")]
    Unsupported(&'static str),
}

/// Failure of a single phase, before the orchestrator tags it.
#[derive(Debug, thiserror::Error)]
pub enum PhaseError {
    #[error("{engine} engine failed: {source}")]
    Engine {
        engine: Protocol,
        #[source]
        source: EngineError,
    },

    #[error("No engine registered for protocol '{0}'")]
    NoEngine(Protocol),

    #[error("{engine} engine produced a '{produced}' response")]
    ProtocolMismatch { engine: Protocol, produced: Protocol },

    #[error("Authentication failed: {0}")]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Schema(#[from] SchemaViolation),

    #[error("{0}")]
    Failed(String),
}

/// Error returned to callers of the pipeline.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("Phase '{phase}' failed for request {request_id}: {source}")]
    Phase {
        phase: String,
        request_id: String,
        #[source]
        source: PhaseError,
    },

    #[error("Request {request_id} was cancelled before phase '{phase}'")]
    Cancelled { request_id: String, phase: String },

    #[error("Pipeline finished without a response for request {request_id}")]
    MissingResponse { request_id: String },

    #[error("Response for request {request_id} violates the contract: {source}")]
    Contract {
        request_id: String,
        #[source]
        source: SchemaViolation,
    },
}

impl PipelineError {
    /// Request id of the failed run.
    pub fn request_id(&self) -> &str {
        match self {
            PipelineError::Phase { request_id, .. }
            | PipelineError::Cancelled { request_id, .. }
            | PipelineError::MissingResponse { request_id }
            | PipelineError::Contract { request_id, .. } => request_id,
        }
    }

    /// Name of the phase that failed, if the failure came from a phase.
    pub fn phase(&self) -> Option<&str> {
        match self {
            PipelineError::Phase { phase, .. } | PipelineError::Cancelled { phase, .. } => {
                Some(phase)
            }
            _ => None,
        }
    }

    /// The underlying engine failure, if an engine caused the abort.
    pub fn engine_error(&self) -> Option<&EngineError> {
        match self {
            PipelineError::Phase {
                source: PhaseError::Engine { source, .. },
                ..
            } => Some(source),
            _ => None,
        }
    }

    /// True when the run stopped because of a cancellation signal.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, PipelineError::Cancelled { .. })
            || self.engine_error().is_some_and(EngineError::is_cancelled)
    }
}
