//! Knurl Core — the request execution pipeline.
//!
//! Takes a request description plus an environment snapshot, resolves
//! `{{variable}}` placeholders, applies the request's auth settings,
//! dispatches the resolved request to the engine for its protocol, and
//! returns a validated response.
//!
//! ```text
//! (Request, Environment) ──► Context ──► resolve-variables ──► authenticate ──► dispatch ──► Response
//!                                                                                   │
//!                                                                           EngineRegistry
//!                                                                     HttpEngine / WebSocketEngine
//! ```
//!
//! The crate renders nothing and persists nothing; collections and
//! environments are owned by the caller.

pub mod auth;
pub mod config;
pub mod engine;
pub mod error;
pub mod manager;
pub mod models;
pub mod phase;
pub mod pipeline;
pub mod resolve;
pub mod schema;

// Convenience re-exports
pub use config::EngineConfig;
pub use engine::{Engine, EngineRegistry, Protocol};
pub use error::{AuthError, EngineError, PhaseError, PipelineError, SchemaViolation};
pub use manager::{RequestManager, TrackedRequest};
pub use models::{
    AuthConfig, AuthPlacement, Context, Environment, Request, RequestBody, Response, ResponseData,
    Variable,
};
pub use pipeline::Pipeline;
