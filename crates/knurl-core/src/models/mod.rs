//! Contract types threaded through the pipeline.
//!
//! All types serialize with `camelCase` field names so request and
//! environment documents written by the collection store can be loaded
//! as-is.

pub mod auth;
pub mod context;
pub mod environment;
pub mod request;
pub mod response;
pub mod variable;

pub use auth::*;
pub use context::*;
pub use environment::*;
pub use request::*;
pub use response::*;
pub use variable::*;
