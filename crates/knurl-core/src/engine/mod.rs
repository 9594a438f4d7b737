//! Protocol engines — one `Engine` implementation per protocol.
//!
//! # Architecture
//!
//! ```text
//! Request ──► Protocol::for_request ──► EngineRegistry ──► dyn Engine
//!                                                            │
//!                                        HttpEngine (reqwest) │ WebSocketEngine (placeholder)
//!                                                            ▼
//!                                                         Response
//! ```
//!
//! Engines are registered by protocol; the orchestrator never names a
//! concrete engine.

pub mod http;
pub mod registry;
pub mod websocket;

use std::fmt;
use std::future::Future;
use std::pin::Pin;

use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use crate::error::EngineError;
use crate::models::{Context, Request, Response};

pub use http::HttpEngine;
pub use registry::EngineRegistry;
pub use websocket::WebSocketEngine;

pub type EngineFuture = Pin<Box<dyn Future<Output = Result<Response, EngineError>> + Send>>;

/// Protocol identity of an engine and of the responses it produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    Http,
    WebSocket,
}

impl Protocol {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Http => "http",
            Self::WebSocket => "websocket",
        }
    }

    /// Selection rule: URL scheme first, then the declared method, else HTTP.
    /// Total and deterministic.
    pub fn for_request(request: &Request) -> Self {
        let url = request.url.trim_start();
        if let Some((scheme, _)) = url.split_once("://") {
            match scheme.to_ascii_lowercase().as_str() {
                "ws" | "wss" => return Self::WebSocket,
                "http" | "https" => return Self::Http,
                _ => {}
            }
        }
        match request.method.trim().to_ascii_uppercase().as_str() {
            "WS" | "WEBSOCKET" => Self::WebSocket,
            _ => Self::Http,
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The execution capability every protocol engine provides.
///
/// `execute` receives the resolved context and a cancellation token it is
/// expected to honor for any long-running I/O. The returned response's
/// `data` tag must equal `protocol()`.
pub trait Engine: Send + Sync {
    fn protocol(&self) -> Protocol;

    fn execute(&self, context: Context, cancel: CancellationToken) -> EngineFuture;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scheme_selects_protocol() {
        let ws = Request::new("c", "GET", "wss://echo.example.com/socket");
        let http = Request::new("c", "WS", "https://api.example.com");
        assert_eq!(Protocol::for_request(&ws), Protocol::WebSocket);
        // scheme wins over the declared method
        assert_eq!(Protocol::for_request(&http), Protocol::Http);
    }

    #[test]
    fn test_method_selects_protocol_without_known_scheme() {
        let ws = Request::new("c", "websocket", "{{socket_url}}");
        let plain = Request::new("c", "POST", "localhost:8080/items");
        assert_eq!(Protocol::for_request(&ws), Protocol::WebSocket);
        assert_eq!(Protocol::for_request(&plain), Protocol::Http);
    }

    #[test]
    fn test_protocol_display_matches_response_tag() {
        assert_eq!(Protocol::WebSocket.to_string(), "websocket");
        assert_eq!(
            serde_json::to_value(Protocol::Http).unwrap(),
            serde_json::json!("http")
        );
    }
}
