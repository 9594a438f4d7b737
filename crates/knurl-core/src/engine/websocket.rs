//! WebSocket engine placeholder.
//!
//! Opens no socket: every execution reports `Connected` immediately. The
//! response shape and the `Engine` contract are what callers rely on.

use tokio_util::sync::CancellationToken;

use crate::config::EngineConfig;
use crate::engine::{Engine, EngineFuture, Protocol};
use crate::error::EngineError;
use crate::models::{Context, Response, ResponseData, WebSocketResponseData};

pub const CONNECTED_STATUS: &str = "Connected";

pub struct WebSocketEngine {
    response_time_ms: u64,
}

impl WebSocketEngine {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            response_time_ms: config.websocket_response_time_ms,
        }
    }
}

impl Engine for WebSocketEngine {
    fn protocol(&self) -> Protocol {
        Protocol::WebSocket
    }

    fn execute(&self, context: Context, cancel: CancellationToken) -> EngineFuture {
        let response_time = self.response_time_ms;
        Box::pin(async move {
            let request_id = context.request.id;
            if cancel.is_cancelled() {
                return Err(EngineError::Cancelled { request_id });
            }

            tracing::info!(
                "[WebSocketEngine] Connecting to {} (request {})",
                context.request.url,
                request_id
            );

            Ok(Response::new(
                request_id,
                response_time,
                0,
                ResponseData::WebSocket(WebSocketResponseData {
                    status: CONNECTED_STATUS.to_string(),
                }),
            ))
        })
    }
}
