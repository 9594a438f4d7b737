use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::engine::Protocol;
use crate::error::SchemaViolation;

/// Validated, protocol-tagged result of executing a request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Response {
    pub request_id: String,
    /// Duration in milliseconds
    pub response_time: u64,
    /// Body size in bytes
    pub response_size: u64,
    /// ISO 8601 / RFC 3339
    pub timestamp: String,
    pub data: ResponseData,
}

/// Protocol-specific payload, serialized as `{"type": ..., "data": {...}}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", content = "data", rename_all = "lowercase")]
pub enum ResponseData {
    Http(HttpResponseData),
    WebSocket(WebSocketResponseData),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct HttpResponseData {
    /// Status code (e.g., 200)
    pub status: u16,
    /// Reason phrase (e.g., "OK")
    pub status_text: String,
    /// List of (header, value), in the order received
    pub headers: Vec<(String, String)>,
    /// Body decoded as UTF-8 (lossy)
    pub body: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct WebSocketResponseData {
    pub status: String,
}

impl ResponseData {
    pub fn protocol(&self) -> Protocol {
        match self {
            ResponseData::Http(_) => Protocol::Http,
            ResponseData::WebSocket(_) => Protocol::WebSocket,
        }
    }
}

impl Response {
    /// Build a response stamped with the current time.
    pub fn new(
        request_id: impl Into<String>,
        response_time: u64,
        response_size: u64,
        data: ResponseData,
    ) -> Self {
        Self {
            request_id: request_id.into(),
            response_time,
            response_size,
            timestamp: now_timestamp(),
            data,
        }
    }

    pub fn protocol(&self) -> Protocol {
        self.data.protocol()
    }

    /// Checks the invariants serde cannot express.
    pub fn validate(&self) -> Result<(), SchemaViolation> {
        if self.request_id.is_empty() {
            return Err(SchemaViolation::new("response", "`requestId` must not be empty"));
        }
        DateTime::parse_from_rfc3339(&self.timestamp).map_err(|e| {
            SchemaViolation::new(
                "response",
                format!("`timestamp` '{}' is not a valid date-time: {}", self.timestamp, e),
            )
        })?;
        match &self.data {
            ResponseData::Http(http) => {
                if !(100..=999).contains(&http.status) {
                    return Err(SchemaViolation::new(
                        "response",
                        format!("HTTP status {} is out of range", http.status),
                    ));
                }
            }
            ResponseData::WebSocket(ws) => {
                if ws.status.is_empty() {
                    return Err(SchemaViolation::new(
                        "response",
                        "websocket `status` must not be empty",
                    ));
                }
            }
        }
        Ok(())
    }
}

/// Current time in the `2024-01-01T12:00:00.000Z` form.
pub fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_websocket_response_serializes_tagged() {
        let response = Response::new(
            "req-1",
            10,
            0,
            ResponseData::WebSocket(WebSocketResponseData {
                status: "Connected".to_string(),
            }),
        );
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["requestId"], "req-1");
        assert_eq!(json["data"]["type"], "websocket");
        assert_eq!(json["data"]["data"]["status"], "Connected");
        assert!(response.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_timestamp() {
        let mut response = Response::new(
            "req-1",
            1,
            0,
            ResponseData::WebSocket(WebSocketResponseData {
                status: "Connected".to_string(),
            }),
        );
        response.timestamp = "yesterday".to_string();
        assert!(response.validate().is_err());
    }
}
