//! Request descriptions as authored in a collection.
//!
//! ```yaml
//! id: "req-1"
//! collectionId: "col-1"
//! name: "Get user"
//! method: "GET"
//! url: "https://{{host}}/users/{{id}}"
//! headers:
//!   Authorization: "Bearer {{token}}"
//! queryParams:
//!   expand: "{{expand}}"
//! body:
//!   type: json
//!   content: '{"name": "{{name}}"}'
//! auth:
//!   type: basic
//!   username: "{{user}}"
//!   password: "{{password}}"
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::SchemaViolation;
use crate::models::auth::AuthConfig;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Request {
    /// Unique ID of the request
    pub id: String,

    /// Collection that owns this request
    pub collection_id: String,

    /// Display name
    #[serde(default)]
    pub name: String,

    /// Method, e.g. "GET" or "POST" ("WS" for WebSocket requests without a ws:// URL)
    #[serde(default = "default_method")]
    pub method: String,

    /// Target URL, may contain `{{variable}}` placeholders
    pub url: String,

    /// Header name → value (values may contain placeholders)
    #[serde(default)]
    pub headers: BTreeMap<String, String>,

    /// Query parameter name → value (values may contain placeholders)
    #[serde(default)]
    pub query_params: BTreeMap<String, String>,

    #[serde(default)]
    pub body: RequestBody,

    /// Credentials applied after variable resolution
    #[serde(default, skip_serializing_if = "AuthConfig::is_none")]
    pub auth: AuthConfig,

    /// Per-request timeout override for engines doing real I/O
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

fn default_method() -> String {
    "GET".to_string()
}

/// Request payload, tagged by kind.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum RequestBody {
    #[default]
    None,
    #[serde(rename_all = "camelCase")]
    Text {
        content: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        content_type: Option<String>,
    },
    Json { content: String },
    Form { fields: BTreeMap<String, String> },
    Multipart { parts: Vec<MultipartPart> },
    #[serde(rename_all = "camelCase")]
    Binary { file_path: String },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum MultipartPart {
    Text { name: String, value: String },
    #[serde(rename_all = "camelCase")]
    File {
        name: String,
        file_path: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        file_name: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        content_type: Option<String>,
    },
}

impl Request {
    pub fn new(
        collection_id: impl Into<String>,
        method: impl Into<String>,
        url: impl Into<String>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            collection_id: collection_id.into(),
            name: String::new(),
            method: method.into(),
            url: url.into(),
            headers: BTreeMap::new(),
            query_params: BTreeMap::new(),
            body: RequestBody::None,
            auth: AuthConfig::None,
            timeout_secs: None,
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn with_query_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query_params.insert(name.into(), value.into());
        self
    }

    pub fn with_body(mut self, body: RequestBody) -> Self {
        self.body = body;
        self
    }

    pub fn with_auth(mut self, auth: AuthConfig) -> Self {
        self.auth = auth;
        self
    }

    /// Parse a request description from YAML (JSON is valid YAML too).
    pub fn from_yaml(yaml: &str) -> Result<Self, String> {
        serde_yaml::from_str(yaml).map_err(|e| format!("Failed to parse request: {}", e))
    }

    pub fn from_file(path: &str) -> Result<Self, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read request file '{}': {}", path, e))?;
        Self::from_yaml(&content)
    }

    pub fn validate(&self) -> Result<(), SchemaViolation> {
        if self.id.is_empty() {
            return Err(SchemaViolation::new("request", "`id` must not be empty"));
        }
        if self.url.trim().is_empty() {
            return Err(SchemaViolation::new("request", "`url` must not be empty"));
        }
        if self.method.trim().is_empty() {
            return Err(SchemaViolation::new("request", "`method` must not be empty"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal_request() {
        let yaml = r#"
id: "req-1"
collectionId: "col-1"
url: "https://{{host}}/users"
"#;
        let req = Request::from_yaml(yaml).unwrap();
        assert_eq!(req.method, "GET");
        assert_eq!(req.body, RequestBody::None);
        assert!(req.headers.is_empty());
        assert!(req.timeout_secs.is_none());
    }

    #[test]
    fn test_parse_tagged_bodies() {
        let yaml = r#"
id: "req-2"
collectionId: "col-1"
method: "POST"
url: "https://example.com/upload"
body:
  type: multipart
  parts:
    - type: text
      name: "title"
      value: "{{title}}"
    - type: file
      name: "attachment"
      filePath: "/tmp/report.pdf"
      contentType: "application/pdf"
"#;
        let req = Request::from_yaml(yaml).unwrap();
        match req.body {
            RequestBody::Multipart { parts } => {
                assert_eq!(parts.len(), 2);
                assert!(matches!(
                    &parts[1],
                    MultipartPart::File { file_path, content_type: Some(_), .. } if file_path == "/tmp/report.pdf"
                ));
            }
            other => panic!("expected multipart body, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_auth_section() {
        let yaml = r#"
id: "req-3"
collectionId: "col-1"
url: "https://example.com/me"
auth:
  type: apiKey
  value: "{{key}}"
  placement:
    type: header
    name: "X-Api-Token"
"#;
        let req = Request::from_yaml(yaml).unwrap();
        assert_eq!(req.auth.kind(), "apiKey");
        assert!(Request::from_yaml("id: a\ncollectionId: c\nurl: u\n").unwrap().auth.is_none());
    }

    #[test]
    fn test_validate_rejects_blank_url() {
        let req = Request::new("col-1", "GET", "   ");
        assert!(req.validate().is_err());
    }
}
