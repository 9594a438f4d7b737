//! Authentication settings attached to a request.
//!
//! ```yaml
//! auth:
//!   type: bearer
//!   token: "{{token}}"
//!   placement:
//!     type: query
//!     name: access_token
//! ```

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum AuthConfig {
    #[default]
    None,
    /// Use the owning collection's auth. The caller swaps in the inherited
    /// settings before the run; on its own it applies nothing.
    Inherit,
    Basic {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        username: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        password: Option<String>,
    },
    Bearer {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        token: Option<String>,
        /// Authorization scheme, "Bearer" when unset or blank
        #[serde(default, skip_serializing_if = "Option::is_none")]
        scheme: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        placement: Option<AuthPlacement>,
    },
    ApiKey {
        /// Parameter name used when the placement does not name one
        #[serde(default, skip_serializing_if = "Option::is_none")]
        key: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        value: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        placement: Option<AuthPlacement>,
    },
    /// Accepted in documents, rejected at run time.
    #[serde(rename_all = "camelCase")]
    Oauth2 {
        grant_type: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        token_url: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        client_id: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        scope: Option<String>,
    },
}

impl AuthConfig {
    pub fn is_none(&self) -> bool {
        matches!(self, AuthConfig::None)
    }

    pub fn kind(&self) -> &'static str {
        match self {
            AuthConfig::None => "none",
            AuthConfig::Inherit => "inherit",
            AuthConfig::Basic { .. } => "basic",
            AuthConfig::Bearer { .. } => "bearer",
            AuthConfig::ApiKey { .. } => "apiKey",
            AuthConfig::Oauth2 { .. } => "oauth2",
        }
    }
}

/// Where a credential goes on the outgoing request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum AuthPlacement {
    Header {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        name: Option<String>,
    },
    Query {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        name: Option<String>,
    },
    Cookie {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        name: Option<String>,
    },
    #[serde(rename_all = "camelCase")]
    Body {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        field_name: Option<String>,
    },
}

impl AuthPlacement {
    pub fn kind(&self) -> &'static str {
        match self {
            AuthPlacement::Header { .. } => "header",
            AuthPlacement::Query { .. } => "query",
            AuthPlacement::Cookie { .. } => "cookie",
            AuthPlacement::Body { .. } => "body",
        }
    }

    /// The configured name, if non-blank.
    pub fn name(&self) -> Option<&str> {
        let name = match self {
            AuthPlacement::Header { name }
            | AuthPlacement::Query { name }
            | AuthPlacement::Cookie { name } => name,
            AuthPlacement::Body { field_name } => field_name,
        };
        name.as_deref().filter(|n| !n.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tagged_auth() {
        let bearer: AuthConfig = serde_json::from_value(serde_json::json!({
            "type": "bearer",
            "token": "abc",
            "placement": {"type": "query", "name": "access_token"}
        }))
        .unwrap();
        assert_eq!(
            bearer,
            AuthConfig::Bearer {
                token: Some("abc".to_string()),
                scheme: None,
                placement: Some(AuthPlacement::Query {
                    name: Some("access_token".to_string())
                }),
            }
        );

        let api_key: AuthConfig =
            serde_json::from_value(serde_json::json!({"type": "apiKey", "key": "X-Key"})).unwrap();
        assert_eq!(api_key.kind(), "apiKey");

        let oauth: AuthConfig = serde_json::from_value(serde_json::json!({
            "type": "oauth2",
            "grantType": "client_credentials",
            "clientSecret": "ignored"
        }))
        .unwrap();
        assert_eq!(oauth.kind(), "oauth2");
    }

    #[test]
    fn test_unknown_auth_type_rejected() {
        let result = serde_json::from_value::<AuthConfig>(serde_json::json!({"type": "digest"}));
        assert!(result.is_err());
    }

    #[test]
    fn test_placement_name_ignores_blank() {
        let blank = AuthPlacement::Cookie {
            name: Some("  ".to_string()),
        };
        assert_eq!(blank.name(), None);

        let body = AuthPlacement::Body {
            field_name: Some("api_key".to_string()),
        };
        assert_eq!(body.name(), Some("api_key"));
        assert_eq!(body.kind(), "body");
    }
}
