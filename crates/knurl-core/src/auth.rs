//! Authentication — applies a request's `auth` settings to the resolved
//! request.
//!
//! Credentials become headers, query parameters, cookies or body fields.
//! OAuth2 token acquisition is not performed; a request configured for it
//! fails the auth phase.

use std::collections::BTreeMap;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

use crate::error::AuthError;
use crate::models::{AuthConfig, AuthPlacement, MultipartPart, Request, RequestBody};

const AUTHORIZATION: &str = "Authorization";
const COOKIE: &str = "Cookie";
const DEFAULT_BEARER_SCHEME: &str = "Bearer";
const DEFAULT_BEARER_PARAM: &str = "access_token";
const DEFAULT_API_KEY_HEADER: &str = "X-API-Key";

/// What a credential contributes to the outgoing request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthResult {
    pub headers: BTreeMap<String, String>,
    pub query: BTreeMap<String, String>,
    pub cookies: BTreeMap<String, String>,
    pub body: BTreeMap<String, String>,
}

impl AuthResult {
    fn placed(placement: &AuthPlacement, name: String, value: String) -> Self {
        let mut result = Self::default();
        let target = match placement {
            AuthPlacement::Header { .. } => &mut result.headers,
            AuthPlacement::Query { .. } => &mut result.query,
            AuthPlacement::Cookie { .. } => &mut result.cookies,
            AuthPlacement::Body { .. } => &mut result.body,
        };
        target.insert(name, value);
        result
    }
}

/// Compute the credential parts for `auth` without touching a request.
pub fn authenticate(auth: &AuthConfig) -> Result<AuthResult, AuthError> {
    match auth {
        AuthConfig::None | AuthConfig::Inherit => Ok(AuthResult::default()),

        AuthConfig::Basic { username, password } => {
            let raw = format!(
                "{}:{}",
                username.as_deref().unwrap_or_default(),
                password.as_deref().unwrap_or_default()
            );
            let placement = AuthPlacement::Header { name: None };
            Ok(AuthResult::placed(
                &placement,
                AUTHORIZATION.to_string(),
                format!("Basic {}", STANDARD.encode(raw)),
            ))
        }

        AuthConfig::Bearer {
            token,
            scheme,
            placement,
        } => {
            let token = token.clone().unwrap_or_default();
            let placement = placement
                .clone()
                .unwrap_or(AuthPlacement::Header { name: None });
            match placement {
                AuthPlacement::Header { .. } => {
                    let scheme = scheme
                        .as_deref()
                        .map(str::trim)
                        .filter(|s| !s.is_empty())
                        .unwrap_or(DEFAULT_BEARER_SCHEME);
                    let name = placement.name().unwrap_or(AUTHORIZATION).to_string();
                    Ok(AuthResult::placed(
                        &placement,
                        name,
                        format!("{} {}", scheme, token),
                    ))
                }
                _ => {
                    let name = placement.name().unwrap_or(DEFAULT_BEARER_PARAM).to_string();
                    Ok(AuthResult::placed(&placement, name, token))
                }
            }
        }

        AuthConfig::ApiKey {
            key,
            value,
            placement,
        } => {
            let value = value.clone().unwrap_or_default();
            let placement = placement
                .clone()
                .unwrap_or(AuthPlacement::Header { name: None });
            let key = key.as_deref().filter(|k| !k.trim().is_empty());
            let name = match (placement.name().or(key), &placement) {
                (Some(name), _) => name,
                (None, AuthPlacement::Header { .. }) => DEFAULT_API_KEY_HEADER,
                (None, other) => {
                    return Err(AuthError::MissingName {
                        auth: "apiKey",
                        placement: other.kind(),
                    })
                }
            };
            Ok(AuthResult::placed(&placement, name.to_string(), value))
        }

        AuthConfig::Oauth2 { .. } => Err(AuthError::Unsupported("oauth2")),
    }
}

/// Apply the request's own `auth` settings to it.
pub fn apply_auth(request: Request) -> Result<Request, AuthError> {
    let result = authenticate(&request.auth)?;
    merge(request, result)
}

/// Merge credential parts into `request`. Auth headers replace any header
/// of the same name (case-insensitive); cookies append to `Cookie`.
fn merge(mut request: Request, result: AuthResult) -> Result<Request, AuthError> {
    for (name, value) in result.headers {
        take_header(&mut request.headers, &name);
        request.headers.insert(name, value);
    }

    request.query_params.extend(result.query);

    if !result.cookies.is_empty() {
        let pairs = result
            .cookies
            .iter()
            .map(|(name, value)| format!("{}={}", name, value))
            .collect::<Vec<_>>()
            .join("; ");
        let cookie = match take_header(&mut request.headers, COOKIE) {
            Some(existing) if !existing.trim().is_empty() => format!("{}; {}", existing, pairs),
            _ => pairs,
        };
        request.headers.insert(COOKIE.to_string(), cookie);
    }

    if !result.body.is_empty() {
        let auth = request.auth.kind();
        request.body = merge_body(request.body, result.body, auth)?;
    }

    Ok(request)
}

fn take_header(headers: &mut BTreeMap<String, String>, name: &str) -> Option<String> {
    let existing = headers
        .keys()
        .find(|key| key.eq_ignore_ascii_case(name))
        .cloned()?;
    headers.remove(&existing)
}

fn merge_body(
    body: RequestBody,
    fields: BTreeMap<String, String>,
    auth: &'static str,
) -> Result<RequestBody, AuthError> {
    match body {
        RequestBody::None => Ok(RequestBody::Form { fields }),
        RequestBody::Form { fields: mut existing } => {
            existing.extend(fields);
            Ok(RequestBody::Form { fields: existing })
        }
        RequestBody::Json { content } => {
            let mut value: serde_json::Value = if content.trim().is_empty() {
                serde_json::Value::Object(serde_json::Map::new())
            } else {
                serde_json::from_str(&content)
                    .map_err(|e| AuthError::InvalidJsonBody(e.to_string()))?
            };
            let object = value
                .as_object_mut()
                .ok_or_else(|| AuthError::InvalidJsonBody("not an object".to_string()))?;
            for (name, field) in fields {
                object.insert(name, serde_json::Value::String(field));
            }
            Ok(RequestBody::Json {
                content: value.to_string(),
            })
        }
        RequestBody::Multipart { mut parts } => {
            parts.extend(
                fields
                    .into_iter()
                    .map(|(name, value)| MultipartPart::Text { name, value }),
            );
            Ok(RequestBody::Multipart { parts })
        }
        RequestBody::Text { .. } => Err(AuthError::UnsupportedBody { auth, body: "text" }),
        RequestBody::Binary { .. } => Err(AuthError::UnsupportedBody {
            auth,
            body: "binary",
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(auth: AuthConfig) -> Request {
        Request::new("col-1", "GET", "https://api.example.com/me").with_auth(auth)
    }

    fn bearer(token: &str, scheme: Option<&str>, placement: Option<AuthPlacement>) -> AuthConfig {
        AuthConfig::Bearer {
            token: Some(token.to_string()),
            scheme: scheme.map(str::to_string),
            placement,
        }
    }

    fn api_key(key: Option<&str>, placement: Option<AuthPlacement>) -> AuthConfig {
        AuthConfig::ApiKey {
            key: key.map(str::to_string),
            value: Some("secret".to_string()),
            placement,
        }
    }

    #[test]
    fn test_none_and_inherit_leave_request_unchanged() {
        for auth in [AuthConfig::None, AuthConfig::Inherit] {
            let unchanged = request(auth);
            assert_eq!(apply_auth(unchanged.clone()).unwrap(), unchanged);
        }
    }

    #[test]
    fn test_basic_sets_authorization_header() {
        let resolved = apply_auth(
            request(AuthConfig::Basic {
                username: Some("aladdin".to_string()),
                password: Some("opensesame".to_string()),
            })
            .with_header("authorization", "stale"),
        )
        .unwrap();

        assert_eq!(
            resolved.headers.get("Authorization").map(String::as_str),
            Some("Basic YWxhZGRpbjpvcGVuc2VzYW1l")
        );
        assert!(!resolved.headers.contains_key("authorization"));
    }

    #[test]
    fn test_basic_with_missing_password() {
        let result = authenticate(&AuthConfig::Basic {
            username: Some("user".to_string()),
            password: None,
        })
        .unwrap();
        // "user:"
        assert_eq!(result.headers["Authorization"], "Basic dXNlcjo=");
    }

    #[test]
    fn test_bearer_header_scheme() {
        let default = apply_auth(request(bearer("abc", None, None))).unwrap();
        assert_eq!(default.headers["Authorization"], "Bearer abc");

        let blank = apply_auth(request(bearer("abc", Some("  "), None))).unwrap();
        assert_eq!(blank.headers["Authorization"], "Bearer abc");

        let custom = apply_auth(request(bearer(
            "abc",
            Some("JWT"),
            Some(AuthPlacement::Header {
                name: Some("X-Auth".to_string()),
            }),
        )))
        .unwrap();
        assert_eq!(custom.headers["X-Auth"], "JWT abc");
        assert!(!custom.headers.contains_key("Authorization"));
    }

    #[test]
    fn test_bearer_query_and_cookie() {
        let query = apply_auth(request(bearer(
            "abc",
            None,
            Some(AuthPlacement::Query { name: None }),
        )))
        .unwrap();
        assert_eq!(query.query_params["access_token"], "abc");
        assert!(query.headers.is_empty());

        let cookie = apply_auth(
            request(bearer(
                "abc",
                None,
                Some(AuthPlacement::Cookie {
                    name: Some("session".to_string()),
                }),
            ))
            .with_header("cookie", "theme=dark"),
        )
        .unwrap();
        assert_eq!(cookie.headers["Cookie"], "theme=dark; session=abc");
        assert_eq!(cookie.headers.len(), 1);
    }

    #[test]
    fn test_api_key_placements() {
        let header = apply_auth(request(api_key(None, None))).unwrap();
        assert_eq!(header.headers["X-API-Key"], "secret");

        let named = apply_auth(request(api_key(Some("X-Token"), None))).unwrap();
        assert_eq!(named.headers["X-Token"], "secret");

        let query = apply_auth(request(api_key(
            Some("ignored"),
            Some(AuthPlacement::Query {
                name: Some("api_key".to_string()),
            }),
        )))
        .unwrap();
        assert_eq!(query.query_params["api_key"], "secret");
        assert!(!query.query_params.contains_key("ignored"));
    }

    #[test]
    fn test_api_key_query_needs_a_name() {
        let err = apply_auth(request(api_key(
            None,
            Some(AuthPlacement::Query { name: None }),
        )))
        .unwrap_err();
        assert_eq!(
            err,
            AuthError::MissingName {
                auth: "apiKey",
                placement: "query"
            }
        );
    }

    #[test]
    fn test_body_placement() {
        let placement = Some(AuthPlacement::Body {
            field_name: Some("api_key".to_string()),
        });

        let json = apply_auth(
            request(api_key(None, placement.clone())).with_body(RequestBody::Json {
                content: r#"{"name":"n"}"#.to_string(),
            }),
        )
        .unwrap();
        match json.body {
            RequestBody::Json { content } => {
                let value: serde_json::Value = serde_json::from_str(&content).unwrap();
                assert_eq!(value["api_key"], "secret");
                assert_eq!(value["name"], "n");
            }
            other => panic!("expected json body, got {:?}", other),
        }

        let empty = apply_auth(request(api_key(None, placement.clone()))).unwrap();
        assert!(matches!(empty.body, RequestBody::Form { ref fields } if fields["api_key"] == "secret"));

        let err = apply_auth(
            request(api_key(None, placement.clone())).with_body(RequestBody::Json {
                content: "[1, 2]".to_string(),
            }),
        )
        .unwrap_err();
        assert!(matches!(err, AuthError::InvalidJsonBody(_)));

        let err = apply_auth(request(api_key(None, placement)).with_body(RequestBody::Text {
            content: "raw".to_string(),
            content_type: None,
        }))
        .unwrap_err();
        assert_eq!(
            err,
            AuthError::UnsupportedBody {
                auth: "apiKey",
                body: "text"
            }
        );
    }

    #[test]
    fn test_oauth2_is_rejected() {
        let err = apply_auth(request(AuthConfig::Oauth2 {
            grant_type: "client_credentials".to_string(),
            token_url: None,
            client_id: None,
            scope: None,
        }))
        .unwrap_err();
        assert_eq!(err, AuthError::Unsupported("oauth2"));
    }
}
