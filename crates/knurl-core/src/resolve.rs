//! Variable resolution — substitutes `{{name}}` placeholders in a request.
//!
//! Only the url, header values, query parameter values, textual body
//! content and auth credentials are rewritten. A token whose variable is missing or disabled is
//! left exactly as written, and substituted values are never scanned again.

use std::sync::OnceLock;

use regex::{Captures, Regex};

use crate::models::{AuthConfig, Context, Environment, MultipartPart, Request, RequestBody};

fn token_regex() -> &'static Regex {
    static TOKEN: OnceLock<Regex> = OnceLock::new();
    TOKEN.get_or_init(|| Regex::new(r"\{\{([^{}]+)\}\}").expect("placeholder pattern is valid"))
}

/// Resolve placeholders in a single string.
pub fn resolve_template(input: &str, environment: &Environment) -> String {
    if !input.contains("{{") {
        return input.to_string();
    }
    token_regex()
        .replace_all(input, |caps: &Captures| {
            environment
                .enabled_value(&caps[1])
                .map(str::to_string)
                .unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

/// Resolve every placeholder-bearing field of `request`.
pub fn resolve_request(request: Request, environment: &Environment) -> Request {
    let resolve = |value: String| resolve_template(&value, environment);

    Request {
        url: resolve(request.url),
        headers: request
            .headers
            .into_iter()
            .map(|(name, value)| (name, resolve(value)))
            .collect(),
        query_params: request
            .query_params
            .into_iter()
            .map(|(name, value)| (name, resolve(value)))
            .collect(),
        body: resolve_body(request.body, environment),
        auth: resolve_auth(request.auth, environment),
        ..request
    }
}

/// Credential values are resolved; parameter names and placements are not.
fn resolve_auth(auth: AuthConfig, environment: &Environment) -> AuthConfig {
    let resolve = |value: Option<String>| value.map(|v| resolve_template(&v, environment));

    match auth {
        AuthConfig::Basic { username, password } => AuthConfig::Basic {
            username: resolve(username),
            password: resolve(password),
        },
        AuthConfig::Bearer {
            token,
            scheme,
            placement,
        } => AuthConfig::Bearer {
            token: resolve(token),
            scheme,
            placement,
        },
        AuthConfig::ApiKey {
            key,
            value,
            placement,
        } => AuthConfig::ApiKey {
            key,
            value: resolve(value),
            placement,
        },
        other => other,
    }
}

fn resolve_body(body: RequestBody, environment: &Environment) -> RequestBody {
    match body {
        RequestBody::Text {
            content,
            content_type,
        } => RequestBody::Text {
            content: resolve_template(&content, environment),
            content_type,
        },
        RequestBody::Json { content } => RequestBody::Json {
            content: resolve_template(&content, environment),
        },
        RequestBody::Form { fields } => RequestBody::Form {
            fields: fields
                .into_iter()
                .map(|(name, value)| {
                    let value = resolve_template(&value, environment);
                    (name, value)
                })
                .collect(),
        },
        RequestBody::Multipart { parts } => RequestBody::Multipart {
            parts: parts
                .into_iter()
                .map(|part| match part {
                    MultipartPart::Text { name, value } => MultipartPart::Text {
                        value: resolve_template(&value, environment),
                        name,
                    },
                    file => file,
                })
                .collect(),
        },
        other => other,
    }
}

/// The resolution phase: `context -> context'` with the request resolved
/// against the context's own environment.
pub fn resolve_variables(context: Context) -> Context {
    let request = resolve_request(context.request.clone(), &context.environment);
    context.with_request(request)
}
