//! HTTP engine — executes resolved requests with `reqwest`.
//!
//! The whole exchange (connect, send, read body) runs under one timeout and
//! is raced against the run's cancellation token. Any status code the server
//! answers with, including 4xx/5xx, is a successful response.

use std::time::{Duration, Instant};

use reqwest::multipart;
use tokio_util::sync::CancellationToken;

use crate::config::EngineConfig;
use crate::engine::{Engine, EngineFuture, Protocol};
use crate::error::EngineError;
use crate::models::{
    Context, HttpResponseData, MultipartPart, Request, RequestBody, Response, ResponseData,
};

pub struct HttpEngine {
    client: reqwest::Client,
    timeout_secs: u64,
}

impl HttpEngine {
    /// Build the engine's client. Fails when the config cannot produce a
    /// client, e.g. a user agent that is not a valid header value.
    pub fn new(config: &EngineConfig) -> Result<Self, String> {
        let redirect = if config.max_redirects == 0 {
            reqwest::redirect::Policy::none()
        } else {
            reqwest::redirect::Policy::limited(config.max_redirects as usize)
        };

        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .redirect(redirect)
            .build()
            .map_err(|e| format!("Invalid HTTP engine config: {}", e))?;

        Ok(Self {
            client,
            timeout_secs: config.http_timeout_secs,
        })
    }
}

impl Engine for HttpEngine {
    fn protocol(&self) -> Protocol {
        Protocol::Http
    }

    fn execute(&self, context: Context, cancel: CancellationToken) -> EngineFuture {
        let client = self.client.clone();
        let default_timeout = self.timeout_secs;

        Box::pin(async move {
            let request = context.request;
            let request_id = request.id.clone();
            let timeout_secs = request.timeout_secs.unwrap_or(default_timeout);

            let builder = build_request(&client, &request).await?;

            tracing::info!(
                "[HttpEngine] {} {} (request {}, timeout {}s)",
                request.method,
                request.url,
                request_id,
                timeout_secs
            );

            let started = Instant::now();
            let exchange = tokio::time::timeout(
                Duration::from_secs(timeout_secs),
                send(builder, &request_id, timeout_secs),
            );

            let outcome = tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!("[HttpEngine] Request {} cancelled", request_id);
                    return Err(EngineError::Cancelled { request_id: request_id.clone() });
                }
                outcome = exchange => outcome,
            };

            let (data, size) = match outcome {
                Ok(result) => result?,
                Err(_) => {
                    return Err(EngineError::Timeout {
                        request_id,
                        timeout_secs,
                    })
                }
            };

            let elapsed = started.elapsed().as_millis() as u64;
            tracing::debug!(
                "[HttpEngine] Request {} finished: {} ({} bytes, {} ms)",
                request_id,
                data.status,
                size,
                elapsed
            );

            Ok(Response::new(request_id, elapsed, size, ResponseData::Http(data)))
        })
    }
}

async fn send(
    builder: reqwest::RequestBuilder,
    request_id: &str,
    timeout_secs: u64,
) -> Result<(HttpResponseData, u64), EngineError> {
    let response = builder
        .send()
        .await
        .map_err(|e| map_reqwest_error(e, request_id, timeout_secs))?;

    let status = response.status();
    let headers = response
        .headers()
        .iter()
        .map(|(name, value)| {
            (
                name.as_str().to_string(),
                String::from_utf8_lossy(value.as_bytes()).into_owned(),
            )
        })
        .collect();

    let bytes = response
        .bytes()
        .await
        .map_err(|e| map_reqwest_error(e, request_id, timeout_secs))?;

    Ok((
        HttpResponseData {
            status: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or("").to_string(),
            headers,
            body: String::from_utf8_lossy(&bytes).into_owned(),
        },
        bytes.len() as u64,
    ))
}

fn map_reqwest_error(err: reqwest::Error, request_id: &str, timeout_secs: u64) -> EngineError {
    let request_id = request_id.to_string();
    if err.is_timeout() {
        EngineError::Timeout {
            request_id,
            timeout_secs,
        }
    } else if err.is_connect() {
        EngineError::ConnectionRefused {
            request_id,
            cause: err.to_string(),
        }
    } else if err.is_builder() {
        EngineError::InvalidTarget {
            request_id,
            cause: err.to_string(),
        }
    } else {
        EngineError::Http {
            request_id,
            cause: err.to_string(),
        }
    }
}

/// Parse the target URL. A URL without a scheme is sent over plain HTTP.
fn build_url(request: &Request) -> Result<reqwest::Url, EngineError> {
    let raw = request.url.trim();
    let parsed = if raw.contains("://") {
        reqwest::Url::parse(raw)
    } else {
        reqwest::Url::parse(&format!("http://{}", raw))
    };
    let mut url = parsed.map_err(|e| EngineError::InvalidTarget {
        request_id: request.id.clone(),
        cause: format!("'{}': {}", raw, e),
    })?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(EngineError::InvalidTarget {
            request_id: request.id.clone(),
            cause: format!("unsupported scheme '{}'", url.scheme()),
        });
    }

    if !request.query_params.is_empty() {
        let mut pairs = url.query_pairs_mut();
        for (name, value) in &request.query_params {
            pairs.append_pair(name, value);
        }
    }
    Ok(url)
}

fn has_header(request: &Request, name: &str) -> bool {
    request.headers.keys().any(|k| k.eq_ignore_ascii_case(name))
}

async fn read_file(request_id: &str, path: &str) -> Result<Vec<u8>, EngineError> {
    tokio::fs::read(path).await.map_err(|e| EngineError::Io {
        request_id: request_id.to_string(),
        cause: format!("Failed to read '{}': {}", path, e),
    })
}

async fn build_request(
    client: &reqwest::Client,
    request: &Request,
) -> Result<reqwest::RequestBuilder, EngineError> {
    let method = reqwest::Method::from_bytes(request.method.trim().to_ascii_uppercase().as_bytes())
        .map_err(|e| EngineError::InvalidTarget {
            request_id: request.id.clone(),
            cause: format!("invalid method '{}': {}", request.method, e),
        })?;
    let url = build_url(request)?;

    let mut builder = client.request(method, url);
    for (name, value) in &request.headers {
        builder = builder.header(name.as_str(), value.as_str());
    }

    builder = match &request.body {
        RequestBody::None => builder,
        RequestBody::Text {
            content,
            content_type,
        } => {
            let builder = match content_type {
                Some(ct) if !has_header(request, "content-type") => {
                    builder.header(reqwest::header::CONTENT_TYPE, ct.as_str())
                }
                _ => builder,
            };
            builder.body(content.clone())
        }
        RequestBody::Json { content } => {
            let builder = if has_header(request, "content-type") {
                builder
            } else {
                builder.header(reqwest::header::CONTENT_TYPE, "application/json")
            };
            builder.body(content.clone())
        }
        RequestBody::Form { fields } => builder.form(fields),
        RequestBody::Multipart { parts } => {
            let mut form = multipart::Form::new();
            for part in parts {
                form = match part {
                    MultipartPart::Text { name, value } => form.text(name.clone(), value.clone()),
                    MultipartPart::File {
                        name,
                        file_path,
                        file_name,
                        content_type,
                    } => {
                        let bytes = read_file(&request.id, file_path).await?;
                        let file_name = file_name.clone().unwrap_or_else(|| {
                            std::path::Path::new(file_path)
                                .file_name()
                                .map(|n| n.to_string_lossy().into_owned())
                                .unwrap_or_else(|| name.clone())
                        });
                        let mut file_part = multipart::Part::bytes(bytes).file_name(file_name);
                        if let Some(ct) = content_type {
                            file_part = file_part.mime_str(ct).map_err(|e| {
                                EngineError::InvalidTarget {
                                    request_id: request.id.clone(),
                                    cause: format!("invalid content type '{}': {}", ct, e),
                                }
                            })?;
                        }
                        form.part(name.clone(), file_part)
                    }
                };
            }
            builder.multipart(form)
        }
        RequestBody::Binary { file_path } => {
            builder.body(read_file(&request.id, file_path).await?)
        }
    };

    Ok(builder)
}
