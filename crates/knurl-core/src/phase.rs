//! Pipeline phases — `context -> context` steps run in a fixed order.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::auth::apply_auth;
use crate::engine::EngineRegistry;
use crate::error::PhaseError;
use crate::models::Context;
use crate::resolve::resolve_variables;

pub type PhaseFuture<'a> = Pin<Box<dyn Future<Output = Result<Context, PhaseError>> + Send + 'a>>;

pub trait Phase: Send + Sync {
    /// Name used in logs and to tag failures.
    fn name(&self) -> &str;

    fn run<'a>(&'a self, context: Context, cancel: &'a CancellationToken) -> PhaseFuture<'a>;
}

/// Substitutes `{{variable}}` placeholders from the context's environment.
pub struct ResolveVariablesPhase;

impl Phase for ResolveVariablesPhase {
    fn name(&self) -> &str {
        "resolve-variables"
    }

    fn run<'a>(&'a self, context: Context, _cancel: &'a CancellationToken) -> PhaseFuture<'a> {
        Box::pin(std::future::ready(Ok(resolve_variables(context))))
    }
}

/// Applies the request's auth settings to the resolved request.
pub struct AuthPhase;

impl AuthPhase {
    fn apply(context: Context) -> Result<Context, PhaseError> {
        if context.request.auth.is_none() {
            return Ok(context);
        }
        tracing::debug!(
            "[Auth] Applying {} auth to request {}",
            context.request.auth.kind(),
            context.request_id()
        );
        let request = apply_auth(context.request.clone())?;
        Ok(context.with_request(request))
    }
}

impl Phase for AuthPhase {
    fn name(&self) -> &str {
        "authenticate"
    }

    fn run<'a>(&'a self, context: Context, _cancel: &'a CancellationToken) -> PhaseFuture<'a> {
        Box::pin(std::future::ready(Self::apply(context)))
    }
}

/// Hands the resolved request to the engine for its protocol and stores
/// the engine's response in the context.
pub struct DispatchPhase {
    registry: Arc<EngineRegistry>,
}

impl DispatchPhase {
    pub fn new(registry: Arc<EngineRegistry>) -> Self {
        Self { registry }
    }
}

impl Phase for DispatchPhase {
    fn name(&self) -> &str {
        "dispatch"
    }

    fn run<'a>(&'a self, context: Context, cancel: &'a CancellationToken) -> PhaseFuture<'a> {
        Box::pin(async move {
            let (protocol, engine) = self.registry.select(&context.request);
            let Some(engine) = engine else {
                let available: Vec<_> =
                    self.registry.protocols().iter().map(|p| p.as_str()).collect();
                tracing::warn!(
                    "[Dispatch] No {} engine registered (available: {})",
                    protocol,
                    available.join(", ")
                );
                return Err(PhaseError::NoEngine(protocol));
            };

            let response = engine
                .execute(context.clone(), cancel.clone())
                .await
                .map_err(|source| PhaseError::Engine {
                    engine: protocol,
                    source,
                })?;

            if response.protocol() != protocol {
                return Err(PhaseError::ProtocolMismatch {
                    engine: protocol,
                    produced: response.protocol(),
                });
            }

            Ok(context.with_response(response))
        })
    }
}

/// Adapts a synchronous closure into a phase.
pub struct FnPhase<F> {
    name: String,
    f: F,
}

pub fn phase_fn<F>(name: impl Into<String>, f: F) -> FnPhase<F>
where
    F: Fn(Context) -> Result<Context, PhaseError> + Send + Sync,
{
    FnPhase {
        name: name.into(),
        f,
    }
}

impl<F> Phase for FnPhase<F>
where
    F: Fn(Context) -> Result<Context, PhaseError> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn run<'a>(&'a self, context: Context, _cancel: &'a CancellationToken) -> PhaseFuture<'a> {
        Box::pin(std::future::ready((self.f)(context)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::engine::{Engine, EngineFuture, Protocol};
    use crate::error::{AuthError, EngineError};
    use crate::models::{
        AuthConfig, Environment, Request, Response, ResponseData, Variable, WebSocketResponseData,
    };

    /// Claims HTTP but answers with a websocket payload.
    struct LyingEngine;

    impl Engine for LyingEngine {
        fn protocol(&self) -> Protocol {
            Protocol::Http
        }

        fn execute(&self, context: Context, _cancel: CancellationToken) -> EngineFuture {
            Box::pin(async move {
                Ok::<_, EngineError>(Response::new(
                    context.request.id,
                    1,
                    0,
                    ResponseData::WebSocket(WebSocketResponseData {
                        status: "Connected".to_string(),
                    }),
                ))
            })
        }
    }

    #[tokio::test]
    async fn test_resolve_phase_rewrites_request() {
        let env = Environment::new("env", "Dev").with_variable(Variable::new("id", "7"));
        let ctx = Context::new(Request::new("c", "GET", "https://x/{{id}}"), env);

        let out = ResolveVariablesPhase
            .run(ctx, &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(out.request.url, "https://x/7");
        assert!(out.response.is_none());
    }

    #[tokio::test]
    async fn test_auth_phase_applies_resolved_credentials() {
        let env = Environment::new("env", "Dev").with_variable(Variable::new("token", "t-1"));
        let request = Request::new("c", "GET", "https://x").with_auth(AuthConfig::Bearer {
            token: Some("{{token}}".to_string()),
            scheme: None,
            placement: None,
        });
        let cancel = CancellationToken::new();

        let resolved = ResolveVariablesPhase
            .run(Context::new(request, env), &cancel)
            .await
            .unwrap();
        let out = AuthPhase.run(resolved, &cancel).await.unwrap();

        assert_eq!(out.request.headers["Authorization"], "Bearer t-1");
    }

    #[tokio::test]
    async fn test_auth_phase_without_auth_is_identity() {
        let ctx = Context::new(Request::new("c", "GET", "https://x"), Environment::empty());
        let out = AuthPhase
            .run(ctx.clone(), &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(out, ctx);
    }

    #[tokio::test]
    async fn test_auth_phase_rejects_oauth2() {
        let request = Request::new("c", "GET", "https://x").with_auth(AuthConfig::Oauth2 {
            grant_type: "client_credentials".to_string(),
            token_url: None,
            client_id: None,
            scope: None,
        });
        let err = AuthPhase
            .run(Context::new(request, Environment::empty()), &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, PhaseError::Auth(AuthError::Unsupported("oauth2"))));
    }

    #[tokio::test]
    async fn test_dispatch_stores_response() {
        let registry = Arc::new(EngineRegistry::with_defaults(&EngineConfig::default()).unwrap());
        let ctx = Context::new(Request::new("c", "GET", "ws://localhost"), Environment::empty());

        let out = DispatchPhase::new(registry)
            .run(ctx, &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(out.response.unwrap().protocol(), Protocol::WebSocket);
    }

    #[tokio::test]
    async fn test_dispatch_without_engine() {
        let ctx = Context::new(Request::new("c", "GET", "https://x"), Environment::empty());
        let err = DispatchPhase::new(Arc::new(EngineRegistry::new()))
            .run(ctx, &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, PhaseError::NoEngine(Protocol::Http)));
    }

    #[tokio::test]
    async fn test_dispatch_rejects_protocol_mismatch() {
        let mut registry = EngineRegistry::new();
        registry.register(Arc::new(LyingEngine));
        let ctx = Context::new(Request::new("c", "GET", "https://x"), Environment::empty());

        let err = DispatchPhase::new(Arc::new(registry))
            .run(ctx, &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            PhaseError::ProtocolMismatch {
                engine: Protocol::Http,
                produced: Protocol::WebSocket
            }
        ));
    }
}
