//! Pipeline orchestrator — runs a fixed list of phases over one context.
//!
//! A run:
//! 1. Checks the cancellation token before each phase
//! 2. Runs the phase to completion and feeds its output to the next phase
//! 3. Aborts on the first failure, tagging it with the phase name and request id
//! 4. Takes the response from the final context and validates it
//!
//! Runs share nothing mutable; one `Pipeline` can serve any number of
//! concurrent runs.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::Instrument;

use crate::engine::EngineRegistry;
use crate::error::{PipelineError, SchemaViolation};
use crate::manager::RequestManager;
use crate::models::{Context, Environment, Request, Response};
use crate::phase::{AuthPhase, DispatchPhase, Phase, ResolveVariablesPhase};

pub struct Pipeline {
    phases: Vec<Arc<dyn Phase>>,
}

impl Pipeline {
    /// The standard pipeline: resolve variables, apply auth, then dispatch
    /// to an engine.
    pub fn new(registry: Arc<EngineRegistry>) -> Self {
        Self::with_phases(vec![
            Arc::new(ResolveVariablesPhase),
            Arc::new(AuthPhase),
            Arc::new(DispatchPhase::new(registry)),
        ])
    }

    /// A pipeline over an explicit, ordered phase list.
    pub fn with_phases(phases: Vec<Arc<dyn Phase>>) -> Self {
        Self { phases }
    }

    pub fn phase_names(&self) -> Vec<&str> {
        self.phases.iter().map(|p| p.name()).collect()
    }

    pub async fn run(&self, context: Context) -> Result<Response, PipelineError> {
        self.run_with_cancel(context, CancellationToken::new()).await
    }

    pub async fn run_with_cancel(
        &self,
        context: Context,
        cancel: CancellationToken,
    ) -> Result<Response, PipelineError> {
        let request_id = context.request_id().to_string();
        let span = tracing::info_span!("pipeline", request_id = %request_id);
        self.run_phases(context, &cancel, request_id)
            .instrument(span)
            .await
    }

    async fn run_phases(
        &self,
        mut context: Context,
        cancel: &CancellationToken,
        request_id: String,
    ) -> Result<Response, PipelineError> {
        for phase in &self.phases {
            if cancel.is_cancelled() {
                tracing::info!("[Pipeline] Cancelled before phase '{}'", phase.name());
                return Err(PipelineError::Cancelled {
                    request_id,
                    phase: phase.name().to_string(),
                });
            }

            tracing::debug!("[Pipeline] Running phase '{}'", phase.name());
            context = phase.run(context, cancel).await.map_err(|source| {
                tracing::warn!("[Pipeline] Phase '{}' failed: {}", phase.name(), source);
                PipelineError::Phase {
                    phase: phase.name().to_string(),
                    request_id: request_id.clone(),
                    source,
                }
            })?;
        }

        let response = context.response.ok_or_else(|| PipelineError::MissingResponse {
            request_id: request_id.clone(),
        })?;

        let contract = response.validate().and_then(|_| {
            if response.request_id == request_id {
                Ok(())
            } else {
                Err(SchemaViolation::new(
                    "response",
                    format!(
                        "`requestId` '{}' does not match request '{}'",
                        response.request_id, request_id
                    ),
                ))
            }
        });
        if let Err(source) = contract {
            tracing::error!("[Pipeline] Engine returned an invalid response: {}", source);
            return Err(PipelineError::Contract { request_id, source });
        }

        tracing::debug!(
            "[Pipeline] Completed with {} response in {} ms",
            response.protocol(),
            response.response_time
        );
        Ok(response)
    }

    /// Run `request` against a snapshot of `environment`.
    pub async fn execute(
        &self,
        request: Request,
        environment: &Environment,
    ) -> Result<Response, PipelineError> {
        self.run(Context::new(request, environment.clone())).await
    }

    /// Like `execute`, but tracked in `manager` so it can be cancelled by
    /// request id while in flight. The id is deregistered when the run ends
    /// or its future is dropped.
    pub async fn execute_tracked(
        &self,
        manager: &RequestManager,
        request: Request,
        environment: &Environment,
    ) -> Result<Response, PipelineError> {
        let tracked = manager.track(&request.id);
        self.run_with_cancel(Context::new(request, environment.clone()), tracked.token())
            .await
    }
}
