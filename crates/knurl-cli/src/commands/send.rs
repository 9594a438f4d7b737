//! `knurl send` — run a request through the full pipeline.

use std::future::Future;
use std::sync::Arc;

use knurl_core::{
    Context, EngineConfig, EngineRegistry, Pipeline, RequestManager, Response, ResponseData,
};

use tokio::task::JoinHandle;

use super::{load_environment, load_request, print_json};

/// Options for a single `send` invocation.
#[derive(Debug, Clone, Default)]
pub struct SendOptions {
    pub env_file: Option<String>,
    pub config_file: Option<String>,
    /// Overrides the configured HTTP timeout
    pub timeout_secs: Option<u64>,
}

fn build_config(options: &SendOptions) -> Result<EngineConfig, String> {
    let config = match options.config_file.as_deref() {
        Some(path) => EngineConfig::from_file(path)?,
        None => EngineConfig::default(),
    };
    let mut config = config.with_env_overrides();
    if let Some(timeout) = options.timeout_secs {
        config.http_timeout_secs = timeout;
    }
    Ok(config)
}

/// Cancel `request_id` once `signal` completes. Yields whether a tracked
/// run was found.
fn cancel_on<S>(signal: S, manager: Arc<RequestManager>, request_id: String) -> JoinHandle<bool>
where
    S: Future<Output = ()> + Send + 'static,
{
    tokio::spawn(async move {
        signal.await;
        manager.cancel(&request_id)
    })
}

/// Load the request and environment, run the pipeline, return the response.
/// Ctrl-C cancels the in-flight request.
pub async fn execute(request_file: &str, options: &SendOptions) -> Result<Response, String> {
    let config = build_config(options)?;
    let request = load_request(request_file)?;
    let environment = load_environment(options.env_file.as_deref())?;

    let registry = EngineRegistry::with_defaults(&config)?;
    let engines: Vec<_> = registry.protocols().iter().map(|p| p.as_str()).collect();
    tracing::debug!("[Send] Engines: {}", engines.join(", "));
    let pipeline = Pipeline::new(Arc::new(registry));

    // Registered before the signal task starts, so an early Ctrl-C is not lost.
    let manager = Arc::new(RequestManager::new());
    let tracked = manager.track(&request.id);

    let ctrl_c = async {
        if tokio::signal::ctrl_c().await.is_err() {
            std::future::pending::<()>().await;
        }
    };
    let interrupt = cancel_on(ctrl_c, manager.clone(), tracked.id().to_string());

    tracing::info!(
        "[Send] {} {} (environment: {})",
        request.method,
        request.url,
        environment.name
    );

    let result = pipeline
        .run_with_cancel(Context::new(request, environment), tracked.token())
        .await;
    interrupt.abort();
    drop(tracked);

    result.map_err(|e| e.to_string())
}

pub async fn run(request_file: &str, options: &SendOptions, verbose: bool) -> Result<(), String> {
    let response = execute(request_file, options).await?;

    if verbose {
        return print_json(&response);
    }

    match &response.data {
        ResponseData::Http(http) => {
            println!(
                "{} {}  ({} ms, {} bytes)",
                http.status, http.status_text, response.response_time, response.response_size
            );
            for (name, value) in &http.headers {
                println!("{}: {}", name, value);
            }
            println!();
            println!("{}", http.body);
        }
        ResponseData::WebSocket(ws) => {
            println!("WebSocket: {}  ({} ms)", ws.status, response.response_time);
        }
    }
    Ok(())
}
