use std::collections::HashMap;
use std::sync::Arc;

use crate::config::EngineConfig;
use crate::engine::{Engine, HttpEngine, Protocol, WebSocketEngine};
use crate::models::Request;

/// Maps each protocol to the engine that serves it.
///
/// Built once, then shared read-only between concurrent runs.
#[derive(Clone, Default)]
pub struct EngineRegistry {
    engines: HashMap<Protocol, Arc<dyn Engine>>,
}

impl EngineRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the built-in HTTP and WebSocket engines.
    pub fn with_defaults(config: &EngineConfig) -> Result<Self, String> {
        let mut registry = Self::new();
        registry.register(Arc::new(HttpEngine::new(config)?));
        registry.register(Arc::new(WebSocketEngine::new(config)));
        Ok(registry)
    }

    /// Register an engine under its protocol, replacing any previous one.
    pub fn register(&mut self, engine: Arc<dyn Engine>) -> Option<Arc<dyn Engine>> {
        let protocol = engine.protocol();
        tracing::debug!("[EngineRegistry] Registered {} engine", protocol);
        self.engines.insert(protocol, engine)
    }

    pub fn get(&self, protocol: Protocol) -> Option<Arc<dyn Engine>> {
        self.engines.get(&protocol).cloned()
    }

    /// Pick the engine for a resolved request.
    pub fn select(&self, request: &Request) -> (Protocol, Option<Arc<dyn Engine>>) {
        let protocol = Protocol::for_request(request);
        (protocol, self.get(protocol))
    }

    pub fn protocols(&self) -> Vec<Protocol> {
        let mut protocols: Vec<_> = self.engines.keys().copied().collect();
        protocols.sort_by_key(|p| p.as_str());
        protocols
    }
}
