//! Per-query record of which tools were invoked.
//!
//! A [`UsageTracker`] wraps every tool of a registry in a [`TrackedTool`].
//! The wrapper records the tool's own name and then delegates, leaving the
//! tool's input and output untouched. Create one tracker per query.

use super::registry::ToolRegistry;
use super::Tool;
use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use tracing::debug;

/// Ordered set of tool names used during one query.
#[derive(Debug, Clone, Default)]
pub struct UsageTracker {
    used: Arc<Mutex<Vec<String>>>,
}

impl UsageTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a tool name. Repeats are ignored.
    pub fn record(&self, name: &str) {
        let mut used = self.used.lock().unwrap_or_else(|e| e.into_inner());
        if !used.iter().any(|n| n == name) {
            debug!("First use of {}", name);
            used.push(name.to_string());
        }
    }

    /// Distinct tool names in first-use order.
    pub fn tools_used(&self) -> Vec<String> {
        self.used.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn is_empty(&self) -> bool {
        self.used.lock().unwrap_or_else(|e| e.into_inner()).is_empty()
    }

    /// Wrap every tool of a registry so calls are recorded here.
    pub fn wrap(&self, registry: &ToolRegistry) -> ToolRegistry {
        registry.map_tools(|tool| Arc::new(TrackedTool::new(tool, self.clone())) as Arc<dyn Tool>)
    }
}

/// A tool that records its own name in a tracker before every call.
pub struct TrackedTool {
    name: String,
    inner: Arc<dyn Tool>,
    tracker: UsageTracker,
}

impl TrackedTool {
    pub fn new(inner: Arc<dyn Tool>, tracker: UsageTracker) -> Self {
        Self {
            name: inner.name().to_string(),
            inner,
            tracker,
        }
    }
}

#[async_trait]
impl Tool for TrackedTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        self.inner.description()
    }

    async fn invoke(&self, input: &str) -> String {
        self.tracker.record(&self.name);
        self.inner.invoke(input).await
    }
}
