// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-call correlation state
//!
//! An [`OperationContext`] is created at the start of every public adapter
//! call. Nested calls derive a child: same `traceId`, fresh `requestId`.
//! The context in flight is kept in a task-local slot so nested adapter calls
//! find their parent without threading it through manager signatures.

use crate::id::CorrelationIds;
use serde_json::{Map, Value};
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;

tokio::task_local! {
    static CURRENT: OperationContext;
}

/// Cooperative cancellation flag carried by a context
#[derive(Debug, Clone, Default)]
pub struct CancelSignal {
    cancelled: Arc<AtomicBool>,
    notify: Arc<Notify>,
}

impl CancelSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
        self.notify.notify_waiters();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Resolves once `cancel` has been called
    pub async fn cancelled(&self) {
        loop {
            let notified = self.notify.notified();
            if self.is_cancelled() {
                return;
            }
            notified.await;
        }
    }
}

/// Correlation and invocation metadata for one operation
#[derive(Debug, Clone)]
pub struct OperationContext {
    operation: String,
    component: String,
    trace_id: String,
    request_id: String,
    metadata: Map<String, Value>,
    parent: Option<Arc<OperationContext>>,
    signal: Option<CancelSignal>,
}

impl OperationContext {
    /// A root context with a fresh correlation pair
    pub fn create(
        ids: &CorrelationIds,
        operation: impl Into<String>,
        component: impl Into<String>,
        metadata: Option<Map<String, Value>>,
    ) -> Self {
        Self {
            operation: operation.into(),
            component: component.into(),
            trace_id: ids.trace_id(),
            request_id: ids.request_id(),
            metadata: metadata.unwrap_or_default(),
            parent: None,
            signal: None,
        }
    }

    /// Child of the context currently in scope, or a root when there is none
    pub fn derive(
        ids: &CorrelationIds,
        operation: impl Into<String>,
        component: impl Into<String>,
        metadata: Option<Map<String, Value>>,
    ) -> Self {
        match Self::current() {
            Some(parent) => parent
                .child(ids, operation, metadata)
                .with_component(component),
            None => Self::create(ids, operation, component, metadata),
        }
    }

    /// Inherits `traceId`, component and signal; gets a fresh `requestId`
    pub fn child(
        &self,
        ids: &CorrelationIds,
        operation: impl Into<String>,
        metadata: Option<Map<String, Value>>,
    ) -> Self {
        Self {
            operation: operation.into(),
            component: self.component.clone(),
            trace_id: self.trace_id.clone(),
            request_id: ids.request_id(),
            metadata: metadata.unwrap_or_default(),
            parent: Some(Arc::new(self.clone())),
            signal: self.signal.clone(),
        }
    }

    pub fn with_component(mut self, component: impl Into<String>) -> Self {
        self.component = component.into();
        self
    }

    pub fn with_signal(mut self, signal: CancelSignal) -> Self {
        self.signal = Some(signal);
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub fn operation(&self) -> &str {
        &self.operation
    }

    pub fn component(&self) -> &str {
        &self.component
    }

    pub fn trace_id(&self) -> &str {
        &self.trace_id
    }

    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    pub fn metadata(&self) -> &Map<String, Value> {
        &self.metadata
    }

    pub fn parent(&self) -> Option<&OperationContext> {
        self.parent.as_deref()
    }

    pub fn signal(&self) -> Option<&CancelSignal> {
        self.signal.as_ref()
    }

    pub fn is_cancelled(&self) -> bool {
        self.signal.as_ref().is_some_and(CancelSignal::is_cancelled)
    }

    /// Number of ancestors above this context
    pub fn depth(&self) -> usize {
        let mut depth = 0;
        let mut cursor = self.parent();
        while let Some(parent) = cursor {
            depth += 1;
            cursor = parent.parent();
        }
        depth
    }

    /// `traceId`, `requestId`, `operation`, `component`
    pub fn to_envelope_fields(&self) -> Map<String, Value> {
        let mut fields = self.correlation_fields();
        fields.insert("operation".into(), Value::String(self.operation.clone()));
        fields.insert("component".into(), Value::String(self.component.clone()));
        fields
    }

    /// Just the correlation pair
    pub fn correlation_fields(&self) -> Map<String, Value> {
        let mut fields = Map::new();
        fields.insert("traceId".into(), Value::String(self.trace_id.clone()));
        fields.insert("requestId".into(), Value::String(self.request_id.clone()));
        fields
    }

    /// The context of the operation currently running on this task
    pub fn current() -> Option<OperationContext> {
        CURRENT.try_with(|ctx| ctx.clone()).ok()
    }

    /// Run `fut` with this context as the current one
    pub async fn scope<F: Future>(self, fut: F) -> F::Output {
        CURRENT.scope(self, fut).await
    }

    /// Synchronous counterpart of [`OperationContext::scope`]
    pub fn sync_scope<R>(self, f: impl FnOnce() -> R) -> R {
        CURRENT.sync_scope(self, f)
    }
}

#[cfg(test)]
#[path = "context_tests.rs"]
mod tests;
