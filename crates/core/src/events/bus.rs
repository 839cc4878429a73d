// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Event bus for routing events to subscribers
//!
//! Delivery order for one emission is: exact-name handlers, then wildcard
//! handlers, then `"*"` catch-all handlers, each group in registration order.
//! The subscription table is never locked while a handler runs, so handlers
//! may subscribe, unsubscribe or emit.

use super::envelope::{HistoryEntry, StandardEnvelope, GLOBAL_CHANNEL};
use super::subscription::{EventPattern, SubscriberId};
use crate::clock::{iso8601, Clock, SystemClock};
use crate::config::HistoryConfig;
use crate::context::OperationContext;
use crate::id::CorrelationIds;
use serde_json::{Map, Value};
use std::collections::{BTreeSet, HashMap, VecDeque};
use std::future::Future;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::pin::Pin;
use std::sync::{Arc, Mutex, RwLock};

/// Error returned by a failing handler
pub type HandlerError = Box<dyn std::error::Error + Send + Sync>;
pub type HandlerResult = Result<(), HandlerError>;
pub type BoxFuture<T> = Pin<Box<dyn Future<Output = T> + Send>>;

type SyncHandler = Arc<dyn Fn(&Value, &str) -> HandlerResult + Send + Sync>;
type AsyncHandler = Arc<dyn Fn(Value, String) -> BoxFuture<HandlerResult> + Send + Sync>;

#[derive(Clone)]
enum Handler {
    Sync(SyncHandler),
    Async(AsyncHandler),
}

struct Registration {
    id: SubscriberId,
    pattern: EventPattern,
    handler: Handler,
    once: bool,
}

#[derive(Default)]
struct SubscriptionTable {
    exact: HashMap<String, Vec<Arc<Registration>>>,
    wildcard: Vec<Arc<Registration>>,
    catch_all: Vec<Arc<Registration>>,
    next_id: u64,
}

impl SubscriptionTable {
    fn insert(&mut self, pattern: EventPattern, handler: Handler, once: bool) -> SubscriberId {
        self.next_id += 1;
        let id = SubscriberId(self.next_id);
        let registration = Arc::new(Registration {
            id,
            pattern,
            handler,
            once,
        });
        if registration.pattern.is_catch_all() {
            self.catch_all.push(registration);
        } else if registration.pattern.is_exact() {
            self.exact
                .entry(registration.pattern.as_str().to_string())
                .or_default()
                .push(registration);
        } else {
            self.wildcard.push(registration);
        }
        id
    }

    fn remove(&mut self, id: SubscriberId) -> bool {
        let before = self.len();
        self.exact.retain(|_, regs| {
            regs.retain(|r| r.id != id);
            !regs.is_empty()
        });
        self.wildcard.retain(|r| r.id != id);
        self.catch_all.retain(|r| r.id != id);
        self.len() != before
    }

    fn matching(&self, name: &str) -> Vec<Arc<Registration>> {
        let exact = self.exact.get(name).into_iter().flatten();
        let wildcard = self.wildcard.iter().filter(|r| r.pattern.matches(name));
        exact.chain(wildcard).chain(&self.catch_all).cloned().collect()
    }

    fn len(&self) -> usize {
        self.exact.values().map(Vec::len).sum::<usize>() + self.wildcard.len() + self.catch_all.len()
    }
}

struct History {
    enabled: bool,
    limit: usize,
    entries: VecDeque<HistoryEntry>,
}

impl History {
    fn record(&mut self, entry: HistoryEntry) {
        if !self.enabled || self.limit == 0 {
            return;
        }
        while self.entries.len() >= self.limit {
            self.entries.pop_front();
        }
        self.entries.push_back(entry);
    }
}

/// The event bus routes events to matching subscribers
#[derive(Clone)]
pub struct EventBus {
    table: Arc<RwLock<SubscriptionTable>>,
    history: Arc<Mutex<History>>,
    clock: Arc<dyn Clock>,
    ids: CorrelationIds,
}

impl EventBus {
    pub fn new() -> Self {
        Self::with_config(
            &HistoryConfig::default(),
            Arc::new(SystemClock),
            CorrelationIds::default(),
        )
    }

    pub fn with_config(history: &HistoryConfig, clock: Arc<dyn Clock>, ids: CorrelationIds) -> Self {
        Self {
            table: Arc::new(RwLock::new(SubscriptionTable::default())),
            history: Arc::new(Mutex::new(History {
                enabled: history.enabled,
                limit: history.limit,
                entries: VecDeque::new(),
            })),
            clock,
            ids,
        }
    }

    /// Subscribe a synchronous handler; it receives `(payload, event_name)`
    pub fn subscribe<F>(&self, pattern: &str, handler: F) -> SubscriberId
    where
        F: Fn(&Value, &str) -> HandlerResult + Send + Sync + 'static,
    {
        self.register(pattern, Handler::Sync(Arc::new(handler)), false)
    }

    /// Subscribe an asynchronous handler; awaited in order by `emit_async`
    ///
    /// A synchronous `emit` only spawns it, so ordering against later
    /// handlers and failure logging are not tied to that call.
    pub fn subscribe_async<F, Fut>(&self, pattern: &str, handler: F) -> SubscriberId
    where
        F: Fn(Value, String) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        let handler: AsyncHandler =
            Arc::new(move |payload: Value, name: String| -> BoxFuture<HandlerResult> {
                Box::pin(handler(payload, name))
            });
        self.register(pattern, Handler::Async(handler), false)
    }

    /// Like `subscribe`, removed after the first delivery
    pub fn once<F>(&self, pattern: &str, handler: F) -> SubscriberId
    where
        F: Fn(&Value, &str) -> HandlerResult + Send + Sync + 'static,
    {
        self.register(pattern, Handler::Sync(Arc::new(handler)), true)
    }

    fn register(&self, pattern: &str, handler: Handler, once: bool) -> SubscriberId {
        let pattern = EventPattern::new(pattern);
        let mut table = self.table.write().unwrap_or_else(|e| e.into_inner());
        let id = table.insert(pattern.clone(), handler, once);
        tracing::trace!(subscriber = %id, pattern = %pattern, once, "subscribed");
        id
    }

    /// Unsubscribe; removing an unknown or already removed id is a no-op
    pub fn unsubscribe(&self, id: SubscriberId) -> bool {
        let mut table = self.table.write().unwrap_or_else(|e| e.into_inner());
        table.remove(id)
    }

    /// Drop every subscription
    pub fn clear(&self) {
        let mut table = self.table.write().unwrap_or_else(|e| e.into_inner());
        *table = SubscriptionTable {
            next_id: table.next_id,
            ..SubscriptionTable::default()
        };
    }

    /// Synchronous fan-out. Returns whether at least one handler matched.
    ///
    /// Async handlers are spawned onto the current tokio runtime, if any,
    /// without being awaited.
    pub fn emit(&self, name: &str, payload: Value) -> bool {
        self.record(name, &payload);
        let targets = self.take_matching(name);
        for registration in &targets {
            match &registration.handler {
                Handler::Sync(handler) => invoke_sync(registration, handler, &payload, name),
                Handler::Async(handler) => spawn_async(registration, handler, &payload, name),
            }
        }
        !targets.is_empty()
    }

    /// Sequential asynchronous fan-out; each handler settles before the next
    pub async fn emit_async(&self, name: &str, payload: Value) -> bool {
        self.record(name, &payload);
        let targets = self.take_matching(name);
        for registration in &targets {
            match &registration.handler {
                Handler::Sync(handler) => invoke_sync(registration, handler, &payload, name),
                Handler::Async(handler) => invoke_async(registration, handler, &payload, name).await,
            }
        }
        !targets.is_empty()
    }

    /// Build an envelope and emit it on `component:action`, then on `event`
    pub fn emit_standardized(
        &self,
        component: &str,
        action: &str,
        payload: Map<String, Value>,
    ) -> StandardEnvelope {
        let envelope = self.envelope(component, action, payload);
        self.emit(&envelope.name(), envelope.to_value());
        self.emit(GLOBAL_CHANNEL, envelope.to_global_value());
        envelope
    }

    pub async fn emit_standardized_async(
        &self,
        component: &str,
        action: &str,
        payload: Map<String, Value>,
    ) -> StandardEnvelope {
        let envelope = self.envelope(component, action, payload);
        self.emit_async(&envelope.name(), envelope.to_value()).await;
        self.emit_async(GLOBAL_CHANNEL, envelope.to_global_value())
            .await;
        envelope
    }

    fn envelope(&self, component: &str, action: &str, payload: Map<String, Value>) -> StandardEnvelope {
        if !super::registry::is_valid_event_name(&format!("{component}:{action}")) {
            tracing::warn!(component, action, "event name does not follow component:action grammar");
        }
        StandardEnvelope::build(self.clock.as_ref(), &self.ids, component, action, payload)
    }

    /// Registered patterns, sorted
    pub fn list_events(&self) -> Vec<String> {
        let table = self.table.read().unwrap_or_else(|e| e.into_inner());
        let patterns: BTreeSet<String> = table
            .exact
            .keys()
            .cloned()
            .chain(table.wildcard.iter().map(|r| r.pattern.as_str().to_string()))
            .chain(table.catch_all.iter().map(|r| r.pattern.as_str().to_string()))
            .collect();
        patterns.into_iter().collect()
    }

    /// Number of handlers an emission of `name` would reach
    pub fn listener_count(&self, name: &str) -> usize {
        let table = self.table.read().unwrap_or_else(|e| e.into_inner());
        table.matching(name).len()
    }

    /// Get count of active subscriptions
    pub fn subscriber_count(&self) -> usize {
        self.table.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    /// Recorded emissions, oldest first (empty unless history is enabled)
    pub fn history(&self) -> Vec<HistoryEntry> {
        let history = self.history.lock().unwrap_or_else(|e| e.into_inner());
        history.entries.iter().cloned().collect()
    }

    pub fn clear_history(&self) {
        let mut history = self.history.lock().unwrap_or_else(|e| e.into_inner());
        history.entries.clear();
    }

    fn record(&self, name: &str, payload: &Value) {
        let mut history = self.history.lock().unwrap_or_else(|e| e.into_inner());
        if history.enabled {
            history.record(HistoryEntry {
                event: name.to_string(),
                payload: payload.clone(),
                recorded_at: iso8601(&self.clock.now()),
            });
        }
    }

    /// Resolve targets and drop `once` registrations before any handler runs
    fn take_matching(&self, name: &str) -> Vec<Arc<Registration>> {
        let mut table = self.table.write().unwrap_or_else(|e| e.into_inner());
        let targets = table.matching(name);
        for registration in targets.iter().filter(|r| r.once) {
            table.remove(registration.id);
        }
        targets
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

fn invoke_sync(registration: &Registration, handler: &SyncHandler, payload: &Value, name: &str) {
    match catch_unwind(AssertUnwindSafe(|| handler(payload, name))) {
        Ok(Ok(())) => {}
        Ok(Err(error)) => log_failure(registration, name, &*error),
        Err(_) => log_panic(registration, name),
    }
}

/// Runs the handler on its own task so a panic stays inside it
async fn invoke_async(
    registration: &Registration,
    handler: &AsyncHandler,
    payload: &Value,
    name: &str,
) {
    let future = handler(payload.clone(), name.to_string());
    let Ok(runtime) = tokio::runtime::Handle::try_current() else {
        if let Err(error) = future.await {
            log_failure(registration, name, &*error);
        }
        return;
    };
    let future: BoxFuture<HandlerResult> = match OperationContext::current() {
        Some(ctx) => Box::pin(ctx.scope(future)),
        None => future,
    };
    match runtime.spawn(future).await {
        Ok(Ok(())) => {}
        Ok(Err(error)) => log_failure(registration, name, &*error),
        Err(join) if join.is_panic() => log_panic(registration, name),
        Err(join) => {
            tracing::warn!(
                subscriber = %registration.id,
                event = name,
                error = %join,
                "async handler cancelled"
            );
        }
    }
}

fn spawn_async(registration: &Arc<Registration>, handler: &AsyncHandler, payload: &Value, name: &str) {
    let Ok(runtime) = tokio::runtime::Handle::try_current() else {
        tracing::warn!(
            subscriber = %registration.id,
            event = name,
            "async handler skipped: no runtime for synchronous emit"
        );
        return;
    };
    let future = handler(payload.clone(), name.to_string());
    let registration = Arc::clone(registration);
    let name = name.to_string();
    runtime.spawn(async move {
        if let Err(error) = future.await {
            log_failure(&registration, &name, &*error);
        }
    });
}

fn log_panic(registration: &Registration, name: &str) {
    tracing::error!(
        subscriber = %registration.id,
        pattern = %registration.pattern,
        event = name,
        "event handler panicked"
    );
}

fn log_failure(registration: &Registration, name: &str, error: &(dyn std::error::Error + Send + Sync)) {
    tracing::error!(
        subscriber = %registration.id,
        pattern = %registration.pattern,
        event = name,
        error = %error,
        "event handler failed"
    );
}

#[cfg(test)]
#[path = "bus_tests.rs"]
mod tests;
