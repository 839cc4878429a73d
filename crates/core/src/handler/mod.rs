// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Central error handling
//!
//! Every error that reaches [`ErrorHandler::handle`] goes through the same
//! steps: enrichment with the operation context, statistics, pattern
//! actions, threshold evaluation, publication of `error:occurred` (and one
//! `error:alert_triggered` per firing threshold), and finally recovery.
//!
//! The handler publishes on the bus but never subscribes to it. Handlers
//! that call back into [`ErrorHandler::handle`] from an `error:*`
//! subscription will loop.

mod hooks;
mod statistics;

pub use hooks::{AlertThreshold, ErrorPattern, RecoveryKey, RecoveryRequest, RecoveryStrategy, Severity};
pub use statistics::{ErrorStatistics, RecentError};

use crate::clock::{iso8601, Clock};
use crate::config::{CoreConfig, PatternMode};
use crate::context::OperationContext;
use crate::error::{ErrorKind, KnoaError};
use crate::events::EventBus;
use crate::id::CorrelationIds;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, Mutex, RwLock};

/// Result of handling one error
#[derive(Debug)]
#[must_use]
pub enum Resolution {
    /// A strategy produced a substitute result
    Recovered(Value),
    /// No strategy applied; the enriched error is handed back
    Unresolved(KnoaError),
    /// A strategy ran and failed
    Fatal(KnoaError),
}

impl Resolution {
    pub fn into_result(self) -> Result<Value, KnoaError> {
        match self {
            Resolution::Recovered(value) => Ok(value),
            Resolution::Unresolved(error) | Resolution::Fatal(error) => Err(error),
        }
    }

    pub fn is_recovered(&self) -> bool {
        matches!(self, Resolution::Recovered(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HandlerSettings {
    pub recovery_attempts: u32,
    pub recent_errors_limit: usize,
    pub pattern_mode: PatternMode,
}

impl Default for HandlerSettings {
    fn default() -> Self {
        Self::from(&CoreConfig::default())
    }
}

impl From<&CoreConfig> for HandlerSettings {
    fn from(config: &CoreConfig) -> Self {
        Self {
            recovery_attempts: config.recovery_attempts,
            recent_errors_limit: config.recent_errors_limit,
            pattern_mode: config.pattern_mode,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ThresholdSummary {
    pub name: String,
    pub severity: Severity,
    pub description: String,
}

/// Snapshot for monitoring views
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardData {
    pub statistics: ErrorStatistics,
    pub patterns: Vec<String>,
    pub thresholds: Vec<ThresholdSummary>,
    pub recovery_strategies: Vec<String>,
    pub generated_at: String,
}

#[derive(Default)]
struct Hooks {
    patterns: Vec<ErrorPattern>,
    thresholds: Vec<AlertThreshold>,
    by_code: HashMap<String, RecoveryStrategy>,
    by_kind: HashMap<ErrorKind, RecoveryStrategy>,
    /// Registration order, for reporting
    keys: Vec<RecoveryKey>,
}

struct Inner {
    bus: EventBus,
    clock: Arc<dyn Clock>,
    ids: CorrelationIds,
    settings: HandlerSettings,
    hooks: RwLock<Hooks>,
    stats: Mutex<ErrorStatistics>,
}

/// An error after steps 1 to 5, ready to publish and recover
struct Handled {
    error: KnoaError,
    context: OperationContext,
    component: String,
    operation: String,
    alerts: Vec<AlertThreshold>,
}

#[derive(Clone)]
pub struct ErrorHandler {
    inner: Arc<Inner>,
}

impl ErrorHandler {
    pub fn new(
        bus: EventBus,
        clock: Arc<dyn Clock>,
        ids: CorrelationIds,
        settings: HandlerSettings,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                bus,
                clock,
                ids,
                settings,
                hooks: RwLock::new(Hooks::default()),
                stats: Mutex::new(ErrorStatistics::default()),
            }),
        }
    }

    pub fn register_error_pattern(&self, pattern: ErrorPattern) {
        self.write_hooks().patterns.push(pattern);
    }

    pub fn register_alert_threshold(&self, threshold: AlertThreshold) {
        self.write_hooks().thresholds.push(threshold);
    }

    /// Registering the same key again replaces the strategy
    pub fn register_recovery_strategy(&self, key: RecoveryKey, strategy: RecoveryStrategy) {
        let mut hooks = self.write_hooks();
        if !hooks.keys.contains(&key) {
            hooks.keys.push(key.clone());
        }
        match key {
            RecoveryKey::Code(code) => {
                hooks.by_code.insert(code, strategy);
            }
            RecoveryKey::Kind(kind) => {
                hooks.by_kind.insert(kind, strategy);
            }
        }
    }

    /// Handle an error and publish its events synchronously
    pub fn handle(
        &self,
        error: KnoaError,
        component: &str,
        operation: &str,
        context: Option<&OperationContext>,
    ) -> Resolution {
        let handled = self.prepare(error, component, operation, context);
        self.inner
            .bus
            .emit_standardized("error", "occurred", occurred_payload(&handled));
        for threshold in &handled.alerts {
            self.inner.bus.emit_standardized(
                "error",
                "alert_triggered",
                alert_payload(&handled, threshold),
            );
        }
        self.recover(handled)
    }

    /// Same as [`ErrorHandler::handle`], awaiting async subscribers
    pub async fn handle_async(
        &self,
        error: KnoaError,
        component: &str,
        operation: &str,
        context: Option<&OperationContext>,
    ) -> Resolution {
        let handled = self.prepare(error, component, operation, context);
        self.inner
            .bus
            .emit_standardized_async("error", "occurred", occurred_payload(&handled))
            .await;
        for threshold in &handled.alerts {
            self.inner
                .bus
                .emit_standardized_async("error", "alert_triggered", alert_payload(&handled, threshold))
                .await;
        }
        self.recover(handled)
    }

    /// Wrap an arbitrary error as an application error, then handle it
    pub fn handle_foreign<E>(
        &self,
        error: E,
        component: &str,
        operation: &str,
        context: Option<&OperationContext>,
    ) -> Resolution
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        self.handle(KnoaError::from_foreign(error), component, operation, context)
    }

    pub fn error_statistics(&self) -> ErrorStatistics {
        self.inner
            .stats
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn reset_statistics(&self) {
        *self.inner.stats.lock().unwrap_or_else(|e| e.into_inner()) = ErrorStatistics::default();
    }

    pub fn dashboard_data(&self) -> DashboardData {
        let hooks = self.read_hooks();
        DashboardData {
            statistics: self.error_statistics(),
            patterns: hooks.patterns.iter().map(|p| p.name.clone()).collect(),
            thresholds: hooks
                .thresholds
                .iter()
                .map(|t| ThresholdSummary {
                    name: t.name.clone(),
                    severity: t.severity,
                    description: t.description.clone(),
                })
                .collect(),
            recovery_strategies: hooks.keys.iter().map(ToString::to_string).collect(),
            generated_at: iso8601(&self.inner.clock.now()),
        }
    }

    fn prepare(
        &self,
        mut error: KnoaError,
        component: &str,
        operation: &str,
        context: Option<&OperationContext>,
    ) -> Handled {
        let context = match context {
            Some(ctx) => ctx.clone(),
            None => OperationContext::derive(&self.inner.ids, operation, component, None),
        };

        let mut fields = context.correlation_fields();
        fields.insert("operation".into(), Value::String(operation.to_string()));
        fields.insert("component".into(), Value::String(component.to_string()));
        let now = self.inner.clock.now();
        error.enrich(fields, now);

        if error.is_recoverable() {
            tracing::warn!(
                kind = %error.kind(),
                code = error.code(),
                component,
                operation,
                trace_id = context.trace_id(),
                "{}",
                error.message()
            );
        } else {
            tracing::error!(
                kind = %error.kind(),
                code = error.code(),
                component,
                operation,
                trace_id = context.trace_id(),
                "{}",
                error.message()
            );
        }

        let stats = {
            let mut stats = self.inner.stats.lock().unwrap_or_else(|e| e.into_inner());
            stats.record(
                &error,
                component,
                operation,
                iso8601(&now),
                self.inner.settings.recent_errors_limit,
            );
            stats.clone()
        };

        // Hooks run without the lock so actions may register more hooks
        let (patterns, thresholds) = {
            let hooks = self.read_hooks();
            (hooks.patterns.clone(), hooks.thresholds.clone())
        };

        for pattern in &patterns {
            let matched = guarded("pattern detector", &pattern.name, || {
                (pattern.detector)(&error, &context)
            })
            .unwrap_or(false);
            if !matched {
                continue;
            }
            match guarded("pattern action", &pattern.name, || (pattern.action)(&error, &context)) {
                Some(Err(e)) => {
                    tracing::error!(pattern = %pattern.name, error = %e, "error pattern action failed")
                }
                Some(Ok(())) => tracing::debug!(pattern = %pattern.name, "error pattern matched"),
                None => {}
            }
            if self.inner.settings.pattern_mode == PatternMode::First {
                break;
            }
        }

        let alerts = thresholds
            .into_iter()
            .filter(|t| {
                guarded("alert threshold", &t.name, || (t.condition)(&stats, &error)).unwrap_or(false)
            })
            .collect();

        Handled {
            error,
            context,
            component: component.to_string(),
            operation: operation.to_string(),
            alerts,
        }
    }

    fn recover(&self, handled: Handled) -> Resolution {
        let Handled {
            error,
            context,
            component,
            operation,
            ..
        } = handled;

        if !error.is_recoverable() {
            return Resolution::Unresolved(error);
        }
        let Some((key, strategy)) = self.strategy_for(&error) else {
            return Resolution::Unresolved(error);
        };

        let attempts = self.inner.settings.recovery_attempts.max(1);
        let mut attempt = 1;
        loop {
            let request = RecoveryRequest {
                error: &error,
                component: &component,
                operation: &operation,
                context: &context,
                attempt,
            };
            let outcome = guarded("recovery strategy", &key.to_string(), || strategy.attempt(&request));
            match outcome {
                Some(Ok(value)) => {
                    tracing::info!(strategy = %key, attempt, operation = %operation, "recovered from error");
                    return Resolution::Recovered(value);
                }
                Some(Err(failure)) if failure.is_recoverable() && attempt < attempts => {
                    tracing::debug!(strategy = %key, attempt, error = %failure, "recovery attempt failed, retrying");
                    attempt += 1;
                }
                Some(Err(mut failure)) => {
                    tracing::error!(strategy = %key, attempt, error = %failure, "recovery failed");
                    failure.enrich(error.context().clone(), self.inner.clock.now());
                    return Resolution::Fatal(failure);
                }
                None => {
                    let mut failure = KnoaError::application(format!("recovery strategy {key} panicked"))
                        .with_recoverable(false);
                    failure.enrich(error.context().clone(), self.inner.clock.now());
                    return Resolution::Fatal(failure);
                }
            }
        }
    }

    /// Code-keyed strategies take precedence over kind-keyed ones
    fn strategy_for(&self, error: &KnoaError) -> Option<(RecoveryKey, RecoveryStrategy)> {
        let hooks = self.read_hooks();
        if let Some(strategy) = hooks.by_code.get(error.code()) {
            return Some((RecoveryKey::Code(error.code().to_string()), strategy.clone()));
        }
        hooks
            .by_kind
            .get(&error.kind())
            .map(|strategy| (RecoveryKey::Kind(error.kind()), strategy.clone()))
    }

    fn read_hooks(&self) -> std::sync::RwLockReadGuard<'_, Hooks> {
        self.inner.hooks.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write_hooks(&self) -> std::sync::RwLockWriteGuard<'_, Hooks> {
        self.inner.hooks.write().unwrap_or_else(|e| e.into_inner())
    }
}

/// Run a user hook, turning a panic into `None`
fn guarded<R>(what: &str, name: &str, f: impl FnOnce() -> R) -> Option<R> {
    match catch_unwind(AssertUnwindSafe(f)) {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::error!(hook = what, name, "error handler hook panicked");
            None
        }
    }
}

fn occurred_payload(handled: &Handled) -> Map<String, Value> {
    let mut payload = match serde_json::to_value(handled.error.to_structured()) {
        Ok(Value::Object(map)) => map,
        _ => Map::new(),
    };
    payload.insert("operation".into(), Value::String(handled.operation.clone()));
    payload.extend(handled.context.correlation_fields());
    payload
}

fn alert_payload(handled: &Handled, threshold: &AlertThreshold) -> Map<String, Value> {
    let mut payload = Map::new();
    payload.insert("threshold".into(), Value::String(threshold.name.clone()));
    payload.insert("severity".into(), Value::String(threshold.severity.to_string()));
    payload.insert("description".into(), Value::String(threshold.description.clone()));
    payload.insert("errorCode".into(), Value::String(handled.error.code().to_string()));
    payload.insert("errorKind".into(), Value::String(handled.error.kind().to_string()));
    payload.insert("errorComponent".into(), Value::String(handled.component.clone()));
    payload.extend(handled.context.correlation_fields());
    payload
}
