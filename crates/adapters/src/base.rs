// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The uniform adapter pipeline
//!
//! Every adapter method runs the same steps: derive an operation context,
//! validate parameters, call the manager with the context in scope, publish
//! `{component}:{action}` plus its legacy aliases on success, and route any
//! failure through the error handler.

use crate::outcome::{AdapterResult, ErrorPolicy, Outcome};
use knoa_core::{Core, KnoaError, OperationContext, ParamSchema, Resolution, Validator};
use serde::Serialize;
use serde_json::{Map, Value};
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;
use tracing::Instrument;

/// Static description of one adapter method
#[derive(Debug)]
pub struct Operation {
    /// Name reported in contexts, statistics and error envelopes
    pub name: &'static str,
    /// Event action published on success; `None` for queries
    pub action: Option<&'static str>,
    pub schema: ParamSchema,
    pub policy: ErrorPolicy,
    /// Entity handed to the adapter's validator, if it has one
    pub entity: Option<&'static str>,
}

impl Operation {
    /// A mutating method: publishes `action`, returns failures as envelopes
    pub fn command(name: &'static str, action: &'static str, schema: ParamSchema) -> Self {
        Self {
            name,
            action: Some(action),
            schema,
            policy: ErrorPolicy::Envelope,
            entity: None,
        }
    }

    /// A read-only method: publishes nothing, propagates failures
    pub fn query(name: &'static str, schema: ParamSchema) -> Self {
        Self {
            name,
            action: None,
            schema,
            policy: ErrorPolicy::Propagate,
            entity: None,
        }
    }

    pub fn with_policy(mut self, policy: ErrorPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn validating(mut self, entity: &'static str) -> Self {
        self.entity = Some(entity);
        self
    }
}

/// Collaborators shared by every method of one adapter
#[derive(Clone)]
pub struct AdapterBase {
    core: Core,
    adapter: &'static str,
    component: &'static str,
    validator: Option<Arc<dyn Validator>>,
    context: Option<OperationContext>,
}

impl AdapterBase {
    pub fn new(core: Core, adapter: &'static str, component: &'static str) -> Self {
        Self {
            core,
            adapter,
            component,
            validator: None,
            context: None,
        }
    }

    pub fn with_validator(mut self, validator: Arc<dyn Validator>) -> Self {
        self.validator = Some(validator);
        self
    }

    /// A copy whose calls run under `context` instead of a derived one
    pub fn with_context(&self, context: OperationContext) -> Self {
        Self {
            context: Some(context),
            ..self.clone()
        }
    }

    pub fn core(&self) -> &Core {
        &self.core
    }

    pub fn component(&self) -> &'static str {
        self.component
    }

    /// The caller's context, else a child of the one in scope (or a root)
    pub fn context_for(&self, op: &Operation, params: &Map<String, Value>) -> OperationContext {
        if let Some(context) = &self.context {
            return context.clone();
        }
        let mut metadata = Map::new();
        metadata.insert("adapter".into(), Value::String(self.adapter.to_string()));
        metadata.insert("method".into(), Value::String(op.name.to_string()));
        metadata.insert(
            "args".into(),
            Value::Array(params.keys().cloned().map(Value::String).collect()),
        );
        OperationContext::derive(self.core.ids(), op.name, self.component, Some(metadata))
    }

    pub async fn run<T, F, Fut>(
        &self,
        op: &Operation,
        params: Map<String, Value>,
        call: F,
    ) -> AdapterResult<T>
    where
        T: Serialize,
        F: FnOnce(OperationContext) -> Fut,
        Fut: Future<Output = Result<T, KnoaError>>,
    {
        let ctx = self.context_for(op, &params);
        let span = self.span(op, &ctx);

        async move {
            let start = Instant::now();
            if let Err(error) = self.validate(op, &params) {
                let resolution = self
                    .core
                    .error_handler()
                    .handle_async(error, self.component, op.name, Some(&ctx))
                    .await;
                return self.finish(op, resolution, true, start);
            }

            let result = match cancelled(&ctx) {
                Some(error) => Err(error),
                None => ctx.clone().scope(call(ctx.clone())).await,
            };

            match result {
                Ok(value) => {
                    if let Some(action) = op.action {
                        let payload = event_payload(&params, &value, &ctx);
                        let bus = self.core.bus();
                        let envelope = bus
                            .emit_standardized_async(self.component, action, payload)
                            .await;
                        self.core.shim().publish_aliases_async(bus, &envelope).await;
                    }
                    tracing::info!(elapsed_ms = start.elapsed().as_millis() as u64, "completed");
                    Ok(Outcome::Completed(value))
                }
                Err(error) => {
                    let resolution = self
                        .core
                        .error_handler()
                        .handle_async(error, self.component, op.name, Some(&ctx))
                        .await;
                    self.finish(op, resolution, false, start)
                }
            }
        }
        .instrument(span)
        .await
    }

    /// Synchronous counterpart of [`AdapterBase::run`] for blocking managers
    pub fn run_sync<T, F>(&self, op: &Operation, params: Map<String, Value>, call: F) -> AdapterResult<T>
    where
        T: Serialize,
        F: FnOnce(&OperationContext) -> Result<T, KnoaError>,
    {
        let ctx = self.context_for(op, &params);
        let span = self.span(op, &ctx);
        let _guard = span.enter();

        let start = Instant::now();
        if let Err(error) = self.validate(op, &params) {
            let resolution = self
                .core
                .error_handler()
                .handle(error, self.component, op.name, Some(&ctx));
            return self.finish(op, resolution, true, start);
        }

        let result = match cancelled(&ctx) {
            Some(error) => Err(error),
            None => {
                let scoped = ctx.clone();
                scoped.sync_scope(|| call(&ctx))
            }
        };

        match result {
            Ok(value) => {
                if let Some(action) = op.action {
                    let payload = event_payload(&params, &value, &ctx);
                    let bus = self.core.bus();
                    let envelope = bus.emit_standardized(self.component, action, payload);
                    self.core.shim().publish_aliases(bus, &envelope);
                }
                tracing::info!(elapsed_ms = start.elapsed().as_millis() as u64, "completed");
                Ok(Outcome::Completed(value))
            }
            Err(error) => {
                let resolution = self
                    .core
                    .error_handler()
                    .handle(error, self.component, op.name, Some(&ctx));
                self.finish(op, resolution, false, start)
            }
        }
    }

    fn span(&self, op: &Operation, ctx: &OperationContext) -> tracing::Span {
        tracing::info_span!(
            "adapter",
            adapter = self.adapter,
            operation = op.name,
            trace_id = ctx.trace_id(),
            request_id = ctx.request_id()
        )
    }

    fn validate(&self, op: &Operation, params: &Map<String, Value>) -> Result<(), KnoaError> {
        op.schema.check(params)?;
        if let (Some(entity), Some(validator)) = (op.entity, &self.validator) {
            let report = validator.validate(&Value::Object(params.clone()));
            if let Some(error) = report.into_error(entity) {
                return Err(error);
            }
        }
        Ok(())
    }

    fn finish<T>(
        &self,
        op: &Operation,
        resolution: Resolution,
        validation: bool,
        start: Instant,
    ) -> AdapterResult<T> {
        let elapsed_ms = start.elapsed().as_millis() as u64;
        match resolution {
            Resolution::Recovered(value) => {
                tracing::info!(elapsed_ms, "recovered");
                Ok(Outcome::Recovered(value))
            }
            Resolution::Fatal(error) => {
                tracing::error!(elapsed_ms, error = %error, "failed, recovery failed");
                Err(error)
            }
            Resolution::Unresolved(error) if validation || op.policy == ErrorPolicy::Envelope => {
                tracing::info!(elapsed_ms, code = error.code(), "failed");
                Ok(Outcome::Failed(error.to_envelope(op.name)))
            }
            Resolution::Unresolved(error) => {
                tracing::info!(elapsed_ms, code = error.code(), "failed, propagating");
                Err(error)
            }
        }
    }
}

fn cancelled(ctx: &OperationContext) -> Option<KnoaError> {
    ctx.is_cancelled().then(|| {
        KnoaError::timeout("operation cancelled before the manager was called")
            .with_code("ERR_TIMEOUT_CANCELLED")
    })
}

/// Inputs overlaid with the result's fields, plus the correlation pair
fn event_payload<T: Serialize>(
    params: &Map<String, Value>,
    result: &T,
    ctx: &OperationContext,
) -> Map<String, Value> {
    let mut payload = params.clone();
    match serde_json::to_value(result) {
        Ok(Value::Object(fields)) => payload.extend(fields),
        Ok(Value::Null) => {}
        Ok(other) => {
            payload.insert("result".into(), other);
        }
        Err(e) => tracing::warn!(error = %e, "manager result is not serializable"),
    }
    payload.extend(ctx.correlation_fields());
    payload
}

/// Serialize an input struct into the parameter map validation sees
pub fn to_params<S: Serialize>(input: &S) -> Map<String, Value> {
    match serde_json::to_value(input) {
        Ok(Value::Object(map)) => map,
        _ => Map::new(),
    }
}

/// Build a parameter map from literal pairs
pub fn params<const N: usize>(pairs: [(&str, Value); N]) -> Map<String, Value> {
    pairs
        .into_iter()
        .map(|(key, value)| (key.to_string(), value))
        .collect()
}

#[cfg(test)]
#[path = "base_tests.rs"]
mod tests;
