// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! knoa-core: event and error core of the knoa workflow tracker
//!
//! This crate provides:
//! - `EventBus` with wildcard subscriptions, history and sync/async fan-out
//! - A closed error taxonomy and the `ErrorHandler` pipeline
//!   (statistics, patterns, alert thresholds, recovery)
//! - `OperationContext` for trace/request correlation
//! - The event-name registry and legacy alias shim
//! - Validator and storage contracts used by adapters and managers

pub mod clock;
pub mod config;
pub mod context;
pub mod error;
pub mod events;
pub mod handler;
pub mod id;
pub mod runtime;
pub mod storage;
pub mod validate;

#[cfg(any(test, feature = "test-support"))]
pub mod testing;

pub use clock::{iso8601, Clock, FakeClock, SystemClock};
pub use config::{ConfigError, CoreConfig, HistoryConfig, LogLevel, PatternMode};
pub use context::{CancelSignal, OperationContext};
pub use error::{ErrorEnvelope, ErrorKind, KnoaError, StructuredError};
pub use events::{
    CompatibilityShim, EventBus, EventNameRegistry, EventPattern, HandlerResult,
    StandardEnvelope, SubscriberId, GLOBAL_CHANNEL,
};
pub use handler::{
    AlertThreshold, DashboardData, ErrorHandler, ErrorPattern, ErrorStatistics, HandlerSettings,
    RecoveryKey, RecoveryRequest, RecoveryStrategy, Resolution, Severity,
};
pub use id::{CorrelationIds, IdGen, SequentialIdGen, TimestampIdGen};
pub use runtime::{Core, CoreBuilder};
pub use storage::{Storage, StorageError};
pub use validate::{Check, ParamSchema, ValidationReport, Validator};
