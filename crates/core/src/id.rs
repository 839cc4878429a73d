// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Correlation id generators

use crate::clock::{Clock, SystemClock};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

pub trait IdGen: Send + Sync {
    fn next(&self) -> String;
}

/// `<prefix>-<millis>-<random>` identifiers for production use
#[derive(Clone)]
pub struct TimestampIdGen {
    prefix: String,
    clock: Arc<dyn Clock>,
}

impl TimestampIdGen {
    pub fn new(prefix: impl Into<String>, clock: Arc<dyn Clock>) -> Self {
        Self {
            prefix: prefix.into(),
            clock,
        }
    }
}

impl IdGen for TimestampIdGen {
    fn next(&self) -> String {
        let random = uuid::Uuid::new_v4().simple().to_string();
        format!(
            "{}-{}-{}",
            self.prefix,
            self.clock.now_millis(),
            &random[..9]
        )
    }
}

/// Counting generator: `<prefix>-1`, `<prefix>-2`, ...
#[derive(Clone)]
pub struct SequentialIdGen {
    prefix: String,
    counter: Arc<AtomicU64>,
}

impl SequentialIdGen {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            counter: Arc::new(AtomicU64::new(1)),
        }
    }
}

impl Default for SequentialIdGen {
    fn default() -> Self {
        Self::new("id")
    }
}

impl IdGen for SequentialIdGen {
    fn next(&self) -> String {
        let n = self.counter.fetch_add(1, Ordering::SeqCst);
        format!("{}-{}", self.prefix, n)
    }
}

/// The pair of generators behind every `(traceId, requestId)`
#[derive(Clone)]
pub struct CorrelationIds {
    trace: Arc<dyn IdGen>,
    request: Arc<dyn IdGen>,
}

impl CorrelationIds {
    pub fn new(trace: Arc<dyn IdGen>, request: Arc<dyn IdGen>) -> Self {
        Self { trace, request }
    }

    /// `trace-<ms>-<rand>` / `req-<ms>-<rand>` driven by the given clock
    pub fn timestamped(clock: Arc<dyn Clock>) -> Self {
        Self::new(
            Arc::new(TimestampIdGen::new("trace", Arc::clone(&clock))),
            Arc::new(TimestampIdGen::new("req", clock)),
        )
    }

    /// `trace-1`, `trace-2`, ... and `req-1`, `req-2`, ...
    pub fn sequential() -> Self {
        Self::new(
            Arc::new(SequentialIdGen::new("trace")),
            Arc::new(SequentialIdGen::new("req")),
        )
    }

    pub fn trace_id(&self) -> String {
        self.trace.next()
    }

    pub fn request_id(&self) -> String {
        self.request.next()
    }
}

impl Default for CorrelationIds {
    fn default() -> Self {
        Self::timestamped(Arc::new(SystemClock))
    }
}
