// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Patterns, alert thresholds and recovery strategies

use super::statistics::ErrorStatistics;
use crate::context::OperationContext;
use crate::error::{ErrorKind, KnoaError};
use crate::events::HandlerError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

type Detector = dyn Fn(&KnoaError, &OperationContext) -> bool + Send + Sync;
type PatternAction = dyn Fn(&KnoaError, &OperationContext) -> Result<(), HandlerError> + Send + Sync;
type Condition = dyn Fn(&ErrorStatistics, &KnoaError) -> bool + Send + Sync;
type Strategy = dyn Fn(&RecoveryRequest<'_>) -> Result<Value, KnoaError> + Send + Sync;

/// A named detector with a side-effecting action
#[derive(Clone)]
pub struct ErrorPattern {
    pub(crate) name: String,
    pub(crate) detector: Arc<Detector>,
    pub(crate) action: Arc<PatternAction>,
}

impl ErrorPattern {
    pub fn new<D, A>(name: impl Into<String>, detector: D, action: A) -> Self
    where
        D: Fn(&KnoaError, &OperationContext) -> bool + Send + Sync + 'static,
        A: Fn(&KnoaError, &OperationContext) -> Result<(), HandlerError> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            detector: Arc::new(detector),
            action: Arc::new(action),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Debug for ErrorPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ErrorPattern").field("name", &self.name).finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
            Severity::Critical => "critical",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Condition over the running statistics; fires an alert each time it holds
#[derive(Clone)]
pub struct AlertThreshold {
    pub(crate) name: String,
    pub(crate) condition: Arc<Condition>,
    pub(crate) severity: Severity,
    pub(crate) description: String,
}

impl AlertThreshold {
    pub fn new<C>(
        name: impl Into<String>,
        condition: C,
        severity: Severity,
        description: impl Into<String>,
    ) -> Self
    where
        C: Fn(&ErrorStatistics, &KnoaError) -> bool + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            condition: Arc::new(condition),
            severity,
            description: description.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn description(&self) -> &str {
        &self.description
    }
}

impl fmt::Debug for AlertThreshold {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AlertThreshold")
            .field("name", &self.name)
            .field("severity", &self.severity)
            .finish()
    }
}

/// What a recovery strategy is registered under
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RecoveryKey {
    Code(String),
    Kind(ErrorKind),
}

impl fmt::Display for RecoveryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecoveryKey::Code(code) => write!(f, "code:{code}"),
            RecoveryKey::Kind(kind) => write!(f, "kind:{kind}"),
        }
    }
}

/// Everything a strategy may consult when producing a substitute result
#[derive(Debug)]
pub struct RecoveryRequest<'a> {
    pub error: &'a KnoaError,
    pub component: &'a str,
    pub operation: &'a str,
    pub context: &'a OperationContext,
    /// 1-based
    pub attempt: u32,
}

#[derive(Clone)]
pub struct RecoveryStrategy(pub(crate) Arc<Strategy>);

impl RecoveryStrategy {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&RecoveryRequest<'_>) -> Result<Value, KnoaError> + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    pub(crate) fn attempt(&self, request: &RecoveryRequest<'_>) -> Result<Value, KnoaError> {
        (self.0)(request)
    }
}

impl fmt::Debug for RecoveryStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("RecoveryStrategy")
    }
}
