// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error counters and the recent-errors window

use crate::error::{ErrorKind, KnoaError};
use serde::Serialize;
use std::collections::{BTreeMap, VecDeque};

/// One entry of the recent-errors window
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentError {
    pub timestamp: String,
    pub kind: ErrorKind,
    pub code: String,
    pub message: String,
    pub component: String,
    pub operation: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ErrorStatistics {
    pub total_errors: u64,
    pub by_kind: BTreeMap<ErrorKind, u64>,
    pub by_component: BTreeMap<String, u64>,
    /// Keyed by `component:operation`
    pub by_operation: BTreeMap<String, u64>,
    pub recent: VecDeque<RecentError>,
}

impl ErrorStatistics {
    pub(crate) fn record(
        &mut self,
        error: &KnoaError,
        component: &str,
        operation: &str,
        timestamp: String,
        recent_limit: usize,
    ) {
        self.total_errors += 1;
        *self.by_kind.entry(error.kind()).or_default() += 1;
        *self.by_component.entry(component.to_string()).or_default() += 1;
        *self
            .by_operation
            .entry(format!("{component}:{operation}"))
            .or_default() += 1;

        if recent_limit == 0 {
            return;
        }
        while self.recent.len() >= recent_limit {
            self.recent.pop_front();
        }
        self.recent.push_back(RecentError {
            timestamp,
            kind: error.kind(),
            code: error.code().to_string(),
            message: error.message().to_string(),
            component: component.to_string(),
            operation: operation.to_string(),
        });
    }

    pub fn count_for_kind(&self, kind: ErrorKind) -> u64 {
        self.by_kind.get(&kind).copied().unwrap_or(0)
    }

    pub fn count_for_component(&self, component: &str) -> u64 {
        self.by_component.get(component).copied().unwrap_or(0)
    }

    pub fn count_for_operation(&self, component: &str, operation: &str) -> u64 {
        self.by_operation
            .get(&format!("{component}:{operation}"))
            .copied()
            .unwrap_or(0)
    }
}
