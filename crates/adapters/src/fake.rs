// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared plumbing for the fake managers
#![cfg_attr(coverage_nightly, coverage(off))]

use knoa_core::KnoaError;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// Errors queued to be returned by the next manager calls
#[derive(Clone, Default)]
pub struct FailureQueue {
    queue: Arc<Mutex<VecDeque<KnoaError>>>,
}

impl FailureQueue {
    pub fn push(&self, error: KnoaError) {
        self.queue
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push_back(error);
    }

    /// `Err` with the next queued error, if any
    pub fn check(&self) -> Result<(), KnoaError> {
        match self
            .queue
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop_front()
        {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

/// Calls recorded by a fake, in order
#[derive(Clone)]
pub struct CallLog<C> {
    calls: Arc<Mutex<Vec<C>>>,
}

impl<C> Default for CallLog<C> {
    fn default() -> Self {
        Self {
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

impl<C: Clone> CallLog<C> {
    pub fn record(&self, call: C) {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(call);
    }

    pub fn all(&self) -> Vec<C> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}
