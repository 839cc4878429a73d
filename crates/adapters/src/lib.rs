// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
// Enable coverage(off) attribute for excluding test infrastructure
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Adapters between callers and the domain managers
//!
//! Each adapter validates its parameters, calls its manager under an
//! operation context and publishes standardized lifecycle events. Managers
//! only raise typed errors; adapters route them through the error handler.

pub mod base;
pub mod feedback;
pub mod model;
pub mod outcome;
pub mod session;
pub mod state;
pub mod task;

#[cfg(any(test, feature = "test-support"))]
mod fake;

pub use base::{params, to_params, AdapterBase, Operation};
pub use feedback::{FeedbackAdapter, FeedbackManager};
pub use model::{
    Feedback, FeedbackStatus, NewFeedback, NewSession, NewTask, ProjectState, Session,
    SessionStatus, Task, TaskChanges, TaskFilter, TaskStatus,
};
pub use outcome::{AdapterResult, ErrorPolicy, Outcome};
pub use session::{SessionAdapter, SessionManager};
pub use state::{StateAdapter, StateManager};
pub use task::{TaskAdapter, TaskManager};

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
pub use feedback::{FakeFeedbackManager, FeedbackCall};
#[cfg(any(test, feature = "test-support"))]
pub use session::{FakeSessionManager, SessionCall};
#[cfg(any(test, feature = "test-support"))]
pub use state::{FakeStateManager, StateCall};
#[cfg(any(test, feature = "test-support"))]
pub use task::{FakeTaskManager, TaskCall};
