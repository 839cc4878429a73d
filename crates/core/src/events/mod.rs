// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Events system for loose coupling and observability
//!
//! This module provides:
//! - `EventBus` - Route events to matching subscribers using patterns
//! - `StandardEnvelope` - The `{component}:{action}` payload shape
//! - `EventNameRegistry` - Canonical names and their legacy aliases
//! - `CompatibilityShim` - Re-emits legacy aliases after each emission

mod bus;
mod envelope;
mod registry;
mod shim;
mod subscription;

pub use bus::{BoxFuture, EventBus, HandlerError, HandlerResult};
pub use envelope::{HistoryEntry, StandardEnvelope, GLOBAL_CHANNEL};
pub use registry::{
    is_valid_event_name, EventDescriptor, EventNameRegistry, RegistryBuilder, RegistryError,
    RESERVED_COMPONENTS,
};
pub use shim::CompatibilityShim;
pub use subscription::{EventPattern, SubscriberId};
