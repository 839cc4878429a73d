// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! knoa-storage: storage backends for knoa managers

mod json;
mod memory;
mod snapshot;

pub use json::JsonStore;
pub use memory::MemoryStorage;
pub use snapshot::SnapshotStore;
