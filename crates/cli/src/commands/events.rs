// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `knoa events`: the canonical event catalogue

use crate::output::{print_list, OutputFormat};
use knoa_core::events::EventDescriptor;
use knoa_core::EventNameRegistry;
use serde::Serialize;
use std::fmt;

#[derive(Serialize)]
#[serde(transparent)]
struct EventRow<'a>(&'a EventDescriptor);

impl fmt::Display for EventRow<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:<34} {}", self.0.name, self.0.description)?;
        if !self.0.aliases.is_empty() {
            write!(f, " (legacy: {})", self.0.aliases.join(", "))?;
        }
        Ok(())
    }
}

pub fn handle(registry: &EventNameRegistry, format: OutputFormat) {
    let rows: Vec<EventRow<'_>> = registry.events().map(EventRow).collect();
    print_list(&rows, format, "No events registered");
}
