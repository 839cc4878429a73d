// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use yare::parameterized;

#[parameterized(
    canonical = { "task:task_created", true },
    digits = { "plugin2:load_v2", true },
    global_channel = { "event", false },
    uppercase = { "Task:created", false },
    leading_digit = { "task:1created", false },
    three_segments = { "plugin:lint:finished", false },
    empty_action = { "task:", false },
    dash = { "task:task-created", false },
)]
fn event_name_grammar(name: &str, valid: bool) {
    assert_eq!(is_valid_event_name(name), valid);
}

#[test]
fn standard_catalogue_maps_legacy_names() {
    let registry = EventNameRegistry::standard();

    assert_eq!(registry.resolve_aliases("task:task_created"), ["task:created"]);
    assert_eq!(registry.resolve_aliases("session:session_created"), ["session:started"]);
    assert!(registry.resolve_aliases("error:occurred").is_empty());
    assert!(registry.resolve_aliases("nothing:here").is_empty());

    assert!(registry.is_deprecated("state:changed"));
    assert!(!registry.is_deprecated("state:state_changed"));
    assert_eq!(registry.modern_name("feedback:created"), Some("feedback:feedback_created"));
}

#[test]
fn standard_catalogue_only_uses_reserved_components() {
    let registry = EventNameRegistry::standard();
    for descriptor in registry.events() {
        let (component, _) = descriptor.name.split_once(':').unwrap();
        assert!(RESERVED_COMPONENTS.contains(&component), "{}", descriptor.name);
    }
}

#[test]
fn alias_registers_modern_descriptor_on_demand() {
    let mut builder = EventNameRegistry::builder();
    builder.register_alias("cache:hit", "cache:entry_hit").unwrap();
    let registry = builder.build();

    let descriptor = registry.descriptor("cache:entry_hit").unwrap();
    assert_eq!(descriptor.aliases, vec!["cache:hit"]);
    assert!(registry.is_known("cache:hit"));
}

#[test]
fn duplicate_alias_pair_is_idempotent() {
    let mut builder = EventNameRegistry::builder();
    builder.register_alias("task:created", "task:task_created").unwrap();
    builder.register_alias("task:created", "task:task_created").unwrap();
    let registry = builder.build();
    assert_eq!(registry.resolve_aliases("task:task_created").len(), 1);
}

#[test]
fn conflicting_alias_is_rejected() {
    let mut builder = EventNameRegistry::builder();
    builder.register_alias("task:created", "task:task_created").unwrap();
    let err = builder
        .register_alias("task:created", "task:task_added")
        .unwrap_err();
    assert_eq!(
        err,
        RegistryError::AliasConflict {
            alias: "task:created".into(),
            existing: "task:task_created".into()
        }
    );
}

#[test]
fn alias_cannot_shadow_canonical_name() {
    let mut builder = EventNameRegistry::builder();
    builder
        .register_event("task:task_created", "created", &["id"])
        .unwrap();
    assert!(matches!(
        builder.register_alias("task:task_created", "task:other"),
        Err(RegistryError::AliasShadowsCanonical(_))
    ));
    assert!(matches!(
        builder.register_event("Task:bad", "", &[]),
        Err(RegistryError::InvalidName(_))
    ));
}
