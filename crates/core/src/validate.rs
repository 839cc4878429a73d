// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Parameter schemas and the entity validator contract
//!
//! Each adapter method declares a [`ParamSchema`]: parameter name to a
//! [`Check`], where a check is a single predicate or a choice between
//! several. Schemas double as entity validators producing a
//! [`ValidationReport`].

use crate::error::KnoaError;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::borrow::Cow;
use std::fmt;
use std::sync::{Arc, LazyLock};

#[allow(clippy::expect_used)]
static TASK_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^T\d{3}$").expect("constant regex pattern is valid"));

#[allow(clippy::expect_used)]
static COMMIT_HASH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9a-fA-F]{7,40}$").expect("constant regex pattern is valid"));

#[allow(clippy::expect_used)]
static SESSION_SLUG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^session-[A-Za-z0-9][A-Za-z0-9_-]*$").expect("constant regex pattern is valid")
});

type Predicate = dyn Fn(&Value) -> bool + Send + Sync;

/// A named predicate over one parameter value
#[derive(Clone)]
pub struct Check {
    expected: Cow<'static, str>,
    test: Arc<Predicate>,
}

impl Check {
    pub fn new<F>(expected: impl Into<Cow<'static, str>>, test: F) -> Self
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        Self {
            expected: expected.into(),
            test: Arc::new(test),
        }
    }

    /// Passes when any of `checks` passes
    pub fn any_of(checks: Vec<Check>) -> Self {
        let expected = checks
            .iter()
            .map(|c| c.expected.as_ref())
            .collect::<Vec<_>>()
            .join(" or ");
        Self::new(expected, move |value| checks.iter().any(|c| c.test(value)))
    }

    pub fn string() -> Self {
        Self::new("a string", Value::is_string)
    }

    pub fn non_empty_string() -> Self {
        Self::new("a non-empty string", |v| {
            v.as_str().is_some_and(|s| !s.trim().is_empty())
        })
    }

    pub fn object() -> Self {
        Self::new("an object", Value::is_object)
    }

    pub fn array() -> Self {
        Self::new("an array", Value::is_array)
    }

    pub fn one_of(allowed: &'static [&'static str]) -> Self {
        Self::new(format!("one of {}", allowed.join(", ")), move |v| {
            v.as_str().is_some_and(|s| allowed.contains(&s))
        })
    }

    pub fn task_id() -> Self {
        Self::regex(&TASK_ID, "a task id like T001 (T followed by three digits)")
    }

    pub fn commit_hash() -> Self {
        Self::regex(&COMMIT_HASH, "a commit hash of 7 to 40 hex digits")
    }

    /// A commit hash or `session-<suffix>`
    pub fn session_id() -> Self {
        Self::any_of(vec![
            Self::commit_hash(),
            Self::regex(&SESSION_SLUG, "session-<suffix>"),
        ])
    }

    fn regex(pattern: &'static LazyLock<Regex>, expected: &'static str) -> Self {
        Self::new(expected, move |v| v.as_str().is_some_and(|s| pattern.is_match(s)))
    }

    pub fn expected(&self) -> &str {
        &self.expected
    }

    pub fn test(&self, value: &Value) -> bool {
        (self.test)(value)
    }
}

impl fmt::Debug for Check {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Check").field(&self.expected).finish()
    }
}

#[derive(Debug, Clone)]
pub struct ParamRule {
    pub name: &'static str,
    pub required: bool,
    pub check: Option<Check>,
}

/// Declarative parameter description for one operation
#[derive(Debug, Clone, Default)]
pub struct ParamSchema {
    rules: Vec<ParamRule>,
    closed: bool,
}

impl ParamSchema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Must be present and non-null; shape-checked when `check` is given
    pub fn required(mut self, name: &'static str, check: Option<Check>) -> Self {
        self.rules.push(ParamRule {
            name,
            required: true,
            check,
        });
        self
    }

    /// Shape-checked only when present and non-null
    pub fn optional(mut self, name: &'static str, check: Check) -> Self {
        self.rules.push(ParamRule {
            name,
            required: false,
            check: Some(check),
        });
        self
    }

    /// Report undeclared keys as warnings
    pub fn closed(mut self) -> Self {
        self.closed = true;
        self
    }

    pub fn rules(&self) -> &[ParamRule] {
        &self.rules
    }

    /// First violation as a `validation` error naming the argument
    pub fn check(&self, params: &Map<String, Value>) -> Result<(), KnoaError> {
        for rule in &self.rules {
            let value = params.get(rule.name).filter(|v| !v.is_null());
            match (value, &rule.check) {
                (None, _) if rule.required => {
                    return Err(KnoaError::validation(format!(
                        "Missing required parameter: {}",
                        rule.name
                    ))
                    .with_context("argument", rule.name));
                }
                (Some(value), Some(check)) if !check.test(value) => {
                    return Err(KnoaError::validation(format!(
                        "Invalid {}: expected {}",
                        rule.name,
                        check.expected()
                    ))
                    .with_context("argument", rule.name)
                    .with_context("expected", check.expected())
                    .with_context("value", value.clone()));
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Every violation, for entity validation
    pub fn report(&self, entity: &Value) -> ValidationReport {
        let Some(fields) = entity.as_object() else {
            return ValidationReport::invalid(vec!["entity must be an object".to_string()]);
        };

        let mut report = ValidationReport::valid();
        for rule in &self.rules {
            match (fields.get(rule.name).filter(|v| !v.is_null()), &rule.check) {
                (None, _) if rule.required => {
                    report.error(format!("{} is required", rule.name));
                }
                (Some(value), Some(check)) if !check.test(value) => {
                    report.error(format!("{} must be {}", rule.name, check.expected()));
                }
                _ => {}
            }
        }
        if self.closed {
            for key in fields.keys() {
                if !self.rules.iter().any(|r| r.name == key.as_str()) {
                    report.warnings.push(format!("unexpected field {key}"));
                }
            }
        }
        report
    }
}

/// `{ isValid, errors, warnings }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    pub is_valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ValidationReport {
    pub fn valid() -> Self {
        Self {
            is_valid: true,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub fn invalid(errors: Vec<String>) -> Self {
        Self {
            is_valid: false,
            errors,
            warnings: Vec::new(),
        }
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.is_valid = false;
        self.errors.push(message.into());
    }

    /// A `validation` error carrying `errors` and `warnings`, when invalid
    pub fn into_error(self, entity: &str) -> Option<KnoaError> {
        if self.is_valid {
            return None;
        }
        let summary = self.errors.join("; ");
        Some(
            KnoaError::validation(format!("Invalid {entity}: {summary}"))
                .with_context("entity", entity)
                .with_context("errors", self.errors)
                .with_context("warnings", self.warnings),
        )
    }
}

/// Entity validator contract
pub trait Validator: Send + Sync {
    fn validate(&self, entity: &Value) -> ValidationReport;
}

impl Validator for ParamSchema {
    fn validate(&self, entity: &Value) -> ValidationReport {
        self.report(entity)
    }
}

#[cfg(test)]
#[path = "validate_tests.rs"]
mod tests;
