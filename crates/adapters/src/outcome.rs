// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! What an adapter method hands back

use knoa_core::{ErrorEnvelope, KnoaError};
use serde::Serialize;
use serde_json::Value;

/// Successful return of an adapter method
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    /// The manager succeeded
    Completed(T),
    /// The manager failed and a recovery strategy supplied this value
    Recovered(Value),
    /// The manager (or validation) failed; the error came back as an envelope
    Failed(ErrorEnvelope),
}

/// `Err` only when the method propagates, or when recovery itself failed
pub type AdapterResult<T> = Result<Outcome<T>, KnoaError>;

/// How an unrecovered failure reaches the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorPolicy {
    /// Return `Outcome::Failed`
    Envelope,
    /// Return `Err`; validation failures are still envelopes
    Propagate,
}

impl<T> Outcome<T> {
    pub fn completed(self) -> Option<T> {
        match self {
            Outcome::Completed(value) => Some(value),
            _ => None,
        }
    }

    pub fn envelope(&self) -> Option<&ErrorEnvelope> {
        match self {
            Outcome::Failed(envelope) => Some(envelope),
            _ => None,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Outcome::Failed(_))
    }
}

impl<T: Serialize> Outcome<T> {
    /// The JSON value a CLI-shaped caller would print
    pub fn into_value(self) -> Value {
        let serialized = match self {
            Outcome::Completed(value) => serde_json::to_value(value),
            Outcome::Recovered(value) => return value,
            Outcome::Failed(envelope) => serde_json::to_value(envelope),
        };
        serialized.unwrap_or_else(|e| {
            tracing::warn!(error = %e, "adapter result is not serializable");
            Value::Null
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn failed_outcome_serializes_as_envelope() {
        let envelope = KnoaError::validation("bad")
            .to_envelope("createTask");
        let value = Outcome::<()>::Failed(envelope).into_value();

        assert_eq!(value["error"], json!(true));
        assert_eq!(value["operation"], json!("createTask"));
        assert_eq!(value["code"], json!("ERR_VALIDATION"));
    }

    #[test]
    fn recovered_value_is_returned_verbatim() {
        let value = Outcome::<u32>::Recovered(json!({ "recovered": true })).into_value();
        assert_eq!(value, json!({ "recovered": true }));
    }

    #[test]
    fn completed_accessors() {
        let outcome = Outcome::Completed(7);
        assert!(!outcome.is_failed());
        assert!(outcome.envelope().is_none());
        assert_eq!(outcome.completed(), Some(7));
    }
}
