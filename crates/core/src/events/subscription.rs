// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Event pattern matching and subscription handles

use std::fmt;

/// Pattern for matching event names, compiled once at subscribe time
///
/// Supports:
///   - Exact: "task:task_created"
///   - Catch-all: "*" receives every event after all specific handlers
///   - Single segment: "task:*" matches "task:task_created", not "task:commit:linked"
///   - Multi segment: "plugin:**" matches "plugin:lint:finished" and "plugin:loaded"
///   - In-segment glob: "task:task_*" matches "task:task_created"
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EventPattern {
    source: String,
    matcher: Matcher,
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum Matcher {
    Nothing,
    CatchAll,
    Exact,
    Glob(Vec<Segment>),
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum Segment {
    Literal(String),
    /// Literal text with embedded `*` (matches within one segment)
    Partial(String),
    Any,
    AnyDepth,
}

impl EventPattern {
    pub fn new(pattern: &str) -> Self {
        let matcher = if pattern.is_empty() {
            Matcher::Nothing
        } else if pattern == "*" {
            Matcher::CatchAll
        } else if !pattern.contains('*') {
            Matcher::Exact
        } else {
            Matcher::Glob(
                pattern
                    .split(':')
                    .map(|part| match part {
                        "*" => Segment::Any,
                        "**" => Segment::AnyDepth,
                        p if p.contains('*') => Segment::Partial(p.to_string()),
                        p => Segment::Literal(p.to_string()),
                    })
                    .collect(),
            )
        };
        Self {
            source: pattern.to_string(),
            matcher,
        }
    }

    /// Check if this pattern matches an event name
    pub fn matches(&self, event_name: &str) -> bool {
        match &self.matcher {
            Matcher::Nothing => false,
            Matcher::CatchAll => true,
            Matcher::Exact => self.source == event_name,
            Matcher::Glob(segments) => {
                let event_parts: Vec<&str> = event_name.split(':').collect();
                Self::match_segments(segments, &event_parts)
            }
        }
    }

    fn match_segments(pattern: &[Segment], event: &[&str]) -> bool {
        match (pattern.first(), event.first()) {
            (None, None) => true,
            (Some(Segment::AnyDepth), _) => {
                // ** absorbs zero or more segments
                (0..=event.len()).any(|skip| Self::match_segments(&pattern[1..], &event[skip..]))
            }
            (Some(Segment::Any), Some(_)) => Self::match_segments(&pattern[1..], &event[1..]),
            (Some(Segment::Literal(p)), Some(e)) if p == e => {
                Self::match_segments(&pattern[1..], &event[1..])
            }
            (Some(Segment::Partial(p)), Some(e)) if glob_segment(p, e) => {
                Self::match_segments(&pattern[1..], &event[1..])
            }
            _ => false,
        }
    }

    pub fn is_exact(&self) -> bool {
        matches!(self.matcher, Matcher::Exact)
    }

    pub fn is_catch_all(&self) -> bool {
        matches!(self.matcher, Matcher::CatchAll)
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }
}

/// `*` within a single segment, e.g. `task_*` or `*_created`
fn glob_segment(pattern: &str, text: &str) -> bool {
    let mut parts = pattern.split('*');
    let first = parts.next().unwrap_or_default();
    let Some(mut rest) = text.strip_prefix(first) else {
        return false;
    };
    let tail: Vec<&str> = parts.collect();
    let Some((last, middle)) = tail.split_last() else {
        return rest.is_empty();
    };
    for piece in middle {
        match rest.find(piece) {
            Some(at) => rest = &rest[at + piece.len()..],
            None => return false,
        }
    }
    rest.len() >= last.len() && rest.ends_with(last)
}

impl fmt::Display for EventPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

/// Subscriber handle for unsubscribing
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriberId(pub u64);

impl fmt::Display for SubscriberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sub-{}", self.0)
    }
}

#[cfg(test)]
#[path = "subscription_tests.rs"]
mod tests;
