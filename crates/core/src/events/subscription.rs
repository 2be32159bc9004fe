// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Event pattern matching and subscriptions

/// Pattern for matching event names
///   - Exact: `slot:bound`
///   - Single wildcard: `queue:item:*` matches `queue:item:retry`
///   - Tail wildcard: `queue:**` matches every queue event
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EventPattern(String);

impl EventPattern {
    pub fn new(pattern: &str) -> Self {
        Self(pattern.to_string())
    }

    pub fn matches(&self, event_name: &str) -> bool {
        if self.0.is_empty() {
            return false;
        }
        if self.0 == "**" {
            return true;
        }

        let pattern: Vec<&str> = self.0.split(':').collect();
        let name: Vec<&str> = event_name.split(':').collect();
        Self::match_segments(&pattern, &name)
    }

    fn match_segments(pattern: &[&str], name: &[&str]) -> bool {
        match (pattern.split_first(), name.split_first()) {
            (None, None) => true,
            (Some((&"**", _)), _) => true,
            (Some((p, p_rest)), Some((n, n_rest))) if *p == "*" || p == n => {
                Self::match_segments(p_rest, n_rest)
            }
            _ => false,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Subscriber handle for unsubscribing
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SubscriberId(pub String);

/// Interest in one or more event patterns
#[derive(Clone, Debug)]
pub struct Subscription {
    pub id: SubscriberId,
    pub patterns: Vec<EventPattern>,
}

impl Subscription {
    pub fn new(id: impl Into<String>, patterns: &[&str]) -> Self {
        Self {
            id: SubscriberId(id.into()),
            patterns: patterns.iter().map(|p| EventPattern::new(p)).collect(),
        }
    }

    pub fn matches(&self, event_name: &str) -> bool {
        self.patterns.iter().any(|p| p.matches(event_name))
    }
}

#[cfg(test)]
#[path = "subscription_tests.rs"]
mod tests;
