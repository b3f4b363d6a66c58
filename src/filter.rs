//! Node filter predicates and the filter state they read.
//!
//! Two independent predicates:
//! - [`is_blacklisted`]: any of the node's explicit values is hidden
//! - [`matches_highlight`]: AND across criterion keys, OR within a key's values
//!
//! They are never combined here; the caller decides which one drives dimming.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::graph::Node;

/// Opaque token identifying one attribute value.
pub fn blacklist_token(key: &str, value: &str) -> String {
    format!("{key}_{value}")
}

/// Set of hidden attribute values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Blacklist {
    tokens: HashSet<String>,
}

impl Blacklist {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_tokens<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            tokens: tokens.into_iter().map(Into::into).collect(),
        }
    }

    pub fn insert(&mut self, key: &str, value: &str) -> bool {
        self.tokens.insert(blacklist_token(key, value))
    }

    pub fn remove(&mut self, key: &str, value: &str) -> bool {
        self.tokens.remove(&blacklist_token(key, value))
    }

    /// Flip membership of one value. Returns whether it is now hidden.
    pub fn toggle(&mut self, key: &str, value: &str) -> bool {
        let token = blacklist_token(key, value);
        if self.tokens.remove(&token) {
            false
        } else {
            self.tokens.insert(token);
            true
        }
    }

    pub fn contains(&self, key: &str, value: &str) -> bool {
        self.tokens.contains(&blacklist_token(key, value))
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn clear(&mut self) {
        self.tokens.clear();
    }
}

/// Values of one key that a node may have to count as highlighted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighlightCriterion {
    pub key: String,
    pub values: Vec<String>,
}

impl HighlightCriterion {
    pub fn new<I, S>(key: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            key: key.into(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }
}

/// Filter inputs owned by the coordinating layer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterState {
    pub blacklist: Blacklist,
    pub highlight: Vec<HighlightCriterion>,
}

impl FilterState {
    pub fn reset(&mut self) {
        self.blacklist.clear();
        self.highlight.clear();
    }

    /// Add `value` to the criterion for `key`, or remove it if present.
    /// Criteria left without values are dropped. Returns whether the value
    /// is now required.
    pub fn toggle_highlight(&mut self, key: &str, value: &str) -> bool {
        match self.highlight.iter().position(|c| c.key == key) {
            Some(pos) => {
                let criterion = &mut self.highlight[pos];
                if let Some(vpos) = criterion.values.iter().position(|v| v == value) {
                    criterion.values.remove(vpos);
                    if criterion.values.is_empty() {
                        self.highlight.remove(pos);
                    }
                    false
                } else {
                    criterion.values.push(value.to_string());
                    true
                }
            }
            None => {
                self.highlight.push(HighlightCriterion::new(key, [value]));
                true
            }
        }
    }
}

/// True iff any of the node's explicit values is blacklisted.
pub fn is_blacklisted(node: &Node, blacklist: &Blacklist) -> bool {
    if blacklist.is_empty() {
        return false;
    }
    node.explicit_communities()
        .any(|(key, value)| blacklist.contains(key, value))
}

/// True iff, for every distinct key in `criteria`, the node's value for that
/// key is one of the values listed for it. Repeated keys pool their values.
/// Empty criteria match everything.
pub fn matches_highlight(node: &Node, criteria: &[HighlightCriterion]) -> bool {
    let mut keys: Vec<&str> = Vec::new();
    for criterion in criteria {
        if !keys.contains(&criterion.key.as_str()) {
            keys.push(&criterion.key);
        }
    }

    keys.into_iter().all(|key| {
        let Some(value) = node.explicit_value(key) else {
            return false;
        };
        criteria
            .iter()
            .filter(|c| c.key == key)
            .any(|c| c.values.iter().any(|v| v == value))
    })
}
