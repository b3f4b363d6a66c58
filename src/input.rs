//! Input document decoding.
//!
//! A network file is a JSON object with three top-level sections:
//!
//! ```json
//! {
//!   "users": [{"id": 1, "label": "Ann", "implicit_community": "0",
//!              "explicit_community": {"ageGroup": "20s", "language": "en"}}],
//!   "similarities": [{"u1": 1, "u2": 2, "value": 0.8}],
//!   "communities": [{"id": 0, "name": "Cluster A", "explanation": "...", "color": "#aa0000"}]
//! }
//! ```
//!
//! `communities` may also be an object keyed by community id. Similarity
//! records stay raw here; [`crate::graph::EdgeStateEngine::parse`] validates them.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::{NetworkError, NetworkResult};
use crate::graph::endpoint_key;
use crate::spatial::BoundingBox;

pub const USERS: &str = "users";
pub const SIMILARITIES: &str = "similarities";
pub const COMMUNITIES: &str = "communities";

/// One decoded user.
#[derive(Debug, Clone, PartialEq)]
pub struct UserRecord {
    pub key: String,
    pub label: String,
    pub implicit_community: u32,
    pub explicit: Vec<(String, String)>,
}

/// A precomputed cluster the visualization groups spatially.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImplicitCommunity {
    pub id: u32,
    pub name: String,
    pub explanation: String,
    /// Debug color, passed through untouched.
    pub color: Option<String>,
    /// Valid after the last position update; None when the community has
    /// no positioned members.
    pub bounding_box: Option<BoundingBox>,
}

/// Decoded network document.
#[derive(Debug, Clone)]
pub struct NetworkInput {
    pub users: Vec<UserRecord>,
    pub similarities: Vec<Value>,
    pub communities: Vec<ImplicitCommunity>,
}

impl NetworkInput {
    pub fn from_json(json: &str) -> NetworkResult<Self> {
        let document: Value = serde_json::from_str(json)
            .map_err(|err| malformed(format!("not a JSON document: {err}")))?;
        Self::from_value(document)
    }

    pub fn from_value(document: Value) -> NetworkResult<Self> {
        let Value::Object(mut root) = document else {
            return Err(malformed("top-level value must be an object"));
        };

        let users = take_array(&mut root, USERS)?
            .iter()
            .enumerate()
            .map(|(index, raw)| decode_user(index, raw))
            .collect::<NetworkResult<Vec<_>>>()?;

        let similarities = take_array(&mut root, SIMILARITIES)?;

        let communities = match root.remove(COMMUNITIES) {
            Some(Value::Array(items)) if !items.is_empty() => items
                .iter()
                .enumerate()
                .map(|(index, raw)| {
                    let id = raw
                        .get("id")
                        .and_then(coerce_community_id)
                        .ok_or_else(|| malformed(format!("community #{index} has no integer id")))?;
                    Ok(decode_community(id, raw))
                })
                .collect::<NetworkResult<Vec<_>>>()?,
            Some(Value::Object(items)) if !items.is_empty() => items
                .iter()
                .map(|(key, raw)| {
                    let id = coerce_community_id(&Value::String(key.clone()))
                        .ok_or_else(|| malformed(format!("community key `{key}` is not an integer")))?;
                    Ok(decode_community(id, raw))
                })
                .collect::<NetworkResult<Vec<_>>>()?,
            _ => return Err(malformed(format!("`{COMMUNITIES}` is missing or empty"))),
        };

        Ok(Self {
            users,
            similarities,
            communities,
        })
    }
}

fn malformed(message: impl Into<String>) -> NetworkError {
    NetworkError::MalformedInput(message.into())
}

fn take_array(root: &mut Map<String, Value>, field: &str) -> NetworkResult<Vec<Value>> {
    match root.remove(field) {
        Some(Value::Array(items)) if !items.is_empty() => Ok(items),
        _ => Err(malformed(format!("`{field}` is missing or empty"))),
    }
}

fn decode_user(index: usize, raw: &Value) -> NetworkResult<UserRecord> {
    let key = raw
        .get("id")
        .and_then(endpoint_key)
        .ok_or_else(|| malformed(format!("user #{index} has no id")))?;

    let label = raw
        .get("label")
        .and_then(scalar_string)
        .unwrap_or_else(|| key.clone());

    let implicit_community = raw
        .get("implicit_community")
        .and_then(coerce_community_id)
        .ok_or_else(|| malformed(format!("user `{key}` has no integer implicit_community")))?;

    let explicit = match raw.get("explicit_community") {
        Some(Value::Object(attrs)) => attrs
            .iter()
            .filter_map(|(k, v)| scalar_string(v).map(|v| (k.clone(), v)))
            .collect(),
        Some(Value::Null) | None => Vec::new(),
        Some(_) => {
            return Err(malformed(format!(
                "user `{key}` has a non-object explicit_community"
            )));
        }
    };

    Ok(UserRecord {
        key,
        label,
        implicit_community,
        explicit,
    })
}

fn decode_community(id: u32, raw: &Value) -> ImplicitCommunity {
    let text = |field: &str| raw.get(field).and_then(scalar_string);
    ImplicitCommunity {
        id,
        name: text("name").unwrap_or_else(|| format!("Community {id}")),
        explanation: text("explanation").unwrap_or_default(),
        color: text("color"),
        bounding_box: None,
    }
}

/// Integer community id from a number or a string with a leading integer
/// (`"3"`, `" 3 "`, `"3rd"`).
fn coerce_community_id(value: &Value) -> Option<u32> {
    match value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f.trunc() as u64))
            .and_then(|n| u32::try_from(n).ok()),
        Value::String(s) => {
            let s = s.trim();
            let end = s
                .char_indices()
                .find(|(_, c)| !c.is_ascii_digit())
                .map_or(s.len(), |(i, _)| i);
            s[..end].parse().ok()
        }
        _ => None,
    }
}

fn scalar_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
