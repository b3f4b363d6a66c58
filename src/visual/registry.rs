//! Discovery of explicit communities and their binding to visual dimensions.
//!
//! Discovery is a two-phase protocol: a [`CommunityRegistry`] observes every
//! node of a load cycle, then [`CommunityRegistry::freeze`] produces the
//! immutable [`CommunitySnapshot`] that visual assignment reads from. Value
//! order inside a community is discovery order and is the palette index.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{NetworkError, NetworkResult};
use crate::graph::Node;

/// One of the independent visual channels a community can drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dimension {
    Color,
    Shape,
    Border,
}

impl Dimension {
    /// All dimensions, in default binding order.
    pub const ALL: [Dimension; 3] = [Dimension::Color, Dimension::Shape, Dimension::Border];

    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "color" => Some(Self::Color),
            "shape" => Some(Self::Shape),
            "border" => Some(Self::Border),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Color => "color",
            Self::Shape => "shape",
            Self::Border => "border",
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A categorical attribute and every value observed for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExplicitCommunity {
    pub key: String,
    /// Distinct values in discovery order.
    pub values: Vec<String>,
    pub dimension: Option<Dimension>,
}

/// Legend row handed to the UI layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VisualizationAttribute {
    pub attribute_key: String,
    pub values: Vec<String>,
    pub dimension: Dimension,
}

/// Append-only discovery phase.
#[derive(Debug, Default)]
pub struct CommunityRegistry {
    communities: Vec<ExplicitCommunity>,
    by_key: HashMap<String, usize>,
    value_lookup: Vec<HashMap<String, usize>>,
}

impl CommunityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record every key/value of one node's explicit communities.
    pub fn observe(&mut self, node: &Node) {
        for (key, value) in node.explicit_communities() {
            self.observe_value(key, value);
        }
    }

    fn observe_value(&mut self, key: &str, value: &str) {
        let slot = match self.by_key.get(key) {
            Some(&slot) => slot,
            None => {
                let slot = self.communities.len();
                self.communities.push(ExplicitCommunity {
                    key: key.to_string(),
                    values: Vec::new(),
                    dimension: None,
                });
                self.value_lookup.push(HashMap::new());
                self.by_key.insert(key.to_string(), slot);
                slot
            }
        };

        let lookup = &mut self.value_lookup[slot];
        if !lookup.contains_key(value) {
            let values = &mut self.communities[slot].values;
            lookup.insert(value.to_string(), values.len());
            values.push(value.to_string());
        }
    }

    pub fn len(&self) -> usize {
        self.communities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.communities.is_empty()
    }

    /// End discovery. No key or value can be added to the snapshot.
    pub fn freeze(self) -> CommunitySnapshot {
        CommunitySnapshot {
            communities: self.communities,
            by_key: self.by_key,
            value_lookup: self.value_lookup,
        }
    }
}

/// Frozen result of discovery plus the current dimension bindings.
#[derive(Debug, Clone, Default)]
pub struct CommunitySnapshot {
    communities: Vec<ExplicitCommunity>,
    by_key: HashMap<String, usize>,
    value_lookup: Vec<HashMap<String, usize>>,
}

impl CommunitySnapshot {
    pub fn communities(&self) -> &[ExplicitCommunity] {
        &self.communities
    }

    pub fn community(&self, key: &str) -> Option<&ExplicitCommunity> {
        self.by_key.get(key).map(|&slot| &self.communities[slot])
    }

    /// Palette index of `value` within community `key`.
    pub fn value_index(&self, key: &str, value: &str) -> Option<usize> {
        let slot = *self.by_key.get(key)?;
        self.value_lookup[slot].get(value).copied()
    }

    /// Bind `key` to `dimension`.
    ///
    /// Whatever key held `dimension` is released, and `key` gives up any
    /// dimension it held before.
    pub fn bind(&mut self, key: &str, dimension: Dimension) -> NetworkResult<()> {
        let slot = *self
            .by_key
            .get(key)
            .ok_or_else(|| NetworkError::UnknownCommunityKey(key.to_string()))?;

        self.unbind(dimension);
        self.communities[slot].dimension = Some(dimension);
        Ok(())
    }

    /// Release `dimension`; nodes fall back to the default value for it.
    pub fn unbind(&mut self, dimension: Dimension) {
        for community in &mut self.communities {
            if community.dimension == Some(dimension) {
                community.dimension = None;
            }
        }
    }

    /// Bind the first discovered keys to color, shape and border in turn.
    pub fn bind_in_discovery_order(&mut self) {
        for community in &mut self.communities {
            community.dimension = None;
        }
        for (community, dimension) in self.communities.iter_mut().zip(Dimension::ALL) {
            community.dimension = Some(dimension);
        }
    }

    pub fn bound_key(&self, dimension: Dimension) -> Option<&str> {
        self.communities
            .iter()
            .find(|c| c.dimension == Some(dimension))
            .map(|c| c.key.as_str())
    }

    /// Legend rows for every bound community, in dimension order.
    pub fn visualization_attributes(&self) -> Vec<VisualizationAttribute> {
        Dimension::ALL
            .iter()
            .filter_map(|&dimension| {
                let community = self
                    .communities
                    .iter()
                    .find(|c| c.dimension == Some(dimension))?;
                Some(VisualizationAttribute {
                    attribute_key: community.key.clone(),
                    values: community.values.clone(),
                    dimension,
                })
            })
            .collect()
    }
}
