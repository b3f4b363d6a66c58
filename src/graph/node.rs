//! Node type and related structures.
//!
//! Nodes are the users of a similarity network. Each node has:
//! - A stable slot identifier (index into the network's node storage)
//! - The external user id and display label from the input file
//! - Ordered explicit-community values and an implicit community id
//! - Focus/selection state and the derived visual attributes

use std::fmt;

use serde::Serialize;

use crate::visual::palette::{Color, Palette, ShapeDescriptor};

/// Stable node identifier.
///
/// Slot index of the node within its network. Stays valid for the lifetime
/// of the loaded network; a reload assigns fresh ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct NodeId(pub u32);

impl NodeId {
    /// Create a new NodeId from a raw u32.
    #[inline]
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw u32 value.
    #[inline]
    pub fn raw(self) -> u32 {
        self.0
    }

    #[inline]
    pub(crate) fn slot(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Node({})", self.0)
    }
}

impl From<u32> for NodeId {
    #[inline]
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl From<NodeId> for u32 {
    #[inline]
    fn from(id: NodeId) -> Self {
        id.0
    }
}

/// Node state flags packed into a single byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeState {
    flags: u8,
}

impl Default for NodeState {
    fn default() -> Self {
        Self::new()
    }
}

impl NodeState {
    const DEFAULT_COLORED: u8 = 0b0000_0001;
    const SELECTED: u8 = 0b0000_0010;

    /// Fresh nodes start highlighted and unselected.
    #[inline]
    pub fn new() -> Self {
        Self {
            flags: Self::DEFAULT_COLORED,
        }
    }

    /// Check if the node shows its community colors (not dimmed).
    #[inline]
    pub fn is_default_colored(self) -> bool {
        self.flags & Self::DEFAULT_COLORED != 0
    }

    /// Set the default-colored state.
    #[inline]
    pub fn set_default_colored(&mut self, default_colored: bool) {
        if default_colored {
            self.flags |= Self::DEFAULT_COLORED;
        } else {
            self.flags &= !Self::DEFAULT_COLORED;
        }
    }

    /// Check if the node is selected.
    #[inline]
    pub fn is_selected(self) -> bool {
        self.flags & Self::SELECTED != 0
    }

    /// Set the selected state.
    #[inline]
    pub fn set_selected(&mut self, selected: bool) {
        if selected {
            self.flags |= Self::SELECTED;
        } else {
            self.flags &= !Self::SELECTED;
        }
    }
}

/// Derived visual attributes of a node. Recomputed, never ground truth.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeVisuals {
    pub background: Color,
    pub border: Color,
    pub border_width: f32,
    pub shape: ShapeDescriptor,
}

impl NodeVisuals {
    /// Visuals used when no community drives any dimension.
    pub fn fallback(palette: &Palette, border_width: f32) -> Self {
        Self {
            background: palette.fallback_color,
            border: palette.fallback_border,
            border_width,
            shape: palette.fallback_shape,
        }
    }
}

/// A user of the similarity network.
#[derive(Debug, Clone)]
pub struct Node {
    pub id: NodeId,
    /// User id as it appears in the input file.
    pub key: String,
    pub label: String,
    /// Attribute key → value, in input order.
    explicit: Vec<(String, String)>,
    pub implicit_community: u32,
    state: NodeState,
    visuals: NodeVisuals,
}

impl Node {
    pub fn new(
        id: NodeId,
        key: String,
        label: String,
        explicit: Vec<(String, String)>,
        implicit_community: u32,
    ) -> Self {
        Self {
            id,
            key,
            label,
            explicit,
            implicit_community,
            state: NodeState::new(),
            visuals: NodeVisuals::fallback(&Palette::default(), 1.0),
        }
    }

    /// Iterate `(key, value)` explicit-community pairs in input order.
    pub fn explicit_communities(&self) -> impl Iterator<Item = (&str, &str)> {
        self.explicit.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Value of one explicit community for this node.
    pub fn explicit_value(&self, key: &str) -> Option<&str> {
        self.explicit
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn state(&self) -> NodeState {
        self.state
    }

    pub fn is_default_colored(&self) -> bool {
        self.state.is_default_colored()
    }

    pub fn is_selected(&self) -> bool {
        self.state.is_selected()
    }

    pub(crate) fn set_selected(&mut self, selected: bool) {
        self.state.set_selected(selected);
    }

    pub fn visuals(&self) -> &NodeVisuals {
        &self.visuals
    }

    pub(crate) fn set_visuals(&mut self, visuals: NodeVisuals, default_colored: bool) {
        self.visuals = visuals;
        self.state.set_default_colored(default_colored);
    }

    pub(crate) fn visuals_mut(&mut self) -> &mut NodeVisuals {
        &mut self.visuals
    }

    pub(crate) fn set_default_colored(&mut self, default_colored: bool) {
        self.state.set_default_colored(default_colored);
    }
}
