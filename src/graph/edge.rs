//! Edge type and related structures.
//!
//! Edges are similarity links between two users. Each edge has:
//! - A stable unique identifier
//! - Source and target node IDs (never equal)
//! - The similarity value it was parsed with (never zero)
//! - Derived visibility and width

use std::fmt;

use serde::Serialize;

use super::node::NodeId;

/// Stable edge identifier.
///
/// Index of the edge in parse order, after self-loops, zero similarities
/// and duplicates have been dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct EdgeId(pub u32);

impl EdgeId {
    /// Create a new EdgeId from a raw u32.
    #[inline]
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw u32 value.
    #[inline]
    pub fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Edge({})", self.0)
    }
}

impl From<u32> for EdgeId {
    #[inline]
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl From<EdgeId> for u32 {
    #[inline]
    fn from(id: EdgeId) -> Self {
        id.0
    }
}

/// Edge state flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EdgeState {
    flags: u8,
}

impl EdgeState {
    const HIDDEN: u8 = 0b0000_0001;
    const SELECTED: u8 = 0b0000_0010;

    /// Create a new default edge state.
    #[inline]
    pub fn new() -> Self {
        Self { flags: 0 }
    }

    /// Check if the edge is hidden.
    #[inline]
    pub fn is_hidden(self) -> bool {
        self.flags & Self::HIDDEN != 0
    }

    /// Set the hidden state.
    #[inline]
    pub fn set_hidden(&mut self, hidden: bool) {
        if hidden {
            self.flags |= Self::HIDDEN;
        } else {
            self.flags &= !Self::HIDDEN;
        }
    }

    /// Check if the edge belongs to the current selection.
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

/// A normalized similarity edge.
#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    pub id: EdgeId,
    pub from: NodeId,
    pub to: NodeId,
    pub similarity: f32,
    pub state: EdgeState,
    pub width: f32,
}

impl Edge {
    pub fn new(id: EdgeId, from: NodeId, to: NodeId, similarity: f32) -> Self {
        Self {
            id,
            from,
            to,
            similarity,
            state: EdgeState::new(),
            width: 0.0,
        }
    }

    pub fn is_visible(&self) -> bool {
        !self.state.is_hidden()
    }

    /// Endpoint pair with the smaller id first, for undirected comparison.
    pub fn unordered_pair(&self) -> (NodeId, NodeId) {
        if self.from <= self.to {
            (self.from, self.to)
        } else {
            (self.to, self.from)
        }
    }
}
