//! Graph data structures and operations.
//!
//! This module provides the network structure using petgraph's StableGraph
//! for the similarity topology, with Structure of Arrays (SoA) layout for the
//! node positions reported by the render layer, plus the edge visibility
//! engine driven by the similarity threshold.

mod edge;
mod engine;
mod node;
mod visibility;

pub use edge::{Edge, EdgeId, EdgeState};
pub use engine::{GraphEngine, UNPLACED};
pub use node::{Node, NodeId, NodeState, NodeVisuals};
pub use visibility::{EdgeConfig, EdgeStateEngine, FIELD_U1, FIELD_U2, FIELD_VALUE};

pub(crate) use visibility::endpoint_key;
