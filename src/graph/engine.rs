//! GraphEngine - node storage and similarity topology.
//!
//! The GraphEngine stores the network topology using petgraph's StableGraph
//! and keeps the node records plus SoA (Structure of Arrays) buffers for the
//! screen positions reported by the render layer.

use petgraph::stable_graph::{NodeIndex, StableGraph};
use petgraph::{Directed, Direction};
use std::collections::HashMap;

use super::edge::{Edge, EdgeId};
use super::node::{Node, NodeId};
use crate::error::{NetworkError, NetworkResult};

/// Marker for a coordinate the render layer has not reported yet.
pub const UNPLACED: f32 = 3.402_823e+38;

/// The core graph engine.
///
/// This struct manages:
/// - Node records (user id, label, communities, visual state)
/// - Similarity topology via petgraph
/// - Position buffers in SoA layout
/// - ID mapping between input user ids and stable node ids
pub struct GraphEngine {
    /// The underlying graph structure.
    /// Nodes store their stable NodeId, edges store their EdgeId.
    graph: StableGraph<NodeId, EdgeId, Directed>,

    /// Map from node slot to petgraph NodeIndex
    node_indices: Vec<NodeIndex>,

    /// Map from input user id to stable NodeId
    key_to_id: HashMap<String, NodeId>,

    /// Node records, indexed by slot
    nodes: Vec<Node>,

    /// X positions (SoA layout)
    pos_x: Vec<f32>,

    /// Y positions (SoA layout)
    pos_y: Vec<f32>,
}

impl GraphEngine {
    /// Create a new empty graph engine.
    pub fn new() -> Self {
        Self {
            graph: StableGraph::new(),
            node_indices: Vec::new(),
            key_to_id: HashMap::new(),
            nodes: Vec::new(),
            pos_x: Vec::new(),
            pos_y: Vec::new(),
        }
    }

    /// Create a graph engine with pre-allocated capacity.
    pub fn with_capacity(node_capacity: usize, edge_capacity: usize) -> Self {
        Self {
            graph: StableGraph::with_capacity(node_capacity, edge_capacity),
            node_indices: Vec::with_capacity(node_capacity),
            key_to_id: HashMap::with_capacity(node_capacity),
            nodes: Vec::with_capacity(node_capacity),
            pos_x: Vec::with_capacity(node_capacity),
            pos_y: Vec::with_capacity(node_capacity),
        }
    }

    // =========================================================================
    // Node Operations
    // =========================================================================

    /// Add a user. Fails if the user id was already added.
    pub fn add_node(
        &mut self,
        key: String,
        label: String,
        explicit: Vec<(String, String)>,
        implicit_community: u32,
    ) -> NetworkResult<NodeId> {
        if self.key_to_id.contains_key(&key) {
            return Err(NetworkError::MalformedInput(format!(
                "duplicate user id `{key}`"
            )));
        }

        let id = NodeId(self.nodes.len() as u32);
        let index = self.graph.add_node(id);
        self.node_indices.push(index);
        self.key_to_id.insert(key.clone(), id);
        self.nodes
            .push(Node::new(id, key, label, explicit, implicit_community));

        self.pos_x.push(UNPLACED);
        self.pos_y.push(UNPLACED);
        Ok(id)
    }

    /// Look up a node by its input user id.
    pub fn resolve(&self, key: &str) -> Option<NodeId> {
        self.key_to_id.get(key).copied()
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.slot())
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.slot())
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn nodes_mut(&mut self) -> &mut [Node] {
        &mut self.nodes
    }

    /// Get the number of nodes.
    pub fn node_count(&self) -> u32 {
        self.graph.node_count() as u32
    }

    // =========================================================================
    // Edge Operations
    // =========================================================================

    /// Add a parsed edge to the topology.
    ///
    /// Returns false if either endpoint is unknown.
    pub fn add_edge(&mut self, edge: &Edge) -> bool {
        let (Some(&source), Some(&target)) = (
            self.node_indices.get(edge.from.slot()),
            self.node_indices.get(edge.to.slot()),
        ) else {
            return false;
        };
        self.graph.add_edge(source, target, edge.id);
        true
    }

    /// Get the number of edges.
    pub fn edge_count(&self) -> u32 {
        self.graph.edge_count() as u32
    }

    /// Nodes sharing an edge with `id`, regardless of direction.
    pub fn neighbors(&self, id: NodeId) -> Vec<NodeId> {
        self.node_indices
            .get(id.slot())
            .map(|&index| {
                let mut out: Vec<NodeId> = self
                    .graph
                    .neighbors_undirected(index)
                    .filter_map(|n| self.graph.node_weight(n).copied())
                    .collect();
                out.sort_unstable();
                out.dedup();
                out
            })
            .unwrap_or_default()
    }

    /// Edges touching `id`, both outgoing and incoming.
    pub fn incident_edges(&self, id: NodeId) -> Vec<EdgeId> {
        self.node_indices
            .get(id.slot())
            .map(|&index| {
                self.graph
                    .edges_directed(index, Direction::Outgoing)
                    .chain(self.graph.edges_directed(index, Direction::Incoming))
                    .map(|e| *e.weight())
                    .collect()
            })
            .unwrap_or_default()
    }

    // =========================================================================
    // Position Buffers
    // =========================================================================

    /// Get X positions slice.
    pub fn positions_x(&self) -> &[f32] {
        &self.pos_x
    }

    /// Get Y positions slice.
    pub fn positions_y(&self) -> &[f32] {
        &self.pos_y
    }

    /// Replace positions from an interleaved `[x0, y0, x1, y1, ...]` buffer
    /// in node-slot order. Extra entries are ignored, missing ones leave the
    /// node unplaced. Returns the number of nodes placed.
    pub fn set_positions(&mut self, positions: &[f32]) -> u32 {
        let count = (positions.len() / 2).min(self.nodes.len());
        for slot in 0..self.nodes.len() {
            if slot < count {
                self.pos_x[slot] = positions[slot * 2];
                self.pos_y[slot] = positions[slot * 2 + 1];
            } else {
                self.pos_x[slot] = UNPLACED;
                self.pos_y[slot] = UNPLACED;
            }
        }
        count as u32
    }

    /// Set a single node's position.
    pub fn set_node_position(&mut self, id: NodeId, x: f32, y: f32) {
        let i = id.slot();
        if i < self.pos_x.len() {
            self.pos_x[i] = x;
            self.pos_y[i] = y;
        }
    }

    /// Get a node's position, if the render layer has reported one.
    pub fn get_node_position(&self, id: NodeId) -> Option<(f32, f32)> {
        let i = id.slot();
        let (x, y) = (*self.pos_x.get(i)?, *self.pos_y.get(i)?);
        if x >= UNPLACED * 0.5 || y >= UNPLACED * 0.5 || x.is_nan() || y.is_nan() {
            None
        } else {
            Some((x, y))
        }
    }

    // =========================================================================
    // Utilities
    // =========================================================================

    /// Get the bounding box of all placed nodes.
    pub fn get_bounds(&self) -> Option<(f32, f32, f32, f32)> {
        let mut min_x = f32::INFINITY;
        let mut max_x = f32::NEG_INFINITY;
        let mut min_y = f32::INFINITY;
        let mut max_y = f32::NEG_INFINITY;

        for node in &self.nodes {
            if let Some((x, y)) = self.get_node_position(node.id) {
                min_x = min_x.min(x);
                max_x = max_x.max(x);
                min_y = min_y.min(y);
                max_y = max_y.max(y);
            }
        }

        if min_x == f32::INFINITY {
            return None;
        }

        Some((min_x, min_y, max_x, max_y))
    }

    /// Clear all nodes and edges, resetting the engine to its initial state.
    pub fn clear(&mut self) {
        self.graph.clear();
        self.node_indices.clear();
        self.key_to_id.clear();
        self.nodes.clear();
        self.pos_x.clear();
        self.pos_y.clear();
    }
}

impl Default for GraphEngine {
    fn default() -> Self {
        Self::new()
    }
}
