//! One loaded similarity network and the operations the UI drives on it.
//!
//! A [`Network`] owns every record of one input file: nodes, edges, the
//! explicit-community snapshot, implicit community boxes and the filter
//! state. Every operation runs to completion synchronously and recomputes
//! the affected state for the whole dataset.

use serde::Serialize;

use crate::config::VisualConfig;
use crate::error::{NetworkError, NetworkResult};
use crate::filter::{self, Blacklist, FilterState, HighlightCriterion};
use crate::graph::{Edge, EdgeStateEngine, GraphEngine, Node, NodeId, NodeVisuals};
use crate::input::{ImplicitCommunity, NetworkInput};
use crate::layout::compute_radial_layout;
use crate::spatial::{CommunityBoxes, SpatialIndex, compute_bounding_boxes};
use crate::visual::{
    CommunityRegistry, CommunitySnapshot, Dimension, ExplicitCommunity, NodeVisualStrategy,
    VisualizationAttribute,
};

/// Render-facing view of one node.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeView {
    pub id: u32,
    pub key: String,
    pub label: String,
    pub implicit_community: u32,
    pub default_colored: bool,
    pub selected: bool,
    #[serde(flatten)]
    pub visuals: NodeVisuals,
}

/// Render-facing view of one edge.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeView {
    pub id: u32,
    pub from: u32,
    pub to: u32,
    pub similarity: f32,
    pub visible: bool,
    pub selected: bool,
    pub width: f32,
}

/// Which filter predicate last drove node dimming.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FocusSource {
    #[default]
    Blacklist,
    Highlight,
}

/// A loaded network.
pub struct Network {
    graph: GraphEngine,
    edges: EdgeStateEngine,
    communities: CommunitySnapshot,
    strategy: NodeVisualStrategy,
    implicit: Vec<ImplicitCommunity>,
    boxes: CommunityBoxes,
    spatial: SpatialIndex,
    filter: FilterState,
    selected: Option<NodeId>,
    focused_community: Option<u32>,
    focus_source: FocusSource,
    config: VisualConfig,
}

impl Network {
    /// Build a network from a JSON document. Nothing is kept on failure.
    pub fn from_json(json: &str, config: &VisualConfig) -> NetworkResult<Self> {
        let input = NetworkInput::from_json(json)?;
        Self::from_input(input, config)
    }

    pub fn from_input(input: NetworkInput, config: &VisualConfig) -> NetworkResult<Self> {
        let mut graph = GraphEngine::with_capacity(input.users.len(), input.similarities.len());
        let mut registry = CommunityRegistry::new();

        for user in input.users {
            let id = graph.add_node(user.key, user.label, user.explicit, user.implicit_community)?;
            if let Some(node) = graph.node(id) {
                registry.observe(node);
            }
        }

        let mut communities = registry.freeze();
        communities.bind_in_discovery_order();

        let mut edges = EdgeStateEngine::new(&config.edge);
        edges.load(&input.similarities, |key| graph.resolve(key))?;
        for edge in edges.edges() {
            graph.add_edge(edge);
        }

        let strategy = NodeVisualStrategy::new(config.palette.clone(), config.node);
        for node in graph.nodes_mut() {
            strategy.change_visuals(&communities, node);
        }

        for node in graph.nodes() {
            if !input.communities.iter().any(|c| c.id == node.implicit_community) {
                log::warn!(
                    "user `{}` belongs to undescribed implicit community {}",
                    node.key,
                    node.implicit_community
                );
            }
        }

        log::info!(
            "network loaded: {} users, {} edges, {} explicit communities, {} implicit communities",
            graph.node_count(),
            graph.edge_count(),
            communities.communities().len(),
            input.communities.len()
        );

        Ok(Self {
            graph,
            edges,
            communities,
            strategy,
            implicit: input.communities,
            boxes: CommunityBoxes::default(),
            spatial: SpatialIndex::new(),
            filter: FilterState::default(),
            selected: None,
            focused_community: None,
            focus_source: FocusSource::default(),
            config: config.clone(),
        })
    }

    // =========================================================================
    // Queries
    // =========================================================================

    pub fn node_count(&self) -> u32 {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> u32 {
        self.graph.edge_count()
    }

    pub fn graph(&self) -> &GraphEngine {
        &self.graph
    }

    pub fn nodes(&self) -> &[Node] {
        self.graph.nodes()
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.graph.node(id)
    }

    pub fn node_by_key(&self, key: &str) -> Option<&Node> {
        self.graph.resolve(key).and_then(|id| self.graph.node(id))
    }

    pub fn edges(&self) -> &[Edge] {
        self.edges.edges()
    }

    pub fn edge_engine(&self) -> &EdgeStateEngine {
        &self.edges
    }

    pub fn explicit_communities(&self) -> &[ExplicitCommunity] {
        self.communities.communities()
    }

    pub fn visualization_attributes(&self) -> Vec<VisualizationAttribute> {
        self.communities.visualization_attributes()
    }

    pub fn implicit_communities(&self) -> &[ImplicitCommunity] {
        &self.implicit
    }

    pub fn implicit_community(&self, id: u32) -> Option<&ImplicitCommunity> {
        self.implicit.iter().find(|c| c.id == id)
    }

    pub fn filter_state(&self) -> &FilterState {
        &self.filter
    }

    pub fn selected_node(&self) -> Option<NodeId> {
        self.selected
    }

    pub fn focused_community(&self) -> Option<u32> {
        self.focused_community
    }

    pub fn focus_source(&self) -> FocusSource {
        self.focus_source
    }

    pub fn config(&self) -> &VisualConfig {
        &self.config
    }

    pub fn node_visuals(&self) -> Vec<NodeView> {
        self.graph
            .nodes()
            .iter()
            .map(|node| NodeView {
                id: node.id.raw(),
                key: node.key.clone(),
                label: node.label.clone(),
                implicit_community: node.implicit_community,
                default_colored: node.is_default_colored(),
                selected: node.is_selected(),
                visuals: *node.visuals(),
            })
            .collect()
    }

    pub fn edge_visuals(&self) -> Vec<EdgeView> {
        self.edges
            .edges()
            .iter()
            .map(|edge| EdgeView {
                id: edge.id.raw(),
                from: edge.from.raw(),
                to: edge.to.raw(),
                similarity: edge.similarity,
                visible: edge.is_visible(),
                selected: edge.state.is_selected(),
                width: edge.width,
            })
            .collect()
    }

    /// Tooltip text: label, implicit community name, then one
    /// `key: value` line per explicit community.
    pub fn tooltip_for(&self, id: NodeId) -> Option<String> {
        let node = self.graph.node(id)?;
        let mut lines = vec![node.label.clone()];
        match self.implicit_community(node.implicit_community) {
            Some(community) => lines.push(format!("Community: {}", community.name)),
            None => lines.push(format!("Community: {}", node.implicit_community)),
        }
        lines.extend(
            node.explicit_communities()
                .map(|(key, value)| format!("{key}: {value}")),
        );
        Some(lines.join("\n"))
    }

    // =========================================================================
    // Dimension bindings
    // =========================================================================

    /// Bind an explicit community to a visual dimension and restyle every
    /// node. Filters and focus are reset.
    pub fn bind_dimension(&mut self, key: &str, dimension: Dimension) -> NetworkResult<()> {
        self.communities.bind(key, dimension)?;
        log::debug!("bound `{key}` to {dimension}");
        self.restart_visuals();
        Ok(())
    }

    /// Release a dimension; nodes use its fallback value.
    pub fn unbind_dimension(&mut self, dimension: Dimension) {
        self.communities.unbind(dimension);
        self.restart_visuals();
    }

    fn restart_visuals(&mut self) {
        self.filter.reset();
        self.focused_community = None;
        for node in self.graph.nodes_mut() {
            self.strategy.change_visuals(&self.communities, node);
        }
    }

    // =========================================================================
    // Filtering
    // =========================================================================

    /// Replace the blacklist and dim every node carrying a hidden value.
    pub fn apply_blacklist(&mut self, blacklist: Blacklist) -> usize {
        self.filter.blacklist = blacklist;
        self.refresh_blacklist_focus()
    }

    /// Flip one attribute value in the blacklist. Returns whether the value
    /// is now hidden.
    pub fn toggle_blacklisted(&mut self, key: &str, value: &str) -> bool {
        let hidden = self.filter.blacklist.toggle(key, value);
        self.refresh_blacklist_focus();
        hidden
    }

    /// Dim nodes from the blacklist alone. Returns the number dimmed.
    pub fn refresh_blacklist_focus(&mut self) -> usize {
        self.focused_community = None;
        self.focus_source = FocusSource::Blacklist;
        let mut dimmed = 0;
        for node in self.graph.nodes_mut() {
            let focused = !filter::is_blacklisted(node, &self.filter.blacklist);
            self.strategy.set_focus(&self.communities, node, focused);
            dimmed += usize::from(!focused);
        }
        log::debug!("blacklist of {} values dims {dimmed} nodes", self.filter.blacklist.len());
        dimmed
    }

    /// Replace the highlight criteria and dim every node that fails them.
    pub fn apply_highlight(&mut self, criteria: Vec<HighlightCriterion>) -> usize {
        self.filter.highlight = criteria;
        self.refresh_highlight_focus()
    }

    /// Add or remove one required value. Returns whether it is now required.
    pub fn toggle_highlight(&mut self, key: &str, value: &str) -> bool {
        let required = self.filter.toggle_highlight(key, value);
        self.refresh_highlight_focus();
        required
    }

    /// Dim nodes from the highlight criteria alone. Returns the number dimmed.
    pub fn refresh_highlight_focus(&mut self) -> usize {
        self.focused_community = None;
        self.focus_source = FocusSource::Highlight;
        let mut dimmed = 0;
        for node in self.graph.nodes_mut() {
            let focused = filter::matches_highlight(node, &self.filter.highlight);
            self.strategy.set_focus(&self.communities, node, focused);
            dimmed += usize::from(!focused);
        }
        log::debug!(
            "{} highlight criteria dim {dimmed} nodes",
            self.filter.highlight.len()
        );
        dimmed
    }

    /// Drop community focus and re-dim from the filter that last drove
    /// dimming. Filter inputs are kept. Returns the number dimmed.
    pub fn clear_community_focus(&mut self) -> usize {
        match self.focus_source {
            FocusSource::Blacklist => self.refresh_blacklist_focus(),
            FocusSource::Highlight => self.refresh_highlight_focus(),
        }
    }

    /// Clear all filters and restore every node.
    pub fn reset_focus(&mut self) {
        self.filter.reset();
        self.focused_community = None;
        self.focus_source = FocusSource::default();
        for node in self.graph.nodes_mut() {
            self.strategy.to_default(&self.communities, node);
        }
    }

    // =========================================================================
    // Edge policy
    // =========================================================================

    pub fn set_threshold(&mut self, threshold: f32) {
        self.edges.set_threshold(threshold);
    }

    pub fn set_variable_width(&mut self, variable_width: bool) {
        self.edges.set_variable_width(variable_width);
    }

    /// Hide every edge outside the current selection (or stop doing so).
    pub fn set_hide_unselected(&mut self, hide: bool) {
        self.edges.set_hide_unselected(hide, None);
    }

    // =========================================================================
    // Selection
    // =========================================================================

    /// Select a node and its incident edges. Returns the node's neighbors.
    pub fn select_node(&mut self, id: NodeId) -> NetworkResult<Vec<NodeId>> {
        if self.graph.node(id).is_none() {
            return Err(NetworkError::UnknownNode(id.to_string()));
        }

        if let Some(previous) = self.selected.take() {
            if let Some(node) = self.graph.node_mut(previous) {
                node.set_selected(false);
            }
        }
        if let Some(node) = self.graph.node_mut(id) {
            node.set_selected(true);
        }
        self.selected = Some(id);

        let incident = self.graph.incident_edges(id);
        self.edges.set_selected(&incident);
        Ok(self.graph.neighbors(id))
    }

    pub fn select_node_by_key(&mut self, key: &str) -> NetworkResult<Vec<NodeId>> {
        let id = self
            .graph
            .resolve(key)
            .ok_or_else(|| NetworkError::UnknownNode(key.to_string()))?;
        self.select_node(id)
    }

    pub fn clear_selection(&mut self) {
        if let Some(previous) = self.selected.take() {
            if let Some(node) = self.graph.node_mut(previous) {
                node.set_selected(false);
            }
        }
        self.edges.clear_selection();
    }

    // =========================================================================
    // Implicit communities
    // =========================================================================

    /// Deterministic starting positions, applied and returned interleaved.
    pub fn initial_layout(&mut self) -> Vec<f32> {
        let assignments: Vec<u32> = self
            .graph
            .nodes()
            .iter()
            .map(|n| n.implicit_community)
            .collect();
        let positions = compute_radial_layout(&assignments, &self.config.layout);
        self.update_positions(&positions);
        positions
    }

    /// Take node positions from the render layer and recompute community
    /// boxes. Returns the number of boxes.
    pub fn update_positions(&mut self, positions: &[f32]) -> usize {
        self.graph.set_positions(positions);
        self.recompute_boxes()
    }

    pub fn set_node_position(&mut self, id: NodeId, x: f32, y: f32) -> usize {
        self.graph.set_node_position(id, x, y);
        self.recompute_boxes()
    }

    fn recompute_boxes(&mut self) -> usize {
        let graph = &self.graph;
        self.boxes = compute_bounding_boxes(graph.nodes().iter().filter_map(|node| {
            graph
                .get_node_position(node.id)
                .map(|(x, y)| (node.implicit_community, x, y))
        }));
        self.spatial.rebuild(&self.boxes);

        for community in &mut self.implicit {
            community.bounding_box = self.boxes.get(community.id).map(|b| b.bounds);
        }
        self.boxes.len()
    }

    pub fn community_boxes(&self) -> &CommunityBoxes {
        &self.boxes
    }

    /// Community whose box contains the point; first in draw order on overlap.
    pub fn hit_test_community(&self, x: f32, y: f32) -> Option<u32> {
        self.spatial.hit_test(x, y)
    }

    /// Keep only one implicit community's members in focus. Returns the
    /// member count.
    pub fn select_community(&mut self, community: u32) -> usize {
        let mut members = 0;
        for node in self.graph.nodes_mut() {
            let focused = node.implicit_community == community;
            self.strategy.set_focus(&self.communities, node, focused);
            members += usize::from(focused);
        }
        self.focused_community = Some(community);
        members
    }

    /// Select the community under a click. A click on no box drops the
    /// community focus and falls back to the active filter.
    pub fn click_community(&mut self, x: f32, y: f32) -> Option<u32> {
        match self.hit_test_community(x, y) {
            Some(community) => {
                self.select_community(community);
                Some(community)
            }
            None => {
                self.clear_community_focus();
                None
            }
        }
    }
}

/// Stable handle of a network inside a [`NetworkSet`].
pub type NetworkHandle = usize;

/// Independent networks shown side by side.
///
/// Broadcast operations are sequential calls into each network; networks
/// never share mutable state. Handles stay valid after other networks are
/// removed and are never reused.
#[derive(Default)]
pub struct NetworkSet {
    slots: Vec<Option<Network>>,
}

impl NetworkSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, network: Network) -> NetworkHandle {
        self.slots.push(Some(network));
        self.slots.len() - 1
    }

    /// Drop a network and all of its state.
    pub fn remove(&mut self, handle: NetworkHandle) -> Option<Network> {
        let network = self.slots.get_mut(handle)?.take();
        if network.is_some() {
            log::info!("network {handle} removed");
        }
        network
    }

    pub fn get(&self, handle: NetworkHandle) -> Option<&Network> {
        self.slots.get(handle)?.as_ref()
    }

    pub fn get_mut(&mut self, handle: NetworkHandle) -> Option<&mut Network> {
        self.slots.get_mut(handle)?.as_mut()
    }

    /// Live handles in insertion order.
    pub fn handles(&self) -> impl Iterator<Item = NetworkHandle> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(handle, slot)| slot.as_ref().map(|_| handle))
    }

    pub fn len(&self) -> usize {
        self.slots.iter().flatten().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn networks_mut(&mut self) -> impl Iterator<Item = &mut Network> {
        self.slots.iter_mut().flatten()
    }

    pub fn broadcast_threshold(&mut self, threshold: f32) {
        for network in self.networks_mut() {
            network.set_threshold(threshold);
        }
    }

    pub fn broadcast_variable_width(&mut self, variable_width: bool) {
        for network in self.networks_mut() {
            network.set_variable_width(variable_width);
        }
    }

    pub fn broadcast_hide_unselected(&mut self, hide: bool) {
        for network in self.networks_mut() {
            network.set_hide_unselected(hide);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::visual::Palette;

    const DOC: &str = r#"{
        "users": [
            {"id": "a", "label": "Ann", "implicit_community": 0,
             "explicit_community": {"ageGroup": "20s", "language": "en"}},
            {"id": "b", "label": "Bob", "implicit_community": 0,
             "explicit_community": {"ageGroup": "30s", "language": "es"}},
            {"id": "c", "label": "Cid", "implicit_community": 1,
             "explicit_community": {"ageGroup": "20s", "language": "es"}},
            {"id": "d", "label": "Dee", "implicit_community": 1,
             "explicit_community": {"ageGroup": "40s", "language": "fr"}}
        ],
        "similarities": [
            {"u1": "a", "u2": "b", "value": 0.9},
            {"u1": "a", "u2": "c", "value": 0.4},
            {"u1": "c", "u2": "d", "value": 0.2}
        ],
        "communities": [
            {"id": 0, "name": "North"},
            {"id": 1, "name": "South"}
        ]
    }"#;

    fn network() -> Network {
        Network::from_json(DOC, &VisualConfig::default()).unwrap()
    }

    fn dimmed_keys(network: &Network) -> Vec<&str> {
        network
            .nodes()
            .iter()
            .filter(|n| !n.is_default_colored())
            .map(|n| n.key.as_str())
            .collect()
    }

    #[test]
    fn test_load_binds_in_discovery_order() {
        let network = network();
        assert_eq!(network.node_count(), 4);
        assert_eq!(network.edge_count(), 3);

        let attrs = network.visualization_attributes();
        assert_eq!(attrs[0].attribute_key, "ageGroup");
        assert_eq!(attrs[0].dimension, Dimension::Color);
        assert_eq!(attrs[0].values, vec!["20s", "30s", "40s"]);
        assert_eq!(attrs[1].attribute_key, "language");
        assert_eq!(attrs[1].dimension, Dimension::Shape);

        let palette = Palette::default();
        let bob = network.node_by_key("b").unwrap();
        assert_eq!(bob.visuals().background, palette.color_for_index(1));
        assert_eq!(bob.visuals().shape, palette.shape_for_index(1));
    }

    #[test]
    fn test_blacklist_then_highlight_are_independent() {
        let mut network = network();
        assert_eq!(network.apply_blacklist(Blacklist::from_tokens(["language_es"])), 2);
        assert_eq!(dimmed_keys(&network), vec!["b", "c"]);

        // Highlight recomputes from its own predicate only.
        let dimmed = network.apply_highlight(vec![HighlightCriterion::new("ageGroup", ["20s"])]);
        assert_eq!(dimmed, 2);
        assert_eq!(dimmed_keys(&network), vec!["b", "d"]);

        network.reset_focus();
        assert!(dimmed_keys(&network).is_empty());
        assert!(network.filter_state().blacklist.is_empty());
    }

    #[test]
    fn test_toggle_blacklisted_round_trip() {
        let mut network = network();
        let before: Vec<_> = network.node_visuals();
        assert!(network.toggle_blacklisted("ageGroup", "20s"));
        assert_eq!(dimmed_keys(&network), vec!["a", "c"]);
        assert!(!network.toggle_blacklisted("ageGroup", "20s"));
        assert_eq!(network.node_visuals(), before);
    }

    #[test]
    fn test_rebinding_resets_filters() {
        let mut network = network();
        network.toggle_blacklisted("language", "fr");
        network
            .bind_dimension("language", Dimension::Color)
            .unwrap();
        assert!(network.filter_state().blacklist.is_empty());
        assert!(dimmed_keys(&network).is_empty());

        let palette = Palette::default();
        let dee = network.node_by_key("d").unwrap();
        assert_eq!(dee.visuals().background, palette.color_for_index(2));
        assert_eq!(dee.visuals().shape, palette.fallback_shape);

        assert!(matches!(
            network.bind_dimension("height", Dimension::Border),
            Err(NetworkError::UnknownCommunityKey(_))
        ));
    }

    #[test]
    fn test_select_node_with_hide_unselected() {
        let mut network = network();
        network.set_hide_unselected(true);
        assert_eq!(network.edge_engine().hidden_count(), 3);

        let neighbors = network.select_node_by_key("a").unwrap();
        assert_eq!(neighbors, vec![NodeId(1), NodeId(2)]);
        assert_eq!(network.edge_engine().hidden_count(), 1);
        assert!(network.node_by_key("a").unwrap().is_selected());

        network.select_node_by_key("d").unwrap();
        assert!(!network.node_by_key("a").unwrap().is_selected());
        assert_eq!(network.edge_engine().hidden_count(), 2);

        network.clear_selection();
        assert_eq!(network.selected_node(), None);
        assert_eq!(network.edge_engine().hidden_count(), 3);

        assert!(matches!(
            network.select_node_by_key("zz"),
            Err(NetworkError::UnknownNode(_))
        ));
    }

    #[test]
    fn test_positions_boxes_and_click() {
        let mut network = network();
        assert!(network.implicit_communities()[0].bounding_box.is_none());

        let boxes = network.update_positions(&[0.0, 0.0, 10.0, 10.0, 100.0, 100.0, 120.0, 130.0]);
        assert_eq!(boxes, 2);
        let north = network.implicit_community(0).unwrap().bounding_box.unwrap();
        assert_eq!((north.left, north.top, north.right, north.bottom), (0.0, 0.0, 10.0, 10.0));

        assert_eq!(network.click_community(110.0, 115.0), Some(1));
        assert_eq!(network.focused_community(), Some(1));
        assert_eq!(dimmed_keys(&network), vec!["a", "b"]);

        assert_eq!(network.click_community(500.0, 500.0), None);
        assert!(dimmed_keys(&network).is_empty());
    }

    #[test]
    fn test_click_on_empty_canvas_keeps_filters() {
        let mut network = network();
        network.update_positions(&[0.0, 0.0, 10.0, 10.0, 100.0, 100.0, 120.0, 130.0]);
        network.toggle_blacklisted("language", "es");

        network.click_community(110.0, 115.0);
        assert_eq!(dimmed_keys(&network), vec!["a", "b"]);

        assert_eq!(network.click_community(500.0, 500.0), None);
        assert_eq!(network.focused_community(), None);
        assert!(network.filter_state().blacklist.contains("language", "es"));
        assert_eq!(dimmed_keys(&network), vec!["b", "c"]);

        // Later toggles build on the surviving blacklist.
        network.toggle_blacklisted("language", "en");
        assert!(network.filter_state().blacklist.contains("language", "es"));
        assert_eq!(dimmed_keys(&network), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_click_miss_restores_highlight() {
        let mut network = network();
        network.update_positions(&[0.0, 0.0, 10.0, 10.0, 100.0, 100.0, 120.0, 130.0]);
        network.apply_highlight(vec![HighlightCriterion::new("ageGroup", ["20s"])]);
        network.click_community(5.0, 5.0);
        assert_eq!(dimmed_keys(&network), vec!["c", "d"]);

        network.click_community(500.0, 500.0);
        assert_eq!(network.focus_source(), FocusSource::Highlight);
        assert_eq!(network.filter_state().highlight.len(), 1);
        assert_eq!(dimmed_keys(&network), vec!["b", "d"]);
    }

    #[test]
    fn test_initial_layout_places_everyone() {
        let mut network = network();
        let positions = network.initial_layout();
        assert_eq!(positions.len(), 8);
        for node in network.nodes() {
            assert!(network.graph().get_node_position(node.id).is_some());
        }
        assert_eq!(network.community_boxes().len(), 2);
    }

    #[test]
    fn test_tooltip() {
        let network = network();
        let id = network.node_by_key("b").unwrap().id;
        assert_eq!(
            network.tooltip_for(id).unwrap(),
            "Bob\nCommunity: North\nageGroup: 30s\nlanguage: es"
        );
        assert_eq!(network.tooltip_for(NodeId(99)), None);
    }

    #[test]
    fn test_network_set_broadcast() {
        let mut set = NetworkSet::new();
        let first = set.push(network());
        let second = set.push(network());
        set.broadcast_threshold(0.5);
        for handle in set.handles().collect::<Vec<_>>() {
            assert_eq!(set.get(handle).unwrap().edge_engine().hidden_count(), 2);
        }

        set.get_mut(second).unwrap().set_threshold(0.0);
        assert_eq!(set.get(first).unwrap().edge_engine().hidden_count(), 2);
        assert_eq!(set.get(second).unwrap().edge_engine().hidden_count(), 0);

        set.broadcast_variable_width(false);
        assert!(set.get(first).unwrap().edges().iter().all(|e| e.width == 1.0));
    }

    #[test]
    fn test_network_set_handles_survive_removal() {
        let mut set = NetworkSet::new();
        let first = set.push(network());
        let second = set.push(network());
        set.get_mut(second).unwrap().set_threshold(0.5);

        assert!(set.remove(first).is_some());
        assert!(set.remove(first).is_none());
        assert!(set.remove(5).is_none());
        assert_eq!(set.len(), 1);

        let kept = set.get(second).unwrap();
        assert_eq!(kept.edge_engine().hidden_count(), 2);
        assert_eq!(set.handles().collect::<Vec<_>>(), vec![second]);

        // Handles are never reused.
        let third = set.push(network());
        assert_ne!(third, first);
        set.broadcast_threshold(0.95);
        assert_eq!(set.get(second).unwrap().edge_engine().hidden_count(), 3);
        assert_eq!(set.get(third).unwrap().edge_engine().hidden_count(), 3);

        assert!(set.remove(second).is_some());
        assert!(set.remove(third).is_some());
        assert!(set.is_empty());
    }

    #[test]
    fn test_failed_load_reports_error() {
        let broken = DOC.replace(r#""u2": "d", "#, "");
        let err = Network::from_json(&broken, &VisualConfig::default()).err().unwrap();
        assert!(matches!(err, NetworkError::MalformedEdge { index: 2, field: "u2" }));
    }
}
