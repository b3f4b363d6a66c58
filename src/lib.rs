//! Similarity Network Visualization - WASM Module
//!
//! This module provides the attribute-assignment and filtering engine behind
//! an interactive similarity-network view. It is compiled to WebAssembly and
//! exposes a JavaScript-friendly API via wasm-bindgen; rendering stays on the
//! JS side, which feeds node positions back in and repaints from the
//! snapshots returned here.
//!
//! # Architecture
//!
//! - `graph`: users and similarity edges on petgraph's StableGraph, plus the
//!   threshold-driven edge visibility engine
//! - `visual`: palettes, explicit-community discovery and per-dimension styling
//! - `filter`: blacklist and highlight predicates
//! - `spatial`: implicit-community bounding boxes and R-tree hit testing
//! - `layout`: deterministic radial seeding of initial positions
//! - `network`: one loaded network and the operations the UI drives on it

use js_sys::Float32Array;
use serde::Serialize;
use wasm_bindgen::prelude::*;

pub mod config;
pub mod error;
pub mod filter;
pub mod graph;
pub mod input;
pub mod layout;
pub mod network;
pub mod overlay;
pub mod spatial;
pub mod visual;

use config::VisualConfig;
use error::NetworkError;
use filter::{Blacklist, HighlightCriterion};
use network::{Network, NetworkSet};
use overlay::{OwnerId, SharedOverlay};
use visual::Dimension;

/// Initialize the WASM module.
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
    if console_log::init_with_level(log::Level::Debug).is_err() {
        log::debug!("logger already installed");
    }
}

fn to_js(err: NetworkError) -> JsValue {
    JsValue::from_str(&err.to_string())
}

/// Plain JS objects rather than `Map`s, so flattened snapshots read naturally.
fn to_js_value<T: Serialize + ?Sized>(value: &T) -> Result<JsValue, JsValue> {
    let serializer = serde_wasm_bindgen::Serializer::new().serialize_maps_as_objects(true);
    Ok(value.serialize(&serializer)?)
}

fn not_loaded() -> JsValue {
    JsValue::from_str("no network loaded")
}

fn parse_dimension(name: &str) -> Result<Dimension, JsValue> {
    Dimension::parse(name).ok_or_else(|| JsValue::from_str(&format!("unknown dimension `{name}`")))
}

/// Tooltip/popover slot shared by several network panels.
#[wasm_bindgen]
#[derive(Default)]
pub struct OverlayHandle {
    inner: SharedOverlay,
}

#[wasm_bindgen]
impl OverlayHandle {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self::default()
    }

    /// Owner currently showing content, if any.
    pub fn holder(&self) -> Option<u32> {
        self.inner.holder()
    }

    /// Text currently shown, if any.
    pub fn text(&self) -> Option<String> {
        self.inner.content().map(|c| c.text)
    }
}

/// Main entry point for one network panel.
///
/// This struct wraps a loaded [`Network`] and provides the public API
/// exposed to JavaScript.
#[wasm_bindgen]
pub struct SimilarityNetworkWasm {
    config: VisualConfig,
    network: Option<Network>,
    overlay: SharedOverlay,
    owner: OwnerId,
}

impl SimilarityNetworkWasm {
    fn loaded(&self) -> Result<&Network, JsValue> {
        self.network.as_ref().ok_or_else(not_loaded)
    }

    fn loaded_mut(&mut self) -> Result<&mut Network, JsValue> {
        self.network.as_mut().ok_or_else(not_loaded)
    }
}

#[wasm_bindgen]
impl SimilarityNetworkWasm {
    /// Create an empty panel. `config` is an optional JSON object overriding
    /// palette, edge, node and layout defaults.
    #[wasm_bindgen(constructor)]
    pub fn new(config: Option<String>) -> Result<SimilarityNetworkWasm, JsValue> {
        let config = VisualConfig::from_json(config.as_deref().unwrap_or_default()).map_err(to_js)?;
        Ok(Self {
            config,
            network: None,
            overlay: SharedOverlay::new(),
            owner: 0,
        })
    }

    /// Share `overlay` with other panels; `owner` identifies this panel.
    #[wasm_bindgen(js_name = attachOverlay)]
    pub fn attach_overlay(&mut self, overlay: &OverlayHandle, owner: u32) {
        self.overlay.release(self.owner);
        self.overlay = overlay.inner.clone();
        self.owner = owner;
    }

    // =========================================================================
    // Loading
    // =========================================================================

    /// Load a network document. On error the previous network stays in place.
    pub fn load(&mut self, json: &str) -> Result<(), JsValue> {
        let network = Network::from_json(json, &self.config).map_err(to_js)?;
        self.overlay.release(self.owner);
        self.network = Some(network);
        Ok(())
    }

    /// Drop the loaded network.
    pub fn clear(&mut self) {
        self.overlay.release(self.owner);
        if self.network.take().is_some() {
            log::info!("network cleared");
        }
    }

    #[wasm_bindgen(js_name = isLoaded)]
    pub fn is_loaded(&self) -> bool {
        self.network.is_some()
    }

    #[wasm_bindgen(js_name = nodeCount)]
    pub fn node_count(&self) -> u32 {
        self.network.as_ref().map_or(0, Network::node_count)
    }

    #[wasm_bindgen(js_name = edgeCount)]
    pub fn edge_count(&self) -> u32 {
        self.network.as_ref().map_or(0, Network::edge_count)
    }

    // =========================================================================
    // Edge Policy
    // =========================================================================

    #[wasm_bindgen(js_name = setThreshold)]
    pub fn set_threshold(&mut self, threshold: f32) -> Result<(), JsValue> {
        self.loaded_mut()?.set_threshold(threshold);
        Ok(())
    }

    pub fn threshold(&self) -> f32 {
        self.network
            .as_ref()
            .map_or(self.config.edge.initial_threshold, |n| n.edge_engine().threshold())
    }

    #[wasm_bindgen(js_name = setVariableWidth)]
    pub fn set_variable_width(&mut self, variable_width: bool) -> Result<(), JsValue> {
        self.loaded_mut()?.set_variable_width(variable_width);
        Ok(())
    }

    #[wasm_bindgen(js_name = setHideUnselected)]
    pub fn set_hide_unselected(&mut self, hide: bool) -> Result<(), JsValue> {
        self.loaded_mut()?.set_hide_unselected(hide);
        Ok(())
    }

    // =========================================================================
    // Dimensions and Filters
    // =========================================================================

    /// Bind an explicit community key to `"color"`, `"shape"` or `"border"`.
    #[wasm_bindgen(js_name = bindDimension)]
    pub fn bind_dimension(&mut self, key: &str, dimension: &str) -> Result<(), JsValue> {
        let dimension = parse_dimension(dimension)?;
        self.loaded_mut()?.bind_dimension(key, dimension).map_err(to_js)
    }

    #[wasm_bindgen(js_name = unbindDimension)]
    pub fn unbind_dimension(&mut self, dimension: &str) -> Result<(), JsValue> {
        let dimension = parse_dimension(dimension)?;
        self.loaded_mut()?.unbind_dimension(dimension);
        Ok(())
    }

    /// Replace the blacklist with an array of `"{key}_{value}"` tokens.
    /// Returns the number of dimmed nodes.
    #[wasm_bindgen(js_name = setBlacklist)]
    pub fn set_blacklist(&mut self, tokens: JsValue) -> Result<usize, JsValue> {
        let tokens: Vec<String> = serde_wasm_bindgen::from_value(tokens)?;
        Ok(self.loaded_mut()?.apply_blacklist(Blacklist::from_tokens(tokens)))
    }

    #[wasm_bindgen(js_name = toggleBlacklist)]
    pub fn toggle_blacklist(&mut self, key: &str, value: &str) -> Result<bool, JsValue> {
        Ok(self.loaded_mut()?.toggle_blacklisted(key, value))
    }

    /// Replace the highlight criteria with an array of `{key, values}`.
    /// Returns the number of dimmed nodes.
    #[wasm_bindgen(js_name = setHighlight)]
    pub fn set_highlight(&mut self, criteria: JsValue) -> Result<usize, JsValue> {
        let criteria: Vec<HighlightCriterion> = serde_wasm_bindgen::from_value(criteria)?;
        Ok(self.loaded_mut()?.apply_highlight(criteria))
    }

    #[wasm_bindgen(js_name = toggleHighlight)]
    pub fn toggle_highlight(&mut self, key: &str, value: &str) -> Result<bool, JsValue> {
        Ok(self.loaded_mut()?.toggle_highlight(key, value))
    }

    #[wasm_bindgen(js_name = resetFocus)]
    pub fn reset_focus(&mut self) -> Result<(), JsValue> {
        self.loaded_mut()?.reset_focus();
        Ok(())
    }

    // =========================================================================
    // Selection
    // =========================================================================

    /// Select a user by id. Returns the neighbor node slots.
    #[wasm_bindgen(js_name = selectNode)]
    pub fn select_node(&mut self, key: &str) -> Result<Vec<u32>, JsValue> {
        let neighbors = self.loaded_mut()?.select_node_by_key(key).map_err(to_js)?;
        Ok(neighbors.into_iter().map(u32::from).collect())
    }

    #[wasm_bindgen(js_name = clearSelection)]
    pub fn clear_selection(&mut self) -> Result<(), JsValue> {
        self.loaded_mut()?.clear_selection();
        Ok(())
    }

    // =========================================================================
    // Positions and Implicit Communities
    // =========================================================================

    /// Report rendered positions as [x0, y0, x1, y1, ...] in node-slot order.
    /// Returns the number of community boxes.
    #[wasm_bindgen(js_name = updatePositions)]
    pub fn update_positions(&mut self, positions: &[f32]) -> Result<usize, JsValue> {
        Ok(self.loaded_mut()?.update_positions(positions))
    }

    /// Compute, apply and return the radial starting layout.
    #[wasm_bindgen(js_name = computeInitialLayout)]
    pub fn compute_initial_layout(&mut self) -> Result<Float32Array, JsValue> {
        let positions = self.loaded_mut()?.initial_layout();
        Ok(Float32Array::from(&positions[..]))
    }

    /// Get a zero-copy view of X positions.
    ///
    /// # Safety
    ///
    /// The returned view is invalidated if any Rust allocation occurs.
    /// Use immediately, do not store.
    #[wasm_bindgen(js_name = getPositionsXView)]
    pub fn get_positions_x_view(&self) -> Result<Float32Array, JsValue> {
        let network = self.loaded()?;
        Ok(unsafe { Float32Array::view(network.graph().positions_x()) })
    }

    /// Get a zero-copy view of Y positions. Same caveats as the X view.
    #[wasm_bindgen(js_name = getPositionsYView)]
    pub fn get_positions_y_view(&self) -> Result<Float32Array, JsValue> {
        let network = self.loaded()?;
        Ok(unsafe { Float32Array::view(network.graph().positions_y()) })
    }

    #[wasm_bindgen(js_name = hitTestCommunity)]
    pub fn hit_test_community(&self, x: f32, y: f32) -> Option<u32> {
        self.network.as_ref()?.hit_test_community(x, y)
    }

    /// Focus one implicit community. Returns its member count.
    #[wasm_bindgen(js_name = selectCommunity)]
    pub fn select_community(&mut self, community: u32) -> Result<usize, JsValue> {
        Ok(self.loaded_mut()?.select_community(community))
    }

    /// Focus the community under a click, or restore all nodes on a miss.
    #[wasm_bindgen(js_name = clickCommunity)]
    pub fn click_community(&mut self, x: f32, y: f32) -> Result<Option<u32>, JsValue> {
        Ok(self.loaded_mut()?.click_community(x, y))
    }

    // =========================================================================
    // Queries
    // =========================================================================

    #[wasm_bindgen(js_name = getVisualizationAttributes)]
    pub fn get_visualization_attributes(&self) -> Result<JsValue, JsValue> {
        Ok(to_js_value(&self.loaded()?.visualization_attributes())?)
    }

    #[wasm_bindgen(js_name = getExplicitCommunities)]
    pub fn get_explicit_communities(&self) -> Result<JsValue, JsValue> {
        Ok(to_js_value(self.loaded()?.explicit_communities())?)
    }

    #[wasm_bindgen(js_name = getImplicitCommunities)]
    pub fn get_implicit_communities(&self) -> Result<JsValue, JsValue> {
        Ok(to_js_value(self.loaded()?.implicit_communities())?)
    }

    /// Per-node style snapshot for the next repaint.
    #[wasm_bindgen(js_name = getNodeVisuals)]
    pub fn get_node_visuals(&self) -> Result<JsValue, JsValue> {
        Ok(to_js_value(&self.loaded()?.node_visuals())?)
    }

    /// Per-edge visibility and width snapshot for the next repaint.
    #[wasm_bindgen(js_name = getEdgeVisuals)]
    pub fn get_edge_visuals(&self) -> Result<JsValue, JsValue> {
        Ok(to_js_value(&self.loaded()?.edge_visuals())?)
    }

    /// Show the tooltip for a node slot in the shared overlay.
    #[wasm_bindgen(js_name = showTooltip)]
    pub fn show_tooltip(&mut self, node: u32) -> Result<Option<String>, JsValue> {
        let Some(text) = self.loaded()?.tooltip_for(node.into()) else {
            return Ok(None);
        };
        self.overlay.acquire(self.owner, text.clone());
        Ok(Some(text))
    }

    #[wasm_bindgen(js_name = hideTooltip)]
    pub fn hide_tooltip(&mut self) -> bool {
        self.overlay.release(self.owner)
    }
}

/// Several panels driven together by the global controls.
#[wasm_bindgen]
pub struct SimilarityNetworkSetWasm {
    config: VisualConfig,
    networks: NetworkSet,
}

#[wasm_bindgen]
impl SimilarityNetworkSetWasm {
    #[wasm_bindgen(constructor)]
    pub fn new(config: Option<String>) -> Result<SimilarityNetworkSetWasm, JsValue> {
        let config = VisualConfig::from_json(config.as_deref().unwrap_or_default()).map_err(to_js)?;
        Ok(Self {
            config,
            networks: NetworkSet::new(),
        })
    }

    /// Load one more network. Returns its handle, which stays valid until
    /// that network is removed.
    pub fn add(&mut self, json: &str) -> Result<usize, JsValue> {
        let network = Network::from_json(json, &self.config).map_err(to_js)?;
        Ok(self.networks.push(network))
    }

    pub fn remove(&mut self, handle: usize) -> bool {
        self.networks.remove(handle).is_some()
    }

    pub fn len(&self) -> usize {
        self.networks.len()
    }

    #[wasm_bindgen(js_name = isEmpty)]
    pub fn is_empty(&self) -> bool {
        self.networks.is_empty()
    }

    #[wasm_bindgen(js_name = broadcastThreshold)]
    pub fn broadcast_threshold(&mut self, threshold: f32) {
        self.networks.broadcast_threshold(threshold);
    }

    #[wasm_bindgen(js_name = broadcastVariableWidth)]
    pub fn broadcast_variable_width(&mut self, variable_width: bool) {
        self.networks.broadcast_variable_width(variable_width);
    }

    #[wasm_bindgen(js_name = broadcastHideUnselected)]
    pub fn broadcast_hide_unselected(&mut self, hide: bool) {
        self.networks.broadcast_hide_unselected(hide);
    }

    #[wasm_bindgen(js_name = getEdgeVisuals)]
    pub fn get_edge_visuals(&self, handle: usize) -> Result<JsValue, JsValue> {
        let network = self.networks.get(handle).ok_or_else(not_loaded)?;
        Ok(to_js_value(&network.edge_visuals())?)
    }
}

#[cfg(test)]
mod integration_tests {
    use super::*;
    use crate::graph::NodeId;
    use crate::visual::Palette;

    fn scenario_edges() -> &'static str {
        r#"{
            "users": [
                {"id": 1, "label": "one", "implicit_community": 0},
                {"id": 2, "label": "two", "implicit_community": 0},
                {"id": 3, "label": "three", "implicit_community": 1}
            ],
            "similarities": [
                {"u1": 1, "u2": 2, "value": 0.8},
                {"u1": 1, "u2": 3, "value": 0.05},
                {"u1": 2, "u2": 2, "value": 0.9}
            ],
            "communities": [{"id": 0, "name": "zero"}, {"id": 1, "name": "one"}]
        }"#
    }

    fn scenario_communities() -> &'static str {
        r#"{
            "users": [
                {"id": "a", "implicit_community": 0,
                 "explicit_community": {"ageGroup": "20s", "language": "en"}},
                {"id": "b", "implicit_community": 0,
                 "explicit_community": {"ageGroup": "30s", "language": "es"}},
                {"id": "c", "implicit_community": 1,
                 "explicit_community": {"ageGroup": "20s", "language": "es"}},
                {"id": "d", "implicit_community": 1,
                 "explicit_community": {"ageGroup": "30s", "language": "en"}}
            ],
            "similarities": [{"u1": "a", "u2": "b", "value": 0.7}],
            "communities": {"0": {"name": "left"}, "1": {"name": "right"}}
        }"#
    }

    /// Self-loops are dropped and the threshold hides weak edges.
    #[test]
    fn test_threshold_scenario() {
        let mut network = Network::from_json(scenario_edges(), &VisualConfig::default()).unwrap();

        let pair = |a: u32, b: u32| (NodeId(a), NodeId(b));
        let edges = network.edges();
        assert!(edges.iter().all(|e| e.from != e.to));
        let strong: Vec<_> = edges
            .iter()
            .filter(|e| e.unordered_pair() == pair(0, 1))
            .collect();
        assert_eq!(strong.len(), 1);
        assert_eq!(strong[0].similarity, 0.8);

        network.set_threshold(0.5);
        let visible: Vec<_> = network
            .edge_engine()
            .visible_edges()
            .map(|e| e.unordered_pair())
            .collect();
        assert_eq!(visible, vec![pair(0, 1)]);

        network.set_threshold(0.9);
        assert_eq!(network.edge_engine().visible_edges().count(), 0);
    }

    /// Two keys bound to color and shape drive independent channels.
    #[test]
    fn test_dimension_scenario() {
        let network = Network::from_json(scenario_communities(), &VisualConfig::default()).unwrap();
        let palette = Palette::default();

        let attrs = network.visualization_attributes();
        assert_eq!(attrs[0].attribute_key, "ageGroup");
        assert_eq!(attrs[0].values, vec!["20s", "30s"]);
        assert_eq!(attrs[1].attribute_key, "language");
        assert_eq!(attrs[1].values, vec!["en", "es"]);

        let b = network.node_by_key("b").unwrap();
        assert_eq!(b.visuals().background, palette.color_for_index(1));
        assert_eq!(b.visuals().shape, palette.shape_for_index(1));

        let d = network.node_by_key("d").unwrap();
        assert_eq!(d.visuals().background, palette.color_for_index(1));
        assert_eq!(d.visuals().shape, palette.shape_for_index(0));
    }

    /// Blacklisting a value dims exactly the nodes carrying it.
    #[test]
    fn test_blacklist_scenario() {
        let mut network = Network::from_json(scenario_communities(), &VisualConfig::default()).unwrap();
        network.apply_blacklist(Blacklist::from_tokens(["language_es"]));

        for node in network.nodes() {
            let has_es = node.explicit_value("language") == Some("es");
            assert_eq!(node.is_default_colored(), !has_es, "node {}", node.key);
        }

        // Dimming keeps shape.
        let palette = Palette::default();
        let b = network.node_by_key("b").unwrap();
        assert_eq!(b.visuals().background, palette.unfocused_color);
        assert_eq!(b.visuals().shape, palette.shape_for_index(1));
    }

    /// Load, position, click a community, then reload with a broken file.
    #[test]
    fn test_load_position_click_pipeline() {
        let mut panel = SimilarityNetworkWasm::new(None).unwrap();
        panel.load(scenario_communities()).unwrap();
        assert_eq!(panel.node_count(), 4);
        assert_eq!(panel.edge_count(), 1);

        let boxes = panel
            .update_positions(&[0.0, 0.0, 20.0, 20.0, 200.0, 200.0, 260.0, 240.0])
            .unwrap();
        assert_eq!(boxes, 2);
        assert_eq!(panel.hit_test_community(10.0, 10.0), Some(0));
        assert_eq!(panel.hit_test_community(230.0, 220.0), Some(1));
        assert_eq!(panel.hit_test_community(100.0, 100.0), None);

        assert_eq!(panel.select_community(1).unwrap(), 2);
        let network = panel.network.as_ref().unwrap();
        let focused: Vec<_> = network
            .nodes()
            .iter()
            .filter(|n| n.is_default_colored())
            .map(|n| n.key.as_str())
            .collect();
        assert_eq!(focused, vec!["c", "d"]);

        // A broken document leaves the loaded network untouched.
        let broken = scenario_communities().replace(r#""value": 0.7"#, r#""weight": 0.7"#);
        let before = panel.network.as_ref().unwrap().node_visuals();
        assert!(Network::from_json(&broken, &panel.config).is_err());
        assert_eq!(panel.network.as_ref().unwrap().node_visuals(), before);
    }

    /// Panels sharing an overlay displace each other's tooltips.
    #[test]
    fn test_shared_tooltip_between_panels() {
        let overlay = OverlayHandle::new();
        let mut left = SimilarityNetworkWasm::new(None).unwrap();
        let mut right = SimilarityNetworkWasm::new(None).unwrap();
        left.attach_overlay(&overlay, 1);
        right.attach_overlay(&overlay, 2);
        left.load(scenario_edges()).unwrap();
        right.load(scenario_communities()).unwrap();

        let text = left.show_tooltip(0).unwrap().unwrap();
        assert!(text.starts_with("one\nCommunity: zero"));
        assert_eq!(overlay.holder(), Some(1));

        right.show_tooltip(1).unwrap();
        assert_eq!(overlay.holder(), Some(2));
        assert!(!left.hide_tooltip());
        assert!(right.hide_tooltip());
        assert_eq!(overlay.text(), None);
    }

    #[test]
    fn test_set_handles_after_removal() {
        let mut set = SimilarityNetworkSetWasm::new(None).unwrap();
        let first = set.add(scenario_edges()).unwrap();
        let second = set.add(scenario_communities()).unwrap();
        assert!(set.remove(first));
        assert!(!set.remove(first));
        assert_eq!(set.len(), 1);
        assert_eq!(set.networks.get(second).unwrap().node_count(), 4);
        assert!(set.remove(second));
        assert!(set.is_empty());
    }

    #[test]
    fn test_operations_before_load() {
        let mut panel = SimilarityNetworkWasm::new(Some(r#"{"edge": {"initialThreshold": 0.25}}"#.into())).unwrap();
        assert!(!panel.is_loaded());
        assert_eq!(panel.node_count(), 0);
        assert_eq!(panel.threshold(), 0.25);
        assert_eq!(panel.hit_test_community(0.0, 0.0), None);

        panel.load(scenario_edges()).unwrap();
        assert_eq!(panel.threshold(), 0.25);
        panel.clear();
        assert!(!panel.is_loaded());
    }
}
