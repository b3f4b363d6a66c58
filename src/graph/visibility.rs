//! Edge parsing and threshold-driven visibility.
//!
//! Every policy change (threshold, width mode, hide-unless-selected,
//! selection) recomputes visibility and width for the full edge set from the
//! current policy, never for just the edges that changed.

use std::collections::HashSet;

use serde::Deserialize;
use serde_json::Value;

use super::edge::{Edge, EdgeId};
use super::node::NodeId;
use crate::error::{NetworkError, NetworkResult};

/// Field holding the similarity value of a raw record.
pub const FIELD_VALUE: &str = "value";
/// Field holding the first endpoint of a raw record.
pub const FIELD_U1: &str = "u1";
/// Field holding the second endpoint of a raw record.
pub const FIELD_U2: &str = "u2";

/// Edge policy defaults.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EdgeConfig {
    /// Width of every edge in fixed-width mode (default: 1.0).
    pub min_width: f32,
    /// Width of a similarity-1.0 edge in variable-width mode (default: 8.0).
    pub max_width: f32,
    /// Similarity below which edges start hidden (default: 0.0).
    pub initial_threshold: f32,
    /// Start in variable-width mode (default: true).
    pub variable_width: bool,
    /// Start hiding edges outside the selection (default: false).
    pub hide_unselected: bool,
}

impl Default for EdgeConfig {
    fn default() -> Self {
        Self {
            min_width: 1.0,
            max_width: 8.0,
            initial_threshold: 0.0,
            variable_width: true,
            hide_unselected: false,
        }
    }
}

/// Owns the edge records and the policy that derives their visibility.
#[derive(Debug, Clone)]
pub struct EdgeStateEngine {
    edges: Vec<Edge>,
    threshold: f32,
    variable_width: bool,
    hide_unselected: bool,
    min_width: f32,
    max_width: f32,
}

impl EdgeStateEngine {
    pub fn new(config: &EdgeConfig) -> Self {
        let min_width = config.min_width.max(0.0);
        Self {
            edges: Vec::new(),
            threshold: config.initial_threshold,
            variable_width: config.variable_width,
            hide_unselected: config.hide_unselected,
            min_width,
            max_width: config.max_width.max(min_width),
        }
    }

    /// Normalize raw similarity records into edges.
    ///
    /// Records missing `value`, `u1` or `u2` abort the whole parse. Records
    /// with a zero (or otherwise falsy) similarity, self-loops, and repeats of
    /// an already-seen endpoint pair (in either direction) are skipped, as are
    /// records naming users that `resolve` does not know.
    pub fn parse(
        &self,
        records: &[Value],
        resolve: impl Fn(&str) -> Option<NodeId>,
    ) -> NetworkResult<Vec<Edge>> {
        let mut edges = Vec::with_capacity(records.len());
        let mut seen: HashSet<(NodeId, NodeId)> = HashSet::with_capacity(records.len());
        let mut skipped = 0usize;

        for (index, record) in records.iter().enumerate() {
            let value = required(record, FIELD_VALUE, index)?;
            let u1 = required(record, FIELD_U1, index)?;
            let u2 = required(record, FIELD_U2, index)?;

            let Some(similarity) = similarity_of(value) else {
                skipped += 1;
                continue;
            };
            let (Some(k1), Some(k2)) = (endpoint_key(u1), endpoint_key(u2)) else {
                return Err(NetworkError::MalformedInput(format!(
                    "similarity record #{index} has a non-scalar endpoint"
                )));
            };
            if k1 == k2 {
                skipped += 1;
                continue;
            }
            let (Some(from), Some(to)) = (resolve(&k1), resolve(&k2)) else {
                log::warn!("similarity record #{index} references unknown user ({k1}, {k2})");
                skipped += 1;
                continue;
            };

            let mut edge = Edge::new(EdgeId(edges.len() as u32), from, to, similarity);
            if !seen.insert(edge.unordered_pair()) {
                skipped += 1;
                continue;
            }
            self.apply_policy(&mut edge);
            edges.push(edge);
        }

        log::debug!("parsed {} edges, skipped {skipped} records", edges.len());
        Ok(edges)
    }

    /// Parse `records` and install the result. On error nothing changes.
    pub fn load(
        &mut self,
        records: &[Value],
        resolve: impl Fn(&str) -> Option<NodeId>,
    ) -> NetworkResult<&[Edge]> {
        self.edges = self.parse(records, resolve)?;
        Ok(&self.edges)
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    pub fn variable_width(&self) -> bool {
        self.variable_width
    }

    pub fn hide_unselected(&self) -> bool {
        self.hide_unselected
    }

    pub fn set_threshold(&mut self, threshold: f32) {
        self.threshold = threshold;
        self.recompute();
    }

    pub fn set_variable_width(&mut self, variable_width: bool) {
        self.variable_width = variable_width;
        self.recompute();
    }

    /// Toggle hide-unless-selected. When `selected` is given it replaces the
    /// current edge selection first.
    pub fn set_hide_unselected(&mut self, hide: bool, selected: Option<&[EdgeId]>) {
        self.hide_unselected = hide;
        if let Some(selected) = selected {
            self.mark_selected(selected);
        }
        self.recompute();
    }

    /// Replace the edge selection.
    pub fn set_selected(&mut self, selected: &[EdgeId]) {
        self.mark_selected(selected);
        self.recompute();
    }

    pub fn clear_selection(&mut self) {
        self.set_selected(&[]);
    }

    fn mark_selected(&mut self, selected: &[EdgeId]) {
        let selected: HashSet<EdgeId> = selected.iter().copied().collect();
        for edge in &mut self.edges {
            edge.state.set_selected(selected.contains(&edge.id));
        }
    }

    /// Re-derive visibility and width for every edge.
    pub fn recompute(&mut self) {
        let mut edges = std::mem::take(&mut self.edges);
        for edge in &mut edges {
            self.apply_policy(edge);
        }
        self.edges = edges;
        log::debug!(
            "edge policy: threshold={} hide_unselected={} variable_width={} -> {} hidden of {}",
            self.threshold,
            self.hide_unselected,
            self.variable_width,
            self.hidden_count(),
            self.edges.len()
        );
    }

    fn apply_policy(&self, edge: &mut Edge) {
        let below_threshold = edge.similarity < self.threshold;
        let unselected = self.hide_unselected && !edge.state.is_selected();
        edge.state.set_hidden(below_threshold || unselected);
        edge.width = self.width_for(edge.similarity);
    }

    /// Width for an edge of the given similarity under the current mode.
    pub fn width_for(&self, similarity: f32) -> f32 {
        if self.variable_width {
            let scaled = self.min_width + (self.max_width - self.min_width) * similarity;
            scaled.clamp(self.min_width, self.max_width)
        } else {
            self.min_width
        }
    }

    pub fn hidden_count(&self) -> usize {
        self.edges.iter().filter(|e| e.state.is_hidden()).count()
    }

    pub fn visible_edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges.iter().filter(|e| e.is_visible())
    }

    pub fn clear(&mut self) {
        self.edges.clear();
    }
}

fn required<'a>(record: &'a Value, field: &'static str, index: usize) -> NetworkResult<&'a Value> {
    record
        .get(field)
        .ok_or(NetworkError::MalformedEdge { index, field })
}

/// Numeric similarity, or None for falsy/non-numeric values.
fn similarity_of(value: &Value) -> Option<f32> {
    let similarity = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    if similarity == 0.0 || similarity.is_nan() {
        None
    } else {
        Some(similarity as f32)
    }
}

/// User ids may be written as strings or numbers. Integral floats (`1.0`)
/// key the same as their integer form.
pub(crate) fn endpoint_key(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(match (n.as_i64(), n.as_f64()) {
            (Some(i), _) => i.to_string(),
            (None, Some(f)) if f.fract() == 0.0 && f.abs() < 9.0e15 => (f as i64).to_string(),
            _ => n.to_string(),
        }),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn resolver(key: &str) -> Option<NodeId> {
        key.parse::<u32>().ok().filter(|&k| k >= 1 && k <= 3).map(|k| NodeId(k - 1))
    }

    fn engine() -> EdgeStateEngine {
        EdgeStateEngine::new(&EdgeConfig::default())
    }

    #[test]
    fn test_parse_drops_self_loops_and_zero() {
        let records = vec![
            json!({"u1": 1, "u2": 2, "value": 0.8}),
            json!({"u1": 1, "u2": 3, "value": 0}),
            json!({"u1": 2, "u2": 2, "value": 0.9}),
        ];
        let edges = engine().parse(&records, resolver).unwrap();
        assert_eq!(edges.len(), 1);
        assert_eq!(edges[0].from, NodeId(0));
        assert_eq!(edges[0].to, NodeId(1));
        assert!((edges[0].similarity - 0.8).abs() < 1e-6);
    }

    #[test]
    fn test_parse_dedups_unordered_pairs() {
        let records = vec![
            json!({"u1": "1", "u2": "2", "value": 0.3}),
            json!({"u1": "2", "u2": "1", "value": 0.6}),
            json!({"u1": "1", "u2": "2", "value": 0.9}),
        ];
        let edges = engine().parse(&records, resolver).unwrap();
        assert_eq!(edges.len(), 1);
        assert!((edges[0].similarity - 0.3).abs() < 1e-6);
    }

    #[test]
    fn test_parse_missing_field_is_fatal() {
        let records = vec![
            json!({"u1": 1, "u2": 2, "value": 0.8}),
            json!({"u1": 1, "value": 0.5}),
        ];
        let err = engine().parse(&records, resolver).unwrap_err();
        assert!(matches!(
            err,
            NetworkError::MalformedEdge { index: 1, field: "u2" }
        ));

        let err = engine().parse(&[json!({"u1": 1, "u2": 2})], resolver).unwrap_err();
        assert!(matches!(err, NetworkError::MalformedEdge { field: "value", .. }));
    }

    #[test]
    fn test_load_keeps_previous_edges_on_error() {
        let mut engine = engine();
        engine
            .load(&[json!({"u1": 1, "u2": 2, "value": 0.8})], resolver)
            .unwrap();
        assert!(engine.load(&[json!({"u2": 2, "value": 0.8})], resolver).is_err());
        assert_eq!(engine.edges().len(), 1);
    }

    #[test]
    fn test_parse_skips_unknown_users_and_falsy_values() {
        let records = vec![
            json!({"u1": 1, "u2": 7, "value": 0.8}),
            json!({"u1": 1, "u2": 2, "value": null}),
            json!({"u1": 1, "u2": 3, "value": "0.25"}),
        ];
        let edges = engine().parse(&records, resolver).unwrap();
        assert_eq!(edges.len(), 1);
        assert_eq!(edges[0].to, NodeId(2));
        assert_eq!(edges[0].id, EdgeId(0));
    }

    #[test]
    fn test_integral_float_endpoints_resolve() {
        let records = vec![
            json!({"u1": 1.0, "u2": 2, "value": 0.8}),
            json!({"u1": 2.0, "u2": 3.0, "value": 0.4}),
        ];
        let edges = engine().parse(&records, resolver).unwrap();
        assert_eq!(edges.len(), 2);
        assert_eq!(edges[0].unordered_pair(), (NodeId(0), NodeId(1)));
        assert_eq!(edges[1].unordered_pair(), (NodeId(1), NodeId(2)));

        assert_eq!(endpoint_key(&json!(7.0)).as_deref(), Some("7"));
        assert_eq!(endpoint_key(&json!(7.5)).as_deref(), Some("7.5"));
        assert_eq!(endpoint_key(&json!(-3)).as_deref(), Some("-3"));
    }

    #[test]
    fn test_threshold_hides_and_shows() {
        let mut engine = engine();
        engine
            .load(&[json!({"u1": 1, "u2": 2, "value": 0.8})], resolver)
            .unwrap();
        engine.set_threshold(0.5);
        assert!(engine.edges()[0].is_visible());
        engine.set_threshold(0.9);
        assert!(!engine.edges()[0].is_visible());
    }

    #[test]
    fn test_threshold_monotonic() {
        let mut engine = engine();
        let records: Vec<_> = [(1, 2, 0.1), (1, 3, 0.45), (2, 3, 0.7)]
            .iter()
            .map(|&(a, b, v)| json!({"u1": a, "u2": b, "value": v}))
            .collect();
        engine.load(&records, resolver).unwrap();

        let mut previous_hidden: HashSet<EdgeId> = HashSet::new();
        for step in 0..=10 {
            engine.set_threshold(step as f32 / 10.0);
            let hidden: HashSet<EdgeId> = engine
                .edges()
                .iter()
                .filter(|e| !e.is_visible())
                .map(|e| e.id)
                .collect();
            assert!(previous_hidden.is_subset(&hidden));
            previous_hidden = hidden;
        }
        assert_eq!(previous_hidden.len(), 3);
    }

    #[test]
    fn test_hide_unselected_keeps_selection() {
        let mut engine = engine();
        let records = vec![
            json!({"u1": 1, "u2": 2, "value": 0.8}),
            json!({"u1": 1, "u2": 3, "value": 0.6}),
        ];
        engine.load(&records, resolver).unwrap();

        engine.set_hide_unselected(true, Some(&[EdgeId(1)]));
        assert!(!engine.edges()[0].is_visible());
        assert!(engine.edges()[1].is_visible());

        // Threshold still applies to selected edges.
        engine.set_threshold(0.7);
        assert!(!engine.edges()[1].is_visible());

        engine.set_threshold(0.0);
        engine.set_hide_unselected(false, None);
        assert_eq!(engine.hidden_count(), 0);
        assert!(engine.edges()[1].state.is_selected());
    }

    #[test]
    fn test_variable_width_bounds() {
        let mut engine = engine();
        assert_eq!(engine.width_for(0.0), 1.0);
        assert_eq!(engine.width_for(1.0), 8.0);
        assert_eq!(engine.width_for(5.0), 8.0);
        assert_eq!(engine.width_for(-1.0), 1.0);
        assert!((engine.width_for(0.5) - 4.5).abs() < 1e-6);

        engine
            .load(&[json!({"u1": 1, "u2": 2, "value": 0.5})], resolver)
            .unwrap();
        engine.set_variable_width(false);
        assert_eq!(engine.edges()[0].width, 1.0);
        engine.set_variable_width(true);
        assert!((engine.edges()[0].width - 4.5).abs() < 1e-6);
    }
}
