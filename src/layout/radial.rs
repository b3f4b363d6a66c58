//! Deterministic radial placement grouped by implicit community.
//!
//! Used only to seed initial positions before the render layer takes over:
//!
//! 1. Arrange community centres on a circle; each community gets an arc
//!    proportional to its member count. Communities are placed in ascending id.
//! 2. Place members around their centre on a sunflower spiral (Fermat's
//!    spiral with the golden angle) for near-uniform density.

use std::collections::BTreeMap;

use serde::Deserialize;

/// Configuration for radial placement.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RadialLayoutConfig {
    /// Spacing between community cluster centres (default: 50.0).
    pub community_spacing: f32,
    /// Spacing between nodes within a community (default: 25.0).
    pub node_spacing: f32,
    /// Global scale multiplier (default: 1.5).
    pub spread_factor: f32,
}

impl Default for RadialLayoutConfig {
    fn default() -> Self {
        Self {
            community_spacing: 50.0,
            node_spacing: 25.0,
            spread_factor: 1.5,
        }
    }
}

/// Compute interleaved `[x0, y0, x1, y1, ...]` positions, one pair per node,
/// from the implicit community of each node slot.
pub fn compute_radial_layout(assignments: &[u32], config: &RadialLayoutConfig) -> Vec<f32> {
    let node_count = assignments.len();
    if node_count == 0 {
        return Vec::new();
    }

    let mut positions = vec![0.0f32; node_count * 2];

    let mut community_members: BTreeMap<u32, Vec<usize>> = BTreeMap::new();
    for (node, &community) in assignments.iter().enumerate() {
        community_members.entry(community).or_default().push(node);
    }

    // Circumference large enough for every community's disc plus spacing.
    let base_radius = if community_members.len() <= 1 {
        0.0
    } else {
        let total_arc = community_members
            .values()
            .map(|m| community_inner_radius(m.len(), config.node_spacing) * 2.0 + config.community_spacing)
            .sum::<f32>();
        total_arc / std::f32::consts::TAU
    };
    let outer_radius = base_radius * config.spread_factor;

    let mut angle = 0.0f32;
    for members in community_members.values() {
        let fraction = members.len() as f32 / node_count as f32;
        let center_angle = angle + fraction * std::f32::consts::TAU / 2.0;

        let cx = outer_radius * center_angle.cos();
        let cy = outer_radius * center_angle.sin();

        let inner_radius = community_inner_radius(members.len(), config.node_spacing);
        place_nodes_in_community(members, cx, cy, inner_radius, config, &mut positions);

        angle += fraction * std::f32::consts::TAU;
    }

    positions
}

/// Radius of a disc holding `n` nodes at the given spacing:
/// π r² = n · spacing² → r = spacing · √(n/π)
fn community_inner_radius(n: usize, node_spacing: f32) -> f32 {
    if n <= 1 {
        return 0.0;
    }
    node_spacing * (n as f32 / std::f32::consts::PI).sqrt()
}

fn place_nodes_in_community(
    members: &[usize],
    cx: f32,
    cy: f32,
    radius: f32,
    config: &RadialLayoutConfig,
    positions: &mut [f32],
) {
    let n = members.len();

    if n == 1 {
        let idx = members[0] * 2;
        positions[idx] = cx;
        positions[idx + 1] = cy;
        return;
    }

    // angle = i * golden_angle, r = sqrt(i/n) * max_radius
    let golden_angle = std::f32::consts::TAU / (1.0 + 5.0f32.sqrt());
    let scaled_radius = radius * config.spread_factor;

    for (i, &node) in members.iter().enumerate() {
        let idx = node * 2;
        let t = (i as f32 + 0.5) / n as f32;
        let r = scaled_radius * t.sqrt();
        let theta = i as f32 * golden_angle;

        positions[idx] = cx + r * theta.cos();
        positions[idx + 1] = cy + r * theta.sin();
    }
}
