//! Per-node visual state computation.
//!
//! Color, shape and border are independent channels: each is driven by at
//! most one explicit community, so up to three community keys style a node
//! at once. Dimming only touches color and border; shape keeps showing
//! community identity while a node is out of focus.

use serde::Deserialize;

use super::palette::Palette;
use super::registry::{CommunitySnapshot, Dimension};
use crate::graph::{Node, NodeVisuals};

/// Border widths for nodes.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NodeStyleConfig {
    /// Border width when no community drives the border (default: 1.0).
    pub border_width: f32,
    /// Border width when a community drives the border (default: 4.0).
    pub bound_border_width: f32,
}

impl Default for NodeStyleConfig {
    fn default() -> Self {
        Self {
            border_width: 1.0,
            bound_border_width: 4.0,
        }
    }
}

/// Styling rule for one visual dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DimensionStrategy {
    ColorDimension,
    ShapeDimension,
    BorderDimension,
}

impl DimensionStrategy {
    pub fn for_dimension(dimension: Dimension) -> Self {
        match dimension {
            Dimension::Color => Self::ColorDimension,
            Dimension::Shape => Self::ShapeDimension,
            Dimension::Border => Self::BorderDimension,
        }
    }

    pub fn dimension(self) -> Dimension {
        match self {
            Self::ColorDimension => Dimension::Color,
            Self::ShapeDimension => Dimension::Shape,
            Self::BorderDimension => Dimension::Border,
        }
    }

    /// Write this dimension's value for palette `index` into `visuals`.
    /// `None` means no community value is available and selects the fallback.
    pub fn apply(
        self,
        palette: &Palette,
        style: &NodeStyleConfig,
        index: Option<usize>,
        visuals: &mut NodeVisuals,
    ) {
        match self {
            Self::ColorDimension => {
                visuals.background = index
                    .map(|i| palette.color_for_index(i))
                    .unwrap_or(palette.fallback_color);
            }
            Self::ShapeDimension => {
                visuals.shape = index
                    .map(|i| palette.shape_for_index(i))
                    .unwrap_or(palette.fallback_shape);
            }
            Self::BorderDimension => match index {
                Some(i) => {
                    visuals.border = palette.border_color_for_index(i);
                    visuals.border_width = style.bound_border_width;
                }
                None => {
                    visuals.border = palette.fallback_border;
                    visuals.border_width = style.border_width;
                }
            },
        }
    }

    /// Override this dimension with its unfocused value. Shape has none.
    pub fn to_colorless(self, palette: &Palette, visuals: &mut NodeVisuals) {
        match self {
            Self::ColorDimension => visuals.background = palette.unfocused_color,
            Self::ShapeDimension => {}
            Self::BorderDimension => visuals.border = palette.unfocused_border,
        }
    }

    fn is_dimmable(self) -> bool {
        !matches!(self, Self::ShapeDimension)
    }
}

/// Computes node visuals from the bound community mappings.
#[derive(Debug, Clone)]
pub struct NodeVisualStrategy {
    palette: Palette,
    style: NodeStyleConfig,
    strategies: [DimensionStrategy; 3],
}

impl NodeVisualStrategy {
    pub fn new(palette: Palette, style: NodeStyleConfig) -> Self {
        Self {
            palette,
            style,
            strategies: Dimension::ALL.map(DimensionStrategy::for_dimension),
        }
    }

    /// Highlighted-baseline visuals for `node`.
    pub fn compute(&self, snapshot: &CommunitySnapshot, node: &Node) -> NodeVisuals {
        let mut visuals = NodeVisuals::fallback(&self.palette, self.style.border_width);
        for strategy in self.strategies {
            let index = dimension_index(snapshot, node, strategy.dimension());
            strategy.apply(&self.palette, &self.style, index, &mut visuals);
        }
        visuals
    }

    /// Recompute every dimension and reset the node to highlighted.
    pub fn change_visuals(&self, snapshot: &CommunitySnapshot, node: &mut Node) {
        let visuals = self.compute(snapshot, node);
        node.set_visuals(visuals, true);
    }

    /// Dim the node. Idempotent; shape is left alone.
    pub fn to_colorless(&self, node: &mut Node) {
        let visuals = node.visuals_mut();
        for strategy in self.strategies {
            strategy.to_colorless(&self.palette, visuals);
        }
        node.set_default_colored(false);
    }

    /// Undo dimming by re-deriving color and border from the mapping.
    pub fn to_default(&self, snapshot: &CommunitySnapshot, node: &mut Node) {
        let indices = self
            .strategies
            .map(|strategy| dimension_index(snapshot, node, strategy.dimension()));
        let visuals = node.visuals_mut();
        for (strategy, index) in self.strategies.into_iter().zip(indices) {
            if strategy.is_dimmable() {
                strategy.apply(&self.palette, &self.style, index, visuals);
            }
        }
        node.set_default_colored(true);
    }

    /// Dim or restore in one call.
    pub fn set_focus(&self, snapshot: &CommunitySnapshot, node: &mut Node, focused: bool) {
        if focused {
            self.to_default(snapshot, node);
        } else {
            self.to_colorless(node);
        }
    }
}

fn dimension_index(snapshot: &CommunitySnapshot, node: &Node, dimension: Dimension) -> Option<usize> {
    let key = snapshot.bound_key(dimension)?;
    let value = node.explicit_value(key)?;
    let index = snapshot.value_index(key, value);
    if index.is_none() {
        log::debug!(
            "no {dimension} mapping for {key}={value} on {}, using fallback",
            node.id
        );
    }
    index
}
