//! Community-driven node styling.
//!
//! - `palette`: fixed palettes and modulo index assignment
//! - `registry`: explicit-community discovery and dimension bindings
//! - `strategy`: per-node visual computation and dim/restore transitions

pub mod palette;
pub mod registry;
pub mod strategy;

pub use palette::{Color, Palette, Shape, ShapeDescriptor};
pub use registry::{
    CommunityRegistry, CommunitySnapshot, Dimension, ExplicitCommunity, VisualizationAttribute,
};
pub use strategy::{DimensionStrategy, NodeStyleConfig, NodeVisualStrategy};
