//! Implicit community geometry.
//!
//! This module folds node positions into per-community bounding boxes and
//! indexes them in an R-tree for click hit testing.

mod bounds;
mod rtree;

pub use bounds::{BoundingBox, CommunityBounds, CommunityBoxes, compute_bounding_boxes};
pub use rtree::{BoxEntry, SpatialIndex};
