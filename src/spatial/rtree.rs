//! R-tree index over community boxes using the rstar crate.
//!
//! Answers "which implicit community was clicked". Overlapping boxes are
//! resolved by draw order: the earliest-drawn box containing the point wins,
//! even when a later box is fully covered by it. That makes a community whose
//! box sits inside an earlier one unreachable by click; known limitation.

use rstar::{AABB, RTree, RTreeObject};

use super::bounds::{BoundingBox, CommunityBoxes};

/// A community box in the spatial index.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxEntry {
    /// Implicit community id.
    pub community: u32,
    /// Draw-order rank; lower wins on overlap.
    pub order: usize,
    pub bounds: BoundingBox,
}

impl RTreeObject for BoxEntry {
    type Envelope = AABB<[f32; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_corners(
            [self.bounds.left, self.bounds.top],
            [self.bounds.right, self.bounds.bottom],
        )
    }
}

/// Spatial index for community hit testing.
pub struct SpatialIndex {
    tree: RTree<BoxEntry>,
}

impl SpatialIndex {
    /// Create a new empty spatial index.
    pub fn new() -> Self {
        Self { tree: RTree::new() }
    }

    /// Bulk load the index from computed boxes.
    pub fn from_boxes(boxes: &CommunityBoxes) -> Self {
        let mut index = Self::new();
        index.rebuild(boxes);
        index
    }

    /// Replace the indexed boxes.
    pub fn rebuild(&mut self, boxes: &CommunityBoxes) {
        let entries: Vec<_> = boxes
            .iter()
            .enumerate()
            .map(|(order, b)| BoxEntry {
                community: b.community,
                order,
                bounds: b.bounds,
            })
            .collect();

        self.tree = RTree::bulk_load(entries);
    }

    /// First community in draw order whose box strictly contains the point.
    pub fn hit_test(&self, x: f32, y: f32) -> Option<u32> {
        self.tree
            .locate_in_envelope_intersecting(&AABB::from_point([x, y]))
            .filter(|entry| entry.bounds.contains_strict(x, y))
            .min_by_key(|entry| entry.order)
            .map(|entry| entry.community)
    }

    /// Clear all boxes from the index.
    pub fn clear(&mut self) {
        self.tree = RTree::new();
    }

    /// Get the number of boxes in the index.
    pub fn len(&self) -> usize {
        self.tree.size()
    }

    /// Check if the index is empty.
    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }
}

impl Default for SpatialIndex {
    fn default() -> Self {
        Self::new()
    }
}
