//! Per-community bounding boxes for the implicit community overlay.
//!
//! One pass over the positioned nodes: each node expands the running box of
//! its implicit community. Communities without positioned members get no box.

use std::collections::HashMap;

use serde::Serialize;

/// Axis-aligned rectangle in canvas coordinates (y grows downwards).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BoundingBox {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

impl BoundingBox {
    /// Degenerate box around a single point.
    pub fn from_point(x: f32, y: f32) -> Self {
        Self {
            left: x,
            top: y,
            right: x,
            bottom: y,
        }
    }

    /// Grow to include `(x, y)`.
    pub fn expand(&mut self, x: f32, y: f32) {
        self.left = self.left.min(x);
        self.top = self.top.min(y);
        self.right = self.right.max(x);
        self.bottom = self.bottom.max(y);
    }

    /// Point lies strictly inside (edges excluded).
    pub fn contains_strict(&self, x: f32, y: f32) -> bool {
        self.left < x && x < self.right && self.top < y && y < self.bottom
    }

    /// Point lies inside or on the edges.
    pub fn contains(&self, x: f32, y: f32) -> bool {
        self.left <= x && x <= self.right && self.top <= y && y <= self.bottom
    }
}

/// Box of one implicit community.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CommunityBounds {
    pub community: u32,
    pub bounds: BoundingBox,
    /// Positioned members folded into the box.
    pub members: u32,
}

/// Boxes in draw order: the order each community was first seen.
#[derive(Debug, Clone, Default)]
pub struct CommunityBoxes {
    boxes: Vec<CommunityBounds>,
    by_community: HashMap<u32, usize>,
}

impl CommunityBoxes {
    pub fn get(&self, community: u32) -> Option<&CommunityBounds> {
        self.by_community.get(&community).map(|&i| &self.boxes[i])
    }

    /// Boxes in draw order.
    pub fn iter(&self) -> impl Iterator<Item = &CommunityBounds> {
        self.boxes.iter()
    }

    pub fn len(&self) -> usize {
        self.boxes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.boxes.is_empty()
    }
}

/// Fold `(community, x, y)` samples into one box per community.
pub fn compute_bounding_boxes<I>(positioned: I) -> CommunityBoxes
where
    I: IntoIterator<Item = (u32, f32, f32)>,
{
    let mut result = CommunityBoxes::default();

    for (community, x, y) in positioned {
        if x.is_nan() || y.is_nan() {
            continue;
        }
        match result.by_community.get(&community) {
            Some(&i) => {
                let entry = &mut result.boxes[i];
                entry.bounds.expand(x, y);
                entry.members += 1;
            }
            None => {
                result.by_community.insert(community, result.boxes.len());
                result.boxes.push(CommunityBounds {
                    community,
                    bounds: BoundingBox::from_point(x, y),
                    members: 1,
                });
            }
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boxes_contain_members() {
        let samples = vec![
            (0, 0.0, 0.0),
            (1, 50.0, 50.0),
            (0, 10.0, -4.0),
            (0, -3.0, 8.0),
            (1, 60.0, 40.0),
        ];
        let boxes = compute_bounding_boxes(samples.clone());
        assert_eq!(boxes.len(), 2);

        for (community, x, y) in samples {
            let b = boxes.get(community).unwrap();
            assert!(b.bounds.contains(x, y));
        }

        let zero = boxes.get(0).unwrap();
        assert_eq!(
            zero.bounds,
            BoundingBox {
                left: -3.0,
                top: -4.0,
                right: 10.0,
                bottom: 8.0
            }
        );
        assert_eq!(zero.members, 3);
    }

    #[test]
    fn test_draw_order_is_first_sight() {
        let boxes = compute_bounding_boxes(vec![(7, 0.0, 0.0), (2, 1.0, 1.0), (7, 2.0, 2.0)]);
        let order: Vec<u32> = boxes.iter().map(|b| b.community).collect();
        assert_eq!(order, vec![7, 2]);
    }

    #[test]
    fn test_empty_community_has_no_box() {
        let boxes = compute_bounding_boxes(vec![(0, 0.0, 0.0)]);
        assert!(boxes.get(1).is_none());
        assert!(compute_bounding_boxes(Vec::new()).is_empty());
    }

    #[test]
    fn test_strict_containment() {
        let b = BoundingBox {
            left: 0.0,
            top: 0.0,
            right: 10.0,
            bottom: 10.0,
        };
        assert!(b.contains_strict(5.0, 5.0));
        assert!(!b.contains_strict(0.0, 5.0));
        assert!(b.contains(0.0, 5.0));
    }
}
