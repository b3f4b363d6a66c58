//! Fixed palettes and the index → visual value assignment functions.
//!
//! Every lookup is `index % palette_len`, so any number of distinct community
//! values resolves to a palette entry; values past the end of a palette wrap
//! around and repeat earlier colors/shapes.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// An opaque RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse `#rrggbb` (the leading `#` is optional).
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }
        let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&hex[range], 16).ok();
        Some(Self {
            r: channel(0..2)?,
            g: channel(2..4)?,
            b: channel(4..6)?,
        })
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Color::from_hex(&raw)
            .ok_or_else(|| serde::de::Error::custom(format!("expected #rrggbb color, got `{raw}`")))
    }
}

/// Node shapes understood by the render layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Shape {
    Dot,
    Square,
    Triangle,
    Diamond,
    Star,
    TriangleDown,
    Hexagon,
}

/// A shape together with the vertical label adjustment it needs.
///
/// Shapes whose visual centre is not the bounding-box centre (triangles,
/// stars) push their label so it stays clear of the glyph; the selected
/// offset accounts for the enlarged selected glyph.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShapeDescriptor {
    pub shape: Shape,
    pub label_offset: f32,
    pub selected_label_offset: f32,
}

impl ShapeDescriptor {
    pub const fn new(shape: Shape, label_offset: f32, selected_label_offset: f32) -> Self {
        Self {
            shape,
            label_offset,
            selected_label_offset,
        }
    }
}

/// Ordered palettes for the three visual dimensions plus the fixed
/// unfocused and fallback entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Palette {
    pub colors: Vec<Color>,
    pub shapes: Vec<ShapeDescriptor>,
    pub border_colors: Vec<Color>,
    /// Background used for dimmed nodes.
    pub unfocused_color: Color,
    /// Border used for dimmed nodes.
    pub unfocused_border: Color,
    /// Background when no community drives the color dimension.
    pub fallback_color: Color,
    /// Border when no community drives the border dimension.
    pub fallback_border: Color,
    /// Shape when no community drives the shape dimension.
    pub fallback_shape: ShapeDescriptor,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            colors: vec![
                Color::rgb(0x1f, 0x77, 0xb4), // Blue
                Color::rgb(0xff, 0x7f, 0x0e), // Orange
                Color::rgb(0x2c, 0xa0, 0x2c), // Green
                Color::rgb(0xd6, 0x27, 0x28), // Red
                Color::rgb(0x94, 0x67, 0xbd), // Purple
                Color::rgb(0x8c, 0x56, 0x4b), // Brown
            ],
            shapes: vec![
                ShapeDescriptor::new(Shape::Dot, 0.0, 0.0),
                ShapeDescriptor::new(Shape::Square, 0.0, 0.0),
                ShapeDescriptor::new(Shape::Triangle, 6.0, 9.0),
                ShapeDescriptor::new(Shape::Diamond, 0.0, 0.0),
                ShapeDescriptor::new(Shape::Star, 2.0, 3.0),
                ShapeDescriptor::new(Shape::TriangleDown, -6.0, -9.0),
                ShapeDescriptor::new(Shape::Hexagon, 0.0, 0.0),
            ],
            border_colors: vec![
                Color::rgb(0x17, 0xbe, 0xcf), // Cyan
                Color::rgb(0xbc, 0xbd, 0x22), // Olive
                Color::rgb(0xe3, 0x77, 0xc2), // Pink
                Color::rgb(0x7f, 0x7f, 0x7f), // Gray
                Color::rgb(0x00, 0x00, 0x00), // Black
            ],
            unfocused_color: Color::rgb(0xd3, 0xd3, 0xd3),
            unfocused_border: Color::rgb(0xbe, 0xbe, 0xbe),
            fallback_color: Color::rgb(0x97, 0xc2, 0xfc),
            fallback_border: Color::rgb(0x2b, 0x7c, 0xe9),
            fallback_shape: ShapeDescriptor::new(Shape::Dot, 0.0, 0.0),
        }
    }
}

impl Palette {
    /// Background color for the `index`-th value of the color community.
    pub fn color_for_index(&self, index: usize) -> Color {
        wrap(&self.colors, index).unwrap_or(self.fallback_color)
    }

    /// Shape for the `index`-th value of the shape community.
    pub fn shape_for_index(&self, index: usize) -> ShapeDescriptor {
        wrap(&self.shapes, index).unwrap_or(self.fallback_shape)
    }

    /// Border color for the `index`-th value of the border community.
    pub fn border_color_for_index(&self, index: usize) -> Color {
        wrap(&self.border_colors, index).unwrap_or(self.fallback_border)
    }
}

// Empty palettes can only come from user configuration; fall through to the
// fallback entry rather than dividing by zero.
fn wrap<T: Copy>(entries: &[T], index: usize) -> Option<T> {
    if entries.is_empty() {
        None
    } else {
        Some(entries[index % entries.len()])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_periodicity() {
        let palette = Palette::default();
        let len = palette.colors.len();
        for n in 0..(len * 4) {
            assert_eq!(palette.color_for_index(n), palette.color_for_index(n % len));
        }
        assert_eq!(palette.color_for_index(len), palette.colors[0]);
    }

    #[test]
    fn test_shape_and_border_wrap() {
        let palette = Palette::default();
        assert_eq!(palette.shapes.len(), 7);
        assert_eq!(palette.shape_for_index(7), palette.shape_for_index(0));
        assert_eq!(palette.shape_for_index(9).shape, Shape::Triangle);

        let borders = palette.border_colors.len();
        assert_eq!(
            palette.border_color_for_index(borders + 1),
            palette.border_color_for_index(1)
        );
    }

    #[test]
    fn test_huge_index_does_not_panic() {
        let palette = Palette::default();
        let _ = palette.color_for_index(usize::MAX);
        let _ = palette.shape_for_index(usize::MAX);
        let _ = palette.border_color_for_index(usize::MAX);
    }

    #[test]
    fn test_empty_palette_uses_fallback() {
        let palette = Palette {
            colors: Vec::new(),
            ..Palette::default()
        };
        assert_eq!(palette.color_for_index(3), palette.fallback_color);
    }

    #[test]
    fn test_color_hex_round_trip() {
        let c = Color::from_hex("#1f77b4").unwrap();
        assert_eq!(c, Color::rgb(0x1f, 0x77, 0xb4));
        assert_eq!(c.to_string(), "#1f77b4");
        assert_eq!(Color::from_hex("ff0000"), Some(Color::rgb(255, 0, 0)));
        assert_eq!(Color::from_hex("#fff"), None);
        assert_eq!(Color::from_hex("#gg0000"), None);
    }

    #[test]
    fn test_palette_partial_override() {
        let palette: Palette =
            serde_json::from_str(r##"{"colors": ["#000000", "#ffffff"]}"##).unwrap();
        assert_eq!(palette.colors.len(), 2);
        assert_eq!(palette.color_for_index(3), Color::rgb(255, 255, 255));
        assert_eq!(palette.shapes, Palette::default().shapes);
    }
}
