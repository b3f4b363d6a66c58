//! Configuration for a network view.
//!
//! Loaded from an optional JSON object; every section and every field has a
//! default, so a partial document overrides only the keys it names.

use serde::Deserialize;

use crate::error::NetworkResult;
use crate::graph::EdgeConfig;
use crate::layout::RadialLayoutConfig;
use crate::visual::{NodeStyleConfig, Palette};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisualConfig {
    #[serde(default)]
    pub palette: Palette,

    #[serde(default)]
    pub edge: EdgeConfig,

    #[serde(default)]
    pub node: NodeStyleConfig,

    #[serde(default)]
    pub layout: RadialLayoutConfig,
}

impl VisualConfig {
    /// Parse a JSON configuration document. Empty input yields the defaults.
    pub fn from_json(json: &str) -> NetworkResult<Self> {
        if json.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_json::from_str(json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_is_default() {
        let config = VisualConfig::from_json("  ").unwrap();
        assert_eq!(config.edge, EdgeConfig::default());
        assert_eq!(config.palette, Palette::default());
    }

    #[test]
    fn test_partial_override() {
        let config = VisualConfig::from_json(
            r#"{"edge": {"maxWidth": 12.0, "initialThreshold": 0.3}, "node": {"boundBorderWidth": 6}}"#,
        )
        .unwrap();
        assert_eq!(config.edge.max_width, 12.0);
        assert_eq!(config.edge.initial_threshold, 0.3);
        assert_eq!(config.edge.min_width, EdgeConfig::default().min_width);
        assert_eq!(config.node.bound_border_width, 6.0);
        assert_eq!(config.node.border_width, 1.0);
        assert_eq!(config.layout, RadialLayoutConfig::default());
    }

    #[test]
    fn test_invalid_json() {
        assert!(VisualConfig::from_json("{not json").is_err());
    }
}
