use serde::{Deserialize, Serialize};

use crate::chunk::Side;
use crate::error::ConfigError;

/// Collapsing of long unchanged spans.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollapseConfig {
    /// Unchanged lines kept visible next to each chunk.
    pub margin: usize,
    /// Minimum number of lines a span needs before it is collapsed.
    pub min_size: usize,
}

impl Default for CollapseConfig {
    fn default() -> Self {
        Self {
            margin: 3,
            min_size: 4,
        }
    }
}

/// Configuration for one view of a document pair.
///
/// Validated once at setup; immutable for the session unless replaced
/// wholesale through a reconfigure request.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MergeConfig {
    /// Which document this view shows.
    pub side: Side,
    /// Mark inserted and deleted text inside changed chunks.
    pub highlight_changes: bool,
    /// Show a gutter marker next to changed lines.
    pub mark_gutter: bool,
    /// Highlight deleted chunks with the main editor's language.
    pub syntax_highlight_deletions: bool,
    /// Show accept/reject controls for each chunk.
    pub merge_controls: bool,
    /// Collapse unchanged spans, if set.
    pub collapse: Option<CollapseConfig>,
    /// Effort budget handed to the diff engine.
    pub effort_limit: usize,
    /// Context, in bytes, re-diffed on each side of an edit.
    pub update_margin: usize,
    /// Vertical misalignment, in pixels, tolerated before a spacer is added.
    pub tolerance: f64,
    /// Maximum number of rendered deleted chunks kept in memory.
    pub deletion_cache_capacity: usize,
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            side: Side::B,
            highlight_changes: true,
            mark_gutter: true,
            syntax_highlight_deletions: true,
            merge_controls: true,
            collapse: None,
            effort_limit: 500,
            update_margin: 1000,
            tolerance: 1e-4,
            deletion_cache_capacity: 256,
        }
    }
}

impl MergeConfig {
    /// Parse a configuration from TOML and validate it. Missing keys take
    /// their default values.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// The same configuration for the other document.
    pub fn for_side(&self, side: Side) -> Self {
        Self {
            side,
            ..self.clone()
        }
    }

    /// Check that every value is usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.effort_limit == 0 {
            return Err(ConfigError::invalid("effort_limit", "must be greater than zero"));
        }
        if !self.tolerance.is_finite() || self.tolerance < 0.0 {
            return Err(ConfigError::invalid(
                "tolerance",
                format!("must be a finite non-negative number, got {}", self.tolerance),
            ));
        }
        if self.deletion_cache_capacity == 0 {
            return Err(ConfigError::invalid(
                "deletion_cache_capacity",
                "must be greater than zero",
            ));
        }
        if let Some(collapse) = &self.collapse {
            if collapse.min_size == 0 {
                return Err(ConfigError::invalid("collapse.min_size", "must be at least 1"));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let c = MergeConfig::default();
        assert_eq!(c.side, Side::B);
        assert_eq!(c.effort_limit, 500);
        assert_eq!(c.update_margin, 1000);
        assert_eq!(c.tolerance, 1e-4);
        assert!(c.highlight_changes);
        assert!(c.collapse.is_none());
        assert!(c.validate().is_ok());
    }

    #[test]
    fn parse_partial_toml() {
        let c = MergeConfig::from_toml_str(
            r#"
            side = "a"
            mark_gutter = false

            [collapse]
            margin = 1
            "#,
        )
        .unwrap();
        assert_eq!(c.side, Side::A);
        assert!(!c.mark_gutter);
        assert_eq!(c.collapse, Some(CollapseConfig { margin: 1, min_size: 4 }));
        assert_eq!(c.effort_limit, 500);
    }

    #[test]
    fn invalid_values_are_rejected() {
        let c = MergeConfig {
            effort_limit: 0,
            ..Default::default()
        };
        assert!(matches!(c.validate(), Err(ConfigError::Invalid { field: "effort_limit", .. })));

        let c = MergeConfig {
            tolerance: f64::NAN,
            ..Default::default()
        };
        assert!(c.validate().is_err());

        let c = MergeConfig {
            collapse: Some(CollapseConfig { margin: 0, min_size: 0 }),
            ..Default::default()
        };
        assert!(c.validate().is_err());

        assert!(matches!(
            MergeConfig::from_toml_str("side = \"c\""),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn serde_roundtrip_json() {
        let c = MergeConfig::default().for_side(Side::A);
        let json = serde_json::to_string(&c).unwrap();
        let back: MergeConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, c);
    }
}
