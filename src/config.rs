use crate::theme::Theme;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default fill colors by hierarchy level: root green, then yellow, orange,
/// light blue, purple. Levels past the table cycle through it again.
const LEVEL_COLORS: [&str; 5] = ["#00ff00", "#ffff00", "#ffc864", "#64c8ff", "#c896ff"];

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Fan of angles (degrees) for the root's direct children.
    pub root_fan_start: f32,
    pub root_fan_end: f32,
    /// Narrower fan for every deeper level.
    pub branch_fan_start: f32,
    pub branch_fan_end: f32,
    /// Horizontal reach of root-level branches.
    pub root_radius: f32,
    /// Horizontal reach of deeper branches, scaled by the spacing factor.
    pub branch_radius: f32,
    /// Per-level spacing decay, applied on every recursion step.
    pub spacing_decay: f32,
    /// Vertical spacing between root-level siblings.
    pub root_sibling_spacing: f32,
    /// Vertical cascade step between deeper siblings, scaled by spacing.
    pub branch_sibling_spacing: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            root_fan_start: -60.0,
            root_fan_end: 60.0,
            branch_fan_start: -50.0,
            branch_fan_end: 50.0,
            root_radius: 300.0,
            branch_radius: 200.0,
            spacing_decay: 0.8,
            root_sibling_spacing: 80.0,
            branch_sibling_spacing: 70.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeDefaults {
    pub width: f32,
    pub height: f32,
    pub root_width: f32,
    pub root_height: f32,
    /// Size for children below level 1.
    pub branch_width: f32,
    pub branch_height: f32,
    pub default_text: String,
    pub root_text: String,
    pub topic_text: String,
    pub default_color: String,
    pub root_color: String,
    pub level_colors: Vec<String>,
    /// Placement offsets for newly added children (before any auto-arrange).
    pub root_child_offset_x: f32,
    pub root_child_spread_y: f32,
    pub branch_child_offset_x: f32,
    pub branch_child_base_y: f32,
    pub branch_child_step_y: f32,
}

impl Default for NodeDefaults {
    fn default() -> Self {
        Self {
            width: 100.0,
            height: 60.0,
            root_width: 120.0,
            root_height: 80.0,
            branch_width: 90.0,
            branch_height: 50.0,
            default_text: "New Idea".to_string(),
            root_text: "Main Topic".to_string(),
            topic_text: "New Topic".to_string(),
            default_color: "#ffff00".to_string(),
            root_color: "#00ff00".to_string(),
            level_colors: LEVEL_COLORS.iter().map(|value| value.to_string()).collect(),
            root_child_offset_x: 200.0,
            root_child_spread_y: 100.0,
            branch_child_offset_x: 180.0,
            branch_child_base_y: 80.0,
            branch_child_step_y: 20.0,
        }
    }
}

impl NodeDefaults {
    /// Fill color for a node at `level`, cycling the table past its end.
    pub fn color_for_level(&self, level: usize) -> String {
        if self.level_colors.is_empty() {
            return self.default_color.clone();
        }
        self.level_colors[level % self.level_colors.len()].clone()
    }

    /// Default size for a child node at `level`.
    pub fn size_for_level(&self, level: usize) -> (f32, f32) {
        if level <= 1 {
            (self.width, self.height)
        } else {
            (self.branch_width, self.branch_height)
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Padding around the content bounding box in exported images.
    pub padding: f32,
    /// Fallback canvas size when the document is empty.
    pub width: f32,
    pub height: f32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            padding: 40.0,
            width: 1200.0,
            height: 800.0,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub theme: Theme,
    pub layout: LayoutConfig,
    pub nodes: NodeDefaults,
    pub render: RenderConfig,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ConfigFile {
    theme: Option<String>,
    #[serde(flatten)]
    overrides: Option<serde_json::Value>,
}

/// Load a user config, merged over the defaults. Accepts JSON5 so hand-written
/// configs can carry comments and trailing commas.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let mut config = Config::default();
    let Some(path) = path else {
        return Ok(config);
    };

    let contents = std::fs::read_to_string(path)?;
    let parsed: ConfigFile = json5::from_str(&contents)?;

    if let Some(theme_name) = parsed.theme.as_deref() {
        if theme_name == "modern" {
            config.theme = Theme::modern();
        } else if theme_name == "classic" || theme_name == "default" {
            config.theme = Theme::classic();
        }
    }

    if let Some(overrides) = parsed.overrides {
        apply_overrides(&mut config, &overrides);
    }

    Ok(config)
}

fn apply_overrides(config: &mut Config, overrides: &serde_json::Value) {
    if let Some(layout) = overrides.get("layout")
        && let Ok(parsed) = serde_json::from_value::<LayoutConfig>(layout.clone())
    {
        config.layout = parsed;
    }
    if let Some(nodes) = overrides.get("nodes")
        && let Ok(parsed) = serde_json::from_value::<NodeDefaults>(nodes.clone())
    {
        config.nodes = parsed;
    }
    if let Some(render) = overrides.get("render")
        && let Ok(parsed) = serde_json::from_value::<RenderConfig>(render.clone())
    {
        config.render = parsed;
    }
    if let Some(theme) = overrides.get("themeVariables")
        && let Ok(parsed) = serde_json::from_value::<Theme>(theme.clone())
    {
        config.theme = parsed;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_colors_cycle_past_table() {
        let defaults = NodeDefaults::default();
        assert_eq!(defaults.color_for_level(0), "#00ff00");
        assert_eq!(defaults.color_for_level(2), "#ffc864");
        assert_eq!(defaults.color_for_level(5), "#00ff00");
        assert_eq!(defaults.color_for_level(7), "#ffc864");
    }

    #[test]
    fn sizes_shrink_below_first_level() {
        let defaults = NodeDefaults::default();
        assert_eq!(defaults.size_for_level(1), (100.0, 60.0));
        assert_eq!(defaults.size_for_level(2), (90.0, 50.0));
        assert_eq!(defaults.size_for_level(6), (90.0, 50.0));
    }

    #[test]
    fn default_layout_matches_reference_constants() {
        let layout = LayoutConfig::default();
        assert_eq!(layout.root_fan_start, -60.0);
        assert_eq!(layout.root_fan_end, 60.0);
        assert_eq!(layout.spacing_decay, 0.8);
        assert_eq!(layout.root_sibling_spacing, 80.0);
        assert_eq!(layout.branch_sibling_spacing, 70.0);
    }
}
