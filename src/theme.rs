use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Theme {
    pub font_family: String,
    pub font_size: f32,
    pub text_color: String,
    pub line_color: String,
    pub line_width: f32,
    pub node_stroke: String,
    pub node_stroke_width: f32,
    pub background: String,
    pub selection_color: String,
}

impl Theme {
    /// The original desktop look: Arial labels, black 2px pens, white canvas.
    pub fn classic() -> Self {
        Self {
            font_family: "Arial".to_string(),
            font_size: 10.0,
            text_color: "#000000".to_string(),
            line_color: "#000000".to_string(),
            line_width: 2.0,
            node_stroke: "#000000".to_string(),
            node_stroke_width: 2.0,
            background: "#FFFFFF".to_string(),
            selection_color: "#00FFFF".to_string(),
        }
    }

    pub fn modern() -> Self {
        Self {
            font_family: "Inter, Segoe UI, system-ui, -apple-system, sans-serif".to_string(),
            font_size: 13.0,
            text_color: "#1C2430".to_string(),
            line_color: "#7A8AA6".to_string(),
            line_width: 1.5,
            node_stroke: "#C7D2E5".to_string(),
            node_stroke_width: 1.5,
            background: "#FFFFFF".to_string(),
            selection_color: "#7AA6FF".to_string(),
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::classic()
    }
}
