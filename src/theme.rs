use serde::{Deserialize, Serialize};

use crate::ir::EdgeStyle;

const PARTNER_COLORS: [&str; 6] = [
    "#db2777", "#7c3aed", "#2563eb", "#059669", "#d97706", "#dc2626",
];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Theme {
    pub line_color: String,
    pub line_width: f32,
    pub lineage_line_width: f32,
    /// Lineage colors, indexed by partner position and wrapping around.
    pub partner_colors: Vec<String>,
}

impl Theme {
    pub fn slate() -> Self {
        Self {
            line_color: "#334155".to_string(),
            line_width: 1.5,
            lineage_line_width: 2.0,
            partner_colors: PARTNER_COLORS.iter().map(|c| c.to_string()).collect(),
        }
    }

    pub fn monochrome() -> Self {
        Self {
            line_color: "#1f2937".to_string(),
            line_width: 1.5,
            lineage_line_width: 2.5,
            partner_colors: vec!["#1f2937".to_string()],
        }
    }

    pub fn default_edge_style(&self) -> EdgeStyle {
        EdgeStyle {
            stroke: self.line_color.clone(),
            stroke_width: self.line_width,
        }
    }

    pub fn lineage_edge_style(&self, partner_index: usize) -> EdgeStyle {
        let stroke = if self.partner_colors.is_empty() {
            self.line_color.clone()
        } else {
            self.partner_colors[partner_index % self.partner_colors.len()].clone()
        };
        EdgeStyle {
            stroke,
            stroke_width: self.lineage_line_width,
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::slate()
    }
}
