use crate::ir::Direction;
use crate::theme::Theme;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("{field} must be positive (got {value})")]
    NonPositive { field: &'static str, value: f32 },
    #[error("snap tolerance must not be negative (got {0})")]
    NegativeTolerance(f32),
    #[error("snap tolerance {tolerance} must be smaller than rank spacing {rank_spacing}")]
    ToleranceExceedsRankSpacing { tolerance: f32, rank_spacing: f32 },
    #[error("unknown direction '{0}'; use TB, TD or LR")]
    UnknownDirection(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub direction: Direction,
    /// Width of a single member card; a unit is `base_width * (1 + partners)` wide.
    pub base_width: f32,
    pub node_height: f32,
    /// Minimum gap between neighbouring units of one generation.
    pub node_spacing: f32,
    /// Minimum gap between generations.
    pub rank_spacing: f32,
    /// Raw rank coordinates closer than this collapse onto one generation line.
    pub snap_tolerance: f32,
    pub order_passes: usize,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            direction: Direction::TopDown,
            base_width: 260.0,
            node_height: 300.0,
            node_spacing: 100.0,
            rank_spacing: 200.0,
            snap_tolerance: 10.0,
            order_passes: 4,
        }
    }
}

impl LayoutConfig {
    /// (width, height) of a unit with the given number of partners.
    pub fn unit_size(&self, partner_count: usize) -> (f32, f32) {
        (self.base_width * (1 + partner_count) as f32, self.node_height)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("base_width", self.base_width),
            ("node_height", self.node_height),
            ("rank_spacing", self.rank_spacing),
        ] {
            if !(value > 0.0) {
                return Err(ConfigError::NonPositive { field, value });
            }
        }
        if !(self.node_spacing >= 0.0) {
            return Err(ConfigError::NonPositive {
                field: "node_spacing",
                value: self.node_spacing,
            });
        }
        if !(self.snap_tolerance >= 0.0) {
            return Err(ConfigError::NegativeTolerance(self.snap_tolerance));
        }
        if self.snap_tolerance >= self.rank_spacing {
            return Err(ConfigError::ToleranceExceedsRankSpacing {
                tolerance: self.snap_tolerance,
                rank_spacing: self.rank_spacing,
            });
        }
        Ok(())
    }
}

/// Which member of a spouse group becomes the unit's primary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GroupingOrder {
    /// Members with more known spouses are visited first, ties by ascending id.
    #[default]
    #[serde(alias = "lowest-id")]
    Canonical,
    /// Members are visited in list order; the first one listed wins.
    Input,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UnitIdScheme {
    /// The primary member's id.
    #[default]
    Primary,
    /// `group-{primary}-{partner}-...`, or the primary id for single members.
    Composite,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildOptions {
    pub grouping: GroupingOrder,
    pub unit_ids: UnitIdScheme,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    pub theme: Theme,
    pub layout: LayoutConfig,
    pub build: BuildOptions,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    theme: Option<String>,
    theme_variables: Option<ThemeVariables>,
    direction: Option<String>,
    base_width: Option<f32>,
    node_height: Option<f32>,
    node_spacing: Option<f32>,
    rank_spacing: Option<f32>,
    snap_tolerance: Option<f32>,
    order_passes: Option<usize>,
    grouping: Option<GroupingOrder>,
    unit_ids: Option<UnitIdScheme>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ThemeVariables {
    line_color: Option<String>,
    line_width: Option<f32>,
    lineage_line_width: Option<f32>,
    partner_colors: Option<Vec<String>>,
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let Some(path) = path else {
        return Ok(Config::default());
    };
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    parse_config(&contents).with_context(|| format!("invalid config {}", path.display()))
}

/// Parse a JSON (or JSON5) config document on top of the defaults.
pub fn parse_config(contents: &str) -> anyhow::Result<Config> {
    let parsed: ConfigFile = json5::from_str(contents)?;
    let mut config = Config::default();

    if let Some(theme_name) = parsed.theme.as_deref() {
        if theme_name == "monochrome" {
            config.theme = Theme::monochrome();
        } else if theme_name == "slate" || theme_name == "default" {
            config.theme = Theme::slate();
        }
    }

    if let Some(vars) = parsed.theme_variables {
        if let Some(v) = vars.line_color {
            config.theme.line_color = v;
        }
        if let Some(v) = vars.line_width {
            config.theme.line_width = v;
        }
        if let Some(v) = vars.lineage_line_width {
            config.theme.lineage_line_width = v;
        }
        if let Some(v) = vars.partner_colors {
            config.theme.partner_colors = v;
        }
    }

    if let Some(token) = parsed.direction {
        config.layout.direction =
            Direction::from_token(&token).ok_or(ConfigError::UnknownDirection(token))?;
    }
    if let Some(v) = parsed.base_width {
        config.layout.base_width = v;
    }
    if let Some(v) = parsed.node_height {
        config.layout.node_height = v;
    }
    if let Some(v) = parsed.node_spacing {
        config.layout.node_spacing = v;
    }
    if let Some(v) = parsed.rank_spacing {
        config.layout.rank_spacing = v;
    }
    if let Some(v) = parsed.snap_tolerance {
        config.layout.snap_tolerance = v;
    }
    if let Some(v) = parsed.order_passes {
        config.layout.order_passes = v;
    }
    if let Some(v) = parsed.grouping {
        config.build.grouping = v;
    }
    if let Some(v) = parsed.unit_ids {
        config.build.unit_ids = v;
    }

    config.layout.validate()?;
    Ok(config)
}
