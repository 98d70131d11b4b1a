pub mod builder;
#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod ir;
pub mod layout;
pub mod layout_dump;
pub mod theme;
pub mod visibility;

pub use builder::{FamilyGraph, build_family_graph};
#[cfg(feature = "cli")]
pub use cli::run;
pub use config::{BuildOptions, Config, ConfigError, GroupingOrder, LayoutConfig, UnitIdScheme};
pub use ir::{Direction, Edge, EdgeStyle, FamilyUnit, Gender, HandlePosition, Member};
pub use layout::{Layout, PositionedUnit, compute_layout};
pub use theme::Theme;
pub use visibility::{CollapseState, descendants, visible};

/// Build, filter and lay out a member list in one go.
pub fn layout_family(members: &[Member], collapsed: &CollapseState, config: &Config) -> Layout {
    let graph = build_family_graph(members, &config.build, &config.theme);
    let (units, edges) = visible(&graph.units, &graph.edges, collapsed.ids());
    compute_layout(&units, &edges, &config.layout)
}
