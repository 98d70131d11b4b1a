//! Layered layout of family units.
//!
//! Pipeline: size units, rank them by longest path, split long edges with
//! dummies, reduce crossings with median sweeps, pack each rank along the cross
//! axis, convert centres to top-left anchors and finally snap unit centres that
//! sit within tolerance of each other onto one generation line.

mod levels;
mod position;
mod ranking;
pub(crate) mod types;

pub use levels::{level_lines, snap_levels, snap_unit_centers};
pub use types::*;

use std::collections::HashMap;

use tracing::debug;

use crate::config::LayoutConfig;
use crate::ir::{Direction, Edge, FamilyUnit};
use position::{cross_centers, rank_centers};
use ranking::{compute_ranks, count_crossings, expand_long_edges, order_rank_nodes, rank_edges};

fn is_horizontal(direction: Direction) -> bool {
    matches!(direction, Direction::LeftRight)
}

/// Position `units`; `edges` are returned unchanged alongside.
///
/// Edges whose endpoints are not among `units` are ignored for placement.
pub fn compute_layout(units: &[FamilyUnit], edges: &[Edge], config: &LayoutConfig) -> Layout {
    let direction = config.direction;
    if units.is_empty() {
        return Layout::empty(direction, edges.to_vec());
    }
    let horizontal = is_horizontal(direction);

    let mut node_ids: Vec<String> = Vec::with_capacity(units.len());
    let mut node_order: HashMap<String, usize> = HashMap::with_capacity(units.len());
    let mut sizes: HashMap<String, (f32, f32)> = HashMap::with_capacity(units.len());
    for unit in units {
        if node_order.contains_key(&unit.id) {
            continue;
        }
        node_order.insert(unit.id.clone(), node_ids.len());
        node_ids.push(unit.id.clone());
        sizes.insert(unit.id.clone(), config.unit_size(unit.partner_count()));
    }

    let layout_edges = rank_edges(edges, &node_order);
    let ranks = compute_ranks(&node_ids, &layout_edges, &node_order);
    let max_rank = ranks.values().copied().max().unwrap_or(0);

    let mut rank_nodes: Vec<Vec<String>> = vec![Vec::new(); max_rank + 1];
    for node_id in &node_ids {
        let rank = ranks.get(node_id).copied().unwrap_or(0);
        rank_nodes[rank].push(node_id.clone());
    }

    let mut order_map = node_order.clone();
    let (expanded_edges, dummies) =
        expand_long_edges(&layout_edges, &ranks, &mut rank_nodes, &mut order_map);
    order_rank_nodes(
        &mut rank_nodes,
        &expanded_edges,
        &order_map,
        config.order_passes,
    );
    if tracing::enabled!(tracing::Level::DEBUG) {
        debug!(
            units = node_ids.len(),
            ranks = rank_nodes.len(),
            dummies = dummies.len(),
            crossings = count_crossings(&rank_nodes, &expanded_edges),
            "ordered ranks"
        );
    }

    // Main axis follows generations; dummies take no room on either axis.
    let mut main_extent: HashMap<String, f32> = HashMap::with_capacity(sizes.len());
    let mut cross_half: HashMap<String, f32> = HashMap::with_capacity(order_map.len());
    for (id, (width, height)) in &sizes {
        let (main, cross) = if horizontal {
            (*width, *height)
        } else {
            (*height, *width)
        };
        main_extent.insert(id.clone(), main);
        cross_half.insert(id.clone(), cross / 2.0);
    }
    for id in &dummies {
        cross_half.insert(id.clone(), 0.0);
    }

    let rank_main = rank_centers(&rank_nodes, &main_extent, config.rank_spacing);
    let cross = cross_centers(
        &rank_nodes,
        &expanded_edges,
        &cross_half,
        config.node_spacing,
        config.order_passes,
    );

    let mut unit_by_id: HashMap<&str, &FamilyUnit> = HashMap::with_capacity(units.len());
    for unit in units {
        unit_by_id.entry(unit.id.as_str()).or_insert(unit);
    }
    let (target_position, source_position) = direction.handle_positions();
    let mut positioned: Vec<PositionedUnit> = Vec::with_capacity(node_ids.len());
    for id in &node_ids {
        let Some(unit) = unit_by_id.get(id.as_str()) else {
            continue;
        };
        let (width, height) = sizes.get(id).copied().unwrap_or((0.0, 0.0));
        let rank = ranks.get(id).copied().unwrap_or(0);
        let main = rank_main[rank];
        let offset = cross.get(id).copied().unwrap_or(0.0);
        let (cx, cy) = if horizontal { (main, offset) } else { (offset, main) };
        positioned.push(PositionedUnit {
            unit: (*unit).clone(),
            rank,
            x: cx - width / 2.0,
            y: cy - height / 2.0,
            width,
            height,
            target_position,
            source_position,
        });
    }

    snap_unit_centers(&mut positioned, horizontal, config.snap_tolerance);
    normalize_layout(&mut positioned);
    let (width, height) = bounds(&positioned);

    Layout {
        direction,
        width,
        height,
        units: positioned,
        edges: edges.to_vec(),
    }
}

fn bounds(units: &[PositionedUnit]) -> (f32, f32) {
    let mut max_x: f32 = 0.0;
    let mut max_y: f32 = 0.0;
    for unit in units {
        max_x = max_x.max(unit.x + unit.width);
        max_y = max_y.max(unit.y + unit.height);
    }
    (max_x, max_y)
}

/// Shift everything right/down when any unit ended up at a negative coordinate.
fn normalize_layout(units: &mut [PositionedUnit]) {
    let mut min_x = f32::MAX;
    let mut min_y = f32::MAX;
    for unit in units.iter() {
        min_x = min_x.min(unit.x);
        min_y = min_y.min(unit.y);
    }
    let shift_x = if min_x < 0.0 { -min_x } else { 0.0 };
    let shift_y = if min_y < 0.0 { -min_y } else { 0.0 };
    if shift_x == 0.0 && shift_y == 0.0 {
        return;
    }
    for unit in units.iter_mut() {
        unit.x += shift_x;
        unit.y += shift_y;
    }
}
