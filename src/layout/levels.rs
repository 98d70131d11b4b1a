use std::cmp::Ordering;

use super::types::PositionedUnit;

/// Snap near-equal rank coordinates onto shared generation lines.
///
/// Values are visited in ascending order; a value within `tolerance` of the
/// current level's first value joins that level, otherwise it opens a new one.
/// Returns the snapped value for each input, in input order.
pub fn snap_levels(values: &[f32], tolerance: f32) -> Vec<f32> {
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|a, b| {
        values[*a]
            .partial_cmp(&values[*b])
            .unwrap_or(Ordering::Equal)
            .then(a.cmp(b))
    });

    let mut snapped = values.to_vec();
    let mut level: Option<f32> = None;
    for idx in order {
        let value = values[idx];
        match level {
            Some(anchor) if (value - anchor).abs() < tolerance => snapped[idx] = anchor,
            _ => level = Some(value),
        }
    }
    snapped
}

/// Distinct generation lines, ascending.
pub fn level_lines(values: &[f32], tolerance: f32) -> Vec<f32> {
    let mut lines = snap_levels(values, tolerance);
    lines.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    lines.dedup();
    lines
}

/// Snap each unit's centre on the generation axis (`y` top-down, `x` when
/// `horizontal`) and move its top-left anchor along with it.
pub fn snap_unit_centers(units: &mut [PositionedUnit], horizontal: bool, tolerance: f32) {
    let raw: Vec<f32> = units
        .iter()
        .map(|unit| {
            let (cx, cy) = unit.center();
            if horizontal { cx } else { cy }
        })
        .collect();
    let snapped = snap_levels(&raw, tolerance);
    for ((unit, before), after) in units.iter_mut().zip(raw).zip(snapped) {
        if before == after {
            continue;
        }
        if horizontal {
            unit.x = after - unit.width / 2.0;
        } else {
            unit.y = after - unit.height / 2.0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{FamilyUnit, Gender, HandlePosition, Member};

    fn positioned(id: &str, x: f32, y: f32, width: f32) -> PositionedUnit {
        PositionedUnit {
            unit: FamilyUnit {
                id: id.to_string(),
                primary: Member::new(id, id, Gender::Male),
                partners: Vec::new(),
                children: Vec::new(),
                child_unit_ids: Vec::new(),
            },
            rank: 0,
            x,
            y,
            width,
            height: 300.0,
            target_position: HandlePosition::Top,
            source_position: HandlePosition::Bottom,
        }
    }

    #[test]
    fn jittered_units_land_on_one_generation_line() {
        let mut units = vec![
            positioned("a", 0.0, 0.0, 260.0),
            positioned("b", 400.0, 6.0, 520.0),
            positioned("c", 1000.0, -3.0, 260.0),
            positioned("d", 0.0, 500.0, 260.0),
        ];
        snap_unit_centers(&mut units, false, 10.0);
        let ys: Vec<f32> = units.iter().map(|u| u.y).collect();
        assert_eq!(ys, vec![-3.0, -3.0, -3.0, 500.0]);
        assert_eq!(units[1].x, 400.0);
    }

    #[test]
    fn horizontal_snapping_moves_x_by_centre() {
        let mut units = vec![
            positioned("a", 0.0, 0.0, 260.0),
            positioned("b", -128.0, 400.0, 520.0),
        ];
        // Centres 130 and 132 share a line; the wider unit keeps its centre at 130.
        snap_unit_centers(&mut units, true, 10.0);
        assert_eq!(units[0].x, 0.0);
        assert_eq!(units[1].x, -130.0);
        assert_eq!(units[1].y, 400.0);
    }

    #[test]
    fn jittered_values_share_one_line() {
        let raw = [150.0, 652.5, 148.0, 650.0, 655.0, 1150.0];
        let snapped = snap_levels(&raw, 10.0);
        assert_eq!(snapped, vec![148.0, 650.0, 148.0, 650.0, 650.0, 1150.0]);
        assert_eq!(level_lines(&raw, 10.0), vec![148.0, 650.0, 1150.0]);
    }

    #[test]
    fn levels_do_not_chain() {
        // 0 and 18 are too far apart even though 9 sits between them.
        let snapped = snap_levels(&[0.0, 9.0, 18.0], 10.0);
        assert_eq!(snapped, vec![0.0, 0.0, 18.0]);
    }

    #[test]
    fn zero_tolerance_keeps_values() {
        let raw = [3.0, 3.0, 4.0];
        assert_eq!(snap_levels(&raw, 0.0), raw.to_vec());
        assert!(snap_levels(&[], 10.0).is_empty());
    }
}
