use std::cmp::Ordering;
use std::collections::HashMap;

use super::types::LayoutEdge;

/// Weight of the neighbour median against a node's current position.
const MEDIAN_PULL: f32 = 0.85;

/// Centre of each rank along the rank axis.
pub(super) fn rank_centers(
    rank_nodes: &[Vec<String>],
    main_extent: &HashMap<String, f32>,
    rank_spacing: f32,
) -> Vec<f32> {
    let mut centers = Vec::with_capacity(rank_nodes.len());
    let mut main_cursor = 0.0;
    for bucket in rank_nodes {
        let max_main = bucket
            .iter()
            .filter_map(|id| main_extent.get(id))
            .fold(0.0f32, |acc, v| acc.max(*v));
        centers.push(main_cursor + max_main / 2.0);
        main_cursor += max_main + rank_spacing;
    }
    centers
}

/// Centres along the packing axis.
///
/// Ranks start packed side by side in their crossing-reduced order, then
/// alternate sweeps pull every node towards the median of its neighbours in the
/// previous rank while keeping `node_spacing` between borders. The order inside
/// a rank never changes here. The result is shifted so the leftmost border sits
/// at zero.
pub(super) fn cross_centers(
    rank_nodes: &[Vec<String>],
    edges: &[LayoutEdge],
    half_extent: &HashMap<String, f32>,
    node_spacing: f32,
    passes: usize,
) -> HashMap<String, f32> {
    let half = |id: &str| half_extent.get(id).copied().unwrap_or(0.0);

    let mut incoming: HashMap<&str, Vec<&str>> = HashMap::new();
    let mut outgoing: HashMap<&str, Vec<&str>> = HashMap::new();
    for edge in edges {
        incoming
            .entry(edge.to.as_str())
            .or_default()
            .push(edge.from.as_str());
        outgoing
            .entry(edge.from.as_str())
            .or_default()
            .push(edge.to.as_str());
    }

    let mut cross_pos: HashMap<String, f32> = HashMap::new();
    for bucket in rank_nodes {
        let mut cursor = 0.0;
        let mut centers = Vec::with_capacity(bucket.len());
        for id in bucket {
            let h = half(id);
            centers.push(cursor + h);
            cursor += 2.0 * h + node_spacing;
        }
        let span = (cursor - node_spacing).max(0.0);
        for (id, center) in bucket.iter().zip(centers) {
            cross_pos.insert(id.clone(), center - span / 2.0);
        }
    }

    let place_rank = |bucket: &[String],
                      neighbors: &HashMap<&str, Vec<&str>>,
                      cross_pos: &mut HashMap<String, f32>| {
        if bucket.is_empty() {
            return;
        }
        let mut desired: Vec<f32> = Vec::with_capacity(bucket.len());
        for id in bucket {
            let current = cross_pos.get(id).copied().unwrap_or(0.0);
            let mut neighbor_centers: Vec<f32> = neighbors
                .get(id.as_str())
                .map(|list| {
                    list.iter()
                        .filter_map(|n| cross_pos.get(*n).copied())
                        .collect()
                })
                .unwrap_or_default();
            if neighbor_centers.is_empty() {
                desired.push(current);
                continue;
            }
            neighbor_centers.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
            let mid = neighbor_centers.len() / 2;
            let median = if neighbor_centers.len() % 2 == 1 {
                neighbor_centers[mid]
            } else {
                (neighbor_centers[mid - 1] + neighbor_centers[mid]) * 0.5
            };
            desired.push(median * MEDIAN_PULL + current * (1.0 - MEDIAN_PULL));
        }

        let desired_mean = desired.iter().sum::<f32>() / desired.len() as f32;
        let mut assigned: Vec<f32> = Vec::with_capacity(bucket.len());
        let mut prev: Option<(f32, f32)> = None;
        for (id, want) in bucket.iter().zip(desired.iter()) {
            let h = half(id);
            let center = match prev {
                Some((prev_center, prev_half)) => {
                    want.max(prev_center + prev_half + h + node_spacing)
                }
                None => *want,
            };
            assigned.push(center);
            prev = Some((center, h));
        }
        let actual_mean = assigned.iter().sum::<f32>() / assigned.len() as f32;
        let delta = desired_mean - actual_mean;
        for (id, center) in bucket.iter().zip(assigned) {
            cross_pos.insert(id.clone(), center + delta);
        }
    };

    for _ in 0..passes.max(1) {
        for bucket in rank_nodes {
            place_rank(bucket, &incoming, &mut cross_pos);
        }
        for bucket in rank_nodes.iter().rev() {
            place_rank(bucket, &outgoing, &mut cross_pos);
        }
    }

    let min_border = cross_pos
        .iter()
        .map(|(id, center)| center - half(id))
        .fold(f32::INFINITY, f32::min);
    if min_border.is_finite() {
        for center in cross_pos.values_mut() {
            *center -= min_border;
        }
    }
    cross_pos
}
