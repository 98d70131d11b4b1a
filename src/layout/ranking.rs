use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap, HashSet};

use super::types::LayoutEdge;

/// Edges between known units, without self-loops and duplicates.
pub(super) fn rank_edges(
    edges: &[crate::ir::Edge],
    node_order: &HashMap<String, usize>,
) -> Vec<LayoutEdge> {
    let mut seen: HashSet<(&str, &str)> = HashSet::new();
    let mut out = Vec::new();
    for edge in edges {
        if edge.source == edge.target {
            continue;
        }
        if !node_order.contains_key(&edge.source) || !node_order.contains_key(&edge.target) {
            continue;
        }
        if seen.insert((edge.source.as_str(), edge.target.as_str())) {
            out.push(LayoutEdge::new(edge.source.as_str(), edge.target.as_str()));
        }
    }
    out
}

/// Longest-path ranking over a topological order.
///
/// Ties between ready nodes go to declaration order. When a cycle stalls the
/// sweep, the earliest remaining node is released and its incoming edges become
/// back-edges, which carry no rank constraint.
pub(super) fn compute_ranks(
    node_ids: &[String],
    edges: &[LayoutEdge],
    node_order: &HashMap<String, usize>,
) -> HashMap<String, usize> {
    let mut adj: HashMap<&str, Vec<&str>> = HashMap::new();
    let mut indeg: HashMap<&str, usize> = node_ids.iter().map(|id| (id.as_str(), 0)).collect();

    for edge in edges {
        if !indeg.contains_key(edge.from.as_str()) || !indeg.contains_key(edge.to.as_str()) {
            continue;
        }
        adj.entry(edge.from.as_str())
            .or_default()
            .push(edge.to.as_str());
        if let Some(deg) = indeg.get_mut(edge.to.as_str()) {
            *deg += 1;
        }
    }

    let order_key = |id: &str| -> usize { node_order.get(id).copied().unwrap_or(usize::MAX) };

    let mut ready: BinaryHeap<Reverse<(usize, &str)>> = BinaryHeap::new();
    for id in node_ids {
        if indeg.get(id.as_str()).copied().unwrap_or(0) == 0 {
            ready.push(Reverse((order_key(id), id.as_str())));
        }
    }

    let mut order: Vec<&str> = Vec::with_capacity(node_ids.len());
    let mut processed: HashSet<&str> = HashSet::new();
    loop {
        while let Some(Reverse((_key, id))) = ready.pop() {
            if !processed.insert(id) {
                continue;
            }
            order.push(id);
            if let Some(nexts) = adj.get(id) {
                for &next in nexts {
                    if processed.contains(next) {
                        continue;
                    }
                    if let Some(deg) = indeg.get_mut(next) {
                        *deg = deg.saturating_sub(1);
                        if *deg == 0 {
                            ready.push(Reverse((order_key(next), next)));
                        }
                    }
                }
            }
        }

        if processed.len() >= indeg.len() {
            break;
        }

        // Cycle: release the earliest remaining node.
        let next = node_ids
            .iter()
            .map(String::as_str)
            .filter(|id| !processed.contains(id))
            .min_by_key(|id| order_key(id));
        match next {
            Some(id) => ready.push(Reverse((order_key(id), id))),
            None => break,
        }
    }

    let order_index: HashMap<&str, usize> = order
        .iter()
        .enumerate()
        .map(|(idx, id)| (*id, idx))
        .collect();

    let mut ranks: HashMap<String, usize> = HashMap::with_capacity(order.len());
    for &node in &order {
        let rank = *ranks.entry(node.to_string()).or_insert(0);
        let Some(nexts) = adj.get(node) else {
            continue;
        };
        let from_idx = order_index.get(node).copied().unwrap_or(0);
        for &next in nexts {
            let to_idx = order_index.get(next).copied().unwrap_or(from_idx);
            if to_idx <= from_idx {
                continue;
            }
            let entry = ranks.entry(next.to_string()).or_insert(0);
            *entry = (*entry).max(rank + 1);
        }
    }

    ranks
}

/// Split edges spanning several ranks into unit-length hops through dummy nodes.
///
/// Dummies are appended to `rank_nodes` and `order_map`; back-edges are dropped.
pub(super) fn expand_long_edges(
    edges: &[LayoutEdge],
    ranks: &HashMap<String, usize>,
    rank_nodes: &mut [Vec<String>],
    order_map: &mut HashMap<String, usize>,
) -> (Vec<LayoutEdge>, HashSet<String>) {
    let mut expanded: Vec<LayoutEdge> = Vec::with_capacity(edges.len());
    let mut dummies: HashSet<String> = HashSet::new();
    let mut dummy_counter = 0usize;

    for edge in edges {
        let (Some(&from_rank), Some(&to_rank)) = (ranks.get(&edge.from), ranks.get(&edge.to)) else {
            continue;
        };
        if to_rank <= from_rank {
            continue;
        }
        if to_rank - from_rank == 1 {
            expanded.push(edge.clone());
            continue;
        }
        let mut prev = edge.from.clone();
        for current_rank in (from_rank + 1)..to_rank {
            let id = format!("__dummy_{dummy_counter}__");
            dummy_counter += 1;
            let order_idx = order_map.len();
            order_map.insert(id.clone(), order_idx);
            if let Some(bucket) = rank_nodes.get_mut(current_rank) {
                bucket.push(id.clone());
            }
            expanded.push(LayoutEdge::new(prev, id.as_str()));
            dummies.insert(id.clone());
            prev = id;
        }
        expanded.push(LayoutEdge::new(prev, edge.to.as_str()));
    }

    (expanded, dummies)
}

/// Crossing reduction: alternate down and up sweeps, sorting each rank by the
/// median position of its neighbours in the rank just fixed.
pub(super) fn order_rank_nodes(
    rank_nodes: &mut [Vec<String>],
    edges: &[LayoutEdge],
    node_order: &HashMap<String, usize>,
    passes: usize,
) {
    if rank_nodes.len() <= 1 {
        return;
    }
    let mut incoming: HashMap<String, Vec<String>> = HashMap::new();
    let mut outgoing: HashMap<String, Vec<String>> = HashMap::new();

    for edge in edges {
        outgoing
            .entry(edge.from.clone())
            .or_default()
            .push(edge.to.clone());
        incoming
            .entry(edge.to.clone())
            .or_default()
            .push(edge.from.clone());
    }

    let mut positions: HashMap<String, usize> = HashMap::new();
    let update_positions = |rank_nodes: &mut [Vec<String>],
                            positions: &mut HashMap<String, usize>| {
        positions.clear();
        for bucket in rank_nodes.iter() {
            for (idx, node_id) in bucket.iter().enumerate() {
                positions.insert(node_id.clone(), idx);
            }
        }
    };

    update_positions(rank_nodes, &mut positions);

    let sort_bucket = |bucket: &mut Vec<String>,
                       neighbors: &HashMap<String, Vec<String>>,
                       positions: &HashMap<String, usize>| {
        let current_positions: HashMap<String, usize> = bucket
            .iter()
            .enumerate()
            .map(|(idx, id)| (id.clone(), idx))
            .collect();
        bucket.sort_by(|a, b| {
            let a_score = median_position(a, neighbors, positions, &current_positions);
            let b_score = median_position(b, neighbors, positions, &current_positions);
            match a_score.partial_cmp(&b_score) {
                Some(std::cmp::Ordering::Equal) | None => {
                    let a_pos = current_positions.get(a).copied().unwrap_or(0);
                    let b_pos = current_positions.get(b).copied().unwrap_or(0);
                    a_pos.cmp(&b_pos).then_with(|| {
                        node_order
                            .get(a)
                            .copied()
                            .unwrap_or(usize::MAX)
                            .cmp(&node_order.get(b).copied().unwrap_or(usize::MAX))
                    })
                }
                Some(ordering) => ordering,
            }
        });
    };

    for _ in 0..passes.max(1) {
        for rank in 1..rank_nodes.len() {
            if rank_nodes[rank].len() <= 1 {
                continue;
            }
            sort_bucket(&mut rank_nodes[rank], &incoming, &positions);
            update_positions(rank_nodes, &mut positions);
        }
        for rank in (0..rank_nodes.len().saturating_sub(1)).rev() {
            if rank_nodes[rank].len() <= 1 {
                continue;
            }
            sort_bucket(&mut rank_nodes[rank], &outgoing, &positions);
            update_positions(rank_nodes, &mut positions);
        }
    }
}

pub(super) fn median_position(
    node_id: &str,
    neighbors: &HashMap<String, Vec<String>>,
    positions: &HashMap<String, usize>,
    current_positions: &HashMap<String, usize>,
) -> f32 {
    let fallback = current_positions.get(node_id).copied().unwrap_or(0) as f32;
    let Some(list) = neighbors.get(node_id) else {
        return fallback;
    };
    let mut values: Vec<f32> = list
        .iter()
        .filter_map(|neighbor| positions.get(neighbor))
        .map(|pos| *pos as f32)
        .collect();
    if values.is_empty() {
        return fallback;
    }
    values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let mid = values.len() / 2;
    if values.len() % 2 == 1 {
        values[mid]
    } else {
        (values[mid - 1] + values[mid]) * 0.5
    }
}

/// Count crossings between adjacent ranks.
pub(super) fn count_crossings(rank_nodes: &[Vec<String>], edges: &[LayoutEdge]) -> usize {
    let mut position: HashMap<&str, (usize, usize)> = HashMap::new();
    for (rank, bucket) in rank_nodes.iter().enumerate() {
        for (idx, id) in bucket.iter().enumerate() {
            position.insert(id.as_str(), (rank, idx));
        }
    }
    let mut segments: HashMap<usize, Vec<(usize, usize)>> = HashMap::new();
    for edge in edges {
        let (Some(&(from_rank, from_idx)), Some(&(to_rank, to_idx))) =
            (position.get(edge.from.as_str()), position.get(edge.to.as_str()))
        else {
            continue;
        };
        if to_rank == from_rank + 1 {
            segments
                .entry(from_rank)
                .or_default()
                .push((from_idx, to_idx));
        }
    }
    let mut crossings = 0;
    for list in segments.values() {
        for (i, a) in list.iter().enumerate() {
            for b in &list[i + 1..] {
                if (a.0 < b.0 && a.1 > b.1) || (a.0 > b.0 && a.1 < b.1) {
                    crossings += 1;
                }
            }
        }
    }
    crossings
}
