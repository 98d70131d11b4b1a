use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::ir::{Edge, FamilyUnit};

/// Unit ids whose subtrees the caller has folded away.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CollapseState {
    collapsed: BTreeSet<String>,
}

impl CollapseState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flip the state of `unit_id`; returns whether it is now collapsed.
    pub fn toggle(&mut self, unit_id: &str) -> bool {
        if self.collapsed.remove(unit_id) {
            false
        } else {
            self.collapsed.insert(unit_id.to_string());
            true
        }
    }

    pub fn collapse(&mut self, unit_id: impl Into<String>) {
        self.collapsed.insert(unit_id.into());
    }

    pub fn expand(&mut self, unit_id: &str) {
        self.collapsed.remove(unit_id);
    }

    pub fn is_collapsed(&self, unit_id: &str) -> bool {
        self.collapsed.contains(unit_id)
    }

    pub fn clear(&mut self) {
        self.collapsed.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.collapsed.is_empty()
    }

    pub fn ids(&self) -> &BTreeSet<String> {
        &self.collapsed
    }
}

impl<S: Into<String>> FromIterator<S> for CollapseState {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            collapsed: iter.into_iter().map(Into::into).collect(),
        }
    }
}

fn adjacency(edges: &[Edge]) -> HashMap<&str, Vec<&str>> {
    let mut outgoing: HashMap<&str, Vec<&str>> = HashMap::new();
    for edge in edges {
        outgoing
            .entry(edge.source.as_str())
            .or_default()
            .push(edge.target.as_str());
    }
    outgoing
}

fn collect_descendants<'a>(
    root: &str,
    outgoing: &HashMap<&str, Vec<&'a str>>,
    seen: &mut HashSet<&'a str>,
) {
    let mut queue: VecDeque<&str> = VecDeque::new();
    queue.push_back(root);
    while let Some(current) = queue.pop_front() {
        let Some(targets) = outgoing.get(current) else {
            continue;
        };
        for &target in targets {
            if seen.insert(target) {
                queue.push_back(target);
            }
        }
    }
}

/// Every unit reachable from `root_id` along edges, breadth first.
///
/// The root is only part of the result when a cycle leads back to it.
pub fn descendants(root_id: &str, edges: &[Edge]) -> BTreeSet<String> {
    let outgoing = adjacency(edges);
    let mut seen: HashSet<&str> = HashSet::new();
    collect_descendants(root_id, &outgoing, &mut seen);
    seen.into_iter().map(str::to_string).collect()
}

/// Union of the descendants of every collapsed unit.
///
/// A collapsed unit is never hidden by its own closure, even when a cycle
/// leads back to it; another collapsed ancestor can still hide it.
pub fn hidden_units(edges: &[Edge], collapsed: &BTreeSet<String>) -> BTreeSet<String> {
    let outgoing = adjacency(edges);
    let mut hidden: HashSet<&str> = HashSet::new();
    for root in collapsed {
        let mut below: HashSet<&str> = HashSet::new();
        collect_descendants(root, &outgoing, &mut below);
        below.remove(root.as_str());
        hidden.extend(below);
    }
    hidden.into_iter().map(str::to_string).collect()
}

/// Drop everything below the collapsed units. Collapsed units themselves stay.
pub fn visible(
    units: &[FamilyUnit],
    edges: &[Edge],
    collapsed: &BTreeSet<String>,
) -> (Vec<FamilyUnit>, Vec<Edge>) {
    if collapsed.is_empty() {
        return (units.to_vec(), edges.to_vec());
    }
    let hidden = hidden_units(edges, collapsed);
    let visible_units: Vec<FamilyUnit> = units
        .iter()
        .filter(|unit| !hidden.contains(&unit.id))
        .cloned()
        .collect();
    let visible_edges: Vec<Edge> = edges
        .iter()
        .filter(|edge| !hidden.contains(&edge.source) && !hidden.contains(&edge.target))
        .cloned()
        .collect();
    debug!(
        collapsed = collapsed.len(),
        hidden = hidden.len(),
        units = visible_units.len(),
        "applied collapse state"
    );
    (visible_units, visible_edges)
}
