//! Groups members into family units and derives parent-to-child edges.
//!
//! Grouping is first-visit-wins: when a member is visited, every spouse that
//! has not been claimed yet joins that member's unit. A spouse visited later is
//! already processed and is skipped. With [`GroupingOrder::Canonical`] members
//! with the most known spouses are visited first and ties go to the smaller id,
//! so a member married several times keeps every partner in one unit and the
//! result does not depend on how the caller's list happens to be ordered.

use std::collections::{BTreeMap, HashMap, HashSet};

use tracing::{debug, trace};

use crate::config::{BuildOptions, GroupingOrder, UnitIdScheme};
use crate::ir::{Edge, EdgeStyle, FamilyUnit, Member, edge_id, handle_id};
use crate::theme::Theme;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FamilyGraph {
    pub units: Vec<FamilyUnit>,
    pub edges: Vec<Edge>,
    /// Member id to the id of the unit that holds it.
    pub member_units: BTreeMap<String, String>,
}

impl FamilyGraph {
    pub fn unit(&self, unit_id: &str) -> Option<&FamilyUnit> {
        self.units.iter().find(|unit| unit.id == unit_id)
    }

    pub fn unit_of(&self, member_id: &str) -> Option<&FamilyUnit> {
        self.member_units
            .get(member_id)
            .and_then(|unit_id| self.unit(unit_id))
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }
}

pub fn build_family_graph(
    members: &[Member],
    options: &BuildOptions,
    theme: &Theme,
) -> FamilyGraph {
    if members.is_empty() {
        return FamilyGraph::default();
    }

    let mut index: HashMap<&str, &Member> = HashMap::with_capacity(members.len());
    for member in members {
        index.entry(member.id.as_str()).or_insert(member);
    }

    let mut visit: Vec<&Member> = members.iter().collect();
    if options.grouping == GroupingOrder::Canonical {
        let spouse_counts: HashMap<&str, usize> = index
            .values()
            .map(|member| (member.id.as_str(), known_spouses(member, &index)))
            .collect();
        visit.sort_by(|a, b| {
            let a_count = spouse_counts.get(a.id.as_str()).copied().unwrap_or(0);
            let b_count = spouse_counts.get(b.id.as_str()).copied().unwrap_or(0);
            b_count.cmp(&a_count).then_with(|| a.id.cmp(&b.id))
        });
    }

    let mut processed: HashSet<&str> = HashSet::with_capacity(members.len());
    let mut member_units: BTreeMap<String, String> = BTreeMap::new();
    let mut units: Vec<FamilyUnit> = Vec::new();

    for member in visit {
        if !processed.insert(member.id.as_str()) {
            continue;
        }

        let mut partners: Vec<&Member> = Vec::new();
        for spouse_id in &member.spouses {
            let Some(spouse) = index.get(spouse_id.as_str()) else {
                trace!(member = %member.id, spouse = %spouse_id, "skipping unknown spouse");
                continue;
            };
            if !processed.insert(spouse.id.as_str()) {
                continue;
            }
            partners.push(spouse);
        }

        let unit_id = unit_id_for(member, &partners, options.unit_ids);

        let mut seen_children: HashSet<&str> = HashSet::new();
        let mut children: Vec<String> = Vec::new();
        for child_id in std::iter::once(member)
            .chain(partners.iter().copied())
            .flat_map(|m| m.children.iter())
        {
            if seen_children.insert(child_id.as_str()) {
                children.push(child_id.clone());
            }
        }

        member_units.insert(member.id.clone(), unit_id.clone());
        for partner in &partners {
            member_units.insert(partner.id.clone(), unit_id.clone());
        }

        units.push(FamilyUnit {
            id: unit_id,
            primary: member.clone(),
            partners: partners.into_iter().cloned().collect(),
            children,
            child_unit_ids: Vec::new(),
        });
    }

    let edges = derive_edges(&mut units, &member_units, &index, theme);
    debug!(
        members = members.len(),
        units = units.len(),
        edges = edges.len(),
        "built family graph"
    );

    FamilyGraph {
        units,
        edges,
        member_units,
    }
}

/// Distinct spouses of `member` that exist in the list, excluding itself.
fn known_spouses(member: &Member, index: &HashMap<&str, &Member>) -> usize {
    let mut seen: HashSet<&str> = HashSet::new();
    member
        .spouses
        .iter()
        .filter(|id| **id != member.id && index.contains_key(id.as_str()))
        .filter(|id| seen.insert(id.as_str()))
        .count()
}

fn unit_id_for(primary: &Member, partners: &[&Member], scheme: UnitIdScheme) -> String {
    match scheme {
        UnitIdScheme::Primary => primary.id.clone(),
        UnitIdScheme::Composite if partners.is_empty() => primary.id.clone(),
        UnitIdScheme::Composite => {
            let mut id = format!("group-{}", primary.id);
            for partner in partners {
                id.push('-');
                id.push_str(&partner.id);
            }
            id
        }
    }
}

fn derive_edges(
    units: &mut [FamilyUnit],
    member_units: &BTreeMap<String, String>,
    index: &HashMap<&str, &Member>,
    theme: &Theme,
) -> Vec<Edge> {
    let mut edges: Vec<Edge> = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();

    for unit in units.iter_mut() {
        let mut child_unit_ids: Vec<String> = Vec::new();
        for child_id in &unit.children {
            let Some(target) = member_units.get(child_id) else {
                trace!(unit = %unit.id, child = %child_id, "skipping unknown child");
                continue;
            };
            let id = edge_id(&unit.id, target);
            if !seen.insert(id.clone()) {
                continue;
            }
            let child = index.get(child_id.as_str()).copied();
            let (source_handle, style) = route_lineage(unit, child, theme);
            edges.push(Edge {
                id,
                source: unit.id.clone(),
                target: target.clone(),
                source_handle,
                style,
            });
            child_unit_ids.push(target.clone());
        }
        unit.child_unit_ids = child_unit_ids;
    }

    edges
}

/// Pick the member card an edge leaves from and its stroke.
///
/// Only units with more than one partner expose per-member handles; the line
/// starts at the primary unless the child names one of the partners as parent.
fn route_lineage(
    unit: &FamilyUnit,
    child: Option<&Member>,
    theme: &Theme,
) -> (Option<String>, EdgeStyle) {
    if unit.partners.len() <= 1 {
        return (None, theme.default_edge_style());
    }
    let lineage = child.and_then(|child| {
        unit.partners
            .iter()
            .position(|partner| child.parents.contains(&partner.id))
    });
    match lineage {
        Some(idx) => (
            Some(handle_id(&unit.partners[idx].id)),
            theme.lineage_edge_style(idx),
        ),
        None => (Some(handle_id(&unit.primary.id)), theme.default_edge_style()),
    }
}
