use crate::ir::{Direction, Edge, FamilyUnit, HandlePosition};

#[derive(Debug, Clone)]
pub struct PositionedUnit {
    pub unit: FamilyUnit,
    /// Generation index, 0 for the topmost rank.
    pub rank: usize,
    /// Top-left corner.
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub target_position: HandlePosition,
    pub source_position: HandlePosition,
}

impl PositionedUnit {
    pub fn id(&self) -> &str {
        &self.unit.id
    }

    pub fn center(&self) -> (f32, f32) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }
}

#[derive(Debug, Clone)]
pub struct Layout {
    pub direction: Direction,
    pub width: f32,
    pub height: f32,
    pub units: Vec<PositionedUnit>,
    pub edges: Vec<Edge>,
}

impl Layout {
    pub fn empty(direction: Direction, edges: Vec<Edge>) -> Self {
        Self {
            direction,
            width: 0.0,
            height: 0.0,
            units: Vec::new(),
            edges,
        }
    }

    pub fn unit(&self, unit_id: &str) -> Option<&PositionedUnit> {
        self.units.iter().find(|unit| unit.unit.id == unit_id)
    }

    pub fn rank_count(&self) -> usize {
        self.units.iter().map(|unit| unit.rank + 1).max().unwrap_or(0)
    }
}

/// Directed pair fed to ranking and ordering; may point at a dummy node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct LayoutEdge {
    pub from: String,
    pub to: String,
}

impl LayoutEdge {
    pub(crate) fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }
}
