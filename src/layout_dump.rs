use crate::ir::{Direction, Gender, HandlePosition, Member};
use crate::layout::Layout;
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutDump {
    pub direction: Direction,
    pub width: f32,
    pub height: f32,
    pub units: Vec<UnitDump>,
    pub edges: Vec<EdgeDump>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnitDump {
    pub id: String,
    pub label: String,
    pub rank: usize,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub primary: MemberDump,
    pub partners: Vec<MemberDump>,
    pub child_unit_ids: Vec<String>,
    pub has_children: bool,
    pub target_position: HandlePosition,
    pub source_position: HandlePosition,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberDump {
    pub id: String,
    pub name: String,
    pub display_name: String,
    pub gender: Gender,
    pub life_span: String,
    pub deceased: bool,
    /// Source handle id, only present when the unit exposes per-member handles.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub handle: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeDump {
    pub id: String,
    pub source: String,
    pub target: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_handle: Option<String>,
    pub stroke: String,
    pub stroke_width: f32,
}

impl MemberDump {
    fn from_member(member: &Member, with_handle: bool) -> Self {
        Self {
            id: member.id.clone(),
            name: member.name.clone(),
            display_name: member.display_name(),
            gender: member.gender,
            life_span: member.life_span(),
            deceased: member.is_deceased(),
            handle: with_handle.then(|| crate::ir::handle_id(&member.id)),
        }
    }
}

impl LayoutDump {
    pub fn from_layout(layout: &Layout) -> Self {
        let units = layout
            .units
            .iter()
            .map(|positioned| {
                let unit = &positioned.unit;
                let with_handles = unit.partner_count() > 1;
                UnitDump {
                    id: unit.id.clone(),
                    label: unit.label(),
                    rank: positioned.rank,
                    x: positioned.x,
                    y: positioned.y,
                    width: positioned.width,
                    height: positioned.height,
                    primary: MemberDump::from_member(&unit.primary, with_handles),
                    partners: unit
                        .partners
                        .iter()
                        .map(|partner| MemberDump::from_member(partner, with_handles))
                        .collect(),
                    child_unit_ids: unit.child_unit_ids.clone(),
                    has_children: unit.has_children(),
                    target_position: positioned.target_position,
                    source_position: positioned.source_position,
                }
            })
            .collect();

        let edges = layout
            .edges
            .iter()
            .map(|edge| EdgeDump {
                id: edge.id.clone(),
                source: edge.source.clone(),
                target: edge.target.clone(),
                source_handle: edge.source_handle.clone(),
                stroke: edge.style.stroke.clone(),
                stroke_width: edge.style.stroke_width,
            })
            .collect();

        LayoutDump {
            direction: layout.direction,
            width: layout.width,
            height: layout.height,
            units,
            edges,
        }
    }
}

pub fn layout_to_json(layout: &Layout) -> anyhow::Result<String> {
    Ok(serde_json::to_string_pretty(&LayoutDump::from_layout(layout))?)
}

pub fn write_layout_dump(path: Option<&Path>, layout: &Layout) -> anyhow::Result<()> {
    let dump = LayoutDump::from_layout(layout);
    match path {
        Some(path) => {
            let file = File::create(path)?;
            let mut writer = BufWriter::new(file);
            serde_json::to_writer_pretty(&mut writer, &dump)?;
            writer.flush()?;
        }
        None => {
            let stdout = std::io::stdout();
            let mut writer = stdout.lock();
            serde_json::to_writer_pretty(&mut writer, &dump)?;
            writeln!(writer)?;
        }
    }
    Ok(())
}
