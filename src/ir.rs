use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static LEADING_YEAR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*(\d{1,4})").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Direction {
    #[default]
    #[serde(rename = "TB", alias = "TD")]
    TopDown,
    #[serde(rename = "LR")]
    LeftRight,
}

impl Direction {
    pub fn from_token(token: &str) -> Option<Self> {
        match token.trim().to_ascii_uppercase().as_str() {
            "TD" | "TB" => Some(Self::TopDown),
            "LR" => Some(Self::LeftRight),
            _ => None,
        }
    }

    /// Anchor sides as (target, source).
    pub fn handle_positions(self) -> (HandlePosition, HandlePosition) {
        match self {
            Self::TopDown => (HandlePosition::Top, HandlePosition::Bottom),
            Self::LeftRight => (HandlePosition::Left, HandlePosition::Right),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HandlePosition {
    Top,
    Bottom,
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Gender {
    Male,
    Female,
}

/// A person record as supplied by the caller.
///
/// Relationship lists are taken as-is: ids may point at members that are not
/// part of the list, and spouse links need not be mutual.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nickname: Option<String>,
    pub gender: Gender,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub death_date: Option<String>,
    #[serde(default)]
    pub spouses: Vec<String>,
    #[serde(default)]
    pub children: Vec<String>,
    #[serde(default)]
    pub parents: Vec<String>,
}

impl Member {
    pub fn new(id: impl Into<String>, name: impl Into<String>, gender: Gender) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            nickname: None,
            gender,
            birth_date: None,
            death_date: None,
            spouses: Vec::new(),
            children: Vec::new(),
            parents: Vec::new(),
        }
    }

    pub fn with_spouses<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.spouses = ids.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_children<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.children = ids.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_parents<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.parents = ids.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_dates(mut self, birth: Option<&str>, death: Option<&str>) -> Self {
        self.birth_date = birth.map(str::to_string);
        self.death_date = death.map(str::to_string);
        self
    }

    pub fn with_nickname(mut self, nickname: impl Into<String>) -> Self {
        self.nickname = Some(nickname.into());
        self
    }

    pub fn display_name(&self) -> String {
        match self.nickname.as_deref().map(str::trim) {
            Some(nick) if !nick.is_empty() => format!("{} ({})", self.name, nick),
            _ => self.name.clone(),
        }
    }

    pub fn birth_year(&self) -> Option<&str> {
        self.birth_date.as_deref().and_then(leading_year)
    }

    pub fn death_year(&self) -> Option<&str> {
        self.death_date.as_deref().and_then(leading_year)
    }

    /// Short "birth - death" caption; unknown birth years render as `?`.
    pub fn life_span(&self) -> String {
        let birth = self.birth_year().unwrap_or("?");
        match self.death_year() {
            Some(death) => format!("{birth} - {death}"),
            None => birth.to_string(),
        }
    }

    pub fn is_deceased(&self) -> bool {
        self.death_date
            .as_deref()
            .is_some_and(|date| !date.trim().is_empty())
    }
}

fn leading_year(date: &str) -> Option<&str> {
    LEADING_YEAR_RE
        .captures(date)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

pub fn handle_id(member_id: &str) -> String {
    format!("handle-{member_id}")
}

pub fn edge_id(source: &str, target: &str) -> String {
    format!("e-{source}-{target}")
}

/// A primary member plus the partners grouped with them into one visual card.
#[derive(Debug, Clone, PartialEq)]
pub struct FamilyUnit {
    pub id: String,
    pub primary: Member,
    pub partners: Vec<Member>,
    /// Child member ids of the primary and every partner, first-seen order.
    pub children: Vec<String>,
    /// Units reached by this unit's outgoing edges.
    pub child_unit_ids: Vec<String>,
}

impl FamilyUnit {
    pub fn partner_count(&self) -> usize {
        self.partners.len()
    }

    pub fn members(&self) -> impl Iterator<Item = &Member> {
        std::iter::once(&self.primary).chain(self.partners.iter())
    }

    pub fn contains_member(&self, member_id: &str) -> bool {
        self.members().any(|member| member.id == member_id)
    }

    pub fn label(&self) -> String {
        self.members()
            .map(|member| member.name.as_str())
            .collect::<Vec<_>>()
            .join(" & ")
    }

    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    /// Index of a partner in the lineage palette, if the member is a partner here.
    pub fn partner_index(&self, member_id: &str) -> Option<usize> {
        self.partners.iter().position(|p| p.id == member_id)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EdgeStyle {
    pub stroke: String,
    pub stroke_width: f32,
}

/// Parent unit to child unit.
#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    pub id: String,
    pub source: String,
    pub target: String,
    /// Which member card the line leaves from; only set for units with several partners.
    pub source_handle: Option<String>,
    pub style: EdgeStyle,
}
