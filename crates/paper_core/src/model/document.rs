//! Outline document domain model.
//!
//! # Responsibility
//! - Define the persisted schemaVersion 3 shape.
//! - Build documents from untrusted JSON without ever rejecting them.
//!
//! # Invariants
//! - `schema_version` of every document produced here is `SCHEMA_VERSION`.
//! - Missing or wrong-typed fields become "", empty sequences, or `false`.
//! - A subsection is owned by exactly one section.

use crate::progress::percent_of;
use serde::Serialize;
use serde_json::{Map, Value};

/// Schema version written by this build.
pub const SCHEMA_VERSION: u32 = 3;

/// Identifier of one section, subsection, or checklist item.
///
/// Empty string means "not assigned yet"; the renderer backfills it.
pub type NodeId = String;

/// Root of one outline document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub schema_version: u32,
    pub title: String,
    pub sections: Vec<Section>,
}

/// Top-level outline node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Section {
    pub id: NodeId,
    pub title: String,
    pub text: String,
    /// Presentation-only fold state; persisted with the document.
    pub collapsed: bool,
    pub checklist: Vec<ChecklistItem>,
    pub subsections: Vec<Subsection>,
}

/// Nested outline node under exactly one section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Subsection {
    pub id: NodeId,
    pub title: String,
    pub text: String,
    pub checklist: Vec<ChecklistItem>,
}

/// Togglable leaf attached to a section or subsection checklist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChecklistItem {
    pub id: NodeId,
    pub text: String,
    pub checked: bool,
}

impl Document {
    /// Creates an empty document with the given title.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            title: title.into(),
            sections: Vec::new(),
        }
    }

    /// Builds a document from any JSON value, coercing bad fields to defaults.
    ///
    /// Non-object input yields an empty untitled document.
    pub fn from_json_value(value: &Value) -> Self {
        let Some(object) = value.as_object() else {
            return Self::new("");
        };
        Self {
            schema_version: SCHEMA_VERSION,
            title: string_field(object, "title"),
            sections: array_field(object, "sections")
                .iter()
                .map(Section::from_json_value)
                .collect(),
        }
    }

    /// Total number of subsections across all sections.
    pub fn subsection_count(&self) -> usize {
        self.sections
            .iter()
            .map(|section| section.subsections.len())
            .sum()
    }

    /// Total number of checklist items at every scope.
    pub fn item_count(&self) -> usize {
        self.sections
            .iter()
            .map(|section| section.items().count())
            .sum()
    }
}

impl Section {
    /// Creates an expanded section with no body, items, or subsections.
    pub fn new(id: impl Into<NodeId>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            text: String::new(),
            collapsed: false,
            checklist: Vec::new(),
            subsections: Vec::new(),
        }
    }

    fn from_json_value(value: &Value) -> Self {
        let empty = Map::new();
        let object = value.as_object().unwrap_or(&empty);
        Self {
            id: string_field(object, "id"),
            title: string_field(object, "title"),
            text: string_field(object, "text"),
            collapsed: bool_field(object, "collapsed"),
            checklist: checklist_field(object),
            subsections: array_field(object, "subsections")
                .iter()
                .map(Subsection::from_json_value)
                .collect(),
        }
    }

    /// Iterates every checklist item under this section, own scope first.
    pub fn items(&self) -> impl Iterator<Item = &ChecklistItem> {
        self.checklist.iter().chain(
            self.subsections
                .iter()
                .flat_map(|subsection| subsection.checklist.iter()),
        )
    }

    /// Completion percentage over every nested checklist item.
    pub fn progress(&self) -> u8 {
        let total = self.items().count();
        let checked = self.items().filter(|item| item.checked).count();
        percent_of(checked, total)
    }
}

impl Subsection {
    /// Creates an empty subsection.
    pub fn new(id: impl Into<NodeId>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            text: String::new(),
            checklist: Vec::new(),
        }
    }

    fn from_json_value(value: &Value) -> Self {
        let empty = Map::new();
        let object = value.as_object().unwrap_or(&empty);
        Self {
            id: string_field(object, "id"),
            title: string_field(object, "title"),
            text: string_field(object, "text"),
            checklist: checklist_field(object),
        }
    }
}

impl ChecklistItem {
    /// Creates an unchecked item.
    pub fn new(id: impl Into<NodeId>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            checked: false,
        }
    }

    fn from_json_value(value: &Value) -> Self {
        let empty = Map::new();
        let object = value.as_object().unwrap_or(&empty);
        Self {
            id: string_field(object, "id"),
            text: string_field(object, "text"),
            checked: bool_field(object, "checked"),
        }
    }
}

fn string_field(object: &Map<String, Value>, key: &str) -> String {
    object
        .get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

fn bool_field(object: &Map<String, Value>, key: &str) -> bool {
    object.get(key).and_then(Value::as_bool).unwrap_or(false)
}

fn array_field<'a>(object: &'a Map<String, Value>, key: &str) -> &'a [Value] {
    object
        .get(key)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

fn checklist_field(object: &Map<String, Value>) -> Vec<ChecklistItem> {
    array_field(object, "checklist")
        .iter()
        .map(ChecklistItem::from_json_value)
        .collect()
}
