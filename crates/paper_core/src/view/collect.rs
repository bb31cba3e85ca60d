//! View → model reconciliation.
//!
//! # Responsibility
//! - Rebuild a document from the live view tree in its current order.
//!
//! # Invariants
//! - `collect(render(d)) == d` for documents with trimmed text and unique ids.
//! - All text fields are trimmed.
//! - A node without an id attribute gets a generated one, written back to the
//!   view so the next collection returns the same id.

use crate::model::document::{ChecklistItem, Document, Section, Subsection, SCHEMA_VERSION};
use crate::model::ids::{IdGenerator, IdKind};
use crate::view::{ChecklistScope, ViewKind, ViewNodeId, ViewTree};
use log::debug;

/// Collects the whole view tree into a new document.
pub fn collect(view: &mut ViewTree, ids: &mut dyn IdGenerator) -> Document {
    let title = trimmed_text(view, Some(view.page_title()));
    let sections = view
        .sections()
        .to_vec()
        .into_iter()
        .map(|node| collect_section(view, node, ids))
        .collect::<Vec<_>>();

    let document = Document {
        schema_version: SCHEMA_VERSION,
        title,
        sections,
    };
    debug!(
        "event=collect module=view status=ok sections={} items={}",
        document.sections.len(),
        document.item_count()
    );
    document
}

fn collect_section(view: &mut ViewTree, node: ViewNodeId, ids: &mut dyn IdGenerator) -> Section {
    let id = ensure_node_id(view, node, IdKind::Section, ids);
    let header = view.child_of_kind(node, ViewKind::SectionHeader);
    let body = view.child_of_kind(node, ViewKind::SectionBody);
    let title_node = header.and_then(|header| view.child_of_kind(header, ViewKind::SectionTitle));
    let text_node = body.and_then(|body| view.child_of_kind(body, ViewKind::SectionText));
    let checklist_node = body.and_then(|body| {
        view.child_of_kind(body, ViewKind::Checklist(ChecklistScope::Section))
    });
    let subsection_nodes = body
        .and_then(|body| view.child_of_kind(body, ViewKind::SubsectionList))
        .map(|list| view.children(list).to_vec())
        .unwrap_or_default();

    let mut subsections = Vec::with_capacity(subsection_nodes.len());
    for child in subsection_nodes {
        if view.kind(child) == Some(ViewKind::Subsection) {
            subsections.push(collect_subsection(view, child, ids));
        }
    }

    Section {
        id,
        title: trimmed_text(view, title_node),
        text: trimmed_text(view, text_node),
        collapsed: view.get(node).is_some_and(|section| section.collapsed),
        checklist: collect_checklist(view, checklist_node, ids),
        subsections,
    }
}

fn collect_subsection(
    view: &mut ViewTree,
    node: ViewNodeId,
    ids: &mut dyn IdGenerator,
) -> Subsection {
    let id = ensure_node_id(view, node, IdKind::Subsection, ids);
    let title_node = view.child_of_kind(node, ViewKind::SubsectionTitle);
    let text_node = view.child_of_kind(node, ViewKind::SubsectionText);
    let checklist_node = view.child_of_kind(node, ViewKind::Checklist(ChecklistScope::Subsection));

    Subsection {
        id,
        title: trimmed_text(view, title_node),
        text: trimmed_text(view, text_node),
        checklist: collect_checklist(view, checklist_node, ids),
    }
}

fn collect_checklist(
    view: &mut ViewTree,
    list: Option<ViewNodeId>,
    ids: &mut dyn IdGenerator,
) -> Vec<ChecklistItem> {
    let Some(list) = list else {
        return Vec::new();
    };
    let mut items = Vec::new();
    for child in view.children(list).to_vec() {
        if view.kind(child) != Some(ViewKind::ChecklistItem) {
            continue;
        }
        let id = ensure_node_id(view, child, IdKind::ChecklistItem, ids);
        items.push(ChecklistItem {
            id,
            text: trimmed_text(view, view.child_of_kind(child, ViewKind::ItemText)),
            checked: view.get(child).is_some_and(|item| item.checked),
        });
    }
    items
}

fn ensure_node_id(
    view: &mut ViewTree,
    node: ViewNodeId,
    kind: IdKind,
    ids: &mut dyn IdGenerator,
) -> String {
    if let Some(existing) = view.node_id(node).filter(|id| !id.is_empty()) {
        return existing.to_string();
    }
    let generated = ids.next_id(kind);
    debug!(
        "event=collect_backfill_id module=view status=ok kind={} id={}",
        kind.prefix(),
        generated
    );
    if let Some(view_node) = view.get_mut(node) {
        view_node.node_id = Some(generated.clone());
    }
    generated
}

fn trimmed_text(view: &ViewTree, node: Option<ViewNodeId>) -> String {
    node.and_then(|node| view.get(node))
        .map(|node| node.text.trim().to_string())
        .unwrap_or_default()
}
