//! Model → view projection.
//!
//! # Responsibility
//! - Build a fresh view tree from a document, replacing any previous one.
//! - Backfill missing or duplicated ids on the document before projecting.
//!
//! # Invariants
//! - Rendering the same document twice yields equal trees.
//! - Every section, subsection, and item view carries its model id.
//! - Placeholders are presentation only and never become node text.

use crate::config::{DEFAULT_DOCUMENT_TITLE, DEFAULT_SECTION_TITLE, DEFAULT_SUBSECTION_TITLE};
use crate::model::document::{ChecklistItem, Document, NodeId, Section, Subsection};
use crate::model::ids::{IdGenerator, IdKind};
use crate::progress;
use crate::view::{ChecklistScope, ViewKind, ViewNodeId, ViewTree};
use log::{debug, warn};
use std::collections::HashSet;

const FOLD_EXPANDED: &str = "▼";
const FOLD_COLLAPSED: &str = "▶";

/// Fold indicator label for a section.
pub fn fold_label(collapsed: bool) -> &'static str {
    if collapsed {
        FOLD_COLLAPSED
    } else {
        FOLD_EXPANDED
    }
}

/// Id assignment scoped to one render pass.
///
/// Tracks ids seen in this pass so a repeated id is replaced, not shared.
pub struct IdBackfill<'a> {
    ids: &'a mut dyn IdGenerator,
    seen: HashSet<String>,
}

impl<'a> IdBackfill<'a> {
    pub fn new(ids: &'a mut dyn IdGenerator) -> Self {
        Self {
            ids,
            seen: HashSet::new(),
        }
    }

    /// Keeps `id` when it is set and unique in this pass, else issues one.
    pub fn assign(&mut self, id: &mut NodeId, kind: IdKind) {
        if !id.is_empty() {
            if self.seen.insert(id.clone()) {
                self.ids.observe(id);
                return;
            }
            warn!(
                "event=render_duplicate_id module=view status=ok kind={} id={}",
                kind.prefix(),
                id
            );
        }
        *id = self.ids.next_id(kind);
        self.seen.insert(id.clone());
    }
}

/// Renders `document` into a new, laid-out view tree.
///
/// # Side effects
/// - Writes generated ids back into `document`.
pub fn render(document: &mut Document, ids: &mut dyn IdGenerator) -> ViewTree {
    let mut tree = ViewTree::new();
    let mut backfill = IdBackfill::new(ids);

    let page_title = tree.page_title();
    if let Some(node) = tree.get_mut(page_title) {
        node.text = document.title.clone();
        node.placeholder = Some(DEFAULT_DOCUMENT_TITLE);
    }

    let section_list = tree.section_list();
    for section in &mut document.sections {
        let node = render_section(&mut tree, section, &mut backfill);
        tree.append_child(section_list, node);
    }

    progress::refresh_all(&mut tree);
    tree.relayout();
    debug!(
        "event=render module=view status=ok sections={} subsections={} items={}",
        document.sections.len(),
        document.subsection_count(),
        document.item_count()
    );
    tree
}

/// Builds one detached section subtree.
pub fn render_section(
    tree: &mut ViewTree,
    section: &mut Section,
    backfill: &mut IdBackfill<'_>,
) -> ViewNodeId {
    backfill.assign(&mut section.id, IdKind::Section);

    let root = tree.create(ViewKind::Section);
    if let Some(node) = tree.get_mut(root) {
        node.node_id = Some(section.id.clone());
        node.collapsed = section.collapsed;
    }

    let header = child(tree, root, ViewKind::SectionHeader);
    leaf(
        tree,
        header,
        ViewKind::SectionTitle,
        &section.title,
        Some(DEFAULT_SECTION_TITLE),
    );
    leaf(
        tree,
        header,
        ViewKind::FoldToggle,
        fold_label(section.collapsed),
        None,
    );

    let body = child(tree, root, ViewKind::SectionBody);
    child(tree, body, ViewKind::Progress);
    leaf(tree, body, ViewKind::SectionText, &section.text, None);

    let checklist = child(tree, body, ViewKind::Checklist(ChecklistScope::Section));
    for item in &mut section.checklist {
        let node = render_item(tree, item, backfill);
        tree.append_child(checklist, node);
    }

    let subsections = child(tree, body, ViewKind::SubsectionList);
    for subsection in &mut section.subsections {
        let node = render_subsection(tree, subsection, backfill);
        tree.append_child(subsections, node);
    }

    root
}

/// Builds one detached subsection subtree.
pub fn render_subsection(
    tree: &mut ViewTree,
    subsection: &mut Subsection,
    backfill: &mut IdBackfill<'_>,
) -> ViewNodeId {
    backfill.assign(&mut subsection.id, IdKind::Subsection);

    let root = tree.create(ViewKind::Subsection);
    if let Some(node) = tree.get_mut(root) {
        node.node_id = Some(subsection.id.clone());
    }

    leaf(
        tree,
        root,
        ViewKind::SubsectionTitle,
        &subsection.title,
        Some(DEFAULT_SUBSECTION_TITLE),
    );
    leaf(tree, root, ViewKind::SubsectionText, &subsection.text, None);

    let checklist = child(tree, root, ViewKind::Checklist(ChecklistScope::Subsection));
    for item in &mut subsection.checklist {
        let node = render_item(tree, item, backfill);
        tree.append_child(checklist, node);
    }

    root
}

/// Builds one detached checklist item subtree.
pub fn render_item(
    tree: &mut ViewTree,
    item: &mut ChecklistItem,
    backfill: &mut IdBackfill<'_>,
) -> ViewNodeId {
    backfill.assign(&mut item.id, IdKind::ChecklistItem);

    let root = tree.create(ViewKind::ChecklistItem);
    if let Some(node) = tree.get_mut(root) {
        node.node_id = Some(item.id.clone());
        node.checked = item.checked;
    }
    leaf(tree, root, ViewKind::ItemText, &item.text, None);
    root
}

fn child(tree: &mut ViewTree, parent: ViewNodeId, kind: ViewKind) -> ViewNodeId {
    let node = tree.create(kind);
    tree.append_child(parent, node);
    node
}

fn leaf(
    tree: &mut ViewTree,
    parent: ViewNodeId,
    kind: ViewKind,
    text: &str,
    placeholder: Option<&'static str>,
) -> ViewNodeId {
    let node = child(tree, parent, kind);
    if let Some(view_node) = tree.get_mut(node) {
        view_node.text = text.to_string();
        view_node.placeholder = placeholder;
    }
    node
}

#[cfg(test)]
mod tests {
    use super::render;
    use crate::model::document::{ChecklistItem, Document, Section};
    use crate::model::ids::SequentialIdGenerator;
    use crate::view::{ViewKind, ROW_HEIGHT};

    #[test]
    fn backfills_missing_ids_in_place() {
        let mut document = Document::new("Doc");
        let mut section = Section::new("", "One");
        section.checklist.push(ChecklistItem::new("", "task"));
        document.sections.push(section);

        let mut ids = SequentialIdGenerator::new();
        let view = render(&mut document, &mut ids);

        assert_eq!(document.sections[0].id, "sec-0001");
        assert_eq!(document.sections[0].checklist[0].id, "chk-0002");
        assert_eq!(view.node_id(view.sections()[0]), Some("sec-0001"));
    }

    #[test]
    fn duplicate_ids_are_replaced() {
        let mut document = Document::new("Doc");
        document.sections.push(Section::new("sec-x", "A"));
        document.sections.push(Section::new("sec-x", "B"));

        let mut ids = SequentialIdGenerator::new();
        render(&mut document, &mut ids);

        assert_eq!(document.sections[0].id, "sec-x");
        assert_ne!(document.sections[1].id, "sec-x");
    }

    #[test]
    fn collapsed_section_body_is_hidden_and_flat() {
        let mut document = Document::new("Doc");
        let mut section = Section::new("sec-1", "Folded");
        section.collapsed = true;
        section.checklist.push(ChecklistItem::new("chk-1", "hidden"));
        document.sections.push(section);

        let mut ids = SequentialIdGenerator::new();
        let view = render(&mut document, &mut ids);

        let item = view.find_by_node_id("chk-1").unwrap();
        assert!(view.is_hidden(item));
        let section = view.sections()[0];
        let header = view.child_of_kind(section, ViewKind::SectionHeader).unwrap();
        assert_eq!(view.get(section).unwrap().rect.height, ROW_HEIGHT);
        assert_eq!(view.get(header).unwrap().rect.height, ROW_HEIGHT);
    }
}
