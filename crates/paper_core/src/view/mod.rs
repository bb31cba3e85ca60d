//! Live view tree of an outline document.
//!
//! # Responsibility
//! - Hold the interactive projection the user manipulates between commits.
//! - Provide structural edits (append, insert, detach, remove) over an arena.
//! - Compute the vertical layout used for pointer hit testing.
//!
//! # Invariants
//! - Node handles stay valid until their subtree is removed.
//! - A node has at most one parent and appears once in its parent's children.
//! - The page root, page title, and section list always exist.

pub mod collect;
pub mod render;

use crate::progress::ProgressBand;
use std::fmt::{Display, Formatter};

/// Height of one laid-out text row.
pub const ROW_HEIGHT: f32 = 24.0;

/// Handle of one node inside a [`ViewTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ViewNodeId(usize);

impl Display for ViewNodeId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Which checklist a list node renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChecklistScope {
    /// Checklist directly under a section.
    Section,
    /// Checklist of one subsection.
    Subsection,
}

/// Kind tag carried by draggable view nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragKind {
    Section,
    Subsection,
    ChecklistItem,
}

/// Structural role of one view node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewKind {
    Page,
    PageTitle,
    SectionList,
    Section,
    SectionHeader,
    SectionTitle,
    FoldToggle,
    SectionBody,
    Progress,
    SectionText,
    Checklist(ChecklistScope),
    SubsectionList,
    Subsection,
    SubsectionTitle,
    SubsectionText,
    ChecklistItem,
    ItemText,
}

impl ViewKind {
    /// Returns whether users type into nodes of this kind.
    pub fn is_editable(self) -> bool {
        matches!(
            self,
            Self::PageTitle
                | Self::SectionTitle
                | Self::SectionText
                | Self::SubsectionTitle
                | Self::SubsectionText
                | Self::ItemText
        )
    }

    /// Drag tag for sources and drop targets.
    pub fn drag_kind(self) -> Option<DragKind> {
        match self {
            Self::Section => Some(DragKind::Section),
            Self::Subsection => Some(DragKind::Subsection),
            Self::ChecklistItem => Some(DragKind::ChecklistItem),
            _ => None,
        }
    }

    fn is_inline_row(self) -> bool {
        matches!(self, Self::SectionHeader)
    }
}

/// Vertical placement of one node.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub top: f32,
    pub height: f32,
}

impl Rect {
    /// Vertical midpoint used for before/after placement.
    pub fn midpoint(&self) -> f32 {
        self.top + self.height / 2.0
    }

    pub fn contains(&self, y: f32) -> bool {
        y >= self.top && y < self.top + self.height
    }
}

/// Progress indicator state of one section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressState {
    pub percent: u8,
    pub band: ProgressBand,
}

/// One node of the view tree.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewNode {
    pub kind: ViewKind,
    parent: Option<ViewNodeId>,
    children: Vec<ViewNodeId>,
    /// Model id attribute for sections, subsections, and checklist items.
    pub node_id: Option<String>,
    /// Editable content, or the label of non-editable controls.
    pub text: String,
    /// Presentation hint shown while `text` is empty; never collected.
    pub placeholder: Option<&'static str>,
    pub checked: bool,
    pub collapsed: bool,
    pub progress: Option<ProgressState>,
    pub rect: Rect,
    pub hidden: bool,
}

impl ViewNode {
    fn new(kind: ViewKind) -> Self {
        Self {
            kind,
            parent: None,
            children: Vec::new(),
            node_id: None,
            text: String::new(),
            placeholder: None,
            checked: false,
            collapsed: false,
            progress: None,
            rect: Rect::default(),
            hidden: false,
        }
    }

    pub fn parent(&self) -> Option<ViewNodeId> {
        self.parent
    }

    pub fn children(&self) -> &[ViewNodeId] {
        &self.children
    }
}

/// Arena-backed view tree rooted at the page node.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewTree {
    nodes: Vec<Option<ViewNode>>,
    page_title: ViewNodeId,
    section_list: ViewNodeId,
}

impl Default for ViewTree {
    fn default() -> Self {
        Self::new()
    }
}

impl ViewTree {
    /// Creates a page with an empty title and no sections.
    pub fn new() -> Self {
        let mut tree = Self {
            nodes: vec![Some(ViewNode::new(ViewKind::Page))],
            page_title: ViewNodeId(0),
            section_list: ViewNodeId(0),
        };
        let page_title = tree.create(ViewKind::PageTitle);
        let section_list = tree.create(ViewKind::SectionList);
        tree.attach(tree.root(), page_title, None);
        tree.attach(tree.root(), section_list, None);
        tree.page_title = page_title;
        tree.section_list = section_list;
        tree
    }

    pub fn root(&self) -> ViewNodeId {
        ViewNodeId(0)
    }

    pub fn page_title(&self) -> ViewNodeId {
        self.page_title
    }

    pub fn section_list(&self) -> ViewNodeId {
        self.section_list
    }

    /// Section nodes in display order.
    pub fn sections(&self) -> &[ViewNodeId] {
        self.children(self.section_list)
    }

    pub fn get(&self, id: ViewNodeId) -> Option<&ViewNode> {
        self.nodes.get(id.0).and_then(Option::as_ref)
    }

    pub fn get_mut(&mut self, id: ViewNodeId) -> Option<&mut ViewNode> {
        self.nodes.get_mut(id.0).and_then(Option::as_mut)
    }

    pub fn contains(&self, id: ViewNodeId) -> bool {
        self.get(id).is_some()
    }

    pub fn kind(&self, id: ViewNodeId) -> Option<ViewKind> {
        self.get(id).map(|node| node.kind)
    }

    pub fn parent(&self, id: ViewNodeId) -> Option<ViewNodeId> {
        self.get(id).and_then(ViewNode::parent)
    }

    /// Children of `id`; empty for unknown handles.
    pub fn children(&self, id: ViewNodeId) -> &[ViewNodeId] {
        self.get(id).map(ViewNode::children).unwrap_or(&[])
    }

    /// Position of `id` among its parent's children.
    pub fn index_in_parent(&self, id: ViewNodeId) -> Option<usize> {
        let parent = self.parent(id)?;
        self.children(parent).iter().position(|child| *child == id)
    }

    /// Allocates a detached node.
    pub fn create(&mut self, kind: ViewKind) -> ViewNodeId {
        self.nodes.push(Some(ViewNode::new(kind)));
        ViewNodeId(self.nodes.len() - 1)
    }

    /// Appends `child` as the last child of `parent`, detaching it first.
    pub fn append_child(&mut self, parent: ViewNodeId, child: ViewNodeId) {
        self.detach(child);
        self.attach(parent, child, None);
    }

    /// Inserts `child` under `parent` at `index` (clamped), detaching it first.
    pub fn insert_child(&mut self, parent: ViewNodeId, index: usize, child: ViewNodeId) {
        self.detach(child);
        self.attach(parent, child, Some(index));
    }

    /// Unlinks `id` from its parent; the subtree stays allocated.
    pub fn detach(&mut self, id: ViewNodeId) {
        let Some(parent) = self.parent(id) else {
            return;
        };
        if let Some(parent_node) = self.get_mut(parent) {
            parent_node.children.retain(|child| *child != id);
        }
        if let Some(node) = self.get_mut(id) {
            node.parent = None;
        }
    }

    /// Detaches and frees `id` with everything it contains.
    ///
    /// The page root and its fixed children cannot be removed. Freed slots
    /// are never reused, so a stale handle cannot alias a newer node; the
    /// arena is only compacted by rendering a fresh tree.
    pub fn remove(&mut self, id: ViewNodeId) {
        if id == self.root() || id == self.page_title || id == self.section_list {
            return;
        }
        self.detach(id);
        for node in self.descendants(id) {
            if let Some(slot) = self.nodes.get_mut(node.0) {
                *slot = None;
            }
        }
    }

    /// `id` and all of its descendants in document order.
    pub fn descendants(&self, id: ViewNodeId) -> Vec<ViewNodeId> {
        let mut out = Vec::new();
        if !self.contains(id) {
            return out;
        }
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            out.push(current);
            for child in self.children(current).iter().rev() {
                stack.push(*child);
            }
        }
        out
    }

    /// Nearest ancestor-or-self of `id` with the given kind.
    pub fn closest(&self, id: ViewNodeId, kind: ViewKind) -> Option<ViewNodeId> {
        let mut cursor = Some(id).filter(|id| self.contains(*id));
        while let Some(current) = cursor {
            if self.kind(current) == Some(kind) {
                return Some(current);
            }
            cursor = self.parent(current);
        }
        None
    }

    /// Nearest ancestor-or-self carrying any drag tag.
    pub fn closest_draggable(&self, id: ViewNodeId) -> Option<(ViewNodeId, DragKind)> {
        let mut cursor = Some(id).filter(|id| self.contains(*id));
        while let Some(current) = cursor {
            if let Some(kind) = self.kind(current).and_then(ViewKind::drag_kind) {
                return Some((current, kind));
            }
            cursor = self.parent(current);
        }
        None
    }

    /// First direct child of `id` with the given kind.
    pub fn child_of_kind(&self, id: ViewNodeId, kind: ViewKind) -> Option<ViewNodeId> {
        self.children(id)
            .iter()
            .copied()
            .find(|child| self.kind(*child) == Some(kind))
    }

    /// First descendant of `id` (excluding `id`) with the given kind.
    pub fn find_descendant(&self, id: ViewNodeId, kind: ViewKind) -> Option<ViewNodeId> {
        self.descendants(id)
            .into_iter()
            .skip(1)
            .find(|node| self.kind(*node) == Some(kind))
    }

    /// Returns whether `id` is laid out inside a collapsed section body.
    pub fn is_hidden(&self, id: ViewNodeId) -> bool {
        self.get(id).map_or(true, |node| node.hidden)
    }

    /// Model id attribute of `id`, if any.
    pub fn node_id(&self, id: ViewNodeId) -> Option<&str> {
        self.get(id).and_then(|node| node.node_id.as_deref())
    }

    /// Finds the view node carrying the given model id attribute.
    pub fn find_by_node_id(&self, node_id: &str) -> Option<ViewNodeId> {
        self.descendants(self.root())
            .into_iter()
            .find(|id| self.node_id(*id) == Some(node_id))
    }

    /// Recomputes every node's vertical placement and visibility.
    pub fn relayout(&mut self) {
        self.layout_node(self.root(), 0.0, false);
    }

    /// Deepest visible node whose box contains `y`.
    pub fn hit_test(&self, y: f32) -> Option<ViewNodeId> {
        let mut cursor = self.root();
        if !self.get(cursor)?.rect.contains(y) {
            return None;
        }
        'descend: loop {
            for child in self.children(cursor) {
                let Some(node) = self.get(*child) else {
                    continue;
                };
                if !node.hidden && node.rect.contains(y) {
                    cursor = *child;
                    continue 'descend;
                }
            }
            return Some(cursor);
        }
    }

    fn attach(&mut self, parent: ViewNodeId, child: ViewNodeId, index: Option<usize>) {
        if !self.contains(child) {
            return;
        }
        let Some(parent_node) = self.get_mut(parent) else {
            return;
        };
        let at = index
            .unwrap_or(parent_node.children.len())
            .min(parent_node.children.len());
        parent_node.children.insert(at, child);
        if let Some(node) = self.get_mut(child) {
            node.parent = Some(parent);
        }
    }

    fn layout_node(&mut self, id: ViewNodeId, top: f32, hidden: bool) -> f32 {
        let Some(node) = self.get(id) else {
            return 0.0;
        };
        let kind = node.kind;
        let children = node.children.clone();
        let own_rows = text_rows(node);
        let hides_children = kind == ViewKind::SectionBody
            && node
                .parent
                .and_then(|parent| self.get(parent))
                .is_some_and(|section| section.collapsed);
        let children_hidden = hidden || hides_children;

        let height = if children.is_empty() {
            match kind {
                ViewKind::Checklist(_) => ROW_HEIGHT,
                ViewKind::SectionList | ViewKind::SubsectionList | ViewKind::Page => 0.0,
                _ => own_rows as f32 * ROW_HEIGHT,
            }
        } else if kind.is_inline_row() {
            children
                .iter()
                .map(|child| self.layout_node(*child, top, children_hidden))
                .fold(0.0, f32::max)
        } else {
            let mut cursor = top;
            for child in &children {
                cursor += self.layout_node(*child, cursor, children_hidden);
            }
            cursor - top
        };

        let height = if hidden { 0.0 } else { height };
        if let Some(node) = self.get_mut(id) {
            node.rect = Rect { top, height };
            node.hidden = hidden;
        }
        height
    }
}

fn text_rows(node: &ViewNode) -> usize {
    node.text.lines().count().max(1)
}
