//! Drag-and-drop reorder engine.
//!
//! # Responsibility
//! - Track the drag gesture state machine (idle / dragging).
//! - Resolve a pointer position into a drop target under containment rules.
//! - Move the dragged view subtree to the resolved position.
//!
//! # Invariants
//! - Hover acceptance and drop placement use the same resolver.
//! - Sections reorder only among themselves; subsections only within their
//!   own section; checklist items may enter any visible checklist.
//! - Section and subsection drops resolve against the nearest tagged node,
//!   which must carry the dragged kind.
//! - `y >= midpoint` places after the target, `y < midpoint` before it.
//! - Dropping onto the dragged node itself is a no-op.

use crate::view::{DragKind, ViewKind, ViewNodeId, ViewTree};
use log::debug;

/// Gesture state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DragState {
    #[default]
    Idle,
    Dragging {
        kind: DragKind,
        source: ViewNodeId,
    },
}

/// Where the dragged node lands relative to its new siblings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    Before(ViewNodeId),
    After(ViewNodeId),
    /// End of an empty or non-item area of a checklist.
    Append,
}

/// Resolved drop position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DropTarget {
    /// Sibling container receiving the dragged node.
    pub container: ViewNodeId,
    pub placement: Placement,
}

/// Result of a drop gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropOutcome {
    /// The tree changed; `kind` tells which sibling group moved.
    Moved { kind: DragKind, target: DropTarget },
    /// Position failed containment or pointed at the source itself.
    Rejected,
    /// No gesture was in progress.
    NotDragging,
}

/// Drag gesture tracker.
#[derive(Debug, Default)]
pub struct ReorderEngine {
    state: DragState,
}

impl ReorderEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> DragState {
        self.state
    }

    /// Starts a gesture on the nearest draggable ancestor-or-self of `target`.
    ///
    /// Returns the fixed drag kind, or `None` when nothing there is draggable.
    pub fn start(&mut self, view: &ViewTree, target: ViewNodeId) -> Option<DragKind> {
        let (source, kind) = view.closest_draggable(target)?;
        self.state = DragState::Dragging { kind, source };
        debug!(
            "event=drag_start module=reorder status=ok kind={:?} source={}",
            kind, source
        );
        Some(kind)
    }

    /// Returns the drop target a drop at this position would use.
    ///
    /// `None` means the drop indicator is suppressed.
    pub fn hover(&self, view: &ViewTree, target: ViewNodeId, y: f32) -> Option<DropTarget> {
        match self.state {
            DragState::Idle => None,
            DragState::Dragging { kind, source } => resolve_drop(view, kind, source, target, y),
        }
    }

    /// Drops at the position and ends the gesture.
    pub fn drop(&mut self, view: &mut ViewTree, target: ViewNodeId, y: f32) -> DropOutcome {
        let DragState::Dragging { kind, source } = self.state else {
            return DropOutcome::NotDragging;
        };
        self.end();

        let Some(drop_target) = resolve_drop(view, kind, source, target, y) else {
            debug!(
                "event=drop module=reorder status=rejected kind={:?} source={} target={}",
                kind, source, target
            );
            return DropOutcome::Rejected;
        };
        move_node(view, source, drop_target);
        debug!(
            "event=drop module=reorder status=ok kind={:?} source={} container={}",
            kind, source, drop_target.container
        );
        DropOutcome::Moved {
            kind,
            target: drop_target,
        }
    }

    /// Cancels or finishes the gesture.
    pub fn end(&mut self) {
        self.state = DragState::Idle;
    }
}

/// Resolves a pointer position over `target` into a drop target for `source`.
pub fn resolve_drop(
    view: &ViewTree,
    kind: DragKind,
    source: ViewNodeId,
    target: ViewNodeId,
    y: f32,
) -> Option<DropTarget> {
    if !view.contains(source) || !view.contains(target) || view.is_hidden(target) {
        return None;
    }

    match kind {
        DragKind::Section | DragKind::Subsection => resolve_sibling(view, kind, source, target, y),
        DragKind::ChecklistItem => resolve_item(view, source, target, y),
    }
}

/// Section and subsection rule: the nearest tagged node must carry the
/// dragged kind and share the source's parent; target != source.
fn resolve_sibling(
    view: &ViewTree,
    kind: DragKind,
    source: ViewNodeId,
    target: ViewNodeId,
    y: f32,
) -> Option<DropTarget> {
    let (over, over_kind) = view.closest_draggable(target)?;
    if over_kind != kind || over == source {
        return None;
    }
    let container = view.parent(over)?;
    if view.parent(source) != Some(container) {
        return None;
    }
    Some(DropTarget {
        container,
        placement: placement_by_midpoint(view, over, y)?,
    })
}

fn resolve_item(
    view: &ViewTree,
    source: ViewNodeId,
    target: ViewNodeId,
    y: f32,
) -> Option<DropTarget> {
    if let Some(over) = view.closest(target, ViewKind::ChecklistItem) {
        if over == source {
            return None;
        }
        return Some(DropTarget {
            container: view.parent(over)?,
            placement: placement_by_midpoint(view, over, y)?,
        });
    }

    let list = closest_checklist(view, target)?;
    Some(DropTarget {
        container: list,
        placement: Placement::Append,
    })
}

fn placement_by_midpoint(view: &ViewTree, over: ViewNodeId, y: f32) -> Option<Placement> {
    let rect = view.get(over)?.rect;
    if y >= rect.midpoint() {
        Some(Placement::After(over))
    } else {
        Some(Placement::Before(over))
    }
}

fn closest_checklist(view: &ViewTree, target: ViewNodeId) -> Option<ViewNodeId> {
    let mut cursor = Some(target);
    while let Some(current) = cursor {
        if matches!(view.kind(current), Some(ViewKind::Checklist(_))) {
            return Some(current);
        }
        cursor = view.parent(current);
    }
    None
}

fn move_node(view: &mut ViewTree, source: ViewNodeId, target: DropTarget) {
    view.detach(source);
    match target.placement {
        Placement::Append => view.append_child(target.container, source),
        Placement::Before(anchor) | Placement::After(anchor) => {
            let Some(index) = view.index_in_parent(anchor) else {
                view.append_child(target.container, source);
                return;
            };
            let index = match target.placement {
                Placement::After(_) => index + 1,
                _ => index,
            };
            view.insert_child(target.container, index, source);
        }
    }
}
