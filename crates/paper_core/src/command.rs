//! Mutation commands over the live view tree.
//!
//! # Responsibility
//! - Define one tagged variant per user action.
//! - Resolve each command's target from any node inside it.
//! - Apply structural edits directly to the view tree.
//!
//! # Invariants
//! - A rejected command leaves the tree unchanged.
//! - New nodes receive fresh ids from the session generator.
//! - Section moves never leave the section list.

use crate::config::EditorConfig;
use crate::model::document::{ChecklistItem, Section, Subsection};
use crate::model::ids::{IdGenerator, IdKind};
use crate::view::render::{fold_label, render_item, render_section, render_subsection, IdBackfill};
use crate::view::{ChecklistScope, ViewKind, ViewNodeId, ViewTree};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// One user action against the view tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Append a default-titled, expanded section at the end.
    AddSection,
    /// Append a subsection to the section containing the node.
    AddSubsection { section: ViewNodeId },
    /// Append an empty, unchecked item to the checklist of the given scope.
    AddChecklistItem {
        container: ViewNodeId,
        scope: ChecklistScope,
    },
    DeleteSection { section: ViewNodeId },
    DeleteSubsection { subsection: ViewNodeId },
    DeleteItem { item: ViewNodeId },
    /// Flip the collapsed state of the section containing the node.
    ToggleFold { section: ViewNodeId },
    MoveSectionUp { section: ViewNodeId },
    MoveSectionDown { section: ViewNodeId },
    /// Replace the content of one editable field.
    EditText { node: ViewNodeId, text: String },
    /// Set the checkbox of the item containing the node.
    SetChecked { item: ViewNodeId, checked: bool },
}

impl Command {
    /// Stable command name used in log events.
    pub fn name(&self) -> &'static str {
        match self {
            Self::AddSection => "add_section",
            Self::AddSubsection { .. } => "add_subsection",
            Self::AddChecklistItem { .. } => "add_checklist_item",
            Self::DeleteSection { .. } => "delete_section",
            Self::DeleteSubsection { .. } => "delete_subsection",
            Self::DeleteItem { .. } => "delete_item",
            Self::ToggleFold { .. } => "toggle_fold",
            Self::MoveSectionUp { .. } => "move_section_up",
            Self::MoveSectionDown { .. } => "move_section_down",
            Self::EditText { .. } => "edit_text",
            Self::SetChecked { .. } => "set_checked",
        }
    }

    /// Returns whether the command can change checkbox state or membership.
    pub fn affects_progress(&self) -> bool {
        !matches!(
            self,
            Self::ToggleFold { .. }
                | Self::MoveSectionUp { .. }
                | Self::MoveSectionDown { .. }
                | Self::EditText { .. }
        )
    }
}

/// Errors from command target resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// Handle does not refer to a live view node.
    NodeNotFound(ViewNodeId),
    /// Node is not inside a target of the required kind.
    NoEnclosing {
        node: ViewNodeId,
        expected: &'static str,
    },
    /// Node exists but cannot hold typed text.
    NotEditable(ViewNodeId),
}

impl Display for CommandError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NodeNotFound(node) => write!(f, "view node not found: {node}"),
            Self::NoEnclosing { node, expected } => {
                write!(f, "view node {node} is not inside a {expected}")
            }
            Self::NotEditable(node) => write!(f, "view node is not editable: {node}"),
        }
    }
}

impl Error for CommandError {}

/// What a successfully applied command did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandOutcome {
    /// Node created by an add command.
    pub created: Option<ViewNodeId>,
    /// `false` for moves at either end of the list.
    pub changed: bool,
}

impl CommandOutcome {
    fn changed() -> Self {
        Self {
            created: None,
            changed: true,
        }
    }

    fn created(node: ViewNodeId) -> Self {
        Self {
            created: Some(node),
            changed: true,
        }
    }

    fn unchanged() -> Self {
        Self {
            created: None,
            changed: false,
        }
    }
}

/// Applies `command` to `view`.
///
/// Does not relayout or recompute progress; the caller does both.
pub fn apply(
    view: &mut ViewTree,
    command: &Command,
    ids: &mut dyn IdGenerator,
    config: &EditorConfig,
) -> Result<CommandOutcome, CommandError> {
    match command {
        Command::AddSection => Ok(add_section(view, ids, config)),
        Command::AddSubsection { section } => add_subsection(view, *section, ids, config),
        Command::AddChecklistItem { container, scope } => {
            add_checklist_item(view, *container, *scope, ids)
        }
        Command::DeleteSection { section } => {
            delete_enclosing(view, *section, ViewKind::Section, "section")
        }
        Command::DeleteSubsection { subsection } => {
            delete_enclosing(view, *subsection, ViewKind::Subsection, "subsection")
        }
        Command::DeleteItem { item } => {
            delete_enclosing(view, *item, ViewKind::ChecklistItem, "checklist item")
        }
        Command::ToggleFold { section } => toggle_fold(view, *section),
        Command::MoveSectionUp { section } => move_section(view, *section, MoveDirection::Up),
        Command::MoveSectionDown { section } => {
            move_section(view, *section, MoveDirection::Down)
        }
        Command::EditText { node, text } => edit_text(view, *node, text),
        Command::SetChecked { item, checked } => set_checked(view, *item, *checked),
    }
}

fn add_section(
    view: &mut ViewTree,
    ids: &mut dyn IdGenerator,
    config: &EditorConfig,
) -> CommandOutcome {
    let mut section = Section::new(
        ids.next_id(IdKind::Section),
        config.default_section_title.clone(),
    );
    let node = render_section(view, &mut section, &mut IdBackfill::new(ids));
    let list = view.section_list();
    view.append_child(list, node);
    CommandOutcome::created(node)
}

fn add_subsection(
    view: &mut ViewTree,
    target: ViewNodeId,
    ids: &mut dyn IdGenerator,
    config: &EditorConfig,
) -> Result<CommandOutcome, CommandError> {
    let section = enclosing(view, target, ViewKind::Section, "section")?;
    let list = view
        .find_descendant(section, ViewKind::SubsectionList)
        .ok_or(CommandError::NoEnclosing {
            node: target,
            expected: "section with a subsection list",
        })?;

    let mut subsection = Subsection::new(
        ids.next_id(IdKind::Subsection),
        config.default_subsection_title.clone(),
    );
    let node = render_subsection(view, &mut subsection, &mut IdBackfill::new(ids));
    view.append_child(list, node);
    Ok(CommandOutcome::created(node))
}

fn add_checklist_item(
    view: &mut ViewTree,
    target: ViewNodeId,
    scope: ChecklistScope,
    ids: &mut dyn IdGenerator,
) -> Result<CommandOutcome, CommandError> {
    let list = checklist_for_scope(view, target, scope)?;
    let mut item = ChecklistItem::new(ids.next_id(IdKind::ChecklistItem), "");
    let node = render_item(view, &mut item, &mut IdBackfill::new(ids));
    view.append_child(list, node);
    Ok(CommandOutcome::created(node))
}

/// Finds the checklist of `scope` owned by the section/subsection around `target`.
fn checklist_for_scope(
    view: &ViewTree,
    target: ViewNodeId,
    scope: ChecklistScope,
) -> Result<ViewNodeId, CommandError> {
    let checklist_kind = ViewKind::Checklist(scope);
    let list = match scope {
        ChecklistScope::Section => {
            let section = enclosing(view, target, ViewKind::Section, "section")?;
            view.child_of_kind(section, ViewKind::SectionBody)
                .and_then(|body| view.child_of_kind(body, checklist_kind))
        }
        ChecklistScope::Subsection => {
            let subsection = enclosing(view, target, ViewKind::Subsection, "subsection")?;
            view.child_of_kind(subsection, checklist_kind)
        }
    };
    list.ok_or(CommandError::NoEnclosing {
        node: target,
        expected: "checklist",
    })
}

fn delete_enclosing(
    view: &mut ViewTree,
    target: ViewNodeId,
    kind: ViewKind,
    expected: &'static str,
) -> Result<CommandOutcome, CommandError> {
    let node = enclosing(view, target, kind, expected)?;
    view.remove(node);
    Ok(CommandOutcome::changed())
}

fn toggle_fold(view: &mut ViewTree, target: ViewNodeId) -> Result<CommandOutcome, CommandError> {
    let section = enclosing(view, target, ViewKind::Section, "section")?;
    let collapsed = view.get(section).is_some_and(|node| !node.collapsed);
    if let Some(node) = view.get_mut(section) {
        node.collapsed = collapsed;
    }
    let toggle = view
        .child_of_kind(section, ViewKind::SectionHeader)
        .and_then(|header| view.child_of_kind(header, ViewKind::FoldToggle));
    if let Some(node) = toggle.and_then(|toggle| view.get_mut(toggle)) {
        node.text = fold_label(collapsed).to_string();
    }
    Ok(CommandOutcome::changed())
}

#[derive(Debug, Clone, Copy)]
enum MoveDirection {
    Up,
    Down,
}

fn move_section(
    view: &mut ViewTree,
    target: ViewNodeId,
    direction: MoveDirection,
) -> Result<CommandOutcome, CommandError> {
    let section = enclosing(view, target, ViewKind::Section, "section")?;
    let Some(index) = view.index_in_parent(section) else {
        return Ok(CommandOutcome::unchanged());
    };
    let count = view.sections().len();
    let destination = match direction {
        MoveDirection::Up if index > 0 => index - 1,
        MoveDirection::Down if index + 1 < count => index + 1,
        _ => return Ok(CommandOutcome::unchanged()),
    };
    let list = view.section_list();
    view.insert_child(list, destination, section);
    Ok(CommandOutcome::changed())
}

fn edit_text(
    view: &mut ViewTree,
    target: ViewNodeId,
    text: &str,
) -> Result<CommandOutcome, CommandError> {
    let node = view
        .get_mut(target)
        .ok_or(CommandError::NodeNotFound(target))?;
    if !node.kind.is_editable() {
        return Err(CommandError::NotEditable(target));
    }
    node.text = text.to_string();
    Ok(CommandOutcome::changed())
}

fn set_checked(
    view: &mut ViewTree,
    target: ViewNodeId,
    checked: bool,
) -> Result<CommandOutcome, CommandError> {
    let item = enclosing(view, target, ViewKind::ChecklistItem, "checklist item")?;
    if let Some(node) = view.get_mut(item) {
        node.checked = checked;
    }
    Ok(CommandOutcome::changed())
}

fn enclosing(
    view: &ViewTree,
    target: ViewNodeId,
    kind: ViewKind,
    expected: &'static str,
) -> Result<ViewNodeId, CommandError> {
    if !view.contains(target) {
        return Err(CommandError::NodeNotFound(target));
    }
    view.closest(target, kind).ok_or(CommandError::NoEnclosing {
        node: target,
        expected,
    })
}
