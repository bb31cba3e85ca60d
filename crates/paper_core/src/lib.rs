//! Core logic for the interactive paper outline editor.
//! This crate owns the document model and every editing invariant.

pub mod command;
pub mod config;
pub mod db;
pub mod debounce;
pub mod editor;
pub mod logging;
pub mod model;
pub mod persistence;
pub mod progress;
pub mod reorder;
pub mod view;

pub use command::{Command, CommandError, CommandOutcome};
pub use config::EditorConfig;
pub use db::{open_db, open_db_in_memory, DbError, DbResult};
pub use editor::Editor;
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::document::{ChecklistItem, Document, NodeId, Section, Subsection, SCHEMA_VERSION};
pub use model::ids::{IdGenerator, IdKind, RandomIdGenerator, SequentialIdGenerator};
pub use persistence::{
    DocumentStore, ExportFile, ImportError, MemoryStore, SqliteDocumentStore, StoreError,
    StoreResult,
};
pub use progress::{compute_progress, ProgressBand};
pub use reorder::{DragState, DropOutcome, DropTarget, Placement, ReorderEngine};
pub use view::{ChecklistScope, DragKind, ViewKind, ViewNodeId, ViewTree};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
