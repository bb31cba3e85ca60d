//! Editor controller owning one open document.
//!
//! # Responsibility
//! - Own the durable store, committed document, live view, drag gesture, and
//!   pending-save state of one editing session.
//! - Route commands and pointer gestures to the view and schedule saves.
//! - Run the load, commit, save, import, and export lifecycle.
//!
//! # Invariants
//! - The live view is the working copy; `document()` is the last commit.
//! - Every save commits the view first.
//! - A failed import changes nothing: document, view, and store stay as-is.
//! - Store failures are logged and never surface as fatal errors.

use crate::command::{self, Command, CommandError, CommandOutcome};
use crate::config::EditorConfig;
use crate::debounce::Debouncer;
use crate::model::document::{Document, NodeId, Section};
use crate::model::ids::IdGenerator;
use crate::persistence::gateway::{self, ExportFile, ImportError};
use crate::persistence::store::{DocumentStore, StoreResult};
use crate::progress;
use crate::reorder::{DragState, DropOutcome, DropTarget, ReorderEngine};
use crate::view::collect::collect;
use crate::view::render::render;
use crate::view::{DragKind, ViewNodeId, ViewTree};
use log::{info, warn};

/// One editing session over a document persisted in `S`.
pub struct Editor<S: DocumentStore> {
    config: EditorConfig,
    store: S,
    ids: Box<dyn IdGenerator>,
    document: Document,
    view: ViewTree,
    reorder: ReorderEngine,
    saves: Debouncer,
}

impl<S: DocumentStore> Editor<S> {
    /// Loads the stored document and renders it.
    ///
    /// When the loaded document has no sections, one default section is
    /// added and the result is saved immediately.
    pub fn bootstrap(store: S, config: EditorConfig, ids: Box<dyn IdGenerator>) -> Self {
        let document = gateway::load(&store, &config);
        let saves = Debouncer::new(config.save_quiet_window_ms);
        let mut editor = Self {
            config,
            store,
            ids,
            document,
            view: ViewTree::new(),
            reorder: ReorderEngine::new(),
            saves,
        };

        let seeded = editor.document.sections.is_empty();
        if seeded {
            let title = editor.config.default_section_title.clone();
            editor
                .document
                .sections
                .push(Section::new(NodeId::new(), title));
        }
        editor.view = render(&mut editor.document, editor.ids.as_mut());
        if seeded {
            let _ = editor.save_committed();
        }

        info!(
            "event=editor_bootstrap module=editor status=ok seeded={} sections={}",
            seeded,
            editor.document.sections.len()
        );
        editor
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Last committed document.
    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Live view tree.
    pub fn view(&self) -> &ViewTree {
        &self.view
    }

    pub fn drag_state(&self) -> DragState {
        self.reorder.state()
    }

    pub fn is_save_pending(&self) -> bool {
        self.saves.is_pending()
    }

    /// Applies a command at logical time `now_ms`.
    ///
    /// On success the view is relaid out, progress is refreshed when the
    /// command can affect it, and a debounced save is requested.
    pub fn dispatch(
        &mut self,
        command: Command,
        now_ms: u64,
    ) -> Result<CommandOutcome, CommandError> {
        let outcome = match command::apply(&mut self.view, &command, self.ids.as_mut(), &self.config)
        {
            Ok(outcome) => outcome,
            Err(err) => {
                warn!(
                    "event=command module=editor status=error name={} error={err}",
                    command.name()
                );
                return Err(err);
            }
        };

        if outcome.changed {
            if command.affects_progress() {
                progress::refresh_all(&mut self.view);
            }
            self.view.relayout();
            self.saves.request(now_ms);
        }
        info!(
            "event=command module=editor status=ok name={} changed={}",
            command.name(),
            outcome.changed
        );
        Ok(outcome)
    }

    /// Begins a drag gesture over `target`.
    pub fn drag_start(&mut self, target: ViewNodeId) -> Option<DragKind> {
        self.reorder.start(&self.view, target)
    }

    /// Drop target a release at `(target, y)` would use, if any.
    pub fn drag_over(&self, target: ViewNodeId, y: f32) -> Option<DropTarget> {
        self.reorder.hover(&self.view, target, y)
    }

    /// Releases the gesture at `(target, y)`.
    ///
    /// Accepted drops request a debounced save; item drops also refresh
    /// progress right away.
    pub fn drop(&mut self, target: ViewNodeId, y: f32, now_ms: u64) -> DropOutcome {
        let outcome = self.reorder.drop(&mut self.view, target, y);
        if let DropOutcome::Moved { kind, .. } = outcome {
            if kind == DragKind::ChecklistItem {
                progress::refresh_all(&mut self.view);
            }
            self.view.relayout();
            self.saves.request(now_ms);
        }
        outcome
    }

    /// Cancels the gesture without moving anything.
    pub fn drag_end(&mut self) {
        self.reorder.end();
    }

    /// Advances the logical clock; saves when the quiet window has passed.
    ///
    /// Returns whether a save was attempted.
    pub fn tick(&mut self, now_ms: u64) -> bool {
        if !self.saves.poll(now_ms) {
            return false;
        }
        let _ = self.save_now();
        true
    }

    /// Runs any pending save immediately.
    pub fn flush(&mut self) -> bool {
        if !self.saves.take_pending() {
            return false;
        }
        let _ = self.save_now();
        true
    }

    /// Rebuilds the committed document from the live view.
    pub fn commit(&mut self) -> &Document {
        self.document = collect(&mut self.view, self.ids.as_mut());
        &self.document
    }

    /// Commits and writes the document to the store.
    pub fn save_now(&mut self) -> StoreResult<()> {
        self.commit();
        self.save_committed()
    }

    /// Commits and builds the export payload.
    pub fn export(&mut self) -> serde_json::Result<ExportFile> {
        self.commit();
        let file = gateway::export_file(&self.document, &self.config.export_fallback_stem)?;
        info!(
            "event=doc_export module=editor status=ok bytes={} sections={}",
            file.contents.len(),
            self.document.sections.len()
        );
        Ok(file)
    }

    /// Replaces the whole document with imported bytes and saves at once.
    ///
    /// # Errors
    /// - `ImportError` when the bytes are not UTF-8 JSON; nothing changes.
    pub fn import(&mut self, bytes: &[u8]) -> Result<(), ImportError> {
        let mut document = match gateway::parse_import(bytes) {
            Ok(document) => document,
            Err(err) => {
                warn!(
                    "event=doc_import module=editor status=error bytes={} error={err}",
                    bytes.len()
                );
                return Err(err);
            }
        };

        self.reorder.end();
        self.saves.take_pending();
        self.view = render(&mut document, self.ids.as_mut());
        self.document = document;
        info!(
            "event=doc_import module=editor status=ok bytes={} sections={} items={}",
            bytes.len(),
            self.document.sections.len(),
            self.document.item_count()
        );
        let _ = self.save_committed();
        Ok(())
    }

    fn save_committed(&self) -> StoreResult<()> {
        gateway::save(&self.store, &self.config.storage_key, &self.document)
    }
}
