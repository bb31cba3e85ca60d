//! Editor configuration defaults.
//!
//! # Responsibility
//! - Centralize storage key, debounce window, and default labels.
//!
//! # Invariants
//! - `EditorConfig::default()` matches the persisted schemaVersion 3 layout.

/// Durable-store key holding the pretty-printed document JSON.
pub const STORAGE_KEY: &str = "interactivePaper_v3";
/// Quiet window in milliseconds before a requested save executes.
pub const SAVE_QUIET_WINDOW_MS: u64 = 300;
pub const DEFAULT_DOCUMENT_TITLE: &str = "Untitled";
pub const DEFAULT_SECTION_TITLE: &str = "New Section";
pub const DEFAULT_SUBSECTION_TITLE: &str = "Subsection";
/// File stem used for exports of untitled documents.
pub const EXPORT_FALLBACK_STEM: &str = "interactive-paper";

/// Runtime settings for one editor instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorConfig {
    pub storage_key: String,
    pub save_quiet_window_ms: u64,
    pub default_document_title: String,
    pub default_section_title: String,
    pub default_subsection_title: String,
    pub export_fallback_stem: String,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            storage_key: STORAGE_KEY.to_string(),
            save_quiet_window_ms: SAVE_QUIET_WINDOW_MS,
            default_document_title: DEFAULT_DOCUMENT_TITLE.to_string(),
            default_section_title: DEFAULT_SECTION_TITLE.to_string(),
            default_subsection_title: DEFAULT_SUBSECTION_TITLE.to_string(),
            export_fallback_stem: EXPORT_FALLBACK_STEM.to_string(),
        }
    }
}
