//! Outline document model and identity generation.
//!
//! # Responsibility
//! - Define the canonical Title → Section → Subsection → ChecklistItem tree.
//! - Coerce arbitrary JSON into a structurally valid document.
//! - Issue stable per-kind node identifiers.
//!
//! # Invariants
//! - Sibling order in every sequence is the display and storage order.
//! - Ids are unique within one document once rendered.

pub mod document;
pub mod ids;
