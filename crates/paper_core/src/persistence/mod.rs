//! Durable storage and file interchange for documents.
//!
//! # Responsibility
//! - Define the key/value store seam and its SQLite-backed implementation.
//! - Serialize documents for the store and for export files.
//! - Parse imported bytes into documents.
//!
//! # Invariants
//! - Store failures never propagate past the gateway; they are logged.
//! - Import parse failures are returned to the caller untouched.

pub mod gateway;
pub mod store;

pub use gateway::{export_file, load, parse_import, sanitize_file_stem, save, ExportFile, ImportError};
pub use store::{DocumentStore, MemoryStore, SqliteDocumentStore, StoreError, StoreResult};
