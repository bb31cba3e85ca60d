//! Load, save, export, and import of whole documents.
//!
//! # Responsibility
//! - Map store contents to documents and back.
//! - Build export files and parse import payloads.
//!
//! # Invariants
//! - `load` never fails; unreadable or corrupt state yields the default.
//! - Stored and exported JSON is pretty-printed with two-space indentation.
//! - Only ids, counts, sizes, durations, and statuses are logged.

use crate::config::EditorConfig;
use crate::model::document::Document;
use crate::persistence::store::{DocumentStore, StoreError, StoreResult};
use log::{error, info, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

static ILLEGAL_FILE_NAME_CHARS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"[\\/:*?"<>|\x00-\x1f\x7f]"#).expect("file name pattern must compile")
});

/// Error returned when imported bytes are not a JSON document.
#[derive(Debug)]
pub enum ImportError {
    InvalidUtf8(std::str::Utf8Error),
    InvalidJson(serde_json::Error),
}

impl Display for ImportError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidUtf8(err) => write!(f, "import file is not valid UTF-8: {err}"),
            Self::InvalidJson(err) => write!(f, "import file is not valid JSON: {err}"),
        }
    }
}

impl Error for ImportError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidUtf8(err) => Some(err),
            Self::InvalidJson(err) => Some(err),
        }
    }
}

impl From<std::str::Utf8Error> for ImportError {
    fn from(value: std::str::Utf8Error) -> Self {
        Self::InvalidUtf8(value)
    }
}

impl From<serde_json::Error> for ImportError {
    fn from(value: serde_json::Error) -> Self {
        Self::InvalidJson(value)
    }
}

/// Downloadable document payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportFile {
    pub file_name: String,
    pub contents: String,
}

/// Loads the document stored under `config.storage_key`.
///
/// Falls back to an empty document titled with the configured default when
/// the key is absent, unreadable, or not JSON. The fallback has no sections;
/// seeding the first section is up to the caller.
pub fn load(store: &dyn DocumentStore, config: &EditorConfig) -> Document {
    let started_at = Instant::now();
    let key = config.storage_key.as_str();
    let fallback = || Document::new(config.default_document_title.clone());

    let raw = match store.read(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => {
            info!("event=doc_load module=persistence status=ok source=default reason=missing key={key}");
            return fallback();
        }
        Err(err) => {
            error!("event=doc_load module=persistence status=error key={key} error={err}");
            return fallback();
        }
    };

    match serde_json::from_str::<Value>(&raw) {
        Ok(value) => {
            let document = Document::from_json_value(&value);
            info!(
                "event=doc_load module=persistence status=ok source=store key={key} bytes={} sections={} items={} duration_ms={}",
                raw.len(),
                document.sections.len(),
                document.item_count(),
                started_at.elapsed().as_millis()
            );
            document
        }
        Err(err) => {
            warn!(
                "event=doc_load module=persistence status=error key={key} bytes={} error_code=corrupt_json error={err}",
                raw.len()
            );
            fallback()
        }
    }
}

/// Writes `document` under `key` as pretty JSON.
///
/// # Side effects
/// - Emits `doc_save` logging events; failures are logged and returned.
pub fn save(store: &dyn DocumentStore, key: &str, document: &Document) -> StoreResult<()> {
    let started_at = Instant::now();
    let result = to_pretty_json(document)
        .map_err(StoreError::from)
        .and_then(|json| store.write(key, &json).map(|()| json.len()));

    match result {
        Ok(bytes) => {
            info!(
                "event=doc_save module=persistence status=ok key={key} bytes={bytes} sections={} duration_ms={}",
                document.sections.len(),
                started_at.elapsed().as_millis()
            );
            Ok(())
        }
        Err(err) => {
            error!(
                "event=doc_save module=persistence status=error key={key} duration_ms={} error={err}",
                started_at.elapsed().as_millis()
            );
            Err(err)
        }
    }
}

/// Builds the export payload named after the document title.
pub fn export_file(document: &Document, fallback_stem: &str) -> serde_json::Result<ExportFile> {
    let contents = to_pretty_json(document)?;
    let stem = match document.title.trim() {
        "" => fallback_stem,
        title => title,
    };
    Ok(ExportFile {
        file_name: format!("{}.json", sanitize_file_stem(stem)),
        contents,
    })
}

/// Parses imported bytes into a document, coercing malformed fields.
///
/// # Errors
/// - `InvalidUtf8` / `InvalidJson` when the payload cannot be read at all.
pub fn parse_import(bytes: &[u8]) -> Result<Document, ImportError> {
    let text = std::str::from_utf8(bytes)?;
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let value = serde_json::from_str::<Value>(text)?;
    Ok(Document::from_json_value(&value))
}

/// Replaces characters that are illegal in file names with `_`.
pub fn sanitize_file_stem(stem: &str) -> String {
    ILLEGAL_FILE_NAME_CHARS.replace_all(stem, "_").into_owned()
}

fn to_pretty_json(document: &Document) -> serde_json::Result<String> {
    serde_json::to_string_pretty(document)
}
