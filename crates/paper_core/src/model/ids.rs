//! Node identifier generation.
//!
//! # Responsibility
//! - Issue `<prefix>-<suffix>` identifiers for sections, subsections, items.
//! - Track every id issued or observed in a session to refuse collisions.
//!
//! # Invariants
//! - A generator never returns an id it has already issued or observed.
//! - Prefixes are fixed per kind: `sec`, `sub`, `chk`.

use std::collections::HashSet;
use uuid::Uuid;

const RANDOM_SUFFIX_LEN: usize = 7;

/// Outline node kind that owns an identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IdKind {
    Section,
    Subsection,
    ChecklistItem,
}

impl IdKind {
    /// Fixed identifier prefix for this kind.
    pub fn prefix(self) -> &'static str {
        match self {
            Self::Section => "sec",
            Self::Subsection => "sub",
            Self::ChecklistItem => "chk",
        }
    }
}

/// Source of fresh node identifiers.
pub trait IdGenerator {
    /// Returns an id not previously issued or observed by this generator.
    fn next_id(&mut self, kind: IdKind) -> String;

    /// Records an externally assigned id.
    ///
    /// Returns `false` when the id was already known, i.e. it is a duplicate.
    fn observe(&mut self, id: &str) -> bool;
}

/// Random suffix generator backed by UUIDv4 entropy.
///
/// Remembers every id for the lifetime of the generator, one per editor
/// session.
#[derive(Debug, Default)]
pub struct RandomIdGenerator {
    known: HashSet<String>,
}

impl RandomIdGenerator {
    pub fn new() -> Self {
        Self::default()
    }
}

impl IdGenerator for RandomIdGenerator {
    fn next_id(&mut self, kind: IdKind) -> String {
        loop {
            let candidate = format!("{}-{}", kind.prefix(), random_suffix());
            if self.known.insert(candidate.clone()) {
                return candidate;
            }
        }
    }

    fn observe(&mut self, id: &str) -> bool {
        self.known.insert(id.to_string())
    }
}

/// Monotonic generator producing `sec-0001`, `chk-0002`, ...
///
/// Deterministic; used by tests and headless tooling.
#[derive(Debug, Default)]
pub struct SequentialIdGenerator {
    counter: u64,
    known: HashSet<String>,
}

impl SequentialIdGenerator {
    pub fn new() -> Self {
        Self::default()
    }
}

impl IdGenerator for SequentialIdGenerator {
    fn next_id(&mut self, kind: IdKind) -> String {
        loop {
            self.counter += 1;
            let candidate = format!("{}-{:04}", kind.prefix(), self.counter);
            if self.known.insert(candidate.clone()) {
                return candidate;
            }
        }
    }

    fn observe(&mut self, id: &str) -> bool {
        self.known.insert(id.to_string())
    }
}

fn random_suffix() -> String {
    Uuid::new_v4()
        .simple()
        .to_string()
        .chars()
        .take(RANDOM_SUFFIX_LEN)
        .collect()
}
