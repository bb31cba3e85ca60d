//! Section completion aggregation.
//!
//! # Responsibility
//! - Compute per-section completion over every nested checklist item.
//! - Classify percentages into presentation bands.
//!
//! # Invariants
//! - A section with no items reports 0%, never a division by zero.
//! - Bands: 0 empty, 1..=49 low, 50..=99 mid, 100 done.

use crate::view::{ProgressState, ViewKind, ViewNodeId, ViewTree};

/// Four-way completion classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressBand {
    Empty,
    Low,
    Mid,
    Done,
}

impl ProgressBand {
    /// Classifies a percentage in `0..=100`.
    pub fn from_percent(percent: u8) -> Self {
        match percent {
            0 => Self::Empty,
            1..=49 => Self::Low,
            50..=99 => Self::Mid,
            _ => Self::Done,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Empty => "empty",
            Self::Low => "low",
            Self::Mid => "mid",
            Self::Done => "done",
        }
    }

    /// Indicator bar color.
    pub fn color(self) -> &'static str {
        match self {
            Self::Empty => "#ef5350",
            Self::Low => "#ffb300",
            Self::Mid => "#42a5f5",
            Self::Done => "#66bb6a",
        }
    }
}

/// `round(100 * checked / max(total, 1))`.
pub fn percent_of(checked: usize, total: usize) -> u8 {
    let total = total.max(1) as f64;
    let percent = (100.0 * checked as f64 / total).round();
    percent.clamp(0.0, 100.0) as u8
}

/// Completion of one section view over its own and its subsections' items.
///
/// Returns 0 for handles that are not section nodes.
pub fn compute_progress(view: &ViewTree, section: ViewNodeId) -> u8 {
    if view.kind(section) != Some(ViewKind::Section) {
        return 0;
    }
    let items = view
        .descendants(section)
        .into_iter()
        .filter_map(|node| view.get(node))
        .filter(|node| node.kind == ViewKind::ChecklistItem)
        .map(|node| node.checked)
        .collect::<Vec<_>>();
    let checked = items.iter().filter(|checked| **checked).count();
    percent_of(checked, items.len())
}

/// Recomputes and writes the indicator of every section.
pub fn refresh_all(view: &mut ViewTree) {
    for section in view.sections().to_vec() {
        let percent = compute_progress(view, section);
        let Some(indicator) = view.find_descendant(section, ViewKind::Progress) else {
            continue;
        };
        if let Some(node) = view.get_mut(indicator) {
            node.progress = Some(ProgressState {
                percent,
                band: ProgressBand::from_percent(percent),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{percent_of, ProgressBand};

    #[test]
    fn percent_rounds_and_guards_empty_sections() {
        assert_eq!(percent_of(0, 0), 0);
        assert_eq!(percent_of(1, 4), 25);
        assert_eq!(percent_of(2, 3), 67);
        assert_eq!(percent_of(1, 3), 33);
        assert_eq!(percent_of(3, 3), 100);
    }

    #[test]
    fn band_boundaries() {
        assert_eq!(ProgressBand::from_percent(0), ProgressBand::Empty);
        assert_eq!(ProgressBand::from_percent(1), ProgressBand::Low);
        assert_eq!(ProgressBand::from_percent(49), ProgressBand::Low);
        assert_eq!(ProgressBand::from_percent(50), ProgressBand::Mid);
        assert_eq!(ProgressBand::from_percent(99), ProgressBand::Mid);
        assert_eq!(ProgressBand::from_percent(100), ProgressBand::Done);
    }

    #[test]
    fn band_names_are_stable() {
        assert_eq!(ProgressBand::Mid.as_str(), "mid");
        assert_eq!(ProgressBand::Done.color(), "#66bb6a");
    }
}
