//! Injected diagnostics for the break detectors

use serde::Serialize;
use std::cell::RefCell;

/// One observation made while computing a page break
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum DiagnosticEntry {
    /// The coordinate probe failed or answered with garbage
    ProbeFailed { pos: usize, reason: String },
    /// A table row crosses the page boundary
    RowOverflow {
        row_pos: usize,
        row_bottom: f64,
        boundary: f64,
    },
    /// A break was narrowed down to a line inside a cell
    CellRefined { cell_pos: usize, pos: usize },
    /// A break was narrowed down by the row-level pass
    RowRefined { row_pos: usize, pos: usize },
    /// The whole-document scan found a table overflow
    FallbackHit { pos: usize, min_pos: usize },
    /// A break was moved off a section marker
    SectionNudged { from: usize, to: usize, section_pos: usize },
    /// A strategy replaced the current break candidate
    StrategyApplied { strategy: &'static str, pos: usize },
    /// Pagination stopped without reaching the document end
    NoProgress {
        page_index: usize,
        anchor: usize,
        pos: Option<usize>,
    },
}

/// Receiver for [`DiagnosticEntry`] values
pub trait DiagnosticsSink {
    fn push(&self, entry: DiagnosticEntry);
}

/// Discards everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSink;

impl DiagnosticsSink for NoopSink {
    fn push(&self, _entry: DiagnosticEntry) {}
}

/// Keeps every entry in arrival order
#[derive(Debug, Default)]
pub struct CollectingSink {
    entries: RefCell<Vec<DiagnosticEntry>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<DiagnosticEntry> {
        self.entries.borrow().clone()
    }

    pub fn take(&self) -> Vec<DiagnosticEntry> {
        self.entries.take()
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

impl DiagnosticsSink for CollectingSink {
    fn push(&self, entry: DiagnosticEntry) {
        self.entries.borrow_mut().push(entry);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_collecting_sink() {
        let sink = CollectingSink::new();
        sink.push(DiagnosticEntry::FallbackHit { pos: 3, min_pos: 0 });
        sink.push(DiagnosticEntry::CellRefined { cell_pos: 6, pos: 9 });
        assert_eq!(sink.len(), 2);

        let taken = sink.take();
        assert_eq!(taken[0], DiagnosticEntry::FallbackHit { pos: 3, min_pos: 0 });
        assert!(sink.is_empty());
    }

    #[test]
    fn test_entry_serialization() {
        let entry = DiagnosticEntry::RowOverflow {
            row_pos: 5,
            row_bottom: 60.0,
            boundary: 50.0,
        };
        assert_eq!(
            serde_json::to_value(&entry).unwrap(),
            json!({"kind": "rowOverflow", "rowPos": 5, "rowBottom": 60.0, "boundary": 50.0})
        );
    }
}
