//! docx-pager: word-processor pagination for a browser-based DOCX editor
//!
//! This crate computes page breaks over a continuously rendered document:
//! - Page-level boundary measurement driven by a host coordinate probe
//! - Table row and cell level overflow splitting
//! - Whole-document fallback scan for nested table overflow
//! - Per-page header/footer variant resolution with cached heights

pub mod document;
pub mod error;
pub mod header_footer;
pub mod layout;
pub mod pagination;
pub mod probe;
pub mod wasm;

#[cfg(test)]
pub(crate) mod testing;

// Re-export WASM types for direct use
pub use wasm::WasmPaginator;

// Re-export primary types
pub use document::{Document, DocumentAccessor, Node, NodeType};
pub use error::{Error, ProbeError, RepositoryError};
pub use header_footer::{
    HeaderFooterRecord, HeaderFooterRepository, HeaderFooterStore, NoSections, RecordUpdate,
    ResolveContext, ResolveHeaderFooter, ResolvedSections, SectionHeightMetrics, SectionKind,
    SectionMetrics, SectionResolver, SectionSettings, Variant,
};
pub use layout::{FlowLayout, FlowSettings, FontMetrics};
pub use pagination::{
    calculate_page_breaks, BreakCandidate, BreakContext, BreakPoint, BreakStrategy,
    CollectingSink, DiagnosticEntry, DiagnosticsSink, Margins, NoopSink, PageBreakCalculator,
    PageBreakDescriptor, PageMeasurer, Pagination, PaginationConfig, PaginationParams,
    ProbeMeasurer,
};
pub use probe::{CoordinateProbe, Coords};

/// Rendered rectangle in absolute px
#[derive(Debug, Clone, Copy, PartialEq, Default, serde::Serialize, serde::Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    pub fn top(&self) -> f64 {
        self.y
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.width.is_finite() && self.height.is_finite()
    }
}
