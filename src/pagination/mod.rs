//! Page break computation
//!
//! The calculator walks the document page by page. Tentative breaks come
//! from a [`PageMeasurer`]; table rows, nested tables and section markers
//! are then handled by an ordered list of [`BreakStrategy`] values.

mod calculator;
mod diagnostics;
mod fallback;
mod measure;
mod probing;
mod row_overflow;
mod section_boundary;
mod strategy;
mod types;

pub use calculator::{calculate_page_breaks, PageBreakCalculator};
pub use diagnostics::{CollectingSink, DiagnosticEntry, DiagnosticsSink, NoopSink};
pub use fallback::{find_fallback_table_overflow, FallbackOverflow};
pub use measure::{MeasureRequest, PageMeasurement, PageMeasurer, ProbeMeasurer};
pub use row_overflow::{find_row_overflow, OverflowBlock, RowOverflow};
pub use section_boundary::extend_section_boundary;
pub use strategy::{
    BreakCandidate, BreakContext, BreakStrategy, FallbackTableStrategy, RowOverflowStrategy,
    SectionBoundaryStrategy,
};
pub use types::{
    BoundaryInfo, BreakPoint, Margins, OverflowInfo, PageBreakDescriptor, Pagination,
    PaginationConfig, PaginationParams, ResolvedMargins,
};
