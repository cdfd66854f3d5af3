//! Ordered break-refinement strategies

use crate::document::{DocumentAccessor, NodeType};
use crate::pagination::probing::Probing;
use crate::pagination::{fallback, row_overflow, section_boundary};
use crate::pagination::{BreakPoint, DiagnosticsSink, OverflowInfo, PageMeasurement};
use crate::probe::Coords;

/// State of the page being broken, shared by all strategies
pub struct BreakContext<'a> {
    pub(crate) doc: &'a dyn DocumentAccessor,
    pub(crate) probing: &'a Probing<'a>,
    pub(crate) page_index: usize,
    pub(crate) anchor: usize,
    pub(crate) boundary: f64,
    pub(crate) doc_size: usize,
}

impl<'a> BreakContext<'a> {
    pub fn doc(&self) -> &'a dyn DocumentAccessor {
        self.doc
    }

    pub fn page_index(&self) -> usize {
        self.page_index
    }

    /// Start of the page's content
    pub fn anchor(&self) -> usize {
        self.anchor
    }

    /// Absolute y past which content overflows
    pub fn boundary(&self) -> f64 {
        self.boundary
    }

    pub fn doc_size(&self) -> usize {
        self.doc_size
    }

    /// Rendered coordinates, `None` when the probe cannot answer
    pub fn coords(&self, pos: usize) -> Option<Coords> {
        self.probing.coords(pos)
    }

    pub fn sink(&self) -> &'a dyn DiagnosticsSink {
        self.probing.sink()
    }
}

/// The break as refined so far
#[derive(Debug, Clone, PartialEq)]
pub struct BreakCandidate {
    pub break_point: BreakPoint,
    pub row_breaks: Option<Vec<BreakPoint>>,
    pub overflow: OverflowInfo,
}

impl From<PageMeasurement> for BreakCandidate {
    fn from(m: PageMeasurement) -> Self {
        Self {
            break_point: m.break_point,
            row_breaks: None,
            overflow: m.overflow,
        }
    }
}

/// One step of break refinement.
///
/// Strategies run in order; each sees the candidate left by the previous
/// ones and returns a replacement, or `None` to keep it.
pub trait BreakStrategy {
    fn name(&self) -> &'static str;

    fn apply(&self, ctx: &BreakContext<'_>, current: &BreakCandidate) -> Option<BreakCandidate>;
}

/// Table rows crossing the boundary override the tentative break
#[derive(Debug, Clone, Copy, Default)]
pub struct RowOverflowStrategy;

impl BreakStrategy for RowOverflowStrategy {
    fn name(&self) -> &'static str {
        "rowOverflow"
    }

    fn apply(&self, ctx: &BreakContext<'_>, _current: &BreakCandidate) -> Option<BreakCandidate> {
        let row = row_overflow::scan(ctx.doc, ctx.probing, ctx.anchor, ctx.boundary)?;
        Some(BreakCandidate {
            break_point: row.break_point,
            row_breaks: Some(row.row_breaks),
            overflow: OverflowInfo::new(row.break_point.pos, Some(row.overflow_block.node_type.name())),
        })
    }
}

/// Whole-document table scan when the break reached the document end or
/// could not be attributed to a block
#[derive(Debug, Clone, Copy, Default)]
pub struct FallbackTableStrategy;

impl BreakStrategy for FallbackTableStrategy {
    fn name(&self) -> &'static str {
        "fallbackTable"
    }

    fn apply(&self, ctx: &BreakContext<'_>, current: &BreakCandidate) -> Option<BreakCandidate> {
        let untyped = current
            .overflow
            .node_type_name
            .as_deref()
            .map_or(true, |name| !NodeType::from(name.to_string()).is_structural_block());
        if current.break_point.pos < ctx.doc_size && !untyped {
            return None;
        }

        let hit = fallback::scan(ctx.doc, ctx.probing, ctx.anchor, ctx.boundary, ctx.anchor)?;
        let pos = hit.break_point.pos;
        let wins = ctx.anchor < pos
            && (pos < current.break_point.pos || (pos == current.break_point.pos && untyped));
        if !wins {
            return None;
        }
        Some(BreakCandidate {
            break_point: hit.break_point,
            row_breaks: Some(vec![hit.break_point]),
            overflow: OverflowInfo::new(pos, Some(hit.overflow_block.node_type.name())),
        })
    }
}

/// Moves breaks off atomic section markers.
///
/// The overflow is then attributed to the marker, and row breaks past the
/// moved break are dropped.
#[derive(Debug, Clone, Copy, Default)]
pub struct SectionBoundaryStrategy;

impl BreakStrategy for SectionBoundaryStrategy {
    fn name(&self) -> &'static str {
        "sectionBoundary"
    }

    fn apply(&self, ctx: &BreakContext<'_>, current: &BreakCandidate) -> Option<BreakCandidate> {
        let moved = section_boundary::extend(
            ctx.doc,
            ctx.probing,
            current.break_point.pos,
            ctx.anchor,
            ctx.boundary,
        )?;
        // rows split past the new break belong to the next page
        let row_breaks = current
            .row_breaks
            .as_ref()
            .map(|rows| {
                rows.iter()
                    .copied()
                    .filter(|bp| bp.pos <= moved.pos)
                    .collect::<Vec<_>>()
            })
            .filter(|rows| !rows.is_empty());
        Some(BreakCandidate {
            break_point: moved,
            row_breaks,
            overflow: OverflowInfo::new(moved.pos, Some(NodeType::DocumentSection.name())),
        })
    }
}
