//! Page break calculation loop

use crate::document::DocumentAccessor;
use crate::header_footer::{ResolveContext, ResolveHeaderFooter};
use crate::pagination::probing::Probing;
use crate::pagination::strategy::{
    BreakCandidate, BreakContext, BreakStrategy, FallbackTableStrategy, RowOverflowStrategy,
    SectionBoundaryStrategy,
};
use crate::pagination::{
    BoundaryInfo, DiagnosticEntry, DiagnosticsSink, MeasureRequest, NoopSink, PageBreakDescriptor,
    PageMeasurer, Pagination, PaginationParams, ProbeMeasurer, ResolvedMargins,
};
use crate::probe::CoordinateProbe;
use smallvec::SmallVec;

/// Computes the page breaks of a document.
///
/// Each page starts at the previous break (the anchor). Margins grow to
/// fit the page's header and footer, the measurer proposes a tentative
/// break, and the strategies refine it in order: table row overflow,
/// whole-document table fallback, then section markers.
pub struct PageBreakCalculator<'a> {
    measurer: &'a dyn PageMeasurer,
    sink: &'a dyn DiagnosticsSink,
    strategies: SmallVec<[&'a dyn BreakStrategy; 4]>,
}

impl Default for PageBreakCalculator<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> PageBreakCalculator<'a> {
    pub fn new() -> Self {
        Self {
            measurer: &ProbeMeasurer,
            sink: &NoopSink,
            strategies: SmallVec::from_slice(&[
                &RowOverflowStrategy as &dyn BreakStrategy,
                &FallbackTableStrategy,
                &SectionBoundaryStrategy,
            ]),
        }
    }

    pub fn with_measurer(mut self, measurer: &'a dyn PageMeasurer) -> Self {
        self.measurer = measurer;
        self
    }

    pub fn with_diagnostics(mut self, sink: &'a dyn DiagnosticsSink) -> Self {
        self.sink = sink;
        self
    }

    /// Replace the refinement chain
    pub fn with_strategies(mut self, strategies: &[&'a dyn BreakStrategy]) -> Self {
        self.strategies = SmallVec::from_slice(strategies);
        self
    }

    /// Paginate from `params.start_pos` to the end of the document.
    ///
    /// Stops early, with `truncated` set, when a page cannot be measured or
    /// its break would not move past the anchor.
    ///
    /// The page reaching the document end is resolved a second time with
    /// `is_last_page` set; that result is reported in `sections` but does
    /// not change the page's margins or usable height.
    pub fn calculate(
        &self,
        doc: &dyn DocumentAccessor,
        probe: &dyn CoordinateProbe,
        params: &PaginationParams,
        resolver: &mut dyn ResolveHeaderFooter,
    ) -> Pagination {
        let doc_size = doc.content_size();
        let mut result = Pagination::default();
        if doc_size == 0 {
            return result;
        }

        let probing = Probing::new(probe, self.sink);
        let mut anchor = params.start_pos;
        let mut page_index = 0;

        while anchor < doc_size {
            let sections = resolver.resolve(page_index, ResolveContext { is_last_page: false });
            let margins = ResolvedMargins::resolve(&params.margins_px, &sections);
            let req = MeasureRequest {
                page_index,
                anchor,
                page_height_px: params.page_height_px,
                margins,
            };

            let Some(measurement) = self
                .measurer
                .measure_page(doc, probe, &req)
                .filter(|m| m.break_point.pos > anchor)
            else {
                self.stop(&mut result, page_index, anchor, None);
                break;
            };

            let page_top = probing.coords(anchor).map_or(measurement.page_top, |c| c.top);
            let usable_height_px = measurement.usable_height_px;
            let boundary = page_top + usable_height_px;
            let ctx = BreakContext {
                doc,
                probing: &probing,
                page_index,
                anchor,
                boundary,
                doc_size,
            };

            let mut candidate = BreakCandidate::from(measurement);
            for strategy in &self.strategies {
                if let Some(next) = strategy.apply(&ctx, &candidate) {
                    log::debug!(
                        "Page {page_index}: {} moved break {} -> {}",
                        strategy.name(),
                        candidate.break_point.pos,
                        next.break_point.pos
                    );
                    self.sink.push(DiagnosticEntry::StrategyApplied {
                        strategy: strategy.name(),
                        pos: next.break_point.pos,
                    });
                    candidate = next;
                }
            }

            let pos = candidate.break_point.pos.min(doc_size);
            if pos <= anchor {
                self.stop(&mut result, page_index, anchor, Some(pos));
                break;
            }

            let mut break_point = candidate.break_point.clamped(boundary);
            break_point.pos = pos;
            let row_breaks = candidate
                .row_breaks
                .map(|rows| rows.into_iter().map(|bp| bp.clamped(boundary)).collect());

            let sections = if pos >= doc_size {
                resolver.resolve(page_index, ResolveContext { is_last_page: true })
            } else {
                sections
            };

            result.pages.push(PageBreakDescriptor {
                page_index,
                from: anchor,
                to: pos,
                break_point,
                row_breaks,
                overflow: candidate.overflow,
                boundary: BoundaryInfo {
                    page_top,
                    usable_height_px,
                    margin_top: margins.top,
                    margin_bottom: margins.bottom,
                },
                sections: (!sections.is_empty()).then_some(sections),
            });

            anchor = pos;
            page_index += 1;
        }

        result
    }

    fn stop(&self, result: &mut Pagination, page_index: usize, anchor: usize, pos: Option<usize>) {
        log::warn!(
            "Pagination stopped at page {page_index}: no forward progress from {anchor} (break {pos:?})"
        );
        self.sink.push(DiagnosticEntry::NoProgress {
            page_index,
            anchor,
            pos,
        });
        result.truncated = true;
    }
}

/// Paginate with the default measurer and strategies
pub fn calculate_page_breaks(
    doc: &dyn DocumentAccessor,
    probe: &dyn CoordinateProbe,
    params: &PaginationParams,
    resolver: &mut dyn ResolveHeaderFooter,
) -> Pagination {
    PageBreakCalculator::new().calculate(doc, probe, params, resolver)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{Document, Node};
    use crate::header_footer::{NoSections, ResolvedSections, SectionMetrics};
    use crate::pagination::{BreakPoint, CollectingSink, Margins, OverflowInfo};
    use crate::testing::{ScriptedProbe, StubMeasurer};

    fn params(page_height_px: f64, top: f64, bottom: f64) -> PaginationParams {
        PaginationParams {
            page_height_px,
            margins_px: Margins::vertical(top, bottom),
            start_pos: 0,
        }
    }

    #[test]
    fn test_empty_document() {
        let doc = Document::from_blocks(Vec::new());
        let probe = ScriptedProbe::new();
        let result = calculate_page_breaks(&doc, &probe, &PaginationParams::default(), &mut NoSections);
        assert!(result.is_empty());
        assert!(!result.truncated);
    }

    #[test]
    fn test_margins_follow_header_footer_variants() {
        // 98 characters: content size 100
        let doc = Document::from_blocks(vec![Node::paragraph(&"x".repeat(98))]);
        let probe = ScriptedProbe::new().lines(0, 101, 0.0, 10.0);
        let measurer = StubMeasurer::new()
            .page(0, 50, Some("paragraph"))
            .page(50, 100, None);

        let mut calls = Vec::new();
        let mut resolver = |page: usize, ctx: ResolveContext| {
            calls.push((page, ctx.is_last_page));
            let header = if page == 0 { 144.0 } else { 114.0 };
            ResolvedSections {
                header: Some(SectionMetrics::new(format!("h{page}"), header, 48.0)),
                footer: Some(SectionMetrics::new("f", 104.0, 48.0)),
            }
        };

        let result = PageBreakCalculator::new()
            .with_measurer(&measurer)
            .calculate(&doc, &probe, &params(900.0, 72.0, 72.0), &mut resolver);

        assert!(!result.truncated);
        assert_eq!(result.len(), 2);
        let requests = measurer.requests.borrow();
        assert_eq!(requests[0].margins, ResolvedMargins { top: 192.0, bottom: 152.0 });
        assert_eq!(requests[1].margins, ResolvedMargins { top: 162.0, bottom: 152.0 });
        assert_eq!(calls, vec![(0, false), (1, false), (1, true)]);

        let last = &result.pages[1];
        assert_eq!((last.from, last.to), (50, 100));
        assert_eq!(last.boundary.margin_top, 162.0);
        assert_eq!(last.boundary.usable_height_px, 900.0 - 162.0 - 152.0);
    }

    #[test]
    fn test_row_overflow_overrides_tentative_break() {
        // "ab" at 0, table at 4, row at 5 (text 8..10), long paragraph at 14
        let doc = Document::from_blocks(vec![
            Node::paragraph("ab"),
            Node::table(vec![Node::table_row(vec![Node::table_cell(vec![
                Node::paragraph("xy"),
            ])])]),
            Node::paragraph(&"z".repeat(44)),
        ]);
        assert_eq!(doc.content_size(), 60);
        let probe = ScriptedProbe::new()
            .lines(0, 5, 0.0, 20.0)
            .lines(5, 14, 40.0, 60.0)
            .lines(14, 61, 60.0, 80.0);
        let measurer = StubMeasurer::new()
            .page(0, 60, Some("paragraph"))
            .page(5, 60, Some("paragraph"));

        let result = PageBreakCalculator::new()
            .with_measurer(&measurer)
            .calculate(&doc, &probe, &params(100.0, 25.0, 25.0), &mut NoSections);

        let first = &result.pages[0];
        assert_eq!(first.break_point, BreakPoint::at(5, 50.0));
        assert_eq!(first.row_breaks, Some(vec![BreakPoint::at(5, 50.0)]));
        assert_eq!(first.overflow.node_type_name.as_deref(), Some("tableRow"));
        assert_eq!(first.boundary.boundary(), 50.0);
        assert!(first.sections.is_none());
        assert_eq!(result.pages[1].from, 5);
        assert_eq!(result.end_pos(), Some(60));
    }

    #[test]
    fn test_section_move_discards_row_split() {
        // "ab" at 0, section at 4 wrapping a table (row at 6, text 9..11), "cd" at 16
        let doc = Document::from_blocks(vec![
            Node::paragraph("ab"),
            Node::section(vec![Node::table(vec![Node::table_row(vec![Node::table_cell(
                vec![Node::paragraph("xy")],
            )])])]),
            Node::paragraph("cd"),
        ]);
        assert_eq!(doc.content_size(), 20);
        let probe = ScriptedProbe::new()
            .lines(0, 6, 0.0, 20.0)
            .lines(6, 16, 40.0, 60.0)
            .lines(16, 21, 60.0, 80.0);
        let measurer = StubMeasurer::new()
            .page(0, 20, Some("paragraph"))
            .page(4, 20, None)
            .page(16, 20, None);

        let result = PageBreakCalculator::new()
            .with_measurer(&measurer)
            .calculate(&doc, &probe, &params(100.0, 25.0, 25.0), &mut NoSections);

        assert!(!result.truncated);
        let first = &result.pages[0];
        assert_eq!((first.from, first.to), (0, 4));
        assert_eq!(first.row_breaks, None);
        assert_eq!(first.overflow, OverflowInfo::new(4, Some("documentSection")));
        for page in &result.pages {
            let rows = page.row_breaks.as_deref().unwrap_or_default();
            assert!(rows.iter().all(|bp| bp.pos <= page.to), "page {}", page.page_index);
            assert!(page.overflow.pos <= page.to, "page {}", page.page_index);
        }
        assert_eq!(result.end_pos(), Some(20));
    }

    #[test]
    fn test_no_progress_truncates() {
        let doc = Document::from_blocks(vec![Node::paragraph("abc"), Node::paragraph("def")]);
        let probe = ScriptedProbe::new().lines(0, 11, 0.0, 10.0);
        let measurer = StubMeasurer::new().page(0, 5, Some("paragraph")).page(5, 5, None);
        let sink = CollectingSink::new();

        let result = PageBreakCalculator::new()
            .with_measurer(&measurer)
            .with_diagnostics(&sink)
            .calculate(&doc, &probe, &params(100.0, 10.0, 10.0), &mut NoSections);

        assert!(result.truncated);
        assert_eq!(result.len(), 1);
        assert!(sink.entries().contains(&DiagnosticEntry::NoProgress {
            page_index: 1,
            anchor: 5,
            pos: None
        }));
    }

    #[test]
    fn test_start_pos_past_end_yields_nothing() {
        let doc = Document::from_blocks(vec![Node::paragraph("abc")]);
        let probe = ScriptedProbe::new().lines(0, 6, 0.0, 10.0);
        let params = PaginationParams {
            start_pos: 99,
            ..PaginationParams::default()
        };
        let result = calculate_page_breaks(&doc, &probe, &params, &mut NoSections);
        assert!(result.is_empty());
        assert!(!result.truncated);
    }

    #[test]
    fn test_custom_strategy_chain() {
        struct PullBack;
        impl BreakStrategy for PullBack {
            fn name(&self) -> &'static str {
                "pullBack"
            }
            fn apply(&self, ctx: &BreakContext<'_>, current: &BreakCandidate) -> Option<BreakCandidate> {
                let mut next = current.clone();
                next.break_point.pos = ctx.anchor() + 1;
                Some(next)
            }
        }

        let doc = Document::from_blocks(vec![Node::paragraph("abc")]);
        let probe = ScriptedProbe::new().lines(0, 6, 0.0, 10.0);
        let sink = CollectingSink::new();
        let result = PageBreakCalculator::new()
            .with_strategies(&[&PullBack])
            .with_diagnostics(&sink)
            .calculate(&doc, &probe, &PaginationParams::default(), &mut NoSections);

        assert_eq!(result.len(), 5);
        assert!(result.pages.iter().enumerate().all(|(i, p)| p.to == i + 1));
        assert!(sink.entries().contains(&DiagnosticEntry::StrategyApplied {
            strategy: "pullBack",
            pos: 1
        }));
    }

    #[test]
    fn test_coordinate_driven_pagination_is_idempotent() {
        let doc = Document::from_blocks(vec![Node::paragraph("abcdef"), Node::paragraph("gh")]);
        let probe = ScriptedProbe::new()
            .lines(0, 4, 0.0, 10.0)
            .lines(4, 8, 10.0, 20.0)
            .lines(8, 13, 20.0, 30.0);
        let params = params(35.0, 10.0, 10.0);

        let first = calculate_page_breaks(&doc, &probe, &params, &mut NoSections);
        let second = calculate_page_breaks(&doc, &probe, &params, &mut NoSections);
        assert_eq!(first, second);
        assert!(!first.truncated);
        let bounds: Vec<_> = first.pages.iter().map(|p| (p.from, p.to)).collect();
        assert_eq!(bounds, vec![(0, 4), (4, 8), (8, 12)]);
        for page in &first.pages {
            assert!(page.break_point.bottom <= page.boundary.boundary());
        }
    }
}
