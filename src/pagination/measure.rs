//! Tentative page-boundary measurement

use crate::document::{DocumentAccessor, Node};
use crate::pagination::probing::{LineScan, Probing};
use crate::pagination::{BreakPoint, NoopSink, OverflowInfo, ResolvedMargins};
use crate::probe::CoordinateProbe;
use serde::Serialize;

/// What the calculator asks of the renderer for one page
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MeasureRequest {
    pub page_index: usize,
    pub anchor: usize,
    pub page_height_px: f64,
    pub margins: ResolvedMargins,
}

impl MeasureRequest {
    pub fn usable_height(&self) -> f64 {
        self.page_height_px - self.margins.top - self.margins.bottom
    }
}

/// A first guess at where the page starting at the anchor ends
#[derive(Debug, Clone, PartialEq)]
pub struct PageMeasurement {
    /// Rendered top of the anchor
    pub page_top: f64,
    pub usable_height_px: f64,
    pub break_point: BreakPoint,
    pub overflow: OverflowInfo,
}

/// Host renderer capability: measure one page starting at an anchor
pub trait PageMeasurer {
    fn measure_page(
        &self,
        doc: &dyn DocumentAccessor,
        probe: &dyn CoordinateProbe,
        req: &MeasureRequest,
    ) -> Option<PageMeasurement>;
}

/// Measures pages from caret coordinates alone
#[derive(Debug, Clone, Copy, Default)]
pub struct ProbeMeasurer;

impl PageMeasurer for ProbeMeasurer {
    fn measure_page(
        &self,
        doc: &dyn DocumentAccessor,
        probe: &dyn CoordinateProbe,
        req: &MeasureRequest,
    ) -> Option<PageMeasurement> {
        let usable = req.usable_height();
        if !(usable > 0.0) {
            log::warn!(
                "Page {} has no usable height ({usable}px), margins {:?}",
                req.page_index,
                req.margins
            );
            return None;
        }

        let probing = Probing::new(probe, &NoopSink);
        let page_top = probing.coords(req.anchor)?.top;
        let boundary = page_top + usable;
        let size = doc.content_size();

        let mut found: Option<(BreakPoint, String)> = None;
        doc.descendants(&mut |node, pos| {
            if found.is_some() || pos + node.node_size() <= req.anchor {
                return false;
            }
            match block_break(&probing, node, pos, req.anchor, boundary) {
                Walk::Descend => true,
                Walk::Skip => false,
                Walk::Break(bp) => {
                    found = Some((bp, node.kind.name().to_string()));
                    false
                }
            }
        });

        let (break_point, overflow) = match found {
            Some((bp, label)) => (bp.clamped(boundary), OverflowInfo::new(bp.pos, Some(&label))),
            None => {
                let y = probing
                    .coords(size)
                    .map_or(boundary, |c| c.bottom.min(boundary));
                (BreakPoint::at(size, y), OverflowInfo::new(size, None))
            }
        };

        Some(PageMeasurement {
            page_top,
            usable_height_px: usable,
            break_point,
            overflow,
        })
    }
}

enum Walk {
    Descend,
    Skip,
    Break(BreakPoint),
}

fn block_break(probing: &Probing<'_>, node: &Node, pos: usize, anchor: usize, boundary: f64) -> Walk {
    if node.kind.is_table_row() {
        let Some(extent) = probing.extent(node, pos) else {
            return Walk::Descend;
        };
        if extent.bottom <= boundary {
            return Walk::Skip;
        }
        if pos > anchor {
            return Walk::Break(BreakPoint::at(pos, extent.top.min(boundary)));
        }
        return Walk::Descend;
    }

    if node.kind.is_atom() {
        let Some(extent) = probing.extent(node, pos) else {
            return Walk::Skip;
        };
        if extent.bottom <= boundary {
            return Walk::Skip;
        }
        // an atom taller than the page still gets a page of its own
        let at = if pos > anchor { pos } else { pos + 1 };
        return Walk::Break(BreakPoint::at(at, extent.top.min(boundary)));
    }

    if !node.kind.is_textblock() {
        return Walk::Descend;
    }

    let range = node.content_range(pos);
    let lo = range.start.max(anchor);
    if lo > range.end {
        return Walk::Skip;
    }
    match probing.scan_lines(lo, range.end, boundary) {
        LineScan::Fits => Walk::Skip,
        LineScan::Unknown => {
            log::debug!("Skipping unmeasurable textblock at {pos}");
            Walk::Skip
        }
        LineScan::OverflowsAt(p, line) => {
            let at = if p == range.start { pos } else { p };
            if at > anchor {
                return Walk::Break(BreakPoint::at(at, line.top.min(boundary)));
            }
            // the first line on the page is already too tall: keep it
            let next = probing
                .next_line_start(p, line, range.end)
                .unwrap_or(pos + node.node_size());
            Walk::Break(BreakPoint::at(next, boundary))
        }
    }
}
