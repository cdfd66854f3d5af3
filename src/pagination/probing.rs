//! Failure-tolerant geometry queries shared by the break detectors

use crate::document::Node;
use crate::pagination::{BreakPoint, DiagnosticEntry, DiagnosticsSink};
use crate::probe::{CoordinateProbe, Coords};
use crate::Rect;

/// Outcome of scanning a run of caret positions against a boundary
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum LineScan {
    /// Every position renders above the boundary
    Fits,
    /// First position whose line crosses the boundary, with its coordinates
    OverflowsAt(usize, Coords),
    /// The probe could not answer
    Unknown,
}

/// Coordinate probe wrapper: failures become `None` and are reported to the
/// diagnostics sink instead of propagating
pub(crate) struct Probing<'a> {
    probe: &'a dyn CoordinateProbe,
    sink: &'a dyn DiagnosticsSink,
}

impl<'a> Probing<'a> {
    pub fn new(probe: &'a dyn CoordinateProbe, sink: &'a dyn DiagnosticsSink) -> Self {
        Self { probe, sink }
    }

    pub fn sink(&self) -> &'a dyn DiagnosticsSink {
        self.sink
    }

    pub fn coords(&self, pos: usize) -> Option<Coords> {
        let reason = match self.probe.coords_at_pos(pos) {
            Ok(coords) if coords.is_finite() => return Some(coords),
            Ok(_) => "non-finite coordinates".to_string(),
            Err(e) => e.to_string(),
        };
        log::debug!("Coordinate probe failed at {pos}: {reason}");
        self.sink.push(DiagnosticEntry::ProbeFailed { pos, reason });
        None
    }

    pub fn rect(&self, pos: usize) -> Option<Rect> {
        self.probe.node_rect(pos).filter(Rect::is_finite)
    }

    /// Rendered vertical extent of a block node.
    ///
    /// Prefers the host's bounding box; otherwise spans from the first
    /// inline position to the lowest line end of any textblock inside.
    pub fn extent(&self, node: &Node, pos: usize) -> Option<Coords> {
        if let Some(rect) = self.rect(pos) {
            return Some(Coords::new(rect.top(), rect.bottom()));
        }
        if node.kind.is_atom() {
            return self.coords(pos);
        }
        if node.kind.is_textblock() {
            let range = node.content_range(pos);
            let top = self.coords(range.start)?.top;
            let bottom = self.coords(range.end)?.bottom;
            return Some(Coords::new(top, bottom.max(top)));
        }

        let mut top: Option<f64> = None;
        let mut bottom: Option<f64> = None;
        node.descendants(Some(pos), &mut |child, child_pos| {
            let inline = if child.kind.is_textblock() {
                let range = child.content_range(child_pos);
                Some((range.start, range.end))
            } else if child.kind.is_atom() {
                Some((child_pos, child_pos))
            } else {
                None
            };
            let Some((start, end)) = inline else {
                return true;
            };
            if top.is_none() {
                top = self.coords(start).map(|c| c.top);
            }
            if let Some(c) = self.coords(end) {
                bottom = Some(bottom.map_or(c.bottom, |b: f64| b.max(c.bottom)));
            }
            false
        });
        match (top, bottom) {
            (Some(top), Some(bottom)) => Some(Coords::new(top, bottom.max(top))),
            _ => None,
        }
    }

    /// Find the first position in `lo..=hi` whose line bottom crosses
    /// `boundary`. Positions are assumed to render top to bottom.
    pub fn scan_lines(&self, lo: usize, hi: usize, boundary: f64) -> LineScan {
        let Some(last) = self.coords(hi) else {
            return LineScan::Unknown;
        };
        if last.bottom <= boundary {
            return LineScan::Fits;
        }

        let (mut lo, mut hi, mut hit) = (lo, hi, (hi, last));
        while lo < hi {
            let mid = lo + (hi - lo) / 2;
            let Some(c) = self.coords(mid) else {
                return LineScan::Unknown;
            };
            if c.bottom > boundary {
                hit = (mid, c);
                hi = mid;
            } else {
                lo = mid + 1;
            }
        }
        LineScan::OverflowsAt(hit.0, hit.1)
    }

    /// First position after the line containing `pos`, searching up to `hi`
    pub fn next_line_start(&self, pos: usize, line: Coords, hi: usize) -> Option<usize> {
        let (mut lo, mut hi_search) = (pos + 1, hi);
        if lo > hi_search {
            return None;
        }
        if self.coords(hi_search)?.top <= line.top {
            return None;
        }
        while lo < hi_search {
            let mid = lo + (hi_search - lo) / 2;
            if self.coords(mid)?.top > line.top {
                hi_search = mid;
            } else {
                lo = mid + 1;
            }
        }
        Some(lo)
    }

    /// Narrow a break down to the first overflowing line inside `node`.
    ///
    /// A refinement only counts when some content of `node` stays on the
    /// page and the result lies past `floor`. A break before the first line
    /// of a textblock is reported at the textblock itself.
    pub fn refine_within(
        &self,
        node: &Node,
        pos: usize,
        boundary: f64,
        floor: usize,
    ) -> Option<BreakPoint> {
        let mut seen_fit = false;
        let mut done = false;
        let mut result = None;

        node.descendants(Some(pos), &mut |child, child_pos| {
            if done {
                return false;
            }
            let (lo, hi) = if child.kind.is_textblock() {
                let range = child.content_range(child_pos);
                (range.start, range.end)
            } else if child.kind.is_atom() {
                (child_pos, child_pos)
            } else {
                return true;
            };

            match self.scan_lines(lo, hi, boundary) {
                LineScan::Fits => seen_fit = true,
                LineScan::Unknown => done = true,
                LineScan::OverflowsAt(p, coords) => {
                    done = true;
                    if p > lo || seen_fit {
                        let at = if p == lo { child_pos } else { p };
                        if at > floor {
                            result = Some(BreakPoint::at(at, coords.top.min(boundary)));
                        }
                    }
                }
            }
            false
        });
        result
    }
}
