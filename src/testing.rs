//! Test doubles for the host renderer

use crate::document::DocumentAccessor;
use crate::error::ProbeError;
use crate::pagination::{BreakPoint, MeasureRequest, OverflowInfo, PageMeasurement, PageMeasurer};
use crate::probe::{CoordinateProbe, Coords};
use crate::Rect;
use rustc_hash::FxHashMap;
use std::cell::RefCell;

/// Coordinate probe answering from scripted position ranges.
///
/// Unscripted positions fail with [`ProbeError::Unrendered`].
#[derive(Debug, Default, Clone)]
pub struct ScriptedProbe {
    coords: FxHashMap<usize, Coords>,
    rects: FxHashMap<usize, Rect>,
}

impl ScriptedProbe {
    pub fn new() -> Self {
        Self::default()
    }

    /// Positions `start..end` render on one line spanning `top..bottom`
    pub fn lines(mut self, start: usize, end: usize, top: f64, bottom: f64) -> Self {
        for pos in start..end {
            self.coords.insert(pos, Coords::new(top, bottom));
        }
        self
    }

    pub fn nan_at(mut self, pos: usize) -> Self {
        self.coords.insert(pos, Coords::new(f64::NAN, f64::NAN));
        self
    }

    pub fn rect(mut self, pos: usize, rect: Rect) -> Self {
        self.rects.insert(pos, rect);
        self
    }
}

impl CoordinateProbe for ScriptedProbe {
    fn coords_at_pos(&self, pos: usize) -> Result<Coords, ProbeError> {
        self.coords
            .get(&pos)
            .copied()
            .ok_or(ProbeError::Unrendered { pos })
    }

    fn node_rect(&self, pos: usize) -> Option<Rect> {
        self.rects.get(&pos).copied()
    }
}

/// Page measurer replaying canned break positions keyed by anchor, and
/// recording every request it receives
#[derive(Debug, Default)]
pub struct StubMeasurer {
    breaks: FxHashMap<usize, (usize, Option<&'static str>)>,
    pub page_top: f64,
    pub requests: RefCell<Vec<MeasureRequest>>,
}

impl StubMeasurer {
    pub fn new() -> Self {
        Self::default()
    }

    /// When paginating from `anchor`, report a tentative break at `pos`
    pub fn page(mut self, anchor: usize, pos: usize, node_type: Option<&'static str>) -> Self {
        self.breaks.insert(anchor, (pos, node_type));
        self
    }
}

impl PageMeasurer for StubMeasurer {
    fn measure_page(
        &self,
        _doc: &dyn DocumentAccessor,
        _probe: &dyn CoordinateProbe,
        req: &MeasureRequest,
    ) -> Option<PageMeasurement> {
        self.requests.borrow_mut().push(*req);
        let &(pos, node_type) = self.breaks.get(&req.anchor)?;
        let usable = req.usable_height();
        let boundary = self.page_top + usable;
        Some(PageMeasurement {
            page_top: self.page_top,
            usable_height_px: usable,
            break_point: BreakPoint::at(pos, boundary),
            overflow: OverflowInfo::new(pos, node_type),
        })
    }
}
