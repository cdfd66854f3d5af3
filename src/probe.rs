//! Rendered-geometry capability supplied by the host renderer

use crate::error::ProbeError;
use crate::Rect;
use serde::{Deserialize, Serialize};

/// Vertical extent of the caret at a document offset
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Coords {
    pub top: f64,
    pub bottom: f64,
}

impl Coords {
    pub fn new(top: f64, bottom: f64) -> Self {
        Self { top, bottom }
    }

    pub fn is_finite(&self) -> bool {
        self.top.is_finite() && self.bottom.is_finite()
    }
}

/// Answers "where is this offset rendered" for a live document.
///
/// Implementations may fail for unattached or virtualized content;
/// callers treat any failure as unknown geometry.
pub trait CoordinateProbe {
    fn coords_at_pos(&self, pos: usize) -> Result<Coords, ProbeError>;

    /// Bounding box of the block node starting at `pos`, when the host can
    /// provide it more precisely than caret coordinates
    fn node_rect(&self, _pos: usize) -> Option<Rect> {
        None
    }
}

impl<P: CoordinateProbe + ?Sized> CoordinateProbe for &P {
    fn coords_at_pos(&self, pos: usize) -> Result<Coords, ProbeError> {
        (**self).coords_at_pos(pos)
    }

    fn node_rect(&self, pos: usize) -> Option<Rect> {
        (**self).node_rect(pos)
    }
}
