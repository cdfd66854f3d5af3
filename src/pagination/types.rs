//! Pagination data model

use crate::header_footer::{ResolvedSections, SectionKind, SectionSettings};
use crate::layout::FlowSettings;
use serde::{Deserialize, Serialize};

/// A document offset together with the rendered vertical band it breaks at
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BreakPoint {
    pub pos: usize,
    pub top: f64,
    pub bottom: f64,
}

impl BreakPoint {
    pub fn new(pos: usize, top: f64, bottom: f64) -> Self {
        Self { pos, top, bottom }
    }

    /// Zero-height break at `y`
    pub fn at(pos: usize, y: f64) -> Self {
        Self::new(pos, y, y)
    }

    /// Clamp against the page boundary, keeping `top <= bottom`
    pub fn clamped(self, boundary: f64) -> Self {
        let bottom = if self.bottom.is_finite() {
            self.bottom.min(boundary)
        } else {
            boundary
        };
        let top = if self.top.is_finite() {
            self.top.min(bottom)
        } else {
            bottom
        };
        Self::new(self.pos, top, bottom)
    }
}

/// Where the content that did not fit begins
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverflowInfo {
    pub pos: usize,
    /// Type of the block the overflow was attributed to, if any
    pub node_type_name: Option<String>,
}

impl OverflowInfo {
    pub fn new(pos: usize, node_type_name: Option<&str>) -> Self {
        Self {
            pos,
            node_type_name: node_type_name.map(str::to_string),
        }
    }
}

/// Usable content box of one page
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoundaryInfo {
    pub page_top: f64,
    pub usable_height_px: f64,
    pub margin_top: f64,
    pub margin_bottom: f64,
}

impl BoundaryInfo {
    /// Absolute y past which content overflows the page
    pub fn boundary(&self) -> f64 {
        self.page_top + self.usable_height_px
    }
}

/// One computed page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageBreakDescriptor {
    pub page_index: usize,
    pub from: usize,
    pub to: usize,
    #[serde(rename = "break")]
    pub break_point: BreakPoint,
    pub row_breaks: Option<Vec<BreakPoint>>,
    pub overflow: OverflowInfo,
    pub boundary: BoundaryInfo,
    pub sections: Option<ResolvedSections>,
}

/// Configured page margins in px
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Margins {
    pub top: f64,
    pub bottom: f64,
    pub left: f64,
    pub right: f64,
}

impl Default for Margins {
    fn default() -> Self {
        // 1" at 96 DPI
        Self {
            top: 96.0,
            bottom: 96.0,
            left: 96.0,
            right: 96.0,
        }
    }
}

impl Margins {
    pub fn vertical(top: f64, bottom: f64) -> Self {
        Self {
            top,
            bottom,
            ..Self::default()
        }
    }
}

/// Top/bottom margins after header/footer heights are taken into account
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ResolvedMargins {
    pub top: f64,
    pub bottom: f64,
}

impl ResolvedMargins {
    /// Each margin grows to fit its section but never shrinks below the
    /// configured value
    pub fn resolve(configured: &Margins, sections: &ResolvedSections) -> Self {
        let grow = |margin: f64, kind| {
            sections
                .get(kind)
                .and_then(|s| s.effective_height())
                .map_or(margin, |h| margin.max(h))
        };
        Self {
            top: grow(configured.top, SectionKind::Header),
            bottom: grow(configured.bottom, SectionKind::Footer),
        }
    }
}

/// Page geometry and starting point of a pagination pass
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PaginationParams {
    pub page_height_px: f64,
    pub margins_px: Margins,
    pub start_pos: usize,
}

impl Default for PaginationParams {
    fn default() -> Self {
        Self {
            page_height_px: 1056.0, // 11" at 96 DPI
            margins_px: Margins::default(),
            start_pos: 0,
        }
    }
}

/// Everything the CLI reads from its config file
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PaginationConfig {
    pub params: PaginationParams,
    pub sections: SectionSettings,
    pub flow: FlowSettings,
}

/// Result of a pagination pass
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub pages: Vec<PageBreakDescriptor>,
    /// The pass stopped before reaching the end of the document
    pub truncated: bool,
}

impl Pagination {
    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Offset the last page ends at
    pub fn end_pos(&self) -> Option<usize> {
        self.pages.last().map(|p| p.to)
    }
}
