//! Continuous single-column reference renderer
//!
//! Lays a document out the way the editor renders it before pagination:
//! one unbroken column, textblocks wrapped into lines, tables as rows of
//! side-by-side cells. The result answers coordinate probes for any
//! document position.

use crate::document::{Document, DocumentAccessor, Node, NodeType};
use crate::error::ProbeError;
use crate::layout::line_break::LineBreaker;
use crate::layout::FontMetrics;
use crate::probe::{CoordinateProbe, Coords};
use crate::Rect;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Object replacement character standing in for inline atoms
const OBJECT_CHAR: char = '\u{FFFC}';

/// Geometry of the column the document flows into
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FlowSettings {
    /// Width of the text column in px
    pub content_width: f64,
    pub font: FontMetrics,
    /// Space after each textblock
    pub paragraph_spacing: f64,
    /// Padding inside every table cell, on all sides
    pub cell_padding: f64,
    /// Height of images without a `height` attribute
    pub image_height: f64,
}

impl Default for FlowSettings {
    fn default() -> Self {
        Self {
            // 8.5" page minus 1" margins at 96 DPI
            content_width: 624.0,
            font: FontMetrics::default(),
            paragraph_spacing: 8.0,
            cell_padding: 4.0,
            image_height: 96.0,
        }
    }
}

/// A laid-out document
#[derive(Debug, Clone)]
pub struct FlowLayout {
    coords: Vec<Coords>,
    rects: FxHashMap<usize, Rect>,
    height: f64,
}

impl FlowLayout {
    pub fn new(doc: &Document, settings: FlowSettings) -> Self {
        let size = doc.content_size();
        let mut builder = Builder {
            settings: &settings,
            breaker: LineBreaker::new(),
            coords: vec![None; size + 1],
            rects: FxHashMap::default(),
        };
        let height = builder.blocks(doc.root(), None, 0.0, settings.content_width, 0.0);
        let Builder { coords, rects, .. } = builder;

        Self {
            coords: fill_gaps(coords),
            rects,
            height,
        }
    }

    /// Height of a header/footer body given as editor JSON.
    ///
    /// Returns `None` when the JSON is not a document tree.
    pub fn measure_content(content: &Value, settings: &FlowSettings) -> Option<f64> {
        let root: Node = match serde_json::from_value(content.clone()) {
            Ok(root) => root,
            Err(e) => {
                log::warn!("Cannot measure header/footer content: {e}");
                return None;
            }
        };
        Some(Self::new(&Document::new(root), settings.clone()).height())
    }

    /// Total height of the column
    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn content_size(&self) -> usize {
        self.coords.len().saturating_sub(1)
    }
}

impl CoordinateProbe for FlowLayout {
    fn coords_at_pos(&self, pos: usize) -> Result<Coords, ProbeError> {
        self.coords.get(pos).copied().ok_or(ProbeError::OutOfRange {
            pos,
            size: self.content_size(),
        })
    }

    fn node_rect(&self, pos: usize) -> Option<Rect> {
        self.rects.get(&pos).copied()
    }
}

struct Builder<'s> {
    settings: &'s FlowSettings,
    breaker: LineBreaker,
    coords: Vec<Option<Coords>>,
    rects: FxHashMap<usize, Rect>,
}

impl Builder<'_> {
    /// Stack the children of `parent` vertically from `y`; returns the new y
    fn blocks(&mut self, parent: &Node, pos: Option<usize>, x: f64, width: f64, mut y: f64) -> f64 {
        for (child, child_pos) in parent.children_at(pos) {
            let top = y;
            y = match &child.kind {
                kind if kind.is_textblock() => {
                    self.textblock(child, child_pos, y, width) + self.settings.paragraph_spacing
                }
                NodeType::Table => self.table(child, child_pos, x, width, y),
                kind if kind.is_atom() => {
                    let h = self.atom_height(child);
                    self.set(child_pos, Coords::new(y, y + h));
                    y + h
                }
                NodeType::Text => {
                    // stray inline content renders as its own line
                    let h = self.settings.font.line_height;
                    for p in child_pos..=child_pos + child.node_size() {
                        self.set(p, Coords::new(y, y + h));
                    }
                    y + h
                }
                _ => self.blocks(child, Some(child_pos), x, width, y),
            };
            self.rects.insert(child_pos, Rect::new(x, top, width, y - top));
        }
        y
    }

    /// Lay out a textblock's lines from `y`; returns the bottom of the last line
    fn textblock(&mut self, node: &Node, pos: usize, y: f64, width: f64) -> f64 {
        let settings = self.settings;
        let font = &settings.font;
        let mut text = String::new();
        let mut atom_heights: FxHashMap<usize, f64> = FxHashMap::default();
        let mut atom_widths: FxHashMap<usize, f64> = FxHashMap::default();
        let mut offset = 0;
        for inline in &node.content {
            match (&inline.kind, &inline.text) {
                (NodeType::Text, Some(t)) => {
                    text.push_str(t);
                    offset += t.chars().count();
                }
                (NodeType::HardBreak, _) => {
                    text.push('\n');
                    offset += 1;
                }
                (kind, _) if kind.is_atom() => {
                    text.push(OBJECT_CHAR);
                    atom_heights.insert(offset, self.atom_height(inline));
                    atom_widths.insert(offset, inline.attr_f64("width").unwrap_or(width / 2.0));
                    offset += 1;
                }
                _ => {
                    // unknown inline container: occupies its size in positions
                    for _ in 0..inline.node_size() {
                        text.push(OBJECT_CHAR);
                    }
                    offset += inline.node_size();
                }
            }
        }

        let lines = self.breaker.break_lines(&text, width, |i, c| {
            atom_widths.get(&i).copied().unwrap_or_else(|| font.width(c))
        });

        let start = pos + 1;
        let mut top = y;
        let mut first_line = None;
        let mut last_line = Coords::new(y, y + font.line_height);
        for line in &lines {
            let h = line
                .clone()
                .filter_map(|i| atom_heights.get(&i).copied())
                .fold(font.line_height, f64::max);
            let coords = Coords::new(top, top + h);
            for i in line.clone() {
                self.set(start + i, coords);
            }
            first_line.get_or_insert(coords);
            last_line = coords;
            top += h;
        }

        self.set(pos, first_line.unwrap_or(last_line));
        self.set(start + offset, last_line);
        top.max(last_line.bottom)
    }

    fn table(&mut self, table: &Node, pos: usize, x: f64, width: f64, mut y: f64) -> f64 {
        let pad = self.settings.cell_padding;
        for (row, row_pos) in table.children_at(Some(pos)) {
            let row_top = y;
            let cells: Vec<_> = row.children_at(Some(row_pos)).collect();
            let cell_width = width / cells.len().max(1) as f64;

            let mut row_bottom = row_top + self.settings.font.line_height;
            for (i, (cell, cell_pos)) in cells.iter().enumerate() {
                let cell_x = x + cell_width * i as f64;
                let inner = (cell_width - 2.0 * pad).max(1.0);
                let bottom = self.blocks(cell, Some(*cell_pos), cell_x + pad, inner, row_top + pad) + pad;
                row_bottom = row_bottom.max(bottom);
            }
            for (i, (_, cell_pos)) in cells.iter().enumerate() {
                let cell_x = x + cell_width * i as f64;
                self.rects
                    .insert(*cell_pos, Rect::new(cell_x, row_top, cell_width, row_bottom - row_top));
            }
            self.rects
                .insert(row_pos, Rect::new(x, row_top, width, row_bottom - row_top));
            y = row_bottom;
        }
        y
    }

    fn atom_height(&self, node: &Node) -> f64 {
        match node.kind {
            NodeType::Image => node.attr_f64("height").unwrap_or(self.settings.image_height),
            _ => self.settings.font.line_height,
        }
    }

    fn set(&mut self, pos: usize, coords: Coords) {
        if let Some(slot) = self.coords.get_mut(pos) {
            *slot = Some(coords);
        }
    }
}

/// Structural positions take the coordinates of the next rendered
/// position; trailing ones take the last rendered position's
fn fill_gaps(coords: Vec<Option<Coords>>) -> Vec<Coords> {
    let mut filled = vec![Coords::default(); coords.len()];
    let mut next: Option<Coords> = None;
    for (i, c) in coords.iter().enumerate().rev() {
        next = c.or(next);
        if let Some(c) = next {
            filled[i] = c;
        }
    }
    let mut prev: Option<Coords> = None;
    for (i, c) in coords.iter().enumerate() {
        if c.is_some() {
            prev = *c;
        } else if !coords[i..].iter().any(Option::is_some) {
            if let Some(p) = prev {
                filled[i] = p;
            }
        }
    }
    filled
}
