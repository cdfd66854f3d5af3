//! Table row overflow detection with cell-level refinement

use crate::document::{DocumentAccessor, Node, NodeType};
use crate::pagination::probing::Probing;
use crate::pagination::{BreakPoint, DiagnosticEntry, DiagnosticsSink};
use crate::probe::CoordinateProbe;
use crate::Rect;

/// The block a break was attributed to
#[derive(Debug, Clone, PartialEq)]
pub struct OverflowBlock {
    pub node_type: NodeType,
    pub pos: usize,
    pub rect: Option<Rect>,
}

/// A table row crossing the page boundary and where to break it
#[derive(Debug, Clone, PartialEq)]
pub struct RowOverflow {
    pub break_point: BreakPoint,
    pub row_breaks: Vec<BreakPoint>,
    pub overflow_block: OverflowBlock,
}

/// Find the first table row at or after `start` that crosses `boundary`
/// and compute where to break it
pub fn find_row_overflow(
    doc: &dyn DocumentAccessor,
    probe: &dyn CoordinateProbe,
    sink: &dyn DiagnosticsSink,
    start: usize,
    boundary: f64,
) -> Option<RowOverflow> {
    scan(doc, &Probing::new(probe, sink), start, boundary)
}

/// Row window scan behind [`find_row_overflow`].
///
/// Rows are visited in document order; the scan ends at the first row
/// rendered entirely below the boundary or at the first crossing row,
/// whether or not a usable break comes out of it.
pub(crate) fn scan(
    doc: &dyn DocumentAccessor,
    probing: &Probing<'_>,
    start: usize,
    boundary: f64,
) -> Option<RowOverflow> {
    let mut stop = false;
    let mut found = None;

    doc.descendants(&mut |node, pos| {
        if stop || pos + node.node_size() <= start {
            return false;
        }
        if !node.kind.is_table_row() {
            return !node.kind.is_textblock();
        }
        let Some(extent) = probing.extent(node, pos) else {
            return false;
        };
        if extent.top >= boundary {
            stop = true;
            return false;
        }
        if extent.bottom <= boundary {
            return false;
        }
        stop = true;
        found = split_row(probing, node, pos, start, boundary);
        false
    });
    found
}

/// Break a row known to cross `boundary`, never at or before `floor`.
///
/// Tries the first overflowing cell that can be refined to a line, then a
/// pass over the whole row; the earlier of the two wins. Without either,
/// the break lands before the row.
pub(crate) fn split_row(
    probing: &Probing<'_>,
    row: &Node,
    row_pos: usize,
    floor: usize,
    boundary: f64,
) -> Option<RowOverflow> {
    let sink = probing.sink();
    let row_bottom = probing.extent(row, row_pos).map_or(f64::NAN, |e| e.bottom);
    sink.push(DiagnosticEntry::RowOverflow {
        row_pos,
        row_bottom,
        boundary,
    });

    let mut cell_break = None;
    for (cell, cell_pos) in row.children_at(Some(row_pos)) {
        if !cell.kind.is_table_cell() {
            continue;
        }
        let crosses = probing
            .extent(cell, cell_pos)
            .is_some_and(|e| e.bottom > boundary);
        if !crosses {
            continue;
        }
        if let Some(bp) = probing.refine_within(cell, cell_pos, boundary, floor) {
            sink.push(DiagnosticEntry::CellRefined {
                cell_pos,
                pos: bp.pos,
            });
            cell_break = Some(bp);
            break;
        }
    }

    let row_break = probing.refine_within(row, row_pos, boundary, floor);
    if let Some(bp) = row_break {
        sink.push(DiagnosticEntry::RowRefined { row_pos, pos: bp.pos });
    }

    let refined = match (cell_break, row_break) {
        (Some(cell), Some(row)) if row.pos < cell.pos => Some(row),
        (Some(cell), _) => Some(cell),
        (None, row) => row,
    };
    let break_point = refined
        .or_else(|| (row_pos > floor).then(|| BreakPoint::at(row_pos, boundary)))?
        .clamped(boundary);

    Some(RowOverflow {
        break_point,
        row_breaks: vec![break_point],
        overflow_block: OverflowBlock {
            node_type: row.kind.clone(),
            pos: row_pos,
            rect: probing.rect(row_pos),
        },
    })
}
