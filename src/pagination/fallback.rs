//! Whole-document scan for table overflow the row window missed

use crate::document::DocumentAccessor;
use crate::pagination::probing::Probing;
use crate::pagination::row_overflow::{split_row, OverflowBlock};
use crate::pagination::{BreakPoint, DiagnosticEntry, DiagnosticsSink};
use crate::probe::CoordinateProbe;

/// A table overflow found anywhere past the committed content
#[derive(Debug, Clone, PartialEq)]
pub struct FallbackOverflow {
    pub break_point: BreakPoint,
    pub overflow_block: OverflowBlock,
}

/// Depth-first scan of the entire document for any table row crossing
/// `boundary_y`, breaking no earlier than `max(start, min_pos)`
pub fn find_fallback_table_overflow(
    doc: &dyn DocumentAccessor,
    probe: &dyn CoordinateProbe,
    sink: &dyn DiagnosticsSink,
    start: usize,
    boundary_y: f64,
    min_pos: usize,
) -> Option<FallbackOverflow> {
    scan(doc, &Probing::new(probe, sink), start, boundary_y, min_pos)
}

/// Rows that cross but cannot be split are searched for nested tables
pub(crate) fn scan(
    doc: &dyn DocumentAccessor,
    probing: &Probing<'_>,
    start: usize,
    boundary: f64,
    min_pos: usize,
) -> Option<FallbackOverflow> {
    let floor = start.max(min_pos);
    let mut found = None;

    doc.descendants(&mut |node, pos| {
        if found.is_some() || pos + node.node_size() <= floor {
            return false;
        }
        if !node.kind.is_table_row() {
            return !node.kind.is_textblock();
        }
        let Some(extent) = probing.extent(node, pos) else {
            return true;
        };
        if extent.top >= boundary || extent.bottom <= boundary {
            return false;
        }
        match split_row(probing, node, pos, floor, boundary) {
            Some(row) => {
                found = Some(FallbackOverflow {
                    break_point: row.break_point,
                    overflow_block: row.overflow_block,
                });
                false
            }
            None => true,
        }
    });

    if let Some(hit) = &found {
        probing.sink().push(DiagnosticEntry::FallbackHit {
            pos: hit.break_point.pos,
            min_pos,
        });
    }
    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{Document, Node};
    use crate::pagination::{CollectingSink, NoopSink};
    use crate::testing::ScriptedProbe;

    /// Outer table at 0 whose single row (1) holds a cell (2) with a
    /// paragraph "ab" (3, text 4..6) and a nested table (7) with rows at 8
    /// and 16 (cells 9, 17; paragraphs 10, 18; texts 11..13, 19..21)
    fn nested() -> Document {
        Document::from_blocks(vec![Node::table(vec![Node::table_row(vec![
            Node::table_cell(vec![
                Node::paragraph("ab"),
                Node::table(vec![
                    Node::table_row(vec![Node::table_cell(vec![Node::paragraph("cd")])]),
                    Node::table_row(vec![Node::table_cell(vec![Node::paragraph("ef")])]),
                ]),
            ]),
        ])])])
    }

    #[test]
    fn test_refines_through_nested_table() {
        let doc = nested();
        let probe = ScriptedProbe::new()
            .lines(4, 7, 0.0, 10.0)
            .lines(11, 14, 10.0, 20.0)
            .lines(19, 22, 20.0, 40.0);
        let sink = CollectingSink::new();
        let probing = Probing::new(&probe, &sink);

        // the outer row cannot break before itself; refining its cell
        // reaches the nested row's overflowing paragraph
        let hit = scan(&doc, &probing, 1, 30.0, 0).unwrap();
        assert_eq!(hit.break_point.pos, 18);
        assert!(sink
            .entries()
            .contains(&DiagnosticEntry::FallbackHit { pos: 18, min_pos: 0 }));
    }

    #[test]
    fn test_nested_row_found_when_outer_row_cannot_split() {
        let doc = nested();
        // the outer paragraph is virtualized and the outer row starts at the
        // floor, so the scan descends to the nested rows
        let probe = ScriptedProbe::new()
            .lines(11, 14, 10.0, 20.0)
            .lines(19, 22, 20.0, 40.0);
        let probing = Probing::new(&probe, &NoopSink);
        let hit = scan(&doc, &probing, 1, 30.0, 0).unwrap();
        assert_eq!(hit.break_point, BreakPoint::at(16, 30.0));
        assert_eq!(hit.overflow_block.pos, 16);
    }

    #[test]
    fn test_min_pos_prevents_earlier_break() {
        let doc = nested();
        let probe = ScriptedProbe::new()
            .lines(11, 14, 10.0, 20.0)
            .lines(19, 22, 20.0, 40.0);
        let probing = Probing::new(&probe, &NoopSink);
        assert_eq!(scan(&doc, &probing, 0, 30.0, 16), None);
    }

    #[test]
    fn test_nothing_overflows() {
        let doc = nested();
        let probe = ScriptedProbe::new()
            .lines(4, 7, 0.0, 10.0)
            .lines(11, 14, 10.0, 20.0)
            .lines(19, 22, 20.0, 40.0);
        let probing = Probing::new(&probe, &NoopSink);
        assert_eq!(scan(&doc, &probing, 0, 50.0, 0), None);
    }
}
