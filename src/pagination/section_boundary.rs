//! Keeps page breaks off atomic section markers

use crate::document::DocumentAccessor;
use crate::pagination::probing::Probing;
use crate::pagination::{BreakPoint, DiagnosticEntry, DiagnosticsSink};
use crate::probe::CoordinateProbe;

/// Move a break that falls strictly inside a section marker.
///
/// The break goes to the marker's start when that still lies past
/// `anchor`, otherwise just past its end. Returns `None` when the break
/// needs no adjustment.
pub fn extend_section_boundary(
    doc: &dyn DocumentAccessor,
    probe: &dyn CoordinateProbe,
    sink: &dyn DiagnosticsSink,
    break_pos: usize,
    anchor: usize,
    boundary: f64,
) -> Option<BreakPoint> {
    extend(doc, &Probing::new(probe, sink), break_pos, anchor, boundary)
}

pub(crate) fn extend(
    doc: &dyn DocumentAccessor,
    probing: &Probing<'_>,
    break_pos: usize,
    anchor: usize,
    boundary: f64,
) -> Option<BreakPoint> {
    let mut section = None;
    doc.descendants(&mut |node, pos| {
        let end = pos + node.node_size();
        if section.is_some() || end <= break_pos || pos >= break_pos {
            return false;
        }
        if node.kind.is_section_marker() {
            section = Some((pos, end));
            return false;
        }
        true
    });

    let (start, end) = section?;
    let moved = if start > anchor {
        start
    } else {
        end.min(doc.content_size())
    };
    probing.sink().push(DiagnosticEntry::SectionNudged {
        from: break_pos,
        to: moved,
        section_pos: start,
    });

    let y = probing
        .coords(moved)
        .map_or(boundary, |c| c.top.min(boundary));
    Some(BreakPoint::at(moved, y))
}
