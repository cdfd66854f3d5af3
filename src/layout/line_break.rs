//! Line breaking algorithm

use smallvec::SmallVec;
use std::ops::Range;
use unicode_linebreak::{linebreaks, BreakOpportunity};
use unicode_segmentation::UnicodeSegmentation;

/// Lines of one textblock as char index ranges
pub type Lines = SmallVec<[Range<usize>; 4]>;

/// Greedy UAX #14 line breaker
#[derive(Debug, Default)]
pub struct LineBreaker;

impl LineBreaker {
    pub fn new() -> Self {
        Self
    }

    /// Break `text` into lines no wider than `max_width`.
    ///
    /// Ranges are in chars, matching document positions. A line ends at the
    /// last allowed break that fits; a single cluster wider than the line
    /// gets an emergency break at grapheme boundaries. Mandatory breaks
    /// (newlines) keep the newline on the line they end.
    pub fn break_lines(&self, text: &str, max_width: f64, width_of: impl Fn(usize, char) -> f64) -> Lines {
        let mut char_at_byte = vec![0usize; text.len() + 1];
        let mut char_count = 0;
        for (byte, _) in text.char_indices() {
            char_at_byte[byte] = char_count;
            char_count += 1;
        }
        char_at_byte[text.len()] = char_count;

        // None: no break before this char; Some(true): mandatory
        let mut breaks: Vec<Option<bool>> = vec![None; char_count + 1];
        for (byte, opportunity) in linebreaks(text) {
            breaks[char_at_byte[byte]] = Some(opportunity == BreakOpportunity::Mandatory);
        }

        let mut lines = Lines::new();
        let mut start = 0;
        let mut x = 0.0;
        let mut last_allowed: Option<(usize, f64)> = None;

        for (byte, grapheme) in text.grapheme_indices(true) {
            let first = char_at_byte[byte];
            let width: f64 = grapheme
                .chars()
                .enumerate()
                .map(|(i, c)| width_of(first + i, c))
                .sum();

            if first > start {
                match breaks[first] {
                    Some(true) => {
                        lines.push(start..first);
                        start = first;
                        x = 0.0;
                        last_allowed = None;
                    }
                    Some(false) => last_allowed = Some((first, x)),
                    None => {}
                }
            }

            if x + width > max_width && first > start {
                match last_allowed.take() {
                    Some((at, at_x)) => {
                        lines.push(start..at);
                        start = at;
                        x -= at_x;
                    }
                    None => {
                        // Emergency break at current position
                        lines.push(start..first);
                        start = first;
                        x = 0.0;
                    }
                }
            }
            x += width;
        }

        lines.push(start..char_count);
        lines
    }
}
