//! Font metrics for layout

use serde::{Deserialize, Serialize};

/// Metrics needed for text layout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FontMetrics {
    /// Line height in px
    pub line_height: f64,
    /// Width of ASCII characters (0-127)
    pub char_widths: Vec<f64>,
    /// Default width for non-ASCII characters
    pub default_width: f64,
}

impl Default for FontMetrics {
    fn default() -> Self {
        // 14px * 1.2 = 16.8
        // 8.41px for a monospace char
        Self::monospace(16.8, 8.41)
    }
}

impl FontMetrics {
    pub fn new(line_height: f64, char_widths: Vec<f64>, default_width: f64) -> Self {
        Self {
            line_height,
            char_widths,
            default_width,
        }
    }

    /// Every character has the same width
    pub fn monospace(line_height: f64, width: f64) -> Self {
        Self::new(line_height, vec![width; 128], width)
    }

    /// Get width of a character
    pub fn width(&self, c: char) -> f64 {
        if c.is_control() {
            return 0.0;
        }
        if c.is_ascii() {
            if let Some(w) = self.char_widths.get(c as usize) {
                return *w;
            }
        }
        self.default_width
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_widths() {
        let mut metrics = FontMetrics::monospace(10.0, 8.0);
        metrics.char_widths[b'i' as usize] = 3.0;
        assert_eq!(metrics.width('i'), 3.0);
        assert_eq!(metrics.width('m'), 8.0);
        assert_eq!(metrics.width('é'), 8.0);
        assert_eq!(metrics.width('\n'), 0.0);
    }

    #[test]
    fn test_deserialize_partial() {
        let metrics: FontMetrics = serde_json::from_str(r#"{"lineHeight": 20}"#).unwrap();
        assert_eq!(metrics.line_height, 20.0);
        assert_eq!(metrics.default_width, 8.41);
    }
}
