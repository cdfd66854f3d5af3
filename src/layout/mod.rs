//! Reference layout for hosts without a live renderer
//!
//! [`FlowLayout`] renders a document into a single continuous column and
//! answers coordinate probes against it. The CLI and the benchmarks use it
//! in place of the browser.

mod flow;
pub mod font;
mod line_break;

pub use flow::{FlowLayout, FlowSettings};
pub use font::FontMetrics;
