//! Text rendering for the presentation layer.
pub mod trace;

pub use trace::format_trace;
