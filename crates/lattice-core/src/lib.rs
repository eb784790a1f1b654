#![forbid(unsafe_code)]

//! Core: geometry primitives and the logging shim shared by the layout engines.

pub mod geometry;
pub mod logging;

pub use geometry::{Point, Rect, Size};

// Re-export tracing macros at crate root for ergonomic use.
#[cfg(feature = "tracing")]
pub use logging::{
    debug, debug_span, error, error_span, info, info_span, trace, trace_span, warn, warn_span,
};
