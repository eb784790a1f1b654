//! Argument and construction errors raised by the layout engines.
//!
//! Budget overruns, duplicate adds, occupied cells and removals of
//! non-members are ordinary outcomes and are reported as `false`, not as
//! errors.

use std::fmt;

/// Errors returned by layout construction and index-addressed operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayoutError {
    /// A grid was requested with a zero dimension, a dimension above
    /// `u16::MAX`, or more than `MAX_GRID_CELLS` cells.
    InvalidGridDimensions { cols: usize, rows: usize },
    /// Explicit grid coordinates fall outside `[0, cols) x [0, rows)`.
    CellOutOfBounds {
        x: usize,
        y: usize,
        cols: usize,
        rows: usize,
    },
    /// A partition index does not name a live entry.
    PartitionIndexOutOfBounds { index: usize, len: usize },
    /// Text did not name a variant of a public layout enum.
    UnknownVariant { kind: &'static str, value: String },
}

impl fmt::Display for LayoutError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidGridDimensions { cols, rows } => write!(
                f,
                "grid dimensions must be between 1 and {} with at most {} cells (got {cols}x{rows})",
                u16::MAX,
                crate::grid::MAX_GRID_CELLS
            ),
            Self::CellOutOfBounds { x, y, cols, rows } => {
                write!(f, "cell ({x}, {y}) is outside the {cols}x{rows} grid")
            }
            Self::PartitionIndexOutOfBounds { index, len } => {
                write!(f, "partition index {index} out of bounds (len {len})")
            }
            Self::UnknownVariant { kind, value } => write!(f, "unknown {kind}: {value:?}"),
        }
    }
}

impl std::error::Error for LayoutError {}

#[cfg(test)]
mod tests {
    use super::LayoutError;

    #[test]
    fn display_messages() {
        let err = LayoutError::CellOutOfBounds {
            x: 3,
            y: 0,
            cols: 2,
            rows: 2,
        };
        assert_eq!(err.to_string(), "cell (3, 0) is outside the 2x2 grid");

        let err = LayoutError::InvalidGridDimensions { cols: 0, rows: 2 };
        assert_eq!(
            err.to_string(),
            "grid dimensions must be between 1 and 65535 with at most 1048576 cells (got 0x2)"
        );

        let err = LayoutError::UnknownVariant {
            kind: "flow alignment",
            value: "diagonal".into(),
        };
        assert_eq!(err.to_string(), "unknown flow alignment: \"diagonal\"");
    }
}
