//! Error types for the annotation engine.
//!
//! Nothing in this crate is fatal: every error is either recovered locally
//! (logged and treated as "no result") or rejected without a state change.
//! The worst possible outcome is a visually stale overlay, which the next
//! pointer event corrects.

use thiserror::Error;

/// Result type alias for annotation operations.
pub type AnnotationResult<T> = Result<T, AnnotationError>;

/// Errors that can occur inside the annotation engine.
#[derive(Debug, Error)]
pub enum AnnotationError {
    /// Boundary tracing produced an unexpected result shape.
    ///
    /// Recovered by treating the offending component as contour-less;
    /// never surfaced past a log warning.
    #[error("degenerate mask: {0}")]
    DegenerateMask(String),

    /// A geometric operation was rejected (e.g. closing a polygon with
    /// fewer than 3 vertices). The primitive is left in its prior state.
    #[error("invalid geometry: {0}")]
    InvalidGeometry(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = AnnotationError::DegenerateMask("trace overran step limit".into());
        assert!(format!("{err}").contains("degenerate"));

        let err = AnnotationError::InvalidGeometry("polygon needs at least 3 vertices");
        assert!(format!("{err}").contains("3 vertices"));
    }
}
