//! Error types for the polygon kernel

use thiserror::Error;

/// Errors raised when a geometric value violates its construction invariant
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeometryError {
    /// A ring or polygon is degenerate, non-simple, or has no area
    #[error("invalid geometry: {reason}")]
    InvalidGeometry { reason: String },
}

impl GeometryError {
    /// Create an invalid geometry error
    pub fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidGeometry {
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_geometry_display() {
        let err = GeometryError::invalid("ring has fewer than 3 points");
        insta::assert_snapshot!(err.to_string(), @"invalid geometry: ring has fewer than 3 points");
    }
}
