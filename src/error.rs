//! Error types for Motion Photo assembly
//!
//! Mirrors the shape of [`crate::core::error::XmpError`]: one flat
//! `thiserror`-derived enum per §7 of the design, with `#[from]`
//! conversions for the two error sources assembly actually touches (XMP
//! metadata errors and I/O errors).

use thiserror::Error;

/// Error types for Motion Photo assembly operations
#[derive(Debug, Error)]
pub enum AssembleError {
    /// A box header, item count, or marker failed to parse
    #[error("Parse error: {0}")]
    Parse(String),

    /// An edit violated a structural invariant of the span-edited buffer
    /// (non-monotonic spans, write into a child span, chunk located
    /// before `mdat` being mutated)
    #[error("Structural error: {0}")]
    Structural(String),

    /// XMP metadata error (malformed XMP, missing RDF root, unregistered
    /// namespace, ...)
    #[error("XMP error: {0}")]
    Xml(#[from] crate::core::error::XmpError),

    /// I/O error on open/read/write
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for Motion Photo assembly operations
pub type AssembleResult<T> = Result<T, AssembleError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_display() {
        let err = AssembleError::Parse("buffer underrun".to_string());
        assert!(err.to_string().contains("buffer underrun"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: AssembleError = io_err.into();
        assert!(matches!(err, AssembleError::Io(_)));
    }

    #[test]
    fn test_xmp_error_conversion() {
        let xmp_err = crate::core::error::XmpError::BadParam("bad".to_string());
        let err: AssembleError = xmp_err.into();
        assert!(matches!(err, AssembleError::Xml(_)));
    }
}
