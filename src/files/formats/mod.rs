//! File format handlers
//!
//! Each format handler implements file format-specific logic for embedding
//! and extracting XMP metadata. All handlers are pure Rust implementations
//! that work across all platforms.

#[cfg(any(feature = "mpeg4", feature = "mpegh"))]
pub mod bmff;
#[cfg(feature = "jpeg")]
pub mod jpeg;
