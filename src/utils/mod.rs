//! Shared utilities
//!
//! Small cross-cutting helpers used by the core XMP engine and the file
//! format handlers.

pub mod datetime;

pub use datetime::XmpDateTime;
