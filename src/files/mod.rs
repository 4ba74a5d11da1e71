//! File format support for XMP
//!
//! This module provides functionality for reading and writing XMP metadata
//! in various file formats. All implementations are pure Rust and cross-platform
//! compatible (iOS, Android, HarmonyOS, macOS, Windows, Wasm).

pub mod file;
pub mod formats;
pub mod handler;
pub mod registry;

pub use file::{ReadOptions, XmpFile};
#[cfg(feature = "mpeg4")]
pub use formats::bmff::Mpeg4Handler;
#[cfg(feature = "mpegh")]
pub use formats::bmff::MpeghHandler;
#[cfg(feature = "jpeg")]
pub use formats::jpeg::JpegHandler;
pub use handler::FileHandler;
pub use handler::XmpOptions;
pub use registry::{default_registry, Handler, HandlerRegistry};
