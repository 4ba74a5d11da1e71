//! motionphoto
//!
//! Assembles a Google-Photos-recognised Motion Photo from a HEIC/HEIF still
//! image and a companion QuickTime/MP4 movie: the still image's embedded
//! XMP packet gets a `GCamera`/`Container` description appended, and the
//! movie is appended after it as a trailing `mpvd`/`mpv2` box pair.
//!
//! Built on top of a general-purpose XMP metadata core (`core`) and file
//! format layer (`files`), both carried over from this crate's XMP-toolkit
//! ancestry and reused here for parsing and serialising the still image's
//! metadata packet.

pub mod config;
pub mod core;
pub mod error;
pub mod types;
pub mod utils;

#[cfg(any(feature = "heif", feature = "mpegh", feature = "mpeg4"))]
pub mod isobmff;

#[cfg(feature = "heif")]
pub mod heif;

#[cfg(feature = "mov")]
pub mod qt;

#[cfg(feature = "jpeg")]
pub mod jpeg;

#[cfg(any(feature = "files", feature = "jpeg", feature = "mpeg4", feature = "mpegh"))]
pub mod files;

#[cfg(all(feature = "heif", feature = "mov"))]
pub mod motion_photo;

pub use config::AssembleOptions;
pub use core::{
    get_all_registered_namespaces, register_namespace, ArrayNode, ArrayType, Node, NamespaceMap,
    SimpleNode, StructureNode, XmpError, XmpMeta, XmpParser, XmpResult, XmpSerializer,
};
pub use error::{AssembleError, AssembleResult};
pub use types::XmpValue;

#[cfg(any(feature = "files", feature = "jpeg", feature = "mpeg4", feature = "mpegh"))]
pub use files::{FileHandler, HandlerRegistry, ReadOptions, XmpFile, XmpOptions};

#[cfg(all(feature = "heif", feature = "mov"))]
pub use motion_photo::assemble;
