//! Generic ISOBMFF box plumbing
//!
//! Format-agnostic machinery shared by the HEIF and QuickTime layers: the
//! span-edited buffer, box header parsing, and appendable box types.

pub mod boxes;
pub mod buffer;
pub mod media;
pub mod pointer;

pub use boxes::{read_box_list, BoxHeader, SizeType};
pub use buffer::{BoundedBuffer, ReadSeek, SharedReader};
pub use media::{AppendedBox, MediaFile};
pub use pointer::{BinaryBox, MemoryBox, PointerBox};
