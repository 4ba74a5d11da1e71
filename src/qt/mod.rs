//! QuickTime/MP4 movie support: just the `moov`/`mvhd` duration lookup the
//! Motion Photo assembler needs from the companion video.

pub mod file;
pub mod meta;

pub use file::QuickTimeFile;
pub use meta::{Moov, Mvhd};
