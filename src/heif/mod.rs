//! HEIF/HEIC still-image support: `meta`/`iinf`/`iloc` item tables and the
//! `mdat` content store they describe.

pub mod content;
pub mod file;
pub mod meta;

pub use content::{Chunk, ChunkKind, Content};
pub use file::HeifFile;
pub use meta::{Iinf, Iloc, IlocEntry, Infe, Meta};
