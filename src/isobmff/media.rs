//! Top-level media file: opens a path as a [`BoundedBuffer`] over the whole
//! file, walks its top-level box list, and supports appending brand new
//! boxes after the original content. Grounded on `isobmff.FileBuffer` /
//! `isobmff.MediaFile`.

use std::cell::RefCell;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use crate::error::AssembleResult;
use crate::isobmff::boxes::{read_box_list, BoxHeader};
use crate::isobmff::buffer::BoundedBuffer;
use crate::isobmff::pointer::{BinaryBox, MemoryBox, PointerBox};

/// A box appended after the file's original top-level boxes. Kept as an
/// enum (rather than `dyn BinaryBox`) since [`BinaryBox::commit`] is generic
/// over its sink and so isn't object-safe.
pub enum AppendedBox {
    Pointer(PointerBox),
    Memory(MemoryBox),
}

impl AppendedBox {
    fn commit<W: Write>(&self, sink: &mut W) -> AssembleResult<()> {
        match self {
            AppendedBox::Pointer(b) => b.commit(sink),
            AppendedBox::Memory(b) => b.commit(sink),
        }
    }
}

/// A file opened as a span-edited buffer, with its top-level box list and
/// any boxes appended during assembly.
pub struct MediaFile {
    pub path: PathBuf,
    pub buffer: BoundedBuffer,
    pub items: Vec<BoxHeader>,
    pub added_boxes: Vec<AppendedBox>,
}

impl MediaFile {
    pub fn open(path: impl AsRef<Path>) -> AssembleResult<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::open(&path)?;
        let size = file.metadata()?.len() as i64;
        let reader: Rc<RefCell<dyn crate::isobmff::buffer::ReadSeek>> =
            Rc::new(RefCell::new(file));
        let mut buffer = BoundedBuffer::new_root(reader, size);
        let items = read_box_list(&mut buffer, 0)?;
        Ok(Self {
            path,
            buffer,
            items,
            added_boxes: Vec::new(),
        })
    }

    /// The first top-level box whose type tag matches `box_type`.
    pub fn find(&self, box_type: &[u8; 4]) -> Option<&BoxHeader> {
        self.items.iter().find(|b| &b.box_type == box_type)
    }

    pub fn add_box(&mut self, appended: AppendedBox) {
        self.added_boxes.push(appended);
    }

    /// Write the original (possibly edited) content followed by every
    /// appended box to `sink`.
    pub fn commit<W: Write>(&self, sink: &mut W) -> AssembleResult<()> {
        self.buffer.commit(sink)?;
        for added in &self.added_boxes {
            added.commit(sink)?;
        }
        Ok(())
    }
}
