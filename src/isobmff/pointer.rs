//! Appendable boxes
//!
//! Unlike [`crate::isobmff::boxes::BoxHeader`], which describes a box
//! already present on disk, the types here build brand new top-level boxes
//! (`mpvd`, `mpv2`) that get appended after the still image's existing
//! structure. Grounded on `isobmff.PointerBox`.

use std::io::Write;

use crate::error::AssembleResult;
use crate::isobmff::buffer::BoundedBuffer;

/// Shared box-commit behaviour: a 4-byte type tag plus a normal or
/// 64-bit-extended size header, followed by whatever `commit_content`
/// writes.
pub trait BinaryBox {
    fn box_type(&self) -> &[u8; 4];
    fn content_size(&self) -> i64;
    fn commit_content<W: Write>(&self, sink: &mut W) -> AssembleResult<()>;

    fn header_size(&self) -> i64 {
        if self.content_size() as u64 > 0xFFFF_FFFF {
            16
        } else {
            8
        }
    }

    fn size(&self) -> i64 {
        self.header_size() + self.content_size()
    }

    fn commit<W: Write>(&self, sink: &mut W) -> AssembleResult<()> {
        let content_size = self.content_size();
        if content_size as u64 > 0xFFFF_FFFF {
            sink.write_all(&1u32.to_be_bytes())?;
            sink.write_all(self.box_type())?;
            sink.write_all(&((content_size + 16) as u64).to_be_bytes())?;
        } else {
            sink.write_all(&((content_size + 8) as u32).to_be_bytes())?;
            sink.write_all(self.box_type())?;
        }
        self.commit_content(sink)
    }
}

/// A box whose content is an entire [`BoundedBuffer`] (the `mpvd` payload:
/// the companion movie file's bytes, verbatim).
pub struct PointerBox {
    buffer: BoundedBuffer,
    box_type: [u8; 4],
}

impl PointerBox {
    pub fn new(buffer: BoundedBuffer, box_type: [u8; 4]) -> Self {
        Self { buffer, box_type }
    }
}

impl BinaryBox for PointerBox {
    fn box_type(&self) -> &[u8; 4] {
        &self.box_type
    }

    fn content_size(&self) -> i64 {
        self.buffer.size()
    }

    fn commit_content<W: Write>(&self, sink: &mut W) -> AssembleResult<()> {
        self.buffer.commit(sink)
    }
}

/// A box whose content is a fixed, already-materialised byte slice (the
/// `mpv2` trailer).
pub struct MemoryBox {
    contents: Vec<u8>,
    box_type: [u8; 4],
}

impl MemoryBox {
    pub fn new(contents: Vec<u8>, box_type: [u8; 4]) -> Self {
        Self { contents, box_type }
    }
}

impl BinaryBox for MemoryBox {
    fn box_type(&self) -> &[u8; 4] {
        &self.box_type
    }

    fn content_size(&self) -> i64 {
        self.contents.len() as i64
    }

    fn commit_content<W: Write>(&self, sink: &mut W) -> AssembleResult<()> {
        sink.write_all(&self.contents)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::io::Cursor;
    use std::rc::Rc;

    #[test]
    fn test_memory_box_commit() {
        let b = MemoryBox::new(b"hello".to_vec(), *b"free");
        let mut out = Vec::new();
        b.commit(&mut out).unwrap();
        assert_eq!(&out[0..4], &13u32.to_be_bytes());
        assert_eq!(&out[4..8], b"free");
        assert_eq!(&out[8..], b"hello");
    }

    #[test]
    fn test_pointer_box_commit() {
        let data = vec![1u8, 2, 3, 4];
        let buf = BoundedBuffer::new_root(
            Rc::new(RefCell::new(Cursor::new(data.clone()))),
            data.len() as i64,
        );
        let b = PointerBox::new(buf, *b"mpvd");
        let mut out = Vec::new();
        b.commit(&mut out).unwrap();
        assert_eq!(&out[0..4], &8u32.to_be_bytes());
        assert_eq!(&out[4..8], b"mpvd");
        assert_eq!(&out[8..], &data[..]);
    }

    #[test]
    fn test_header_size_switches_on_64_bit_content() {
        let b = MemoryBox::new(vec![0u8; 10], *b"free");
        assert_eq!(b.header_size(), 8);
    }
}
