//! ISOBMFF box framework
//!
//! Parses a box header (`size:u32, type:[4]`), handling the 64-bit extended
//! size form and the "extends to end of parent" form, and exposes a content
//! sub-buffer. Grounded on `isobmff.Box`/`isobmff.FullAtom`.

use crate::error::{AssembleError, AssembleResult};
use crate::isobmff::buffer::BoundedBuffer;

/// How a box's `size` field was encoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeType {
    /// Ordinary 32-bit size field.
    Normal,
    /// `size == 1`: an 8-byte extended size follows the type tag.
    Long,
    /// `size == 0`: the box extends to the end of its parent buffer.
    Last,
}

/// A parsed box header: offset, total size, 4-byte type tag, and the byte
/// offset at which the box's content begins (header length, plus 4 more
/// for a `FullAtom`'s version/flags).
#[derive(Debug, Clone)]
pub struct BoxHeader {
    pub offset: i64,
    pub size: i64,
    pub box_type: [u8; 4],
    pub content_offset: i64,
    pub size_type: SizeType,
}

impl BoxHeader {
    /// Read a box header at `offset` within `buffer`.
    pub fn read(buffer: &mut BoundedBuffer, offset: i64) -> AssembleResult<Self> {
        buffer.seek(offset);
        let size_field = buffer.read_u32_be()? as i64;
        let type_bytes = buffer.read(4)?;
        let mut box_type = [0u8; 4];
        box_type.copy_from_slice(&type_bytes);

        let (size, content_offset, size_type) = if size_field == 1 {
            let extended = buffer.read_u64_be()? as i64;
            (extended, 16, SizeType::Long)
        } else if size_field == 0 {
            (buffer.size() - offset, 8, SizeType::Last)
        } else {
            (size_field, 8, SizeType::Normal)
        };

        Ok(Self {
            offset,
            size,
            box_type,
            content_offset,
            size_type,
        })
    }

    /// Read a header at `offset`, then the `version:u8, flags:u24` FullAtom
    /// prefix, advancing `content_offset` by 4.
    pub fn read_full_atom(buffer: &mut BoundedBuffer, offset: i64) -> AssembleResult<(Self, u8, u32)> {
        let mut header = Self::read(buffer, offset)?;
        buffer.seek(offset + header.content_offset);
        let version_and_flags = buffer.read_u32_be()?;
        let version = (version_and_flags >> 24) as u8;
        let flags = version_and_flags & 0x00FF_FFFF;
        header.content_offset += 4;
        Ok((header, version, flags))
    }

    /// Require this header's type to match `expected` (4-byte ASCII tag).
    pub fn expect_type(&self, expected: &[u8; 4]) -> AssembleResult<()> {
        if &self.box_type != expected {
            return Err(AssembleError::Parse(format!(
                "expected box type {:?}, found {:?}",
                String::from_utf8_lossy(expected),
                self.type_str()
            )));
        }
        Ok(())
    }

    pub fn type_str(&self) -> String {
        String::from_utf8_lossy(&self.box_type).to_string()
    }

    pub fn next_offset(&self) -> i64 {
        self.offset + self.size
    }

    /// A sub-buffer covering this box's content, relative to `parent`.
    pub fn contents(&self, parent: &BoundedBuffer) -> BoundedBuffer {
        parent.sub_buffer(self.offset + self.content_offset, self.size - self.content_offset)
    }

    /// Rewrite this box's on-disk size header in place within `parent` to
    /// reflect a content size change of `delta` bytes. `Last` boxes are
    /// never rewritten: their size is implicit.
    pub fn resize(&mut self, parent: &mut BoundedBuffer, delta: i64) -> AssembleResult<()> {
        self.size += delta;
        match self.size_type {
            SizeType::Last => Ok(()),
            SizeType::Normal => {
                parent.seek(self.offset);
                parent.write(4, (self.size as u32).to_be_bytes().to_vec())?;
                Ok(())
            }
            SizeType::Long => {
                parent.seek(self.offset + 8);
                parent.write(8, (self.size as u64).to_be_bytes().to_vec())?;
                Ok(())
            }
        }
    }
}

/// A flat, in-order list of every top-level box header in `buffer`,
/// starting at `offset`. Unrecognised types are retained as headers only;
/// the caller decides how to specialise each one.
pub fn read_box_list(buffer: &mut BoundedBuffer, offset: i64) -> AssembleResult<Vec<BoxHeader>> {
    let mut headers = Vec::new();
    let mut pos = offset;
    while pos < buffer.size() {
        let header = BoxHeader::read(buffer, pos)?;
        pos = header.next_offset();
        let is_last = header.size_type == SizeType::Last;
        headers.push(header);
        if is_last {
            break;
        }
    }
    Ok(headers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::isobmff::buffer::BoundedBuffer;
    use std::cell::RefCell;
    use std::io::Cursor;
    use std::rc::Rc;

    fn buffer(data: &[u8]) -> BoundedBuffer {
        BoundedBuffer::new_root(Rc::new(RefCell::new(Cursor::new(data.to_vec()))), data.len() as i64)
    }

    #[test]
    fn test_normal_box_header() {
        let mut data = vec![0, 0, 0, 8];
        data.extend_from_slice(b"free");
        let mut buf = buffer(&data);
        let header = BoxHeader::read(&mut buf, 0).unwrap();
        assert_eq!(header.size, 8);
        assert_eq!(&header.box_type, b"free");
        assert_eq!(header.content_offset, 8);
        assert_eq!(header.size_type, SizeType::Normal);
    }

    #[test]
    fn test_last_box_header() {
        let mut data = vec![0, 0, 0, 0];
        data.extend_from_slice(b"mdat");
        data.extend_from_slice(&[1, 2, 3, 4]);
        let mut buf = buffer(&data);
        let header = BoxHeader::read(&mut buf, 0).unwrap();
        assert_eq!(header.size, data.len() as i64);
        assert_eq!(header.size_type, SizeType::Last);
    }

    #[test]
    fn test_long_box_header() {
        let mut data = vec![0, 0, 0, 1];
        data.extend_from_slice(b"mdat");
        data.extend_from_slice(&(20i64).to_be_bytes());
        data.extend_from_slice(&[0u8; 4]);
        let mut buf = buffer(&data);
        let header = BoxHeader::read(&mut buf, 0).unwrap();
        assert_eq!(header.size, 20);
        assert_eq!(header.content_offset, 16);
        assert_eq!(header.size_type, SizeType::Long);
    }

    #[test]
    fn test_box_list_walks_siblings() {
        let mut data = vec![0, 0, 0, 8];
        data.extend_from_slice(b"free");
        data.extend_from_slice(&[0, 0, 0, 8]);
        data.extend_from_slice(b"skip");
        let mut buf = buffer(&data);
        let headers = read_box_list(&mut buf, 0).unwrap();
        assert_eq!(headers.len(), 2);
        assert_eq!(&headers[0].box_type, b"free");
        assert_eq!(&headers[1].box_type, b"skip");
    }
}
