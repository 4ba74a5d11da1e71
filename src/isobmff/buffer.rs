//! Span-edited buffer
//!
//! A half-open byte window over an underlying reader, backed by an ordered
//! list of spans: slices of the original bytes, inline literals written
//! during editing, or nested child buffers. Writes splice the span list
//! rather than copying the whole buffer, so a single field rewrite deep
//! inside a large file stays cheap; `commit` walks the spans in order to
//! produce the final byte stream.
//!
//! Grounded on the original `isobmff.BoundedBuffer`. Parent back-references
//! are replaced here by an `parent_absolute` base offset captured at
//! construction and an explicit `on_resize` callback installed at
//! attachment time, keeping the buffer tree a strict ownership tree.

use crate::error::{AssembleError, AssembleResult};
use std::cell::RefCell;
use std::io::{Read, Seek, SeekFrom, Write};
use std::rc::Rc;

/// Anything a [`BoundedBuffer`] can read its original bytes from.
pub trait ReadSeek: Read + Seek {}
impl<T: Read + Seek> ReadSeek for T {}

/// A source shared by every buffer in one file's buffer tree. Per the
/// concurrency model (single worker per file), this never crosses threads.
pub type SharedReader = Rc<RefCell<dyn ReadSeek>>;

/// Chunk size used to subdivide a freshly-opened buffer's initial
/// `Original` span, matching the original implementation's constant.
const CHUNK_SIZE: i64 = 10_000;

#[derive(Debug)]
enum Span {
    /// A slice `[start, start+len)` of this buffer's original bytes.
    Original { start: i64, len: i64 },
    /// An owned literal byte sequence inserted by an edit.
    Inline(Vec<u8>),
    /// A nested buffer substituted at this position.
    Child(BoundedBuffer),
}

impl Span {
    fn len(&self) -> i64 {
        match self {
            Span::Original { len, .. } => *len,
            Span::Inline(bytes) => bytes.len() as i64,
            Span::Child(child) => child.size,
        }
    }
}

/// A byte window over an underlying reader, edited via an ordered span list.
pub struct BoundedBuffer {
    source: SharedReader,
    /// Absolute byte offset of this buffer's logical position 0 within
    /// `source`, as of construction (or last re-anchoring via `attach_child`).
    parent_absolute: i64,
    spans: Vec<Span>,
    size: i64,
    ptr: i64,
    on_resize: Option<Box<dyn FnMut(i64)>>,
}

impl std::fmt::Debug for BoundedBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoundedBuffer")
            .field("parent_absolute", &self.parent_absolute)
            .field("size", &self.size)
            .field("ptr", &self.ptr)
            .field("spans", &self.spans.len())
            .finish()
    }
}

impl BoundedBuffer {
    /// Open the root buffer of a file: covers `[0, size)` of `source`.
    pub fn new_root(source: SharedReader, size: i64) -> Self {
        Self::with_initial_spans(source, 0, size)
    }

    /// A sub-window of this buffer, not yet attached to its span list.
    /// Shares the same underlying reader; its own coordinate space starts
    /// at 0 and its absolute position is resolved through this buffer.
    pub fn sub_buffer(&self, relative_offset: i64, len: i64) -> Self {
        let absolute = self.absolute_offset(relative_offset);
        Self::with_initial_spans(Rc::clone(&self.source), absolute, len)
    }

    fn with_initial_spans(source: SharedReader, parent_absolute: i64, size: i64) -> Self {
        let mut spans = Vec::new();
        let mut pos = 0i64;
        while pos < size {
            let len = CHUNK_SIZE.min(size - pos);
            spans.push(Span::Original { start: pos, len });
            pos += len;
        }
        Self {
            source,
            parent_absolute,
            spans,
            size,
            ptr: 0,
            on_resize: None,
        }
    }

    /// Install the callback invoked with the size delta of every `write`.
    pub fn set_on_resize(&mut self, callback: Box<dyn FnMut(i64)>) {
        self.on_resize = Some(callback);
    }

    /// Current logical size of the buffer.
    pub fn size(&self) -> i64 {
        self.size
    }

    pub fn seek(&mut self, position: i64) {
        self.ptr = position;
    }

    pub fn current_position(&self) -> i64 {
        self.ptr
    }

    /// Translate a position relative to this buffer into an absolute
    /// position in the underlying reader. Valid for positions inside the
    /// buffer's still-original span (true of every use in this crate: box
    /// headers and `mdat` offsets are always resolved before any edits).
    pub fn absolute_offset(&self, relative: i64) -> i64 {
        self.parent_absolute + relative
    }

    /// Alias matching the original `BoundedBuffer.offs`.
    pub fn offs(&self, relative: i64) -> i64 {
        self.absolute_offset(relative)
    }

    /// Read `n` bytes starting at the current pointer, advancing it.
    pub fn read(&mut self, n: i64) -> AssembleResult<Vec<u8>> {
        if self.ptr + n > self.size {
            return Err(AssembleError::Parse(format!(
                "buffer underrun: requested {} bytes at position {} but size is {}",
                n, self.ptr, self.size
            )));
        }
        let bytes = self.read_range(self.ptr, n)?;
        self.ptr += n;
        Ok(bytes)
    }

    fn read_range(&self, pos: i64, len: i64) -> AssembleResult<Vec<u8>> {
        let mut out = Vec::with_capacity(len as usize);
        let mut cursor = 0i64;
        let mut remaining = len;
        let mut want_pos = pos;

        for span in &self.spans {
            if remaining <= 0 {
                break;
            }
            let span_len = span.len();
            let span_start = cursor;
            let span_end = cursor + span_len;
            cursor = span_end;

            if span_end <= want_pos {
                continue;
            }
            let local_start = want_pos - span_start;
            let available = span_len - local_start;
            let take = available.min(remaining);

            match span {
                Span::Original { start, .. } => {
                    out.extend_from_slice(&self.read_original(start + local_start, take)?);
                }
                Span::Inline(bytes) => {
                    out.extend_from_slice(
                        &bytes[local_start as usize..(local_start + take) as usize],
                    );
                }
                Span::Child(child) => {
                    out.extend_from_slice(&child.read_range(local_start, take)?);
                }
            }

            want_pos += take;
            remaining -= take;
        }

        if remaining > 0 {
            return Err(AssembleError::Parse(format!(
                "buffer underrun: {} bytes unavailable after position {}",
                remaining, pos
            )));
        }
        Ok(out)
    }

    fn read_original(&self, start: i64, len: i64) -> AssembleResult<Vec<u8>> {
        let absolute = self.parent_absolute + start;
        let mut source = self.source.borrow_mut();
        source.seek(SeekFrom::Start(absolute as u64))?;
        let mut buf = vec![0u8; len as usize];
        source.read_exact(&mut buf)?;
        Ok(buf)
    }

    pub fn read_u8(&mut self) -> AssembleResult<u8> {
        Ok(self.read(1)?[0])
    }

    pub fn read_u16_be(&mut self) -> AssembleResult<u16> {
        let b = self.read(2)?;
        Ok(u16::from_be_bytes([b[0], b[1]]))
    }

    pub fn read_u32_be(&mut self) -> AssembleResult<u32> {
        let b = self.read(4)?;
        Ok(u32::from_be_bytes(b.try_into().unwrap()))
    }

    pub fn read_u64_be(&mut self) -> AssembleResult<u64> {
        let b = self.read(8)?;
        Ok(u64::from_be_bytes(b.try_into().unwrap()))
    }

    /// Read a NUL-terminated string.
    pub fn read_cstring(&mut self) -> AssembleResult<String> {
        let mut bytes = Vec::new();
        loop {
            let b = self.read(1)?[0];
            if b == 0 {
                break;
            }
            bytes.push(b);
        }
        String::from_utf8(bytes)
            .map_err(|e| AssembleError::Parse(format!("invalid cstring: {}", e)))
    }

    /// Replace `size` bytes at the current pointer with `content`,
    /// returning the size delta (`content.len() as i64 - size`).
    pub fn write(&mut self, size: i64, content: Vec<u8>) -> AssembleResult<i64> {
        let offset = self.ptr;
        let delta = self.splice(offset, size, Span::Inline(content))?;
        self.ptr = offset + size + delta;
        self.size += delta;
        if let Some(callback) = self.on_resize.as_mut() {
            callback(delta);
        }
        Ok(delta)
    }

    pub fn write_u32_be(&mut self, value: u32) -> AssembleResult<i64> {
        self.write(4, value.to_be_bytes().to_vec())
    }

    pub fn write_u64_be(&mut self, value: u64) -> AssembleResult<i64> {
        self.write(8, value.to_be_bytes().to_vec())
    }

    /// Insert `child` as a substituted span at `relative_offset`, replacing
    /// exactly `child.size()` original bytes (so this never changes this
    /// buffer's own size).
    pub fn attach_child(&mut self, relative_offset: i64, child: BoundedBuffer) -> AssembleResult<()> {
        let child_len = child.size;
        let saved_ptr = self.ptr;
        self.ptr = relative_offset;
        let delta = self.splice(relative_offset, child_len, Span::Child(child))?;
        debug_assert_eq!(delta, 0, "attaching a child must not change buffer size");
        self.ptr = saved_ptr;
        Ok(())
    }

    /// The core edit algorithm: replace the `size` bytes at `offset` with
    /// `new_span`, splitting spans at the boundaries as needed.
    fn splice(&mut self, offset: i64, size: i64, new_span: Span) -> AssembleResult<i64> {
        let content_len = new_span.len();
        let delta = content_len - size;
        let end = offset + size;

        let old_spans = std::mem::take(&mut self.spans);
        let mut result = Vec::with_capacity(old_spans.len() + 2);
        let mut cursor = 0i64;
        let mut pending = Some(new_span);

        for span in old_spans {
            let span_len = span.len();
            let span_start = cursor;
            let span_end = cursor + span_len;
            cursor = span_end;

            if span_end <= offset {
                result.push(span);
                continue;
            }
            if span_start >= end {
                if let Some(s) = pending.take() {
                    result.push(s);
                }
                result.push(span);
                continue;
            }

            let leading_len = if span_start < offset { offset - span_start } else { 0 };
            let trailing_len = if span_end > end { span_end - end } else { 0 };

            if leading_len > 0 {
                result.push(Self::slice_leading(&span, leading_len)?);
            }
            if let Some(s) = pending.take() {
                result.push(s);
            }
            if trailing_len > 0 {
                result.push(Self::slice_trailing(&span, span_len - trailing_len)?);
            }
        }

        if let Some(s) = pending.take() {
            result.push(s);
        }

        result.retain(|s| s.len() > 0);
        self.spans = result;
        self.sanity_check()?;
        Ok(delta)
    }

    fn slice_leading(span: &Span, len: i64) -> AssembleResult<Span> {
        match span {
            Span::Original { start, .. } => Ok(Span::Original { start: *start, len }),
            Span::Inline(bytes) => Ok(Span::Inline(bytes[..len as usize].to_vec())),
            Span::Child(_) => Err(AssembleError::Structural(
                "cannot split an edit into a child buffer's span".to_string(),
            )),
        }
    }

    fn slice_trailing(span: &Span, skip: i64) -> AssembleResult<Span> {
        match span {
            Span::Original { start, len } => Ok(Span::Original {
                start: *start + skip,
                len: *len - skip,
            }),
            Span::Inline(bytes) => Ok(Span::Inline(bytes[skip as usize..].to_vec())),
            Span::Child(_) => Err(AssembleError::Structural(
                "cannot split an edit into a child buffer's span".to_string(),
            )),
        }
    }

    fn sanity_check(&self) -> AssembleResult<()> {
        let mut last_end: Option<i64> = None;
        for span in &self.spans {
            if let Span::Original { start, len } = span {
                if let Some(prev_end) = last_end {
                    if *start < prev_end {
                        return Err(AssembleError::Structural(format!(
                            "non-monotonic original span: start {} precedes previous end {}",
                            start, prev_end
                        )));
                    }
                }
                last_end = Some(start + len);
            }
        }
        Ok(())
    }

    /// Emit every span in order to `sink`: `Original` spans are read back
    /// from the underlying reader, `Inline` spans are written verbatim,
    /// and `Child` spans recurse.
    pub fn commit<W: Write>(&self, sink: &mut W) -> AssembleResult<()> {
        for span in &self.spans {
            match span {
                Span::Original { start, len } => {
                    sink.write_all(&self.read_original(*start, *len)?)?;
                }
                Span::Inline(bytes) => sink.write_all(bytes)?,
                Span::Child(child) => child.commit(sink)?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn reader(data: &[u8]) -> SharedReader {
        Rc::new(RefCell::new(Cursor::new(data.to_vec())))
    }

    #[test]
    fn test_round_trip_no_edits() {
        let data = b"hello, motion photo".to_vec();
        let mut buf = BoundedBuffer::new_root(reader(&data), data.len() as i64);
        let mut out = Vec::new();
        buf.commit(&mut out).unwrap();
        assert_eq!(out, data);
    }

    #[test]
    fn test_read_sequential() {
        let data = b"0123456789".to_vec();
        let mut buf = BoundedBuffer::new_root(reader(&data), data.len() as i64);
        assert_eq!(buf.read(3).unwrap(), b"012");
        assert_eq!(buf.read(3).unwrap(), b"345");
        assert_eq!(buf.current_position(), 6);
    }

    #[test]
    fn test_read_underrun() {
        let data = b"abc".to_vec();
        let mut buf = BoundedBuffer::new_root(reader(&data), data.len() as i64);
        assert!(buf.read(10).is_err());
    }

    #[test]
    fn test_write_grows_and_commits() {
        let data = b"0123456789".to_vec();
        let mut buf = BoundedBuffer::new_root(reader(&data), data.len() as i64);
        buf.seek(2);
        let delta = buf.write(3, b"XXXXXXXX".to_vec()).unwrap();
        assert_eq!(delta, 5);
        assert_eq!(buf.size(), 15);

        let mut out = Vec::new();
        buf.commit(&mut out).unwrap();
        assert_eq!(out, b"01XXXXXXXX56789");
    }

    #[test]
    fn test_write_shrinks() {
        let data = b"0123456789".to_vec();
        let mut buf = BoundedBuffer::new_root(reader(&data), data.len() as i64);
        buf.seek(0);
        let delta = buf.write(10, b"hi".to_vec()).unwrap();
        assert_eq!(delta, -8);
        assert_eq!(buf.size(), 2);

        let mut out = Vec::new();
        buf.commit(&mut out).unwrap();
        assert_eq!(out, b"hi");
    }

    #[test]
    fn test_resize_callback_invoked() {
        let data = b"0123456789".to_vec();
        let mut buf = BoundedBuffer::new_root(reader(&data), data.len() as i64);
        let seen = Rc::new(RefCell::new(0i64));
        let seen_clone = Rc::clone(&seen);
        buf.set_on_resize(Box::new(move |delta| {
            *seen_clone.borrow_mut() += delta;
        }));
        buf.seek(0);
        buf.write(1, b"ab".to_vec()).unwrap();
        assert_eq!(*seen.borrow(), 1);
    }

    #[test]
    fn test_sub_buffer_reads_parent_bytes() {
        let data = b"0123456789".to_vec();
        let root = BoundedBuffer::new_root(reader(&data), data.len() as i64);
        let mut sub = root.sub_buffer(3, 4);
        assert_eq!(sub.read(4).unwrap(), b"3456");
    }
}
