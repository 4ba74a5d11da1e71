//! `mdat`: the item content store, and the per-item chunk views into it.
//!
//! Grounded on `heif.content`. The original cascades a resize through a
//! chain of `on_resize` closures (chunk -> mdat box header -> sibling
//! relocation). Here that cascade is driven explicitly: [`Content::rewrite_chunk`]
//! performs every step itself rather than installing closures, since the
//! buffer tree's ownership makes a literal closure chain awkward to express
//! without a compiler to check it against.

use crate::error::{AssembleError, AssembleResult};
use crate::heif::meta::Meta;
use crate::isobmff::boxes::BoxHeader;
use crate::isobmff::buffer::BoundedBuffer;

/// What kind of item a chunk holds.
#[derive(Debug)]
pub enum ChunkKind {
    /// Ordinary opaque item data.
    Data,
    /// `application/rdf+xml`: the still image's embedded XMP packet.
    Xmp,
    /// An item whose `content_start` lies before `mdat`'s content (outside
    /// this file entirely, or in a region this crate doesn't own) — tracked
    /// for completeness but never read or rewritten.
    Pointer,
}

/// One item's view into `mdat`.
#[derive(Debug)]
pub struct Chunk {
    pub id: u16,
    pub index: usize,
    pub kind: ChunkKind,
    pub buffer: Option<BoundedBuffer>,
    pub size: i64,
    original_position_absolute: i64,
    delta: i64,
}

impl Chunk {
    /// Current absolute offset of this chunk's content, after any
    /// relocations applied so far.
    pub fn current_position_absolute(&self) -> i64 {
        self.original_position_absolute + self.delta
    }
}

/// `mdat`: owns the box header (for resizing) and every item's [`Chunk`].
#[derive(Debug)]
pub struct Content {
    pub header: BoxHeader,
    chunks: Vec<Chunk>,
}

impl Content {
    /// Read `mdat` at `offset` and build a [`Chunk`] for every `iloc` entry
    /// in `meta`, ordered to match `meta.iloc`'s ascending `content_start`.
    pub fn read(buffer: &mut BoundedBuffer, offset: i64, meta: &Meta) -> AssembleResult<Self> {
        let header = BoxHeader::read(buffer, offset)?;
        header.expect_type(b"mdat")?;
        let file_contents = header.contents(buffer);
        let contents_absolute = file_contents.absolute_offset(0);

        let mut chunks = Vec::with_capacity(meta.iloc.entries_by_start().len());
        for (index, entry) in meta.iloc.entries_by_start().into_iter().enumerate() {
            let infe = meta.iinf.find(entry.id)?;
            if entry.content_start < contents_absolute {
                chunks.push(Chunk {
                    id: entry.id,
                    index,
                    kind: ChunkKind::Pointer,
                    buffer: None,
                    size: 0,
                    original_position_absolute: entry.content_start,
                    delta: 0,
                });
                continue;
            }

            let relative = entry.content_start - contents_absolute;
            let chunk_buffer = file_contents.sub_buffer(relative, entry.content_size);
            let kind = if infe.inf == "mime" && infe.mime.as_deref() == Some("application/rdf+xml")
            {
                ChunkKind::Xmp
            } else {
                ChunkKind::Data
            };
            chunks.push(Chunk {
                id: entry.id,
                index,
                kind,
                size: chunk_buffer.size(),
                buffer: Some(chunk_buffer),
                original_position_absolute: entry.content_start,
                delta: 0,
            });
        }

        Ok(Self { header, chunks })
    }

    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    pub fn chunk_mut(&mut self, id: u16) -> AssembleResult<&mut Chunk> {
        self.chunks
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| AssembleError::Parse(format!("no content chunk for item id {}", id)))
    }

    /// Read a chunk's current bytes directly from `file_buffer`, at its
    /// current absolute position — correct even after earlier rewrites have
    /// relocated it, unlike its (possibly now-stale) detached `buffer` view.
    pub fn read_chunk(&self, file_buffer: &mut BoundedBuffer, id: u16) -> AssembleResult<Vec<u8>> {
        let chunk = self
            .chunks
            .iter()
            .find(|c| c.id == id)
            .ok_or_else(|| AssembleError::Parse(format!("no content chunk for item id {}", id)))?;
        file_buffer.seek(chunk.current_position_absolute());
        file_buffer.read(chunk.size)
    }

    /// Rewrite an item's content in `file_buffer` at its current absolute
    /// position, then cascade the resulting size delta: update its `iloc`
    /// size entry, resize `mdat`'s own box header directly (its header
    /// bytes already live in `file_buffer`'s own span range), and relocate
    /// every later chunk's `iloc` start entry.
    ///
    /// Every write here targets `file_buffer` (the file's root buffer)
    /// directly by absolute offset rather than through a nested per-chunk
    /// buffer: since every offset in this crate is resolved once at parse
    /// time, there's no need to walk a live parent chain to find where a
    /// byte range actually lives on disk.
    pub fn rewrite_chunk(
        &mut self,
        file_buffer: &mut BoundedBuffer,
        meta: &mut Meta,
        id: u16,
        content: Vec<u8>,
    ) -> AssembleResult<()> {
        let chunk = self.chunk_mut(id)?;
        if chunk.buffer.is_none() {
            return Err(AssembleError::Structural(
                "cannot rewrite a pointer chunk".to_string(),
            ));
        }
        let old_size = chunk.size;
        let absolute = chunk.current_position_absolute();
        let index = chunk.index;

        file_buffer.seek(absolute);
        let delta = file_buffer.write(old_size, content)?;

        let chunk = self.chunk_mut(id)?;
        chunk.size += delta;

        meta.iloc.set_content_size(file_buffer, id, chunk.size)?;
        self.header.resize(file_buffer, delta)?;

        for later in self.chunks.iter_mut().filter(|c| c.index > index) {
            later.delta += delta;
            let new_start = later.current_position_absolute();
            meta.iloc.set_content_start(file_buffer, later.id, new_start)?;
        }
        Ok(())
    }
}
