//! HEIF `meta` box family: `iinf`/`infe` (item info) and `iloc` (item
//! location). Grounded on `heif.meta`.

use crate::error::{AssembleError, AssembleResult};
use crate::isobmff::boxes::BoxHeader;
use crate::isobmff::buffer::BoundedBuffer;

/// `infe`: one entry of the `iinf` item info box.
#[derive(Debug, Clone)]
pub struct Infe {
    pub id: u16,
    pub reserved: u16,
    pub inf: String,
    pub mime: Option<String>,
}

impl Infe {
    /// Read one `infe` entry at `offset`, returning it along with the
    /// absolute offset of the next sibling box.
    fn read(buffer: &mut BoundedBuffer, offset: i64) -> AssembleResult<(Self, i64)> {
        let (header, _version, _flags) = BoxHeader::read_full_atom(buffer, offset)?;
        header.expect_type(b"infe")?;
        buffer.seek(offset + header.content_offset);
        let id = buffer.read_u16_be()?;
        let reserved = buffer.read_u16_be()?;
        let inf = buffer.read_cstring()?;
        let mime = if inf == "mime" {
            Some(buffer.read_cstring()?)
        } else {
            None
        };
        Ok((Self { id, reserved, inf, mime }, header.next_offset()))
    }
}

/// `iinf`: the full item info box, one [`Infe`] per item.
#[derive(Debug)]
pub struct Iinf {
    pub count: u16,
    entries: Vec<Infe>,
}

impl Iinf {
    pub fn read(buffer: &mut BoundedBuffer, offset: i64) -> AssembleResult<Self> {
        let (header, _version, _flags) = BoxHeader::read_full_atom(buffer, offset)?;
        header.expect_type(b"iinf")?;
        buffer.seek(offset + header.content_offset);
        let count = buffer.read_u16_be()?;

        let mut content = header.contents(buffer);
        content.seek(2);
        let mut entries = Vec::new();
        let mut pos = 2i64;
        while pos < content.size() {
            let (entry, next_pos) = Infe::read(&mut content, pos)?;
            pos = next_pos;
            entries.push(entry);
        }

        if entries.len() as u16 != count {
            return Err(AssembleError::Parse(format!(
                "invalid iinf box: header says {} entries, found {}",
                count,
                entries.len()
            )));
        }

        Ok(Self { count, entries })
    }

    pub fn iter(&self) -> impl Iterator<Item = &Infe> {
        self.entries.iter()
    }

    /// Find the item id of the first entry whose `inf` tag matches `kind`
    /// (e.g. `"mime"`).
    pub fn first_id_of_kind(&self, kind: &str) -> Option<u16> {
        self.entries.iter().find(|e| e.inf == kind).map(|e| e.id)
    }

    /// All item ids whose `inf` tag matches `kind`, in encounter order.
    pub fn ids_of_kind(&self, kind: &str) -> Vec<u16> {
        self.entries.iter().filter(|e| e.inf == kind).map(|e| e.id).collect()
    }

    pub fn find(&self, id: u16) -> AssembleResult<&Infe> {
        self.entries
            .iter()
            .find(|e| e.id == id)
            .ok_or_else(|| AssembleError::Parse(format!("no infe entry for item id {}", id)))
    }
}

/// Byte offsets of the mutable fields within a 16-byte `iloc` entry record,
/// relative to the entry's own start.
const ILOC_ENTRY_SIZE: i64 = 16;
const OFFSET_CONTENT_START: i64 = 8;
const OFFSET_CONTENT_SIZE: i64 = 12;

/// `iloc` entry: item id plus the absolute byte range of its content in
/// `mdat`. Rewritten in place (`set_content_start`/`set_content_size`) as
/// other items shift or resize.
#[derive(Debug, Clone)]
pub struct IlocEntry {
    /// Byte offset of this entry's record within the owning [`Iloc`]'s
    /// content buffer, used to target in-place rewrites.
    offset: i64,
    pub id: u16,
    pub reserved: u16,
    pub reserved_1: u32,
    pub content_start: i64,
    pub content_size: i64,
}

impl IlocEntry {
    fn read(buffer: &mut BoundedBuffer) -> AssembleResult<Self> {
        let offset = buffer.current_position();
        let id = buffer.read_u16_be()?;
        let reserved = buffer.read_u16_be()?;
        let reserved_1 = buffer.read_u32_be()?;
        let content_start = buffer.read_u32_be()? as i64;
        let content_size = buffer.read_u32_be()? as i64;
        Ok(Self {
            offset,
            id,
            reserved,
            reserved_1,
            content_start,
            content_size,
        })
    }
}

/// `iloc`: item location table.
///
/// Entries are rewritten via [`Iloc::set_content_start`]/[`Iloc::set_content_size`],
/// which target the caller's root file buffer directly at this entry's
/// absolute offset, rather than through an owned nested sub-buffer: every
/// offset here is already absolute (resolved once at parse time), so a
/// domain-level rewrite is a single direct seek+write on the root — there's
/// no live parent chain to walk, unlike the buffer this is grounded on.
#[derive(Debug)]
pub struct Iloc {
    pub reserved: u16,
    pub count: u16,
    /// Absolute file offset of the first entry record.
    content_absolute_offset: i64,
    entries: Vec<IlocEntry>,
}

impl Iloc {
    pub fn read(buffer: &mut BoundedBuffer, offset: i64) -> AssembleResult<Self> {
        let (mut header, _version, _flags) = BoxHeader::read_full_atom(buffer, offset)?;
        header.expect_type(b"iloc")?;
        buffer.seek(offset + header.content_offset);
        let reserved = buffer.read_u16_be()?;
        let count = buffer.read_u16_be()?;
        header.content_offset += 4;

        let mut content = header.contents(buffer);
        let content_absolute_offset = content.absolute_offset(0);
        content.seek(0);
        let mut entries = Vec::new();
        for _ in 0..count {
            entries.push(IlocEntry::read(&mut content)?);
        }

        Ok(Self {
            reserved,
            count,
            content_absolute_offset,
            entries,
        })
    }

    /// Entries ordered by ascending `content_start`, matching on-disk layout.
    pub fn entries_by_start(&self) -> Vec<&IlocEntry> {
        let mut v: Vec<&IlocEntry> = self.entries.iter().collect();
        v.sort_by_key(|e| e.content_start);
        v
    }

    /// Entries ordered by descending `content_start`, the order to apply
    /// relocations in so earlier writes never invalidate later offsets.
    pub fn reversed(&self) -> Vec<&IlocEntry> {
        let mut v: Vec<&IlocEntry> = self.entries.iter().collect();
        v.sort_by_key(|e| std::cmp::Reverse(e.content_start));
        v
    }

    pub fn get(&self, id: u16) -> AssembleResult<&IlocEntry> {
        self.entries
            .iter()
            .find(|e| e.id == id)
            .ok_or_else(|| AssembleError::Parse(format!("no iloc entry for item id {}", id)))
    }

    fn index_of(&self, id: u16) -> AssembleResult<usize> {
        self.entries
            .iter()
            .position(|e| e.id == id)
            .ok_or_else(|| AssembleError::Parse(format!("no iloc entry for item id {}", id)))
    }

    pub fn set_content_start(&mut self, root: &mut BoundedBuffer, id: u16, n: i64) -> AssembleResult<()> {
        let idx = self.index_of(id)?;
        let record_offset = self.content_absolute_offset + self.entries[idx].offset;
        root.seek(record_offset + OFFSET_CONTENT_START);
        root.write_u32_be(n as u32)?;
        self.entries[idx].content_start = n;
        Ok(())
    }

    pub fn set_content_size(&mut self, root: &mut BoundedBuffer, id: u16, n: i64) -> AssembleResult<()> {
        let idx = self.index_of(id)?;
        let record_offset = self.content_absolute_offset + self.entries[idx].offset;
        root.seek(record_offset + OFFSET_CONTENT_SIZE);
        root.write_u32_be(n as u32)?;
        self.entries[idx].content_size = n;
        Ok(())
    }
}

/// `meta`: FullAtom container holding (among other children) `iinf` and
/// `iloc`. Other children are parsed only as headers.
#[derive(Debug)]
pub struct Meta {
    pub header: BoxHeader,
    pub iinf: Iinf,
    pub iloc: Iloc,
    pub other_children: Vec<BoxHeader>,
}

impl Meta {
    pub fn read(buffer: &mut BoundedBuffer, offset: i64) -> AssembleResult<Self> {
        let (header, _version, _flags) = BoxHeader::read_full_atom(buffer, offset)?;
        header.expect_type(b"meta")?;

        let mut iinf = None;
        let mut iloc = None;
        let mut other_children = Vec::new();

        let mut pos = offset + header.content_offset;
        while pos < offset + header.size {
            let child = BoxHeader::read(buffer, pos)?;
            match &child.box_type {
                b"iinf" => iinf = Some(Iinf::read(buffer, child.offset)?),
                b"iloc" => iloc = Some(Iloc::read(buffer, child.offset)?),
                _ => other_children.push(child.clone()),
            }
            pos = child.next_offset();
        }

        Ok(Self {
            header,
            iinf: iinf.ok_or_else(|| AssembleError::Parse("meta box missing iinf".to_string()))?,
            iloc: iloc.ok_or_else(|| AssembleError::Parse("meta box missing iloc".to_string()))?,
            other_children,
        })
    }
}
