//! QuickTime/MP4 `moov`/`mvhd`: just enough of the movie header to recover
//! the companion video's duration for the Motion Photo trailer. Grounded on
//! `qt.meta`.

use crate::error::AssembleResult;
use crate::isobmff::boxes::BoxHeader;
use crate::isobmff::buffer::BoundedBuffer;

/// `mvhd`: movie header. Only the fields needed to compute
/// [`Mvhd::duration_in_us`] are kept; the rest of the FullAtom is still
/// consumed during parsing to leave the buffer pointer in the right place.
#[derive(Debug)]
pub struct Mvhd {
    pub creation_time: u32,
    pub modification_time: u32,
    pub time_scale: u32,
    pub duration: u32,
}

impl Mvhd {
    pub fn read(buffer: &mut BoundedBuffer, offset: i64) -> AssembleResult<Self> {
        let (header, _version, _flags) = BoxHeader::read_full_atom(buffer, offset)?;
        header.expect_type(b"mvhd")?;
        buffer.seek(offset + header.content_offset);
        let creation_time = buffer.read_u32_be()?;
        let modification_time = buffer.read_u32_be()?;
        let time_scale = buffer.read_u32_be()?;
        let duration = buffer.read_u32_be()?;
        // preferred_rate, preferred_volume, reserved, matrix, preview/poster
        // fields, next_track_id: not needed downstream, but read past so a
        // caller seeking further into the box lands correctly.
        let _preferred_rate = buffer.read_u32_be()?;
        let _preferred_volume = buffer.read_u16_be()?;
        let _reserved = buffer.read(10)?;
        let _matrix = buffer.read(36)?;
        let _preview_time = buffer.read_u32_be()?;
        let _preview_duration = buffer.read_u32_be()?;
        let _poster_time = buffer.read_u32_be()?;
        let _selection_time = buffer.read_u32_be()?;
        let _selection_duration = buffer.read_u32_be()?;
        let _current_time = buffer.read_u32_be()?;
        let _next_track_id = buffer.read_u32_be()?;

        Ok(Self {
            creation_time,
            modification_time,
            time_scale,
            duration,
        })
    }

    /// The movie's duration in microseconds, rounded to the nearest integer.
    pub fn duration_in_us(&self) -> i64 {
        ((self.duration as f64) / (self.time_scale as f64) * 1_000_000.0).round() as i64
    }
}

/// `moov`: movie box. Only descends into `mvhd`; every other child
/// (`trak`, `udta`, ...) is retained as a header only, since this crate
/// never needs to rewrite them.
#[derive(Debug)]
pub struct Moov {
    pub header: BoxHeader,
    pub mvhd: Mvhd,
    pub other_children: Vec<BoxHeader>,
}

impl Moov {
    pub fn read(buffer: &mut BoundedBuffer, offset: i64) -> AssembleResult<Self> {
        let header = BoxHeader::read(buffer, offset)?;
        header.expect_type(b"moov")?;

        let mut mvhd = None;
        let mut other_children = Vec::new();
        let mut pos = offset + header.content_offset;
        while pos < offset + header.size {
            let child = BoxHeader::read(buffer, pos)?;
            if &child.box_type == b"mvhd" {
                mvhd = Some(Mvhd::read(buffer, child.offset)?);
            } else {
                other_children.push(child.clone());
            }
            pos = child.next_offset();
        }

        Ok(Self {
            header,
            mvhd: mvhd.ok_or_else(|| {
                crate::error::AssembleError::Parse("moov box missing mvhd".to_string())
            })?,
            other_children,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duration_in_us_rounds() {
        let mvhd = Mvhd {
            creation_time: 0,
            modification_time: 0,
            time_scale: 600,
            duration: 1801,
        };
        assert_eq!(mvhd.duration_in_us(), 3_001_667);
    }
}
