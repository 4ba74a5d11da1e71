//! JPEG marker walker
//!
//! A collaborator that reuses the span-edited buffer but sits outside the
//! Motion Photo assembly critical path. Grounded on `jpeg.Marker` /
//! `jpeg.JpegFile`.

use crate::error::{AssembleError, AssembleResult};
use crate::isobmff::buffer::BoundedBuffer;

/// Marker type byte, following the `0xFF` sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerKind {
    Soi,
    Sof0,
    Sof2,
    Dht,
    Dqt,
    Dri,
    Com,
    Rst(u8),
    App(u8),
    Stream,
}

impl MarkerKind {
    fn from_type_byte(byte: u8) -> Option<Self> {
        match byte {
            0xD8 => Some(Self::Soi),
            0xC0 => Some(Self::Sof0),
            0xC2 => Some(Self::Sof2),
            0xC4 => Some(Self::Dht),
            0xDB => Some(Self::Dqt),
            0xDD => Some(Self::Dri),
            0xFE => Some(Self::Com),
            0xDA => Some(Self::Stream),
            b if (0xD0..0xD8).contains(&b) => Some(Self::Rst(b)),
            b if (0xE0..=0xEF).contains(&b) => Some(Self::App(b)),
            _ => None,
        }
    }

    /// Whether this marker kind carries a 2-byte big-endian data length
    /// (`MarkerWithData` in the original walker).
    fn has_length_field(self) -> bool {
        !matches!(self, MarkerKind::Soi | MarkerKind::Rst(_))
    }
}

/// One parsed marker: its kind, the offset of its `0xFF` sentinel, and the
/// byte length of whatever follows the 2-byte header (0 for markers with no
/// data field).
#[derive(Debug)]
pub struct Marker {
    pub kind: MarkerKind,
    pub offset: i64,
    pub size: i64,
}

impl Marker {
    fn next_offset(&self) -> i64 {
        self.offset + 2 + self.size
    }
}

/// Read every marker starting at `offset`, stopping when the buffer is
/// exhausted or the next type byte matches no registered marker.
pub fn read_markers(buffer: &mut BoundedBuffer, offset: i64) -> AssembleResult<Vec<Marker>> {
    let mut markers = Vec::new();
    let mut pos = offset;

    while pos < buffer.size() {
        buffer.seek(pos);
        let sentinel = buffer.read_u8()?;
        if sentinel != 0xFF {
            return Err(AssembleError::Parse(format!(
                "invalid JPEG encoding: expected 0xFF sentinel at {}, found 0x{:02x}",
                pos, sentinel
            )));
        }
        let type_byte = buffer.read_u8()?;
        let Some(kind) = MarkerKind::from_type_byte(type_byte) else {
            break;
        };

        let marker = match kind {
            MarkerKind::Stream => read_stream(buffer, pos)?,
            _ if kind.has_length_field() => {
                let size = buffer.read_u16_be()? as i64 - 2;
                buffer.seek(buffer.current_position() + size);
                Marker { kind, offset: pos, size }
            }
            _ => Marker { kind, offset: pos, size: 0 },
        };

        pos = marker.next_offset();
        markers.push(marker);
    }

    Ok(markers)
}

/// `SOS` through `EOI`: a 2-byte header length, then scan byte-by-byte for
/// `0xFF 0xD9`. If `EOI` never appears, the stream is taken to extend to
/// the end of the buffer (matching a truncated/last-segment JPEG).
fn read_stream(buffer: &mut BoundedBuffer, offset: i64) -> AssembleResult<Marker> {
    let start = offset + 2;
    buffer.seek(start);
    let header_size = buffer.read_u16_be()? as i64;
    buffer.seek(start + header_size);

    loop {
        if buffer.current_position() + 1 > buffer.size() {
            let size = buffer.current_position() + 1 - start;
            return Ok(Marker { kind: MarkerKind::Stream, offset, size });
        }
        let b = buffer.read_u8()?;
        if b == 0xFF {
            let cursor = buffer.current_position();
            let next = buffer.read_u8()?;
            if next == 0xD9 {
                let size = buffer.current_position() - start;
                return Ok(Marker { kind: MarkerKind::Stream, offset, size });
            }
            buffer.seek(cursor);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::io::Cursor;
    use std::rc::Rc;

    fn buffer(data: &[u8]) -> BoundedBuffer {
        BoundedBuffer::new_root(Rc::new(RefCell::new(Cursor::new(data.to_vec()))), data.len() as i64)
    }

    #[test]
    fn test_soi_then_unknown_stops() {
        let data = vec![0xFF, 0xD8, 0xFF, 0x00];
        let mut buf = buffer(&data);
        let markers = read_markers(&mut buf, 0).unwrap();
        assert_eq!(markers.len(), 1);
        assert_eq!(markers[0].kind, MarkerKind::Soi);
    }

    #[test]
    fn test_com_marker_with_length() {
        let mut data = vec![0xFF, 0xD8, 0xFF, 0xFE, 0x00, 0x06];
        data.extend_from_slice(b"hi!!");
        let mut buf = buffer(&data);
        let markers = read_markers(&mut buf, 0).unwrap();
        assert_eq!(markers.len(), 2);
        assert_eq!(markers[1].kind, MarkerKind::Com);
        assert_eq!(markers[1].size, 4);
    }

    #[test]
    fn test_stream_consumes_to_eoi() {
        let mut data = vec![0xFF, 0xDA, 0x00, 0x02];
        data.extend_from_slice(&[0x11, 0x22, 0xFF, 0xD9]);
        let mut buf = buffer(&data);
        let markers = read_markers(&mut buf, 0).unwrap();
        assert_eq!(markers.len(), 1);
        assert_eq!(markers[0].kind, MarkerKind::Stream);
        assert_eq!(markers[0].next_offset(), data.len() as i64);
    }

    #[test]
    fn test_stream_truncated_runs_to_buffer_end() {
        let mut data = vec![0xFF, 0xDA, 0x00, 0x02];
        data.extend_from_slice(&[0x11, 0x22, 0x33]);
        let mut buf = buffer(&data);
        let markers = read_markers(&mut buf, 0).unwrap();
        assert_eq!(markers.len(), 1);
        assert_eq!(markers[0].next_offset(), data.len() as i64);
    }

    #[test]
    fn test_invalid_sentinel_errors() {
        let data = vec![0x00, 0xD8];
        let mut buf = buffer(&data);
        assert!(read_markers(&mut buf, 0).is_err());
    }
}
