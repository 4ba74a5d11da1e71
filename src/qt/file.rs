//! QuickTime/MP4 movie file: just enough structure to recover the
//! companion video's duration. Grounded on `qt.QuickTimeFile`.

use crate::error::{AssembleError, AssembleResult};
use crate::isobmff::media::MediaFile;
use crate::qt::meta::Moov;

/// An opened QuickTime/MP4 movie file.
pub struct QuickTimeFile {
    pub media: MediaFile,
    pub moov: Moov,
}

impl QuickTimeFile {
    pub fn open(path: impl AsRef<std::path::Path>) -> AssembleResult<Self> {
        let mut media = MediaFile::open(path)?;
        let moov_header = media
            .find(b"moov")
            .ok_or_else(|| AssembleError::Parse("movie file missing moov box".to_string()))?
            .clone();
        let moov = Moov::read(&mut media.buffer, moov_header.offset)?;
        Ok(Self { media, moov })
    }

    pub fn duration_in_us(&self) -> i64 {
        self.moov.mvhd.duration_in_us()
    }
}
