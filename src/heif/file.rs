//! HEIF still-image file: the `meta`/`mdat` pair a Motion Photo's still
//! image is read from. Grounded on `heif.HeifFile`.

use crate::error::{AssembleError, AssembleResult};
use crate::heif::content::Content;
use crate::heif::meta::Meta;
use crate::isobmff::media::MediaFile;

/// An opened HEIF file: the generic top-level box list plus the specialised
/// `meta` and `mdat` boxes this crate actually reads and rewrites.
pub struct HeifFile {
    pub media: MediaFile,
    pub meta: Meta,
    pub content: Content,
}

impl HeifFile {
    pub fn open(path: impl AsRef<std::path::Path>) -> AssembleResult<Self> {
        let mut media = MediaFile::open(path)?;
        let meta_header = media
            .find(b"meta")
            .ok_or_else(|| AssembleError::Parse("HEIF file missing meta box".to_string()))?
            .clone();
        let mdat_header = media
            .find(b"mdat")
            .ok_or_else(|| AssembleError::Parse("HEIF file missing mdat box".to_string()))?
            .clone();

        let meta = Meta::read(&mut media.buffer, meta_header.offset)?;
        let content = Content::read(&mut media.buffer, mdat_header.offset, &meta)?;

        Ok(Self { media, meta, content })
    }

    /// The item id of the still image's embedded XMP packet, if any.
    pub fn xmp_item_id(&self) -> Option<u16> {
        self.meta.iinf.first_id_of_kind("mime").filter(|id| {
            self.meta
                .iinf
                .find(*id)
                .map(|infe| infe.mime.as_deref() == Some("application/rdf+xml"))
                .unwrap_or(false)
        })
    }
}
