//! Motion Photo assembler (C6)
//!
//! Merges an opened HEIF still image with a companion QuickTime/MP4 movie
//! into a single file Google Photos recognises as a Motion Photo: the
//! still image's embedded XMP gets a `GCamera`/`Container` description
//! appended, then the movie is appended as a trailing `mpvd` box followed
//! by a 28-byte `mpv2` trailer. Grounded on `motion_photo.py`.

use std::fs;
use std::io::BufWriter;
use std::path::Path;

use tracing::{info, instrument};

use crate::config::AssembleOptions;
use crate::core::metadata::XmpMeta;
use crate::core::node::{Node, StructureNode};
use crate::core::namespace::ns;
use crate::error::{AssembleError, AssembleResult};
use crate::heif::file::HeifFile;
use crate::isobmff::media::AppendedBox;
use crate::isobmff::pointer::{MemoryBox, PointerBox};
use crate::qt::file::QuickTimeFile;
use crate::types::XmpValue;

const XMPTK: &str = "Adobe XMP Core 5.1.0-jc003";
const STILL_IMAGE_MIME: &str = "image/heic";
const MOTION_VIDEO_MIME: &str = "video/mp4";
/// `Item:Length` hint for the motion track when using the `mpv2` trailer
/// convention: the literal byte count of the `mpv2` record's payload
/// marker, not the movie's own size (§9 Open Question).
const MPV2_MOTION_ITEM_LENGTH: i64 = 12;

/// Assemble a Motion Photo from `image_path` (HEIF/HEIC still) and
/// `movie_path` (QuickTime/MP4), writing the result to `output_path`.
///
/// Nothing is written to disk until the very end: all parsing and XMP
/// mutation happens in memory, then the result is written to a temporary
/// path (`options.output_suffix`) and renamed into place, so a failure at
/// any point during commit never leaves a half-written file behind.
#[instrument(skip(options), fields(image = %image_path.as_ref().display(), movie = %movie_path.as_ref().display()))]
pub fn assemble(
    image_path: impl AsRef<Path>,
    movie_path: impl AsRef<Path>,
    output_path: impl AsRef<Path>,
    options: &AssembleOptions,
) -> AssembleResult<()> {
    let image_path = image_path.as_ref();
    let movie_path = movie_path.as_ref();
    let output_path = output_path.as_ref();

    let mut image = HeifFile::open(image_path)?;
    let movie = QuickTimeFile::open(movie_path)?;
    let movie_size = fs::metadata(movie_path)?.len() as i64;
    let dur_us = movie.duration_in_us();

    let presentation_offset = if options.fix_presentation_offset {
        "-1".to_string()
    } else {
        dur_us.to_string()
    };

    let xmp_item_id = image
        .xmp_item_id()
        .ok_or_else(|| AssembleError::Parse("still image has no XMP item".to_string()))?;

    let original_xmp_bytes = image.content.read_chunk(&mut image.media.buffer, xmp_item_id)?;
    let original_xmp = String::from_utf8(original_xmp_bytes)
        .map_err(|e| AssembleError::Parse(format!("XMP chunk is not valid UTF-8: {}", e)))?;
    let mut xmp = XmpMeta::parse(&original_xmp)?;

    append_motion_photo_description(&mut xmp, &presentation_offset)?;
    xmp.set_xmptk(XMPTK);
    let new_xmp = xmp.serialize_packet()?;

    image.content.rewrite_chunk(
        &mut image.media.buffer,
        &mut image.meta,
        xmp_item_id,
        new_xmp.into_bytes(),
    )?;

    let image_size_after_xmp_resize = image.media.buffer.size();

    let mpvd = PointerBox::new(movie.media.buffer, *b"mpvd");
    let mpvd_header_size = mpvd.header_size();
    image.media.add_box(AppendedBox::Pointer(mpvd));

    let mpv2_offset = (image_size_after_xmp_resize + mpvd_header_size) as u32;
    let mut trailer = Vec::with_capacity(28);
    trailer.extend_from_slice(b"MotionPhoto_Data");
    trailer.extend_from_slice(b"mpv2");
    trailer.extend_from_slice(&mpv2_offset.to_be_bytes());
    trailer.extend_from_slice(&(movie_size as u32).to_be_bytes());
    image.media.add_box(AppendedBox::Memory(MemoryBox::new(trailer, *b"mpv2")));

    if options.dry_run {
        info!("dry run: skipping commit");
        return Ok(());
    }

    let temp_path = append_suffix(output_path, options.output_suffix);
    {
        let file = fs::File::create(&temp_path)?;
        let mut sink = BufWriter::new(file);
        image.media.commit(&mut sink)?;
    }
    fs::rename(&temp_path, output_path)?;

    info!(output = %output_path.display(), "assembled motion photo");
    Ok(())
}

/// Append the `GCamera`/`Container` description to `xmp`'s root, per §4.6.
fn append_motion_photo_description(
    xmp: &mut XmpMeta,
    presentation_offset: &str,
) -> AssembleResult<()> {
    xmp.set_property(ns::GCAMERA_PREFIX, "MotionPhoto", XmpValue::from(1i64))?;
    xmp.set_property(ns::GCAMERA_PREFIX, "MotionPhotoVersion", XmpValue::from(1i64))?;
    xmp.set_property(
        ns::GCAMERA_PREFIX,
        "MotionPhotoPresentationTimestampUs",
        XmpValue::from(presentation_offset),
    )?;

    let primary = container_item("Primary", STILL_IMAGE_MIME, 0, 16);
    let motion = container_item(
        "MotionPhoto",
        MOTION_VIDEO_MIME,
        MPV2_MOTION_ITEM_LENGTH,
        0,
    );

    xmp.append_array_node_item(ns::CONTAINER_PREFIX, "Directory", primary)?;
    xmp.append_array_node_item(ns::CONTAINER_PREFIX, "Directory", motion)?;
    Ok(())
}

fn container_item(semantic: &str, mime: &str, length: i64, padding: i64) -> Node {
    let mut item = StructureNode::new_attributes_only(format!("{}:Item", ns::CONTAINER));
    item.set_field(format!("{}:Mime", ns::CONTAINER_ITEM), Node::simple(mime));
    item.set_field(
        format!("{}:Semantic", ns::CONTAINER_ITEM),
        Node::simple(semantic),
    );
    item.set_field(
        format!("{}:Length", ns::CONTAINER_ITEM),
        Node::simple(length.to_string()),
    );
    item.set_field(
        format!("{}:Padding", ns::CONTAINER_ITEM),
        Node::simple(padding.to_string()),
    );
    Node::Structure(item)
}

fn append_suffix(path: &Path, suffix: &str) -> std::path::PathBuf {
    let mut os_string = path.as_os_str().to_owned();
    os_string.push(suffix);
    os_string.into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_suffix() {
        let p = Path::new("/tmp/foo.heic");
        assert_eq!(append_suffix(p, ".tmp"), std::path::PathBuf::from("/tmp/foo.heic.tmp"));
    }

    #[test]
    fn test_container_item_fields() {
        let node = container_item("Primary", "image/heic", 0, 16);
        let Node::Structure(structure) = node else {
            panic!("expected structure node");
        };
        assert!(structure.attributes_only);
        assert_eq!(
            structure.type_path.as_deref(),
            Some(format!("{}:Item", ns::CONTAINER).as_str())
        );
        assert!(structure.has_field(&format!("{}:Mime", ns::CONTAINER_ITEM)));
    }
}
