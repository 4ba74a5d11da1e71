//! File handler registry for XMP metadata
//!
//! This module provides a registry system for managing file format handlers.
//! Handlers can be registered and looked up by file extension or format detection.

use crate::core::error::XmpResult;
use crate::files::handler::FileHandler;
use std::io::{Read, Seek, Write};

/// Enum of supported file handlers
#[derive(Debug, Clone)]
#[non_exhaustive]
pub enum Handler {
    #[cfg(feature = "jpeg")]
    Jpeg(crate::files::formats::jpeg::JpegHandler),
    #[cfg(feature = "mpeg4")]
    Mpeg4(crate::files::formats::bmff::Mpeg4Handler),
    #[cfg(feature = "mpegh")]
    Mpegh(crate::files::formats::bmff::MpeghHandler),
}

impl FileHandler for Handler {
    fn can_handle<R: Read + Seek>(&self, reader: &mut R) -> XmpResult<bool> {
        match self {
            #[cfg(feature = "jpeg")]
            Handler::Jpeg(h) => h.can_handle(reader),
            #[cfg(feature = "mpeg4")]
            Handler::Mpeg4(h) => h.can_handle(reader),
            #[cfg(feature = "mpegh")]
            Handler::Mpegh(h) => h.can_handle(reader),
        }
    }

    fn read_xmp<R: Read + Seek>(
        &self,
        reader: &mut R,
    ) -> XmpResult<Option<crate::core::metadata::XmpMeta>> {
        match self {
            #[cfg(feature = "jpeg")]
            Handler::Jpeg(h) => h.read_xmp(reader),
            #[cfg(feature = "mpeg4")]
            Handler::Mpeg4(h) => h.read_xmp(reader),
            #[cfg(feature = "mpegh")]
            Handler::Mpegh(h) => h.read_xmp(reader),
        }
    }

    fn write_xmp<R: Read + Seek, W: Seek + Write>(
        &self,
        reader: &mut R,
        writer: &mut W,
        meta: &crate::core::metadata::XmpMeta,
    ) -> XmpResult<()> {
        match self {
            #[cfg(feature = "jpeg")]
            Handler::Jpeg(h) => h.write_xmp(reader, writer, meta),
            #[cfg(feature = "mpeg4")]
            Handler::Mpeg4(h) => h.write_xmp(reader, writer, meta),
            #[cfg(feature = "mpegh")]
            Handler::Mpegh(h) => h.write_xmp(reader, writer, meta),
        }
    }

    fn format_name(&self) -> &'static str {
        match self {
            #[cfg(feature = "jpeg")]
            Handler::Jpeg(h) => h.format_name(),
            #[cfg(feature = "mpeg4")]
            Handler::Mpeg4(h) => h.format_name(),
            #[cfg(feature = "mpegh")]
            Handler::Mpegh(h) => h.format_name(),
        }
    }

    fn extensions(&self) -> &'static [&'static str] {
        match self {
            #[cfg(feature = "jpeg")]
            Handler::Jpeg(h) => h.extensions(),
            #[cfg(feature = "mpeg4")]
            Handler::Mpeg4(h) => h.extensions(),
            #[cfg(feature = "mpegh")]
            Handler::Mpegh(h) => h.extensions(),
        }
    }
}

/// Registry for file format handlers
pub struct HandlerRegistry {
    handlers: Vec<Handler>,
}

impl HandlerRegistry {
    /// Create a new handler registry with default handlers registered
    pub fn new() -> Self {
        let mut registry = Self {
            handlers: Vec::new(),
        };
        registry.register_defaults();
        registry
    }

    /// Register a file handler
    pub fn register(&mut self, handler: Handler) {
        self.handlers.push(handler);
    }

    /// Register default handlers (JPEG, MPEG-4 family, HEIF/MPEG-H family)
    fn register_defaults(&mut self) {
        #[cfg(feature = "jpeg")]
        self.register(Handler::Jpeg(crate::files::formats::jpeg::JpegHandler));
        #[cfg(feature = "mpeg4")]
        self.register(Handler::Mpeg4(
            crate::files::formats::bmff::Mpeg4Handler,
        ));
        #[cfg(feature = "mpegh")]
        self.register(Handler::Mpegh(
            crate::files::formats::bmff::MpeghHandler,
        ));
    }

    /// Find a handler by file extension
    ///
    /// # Arguments
    ///
    /// * `extension` - File extension (e.g., "heic", "mov", "jpg")
    ///
    /// # Returns
    ///
    /// * `Some(&Handler)` if a handler is found
    /// * `None` if no handler matches the extension
    pub fn find_by_extension(&self, extension: &str) -> Option<&Handler> {
        let ext_lower = extension.to_lowercase();
        self.handlers
            .iter()
            .find(|h| h.extensions().iter().any(|e| e.to_lowercase() == ext_lower))
    }

    /// Find a handler by format detection
    ///
    /// This method tries each registered handler's `can_handle` method
    /// to determine which handler can process the file.
    ///
    /// # Arguments
    ///
    /// * `reader` - A reader implementing `Read + Seek`
    ///
    /// # Returns
    ///
    /// * `Ok(Some(&Handler))` if a handler is found
    /// * `Ok(None)` if no handler can handle the file
    /// * `Err(XmpError)` if an error occurs during detection
    pub fn find_by_detection<R: Read + Seek>(&self, reader: &mut R) -> XmpResult<Option<&Handler>> {
        let saved_pos = reader.stream_position()?;

        for handler in &self.handlers {
            reader.seek(std::io::SeekFrom::Start(saved_pos))?;
            if handler.can_handle(reader)? {
                reader.seek(std::io::SeekFrom::Start(saved_pos))?;
                return Ok(Some(handler));
            }
        }

        reader.seek(std::io::SeekFrom::Start(saved_pos))?;
        Ok(None)
    }

    /// Get all registered handlers
    pub fn handlers(&self) -> &[Handler] {
        &self.handlers
    }
}

impl Default for HandlerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Global default registry instance
///
/// This provides a convenient way to access the default handler registry
/// without needing to create a new instance.
pub fn default_registry() -> HandlerRegistry {
    HandlerRegistry::new()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_registry_new() {
        let registry = HandlerRegistry::new();
        assert!(!registry.handlers().is_empty());
    }

    #[test]
    fn test_find_by_extension() {
        let registry = HandlerRegistry::new();

        #[cfg(feature = "jpeg")]
        {
            assert!(registry.find_by_extension("jpg").is_some());
            assert!(registry.find_by_extension("jpeg").is_some());
        }

        #[cfg(feature = "mpeg4")]
        {
            assert!(registry.find_by_extension("mp4").is_some());
            assert!(registry.find_by_extension("mov").is_some());
            assert!(registry.find_by_extension("m4v").is_some());
        }

        #[cfg(feature = "mpegh")]
        {
            assert!(registry.find_by_extension("heic").is_some());
            assert!(registry.find_by_extension("heif").is_some());
        }

        // Unknown extension
        assert!(registry.find_by_extension("unknown").is_none());
        assert!(registry.find_by_extension("xyz").is_none());
    }

    #[cfg(feature = "jpeg")]
    #[test]
    fn test_find_by_detection_jpeg() {
        let registry = HandlerRegistry::new();
        let jpeg_data = vec![0xFF, 0xD8, 0xFF, 0xE0];
        let mut reader = Cursor::new(jpeg_data);
        let handler = registry.find_by_detection(&mut reader).unwrap();
        assert!(handler.is_some());
        assert_eq!(handler.unwrap().format_name(), "JPEG");
    }

    #[cfg(feature = "mpeg4")]
    #[test]
    fn test_find_by_detection_mp4() {
        let registry = HandlerRegistry::new();
        // MP4 ftyp box signature
        let mp4_data = vec![
            0x00, 0x00, 0x00, 0x18, // box size
            0x66, 0x74, 0x79, 0x70, // 'ftyp'
            0x69, 0x73, 0x6F, 0x6D, // 'isom'
            0x00, 0x00, 0x00, 0x00, // minor version
            0x69, 0x73, 0x6F, 0x6D, // compatible brand
            0x61, 0x76, 0x63, 0x31, // compatible brand
        ];
        let mut reader = Cursor::new(mp4_data);
        let handler = registry.find_by_detection(&mut reader).unwrap();
        assert!(handler.is_some());
        assert_eq!(handler.unwrap().format_name(), "MP4");
    }

    #[cfg(feature = "mpegh")]
    #[test]
    fn test_find_by_detection_heic() {
        let registry = HandlerRegistry::new();
        let heic_data = vec![
            0x00, 0x00, 0x00, 0x18, // box size
            0x66, 0x74, 0x79, 0x70, // 'ftyp'
            0x68, 0x65, 0x69, 0x63, // 'heic'
            0x00, 0x00, 0x00, 0x00, // minor version
            0x6D, 0x69, 0x66, 0x31, // compatible brand 'mif1'
            0x68, 0x65, 0x69, 0x63, // compatible brand 'heic'
        ];
        let mut reader = Cursor::new(heic_data);
        let handler = registry.find_by_detection(&mut reader).unwrap();
        assert!(handler.is_some());
        assert_eq!(handler.unwrap().format_name(), "HEIF");
    }

    #[test]
    fn test_find_by_detection_unknown() {
        let registry = HandlerRegistry::new();
        // Random data that doesn't match any format
        let unknown_data = vec![0x00, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07];
        let mut reader = Cursor::new(unknown_data);
        let handler = registry.find_by_detection(&mut reader).unwrap();
        assert!(handler.is_none());
    }
}
