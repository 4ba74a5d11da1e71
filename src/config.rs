//! Assembly configuration
//!
//! Builder-style options controlling Motion Photo assembly, following the
//! same pattern as [`crate::files::handler::XmpOptions`] and
//! [`crate::files::file::ReadOptions`].

/// Options controlling how a Motion Photo is assembled.
///
/// # Example
///
/// ```rust,no_run
/// use motionphoto::AssembleOptions;
///
/// let options = AssembleOptions::default().dry_run();
/// ```
#[derive(Debug, Clone)]
pub struct AssembleOptions {
    /// Whether to set `MotionPhotoPresentationTimestampUs` to the literal
    /// string `"-1"` (true, the default) instead of the movie's
    /// `duration_in_us` (false).
    pub fix_presentation_offset: bool,
    /// If set, perform every parse/mutate step but do not write any output
    /// file, mirroring the original `BoundedBuffer.commit(dry_run=...)`.
    pub dry_run: bool,
    /// Suffix appended to the output path while writing, so a crash or
    /// I/O failure mid-commit never leaves a half-written file at the
    /// final path. The temp file is renamed into place only on success.
    pub output_suffix: &'static str,
}

impl Default for AssembleOptions {
    fn default() -> Self {
        Self {
            fix_presentation_offset: true,
            dry_run: false,
            output_suffix: ".tmp",
        }
    }
}

impl AssembleOptions {
    /// Use the movie's `duration_in_us()` as the presentation timestamp
    /// instead of the fixed `"-1"` sentinel.
    pub fn without_presentation_offset_fix(mut self) -> Self {
        self.fix_presentation_offset = false;
        self
    }

    /// Perform a dry run: parse and mutate in memory but write nothing.
    pub fn dry_run(mut self) -> Self {
        self.dry_run = true;
        self
    }

    /// Override the temp-file suffix used during the write-then-rename commit.
    pub fn output_suffix(mut self, suffix: &'static str) -> Self {
        self.output_suffix = suffix;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options() {
        let options = AssembleOptions::default();
        assert!(options.fix_presentation_offset);
        assert!(!options.dry_run);
        assert_eq!(options.output_suffix, ".tmp");
    }

    #[test]
    fn test_builder_chain() {
        let options = AssembleOptions::default()
            .without_presentation_offset_fix()
            .dry_run()
            .output_suffix(".partial");
        assert!(!options.fix_presentation_offset);
        assert!(options.dry_run);
        assert_eq!(options.output_suffix, ".partial");
    }
}
