//! JPEG marker walking (collaborator; outside the Motion Photo critical
//! path, but reuses the span-edited buffer).

pub mod marker;

pub use marker::{read_markers, Marker, MarkerKind};
