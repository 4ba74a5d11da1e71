//! Shared test fixture helpers.
//!
//! Fixture files are looked up under `tests/fixtures/data/`; they aren't
//! checked into this tree, so every test that uses them guards with
//! [`fixture_exists`] and skips (rather than fails) when one is missing.

use std::path::{Path, PathBuf};

#[allow(dead_code)]
pub fn fixture_path(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join("data")
        .join(name)
}

#[allow(dead_code)]
pub fn fixture_exists(name: &str) -> bool {
    fixture_path(name).is_file()
}
