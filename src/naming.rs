//! Centralized naming rules.
//!
//! Two conventions live here so the rest of the crate never builds a file
//! name by hand:
//!
//! - **Output paths**: every illustration path is a pure function of the story
//!   id and the slot: `{id}-cover.png` and `{id}-{n}.png` (1-based `n`).
//!   Because the name never depends on content or time, an existing file
//!   means "already done".
//! - **Asset keys**: a foreground asset `Bear.cute.png` is indexed as `bear`:
//!   the file name lower-cased, cut at the first dot.

use crate::types::ImageSlot;
use std::path::{Path, PathBuf};

/// File name of an illustration, e.g. `goldilocks-cover.png` or `goldilocks-3.png`.
pub fn output_file_name(story_id: &str, slot: ImageSlot) -> String {
    match slot {
        ImageSlot::Cover => format!("{story_id}-cover.png"),
        ImageSlot::Page(n) => format!("{story_id}-{n}.png"),
    }
}

/// Full path of an illustration inside `stories_dir`.
pub fn output_path(stories_dir: &Path, story_id: &str, slot: ImageSlot) -> PathBuf {
    stories_dir.join(output_file_name(story_id, slot))
}

/// Public URL of an illustration as the web app references it.
pub fn public_image_path(prefix: &str, story_id: &str, slot: ImageSlot) -> String {
    format!(
        "{}/{}",
        prefix.trim_end_matches('/'),
        output_file_name(story_id, slot)
    )
}

/// Normalized asset keyword for a file name.
///
/// Returns `None` when nothing is left before the first dot (`.hidden`).
pub fn asset_key(file_name: &str) -> Option<String> {
    let stem = file_name.split('.').next().unwrap_or_default();
    if stem.is_empty() {
        None
    } else {
        Some(stem.to_lowercase())
    }
}

/// Whether a story id can be used verbatim as a file name prefix.
///
/// Allows ASCII letters, digits, `-` and `_`; must not start with `-`.
pub fn is_filename_safe(id: &str) -> bool {
    !id.is_empty()
        && !id.starts_with('-')
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}
