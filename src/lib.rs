//! # Picturebook
//!
//! Placeholder illustrations and asset chores for a children's story app.
//! Given a folder of animal cut-outs and a catalog of stories, picturebook
//! paints a cover and one image per page: a bright patterned background, a
//! foreground animal chosen by the story's theme, and a caption card.
//!
//! # Architecture: One Pipeline Per Image
//!
//! ```text
//! assets/ ──► AssetIndex ─┐
//!                         ├─► background → asset → caption → {id}-cover.png
//! stories.json ──► catalog┘                                  {id}-{n}.png
//! ```
//!
//! Each image is independent. Stories run in parallel, but every image is
//! built on one thread from its own seeded RNG, so a run is reproducible
//! from its seed alone.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`assets`] | Indexes the foreground directory by keyword and resolves theme keywords |
//! | [`catalog`] | Loads and validates the JSON story catalog |
//! | [`illustrate`] | Cover and page recipes, the per-image state machine, the parallel batch |
//! | [`imaging`] | Canvas, background patterns, compositing, captions, fonts, output store |
//! | [`prompts`] | Markdown prompt sheets for commissioning real illustrations |
//! | [`sprites`] | Square, compressed PNG sprites from raw cut-outs |
//! | [`convert`] | JFIF/JPEG → PNG and PNG → ICO |
//! | [`config`] | `picturebook.toml` loading, validation and merging onto stock defaults |
//! | [`types`] | Story types shared by the catalog, assembler and prompt sheets |
//! | [`naming`] | Output path and asset keyword conventions |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Never Overwrite
//!
//! An output path depends only on the story id and the slot. If the file is
//! there, the image is done: the job is skipped before any drawing, and the
//! filesystem store opens files with `create_new`. Hand-made illustrations
//! dropped into the stories directory are therefore safe from reruns.
//!
//! ## Randomness Is an Input
//!
//! Every random choice (pattern, colors, fallback asset, page x position)
//! comes from a `StdRng` seeded by SHA-256 of the run seed and the output
//! file name. Choosing and drawing are separate steps in [`imaging::pattern`],
//! so tests pin a spec and check pixels.
//!
//! ## Degrade, Don't Abort
//!
//! A bad asset or a missing font costs one layer of one image, never the
//! batch. Only a missing or empty asset directory stops a run.

pub mod assets;
pub mod catalog;
pub mod config;
pub mod convert;
pub mod illustrate;
pub mod imaging;
pub mod naming;
pub mod output;
pub mod prompts;
pub mod sprites;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
