//! Output persistence trait and the filesystem implementation.
//!
//! The [`OutputStore`] trait is the only way an illustration reaches disk:
//! `exists` answers "is this slot already done?" and `save` writes a
//! finished canvas. The assembler never touches the filesystem directly, so
//! a recording mock can observe exactly which writes a run performs.
//!
//! [`FsStore`] encodes in memory, writes a temporary file next to the
//! target and persists it without clobbering. Only a complete PNG ever
//! appears at the output path, and an existing illustration is never
//! overwritten even if two processes race on the same directory.

use std::io::{Cursor, Write};
use std::path::Path;
use tempfile::NamedTempFile;
use thiserror::Error;

use super::canvas::{Canvas, CanvasError};

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Encode error: {0}")]
    Encode(#[from] CanvasError),
    #[error("refusing to overwrite existing file: {0}")]
    AlreadyExists(String),
}

/// Where finished illustrations go.
pub trait OutputStore: Sync {
    /// Whether an output already exists at `path`.
    fn exists(&self, path: &Path) -> bool;

    /// Persist `canvas` at `path`. Must not overwrite an existing output.
    fn save(&self, path: &Path, canvas: &Canvas) -> Result<(), StoreError>;
}

/// Writes RGB PNG files to the local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsStore;

impl OutputStore for FsStore {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn save(&self, path: &Path, canvas: &Canvas) -> Result<(), StoreError> {
        let mut png = Cursor::new(Vec::new());
        canvas.write_png(&mut png)?;

        let parent = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(parent)?;
        let mut staged = NamedTempFile::new_in(parent)?;
        staged.write_all(png.get_ref())?;
        staged.as_file_mut().sync_all()?;

        match staged.persist_noclobber(path) {
            Ok(_) => Ok(()),
            Err(e) if e.error.kind() == std::io::ErrorKind::AlreadyExists => {
                Err(StoreError::AlreadyExists(path.display().to_string()))
            }
            Err(e) => Err(e.error.into()),
        }
    }
}
