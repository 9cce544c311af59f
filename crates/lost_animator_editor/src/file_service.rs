// SPDX-License-Identifier: MIT OR Apache-2.0
//! Reading and writing animation documents.
//!
//! On disk, spritesheet image paths are stored relative to the document's
//! directory. In memory they are absolute. Both directions go through
//! [`AnimationFile::validate`], so a document is either adopted whole or
//! not at all.

use lost_animator_timeline::{AnimationFile, ModelError};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Name suggested when saving a document for the first time
pub const DEFAULT_FILE_NAME: &str = "animation.json";

/// Extensions offered by the open and save dialogs
pub const DOCUMENT_EXTENSIONS: &[&str] = &["json", "anim"];

/// Extensions offered by the spritesheet image dialog
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "webp"];

/// Errors reading or writing a document
#[derive(Debug, Error)]
pub enum FileError {
    /// Reading or writing the file failed
    #[error("I/O error at {path:?}: {source}")]
    Io {
        /// Document file
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// The file is not a JSON animation document
    #[error("Malformed document {path:?}: {source}")]
    Json {
        /// Document file
        path: PathBuf,
        /// Underlying error
        #[source]
        source: serde_json::Error,
    },

    /// The document parsed but breaks a model rule
    #[error("Invalid document {path:?}: {source}")]
    Invalid {
        /// Document file
        path: PathBuf,
        /// Violated rule
        #[source]
        source: ModelError,
    },

    /// There is no path to save to
    #[error("Document has no file path")]
    NoPath,
}

/// File result type
pub type Result<T> = std::result::Result<T, FileError>;

/// Native dialogs the editor asks for paths.
///
/// Each method receives the file extensions to filter by and returns
/// `None` when the user cancels.
pub trait Dialogs {
    /// Ask for an animation document to open
    fn pick_animation_file(&mut self, extensions: &[&str]) -> Option<PathBuf>;

    /// Ask where to save, suggesting a file name
    fn pick_save_path(&mut self, suggested_name: &str, extensions: &[&str]) -> Option<PathBuf>;

    /// Ask for a spritesheet image
    fn pick_image(&mut self, extensions: &[&str]) -> Option<PathBuf>;
}

/// Dialogs for headless sessions: every prompt is cancelled
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDialogs;

impl Dialogs for NoDialogs {
    fn pick_animation_file(&mut self, _extensions: &[&str]) -> Option<PathBuf> {
        None
    }

    fn pick_save_path(&mut self, _suggested_name: &str, _extensions: &[&str]) -> Option<PathBuf> {
        None
    }

    fn pick_image(&mut self, _extensions: &[&str]) -> Option<PathBuf> {
        None
    }
}

/// Resolve `path` against the working directory
pub fn absolute_path(path: &Path) -> Result<PathBuf> {
    std::path::absolute(path).map_err(|source| FileError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Directory a document's relative paths resolve against
pub fn document_dir(path: &Path) -> PathBuf {
    path.parent().map(Path::to_path_buf).unwrap_or_default()
}

/// Express `path` relative to `base` when it lies inside it.
///
/// Relative paths and absolute paths outside `base` come back unchanged.
pub fn to_relative_path(path: &Path, base: &Path) -> PathBuf {
    if !path.is_absolute() {
        return path.to_path_buf();
    }
    match path.strip_prefix(base) {
        Ok(relative) if !relative.as_os_str().is_empty() => relative.to_path_buf(),
        _ => path.to_path_buf(),
    }
}

/// Resolve a relative `path` against `base`. Absolute paths come back unchanged.
pub fn to_absolute_path(path: &Path, base: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

fn map_image_paths(content: &AnimationFile, f: impl Fn(&Path) -> PathBuf) -> AnimationFile {
    let mut file = content.clone();
    for sheet in &mut file.spritesheets {
        sheet.image_path = f(&sheet.image_path);
    }
    file
}

/// Parse a document from JSON text, resolving image paths against the
/// directory of `path`
pub fn parse_document(text: &str, path: &Path) -> Result<AnimationFile> {
    let parsed: AnimationFile = serde_json::from_str(text).map_err(|source| FileError::Json {
        path: path.to_path_buf(),
        source,
    })?;

    parsed.validate().map_err(|source| FileError::Invalid {
        path: path.to_path_buf(),
        source,
    })?;

    let base = document_dir(path);
    Ok(map_image_paths(&parsed, |p| to_absolute_path(p, &base)))
}

/// Render a document as on-disk JSON for `path`
pub fn render_document(content: &AnimationFile, path: &Path) -> Result<String> {
    let base = document_dir(path);
    let relative = map_image_paths(content, |p| to_relative_path(p, &base));

    relative.validate().map_err(|source| FileError::Invalid {
        path: path.to_path_buf(),
        source,
    })?;

    serde_json::to_string_pretty(&relative).map_err(|source| FileError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Load a document from disk. A relative `path` resolves against the
/// working directory.
pub fn load_document(path: &Path) -> Result<AnimationFile> {
    let path = absolute_path(path)?;
    let text = std::fs::read_to_string(&path).map_err(|source| FileError::Io {
        path: path.clone(),
        source,
    })?;
    parse_document(&text, &path)
}

/// Write a document to disk. A relative `path` resolves against the
/// working directory.
pub fn save_document(content: &AnimationFile, path: &Path) -> Result<()> {
    let path = absolute_path(path)?;
    let text = render_document(content, &path)?;
    std::fs::write(&path, text).map_err(|source| FileError::Io { path, source })
}
