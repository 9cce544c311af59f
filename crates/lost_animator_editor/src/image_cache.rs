// SPDX-License-Identifier: MIT OR Apache-2.0
//! Decoded spritesheet images, cached by path.
//!
//! Decoded pixels are not document state: they never enter the undo history
//! and are looked up again whenever a spritesheet comes back.

use image::RgbaImage;
use lost_animator_timeline::Spritesheet;
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

/// Errors loading an image
#[derive(Debug, Error)]
pub enum ImageError {
    /// Reading the file failed
    #[error("Failed to read image {path:?}: {source}")]
    Io {
        /// Image file
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// The bytes are not a supported image
    #[error("Failed to decode image {path:?}: {source}")]
    Decode {
        /// Image file
        path: PathBuf,
        /// Underlying error
        #[source]
        source: image::ImageError,
    },
}

/// Image result type
pub type Result<T> = std::result::Result<T, ImageError>;

/// A decoded RGBA8 spritesheet image
#[derive(Debug, Clone, PartialEq)]
pub struct SpriteImage {
    path: PathBuf,
    pixels: RgbaImage,
}

impl SpriteImage {
    /// Decode an image file
    pub fn load(path: &Path) -> Result<Self> {
        let data = std::fs::read(path).map_err(|source| ImageError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let decoded = image::load_from_memory(&data).map_err(|source| ImageError::Decode {
            path: path.to_path_buf(),
            source,
        })?;

        Ok(Self {
            path: path.to_path_buf(),
            pixels: decoded.to_rgba8(),
        })
    }

    /// Wrap already decoded pixels
    pub fn from_pixels(path: impl Into<PathBuf>, pixels: RgbaImage) -> Self {
        Self {
            path: path.into(),
            pixels,
        }
    }

    /// Source path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Width in pixels
    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    /// Height in pixels
    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    /// RGBA8 pixels
    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    /// Decoded size in bytes
    pub fn byte_len(&self) -> usize {
        self.pixels.as_raw().len()
    }

    /// Columns and rows of tiles for a spritesheet cut from this image
    pub fn grid_dimensions(&self, sheet: &Spritesheet) -> (u32, u32) {
        sheet.grid_dimensions(self.width(), self.height())
    }

    /// Copy out one frame. `None` if the frame lies outside the image.
    pub fn frame(&self, sheet: &Spritesheet, frame: [u32; 2]) -> Option<RgbaImage> {
        let (x, y, w, h) = sheet.frame_rect(frame);
        let fits_x = x.checked_add(w).is_some_and(|right| right <= self.width());
        let fits_y = y.checked_add(h).is_some_and(|bottom| bottom <= self.height());
        if !fits_x || !fits_y {
            return None;
        }
        Some(image::imageops::crop_imm(&self.pixels, x, y, w, h).to_image())
    }
}

type Slot = Arc<Mutex<Option<Arc<SpriteImage>>>>;

/// Path-keyed cache of decoded images.
///
/// Each path has its own slot. A load holds the slot while decoding, so
/// concurrent loads of one path decode it once and share the result.
#[derive(Default)]
pub struct ImageCache {
    slots: RwLock<HashMap<PathBuf, Slot>>,
}

impl ImageCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self, path: &Path) -> Slot {
        if let Some(slot) = self.slots.read().get(path) {
            return Arc::clone(slot);
        }
        let mut slots = self.slots.write();
        Arc::clone(slots.entry(path.to_path_buf()).or_default())
    }

    /// Get a decoded image, decoding it on first use
    pub fn load(&self, path: &Path) -> Result<Arc<SpriteImage>> {
        let slot = self.slot(path);
        let mut guard = slot.lock();

        if let Some(image) = guard.as_ref() {
            return Ok(Arc::clone(image));
        }

        let image = Arc::new(SpriteImage::load(path)?);
        tracing::debug!(
            "Decoded {:?} ({}x{})",
            path,
            image.width(),
            image.height()
        );
        *guard = Some(Arc::clone(&image));
        Ok(image)
    }

    /// Get an image only if it is already decoded
    pub fn get(&self, path: &Path) -> Option<Arc<SpriteImage>> {
        let slot = self.slots.read().get(path).cloned()?;
        let guard = slot.lock();
        guard.clone()
    }

    /// Store an image decoded elsewhere, such as by a file picker
    pub fn insert(&self, image: Arc<SpriteImage>) {
        let slot = self.slot(image.path());
        *slot.lock() = Some(image);
    }

    /// Drop one path
    pub fn evict(&self, path: &Path) -> bool {
        self.slots.write().remove(path).is_some()
    }

    /// Drop everything
    pub fn clear(&self) {
        self.slots.write().clear();
    }

    /// Number of decoded images
    pub fn len(&self) -> usize {
        self.slots
            .read()
            .values()
            .filter(|slot| slot.lock().is_some())
            .count()
    }

    /// Check if nothing is decoded
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Decoded bytes held
    pub fn cached_bytes(&self) -> usize {
        self.slots
            .read()
            .values()
            .filter_map(|slot| slot.lock().as_ref().map(|image| image.byte_len()))
            .sum()
    }
}

impl std::fmt::Debug for ImageCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageCache")
            .field("images", &self.len())
            .field("bytes", &self.cached_bytes())
            .finish()
    }
}
