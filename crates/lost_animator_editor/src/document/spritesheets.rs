// SPDX-License-Identifier: MIT OR Apache-2.0
//! Spritesheet operations.

use super::{move_item, DocumentController};
use crate::file_service::{Dialogs, IMAGE_EXTENSIONS};
use crate::image_cache::{self, SpriteImage};
use lost_animator_timeline::{SpriteKey, Spritesheet, SpritesheetId, SpritesheetPatch};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// A spritesheet whose image could not be loaded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrokenReference {
    /// Spritesheet
    pub spritesheet_id: SpritesheetId,
    /// Spritesheet name
    pub name: String,
    /// Path that failed to load
    pub image_path: PathBuf,
}

/// Image paths are stored absolute so saving from another directory
/// still finds them
fn resolve_image_path(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}

impl DocumentController {
    /// Decode the image of every spritesheet, skipping ones that fail
    pub(super) fn load_spritesheet_images(&mut self) {
        let sheets = self.file().spritesheets.clone();
        for sheet in sheets {
            match self.images.load(&sheet.image_path) {
                Ok(image) => {
                    self.spritesheet_images.insert(sheet.id, image);
                }
                Err(e) => tracing::warn!("Failed to load spritesheet {}: {e}", sheet.name),
            }
        }
    }

    /// Match decoded images to the spritesheets of the present snapshot
    /// after undo/redo, including sheets whose image path changed
    pub(super) fn restore_images(&mut self) {
        let file = self.snapshot();
        self.spritesheet_images
            .retain(|id, _| file.spritesheet(id).is_some());
        for sheet in &file.spritesheets {
            let current = self
                .spritesheet_images
                .get(&sheet.id)
                .is_some_and(|image| image.path() == sheet.image_path);
            if current {
                continue;
            }
            match self.images.load(&sheet.image_path) {
                Ok(image) => {
                    self.spritesheet_images.insert(sheet.id.clone(), image);
                }
                Err(e) => {
                    self.spritesheet_images.remove(&sheet.id);
                    tracing::debug!("Spritesheet {} has no image: {e}", sheet.name);
                }
            }
        }
    }

    /// Ask for an image and add it as a spritesheet.
    ///
    /// Returns `None` when cancelled.
    pub fn add_spritesheet(
        &mut self,
        dialogs: &mut dyn Dialogs,
    ) -> image_cache::Result<Option<SpritesheetId>> {
        let Some(path) = dialogs.pick_image(IMAGE_EXTENSIONS) else {
            return Ok(None);
        };
        self.add_spritesheet_from_path(&path).map(Some)
    }

    /// Add an image file as a spritesheet named after the file.
    ///
    /// Nothing is added if the image does not decode.
    pub fn add_spritesheet_from_path(&mut self, path: &Path) -> image_cache::Result<SpritesheetId> {
        let path = resolve_image_path(path);
        let image = self.images.load(&path)?;

        let id = SpritesheetId::from(self.next_id());
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "Spritesheet".to_string());
        let (tile_width, tile_height) = self.default_tile_size;
        let sheet = Spritesheet::new(id.clone(), name, &path, tile_width, tile_height);

        self.spritesheet_images.insert(id.clone(), image);
        self.update_file(|file| {
            let mut next = file.clone();
            next.spritesheets.push(sheet);
            Some(next)
        });
        tracing::info!("Added spritesheet {:?}", path);
        Ok(id)
    }

    /// Remove a spritesheet and drop its decoded image
    pub fn remove_spritesheet(&mut self, id: &SpritesheetId) -> bool {
        self.spritesheet_images.remove(id);
        if self.selected_spritesheet_id.as_ref() == Some(id) {
            self.selected_spritesheet_id = None;
        }
        self.update_file(|file| {
            let index = file.spritesheet_index(id)?;
            let mut next = file.clone();
            next.spritesheets.remove(index);
            Some(next)
        })
    }

    /// Apply a partial update to a spritesheet.
    ///
    /// A new image path is loaded right away; a path that fails to load is
    /// still recorded and shows up in [`Self::broken_references`].
    pub fn update_spritesheet(&mut self, id: &SpritesheetId, patch: &SpritesheetPatch) -> bool {
        let patch = SpritesheetPatch {
            image_path: patch.image_path.as_deref().map(resolve_image_path),
            ..patch.clone()
        };
        let changed = self.update_file(|file| {
            let index = file.spritesheet_index(id)?;
            let mut next = file.clone();
            next.spritesheets[index] = file.spritesheets[index].apply(&patch);
            Some(next)
        });

        if changed {
            if let Some(path) = &patch.image_path {
                self.spritesheet_images.remove(id);
                match self.images.load(path) {
                    Ok(image) => {
                        self.spritesheet_images.insert(id.clone(), image);
                    }
                    Err(e) => tracing::warn!("Failed to load {:?}: {e}", path),
                }
            }
        }
        changed
    }

    /// Point a spritesheet at a new image file
    pub fn relocate_spritesheet(
        &mut self,
        id: &SpritesheetId,
        path: &Path,
    ) -> image_cache::Result<bool> {
        if self.file().spritesheet(id).is_none() {
            return Ok(false);
        }
        let path = resolve_image_path(path);
        let image = self.images.load(&path)?;
        self.spritesheet_images.insert(id.clone(), image);

        let patch = SpritesheetPatch {
            image_path: Some(path),
            ..Default::default()
        };
        Ok(self.update_file(|file| {
            let index = file.spritesheet_index(id)?;
            let mut next = file.clone();
            next.spritesheets[index] = file.spritesheets[index].apply(&patch);
            Some(next)
        }))
    }

    /// Move a spritesheet to another position
    pub fn reorder_spritesheets(&mut self, from: usize, to: usize) -> bool {
        self.update_file(|file| {
            let mut next = file.clone();
            move_item(&mut next.spritesheets, from, to).then_some(next)
        })
    }

    /// Select a spritesheet, or clear the selection.
    ///
    /// Returns `false` and keeps the selection for an unknown id.
    pub fn select_spritesheet(&mut self, id: Option<SpritesheetId>) -> bool {
        if let Some(id) = &id {
            if self.file().spritesheet(id).is_none() {
                tracing::debug!("Ignoring selection of unknown spritesheet {id}");
                return false;
            }
        }
        self.selected_spritesheet_id = id;
        true
    }

    /// Decoded image of a spritesheet
    pub fn spritesheet_image(&self, id: &SpritesheetId) -> Option<&Arc<SpriteImage>> {
        self.spritesheet_images.get(id)
    }

    /// The spritesheet a sprite key draws from, with its image.
    ///
    /// Keys without a spritesheet use the first one.
    pub fn spritesheet_for_key(
        &self,
        key: &SpriteKey,
    ) -> Option<(&Spritesheet, &Arc<SpriteImage>)> {
        let sheet = self.file().spritesheet_for_key(key)?;
        let image = self.spritesheet_images.get(&sheet.id)?;
        Some((sheet, image))
    }

    /// Spritesheets whose image is not loaded
    pub fn broken_references(&self) -> Vec<BrokenReference> {
        self.file()
            .spritesheets
            .iter()
            .filter(|sheet| !self.spritesheet_images.contains_key(&sheet.id))
            .map(|sheet| BrokenReference {
                spritesheet_id: sheet.id.clone(),
                name: sheet.name.clone(),
                image_path: sheet.image_path.clone(),
            })
            .collect()
    }
}
