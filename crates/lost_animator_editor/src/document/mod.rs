// SPDX-License-Identifier: MIT OR Apache-2.0
//! The document controller.
//!
//! [`DocumentController`] owns the undo history over one [`AnimationFile`]
//! and the runtime state around it: decoded images, selection, playback and
//! the timeline view. Every edit builds a new file value with the targeted
//! part replaced and hands it to the history. An edit that targets a missing
//! id, or whose result equals the current document, changes nothing.

mod animations;
mod keys;
mod spritesheets;
mod tracks;
mod view;

pub use spritesheets::BrokenReference;

use crate::config::EditorConfig;
use crate::file_service::{self, Dialogs, FileError, DEFAULT_FILE_NAME, DOCUMENT_EXTENSIONS};
use crate::history::{History, HistoryStats};
use crate::ids::{IdGenerator, UuidGenerator};
use crate::image_cache::{ImageCache, SpriteImage};
use crate::playback::{Clock, FrameScheduler, PlaybackDriver};
use crate::state::{Selection, TimelineView};
use lost_animator_timeline::{
    Animation, AnimationFile, AnimationId, PlaybackState, SpritesheetId, Track, TrackId,
};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Move one element of `items` from `from` to `to`.
///
/// Returns `false` for equal or out-of-range indices.
fn move_item<T>(items: &mut Vec<T>, from: usize, to: usize) -> bool {
    if from == to || from >= items.len() || to >= items.len() {
        return false;
    }
    let item = items.remove(from);
    items.insert(to, item);
    true
}

/// Editor document: history, selection, playback and view state
pub struct DocumentController {
    history: History<AnimationFile>,
    ids: Box<dyn IdGenerator>,
    images: Arc<ImageCache>,
    spritesheet_images: HashMap<SpritesheetId, Arc<SpriteImage>>,
    selected_spritesheet_id: Option<SpritesheetId>,
    selected_animation_id: Option<AnimationId>,
    selection: Selection,
    playback: PlaybackState,
    driver: PlaybackDriver,
    timeline: TimelineView,
    file_path: Option<PathBuf>,
    dirty: bool,
    default_tile_size: (u32, u32),
}

impl DocumentController {
    /// Create a controller with default settings over an empty document
    pub fn new() -> Self {
        Self::with_config(&EditorConfig::default())
    }

    /// Create a controller from editor settings
    pub fn with_config(config: &EditorConfig) -> Self {
        let playback = PlaybackState {
            playback_speed: view::clamp_speed(config.playback_speed),
            ..PlaybackState::default()
        };

        Self {
            history: History::with_max_depth(Arc::new(AnimationFile::new()), config.history_depth),
            ids: Box::new(UuidGenerator),
            images: Arc::new(ImageCache::new()),
            spritesheet_images: HashMap::new(),
            selected_spritesheet_id: None,
            selected_animation_id: None,
            selection: Selection::None,
            playback,
            driver: PlaybackDriver::default(),
            timeline: config.timeline_view(),
            file_path: None,
            dirty: false,
            default_tile_size: config.default_tile_size(),
        }
    }

    /// Use a different ID source
    pub fn with_id_generator(mut self, ids: impl IdGenerator + 'static) -> Self {
        self.ids = Box::new(ids);
        self
    }

    /// Share an image cache with other documents
    pub fn with_image_cache(mut self, images: Arc<ImageCache>) -> Self {
        self.images = images;
        self
    }

    /// Drive playback from a host frame scheduler and clock
    pub fn with_frame_source(
        mut self,
        scheduler: impl FrameScheduler + 'static,
        clock: impl Clock + 'static,
    ) -> Self {
        self.driver = PlaybackDriver::new(Box::new(scheduler), Box::new(clock));
        self
    }

    // ---- read access ----

    /// Current document
    pub fn file(&self) -> &AnimationFile {
        self.history.present()
    }

    /// Current document as a shared snapshot
    pub fn snapshot(&self) -> Arc<AnimationFile> {
        Arc::clone(self.history.present())
    }

    /// Current selection
    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// Playback state
    pub fn playback(&self) -> &PlaybackState {
        &self.playback
    }

    /// Timeline view settings
    pub fn timeline(&self) -> &TimelineView {
        &self.timeline
    }

    /// Decoded images by spritesheet
    pub fn spritesheet_images(&self) -> &HashMap<SpritesheetId, Arc<SpriteImage>> {
        &self.spritesheet_images
    }

    /// The shared image cache
    pub fn image_cache(&self) -> &Arc<ImageCache> {
        &self.images
    }

    /// Path the document was opened from or saved to
    pub fn file_path(&self) -> Option<&Path> {
        self.file_path.as_deref()
    }

    /// Whether there are unsaved changes
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Selected animation ID
    pub fn selected_animation_id(&self) -> Option<&AnimationId> {
        self.selected_animation_id.as_ref()
    }

    /// Selected animation, if it still exists
    pub fn selected_animation(&self) -> Option<&Animation> {
        let id = self.selected_animation_id.as_ref()?;
        self.file().animation(id)
    }

    /// Selected spritesheet ID
    pub fn selected_spritesheet_id(&self) -> Option<&SpritesheetId> {
        self.selected_spritesheet_id.as_ref()
    }

    /// History statistics
    pub fn history_stats(&self) -> HistoryStats {
        self.history.stats()
    }

    /// Replace the selection.
    ///
    /// Ids that do not exist are dropped the same way undo drops them, so
    /// a key that is gone leaves its track selected. A selection in another
    /// animation also selects that animation.
    pub fn set_selection(&mut self, selection: Selection) {
        self.selection = selection;
        self.reconcile_selection();
        if let Some(animation_id) = self.selection.animation_id() {
            if self.selected_animation_id.as_ref() != Some(animation_id) {
                self.selected_animation_id = Some(animation_id.clone());
                self.sync_view_from_animation();
                self.sync_clock();
            }
        }
    }

    // ---- history ----

    /// Undo the last edit
    pub fn undo(&mut self) -> bool {
        let changed = self.history.undo();
        if changed {
            self.after_history_jump();
        }
        changed
    }

    /// Redo the last undone edit
    pub fn redo(&mut self) -> bool {
        let changed = self.history.redo();
        if changed {
            self.after_history_jump();
        }
        changed
    }

    /// Check if undo is available
    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    /// Check if redo is available
    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Begin a gesture that collapses into one undo step
    ///
    /// An open gesture is ended first, recording it only if it changed
    /// the document.
    pub fn start_batch(&mut self) {
        if self.history.is_batching() {
            self.end_batch();
        }
        self.history.start_batch();
    }

    /// End the current gesture.
    ///
    /// A gesture that ends on a document equal to where it started records
    /// nothing.
    pub fn end_batch(&mut self) -> bool {
        self.history.end_batch_by(|start, present| start == present)
    }

    /// Whether a gesture is open
    pub fn is_batching(&self) -> bool {
        self.history.is_batching()
    }

    fn after_history_jump(&mut self) {
        self.dirty = true;
        self.reconcile_selection();
        self.restore_images();
        self.sync_clock();
    }

    /// Retarget selection whose referent no longer exists
    fn reconcile_selection(&mut self) {
        let file = Arc::clone(self.history.present());

        if let Some(id) = &self.selected_animation_id {
            if file.animation(id).is_none() {
                self.selected_animation_id = None;
            }
        }
        if let Some(id) = &self.selected_spritesheet_id {
            if file.spritesheet(id).is_none() {
                self.selected_spritesheet_id = None;
            }
        }

        self.selection = match std::mem::take(&mut self.selection) {
            Selection::None => Selection::None,
            Selection::Animation { animation_id } => match file.animation(&animation_id) {
                Some(_) => Selection::Animation { animation_id },
                None => Selection::None,
            },
            Selection::Track {
                animation_id,
                track_id,
            } => match file.animation(&animation_id) {
                None => Selection::None,
                Some(animation) if animation.track(&track_id).is_none() => {
                    Selection::Animation { animation_id }
                }
                Some(_) => Selection::Track {
                    animation_id,
                    track_id,
                },
            },
            Selection::Key {
                animation_id,
                track_id,
                key_id,
            } => match file.animation(&animation_id) {
                None => Selection::None,
                Some(animation) => match animation.track(&track_id) {
                    None => Selection::Animation { animation_id },
                    Some(track) if track.key(&key_id).is_none() => Selection::Track {
                        animation_id,
                        track_id,
                    },
                    Some(_) => Selection::Key {
                        animation_id,
                        track_id,
                        key_id,
                    },
                },
            },
        };
    }

    // ---- edit plumbing ----

    fn next_id(&mut self) -> String {
        self.ids.next_id()
    }

    /// Apply an edit to the whole document.
    ///
    /// `None`, or a result equal to the current document, is not an edit.
    fn update_file(&mut self, f: impl FnOnce(&AnimationFile) -> Option<AnimationFile>) -> bool {
        let Some(next) = f(self.history.present().as_ref()) else {
            return false;
        };
        if next == **self.history.present() {
            return false;
        }

        let changed = self.history.set(Arc::new(next));
        if changed {
            self.dirty = true;
        }
        changed
    }

    /// Apply an edit to one animation
    fn update_animation_with(
        &mut self,
        animation_id: &AnimationId,
        f: impl FnOnce(&Animation) -> Option<Animation>,
    ) -> bool {
        self.update_file(|file| {
            let index = file.animation_index(animation_id)?;
            let animation = f(&file.animations[index])?;
            let mut next = file.clone();
            next.animations[index] = Arc::new(animation);
            Some(next)
        })
    }

    /// Apply an edit to the selected animation
    fn update_selected_animation(
        &mut self,
        f: impl FnOnce(&Animation) -> Option<Animation>,
    ) -> bool {
        let Some(animation_id) = self.selected_animation_id.clone() else {
            tracing::debug!("No animation selected");
            return false;
        };
        self.update_animation_with(&animation_id, f)
    }

    /// Apply an edit to one track of the selected animation
    fn update_track(
        &mut self,
        track_id: &TrackId,
        f: impl FnOnce(&Track) -> Option<Track>,
    ) -> bool {
        self.update_selected_animation(|animation| {
            let index = animation.track_index(track_id)?;
            let track = f(&animation.tracks[index])?;
            let mut next = animation.clone();
            next.tracks[index] = track;
            Some(next)
        })
    }

    // ---- files ----

    /// Start an empty document
    pub fn new_file(&mut self) {
        self.adopt(AnimationFile::new(), None);
        tracing::info!("Created new document");
    }

    /// Open a document from disk.
    ///
    /// On failure the current document stays as it was.
    pub fn open_path(&mut self, path: &Path) -> file_service::Result<()> {
        let path = file_service::absolute_path(path)?;
        let file = file_service::load_document(&path)?;
        self.adopt(file, Some(path.clone()));
        tracing::info!(
            "Opened {:?} ({} spritesheets, {} animations)",
            path,
            self.file().spritesheets.len(),
            self.file().animations.len()
        );
        Ok(())
    }

    /// Ask for a document and open it. Returns `false` when cancelled.
    pub fn open_file(&mut self, dialogs: &mut dyn Dialogs) -> file_service::Result<bool> {
        let Some(path) = dialogs.pick_animation_file(DOCUMENT_EXTENSIONS) else {
            return Ok(false);
        };
        self.open_path(&path)?;
        Ok(true)
    }

    /// Save to the current path, asking for one when there is none.
    ///
    /// Returns the saved path, or `None` when cancelled.
    pub fn save_file(
        &mut self,
        dialogs: &mut dyn Dialogs,
    ) -> file_service::Result<Option<PathBuf>> {
        let path = match &self.file_path {
            Some(path) => path.clone(),
            None => match dialogs.pick_save_path(DEFAULT_FILE_NAME, DOCUMENT_EXTENSIONS) {
                Some(path) => path,
                None => return Ok(None),
            },
        };
        self.save_to(&path)?;
        Ok(self.file_path.clone())
    }

    /// Save under a new path. Returns `None` when cancelled.
    pub fn save_file_as(
        &mut self,
        dialogs: &mut dyn Dialogs,
    ) -> file_service::Result<Option<PathBuf>> {
        let Some(path) = dialogs.pick_save_path(DEFAULT_FILE_NAME, DOCUMENT_EXTENSIONS) else {
            return Ok(None);
        };
        self.save_to(&path)?;
        Ok(self.file_path.clone())
    }

    /// Save to the path the document already has
    pub fn save_to_current_path(&mut self) -> file_service::Result<PathBuf> {
        let path = self.file_path.clone().ok_or(FileError::NoPath)?;
        self.save_to(&path)?;
        Ok(path)
    }

    /// Save to `path` and make it the document's path. The stored path
    /// is absolute.
    pub fn save_to(&mut self, path: &Path) -> file_service::Result<()> {
        let path = file_service::absolute_path(path)?;
        file_service::save_document(self.file(), &path)?;
        tracing::info!("Saved {:?}", path);
        self.file_path = Some(path);
        self.dirty = false;
        Ok(())
    }

    fn adopt(&mut self, file: AnimationFile, path: Option<PathBuf>) {
        self.history.reset(Arc::new(file));
        self.file_path = path;
        self.dirty = false;
        self.selected_animation_id = None;
        self.selected_spritesheet_id = None;
        self.selection = Selection::None;
        self.spritesheet_images.clear();
        self.load_spritesheet_images();
        self.sync_clock();
    }
}

impl Default for DocumentController {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for DocumentController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentController")
            .field("file_path", &self.file_path)
            .field("dirty", &self.dirty)
            .field("selection", &self.selection)
            .field("playback", &self.playback)
            .field("history", &self.history.stats())
            .finish_non_exhaustive()
    }
}
