// SPDX-License-Identifier: MIT OR Apache-2.0
//! Saving and reopening documents on disk.

use image::{Rgba, RgbaImage};
use lost_animator_editor::file_service::{DEFAULT_FILE_NAME, DOCUMENT_EXTENSIONS};
use lost_animator_editor::{Dialogs, DocumentController, FileError, SequentialIds};
use lost_animator_timeline::{Key, SpriteKey, TrackType};
use std::path::{Path, PathBuf};
use tempfile::tempdir;

fn write_png(path: &Path, width: u32, height: u32) {
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    RgbaImage::from_pixel(width, height, Rgba([0, 128, 255, 255]))
        .save(path)
        .unwrap();
}

fn controller() -> DocumentController {
    DocumentController::new().with_id_generator(SequentialIds::new("p"))
}

#[test]
fn test_save_and_reopen() {
    let dir = tempdir().unwrap();
    let image_path = dir.path().join("sprites").join("hero.png");
    let doc_path = dir.path().join("hero.json");
    write_png(&image_path, 96, 64);

    let mut doc = controller();
    let sheet_id = doc.add_spritesheet_from_path(&image_path).unwrap();
    doc.add_animation();
    let track_id = doc.add_track(TrackType::Sprite).unwrap();
    let key_id = doc.new_key_id();
    doc.add_key(
        &track_id,
        Key::Sprite(SpriteKey::new(key_id, 0.25, [1, 1]).with_spritesheet(sheet_id.clone())),
    );
    doc.save_to(&doc_path).unwrap();
    assert!(!doc.is_dirty());
    assert_eq!(doc.file_path(), Some(doc_path.as_path()));

    let raw: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&doc_path).unwrap()).unwrap();
    assert_eq!(raw["spritesheets"][0]["imagePath"], "sprites/hero.png");

    let mut reopened = controller();
    reopened.open_path(&doc_path).unwrap();
    assert_eq!(reopened.file(), doc.file());
    assert_eq!(reopened.file().spritesheets[0].image_path, image_path);
    assert!(!reopened.can_undo());
    assert!(reopened.selection().is_none());

    let image = reopened.spritesheet_image(&sheet_id).unwrap();
    let sheet = reopened.file().spritesheet(&sheet_id).unwrap();
    assert_eq!(image.grid_dimensions(sheet), (3, 2));
    assert!(image.frame(sheet, [1, 1]).is_some());
}

#[test]
fn test_missing_image_still_opens() {
    let dir = tempdir().unwrap();
    let image_path = dir.path().join("gone.png");
    let doc_path = dir.path().join("doc.json");
    write_png(&image_path, 32, 32);

    let mut doc = controller();
    let sheet_id = doc.add_spritesheet_from_path(&image_path).unwrap();
    doc.save_to(&doc_path).unwrap();
    std::fs::remove_file(&image_path).unwrap();

    let mut reopened = controller();
    reopened.open_path(&doc_path).unwrap();
    assert_eq!(reopened.file().spritesheets.len(), 1);
    assert!(reopened.spritesheet_image(&sheet_id).is_none());

    let broken = reopened.broken_references();
    assert_eq!(broken.len(), 1);
    assert_eq!(broken[0].spritesheet_id, sheet_id);
}

#[test]
fn test_failed_open_keeps_document() {
    let dir = tempdir().unwrap();
    let doc_path = dir.path().join("bad.json");
    std::fs::write(&doc_path, r#"{"version": "9.9", "spritesheets": [], "animations": []}"#)
        .unwrap();

    let mut doc = controller();
    let animation_id = doc.add_animation();
    let before = doc.snapshot();

    let err = doc.open_path(&doc_path).unwrap_err();
    assert!(matches!(err, FileError::Invalid { .. }));
    assert_eq!(doc.snapshot(), before);
    assert_eq!(doc.selected_animation_id(), Some(&animation_id));
    assert!(doc.is_dirty());
    assert!(doc.file_path().is_none());
}

#[test]
fn test_relative_document_path_keeps_images() {
    let dir = tempfile::tempdir_in(".").unwrap();
    assert!(dir.path().is_relative());
    let image_path = dir.path().join("art").join("hero.png");
    let doc_path = dir.path().join("hero.json");
    write_png(&image_path, 32, 32);
    let absolute_image = std::path::absolute(&image_path).unwrap();

    let mut doc = controller();
    let sheet_id = doc.add_spritesheet_from_path(&image_path).unwrap();
    assert_eq!(doc.file().spritesheets[0].image_path, absolute_image);
    doc.save_to(&doc_path).unwrap();
    assert!(doc.file_path().unwrap().is_absolute());

    let raw: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&doc_path).unwrap()).unwrap();
    assert_eq!(raw["spritesheets"][0]["imagePath"], "art/hero.png");

    let mut reopened = controller();
    reopened.open_path(&doc_path).unwrap();
    assert_eq!(reopened.file().spritesheets[0].image_path, absolute_image);
    assert!(reopened.spritesheet_image(&sheet_id).is_some());

    reopened.save_to_current_path().unwrap();
    let mut again = controller();
    again.open_path(&doc_path).unwrap();
    assert_eq!(again.file().spritesheets[0].image_path, absolute_image);
    assert!(again.broken_references().is_empty());
}

#[test]
fn test_undo_relocation_after_reopen() {
    let dir = tempdir().unwrap();
    let first = dir.path().join("a.png");
    let second = dir.path().join("b.png");
    let doc_path = dir.path().join("doc.json");
    write_png(&first, 8, 8);
    write_png(&second, 16, 16);

    let mut doc = controller();
    let sheet_id = doc.add_spritesheet_from_path(&first).unwrap();
    doc.save_to(&doc_path).unwrap();

    let mut reopened = controller();
    reopened.open_path(&doc_path).unwrap();
    assert!(reopened.relocate_spritesheet(&sheet_id, &second).unwrap());

    assert!(reopened.undo());
    let image = reopened.spritesheet_image(&sheet_id).unwrap();
    assert_eq!(image.width(), 8);
    assert_eq!(image.path(), first);

    assert!(reopened.redo());
    assert_eq!(reopened.spritesheet_image(&sheet_id).unwrap().width(), 16);
}

/// Answers every prompt with one path and remembers the filters it was shown
struct ScriptedDialogs {
    path: Option<PathBuf>,
    requests: Vec<(&'static str, Vec<String>)>,
}

impl ScriptedDialogs {
    fn new(path: Option<PathBuf>) -> Self {
        Self {
            path,
            requests: Vec::new(),
        }
    }

    fn record(&mut self, kind: &'static str, extensions: &[&str]) -> Option<PathBuf> {
        let filters = extensions.iter().map(|ext| ext.to_string()).collect();
        self.requests.push((kind, filters));
        self.path.clone()
    }
}

impl Dialogs for ScriptedDialogs {
    fn pick_animation_file(&mut self, extensions: &[&str]) -> Option<PathBuf> {
        self.record("open", extensions)
    }

    fn pick_save_path(&mut self, suggested_name: &str, extensions: &[&str]) -> Option<PathBuf> {
        assert_eq!(suggested_name, DEFAULT_FILE_NAME);
        self.record("save", extensions)
    }

    fn pick_image(&mut self, extensions: &[&str]) -> Option<PathBuf> {
        self.record("image", extensions)
    }
}

#[test]
fn test_dialogs_receive_document_filters() {
    let dir = tempdir().unwrap();
    let doc_path = dir.path().join("walk.anim");

    let mut doc = controller();
    doc.add_animation();
    let mut dialogs = ScriptedDialogs::new(Some(doc_path.clone()));
    assert_eq!(doc.save_file_as(&mut dialogs).unwrap(), Some(doc_path.clone()));

    let mut reopened = controller();
    assert!(reopened.open_file(&mut dialogs).unwrap());
    assert_eq!(reopened.file(), doc.file());

    let mut cancelled = ScriptedDialogs::new(None);
    assert_eq!(controller().save_file(&mut cancelled).unwrap(), None);

    let expected: Vec<String> = DOCUMENT_EXTENSIONS.iter().map(|e| e.to_string()).collect();
    assert_eq!(dialogs.requests, [("save", expected.clone()), ("open", expected.clone())]);
    assert_eq!(cancelled.requests, [("save", expected)]);
}
