// SPDX-License-Identifier: MIT OR Apache-2.0
//! Editor configuration.
//!
//! Stored as RON next to the working directory (`lost_animator.ron`). Every
//! field has a default, so a partial file fills the rest in.

use crate::history::DEFAULT_MAX_DEPTH;
use crate::state::{TimelineView, DEFAULT_ZOOM};
use lost_animator_timeline::animation::DEFAULT_GRID_SIZE;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Current config format version
pub const CONFIG_FORMAT_VERSION: u32 = 1;

/// Config file name
pub const CONFIG_FILE_NAME: &str = "lost_animator.ron";

/// Errors loading or saving the config
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Reading or writing the file failed
    #[error("Config I/O error at {path:?}: {source}")]
    Io {
        /// Config file
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid RON for [`EditorConfig`]
    #[error("Invalid config: {0}")]
    Parse(#[from] ron::error::SpannedError),

    /// Serializing the config failed
    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] ron::Error),

    /// The file was written by a newer editor
    #[error("Config version {found} is newer than supported version {supported}")]
    UnsupportedVersion {
        /// Version in the file
        found: u32,
        /// Highest version this build reads
        supported: u32,
    },
}

/// Config result type
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Timeline defaults for new sessions
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimelineDefaults {
    /// Pixels per second
    pub zoom: f64,
    /// Snap edits to the grid
    pub snap_to_grid: bool,
    /// Snap grid in seconds
    pub grid_size: f64,
}

impl Default for TimelineDefaults {
    fn default() -> Self {
        Self {
            zoom: DEFAULT_ZOOM,
            snap_to_grid: true,
            grid_size: DEFAULT_GRID_SIZE,
        }
    }
}

/// Editor configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Format version
    pub version: u32,
    /// Undo steps kept
    pub history_depth: usize,
    /// Timeline view on startup
    pub timeline: TimelineDefaults,
    /// Initial playback speed multiplier
    pub playback_speed: f64,
    /// Tile width for newly added spritesheets
    pub default_tile_width: u32,
    /// Tile height for newly added spritesheets
    pub default_tile_height: u32,
    /// Default `tracing` filter directive, overridden by `RUST_LOG`
    pub log_filter: String,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_FORMAT_VERSION,
            history_depth: DEFAULT_MAX_DEPTH,
            timeline: TimelineDefaults::default(),
            playback_speed: 1.0,
            default_tile_width: 32,
            default_tile_height: 32,
            log_filter: "lost_animator_editor=info".to_string(),
        }
    }
}

impl EditorConfig {
    /// Load a config file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: EditorConfig = ron::from_str(&content)?;

        if config.version > CONFIG_FORMAT_VERSION {
            return Err(ConfigError::UnsupportedVersion {
                found: config.version,
                supported: CONFIG_FORMAT_VERSION,
            });
        }

        Ok(config)
    }

    /// Save to a config file
    pub fn save(&self, path: &Path) -> Result<()> {
        let pretty = ron::ser::PrettyConfig::default()
            .struct_names(true)
            .enumerate_arrays(false);
        let content = ron::ser::to_string_pretty(self, pretty)?;

        std::fs::write(path, content).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load a config file, falling back to defaults when it is missing or broken
    pub fn load_or_default(path: &Path) -> Self {
        if !path.exists() {
            tracing::debug!("No config at {:?}, using defaults", path);
            return Self::default();
        }

        match Self::load(path) {
            Ok(config) => {
                tracing::info!("Loaded config from {:?}", path);
                config
            }
            Err(e) => {
                tracing::warn!("Ignoring config {:?}: {e}", path);
                Self::default()
            }
        }
    }

    /// Config file path inside a directory
    pub fn file_path(dir: &Path) -> PathBuf {
        dir.join(CONFIG_FILE_NAME)
    }

    /// Timeline view these settings start with
    pub fn timeline_view(&self) -> TimelineView {
        TimelineView {
            zoom: TimelineView::clamp_zoom(self.timeline.zoom),
            scroll_x: 0.0,
            snap_to_grid: self.timeline.snap_to_grid,
            grid_size: TimelineView::clamp_grid_size(self.timeline.grid_size),
        }
    }

    /// Tile size for newly added spritesheets, at least 1x1
    pub fn default_tile_size(&self) -> (u32, u32) {
        (self.default_tile_width.max(1), self.default_tile_height.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = EditorConfig::default();
        assert_eq!(config.version, CONFIG_FORMAT_VERSION);
        assert_eq!(config.history_depth, 50);
        assert_eq!(config.timeline.zoom, 200.0);
        assert!(config.timeline.snap_to_grid);
        assert_eq!(config.timeline.grid_size, 0.05);
        assert_eq!(config.playback_speed, 1.0);
        assert_eq!(config.default_tile_size(), (32, 32));
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempdir().unwrap();
        let path = EditorConfig::file_path(dir.path());

        let config = EditorConfig {
            history_depth: 20,
            default_tile_width: 16,
            ..Default::default()
        };
        config.save(&path).unwrap();

        let loaded = EditorConfig::load(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("partial.ron");
        std::fs::write(&path, "(history_depth: 10)").unwrap();

        let config = EditorConfig::load(&path).unwrap();
        assert_eq!(config.history_depth, 10);
        assert_eq!(config.timeline, TimelineDefaults::default());
    }

    #[test]
    fn test_newer_version_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("future.ron");
        std::fs::write(&path, "(version: 99)").unwrap();

        let err = EditorConfig::load(&path).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::UnsupportedVersion { found: 99, .. }
        ));
    }

    #[test]
    fn test_load_or_default_recovers() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("missing.ron");
        assert_eq!(EditorConfig::load_or_default(&missing), EditorConfig::default());

        let broken = dir.path().join("broken.ron");
        std::fs::write(&broken, "not ron at all (").unwrap();
        assert_eq!(EditorConfig::load_or_default(&broken), EditorConfig::default());
    }

    #[test]
    fn test_timeline_view_clamps() {
        let config = EditorConfig {
            timeline: TimelineDefaults {
                zoom: 5000.0,
                snap_to_grid: false,
                grid_size: 0.0,
            },
            ..Default::default()
        };
        let view = config.timeline_view();
        assert_eq!(view.zoom, 500.0);
        assert!(!view.snap_to_grid);
        assert_eq!(view.grid_size, 0.01);
    }
}
