//! Session options gathered from the command line. Nothing here is persisted.

use std::path::PathBuf;

use crate::error::{Error, Result};
use crate::finalize::TextFileHandoff;
use crate::types::Size;

/// Where the source raster comes from at startup and on recapture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceChoice {
    /// Decode an image file once at startup.
    File(PathBuf),
    /// Grab a still from the camera with this index.
    Camera(u32),
    /// No source: the working buffer stays background.
    None,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    pub source: SourceChoice,
    pub window: Size,
    pub seed: Option<u64>,
    pub note_path: PathBuf,
    pub launch_viewer: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            source: SourceChoice::Camera(0),
            window: Size::new(1280, 720),
            seed: None,
            note_path: TextFileHandoff::default_path(),
            launch_viewer: true,
        }
    }
}

impl SessionConfig {
    pub fn validate(&self) -> Result<()> {
        if self.window.is_empty() {
            return Err(Error::InvalidConfig(format!(
                "window size must be positive, got {}x{}",
                self.window.width, self.window.height
            )));
        }
        if let SourceChoice::File(path) = &self.source {
            if !path.is_file() {
                return Err(Error::InvalidConfig(format!(
                    "image path {} must point to a file",
                    path.display()
                )));
            }
        }
        if self.note_path.as_os_str().is_empty() {
            return Err(Error::InvalidConfig("note path must not be empty".into()));
        }
        Ok(())
    }

    /// Camera used by the recapture key, if the session captures at all.
    pub fn camera_index(&self) -> Option<u32> {
        match self.source {
            SourceChoice::Camera(index) => Some(index),
            _ => None,
        }
    }

    pub fn handoff(&self) -> TextFileHandoff {
        TextFileHandoff::new(self.note_path.clone(), self.launch_viewer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        let cfg = SessionConfig::default();
        cfg.validate().expect("defaults are valid");
        assert_eq!(cfg.camera_index(), Some(0));
    }

    #[test]
    fn rejects_zero_window() {
        let cfg = SessionConfig {
            window: Size::new(0, 600),
            ..SessionConfig::default()
        };
        assert!(matches!(cfg.validate(), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn rejects_missing_image_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let cfg = SessionConfig {
            source: SourceChoice::File(dir.path().join("nope.png")),
            ..SessionConfig::default()
        };
        assert!(matches!(cfg.validate(), Err(Error::InvalidConfig(_))));

        // A directory is not an image either.
        let cfg = SessionConfig {
            source: SourceChoice::File(dir.path().to_path_buf()),
            ..SessionConfig::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn accepts_existing_image_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("source.png");
        std::fs::write(&path, b"not really a png").expect("write");
        let cfg = SessionConfig {
            source: SourceChoice::File(path),
            seed: Some(1),
            ..SessionConfig::default()
        };
        cfg.validate().expect("existing file passes");
        assert_eq!(cfg.camera_index(), None);
    }
}
