//! Image folder session.
//!
//! A session walks the images of one folder in file name order. Exactly one
//! image is active at a time; it owns the annotation set loaded from its label
//! file and the interaction controller editing it. Switching images flushes
//! the active set first.

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::config::UserPreferences;
use crate::constants::{IMAGE_EXTENSIONS, VERTEX_HIT_RADIUS};
use crate::format::{self, FormatError, SaveReport, SkippedLine};
use crate::interaction::InteractionController;
use crate::model::{AnnotationSet, ImageSize};

/// Errors raised while navigating or saving a session.
#[derive(Error, Debug)]
pub enum SessionError {
    /// Label file could not be read or written
    #[error(transparent)]
    Format(#[from] FormatError),

    /// Image folder could not be listed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The active image has edits that would be lost by switching
    #[error("Unsaved changes for image '{image}'")]
    UnsavedChanges {
        /// Key of the image with pending edits
        image: String,
    },
}

/// Behaviour switches for a session.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionOptions {
    /// Save a dirty set automatically before switching images.
    pub save_on_navigate: bool,
    /// Vertex proximity radius handed to each controller.
    pub hit_radius: f32,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            save_on_navigate: true,
            hit_radius: VERTEX_HIT_RADIUS,
        }
    }
}

impl From<&UserPreferences> for SessionOptions {
    fn from(prefs: &UserPreferences) -> Self {
        Self {
            save_on_navigate: prefs.save_on_navigate,
            hit_radius: prefs.vertex_hit_radius,
        }
    }
}

/// The image currently being annotated.
#[derive(Debug)]
pub struct ActiveImage {
    pub path: PathBuf,
    pub label_path: PathBuf,
    pub size: ImageSize,
    pub set: AnnotationSet,
    pub controller: InteractionController,
    /// Label lines rejected when this image was loaded.
    pub skipped: Vec<SkippedLine>,
}

impl ActiveImage {
    pub fn image_key(&self) -> &str {
        self.set.image_key()
    }
}

/// Navigation over the images of a folder.
#[derive(Debug)]
pub struct Session {
    images: Vec<PathBuf>,
    labels_dir: PathBuf,
    options: SessionOptions,
    index: usize,
    current: Option<ActiveImage>,
}

impl Session {
    /// Scan `images_dir` and activate its first image, if any.
    pub fn open(
        images_dir: &Path,
        labels_dir: &Path,
        options: SessionOptions,
    ) -> Result<Self, SessionError> {
        let images = list_images(images_dir)?;
        log::info!("📂 Found {} images in {:?}", images.len(), images_dir);

        let mut session = Self {
            images,
            labels_dir: labels_dir.to_path_buf(),
            options,
            index: 0,
            current: None,
        };
        if !session.images.is_empty() {
            session.current = Some(session.load_image(0)?);
        }
        Ok(session)
    }

    pub fn current(&self) -> Option<&ActiveImage> {
        self.current.as_ref()
    }

    pub fn current_mut(&mut self) -> Option<&mut ActiveImage> {
        self.current.as_mut()
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    pub fn images(&self) -> &[PathBuf] {
        &self.images
    }

    pub fn labels_dir(&self) -> &Path {
        &self.labels_dir
    }

    pub fn options(&self) -> SessionOptions {
        self.options
    }

    /// Move to the next image. Returns `Ok(false)` at the end of the list.
    pub fn next(&mut self) -> Result<bool, SessionError> {
        self.goto(self.index + 1)
    }

    /// Move to the previous image. Returns `Ok(false)` at the start of the list.
    pub fn previous(&mut self) -> Result<bool, SessionError> {
        match self.index.checked_sub(1) {
            Some(index) => self.goto(index),
            None => Ok(false),
        }
    }

    /// Activate image `index`. Out of range or unchanged indices are a no-op.
    pub fn goto(&mut self, index: usize) -> Result<bool, SessionError> {
        if index >= self.images.len() || (index == self.index && self.current.is_some()) {
            return Ok(false);
        }

        self.flush()?;
        let image = self.load_image(index)?;
        self.current = Some(image);
        self.index = index;
        log::debug!("Switched to image {}/{}", index + 1, self.images.len());
        Ok(true)
    }

    /// Save the active set. Returns `None` when no image is active.
    pub fn save(&mut self) -> Result<Option<SaveReport>, SessionError> {
        let Some(current) = self.current.as_mut() else {
            return Ok(None);
        };
        let report = format::save(&current.label_path, &current.set, current.size)?;
        current.set.clear_dirty();
        Ok(Some(report))
    }

    /// Drop unsaved edits by reloading the active image from disk.
    pub fn discard_changes(&mut self) -> Result<(), SessionError> {
        if self.current.is_none() {
            return Ok(());
        }
        let image = self.load_image(self.index)?;
        log::info!("🗑️ Discarded changes for '{}'", image.image_key());
        self.current = Some(image);
        Ok(())
    }

    fn flush(&mut self) -> Result<(), SessionError> {
        let Some(current) = self.current.as_mut() else {
            return Ok(());
        };
        if current.set.is_dirty() && !self.options.save_on_navigate {
            return Err(SessionError::UnsavedChanges {
                image: current.image_key().to_string(),
            });
        }

        current.controller.reset();
        current.set.end_all_drags();
        if current.set.is_dirty() {
            self.save()?;
        }
        Ok(())
    }

    fn load_image(&self, index: usize) -> Result<ActiveImage, SessionError> {
        let path = self.images[index].clone();
        let key = image_key(&path);

        let size = ImageSize::probe(&path).map_err(|e| {
            log::warn!("Failed to read dimensions of {:?}: {}", path, e);
            FormatError::missing_dimensions(key.clone())
        })?;

        let label_path = format::label_path(&self.labels_dir, &path);
        let report = format::load(&label_path, &key, size)?;

        Ok(ActiveImage {
            path,
            label_path,
            size,
            set: report.set,
            controller: InteractionController::with_hit_radius(self.options.hit_radius),
            skipped: report.skipped,
        })
    }
}

/// Key identifying an image: its file stem.
pub fn image_key(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// List supported image files in `dir`, sorted by file name.
pub fn list_images(dir: &Path) -> Result<Vec<PathBuf>, std::io::Error> {
    let mut images = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && is_supported_image(&path) {
            images.push(path);
        }
    }
    images.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(images)
}

fn is_supported_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            IMAGE_EXTENSIONS
                .iter()
                .any(|supported| ext.eq_ignore_ascii_case(supported))
        })
        .unwrap_or(false)
}
