//! PNG storage for image items, one file per image id.

use std::path::PathBuf;

use image::{ImageFormat, RgbaImage};

use crate::error::AssetError;

/// True if `s` can be used verbatim as a single file or directory name.
pub(crate) fn is_path_segment(s: &str) -> bool {
    !s.is_empty()
        && s != "."
        && s != ".."
        && !s.starts_with('.')
        && !s.chars().any(|c| matches!(c, '/' | '\\' | '\0'))
}

/// Maps image ids to `<dir>/<image_id>.png`.
///
/// Ids are only meaningful within one notebook; two stores rooted in
/// different notebooks never share files.
#[derive(Clone, Debug)]
pub struct AssetStore {
    dir: PathBuf,
}

impl AssetStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, image_id: &str) -> Result<PathBuf, AssetError> {
        if !is_path_segment(image_id) {
            return Err(AssetError::InvalidImageId(image_id.to_string()));
        }
        Ok(self.dir.join(format!("{image_id}.png")))
    }

    pub fn contains(&self, image_id: &str) -> bool {
        self.path_for(image_id).map(|p| p.is_file()).unwrap_or(false)
    }

    /// Write `bitmap` as the asset for `image_id`, replacing any existing
    /// file. Returns the final path.
    pub fn put(&self, image_id: &str, bitmap: &RgbaImage) -> Result<PathBuf, AssetError> {
        let path = self.path_for(image_id)?;
        std::fs::create_dir_all(&self.dir).map_err(|source| AssetError::Io {
            path: self.dir.clone(),
            source,
        })?;

        let tmp_path = self.dir.join(format!(".{image_id}.png.tmp"));
        bitmap.save_with_format(&tmp_path, ImageFormat::Png)?;
        std::fs::rename(&tmp_path, &path).map_err(|source| AssetError::Io {
            path: path.clone(),
            source,
        })?;

        tracing::debug!(
            image_id,
            width = bitmap.width(),
            height = bitmap.height(),
            "wrote image asset"
        );
        Ok(path)
    }

    pub fn get(&self, image_id: &str) -> Result<RgbaImage, AssetError> {
        let path = self.path_for(image_id)?;
        if !path.is_file() {
            return Err(AssetError::AssetNotFound(image_id.to_string()));
        }
        let img = image::open(&path)?;
        Ok(img.to_rgba8())
    }
}
