use std::path::{Path, PathBuf};

use image::ImageFormat;

use super::capture::CaptureError;

/// Directory of downsized PNG thumbnails keyed by item path.
#[derive(Debug, Clone)]
pub struct ThumbnailCache {
    dir: PathBuf,
    max_edge: u32,
}

impl ThumbnailCache {
    pub fn new(dir: impl Into<PathBuf>, max_edge: u32) -> Self {
        Self {
            dir: dir.into(),
            max_edge: max_edge.max(1),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Cache location for the item at `full_path`.
    pub fn path_for(&self, full_path: &str) -> PathBuf {
        let digest = blake3::hash(full_path.as_bytes());
        self.dir.join(format!("{}.png", digest.to_hex()))
    }

    /// Decode `frame`, shrink it to the cache's edge size, and write it as PNG.
    ///
    /// The frame bytes are dropped once encoded; only the file path survives.
    pub fn store_frame(&self, full_path: &str, frame: Vec<u8>) -> Result<PathBuf, CaptureError> {
        let target = self.path_for(full_path);
        let decoded = image::load_from_memory(&frame).map_err(|source| CaptureError::Decode {
            path: target.clone(),
            source,
        })?;
        drop(frame);
        let thumbnail = decoded.thumbnail(self.max_edge, self.max_edge);
        std::fs::create_dir_all(&self.dir).map_err(|source| CaptureError::Store {
            path: self.dir.clone(),
            source,
        })?;
        thumbnail
            .save_with_format(&target, ImageFormat::Png)
            .map_err(|source| CaptureError::Decode {
                path: target.clone(),
                source,
            })?;
        Ok(target)
    }
}
