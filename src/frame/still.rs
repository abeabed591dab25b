//! Still image treated as a frozen camera feed.

use std::path::Path;

use image::RgbImage;
use tracing::info;

use super::FrameSource;
use crate::error::SourceError;

/// A single decoded image, always ready
pub struct StillImageSource {
    frame: RgbImage,
    label: String,
}

impl StillImageSource {
    /// Load a still image from a file
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, SourceError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(SourceError::NotFound(path.display().to_string()));
        }

        let frame = image::open(path)
            .map_err(|e| SourceError::Decode(format!("{}: {}", path.display(), e)))?
            .to_rgb8();

        info!(
            "Still image loaded: {}x{} from {}",
            frame.width(),
            frame.height(),
            path.display()
        );

        Ok(Self {
            frame,
            label: path.display().to_string(),
        })
    }

    /// Wrap an already decoded frame
    pub fn from_frame(frame: RgbImage) -> Self {
        Self {
            label: format!("in-memory {}x{}", frame.width(), frame.height()),
            frame,
        }
    }
}

impl FrameSource for StillImageSource {
    fn is_ready(&self) -> bool {
        self.frame.width() > 0 && self.frame.height() > 0
    }

    fn current_frame(&self) -> Option<&RgbImage> {
        self.is_ready().then_some(&self.frame)
    }

    fn describe(&self) -> String {
        format!("still image {}", self.label)
    }
}
