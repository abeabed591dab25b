//! Frame sources (the camera collaborator) and the grid sampler.
//!
//! Capture mechanics are left to whatever produces the frames; the pipeline
//! only needs the newest RGB frame and a readiness flag.

mod pattern;
mod sampler;
mod sequence;
mod still;

use std::path::Path;
use std::time::Duration;

use image::RgbImage;
use tracing::info;

pub use pattern::{PatternConfig, TestPatternSource};
pub use sampler::{FrameSampler, SampleBuffer};
pub use sequence::ImageSequenceSource;
pub use still::StillImageSource;

use crate::error::SourceError;

/// Anything that can hand the pipeline its newest frame
pub trait FrameSource: Send {
    /// True once a frame can be sampled (e.g. the video is playing)
    fn is_ready(&self) -> bool;

    /// Newest frame, or None when not ready
    fn current_frame(&self) -> Option<&RgbImage>;

    /// Move the source's own clock forward by one tick
    fn advance(&mut self, _dt: Duration) -> Result<(), SourceError> {
        Ok(())
    }

    /// Short human-readable description for logs
    fn describe(&self) -> String;
}

/// Open a frame source from a command-line style specifier.
///
/// - `pattern` selects the animated noise test pattern
/// - a directory is treated as an image sequence
/// - anything else is opened as a still image
pub fn open_source(spec: &str, seed: u32) -> Result<Box<dyn FrameSource>, SourceError> {
    if spec.eq_ignore_ascii_case("pattern") {
        let source = TestPatternSource::new(PatternConfig {
            seed,
            ..Default::default()
        });
        info!("Frame source: {}", source.describe());
        return Ok(Box::new(source));
    }

    let path = Path::new(spec);
    let source: Box<dyn FrameSource> = if path.is_dir() {
        Box::new(ImageSequenceSource::open(path, sequence::DEFAULT_FPS)?)
    } else {
        Box::new(StillImageSource::open(path)?)
    };

    info!("Frame source: {}", source.describe());
    Ok(source)
}

/// Check whether a path has an image extension the `image` crate decodes
pub(crate) fn is_supported_image(path: &Path) -> bool {
    path.extension()
        .map(|ext| {
            matches!(
                ext.to_string_lossy().to_lowercase().as_str(),
                "png" | "jpg" | "jpeg" | "bmp" | "tif" | "tiff" | "webp"
            )
        })
        .unwrap_or(false)
}
