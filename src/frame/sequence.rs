//! Directory of numbered frames played back as a looping video.

use std::path::{Path, PathBuf};
use std::time::Duration;

use image::RgbImage;
use tracing::{debug, info};

use super::{is_supported_image, FrameSource};
use crate::error::SourceError;

/// Playback rate used when none is given
pub const DEFAULT_FPS: f64 = 30.0;

/// Image sequence decoder with its own playback clock
pub struct ImageSequenceSource {
    directory: PathBuf,
    frame_paths: Vec<PathBuf>,
    fps: f64,
    /// Playback position on the source clock
    position: Duration,
    loaded_index: usize,
    frame: Option<RgbImage>,
}

impl ImageSequenceSource {
    /// Scan a directory for images (sorted by file name) and decode the first one
    pub fn open<P: AsRef<Path>>(directory: P, fps: f64) -> Result<Self, SourceError> {
        let directory = directory.as_ref();
        if !directory.is_dir() {
            return Err(SourceError::NotFound(directory.display().to_string()));
        }

        let mut frame_paths: Vec<PathBuf> = std::fs::read_dir(directory)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.is_file() && is_supported_image(path))
            .collect();
        frame_paths.sort();

        if frame_paths.is_empty() {
            return Err(SourceError::EmptySequence(directory.display().to_string()));
        }

        let frame = load_frame(&frame_paths[0])?;
        info!(
            "Image sequence opened: {} frames @ {} fps from {}",
            frame_paths.len(),
            fps,
            directory.display()
        );

        Ok(Self {
            directory: directory.to_path_buf(),
            frame_paths,
            fps: if fps > 0.0 { fps } else { DEFAULT_FPS },
            position: Duration::ZERO,
            loaded_index: 0,
            frame: Some(frame),
        })
    }

    pub fn frame_count(&self) -> usize {
        self.frame_paths.len()
    }

    /// Frame index for the current playback position (looping)
    pub fn current_index(&self) -> usize {
        let frame = (self.position.as_secs_f64() * self.fps).floor() as usize;
        frame % self.frame_paths.len()
    }
}

fn load_frame(path: &Path) -> Result<RgbImage, SourceError> {
    Ok(image::open(path)
        .map_err(|e| SourceError::Decode(format!("{}: {}", path.display(), e)))?
        .to_rgb8())
}

impl FrameSource for ImageSequenceSource {
    fn is_ready(&self) -> bool {
        self.frame.is_some()
    }

    fn current_frame(&self) -> Option<&RgbImage> {
        self.frame.as_ref()
    }

    fn advance(&mut self, dt: Duration) -> Result<(), SourceError> {
        self.position += dt;
        let index = self.current_index();
        if index == self.loaded_index && self.frame.is_some() {
            return Ok(());
        }

        debug!("Sequence frame {} -> {}", self.loaded_index, index);
        self.loaded_index = index;
        // A frame that fails to decode leaves the source not ready rather than stale
        match load_frame(&self.frame_paths[index]) {
            Ok(frame) => {
                self.frame = Some(frame);
                Ok(())
            }
            Err(e) => {
                self.frame = None;
                Err(e)
            }
        }
    }

    fn describe(&self) -> String {
        format!(
            "image sequence {} ({} frames)",
            self.directory.display(),
            self.frame_paths.len()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_sequence(dir: &Path, shades: &[u8]) {
        for (i, shade) in shades.iter().enumerate() {
            RgbImage::from_pixel(4, 4, image::Rgb([*shade; 3]))
                .save(dir.join(format!("frame_{:03}.png", i)))
                .unwrap();
        }
        std::fs::write(dir.join("readme.txt"), b"ignored").unwrap();
    }

    #[test]
    fn test_advance_steps_through_frames_and_loops() {
        let dir = tempfile::tempdir().unwrap();
        write_sequence(dir.path(), &[10, 20, 30]);

        let mut source = ImageSequenceSource::open(dir.path(), 10.0).unwrap();
        assert_eq!(source.frame_count(), 3);
        assert_eq!(source.current_frame().unwrap().get_pixel(0, 0).0, [10; 3]);

        source.advance(Duration::from_millis(150)).unwrap();
        assert_eq!(source.current_frame().unwrap().get_pixel(0, 0).0, [20; 3]);

        source.advance(Duration::from_millis(200)).unwrap();
        assert_eq!(source.current_index(), 0);
        assert_eq!(source.current_frame().unwrap().get_pixel(0, 0).0, [10; 3]);
    }

    #[test]
    fn test_empty_directory_rejected() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            ImageSequenceSource::open(dir.path(), 30.0),
            Err(SourceError::EmptySequence(_))
        ));
    }

    #[test]
    fn test_broken_frame_makes_source_not_ready() {
        let dir = tempfile::tempdir().unwrap();
        write_sequence(dir.path(), &[10]);
        std::fs::write(dir.path().join("frame_001.png"), b"garbage").unwrap();

        let mut source = ImageSequenceSource::open(dir.path(), 10.0).unwrap();
        assert!(source.advance(Duration::from_millis(150)).is_err());
        assert!(!source.is_ready());
    }
}
