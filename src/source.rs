use std::path::{Path, PathBuf};

use anyhow::Context;
use image::ImageReader;

use crate::models::Frame;

/// Supplies frames in capture order
pub trait FrameSource {
    /// Next frame, or `None` once the stream has ended
    fn next_frame(&mut self) -> anyhow::Result<Option<Frame>>;
}

const FRAME_EXTENSIONS: [&str; 4] = ["png", "jpg", "jpeg", "bmp"];

/// Frames stored as numbered image files in a directory
pub struct ImageSequence {
    paths: Vec<PathBuf>,
    position: usize,
}

impl ImageSequence {
    /// Collect image files in `dir`, sorted by file name
    pub fn open(dir: &Path) -> anyhow::Result<Self> {
        let entries = std::fs::read_dir(dir)
            .with_context(|| format!("Failed to read frame directory {}", dir.display()))?;

        let mut paths = Vec::new();
        for entry in entries {
            let path = entry?.path();
            let is_frame = path
                .extension()
                .and_then(|ext| ext.to_str())
                .map(|ext| FRAME_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
                .unwrap_or(false);
            if path.is_file() && is_frame {
                paths.push(path);
            }
        }
        paths.sort();

        Ok(Self { paths, position: 0 })
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

impl FrameSource for ImageSequence {
    fn next_frame(&mut self) -> anyhow::Result<Option<Frame>> {
        let Some(path) = self.paths.get(self.position) else {
            return Ok(None);
        };
        self.position += 1;

        let img = ImageReader::open(path)
            .with_context(|| format!("Failed to open frame {}", path.display()))?
            .decode()
            .map_err(|e| anyhow::anyhow!("Failed to decode frame {}: {}", path.display(), e))?;
        Ok(Some(img.to_rgb8()))
    }
}

/// In-memory frames, mostly for tests and demos
pub struct VecSource {
    frames: std::vec::IntoIter<Frame>,
}

impl VecSource {
    pub fn new(frames: Vec<Frame>) -> Self {
        Self {
            frames: frames.into_iter(),
        }
    }
}

impl FrameSource for VecSource {
    fn next_frame(&mut self) -> anyhow::Result<Option<Frame>> {
        Ok(self.frames.next())
    }
}
