use std::path::{Path, PathBuf};

use anyhow::Result;
use tracing::debug;

use crate::models::Frame;
use crate::pipeline::FrameReport;
use crate::render;

const FOREGROUND_DIR: &str = "01_foreground";
const CONDITIONED_DIR: &str = "02_conditioned";
const ANNOTATED_DIR: &str = "03_annotated";

/// Writes per-frame intermediate images for inspection
pub struct DebugSink {
    output_dir: PathBuf,
}

impl DebugSink {
    /// The directory must be empty or non-existent
    pub fn new(output_dir: PathBuf) -> Result<Self> {
        if output_dir.exists() {
            let entries = std::fs::read_dir(&output_dir)?;
            if entries.count() > 0 {
                return Err(anyhow::anyhow!(
                    "Debug directory is not empty: {}",
                    output_dir.display()
                ));
            }
        }
        for dir in [FOREGROUND_DIR, CONDITIONED_DIR, ANNOTATED_DIR] {
            std::fs::create_dir_all(output_dir.join(dir))?;
        }

        Ok(Self { output_dir })
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// File name used for a frame, e.g. "frame_000042.png"
    pub fn frame_filename(frame_index: u64) -> String {
        format!("frame_{:06}.png", frame_index)
    }

    pub fn save(&self, frame: &Frame, report: &FrameReport, counting_line_y: i32) -> Result<()> {
        let filename = Self::frame_filename(report.frame_index);

        report
            .foreground
            .as_image()
            .save(self.output_dir.join(FOREGROUND_DIR).join(&filename))
            .map_err(|e| anyhow::anyhow!("Failed to save debug image: {}", e))?;
        report
            .mask
            .save(self.output_dir.join(CONDITIONED_DIR).join(&filename))
            .map_err(|e| anyhow::anyhow!("Failed to save debug image: {}", e))?;
        render::annotate(frame, &report.detections, counting_line_y)
            .save(self.output_dir.join(ANNOTATED_DIR).join(&filename))
            .map_err(|e| anyhow::anyhow!("Failed to save debug image: {}", e))?;

        debug!(frame = report.frame_index, "Saved debug images");
        Ok(())
    }
}
