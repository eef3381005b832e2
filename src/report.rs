use std::path::Path;
use std::time::{Duration, Instant};

use anyhow::Context;
use serde::Serialize;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

/// Frames per measurement window
pub const FPS_WINDOW: u64 = 30;

/// Frame rate averaged over fixed windows of [`FPS_WINDOW`] frames
pub struct FrameRateMeter {
    frames: u64,
    window_start: Instant,
    current: f64,
}

impl FrameRateMeter {
    pub fn new() -> Self {
        Self {
            frames: 0,
            window_start: Instant::now(),
            current: 0.0,
        }
    }

    /// Record a frame; returns the new rate when a window closes
    pub fn tick(&mut self) -> Option<f64> {
        self.tick_at(Instant::now())
    }

    pub fn tick_at(&mut self, now: Instant) -> Option<f64> {
        self.frames += 1;
        if self.frames % FPS_WINDOW != 0 {
            return None;
        }
        let elapsed = now.saturating_duration_since(self.window_start);
        self.window_start = now;
        if elapsed > Duration::ZERO {
            self.current = FPS_WINDOW as f64 / elapsed.as_secs_f64();
        }
        Some(self.current)
    }

    pub fn current(&self) -> f64 {
        self.current
    }
}

impl Default for FrameRateMeter {
    fn default() -> Self {
        Self::new()
    }
}

/// End-of-run summary
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    /// RFC 3339 timestamp of the first frame
    pub started_at: String,
    pub frames_processed: u64,
    pub total_count: u64,
    pub counting_line_y: i32,
    pub average_fps: f64,
}

impl RunSummary {
    pub fn new(
        started_at: OffsetDateTime,
        frames_processed: u64,
        total_count: u64,
        counting_line_y: i32,
        elapsed: Duration,
    ) -> anyhow::Result<Self> {
        let average_fps = if elapsed > Duration::ZERO {
            frames_processed as f64 / elapsed.as_secs_f64()
        } else {
            0.0
        };
        Ok(Self {
            started_at: started_at.format(&Rfc3339)?,
            frames_processed,
            total_count,
            counting_line_y,
            average_fps,
        })
    }

    pub fn write_json(&self, path: &Path) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write summary {}", path.display()))?;
        Ok(())
    }
}
