use image::GrayImage;
use tracing::debug;

use crate::config::CounterConfig;
use crate::detection::background::BackgroundModel;
use crate::detection::conditioning::MaskConditioner;
use crate::detection::shapes::ShapeFilter;
use crate::detection::tracker::{CounterSnapshot, CrossingTracker};
use crate::detection::detect_candidates;
use crate::error::Result;
use crate::models::{Detection, ForegroundMask, Frame, MaskLabel};

/// Everything produced for one frame
#[derive(Debug, Clone)]
pub struct FrameReport {
    /// 1-based index of the frame within the session
    pub frame_index: u64,
    /// Every accepted candidate, counted or not, in extraction order
    pub detections: Vec<Detection>,
    pub total_count: u64,
    /// Raw three-level mask from the background model
    pub foreground: ForegroundMask,
    /// Binary mask after morphology and shadow removal
    pub mask: GrayImage,
}

impl FrameReport {
    pub fn newly_counted(&self) -> usize {
        self.detections.iter().filter(|d| d.counted).count()
    }
}

/// One counting session: background model plus counter state.
///
/// Frames must be fed in arrival order; `&mut self` keeps a single frame
/// in flight.
pub struct CounterSession {
    config: CounterConfig,
    background: BackgroundModel,
    conditioner: MaskConditioner,
    filter: ShapeFilter,
    tracker: CrossingTracker,
    frames_processed: u64,
}

impl CounterSession {
    pub fn new(config: CounterConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            background: BackgroundModel::new(&config.background),
            conditioner: MaskConditioner::new(),
            filter: ShapeFilter::from_config(&config),
            tracker: CrossingTracker::from_config(&config),
            frames_processed: 0,
            config,
        })
    }

    pub fn config(&self) -> &CounterConfig {
        &self.config
    }

    pub fn total_count(&self) -> u64 {
        self.tracker.total_count()
    }

    pub fn frames_processed(&self) -> u64 {
        self.frames_processed
    }

    pub fn tracker(&self) -> &CrossingTracker {
        &self.tracker
    }

    /// Whether `frame` would be accepted by [`Self::process_frame`]
    pub fn check_frame(&self, frame: &Frame) -> Result<()> {
        self.background.check(frame)
    }

    /// Run one frame through every stage. A frame of the wrong size is
    /// rejected before any state changes.
    pub fn process_frame(&mut self, frame: &Frame) -> Result<FrameReport> {
        let foreground = self.background.apply(frame)?;
        self.frames_processed += 1;
        debug!(
            frame = self.frames_processed,
            foreground = foreground.count(MaskLabel::Foreground),
            shadow = foreground.count(MaskLabel::Shadow),
            "Background subtracted"
        );

        let mask = self.conditioner.condition(&foreground);
        let candidates = detect_candidates(&mask, &self.filter);

        let detections = candidates
            .into_iter()
            .map(|candidate| Detection {
                centroid: candidate.centroid,
                bounding_box: candidate.bounding_box,
                counted: self.tracker.consider(candidate.centroid),
            })
            .collect();

        Ok(FrameReport {
            frame_index: self.frames_processed,
            detections,
            total_count: self.tracker.total_count(),
            foreground,
            mask,
        })
    }

    /// Clear the count and de-duplication history. The background model
    /// keeps what it has learned.
    pub fn reset(&mut self) {
        self.tracker.reset();
    }

    pub fn snapshot(&self) -> CounterSnapshot {
        self.tracker.snapshot()
    }
}
