pub mod config;
pub mod debug;
pub mod detection;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod render;
pub mod report;
pub mod runner;
pub mod shared;
pub mod source;

pub use config::{BackgroundConfig, CounterConfig};
pub use detection::tracker::{CounterSnapshot, CrossingTracker, PositionHistory};
pub use error::CounterError;
pub use models::{
    BoundingBox, Candidate, Detection, ForegroundMask, Frame, MaskLabel, Point, Region,
};
pub use pipeline::{CounterSession, FrameReport};
pub use runner::StopReason;
pub use shared::SharedSession;
pub use source::{FrameSource, ImageSequence, VecSource};
