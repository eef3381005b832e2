mod fixtures;
pub use fixtures::*;

// Re-export commonly used types from linecount for tests
#[allow(unused_imports)]
pub use linecount::{
    BackgroundConfig, BoundingBox, CounterConfig, CounterError, CounterSession, CrossingTracker,
    ForegroundMask, Frame, MaskLabel, Point, Region,
};
