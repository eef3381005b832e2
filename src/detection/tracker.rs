use serde::Serialize;
use tracing::{debug, info};

use crate::config::CounterConfig;
use crate::models::Point;

/// Half-height of the band around the counting line, in pixels
pub const LINE_TOLERANCE: i32 = 10;
/// Number of counted positions remembered for de-duplication
pub const HISTORY_CAPACITY: usize = 100;

/// Fixed-capacity ring of counted positions; the oldest entry is
/// overwritten once the ring is full.
#[derive(Debug, Clone)]
pub struct PositionHistory {
    slots: [Point; HISTORY_CAPACITY],
    /// Index the next push writes to
    cursor: usize,
    len: usize,
}

impl PositionHistory {
    pub fn new() -> Self {
        Self {
            slots: [Point::new(0, 0); HISTORY_CAPACITY],
            cursor: 0,
            len: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn capacity(&self) -> usize {
        HISTORY_CAPACITY
    }

    /// Store a position, returning the one it evicted if the ring was full
    pub fn push(&mut self, position: Point) -> Option<Point> {
        let evicted = if self.len == HISTORY_CAPACITY {
            Some(self.slots[self.cursor])
        } else {
            self.len += 1;
            None
        };
        self.slots[self.cursor] = position;
        self.cursor = (self.cursor + 1) % HISTORY_CAPACITY;
        evicted
    }

    pub fn clear(&mut self) {
        self.cursor = 0;
        self.len = 0;
    }

    /// Positions from oldest to newest
    pub fn iter(&self) -> impl Iterator<Item = &Point> + '_ {
        let start = (self.cursor + HISTORY_CAPACITY - self.len) % HISTORY_CAPACITY;
        (0..self.len).map(move |i| &self.slots[(start + i) % HISTORY_CAPACITY])
    }

    pub fn any_within(&self, position: &Point, distance: f64) -> bool {
        self.iter().any(|p| p.distance(position) < distance)
    }
}

impl Default for PositionHistory {
    fn default() -> Self {
        Self::new()
    }
}

/// Point-in-time copy of the counter, safe to hand to readers
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CounterSnapshot {
    pub total_count: u64,
    pub counting_line_y: i32,
    /// Counted positions, oldest first
    pub history: Vec<Point>,
}

/// Decides which centroids are new objects crossing the counting line
#[derive(Debug, Clone)]
pub struct CrossingTracker {
    counting_line_y: i32,
    distance_threshold: f64,
    total_count: u64,
    history: PositionHistory,
}

impl CrossingTracker {
    pub fn new(counting_line_y: i32, distance_threshold: f64) -> Self {
        Self {
            counting_line_y,
            distance_threshold,
            total_count: 0,
            history: PositionHistory::new(),
        }
    }

    pub fn from_config(config: &CounterConfig) -> Self {
        Self::new(config.counting_line_y, config.distance_threshold)
    }

    pub fn total_count(&self) -> u64 {
        self.total_count
    }

    pub fn counting_line_y(&self) -> i32 {
        self.counting_line_y
    }

    pub fn history(&self) -> &PositionHistory {
        &self.history
    }

    pub fn is_at_line(&self, centroid: &Point) -> bool {
        centroid.y.abs_diff(self.counting_line_y) <= LINE_TOLERANCE.unsigned_abs()
    }

    /// Whether a counted position is still close enough to suppress this one.
    /// Every remembered position is checked, however old.
    pub fn is_duplicate(&self, centroid: &Point) -> bool {
        self.history.any_within(centroid, self.distance_threshold)
    }

    /// Count the centroid if it sits on the line and was not counted
    /// already. Returns whether it was counted.
    pub fn consider(&mut self, centroid: Point) -> bool {
        if !self.is_at_line(&centroid) || self.is_duplicate(&centroid) {
            return false;
        }
        self.total_count += 1;
        if let Some(evicted) = self.history.push(centroid) {
            debug!(x = evicted.x, y = evicted.y, "Evicted oldest counted position");
        }
        info!(
            total = self.total_count,
            x = centroid.x,
            y = centroid.y,
            "New object counted"
        );
        true
    }

    /// Zero the count and forget all counted positions
    pub fn reset(&mut self) {
        self.total_count = 0;
        self.history.clear();
        info!("Counter reset");
    }

    pub fn snapshot(&self) -> CounterSnapshot {
        CounterSnapshot {
            total_count: self.total_count,
            counting_line_y: self.counting_line_y,
            history: self.history.iter().copied().collect(),
        }
    }
}
