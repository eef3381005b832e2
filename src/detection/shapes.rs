use tracing::trace;

use crate::config::CounterConfig;
use crate::models::{Candidate, Region};

/// Regions whose bounding box is mostly empty are not counted
pub const MIN_SOLIDITY: f64 = 0.3;

/// Area, aspect-ratio and solidity gate for box-like objects
#[derive(Debug, Clone, PartialEq)]
pub struct ShapeFilter {
    pub min_area: f64,
    pub max_area: f64,
    pub min_ratio: f64,
    pub max_ratio: f64,
}

impl ShapeFilter {
    pub fn from_config(config: &CounterConfig) -> Self {
        Self {
            min_area: config.min_area,
            max_area: config.max_area,
            min_ratio: config.aspect_ratio_range.0,
            max_ratio: config.aspect_ratio_range.1,
        }
    }

    /// Accept or reject a region. Checks run in order: area, aspect ratio,
    /// solidity. The centroid is the bounding-box midpoint.
    pub fn classify(&self, region: &Region) -> Option<Candidate> {
        let area = region.area();
        if area < self.min_area || area > self.max_area {
            trace!(label = region.label, area, "Rejected: area");
            return None;
        }

        if region.height == 0 {
            trace!(label = region.label, "Rejected: zero height");
            return None;
        }
        let aspect_ratio = region.aspect_ratio();
        if aspect_ratio < self.min_ratio || aspect_ratio > self.max_ratio {
            trace!(label = region.label, aspect_ratio, "Rejected: aspect ratio");
            return None;
        }

        let solidity = region.solidity();
        if solidity < MIN_SOLIDITY {
            trace!(label = region.label, solidity, "Rejected: solidity");
            return None;
        }

        let bounding_box = region.bounding_box();
        Some(Candidate {
            bounding_box,
            area,
            aspect_ratio,
            solidity,
            centroid: bounding_box.center(),
        })
    }
}

impl Default for ShapeFilter {
    fn default() -> Self {
        Self::from_config(&CounterConfig::default())
    }
}

/// Classify every region, keeping accepted ones in input order
pub fn filter_candidates(regions: &[Region], filter: &ShapeFilter) -> Vec<Candidate> {
    regions.iter().filter_map(|r| filter.classify(r)).collect()
}
