pub mod background;
pub mod conditioning;
pub mod contours;
pub mod shapes;
pub mod tracker;

use image::GrayImage;

use crate::models::Candidate;
use shapes::ShapeFilter;

/// Extract regions from a conditioned mask and keep the countable ones
pub fn detect_candidates(mask: &GrayImage, filter: &ShapeFilter) -> Vec<Candidate> {
    let regions = contours::find_regions(mask);
    let candidates = shapes::filter_candidates(&regions, filter);
    tracing::debug!(
        regions = regions.len(),
        candidates = candidates.len(),
        "Classified regions"
    );
    candidates
}
