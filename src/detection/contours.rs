use image::{GrayImage, Luma};
use imageproc::region_labelling::{connected_components, Connectivity};

use crate::models::Region;

/// Find outer foreground regions in a binary mask.
///
/// Holes are filled before labelling, so a ring and anything nested inside
/// it come back as one region whose pixel count covers the hole. Regions are
/// returned in raster order of their first pixel.
pub fn find_regions(mask: &GrayImage) -> Vec<Region> {
    let filled = fill_holes(mask);
    let labeled = connected_components(&filled, Connectivity::Eight, Luma([0u8]));

    // label -> (first pixel order, min_x, min_y, max_x, max_y, count)
    let mut regions: Vec<Option<(usize, u32, u32, u32, u32, u32)>> = Vec::new();
    let mut seen = 0usize;

    for (x, y, label) in labeled.enumerate_pixels() {
        let label_val = label[0] as usize;
        if label_val == 0 {
            continue; // Skip background
        }
        if regions.len() <= label_val {
            regions.resize(label_val + 1, None);
        }

        if let Some((_, min_x, min_y, max_x, max_y, count)) = &mut regions[label_val] {
            *min_x = (*min_x).min(x);
            *min_y = (*min_y).min(y);
            *max_x = (*max_x).max(x);
            *max_y = (*max_y).max(y);
            *count += 1;
        } else {
            regions[label_val] = Some((seen, x, y, x, y, 1));
            seen += 1;
        }
    }

    let mut found: Vec<(usize, Region)> = regions
        .into_iter()
        .enumerate()
        .filter_map(|(label, entry)| {
            entry.map(|(order, min_x, min_y, max_x, max_y, count)| {
                (
                    order,
                    Region {
                        label: label as u32,
                        min_x,
                        min_y,
                        width: max_x - min_x + 1,
                        height: max_y - min_y + 1,
                        pixel_count: count,
                    },
                )
            })
        })
        .collect();
    found.sort_by_key(|(order, _)| *order);
    found.into_iter().map(|(_, region)| region).collect()
}

/// Mark background pixels that cannot reach the image border as foreground.
///
/// Background is traced with 4-connectivity, the dual of the 8-connected
/// foreground, so diagonal gaps in a ring do not leak.
pub fn fill_holes(mask: &GrayImage) -> GrayImage {
    let (width, height) = mask.dimensions();
    if width == 0 || height == 0 {
        return mask.clone();
    }
    let inverted = GrayImage::from_fn(width, height, |x, y| {
        if mask.get_pixel(x, y)[0] == 0 {
            Luma([255u8])
        } else {
            Luma([0u8])
        }
    });
    let labeled = connected_components(&inverted, Connectivity::Four, Luma([0u8]));

    let mut exterior = vec![false; 1];
    let mut mark = |label: u32| {
        let label = label as usize;
        if label == 0 {
            return;
        }
        if exterior.len() <= label {
            exterior.resize(label + 1, false);
        }
        exterior[label] = true;
    };
    for x in 0..width {
        mark(labeled.get_pixel(x, 0)[0]);
        mark(labeled.get_pixel(x, height - 1)[0]);
    }
    for y in 0..height {
        mark(labeled.get_pixel(0, y)[0]);
        mark(labeled.get_pixel(width - 1, y)[0]);
    }

    GrayImage::from_fn(width, height, |x, y| {
        let label = labeled.get_pixel(x, y)[0] as usize;
        let is_hole = label != 0 && !exterior.get(label).copied().unwrap_or(false);
        if mask.get_pixel(x, y)[0] != 0 || is_hole {
            Luma([255u8])
        } else {
            Luma([0u8])
        }
    })
}
