#![allow(dead_code)]

use image::{GrayImage, ImageBuffer, Luma, Rgb};
use linecount::{BackgroundConfig, CounterConfig, Frame, Region};

pub const FRAME_WIDTH: u32 = 240;
pub const FRAME_HEIGHT: u32 = 320;
pub const LINE_Y: i32 = 160;

/// Mid-gray scene used as the static background
pub const BACKGROUND: Rgb<u8> = Rgb([100, 100, 100]);
/// Saturated object colour, far from any darkened background
pub const OBJECT: Rgb<u8> = Rgb([220, 30, 30]);
/// Background scaled by 0.6, which reads as a shadow
pub const SHADOW: Rgb<u8> = Rgb([60, 60, 60]);

/// Session config matching the synthetic frame geometry.
///
/// The learning rate is pinned low so a slow object is not absorbed into
/// the background during the short synthetic warm-up.
pub fn test_config() -> CounterConfig {
    CounterConfig {
        counting_line_y: LINE_Y,
        background: BackgroundConfig {
            learning_rate: Some(0.005),
            ..BackgroundConfig::default()
        },
        ..CounterConfig::default()
    }
}

pub fn background_frame() -> Frame {
    ImageBuffer::from_pixel(FRAME_WIDTH, FRAME_HEIGHT, BACKGROUND)
}

/// Background frame with filled squares of `size` at the given top-left corners
pub fn frame_with_squares(corners: &[(u32, u32)], size: u32, color: Rgb<u8>) -> Frame {
    let mut frame = background_frame();
    for &(x0, y0) in corners {
        for y in y0..(y0 + size).min(FRAME_HEIGHT) {
            for x in x0..(x0 + size).min(FRAME_WIDTH) {
                frame.put_pixel(x, y, color);
            }
        }
    }
    frame
}

/// Binary mask with filled rectangles (x, y, w, h)
pub fn mask_with_rects(
    width: u32,
    height: u32,
    rects: &[(u32, u32, u32, u32)],
    value: u8,
) -> GrayImage {
    let mut mask = GrayImage::new(width, height);
    for &(x0, y0, w, h) in rects {
        for y in y0..y0 + h {
            for x in x0..x0 + w {
                mask.put_pixel(x, y, Luma([value]));
            }
        }
    }
    mask
}

/// Region with the given extent and pixel count
pub fn region(x: u32, y: u32, width: u32, height: u32, pixel_count: u32) -> Region {
    Region {
        label: 1,
        min_x: x,
        min_y: y,
        width,
        height,
        pixel_count,
    }
}

/// Blob of area 2000 in a 50x50 box (solidity 0.8) centred on `(cx, cy)`
pub fn blob_at(cx: u32, cy: u32) -> Region {
    region(cx - 25, cy - 25, 50, 50, 2000)
}
