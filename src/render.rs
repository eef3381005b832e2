use image::Rgb;
use imageproc::drawing::{
    draw_filled_circle_mut, draw_hollow_circle_mut, draw_hollow_rect_mut, draw_line_segment_mut,
};
use imageproc::rect::Rect;

use crate::models::{Detection, Frame};

const LINE_COLOR: Rgb<u8> = Rgb([255, 165, 0]);
const BOX_COLOR: Rgb<u8> = Rgb([50, 180, 255]);
const COUNTED_BOX_COLOR: Rgb<u8> = Rgb([100, 255, 100]);
const CENTROID_COLOR: Rgb<u8> = Rgb([255, 120, 180]);
const OUTLINE_COLOR: Rgb<u8> = Rgb([255, 255, 255]);

const LINE_THICKNESS: i32 = 4;
const CENTROID_RADIUS: i32 = 6;

/// Draw the counting line and every detection onto a copy of the frame
pub fn annotate(frame: &Frame, detections: &[Detection], counting_line_y: i32) -> Frame {
    let mut canvas = frame.clone();
    let width = canvas.width() as f32;
    let height = canvas.height() as i64;

    let first_row = counting_line_y as i64 - (LINE_THICKNESS / 2) as i64;
    for row in first_row..first_row + LINE_THICKNESS as i64 {
        if row < 0 || row >= height {
            continue;
        }
        let y = row as f32;
        draw_line_segment_mut(&mut canvas, (0.0, y), (width, y), LINE_COLOR);
    }

    for detection in detections {
        let bbox = detection.bounding_box;
        if bbox.width == 0 || bbox.height == 0 {
            continue;
        }
        let color = if detection.counted {
            COUNTED_BOX_COLOR
        } else {
            BOX_COLOR
        };
        // Two nested outlines for a 2px border
        let outer = Rect::at(bbox.x as i32, bbox.y as i32).of_size(bbox.width, bbox.height);
        draw_hollow_rect_mut(&mut canvas, outer, color);
        if bbox.width > 2 && bbox.height > 2 {
            let inner = Rect::at(bbox.x as i32 + 1, bbox.y as i32 + 1)
                .of_size(bbox.width - 2, bbox.height - 2);
            draw_hollow_rect_mut(&mut canvas, inner, color);
        }

        let center = (detection.centroid.x, detection.centroid.y);
        draw_filled_circle_mut(&mut canvas, center, CENTROID_RADIUS, CENTROID_COLOR);
        draw_hollow_circle_mut(&mut canvas, center, CENTROID_RADIUS, OUTLINE_COLOR);
    }

    canvas
}
