//! Writes a synthetic frame directory: a static scene with two squares
//! moving down across row 250, plus a darkened patch that should read as
//! shadow. Feed the output to the `linecount` binary.

use std::path::PathBuf;

use image::{Rgb, RgbImage};

const WIDTH: u32 = 640;
const HEIGHT: u32 = 480;
const FRAMES: u32 = 90;
const SQUARE: u32 = 60;

fn main() -> anyhow::Result<()> {
    let out_dir = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("synthetic_frames"));
    std::fs::create_dir_all(&out_dir)?;

    for index in 0..FRAMES {
        let mut img = RgbImage::new(WIDTH, HEIGHT);

        // Fill with a gradient
        for y in 0..HEIGHT {
            for x in 0..WIDTH {
                let r = (x * 120 / WIDTH) as u8 + 60;
                let g = (y * 120 / HEIGHT) as u8 + 60;
                img.put_pixel(x, y, Rgb([r, g, 128]));
            }
        }

        // Both squares start moving once the background had time to settle
        if index >= 30 {
            let step = index - 30;
            fill_square(&mut img, 120, 60 + 6 * step, Rgb([230, 40, 40]));
            fill_square(&mut img, 420, 20 + 7 * step, Rgb([30, 220, 60]));

            let shadow_x = 280 + 2 * step;
            for y in 300..360 {
                for x in shadow_x..(shadow_x + 60).min(WIDTH) {
                    let p = img.get_pixel(x, y).0.map(|c| (c as u16 * 3 / 5) as u8);
                    img.put_pixel(x, y, Rgb(p));
                }
            }
        }

        img.save(out_dir.join(format!("frame_{:04}.png", index)))?;
    }

    println!("Wrote {} frames to {}", FRAMES, out_dir.display());
    Ok(())
}

fn fill_square(img: &mut RgbImage, x0: u32, y0: u32, color: Rgb<u8>) {
    for y in y0..(y0 + SQUARE).min(HEIGHT) {
        for x in x0..(x0 + SQUARE).min(WIDTH) {
            img.put_pixel(x, y, color);
        }
    }
}
