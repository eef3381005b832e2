use image::GrayImage;
use imageproc::morphology::{grayscale_close, grayscale_open, Mask};

use crate::models::ForegroundMask;

/// Morphological cleanup of a raw foreground mask
pub struct MaskConditioner {
    open_kernel: Mask,
    close_kernel: Mask,
}

impl MaskConditioner {
    /// Elliptical kernels: 3x3 for opening, 7x7 for closing
    pub fn new() -> Self {
        Self::with_radii(1, 3)
    }

    pub fn with_radii(open_radius: u8, close_radius: u8) -> Self {
        Self {
            open_kernel: Mask::disk(open_radius),
            close_kernel: Mask::disk(close_radius),
        }
    }

    /// Remove speckles, merge fragments, then drop shadow pixels.
    ///
    /// The morphology runs on the three-level mask so shadow pixels keep
    /// their label until the final pass. The result only holds 0 and 255.
    pub fn condition(&self, mask: &ForegroundMask) -> GrayImage {
        let opened = grayscale_open(mask.as_image(), &self.open_kernel);
        let mut closed = grayscale_close(&opened, &self.close_kernel);
        remove_shadows(&mut closed);
        closed
    }
}

impl Default for MaskConditioner {
    fn default() -> Self {
        Self::new()
    }
}

/// Zero every pixel that is not full foreground
pub fn remove_shadows(mask: &mut GrayImage) {
    for pixel in mask.pixels_mut() {
        if pixel[0] != ForegroundMask::FOREGROUND {
            pixel[0] = ForegroundMask::BACKGROUND;
        }
    }
}
