use image::GrayImage;
use serde::{Deserialize, Serialize};

/// A single video frame. Geometry is fixed for the lifetime of a session.
pub type Frame = image::RgbImage;

/// Integer pixel position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: &Point) -> f64 {
        let dx = self.x as f64 - other.x as f64;
        let dy = self.y as f64 - other.y as f64;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Axis-aligned bounding box in frame coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl BoundingBox {
    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    /// Midpoint of the box, truncated to whole pixels
    pub fn center(&self) -> Point {
        Point {
            x: (self.x + self.width / 2) as i32,
            y: (self.y + self.height / 2) as i32,
        }
    }
}

/// Per-pixel label produced by the background model
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaskLabel {
    Background,
    Shadow,
    Foreground,
}

impl MaskLabel {
    pub fn value(self) -> u8 {
        match self {
            MaskLabel::Background => ForegroundMask::BACKGROUND,
            MaskLabel::Shadow => ForegroundMask::SHADOW,
            MaskLabel::Foreground => ForegroundMask::FOREGROUND,
        }
    }

    pub fn from_value(value: u8) -> Self {
        match value {
            ForegroundMask::FOREGROUND => MaskLabel::Foreground,
            ForegroundMask::SHADOW => MaskLabel::Shadow,
            _ => MaskLabel::Background,
        }
    }
}

/// Three-level mask: 0 background, 127 shadow, 255 foreground.
#[derive(Debug, Clone)]
pub struct ForegroundMask {
    image: GrayImage,
}

impl ForegroundMask {
    pub const BACKGROUND: u8 = 0;
    pub const SHADOW: u8 = 127;
    pub const FOREGROUND: u8 = 255;

    pub fn new(width: u32, height: u32) -> Self {
        Self {
            image: GrayImage::new(width, height),
        }
    }

    /// Wrap an existing grayscale buffer; any value that is not a known
    /// label is read back as background.
    pub fn from_image(image: GrayImage) -> Self {
        Self { image }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn label(&self, x: u32, y: u32) -> MaskLabel {
        MaskLabel::from_value(self.image.get_pixel(x, y)[0])
    }

    pub fn set_label(&mut self, x: u32, y: u32, label: MaskLabel) {
        self.image.put_pixel(x, y, image::Luma([label.value()]));
    }

    pub fn count(&self, label: MaskLabel) -> usize {
        let value = label.value();
        self.image.pixels().filter(|p| p[0] == value).count()
    }

    pub fn as_image(&self) -> &GrayImage {
        &self.image
    }

    pub fn into_image(self) -> GrayImage {
        self.image
    }
}

/// Connected group of foreground pixels, summarised by its extent and
/// filled pixel count.
#[derive(Debug, Clone, PartialEq)]
pub struct Region {
    pub label: u32,
    pub min_x: u32,
    pub min_y: u32,
    pub width: u32,
    pub height: u32,
    pub pixel_count: u32,
}

impl Region {
    pub fn bounding_box(&self) -> BoundingBox {
        BoundingBox {
            x: self.min_x,
            y: self.min_y,
            width: self.width,
            height: self.height,
        }
    }

    pub fn area(&self) -> f64 {
        self.pixel_count as f64
    }

    pub fn aspect_ratio(&self) -> f64 {
        if self.height == 0 {
            return 0.0;
        }
        self.width as f64 / self.height as f64
    }

    /// Fraction of the bounding box covered by the region
    pub fn solidity(&self) -> f64 {
        let rect_area = self.width as f64 * self.height as f64;
        if rect_area == 0.0 {
            return 0.0;
        }
        self.area() / rect_area
    }
}

/// A region that passed shape filtering
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Candidate {
    pub bounding_box: BoundingBox,
    pub area: f64,
    pub aspect_ratio: f64,
    pub solidity: f64,
    pub centroid: Point,
}

/// Accepted candidate as reported for one frame
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Detection {
    pub centroid: Point,
    pub bounding_box: BoundingBox,
    /// Whether this detection produced a new count event
    pub counted: bool,
}
