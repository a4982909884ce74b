// THEORY:
// The `SampleRegion` is the bridge between a live frame and calibration. The user
// holds their hand over a fixed rectangle, and every pixel inside it becomes a
// calibration color.
//
// Key architectural principles:
// 1.  **Data Container**: Like `Hsv`, a region is a dumb rectangle. It knows how to
//     read its own pixels out of a frame and nothing else.
// 2.  **Harsh Colors Stay Out**: The same harsh-color filter the classifier uses is
//     applied here, so the sample handed to calibration is already clean.
// 3.  **Fail Loudly**: A region that does not fit in the frame is a configuration
//     mistake and is reported as `RegionOutOfBounds`, never clipped silently.

use crate::core_modules::hsv::hsv::Hsv;
use crate::error::{Error, Result};
use image::RgbImage;
use serde::{Deserialize, Serialize};

/// A rectangular patch of a frame, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SampleRegion {
    /// Column of the patch's first pixel.
    pub x: u32,
    /// Row of the patch's first pixel.
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl SampleRegion {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Whether the whole patch lies inside a `frame_width x frame_height` frame.
    pub fn fits(&self, frame_width: u32, frame_height: u32) -> bool {
        let right = self.x.checked_add(self.width);
        let bottom = self.y.checked_add(self.height);
        matches!((right, bottom), (Some(r), Some(b)) if r <= frame_width && b <= frame_height)
    }

    /// Converts every pixel in the patch to HSV, row by row, dropping harsh colors.
    pub fn sample(&self, frame: &RgbImage) -> Result<Vec<Hsv>> {
        let (frame_width, frame_height) = frame.dimensions();
        if !self.fits(frame_width, frame_height) {
            return Err(Error::RegionOutOfBounds {
                x: self.x,
                y: self.y,
                width: self.width,
                height: self.height,
                frame_width,
                frame_height,
            });
        }

        let mut colors = Vec::with_capacity((self.width * self.height) as usize);
        for y in self.y..self.y + self.height {
            for x in self.x..self.x + self.width {
                let color = Hsv::from(frame.get_pixel(x, y));
                if !color.is_harsh() {
                    colors.push(color);
                }
            }
        }
        Ok(colors)
    }
}
