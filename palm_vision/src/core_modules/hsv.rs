// THEORY (Single-Color HSV):
// `Hsv` is the most fundamental unit of the segmentation engine: an immutable
// (hue, saturation, value) triple with every channel normalized to [0, 1]. It is
// what the skin classifier scores. Nothing here knows about neighbors, frames or
// statistics; anything that needs more than one color belongs in
// `gaussian_model` or `skin_classifier`.
//
// Conversion:
// - Hexcone model. The dominant channel becomes the value; hue is measured from
//   the sector of the dominant channel (red 0, green 2, blue 4, in sixths of a
//   turn) and wrapped into [0, 1).
// - Ties resolve toward red, then green, so grey pixels land at hue 0.
// - A black pixel has saturation 0 and hue 0.
//
// Harsh colors:
// - Near-black (v <= 0.1) and over-saturated (s >= 0.9) colors carry almost no
//   reliable hue information. They are dropped from calibration samples before
//   any model is fitted.
//
// Key principles:
// 1) Immutable value: built once from RGB, never mutated.
// 2) Single-color scope: no knowledge of the frame it came from.

pub mod hsv {
    use image::Rgb;
    use serde::{Deserialize, Serialize};

    pub type Hue = f32;
    pub type Saturation = f32;
    pub type Value = f32;

    /// Colors at or below this value are too dark to calibrate on.
    pub const MIN_CALIBRATION_VALUE: Value = 0.1;
    /// Colors at or above this saturation are too harsh to calibrate on.
    pub const MAX_CALIBRATION_SATURATION: Saturation = 0.9;

    /// A "dumb" data container for one color in HSV space.
    #[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
    pub struct Hsv {
        /// Position on the color wheel, as a fraction of a full turn (0.0-1.0).
        pub h: Hue,
        /// Chroma relative to value (0.0-1.0).
        pub s: Saturation,
        /// Brightness of the dominant channel (0.0-1.0).
        pub v: Value,
    }

    impl Hsv {
        pub fn new(h: Hue, s: Saturation, v: Value) -> Self {
            Self { h, s, v }
        }

        /// Converts a normalized RGB triple (each channel 0.0-1.0).
        pub fn from_rgb_normalized(r: f32, g: f32, b: f32) -> Self {
            if b > g && b > r {
                Self::from_sector(4.0, b, r, g)
            } else if g > r {
                Self::from_sector(2.0, g, b, r)
            } else {
                Self::from_sector(0.0, r, g, b)
            }
        }

        fn from_sector(offset: f32, dominant: f32, first: f32, second: f32) -> Self {
            let v = dominant;
            if v == 0.0 {
                return Self { h: 0.0, s: 0.0, v };
            }

            let smallest = first.min(second);
            let chroma = v - smallest;
            let (s, sector) = if chroma != 0.0 {
                (chroma / v, offset + (first - second) / chroma)
            } else {
                (0.0, offset + (first - second))
            };

            let mut h = sector / 6.0;
            if h < 0.0 {
                h += 1.0;
            }
            Self { h, s, v }
        }

        /// True for near-black or over-saturated colors, which calibration skips.
        pub fn is_harsh(&self) -> bool {
            self.v <= MIN_CALIBRATION_VALUE || self.s >= MAX_CALIBRATION_SATURATION
        }
    }

    impl From<&Rgb<u8>> for Hsv {
        fn from(pixel: &Rgb<u8>) -> Self {
            let [r, g, b] = pixel.0;
            Self::from_rgb_normalized(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0)
        }
    }

    impl From<Rgb<u8>> for Hsv {
        fn from(pixel: Rgb<u8>) -> Self {
            Self::from(&pixel)
        }
    }

}

// --- Glossary ---
// hexcone:    the HSV model where value is the max channel and saturation is
//             chroma / value.
// sector:     one sixth of the color wheel, named by its dominant channel.
// harsh:      a color too dark or too saturated to be a useful skin sample.
