// THEORY:
// The `SkinClassifier` answers one question per pixel: "does this color look like
// the calibration patch?" It holds three independently fitted channel models
// (hue, saturation, value). A color is skin only when all three channels score at
// or above the requested threshold.
//
// Key architectural principles:
// 1.  **Calibrate Once, Read Many**: The classifier is built from a sample and is
//     immutable afterwards. Recalibration builds a whole new classifier and swaps
//     it in, so a half-updated set of models can never be observed.
// 2.  **Clean Samples Only**: Harsh colors (near-black or over-saturated) are
//     dropped before fitting. If fewer than two usable colors remain, calibration
//     fails with `InsufficientSamples` instead of producing NaN statistics.
// 3.  **Threshold at the Call Site**: The classifier does not own a threshold. The
//     segmentation passes query it at `t`, `t/2` and `t/3` as they need.

use crate::core_modules::gaussian_model::{FittedGaussian, GaussianModel};
use crate::core_modules::hsv::hsv::Hsv;
use crate::error::{Error, Result};
use image::Rgb;
use serde::Serialize;

/// Per-channel skin model fitted from a calibration sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SkinClassifier {
    hue: FittedGaussian,
    saturation: FittedGaussian,
    value: FittedGaussian,
}

impl SkinClassifier {
    /// Fits the hue, saturation and value models from `samples`, skipping harsh
    /// colors.
    pub fn calibrate(samples: &[Hsv]) -> Result<Self> {
        let mut hue = GaussianModel::new();
        let mut saturation = GaussianModel::new();
        let mut value = GaussianModel::new();

        for color in samples.iter().filter(|c| !c.is_harsh()) {
            hue.add_sample(color.h as f64);
            saturation.add_sample(color.s as f64);
            value.add_sample(color.v as f64);
        }

        if hue.len() < 2 {
            return Err(Error::InsufficientSamples {
                provided: samples.len(),
                usable: hue.len(),
            });
        }

        Ok(Self {
            hue: hue.fit()?,
            saturation: saturation.fit()?,
            value: value.fit()?,
        })
    }

    /// True when every channel of `color` scores at least `threshold`.
    pub fn qualifies(&self, color: &Hsv, threshold: f32) -> bool {
        let threshold = threshold as f64;
        self.hue.within_threshold(color.h as f64, threshold)
            && self.saturation.within_threshold(color.s as f64, threshold)
            && self.value.within_threshold(color.v as f64, threshold)
    }

    pub fn qualifies_rgb(&self, pixel: &Rgb<u8>, threshold: f32) -> bool {
        self.qualifies(&Hsv::from(pixel), threshold)
    }

    pub fn hue(&self) -> &FittedGaussian {
        &self.hue
    }

    pub fn saturation(&self) -> &FittedGaussian {
        &self.saturation
    }

    pub fn value(&self) -> &FittedGaussian {
        &self.value
    }
}
