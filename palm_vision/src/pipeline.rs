// THEORY:
// The `pipeline` module is the top-level API of the segmentation engine. It wraps
// the full stack (classifier, pass 1, pass 2, hull, fingertip filter) behind one
// call per frame and hands back everything an overlay needs.
//
// Key architectural principles:
// 1.  **One Frame, One Call**: `process_frame` runs both passes, the hull and the
//     filter to completion. Nothing is observable half-way.
// 2.  **Nothing Crosses Frames**: Blobs, contour, hull and fingertips are rebuilt
//     from scratch every frame. The only state that survives a frame is the
//     classifier, plus a copy of the last result for the accessors.
// 3.  **Recalibration Is a Swap**: A new classifier is built aside and swapped in
//     whole. If it cannot be built, the old one stays and the error goes back to
//     the caller.
// 4.  **Cosmetic Debug Views**: Display toggles only recolor the returned buffer.
//     Classification always reads the untouched input frame.

use crate::core_modules::blob_detector::blob_detector::find_blobs;
use crate::core_modules::convex_hull::convex_hull;
use crate::core_modules::fingertips::find_fingertips;
use crate::core_modules::geometry::{point_to_index, Point};
use crate::core_modules::refinement::refine;
use crate::core_modules::skin_classifier::SkinClassifier;
use crate::error::{Error, Result};
use image::{Rgb, RgbImage};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

// Re-export key data structures for the public API.
pub use crate::core_modules::convex_hull::DEFAULT_MERGE_DISTANCE;
pub use crate::core_modules::fingertips::{FingertipScan, RowOrder};
pub use crate::core_modules::hsv::hsv::Hsv;
pub use crate::core_modules::sample_region::SampleRegion;
pub use crate::core_modules::skin_blob::SkinBlob;

pub const DEFAULT_THRESHOLD: f32 = 0.15;
pub const DEFAULT_HYSTERESIS_SPAN: i32 = 5;

const FIRST_PASS_SKIN: Rgb<u8> = Rgb([255, 255, 255]);
const SECOND_PASS_SKIN: Rgb<u8> = Rgb([128, 128, 128]);
const BACKGROUND: Rgb<u8> = Rgb([0, 0, 0]);
const CONTOUR: Rgb<u8> = Rgb([0, 255, 0]);

/// Debug recolorings written into the returned frame, applied in field order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayOptions {
    /// Pass-1 skin pixels white, everything else black.
    pub show_first_pass: bool,
    /// Pass-2 contributing pixels grey, everything else black.
    pub show_second_pass: bool,
    /// Contour points green.
    pub show_contour: bool,
}

impl DisplayOptions {
    pub fn any(&self) -> bool {
        self.show_first_pass || self.show_second_pass || self.show_contour
    }
}

/// Configuration for the SegmentationPipeline, allowing for tunable behavior.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Minimum per-channel CDF score for a pixel to count as skin. Pass 1 relaxes
    /// it to half under hysteresis; pass 2 uses a third.
    pub threshold: f32,
    /// How many pixels after a confirmed skin pixel the relaxed threshold applies.
    pub hysteresis_span: i32,
    /// Hull points closer than this are merged before fingertip filtering.
    pub hull_merge_distance: f64,
    /// Which way "above the palm" points in the frame buffer.
    pub row_order: RowOrder,
    pub display: DisplayOptions,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            hysteresis_span: DEFAULT_HYSTERESIS_SPAN,
            hull_merge_distance: DEFAULT_MERGE_DISTANCE,
            row_order: RowOrder::default(),
            display: DisplayOptions::default(),
        }
    }
}

impl PipelineConfig {
    /// Parses a JSON config. Missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        validate_threshold(self.threshold)?;
        if self.hysteresis_span < 0 {
            return Err(Error::InvalidHysteresisSpan(self.hysteresis_span));
        }
        if !(self.hull_merge_distance.is_finite() && self.hull_merge_distance >= 0.0) {
            return Err(Error::InvalidMergeDistance(self.hull_merge_distance));
        }
        Ok(())
    }
}

fn validate_threshold(threshold: f32) -> Result<()> {
    if !(0.0..=1.0).contains(&threshold) {
        return Err(Error::InvalidThreshold(threshold));
    }
    Ok(())
}

/// Everything the engine derived from one frame.
#[derive(Debug, Clone)]
pub struct FrameReport {
    /// The input frame, recolored according to the display options.
    pub frame: RgbImage,
    /// The dominant blob, with palm center and width from pass 2.
    pub hand: SkinBlob,
    /// Every blob that survived pass 1, in creation order.
    pub blobs: Vec<SkinBlob>,
    /// Pass-2 classification flips, in scan order.
    pub contour: Vec<Point>,
    /// The merged convex hull of the contour.
    pub hull: Vec<Point>,
    /// Fingertip candidates, in hull order.
    pub fingertips: Vec<Point>,
    /// True when the closed-fist rule cleared the candidates.
    pub closed_fist: bool,
}

/// A compact, serializable view of a `FrameReport` without the pixels.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrameSummary {
    pub width: u32,
    pub height: u32,
    pub blob_count: usize,
    pub contour_points: usize,
    pub hand: SkinBlob,
    pub hull: Vec<Point>,
    pub fingertips: Vec<Point>,
    pub closed_fist: bool,
}

impl FrameReport {
    pub fn summary(&self) -> FrameSummary {
        FrameSummary {
            width: self.frame.width(),
            height: self.frame.height(),
            blob_count: self.blobs.len(),
            contour_points: self.contour.len(),
            hand: self.hand,
            hull: self.hull.clone(),
            fingertips: self.fingertips.clone(),
            closed_fist: self.closed_fist,
        }
    }
}

/// The main, top-level struct for the segmentation engine.
pub struct SegmentationPipeline {
    config: PipelineConfig,
    classifier: SkinClassifier,
    last_hand: Option<SkinBlob>,
    last_fingertips: Vec<Point>,
}

impl SegmentationPipeline {
    /// Validates `config` and calibrates on `samples`.
    pub fn new(config: PipelineConfig, samples: &[Hsv]) -> Result<Self> {
        config.validate()?;
        let classifier = SkinClassifier::calibrate(samples)?;
        info!(
            samples = samples.len(),
            hue = classifier.hue().mean(),
            saturation = classifier.saturation().mean(),
            value = classifier.value().mean(),
            "skin classifier calibrated"
        );
        Ok(Self::with_classifier(config, classifier))
    }

    /// Builds a pipeline around an already calibrated classifier.
    pub fn with_classifier(config: PipelineConfig, classifier: SkinClassifier) -> Self {
        Self {
            config,
            classifier,
            last_hand: None,
            last_fingertips: Vec::new(),
        }
    }

    /// Replaces the classifier. On failure the current one stays in force.
    pub fn recalibrate(&mut self, samples: &[Hsv]) -> Result<()> {
        match SkinClassifier::calibrate(samples) {
            Ok(classifier) => {
                self.classifier = classifier;
                info!(
                    samples = samples.len(),
                    hue = classifier.hue().mean(),
                    "skin classifier recalibrated"
                );
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "recalibration rejected; keeping previous classifier");
                Err(e)
            }
        }
    }

    /// Changes the skin threshold from the next frame on. An out-of-range value is
    /// rejected and the current threshold stays.
    pub fn set_threshold(&mut self, threshold: f32) -> Result<()> {
        validate_threshold(threshold)?;
        debug!(threshold, "threshold changed");
        self.config.threshold = threshold;
        Ok(())
    }

    pub fn set_display(&mut self, display: DisplayOptions) {
        self.config.display = display;
    }

    /// The main entry point: segments one frame and extracts fingertips.
    pub fn process_frame(&mut self, frame: &RgbImage) -> FrameReport {
        let config = &self.config;

        let scan = find_blobs(frame, &self.classifier, config.threshold, config.hysteresis_span);
        let refined = refine(frame, &self.classifier, config.threshold, scan.largest);
        let hull = convex_hull(&refined.contour, config.hull_merge_distance);
        let tips = find_fingertips(&hull, &refined.hand, config.row_order);

        debug!(
            blobs = scan.blobs.len(),
            contour = refined.contour.len(),
            hull = hull.len(),
            fingertips = tips.fingertips.len(),
            closed_fist = tips.closed_fist,
            "frame segmented"
        );

        let mut output = frame.clone();
        if config.display.any() {
            paint_debug_views(&mut output, &config.display, &scan.mask, &refined.mask, &refined.contour);
        }

        self.last_hand = Some(refined.hand);
        self.last_fingertips = tips.fingertips.clone();

        FrameReport {
            frame: output,
            hand: refined.hand,
            blobs: scan.blobs,
            contour: refined.contour,
            hull,
            fingertips: tips.fingertips,
            closed_fist: tips.closed_fist,
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn classifier(&self) -> &SkinClassifier {
        &self.classifier
    }

    /// The dominant blob of the last processed frame.
    pub fn get_last_hand(&self) -> Option<&SkinBlob> {
        self.last_hand.as_ref()
    }

    /// The fingertips of the last processed frame.
    pub fn get_last_fingertips(&self) -> &[Point] {
        &self.last_fingertips
    }
}

fn paint_debug_views(
    output: &mut RgbImage,
    display: &DisplayOptions,
    first_pass: &[bool],
    second_pass: &[bool],
    contour: &[Point],
) {
    if display.show_first_pass {
        paint_mask(output, first_pass, FIRST_PASS_SKIN);
    }
    if display.show_second_pass {
        paint_mask(output, second_pass, SECOND_PASS_SKIN);
    }
    if display.show_contour {
        let width = output.width();
        let buffer: &mut [u8] = output;
        for point in contour {
            let offset = point_to_index(width, point) * 3;
            buffer[offset..offset + 3].copy_from_slice(&CONTOUR.0);
        }
    }
}

fn paint_mask(output: &mut RgbImage, mask: &[bool], skin: Rgb<u8>) {
    for (pixel, &is_skin) in output.pixels_mut().zip(mask) {
        *pixel = if is_skin { skin } else { BACKGROUND };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_matches_documented_values() {
        let config = PipelineConfig::default();
        assert_eq!(config.threshold, 0.15);
        assert_eq!(config.hysteresis_span, 5);
        assert_eq!(config.hull_merge_distance, 50.0);
        assert_eq!(config.row_order, RowOrder::TopDown);
        assert!(!config.display.any());
    }

    #[test]
    fn json_config_fills_in_defaults() {
        let config =
            PipelineConfig::from_json_str(r#"{"threshold": 0.3, "row_order": "bottom_up"}"#).unwrap();
        assert_eq!(config.threshold, 0.3);
        assert_eq!(config.row_order, RowOrder::BottomUp);
        assert_eq!(config.hysteresis_span, DEFAULT_HYSTERESIS_SPAN);

        let display = PipelineConfig::from_json_str(r#"{"display": {"show_contour": true}}"#).unwrap();
        assert!(display.display.show_contour);
        assert!(!display.display.show_first_pass);
    }

    #[test]
    fn json_config_rejects_bad_input() {
        assert!(matches!(
            PipelineConfig::from_json_str(r#"{"threshold": 1.5}"#),
            Err(Error::InvalidThreshold(_))
        ));
        assert!(matches!(
            PipelineConfig::from_json_str("{not json"),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn negative_span_and_merge_distance_are_rejected() {
        assert!(matches!(
            PipelineConfig::from_json_str(r#"{"hysteresis_span": -1}"#),
            Err(Error::InvalidHysteresisSpan(-1))
        ));
        assert!(matches!(
            PipelineConfig::from_json_str(r#"{"hull_merge_distance": -0.5}"#),
            Err(Error::InvalidMergeDistance(_))
        ));
        let zero = PipelineConfig::from_json_str(r#"{"hysteresis_span": 0, "hull_merge_distance": 0.0}"#)
            .unwrap();
        assert_eq!(zero.hysteresis_span, 0);
    }

    #[test]
    fn threshold_and_display_change_between_frames() {
        let skin = Rgb([204, 161, 143]);
        let mut pipeline =
            SegmentationPipeline::new(PipelineConfig::default(), &vec![Hsv::from(skin); 20]).unwrap();
        let frame = RgbImage::from_pixel(8, 8, skin);

        assert_eq!(pipeline.process_frame(&frame).frame, frame);

        pipeline.set_display(DisplayOptions {
            show_first_pass: true,
            ..DisplayOptions::default()
        });
        let recolored = pipeline.process_frame(&frame);
        assert!(recolored.frame.pixels().all(|p| *p == FIRST_PASS_SKIN));

        assert!(matches!(pipeline.set_threshold(1.2), Err(Error::InvalidThreshold(_))));
        assert_eq!(pipeline.config().threshold, DEFAULT_THRESHOLD);
        pipeline.set_threshold(0.4).unwrap();
        assert_eq!(pipeline.config().threshold, 0.4);
    }

    #[test]
    fn pipeline_refuses_an_empty_calibration() {
        let result = SegmentationPipeline::new(PipelineConfig::default(), &[]);
        assert!(matches!(result, Err(Error::InsufficientSamples { .. })));
    }
}
