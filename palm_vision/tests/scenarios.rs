//! End-to-end segmentation of synthetic frames.

use image::{Rgb, RgbImage};
use palm_vision::core_modules::geometry::Point;
use palm_vision::{
    DisplayOptions, Error, Hsv, PipelineConfig, RowOrder, SampleRegion, SegmentationPipeline,
};

const SKIN: Rgb<u8> = Rgb([204, 161, 143]);
const BACKGROUND: Rgb<u8> = Rgb([0, 0, 0]);

fn skin_pipeline(config: PipelineConfig) -> SegmentationPipeline {
    SegmentationPipeline::new(config, &vec![Hsv::from(SKIN); 50]).unwrap()
}

fn frame_from(width: u32, height: u32, is_skin: impl Fn(u32, u32) -> bool) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| if is_skin(x, y) { SKIN } else { BACKGROUND })
}

fn disk(cx: i64, cy: i64, r: i64) -> impl Fn(u32, u32) -> bool {
    move |x, y| {
        let (dx, dy) = (x as i64 - cx, y as i64 - cy);
        dx * dx + dy * dy <= r * r
    }
}

/// A palm (disk) with a forearm block below it and five fingers of different
/// lengths, drawn with row 0 at the bottom of the picture.
fn open_hand(x: u32, y: u32) -> bool {
    const FINGERS: [(u32, u32); 5] = [(100, 260), (130, 330), (160, 380), (190, 330), (220, 260)];
    let forearm = (60..=260).contains(&x) && y < 60;
    let palm = disk(160, 110, 80)(x, y);
    let finger = FINGERS
        .iter()
        .any(|&(center, top)| x + 5 >= center && x <= center + 5 && (110..=top).contains(&y));
    forearm || palm || finger
}

#[test]
fn uniform_skin_frame_is_one_blob() {
    let (width, height) = (32, 24);
    let mut pipeline = skin_pipeline(PipelineConfig {
        display: DisplayOptions {
            show_first_pass: true,
            ..DisplayOptions::default()
        },
        ..PipelineConfig::default()
    });

    let report = pipeline.process_frame(&RgbImage::from_pixel(width, height, SKIN));

    assert!(report.frame.pixels().all(|p| *p == Rgb([255, 255, 255])));
    assert_eq!(report.blobs.len(), 1);
    assert_eq!(report.blobs[0].area(), ((width - 1) * (height - 1)) as f64);
    assert_eq!(report.hand.min_point(), Point::new(0.0, 0.0));
    assert_eq!(report.hand.max_point(), Point::new(31.0, 23.0));
    assert_eq!(report.hand.width(), width - 2);
}

#[test]
fn frame_without_skin_yields_nothing() {
    let mut pipeline = skin_pipeline(PipelineConfig::default());

    let report = pipeline.process_frame(&RgbImage::from_pixel(40, 30, BACKGROUND));

    assert!(report.blobs.is_empty());
    assert_eq!(report.hand.area(), 0.0);
    assert_eq!(report.hand.width(), 0);
    assert!(report.contour.is_empty());
    assert!(report.hull.is_empty());
    assert!(report.fingertips.is_empty());
    assert!(!report.closed_fist);
}

#[test]
fn filled_disk_is_a_closed_fist() {
    let mut pipeline = skin_pipeline(PipelineConfig::default());

    let report = pipeline.process_frame(&frame_from(200, 200, disk(100, 100, 40)));

    assert!(report.hull.len() >= 3);
    assert!(report.closed_fist);
    assert!(report.fingertips.is_empty());
    assert_eq!(report.hand.width(), 79);

    let palm = report.hand.mean_point();
    assert!((palm.x - 100.0).abs() < 1e-6);
    assert!(palm.y > 100.0 && palm.y < 103.0);
}

#[test]
fn open_hand_has_five_fingertips() {
    let mut pipeline = skin_pipeline(PipelineConfig {
        row_order: RowOrder::BottomUp,
        ..PipelineConfig::default()
    });

    let report = pipeline.process_frame(&frame_from(320, 420, open_hand));

    assert_eq!(report.blobs.len(), 1);
    assert_eq!(report.hand.min_point(), Point::new(60.0, 0.0));
    assert_eq!(report.hand.max_point(), Point::new(260.0, 380.0));
    assert_eq!(report.hand.width(), 199);
    assert!(!report.closed_fist);
    assert_eq!(report.fingertips.len(), 5);

    let palm = report.hand.mean_point();
    let half_width = (report.hand.width() / 2) as f64;
    for tip in &report.fingertips {
        assert!(tip.y > palm.y, "{tip:?} is not above the palm at {palm:?}");
        assert!(tip.distance(&palm) > half_width);
    }
    for center in [100.0, 130.0, 160.0, 190.0, 220.0] {
        let on_finger = report
            .fingertips
            .iter()
            .filter(|tip| (tip.x - center).abs() <= 6.0)
            .count();
        assert_eq!(on_finger, 1, "finger at x = {center}");
    }
    assert_eq!(pipeline.get_last_fingertips(), report.fingertips.as_slice());
}

#[test]
fn row_order_decides_what_is_above() {
    let mut pipeline = skin_pipeline(PipelineConfig::default());

    // Same picture read top-down: the fingers now point down, below the palm.
    // The forearm corners are the only candidates, and all of them sit within
    // one palm width.
    let report = pipeline.process_frame(&frame_from(320, 420, open_hand));

    assert_eq!(report.hull.len(), 9);
    assert!(report.closed_fist);
    assert!(report.fingertips.is_empty());
}

#[test]
fn display_options_only_recolor() {
    let frame = frame_from(32, 24, |_, _| true);
    let mut plain = skin_pipeline(PipelineConfig::default());
    let mut debug = skin_pipeline(PipelineConfig {
        display: DisplayOptions {
            show_first_pass: true,
            show_second_pass: true,
            show_contour: true,
        },
        ..PipelineConfig::default()
    });

    let expected = plain.process_frame(&frame);
    let report = debug.process_frame(&frame);

    assert_eq!(expected.frame, frame);
    assert_eq!(report.hand, expected.hand);
    assert_eq!(report.contour, expected.contour);
    assert_eq!(report.hull, expected.hull);
    assert_eq!(report.fingertips, expected.fingertips);

    // Second pass paints over the first, and the contour over both.
    assert_eq!(*report.frame.get_pixel(0, 0), Rgb([0, 0, 0]));
    assert_eq!(*report.frame.get_pixel(5, 5), Rgb([128, 128, 128]));
    assert_eq!(*report.frame.get_pixel(1, 1), Rgb([0, 255, 0]));
    assert_eq!(*report.frame.get_pixel(31, 5), Rgb([0, 255, 0]));
}

#[test]
fn recalibration_swaps_the_classifier() {
    let mut pipeline = skin_pipeline(PipelineConfig::default());
    let frame = RgbImage::from_pixel(16, 16, SKIN);
    assert_eq!(pipeline.process_frame(&frame).blobs.len(), 1);

    let blue = vec![Hsv::from(Rgb([40, 90, 200])); 10];
    pipeline.recalibrate(&blue).unwrap();
    assert!(pipeline.process_frame(&frame).blobs.is_empty());

    let before = *pipeline.classifier();
    let rejected = pipeline.recalibrate(&[Hsv::new(0.5, 0.5, 0.05)]);
    assert!(matches!(rejected, Err(Error::InsufficientSamples { .. })));
    assert_eq!(*pipeline.classifier(), before);
}

#[test]
fn calibration_from_a_sample_region() {
    let mut frame = frame_from(120, 120, disk(60, 60, 30));
    for x in 0..10 {
        // A dark notch inside the patch is filtered out of the sample.
        frame.put_pixel(55 + x, 55, Rgb([10, 10, 10]));
    }

    let samples = SampleRegion::new(50, 50, 20, 20).sample(&frame).unwrap();
    assert_eq!(samples.len(), 20 * 20 - 10);

    let mut pipeline = SegmentationPipeline::new(PipelineConfig::default(), &samples).unwrap();
    let report = pipeline.process_frame(&frame_from(120, 120, disk(60, 60, 30)));
    assert!(!report.blobs.is_empty());
    assert!(report.hand.area() > 0.0);
    assert_eq!(pipeline.get_last_hand(), Some(&report.hand));
}

#[test]
fn summary_serializes_without_pixels() {
    let mut pipeline = skin_pipeline(PipelineConfig::default());
    let report = pipeline.process_frame(&frame_from(200, 200, disk(100, 100, 40)));

    let summary = serde_json::to_value(report.summary()).unwrap();
    assert_eq!(summary["width"], 200);
    assert_eq!(summary["closed_fist"], true);
    assert_eq!(summary["fingertips"].as_array().map(Vec::len), Some(0));
    assert!(summary.get("frame").is_none());
}
