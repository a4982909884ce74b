// THEORY:
// Pass 2 of segmentation. With the dominant blob known, the frame is scanned again
// at a much more permissive threshold, but only pixels strictly inside the
// dominant blob's bounding box may count. Pass 2 does three things at once:
//   - feeds every contributing pixel into the blob's running mean (the palm center),
//   - measures the longest uninterrupted horizontal run (the palm width),
//   - records a contour point wherever the classification flips along the scan.
//
// The contour is deliberately crude: it is a sparse set of boundary candidates in
// scan order, not an ordered outline. The convex hull does not need more.

use crate::core_modules::geometry::{index_to_point, Point};
use crate::core_modules::hsv::hsv::Hsv;
use crate::core_modules::skin_blob::SkinBlob;
use crate::core_modules::skin_classifier::SkinClassifier;
use image::RgbImage;

/// Pass 2 classifies at the pass-1 threshold divided by this.
pub const REFINEMENT_THRESHOLD_DIVISOR: f32 = 3.0;

/// The result of refining the dominant blob over one frame.
#[derive(Debug, Clone)]
pub struct Refinement {
    /// The dominant blob with its palm center and width filled in.
    pub hand: SkinBlob,
    /// Pixels where the pass-2 classification differs from the previous pixel's.
    pub contour: Vec<Point>,
    /// Per-pixel pass-2 classification, in buffer order.
    pub mask: Vec<bool>,
}

struct RefineState {
    hand: SkinBlob,
    run: u32,
    previous: bool,
    contour: Vec<Point>,
    mask: Vec<bool>,
}

/// Pass 2 over `frame`, restricted to the interior of `largest`'s bounding box.
/// `threshold` is the pass-1 threshold.
pub fn refine(
    frame: &RgbImage,
    classifier: &SkinClassifier,
    threshold: f32,
    largest: SkinBlob,
) -> Refinement {
    let width = frame.width();
    let threshold = threshold / REFINEMENT_THRESHOLD_DIVISOR;
    let (min, max) = (largest.min_point(), largest.max_point());

    let initial = RefineState {
        hand: largest,
        run: 0,
        previous: false,
        contour: Vec::new(),
        mask: Vec::with_capacity((frame.width() * frame.height()) as usize),
    };

    let state = frame
        .pixels()
        .enumerate()
        .fold(initial, |mut state, (i, pixel)| {
            let point = index_to_point(width, i);
            let inside = point.x > min.x && point.x < max.x && point.y > min.y && point.y < max.y;
            let contributes = inside && classifier.qualifies(&Hsv::from(pixel), threshold);

            if contributes {
                state.run += 1;
                state.hand = state.hand.with_mean_sample(point);
            } else {
                state.hand = state.hand.with_run_width(state.run);
                state.run = 0;
            }

            if contributes != state.previous {
                state.contour.push(point);
            }
            state.previous = contributes;
            state.mask.push(contributes);
            state
        });

    Refinement {
        // The last pixel of a frame can never be strictly inside a bounding box,
        // so every run has been flushed by now.
        hand: state.hand,
        contour: state.contour,
        mask: state.mask,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    const SKIN: Rgb<u8> = Rgb([204, 161, 143]);

    fn classifier() -> SkinClassifier {
        SkinClassifier::calibrate(&vec![Hsv::from(SKIN); 10]).unwrap()
    }

    #[test]
    fn only_the_strict_interior_contributes() {
        let frame = RgbImage::from_pixel(6, 5, SKIN);
        let largest = SkinBlob::new(Point::new(0.0, 0.0)).merged(Point::new(5.0, 4.0));

        let refined = refine(&frame, &classifier(), 0.15, largest);

        // Interior is x in 1..=4, y in 1..=3.
        assert_eq!(refined.hand.sample_size(), 4 * 3);
        assert!(refined.hand.mean_point().distance(&Point::new(2.5, 2.0)) < 1e-9);
        assert_eq!(refined.hand.width(), 4);
        assert_eq!(refined.mask.iter().filter(|&&m| m).count(), 12);
    }

    #[test]
    fn contour_marks_every_flip() {
        let frame = RgbImage::from_pixel(6, 5, SKIN);
        let largest = SkinBlob::new(Point::new(0.0, 0.0)).merged(Point::new(5.0, 4.0));

        let refined = refine(&frame, &classifier(), 0.15, largest);

        let mut expected = Vec::new();
        for y in 1..=3 {
            expected.push(Point::new(1.0, y as f64));
            expected.push(Point::new(5.0, y as f64));
        }
        assert_eq!(refined.contour, expected);
    }

    #[test]
    fn degenerate_box_yields_nothing() {
        let frame = RgbImage::from_pixel(6, 5, SKIN);
        let refined = refine(&frame, &classifier(), 0.15, SkinBlob::new(Point::origin()));

        assert!(refined.contour.is_empty());
        assert_eq!(refined.hand.width(), 0);
        assert_eq!(refined.hand.sample_size(), 0);
        assert_eq!(refined.hand.area(), 0.0);
    }

    #[test]
    fn a_gap_splits_the_run() {
        let frame = RgbImage::from_fn(10, 3, |x, _| if x == 4 { Rgb([0, 0, 0]) } else { SKIN });
        let largest = SkinBlob::new(Point::new(0.0, 0.0)).merged(Point::new(9.0, 2.0));

        let refined = refine(&frame, &classifier(), 0.15, largest);

        // Row 1, columns 1..=3 and 5..=8.
        assert_eq!(refined.hand.width(), 4);
    }
}
