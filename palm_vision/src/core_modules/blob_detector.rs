// THEORY:
// The `BlobDetector` is pass 1 of segmentation. It classifies every pixel of the
// frame against the calibrated skin model and clusters the qualifying pixels into
// `SkinBlob`s, keeping track of the dominant one as it goes.
//
// Key architectural principles & algorithm steps:
// 1.  **Row-Major Scan**: Pixels are visited in buffer order (`x = i mod width`,
//     `y = i / width`). Both the hysteresis and the first-match assignment below
//     depend on this order, so the same shape presented in a different pixel order
//     can partition differently. That is accepted; the order is fixed and
//     documented rather than hidden.
// 2.  **Hysteresis**: A pixel qualifies at the full threshold, or at half the
//     threshold while a countdown started by the last confirmed skin pixel is still
//     running. This bridges anti-aliasing and sensor noise along a row.
// 3.  **First Match Wins**: A qualifying pixel is offered to the blobs in creation
//     order, and the first one that accepts it absorbs it. If none accepts, it
//     seeds a new blob.
// 4.  **Lazy Pruning**: While searching, any blob that rejects the pixel and still
//     covers an area of at most one square pixel is dropped on the spot. Speckle
//     dies as soon as the scan moves past it.
// 5.  **Dominant Blob**: After each absorption, the absorbing blob replaces the
//     tracked dominant blob if it is at least as large in both area and absorbed
//     size. Tracking starts from a blob seeded at the origin.
// 6.  **Stateless Utility**: `find_blobs` is a fold over the pixel sequence. All
//     cross-pixel state lives in the accumulator, so the pass is a pure function of
//     the frame, the classifier and the parameters.

use crate::core_modules::geometry::{index_to_point, Point};
use crate::core_modules::hsv::hsv::Hsv;
use crate::core_modules::skin_blob::SkinBlob;
use crate::core_modules::skin_classifier::SkinClassifier;
use image::RgbImage;

pub mod blob_detector {
    use super::*; // Make types from the parent module available.

    /// The result of classifying and clustering one frame.
    #[derive(Debug, Clone)]
    pub struct BlobScan {
        /// Blobs that survived pruning, in creation order.
        pub blobs: Vec<SkinBlob>,
        /// The dominant blob. A zero-area blob at the origin if nothing qualified.
        pub largest: SkinBlob,
        /// Per-pixel pass-1 classification, in buffer order.
        pub mask: Vec<bool>,
    }

    /// Pass 1: classifies `frame` at `threshold` (and `threshold / 2` under
    /// hysteresis) and clusters the qualifying pixels.
    pub fn find_blobs(
        frame: &RgbImage,
        classifier: &SkinClassifier,
        threshold: f32,
        hysteresis_span: i32,
    ) -> BlobScan {
        let width = frame.width();
        let capacity = (frame.width() * frame.height()) as usize;

        let clusters = frame.pixels().enumerate().fold(
            Clusters::new(capacity),
            |mut acc, (i, pixel)| {
                let color = Hsv::from(pixel);
                let qualifies = classifier.qualifies(&color, threshold)
                    || (acc.countdown > 0 && classifier.qualifies(&color, threshold / 2.0));

                if qualifies {
                    acc.absorb(index_to_point(width, i));
                    acc.countdown = hysteresis_span;
                } else {
                    acc.countdown -= 1;
                }
                acc.mask.push(qualifies);
                acc
            },
        );

        BlobScan {
            blobs: clusters.blobs,
            largest: clusters.largest,
            mask: clusters.mask,
        }
    }

    /// Fold accumulator for pass 1.
    struct Clusters {
        blobs: Vec<SkinBlob>,
        largest: SkinBlob,
        /// Pixels left in the current hysteresis window. Goes negative freely.
        countdown: i32,
        mask: Vec<bool>,
    }

    impl Clusters {
        fn new(capacity: usize) -> Self {
            Self {
                blobs: Vec::new(),
                largest: SkinBlob::new(Point::origin()),
                countdown: 0,
                mask: Vec::with_capacity(capacity),
            }
        }

        /// Offers `point` to the blobs in creation order, pruning speckle on the way.
        fn absorb(&mut self, point: Point) {
            let mut i = 0;
            while i < self.blobs.len() {
                match self.blobs[i].test_point(point) {
                    Some(grown) => {
                        self.blobs[i] = grown;
                        if grown.dominates(&self.largest) {
                            self.largest = grown;
                        }
                        return;
                    }
                    None if self.blobs[i].area() <= 1.0 => {
                        self.blobs.remove(i);
                    }
                    None => i += 1,
                }
            }
            self.blobs.push(SkinBlob::new(point));
        }
    }

}
