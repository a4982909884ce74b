// Hand model overlay: a palm circle sized from the blob width plus one marker per
// fingertip.

use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_hollow_circle_mut};
use palm_vision::core_modules::geometry::Point;
use palm_vision::{RowOrder, SkinBlob};

/// Display cap for the finger count. The engine itself returns every candidate.
pub const MAX_FINGERS: usize = 5;

const PALM_COLOR: Rgb<u8> = Rgb([0, 128, 255]);
const FINGERTIP_COLOR: Rgb<u8> = Rgb([255, 0, 0]);
const FINGERTIP_RADIUS: i32 = 6;

pub fn finger_count(fingertips: &[Point]) -> usize {
    fingertips.len().min(MAX_FINGERS)
}

/// Draws the palm and fingertips onto `canvas`. Coordinates from a bottom-up
/// buffer are flipped so the overlay lands on the saved (top-down) image.
pub fn draw_hand_model(
    canvas: &mut RgbImage,
    hand: &SkinBlob,
    fingertips: &[Point],
    row_order: RowOrder,
) {
    let height = canvas.height() as i32;
    let to_canvas = |p: &Point| -> (i32, i32) {
        let (x, y) = (p.x.round() as i32, p.y.round() as i32);
        match row_order {
            RowOrder::TopDown => (x, y),
            RowOrder::BottomUp => (x, height - 1 - y),
        }
    };

    let palm_radius = (hand.width() / 2) as i32;
    if palm_radius > 0 {
        draw_hollow_circle_mut(canvas, to_canvas(&hand.mean_point()), palm_radius, PALM_COLOR);
    }
    for tip in fingertips {
        draw_filled_circle_mut(canvas, to_canvas(tip), FINGERTIP_RADIUS, FINGERTIP_COLOR);
    }
}
