//! Draws detection overlays — bounding boxes and emotion labels — onto
//! an RGB24 frame buffer in place.

use crate::font;
use crate::types::Detection;
use image::{Rgb, RgbImage};
use imageproc::rect::Rect;

const BOX_COLOR: [u8; 3] = [0, 255, 0];
const LABEL_COLOR: [u8; 3] = [255, 255, 255];
/// Hollow rectangles drawn per box, nested one pixel apart.
const BOX_THICKNESS: u32 = 2;
/// Gap between the box top edge and the label baseline.
const LABEL_OFFSET: i32 = 10;
const LABEL_SCALE: usize = 2;

/// Draw one rectangle and one `"{emotion}: {score:.2}"` label per
/// detection. Pure side effect on the passed buffer; boxes are clamped
/// to the frame, labels are clamped inside the top edge.
pub fn draw_detections(rgb: &mut Vec<u8>, width: u32, height: u32, detections: &[Detection]) {
    if rgb.len() != (width * height * 3) as usize {
        tracing::warn!(
            len = rgb.len(),
            width,
            height,
            "annotation skipped: buffer does not match dimensions"
        );
        return;
    }

    // Wrap the existing buffer; no copy, written back below. The length
    // check above makes from_raw infallible.
    let Some(mut img) = RgbImage::from_raw(width, height, std::mem::take(rgb)) else {
        return;
    };

    for det in detections {
        draw_box(&mut img, det, width, height);
    }

    *rgb = img.into_raw();

    for det in detections {
        let (emotion, score) = det.top_emotion();
        let text = format!("{emotion}: {score:.2}");

        let x = det.bbox.x.round() as i32;
        let text_h = font::text_height(LABEL_SCALE) as i32;
        // Above the box when there is room, inside the frame otherwise.
        let y = (det.bbox.y.round() as i32 - LABEL_OFFSET - text_h).max(0);

        font::draw_text_line(
            rgb,
            width as usize,
            height as usize,
            x,
            y,
            &text,
            LABEL_COLOR,
            LABEL_SCALE,
        );
    }
}

fn draw_box(img: &mut RgbImage, det: &Detection, width: u32, height: u32) {
    let x0 = det.bbox.x.round().max(0.0) as i32;
    let y0 = det.bbox.y.round().max(0.0) as i32;
    let x1 = ((det.bbox.x + det.bbox.width).round() as i32).min(width as i32);
    let y1 = ((det.bbox.y + det.bbox.height).round() as i32).min(height as i32);

    if x1 <= x0 || y1 <= y0 {
        return;
    }

    let w = (x1 - x0) as u32;
    let h = (y1 - y0) as u32;

    for t in 0..BOX_THICKNESS {
        if w <= 2 * t || h <= 2 * t {
            break;
        }
        let rect = Rect::at(x0 + t as i32, y0 + t as i32).of_size(w - 2 * t, h - 2 * t);
        imageproc::drawing::draw_hollow_rect_mut(img, rect, Rgb(BOX_COLOR));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{BoundingBox, EmotionLabel, EmotionScores};

    fn detection(x: f32, y: f32, w: f32, h: f32, label: EmotionLabel) -> Detection {
        let mut scores = EmotionScores::new();
        scores.set(label, 0.9);
        Detection {
            bbox: BoundingBox {
                x,
                y,
                width: w,
                height: h,
                confidence: 0.8,
            },
            scores,
        }
    }

    fn count_color(rgb: &[u8], color: [u8; 3]) -> usize {
        rgb.chunks_exact(3).filter(|px| *px == color).count()
    }

    fn pixel(rgb: &[u8], width: u32, x: u32, y: u32) -> [u8; 3] {
        let off = ((y * width + x) * 3) as usize;
        [rgb[off], rgb[off + 1], rgb[off + 2]]
    }

    #[test]
    fn test_empty_detections_leave_frame_untouched() {
        let mut rgb = vec![10u8; 64 * 64 * 3];
        let original = rgb.clone();
        draw_detections(&mut rgb, 64, 64, &[]);
        assert_eq!(rgb, original);
    }

    #[test]
    fn test_draws_box_perimeter() {
        let mut rgb = vec![0u8; 200 * 200 * 3];
        let det = detection(50.0, 80.0, 60.0, 40.0, EmotionLabel::Happy);
        draw_detections(&mut rgb, 200, 200, &[det]);

        // Outer perimeter corners are box-colored
        assert_eq!(pixel(&rgb, 200, 50, 80), BOX_COLOR);
        assert_eq!(pixel(&rgb, 200, 109, 80), BOX_COLOR);
        assert_eq!(pixel(&rgb, 200, 50, 119), BOX_COLOR);
        // Second nested rectangle gives the 2px edge
        assert_eq!(pixel(&rgb, 200, 51, 81), BOX_COLOR);
        // Interior stays untouched
        assert_eq!(pixel(&rgb, 200, 80, 100), [0, 0, 0]);
    }

    #[test]
    fn test_label_drawn_above_box() {
        let mut rgb = vec![0u8; 200 * 200 * 3];
        let det = detection(50.0, 80.0, 60.0, 40.0, EmotionLabel::Happy);
        draw_detections(&mut rgb, 200, 200, &[det]);

        // Some label pixels exist strictly above the box top edge
        let label_pixels = rgb[..80 * 200 * 3]
            .chunks_exact(3)
            .filter(|px| *px == LABEL_COLOR)
            .count();
        assert!(label_pixels > 0);
    }

    #[test]
    fn test_two_detections_two_boxes() {
        let mut rgb = vec![0u8; 300 * 300 * 3];
        let dets = vec![
            detection(20.0, 40.0, 50.0, 50.0, EmotionLabel::Sad),
            detection(180.0, 200.0, 60.0, 60.0, EmotionLabel::Angry),
        ];
        draw_detections(&mut rgb, 300, 300, &dets);

        assert_eq!(pixel(&rgb, 300, 20, 40), BOX_COLOR);
        assert_eq!(pixel(&rgb, 300, 180, 200), BOX_COLOR);

        // Two separate labels: white pixels near both boxes
        let one = detection(20.0, 40.0, 50.0, 50.0, EmotionLabel::Sad);
        let mut single = vec![0u8; 300 * 300 * 3];
        draw_detections(&mut single, 300, 300, &[one]);
        assert!(count_color(&rgb, LABEL_COLOR) > count_color(&single, LABEL_COLOR));
    }

    #[test]
    fn test_box_at_top_edge_keeps_label_visible() {
        let mut rgb = vec![0u8; 200 * 200 * 3];
        let det = detection(50.0, 2.0, 60.0, 40.0, EmotionLabel::Fear);
        draw_detections(&mut rgb, 200, 200, &[det]);
        // Label is clamped to y=0 instead of vanishing off-frame
        assert!(count_color(&rgb, LABEL_COLOR) > 0);
    }

    #[test]
    fn test_box_partially_outside_is_clamped() {
        let mut rgb = vec![0u8; 100 * 100 * 3];
        let det = detection(80.0, 80.0, 50.0, 50.0, EmotionLabel::Neutral);
        draw_detections(&mut rgb, 100, 100, &[det]);
        assert_eq!(pixel(&rgb, 100, 80, 80), BOX_COLOR);
    }

    #[test]
    fn test_mismatched_buffer_is_left_alone() {
        let mut rgb = vec![7u8; 10];
        let det = detection(0.0, 0.0, 5.0, 5.0, EmotionLabel::Happy);
        draw_detections(&mut rgb, 100, 100, &[det]);
        assert_eq!(rgb, vec![7u8; 10]);
    }
}
