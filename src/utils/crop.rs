//! Rectangular crops out of an RGB frame.

use crate::core::AnprError;
use crate::processors::geometry::FrameBox;
use image::RgbImage;

/// Crops a frame-global box out of the frame into an owned buffer.
///
/// The box is clamped to the frame first. A box left degenerate by the clamp
/// is an input-contract violation and reported as invalid input.
pub fn crop_frame(frame: &RgbImage, rect: &FrameBox) -> Result<RgbImage, AnprError> {
    let (frame_w, frame_h) = frame.dimensions();
    let (x, y, w, h) = rect.to_pixel_rect(frame_w, frame_h);
    if w == 0 || h == 0 {
        return Err(AnprError::invalid_input(format!(
            "crop region ({:.1}, {:.1})-({:.1}, {:.1}) is empty within {}x{} frame",
            rect.x1, rect.y1, rect.x2, rect.y2, frame_w, frame_h
        )));
    }

    let mut out = RgbImage::new(w, h);
    for dy in 0..h {
        for dx in 0..w {
            out.put_pixel(dx, dy, *frame.get_pixel(x + dx, y + dy));
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn test_crop_extracts_region() {
        let mut frame = RgbImage::from_pixel(100, 100, Rgb([0, 0, 0]));
        for y in 20..40 {
            for x in 10..50 {
                frame.put_pixel(x, y, Rgb([255, 0, 0]));
            }
        }

        let cropped = crop_frame(&frame, &FrameBox::new(10.0, 20.0, 50.0, 40.0)).unwrap();
        assert_eq!(cropped.dimensions(), (40, 20));
        assert_eq!(cropped.get_pixel(0, 0), &Rgb([255, 0, 0]));
        assert_eq!(cropped.get_pixel(39, 19), &Rgb([255, 0, 0]));
    }

    #[test]
    fn test_crop_clamps_to_frame() {
        let frame = RgbImage::from_pixel(100, 100, Rgb([7, 7, 7]));
        let cropped = crop_frame(&frame, &FrameBox::new(-20.0, 90.0, 120.0, 200.0)).unwrap();
        assert_eq!(cropped.dimensions(), (100, 10));
    }

    #[test]
    fn test_empty_crop_is_error() {
        let frame = RgbImage::from_pixel(100, 100, Rgb([7, 7, 7]));
        assert!(crop_frame(&frame, &FrameBox::new(200.0, 200.0, 300.0, 300.0)).is_err());
    }
}
