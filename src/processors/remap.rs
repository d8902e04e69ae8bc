//! Coordinate remapping between crop spaces.
//!
//! Every model canvas is produced by the letterbox transform in
//! [`crate::processors::preprocess`]: uniform scale, top-left aligned. A
//! [`CropTransform`] records that scale together with the crop's top-left in
//! frame coordinates, and inverts the mapping exactly. This is the letterbox
//! inverse, not a general homography. Remapping always walks one ancestor hop
//! at a time: the vehicle-crop offset fed into the plate hop is itself already
//! frame-global.
//!
//! The expansion helpers implement the margin policy around detected boxes:
//! vehicle boxes are padded before the plate search (plates sit at box
//! edges), plate regions are inflated about their center (the heatmap
//! extractor under-reports text extent).

use crate::processors::geometry::{CanvasBox, CanvasRegion, FrameBox};

/// Transform relating a letterboxed canvas to frame coordinates.
#[derive(Debug, Clone, Copy)]
pub struct CropTransform {
    /// Crop top-left in frame coordinates.
    pub offset_x: f32,
    /// Crop top-left in frame coordinates.
    pub offset_y: f32,
    /// Letterbox scale from the crop into the canvas.
    pub scale: f32,
}

impl CropTransform {
    /// Transform for a canvas built from the full frame (no crop offset).
    pub fn root(scale: f32) -> Self {
        Self {
            offset_x: 0.0,
            offset_y: 0.0,
            scale,
        }
    }

    /// Transform for a canvas built from a crop whose top-left is already in
    /// frame coordinates.
    pub fn for_crop(offset_x: f32, offset_y: f32, scale: f32) -> Self {
        Self {
            offset_x,
            offset_y,
            scale,
        }
    }

    /// Maps a canvas-local box back into frame coordinates.
    pub fn to_frame(&self, rect: &CanvasBox) -> FrameBox {
        FrameBox::new(
            self.offset_x + rect.x1 / self.scale,
            self.offset_y + rect.y1 / self.scale,
            self.offset_x + rect.x2 / self.scale,
            self.offset_y + rect.y2 / self.scale,
        )
    }

    /// Maps a canvas-local region back into frame coordinates.
    pub fn region_to_frame(&self, region: &CanvasRegion) -> FrameBox {
        self.to_frame(&CanvasBox::new(
            region.x as f32,
            region.y as f32,
            (region.x + region.w) as f32,
            (region.y + region.h) as f32,
        ))
    }

    /// Forward mapping from frame coordinates onto the canvas.
    pub fn to_canvas(&self, rect: &FrameBox) -> CanvasBox {
        CanvasBox::new(
            (rect.x1 - self.offset_x) * self.scale,
            (rect.y1 - self.offset_y) * self.scale,
            (rect.x2 - self.offset_x) * self.scale,
            (rect.y2 - self.offset_y) * self.scale,
        )
    }
}

/// Expands a vehicle box by `margin` of its size on each side, clamped to the
/// frame.
pub fn expand_vehicle_box(rect: &FrameBox, margin: f32, frame_w: u32, frame_h: u32) -> FrameBox {
    let pad_w = rect.width() * margin;
    let pad_h = rect.height() * margin;
    FrameBox::new(
        rect.x1 - pad_w,
        rect.y1 - pad_h,
        rect.x2 + pad_w,
        rect.y2 + pad_h,
    )
    .clamp_to(frame_w, frame_h)
}

/// Expands a plate box about its center by independent width/height factors,
/// clamped to the frame.
pub fn expand_plate_box(
    rect: &FrameBox,
    factor_w: f32,
    factor_h: f32,
    frame_w: u32,
    frame_h: u32,
) -> FrameBox {
    let center_x = (rect.x1 + rect.x2) / 2.0;
    let center_y = (rect.y1 + rect.y2) / 2.0;
    let half_w = rect.width() * factor_w / 2.0;
    let half_h = rect.height() * factor_h / 2.0;
    FrameBox::new(
        center_x - half_w,
        center_y - half_h,
        center_x + half_w,
        center_y + half_h,
    )
    .clamp_to(frame_w, frame_h)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_within_one_pixel() {
        // 640 canvas over a 500x375 crop at frame offset (120, 80).
        let scale = (640.0f32 / 500.0).min(640.0 / 375.0);
        let transform = CropTransform::for_crop(120.0, 80.0, scale);

        let original = CanvasBox::new(33.0, 47.0, 321.0, 205.0);
        let frame = transform.to_frame(&original);
        let back = transform.to_canvas(&frame);

        assert!((back.x1 - original.x1).abs() <= 1.0);
        assert!((back.y1 - original.y1).abs() <= 1.0);
        assert!((back.x2 - original.x2).abs() <= 1.0);
        assert!((back.y2 - original.y2).abs() <= 1.0);
    }

    #[test]
    fn test_root_transform_has_no_offset() {
        let transform = CropTransform::root(0.5);
        let frame = transform.to_frame(&CanvasBox::new(10.0, 20.0, 30.0, 40.0));
        assert_eq!(frame, FrameBox::new(20.0, 40.0, 60.0, 80.0));
    }

    #[test]
    fn test_region_to_frame_uses_extent() {
        let transform = CropTransform::for_crop(100.0, 50.0, 2.0);
        let region = CanvasRegion { x: 10, y: 20, w: 30, h: 8 };
        let frame = transform.region_to_frame(&region);
        assert_eq!(frame, FrameBox::new(105.0, 60.0, 120.0, 64.0));
    }

    #[test]
    fn test_expand_vehicle_box_pads_each_side() {
        let rect = FrameBox::new(100.0, 100.0, 300.0, 260.0);
        let expanded = expand_vehicle_box(&rect, 0.25, 1920, 1080);
        assert_eq!(expanded, FrameBox::new(50.0, 60.0, 350.0, 300.0));
    }

    #[test]
    fn test_expand_vehicle_box_clamps_to_frame() {
        let rect = FrameBox::new(10.0, 10.0, 630.0, 470.0);
        let expanded = expand_vehicle_box(&rect, 0.25, 640, 480);
        assert_eq!(expanded, FrameBox::new(0.0, 0.0, 640.0, 480.0));
    }

    #[test]
    fn test_expand_plate_box_about_center() {
        let rect = FrameBox::new(100.0, 200.0, 200.0, 240.0);
        let expanded = expand_plate_box(&rect, 1.8, 2.0, 1920, 1080);
        assert_eq!(expanded, FrameBox::new(60.0, 180.0, 240.0, 260.0));
    }
}
