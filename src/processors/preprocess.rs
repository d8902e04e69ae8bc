//! Tensor preprocessing for model input.
//!
//! Turns an RGB buffer (a full frame or a crop) into the normalized planar
//! float tensor a model expects. Detection canvases use aspect-preserving
//! letterbox resizing with top-left alignment (the remap stage relies on
//! exactly this layout to invert the transform), while the recognizer input
//! is stretched to its fixed non-square shape.

use crate::core::{AnprError, Tensor4D, validate_image_dims};
use image::RgbImage;

/// Scale information produced by a letterbox resize, needed later to map
/// canvas coordinates back into the source image.
#[derive(Debug, Clone, Copy)]
pub struct LetterboxScale {
    /// Uniform scale factor applied to the source (`min(T/w, T/h)`).
    pub scale: f32,
    /// Width of the resampled content region on the canvas.
    pub content_w: u32,
    /// Height of the resampled content region on the canvas.
    pub content_h: u32,
}

/// Aspect-preserving resize onto a fixed square canvas.
///
/// The source is scaled by `min(target/w, target/h)`, resampled with
/// nearest-neighbor into the top-left corner, and the remainder of the canvas
/// keeps the fill value.
#[derive(Debug, Clone)]
pub struct LetterboxResize {
    target: u32,
    fill: u8,
}

impl LetterboxResize {
    /// Creates a letterbox resizer for a square canvas of the given side.
    pub fn new(target: u32, fill: u8) -> Self {
        Self { target, fill }
    }

    /// Canvas side length.
    pub fn target(&self) -> u32 {
        self.target
    }

    /// Resamples the source onto the canvas.
    ///
    /// # Errors
    ///
    /// Returns `AnprError::InvalidInput` for zero-dimension sources; callers
    /// validate crops before handing them over.
    pub fn apply(&self, src: &RgbImage) -> Result<(RgbImage, LetterboxScale), AnprError> {
        let (w, h) = src.dimensions();
        validate_image_dims(w, h, "letterbox resize")?;

        let target = self.target as f32;
        let scale = (target / w as f32).min(target / h as f32);
        let content_w = ((w as f32 * scale).round() as u32).min(self.target);
        let content_h = ((h as f32 * scale).round() as u32).min(self.target);

        let mut canvas = RgbImage::from_pixel(
            self.target,
            self.target,
            image::Rgb([self.fill, self.fill, self.fill]),
        );

        for y in 0..content_h {
            let src_y = ((y as f32 / scale) as u32).min(h - 1);
            for x in 0..content_w {
                let src_x = ((x as f32 / scale) as u32).min(w - 1);
                canvas.put_pixel(x, y, *src.get_pixel(src_x, src_y));
            }
        }

        Ok((
            canvas,
            LetterboxScale {
                scale,
                content_w,
                content_h,
            },
        ))
    }
}

/// Plain per-axis stretch to a fixed non-square target (recognizer input).
#[derive(Debug, Clone)]
pub struct StretchResize {
    target_w: u32,
    target_h: u32,
}

impl StretchResize {
    /// Creates a stretch resizer for the given target dimensions.
    pub fn new(target_w: u32, target_h: u32) -> Self {
        Self { target_w, target_h }
    }

    /// Resamples the source to exactly the target size with nearest-neighbor.
    pub fn apply(&self, src: &RgbImage) -> Result<RgbImage, AnprError> {
        let (w, h) = src.dimensions();
        validate_image_dims(w, h, "stretch resize")?;

        let scale_x = self.target_w as f32 / w as f32;
        let scale_y = self.target_h as f32 / h as f32;

        let mut canvas = RgbImage::new(self.target_w, self.target_h);
        for y in 0..self.target_h {
            let src_y = ((y as f32 / scale_y) as u32).min(h - 1);
            for x in 0..self.target_w {
                let src_x = ((x as f32 / scale_x) as u32).min(w - 1);
                canvas.put_pixel(x, y, *src.get_pixel(src_x, src_y));
            }
        }
        Ok(canvas)
    }
}

/// Per-channel normalization writing planar (C, H, W) output.
///
/// Stored as `alpha = scale / std` and `beta = -mean / std` so each pixel is
/// a single fused multiply-add.
#[derive(Debug, Clone)]
pub struct NormalizeImage {
    alpha: [f32; 3],
    beta: [f32; 3],
}

impl NormalizeImage {
    /// Creates a normalizer from scale, per-channel mean, and per-channel std.
    pub fn new(scale: f32, mean: [f32; 3], std: [f32; 3]) -> Result<Self, AnprError> {
        if scale <= 0.0 {
            return Err(AnprError::config_error("scale must be greater than 0"));
        }
        for (i, &s) in std.iter().enumerate() {
            if s <= 0.0 {
                return Err(AnprError::config_error(format!(
                    "standard deviation at index {} must be greater than 0, got {}",
                    i, s
                )));
            }
        }
        Ok(Self::from_parts(scale, mean, std))
    }

    fn from_parts(scale: f32, mean: [f32; 3], std: [f32; 3]) -> Self {
        let mut alpha = [0.0; 3];
        let mut beta = [0.0; 3];
        for i in 0..3 {
            alpha[i] = scale / std[i];
            beta[i] = -mean[i] / std[i];
        }
        Self { alpha, beta }
    }

    /// Plain `x / 255` scaling (detector canvases).
    pub fn unit() -> Self {
        Self {
            alpha: [1.0 / 255.0; 3],
            beta: [0.0; 3],
        }
    }

    /// ImageNet mean/std normalization (plate localization canvases).
    pub fn imagenet() -> Self {
        Self::from_parts(1.0 / 255.0, [0.485, 0.456, 0.406], [0.229, 0.224, 0.225])
    }

    /// `(x / 255 - 0.5) / 0.5` normalization to [-1, 1] (recognizer input).
    pub fn signed_unit() -> Self {
        Self::from_parts(1.0 / 255.0, [0.5, 0.5, 0.5], [0.5, 0.5, 0.5])
    }

    /// Normalizes an image into a `(1, 3, H, W)` tensor.
    pub fn to_tensor(&self, img: &RgbImage) -> Result<Tensor4D, AnprError> {
        let (width, height) = img.dimensions();
        let (w, h) = (width as usize, height as usize);
        let mut data = vec![0.0f32; 3 * h * w];

        for c in 0..3 {
            let plane = &mut data[c * h * w..(c + 1) * h * w];
            for y in 0..h {
                for x in 0..w {
                    let pixel = img.get_pixel(x as u32, y as u32);
                    plane[y * w + x] = pixel[c] as f32 * self.alpha[c] + self.beta[c];
                }
            }
        }

        ndarray::Array4::from_shape_vec((1, 3, h, w), data).map_err(|e| {
            AnprError::tensor_operation(
                &format!("failed to create (1, 3, {}, {}) input tensor", h, w),
                e,
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    fn gray_image(width: u32, height: u32, value: u8) -> RgbImage {
        RgbImage::from_pixel(width, height, Rgb([value, value, value]))
    }

    #[test]
    fn test_letterbox_640x480_keeps_unit_scale() {
        let resize = LetterboxResize::new(640, 0);
        let src = gray_image(640, 480, 200);
        let (canvas, info) = resize.apply(&src).unwrap();

        assert_eq!(info.scale, 1.0);
        assert_eq!((info.content_w, info.content_h), (640, 480));
        assert_eq!(canvas.dimensions(), (640, 640));
    }

    #[test]
    fn test_letterbox_padding_is_fill_value() {
        let resize = LetterboxResize::new(640, 0);
        let src = gray_image(640, 480, 200);
        let (canvas, _) = resize.apply(&src).unwrap();

        let tensor = NormalizeImage::unit().to_tensor(&canvas).unwrap();
        for c in 0..3 {
            for y in 480..640 {
                for x in 0..640 {
                    assert_eq!(tensor[[0, c, y, x]], 0.0, "padding at ({}, {}, {})", c, y, x);
                }
            }
        }
        // Content region is not the fill value.
        assert!((tensor[[0, 0, 0, 0]] - 200.0 / 255.0).abs() < 1e-6);
    }

    #[test]
    fn test_letterbox_rejects_zero_dimension() {
        let resize = LetterboxResize::new(640, 0);
        let src = RgbImage::new(0, 10);
        assert!(resize.apply(&src).is_err());
    }

    #[test]
    fn test_stretch_to_ocr_shape() {
        let resize = StretchResize::new(320, 48);
        let src = gray_image(200, 60, 128);
        let out = resize.apply(&src).unwrap();
        assert_eq!(out.dimensions(), (320, 48));
    }

    #[test]
    fn test_signed_unit_range() {
        let norm = NormalizeImage::signed_unit();
        let black = gray_image(2, 2, 0);
        let white = gray_image(2, 2, 255);
        let low = norm.to_tensor(&black).unwrap();
        let high = norm.to_tensor(&white).unwrap();
        assert!((low[[0, 0, 0, 0]] + 1.0).abs() < 1e-5);
        assert!((high[[0, 0, 0, 0]] - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_imagenet_normalization_value() {
        let norm = NormalizeImage::imagenet();
        let img = gray_image(1, 1, 255);
        let tensor = norm.to_tensor(&img).unwrap();
        // (1.0 - 0.485) / 0.229
        assert!((tensor[[0, 0, 0, 0]] - (1.0 - 0.485) / 0.229).abs() < 1e-4);
    }
}
