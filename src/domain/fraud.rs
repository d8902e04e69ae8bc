//! Fraud screening for recognized plates.
//!
//! A gate camera sees deliberate spoofing attempts: printed plates held up to
//! the lens, glare-washed or blacked-out crops, nonsense readings. Screening
//! is an ordered rule list, not a weighted score: the first failing check
//! decides the reported reason, so the order is part of the contract.

use crate::core::FraudConfig;
use image::RgbImage;
use serde::{Deserialize, Serialize};

/// Reason reported when a candidate is accepted.
pub const REASON_NORMAL: &str = "normal";
/// Reason reported when OCR confidence is below the floor.
pub const REASON_LOW_CONFIDENCE: &str = "low OCR confidence";
/// Reason reported when the text failed format validation.
pub const REASON_INVALID_FORMAT: &str = "invalid plate format";
/// Reason reported when the plate crop quality is below the floor.
pub const REASON_POOR_QUALITY: &str = "poor image quality";

/// Accept/reject decision with its reason.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FraudVerdict {
    /// True when the candidate was rejected.
    pub is_fraud: bool,
    /// The first matching reason, or [`REASON_NORMAL`].
    pub reason: String,
}

/// Ordered fraud rule list over confidence, format validity, and crop quality.
#[derive(Debug, Clone)]
pub struct FraudScorer {
    config: FraudConfig,
}

impl FraudScorer {
    /// Creates a scorer with the given thresholds.
    pub fn new(config: FraudConfig) -> Self {
        Self { config }
    }

    /// Coarse image-quality score from mean red-channel brightness.
    ///
    /// Crops whose mean brightness falls inside the configured band score
    /// 0.8; washed-out or underexposed crops score 0.3. Empty crops score 0.
    pub fn assess_image_quality(&self, plate: &RgbImage) -> f32 {
        let (w, h) = plate.dimensions();
        let count = (w as u64) * (h as u64);
        if count == 0 {
            return 0.0;
        }

        let sum: u64 = plate.pixels().map(|p| p[0] as u64).sum();
        let mean_brightness = sum as f32 / count as f32 / 255.0;

        if mean_brightness >= self.config.brightness_low
            && mean_brightness <= self.config.brightness_high
        {
            0.8
        } else {
            0.3
        }
    }

    /// Applies the ordered rules: confidence, then format, then quality.
    pub fn score(&self, ocr_confidence: f32, format_valid: bool, quality: f32) -> FraudVerdict {
        if ocr_confidence < self.config.confidence_floor {
            return FraudVerdict {
                is_fraud: true,
                reason: REASON_LOW_CONFIDENCE.to_string(),
            };
        }
        if !format_valid {
            return FraudVerdict {
                is_fraud: true,
                reason: REASON_INVALID_FORMAT.to_string(),
            };
        }
        if quality < self.config.quality_floor {
            return FraudVerdict {
                is_fraud: true,
                reason: REASON_POOR_QUALITY.to_string(),
            };
        }
        FraudVerdict {
            is_fraud: false,
            reason: REASON_NORMAL.to_string(),
        }
    }

    /// Convenience wrapper computing quality from the plate crop.
    pub fn evaluate(
        &self,
        plate_crop: &RgbImage,
        ocr_confidence: f32,
        format_valid: bool,
    ) -> FraudVerdict {
        let quality = self.assess_image_quality(plate_crop);
        self.score(ocr_confidence, format_valid, quality)
    }
}
