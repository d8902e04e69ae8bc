//! Configuration types for the recognition pipeline.
//!
//! All tunables are plain serde-derived structs with sensible defaults and
//! `validate()` methods. Nothing here reads files; the embedder deserializes
//! whatever format it likes (JSON works out of the box) and hands the structs
//! to the pipeline builder.

use crate::core::{AnprError, validate_positive, validate_range};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for the vehicle detection stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    /// Square canvas side fed to the detector model.
    pub input_size: u32,
    /// Objectness / combined-score threshold.
    pub confidence_threshold: f32,
    /// IoU threshold for non-maximum suppression.
    pub iou_threshold: f32,
    /// Class ids accepted as vehicles (COCO: car, bus, truck).
    pub allowed_classes: Vec<usize>,
    /// Cap on candidates collected before NMS.
    pub max_candidates: usize,
    /// Vehicles smaller than this (either side, frame pixels) are skipped.
    pub min_vehicle_size: u32,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            input_size: 640,
            confidence_threshold: 0.25,
            iou_threshold: 0.45,
            allowed_classes: vec![2, 5, 7],
            max_candidates: 100,
            min_vehicle_size: 50,
        }
    }
}

impl DetectorConfig {
    /// Validates the configuration parameters.
    pub fn validate(&self) -> Result<(), AnprError> {
        validate_range(self.confidence_threshold, 0.0, 1.0, "confidence_threshold")?;
        validate_range(self.iou_threshold, 0.0, 1.0, "iou_threshold")?;
        validate_positive(self.input_size, "input_size")?;
        validate_positive(self.max_candidates, "max_candidates")?;
        if self.allowed_classes.is_empty() {
            return Err(AnprError::config_error(
                "allowed_classes must name at least one class id",
            ));
        }
        Ok(())
    }
}

/// Configuration for the plate localization stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LocatorConfig {
    /// Square canvas side fed to the plate detector model.
    pub input_size: u32,
    /// Per-pixel probability threshold on the heatmap.
    pub score_threshold: f32,
    /// Minimum count of above-threshold pixels; below this the region is
    /// treated as absent (noise gate).
    pub min_region_pixels: usize,
}

impl Default for LocatorConfig {
    fn default() -> Self {
        Self {
            input_size: 640,
            score_threshold: 0.3,
            min_region_pixels: 50,
        }
    }
}

impl LocatorConfig {
    /// Validates the configuration parameters.
    pub fn validate(&self) -> Result<(), AnprError> {
        validate_range(self.score_threshold, 0.0, 1.0, "score_threshold")?;
        validate_positive(self.input_size, "input_size")?;
        Ok(())
    }
}

/// Configuration for the text recognition stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReaderConfig {
    /// Model input shape as [channels, height, width].
    pub input_shape: [usize; 3],
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            input_shape: [3, 48, 320],
        }
    }
}

impl ReaderConfig {
    /// Validates the configuration parameters.
    pub fn validate(&self) -> Result<(), AnprError> {
        let [c, h, w] = self.input_shape;
        if c != 3 {
            return Err(AnprError::config_error(format!(
                "input_shape expects 3 channels, got {}",
                c
            )));
        }
        validate_positive(h, "input_shape height")?;
        validate_positive(w, "input_shape width")?;
        Ok(())
    }
}

/// Margin and expansion policy applied while remapping between crop spaces.
///
/// The defaults are field-tuned values carried over from the deployed system;
/// they have no analytical derivation and are exposed here precisely so they
/// can be re-tuned per site.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RemapConfig {
    /// Fraction of the vehicle box added on each side before searching for
    /// the plate (detectors crop tightly; plates sit at the box edge).
    pub vehicle_margin: f32,
    /// Width factor applied around the plate-region center (the heatmap
    /// extractor systematically under-reports text extent).
    pub plate_expand_w: f32,
    /// Height factor applied around the plate-region center.
    pub plate_expand_h: f32,
    /// Expanded plates at least this wide relative to the vehicle crop are
    /// treated as anomalous and dropped.
    pub max_plate_width_ratio: f32,
}

impl Default for RemapConfig {
    fn default() -> Self {
        Self {
            vehicle_margin: 0.25,
            plate_expand_w: 1.8,
            plate_expand_h: 2.0,
            max_plate_width_ratio: 0.9,
        }
    }
}

impl RemapConfig {
    /// Validates the configuration parameters.
    pub fn validate(&self) -> Result<(), AnprError> {
        validate_range(self.vehicle_margin, 0.0, 1.0, "vehicle_margin")?;
        validate_positive(self.plate_expand_w, "plate_expand_w")?;
        validate_positive(self.plate_expand_h, "plate_expand_h")?;
        validate_range(self.max_plate_width_ratio, 0.0, 1.0, "max_plate_width_ratio")?;
        Ok(())
    }
}

/// Thresholds for the fraud screening stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FraudConfig {
    /// OCR confidences below this are rejected outright.
    pub confidence_floor: f32,
    /// Image-quality scores below this are rejected.
    pub quality_floor: f32,
    /// Lower bound of the mean-brightness band considered good quality.
    pub brightness_low: f32,
    /// Upper bound of the mean-brightness band considered good quality.
    pub brightness_high: f32,
}

impl Default for FraudConfig {
    fn default() -> Self {
        Self {
            confidence_floor: 0.5,
            quality_floor: 0.5,
            brightness_low: 0.3,
            brightness_high: 0.7,
        }
    }
}

impl FraudConfig {
    /// Validates the configuration parameters.
    pub fn validate(&self) -> Result<(), AnprError> {
        validate_range(self.confidence_floor, 0.0, 1.0, "confidence_floor")?;
        validate_range(self.quality_floor, 0.0, 1.0, "quality_floor")?;
        validate_range(self.brightness_low, 0.0, 1.0, "brightness_low")?;
        validate_range(self.brightness_high, 0.0, 1.0, "brightness_high")?;
        if self.brightness_low >= self.brightness_high {
            return Err(AnprError::config_error(format!(
                "brightness band is empty: [{}, {}]",
                self.brightness_low, self.brightness_high
            )));
        }
        Ok(())
    }
}

/// Top-level pipeline configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Vehicle detection stage.
    pub detector: DetectorConfig,
    /// Plate localization stage.
    pub locator: LocatorConfig,
    /// Text recognition stage.
    pub reader: ReaderConfig,
    /// Crop-space remapping policy.
    pub remap: RemapConfig,
    /// Fraud screening thresholds.
    pub fraud: FraudConfig,
    /// Maximum accepted results per frame.
    pub max_results: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            detector: DetectorConfig::default(),
            locator: LocatorConfig::default(),
            reader: ReaderConfig::default(),
            remap: RemapConfig::default(),
            fraud: FraudConfig::default(),
            max_results: 5,
        }
    }
}

impl PipelineConfig {
    /// Validates every stage configuration.
    pub fn validate(&self) -> Result<(), AnprError> {
        self.detector.validate()?;
        self.locator.validate()?;
        self.reader.validate()?;
        self.remap.validate()?;
        self.fraud.validate()?;
        validate_positive(self.max_results, "max_results")?;
        Ok(())
    }
}

/// File locations for the three models and the OCR dictionary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelPaths {
    /// Vehicle detector ONNX model.
    pub vehicle_model: PathBuf,
    /// Plate detector ONNX model.
    pub plate_model: PathBuf,
    /// Text recognition ONNX model.
    pub ocr_model: PathBuf,
    /// Character dictionary, one symbol per line.
    pub dictionary: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        assert!(PipelineConfig::default().validate().is_ok());
    }

    #[test]
    fn test_bad_threshold_rejected() {
        let config = DetectorConfig {
            confidence_threshold: 1.5,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_empty_brightness_band_rejected() {
        let config = FraudConfig {
            brightness_low: 0.7,
            brightness_high: 0.3,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_json_round_trip() {
        let config = PipelineConfig {
            max_results: 3,
            ..Default::default()
        };
        let json = serde_json::to_string(&config).unwrap();
        let parsed: PipelineConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.max_results, 3);
        assert_eq!(parsed.detector.input_size, 640);
    }
}
