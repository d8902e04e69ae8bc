//! Per-frame pipeline orchestration.
//!
//! [`GatePipeline`] is the explicit context object that owns the three model
//! stages (the reader holds the shared dictionary) and the fraud scorer;
//! there is no process-wide state. Processing is single-threaded and synchronous: each
//! stage runs to completion before the next, and per-frame buffers are owned
//! by the stage that created them and dropped on the way out, so a
//! mid-pipeline skip can never leak a crop.
//!
//! Failures are local to the candidate that produced them: a bad vehicle box,
//! an absent plate region, or an ambiguous recognizer output logs and skips
//! that candidate without disturbing the rest of the frame.

use crate::core::{
    AnprError, InferenceEngine, ModelPaths, OrtEngine, PipelineConfig, validate_image_dims,
};
use crate::domain::{DetectionResult, FraudScorer, PlateCandidate, clean_plate_text};
use crate::models::{
    PlateLocator, PlateLocatorBuilder, PlateReader, PlateReaderBuilder, VehicleDetector,
    VehicleDetectorBuilder,
};
use crate::processors::{CropTransform, expand_plate_box, expand_vehicle_box};
use crate::utils::{Dictionary, crop_frame};
use image::RgbImage;
use std::sync::Arc;
use std::time::SystemTime;
use tracing::{debug, warn};

/// The full detection-and-recognition pipeline for one camera.
pub struct GatePipeline {
    detector: VehicleDetector,
    locator: PlateLocator,
    reader: PlateReader,
    fraud: FraudScorer,
    config: PipelineConfig,
}

impl std::fmt::Debug for GatePipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatePipeline")
            .field("config", &self.config)
            .finish()
    }
}

impl GatePipeline {
    /// Returns a builder with default configuration.
    pub fn builder() -> GatePipelineBuilder {
        GatePipelineBuilder::new()
    }

    /// The active configuration.
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Processes one frame: vehicle detection, per-vehicle plate location,
    /// recognition, and fraud screening.
    ///
    /// The result list is capped at `config.max_results` and every box in it
    /// is in frame-global pixel coordinates.
    ///
    /// # Errors
    ///
    /// Only frame-level failures (zero-sized frame, vehicle-detector
    /// inference failure) surface as errors; per-candidate failures are
    /// logged and skipped.
    pub fn process_frame(
        &self,
        frame: &RgbImage,
        timestamp: SystemTime,
    ) -> Result<Vec<DetectionResult>, AnprError> {
        let (frame_w, frame_h) = frame.dimensions();
        validate_image_dims(frame_w, frame_h, "process_frame")?;

        let (boxes, scale) = self.detector.forward(frame)?;
        debug!("frame: {} vehicle candidates after NMS", boxes.len());
        let to_frame = CropTransform::root(scale.scale);

        let mut results = Vec::new();
        for scored in &boxes {
            if results.len() >= self.config.max_results {
                break;
            }

            let vehicle_box = to_frame.to_frame(&scored.rect);
            if vehicle_box.width() < self.config.detector.min_vehicle_size as f32
                || vehicle_box.height() < self.config.detector.min_vehicle_size as f32
            {
                debug!(
                    "skipping {:.0}x{:.0} vehicle below minimum size",
                    vehicle_box.width(),
                    vehicle_box.height()
                );
                continue;
            }

            // Plates often sit at the very edge of a tight detection; widen
            // the box before searching inside it.
            let expanded_vehicle = expand_vehicle_box(
                &vehicle_box,
                self.config.remap.vehicle_margin,
                frame_w,
                frame_h,
            );
            debug!(
                "vehicle crop: ({:.0}, {:.0})-({:.0}, {:.0}) conf {:.2}",
                expanded_vehicle.x1,
                expanded_vehicle.y1,
                expanded_vehicle.x2,
                expanded_vehicle.y2,
                scored.confidence
            );

            let vehicle_crop = match crop_frame(frame, &expanded_vehicle) {
                Ok(crop) => crop,
                Err(e) => {
                    warn!("vehicle crop failed: {}", e);
                    continue;
                }
            };

            let (region, locator_scale) = match self.locator.forward(&vehicle_crop) {
                Ok(output) => output,
                Err(e) => {
                    warn!("plate localization failed: {}", e);
                    continue;
                }
            };
            let Some(region) = region else {
                debug!("no confident plate region in vehicle crop");
                continue;
            };

            // Canvas -> vehicle-crop -> frame; the crop offset is already
            // frame-global, so one transform covers both hops.
            let crop_to_frame = CropTransform::for_crop(
                expanded_vehicle.x1,
                expanded_vehicle.y1,
                locator_scale.scale,
            );
            let plate_box = crop_to_frame.region_to_frame(&region);

            // The heatmap region under-covers the painted text; inflate it
            // before cropping for recognition.
            let expanded_plate = expand_plate_box(
                &plate_box,
                self.config.remap.plate_expand_w,
                self.config.remap.plate_expand_h,
                frame_w,
                frame_h,
            );

            // A plate spanning most of the vehicle is not a plate.
            if expanded_plate.width()
                >= expanded_vehicle.width() * self.config.remap.max_plate_width_ratio
            {
                warn!(
                    "plate width {:.0} is anomalous for a {:.0} wide vehicle, dropping candidate",
                    expanded_plate.width(),
                    expanded_vehicle.width()
                );
                continue;
            }

            let plate_crop = match crop_frame(frame, &expanded_plate) {
                Ok(crop) => crop,
                Err(e) => {
                    warn!("plate crop failed: {}", e);
                    continue;
                }
            };

            let decoded = match self.reader.forward(&plate_crop) {
                Ok(decoded) => decoded,
                Err(e) => {
                    warn!("plate recognition failed: {}", e);
                    continue;
                }
            };

            let candidate = PlateCandidate {
                raw_text: decoded.text,
                confidence: decoded.confidence,
                vehicle_box: expanded_vehicle,
                plate_box: expanded_plate,
            };

            let cleaned = clean_plate_text(&candidate.raw_text);
            let verdict =
                self.fraud
                    .evaluate(&plate_crop, candidate.confidence, cleaned.valid);
            debug!(
                "plate '{}' conf {:.2} fraud={} ({})",
                cleaned.text, candidate.confidence, verdict.is_fraud, verdict.reason
            );

            results.push(DetectionResult {
                plate_text: cleaned.text,
                confidence: candidate.confidence,
                vehicle_box: candidate.vehicle_box,
                plate_box: candidate.plate_box,
                timestamp,
                is_fraud: verdict.is_fraud,
                fraud_reason: verdict.reason,
            });
        }

        Ok(results)
    }
}

/// Builder for [`GatePipeline`].
pub struct GatePipelineBuilder {
    config: PipelineConfig,
    detector_classes: usize,
}

impl GatePipelineBuilder {
    /// Creates a builder with default configuration.
    pub fn new() -> Self {
        Self {
            config: PipelineConfig::default(),
            detector_classes: 80,
        }
    }

    /// Sets the pipeline configuration.
    pub fn config(mut self, config: PipelineConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the vehicle detector's class count.
    pub fn detector_classes(mut self, classes: usize) -> Self {
        self.detector_classes = classes;
        self
    }

    /// Builds the pipeline around caller-provided inference engines and a
    /// loaded dictionary.
    pub fn build(
        self,
        vehicle_engine: Box<dyn InferenceEngine>,
        plate_engine: Box<dyn InferenceEngine>,
        ocr_engine: Box<dyn InferenceEngine>,
        dictionary: Arc<Dictionary>,
    ) -> Result<GatePipeline, AnprError> {
        self.config.validate()?;

        let detector = VehicleDetectorBuilder::new()
            .config(self.config.detector.clone())
            .num_classes(self.detector_classes)
            .build(vehicle_engine)?;
        let locator = PlateLocatorBuilder::new()
            .config(self.config.locator.clone())
            .build(plate_engine)?;
        let reader = PlateReaderBuilder::new()
            .config(self.config.reader.clone())
            .dictionary(dictionary)
            .build(ocr_engine)?;
        let fraud = FraudScorer::new(self.config.fraud.clone());

        Ok(GatePipeline {
            detector,
            locator,
            reader,
            fraud,
            config: self.config,
        })
    }

    /// Builds the pipeline by loading the three ONNX models and the
    /// dictionary from disk.
    pub fn build_from_paths(self, paths: &ModelPaths) -> Result<GatePipeline, AnprError> {
        let dictionary = Arc::new(Dictionary::load(&paths.dictionary)?);
        let vehicle = OrtEngine::from_file(&paths.vehicle_model, "vehicle_detector")?;
        let plate = OrtEngine::from_file(&paths.plate_model, "plate_locator")?;
        let ocr = OrtEngine::from_file(&paths.ocr_model, "plate_reader")?;
        self.build(
            Box::new(vehicle),
            Box::new(plate),
            Box::new(ocr),
            dictionary,
        )
    }
}

impl Default for GatePipelineBuilder {
    fn default() -> Self {
        Self::new()
    }
}
