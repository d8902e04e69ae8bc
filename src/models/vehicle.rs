//! Vehicle detection model.
//!
//! Wraps an anchor-grid detector (YOLO-family) behind the inference seam and
//! handles preprocessing and postprocessing independently of the pipeline.

use crate::core::{AnprError, DetectorConfig, InferenceEngine, Tensor4D};
use crate::processors::{
    DetectionDecoder, LetterboxResize, LetterboxScale, NormalizeImage, ScoredBox,
};
use image::RgbImage;

/// Default class count of the deployed detector (COCO).
const DEFAULT_NUM_CLASSES: usize = 80;

/// Vehicle detector: letterbox + unit normalization + anchor decode + NMS.
pub struct VehicleDetector {
    engine: Box<dyn InferenceEngine>,
    resizer: LetterboxResize,
    normalizer: NormalizeImage,
    decoder: DetectionDecoder,
}

impl std::fmt::Debug for VehicleDetector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VehicleDetector")
            .field("resizer", &self.resizer)
            .finish()
    }
}

impl VehicleDetector {
    /// Preprocesses a frame into the detector's input tensor.
    pub fn preprocess(&self, frame: &RgbImage) -> Result<(Tensor4D, LetterboxScale), AnprError> {
        let (canvas, scale) = self.resizer.apply(frame)?;
        let tensor = self.normalizer.to_tensor(&canvas)?;
        Ok((tensor, scale))
    }

    /// Runs inference on the preprocessed tensor.
    pub fn infer(&self, tensor: &Tensor4D) -> Result<Vec<f32>, AnprError> {
        self.engine.run(tensor)
    }

    /// Decodes raw output into deduplicated canvas-local boxes.
    pub fn postprocess(
        &self,
        output: &[f32],
        scale: &LetterboxScale,
    ) -> Result<Vec<ScoredBox>, AnprError> {
        self.decoder
            .decode(output, scale.content_w as f32, scale.content_h as f32)
    }

    /// Runs the complete forward pass: preprocess -> infer -> postprocess.
    ///
    /// Returns the surviving boxes together with the letterbox scale needed
    /// to remap them into frame coordinates.
    pub fn forward(&self, frame: &RgbImage) -> Result<(Vec<ScoredBox>, LetterboxScale), AnprError> {
        let (tensor, scale) = self.preprocess(frame)?;
        let output = self.infer(&tensor)?;
        let boxes = self.postprocess(&output, &scale)?;
        Ok((boxes, scale))
    }
}

/// Builder for the vehicle detector.
pub struct VehicleDetectorBuilder {
    config: DetectorConfig,
    num_classes: usize,
}

impl VehicleDetectorBuilder {
    /// Creates a builder with default settings.
    pub fn new() -> Self {
        Self {
            config: DetectorConfig::default(),
            num_classes: DEFAULT_NUM_CLASSES,
        }
    }

    /// Sets the detection configuration.
    pub fn config(mut self, config: DetectorConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the model's class count (row stride is `5 + num_classes`).
    pub fn num_classes(mut self, num_classes: usize) -> Self {
        self.num_classes = num_classes;
        self
    }

    /// Builds the detector around an inference engine.
    pub fn build(self, engine: Box<dyn InferenceEngine>) -> Result<VehicleDetector, AnprError> {
        self.config.validate()?;
        Ok(VehicleDetector {
            engine,
            resizer: LetterboxResize::new(self.config.input_size, 0),
            normalizer: NormalizeImage::unit(),
            decoder: DetectionDecoder::new(&self.config, self.num_classes),
        })
    }
}

impl Default for VehicleDetectorBuilder {
    fn default() -> Self {
        Self::new()
    }
}
