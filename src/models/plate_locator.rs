//! Plate localization model.
//!
//! A DB-style text detector run over the expanded vehicle crop. Its output is
//! a per-pixel probability map at canvas resolution; postprocessing reduces
//! it to at most one rectangular region.

use crate::core::{AnprError, InferenceEngine, LocatorConfig, Tensor4D};
use crate::processors::{CanvasRegion, HeatmapExtractor, LetterboxResize, LetterboxScale, NormalizeImage};
use image::RgbImage;

/// Plate locator: letterbox + ImageNet normalization + heatmap extraction.
pub struct PlateLocator {
    engine: Box<dyn InferenceEngine>,
    resizer: LetterboxResize,
    normalizer: NormalizeImage,
    extractor: HeatmapExtractor,
    map_side: usize,
}

impl std::fmt::Debug for PlateLocator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlateLocator")
            .field("map_side", &self.map_side)
            .finish()
    }
}

impl PlateLocator {
    /// Preprocesses a vehicle crop into the locator's input tensor.
    pub fn preprocess(&self, crop: &RgbImage) -> Result<(Tensor4D, LetterboxScale), AnprError> {
        let (canvas, scale) = self.resizer.apply(crop)?;
        let tensor = self.normalizer.to_tensor(&canvas)?;
        Ok((tensor, scale))
    }

    /// Runs inference on the preprocessed tensor.
    pub fn infer(&self, tensor: &Tensor4D) -> Result<Vec<f32>, AnprError> {
        self.engine.run(tensor)
    }

    /// Reduces the probability map to the single best-guess region, if any.
    pub fn postprocess(&self, output: &[f32]) -> Result<Option<CanvasRegion>, AnprError> {
        self.extractor.extract(output, self.map_side, self.map_side)
    }

    /// Runs the complete forward pass: preprocess -> infer -> postprocess.
    ///
    /// `Ok((None, _))` means no confident text region, a normal outcome the
    /// caller handles by skipping this vehicle.
    pub fn forward(
        &self,
        crop: &RgbImage,
    ) -> Result<(Option<CanvasRegion>, LetterboxScale), AnprError> {
        let (tensor, scale) = self.preprocess(crop)?;
        let output = self.infer(&tensor)?;
        let region = self.postprocess(&output)?;
        Ok((region, scale))
    }
}

/// Builder for the plate locator.
pub struct PlateLocatorBuilder {
    config: LocatorConfig,
}

impl PlateLocatorBuilder {
    /// Creates a builder with default settings.
    pub fn new() -> Self {
        Self {
            config: LocatorConfig::default(),
        }
    }

    /// Sets the localization configuration.
    pub fn config(mut self, config: LocatorConfig) -> Self {
        self.config = config;
        self
    }

    /// Builds the locator around an inference engine.
    pub fn build(self, engine: Box<dyn InferenceEngine>) -> Result<PlateLocator, AnprError> {
        self.config.validate()?;
        Ok(PlateLocator {
            engine,
            resizer: LetterboxResize::new(self.config.input_size, 0),
            normalizer: NormalizeImage::imagenet(),
            extractor: HeatmapExtractor::new(
                self.config.score_threshold,
                self.config.min_region_pixels,
            ),
            map_side: self.config.input_size as usize,
        })
    }
}

impl Default for PlateLocatorBuilder {
    fn default() -> Self {
        Self::new()
    }
}
