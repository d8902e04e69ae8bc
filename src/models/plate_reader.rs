//! Plate text recognition model.
//!
//! A CRNN-style recognizer over the expanded plate crop. The input is
//! stretched to the model's fixed shape and normalized to [-1, 1]
//! (`(x / 255 - 0.5) / 0.5`), and the output sequence is decoded with greedy
//! CTC against the shared dictionary.

use crate::core::{AnprError, InferenceEngine, ReaderConfig, Tensor4D};
use crate::processors::{CtcDecoder, DecodedText, NormalizeImage, StretchResize};
use crate::utils::Dictionary;
use image::RgbImage;
use std::sync::Arc;

/// Plate reader: stretch resize + signed-unit normalization + CTC decode.
pub struct PlateReader {
    engine: Box<dyn InferenceEngine>,
    resizer: StretchResize,
    normalizer: NormalizeImage,
    decoder: CtcDecoder,
}

impl std::fmt::Debug for PlateReader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlateReader")
            .field("dictionary_len", &self.decoder.dictionary().len())
            .finish()
    }
}

impl PlateReader {
    /// Preprocesses a plate crop into the recognizer's input tensor.
    pub fn preprocess(&self, crop: &RgbImage) -> Result<Tensor4D, AnprError> {
        let resized = self.resizer.apply(crop)?;
        self.normalizer.to_tensor(&resized)
    }

    /// Runs inference on the preprocessed tensor.
    pub fn infer(&self, tensor: &Tensor4D) -> Result<Vec<f32>, AnprError> {
        self.engine.run(tensor)
    }

    /// Decodes the raw sequence output into text.
    ///
    /// The class count is resolved from the buffer size; an unresolvable size
    /// is an error the caller surfaces as a warning and skip, never a guess.
    pub fn postprocess(&self, output: &[f32]) -> Result<DecodedText, AnprError> {
        self.decoder.decode(output)
    }

    /// Runs the complete forward pass: preprocess -> infer -> postprocess.
    pub fn forward(&self, crop: &RgbImage) -> Result<DecodedText, AnprError> {
        let tensor = self.preprocess(crop)?;
        let output = self.infer(&tensor)?;
        self.postprocess(&output)
    }
}

/// Builder for the plate reader.
pub struct PlateReaderBuilder {
    config: ReaderConfig,
    dictionary: Option<Arc<Dictionary>>,
}

impl PlateReaderBuilder {
    /// Creates a builder with default settings.
    pub fn new() -> Self {
        Self {
            config: ReaderConfig::default(),
            dictionary: None,
        }
    }

    /// Sets the recognition configuration.
    pub fn config(mut self, config: ReaderConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the shared character dictionary.
    pub fn dictionary(mut self, dictionary: Arc<Dictionary>) -> Self {
        self.dictionary = Some(dictionary);
        self
    }

    /// Builds the reader around an inference engine.
    ///
    /// # Errors
    ///
    /// Returns `AnprError::ConfigError` when no dictionary was provided;
    /// recognition cannot start without one.
    pub fn build(self, engine: Box<dyn InferenceEngine>) -> Result<PlateReader, AnprError> {
        self.config.validate()?;
        let dictionary = self
            .dictionary
            .ok_or_else(|| AnprError::config_error("plate reader requires a character dictionary"))?;

        let [_c, h, w] = self.config.input_shape;
        Ok(PlateReader {
            engine,
            resizer: StretchResize::new(w as u32, h as u32),
            normalizer: NormalizeImage::signed_unit(),
            decoder: CtcDecoder::new(dictionary),
        })
    }
}

impl Default for PlateReaderBuilder {
    fn default() -> Self {
        Self::new()
    }
}
