//! Inference engine integration.
//!
//! The pipeline treats the neural-network runtime as an opaque collaborator:
//! a preprocessed planar tensor goes in, a flat float buffer comes out. Model
//! outputs are not self-describing (the OCR head's class count has to be
//! resolved by the caller), so the seam deliberately hands back raw data and
//! leaves interpretation to the decoding stages.

use crate::core::{AnprError, Tensor4D};
use ort::logging::LogLevel;
use ort::session::{Session, builder::GraphOptimizationLevel};
use ort::value::TensorRef;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::info;

/// Synchronous inference seam between the pipeline and the model runtime.
///
/// Implementations run a forward pass on a single `(1, C, H, W)` input tensor
/// and return the first output flattened to a `Vec<f32>`. Failures are
/// reported as error values; the pipeline skips the affected candidate and
/// continues.
pub trait InferenceEngine {
    /// Runs a forward pass and returns the flattened first output.
    fn run(&self, input: &Tensor4D) -> Result<Vec<f32>, AnprError>;
}

/// ONNX Runtime backed inference engine.
///
/// Wraps a single `ort` session behind a mutex; the per-frame pipeline is
/// sequential, so there is never contention in practice.
pub struct OrtEngine {
    session: Mutex<Session>,
    model_path: PathBuf,
    model_name: String,
    input_name: String,
}

impl std::fmt::Debug for OrtEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrtEngine")
            .field("model_name", &self.model_name)
            .field("model_path", &self.model_path)
            .finish()
    }
}

impl OrtEngine {
    /// Loads an ONNX model from disk with the default input name (`x`).
    ///
    /// # Arguments
    ///
    /// * `model_path` - Path to the ONNX model file.
    /// * `model_name` - Short name used in error and log messages.
    ///
    /// # Errors
    ///
    /// Returns `AnprError::Session` if the session cannot be created.
    pub fn from_file(model_path: impl AsRef<Path>, model_name: &str) -> Result<Self, AnprError> {
        Self::with_input_name(model_path, model_name, None)
    }

    /// Loads an ONNX model from disk, overriding the graph input name.
    pub fn with_input_name(
        model_path: impl AsRef<Path>,
        model_name: &str,
        input_name: Option<&str>,
    ) -> Result<Self, AnprError> {
        let path = model_path.as_ref();
        let session = Session::builder()?
            .with_log_level(LogLevel::Error)?
            .with_optimization_level(GraphOptimizationLevel::Level3)?
            .with_intra_threads(1)?
            .commit_from_file(path)?;

        info!("loaded model '{}' from {}", model_name, path.display());

        Ok(Self {
            session: Mutex::new(session),
            model_path: path.to_path_buf(),
            model_name: model_name.to_string(),
            input_name: input_name.unwrap_or("x").to_string(),
        })
    }

    /// Returns the model name associated with this engine.
    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    /// Returns the model path associated with this engine.
    pub fn model_path(&self) -> &Path {
        &self.model_path
    }
}

impl InferenceEngine for OrtEngine {
    fn run(&self, input: &Tensor4D) -> Result<Vec<f32>, AnprError> {
        let dims: Vec<i64> = input.shape().iter().map(|&d| d as i64).collect();
        let data = input.as_slice().ok_or_else(|| AnprError::InvalidInput {
            message: format!(
                "Model '{}': input tensor is not contiguous in memory",
                self.model_name
            ),
        })?;
        let tensor_ref =
            TensorRef::from_array_view((dims, data)).map_err(|e| AnprError::InvalidInput {
                message: format!("Model '{}': failed to create input tensor: {}", self.model_name, e),
            })?;

        let mut session = self.session.lock().map_err(|_| AnprError::InvalidInput {
            message: format!("Model '{}': failed to acquire session lock", self.model_name),
        })?;

        let output_name = session
            .outputs()
            .first()
            .map(|o| o.name().to_string())
            .ok_or_else(|| AnprError::InvalidInput {
                message: format!("Model '{}': model declares no outputs", self.model_name),
            })?;

        let outputs = session
            .run(ort::inputs![self.input_name.as_str() => tensor_ref])
            .map_err(|e| AnprError::Inference {
                model_name: self.model_name.clone(),
                context: format!("forward pass on input with shape {:?}", input.shape()),
                source: Box::new(e),
            })?;

        let (_shape, data) = outputs[output_name.as_str()]
            .try_extract_tensor::<f32>()
            .map_err(|e| AnprError::Inference {
                model_name: self.model_name.clone(),
                context: "extracting f32 output tensor".to_string(),
                source: Box::new(e),
            })?;

        Ok(data.to_vec())
    }
}
