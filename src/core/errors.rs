//! Error types for the plate recognition pipeline.
//!
//! This module defines the error enum shared by every stage of the pipeline,
//! from tensor preprocessing through fraud scoring, together with utility
//! constructors for building errors with appropriate context.

use thiserror::Error;

/// Enum representing different stages of processing in the recognition pipeline.
///
/// Used to identify which stage an error occurred in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProcessingStage {
    /// Error occurred during tensor operations.
    TensorOperation,
    /// Error occurred during image normalization.
    Normalization,
    /// Error occurred during image resizing.
    Resize,
    /// Error occurred during detection decoding.
    Detection,
    /// Error occurred during sequence decoding.
    SequenceDecode,
    /// Error occurred during post-processing.
    PostProcessing,
    /// Generic processing error.
    Generic,
}

impl std::fmt::Display for ProcessingStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProcessingStage::TensorOperation => write!(f, "tensor operation"),
            ProcessingStage::Normalization => write!(f, "normalization"),
            ProcessingStage::Resize => write!(f, "resize"),
            ProcessingStage::Detection => write!(f, "detection decoding"),
            ProcessingStage::SequenceDecode => write!(f, "sequence decoding"),
            ProcessingStage::PostProcessing => write!(f, "post-processing"),
            ProcessingStage::Generic => write!(f, "processing"),
        }
    }
}

/// Enum representing the errors that can occur in the recognition pipeline.
#[derive(Error, Debug)]
pub enum AnprError {
    /// Error occurred while loading an image.
    #[error("image load")]
    ImageLoad(#[source] image::ImageError),

    /// Error occurred during processing.
    #[error("{kind} failed: {context}")]
    Processing {
        /// The stage of processing where the error occurred.
        kind: ProcessingStage,
        /// Additional context about the error.
        context: String,
        /// The underlying error that caused this error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Error occurred during inference.
    #[error("inference with model '{model_name}': {context}")]
    Inference {
        /// Name of the model that failed.
        model_name: String,
        /// Additional context about the error.
        context: String,
        /// The underlying error that caused this error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Error indicating invalid input.
    #[error("invalid input: {message}")]
    InvalidInput {
        /// A message describing the invalid input.
        message: String,
    },

    /// Error indicating a configuration problem.
    #[error("configuration: {message}")]
    ConfigError {
        /// A message describing the configuration error.
        message: String,
    },

    /// Error from the ONNX Runtime session.
    #[error(transparent)]
    Session(#[from] ort::Error),

    /// Error from tensor operations.
    #[error("tensor operation")]
    Tensor(#[from] ndarray::ShapeError),

    /// IO error.
    #[error("io")]
    Io(#[from] std::io::Error),
}

impl AnprError {
    /// Creates an AnprError for a failed processing stage.
    pub fn processing_error(
        kind: ProcessingStage,
        context: &str,
        error: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Processing {
            kind,
            context: context.to_string(),
            source: Box::new(error),
        }
    }

    /// Creates an AnprError for tensor operations.
    pub fn tensor_operation(
        context: &str,
        error: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Processing {
            kind: ProcessingStage::TensorOperation,
            context: context.to_string(),
            source: Box::new(error),
        }
    }

    /// Creates an AnprError for invalid input.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// Creates an AnprError for configuration errors.
    pub fn config_error(message: impl Into<String>) -> Self {
        Self::ConfigError {
            message: message.into(),
        }
    }
}

impl From<image::ImageError> for AnprError {
    fn from(error: image::ImageError) -> Self {
        Self::ImageLoad(error)
    }
}

impl From<ort::Error<ort::session::builder::SessionBuilder>> for AnprError {
    fn from(error: ort::Error<ort::session::builder::SessionBuilder>) -> Self {
        Self::Session(ort::Error::from(error))
    }
}

/// Convenient result alias for pipeline operations.
pub type AnprResult<T> = Result<T, AnprError>;
