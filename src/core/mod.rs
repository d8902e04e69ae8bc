//! The core module of the recognition pipeline.
//!
//! This module contains the fundamental components shared by every stage:
//! - Configuration management
//! - Error handling
//! - Inference engine integration
//! - Frame source seam
//! - Input validation helpers
//!
//! It also provides re-exports of commonly used types for convenience.

pub mod config;
pub mod errors;
pub mod inference;
pub mod source;
pub mod validation;

pub use config::{
    DetectorConfig, FraudConfig, LocatorConfig, ModelPaths, PipelineConfig, ReaderConfig,
    RemapConfig,
};
pub use errors::{AnprError, AnprResult, ProcessingStage};
pub use inference::{InferenceEngine, OrtEngine};
pub use source::FrameSource;
pub use validation::{validate_image_dims, validate_positive, validate_range};

/// 2D tensor of f32 values.
pub type Tensor2D = ndarray::Array2<f32>;
/// 3D tensor of f32 values.
pub type Tensor3D = ndarray::Array3<f32>;
/// 4D tensor of f32 values (N, C, H, W).
pub type Tensor4D = ndarray::Array4<f32>;

/// Initializes the tracing subscriber for logging.
///
/// Sets up the tracing subscriber with environment filter and formatting
/// layer. Typically called once at application start.
pub fn init_tracing() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .init();
}
