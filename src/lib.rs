//! # plategate
//!
//! A Rust license-plate recognition pipeline for unattended parking-gate
//! cameras, built around ONNX models: vehicle detection, plate localization,
//! text recognition, and fraud screening on every frame.
//!
//! ## Features
//!
//! - Multi-stage pipeline from camera frame to screened plate readings
//! - Letterbox preprocessing with exact coordinate remapping back to the frame
//! - Anchor-grid detection decoding with deterministic NMS
//! - Heatmap-based plate localization with a noise gate
//! - Greedy CTC decoding over a shared character dictionary
//! - Plate-format cleanup and ordered fraud screening rules
//! - ONNX Runtime integration behind a narrow inference seam
//!
//! ## Modules
//!
//! * [`core`] - Errors, configuration, inference and frame-source seams
//! * [`domain`] - Result types, plate-format rules, fraud screening
//! * [`models`] - Model wrappers for the three pipeline stages
//! * [`pipeline`] - Per-frame orchestration
//! * [`processors`] - Tensor and image post-processing
//! * [`utils`] - Dictionary loading and cropping helpers
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use plategate::prelude::*;
//! use std::time::SystemTime;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let paths = ModelPaths {
//!     vehicle_model: "models/vehicle_detector.onnx".into(),
//!     plate_model: "models/plate_detector.onnx".into(),
//!     ocr_model: "models/ppocr_rec.onnx".into(),
//!     dictionary: "models/ppocr_keys_v1.txt".into(),
//! };
//!
//! let pipeline = GatePipeline::builder()
//!     .config(PipelineConfig::default())
//!     .build_from_paths(&paths)?;
//!
//! let frame = image::open("frame.jpg")?.to_rgb8();
//! for result in pipeline.process_frame(&frame, SystemTime::now())? {
//!     println!(
//!         "{} (conf {:.2}, fraud: {} - {})",
//!         result.plate_text, result.confidence, result.is_fraud, result.fraud_reason
//!     );
//! }
//! # Ok(())
//! # }
//! ```

pub mod core;
pub mod domain;
pub mod models;
pub mod pipeline;
pub mod processors;
pub mod utils;

/// Prelude module for convenient imports.
///
/// Bring the essentials into scope with a single use statement:
///
/// ```rust
/// use plategate::prelude::*;
/// ```
pub mod prelude {
    pub use crate::core::{
        AnprError, AnprResult, FrameSource, InferenceEngine, ModelPaths, PipelineConfig,
    };
    pub use crate::domain::{DetectionResult, FraudVerdict};
    pub use crate::pipeline::{GatePipeline, GatePipelineBuilder};
    pub use crate::processors::FrameBox;
    pub use crate::utils::Dictionary;
}
