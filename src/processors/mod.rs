//! Tensor and image post-processing for the recognition pipeline.
//!
//! # Modules
//!
//! * `preprocess` - Letterbox/stretch resizing and normalization into planar tensors
//! * `detection` - Anchor-grid decoding and non-maximum suppression
//! * `heatmap` - Probability-map region extraction
//! * `remap` - Coordinate remapping between crop spaces and margin expansion
//! * `ctc` - Greedy CTC sequence decoding
//! * `geometry` - Box and region primitives with coordinate-space typing

pub mod ctc;
pub mod detection;
pub mod geometry;
pub mod heatmap;
pub mod preprocess;
pub mod remap;

pub use ctc::{CtcDecoder, DecodedText, KNOWN_VOCAB_SIZES, resolve_class_count};
pub use detection::DetectionDecoder;
pub use geometry::{CanvasBox, CanvasRegion, FrameBox, ScoredBox, iou};
pub use heatmap::HeatmapExtractor;
pub use preprocess::{LetterboxResize, LetterboxScale, NormalizeImage, StretchResize};
pub use remap::{CropTransform, expand_plate_box, expand_vehicle_box};
