//! Domain types and rules for plate recognition.
//!
//! # Modules
//!
//! * `plate` - Text cleanup and the plate format convention
//! * `fraud` - Ordered fraud screening rules

pub mod fraud;
pub mod plate;

pub use fraud::{
    FraudScorer, FraudVerdict, REASON_INVALID_FORMAT, REASON_LOW_CONFIDENCE, REASON_NORMAL,
    REASON_POOR_QUALITY,
};
pub use plate::{CleanedPlate, UNRECOGNIZED_PLATE, clean_plate_text};

use crate::processors::geometry::FrameBox;
use serde::{Deserialize, Serialize};
use std::time::SystemTime;

/// A decoded plate before text cleanup and fraud screening.
#[derive(Debug, Clone)]
pub struct PlateCandidate {
    /// Raw CTC decode, pre-validation.
    pub raw_text: String,
    /// Mean OCR confidence.
    pub confidence: f32,
    /// Vehicle box in frame coordinates.
    pub vehicle_box: FrameBox,
    /// Plate box in frame coordinates.
    pub plate_box: FrameBox,
}

/// One accepted pipeline result for a frame.
///
/// Immutable once returned; the caller owns the result list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectionResult {
    /// Validated plate text, or the raw decode / unrecognized sentinel when
    /// validation rejected it.
    pub plate_text: String,
    /// OCR confidence of the decoded text.
    pub confidence: f32,
    /// Vehicle bounding box in frame-global pixel coordinates.
    pub vehicle_box: FrameBox,
    /// Plate bounding box in frame-global pixel coordinates.
    pub plate_box: FrameBox,
    /// Capture time of the source frame.
    pub timestamp: SystemTime,
    /// True when fraud screening rejected the candidate.
    pub is_fraud: bool,
    /// Reason string from the screening rules.
    pub fraud_reason: String,
}
