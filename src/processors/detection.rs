//! Detection decoding and non-maximum suppression.
//!
//! Turns the raw anchor-grid output of the vehicle detector into a small,
//! deduplicated list of scored boxes in canvas-local coordinates. The raw
//! layout is `anchors x (4 + 1 + num_classes)` with center-form geometry and
//! unactivated objectness/class logits.

use crate::core::{AnprError, DetectorConfig};
use crate::processors::geometry::{CanvasBox, ScoredBox, iou};
use tracing::debug;

#[inline]
fn sigmoid(x: f32) -> f32 {
    1.0 / (1.0 + (-x).exp())
}

/// Decoder for anchor-grid detector output.
#[derive(Debug, Clone)]
pub struct DetectionDecoder {
    confidence_threshold: f32,
    iou_threshold: f32,
    allowed_classes: Vec<usize>,
    max_candidates: usize,
    num_classes: usize,
}

impl DetectionDecoder {
    /// Creates a decoder from the detector configuration.
    pub fn new(config: &DetectorConfig, num_classes: usize) -> Self {
        Self {
            confidence_threshold: config.confidence_threshold,
            iou_threshold: config.iou_threshold,
            allowed_classes: config.allowed_classes.clone(),
            max_candidates: config.max_candidates,
            num_classes,
        }
    }

    /// Row stride in the raw output: 4 box terms, 1 objectness, N classes.
    #[inline]
    fn stride(&self) -> usize {
        5 + self.num_classes
    }

    /// Decodes raw model output into thresholded candidates and deduplicates
    /// them with NMS.
    ///
    /// `content_w`/`content_h` bound the real (non-padding) region of the
    /// letterboxed canvas; detections are clamped against it and boxes left
    /// degenerate by the clamp are dropped.
    ///
    /// # Errors
    ///
    /// Returns `AnprError::InvalidInput` when the buffer length is not a
    /// multiple of the row stride.
    pub fn decode(
        &self,
        output: &[f32],
        content_w: f32,
        content_h: f32,
    ) -> Result<Vec<ScoredBox>, AnprError> {
        let stride = self.stride();
        if output.is_empty() || output.len() % stride != 0 {
            return Err(AnprError::invalid_input(format!(
                "detector output length {} is not a multiple of row stride {}",
                output.len(),
                stride
            )));
        }

        let mut candidates = Vec::new();
        for row in output.chunks_exact(stride) {
            if candidates.len() >= self.max_candidates {
                break;
            }

            let objectness = sigmoid(row[4]);
            if objectness < self.confidence_threshold {
                continue;
            }

            let mut best_class = 0usize;
            let mut best_prob = f32::MIN;
            for (class_id, &logit) in row[5..].iter().enumerate() {
                if logit > best_prob {
                    best_prob = logit;
                    best_class = class_id;
                }
            }
            let score = objectness * sigmoid(best_prob);
            if score < self.confidence_threshold || !self.allowed_classes.contains(&best_class) {
                continue;
            }

            let (cx, cy, w, h) = (row[0], row[1], row[2], row[3]);
            let rect = CanvasBox::new(cx - w / 2.0, cy - h / 2.0, cx + w / 2.0, cy + h / 2.0)
                .clamp_to(content_w, content_h);
            if rect.area() <= 0.0 {
                continue;
            }

            candidates.push(ScoredBox {
                rect,
                confidence: score,
                class_id: best_class,
            });
        }

        let kept = self.nms(candidates);
        debug!("detection decode kept {} boxes after NMS", kept.len());
        Ok(kept)
    }

    /// Greedy non-maximum suppression.
    ///
    /// The sort is stable, so equal scores keep their input order and the
    /// output is reproducible for a given tensor.
    fn nms(&self, mut candidates: Vec<ScoredBox>) -> Vec<ScoredBox> {
        candidates.sort_by(|a, b| {
            b.confidence
                .partial_cmp(&a.confidence)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        let mut suppressed = vec![false; candidates.len()];
        let mut kept = Vec::new();
        for i in 0..candidates.len() {
            if suppressed[i] {
                continue;
            }
            kept.push(candidates[i]);
            for j in (i + 1)..candidates.len() {
                if !suppressed[j]
                    && iou(&candidates[i].rect, &candidates[j].rect) > self.iou_threshold
                {
                    suppressed[j] = true;
                }
            }
        }
        kept
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decoder() -> DetectionDecoder {
        DetectionDecoder::new(
            &DetectorConfig {
                confidence_threshold: 0.5,
                allowed_classes: vec![0, 2],
                ..Default::default()
            },
            8,
        )
    }

    /// Builds one raw output row: center-form box, objectness logit, class logits.
    fn row(cx: f32, cy: f32, w: f32, h: f32, obj_logit: f32, class_id: usize) -> Vec<f32> {
        let mut r = vec![cx, cy, w, h, obj_logit];
        let mut classes = vec![-10.0f32; 8];
        classes[class_id] = 10.0;
        r.extend(classes);
        r
    }

    #[test]
    fn test_decode_accepts_confident_allowed_class() {
        let d = decoder();
        let output = row(100.0, 100.0, 40.0, 40.0, 8.0, 2);
        let boxes = d.decode(&output, 640.0, 640.0).unwrap();
        assert_eq!(boxes.len(), 1);
        assert_eq!(boxes[0].class_id, 2);
        assert!((boxes[0].rect.x1 - 80.0).abs() < 1e-3);
        assert!((boxes[0].rect.y2 - 120.0).abs() < 1e-3);
    }

    #[test]
    fn test_decode_skips_low_objectness() {
        let d = decoder();
        let output = row(100.0, 100.0, 40.0, 40.0, -8.0, 2);
        assert!(d.decode(&output, 640.0, 640.0).unwrap().is_empty());
    }

    #[test]
    fn test_decode_skips_disallowed_class() {
        let d = decoder();
        let output = row(100.0, 100.0, 40.0, 40.0, 8.0, 5);
        assert!(d.decode(&output, 640.0, 640.0).unwrap().is_empty());
    }

    #[test]
    fn test_decode_drops_box_fully_in_padding() {
        let d = decoder();
        // Top edge below the 480px content region of a 640 canvas.
        let output = row(320.0, 560.0, 40.0, 40.0, 8.0, 2);
        assert!(d.decode(&output, 640.0, 480.0).unwrap().is_empty());
    }

    #[test]
    fn test_decode_rejects_misaligned_buffer() {
        let d = decoder();
        assert!(d.decode(&[0.0; 7], 640.0, 640.0).is_err());
    }

    #[test]
    fn test_nms_no_surviving_pair_overlaps() {
        let d = decoder();
        let mut output = Vec::new();
        for i in 0..12 {
            let offset = (i % 4) as f32 * 6.0;
            output.extend(row(
                100.0 + offset,
                100.0 + offset,
                50.0,
                50.0,
                4.0 + (i % 3) as f32,
                2,
            ));
        }
        output.extend(row(400.0, 400.0, 50.0, 50.0, 6.0, 2));

        let kept = d.decode(&output, 640.0, 640.0).unwrap();
        assert!(!kept.is_empty());
        for i in 0..kept.len() {
            for j in (i + 1)..kept.len() {
                assert!(
                    iou(&kept[i].rect, &kept[j].rect) <= 0.45,
                    "surviving boxes {} and {} overlap",
                    i,
                    j
                );
            }
        }
    }

    #[test]
    fn test_nms_tie_breaks_by_input_order() {
        let d = decoder();
        // Two identical-score overlapping boxes; the first-seen one must win.
        let mut output = row(100.0, 100.0, 50.0, 50.0, 8.0, 2);
        output.extend(row(104.0, 100.0, 50.0, 50.0, 8.0, 2));
        let kept = d.decode(&output, 640.0, 640.0).unwrap();
        assert_eq!(kept.len(), 1);
        assert!((kept[0].rect.x1 - 75.0).abs() < 1e-3);
    }
}
