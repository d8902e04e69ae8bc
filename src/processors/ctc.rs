//! Greedy CTC decoding for plate text recognition.
//!
//! Converts the recognizer's `[seq_len, num_classes]` probability tensor into
//! a raw string: per-step argmax, blank (class 0) skipped, consecutive
//! repeats collapsed, surviving class ids mapped through the dictionary at
//! `class_id - 1`. No beam search.
//!
//! The raw output buffer does not carry its own shape, so the class count is
//! resolved by trial division against the vocabulary sizes the deployed
//! dictionaries use. An element count that matches none of them is reported
//! as an error rather than guessed at; a wrong stride would silently corrupt
//! every decoded character.

use crate::core::AnprError;
use crate::utils::Dictionary;
use std::sync::Arc;
use tracing::debug;

/// Vocabulary sizes (including the blank class) of the recognizer models this
/// system deploys: the Chinese PP-OCR vocabulary and the Latin one.
pub const KNOWN_VOCAB_SIZES: [usize; 2] = [6625, 97];

/// Resolves the class count of a flat recognizer output buffer.
///
/// # Errors
///
/// Returns `AnprError::InvalidInput` when the element count is not divisible
/// by any known vocabulary size.
pub fn resolve_class_count(element_count: usize) -> Result<usize, AnprError> {
    KNOWN_VOCAB_SIZES
        .iter()
        .copied()
        .find(|&classes| element_count > 0 && element_count % classes == 0)
        .ok_or_else(|| {
            AnprError::invalid_input(format!(
                "recognizer output of {} elements matches no known vocabulary size {:?}",
                element_count, KNOWN_VOCAB_SIZES
            ))
        })
}

/// Raw decode result before plate-format cleanup.
#[derive(Debug, Clone)]
pub struct DecodedText {
    /// Concatenated dictionary symbols.
    pub text: String,
    /// Mean probability of the emitted symbols; 0.0 when nothing was emitted.
    pub confidence: f32,
}

/// Greedy CTC decoder over a shared read-only dictionary.
#[derive(Debug, Clone)]
pub struct CtcDecoder {
    dictionary: Arc<Dictionary>,
}

impl CtcDecoder {
    /// Creates a decoder over the given dictionary.
    pub fn new(dictionary: Arc<Dictionary>) -> Self {
        Self { dictionary }
    }

    /// The dictionary backing this decoder.
    pub fn dictionary(&self) -> &Dictionary {
        &self.dictionary
    }

    /// Decodes a flat output buffer, resolving the class count first.
    pub fn decode(&self, output: &[f32]) -> Result<DecodedText, AnprError> {
        let num_classes = resolve_class_count(output.len())?;
        self.decode_with_class_count(output, num_classes)
    }

    /// Decodes a flat output buffer with a known class count.
    ///
    /// # Errors
    ///
    /// Returns `AnprError::InvalidInput` when the buffer length is not a
    /// multiple of `num_classes`.
    pub fn decode_with_class_count(
        &self,
        output: &[f32],
        num_classes: usize,
    ) -> Result<DecodedText, AnprError> {
        if num_classes == 0 || output.len() % num_classes != 0 {
            return Err(AnprError::invalid_input(format!(
                "recognizer output of {} elements is not a multiple of {} classes",
                output.len(),
                num_classes
            )));
        }

        let mut text = String::new();
        let mut emitted_probs = Vec::new();
        let mut last_index = usize::MAX;

        for step in output.chunks_exact(num_classes) {
            let mut max_index = 0usize;
            let mut max_score = f32::MIN;
            for (index, &score) in step.iter().enumerate() {
                if score > max_score {
                    max_score = score;
                    max_index = index;
                }
            }

            if max_index != 0 && max_index != last_index {
                match self.dictionary.symbol(max_index - 1) {
                    Some(symbol) => text.push_str(symbol),
                    // Model vocabulary larger than the loaded dictionary.
                    None => text.push('?'),
                }
                emitted_probs.push(max_score);
            }
            last_index = max_index;
        }

        let confidence = if emitted_probs.is_empty() {
            0.0
        } else {
            emitted_probs.iter().sum::<f32>() / emitted_probs.len() as f32
        };

        debug!(
            "CTC decode: {} steps, {} symbols emitted, mean confidence {:.3}",
            output.len() / num_classes,
            emitted_probs.len(),
            confidence
        );

        Ok(DecodedText { text, confidence })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decoder_with(symbols: &[&str]) -> CtcDecoder {
        let dict =
            Dictionary::from_symbols(symbols.iter().map(|s| s.to_string()).collect()).unwrap();
        CtcDecoder::new(Arc::new(dict))
    }

    /// Builds a [seq_len, num_classes] buffer whose per-step argmax follows
    /// `indices`, with the winning probability set to `prob`.
    fn output_for(indices: &[usize], num_classes: usize, prob: f32) -> Vec<f32> {
        let mut out = vec![0.01f32; indices.len() * num_classes];
        for (t, &idx) in indices.iter().enumerate() {
            out[t * num_classes + idx] = prob;
        }
        out
    }

    #[test]
    fn test_greedy_collapse() {
        let decoder = decoder_with(&["A", "B", "C", "D", "E"]);
        let output = output_for(&[0, 5, 5, 0, 3, 3, 3, 0], 6, 0.9);
        let decoded = decoder.decode_with_class_count(&output, 6).unwrap();
        assert_eq!(decoded.text, "EC");
        assert!((decoded.confidence - 0.9).abs() < 1e-6);
    }

    #[test]
    fn test_repeat_separated_by_blank_emits_twice() {
        let decoder = decoder_with(&["A", "B"]);
        let output = output_for(&[1, 0, 1], 3, 0.8);
        let decoded = decoder.decode_with_class_count(&output, 3).unwrap();
        assert_eq!(decoded.text, "AA");
    }

    #[test]
    fn test_all_blank_yields_empty_zero_confidence() {
        let decoder = decoder_with(&["A", "B"]);
        let output = output_for(&[0, 0, 0, 0], 3, 0.99);
        let decoded = decoder.decode_with_class_count(&output, 3).unwrap();
        assert!(decoded.text.is_empty());
        assert_eq!(decoded.confidence, 0.0);
    }

    #[test]
    fn test_out_of_dictionary_class_becomes_placeholder() {
        let decoder = decoder_with(&["A"]);
        let output = output_for(&[2], 3, 0.7);
        let decoded = decoder.decode_with_class_count(&output, 3).unwrap();
        assert_eq!(decoded.text, "?");
    }

    #[test]
    fn test_resolve_class_count_known_sizes() {
        assert_eq!(resolve_class_count(40 * 6625).unwrap(), 6625);
        assert_eq!(resolve_class_count(48 * 97).unwrap(), 97);
    }

    #[test]
    fn test_resolve_class_count_ambiguous_is_error() {
        assert!(resolve_class_count(1000).is_err());
        assert!(resolve_class_count(0).is_err());
    }

    #[test]
    fn test_misaligned_buffer_is_error() {
        let decoder = decoder_with(&["A"]);
        assert!(decoder.decode_with_class_count(&[0.0; 7], 3).is_err());
    }
}
