//! Plate text cleanup and format rules.
//!
//! Raw CTC output picks up separator glyphs and systematic character
//! confusions. Cleanup runs in a fixed order: separator stripping, then
//! positional confusion correction, then format validation against the
//! mainland plate convention (a province marker followed by 6 to 8
//! alphanumerics).

use once_cell::sync::Lazy;
use std::collections::HashSet;
use tracing::debug;

/// Sentinel substituted when a rejected candidate has no readable text at all.
pub const UNRECOGNIZED_PLATE: &str = "无法识别";

/// Province abbreviations that may open a plate number.
static REGION_MARKERS: Lazy<HashSet<char>> = Lazy::new(|| {
    "京津晋冀蒙辽吉黑沪苏浙皖闽赣鲁豫鄂湘粤桂琼川贵云藏陕甘青宁新渝"
        .chars()
        .collect()
});

/// Characters the recognizer emits around plate fields that are never part of
/// the registration itself.
const SEPARATORS: [char; 4] = ['.', '-', ' ', '\u{00B7}'];

/// Cleanup outcome for one decoded candidate.
#[derive(Debug, Clone)]
pub struct CleanedPlate {
    /// The validated plate number, or the raw decode (or sentinel) when
    /// validation rejected the candidate.
    pub text: String,
    /// Whether the text passed format validation.
    pub valid: bool,
}

/// Removes separator glyphs the recognizer tends to emit between fields.
pub fn strip_separators(raw: &str) -> String {
    raw.chars().filter(|c| !SEPARATORS.contains(c)).collect()
}

/// Fixes the two systematic O/0 and I/1 confusions.
///
/// The slot right after the region marker holds a letter, so a `0` there is
/// really an `O`; every later slot belongs to the serial, which by convention
/// never contains `O` or `I`.
pub fn correct_confusions(text: &str) -> String {
    text.chars()
        .enumerate()
        .map(|(i, c)| match i {
            0 => c,
            1 => {
                if c == '0' {
                    'O'
                } else {
                    c
                }
            }
            _ => match c {
                'O' => '0',
                'I' => '1',
                other => other,
            },
        })
        .collect()
}

/// Validates the corrected text against the plate format.
///
/// The first character must be a whitelisted region marker; the rest is
/// filtered to ASCII alphanumerics (anything else is dropped silently); the
/// final length, marker included, must be 7 to 9 characters.
pub fn validate_format(text: &str) -> Option<String> {
    let mut chars = text.chars();
    let marker = chars.next()?;
    if !REGION_MARKERS.contains(&marker) {
        return None;
    }

    let mut cleaned = String::new();
    cleaned.push(marker);
    for c in chars {
        if c.is_ascii_alphanumeric() {
            cleaned.push(c);
        }
    }

    let len = cleaned.chars().count();
    if (7..=9).contains(&len) {
        Some(cleaned)
    } else {
        None
    }
}

/// Runs the full cleanup chain on a raw decode.
pub fn clean_plate_text(raw: &str) -> CleanedPlate {
    let stripped = strip_separators(raw);
    let corrected = correct_confusions(&stripped);

    match validate_format(&corrected) {
        Some(text) => CleanedPlate { text, valid: true },
        None => {
            debug!("plate text '{}' failed format validation", raw);
            let text = if raw.is_empty() {
                UNRECOGNIZED_PLATE.to_string()
            } else {
                raw.to_string()
            };
            CleanedPlate { text, valid: false }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_separators() {
        assert_eq!(strip_separators("京A·12-3 45."), "京A12345");
    }

    #[test]
    fn test_correct_confusions_marker_slot() {
        assert_eq!(correct_confusions("京012345"), "京O12345");
    }

    #[test]
    fn test_correct_confusions_serial_slots() {
        assert_eq!(correct_confusions("京AO2I45"), "京A02145");
    }

    #[test]
    fn test_validate_too_short_rejected() {
        assert!(validate_format("京A1234").is_none());
    }

    #[test]
    fn test_validate_unknown_marker_rejected() {
        assert!(validate_format("XA12345").is_none());
        assert!(validate_format("中A12345").is_none());
    }

    #[test]
    fn test_validate_standard_plate_passes() {
        assert_eq!(validate_format("京A12345").as_deref(), Some("京A12345"));
    }

    #[test]
    fn test_validate_eight_char_energy_plate_passes() {
        assert_eq!(validate_format("粤BD12345").as_deref(), Some("粤BD12345"));
    }

    #[test]
    fn test_validate_drops_non_alnum_silently() {
        // The stray glyph is dropped, the remainder still satisfies the length rule.
        assert_eq!(validate_format("京A1234#5").as_deref(), Some("京A12345"));
    }

    #[test]
    fn test_clean_plate_text_full_chain() {
        let cleaned = clean_plate_text("京A·1234O");
        assert!(cleaned.valid);
        assert_eq!(cleaned.text, "京A12340");
    }

    #[test]
    fn test_clean_plate_text_rejected_keeps_raw() {
        let cleaned = clean_plate_text("garbage");
        assert!(!cleaned.valid);
        assert_eq!(cleaned.text, "garbage");
    }

    #[test]
    fn test_clean_plate_text_empty_uses_sentinel() {
        let cleaned = clean_plate_text("");
        assert!(!cleaned.valid);
        assert_eq!(cleaned.text, UNRECOGNIZED_PLATE);
    }
}
