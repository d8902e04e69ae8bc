//! Heatmap region extraction for plate localization.
//!
//! The plate detector emits a per-pixel text-probability map. A single pass
//! accumulates the bounding box of every pixel above the threshold; if fewer
//! pixels fire than the noise floor, no region is reported. A rectangle is a
//! deliberate simplification here: no contour tracing or polygon fitting.

use crate::core::AnprError;
use crate::processors::geometry::CanvasRegion;

/// Extracts the single best-guess text region from a probability map.
#[derive(Debug, Clone)]
pub struct HeatmapExtractor {
    score_threshold: f32,
    min_pixels: usize,
}

impl HeatmapExtractor {
    /// Creates an extractor with the given pixel threshold and noise floor.
    pub fn new(score_threshold: f32, min_pixels: usize) -> Self {
        Self {
            score_threshold,
            min_pixels,
        }
    }

    /// Scans the map and returns the bounding region of confident pixels.
    ///
    /// Returns `Ok(None)` when fewer than `min_pixels` pixels clear the
    /// threshold. That is a normal no-detection outcome, not an error.
    ///
    /// # Errors
    ///
    /// Returns `AnprError::InvalidInput` when the buffer does not match
    /// `map_w * map_h`.
    pub fn extract(
        &self,
        map: &[f32],
        map_w: usize,
        map_h: usize,
    ) -> Result<Option<CanvasRegion>, AnprError> {
        if map.len() != map_w * map_h {
            return Err(AnprError::invalid_input(format!(
                "heatmap buffer has {} elements, expected {}x{}",
                map.len(),
                map_w,
                map_h
            )));
        }

        let mut min_x = usize::MAX;
        let mut min_y = usize::MAX;
        let mut max_x = 0usize;
        let mut max_y = 0usize;
        let mut count = 0usize;

        for y in 0..map_h {
            let row = &map[y * map_w..(y + 1) * map_w];
            for (x, &value) in row.iter().enumerate() {
                if value > self.score_threshold {
                    min_x = min_x.min(x);
                    min_y = min_y.min(y);
                    max_x = max_x.max(x);
                    max_y = max_y.max(y);
                    count += 1;
                }
            }
        }

        if count < self.min_pixels {
            return Ok(None);
        }

        Ok(Some(CanvasRegion {
            x: min_x as u32,
            y: min_y as u32,
            w: (max_x - min_x + 1) as u32,
            h: (max_y - min_y + 1) as u32,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map_with_block(
        map_w: usize,
        map_h: usize,
        x0: usize,
        y0: usize,
        w: usize,
        h: usize,
    ) -> Vec<f32> {
        let mut map = vec![0.0f32; map_w * map_h];
        for y in y0..y0 + h {
            for x in x0..x0 + w {
                map[y * map_w + x] = 0.9;
            }
        }
        map
    }

    #[test]
    fn test_extract_finds_block_bounds() {
        let extractor = HeatmapExtractor::new(0.3, 50);
        let map = map_with_block(160, 160, 40, 60, 30, 10);
        let region = extractor.extract(&map, 160, 160).unwrap().unwrap();
        assert_eq!(region, CanvasRegion { x: 40, y: 60, w: 30, h: 10 });
    }

    #[test]
    fn test_extract_below_floor_is_absent() {
        let extractor = HeatmapExtractor::new(0.3, 50);
        // 49 confident pixels scattered across the whole map.
        let mut map = vec![0.0f32; 160 * 160];
        for i in 0..49 {
            map[i * 520] = 0.9;
        }
        assert!(extractor.extract(&map, 160, 160).unwrap().is_none());
    }

    #[test]
    fn test_extract_empty_map_is_absent() {
        let extractor = HeatmapExtractor::new(0.3, 50);
        let map = vec![0.0f32; 160 * 160];
        assert!(extractor.extract(&map, 160, 160).unwrap().is_none());
    }

    #[test]
    fn test_extract_rejects_size_mismatch() {
        let extractor = HeatmapExtractor::new(0.3, 50);
        let map = vec![0.0f32; 100];
        assert!(extractor.extract(&map, 160, 160).is_err());
    }
}
