//! Frame acquisition seam.
//!
//! Camera I/O and colorspace conversion live outside this crate. The pipeline
//! only needs a way to pull the next RGB frame; everything about device
//! handles, buffer queues, and YUYV conversion belongs to the embedder.

use crate::core::AnprError;
use image::RgbImage;

/// Source of RGB frames for the pipeline.
///
/// `capture` may fail transiently (no frame ready yet); the embedding shell
/// decides whether and when to retry. The core never retries on its own.
pub trait FrameSource {
    /// Captures the next frame as an owned RGB buffer.
    fn capture(&mut self) -> Result<RgbImage, AnprError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Source that fails once before delivering, mimicking a camera with no
    /// frame ready yet.
    struct FlakySource {
        attempts: usize,
    }

    impl FrameSource for FlakySource {
        fn capture(&mut self) -> Result<RgbImage, AnprError> {
            self.attempts += 1;
            if self.attempts == 1 {
                Err(AnprError::invalid_input("no frame ready"))
            } else {
                Ok(RgbImage::new(640, 480))
            }
        }
    }

    #[test]
    fn test_transient_failure_then_frame() {
        let mut source = FlakySource { attempts: 0 };
        assert!(source.capture().is_err());
        let frame = source.capture().unwrap();
        assert_eq!(frame.dimensions(), (640, 480));
    }
}
