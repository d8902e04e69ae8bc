//! Utility functions for the recognition pipeline.

pub mod crop;
pub mod dict;

pub use crop::crop_frame;
pub use dict::Dictionary;
