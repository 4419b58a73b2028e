#![deny(missing_docs)]
//! Image preprocessing for the elevation estimation pipeline

/// color transformations module.
pub mod color;

/// foreground masking module.
pub mod mask;

/// utilities for parallel processing.
pub mod parallel;

/// image resizing module.
pub mod resize;
