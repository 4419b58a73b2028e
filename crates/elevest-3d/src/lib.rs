#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// Pinhole camera matrices and projection matrices.
pub mod camera;

/// Elevation hypotheses expanded into camera poses.
pub mod hypothesis;

/// Operations on 3D points.
pub mod ops;

/// Look-at pose construction on a viewing sphere.
pub mod pose;

/// Linear triangulation of 3D points.
pub mod triangulation;
