#![deny(missing_docs)]
#![doc = include_str!(concat!("../", env!("CARGO_PKG_README")))]

#[doc(inline)]
pub use elevest_3d as k3d;

#[doc(inline)]
pub use elevest_image as image;

#[doc(inline)]
pub use elevest_imgproc as imgproc;

/// Configuration of an estimation run.
pub mod config;

/// Pairwise correspondences and the ordered-pair match table.
pub mod correspondence;

/// Error types for the estimation pipeline.
pub mod error;

/// Reading and writing match files.
pub mod io;

/// Feature matcher interface and pairwise matching of views.
pub mod matcher;

/// High level estimation entry points.
pub mod pipeline;

/// Hypothesis scoring.
pub mod scoring;

/// Coarse-to-fine elevation search.
pub mod search;

/// Synthetic scenes with a known elevation.
pub mod synthetic;

pub use config::EstimatorConfig;
pub use correspondence::{Correspondence, MatchTable, PairwiseMatches};
pub use error::{BoxError, ElevationError};
pub use matcher::{compute_pairwise_matches, FeatureMatcher, MatcherOutput, MatchingParams, ViewImage};
pub use pipeline::{
    estimate_elevation, estimate_elevation_from_images, estimate_elevation_with_config,
    estimate_elevation_with_search,
};
pub use scoring::{ConsistencyScorer, ReprojectionScorer};
pub use search::{ElevationSearch, SearchParams};
