use elevest_image::{ImageError, ImageSize};

/// Boxed error returned by external collaborators such as feature matchers.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors returned by the elevation estimation pipeline.
#[derive(thiserror::Error, Debug)]
pub enum ElevationError {
    /// A view pair has no correspondences; no elevation can be estimated.
    #[error("View pair ({view_a}, {view_b}) has no correspondences, could not estimate elevation")]
    InsufficientMatches {
        /// First view of the pair.
        view_a: usize,
        /// Second view of the pair.
        view_b: usize,
    },

    /// The correspondences of a view pair were never provided.
    #[error("Missing correspondences for view pair ({0}, {1})")]
    MissingViewPair(usize, usize),

    /// The view pair is not made of two distinct views below the view count.
    #[error("Invalid view pair ({0}, {1}), views must be distinct and below {2}")]
    InvalidViewPair(usize, usize, usize),

    /// The coarse search range contains no candidate elevation.
    #[error("Empty elevation search range [{min}, {max}) with step {step}")]
    EmptySearchRange {
        /// Lower bound in degrees.
        min: f64,
        /// Upper bound in degrees, exclusive.
        max: f64,
        /// Candidate step in degrees.
        step: f64,
    },

    /// The two images of a view pair have different sizes.
    #[error("Images of view pair ({view_a}, {view_b}) have different sizes: {size_a} != {size_b}")]
    ImageSizeMismatch {
        /// First view of the pair.
        view_a: usize,
        /// Second view of the pair.
        view_b: usize,
        /// Size of the first image.
        size_a: ImageSize,
        /// Size of the second image.
        size_b: ImageSize,
    },

    /// The feature matcher returned arrays of different lengths.
    #[error("Matcher returned {keypoints0} and {keypoints1} keypoints with {confidence} confidences")]
    MatcherOutputMismatch {
        /// Number of keypoints in the first image.
        keypoints0: usize,
        /// Number of keypoints in the second image.
        keypoints1: usize,
        /// Number of confidence values.
        confidence: usize,
    },

    /// The feature matcher failed.
    #[error("Feature matcher failed: {0}")]
    Matcher(#[source] BoxError),

    /// Image processing error.
    #[error(transparent)]
    Image(#[from] ImageError),

    /// I/O error.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
