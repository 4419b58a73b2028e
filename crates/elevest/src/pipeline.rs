use elevest_3d::{camera::default_camera_matrix, hypothesis::NUM_VIEWS};
use glam::DMat3;

use crate::config::EstimatorConfig;
use crate::correspondence::{MatchTable, PairwiseMatches};
use crate::error::ElevationError;
use crate::matcher::{compute_pairwise_matches, FeatureMatcher, ViewImage};
use crate::scoring::ConsistencyScorer;
use crate::search::{ElevationSearch, SearchParams};

fn camera_matrix_or_default(k: Option<DMat3>) -> DMat3 {
    k.unwrap_or_else(|| {
        log::warn!("No camera matrix provided, using default K");
        default_camera_matrix()
    })
}

/// Estimate the camera elevation in degrees from pairwise correspondences.
///
/// Runs the two-stage search over `[min_elevation, max_elevation)` with the
/// default search parameters and reprojection scorer.
///
/// # Arguments
///
/// * `matches` - The correspondences of the six view pairs.
/// * `min_elevation` - Lower bound of the coarse search in degrees.
/// * `max_elevation` - Upper bound of the coarse search in degrees, exclusive.
/// * `k` - The camera intrinsics. The default camera is used when `None`.
///
/// # Errors
///
/// Fails with [`ElevationError::InsufficientMatches`] before any hypothesis is
/// scored when a view pair has no correspondences.
pub fn estimate_elevation(
    matches: &PairwiseMatches,
    min_elevation: f64,
    max_elevation: f64,
    k: Option<DMat3>,
) -> Result<f64, ElevationError> {
    let search = ElevationSearch::new(SearchParams::default());
    estimate_elevation_with_search(&search, matches, min_elevation, max_elevation, k)
}

/// Same as [`estimate_elevation`] with a caller-provided search.
pub fn estimate_elevation_with_search<S: ConsistencyScorer>(
    search: &ElevationSearch<S>,
    matches: &PairwiseMatches,
    min_elevation: f64,
    max_elevation: f64,
    k: Option<DMat3>,
) -> Result<f64, ElevationError> {
    let table = MatchTable::build(matches)?;
    let k = camera_matrix_or_default(k);
    let elevation = search.search(min_elevation, max_elevation, &table, &k)?;
    log::info!("Estimated elevation: {elevation} degrees");
    Ok(elevation)
}

/// Estimate the camera elevation from pairwise correspondences and a configuration.
pub fn estimate_elevation_with_config(
    matches: &PairwiseMatches,
    config: &EstimatorConfig,
) -> Result<f64, ElevationError> {
    let search = ElevationSearch::with_scorer(config.search, config.scorer());
    estimate_elevation_with_search(
        &search,
        matches,
        config.min_elevation,
        config.max_elevation,
        config.camera_matrix(),
    )
}

/// Estimate the camera elevation from the four views of an object.
///
/// The views are matched pairwise with `matcher`, then searched as in
/// [`estimate_elevation_with_config`].
pub fn estimate_elevation_from_images<M>(
    matcher: &mut M,
    images: &[ViewImage; NUM_VIEWS],
    config: &EstimatorConfig,
) -> Result<f64, ElevationError>
where
    M: FeatureMatcher + ?Sized,
{
    let matches = compute_pairwise_matches(matcher, images, &config.matching)?;
    estimate_elevation_with_config(&matches, config)
}
