use elevest_3d::hypothesis::{generate_pose_hypothesis, is_degenerate_elevation, NUM_VIEWS};
use glam::{DMat3, DMat4};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::correspondence::{Correspondence, MatchTable};
use crate::error::ElevationError;
use crate::scoring::{ConsistencyScorer, ReprojectionScorer};

/// Number of cyclic view windows scored per hypothesis.
pub const NUM_WINDOWS: usize = NUM_VIEWS - 1;

/// Parameters of the coarse-to-fine elevation search.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchParams {
    /// Step in degrees of the coarse grid.
    pub coarse_step: f64,
    /// Half-width in degrees of the refined grid around the coarse winner.
    pub refine_radius: f64,
    /// Step in degrees of the refined grid.
    pub refine_step: f64,
    /// Evaluate candidate elevations on the rayon thread pool.
    pub parallel: bool,
}

impl Default for SearchParams {
    fn default() -> Self {
        Self {
            coarse_step: 10.0,
            refine_radius: 10.0,
            refine_step: 1.0,
            parallel: false,
        }
    }
}

/// Evenly spaced values in `[start, stop)`.
fn arange(start: f64, stop: f64, step: f64) -> Vec<f64> {
    if !(step > 0.0) || !(stop > start) {
        return Vec::new();
    }
    let n = ((stop - start) / step).ceil() as usize;
    (0..n).map(|i| start + i as f64 * step).collect()
}

/// Candidate elevations of the coarse stage: every `step` degrees in `[min, max)`.
pub fn coarse_candidates(min: f64, max: f64, step: f64) -> Vec<f64> {
    arange(min, max, step)
}

/// Candidate elevations of the refined stage around `best`.
///
/// Every `step` degrees in `[best - radius, best + radius)`, without the
/// elevations whose hypothesis places a camera on a multiple of 180 degrees.
pub fn refine_candidates(best: f64, radius: f64, step: f64) -> Vec<f64> {
    arange(best - radius, best + radius, step)
        .into_iter()
        .filter(|&e| !is_degenerate_elevation(e))
        .collect()
}

/// Index of the smallest error, the first one on ties. NaN counts as infinity.
fn argmin(errors: &[f64]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (idx, &err) in errors.iter().enumerate() {
        let err = if err.is_nan() { f64::INFINITY } else { err };
        match best {
            Some((_, best_err)) if err >= best_err => {}
            _ => best = Some((idx, err)),
        }
    }
    best.map(|(idx, _)| idx)
}

/// Two-stage grid search over camera elevations.
///
/// Each candidate elevation is expanded into four camera poses and scored on
/// the three cyclic windows starting at views 0, 1 and 2. The coarse stage
/// finds the basin, the refined stage the final elevation.
#[derive(Clone, Debug)]
pub struct ElevationSearch<S = ReprojectionScorer> {
    params: SearchParams,
    scorer: S,
}

impl ElevationSearch<ReprojectionScorer> {
    /// Create a search using the reprojection error scorer.
    pub fn new(params: SearchParams) -> Self {
        Self::with_scorer(params, ReprojectionScorer::default())
    }
}

impl Default for ElevationSearch<ReprojectionScorer> {
    fn default() -> Self {
        Self::new(SearchParams::default())
    }
}

impl<S: ConsistencyScorer> ElevationSearch<S> {
    /// Create a search using a custom scorer.
    pub fn with_scorer(params: SearchParams, scorer: S) -> Self {
        Self { params, scorer }
    }

    /// The search parameters.
    pub fn params(&self) -> &SearchParams {
        &self.params
    }

    /// The hypothesis scorer.
    pub fn scorer(&self) -> &S {
        &self.scorer
    }

    /// Total error of an elevation hypothesis, summed over the cyclic windows.
    pub fn hypothesis_error(&self, elevation: f64, table: &MatchTable, k: &DMat3) -> f64 {
        let cam_poses = generate_pose_hypothesis(elevation);
        let mut error = 0.0;
        for start in 0..NUM_WINDOWS {
            let poses: [DMat4; NUM_VIEWS] =
                std::array::from_fn(|i| cam_poses[(start + i) % NUM_VIEWS]);
            let matches: [&[Correspondence]; NUM_VIEWS - 1] =
                std::array::from_fn(|j| table.get(start, (start + j + 1) % NUM_VIEWS));
            error += self.scorer.score(k, &matches, &poses);
        }
        error
    }

    /// Return the candidate with the smallest hypothesis error, or `None` without candidates.
    pub fn find_optimal_elevation(
        &self,
        candidates: &[f64],
        table: &MatchTable,
        k: &DMat3,
    ) -> Option<f64> {
        let errors = if self.params.parallel {
            candidates
                .par_iter()
                .map(|&elevation| self.hypothesis_error(elevation, table, k))
                .collect::<Vec<_>>()
        } else {
            candidates
                .iter()
                .map(|&elevation| self.hypothesis_error(elevation, table, k))
                .collect::<Vec<_>>()
        };

        for (elevation, error) in candidates.iter().zip(errors.iter()) {
            log::debug!("elevation {elevation}: error {error}");
        }

        argmin(&errors).map(|idx| candidates[idx])
    }

    /// Search the best elevation in `[min_elevation, max_elevation)` degrees.
    ///
    /// # Errors
    ///
    /// Returns [`ElevationError::EmptySearchRange`] when the coarse grid has no
    /// candidate.
    pub fn search(
        &self,
        min_elevation: f64,
        max_elevation: f64,
        table: &MatchTable,
        k: &DMat3,
    ) -> Result<f64, ElevationError> {
        let empty_range = || ElevationError::EmptySearchRange {
            min: min_elevation,
            max: max_elevation,
            step: self.params.coarse_step,
        };

        let coarse = coarse_candidates(min_elevation, max_elevation, self.params.coarse_step);
        let coarse_best = self
            .find_optimal_elevation(&coarse, table, k)
            .ok_or_else(empty_range)?;
        log::debug!("coarse elevation: {coarse_best}");

        let refined = refine_candidates(
            coarse_best,
            self.params.refine_radius,
            self.params.refine_step,
        );
        let best = self
            .find_optimal_elevation(&refined, table, k)
            .ok_or_else(empty_range)?;
        log::debug!("refined elevation: {best}");

        Ok(best)
    }
}
