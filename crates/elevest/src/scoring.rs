use elevest_3d::{
    camera::projection_matrix,
    ops::{project_points, transform_points},
    triangulation::triangulate_points,
};
use glam::{DMat3, DMat4, DVec2};
use serde::{Deserialize, Serialize};

use crate::correspondence::Correspondence;

/// Default radius in pixels within which two view-0 keypoints are considered the same.
pub const DEFAULT_MAX_ASSOCIATION_DISTANCE: f64 = 1.0;

/// Scores how consistent a set of camera poses is with a set of correspondences.
///
/// Lower is better. Implementations must be deterministic.
pub trait ConsistencyScorer: Send + Sync {
    /// Score a pose sequence.
    ///
    /// # Arguments
    /// - `k` – Camera intrinsics matrix.
    /// - `matches` – `matches[0]` relates views 0 and 1, `matches[i]` for `i >= 1`
    ///   relates view 0 and view `i + 1`.
    /// - `poses` – `world_from_camera` poses of the views, `matches.len() + 1` of them.
    fn score(&self, k: &DMat3, matches: &[&[Correspondence]], poses: &[DMat4]) -> f64;
}

/// Multi-view reprojection error of points triangulated from the first two views.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReprojectionScorer {
    /// Maximum view-0 pixel distance for associating a reference correspondence
    /// with a correspondence of another view pair.
    pub max_association_distance: f64,
}

impl Default for ReprojectionScorer {
    fn default() -> Self {
        Self {
            max_association_distance: DEFAULT_MAX_ASSOCIATION_DISTANCE,
        }
    }
}

impl ConsistencyScorer for ReprojectionScorer {
    fn score(&self, k: &DMat3, matches: &[&[Correspondence]], poses: &[DMat4]) -> f64 {
        reprojection_error(k, matches, poses, self.max_association_distance)
    }
}

/// Index and distance of the row of `table` whose view-0 endpoint is closest to `query`.
///
/// Ties keep the first row.
fn nearest_neighbor(query: DVec2, table: &[Correspondence]) -> Option<(usize, f64)> {
    let mut best: Option<(usize, f64)> = None;
    for (idx, c) in table.iter().enumerate() {
        let d = query.distance(c.point0());
        match best {
            Some((_, best_d)) if d >= best_d => {}
            _ => best = Some((idx, d)),
        }
    }
    best
}

/// Compute the bundle-style reprojection error of a pose sequence.
///
/// 1. Points are triangulated (DLT) from the correspondences between views 0 and 1.
/// 2. For every further view, each reference correspondence is associated with
///    the correspondence of that view's table whose view-0 endpoint is closest,
///    provided the distance is below `max_association_distance`.
/// 3. The triangulated points are projected into the view and compared with the
///    associated endpoints; the confidence-weighted mean error is accumulated.
///
/// Views without any association contribute nothing. Degenerate triangulations
/// are not rejected; they show up as large (or non-finite) errors.
///
/// PRECONDITION: `poses.len() >= 2` and `matches.len() == poses.len() - 1`.
pub fn reprojection_error(
    k: &DMat3,
    matches: &[&[Correspondence]],
    poses: &[DMat4],
    max_association_distance: f64,
) -> f64 {
    assert!(poses.len() >= 2);
    assert_eq!(matches.len(), poses.len() - 1);

    let reference = matches[0];
    let p0 = projection_matrix(k, &poses[0]);
    let p1 = projection_matrix(k, &poses[1]);

    let points0 = reference.iter().map(|c| c.point0()).collect::<Vec<_>>();
    let points1 = reference.iter().map(|c| c.point1()).collect::<Vec<_>>();
    let points_world = triangulate_points(&p0, &p1, &points0, &points1);

    let mut error = 0.0;
    for (table, world_from_camera) in matches[1..].iter().zip(&poses[2..]) {
        if reference.is_empty() || table.is_empty() {
            continue;
        }

        let points_camera = transform_points(&world_from_camera.inverse(), &points_world);
        let projected = project_points(k, &points_camera);

        let mut weighted_error = 0.0;
        let mut total_weight = 0.0;
        let mut num_kept = 0usize;
        for (query, reprojected) in points0.iter().zip(projected.iter()) {
            let Some((idx, dist)) = nearest_neighbor(*query, table) else {
                continue;
            };
            if dist >= max_association_distance {
                continue;
            }
            let observed = &table[idx];
            weighted_error += observed.point1().distance(*reprojected) * observed.confidence;
            total_weight += observed.confidence;
            num_kept += 1;
        }

        if num_kept > 0 && total_weight > 0.0 {
            error += weighted_error / total_weight;
        }
    }

    error
}
