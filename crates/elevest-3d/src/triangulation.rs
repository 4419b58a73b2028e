use crate::camera::ProjectionMatrix;
use glam::{DVec2, DVec3};

/// Triangulate a 3D point from two views with the linear DLT method.
///
/// Builds the 4x4 system `[x0 P0[2] - P0[0]; y0 P0[2] - P0[1]; x1 P1[2] - P1[0]; y1 P1[2] - P1[1]]`
/// and takes the right singular vector of the smallest singular value as the
/// homogeneous solution.
///
/// The homogeneous coordinate is not checked: a point at infinity comes back
/// with non-finite or very large coordinates.
///
/// # Arguments
///
/// * `p0` - The projection matrix of the first view.
/// * `p1` - The projection matrix of the second view.
/// * `x0` - The pixel observation in the first view.
/// * `x1` - The pixel observation in the second view.
pub fn triangulate_point(
    p0: &ProjectionMatrix,
    p1: &ProjectionMatrix,
    x0: &DVec2,
    x1: &DVec2,
) -> DVec3 {
    let mut a = faer::Mat::<f64>::zeros(4, 4);
    write_dlt_row(&mut a, 0, x0.x, &p0[2], &p0[0]);
    write_dlt_row(&mut a, 1, x0.y, &p0[2], &p0[1]);
    write_dlt_row(&mut a, 2, x1.x, &p1[2], &p1[0]);
    write_dlt_row(&mut a, 3, x1.y, &p1[2], &p1[1]);

    // singular values are sorted in decreasing order
    let svd = a.svd();
    let v = svd.v();
    let w = v[(3, 3)];
    DVec3::new(v[(0, 3)] / w, v[(1, 3)] / w, v[(2, 3)] / w)
}

/// Triangulate one 3D point per pair of observations.
///
/// PRECONDITION: `points0` and `points1` have the same length.
///
/// Example:
///
/// ```
/// use elevest_3d::triangulation::triangulate_points;
/// use glam::DVec2;
///
/// let p0 = [[1.0, 0.0, 0.0, 0.0], [0.0, 1.0, 0.0, 0.0], [0.0, 0.0, 1.0, 0.0]];
/// let p1 = [[1.0, 0.0, 0.0, -1.0], [0.0, 1.0, 0.0, 0.0], [0.0, 0.0, 1.0, 0.0]];
/// let points = triangulate_points(&p0, &p1, &[DVec2::new(0.5, 0.25)], &[DVec2::new(0.0, 0.25)]);
/// assert!((points[0].z - 2.0).abs() < 1e-9);
/// ```
pub fn triangulate_points(
    p0: &ProjectionMatrix,
    p1: &ProjectionMatrix,
    points0: &[DVec2],
    points1: &[DVec2],
) -> Vec<DVec3> {
    assert_eq!(points0.len(), points1.len());
    points0
        .iter()
        .zip(points1)
        .map(|(x0, x1)| triangulate_point(p0, p1, x0, x1))
        .collect()
}

fn write_dlt_row(a: &mut faer::Mat<f64>, row: usize, x: f64, p3: &[f64; 4], p1: &[f64; 4]) {
    for j in 0..4 {
        a[(row, j)] = x * p3[j] - p1[j];
    }
}
