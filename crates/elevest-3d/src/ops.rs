use glam::{DMat3, DMat4, DVec2, DVec3};

/// Transform a set of points with a rigid transform.
///
/// # Arguments
///
/// * `dst_from_src` - The transform mapping source coordinates to destination coordinates.
/// * `src_points` - The points in the source frame.
///
/// # Returns
///
/// The points expressed in the destination frame.
pub fn transform_points(dst_from_src: &DMat4, src_points: &[DVec3]) -> Vec<DVec3> {
    src_points
        .iter()
        .map(|p| dst_from_src.transform_point3(*p))
        .collect()
}

/// Project points given in camera coordinates to pixel coordinates.
///
/// No depth check is made: points on the camera plane project to infinity and
/// points behind the camera are mirrored, which is fine for error scoring.
///
/// Example:
///
/// ```
/// use elevest_3d::camera::default_camera_matrix;
/// use elevest_3d::ops::project_points;
/// use glam::DVec3;
///
/// let k = default_camera_matrix();
/// let uv = project_points(&k, &[DVec3::new(0.0, 0.0, 2.0)]);
/// assert_eq!(uv[0].x, 128.0);
/// ```
pub fn project_points(k: &DMat3, points_in_camera: &[DVec3]) -> Vec<DVec2> {
    points_in_camera
        .iter()
        .map(|p| {
            let uvw = *k * *p;
            DVec2::new(uvw.x / uvw.z, uvw.y / uvw.z)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_transform_points_roundtrip() {
        let src = vec![DVec3::new(2.0, 2.0, 2.0), DVec3::new(3.0, 4.0, 5.0)];
        let dst_from_src = DMat4::from_rotation_translation(
            glam::DQuat::from_rotation_x(std::f64::consts::FRAC_PI_2),
            DVec3::new(1.0, 2.0, 3.0),
        );
        let dst = transform_points(&dst_from_src, &src);
        let back = transform_points(&dst_from_src.inverse(), &dst);
        for (a, b) in back.iter().zip(src.iter()) {
            assert!(a.abs_diff_eq(*b, 1e-12));
        }
    }

    #[test]
    fn test_project_points() {
        let k = DMat3::from_cols(
            DVec3::new(500.0, 0.0, 0.0),
            DVec3::new(0.0, 500.0, 0.0),
            DVec3::new(320.0, 240.0, 1.0),
        );
        let points = [DVec3::new(0.0, 0.0, 5.0), DVec3::new(1.0, 2.0, 10.0)];
        let uv = project_points(&k, &points);
        assert_relative_eq!(uv[0].x, 320.0);
        assert_relative_eq!(uv[0].y, 240.0);
        assert_relative_eq!(uv[1].x, 500.0 * 1.0 / 10.0 + 320.0);
        assert_relative_eq!(uv[1].y, 500.0 * 2.0 / 10.0 + 240.0);
    }
}
