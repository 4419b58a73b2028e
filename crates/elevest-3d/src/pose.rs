use glam::{DMat4, DVec3};

/// Distance of every camera center from the object origin.
pub const DEFAULT_CAMERA_RADIUS: f64 = 1.2;

const NORMALIZE_EPS: f64 = 1e-10;

fn normalize(v: DVec3) -> DVec3 {
    v / (v.length() + NORMALIZE_EPS)
}

/// Build a camera-to-world pose on a sphere around the origin, looking at the origin.
///
/// The camera center is
/// `radius * (sin(elevation) sin(azimuth), cos(elevation), -sin(elevation) cos(azimuth))`,
/// so the elevation is the polar angle measured from the +Y axis. The rotation
/// columns are the right, up and forward vectors, with forward pointing away
/// from the origin (OpenGL style camera looking along -Z).
///
/// # Arguments
///
/// * `elevation` - The polar angle in radians.
/// * `azimuth` - The azimuth in radians.
/// * `radius` - The distance from the origin.
///
/// # Returns
///
/// The `world_from_camera` transform.
///
/// Example:
///
/// ```
/// use elevest_3d::pose::look_at_pose;
///
/// let pose = look_at_pose(std::f64::consts::FRAC_PI_2, 0.0, 1.2);
/// assert!((pose.w_axis.z + 1.2).abs() < 1e-12);
/// ```
pub fn look_at_pose(elevation: f64, azimuth: f64, radius: f64) -> DMat4 {
    let (sin_e, cos_e) = elevation.sin_cos();
    let (sin_a, cos_a) = azimuth.sin_cos();
    let center = DVec3::new(
        radius * sin_e * sin_a,
        radius * cos_e,
        -radius * sin_e * cos_a,
    );

    let forward = normalize(center);
    let mut right = normalize(DVec3::Y.cross(forward));
    // forward is parallel to the world up axis
    if right.length_squared() < 0.01 {
        right = DVec3::Y;
    }
    let up = normalize(forward.cross(right));

    DMat4::from_cols(
        right.extend(0.0),
        up.extend(0.0),
        forward.extend(0.0),
        center.extend(1.0),
    )
}

/// Build one look-at pose per `(elevation, azimuth)` pair, angles in radians.
///
/// PRECONDITION: `elevations` and `azimuths` have the same length.
pub fn look_at_poses(elevations: &[f64], azimuths: &[f64], radius: f64) -> Vec<DMat4> {
    assert_eq!(elevations.len(), azimuths.len());
    elevations
        .iter()
        .zip(azimuths)
        .map(|(&elevation, &azimuth)| look_at_pose(elevation, azimuth, radius))
        .collect()
}
