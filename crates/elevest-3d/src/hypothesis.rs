use crate::pose::{look_at_poses, DEFAULT_CAMERA_RADIUS};
use glam::DMat4;

/// Number of views covered by one hypothesis.
pub const NUM_VIEWS: usize = 4;

/// Elevation offsets in degrees of the nominal five-view layout, relative to the hypothesis.
pub const ELEVATION_OFFSETS_DEG: [f64; 5] = [0.0, -10.0, 10.0, 0.0, 0.0];

/// Azimuths in degrees of the nominal five-view layout.
pub const AZIMUTHS_DEG: [f64; 5] = [30.0, 30.0, 30.0, 20.0, 40.0];

/// Expand an elevation hypothesis into the camera poses of the four views.
///
/// The nominal layout has five views at elevations `[e, e-10, e+10, e, e]` and
/// azimuths `[30, 30, 30, 20, 40]` degrees. The first (reference) view is
/// dropped and the camera Y and Z axes of the remaining four are negated to
/// move from the look-at convention (camera looking along -Z) to the
/// projection convention (camera looking along +Z, Y down).
///
/// # Arguments
///
/// * `elevation_deg` - The hypothesized elevation in degrees.
///
/// # Returns
///
/// Four `world_from_camera` poses.
///
/// Example:
///
/// ```
/// use elevest_3d::hypothesis::generate_pose_hypothesis;
///
/// let poses = generate_pose_hypothesis(60.0);
/// assert_eq!(poses.len(), 4);
/// ```
pub fn generate_pose_hypothesis(elevation_deg: f64) -> [DMat4; NUM_VIEWS] {
    let elevations = ELEVATION_OFFSETS_DEG.map(|offset| (elevation_deg + offset).to_radians());
    let azimuths = AZIMUTHS_DEG.map(f64::to_radians);
    let nominal = look_at_poses(&elevations, &azimuths, DEFAULT_CAMERA_RADIUS);
    std::array::from_fn(|i| flip_yz_axes(nominal[i + 1]))
}

/// Negate the Y and Z axes of a pose, keeping its translation.
pub fn flip_yz_axes(mut pose: DMat4) -> DMat4 {
    pose.y_axis = -pose.y_axis;
    pose.z_axis = -pose.z_axis;
    pose
}

/// Whether the hypothesis for `elevation_deg` puts a camera on the world up axis.
///
/// Such hypotheses have an undefined look-at frame and must not be scored.
pub fn is_degenerate_elevation(elevation_deg: f64) -> bool {
    [elevation_deg, elevation_deg - 10.0, elevation_deg + 10.0]
        .iter()
        .any(|e| e.rem_euclid(180.0) == 0.0)
}
