use glam::{DMat3, DMat4};

/// A 3x4 camera projection matrix `P = K [R | t]` stored row-major.
pub type ProjectionMatrix = [[f64; 4]; 3];

/// Rows of the camera matrix used when no intrinsics are supplied.
pub const DEFAULT_CAMERA_MATRIX_ROWS: [[f64; 3]; 3] =
    [[280.0, 0.0, 128.0], [0.0, 280.0, 128.0], [0.0, 0.0, 1.0]];

/// Build a camera matrix from its rows.
///
/// # Arguments
///
/// * `rows` - The camera matrix in row-major order.
///
/// Example:
///
/// ```
/// use elevest_3d::camera::camera_matrix_from_rows;
///
/// let k = camera_matrix_from_rows(&[[500.0, 0.0, 320.0], [0.0, 500.0, 240.0], [0.0, 0.0, 1.0]]);
/// assert_eq!(k.row(0).z, 320.0);
/// ```
pub fn camera_matrix_from_rows(rows: &[[f64; 3]; 3]) -> DMat3 {
    // glam stores matrices column-major
    DMat3::from_cols_array_2d(rows).transpose()
}

/// Return the rows of a camera matrix.
pub fn camera_matrix_to_rows(k: &DMat3) -> [[f64; 3]; 3] {
    k.transpose().to_cols_array_2d()
}

/// The camera matrix `[[280, 0, 128], [0, 280, 128], [0, 0, 1]]`.
pub fn default_camera_matrix() -> DMat3 {
    camera_matrix_from_rows(&DEFAULT_CAMERA_MATRIX_ROWS)
}

/// Compute the projection matrix `K * inverse(world_from_camera)[0:3, 0:4]`.
///
/// # Arguments
///
/// * `k` - The camera matrix.
/// * `world_from_camera` - The camera-to-world pose of the camera.
///
/// # Returns
///
/// The row-major 3x4 projection matrix mapping homogeneous world points to
/// homogeneous pixel coordinates.
pub fn projection_matrix(k: &DMat3, world_from_camera: &DMat4) -> ProjectionMatrix {
    let camera_from_world = world_from_camera.inverse();
    let mut p = [[0.0; 4]; 3];
    for (i, row) in p.iter_mut().enumerate() {
        let k_row = k.row(i);
        for (j, val) in row.iter_mut().enumerate() {
            *val = k_row.dot(camera_from_world.col(j).truncate());
        }
    }
    p
}
