use elevest_3d::{
    hypothesis::{generate_pose_hypothesis, NUM_VIEWS},
    ops::{project_points, transform_points},
};
use glam::{DMat3, DVec2, DVec3};
use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::correspondence::{view_pairs, Correspondence, PairwiseMatches};
use crate::error::ElevationError;

/// A random point cloud seen by four cameras at a known elevation.
///
/// Used to generate matches with a known answer for tests, benches and demos.
#[derive(Clone, Debug, PartialEq)]
pub struct SyntheticScene {
    /// Ground-truth elevation in degrees.
    pub elevation_deg: f64,
    /// Number of 3D points.
    pub num_points: usize,
    /// Half side of the cube around the origin the points are sampled in.
    pub extent: f64,
    /// Maximum absolute per-axis pixel noise added to every observation.
    pub pixel_noise: f64,
    /// Lower bound of the match confidences.
    pub min_confidence: f64,
    /// Upper bound of the match confidences.
    pub max_confidence: f64,
    /// Random seed.
    pub seed: u64,
}

impl Default for SyntheticScene {
    fn default() -> Self {
        Self {
            elevation_deg: 60.0,
            num_points: 100,
            extent: 0.25,
            pixel_noise: 0.0,
            min_confidence: 0.5,
            max_confidence: 1.0,
            seed: 0,
        }
    }
}

impl SyntheticScene {
    fn rng(&self, stream: u64) -> StdRng {
        StdRng::seed_from_u64(self.seed.wrapping_add(stream))
    }

    /// The 3D points of the scene.
    pub fn points(&self) -> Vec<DVec3> {
        let mut rng = self.rng(0);
        let e = self.extent;
        (0..self.num_points)
            .map(|_| {
                DVec3::new(
                    rng.random_range(-e..=e),
                    rng.random_range(-e..=e),
                    rng.random_range(-e..=e),
                )
            })
            .collect()
    }

    /// Pixel observations of every point in every view, noise included.
    pub fn observations(&self, k: &DMat3) -> [Vec<DVec2>; NUM_VIEWS] {
        let points = self.points();
        let poses = generate_pose_hypothesis(self.elevation_deg);
        let mut rng = self.rng(1);
        let noise = self.pixel_noise.abs();
        std::array::from_fn(|view| {
            let points_camera = transform_points(&poses[view].inverse(), &points);
            let mut observed = project_points(k, &points_camera);
            if noise > 0.0 {
                for p in observed.iter_mut() {
                    *p += DVec2::new(
                        rng.random_range(-noise..=noise),
                        rng.random_range(-noise..=noise),
                    );
                }
            }
            observed
        })
    }

    /// Correspondences between every pair of views.
    pub fn pairwise_matches(&self, k: &DMat3) -> Result<PairwiseMatches, ElevationError> {
        let observations = self.observations(k);
        let mut rng = self.rng(2);
        let (lo, hi) = if self.min_confidence <= self.max_confidence {
            (self.min_confidence, self.max_confidence)
        } else {
            (self.max_confidence, self.min_confidence)
        };

        let mut matches = PairwiseMatches::new();
        for (i, j) in view_pairs() {
            let table = observations[i]
                .iter()
                .zip(observations[j].iter())
                .map(|(p0, p1)| Correspondence::new(*p0, *p1, rng.random_range(lo..=hi)))
                .collect();
            matches.insert(i, j, table)?;
        }
        Ok(matches)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use elevest_3d::camera::default_camera_matrix;

    #[test]
    fn test_points_in_cube() {
        let scene = SyntheticScene::default();
        let points = scene.points();
        assert_eq!(points.len(), 100);
        for p in points.iter() {
            assert!(p.abs().max_element() <= scene.extent);
        }
        assert_eq!(points, scene.points());
    }

    #[test]
    fn test_pairwise_matches_consistent_views() -> Result<(), ElevationError> {
        let scene = SyntheticScene {
            num_points: 20,
            pixel_noise: 0.5,
            ..Default::default()
        };
        let matches = scene.pairwise_matches(&default_camera_matrix())?;
        assert_eq!(matches.len(), 6);

        // a view's keypoints are the same in every table it appears in
        let t01 = matches.get(0, 1).expect("pair (0, 1)");
        let t02 = matches.get(0, 2).expect("pair (0, 2)");
        let t12 = matches.get(1, 2).expect("pair (1, 2)");
        for ((a, b), c) in t01.iter().zip(t02.iter()).zip(t12.iter()) {
            assert_eq!(a.point0(), b.point0());
            assert_eq!(a.point1(), c.point0());
            assert_eq!(b.point1(), c.point1());
            assert!((0.5..=1.0).contains(&a.confidence));
        }
        Ok(())
    }

    #[test]
    fn test_points_in_front_of_cameras() {
        let scene = SyntheticScene::default();
        let points = scene.points();
        for pose in generate_pose_hypothesis(scene.elevation_deg).iter() {
            for p in transform_points(&pose.inverse(), &points) {
                assert!(p.z > 0.5);
            }
        }
    }
}
