use std::path::Path;

use elevest_3d::camera::camera_matrix_from_rows;
use glam::DMat3;
use serde::{Deserialize, Serialize};

use crate::error::ElevationError;
use crate::matcher::MatchingParams;
use crate::scoring::{ReprojectionScorer, DEFAULT_MAX_ASSOCIATION_DISTANCE};
use crate::search::SearchParams;

/// Configuration of an elevation estimation run.
///
/// Every field has a default, so a JSON file only needs the values it overrides.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EstimatorConfig {
    /// Lower bound of the coarse search, in degrees.
    pub min_elevation: f64,
    /// Upper bound of the coarse search, exclusive, in degrees.
    pub max_elevation: f64,
    /// Row-major camera intrinsics. The built-in 256x256 camera is used when absent.
    pub camera_matrix: Option<[[f64; 3]; 3]>,
    /// Association radius in view-0 pixels used by the scorer.
    pub max_association_distance: f64,
    /// Grid search parameters.
    pub search: SearchParams,
    /// Pairwise matching parameters.
    pub matching: MatchingParams,
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            min_elevation: 30.0,
            max_elevation: 150.0,
            camera_matrix: None,
            max_association_distance: DEFAULT_MAX_ASSOCIATION_DISTANCE,
            search: SearchParams::default(),
            matching: MatchingParams::default(),
        }
    }
}

impl EstimatorConfig {
    /// Parse a configuration from a JSON string.
    pub fn from_json_str(json: &str) -> Result<Self, ElevationError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read a configuration from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ElevationError> {
        let file = std::fs::File::open(path)?;
        let reader = std::io::BufReader::new(file);
        Ok(serde_json::from_reader(reader)?)
    }

    /// The configured camera intrinsics, if any.
    pub fn camera_matrix(&self) -> Option<DMat3> {
        self.camera_matrix.as_ref().map(camera_matrix_from_rows)
    }

    /// The reprojection scorer described by this configuration.
    pub fn scorer(&self) -> ReprojectionScorer {
        ReprojectionScorer {
            max_association_distance: self.max_association_distance,
        }
    }
}
