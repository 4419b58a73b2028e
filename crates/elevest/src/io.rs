use std::{
    fs::File,
    io::{BufReader, BufWriter, Write},
    path::Path,
};

use crate::correspondence::PairwiseMatches;
use crate::error::ElevationError;

/// Read pairwise correspondences from a JSON file.
///
/// The file holds a `pairs` array whose entries give `view_a`, `view_b` and
/// the `matches` of the pair as `[x0, y0, x1, y1, confidence]` rows.
///
/// # Arguments
///
/// * `path` - The path to the JSON file.
pub fn read_pairwise_matches(path: impl AsRef<Path>) -> Result<PairwiseMatches, ElevationError> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    Ok(serde_json::from_reader(reader)?)
}

/// Write pairwise correspondences to a pretty-printed JSON file.
///
/// # Arguments
///
/// * `path` - The path to the JSON file.
/// * `matches` - The correspondences to write.
pub fn write_pairwise_matches(
    path: impl AsRef<Path>,
    matches: &PairwiseMatches,
) -> Result<(), ElevationError> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, matches)?;
    writer.flush()?;
    Ok(())
}
