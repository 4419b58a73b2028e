use std::collections::BTreeMap;

use elevest_3d::hypothesis::NUM_VIEWS;
use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::error::ElevationError;

/// A keypoint correspondence between two views.
///
/// Serialized as the array `[x0, y0, x1, y1, confidence]`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 5]", into = "[f64; 5]")]
pub struct Correspondence {
    /// x coordinate in the first view, in pixels.
    pub x0: f64,
    /// y coordinate in the first view, in pixels.
    pub y0: f64,
    /// x coordinate in the second view, in pixels.
    pub x1: f64,
    /// y coordinate in the second view, in pixels.
    pub y1: f64,
    /// Matching confidence in `[0, 1]`.
    pub confidence: f64,
}

impl Correspondence {
    /// Create a correspondence from its two endpoints and confidence.
    pub fn new(point0: DVec2, point1: DVec2, confidence: f64) -> Self {
        Self {
            x0: point0.x,
            y0: point0.y,
            x1: point1.x,
            y1: point1.y,
            confidence,
        }
    }

    /// The endpoint in the first view.
    pub fn point0(&self) -> DVec2 {
        DVec2::new(self.x0, self.y0)
    }

    /// The endpoint in the second view.
    pub fn point1(&self) -> DVec2 {
        DVec2::new(self.x1, self.y1)
    }

    /// The same correspondence seen from the other view: endpoints swapped, confidence kept.
    pub fn swapped(&self) -> Self {
        Self {
            x0: self.x1,
            y0: self.y1,
            x1: self.x0,
            y1: self.y0,
            confidence: self.confidence,
        }
    }
}

impl From<[f64; 5]> for Correspondence {
    fn from(row: [f64; 5]) -> Self {
        Self {
            x0: row[0],
            y0: row[1],
            x1: row[2],
            y1: row[3],
            confidence: row[4],
        }
    }
}

impl From<Correspondence> for [f64; 5] {
    fn from(c: Correspondence) -> Self {
        [c.x0, c.y0, c.x1, c.y1, c.confidence]
    }
}

/// Number of unordered view pairs among the views.
pub const NUM_VIEW_PAIRS: usize = NUM_VIEWS * (NUM_VIEWS - 1) / 2;

/// Iterate over the unordered view pairs `(i, j)` with `i < j`, in lexicographic order.
pub fn view_pairs() -> impl Iterator<Item = (usize, usize)> {
    (0..NUM_VIEWS).flat_map(|i| (i + 1..NUM_VIEWS).map(move |j| (i, j)))
}

/// Raw correspondences produced by a feature matcher, one table per unordered view pair.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "MatchFile", into = "MatchFile")]
pub struct PairwiseMatches {
    pairs: BTreeMap<(usize, usize), Vec<Correspondence>>,
}

impl PairwiseMatches {
    /// Create an empty set of pairwise matches.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store the correspondences between `view_a` and `view_b`.
    ///
    /// Tables given with `view_a > view_b` are swapped into the canonical
    /// `(min, max)` orientation. A previous table for the pair is replaced.
    ///
    /// # Errors
    ///
    /// Returns [`ElevationError::InvalidViewPair`] when the views are equal or
    /// out of range.
    pub fn insert(
        &mut self,
        view_a: usize,
        view_b: usize,
        matches: Vec<Correspondence>,
    ) -> Result<(), ElevationError> {
        if view_a == view_b || view_a >= NUM_VIEWS || view_b >= NUM_VIEWS {
            return Err(ElevationError::InvalidViewPair(view_a, view_b, NUM_VIEWS));
        }
        if view_a < view_b {
            self.pairs.insert((view_a, view_b), matches);
        } else {
            let swapped = matches.iter().map(Correspondence::swapped).collect();
            self.pairs.insert((view_b, view_a), swapped);
        }
        Ok(())
    }

    /// The correspondences of the pair `(view_a, view_b)` with `view_a < view_b`.
    pub fn get(&self, view_a: usize, view_b: usize) -> Option<&[Correspondence]> {
        self.pairs.get(&(view_a, view_b)).map(Vec::as_slice)
    }

    /// Number of stored view pairs.
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Whether no view pair is stored.
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Iterate over the stored pairs in lexicographic order.
    pub fn iter(&self) -> impl Iterator<Item = ((usize, usize), &[Correspondence])> {
        self.pairs.iter().map(|(key, table)| (*key, table.as_slice()))
    }
}

#[derive(Clone, Serialize, Deserialize)]
struct MatchFile {
    pairs: Vec<MatchFilePair>,
}

#[derive(Clone, Serialize, Deserialize)]
struct MatchFilePair {
    view_a: usize,
    view_b: usize,
    matches: Vec<Correspondence>,
}

impl TryFrom<MatchFile> for PairwiseMatches {
    type Error = ElevationError;

    fn try_from(file: MatchFile) -> Result<Self, Self::Error> {
        let mut matches = PairwiseMatches::new();
        for pair in file.pairs {
            matches.insert(pair.view_a, pair.view_b, pair.matches)?;
        }
        Ok(matches)
    }
}

impl From<PairwiseMatches> for MatchFile {
    fn from(matches: PairwiseMatches) -> Self {
        MatchFile {
            pairs: matches
                .pairs
                .into_iter()
                .map(|((view_a, view_b), matches)| MatchFilePair {
                    view_a,
                    view_b,
                    matches,
                })
                .collect(),
        }
    }
}

/// Correspondence tables for every ordered view pair.
///
/// Built once per estimation and read-only afterwards. For every unordered
/// pair both orientations are stored, the second one with swapped endpoints.
#[derive(Clone, Debug, PartialEq)]
pub struct MatchTable {
    tables: [[Vec<Correspondence>; NUM_VIEWS]; NUM_VIEWS],
}

impl MatchTable {
    /// Build the table from raw pairwise matches.
    ///
    /// # Errors
    ///
    /// * [`ElevationError::MissingViewPair`] if a view pair was never provided.
    /// * [`ElevationError::InsufficientMatches`] if any view pair has no
    ///   correspondences. The whole table is rejected, not only that pair.
    pub fn build(raw: &PairwiseMatches) -> Result<Self, ElevationError> {
        let mut tables: [[Vec<Correspondence>; NUM_VIEWS]; NUM_VIEWS] = Default::default();
        for (i, j) in view_pairs() {
            let matches = raw.get(i, j).ok_or(ElevationError::MissingViewPair(i, j))?;
            if matches.is_empty() {
                log::info!("0 matches between views {i} and {j}, could not estimate elevation");
                return Err(ElevationError::InsufficientMatches {
                    view_a: i,
                    view_b: j,
                });
            }
            tables[j][i] = matches.iter().map(Correspondence::swapped).collect();
            tables[i][j] = matches.to_vec();
        }
        Ok(Self { tables })
    }

    /// The correspondences from view `i` to view `j`.
    ///
    /// PRECONDITION: `i` and `j` are below the view count. The diagonal is empty.
    pub fn get(&self, i: usize, j: usize) -> &[Correspondence] {
        &self.tables[i][j]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(n: usize, offset: f64) -> Vec<Correspondence> {
        (0..n)
            .map(|k| {
                let k = k as f64;
                Correspondence::from([k + offset, 2.0 * k, 3.0 * k, k - offset, 0.5])
            })
            .collect()
    }

    fn full_matches() -> Result<PairwiseMatches, ElevationError> {
        let mut raw = PairwiseMatches::new();
        for (n, (i, j)) in view_pairs().enumerate() {
            raw.insert(i, j, table(n + 2, (10 * i + j) as f64))?;
        }
        Ok(raw)
    }

    #[test]
    fn test_view_pairs() {
        let pairs = view_pairs().collect::<Vec<_>>();
        assert_eq!(pairs, vec![(0, 1), (0, 2), (0, 3), (1, 2), (1, 3), (2, 3)]);
        assert_eq!(pairs.len(), NUM_VIEW_PAIRS);
    }

    #[test]
    fn test_correspondence_swapped() {
        let c = Correspondence::from([1.0, 2.0, 3.0, 4.0, 0.7]);
        let s = c.swapped();
        assert_eq!(<[f64; 5]>::from(s), [3.0, 4.0, 1.0, 2.0, 0.7]);
        assert_eq!(s.swapped(), c);
        assert_eq!(c.point0(), DVec2::new(1.0, 2.0));
        assert_eq!(c.point1(), DVec2::new(3.0, 4.0));
    }

    #[test]
    fn test_insert_invalid_pairs() {
        let mut raw = PairwiseMatches::new();
        assert!(matches!(
            raw.insert(1, 1, vec![]),
            Err(ElevationError::InvalidViewPair(1, 1, NUM_VIEWS))
        ));
        assert!(matches!(
            raw.insert(0, 4, vec![]),
            Err(ElevationError::InvalidViewPair(0, 4, NUM_VIEWS))
        ));
        assert!(raw.is_empty());
    }

    #[test]
    fn test_insert_reversed_pair_is_canonicalized() -> Result<(), ElevationError> {
        let mut raw = PairwiseMatches::new();
        let reversed = table(3, 1.0);
        raw.insert(2, 0, reversed.clone())?;
        let stored = raw.get(0, 2).ok_or(ElevationError::MissingViewPair(0, 2))?;
        for (s, r) in stored.iter().zip(reversed.iter()) {
            assert_eq!(*s, r.swapped());
        }
        assert!(raw.get(2, 0).is_none());
        Ok(())
    }

    #[test]
    fn test_match_table_symmetry() -> Result<(), ElevationError> {
        let raw = full_matches()?;
        let table = MatchTable::build(&raw)?;
        for i in 0..NUM_VIEWS {
            for j in 0..NUM_VIEWS {
                if i == j {
                    assert!(table.get(i, j).is_empty());
                    continue;
                }
                let forward = table.get(i, j);
                let backward = table.get(j, i);
                assert_eq!(forward.len(), backward.len());
                assert!(!forward.is_empty());
                for (f, b) in forward.iter().zip(backward.iter()) {
                    assert_eq!(f.point0(), b.point1());
                    assert_eq!(f.point1(), b.point0());
                    assert_eq!(f.confidence, b.confidence);
                }
            }
        }
        assert_eq!(table.get(1, 3), raw.get(1, 3).unwrap_or_default());
        Ok(())
    }

    #[test]
    fn test_match_table_empty_pair() -> Result<(), ElevationError> {
        let mut raw = full_matches()?;
        raw.insert(1, 2, vec![])?;
        assert!(matches!(
            MatchTable::build(&raw),
            Err(ElevationError::InsufficientMatches {
                view_a: 1,
                view_b: 2
            })
        ));
        Ok(())
    }

    #[test]
    fn test_match_table_missing_pair() -> Result<(), ElevationError> {
        let mut raw = PairwiseMatches::new();
        raw.insert(0, 1, table(4, 0.0))?;
        assert!(matches!(
            MatchTable::build(&raw),
            Err(ElevationError::MissingViewPair(0, 2))
        ));
        Ok(())
    }

    #[test]
    fn test_pairwise_matches_json() -> Result<(), Box<dyn std::error::Error>> {
        let json = r#"{"pairs": [{"view_a": 0, "view_b": 1, "matches": [[1.0, 2.0, 3.0, 4.0, 0.9]]}]}"#;
        let raw: PairwiseMatches = serde_json::from_str(json)?;
        assert_eq!(raw.len(), 1);
        assert_eq!(
            raw.get(0, 1),
            Some(&[Correspondence::from([1.0, 2.0, 3.0, 4.0, 0.9])][..])
        );

        let bad = r#"{"pairs": [{"view_a": 3, "view_b": 3, "matches": []}]}"#;
        assert!(serde_json::from_str::<PairwiseMatches>(bad).is_err());
        Ok(())
    }
}
