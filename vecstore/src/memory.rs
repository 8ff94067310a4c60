use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::cosine::cosine_distance;
use crate::error::VecError;
use crate::euclidean::euclidean_distance;
use crate::vecstore::{Match, VecIndex};

/// Distance function used by [`MemoryIndex`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    #[default]
    Euclidean,
    Cosine,
}

impl Metric {
    pub fn distance(self, a: &[f32], b: &[f32]) -> f32 {
        match self {
            Metric::Euclidean => euclidean_distance(a, b),
            Metric::Cosine => cosine_distance(a, b),
        }
    }
}

/// MemoryIndex is an exact in-memory VecIndex using a linear scan.
/// Suited to libraries of a few thousand points.
#[derive(Debug, Clone, Default)]
pub struct MemoryIndex {
    metric: Metric,
    dim: usize,
    ids: Vec<usize>,
    // Row-major, ids.len() * dim.
    data: Vec<f32>,
}

impl MemoryIndex {
    pub fn new(metric: Metric) -> Self {
        Self {
            metric,
            ..Self::default()
        }
    }

    pub fn metric(&self) -> Metric {
        self.metric
    }
}

impl VecIndex for MemoryIndex {
    fn train(&mut self, ids: &[usize], vectors: &[&[f32]]) -> Result<(), VecError> {
        if ids.len() != vectors.len() {
            return Err(VecError::BatchLengthMismatch {
                ids: ids.len(),
                vectors: vectors.len(),
            });
        }

        let dim = vectors.first().map_or(0, |v| v.len());
        let mut data = Vec::with_capacity(dim * vectors.len());
        for v in vectors {
            if v.len() != dim {
                return Err(VecError::DimensionMismatch {
                    got: v.len(),
                    want: dim,
                });
            }
            data.extend_from_slice(v);
        }

        self.dim = dim;
        self.ids = ids.to_vec();
        self.data = data;
        debug!(points = self.ids.len(), dim, metric = ?self.metric, "index trained");
        Ok(())
    }

    fn search(&self, query: &[f32], k: usize) -> Result<Vec<Match>, VecError> {
        if self.ids.is_empty() {
            return Err(VecError::NotTrained);
        }
        if query.len() != self.dim {
            return Err(VecError::DimensionMismatch {
                got: query.len(),
                want: self.dim,
            });
        }
        if k > self.ids.len() {
            return Err(VecError::TooFewPoints {
                k,
                points: self.ids.len(),
            });
        }

        let mut results: Vec<Match> = self
            .ids
            .iter()
            .zip(self.data.chunks_exact(self.dim.max(1)))
            .map(|(&id, vec)| Match {
                id,
                distance: self.metric.distance(query, vec),
            })
            .collect();

        results.sort_by(|a, b| match a.distance.total_cmp(&b.distance) {
            Ordering::Equal => a.id.cmp(&b.id),
            ord => ord,
        });
        results.truncate(k);

        Ok(results)
    }

    fn len(&self) -> usize {
        self.ids.len()
    }

    fn dim(&self) -> usize {
        self.dim
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trained(metric: Metric, vectors: &[&[f32]]) -> MemoryIndex {
        let ids: Vec<usize> = (0..vectors.len()).collect();
        let mut idx = MemoryIndex::new(metric);
        idx.train(&ids, vectors).unwrap();
        idx
    }

    #[test]
    fn test_train_and_search() {
        let idx = trained(
            Metric::Euclidean,
            &[&[1.0, 0.0, 0.0, 0.0], &[0.0, 1.0, 0.0, 0.0], &[0.9, 0.1, 0.0, 0.0]],
        );
        assert_eq!(idx.len(), 3);
        assert_eq!(idx.dim(), 4);

        let matches = idx.search(&[1.0, 0.0, 0.0, 0.0], 2).unwrap();
        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0].id, 0);
        assert_eq!(matches[0].distance, 0.0);
        assert_eq!(matches[1].id, 2);
    }

    #[test]
    fn test_distances_non_decreasing() {
        let idx = trained(
            Metric::Euclidean,
            &[&[5.0, 5.0], &[1.0, 1.0], &[3.0, 3.0], &[0.0, 0.0], &[2.0, 2.0]],
        );
        let matches = idx.search(&[0.0, 0.0], 5).unwrap();
        let ids: Vec<usize> = matches.iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![3, 1, 4, 2, 0]);
        assert!(matches.windows(2).all(|w| w[0].distance <= w[1].distance));
    }

    #[test]
    fn test_ties_by_ascending_id() {
        let idx = trained(
            Metric::Euclidean,
            &[&[1.0, 0.0], &[-1.0, 0.0], &[0.0, 1.0], &[0.0, -1.0]],
        );
        let matches = idx.search(&[0.0, 0.0], 4).unwrap();
        let ids: Vec<usize> = matches.iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_custom_ids() {
        let mut idx = MemoryIndex::new(Metric::Euclidean);
        idx.train(&[10, 20], &[&[0.0], &[1.0]]).unwrap();
        let matches = idx.search(&[0.9], 1).unwrap();
        assert_eq!(matches[0].id, 20);
    }

    #[test]
    fn test_cosine_metric() {
        let idx = trained(Metric::Cosine, &[&[10.0, 0.0], &[0.0, 1.0]]);
        let matches = idx.search(&[1.0, 0.1], 1).unwrap();
        assert_eq!(matches[0].id, 0);
    }

    #[test]
    fn test_k_exceeds_points() {
        let idx = trained(Metric::Euclidean, &[&[0.0], &[1.0]]);
        assert!(matches!(
            idx.search(&[0.0], 3),
            Err(VecError::TooFewPoints { k: 3, points: 2 })
        ));
    }

    #[test]
    fn test_query_dimension_mismatch() {
        let idx = trained(Metric::Euclidean, &[&[0.0, 1.0]]);
        assert!(matches!(
            idx.search(&[0.0], 1),
            Err(VecError::DimensionMismatch { got: 1, want: 2 })
        ));
    }

    #[test]
    fn test_train_mismatch() {
        let mut idx = MemoryIndex::new(Metric::Euclidean);
        assert!(matches!(
            idx.train(&[0, 1], &[&[1.0, 0.0]]),
            Err(VecError::BatchLengthMismatch { .. })
        ));
        assert!(matches!(
            idx.train(&[0, 1], &[&[1.0, 0.0], &[1.0]]),
            Err(VecError::DimensionMismatch { got: 1, want: 2 })
        ));
    }

    #[test]
    fn test_search_untrained() {
        let idx = MemoryIndex::new(Metric::Euclidean);
        assert!(idx.is_empty());
        assert!(matches!(idx.search(&[0.0], 1), Err(VecError::NotTrained)));
    }

    #[test]
    fn test_concurrent_search() {
        let idx = std::sync::Arc::new(trained(
            Metric::Euclidean,
            &[&[0.0, 0.0], &[1.0, 1.0], &[2.0, 2.0]],
        ));
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let idx = idx.clone();
                std::thread::spawn(move || {
                    let q = [i as f32 * 0.7, i as f32 * 0.7];
                    idx.search(&q, 3).unwrap()
                })
            })
            .collect();
        for h in handles {
            assert_eq!(h.join().unwrap().len(), 3);
        }
    }
}
