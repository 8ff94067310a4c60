use crate::error::VecError;

/// Match is a single result from a nearest-neighbour search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Match {
    /// Identifier of the matched point.
    pub id: usize,

    /// Distance between the query and matched point.
    /// Lower values indicate higher similarity.
    pub distance: f32,
}

/// VecIndex is the interface for k-nearest-neighbour search over dense
/// float32 vectors.
///
/// An index is trained once and read-only afterwards; `search` takes
/// `&self` and keeps no scratch state, so concurrent queries are safe.
pub trait VecIndex: Send + Sync {
    /// Builds the index from `vectors`, replacing any previous model.
    /// `ids` and `vectors` must have the same length and every vector the
    /// same dimensionality.
    fn train(&mut self, ids: &[usize], vectors: &[&[f32]]) -> Result<(), VecError>;

    /// Return the `k` nearest points to the query, ordered by ascending
    /// distance (closest first), ties broken by ascending id.
    ///
    /// Asking for more neighbours than trained points is an error.
    fn search(&self, query: &[f32], k: usize) -> Result<Vec<Match>, VecError>;

    /// Return the number of trained points.
    fn len(&self) -> usize;

    /// Return true if the index holds no points.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Dimensionality of the trained vectors, or 0 before training.
    fn dim(&self) -> usize;
}
