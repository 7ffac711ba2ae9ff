//! Core traits for the similarity index collaborators.
//!
//! - [`Embedder`] - Turns a place name into a fixed-length vector
//! - [`VectorSearch`] - Stores vectors and answers exact nearest-neighbor queries

use crate::error::AppError;
use crate::index::DistanceMetric;

/// Deterministic text encoder.
///
/// Identical input must give identical output for a given model. Errors are
/// configuration-fatal for the resolution engine.
pub trait Embedder: Send + Sync {
    /// Embeds a single piece of text.
    fn embed(&self, text: &str) -> Result<Vec<f32>, AppError>;

    /// Distance the embedding space is meant to be compared with.
    ///
    /// The match threshold is tuned against this metric's scale.
    fn metric(&self) -> DistanceMetric {
        DistanceMetric::Cosine
    }
}

/// Nearest vector found by a [`VectorSearch`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    /// Insertion position of the matched vector.
    pub position: usize,
    pub distance: f32,
}

/// Append-only vector collection with exact k=1 search.
pub trait VectorSearch: Send + Sync {
    /// Appends a vector and returns its insertion position.
    fn add(&mut self, vector: Vec<f32>) -> Result<usize, AppError>;

    /// Returns the single closest vector, or `None` when empty.
    ///
    /// Ties go to the lowest insertion position.
    fn search(&self, query: &[f32]) -> Result<Option<Neighbor>, AppError>;

    /// Number of stored vectors.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
