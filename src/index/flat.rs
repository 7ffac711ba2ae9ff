//! Exact brute-force vector index.

use crate::error::AppError;
use crate::index::{DistanceMetric, Neighbor, VectorSearch};

/// Flat (linear scan) index.
///
/// Exact rather than approximate: corpora are a few thousand places at most,
/// and a scan gives a deterministic answer.
#[derive(Debug, Clone, Default)]
pub struct FlatIndex {
    metric: DistanceMetric,
    dimensions: Option<usize>,
    vectors: Vec<Vec<f32>>,
}

impl FlatIndex {
    pub fn new(metric: DistanceMetric) -> Self {
        Self {
            metric,
            dimensions: None,
            vectors: Vec::new(),
        }
    }

    pub fn metric(&self) -> DistanceMetric {
        self.metric
    }

    fn check_dimensions(&self, len: usize) -> Result<(), AppError> {
        match self.dimensions {
            Some(dims) if dims != len => Err(AppError::Index(format!(
                "expected {}-dimensional vector, got {}",
                dims, len
            ))),
            _ => Ok(()),
        }
    }
}

impl VectorSearch for FlatIndex {
    fn add(&mut self, vector: Vec<f32>) -> Result<usize, AppError> {
        if vector.is_empty() {
            return Err(AppError::Index("cannot index an empty vector".to_string()));
        }
        self.check_dimensions(vector.len())?;

        self.dimensions = Some(vector.len());
        self.vectors.push(vector);
        Ok(self.vectors.len() - 1)
    }

    fn search(&self, query: &[f32]) -> Result<Option<Neighbor>, AppError> {
        self.check_dimensions(query.len())?;

        let mut best: Option<Neighbor> = None;
        for (position, vector) in self.vectors.iter().enumerate() {
            let distance = self.metric.distance(query, vector);
            if distance.is_nan() {
                return Err(AppError::Index(format!(
                    "distance to vector {} is NaN",
                    position
                )));
            }
            // Strict comparison keeps the earliest vector on ties
            if best.map_or(true, |b| distance < b.distance) {
                best = Some(Neighbor { position, distance });
            }
        }

        Ok(best)
    }

    fn len(&self) -> usize {
        self.vectors.len()
    }
}
