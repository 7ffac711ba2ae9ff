//! Name-similarity index used to find match candidates.

use std::sync::Arc;

use crate::error::AppError;
use crate::index::{Embedder, FlatIndex, VectorSearch};
use crate::models::Place;

/// Distance reported when there is nothing to compare against.
pub const NO_MATCH_DISTANCE: f32 = 1.0;

/// Result of a similarity lookup.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryResult {
    /// Entity key of the closest indexed place, `None` when the index is empty.
    pub key: Option<String>,
    /// Distance on the embedder's native scale.
    pub distance: f32,
}

impl QueryResult {
    /// Sentinel returned by an empty index.
    pub fn no_match() -> Self {
        Self {
            key: None,
            distance: NO_MATCH_DISTANCE,
        }
    }
}

/// Embeds place names and answers "closest known place" queries.
///
/// Entries are append-only: one per distinct entity, created when the entity
/// is first stored and never re-embedded from merged names.
pub struct SimilarityIndex {
    embedder: Arc<dyn Embedder>,
    search: Box<dyn VectorSearch>,
    keys: Vec<String>,
}

impl SimilarityIndex {
    pub fn new(embedder: Arc<dyn Embedder>, search: Box<dyn VectorSearch>) -> Self {
        Self {
            embedder,
            search,
            keys: Vec::new(),
        }
    }

    /// Exact flat index using the embedder's native metric.
    pub fn flat(embedder: Arc<dyn Embedder>) -> Self {
        let search = FlatIndex::new(embedder.metric());
        Self::new(embedder, Box::new(search))
    }

    /// Embeds `place.name` and records it under `key`.
    pub fn insert(&mut self, place: &Place, key: &str) -> Result<(), AppError> {
        let embedding = self.embedder.embed(&place.name)?;
        let position = self.search.add(embedding)?;

        if position != self.keys.len() {
            return Err(AppError::Index(format!(
                "vector stored at position {} but {} keys are indexed",
                position,
                self.keys.len()
            )));
        }
        self.keys.push(key.to_string());
        Ok(())
    }

    /// Finds the indexed place whose name is closest to `place.name`.
    pub fn query(&self, place: &Place) -> Result<QueryResult, AppError> {
        if self.keys.is_empty() {
            return Ok(QueryResult::no_match());
        }

        let embedding = self.embedder.embed(&place.name)?;
        let Some(neighbor) = self.search.search(&embedding)? else {
            return Ok(QueryResult::no_match());
        };

        let key = self.keys.get(neighbor.position).cloned().ok_or_else(|| {
            AppError::Index(format!(
                "search returned position {} outside of {} indexed keys",
                neighbor.position,
                self.keys.len()
            ))
        })?;

        Ok(QueryResult {
            key: Some(key),
            distance: neighbor.distance,
        })
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::DistanceMetric;

    /// Embeds by counting a handful of letters.
    struct LetterEmbedder;

    impl Embedder for LetterEmbedder {
        fn embed(&self, text: &str) -> Result<Vec<f32>, AppError> {
            let text = text.to_lowercase();
            Ok(['a', 'b', 'e', 'i', 'o', 'p', 's', 't']
                .iter()
                .map(|c| text.matches(*c).count() as f32)
                .collect())
        }
    }

    struct FailingEmbedder;

    impl Embedder for FailingEmbedder {
        fn embed(&self, _text: &str) -> Result<Vec<f32>, AppError> {
            Err(AppError::Embedding("model not loaded".to_string()))
        }

        fn metric(&self) -> DistanceMetric {
            DistanceMetric::Euclidean
        }
    }

    #[test]
    fn test_empty_index_query() {
        let index = SimilarityIndex::flat(Arc::new(LetterEmbedder));
        let result = index.query(&Place::new("1", "Anything")).unwrap();
        assert_eq!(result, QueryResult::no_match());
        assert_eq!(result.distance, 1.0);
        assert!(result.key.is_none());
    }

    #[test]
    fn test_empty_index_query_skips_embedder() {
        let index = SimilarityIndex::flat(Arc::new(FailingEmbedder));
        let result = index.query(&Place::new("1", "Anything")).unwrap();
        assert_eq!(result.distance, NO_MATCH_DISTANCE);
    }

    #[test]
    fn test_insert_then_query_exact_name() {
        let mut index = SimilarityIndex::flat(Arc::new(LetterEmbedder));
        index.insert(&Place::new("1", "Le Bistro"), "Le Bistro").unwrap();
        index.insert(&Place::new("2", "Pizza Papa"), "Pizza Papa").unwrap();

        let result = index.query(&Place::new("3", "Le Bistro")).unwrap();
        assert_eq!(result.key.as_deref(), Some("Le Bistro"));
        assert!(result.distance.abs() < 1e-6);
        assert_eq!(index.len(), 2);
    }

    #[test]
    fn test_embedding_failure_propagates() {
        let mut index = SimilarityIndex::flat(Arc::new(FailingEmbedder));
        let err = index.insert(&Place::new("1", "Le Bistro"), "Le Bistro").unwrap_err();
        assert!(matches!(err, AppError::Embedding(_)));
        assert!(index.is_empty());
    }
}
