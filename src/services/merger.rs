//! Resolution engine: decides, record by record, whether an incoming place is
//! new or a duplicate of a stored one, and merges duplicates.
//!
//! Each record goes through `received → queried → matched | unmatched → resolved`.
//! Records are resolved strictly one at a time: every resolution reads and
//! mutates the entity store and the similarity index, and later records can
//! match earlier ones. Mutating methods take `&mut self`; share an engine across
//! tasks only behind a single `tokio::sync::Mutex` held for a whole
//! [`Merger::add_restaurant`] call.

use std::collections::HashMap;

use serde::Serialize;

use crate::config::DEFAULT_MATCH_THRESHOLD;
use crate::error::AppError;
use crate::index::{QueryResult, SimilarityIndex};
use crate::llm::{TagMergeError, TagMergeErrorKind};
use crate::models::{Place, PlaceSource};
use crate::services::policy::{self, TagOracle};

/// Outcome of resolving one incoming record.
#[derive(Debug)]
pub enum Resolution {
    /// No stored place was close enough; the record became a new entity.
    Inserted { key: String, distance: f32 },
    /// The record was merged into the entity stored under `key`.
    Merged {
        key: String,
        distance: f32,
        /// Set when the oracle failed; the entity kept its previous tags.
        tag_merge_failure: Option<TagMergeError>,
    },
}

impl Resolution {
    pub fn key(&self) -> &str {
        match self {
            Resolution::Inserted { key, .. } | Resolution::Merged { key, .. } => key,
        }
    }

    pub fn is_merged(&self) -> bool {
        matches!(self, Resolution::Merged { .. })
    }
}

/// A tag merge the oracle could not perform.
#[derive(Debug, Serialize)]
pub struct TagMergeFailure {
    /// Id of the incoming record.
    pub place_id: String,
    /// Key of the entity it was merged into.
    pub entity_key: String,
    pub kind: TagMergeErrorKind,
    pub message: String,
}

/// Summary of an [`Merger::add_restaurants`] batch.
#[derive(Debug, Default, Serialize)]
pub struct BatchReport {
    pub inserted: usize,
    pub merged: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tag_merge_failures: Vec<TagMergeFailure>,
}

impl BatchReport {
    pub fn total(&self) -> usize {
        self.inserted + self.merged
    }

    /// Folds the counts and failures of a later batch into this one.
    pub fn absorb(&mut self, other: BatchReport) {
        self.inserted += other.inserted;
        self.merged += other.merged;
        self.tag_merge_failures.extend(other.tag_merge_failures);
    }

    fn record(&mut self, place_id: &str, resolution: Resolution) {
        match resolution {
            Resolution::Inserted { .. } => self.inserted += 1,
            Resolution::Merged {
                key,
                tag_merge_failure,
                ..
            } => {
                self.merged += 1;
                if let Some(err) = tag_merge_failure {
                    self.tag_merge_failures.push(TagMergeFailure {
                        place_id: place_id.to_string(),
                        entity_key: key,
                        kind: err.kind,
                        message: err.to_string(),
                    });
                }
            }
        }
    }
}

/// Entity-resolution and merge engine.
///
/// Owns the entity store (key → place), the provenance map (incoming id →
/// [`PlaceSource`]) and the similarity index. Both maps start empty for every
/// engine.
pub struct Merger {
    index: SimilarityIndex,
    tag_oracle: Option<TagOracle>,
    match_threshold: f32,
    places: HashMap<String, Place>,
    merged_places: HashMap<String, PlaceSource>,
}

impl Merger {
    /// Creates an engine with the default threshold and no tag oracle.
    pub fn new(index: SimilarityIndex) -> Self {
        Self {
            index,
            tag_oracle: None,
            match_threshold: DEFAULT_MATCH_THRESHOLD,
            places: HashMap::new(),
            merged_places: HashMap::new(),
        }
    }

    /// Distances strictly below `threshold` count as a match.
    pub fn with_match_threshold(mut self, threshold: f32) -> Self {
        self.match_threshold = threshold;
        self
    }

    /// Delegates tag reconciliation to `oracle`.
    pub fn with_tag_oracle(mut self, oracle: TagOracle) -> Self {
        self.tag_oracle = Some(oracle);
        self
    }

    pub fn match_threshold(&self) -> f32 {
        self.match_threshold
    }

    /// Resolved entities keyed by name.
    pub fn places(&self) -> &HashMap<String, Place> {
        &self.places
    }

    /// Provenance of every record that was merged, keyed by that record's id.
    pub fn merged_places(&self) -> &HashMap<String, PlaceSource> {
        &self.merged_places
    }

    pub fn index(&self) -> &SimilarityIndex {
        &self.index
    }

    /// Consumes the engine, returning the entity store and provenance map.
    pub fn into_parts(self) -> (HashMap<String, Place>, HashMap<String, PlaceSource>) {
        (self.places, self.merged_places)
    }

    /// Resolves every place of `restaurants` in iteration order.
    ///
    /// Matching is greedy: earlier records become match targets for later
    /// ones. Tag-merge failures are collected in the report; any other error
    /// aborts the batch.
    pub async fn add_restaurants<I, K>(&mut self, restaurants: I) -> Result<BatchReport, AppError>
    where
        I: IntoIterator<Item = (K, Place)>,
    {
        let mut report = BatchReport::default();
        for (_, place) in restaurants {
            let place_id = place.id.clone();
            let resolution = self.add_restaurant(place).await?;
            report.record(&place_id, resolution);
        }

        tracing::info!(
            "Resolved {} places: {} new, {} merged, {} tag merge failures",
            report.total(),
            report.inserted,
            report.merged,
            report.tag_merge_failures.len()
        );
        Ok(report)
    }

    /// Resolves a single place against everything stored so far.
    pub async fn add_restaurant(&mut self, place: Place) -> Result<Resolution, AppError> {
        tracing::debug!("Trying to add {}", place.name);

        let query = self.index.query(&place)?;
        match query {
            QueryResult {
                key: Some(key),
                distance,
            } if distance < self.match_threshold => self.merge_into(key, distance, place).await,
            QueryResult { distance, .. } => {
                tracing::debug!(
                    "Adding {} to the store, no relevant match found. Distance: {}",
                    place.name,
                    distance
                );
                let key = self.insert(place)?;
                Ok(Resolution::Inserted { key, distance })
            }
        }
    }

    async fn merge_into(
        &mut self,
        key: String,
        distance: f32,
        place: Place,
    ) -> Result<Resolution, AppError> {
        let existing = self
            .places
            .get_mut(&key)
            .ok_or_else(|| AppError::MissingEntity(key.clone()))?;

        tracing::info!(
            "Found a match with {} for {}. Distance: {}. Address: {} -> {}",
            existing.name,
            place.name,
            distance,
            existing.contact.address,
            place.contact.address
        );

        let tag_merge_failure =
            match policy::merge_tags(existing, &place, self.tag_oracle.as_ref()).await {
                Ok(()) => None,
                Err(err) => {
                    tracing::error!(
                        "Tag merge failed for {} ({}), keeping existing tags: {}",
                        place.name,
                        place.id,
                        err
                    );
                    Some(err)
                }
            };
        policy::merge_contacts(existing, &place);
        policy::merge_features(existing, &place);
        policy::merge_reviews(existing, &place);
        policy::merge_atmospheres(existing, &place);
        policy::merge_price_levels(existing, &place);
        policy::merge_rating_and_counts(existing, &place);

        let source = PlaceSource {
            entity_key: key.clone(),
            entity_id: existing.id.clone(),
            gmaps_id: existing.contact.gmaps_uri.clone(),
            tripadvisor_id: existing.contact.tripadvisor_uri.clone(),
            source_provider: place.provider(),
        };
        self.merged_places.entry(place.id).or_insert(source);

        Ok(Resolution::Merged {
            key,
            distance,
            tag_merge_failure,
        })
    }

    /// Stores `place` as a new entity and indexes its name.
    fn insert(&mut self, place: Place) -> Result<String, AppError> {
        let key = self.free_key(&place);
        self.index.insert(&place, &key)?;
        self.places.insert(key.clone(), place);
        Ok(key)
    }

    /// The place name, or the first of `"{name} [{id}]"`, `"{name} [{id}] #2"`, ...
    /// that no stored entity uses.
    fn free_key(&self, place: &Place) -> String {
        if !self.places.contains_key(&place.name) {
            return place.name.clone();
        }

        let base = format!("{} [{}]", place.name, place.id);
        let mut key = base.clone();
        let mut n = 2;
        while self.places.contains_key(&key) {
            key = format!("{} #{}", base, n);
            n += 1;
        }
        tracing::warn!(
            "Entity name '{}' already stored, keeping the new place as '{}'",
            place.name,
            key
        );
        key
    }
}
