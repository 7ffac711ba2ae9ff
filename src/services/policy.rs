//! Field-level merge rules for two records of the same place.
//!
//! Every `merge_*` function that takes `existing: &mut Place` mutates that
//! record in place and only reads `incoming`. [`merge_list_unique`] and
//! [`merge_rating`] are plain value functions.

use std::collections::HashSet;
use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;

use crate::llm::{TagMergeError, TagMerger};
use crate::models::{Place, UNKNOWN_RATING};

/// Tag-merge oracle together with the time it is allowed to take.
#[derive(Clone)]
pub struct TagOracle {
    merger: Arc<dyn TagMerger>,
    timeout: Duration,
}

impl TagOracle {
    pub fn new(merger: Arc<dyn TagMerger>, timeout: Duration) -> Self {
        Self { merger, timeout }
    }
}

/// Union of two lists without duplicates.
///
/// Keeps first-occurrence order, `first` before `second`. Callers must not
/// rely on that order.
pub fn merge_list_unique<T: Eq + Hash + Clone>(first: &[T], second: &[T]) -> Vec<T> {
    let mut seen = HashSet::with_capacity(first.len() + second.len());
    first
        .iter()
        .chain(second)
        .filter(|item| seen.insert(*item))
        .cloned()
        .collect()
}

/// Reconciles category tags, through the oracle when one is configured.
///
/// On oracle error `existing.types` is left untouched and the error is
/// returned. An oracle timeout falls back to [`merge_list_unique`].
pub async fn merge_tags(
    existing: &mut Place,
    incoming: &Place,
    oracle: Option<&TagOracle>,
) -> Result<(), TagMergeError> {
    let merged = match oracle {
        Some(oracle) => {
            let call = oracle.merger.merge(&existing.types, &incoming.types);
            match tokio::time::timeout(oracle.timeout, call).await {
                Ok(result) => result?,
                Err(_) => {
                    tracing::warn!(
                        "Tag merge oracle timed out after {:?} for '{}', using set union",
                        oracle.timeout,
                        existing.name
                    );
                    merge_list_unique(&existing.types, &incoming.types)
                }
            }
        }
        None => merge_list_unique(&existing.types, &incoming.types),
    };

    tracing::debug!(
        "Merging tags: {:?} with {:?} -> {:?}",
        existing.types,
        incoming.types,
        merged
    );
    existing.types = merged;
    Ok(())
}

fn fill_if_empty(existing: &mut String, incoming: &str) {
    if existing.is_empty() && !incoming.is_empty() {
        *existing = incoming.to_string();
    }
}

fn fill_uri_if_empty(existing: &mut Option<String>, incoming: &Option<String>) {
    let existing_empty = existing.as_deref().map_or(true, str::is_empty);
    let incoming_present = incoming.as_deref().is_some_and(|u| !u.is_empty());
    if existing_empty && incoming_present {
        existing.clone_from(incoming);
    }
}

/// Existing contact values win; empty ones adopt the incoming value.
pub fn merge_contacts(existing: &mut Place, incoming: &Place) {
    let ours = &mut existing.contact;
    let theirs = &incoming.contact;

    fill_if_empty(&mut ours.phone, &theirs.phone);
    fill_if_empty(&mut ours.email, &theirs.email);
    fill_if_empty(&mut ours.website, &theirs.website);
    fill_if_empty(&mut ours.address, &theirs.address);
    fill_uri_if_empty(&mut ours.gmaps_uri, &theirs.gmaps_uri);
    fill_uri_if_empty(&mut ours.tripadvisor_uri, &theirs.tripadvisor_uri);
    fill_if_empty(&mut ours.specific_uri, &theirs.specific_uri);
}

/// Flag-by-flag OR.
pub fn merge_features(existing: &mut Place, incoming: &Place) {
    let ours = &mut existing.features;
    let theirs = &incoming.features;

    ours.credit_card |= theirs.credit_card;
    ours.serve_alcohol |= theirs.serve_alcohol;
    ours.is_accessible |= theirs.is_accessible;
    ours.takeout |= theirs.takeout;
    ours.seating |= theirs.seating;
    ours.wifi |= theirs.wifi;
    ours.reservation |= theirs.reservation;
    ours.parking |= theirs.parking;
    ours.dog_allowed |= theirs.dog_allowed;
}

/// Appends incoming reviews after the existing ones. No de-duplication.
pub fn merge_reviews(existing: &mut Place, incoming: &Place) {
    existing.reviews.extend(incoming.reviews.iter().cloned());
}

pub fn merge_atmospheres(existing: &mut Place, incoming: &Place) {
    existing.atmosphere_target =
        merge_list_unique(&existing.atmosphere_target, &incoming.atmosphere_target);
}

pub fn merge_price_levels(existing: &mut Place, incoming: &Place) {
    existing.price_level = merge_list_unique(&existing.price_level, &incoming.price_level);
}

/// Review-count weighted average of two ratings.
///
/// With one zero weight the result is the other side's rating. With both
/// weights zero there is nothing to weight and the result is [`UNKNOWN_RATING`].
pub fn merge_rating(rating: f64, new_rating: f64, nb_reviews: u32, new_nb_reviews: u32) -> f64 {
    let total = f64::from(nb_reviews) + f64::from(new_nb_reviews);
    if total == 0.0 {
        return UNKNOWN_RATING;
    }

    rating * (f64::from(nb_reviews) / total) + new_rating * (f64::from(new_nb_reviews) / total)
}

/// Re-averages the rating with the pre-merge counts, then adds the counts.
pub fn merge_rating_and_counts(existing: &mut Place, incoming: &Place) {
    existing.rating = merge_rating(
        existing.rating,
        incoming.rating,
        existing.number_of_reviews,
        incoming.number_of_reviews,
    );
    existing.number_of_reviews = existing
        .number_of_reviews
        .saturating_add(incoming.number_of_reviews);
}
