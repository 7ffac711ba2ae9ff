//! Canonical place record that every provider normalizes into.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Atmosphere, PriceLevel, ProviderSource};

/// Sentinel for an unknown aggregate or review rating.
pub const UNKNOWN_RATING: f64 = -1.0;

/// A restaurant or other establishment.
///
/// Unknown values use sentinels rather than options: `-1` for the rating,
/// an empty string for text, [`PriceLevel::Unknown`] for the price bracket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Place {
    /// Provider-native identifier.
    pub id: String,
    /// Display name, also the text that gets embedded.
    pub name: String,
    /// Aggregate rating, [`UNKNOWN_RATING`] when absent.
    pub rating: f64,
    /// Free-text category tags, de-duplicated.
    pub types: Vec<String>,
    pub price_level: Vec<PriceLevel>,
    pub atmosphere_target: Vec<Atmosphere>,
    pub contact: Contact,
    pub features: Features,
    pub reviews: Vec<Review>,
    /// Weight of `rating` when re-averaging.
    pub number_of_reviews: u32,
}

/// Contact details and per-provider URIs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    pub phone: String,
    pub email: String,
    pub website: String,
    pub address: String,
    pub gmaps_uri: Option<String>,
    pub tripadvisor_uri: Option<String>,
    /// URI of the provider that currently owns the record.
    pub specific_uri: String,
}

/// Capability flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Features {
    pub credit_card: bool,
    pub serve_alcohol: bool,
    pub is_accessible: bool,
    pub takeout: bool,
    pub seating: bool,
    pub wifi: bool,
    pub reservation: bool,
    pub parking: bool,
    pub dog_allowed: bool,
}

/// A single user review.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    pub rating: f64,
    pub lang: String,
    pub title: String,
    pub content: String,
    pub publication_date: Option<DateTime<Utc>>,
}

impl Place {
    /// Creates a place with every optional field at its sentinel.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            rating: UNKNOWN_RATING,
            types: Vec::new(),
            price_level: vec![PriceLevel::Unknown],
            atmosphere_target: Vec::new(),
            contact: Contact::default(),
            features: Features::default(),
            reviews: Vec::new(),
            number_of_reviews: 0,
        }
    }

    /// Whether the record has the minimum needed to be matched and merged:
    /// a name, a rating and an address.
    pub fn is_exploitable(&self) -> bool {
        !self.name.is_empty() && self.rating != UNKNOWN_RATING && !self.contact.address.is_empty()
    }

    /// Coarse data-richness signal for downstream consumers. Does not gate merging.
    pub fn is_data_qualitative(&self) -> bool {
        self.is_exploitable()
            && self.price_level.iter().any(PriceLevel::is_known)
            && !self.types.is_empty()
            && !self.reviews.is_empty()
            && self.features.any()
    }

    /// Provider this record was fetched from, inferred from its URIs.
    pub fn provider(&self) -> ProviderSource {
        ProviderSource::infer(&self.contact)
    }
}

impl Features {
    /// True if at least one flag is set.
    pub fn any(&self) -> bool {
        self.flags().into_iter().any(|f| f)
    }

    fn flags(&self) -> [bool; 9] {
        [
            self.credit_card,
            self.serve_alcohol,
            self.is_accessible,
            self.takeout,
            self.seating,
            self.wifi,
            self.reservation,
            self.parking,
            self.dog_allowed,
        ]
    }
}

impl Review {
    /// Parses an RFC 3339 timestamp, dropping values that don't parse.
    pub fn parse_date(raw: Option<&str>) -> Option<DateTime<Utc>> {
        let raw = raw.filter(|s| !s.is_empty())?;
        match DateTime::parse_from_rfc3339(raw) {
            Ok(date) => Some(date.with_timezone(&Utc)),
            Err(e) => {
                tracing::debug!("Ignoring unparsable review date '{}': {}", raw, e);
                None
            }
        }
    }
}
