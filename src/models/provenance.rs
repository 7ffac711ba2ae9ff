//! Provider identification and merge provenance.

use serde::{Deserialize, Serialize};

use super::Contact;

/// External source of place records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderSource {
    GoogleMaps,
    Tripadvisor,
    OpenStreetMap,
    /// No provider URI was present on the record.
    Unknown,
}

impl ProviderSource {
    /// Infers the provider from which URI slot is filled.
    ///
    /// Google Maps takes priority over Tripadvisor when both are set.
    pub fn infer(contact: &Contact) -> Self {
        let present = |uri: &Option<String>| uri.as_deref().is_some_and(|u| !u.is_empty());

        if present(&contact.gmaps_uri) {
            ProviderSource::GoogleMaps
        } else if present(&contact.tripadvisor_uri) {
            ProviderSource::Tripadvisor
        } else {
            ProviderSource::Unknown
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderSource::GoogleMaps => "google_maps",
            ProviderSource::Tripadvisor => "tripadvisor",
            ProviderSource::OpenStreetMap => "openstreetmap",
            ProviderSource::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for ProviderSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Record of an incoming place that was merged into an existing entity.
///
/// Keyed by the incoming record's id in the engine; written once, never updated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaceSource {
    /// Store key of the entity the record was merged into.
    pub entity_key: String,
    /// Provider-native id of that entity.
    pub entity_id: String,
    /// Entity's Google Maps URI after the merge.
    pub gmaps_id: Option<String>,
    /// Entity's Tripadvisor URI after the merge.
    pub tripadvisor_id: Option<String>,
    /// Provider the incoming record came from.
    pub source_provider: ProviderSource,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contact(gmaps: Option<&str>, tripadvisor: Option<&str>) -> Contact {
        Contact {
            gmaps_uri: gmaps.map(String::from),
            tripadvisor_uri: tripadvisor.map(String::from),
            ..Contact::default()
        }
    }

    #[test]
    fn test_infer_provider() {
        assert_eq!(
            ProviderSource::infer(&contact(Some("https://maps.google.com/?cid=1"), None)),
            ProviderSource::GoogleMaps
        );
        assert_eq!(
            ProviderSource::infer(&contact(None, Some("https://tripadvisor.com/r1"))),
            ProviderSource::Tripadvisor
        );
        assert_eq!(
            ProviderSource::infer(&contact(Some(""), Some("https://tripadvisor.com/r1"))),
            ProviderSource::Tripadvisor
        );
    }

    #[test]
    fn test_infer_provider_prefers_gmaps() {
        let both = contact(Some("g"), Some("t"));
        assert_eq!(ProviderSource::infer(&both), ProviderSource::GoogleMaps);
    }

    #[test]
    fn test_infer_provider_unknown() {
        assert_eq!(ProviderSource::infer(&contact(None, None)), ProviderSource::Unknown);
        assert_eq!(
            ProviderSource::infer(&contact(Some(""), Some(""))),
            ProviderSource::Unknown
        );
    }

    #[test]
    fn test_provider_display() {
        assert_eq!(ProviderSource::GoogleMaps.to_string(), "google_maps");
        assert_eq!(ProviderSource::Tripadvisor.to_string(), "tripadvisor");
    }
}
