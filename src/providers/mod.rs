//! Provider dump adapters.
//!
//! Each provider module deserializes a dump of raw records and converts them
//! into [`Place`]s. Records that fail [`Place::is_exploitable`] must be dropped
//! here, before they reach the resolution engine.

pub mod gmaps;
pub mod tripadvisor;

use std::path::Path;

use serde::de::DeserializeOwned;

use crate::error::AppError;
use crate::models::{Place, ProviderSource};

pub use gmaps::GmapsPlace;
pub use tripadvisor::TripadvisorLocation;

/// Reads a JSON array of provider records from `path`.
pub fn load_dump<T: DeserializeOwned>(
    path: &Path,
    provider: ProviderSource,
) -> Result<Vec<T>, AppError> {
    let content = std::fs::read_to_string(path)?;
    serde_json::from_str(&content).map_err(|e| AppError::Provider {
        provider: provider.to_string(),
        message: format!("{}: {}", path.display(), e),
    })
}

/// Converts raw records and keeps only exploitable places.
pub fn exploitable<T, I>(records: I) -> Vec<Place>
where
    I: IntoIterator<Item = T>,
    Place: From<T>,
{
    records
        .into_iter()
        .map(Place::from)
        .filter(|place| {
            let keep = place.is_exploitable();
            if !keep {
                tracing::debug!(
                    "Dropping {} ({}): missing name, rating or address",
                    place.name,
                    place.id
                );
            }
            keep
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_exploitable_filters_incomplete_records() {
        let records: Vec<GmapsPlace> = serde_json::from_value(serde_json::json!([
            {"id": "a", "displayName": {"text": "Full"}, "rating": 4.0, "formattedAddress": "1 Rue X"},
            {"id": "b", "displayName": {"text": "No rating"}, "formattedAddress": "2 Rue X"},
            {"id": "c", "rating": 3.0, "formattedAddress": "3 Rue X"}
        ]))
        .unwrap();

        let places = exploitable(records);
        assert_eq!(places.len(), 1);
        assert_eq!(places[0].id, "a");
    }

    #[test]
    fn test_load_dump() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"[{{"location_id": "1", "name": "A"}}]"#).unwrap();

        let records: Vec<TripadvisorLocation> =
            load_dump(file.path(), ProviderSource::Tripadvisor).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].location_id, "1");
    }

    #[test]
    fn test_load_dump_reports_provider() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{\"not\": \"an array\"}}").unwrap();

        let err = load_dump::<GmapsPlace>(file.path(), ProviderSource::GoogleMaps).unwrap_err();
        assert!(matches!(err, AppError::Provider { .. }));
        assert!(!err.is_fatal());
    }
}
