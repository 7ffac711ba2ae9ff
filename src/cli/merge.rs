//! Merge subcommand - resolve provider dumps into one set of places.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use clap::Parser;
use color_eyre::Result;
use serde::Serialize;

use crate::config::Config;
use crate::context::Context;
use crate::models::{Place, PlaceSource, ProviderSource};
use crate::providers::{self, GmapsPlace, TripadvisorLocation};
use crate::services::BatchReport;

/// Resolve Google Maps and Tripadvisor dumps into deduplicated places.
#[derive(Parser)]
pub struct MergeCommand {
    /// JSON dump(s) of Google Maps places.
    #[arg(long = "gmaps", value_name = "FILE", num_args = 1..)]
    pub gmaps: Vec<PathBuf>,

    /// JSON dump(s) of Tripadvisor locations.
    #[arg(long = "tripadvisor", value_name = "FILE", num_args = 1..)]
    pub tripadvisor: Vec<PathBuf>,

    /// Write the result here instead of stdout.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Override `merger.match_threshold`.
    #[arg(long)]
    pub threshold: Option<f32>,

    /// Reconcile tags with the LLM oracle.
    #[arg(long)]
    pub llm: bool,
}

#[derive(Serialize)]
struct MergeOutput<'a> {
    places: Vec<&'a Place>,
    provenance: BTreeMap<&'a str, &'a PlaceSource>,
}

impl MergeCommand {
    /// Run the merge command.
    pub async fn run(self) -> Result<()> {
        if self.gmaps.is_empty() && self.tripadvisor.is_empty() {
            return Err(color_eyre::eyre::eyre!(
                "Nothing to merge: pass at least one --gmaps or --tripadvisor dump"
            ));
        }

        let mut config = Config::load()?;
        if let Some(threshold) = self.threshold {
            config.merger.match_threshold = threshold;
            config.merger.validate()?;
        }
        if self.llm {
            config.merger.use_llm = true;
        }
        tracing::info!(
            "Merging with threshold {} (llm tags: {})",
            config.merger.match_threshold,
            config.merger.use_llm
        );

        let ctx = Context::from_config(config)?;
        let mut merger = ctx.merger();

        // Google Maps records go first so they become the canonical entities.
        let gmaps = load_places::<GmapsPlace>(&self.gmaps, ProviderSource::GoogleMaps)?;
        let tripadvisor =
            load_places::<TripadvisorLocation>(&self.tripadvisor, ProviderSource::Tripadvisor)?;

        let mut report = merger.add_restaurants(keyed(gmaps)).await?;
        report.absorb(merger.add_restaurants(keyed(tripadvisor)).await?);

        let places = merger.places();
        let qualitative = places.values().filter(|p| p.is_data_qualitative()).count();
        print_summary(&report, places.len(), qualitative);

        let mut sorted: Vec<&Place> = places.values().collect();
        sorted.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
        let output = MergeOutput {
            places: sorted,
            provenance: merger
                .merged_places()
                .iter()
                .map(|(id, source)| (id.as_str(), source))
                .collect(),
        };
        let json = serde_json::to_string_pretty(&output)?;

        match &self.output {
            Some(path) => {
                std::fs::write(path, json)?;
                tracing::info!("Wrote {} places to {}", output.places.len(), path.display());
            }
            None => println!("{}", json),
        }

        Ok(())
    }
}

fn load_places<T>(paths: &[PathBuf], provider: ProviderSource) -> Result<Vec<Place>>
where
    T: serde::de::DeserializeOwned,
    Place: From<T>,
{
    let mut places = Vec::new();
    for path in paths {
        let records: Vec<T> = match providers::load_dump(path, provider) {
            Ok(records) => records,
            Err(err) if !err.is_fatal() => {
                tracing::warn!("Skipping {}: {}", file_label(path), err);
                continue;
            }
            Err(err) => return Err(err.into()),
        };
        let total = records.len();
        let kept = providers::exploitable(records);
        tracing::info!(
            "Loaded {} {} records from {} ({} exploitable)",
            total,
            provider,
            file_label(path),
            kept.len()
        );
        places.extend(kept);
    }
    Ok(places)
}

fn keyed(places: Vec<Place>) -> impl Iterator<Item = (String, Place)> {
    places.into_iter().map(|p| (p.id.clone(), p))
}

fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn print_summary(report: &BatchReport, entities: usize, qualitative: usize) {
    eprintln!("Resolved {} records into {} places", report.total(), entities);
    eprintln!("  inserted:  {}", report.inserted);
    eprintln!("  merged:    {}", report.merged);
    eprintln!("  qualitative: {}", qualitative);
    if !report.tag_merge_failures.is_empty() {
        eprintln!("  tag merge failures: {}", report.tag_merge_failures.len());
        for failure in &report.tag_merge_failures {
            eprintln!(
                "    {} -> {}: {} ({})",
                failure.place_id, failure.entity_key, failure.message, failure.kind
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_dump(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_file_label() {
        assert_eq!(file_label(Path::new("/tmp/dumps/paris.json")), "paris.json");
        assert_eq!(file_label(Path::new("/")), "/");
    }

    #[test]
    fn test_load_places_keeps_exploitable_records() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_dump(
            dir.path(),
            "gmaps.json",
            r#"[
                {"id": "a", "displayName": {"text": "A"}, "rating": 4.0, "formattedAddress": "1 Rue X"},
                {"id": "b", "displayName": {"text": "B"}}
            ]"#,
        );

        let places = load_places::<GmapsPlace>(&[path], ProviderSource::GoogleMaps).unwrap();
        assert_eq!(places.len(), 1);
        assert_eq!(places[0].id, "a");
    }

    #[test]
    fn test_load_places_skips_malformed_dump() {
        let dir = tempfile::tempdir().unwrap();
        let broken = write_dump(dir.path(), "broken.json", r#"{"not": "an array"}"#);
        let good = write_dump(
            dir.path(),
            "tripadvisor.json",
            r#"[{"location_id": "1", "name": "A", "rating": "4.0",
                "address_obj": {"address_string": "1 Rue X"}}]"#,
        );

        let places =
            load_places::<TripadvisorLocation>(&[broken, good], ProviderSource::Tripadvisor)
                .unwrap();
        assert_eq!(places.len(), 1);
    }

    #[test]
    fn test_load_places_missing_file_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.json");

        let result = load_places::<GmapsPlace>(&[missing], ProviderSource::GoogleMaps);
        assert!(result.is_err());
    }
}
