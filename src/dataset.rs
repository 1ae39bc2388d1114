//! Cached hiking-forecast dataset inspection
//!
//! The CWA hiking dataset nests its location list four levels deep:
//! `cwaopendata -> Dataset -> Locations -> Location`. The types here mirror
//! that shape so a missing key surfaces as a shape error naming the field
//! instead of a generic failure.

use crate::config::LookupConfig;
use crate::CwaError;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

/// Top-level wrapper of the cached dataset file
#[derive(Debug, Deserialize)]
pub struct DatasetFile {
    #[serde(rename = "cwaopendata")]
    pub opendata: OpenDataEnvelope,
}

/// The `cwaopendata` envelope
#[derive(Debug, Deserialize)]
pub struct OpenDataEnvelope {
    #[serde(rename = "Dataset")]
    pub dataset: Dataset,
}

/// The dataset body holding the location collection
#[derive(Debug, Deserialize)]
pub struct Dataset {
    #[serde(rename = "Locations")]
    pub locations: LocationCollection,
}

/// Collection wrapper around the ordered location sequence
#[derive(Debug, Deserialize)]
pub struct LocationCollection {
    #[serde(rename = "Location")]
    pub location: Vec<LocationRecord>,
}

/// One named station entry. Fields other than the name are present in the
/// dataset but not used here, so serde drops them.
#[derive(Debug, Clone, Deserialize)]
pub struct LocationRecord {
    #[serde(rename = "LocationName")]
    pub name: String,
}

impl LocationRecord {
    /// Whether this record's name contains any of the given substrings
    #[must_use]
    pub fn matches(&self, filters: &[String]) -> bool {
        filters.iter().any(|filter| self.name.contains(filter))
    }
}

/// Result of one lookup run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupReport {
    /// Total number of entries in the location sequence
    pub total: usize,
    /// Names that matched a filter, in source order
    pub matches: Vec<String>,
}

/// Load the dataset file and return its location records in source order
pub fn load_dataset(path: &Path) -> Result<Vec<LocationRecord>> {
    debug!("Loading dataset from {}", path.display());

    let raw = fs::read_to_string(path)
        .map_err(CwaError::from)
        .with_context(|| format!("Failed to read dataset file {}", path.display()))?;

    let file: DatasetFile = serde_json::from_str(&raw)
        .map_err(CwaError::from)
        .with_context(|| format!("Failed to parse dataset file {}", path.display()))?;

    Ok(file.opendata.dataset.locations.location)
}

/// Load the configured dataset and report matching location names
pub fn run_lookup(config: &LookupConfig) -> Result<LookupReport> {
    let records = load_dataset(&config.dataset_path)?;
    let total = records.len();

    let matches: Vec<String> = records
        .into_iter()
        .filter(|record| record.matches(&config.name_filters))
        .map(|record| record.name)
        .collect();

    info!(
        "Scanned {} locations, {} matched {:?}",
        total,
        matches.len(),
        config.name_filters
    );

    Ok(LookupReport { total, matches })
}
