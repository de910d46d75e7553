// Property catalog: the fixed list of listings offered by the brokerage.
//
// The default catalog is embedded at compile time as CSV and parsed once at
// startup. Records are immutable for the lifetime of the process.

use std::io::Read;
use std::sync::Arc;

use serde::Deserialize;
use tracing::warn;

use crate::filter::WILDCARD;

/// Embedded default catalog (ten Swiss listings).
const DEFAULT_CATALOG_CSV: &str = include_str!("../data/catalog.csv");

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// A single listing in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize)]
pub struct PropertyRecord {
    pub title: String,
    /// Asking price in the base currency unit.
    pub price: u64,
    pub location: String,
    /// Open-ended category (Apartment, Villa, Studio, Commercial, ...).
    #[serde(rename = "type")]
    pub property_type: String,
}

impl PropertyRecord {
    pub fn new(
        title: impl Into<String>,
        price: u64,
        location: impl Into<String>,
        property_type: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            price,
            location: location.into(),
            property_type: property_type.into(),
        }
    }
}

/// Read-only, cheaply clonable catalog handle.
pub type Catalog = Arc<[PropertyRecord]>;

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("catalog CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("catalog contains no valid records")]
    Empty,
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

/// Parse catalog records from CSV with a `title,price,location,type` header.
///
/// Malformed rows are skipped with a warning. Titles, locations and types are
/// trimmed; matching against them later is exact and case-sensitive.
pub fn load_from_reader<R: Read>(rdr: R) -> Result<Vec<PropertyRecord>, CatalogError> {
    let mut reader = csv::Reader::from_reader(rdr);
    // Surface a broken header as an error instead of skipping every row.
    reader.headers()?;

    let mut records = Vec::new();
    for result in reader.deserialize::<PropertyRecord>() {
        match result {
            Ok(raw) => records.push(PropertyRecord {
                title: raw.title.trim().to_string(),
                price: raw.price,
                location: raw.location.trim().to_string(),
                property_type: raw.property_type.trim().to_string(),
            }),
            Err(e) => {
                warn!("skipping malformed catalog row: {}", e);
            }
        }
    }

    if records.is_empty() {
        return Err(CatalogError::Empty);
    }
    Ok(records)
}

/// Load the embedded default catalog.
pub fn default_catalog() -> Result<Catalog, CatalogError> {
    let records = load_from_reader(DEFAULT_CATALOG_CSV.as_bytes())?;
    Ok(records.into())
}

// ---------------------------------------------------------------------------
// Select options
// ---------------------------------------------------------------------------

/// Location options for the search form: the wildcard followed by every
/// distinct catalog location in first-seen order.
pub fn location_options(catalog: &[PropertyRecord]) -> Vec<String> {
    options_from(catalog.iter().map(|r| r.location.as_str()))
}

/// Property type options for the search form, built like [`location_options`].
pub fn property_type_options(catalog: &[PropertyRecord]) -> Vec<String> {
    options_from(catalog.iter().map(|r| r.property_type.as_str()))
}

fn options_from<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut options = vec![WILDCARD.to_string()];
    for value in values {
        if !options.iter().any(|o| o == value) {
            options.push(value.to_string());
        }
    }
    options
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
