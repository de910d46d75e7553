// Property filter: select catalog records matching the search form criteria.
//
// Every criterion is either the wildcard "All" or an exact value. Price
// brackets are closed intervals, so boundary prices (200,000 / 500,000 /
// 1,000,000) fall into two adjacent brackets.

use std::ops::RangeInclusive;

use crate::catalog::PropertyRecord;

/// Wildcard value meaning "no constraint" for any criterion.
pub const WILDCARD: &str = "All";

// ---------------------------------------------------------------------------
// PriceBracket
// ---------------------------------------------------------------------------

/// A named price interval offered in the Price Range select.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PriceBracket {
    From100kTo200k,
    From200kTo500k,
    From500kTo1m,
    Over1m,
}

impl PriceBracket {
    /// All brackets in the order they are offered to the user.
    pub const ALL: [PriceBracket; 4] = [
        PriceBracket::From100kTo200k,
        PriceBracket::From200kTo500k,
        PriceBracket::From500kTo1m,
        PriceBracket::Over1m,
    ];

    /// Display label, also the value carried in `SearchCriteria::price_range`.
    pub fn label(self) -> &'static str {
        match self {
            PriceBracket::From100kTo200k => "100,000 - 200,000",
            PriceBracket::From200kTo500k => "200,000 - 500,000",
            PriceBracket::From500kTo1m => "500,000 - 1,000,000",
            PriceBracket::Over1m => "1,000,000+",
        }
    }

    /// Look up a bracket by its exact label.
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|b| b.label() == label)
    }

    /// Inclusive bounds of the bracket.
    pub fn bounds(self) -> RangeInclusive<u64> {
        match self {
            PriceBracket::From100kTo200k => 100_000..=200_000,
            PriceBracket::From200kTo500k => 200_000..=500_000,
            PriceBracket::From500kTo1m => 500_000..=1_000_000,
            PriceBracket::Over1m => 1_000_000..=u64::MAX,
        }
    }

    #[inline]
    pub fn contains(self, price: u64) -> bool {
        self.bounds().contains(&price)
    }
}

/// Options for the Price Range select: the wildcard then every bracket label.
pub fn price_range_options() -> Vec<String> {
    std::iter::once(WILDCARD)
        .chain(PriceBracket::ALL.iter().map(|b| b.label()))
        .map(str::to_string)
        .collect()
}

// ---------------------------------------------------------------------------
// SearchCriteria
// ---------------------------------------------------------------------------

/// One search request, built fresh from the form each time the user applies
/// filters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchCriteria {
    pub location: String,
    pub price_range: String,
    pub property_type: String,
}

impl Default for SearchCriteria {
    fn default() -> Self {
        Self::any()
    }
}

impl SearchCriteria {
    pub fn new(
        location: impl Into<String>,
        price_range: impl Into<String>,
        property_type: impl Into<String>,
    ) -> Self {
        Self {
            location: location.into(),
            price_range: price_range.into(),
            property_type: property_type.into(),
        }
    }

    /// Criteria with every dimension set to the wildcard.
    pub fn any() -> Self {
        Self::new(WILDCARD, WILDCARD, WILDCARD)
    }

    /// The price bracket selected, if the label names a known bracket.
    ///
    /// Returns `None` for the wildcard and for unrecognized labels; both
    /// leave the price unconstrained.
    pub fn bracket(&self) -> Option<PriceBracket> {
        PriceBracket::from_label(&self.price_range)
    }

    /// Whether `record` satisfies every non-wildcard criterion.
    pub fn matches(&self, record: &PropertyRecord) -> bool {
        if self.location != WILDCARD && record.location != self.location {
            return false;
        }
        if let Some(bracket) = self.bracket() {
            if !bracket.contains(record.price) {
                return false;
            }
        }
        if self.property_type != WILDCARD && record.property_type != self.property_type {
            return false;
        }
        true
    }
}

// ---------------------------------------------------------------------------
// Filtering
// ---------------------------------------------------------------------------

/// Return the catalog records matching `criteria`, in catalog order.
pub fn filter(catalog: &[PropertyRecord], criteria: &SearchCriteria) -> Vec<PropertyRecord> {
    catalog
        .iter()
        .filter(|record| criteria.matches(record))
        .cloned()
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
