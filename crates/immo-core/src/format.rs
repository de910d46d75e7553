// Display strings for search results.

use crate::catalog::PropertyRecord;

/// Shown in place of results when a search matches nothing.
pub const NO_RESULTS_MESSAGE: &str =
    "No properties match your search criteria. Please adjust the filters and try again.";

/// `"<title> - <price> - <location> - <property_type>"`
pub fn format_record(record: &PropertyRecord) -> String {
    format!(
        "{} - {} - {} - {}",
        record.title, record.price, record.location, record.property_type
    )
}

/// One line per record, or the single no-results line when empty.
pub fn format_results(records: &[PropertyRecord]) -> Vec<String> {
    if records.is_empty() {
        return vec![NO_RESULTS_MESSAGE.to_string()];
    }
    records.iter().map(format_record).collect()
}
