//! Canonical column names of the loaded ECDC table. Source headers are matched against these
//! case-insensitively (see `header_key`), so `dateRep` and `DateRep` both land in `DATE_REP`.

pub const GEO_ID: &str = "GeoId";
pub const DATE_REP: &str = "DateRep";
pub const CASES: &str = "Cases";
pub const DEATHS: &str = "Deaths";
pub const COUNTRY_NAME: &str = "Countries and territories";

/// Running total of the selected metric, added while building country series.
pub const CUMULATIVE: &str = "cum";

/// Columns that must be present in every source.
pub const REQUIRED: [&str; 4] = [GEO_ID, DATE_REP, CASES, DEATHS];

/// Key used to compare a source header with a canonical name: lowercase, alphanumerics only.
pub fn header_key(header: &str) -> String {
    header
        .chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Returns the canonical name for a source header, if it is one we use.
pub fn canonical(header: &str) -> Option<&'static str> {
    let key = header_key(header);
    [GEO_ID, DATE_REP, CASES, DEATHS, COUNTRY_NAME]
        .into_iter()
        .find(|name| header_key(name) == key)
}
